use std::ops::Deref;

use crate::{Length, Line, Offset, Offsets};

/// Route resolved between two subsequent location reference points: the
/// ordered lines from the start candidate to the end candidate, both
/// included, and the validated route length.
#[derive(Debug, Clone, PartialEq)]
pub struct Route<LineId> {
    pub lines: Vec<Line<LineId>>,
    pub length: Length,
}

impl<LineId> Route<LineId> {
    pub(crate) const fn empty() -> Self {
        Self {
            lines: Vec::new(),
            length: Length::ZERO,
        }
    }
}

/// Ordered routes covering a location, one per pair of subsequent location
/// reference points (empty routes elided).
#[derive(Debug, Clone, PartialEq)]
pub struct Routes<LineId>(Vec<Route<LineId>>);

impl<LineId> From<Vec<Route<LineId>>> for Routes<LineId> {
    fn from(routes: Vec<Route<LineId>>) -> Self {
        Self(routes)
    }
}

impl<LineId> Deref for Routes<LineId> {
    type Target = Vec<Route<LineId>>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<LineId: Copy> Routes<LineId> {
    /// Iterates over all the lines of the concatenated routes.
    pub fn lines(&self) -> impl Iterator<Item = &Line<LineId>> {
        self.0.iter().flat_map(|route| &route.lines)
    }

    /// Sum of the resolved route lengths.
    pub fn total_length(&self) -> Length {
        self.0.iter().map(|route| route.length).sum()
    }

    /// Converts the location offsets into absolute meters against the
    /// resolved path.
    ///
    /// Version 2 offsets are already meters and pass through. Version 3
    /// offsets are percentages of the first (head) and last (tail) route
    /// respectively; the head and tail lengths are first corrected for
    /// projection-anchored endpoints, whose leading or trailing fragments
    /// belong to no location reference point.
    pub fn calculate_offsets(&self, offsets: &Offsets) -> Option<(Length, Length)> {
        if let (Offset::Meters(pos), Offset::Meters(neg)) = (&offsets.pos, &offsets.neg) {
            return Some((*pos, *neg));
        }

        let (head_length, tail_length) = self.offset_base_lengths()?;

        let to_meters = |offset: &Offset, base: Length| match offset {
            Offset::Meters(meters) => *meters,
            Offset::Percent(percent) => {
                Length::from_meters((percent * base.meters() / 100.0).round())
            }
        };

        Some((
            to_meters(&offsets.pos, head_length),
            to_meters(&offsets.neg, tail_length),
        ))
    }

    /// Effective lengths of the first and last route that percent offsets
    /// apply to.
    fn offset_base_lengths(&self) -> Option<(Length, Length)> {
        let head = self.first()?;
        let tail = self.last()?;

        let mut head_length = head.length;
        let mut tail_length = tail.length;

        let mut cut_start = Length::ZERO;
        if let Some(projected) = head.lines.first()?.projected_len {
            // the part of the first line before the projection belongs to
            // no location reference point
            cut_start = projected;
            head_length -= cut_start;
        }

        let mut cut_end = Length::ZERO;
        let tail_end = tail.lines.last()?;
        if let Some(projected) = tail_end.projected_len {
            cut_end = tail_end.len - projected;
            tail_length -= cut_end;
        }

        if self.len() == 1 {
            // start and end live on the same and only route: apply the
            // opposite correction to each length as well
            head_length -= cut_end;
            tail_length -= cut_start;
        } else {
            if let Some(projected) = self[1].lines.first().and_then(|line| line.projected_len) {
                // the second route starts within its first line, that
                // leading fragment still belongs to the head
                head_length += projected;
            }
            if let Some(projected) = tail.lines.first().and_then(|line| line.projected_len) {
                // the leading fragment of the last route belongs to the
                // previous route, not to the tail
                tail_length -= projected;
            }
        }

        Some((head_length, tail_length))
    }
}
