use std::collections::VecDeque;

use tracing::debug;

use crate::decoder::candidates::find_candidate_lines;
use crate::decoder::resolver::resolve_routes;
use crate::decoder::route::Routes;
use crate::{
    BearingDirection, DecodeError, DecoderConfig, Length, Line, LineLocationPath, LineReference,
    MapDatabase,
};

/// Decodes a line location reference into a path of map edges.
///
/// Every location reference point is searched with the line direction except
/// the last one, which is the inbound end of the path. The resolved routes
/// are concatenated and trimmed by the offsets: whole edges only, pruning
/// stops at nodes and the remaining offsets are reported on the result.
pub fn decode_line<D: MapDatabase>(
    config: &DecoderConfig,
    database: &D,
    line: &LineReference,
) -> Result<LineLocationPath<D::LineId>, DecodeError> {
    debug!("decoding {line:?}");

    let last = line.points.len().saturating_sub(1);
    let mut candidates = Vec::with_capacity(line.points.len());

    for (index, lrp) in line.points.iter().enumerate() {
        let direction = if index == last {
            BearingDirection::AgainstLine
        } else {
            BearingDirection::WithLine
        };
        candidates.push(find_candidate_lines(config, database, lrp, direction)?);
    }

    let routes = resolve_routes(config, database, &candidates, true)?;
    let (pos_offset, neg_offset) = routes
        .calculate_offsets(&line.offsets)
        .ok_or(DecodeError::RouteConstructionFailed)?;

    trim_path(&routes, pos_offset, neg_offset)
}

/// Concatenates the routes and removes whole edges covered by the offsets
/// from both ends of the path.
fn trim_path<LineId: Copy>(
    routes: &Routes<LineId>,
    pos_offset: Length,
    neg_offset: Length,
) -> Result<LineLocationPath<LineId>, DecodeError> {
    let total_length = routes.total_length();
    let offsets_sum = pos_offset + neg_offset;

    if offsets_sum >= total_length * 2.0 {
        return Err(DecodeError::InvalidOffsets(pos_offset, neg_offset));
    }

    let (mut pos_offset, mut neg_offset) = (pos_offset, neg_offset);

    if offsets_sum > total_length {
        // offsets exceed the location length: scale them down and keep at
        // least one meter of path
        let ratio = total_length.meters() / offsets_sum.meters();
        pos_offset = (pos_offset * ratio).round();
        neg_offset = (neg_offset * ratio).round();
        if pos_offset > neg_offset {
            pos_offset -= Length::from_meters(1.0);
        } else {
            neg_offset -= Length::from_meters(1.0);
        }
    }

    let mut lines: VecDeque<Line<LineId>> = routes.lines().copied().collect();

    if pos_offset > Length::ZERO {
        pos_offset = prune_front(&mut lines, pos_offset);
    }
    if neg_offset > Length::ZERO {
        neg_offset = prune_back(&mut lines, neg_offset);
    }

    Ok(LineLocationPath::from_lines(lines, pos_offset, neg_offset))
}

/// Removes whole lines from the head of the path while they fit within the
/// offset, never leaving the path empty. Returns the remaining offset into
/// the new first line.
pub(crate) fn prune_front<LineId>(lines: &mut VecDeque<Line<LineId>>, offset: Length) -> Length {
    let mut pruned = Length::ZERO;

    while lines.len() > 1 {
        let Some(line) = lines.front() else { break };
        if pruned + line.len > offset {
            break;
        }
        pruned += line.len;
        lines.pop_front();
    }

    offset - pruned
}

/// Removes whole lines from the tail of the path while they fit within the
/// offset, never leaving the path empty. Returns the remaining offset into
/// the new last line.
pub(crate) fn prune_back<LineId>(lines: &mut VecDeque<Line<LineId>>, offset: Length) -> Length {
    let mut pruned = Length::ZERO;

    while lines.len() > 1 {
        let Some(line) = lines.back() else { break };
        if pruned + line.len > offset {
            break;
        }
        pruned += line.len;
        lines.pop_back();
    }

    offset - pruned
}
