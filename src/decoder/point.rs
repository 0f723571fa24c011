use std::collections::VecDeque;

use tracing::debug;

use crate::decoder::candidates::find_candidate_lines;
use crate::decoder::line::prune_front;
use crate::decoder::resolver::resolve_routes;
use crate::{
    BearingDirection, DecodeError, DecoderConfig, Length, MapDatabase, Offset,
    PointAlongLineReference, PointLocationPath,
};

/// Decodes a point-along-line location reference into the access path
/// holding the point and the offset of the point on its first edge.
///
/// The single pair of location reference points is resolved like a line
/// location section; the positive offset is then applied to the part of the
/// path actually covered by the reference, excluding the fragments before
/// and after projection-anchored endpoints.
pub fn decode_point<D: MapDatabase>(
    config: &DecoderConfig,
    database: &D,
    point: &PointAlongLineReference,
) -> Result<PointLocationPath<D::LineId>, DecodeError> {
    debug!("decoding {point:?}");

    let [first, last] = &point.points;
    let candidates = [
        find_candidate_lines(config, database, first, BearingDirection::WithLine)?,
        find_candidate_lines(config, database, last, BearingDirection::AgainstLine)?,
    ];

    let routes = resolve_routes(config, database, &candidates, false)?;
    let head = routes.first().ok_or(DecodeError::RouteConstructionFailed)?;

    let start = head
        .lines
        .first()
        .ok_or(DecodeError::RouteConstructionFailed)?;
    let end = head
        .lines
        .last()
        .ok_or(DecodeError::RouteConstructionFailed)?;

    // fragments cut away by projected endpoints carry no offset percentage
    let mut leading = Length::ZERO;
    let mut projected = Length::ZERO;
    if let Some(length) = start.projected_len {
        leading = length;
        projected = length;
    }
    if let Some(length) = end.projected_len {
        projected += end.len - length;
    }

    let offset = match &point.offset {
        Offset::Percent(percent) => {
            let base = head.length - projected;
            Length::from_meters((percent * base.meters() / 100.0).round()) + leading
        }
        Offset::Meters(meters) => *meters,
    };
    let offset = offset.min(head.length);

    let mut lines: VecDeque<_> = head.lines.iter().copied().collect();
    let offset = prune_front(&mut lines, offset);

    Ok(PointLocationPath::from_lines(lines, offset))
}
