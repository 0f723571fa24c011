//! Rates how well a candidate line matches the attributes of a location
//! reference point. The overall score combines the distance of the line to
//! the LRP with how closely its FRC, FOW and bearing match.

use crate::{Bearing, DecoderConfig, Fow, Frc, Length, Line, LocationReferencePoint, RatingScore};

/// Score by FRC class difference; any larger difference rates zero.
const FRC_RATING: [f64; 3] = [100.0, 75.0, 50.0];

/// Score by bearing sector difference; any larger difference rates zero.
const BEAR_RATING: [f64; 3] = [100.0, 50.0, 25.0];

/// Symmetric FOW compatibility scores, indexed by the two FOW values.
/// An undefined FOW on either side is an average match; physically similar
/// shapes (motorway vs multiple carriageway, roundabout vs traffic square)
/// score better than dissimilar ones.
const FOW_RATING: [[f64; 8]; 8] = [
    [50.0, 50.0, 50.0, 50.0, 50.0, 50.0, 50.0, 50.0],
    [50.0, 100.0, 50.0, 25.0, 25.0, 25.0, 25.0, 25.0],
    [50.0, 50.0, 100.0, 50.0, 50.0, 25.0, 25.0, 25.0],
    [50.0, 25.0, 50.0, 100.0, 50.0, 50.0, 25.0, 25.0],
    [50.0, 25.0, 50.0, 50.0, 100.0, 50.0, 25.0, 25.0],
    [50.0, 25.0, 25.0, 50.0, 50.0, 100.0, 25.0, 25.0],
    [50.0, 25.0, 25.0, 25.0, 25.0, 25.0, 100.0, 25.0],
    [50.0, 25.0, 25.0, 25.0, 25.0, 25.0, 25.0, 100.0],
];

fn frc_rating(lrp: Frc, line: Frc) -> f64 {
    let difference = (lrp as u8).abs_diff(line as u8) as usize;
    FRC_RATING.get(difference).copied().unwrap_or(0.0)
}

fn fow_rating(lrp: Fow, line: Fow) -> f64 {
    FOW_RATING[lrp as usize][line as usize]
}

/// Rates the bearing match, or `None` when the sector difference exceeds the
/// allowed maximum and the candidate must be rejected outright.
fn bearing_rating(lrp: Bearing, line: Bearing, max_difference: u8) -> Option<f64> {
    let difference = lrp.difference(&line);
    if difference > max_difference {
        return None;
    }
    Some(BEAR_RATING.get(difference as usize).copied().unwrap_or(0.0))
}

/// Shortfall of the candidate distance against the search radius, in meters.
fn node_rating(max_node_distance: Length, distance: Length) -> f64 {
    (max_node_distance.meters() - distance.meters().round()).max(0.0)
}

/// Rates a candidate line against a location reference point given the
/// distance between them. Returns [`RatingScore::REJECTED`] when the bearing
/// of the candidate disqualifies it.
pub fn rate_candidate<LineId>(
    config: &DecoderConfig,
    lrp: &LocationReferencePoint,
    line: &Line<LineId>,
    distance: Length,
) -> RatingScore {
    let Some(bearing) = bearing_rating(
        lrp.line.bearing,
        line.bearing,
        config.max_bearing_difference,
    ) else {
        return RatingScore::REJECTED;
    };

    let node = node_rating(config.max_node_distance, distance);
    let line = frc_rating(lrp.line.frc, line.frc) + fow_rating(lrp.line.fow, line.fow) + bearing;

    RatingScore::from(node * config.node_factor + line * config.line_factor)
}

/// Breakdown of the attribute sub-ratings of a candidate line, for
/// diagnostics. The bearing rating is negative when the candidate would be
/// rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingDetails {
    pub bearing: f64,
    pub frc: f64,
    pub fow: f64,
}

pub fn rating_details<LineId>(
    config: &DecoderConfig,
    lrp: &LocationReferencePoint,
    line: &Line<LineId>,
) -> RatingDetails {
    RatingDetails {
        bearing: bearing_rating(
            lrp.line.bearing,
            line.bearing,
            config.max_bearing_difference,
        )
        .unwrap_or(-1.0),
        frc: frc_rating(lrp.line.frc, line.frc),
        fow: fow_rating(lrp.line.fow, line.fow),
    }
}
