//! The decoder resolves a (map-dependent) location using its own map.
//! This map might differ from the one used during encoding.
//!
//! 1. Decode physical data and check its validity.
//! 2. For each location reference point find candidate nodes and lines.
//! 3. Rate candidate lines for each location reference point.
//! 4. Determine routes between subsequent location reference points,
//!    retrying with the next best candidate pair on failure.
//! 5. Concatenate the routes and trim the path according to the offsets.

pub(crate) mod candidates;
pub(crate) mod line;
pub(crate) mod point;
pub(crate) mod rating;
pub(crate) mod resolver;
pub(crate) mod route;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;

pub use candidates::{CandidateLine, CandidateLines, find_candidate_lines};
pub use line::decode_line;
pub use point::decode_point;
pub use rating::{RatingDetails, rate_candidate, rating_details};
pub use resolver::resolve_routes;
pub use route::{Route, Routes};

use crate::{
    DecodeError, DeserializeError, Length, Location, LocationReference, MapDatabase, RatingScore,
    deserialize_binary_openlr,
};

#[derive(Debug, Clone, Copy)]
pub struct DecoderConfig {
    /// Maximum distance from an LRP to the candidate nodes of the map.
    pub max_node_distance: Length,
    /// Variance added to the FRC of an LRP when filtering candidate lines
    /// and to its lowest FRC when routing to the next point.
    pub frc_variance: u8,
    /// Variance applied to the distance to the next point when bounding and
    /// validating the route between two LRPs.
    pub dnp_variance: Length,
    /// Minimum rating score for a line to be accepted as candidate.
    pub min_acceptance_rating: RatingScore,
    /// Maximum number of additional candidate pairs tried when the route
    /// between two LRPs cannot be resolved.
    pub max_retries: usize,
    /// Enables the direct search of candidate lines by projecting the LRP
    /// coordinates onto close-by lines.
    pub find_lines_directly: bool,
    /// Node weight applied by the rating function.
    pub node_factor: f64,
    /// Line weight applied by the rating function.
    pub line_factor: f64,
    /// Factor scaling the rating of projected candidate lines when the LRP
    /// also has node-anchored candidates.
    pub projected_line_factor: f64,
    /// Relative boost of a candidate pair whose first line continues the
    /// previously resolved route.
    pub connected_route_increase: f64,
    /// Relative degradation of a candidate pair using the same line on both
    /// ends of a non-final section of a line location.
    pub same_line_degradation: f64,
    /// Maximum difference between the LRP bearing sector and the candidate
    /// line bearing sector for the candidate to be accepted.
    pub max_bearing_difference: u8,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_node_distance: Length::from_meters(100.0),
            frc_variance: 2,
            dnp_variance: Length::from_meters(118.0),
            min_acceptance_rating: RatingScore::from(800.0),
            max_retries: 3,
            find_lines_directly: true,
            node_factor: 3.0,
            line_factor: 3.0,
            projected_line_factor: 0.95,
            connected_route_increase: 0.10,
            same_line_degradation: 0.10,
            max_bearing_difference: 8,
        }
    }
}

/// Decodes an OpenLR location reference encoded in Base64.
pub fn decode_base64_openlr<D: MapDatabase>(
    config: &DecoderConfig,
    database: &D,
    data: impl AsRef<[u8]>,
) -> Result<Location<D::LineId>, DecodeError> {
    let data = BASE64_STANDARD
        .decode(data)
        .map_err(DeserializeError::from)?;
    decode_binary_openlr(config, database, &data)
}

/// Decodes an OpenLR location reference encoded in binary.
pub fn decode_binary_openlr<D: MapDatabase>(
    config: &DecoderConfig,
    database: &D,
    data: &[u8],
) -> Result<Location<D::LineId>, DecodeError> {
    let location = deserialize_binary_openlr(data)?;
    decode(config, database, &location)
}

/// Decodes a parsed location reference against the map database.
///
/// Line locations resolve to a path of edges with head and tail offsets;
/// point-along-line and POI locations resolve to an access path with the
/// point offset on its first edge. Locations that are not bound to the road
/// network cannot be map-matched.
pub fn decode<D: MapDatabase>(
    config: &DecoderConfig,
    database: &D,
    location: &LocationReference,
) -> Result<Location<D::LineId>, DecodeError> {
    match location {
        LocationReference::Line(line) => {
            decode_line(config, database, line).map(Location::Line)
        }
        LocationReference::PointAlongLine(point) => {
            decode_point(config, database, point).map(Location::Point)
        }
        LocationReference::Poi(poi) => {
            decode_point(config, database, &poi.point).map(Location::Point)
        }
        other => Err(DecodeError::LocationTypeNotSupported(other.location_type())),
    }
}
