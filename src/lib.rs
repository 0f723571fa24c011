#![doc = include_str!("../README.md")]

mod binary;
mod database;
mod decoder;
mod error;
#[cfg(feature = "geo")]
mod geo;
mod location;
mod model;

pub use binary::{classify_binary_openlr, deserialize_base64_openlr, deserialize_binary_openlr};
pub use database::{BearingDirection, Line, MapDatabase, Node};
pub use decoder::{
    CandidateLine, CandidateLines, DecoderConfig, RatingDetails, Route, Routes, decode,
    decode_base64_openlr, decode_binary_openlr, decode_line, decode_point, find_candidate_lines,
    rate_candidate, rating_details, resolve_routes,
};
pub use error::{DecodeError, DeserializeError, RouteError};
pub use location::{Edge, LineLocationPath, Location, PointLocationPath};
pub use model::{
    Bearing, BinaryVersion, BoundingBox, CircleReference, ClosedLineReference, Coordinate, Fow,
    Frc, GridReference, GridSize, Length, LineAttributes, LineReference, LocationReference,
    LocationReferencePoint, LocationType, Offset, Offsets, PathAttributes,
    PointAlongLineReference, PoiReference, PolygonReference, RatingScore, RectangleReference,
    SideOrOrientation,
};
