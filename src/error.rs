use thiserror::Error;

use crate::{Length, LocationReferencePoint, LocationType};

#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum DeserializeError {
    #[error("OpenLR invalid Base64")]
    InvalidBase64,
    #[error("OpenLR data size of {0} bytes is not consistent with any location type")]
    InvalidDataSize(usize),
    #[error("OpenLR binary version {0} not supported")]
    VersionNotSupported(u8),
    #[error("OpenLR header is not valid: {0:08b}")]
    InvalidHeader(u8),
}

impl From<base64::DecodeError> for DeserializeError {
    fn from(_: base64::DecodeError) -> Self {
        Self::InvalidBase64
    }
}

/// Errors raised by the map database while searching for a route between two
/// candidate lines. All of them let the decoder retry with the next best
/// candidate pair before giving up.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum RouteError {
    #[error("no route exists between the candidate lines")]
    NotFound,
    #[error("the route could not be constructed")]
    ConstructionFailed,
    #[error("the route length is outside the bounds allowed by the reference")]
    InvalidLength,
}

#[derive(Error, Debug, PartialEq, Clone)]
pub enum DecodeError {
    #[error(transparent)]
    Deserialize(#[from] DeserializeError),
    #[error("OpenLR location type {0:?} cannot be resolved against a map")]
    LocationTypeNotSupported(LocationType),
    #[error("no candidate lines found for {0:?}")]
    CandidatesNotFound(LocationReferencePoint),
    #[error("no route found between subsequent location reference points")]
    RouteNotFound,
    #[error("the location route could not be constructed")]
    RouteConstructionFailed,
    #[error("offsets ({0:?}, {1:?}) do not fit the location path")]
    InvalidOffsets(Length, Length),
}
