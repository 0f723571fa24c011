//! Physical (binary) format of OpenLR location references.
//!
//! A reference is a single contiguous byte buffer, optionally Base64
//! encoded. One header byte carries the format version and the flags the
//! location type is derived from; the remaining bytes are bit-packed
//! big-endian fields whose layout depends on the location type and on the
//! total byte count.

mod bits;
mod encoding;
mod header;
mod reader;

pub use reader::{classify_binary_openlr, deserialize_base64_openlr, deserialize_binary_openlr};

/// Size in bytes of the header.
pub(crate) const HEADER_SIZE: usize = 1;
/// Size in bytes of an absolute coordinate pair (2 x 24 bit).
pub(crate) const ABS_COORD_SIZE: usize = 6;
/// Size in bytes of a relative coordinate pair (2 x 16 bit).
pub(crate) const RELATIVE_COORD_SIZE: usize = 4;
/// Size in bytes of the first location reference point.
pub(crate) const FIRST_LRP_SIZE: usize = 9;
/// Size in bytes of an intermediate location reference point.
pub(crate) const LRP_SIZE: usize = 7;
/// Size in bytes of the last location reference point of a line.
pub(crate) const LAST_LRP_SIZE: usize = 6;
/// Size in bytes of an offset field.
pub(crate) const OFFSET_SIZE: usize = 1;
/// Size in bytes of a grid dimension field.
pub(crate) const DIMENSION_SIZE: usize = 2;

pub(crate) const GEOCOORD_SIZE: usize = HEADER_SIZE + ABS_COORD_SIZE;
pub(crate) const MIN_LINE_SIZE: usize = HEADER_SIZE + FIRST_LRP_SIZE + LAST_LRP_SIZE;
pub(crate) const MIN_CLOSED_LINE_SIZE: usize = HEADER_SIZE + FIRST_LRP_SIZE + 2;
pub(crate) const POINT_ALONG_LINE_SIZE: usize = HEADER_SIZE + FIRST_LRP_SIZE + LAST_LRP_SIZE;
pub(crate) const POI_SIZE: usize = POINT_ALONG_LINE_SIZE + RELATIVE_COORD_SIZE;
pub(crate) const CIRCLE_BASE_SIZE: usize = HEADER_SIZE + ABS_COORD_SIZE;
pub(crate) const MAX_RADIUS_SIZE: usize = 4;
pub(crate) const RECTANGLE_SIZE: usize = HEADER_SIZE + ABS_COORD_SIZE + RELATIVE_COORD_SIZE;
pub(crate) const LARGE_RECTANGLE_SIZE: usize = HEADER_SIZE + 2 * ABS_COORD_SIZE;
pub(crate) const GRID_SIZE: usize = RECTANGLE_SIZE + 2 * DIMENSION_SIZE;
pub(crate) const LARGE_GRID_SIZE: usize = LARGE_RECTANGLE_SIZE + 2 * DIMENSION_SIZE;
pub(crate) const MIN_POLYGON_SIZE: usize = HEADER_SIZE + ABS_COORD_SIZE + 2 * RELATIVE_COORD_SIZE;
