use crate::binary::bits::BitReader;
use crate::binary::{
    CIRCLE_BASE_SIZE, GEOCOORD_SIZE, GRID_SIZE, LARGE_GRID_SIZE, LARGE_RECTANGLE_SIZE,
    MAX_RADIUS_SIZE, MIN_CLOSED_LINE_SIZE, MIN_POLYGON_SIZE, OFFSET_SIZE, POI_SIZE,
    POINT_ALONG_LINE_SIZE, RECTANGLE_SIZE,
};
use crate::{BinaryVersion, DeserializeError, LocationType};

const AREA_CODE_CIRCLE: u32 = 0;
const AREA_CODE_POLYGON: u32 = 1;
const AREA_CODE_RECTANGLE: u32 = 2;

/// Decoded header byte of a location reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Header {
    pub(crate) version: BinaryVersion,
    pub(crate) location_type: LocationType,
}

/// Reads the header byte and derives the location type from the flags and
/// the total byte count.
///
/// The flag bits interleave the two area-flag bits with the point flag:
/// `RFU(1) | ARF_hi(1) | PF(1) | ARF_lo(1) | AF(1) | VER(3)`, most
/// significant bit first.
pub(crate) fn read_header(bits: &mut BitReader<'_>) -> Result<Header, DeserializeError> {
    let total_bytes = bits.num_bytes();
    if total_bytes < GEOCOORD_SIZE {
        return Err(DeserializeError::InvalidDataSize(total_bytes));
    }

    let rfu = bits.read_unsigned(1)?;
    let arf_hi = bits.read_unsigned(1)?;
    let pf = bits.read_unsigned(1)?;
    let arf_lo = bits.read_unsigned(1)?;
    let af = bits.read_unsigned(1)?;
    let ver = bits.read_unsigned(3)?;

    let version = match ver {
        2 => BinaryVersion::V2,
        3 => BinaryVersion::V3,
        _ => return Err(DeserializeError::VersionNotSupported(ver as u8)),
    };

    let header_byte = ((rfu << 7) | (arf_hi << 6) | (pf << 5) | (arf_lo << 4) | (af << 3) | ver) as u8;

    let area_code = 2 * arf_hi + arf_lo;
    let is_point = pf == 1;
    let has_attributes = af == 1;
    let is_area = area_code > 0 || (!is_point && !has_attributes);

    let location_type = if !is_point && !is_area && has_attributes {
        LocationType::Line
    } else if is_point && !is_area {
        if !has_attributes {
            if total_bytes != GEOCOORD_SIZE {
                return Err(DeserializeError::InvalidDataSize(total_bytes));
            }
            LocationType::GeoCoordinate
        } else if total_bytes == POINT_ALONG_LINE_SIZE
            || total_bytes == POINT_ALONG_LINE_SIZE + OFFSET_SIZE
        {
            LocationType::PointAlongLine
        } else if total_bytes == POI_SIZE || total_bytes == POI_SIZE + OFFSET_SIZE {
            LocationType::PoiWithAccessPoint
        } else {
            return Err(DeserializeError::InvalidDataSize(total_bytes));
        }
    } else if is_area && !is_point && has_attributes {
        if total_bytes < MIN_CLOSED_LINE_SIZE {
            return Err(DeserializeError::InvalidDataSize(total_bytes));
        }
        LocationType::ClosedLine
    } else {
        match area_code {
            AREA_CODE_CIRCLE => {
                let radius_size = total_bytes.saturating_sub(CIRCLE_BASE_SIZE);
                if radius_size == 0 || radius_size > MAX_RADIUS_SIZE {
                    return Err(DeserializeError::InvalidDataSize(total_bytes));
                }
                LocationType::Circle
            }
            AREA_CODE_RECTANGLE => {
                // the rectangle code also covers grids, disambiguated by size
                if total_bytes == RECTANGLE_SIZE || total_bytes == LARGE_RECTANGLE_SIZE {
                    LocationType::Rectangle
                } else if total_bytes == GRID_SIZE || total_bytes == LARGE_GRID_SIZE {
                    LocationType::Grid
                } else {
                    return Err(DeserializeError::InvalidDataSize(total_bytes));
                }
            }
            AREA_CODE_POLYGON if !has_attributes => {
                if total_bytes < MIN_POLYGON_SIZE {
                    return Err(DeserializeError::InvalidDataSize(total_bytes));
                }
                LocationType::Polygon
            }
            _ => return Err(DeserializeError::InvalidHeader(header_byte)),
        }
    };

    Ok(Header {
        version,
        location_type,
    })
}
