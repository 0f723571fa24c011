use base64::Engine;
use base64::prelude::BASE64_STANDARD;

use crate::binary::bits::BitReader;
use crate::binary::header::read_header;
use crate::binary::{
    CIRCLE_BASE_SIZE, DIMENSION_SIZE, LARGE_GRID_SIZE, LARGE_RECTANGLE_SIZE, LRP_SIZE,
    MIN_CLOSED_LINE_SIZE, MIN_LINE_SIZE, MIN_POLYGON_SIZE, RELATIVE_COORD_SIZE,
};
use crate::{
    Bearing, BinaryVersion, BoundingBox, CircleReference, ClosedLineReference, Coordinate,
    DeserializeError, Fow, Frc, GridReference, GridSize, Length, LineAttributes, LineReference,
    LocationReference, LocationReferencePoint, LocationType, Offset, Offsets, PathAttributes,
    PoiReference, PointAlongLineReference, PolygonReference, RectangleReference,
    SideOrOrientation,
};

/// Deserializes an OpenLR location reference encoded in Base64.
pub fn deserialize_base64_openlr(
    data: impl AsRef<[u8]>,
) -> Result<LocationReference, DeserializeError> {
    let data = BASE64_STANDARD.decode(data)?;
    deserialize_binary_openlr(&data)
}

/// Deserializes a binary representation of an OpenLR location reference.
pub fn deserialize_binary_openlr(data: &[u8]) -> Result<LocationReference, DeserializeError> {
    use LocationReference::*;

    let mut reader = OpenLrBinaryReader::new(data)?;

    match reader.location_type {
        LocationType::Line => Ok(Line(reader.read_line()?)),
        LocationType::GeoCoordinate => Ok(GeoCoordinate(reader.read_coordinate()?)),
        LocationType::PointAlongLine => Ok(PointAlongLine(reader.read_point_along_line()?)),
        LocationType::PoiWithAccessPoint => Ok(Poi(reader.read_poi()?)),
        LocationType::Circle => Ok(Circle(reader.read_circle()?)),
        LocationType::Rectangle => Ok(Rectangle(reader.read_rectangle()?)),
        LocationType::Grid => Ok(Grid(reader.read_grid()?)),
        LocationType::Polygon => Ok(Polygon(reader.read_polygon()?)),
        LocationType::ClosedLine => Ok(ClosedLine(reader.read_closed_line()?)),
    }
}

/// Reads the header of a binary location reference and returns its version
/// and location type without parsing the remaining fields.
pub fn classify_binary_openlr(
    data: &[u8],
) -> Result<(BinaryVersion, LocationType), DeserializeError> {
    let header = read_header(&mut BitReader::new(data))?;
    Ok((header.version, header.location_type))
}

#[derive(Debug)]
struct OpenLrBinaryReader<'a> {
    bits: BitReader<'a>,
    version: BinaryVersion,
    location_type: LocationType,
}

impl<'a> OpenLrBinaryReader<'a> {
    fn new(data: &'a [u8]) -> Result<Self, DeserializeError> {
        let mut bits = BitReader::new(data);
        let header = read_header(&mut bits)?;

        Ok(Self {
            bits,
            version: header.version,
            location_type: header.location_type,
        })
    }

    const fn num_bytes(&self) -> usize {
        self.bits.num_bytes()
    }

    fn read_line(&mut self) -> Result<LineReference, DeserializeError> {
        let intermediates = self.num_bytes().saturating_sub(MIN_LINE_SIZE) / LRP_SIZE;
        let mut points = Vec::with_capacity(intermediates + 2);

        let mut lrp = self.read_first_lrp()?;
        for _ in 0..intermediates {
            let next = self.read_intermediate_lrp(lrp.coords)?;
            points.push(lrp);
            lrp = next;
        }

        let (last, pos_flag, neg_flag) = self.read_last_lrp(lrp.coords)?;
        points.push(lrp);
        points.push(last);

        let offsets = Offsets {
            pos: self.read_offset(pos_flag)?,
            neg: self.read_offset(neg_flag)?,
        };

        Ok(LineReference {
            version: self.version,
            points,
            offsets,
        })
    }

    fn read_point_along_line(&mut self) -> Result<PointAlongLineReference, DeserializeError> {
        let first = self.read_first_lrp()?;
        let (last, pos_flag, _) = self.read_last_lrp(first.coords)?;
        let offset = self.read_offset(pos_flag)?;

        Ok(PointAlongLineReference {
            version: self.version,
            points: [first, last],
            offset,
        })
    }

    fn read_poi(&mut self) -> Result<PoiReference, DeserializeError> {
        let point = self.read_point_along_line()?;
        let poi = self.read_relative_coordinate(point.points[0].coords)?;
        Ok(PoiReference { point, poi })
    }

    fn read_circle(&mut self) -> Result<CircleReference, DeserializeError> {
        let radius_size = self.num_bytes() - CIRCLE_BASE_SIZE;
        let center = self.read_coordinate()?;
        let radius = self.bits.read_unsigned(radius_size as u32 * 8)?;

        Ok(CircleReference {
            center,
            radius: Length::radius_from_meters(radius),
        })
    }

    fn read_rectangle(&mut self) -> Result<RectangleReference, DeserializeError> {
        let lower_left = self.read_coordinate()?;

        let upper_right = if self.num_bytes() == LARGE_RECTANGLE_SIZE {
            self.read_coordinate()?
        } else {
            self.read_relative_coordinate(lower_left)?
        };

        Ok(RectangleReference {
            bbox: BoundingBox {
                lower_left,
                upper_right,
            },
        })
    }

    fn read_grid(&mut self) -> Result<GridReference, DeserializeError> {
        let lower_left = self.read_coordinate()?;

        let upper_right = if self.num_bytes() == LARGE_GRID_SIZE {
            self.read_coordinate()?
        } else {
            self.read_relative_coordinate(lower_left)?
        };

        let columns = self.bits.read_unsigned(DIMENSION_SIZE as u32 * 8)? as u16;
        let rows = self.bits.read_unsigned(DIMENSION_SIZE as u32 * 8)? as u16;

        Ok(GridReference {
            bbox: BoundingBox {
                lower_left,
                upper_right,
            },
            size: GridSize { columns, rows },
        })
    }

    fn read_polygon(&mut self) -> Result<PolygonReference, DeserializeError> {
        // the minimum polygon size covers the first corner plus two relative ones
        let relative_corners = 2 + (self.num_bytes() - MIN_POLYGON_SIZE) / RELATIVE_COORD_SIZE;
        let mut corners = Vec::with_capacity(1 + relative_corners);

        let mut coordinate = self.read_coordinate()?;
        corners.push(coordinate);

        for _ in 0..relative_corners {
            coordinate = self.read_relative_coordinate(coordinate)?;
            corners.push(coordinate);
        }

        Ok(PolygonReference { corners })
    }

    fn read_closed_line(&mut self) -> Result<ClosedLineReference, DeserializeError> {
        let intermediates = (self.num_bytes() - MIN_CLOSED_LINE_SIZE) / LRP_SIZE;
        let mut points = Vec::with_capacity(intermediates + 1);

        let mut lrp = self.read_first_lrp()?;
        for _ in 0..intermediates {
            let next = self.read_intermediate_lrp(lrp.coords)?;
            points.push(lrp);
            lrp = next;
        }
        points.push(lrp);

        // the closing line carries attributes only: FRC, FOW and bearing
        let _rfu = self.bits.read_unsigned(2)?;
        let frc = self.read_frc()?;
        let fow = self.read_fow()?;
        let _rfu = self.bits.read_unsigned(3)?;
        let bearing = Bearing::from_bits(self.bits.read_unsigned(5)?);

        Ok(ClosedLineReference {
            version: self.version,
            points,
            last_line: LineAttributes { frc, fow, bearing },
        })
    }

    fn read_coordinate(&mut self) -> Result<Coordinate, DeserializeError> {
        let lon = Coordinate::degrees_from_bit24(self.bits.read_signed(24)?);
        let lat = Coordinate::degrees_from_bit24(self.bits.read_signed(24)?);
        Ok(Coordinate { lon, lat })
    }

    fn read_relative_coordinate(
        &mut self,
        previous: Coordinate,
    ) -> Result<Coordinate, DeserializeError> {
        let lon = Coordinate::degrees_from_relative(self.bits.read_signed(16)?, previous.lon);
        let lat = Coordinate::degrees_from_relative(self.bits.read_signed(16)?, previous.lat);
        Ok(Coordinate { lon, lat })
    }

    fn read_frc(&mut self) -> Result<Frc, DeserializeError> {
        Ok(Frc::from_repr(self.bits.read_unsigned(3)? as u8).unwrap_or_default())
    }

    fn read_fow(&mut self) -> Result<Fow, DeserializeError> {
        Ok(Fow::from_repr(self.bits.read_unsigned(3)? as u8).unwrap_or_default())
    }

    /// Reads the side/orientation, FRC and FOW byte shared by every location
    /// reference point.
    fn read_first_attributes(
        &mut self,
    ) -> Result<(SideOrOrientation, Frc, Fow), DeserializeError> {
        let side_or_orientation =
            SideOrOrientation::from_repr(self.bits.read_unsigned(2)? as u8).unwrap_or_default();
        let frc = self.read_frc()?;
        let fow = self.read_fow()?;
        Ok((side_or_orientation, frc, fow))
    }

    fn read_lrp(
        &mut self,
        coords: Coordinate,
    ) -> Result<LocationReferencePoint, DeserializeError> {
        let (side_or_orientation, frc, fow) = self.read_first_attributes()?;
        let lfrcnp = self.read_frc()?;
        let bearing = Bearing::from_bits(self.bits.read_unsigned(5)?);
        let dnp = Length::from_interval(self.bits.read_unsigned(8)?);

        Ok(LocationReferencePoint {
            coords,
            line: LineAttributes { frc, fow, bearing },
            side_or_orientation,
            path: Some(PathAttributes { lfrcnp, dnp }),
        })
    }

    fn read_first_lrp(&mut self) -> Result<LocationReferencePoint, DeserializeError> {
        let coords = self.read_coordinate()?;
        self.read_lrp(coords)
    }

    fn read_intermediate_lrp(
        &mut self,
        previous: Coordinate,
    ) -> Result<LocationReferencePoint, DeserializeError> {
        let coords = self.read_relative_coordinate(previous)?;
        self.read_lrp(coords)
    }

    /// Reads the terminal point of a line: its attribute block replaces the
    /// path attributes with the offset presence flags.
    fn read_last_lrp(
        &mut self,
        previous: Coordinate,
    ) -> Result<(LocationReferencePoint, bool, bool), DeserializeError> {
        let coords = self.read_relative_coordinate(previous)?;
        let (side_or_orientation, frc, fow) = self.read_first_attributes()?;

        let _rfu = self.bits.read_unsigned(1)?;
        let pos_flag = self.bits.read_unsigned(1)? == 1;
        let neg_flag = self.bits.read_unsigned(1)? == 1;
        let bearing = Bearing::from_bits(self.bits.read_unsigned(5)?);

        let point = LocationReferencePoint {
            coords,
            line: LineAttributes { frc, fow, bearing },
            side_or_orientation,
            path: None,
        };

        Ok((point, pos_flag, neg_flag))
    }

    fn read_offset(&mut self, flag: bool) -> Result<Offset, DeserializeError> {
        if flag {
            Ok(Offset::from_interval(
                self.bits.read_unsigned(8)?,
                self.version,
            ))
        } else {
            Ok(Offset::zero(self.version))
        }
    }
}
