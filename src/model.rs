use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use approx::abs_diff_eq;
use ordered_float::OrderedFloat;
use strum::{EnumIter, FromRepr};

/// Functional Road Class.
/// The functional road class (FRC) of a line is a road classification
/// based on the importance of the road represented by the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, FromRepr, EnumIter)]
#[repr(u8)]
pub enum Frc {
    /// Main road, highest importance.
    Frc0 = 0,
    /// First class road.
    Frc1 = 1,
    /// Second class road.
    Frc2 = 2,
    /// Third class road.
    Frc3 = 3,
    /// Fourth class road.
    Frc4 = 4,
    /// Fifth class road.
    Frc5 = 5,
    /// Sixth class road.
    Frc6 = 6,
    /// Other class road, lowest importance.
    #[default]
    Frc7 = 7,
}

impl Frc {
    /// Loosens the class by the given variance, saturating at the lowest
    /// importance class.
    pub fn with_variance(self, variance: u8) -> Self {
        let loosened = (self as u8).saturating_add(variance).min(Self::Frc7 as u8);
        Self::from_repr(loosened).unwrap_or(Self::Frc7)
    }
}

/// Form of Way.
/// The form of way (FOW) describes the physical road type of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, FromRepr, EnumIter)]
#[repr(u8)]
pub enum Fow {
    /// The physical road type is unknown.
    Undefined = 0,
    /// Road for motorized vehicles only, with physically separated
    /// carriageways and no single level-crossings.
    Motorway = 1,
    /// Road with physically separated carriageways that is not a motorway.
    MultipleCarriageway = 2,
    /// Road without separated carriageways.
    SingleCarriageway = 3,
    /// Ring road on which traffic in only one direction is allowed.
    Roundabout = 4,
    /// Open area (partly) enclosed by roads which is used for non-traffic
    /// purposes and which is not a roundabout.
    TrafficSquare = 5,
    /// Road especially designed to enter or leave a line.
    SlipRoad = 6,
    /// The physical road type is known but fits no other category.
    #[default]
    Other = 7,
}

/// Two-bit auxiliary field of a location reference point.
///
/// When the point is bound to the side of a line it encodes the side of the
/// road; when it is bound to a point along a line it encodes the orientation
/// relative to the line direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, FromRepr)]
#[repr(u8)]
pub enum SideOrOrientation {
    /// On the road, no particular orientation, or not applicable.
    #[default]
    Unknown = 0,
    /// Right side of the road, or oriented with the line direction.
    RightOrWith = 1,
    /// Left side of the road, or oriented against the line direction.
    LeftOrAgainst = 2,
    /// Both sides of the road, or oriented in both directions.
    Both = 3,
}

/// The bearing describes the angle between the true North and the road.
/// The physical data format divides the compass into 32 sectors of 11.25°
/// each and stores the sector index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Bearing(u8);

impl Bearing {
    pub(crate) const SECTORS: u8 = 32;
    pub(crate) const SECTOR_DEGREES: f64 = 11.25;

    pub const fn from_sector(sector: u8) -> Self {
        Self(sector % Self::SECTORS)
    }

    pub const fn sector(&self) -> u8 {
        self.0
    }

    /// Midpoint of the encoded sector, in degrees from true North.
    pub fn degrees(&self) -> f64 {
        (f64::from(self.0) + 0.5) * Self::SECTOR_DEGREES
    }

    /// Circular sector difference folded to the short side of the compass.
    pub fn difference(&self, other: &Self) -> u8 {
        let difference = self.0.abs_diff(other.0);
        if difference > Self::SECTORS / 2 {
            Self::SECTORS - difference
        } else {
            difference
        }
    }
}

/// Length in meters.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Length(OrderedFloat<f64>);

impl Length {
    pub const ZERO: Self = Self(OrderedFloat(0.0));
    pub const MAX: Self = Self(OrderedFloat(f64::MAX));

    pub const fn from_meters(meters: f64) -> Self {
        Self(OrderedFloat(meters))
    }

    pub const fn meters(&self) -> f64 {
        self.0.0
    }

    pub fn round(self) -> Self {
        Self::from_meters(self.meters().round())
    }

    pub fn max(self, other: Self) -> Self {
        if self > other { self } else { other }
    }

    pub fn min(self, other: Self) -> Self {
        if self < other { self } else { other }
    }
}

impl fmt::Debug for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}m", self.meters())
    }
}

impl Add for Length {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::from_meters(self.meters() + rhs.meters())
    }
}

impl AddAssign for Length {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Length {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::from_meters(self.meters() - rhs.meters())
    }
}

impl SubAssign for Length {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul<f64> for Length {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::from_meters(self.meters() * rhs)
    }
}

impl Sum for Length {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// Score produced by the candidate rating function. Higher is better.
/// The sentinel [`RatingScore::REJECTED`] marks candidates whose bearing
/// disqualifies them regardless of the other attributes.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct RatingScore(OrderedFloat<f64>);

impl RatingScore {
    pub const REJECTED: Self = Self(OrderedFloat(-1.0));

    pub const fn value(&self) -> f64 {
        self.0.0
    }

    pub fn round(self) -> Self {
        Self::from(self.value().round())
    }
}

impl fmt::Debug for RatingScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl From<f64> for RatingScore {
    fn from(value: f64) -> Self {
        Self(OrderedFloat(value))
    }
}

impl Mul for RatingScore {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self::from(self.value() * rhs.value())
    }
}

impl Mul<f64> for RatingScore {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::from(self.value() * rhs)
    }
}

/// Coordinate pair stands for a pair of WGS84 longitude (lon) and latitude
/// (lat) values specifying a geometric point in a digital map.
#[derive(Debug, Clone, Copy, Default)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    /// Tolerance of the 24 bit wire reconstruction.
    pub const EPSILON: f64 = 1e-10;
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        abs_diff_eq!(self.lon, other.lon, epsilon = Self::EPSILON)
            && abs_diff_eq!(self.lat, other.lat, epsilon = Self::EPSILON)
    }
}

/// Line attributes are part of a location reference point and consist of
/// functional road class (FRC), form of way (FOW) and bearing (BEAR) data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineAttributes {
    pub frc: Frc,
    pub fow: Fow,
    pub bearing: Bearing,
}

/// The path attributes are part of every location reference point except the
/// last one, and consist of the lowest functional road class to the next
/// point (LFRCNP) and the distance to the next point (DNP).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PathAttributes {
    /// Lowest functional road class to next point.
    pub lfrcnp: Frc,
    /// Distance to next point.
    pub dnp: Length,
}

/// The basis of a location reference is a sequence of location reference
/// points (LRPs). An LRP binds the location to the road network: its
/// coordinates refer to a node of a line or to a point on a line, and the
/// attached attributes describe the line at that point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LocationReferencePoint {
    pub coords: Coordinate,
    pub line: LineAttributes,
    pub side_or_orientation: SideOrOrientation,
    /// `None` exactly on the terminal point of the reference.
    pub path: Option<PathAttributes>,
}

/// Version of the physical data format a reference was encoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum BinaryVersion {
    V2 = 2,
    V3 = 3,
}

/// Offset trimming the location reference path at one of its ends.
///
/// The physical format changed the offset semantic between versions: version
/// 2 stores a distance in meters while version 3 stores a percentage of the
/// sub-path the offset applies to. The parsed reference keeps the raw
/// semantic and the decoder converts to edge-space meters when resolving.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Offset {
    /// Distance in meters (version 2).
    Meters(Length),
    /// Percentage of the sub-path length, in the 0..100 range (version 3).
    Percent(f64),
}

impl Offset {
    pub const fn zero(version: BinaryVersion) -> Self {
        match version {
            BinaryVersion::V2 => Self::Meters(Length::ZERO),
            BinaryVersion::V3 => Self::Percent(0.0),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Self::Meters(meters) => *meters == Length::ZERO,
            Self::Percent(percent) => *percent == 0.0,
        }
    }
}

/// Positive (head side) and negative (tail side) offsets of a line location.
/// A missing offset in the wire means an offset of zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Offsets {
    pub pos: Offset,
    pub neg: Offset,
}

impl Offsets {
    pub const fn zero(version: BinaryVersion) -> Self {
        Self {
            pos: Offset::zero(version),
            neg: Offset::zero(version),
        }
    }
}

/// A line location reference describes a path within a map as a sequence of
/// at least two location reference points plus offset data.
#[derive(Debug, Clone, PartialEq)]
pub struct LineReference {
    pub version: BinaryVersion,
    pub points: Vec<LocationReferencePoint>,
    pub offsets: Offsets,
}

/// Point along line is a point location defined by a line and an offset
/// along it. The line is referenced by two location reference points.
#[derive(Debug, Clone, PartialEq)]
pub struct PointAlongLineReference {
    pub version: BinaryVersion,
    pub points: [LocationReferencePoint; 2],
    pub offset: Offset,
}

impl PointAlongLineReference {
    /// Orientation of the point relative to the line direction.
    pub const fn orientation(&self) -> SideOrOrientation {
        self.points[0].side_or_orientation
    }

    /// Side of the road the point lies on.
    pub const fn side(&self) -> SideOrOrientation {
        self.points[1].side_or_orientation
    }
}

/// Point of interest with an access point along a line. The access point on
/// the line is referenced like a point-along-line location and the point of
/// interest itself by a coordinate pair off the network.
#[derive(Debug, Clone, PartialEq)]
pub struct PoiReference {
    pub point: PointAlongLineReference,
    pub poi: Coordinate,
}

/// A circle location is given by the position of the center, which can be
/// everywhere on the surface, and a radius in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleReference {
    pub center: Coordinate,
    pub radius: Length,
}

/// Geographic bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingBox {
    pub lower_left: Coordinate,
    pub upper_right: Coordinate,
}

/// A rectangle location reference covers the area of its bounding box. The
/// second corner travels in absolute format (large rectangle) or relative
/// format (standard rectangle).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectangleReference {
    pub bbox: BoundingBox,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridSize {
    pub columns: u16,
    pub rows: u16,
}

/// A grid location multiplies a base rectangle to the North (rows) and to
/// the East (columns); the bounding box describes the base cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridReference {
    pub bbox: BoundingBox,
    pub size: GridSize,
}

/// A polygon location is a non-intersecting shape defined by a sequence of
/// corner coordinates, closed between the last and the first corner.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonReference {
    pub corners: Vec<Coordinate>,
}

/// A closed line location references the area bounded by a circuit in the
/// road network. The closing line is described by its attributes only.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosedLineReference {
    pub version: BinaryVersion,
    pub points: Vec<LocationReferencePoint>,
    pub last_line: LineAttributes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum LocationType {
    Line = 0,
    GeoCoordinate = 1,
    PointAlongLine = 2,
    PoiWithAccessPoint = 3,
    Circle = 4,
    Rectangle = 5,
    Grid = 6,
    Polygon = 7,
    ClosedLine = 8,
}

/// A parsed OpenLR location reference.
///
/// OpenLR can reference locations bound to the road network (line locations,
/// points along a line) as well as locations which can be everywhere on
/// earth (geo-coordinates, area shapes). Network-bound locations are covered
/// by a concatenation of shortest-paths, each specified by a pair of
/// subsequent location reference points; the concatenation may be longer
/// than the location itself and offsets trim it down.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationReference {
    // Line locations
    Line(LineReference),
    // Point locations
    GeoCoordinate(Coordinate),
    PointAlongLine(PointAlongLineReference),
    Poi(PoiReference),
    // Area locations
    Circle(CircleReference),
    Rectangle(RectangleReference),
    Grid(GridReference),
    Polygon(PolygonReference),
    ClosedLine(ClosedLineReference),
}

impl LocationReference {
    pub const fn location_type(&self) -> LocationType {
        match self {
            Self::Line(_) => LocationType::Line,
            Self::GeoCoordinate(_) => LocationType::GeoCoordinate,
            Self::PointAlongLine(_) => LocationType::PointAlongLine,
            Self::Poi(_) => LocationType::PoiWithAccessPoint,
            Self::Circle(_) => LocationType::Circle,
            Self::Rectangle(_) => LocationType::Rectangle,
            Self::Grid(_) => LocationType::Grid,
            Self::Polygon(_) => LocationType::Polygon,
            Self::ClosedLine(_) => LocationType::ClosedLine,
        }
    }
}
