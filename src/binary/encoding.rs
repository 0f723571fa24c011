//! Conversions between the bit-packed wire integers and their physical
//! units. Distance and offset fields travel as interval indices; the decoded
//! value is the midpoint of the interval.

use crate::{Bearing, BinaryVersion, Coordinate, Length, Offset};

impl Coordinate {
    /// Factor converting lat/lon degrees into their 24 bit representation.
    const BIT24_FACTOR: f64 = 46603.377778;
    /// Factor converting degrees into deca-micro degrees.
    const DECA_MICRO_DEG_FACTOR: f64 = 100000.0;

    /// Returns degrees from a 24 bit integer representation. The half unit
    /// step compensates the encoder's midpoint-of-interval convention.
    pub(crate) fn degrees_from_bit24(value: i32) -> f64 {
        let value = f64::from(value);
        (value - signum(value) * 0.5) / Self::BIT24_FACTOR
    }

    /// Returns degrees from a 16 bit offset relative to a previously decoded
    /// coordinate, expressed in deca-micro degrees.
    pub(crate) fn degrees_from_relative(value: i32, previous: f64) -> f64 {
        previous + f64::from(value) / Self::DECA_MICRO_DEG_FACTOR
    }
}

impl Length {
    /// The 8 bit distance fields partition 0..15000m into 256 intervals of
    /// approximately 58.6 meters each.
    const DISTANCE_PER_INTERVAL: f64 = 58.6;

    /// Returns the distance estimate for an 8 bit interval index, rounded
    /// once at the end.
    pub(crate) fn from_interval(interval: u32) -> Self {
        Self::from_meters(((f64::from(interval) + 0.5) * Self::DISTANCE_PER_INTERVAL).round())
    }

    pub(crate) fn radius_from_meters(meters: u32) -> Self {
        Self::from_meters(f64::from(meters))
    }
}

impl Offset {
    /// Percentage of the path covered by one of the 256 offset buckets.
    const RELATIVE_OFFSET_LENGTH: f64 = 0.390625;

    /// Returns the offset estimate for an 8 bit bucket index, in the raw
    /// semantic of the given binary version.
    pub(crate) fn from_interval(interval: u32, version: BinaryVersion) -> Self {
        match version {
            BinaryVersion::V2 => Self::Meters(Length::from_interval(interval)),
            BinaryVersion::V3 => {
                Self::Percent((f64::from(interval) + 0.5) * Self::RELATIVE_OFFSET_LENGTH)
            }
        }
    }
}

impl Bearing {
    pub(crate) fn from_bits(bits: u32) -> Self {
        Self::from_sector(bits as u8)
    }
}

const fn signum(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { value.signum() }
}
