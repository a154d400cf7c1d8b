//! GNSS registers
//!
//! The L76K-style GNSS core occupies the low end of the shared register
//! file (`0x00..=0x23`). The device parses NMEA itself and exposes the
//! results as fixed-layout binary registers; nothing here touches sentence
//! text except the raw bulk-data register used for pass-through retrieval.

use core::convert::Infallible;

use bitflags::bitflags;
use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

/// Bulk NMEA data register (address: 0x21)
///
/// A cursor register: the chip serves the next payload byte on every read
/// of this same address. The transports special-case it accordingly.
pub(crate) const REG_ALL_DATA: u8 = 0x21;

/// Value written to the measurement trigger to latch a fresh data snapshot.
const MEASUREMENT_TRIGGER: u8 = 0x55;

/// Upper bound the device ever reports for a bulk data payload.
pub(crate) const MAX_DATA_LEN: u16 = 1224;

/// UTC date register (address: 0x00, 4 bytes)
#[register(0x00u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, Default)]
pub struct UtcDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl FromByteArray for UtcDate {
    type Error = Infallible;
    type Array = [u8; 4];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            year: u16::from_be_bytes([bytes[0], bytes[1]]),
            month: bytes[2],
            day: bytes[3],
        })
    }
}

/// UTC time-of-day register (address: 0x04, 3 bytes)
#[register(0x04u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, Default)]
pub struct UtcTime {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl FromByteArray for UtcTime {
    type Error = Infallible;
    type Array = [u8; 3];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            hour: bytes[0],
            minute: bytes[1],
            second: bytes[2],
        })
    }
}

/// Error type for an unrecognized hemisphere byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionError {
    /// The byte is not one of `N`/`S`/`E`/`W`
    InvalidValue(u8),
}

/// Hemisphere of a coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    North = b'N' as isize,
    South = b'S' as isize,
    East = b'E' as isize,
    West = b'W' as isize,
}

impl TryFrom<u8> for Direction {
    type Error = DirectionError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            b'N' => Ok(Self::North),
            b'S' => Ok(Self::South),
            b'E' => Ok(Self::East),
            b'W' => Ok(Self::West),
            invalid => Err(DirectionError::InvalidValue(invalid)),
        }
    }
}

/// One raw coordinate as the device reports it
///
/// Degrees, whole minutes and fractional minutes are kept as the three raw
/// integer components; the floating-point views are computed on demand so
/// the derived values can never drift from the raw fix.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Coordinate {
    /// Whole degrees (0-90 latitude, 0-180 longitude)
    pub degrees: u8,
    /// Whole minutes, 0-59
    pub minutes: u8,
    /// Fractional minutes in units of 1e-5 minutes, 0-99 999
    pub fraction: u32,
    /// Hemisphere; magnitudes below are always positive
    pub direction: Direction,
}

impl Coordinate {
    fn from_raw(bytes: &[u8; 6]) -> Result<Self, DirectionError> {
        Ok(Self {
            degrees: bytes[0],
            minutes: bytes[1],
            fraction: u32::from_be_bytes([0, bytes[2], bytes[3], bytes[4]]),
            direction: Direction::try_from(bytes[5])?,
        })
    }

    /// True decimal degrees: `d + m/60 + f/1e5/60`.
    pub fn decimal_degrees(&self) -> f64 {
        self.degrees as f64
            + self.minutes as f64 / 60.0
            + self.fraction as f64 / 100_000.0 / 60.0
    }

    /// The packed degree-minute value `d*100 + m + f/1e5`, as used in NMEA
    /// sentences. Not interchangeable with [`Self::decimal_degrees`].
    pub fn degree_minutes(&self) -> f64 {
        self.degrees as f64 * 100.0 + self.minutes as f64 + self.fraction as f64 / 100_000.0
    }
}

/// Latitude fix register (address: 0x07, 6 bytes)
#[register(0x07u8)]
#[derive(Debug, Clone, Copy, PartialEq, ReadableRegister)]
pub struct Latitude {
    pub coordinate: Coordinate,
}

impl FromByteArray for Latitude {
    type Error = DirectionError;
    type Array = [u8; 6];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            coordinate: Coordinate::from_raw(&bytes)?,
        })
    }
}

/// Longitude fix register (address: 0x0D, 6 bytes)
#[register(0x0Du8)]
#[derive(Debug, Clone, Copy, PartialEq, ReadableRegister)]
pub struct Longitude {
    pub coordinate: Coordinate,
}

impl FromByteArray for Longitude {
    type Error = DirectionError;
    type Array = [u8; 6];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            coordinate: Coordinate::from_raw(&bytes)?,
        })
    }
}

/// Satellites-in-use register (address: 0x13)
#[register(0x13u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, Default)]
pub struct SatellitesUsed {
    pub count: u8,
}

impl FromByteArray for SatellitesUsed {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self { count: bytes[0] })
    }
}

/// Shared 3-byte fixed-point decode: whole part in 15 bits, hundredths in
/// the last byte. The high bit of the first byte is reserved and masked.
fn fixed_point(bytes: [u8; 3]) -> f32 {
    ((((bytes[0] & 0x7F) as u16) << 8) | bytes[1] as u16) as f32 + bytes[2] as f32 / 100.0
}

/// Altitude register (address: 0x14, 3 bytes)
#[register(0x14u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, Default)]
pub struct Altitude {
    pub meters: f32,
}

impl FromByteArray for Altitude {
    type Error = Infallible;
    type Array = [u8; 3];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            meters: fixed_point(bytes),
        })
    }
}

/// Speed-over-ground register (address: 0x17, 3 bytes)
#[register(0x17u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, Default)]
pub struct GroundSpeed {
    pub knots: f32,
}

impl FromByteArray for GroundSpeed {
    type Error = Infallible;
    type Array = [u8; 3];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            knots: fixed_point(bytes),
        })
    }
}

/// Course-over-ground register (address: 0x1A, 3 bytes)
#[register(0x1Au8)]
#[derive(Debug, Clone, Copy, ReadableRegister, Default)]
pub struct GroundCourse {
    pub degrees: f32,
}

impl FromByteArray for GroundCourse {
    type Error = Infallible;
    type Array = [u8; 3];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            degrees: fixed_point(bytes),
        })
    }
}

/// Measurement trigger register (address: 0x1D)
///
/// Writing latches a fresh snapshot of the bulk NMEA data and its length.
#[register(0x1Du8)]
#[derive(Debug, Clone, Copy, WritableRegister, Default)]
pub struct StartMeasurement;

impl ToByteArray for StartMeasurement {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([MEASUREMENT_TRIGGER])
    }
}

/// Bulk data length register (address: 0x1F, 2 bytes big-endian)
#[register(0x1Fu8)]
#[derive(Debug, Clone, Copy, ReadableRegister, Default)]
pub struct DataLength {
    pub bytes: u16,
}

impl FromByteArray for DataLength {
    type Error = Infallible;
    type Array = [u8; 2];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            bytes: u16::from_be_bytes(bytes),
        })
    }
}

bitflags! {
    /// Satellite constellations the receiver may track
    ///
    /// The register value is the mask itself; the seven legal values are
    /// the non-empty combinations (1 through 7).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Constellation: u8 {
        const GPS = 0x01;
        const BEIDOU = 0x02;
        const GLONASS = 0x04;
    }
}

/// Constellation selection register (address: 0x22)
#[register(0x22u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct GnssMode {
    pub constellation: Constellation,
}

impl FromByteArray for GnssMode {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            constellation: Constellation::from_bits_truncate(bytes[0]),
        })
    }
}

impl ToByteArray for GnssMode {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.constellation.bits()])
    }
}

/// Receiver power control register (address: 0x23)
#[register(0x23u8)]
#[derive(Debug, Clone, Copy, WritableRegister)]
pub struct PowerControl {
    /// `true` powers the receiver, `false` puts it to sleep
    pub enabled: bool,
}

impl ToByteArray for PowerControl {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([!self.enabled as u8])
    }
}
