//! Calibration control and chip identity registers
//!
//! The custom glue registers of the module itself: GNSS-to-RTC calibration
//! control at `0x2A..=0x2F` and the read-only identity block at
//! `0xAA..=0xAF`.

use core::convert::Infallible;

use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

/// Product ID of the DFR1103 module.
pub const MODULE_PID: u16 = 0x444F;

/// Vendor ID of the DFR1103 module.
pub const MODULE_VID: u16 = 0x3343;

/// Firmware version this driver was written against.
pub const MODULE_VERSION: u16 = 0x0100;

/// Error type for an invalid calibration status byte
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationStateError {
    /// The value does not correspond to a known calibration state
    InvalidValue(u8),
}

/// GNSS-to-RTC calibration state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationState {
    /// No calibration pending or recorded
    None = 0x00,
    /// A calibration finished since the last status read
    Complete = 0x01,
    /// A calibration is currently running
    InProgress = 0x02,
}

impl TryFrom<u8> for CalibrationState {
    type Error = CalibrationStateError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(Self::None),
            0x01 => Ok(Self::Complete),
            0x02 => Ok(Self::InProgress),
            invalid => Err(CalibrationStateError::InvalidValue(invalid)),
        }
    }
}

/// Calibration status register (address: 0x2A)
///
/// # Important Notes
/// - Reading a `Complete` status resets it to `None` on the device side;
///   the read consumes the completion event
/// - Writing `InProgress` triggers an immediate calibration
/// - Writing `None` aborts a calibration that is underway
#[register(0x2Au8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct CalibrationStatus {
    pub state: CalibrationState,
}

impl FromByteArray for CalibrationStatus {
    type Error = CalibrationStateError;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            state: CalibrationState::try_from(bytes[0])?,
        })
    }
}

impl ToByteArray for CalibrationStatus {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.state as u8])
    }
}

/// Auto-calibration interval register (address: 0x2B)
///
/// Interval in hours between automatic GNSS time calibrations. Zero
/// disables the mechanism; a nonzero write also triggers an immediate
/// calibration on the device.
#[register(0x2Bu8)]
#[derive(Debug, Clone, Copy, WritableRegister, Default)]
pub struct CalibrationInterval {
    pub hours: u8,
}

impl ToByteArray for CalibrationInterval {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.hours])
    }
}

/// Product ID register (address: 0xAA, 2 bytes little-endian)
#[register(0xAAu8)]
#[derive(Debug, Clone, Copy, ReadableRegister, Default)]
pub struct ProductId {
    pub value: u16,
}

impl FromByteArray for ProductId {
    type Error = Infallible;
    type Array = [u8; 2];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            value: u16::from_le_bytes(bytes),
        })
    }
}

/// Vendor ID register (address: 0xAC, 2 bytes little-endian)
#[register(0xACu8)]
#[derive(Debug, Clone, Copy, ReadableRegister, Default)]
pub struct VendorId {
    pub value: u16,
}

impl FromByteArray for VendorId {
    type Error = Infallible;
    type Array = [u8; 2];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            value: u16::from_le_bytes(bytes),
        })
    }
}

/// Firmware version register (address: 0xAE, 2 bytes little-endian)
#[register(0xAEu8)]
#[derive(Debug, Clone, Copy, ReadableRegister, Default)]
pub struct FirmwareVersion {
    pub value: u16,
}

impl FromByteArray for FirmwareVersion {
    type Error = Infallible;
    type Array = [u8; 2];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            value: u16::from_le_bytes(bytes),
        })
    }
}

/// The module's identity block, read once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChipIdentity {
    pub pid: u16,
    pub vid: u16,
    pub version: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calibration_state_round_trip() {
        for state in [
            CalibrationState::None,
            CalibrationState::Complete,
            CalibrationState::InProgress,
        ] {
            let raw = CalibrationStatus { state }.to_bytes().unwrap();
            assert_eq!(CalibrationStatus::from_bytes(raw).unwrap().state, state);
        }
        assert_eq!(
            CalibrationStatus::from_bytes([0x03]).map(|s| s.state),
            Err(CalibrationStateError::InvalidValue(0x03))
        );
    }

    #[test]
    fn identity_words_are_little_endian() {
        assert_eq!(ProductId::from_bytes([0x4F, 0x44]).unwrap().value, MODULE_PID);
        assert_eq!(VendorId::from_bytes([0x43, 0x33]).unwrap().value, MODULE_VID);
        assert_eq!(
            FirmwareVersion::from_bytes([0x00, 0x01]).unwrap().value,
            MODULE_VERSION
        );
    }
}
