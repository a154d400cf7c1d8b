//! Clock registers
//!
//! The SD3031-style clock core shares the module's register file at a
//! `0x30` base offset. All of these registers sit behind the RTC read
//! window, so reads are primed transparently by the transport.
//!
//! Time-of-day fields are BCD on the wire. The hour byte is special: its
//! encoding depends on the currently selected 12/24-hour system and is
//! therefore carried raw here, with the actual hour codec living in
//! [`crate::rtc`].

use core::convert::Infallible;

use bitflags::bitflags;
use regiface::{register, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

/// One BCD byte to its binary value.
pub(crate) fn bcd2bin(val: u8) -> u8 {
    val - 6 * (val >> 4)
}

/// A binary value in `0..=99` to one BCD byte.
pub(crate) fn bin2bcd(val: u8) -> u8 {
    val + 6 * (val / 10)
}

/// Timekeeping block (address: 0x30, 7 bytes)
///
/// Seconds through year, in write order. The chip refuses partial writes of
/// single time registers; the whole block is always transferred at once.
///
/// # Important Notes
/// - `hour` is the raw mode-encoded byte, not a binary hour
/// - `year` counts from 2000
/// - the weekday byte is stored by the chip but this driver never trusts it
///   when reading time back
#[register(0x30u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister, Default)]
pub struct TimeKeeping {
    pub second: u8,
    pub minute: u8,
    /// Raw hour byte; encoding depends on the active hour system
    pub hour: u8,
    /// Weekday index, 0 = Sunday
    pub weekday: u8,
    pub day: u8,
    pub month: u8,
    /// Years since 2000
    pub year: u8,
}

impl FromByteArray for TimeKeeping {
    type Error = Infallible;
    type Array = [u8; 7];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            second: bcd2bin(bytes[0]),
            minute: bcd2bin(bytes[1]),
            hour: bytes[2],
            weekday: bcd2bin(bytes[3]),
            day: bcd2bin(bytes[4]),
            month: bcd2bin(bytes[5]),
            year: bcd2bin(bytes[6]),
        })
    }
}

impl ToByteArray for TimeKeeping {
    type Error = Infallible;
    type Array = [u8; 7];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([
            bin2bcd(self.second),
            bin2bcd(self.minute),
            self.hour,
            bin2bcd(self.weekday),
            bin2bcd(self.day),
            bin2bcd(self.month),
            bin2bcd(self.year),
        ])
    }
}

/// Alarm block (address: 0x37, 8 bytes)
///
/// Serves both alarm shapes: a weekly alarm (weekday mask + time of day,
/// enable `0x0F`) and a date alarm (day/month/year, enable `0x70`). Unused
/// fields are left zero.
#[register(0x37u8)]
#[derive(Debug, Clone, Copy, WritableRegister, Default)]
pub struct AlarmBlock {
    pub second: u8,
    pub minute: u8,
    /// Raw hour byte, same encoding as [`TimeKeeping::hour`]
    pub hour: u8,
    /// Weekday mask, bit 0 = Sunday (not BCD)
    pub weekdays: u8,
    pub day: u8,
    pub month: u8,
    /// Years since 2000
    pub year: u8,
    /// Compare-enable byte selecting which fields arm the alarm
    pub enable: u8,
}

impl AlarmBlock {
    /// Compare on weekday mask + hour/minute/second.
    pub const ENABLE_WEEKLY: u8 = 0x0F;
    /// Compare on day/month/year.
    pub const ENABLE_DATE: u8 = 0x70;
}

impl ToByteArray for AlarmBlock {
    type Error = Infallible;
    type Array = [u8; 8];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([
            bin2bcd(self.second),
            bin2bcd(self.minute),
            self.hour,
            self.weekdays,
            bin2bcd(self.day),
            bin2bcd(self.month),
            bin2bcd(self.year),
            self.enable,
        ])
    }
}

/// Interrupt flag register (address: 0x3F)
///
/// Reading this register consumes the pending alarm/countdown flags; that
/// read is what re-arms the interrupt line after it fires.
#[register(0x3Fu8)]
#[derive(Debug, Clone, Copy, ReadableRegister, Default)]
pub struct InterruptFlags {
    /// A time or date alarm has fired
    pub alarm: bool,
    /// The countdown timer has expired
    pub countdown: bool,
}

impl FromByteArray for InterruptFlags {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            alarm: bytes[0] & 0x20 != 0,
            countdown: bytes[0] & 0x10 != 0,
        })
    }
}

bitflags! {
    /// Control register 2 bits
    ///
    /// Interrupt routing and the first write-unlock stage.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Control2Flags: u8 {
        /// Unlock writes to the clock register file
        const WRITE_ENABLE = 0x80;
        /// Select the periodic/countdown source
        const INT_PERIODIC = 0x20;
        /// Route the selected source to the interrupt pin
        const INT_SOURCE = 0x10;
        /// Enable the countdown interrupt
        const COUNTDOWN_INT = 0x04;
        /// Enable the alarm interrupt
        const ALARM_INT = 0x02;
    }
}

/// Control register 2 (address: 0x40)
#[register(0x40u8)]
#[derive(Debug, Clone, Copy, WritableRegister)]
pub struct Control2 {
    pub flags: Control2Flags,
}

impl ToByteArray for Control2 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.flags.bits()])
    }
}

bitflags! {
    /// Control register 3 bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Control3Flags: u8 {
        /// Second write-unlock stage
        const WRITE_ENABLE = 0x80;
        /// Gate off the 32 kHz clock output
        const DISABLE_32K = 0x40;
        /// Clock the countdown timer at 1 Hz
        const COUNTDOWN_1HZ = 0x20;
    }
}

/// Control register 3 (address: 0x41)
///
/// Readable as well: the 32 kHz output gate is toggled with a
/// read-modify-write to preserve the other bits.
#[register(0x41u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, WritableRegister)]
pub struct Control3 {
    pub flags: Control3Flags,
}

impl FromByteArray for Control3 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            flags: Control3Flags::from_bits_retain(bytes[0]),
        })
    }
}

impl ToByteArray for Control3 {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([self.flags.bits()])
    }
}

/// Countdown value register (address: 0x43, 3 bytes little-endian)
///
/// Only the low 24 bits are sent; callers clamp before constructing.
#[register(0x43u8)]
#[derive(Debug, Clone, Copy, WritableRegister, Default)]
pub struct CountdownValue {
    /// Countdown duration in seconds, at most `0xFF_FFFF`
    pub seconds: u32,
}

impl ToByteArray for CountdownValue {
    type Error = Infallible;
    type Array = [u8; 3];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([
            self.seconds as u8,
            (self.seconds >> 8) as u8,
            (self.seconds >> 16) as u8,
        ])
    }
}

/// Die temperature register (address: 0x46)
#[register(0x46u8)]
#[derive(Debug, Clone, Copy, ReadableRegister, Default)]
pub struct Temperature {
    /// Degrees Celsius, two's complement
    pub celsius: i8,
}

impl FromByteArray for Temperature {
    type Error = Infallible;
    type Array = [u8; 1];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            celsius: bytes[0] as i8,
        })
    }
}

/// Host interface control register (address: 0x47)
///
/// Written once with the enable bit during startup.
#[register(0x47u8)]
#[derive(Debug, Clone, Copy, WritableRegister, Default)]
pub struct HostInterfaceControl {
    pub enable: bool,
}

impl ToByteArray for HostInterfaceControl {
    type Error = Infallible;
    type Array = [u8; 1];

    fn to_bytes(self) -> Result<Self::Array, Self::Error> {
        Ok([(self.enable as u8) << 7])
    }
}

/// Battery voltage register (address: 0x4A, 2 bytes)
///
/// A 9-bit reading in centivolts: the top bit of the first byte carries
/// bit 8, the second byte the low bits.
#[register(0x4Au8)]
#[derive(Debug, Clone, Copy, ReadableRegister, Default)]
pub struct BatteryVoltage {
    pub centivolts: u16,
}

impl BatteryVoltage {
    /// Battery voltage in volts.
    pub fn volts(&self) -> f32 {
        self.centivolts as f32 / 100.0
    }
}

impl FromByteArray for BatteryVoltage {
    type Error = Infallible;
    type Array = [u8; 2];

    fn from_bytes(bytes: Self::Array) -> Result<Self, Self::Error> {
        Ok(Self {
            centivolts: (((bytes[0] & 0x80) as u16) << 1) | bytes[1] as u16,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bcd_round_trip() {
        for v in 0..=99u8 {
            assert_eq!(bcd2bin(bin2bcd(v)), v);
        }
    }

    #[test]
    fn timekeeping_decodes_bcd_fields() {
        let t = TimeKeeping::from_bytes([0x59, 0x30, 0xA3, 0x02, 0x31, 0x12, 0x22]).unwrap();
        assert_eq!(t.second, 59);
        assert_eq!(t.minute, 30);
        assert_eq!(t.hour, 0xA3); // raw, left to the hour codec
        assert_eq!(t.weekday, 2);
        assert_eq!(t.day, 31);
        assert_eq!(t.month, 12);
        assert_eq!(t.year, 22);
    }

    #[test]
    fn timekeeping_encodes_bcd_fields() {
        let t = TimeKeeping {
            second: 5,
            minute: 48,
            hour: 0x91,
            weekday: 6,
            day: 1,
            month: 10,
            year: 24,
        };
        assert_eq!(
            t.to_bytes().unwrap(),
            [0x05, 0x48, 0x91, 0x06, 0x01, 0x10, 0x24]
        );
    }

    #[test]
    fn control_bytes_match_chip_sequences() {
        let alarm_arm = Control2Flags::WRITE_ENABLE
            | Control2Flags::INT_SOURCE
            | Control2Flags::ALARM_INT;
        assert_eq!(alarm_arm.bits(), 0x92);

        let countdown_arm = Control2Flags::WRITE_ENABLE
            | Control2Flags::INT_PERIODIC
            | Control2Flags::INT_SOURCE
            | Control2Flags::COUNTDOWN_INT;
        assert_eq!(countdown_arm.bits(), 0xB4);
    }

    #[test]
    fn countdown_value_is_little_endian() {
        let v = CountdownValue { seconds: 0x0102_03 };
        assert_eq!(v.to_bytes().unwrap(), [0x03, 0x02, 0x01]);
    }

    #[test]
    fn battery_voltage_concatenates_ninth_bit() {
        let v = BatteryVoltage::from_bytes([0x80, 0x64]).unwrap();
        assert_eq!(v.centivolts, 356);
        assert!((v.volts() - 3.56).abs() < 1e-6);

        let v = BatteryVoltage::from_bytes([0x00, 0xFA]).unwrap();
        assert_eq!(v.centivolts, 250);
    }

    #[test]
    fn temperature_is_signed() {
        assert_eq!(Temperature::from_bytes([0xFF]).unwrap().celsius, -1);
        assert_eq!(Temperature::from_bytes([0x19]).unwrap().celsius, 25);
    }
}
