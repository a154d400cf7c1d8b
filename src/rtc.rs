//! Clock operations
//!
//! Calendar/time codec and the operations backed by the SD3031-style clock
//! core: time of day, 12/24-hour system handling, alarms, countdown timer,
//! battery/temperature readouts and the SRAM scratch space.
//!
//! # Hour encoding
//! The chip stores the hour byte differently per hour system. In 24-hour
//! mode the byte is `BCD | 0x80`. In 12-hour mode bit 5 carries PM and the
//! low five bits the BCD hour, with midnight stored as `12` and noon as
//! `12 PM`. All encode/decode paths go through the held [`HourMode`] so a
//! driver instance and its chip never disagree silently.

use bitflags::bitflags;

use crate::interface::{Error, Interface};
use crate::registers::rtc::{
    bcd2bin, bin2bcd, AlarmBlock, BatteryVoltage, Control2, Control2Flags, Control3,
    Control3Flags, CountdownValue, InterruptFlags, Temperature, TimeKeeping,
};
use crate::Device;

/// First register of the general-purpose SRAM scratch range.
const SRAM_START: u8 = 0x2C;

/// Last register of the general-purpose SRAM scratch range.
const SRAM_END: u8 = 0x71;

/// Value [`Device::clear_sram`] writes into a scratch byte.
const SRAM_CLEAR: u8 = 0xFF;

/// Largest countdown the 3-byte countdown register can hold, in seconds.
const COUNTDOWN_MAX: u32 = 0xFF_FFFF;

/// Hour system a driver instance encodes time against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HourMode {
    /// 12-hour clock with AM/PM flag
    Hour12,
    /// 24-hour clock (chip power-on default)
    Hour24,
}

impl HourMode {
    /// The mode a stored hour byte was encoded under (bit 7 = 24-hour).
    fn of_encoded(raw: u8) -> Self {
        if raw & 0x80 != 0 {
            Self::Hour24
        } else {
            Self::Hour12
        }
    }
}

/// AM/PM half of a 12-hour clock reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Meridian {
    Am,
    Pm,
}

/// Day of the week, Sunday-indexed to match the chip's weekday byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Weekday {
    Sunday = 0,
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
    Saturday = 6,
}

impl Weekday {
    fn from_index(index: u8) -> Self {
        match index {
            0 => Self::Sunday,
            1 => Self::Monday,
            2 => Self::Tuesday,
            3 => Self::Wednesday,
            4 => Self::Thursday,
            5 => Self::Friday,
            _ => Self::Saturday,
        }
    }

    /// English day name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sunday => "Sunday",
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
        }
    }

    /// This day as a single-bit [`Weekdays`] mask.
    pub fn mask(self) -> Weekdays {
        Weekdays::from_bits_truncate(1 << self as u8)
    }
}

bitflags! {
    /// Set of weekdays an alarm fires on
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Weekdays: u8 {
        const SUNDAY = 0x01;
        const MONDAY = 0x02;
        const TUESDAY = 0x04;
        const WEDNESDAY = 0x08;
        const THURSDAY = 0x10;
        const FRIDAY = 0x20;
        const SATURDAY = 0x40;
        /// All seven days
        const EVERY_DAY = 0x7F;
        /// Monday through Friday
        const WORKDAYS = 0x3E;
    }
}

/// One wall-clock instant as kept by the RTC
///
/// The weekday is always derived from the calendar date, never read back
/// from the device. `meridian` is `Some` exactly when the reading was
/// decoded under [`HourMode::Hour12`] (hour then being 1-12).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalendarTime {
    /// Full year, 2000-2099
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub weekday: Weekday,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub meridian: Option<Meridian>,
}

const DAYS_IN_MONTH: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Days since 1999-12-31 for a date in 2000-2099.
///
/// Every fourth year in the range is a leap year (2000 included, 2100 is
/// out of range), so the cumulative-days formula needs no century rule.
fn date2days(year: u16, month: u8, day: u8) -> u16 {
    let y = year - 2000;
    let mut days = day as u16;
    for m in 1..month {
        days += DAYS_IN_MONTH[m as usize - 1] as u16;
    }
    if month > 2 && y % 4 == 0 {
        days += 1;
    }
    days + 365 * y + (y + 3) / 4 - 1
}

/// Weekday index for a date, 0 = Sunday.
fn weekday_index(year: u16, month: u8, day: u8) -> u8 {
    ((date2days(year, month, day) + 6) % 7) as u8
}

fn days_in_month(year: u16, month: u8) -> u8 {
    let base = DAYS_IN_MONTH[month as usize - 1];
    if month == 2 && year % 4 == 0 {
        base + 1
    } else {
        base
    }
}

fn validate_date(year: u16, month: u8, day: u8) -> Result<(), Error> {
    if !(2000..=2099).contains(&year) || !(1..=12).contains(&month) {
        return Err(Error::InvalidArgument);
    }
    if day == 0 || day > days_in_month(year, month) {
        return Err(Error::InvalidArgument);
    }
    Ok(())
}

fn validate_time(hour: u8, minute: u8, second: u8) -> Result<(), Error> {
    if hour > 23 || minute > 59 || second > 59 {
        return Err(Error::InvalidArgument);
    }
    Ok(())
}

/// Encode a 24-hour-valued hour under the given hour system.
fn encode_hour(hour: u8, mode: HourMode) -> u8 {
    match mode {
        HourMode::Hour24 => bin2bcd(hour) | 0x80,
        HourMode::Hour12 => match hour {
            0 => 0x12,
            1..=11 => bin2bcd(hour),
            12 => 0x32,
            _ => 0x20 | bin2bcd(hour - 12),
        },
    }
}

/// Decode a stored hour byte under the given hour system.
fn decode_hour(raw: u8, mode: HourMode) -> (u8, Option<Meridian>) {
    match mode {
        HourMode::Hour24 => (bcd2bin(raw & 0x7F), None),
        HourMode::Hour12 => {
            let meridian = if raw & 0x20 != 0 {
                Meridian::Pm
            } else {
                Meridian::Am
            };
            (bcd2bin(raw & 0x1F), Some(meridian))
        }
    }
}

/// Decode a stored hour byte to a 24-hour value, whichever system it was
/// encoded under.
fn to_hour24(raw: u8) -> u8 {
    if raw & 0x80 != 0 {
        return bcd2bin(raw & 0x7F);
    }
    let hour = bcd2bin(raw & 0x1F);
    if raw & 0x20 != 0 {
        // PM; noon stays 12
        if hour == 12 {
            12
        } else {
            hour + 12
        }
    } else if hour == 12 {
        // 12 AM is midnight
        0
    } else {
        hour
    }
}

impl<I> Device<I>
where
    I: Interface,
{
    /// Reads the current wall-clock time.
    ///
    /// The hour is decoded under the held hour system; the weekday is
    /// recomputed from the calendar date rather than trusted from the
    /// device's weekday byte.
    pub fn rtc_time(&mut self) -> Result<CalendarTime, Error> {
        let block: TimeKeeping = self.interface.read_register()?;
        let year = 2000 + block.year as u16;
        if !(1..=12).contains(&block.month) || block.day == 0 || block.day > 31 {
            return Err(Error::Deserialization);
        }
        let (hour, meridian) = decode_hour(block.hour, self.hour_mode);
        Ok(CalendarTime {
            year,
            month: block.month,
            day: block.day,
            weekday: Weekday::from_index(weekday_index(year, block.month, block.day)),
            hour,
            minute: block.minute,
            second: block.second,
            meridian,
        })
    }

    /// Sets the clock, effective immediately.
    ///
    /// `hour` is always given as 0-23; under [`HourMode::Hour12`] it is
    /// converted to the 12-hour encoding on the way out. The weekday byte
    /// is computed from the date. The chip only accepts whole-block time
    /// writes, so all seven bytes go out in one transfer.
    ///
    /// # Errors
    /// * [`Error::InvalidArgument`] - date or time out of range (checked
    ///   before any bus traffic)
    pub fn set_time(
        &mut self,
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<(), Error> {
        validate_date(year, month, day)?;
        validate_time(hour, minute, second)?;
        self.interface.write_register(TimeKeeping {
            second,
            minute,
            hour: encode_hour(hour, self.hour_mode),
            weekday: weekday_index(year, month, day),
            day,
            month,
            year: (year - 2000) as u8,
        })
    }

    /// Switches the clock between the 12- and 24-hour systems.
    ///
    /// The currently stored instant is re-encoded under the new system so
    /// the wall-clock value is preserved across the switch; if the chip is
    /// already in the requested system only the held flag is updated.
    pub fn set_hour_system(&mut self, mode: HourMode) -> Result<(), Error> {
        let mut block: TimeKeeping = self.interface.read_register()?;
        self.hour_mode = mode;
        if HourMode::of_encoded(block.hour) == mode {
            return Ok(());
        }
        block.hour = encode_hour(to_hour24(block.hour), mode);
        self.interface.write_register(block)
    }

    /// Arms a weekly alarm firing on the given days at the given time.
    ///
    /// The alarm persists in the device until overwritten or cleared;
    /// firing is signaled on the interrupt line and consumed with
    /// [`clear_alarm`](Self::clear_alarm).
    pub fn set_alarm(
        &mut self,
        weekdays: Weekdays,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<(), Error> {
        validate_time(hour, minute, second)?;
        self.arm_alarm_interrupt()?;
        self.interface.write_register(AlarmBlock {
            second,
            minute,
            hour: encode_hour(hour, self.hour_mode),
            weekdays: weekdays.bits(),
            enable: AlarmBlock::ENABLE_WEEKLY,
            ..AlarmBlock::default()
        })
    }

    /// Arms a date alarm firing once on the given calendar date.
    pub fn set_alarm_date(&mut self, year: u16, month: u8, day: u8) -> Result<(), Error> {
        validate_date(year, month, day)?;
        self.arm_alarm_interrupt()?;
        self.interface.write_register(AlarmBlock {
            day,
            month,
            year: (year - 2000) as u8,
            enable: AlarmBlock::ENABLE_DATE,
            ..AlarmBlock::default()
        })
    }

    fn arm_alarm_interrupt(&mut self) -> Result<(), Error> {
        self.interface.write_register(Control3 {
            flags: Control3Flags::WRITE_ENABLE,
        })?;
        self.interface.write_register(Control2 {
            flags: Control2Flags::WRITE_ENABLE
                | Control2Flags::INT_SOURCE
                | Control2Flags::ALARM_INT,
        })
    }

    /// Consumes the pending alarm/countdown interrupt flags.
    ///
    /// Called after the external interrupt line fires; the read itself is
    /// what clears the flags on the device.
    pub fn clear_alarm(&mut self) -> Result<InterruptFlags, Error> {
        self.interface.read_register()
    }

    /// Arms the countdown timer.
    ///
    /// `seconds` is clamped to the 24-bit register maximum. The countdown
    /// fires once over the same interrupt line as the alarm; re-arming
    /// after it fires requires calling this function again in full.
    pub fn countdown(&mut self, seconds: u32) -> Result<(), Error> {
        let seconds = seconds.min(COUNTDOWN_MAX);
        self.clear_alarm()?;
        self.interface.write_register(Control2 {
            flags: Control2Flags::WRITE_ENABLE,
        })?;
        self.interface.write_register(Control2 {
            flags: Control2Flags::WRITE_ENABLE
                | Control2Flags::INT_PERIODIC
                | Control2Flags::INT_SOURCE
                | Control2Flags::COUNTDOWN_INT,
        })?;
        self.interface.write_register(Control3 {
            flags: Control3Flags::COUNTDOWN_1HZ,
        })?;
        self.interface.write_register(CountdownValue { seconds })
    }

    /// Reads the clock die temperature in degrees Celsius.
    pub fn temperature_c(&mut self) -> Result<i8, Error> {
        let t: Temperature = self.interface.read_register()?;
        Ok(t.celsius)
    }

    /// Reads the backup battery voltage in volts.
    pub fn battery_voltage(&mut self) -> Result<f32, Error> {
        let v: BatteryVoltage = self.interface.read_register()?;
        Ok(v.volts())
    }

    /// Ungates the 32 kHz clock output pin.
    pub fn enable_32k(&mut self) -> Result<(), Error> {
        self.set_32k_gate(false)
    }

    /// Gates off the 32 kHz clock output pin.
    pub fn disable_32k(&mut self) -> Result<(), Error> {
        self.set_32k_gate(true)
    }

    fn set_32k_gate(&mut self, gated: bool) -> Result<(), Error> {
        let current: Control3 = self.interface.read_register()?;
        let mut flags = current.flags;
        flags.set(Control3Flags::DISABLE_32K, gated);
        self.interface.write_register(Control3 { flags })?;
        self.interface.delay_ms(100);
        Ok(())
    }

    /// Writes one byte of battery-backed scratch SRAM.
    ///
    /// Valid addresses are `0x2C..=0x71`; anything else is rejected
    /// without touching the bus.
    pub fn write_sram(&mut self, addr: u8, value: u8) -> Result<(), Error> {
        Self::validate_sram_addr(addr)?;
        self.interface.write_bytes(addr, &[value])
    }

    /// Reads one byte of battery-backed scratch SRAM.
    pub fn read_sram(&mut self, addr: u8) -> Result<u8, Error> {
        Self::validate_sram_addr(addr)?;
        let mut buf = [0u8; 1];
        self.interface.read_bytes(addr, &mut buf)?;
        Ok(buf[0])
    }

    /// Resets one byte of scratch SRAM to the `0xFF` clear value.
    pub fn clear_sram(&mut self, addr: u8) -> Result<(), Error> {
        self.write_sram(addr, SRAM_CLEAR)
    }

    fn validate_sram_addr(addr: u8) -> Result<(), Error> {
        if (SRAM_START..=SRAM_END).contains(&addr) {
            Ok(())
        } else {
            Err(Error::InvalidArgument)
        }
    }
}
