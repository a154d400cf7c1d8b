#![cfg_attr(not(test), no_std)]
//! DFR1103 GNSS + RTC Module Driver
//!
//! This crate provides a type-safe interface for the DFRobot DFR1103, a
//! combined multi-constellation GNSS receiver and battery-backed real-time
//! clock behind a single register file, reachable over I2C or UART.
//!
//! # Features
//! - GPS / BeiDou / GLONASS positioning with parsed fix registers
//!   (date/time, latitude/longitude, altitude, speed, course, satellites)
//! - Raw NMEA sentence pass-through for host-side parsers
//! - Full calendar clock: 12/24-hour systems, weekly and date alarms,
//!   24-bit countdown timer, 32 kHz output
//! - GNSS-to-RTC time calibration, on demand or on a schedule
//! - Battery voltage and die temperature readouts, scratch SRAM
//!
//! # Architecture
//! The driver is organized into several modules:
//!
//! - [`device`]: The [`Device`] handle every operation hangs off
//! - [`interface`]: The two transports and the shared [`Interface`] trait
//!   - [`I2cInterface`] over `embedded-hal` I2C
//!   - [`UartInterface`] over `embedded-io` serial
//! - [`registers`]: Register definitions for the shared register file
//!   - [`registers::gnss`]: Parsed GNSS fix and receiver control registers
//!   - [`registers::rtc`]: Clock, alarm and control registers
//!   - [`registers::control`]: Calibration and chip identity registers
//! - [`rtc`], [`gnss`], [`calibration`]: The operation groups on [`Device`]
//!
//! # Usage
//! Registers are accessed through the `regiface` crate's typed register
//! traits; user code normally stays on the [`Device`] methods and never
//! touches raw registers. Bring the module up with
//! [`Device::begin`](Device::begin) before anything else, then use the
//! clock and GNSS operations freely.
//!
//! # Important Notes
//! - Clock registers sit behind a read window the transports prime
//!   transparently; every write is followed by a settle delay
//! - The weekday reported by [`Device::rtc_time`] is always derived from
//!   the calendar date, never read from the device
//! - Alarm and countdown interrupts share one flag register; reading it
//!   via [`Device::clear_alarm`] is what re-arms the interrupt line
//!
//! # Example
//! ```no_run
//! use dfr1103::{Device, Error, I2cInterface};
//! use embedded_hal::{delay::DelayNs, i2c::I2c};
//!
//! fn print_fix<I2C: I2c, D: DelayNs>(i2c: I2C, delay: D) -> Result<(), Error> {
//!     let mut device = Device::new(I2cInterface::new(i2c, delay));
//!     device.begin()?;
//!
//!     let position = device.latitude()?;
//!     let _ = position.decimal_degrees();
//!
//!     Ok(())
//! }
//! ```

pub mod calibration;
pub mod device;
pub mod gnss;
pub mod interface;
pub mod registers;
pub mod rtc;

#[cfg(test)]
mod testutil;

pub use device::Device;
pub use interface::{Error, I2cInterface, Interface, UartInterface};
pub use registers::*;
pub use rtc::{CalendarTime, HourMode, Meridian, Weekday, Weekdays};
