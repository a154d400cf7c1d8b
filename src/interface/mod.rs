//! Register transport abstraction
//!
//! The DFR1103 exposes one shared 8-bit register file over two physically
//! different buses: plain I2C block transfers, or a framed command/response
//! scheme over UART. This module defines the byte-level contract both buses
//! satisfy ([`Interface`]) so the clock and GNSS codecs never touch bus
//! specifics.
//!
//! Both implementations honor the chip's indirect-addressing quirk for the
//! RTC block: registers `0x30..=0x79` live behind a read window that must be
//! selected with a 2-byte priming write before every read. The transports
//! apply the priming transparently.

use core::convert::Infallible;

use regiface::{ByteArray, FromByteArray, ReadableRegister, ToByteArray, WritableRegister};

mod i2c;
mod uart;

pub use i2c::I2cInterface;
pub use uart::UartInterface;

/// Default 7-bit I2C device address of the module.
pub const MODULE_I2C_ADDRESS: u8 = 0x66;

/// Fixed UART baud rate the module speaks. 8N1 framing assumed.
pub const UART_BAUDRATE: u32 = 57_600;

/// Settle delay the chip requires after every write transfer, in ms.
pub(crate) const SETTLE_DELAY_MS: u32 = 50;

/// Select register for the RTC read window (takes `[target_reg, len]`).
pub(crate) const RTC_WINDOW_SELECT: u8 = 0x2E;

/// First register behind the RTC read window.
pub(crate) const RTC_WINDOW_START: u8 = 0x30;

/// Last register behind the RTC read window.
pub(crate) const RTC_WINDOW_END: u8 = 0x79;

/// Driver error type
///
/// Bus-level faults are collapsed to [`Error::Bus`]; the underlying
/// `embedded-hal`/`embedded-io` error value is not carried. There is no
/// automatic retry anywhere in the driver: a failed transfer aborts the
/// current operation and the caller decides whether to reissue it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Bus-level I/O failure (NACK, serial fault, device absent)
    Bus,
    /// A register read returned bytes that do not form a valid value
    Deserialization,
    /// Argument rejected before any bus traffic (range or length check)
    InvalidArgument,
    /// UART read deadline elapsed before the full response arrived
    ///
    /// The reference implementations silently return whatever partial bytes
    /// arrived; downstream codecs assume fixed-length buffers, so a short
    /// read is surfaced as a hard error here instead.
    ShortRead {
        /// Bytes requested
        expected: usize,
        /// Bytes actually collected before the deadline
        received: usize,
    },
    /// The chip at the other end reported a PID other than the DFR1103's
    ///
    /// Distinct from [`Error::Bus`]: the link works, the device is wrong.
    IdentityMismatch {
        /// PID read back from the device
        found: u16,
    },
    /// Bulk GNSS retrieval reported an out-of-range payload length
    DataLength(u16),
}

/// Byte-level register transport contract
///
/// Exactly two raw operations are required from a bus implementation; the
/// typed register accessors are provided on top of them. Codecs depend only
/// on this trait, which also makes them testable against a mock transport.
pub trait Interface {
    /// Largest payload a single read transfer can move reliably.
    ///
    /// Bulk GNSS retrieval chunks its reads to this size.
    const MAX_READ_LEN: usize;

    /// Write `bytes` to the register at `reg`.
    fn write_bytes(&mut self, reg: u8, bytes: &[u8]) -> Result<(), Error>;

    /// Fill `buf` from the register at `reg`.
    ///
    /// Implementations must apply the RTC read-window priming for addresses
    /// in `0x30..=0x79` before the actual transfer, and reject an empty
    /// `buf` with [`Error::InvalidArgument`] before any bus traffic.
    fn read_bytes(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), Error>;

    /// Block for `ms` milliseconds.
    ///
    /// Codec-level sequences need chip-settle pauses beyond the per-write
    /// delay the transports already insert.
    fn delay_ms(&mut self, ms: u32);

    /// Check that the expected device is reachable on this bus.
    ///
    /// I2C performs a presence scan; UART reads back the chip PID and
    /// reports [`Error::IdentityMismatch`] on a foreign device.
    fn probe(&mut self) -> Result<(), Error>;

    /// Reads a typed register value from the device.
    ///
    /// # Errors
    /// * [`Error::Bus`] - transfer failed
    /// * [`Error::Deserialization`] - register bytes failed to parse
    fn read_register<R>(&mut self) -> Result<R, Error>
    where
        R: ReadableRegister<IdType = u8>,
    {
        let mut raw_value = R::Array::new();
        self.read_bytes(R::id(), raw_value.as_mut())?;
        R::from_bytes(raw_value).map_err(|_| Error::Deserialization)
    }

    /// Writes a typed register value to the device.
    ///
    /// # Errors
    /// * [`Error::Bus`] - transfer failed
    fn write_register<R>(&mut self, register: R) -> Result<(), Error>
    where
        R: WritableRegister<IdType = u8, Error = Infallible>,
    {
        let raw_value = register.to_bytes().unwrap();
        self.write_bytes(R::id(), raw_value.as_ref())
    }
}

pub(crate) fn in_rtc_window(reg: u8) -> bool {
    (RTC_WINDOW_START..=RTC_WINDOW_END).contains(&reg)
}
