//! DFR1103 device interface
//!
//! [`Device`] is the composition root: it owns exactly one transport and
//! exposes the clock, GNSS and calibration operations on top of it. The
//! operation groups live in their own modules ([`crate::rtc`],
//! [`crate::gnss`], [`crate::calibration`]) but all hang off this one type,
//! since the only state they share is the transport and the hour-system
//! flag.

use crate::interface::{Error, Interface};
use crate::registers::control::{ChipIdentity, FirmwareVersion, ProductId, VendorId};
use crate::registers::rtc::HostInterfaceControl;
use crate::rtc::HourMode;

/// Driver handle for one DFR1103 module.
///
/// Generic over the transport, so the same codecs run unmodified over I2C
/// ([`I2cInterface`](crate::I2cInterface)) or UART
/// ([`UartInterface`](crate::UartInterface)), or over a mock in tests.
pub struct Device<I> {
    pub(crate) interface: I,
    pub(crate) hour_mode: HourMode,
}

impl<I> Device<I> {
    /// Creates a new device over the given transport.
    ///
    /// The hour system starts out as 24-hour, matching the chip's power-on
    /// default; use [`set_hour_system`](Self::set_hour_system) to switch.
    pub fn new(interface: I) -> Self {
        Self {
            interface,
            hour_mode: HourMode::Hour24,
        }
    }

    /// Releases the underlying transport.
    pub fn release(self) -> I {
        self.interface
    }

    /// The hour system all time operations currently encode against.
    pub fn hour_mode(&self) -> HourMode {
        self.hour_mode
    }
}

impl<I> Device<I>
where
    I: Interface,
{
    /// Brings the module up: checks the device is reachable (and, over
    /// UART, that it identifies as a DFR1103), then enables the host
    /// register interface.
    ///
    /// This is the designated retry point: callers that want to wait for a
    /// module to appear loop on `begin` until it returns `Ok`.
    ///
    /// # Errors
    /// * [`Error::Bus`] - device unreachable or transfer failed
    /// * [`Error::IdentityMismatch`] - a different chip answered (UART)
    pub fn begin(&mut self) -> Result<(), Error> {
        self.interface.probe()?;
        self.interface
            .write_register(HostInterfaceControl { enable: true })
    }

    /// Reads the chip identity block (PID, VID, firmware version).
    pub fn identity(&mut self) -> Result<ChipIdentity, Error> {
        let pid: ProductId = self.interface.read_register()?;
        let vid: VendorId = self.interface.read_register()?;
        let version: FirmwareVersion = self.interface.read_register()?;
        Ok(ChipIdentity {
            pid: pid.value,
            vid: vid.value,
            version: version.value,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::registers::control::{MODULE_PID, MODULE_VERSION, MODULE_VID};
    use crate::testutil::MockInterface;

    use super::*;

    #[test]
    fn begin_probes_then_enables_host_interface() {
        let mut device = Device::new(MockInterface::new());
        device.begin().unwrap();

        let iface = device.release();
        assert_eq!(iface.probes, 1);
        assert_eq!(iface.writes, vec![(0x47, vec![0x80])]);
    }

    #[test]
    fn identity_reads_three_words() {
        let mut iface = MockInterface::new();
        iface.expect_read(0xAA, &[0x4F, 0x44]);
        iface.expect_read(0xAC, &[0x43, 0x33]);
        iface.expect_read(0xAE, &[0x00, 0x01]);

        let mut device = Device::new(iface);
        let id = device.identity().unwrap();
        assert_eq!(
            id,
            ChipIdentity {
                pid: MODULE_PID,
                vid: MODULE_VID,
                version: MODULE_VERSION,
            }
        );
    }
}
