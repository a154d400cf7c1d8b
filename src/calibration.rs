//! GNSS-to-RTC calibration operations
//!
//! The module can discipline its clock from GNSS time, either on demand or
//! on a recurring schedule. Calibration runs on the device; the host only
//! triggers it and polls the status register.

use crate::interface::{Error, Interface};
use crate::registers::control::{
    CalibrationInterval, CalibrationState, CalibrationStatus,
};
use crate::Device;

impl<I> Device<I>
where
    I: Interface,
{
    /// Triggers an immediate GNSS time calibration.
    ///
    /// Completion is observed by polling
    /// [`calibration_status`](Self::calibration_status); a calibration
    /// takes on the order of seconds and needs a GNSS fix to succeed.
    pub fn calibrate_now(&mut self) -> Result<(), Error> {
        self.interface.write_register(CalibrationStatus {
            state: CalibrationState::InProgress,
        })
    }

    /// Aborts a calibration that is underway.
    pub fn abort_calibration(&mut self) -> Result<(), Error> {
        self.interface.write_register(CalibrationStatus {
            state: CalibrationState::None,
        })
    }

    /// Sets the automatic calibration interval, in hours.
    ///
    /// Zero disables automatic calibration. A nonzero interval also
    /// triggers one calibration immediately on the device.
    pub fn set_calibration_interval(&mut self, hours: u8) -> Result<(), Error> {
        self.interface.write_register(CalibrationInterval { hours })
    }

    /// Reads the calibration status.
    ///
    /// Reading [`CalibrationState::Complete`] consumes the completion
    /// event on the device: the next read reports
    /// [`CalibrationState::None`] until another calibration finishes.
    pub fn calibration_status(&mut self) -> Result<CalibrationState, Error> {
        let status: CalibrationStatus = self.interface.read_register()?;
        Ok(status.state)
    }
}

#[cfg(test)]
mod tests {
    use crate::testutil::MockInterface;

    use super::*;

    #[test]
    fn trigger_and_abort_write_the_state_byte() {
        let mut device = Device::new(MockInterface::new());
        device.calibrate_now().unwrap();
        device.abort_calibration().unwrap();
        device.set_calibration_interval(24).unwrap();

        assert_eq!(
            device.release().writes,
            vec![(0x2A, vec![0x02]), (0x2A, vec![0x00]), (0x2B, vec![24])]
        );
    }

    #[test]
    fn status_read_observes_consume_on_read() {
        let mut iface = MockInterface::new();
        iface.expect_read(0x2A, &[0x01]);
        iface.expect_read(0x2A, &[0x00]);
        let mut device = Device::new(iface);

        assert_eq!(
            device.calibration_status().unwrap(),
            CalibrationState::Complete
        );
        assert_eq!(device.calibration_status().unwrap(), CalibrationState::None);
    }

    #[test]
    fn garbage_status_byte_is_a_deserialization_error() {
        let mut iface = MockInterface::new();
        iface.expect_read(0x2A, &[0x7F]);
        let mut device = Device::new(iface);

        assert_eq!(device.calibration_status(), Err(Error::Deserialization));
    }
}
