//! I2C transport
//!
//! Register access maps directly onto I2C block transfers: a write is
//! `[reg, payload...]` in one transaction, a read is a register-address
//! write followed by a block read. The bulk GNSS data register is the one
//! exception: the device auto-advances an internal cursor there, so every
//! byte is fetched from the same address instead of sequential ones.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{I2c, Operation};

use crate::registers::gnss::REG_ALL_DATA;

use super::{in_rtc_window, Error, Interface, MODULE_I2C_ADDRESS, RTC_WINDOW_SELECT, SETTLE_DELAY_MS};

/// Register transport over an I2C bus.
pub struct I2cInterface<I2C, D> {
    i2c: I2C,
    address: u8,
    delay: D,
}

impl<I2C, D> I2cInterface<I2C, D> {
    /// Creates an interface at the module's default address (`0x66`).
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self::with_address(i2c, MODULE_I2C_ADDRESS, delay)
    }

    /// Creates an interface at a non-default 7-bit address.
    pub fn with_address(i2c: I2C, address: u8, delay: D) -> Self {
        Self { i2c, address, delay }
    }

    /// Releases the underlying bus and delay handles.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }
}

impl<I2C, D> Interface for I2cInterface<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    const MAX_READ_LEN: usize = 32;

    fn write_bytes(&mut self, reg: u8, bytes: &[u8]) -> Result<(), Error> {
        self.i2c
            .transaction(
                self.address,
                &mut [Operation::Write(&[reg]), Operation::Write(bytes)],
            )
            .map_err(|_| Error::Bus)?;
        self.delay.delay_ms(SETTLE_DELAY_MS);
        Ok(())
    }

    fn read_bytes(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), Error> {
        if buf.is_empty() {
            return Err(Error::InvalidArgument);
        }
        if in_rtc_window(reg) {
            self.write_bytes(RTC_WINDOW_SELECT, &[reg, buf.len() as u8])?;
            self.delay.delay_ms(SETTLE_DELAY_MS);
        }

        if reg == REG_ALL_DATA {
            // Cursor register: the chip serves the next payload byte on each
            // read of the same address.
            for byte in buf.iter_mut() {
                self.i2c
                    .write_read(self.address, &[reg], core::slice::from_mut(byte))
                    .map_err(|_| Error::Bus)?;
            }
        } else {
            self.i2c
                .write_read(self.address, &[reg], buf)
                .map_err(|_| Error::Bus)?;
        }
        Ok(())
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    fn probe(&mut self) -> Result<(), Error> {
        let mut scratch = [0u8; 1];
        self.i2c
            .read(self.address, &mut scratch)
            .map_err(|_| Error::Bus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct BusLog {
        /// (address, written bytes, bytes read back) per transaction
        transfers: Vec<(u8, Vec<u8>, usize)>,
        /// Responses handed out for read portions, front first
        responses: std::collections::VecDeque<Vec<u8>>,
    }

    impl embedded_hal::i2c::ErrorType for BusLog {
        type Error = core::convert::Infallible;
    }

    impl I2c for BusLog {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            let mut written = Vec::new();
            let mut read = 0;
            for op in operations.iter_mut() {
                match op {
                    Operation::Write(bytes) => written.extend_from_slice(bytes),
                    Operation::Read(buf) => {
                        let data = self.responses.pop_front().expect("unexpected read");
                        buf.copy_from_slice(&data);
                        read += buf.len();
                    }
                }
            }
            self.transfers.push((address, written, read));
            Ok(())
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    #[test]
    fn write_is_one_block_transfer() {
        let mut iface = I2cInterface::new(BusLog::default(), NoDelay);
        iface.write_bytes(0x22, &[0x07]).unwrap();
        let (i2c, _) = iface.release();
        assert_eq!(i2c.transfers, vec![(0x66, vec![0x22, 0x07], 0)]);
    }

    #[test]
    fn rtc_window_read_is_primed() {
        let mut bus = BusLog::default();
        bus.responses.push_back(vec![0x00; 7]);
        let mut iface = I2cInterface::new(bus, NoDelay);
        let mut buf = [0u8; 7];
        iface.read_bytes(0x30, &mut buf).unwrap();

        let (i2c, _) = iface.release();
        // Priming write of [target, len] to the select register, then the read.
        assert_eq!(i2c.transfers[0], (0x66, vec![RTC_WINDOW_SELECT, 0x30, 7], 0));
        assert_eq!(i2c.transfers[1], (0x66, vec![0x30], 7));
    }

    #[test]
    fn gnss_block_read_is_not_primed() {
        let mut bus = BusLog::default();
        bus.responses.push_back(vec![0x25, 0x2E, 0x00, 0x30, 0x39, b'N']);
        let mut iface = I2cInterface::new(bus, NoDelay);
        let mut buf = [0u8; 6];
        iface.read_bytes(0x07, &mut buf).unwrap();

        let (i2c, _) = iface.release();
        assert_eq!(i2c.transfers.len(), 1);
        assert_eq!(i2c.transfers[0], (0x66, vec![0x07], 6));
    }

    #[test]
    fn empty_read_is_rejected_without_bus_traffic() {
        let mut iface = I2cInterface::new(BusLog::default(), NoDelay);
        assert_eq!(
            iface.read_bytes(0x13, &mut []),
            Err(Error::InvalidArgument)
        );
        let (i2c, _) = iface.release();
        assert!(i2c.transfers.is_empty());
    }

    #[test]
    fn bulk_register_reads_byte_by_byte_from_same_address() {
        let mut bus = BusLog::default();
        for b in [b'$', b'G', b'N'] {
            bus.responses.push_back(vec![b]);
        }
        let mut iface = I2cInterface::new(bus, NoDelay);
        let mut buf = [0u8; 3];
        iface.read_bytes(REG_ALL_DATA, &mut buf).unwrap();

        assert_eq!(&buf, b"$GN");
        let (i2c, _) = iface.release();
        assert_eq!(i2c.transfers.len(), 3);
        for transfer in &i2c.transfers {
            assert_eq!(transfer.1, vec![REG_ALL_DATA]);
            assert_eq!(transfer.2, 1);
        }
    }
}
