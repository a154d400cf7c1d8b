//! UART transport
//!
//! Register access is framed over a 57 600 baud serial link. A write is the
//! frame `[0xCC, reg, len, data...]`; a read sends `[0xBB, reg, len]` and
//! then polls the inbound stream until `len` response bytes have arrived or
//! a ~200 ms deadline elapses. Every frame field is a single byte.
//!
//! Opening and configuring the serial port is the caller's concern; the
//! port handle only needs to implement the `embedded-io` byte-stream traits
//! with an available-bytes query ([`ReadReady`]).

use embedded_hal::delay::DelayNs;
use embedded_io::{Read, ReadReady, Write};

use crate::registers::control::{ProductId, MODULE_PID};

use super::{in_rtc_window, Error, Interface, RTC_WINDOW_SELECT, SETTLE_DELAY_MS};

/// Read command byte of the UART framing scheme.
const READ_REGBUF: u8 = 0xBB;

/// Write command byte of the UART framing scheme.
const WRITE_REGBUF: u8 = 0xCC;

/// Read deadline, measured from the read request.
///
/// The poll loop sleeps in 1 ms steps while the line is idle, so the
/// effective deadline is approximate.
const READ_TIMEOUT_MS: u32 = 200;

/// Register transport over a serial link.
pub struct UartInterface<S, D> {
    serial: S,
    delay: D,
}

impl<S, D> UartInterface<S, D> {
    /// Creates an interface over an already-configured serial port.
    ///
    /// The port must be running at [`UART_BAUDRATE`](super::UART_BAUDRATE),
    /// 8N1.
    pub fn new(serial: S, delay: D) -> Self {
        Self { serial, delay }
    }

    /// Releases the underlying port and delay handles.
    pub fn release(self) -> (S, D) {
        (self.serial, self.delay)
    }
}

impl<S, D> UartInterface<S, D>
where
    S: Read + Write + ReadReady,
    D: DelayNs,
{
    fn send_frame(&mut self, command: u8, reg: u8, len: u8) -> Result<(), Error> {
        // Each field goes out as its own single-byte write.
        for field in [command, reg, len] {
            self.serial
                .write_all(core::slice::from_ref(&field))
                .map_err(|_| Error::Bus)?;
        }
        Ok(())
    }
}

impl<S, D> Interface for UartInterface<S, D>
where
    S: Read + Write + ReadReady,
    D: DelayNs,
{
    const MAX_READ_LEN: usize = 250;

    fn write_bytes(&mut self, reg: u8, bytes: &[u8]) -> Result<(), Error> {
        if bytes.len() > u8::MAX as usize {
            return Err(Error::InvalidArgument);
        }
        self.send_frame(WRITE_REGBUF, reg, bytes.len() as u8)?;
        for byte in bytes {
            self.serial
                .write_all(core::slice::from_ref(byte))
                .map_err(|_| Error::Bus)?;
        }
        self.serial.flush().map_err(|_| Error::Bus)?;
        self.delay.delay_ms(SETTLE_DELAY_MS);
        Ok(())
    }

    fn read_bytes(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), Error> {
        if buf.is_empty() {
            return Err(Error::InvalidArgument);
        }
        if buf.len() > u8::MAX as usize {
            return Err(Error::InvalidArgument);
        }
        if in_rtc_window(reg) {
            self.write_bytes(RTC_WINDOW_SELECT, &[reg, buf.len() as u8])?;
            self.delay.delay_ms(SETTLE_DELAY_MS);
        }

        self.send_frame(READ_REGBUF, reg, buf.len() as u8)?;
        self.serial.flush().map_err(|_| Error::Bus)?;

        let mut received = 0;
        for _ in 0..READ_TIMEOUT_MS {
            if self.serial.read_ready().map_err(|_| Error::Bus)? {
                let n = self
                    .serial
                    .read(&mut buf[received..])
                    .map_err(|_| Error::Bus)?;
                received += n;
                if received == buf.len() {
                    return Ok(());
                }
                continue;
            }
            self.delay.delay_ms(1);
        }

        Err(Error::ShortRead {
            expected: buf.len(),
            received,
        })
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    fn probe(&mut self) -> Result<(), Error> {
        let id: ProductId = self.read_register()?;
        if id.value != MODULE_PID {
            return Err(Error::IdentityMismatch { found: id.value });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct SerialStub {
        sent: Vec<u8>,
        inbound: std::collections::VecDeque<u8>,
    }

    impl embedded_io::ErrorType for SerialStub {
        type Error = core::convert::Infallible;
    }

    impl Write for SerialStub {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            self.sent.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    impl Read for SerialStub {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            let mut n = 0;
            while n < buf.len() {
                match self.inbound.pop_front() {
                    Some(byte) => {
                        buf[n] = byte;
                        n += 1;
                    }
                    None => break,
                }
            }
            Ok(n)
        }
    }

    impl ReadReady for SerialStub {
        fn read_ready(&mut self) -> Result<bool, Self::Error> {
            Ok(!self.inbound.is_empty())
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    #[test]
    fn write_frame_layout() {
        let mut iface = UartInterface::new(SerialStub::default(), NoDelay);
        iface.write_bytes(0x2B, &[0x06]).unwrap();
        let (serial, _) = iface.release();
        assert_eq!(serial.sent, vec![WRITE_REGBUF, 0x2B, 0x01, 0x06]);
    }

    #[test]
    fn read_collects_response() {
        let mut serial = SerialStub::default();
        serial.inbound.extend([0x4F, 0x44]);
        let mut iface = UartInterface::new(serial, NoDelay);
        let mut buf = [0u8; 2];
        iface.read_bytes(0xAA, &mut buf).unwrap();

        assert_eq!(buf, [0x4F, 0x44]);
        let (serial, _) = iface.release();
        assert_eq!(serial.sent, vec![READ_REGBUF, 0xAA, 0x02]);
    }

    #[test]
    fn rtc_window_read_is_primed() {
        let mut serial = SerialStub::default();
        serial.inbound.extend([0u8; 7]);
        let mut iface = UartInterface::new(serial, NoDelay);
        let mut buf = [0u8; 7];
        iface.read_bytes(0x30, &mut buf).unwrap();

        let (serial, _) = iface.release();
        assert_eq!(
            &serial.sent[..5],
            &[WRITE_REGBUF, RTC_WINDOW_SELECT, 0x02, 0x30, 0x07]
        );
        assert_eq!(&serial.sent[5..], &[READ_REGBUF, 0x30, 0x07]);
    }

    #[test]
    fn empty_read_is_rejected_without_bus_traffic() {
        let mut iface = UartInterface::new(SerialStub::default(), NoDelay);
        assert_eq!(
            iface.read_bytes(0x13, &mut []),
            Err(Error::InvalidArgument)
        );
        let (serial, _) = iface.release();
        assert!(serial.sent.is_empty());
    }

    #[test]
    fn short_response_is_an_error() {
        let mut serial = SerialStub::default();
        serial.inbound.extend([0x01]);
        let mut iface = UartInterface::new(serial, NoDelay);
        let mut buf = [0u8; 4];
        assert_eq!(
            iface.read_bytes(0x13, &mut buf),
            Err(Error::ShortRead {
                expected: 4,
                received: 1
            })
        );
    }

    #[test]
    fn probe_rejects_foreign_pid() {
        let mut serial = SerialStub::default();
        serial.inbound.extend([0x34, 0x12]);
        let mut iface = UartInterface::new(serial, NoDelay);
        assert_eq!(
            iface.probe(),
            Err(Error::IdentityMismatch { found: 0x1234 })
        );
    }
}
