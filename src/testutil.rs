//! Scripted transport for device-level tests
//!
//! Records every write and replays queued read responses, so tests can
//! assert on the exact register traffic an operation produces without any
//! bus behind it.

use std::collections::VecDeque;

use crate::interface::{Error, Interface};

pub struct MockInterface {
    /// Every `(register, payload)` written, in order.
    pub writes: Vec<(u8, Vec<u8>)>,
    /// Queued `(register, response)` pairs consumed by reads, in order.
    pub reads: VecDeque<(u8, Vec<u8>)>,
    /// Every delay requested, in milliseconds.
    pub delays: Vec<u32>,
    /// Number of probe calls.
    pub probes: usize,
}

impl MockInterface {
    pub fn new() -> Self {
        Self {
            writes: Vec::new(),
            reads: VecDeque::new(),
            delays: Vec::new(),
            probes: 0,
        }
    }

    /// Queues the response for the next read, which must target `reg`.
    pub fn expect_read(&mut self, reg: u8, bytes: &[u8]) {
        self.reads.push_back((reg, bytes.to_vec()));
    }
}

impl Interface for MockInterface {
    const MAX_READ_LEN: usize = 32;

    fn write_bytes(&mut self, reg: u8, bytes: &[u8]) -> Result<(), Error> {
        self.writes.push((reg, bytes.to_vec()));
        Ok(())
    }

    fn read_bytes(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), Error> {
        let (expected_reg, response) = self
            .reads
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected read of register {reg:#04X}"));
        assert_eq!(reg, expected_reg, "read targeted the wrong register");
        assert_eq!(
            buf.len(),
            response.len(),
            "read length mismatch for register {reg:#04X}"
        );
        buf.copy_from_slice(&response);
        Ok(())
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delays.push(ms);
    }

    fn probe(&mut self) -> Result<(), Error> {
        self.probes += 1;
        Ok(())
    }
}
