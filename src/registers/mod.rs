//! Register definitions for the DFR1103's shared register file
//!
//! One 8-bit address space serves three subsystems: the GNSS result block
//! at `0x00..=0x23`, the module's own calibration/identity glue, and the
//! clock core at a `0x30` base offset (reads of which go through the RTC
//! read window, see [`crate::interface`]).

pub mod control;
pub mod gnss;
pub mod rtc;

pub use control::*;
pub use gnss::*;
pub use rtc::*;
