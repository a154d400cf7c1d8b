//! GNSS operations
//!
//! Positioning readouts served from the receiver's parsed-result registers,
//! receiver configuration (constellation selection, power), and raw NMEA
//! pass-through for hosts that run their own sentence parser.

use crate::interface::{Error, Interface};
use crate::registers::gnss::{
    Altitude, Constellation, Coordinate, DataLength, GnssMode, GroundCourse, GroundSpeed,
    Latitude, Longitude, PowerControl, SatellitesUsed, StartMeasurement, UtcDate, UtcTime,
    MAX_DATA_LEN, REG_ALL_DATA,
};
use crate::Device;

/// Settle time after triggering a measurement snapshot, in milliseconds.
const MEASUREMENT_DELAY_MS: u32 = 100;

impl<I> Device<I>
where
    I: Interface,
{
    /// Reads the UTC date of the current fix.
    ///
    /// All-zero fields mean the receiver has no fix yet; the device reports
    /// zeros rather than an error in that case.
    pub fn date(&mut self) -> Result<UtcDate, Error> {
        self.interface.read_register()
    }

    /// Reads the UTC time of day of the current fix.
    pub fn utc(&mut self) -> Result<UtcTime, Error> {
        self.interface.read_register()
    }

    /// Reads the latitude of the current fix.
    pub fn latitude(&mut self) -> Result<Coordinate, Error> {
        let lat: Latitude = self.interface.read_register()?;
        Ok(lat.coordinate)
    }

    /// Reads the longitude of the current fix.
    pub fn longitude(&mut self) -> Result<Coordinate, Error> {
        let lon: Longitude = self.interface.read_register()?;
        Ok(lon.coordinate)
    }

    /// Reads the number of satellites used in the current fix.
    pub fn satellites_used(&mut self) -> Result<u8, Error> {
        let sats: SatellitesUsed = self.interface.read_register()?;
        Ok(sats.count)
    }

    /// Reads the altitude of the current fix, in meters.
    pub fn altitude(&mut self) -> Result<f32, Error> {
        let alt: Altitude = self.interface.read_register()?;
        Ok(alt.meters)
    }

    /// Reads the speed over ground, in knots.
    pub fn ground_speed(&mut self) -> Result<f32, Error> {
        let speed: GroundSpeed = self.interface.read_register()?;
        Ok(speed.knots)
    }

    /// Reads the course over ground, in degrees from true north.
    pub fn ground_course(&mut self) -> Result<f32, Error> {
        let course: GroundCourse = self.interface.read_register()?;
        Ok(course.degrees)
    }

    /// Selects which satellite constellations the receiver tracks.
    ///
    /// An empty set is rejected before any bus traffic; the receiver needs
    /// at least one constellation to produce fixes.
    pub fn set_constellation(&mut self, constellation: Constellation) -> Result<(), Error> {
        if constellation.is_empty() {
            return Err(Error::InvalidArgument);
        }
        self.interface.write_register(GnssMode { constellation })
    }

    /// Reads the currently selected constellation set.
    pub fn constellation(&mut self) -> Result<Constellation, Error> {
        let mode: GnssMode = self.interface.read_register()?;
        Ok(mode.constellation)
    }

    /// Powers the receiver up.
    pub fn enable_gnss_power(&mut self) -> Result<(), Error> {
        self.interface.write_register(PowerControl { enabled: true })
    }

    /// Puts the receiver to sleep. The clock keeps running; only the GNSS
    /// core stops, and with it the automatic time calibration.
    pub fn disable_gnss_power(&mut self) -> Result<(), Error> {
        self.interface.write_register(PowerControl { enabled: false })
    }

    /// Streams one snapshot of the raw NMEA sentence buffer into `sink`.
    ///
    /// Triggers a measurement, waits for the device to latch the snapshot,
    /// then drains the bulk data register in transport-sized chunks. The
    /// device pads sentence gaps with NUL bytes; those are rewritten to
    /// newlines so the stream is printable line-oriented NMEA.
    ///
    /// `sink` is called once per chunk, in order. It is not called at all
    /// when the reported length is invalid.
    ///
    /// # Errors
    /// * [`Error::DataLength`] - the device reported an empty or
    ///   impossibly large snapshot; no payload was read
    pub fn read_all_gnss<F>(&mut self, mut sink: F) -> Result<(), Error>
    where
        F: FnMut(&[u8]),
    {
        self.interface.write_register(StartMeasurement)?;
        self.interface.delay_ms(MEASUREMENT_DELAY_MS);

        let len: DataLength = self.interface.read_register()?;
        if len.bytes == 0 || len.bytes > MAX_DATA_LEN {
            return Err(Error::DataLength(len.bytes));
        }

        let mut buf = [0u8; 256];
        let step = I::MAX_READ_LEN.min(buf.len());
        let mut remaining = len.bytes as usize;
        while remaining > 0 {
            let chunk = &mut buf[..remaining.min(step)];
            self.interface.read_bytes(REG_ALL_DATA, chunk)?;
            for byte in chunk.iter_mut() {
                if *byte == 0 {
                    *byte = b'\n';
                }
            }
            sink(chunk);
            remaining -= chunk.len();
        }
        Ok(())
    }
}
