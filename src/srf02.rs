use byteorder::{BigEndian, ByteOrder};
use embedded_hal::delay::DelayNs;

use crate::{
    Address, Command, Config, Driver, Error, OpCode, RangingWait, Register, Sensor, TwiMaster,
};

/// Distance reported by the sensor, in centimeters
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Range(u16);

impl Range {
    /// Closest distance the transducer resolves
    pub const MIN_CM: u16 = 10;
    pub const MAX_CM: u16 = 600;

    /// Result registers hold the high byte first
    pub fn from_bytes(high: u8, low: u8) -> Self {
        Range(BigEndian::read_u16(&[high, low]))
    }

    pub fn centimeters(&self) -> u16 {
        self.0
    }

    /// The driver hands out whatever the sensor reported; this tells whether
    /// the value is physically possible.
    pub fn is_within_sensor_bounds(&self) -> bool {
        (Self::MIN_CM..=Self::MAX_CM).contains(&self.0)
    }
}

impl From<Range> for u16 {
    fn from(range: Range) -> Self {
        range.0
    }
}

/// SRF02 ultrasonic rangefinder at its factory address
#[derive(Debug, Clone, Copy)]
pub struct Srf02 {
    address: Address,
}

impl Default for Srf02 {
    fn default() -> Self {
        Srf02 {
            address: Address::SRF02_DEFAULT,
        }
    }
}

impl Srf02 {
    /// Real ranging, result in centimeters
    pub const RANGING_COMMAND: Command = Command::RangeCentimeters;

    /// Duration of one ranging cycle according to the datasheet
    pub const RANGING_TIME_MS: u32 = 65;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Time a caller of the split `Sensor` API should wait between starting
    /// and reading a measurement. A configured delay wins; polling and
    /// `Immediate` only apply inside `read_range`, so those fall back to
    /// the datasheet cycle.
    pub fn measurement_time_ms(&self, config: &Config) -> u32 {
        match config.ranging {
            RangingWait::Delay { ms } => ms,
            RangingWait::Immediate | RangingWait::Poll { .. } => Self::RANGING_TIME_MS,
        }
    }

    /// Triggers a ranging cycle, waits as configured and reads the result
    pub fn read_range<T: TwiMaster>(
        &self,
        driver: &mut Driver<T>,
        delay: &mut impl DelayNs,
    ) -> Result<Range, Error<T::Error>> {
        self.trigger_ranging(driver, delay)?;
        self.wait_for_ranging(driver, delay)?;
        self.read_result(driver, delay)
    }

    pub fn trigger_ranging<T: TwiMaster>(
        &self,
        driver: &mut Driver<T>,
        delay: &mut impl DelayNs,
    ) -> Result<(), Error<T::Error>> {
        driver.write_register(
            delay,
            self.address,
            Register::Command.op_code(),
            &[Self::RANGING_COMMAND.op_code()],
        )
    }

    pub fn wait_for_ranging<T: TwiMaster>(
        &self,
        driver: &mut Driver<T>,
        delay: &mut impl DelayNs,
    ) -> Result<(), Error<T::Error>> {
        match driver.config().ranging {
            RangingWait::Immediate => Ok(()),
            RangingWait::Delay { ms } => {
                delay.delay_ms(ms);
                Ok(())
            }
            RangingWait::Poll {
                interval_ms,
                timeout_ms,
            } => self.poll_ranging(driver, delay, interval_ms, timeout_ms),
        }
    }

    /// Reads the two result registers, high byte first
    pub fn read_result<T: TwiMaster>(
        &self,
        driver: &mut Driver<T>,
        delay: &mut impl DelayNs,
    ) -> Result<Range, Error<T::Error>> {
        let mut result = [0u8; 2];
        driver.read_registers(
            delay,
            self.address,
            Register::RangeHigh.op_code(),
            &mut result,
        )?;
        let range = Range::from_bytes(result[0], result[1]);
        debug!("range {} cm", range.centimeters());
        Ok(range)
    }

    /// Reads 0xFF while a ranging cycle is in progress
    pub fn software_revision<T: TwiMaster>(
        &self,
        driver: &mut Driver<T>,
        delay: &mut impl DelayNs,
    ) -> Result<u8, Error<T::Error>> {
        let mut revision = [0u8; 1];
        driver.read_registers(
            delay,
            self.address,
            Register::Command.op_code(),
            &mut revision,
        )?;
        Ok(revision[0])
    }

    fn poll_ranging<T: TwiMaster>(
        &self,
        driver: &mut Driver<T>,
        delay: &mut impl DelayNs,
        interval_ms: u32,
        timeout_ms: u32,
    ) -> Result<(), Error<T::Error>> {
        let mut waited_ms = 0u32;
        loop {
            match self.software_revision(driver, delay) {
                Ok(0xFF) | Err(Error::AddressNack { .. }) => {}
                Ok(revision) => {
                    trace!("ranging done after {}ms, revision {}", waited_ms, revision);
                    return Ok(());
                }
                Err(e) => return Err(e),
            }
            if waited_ms >= timeout_ms {
                error!("sensor still ranging after {}ms", waited_ms);
                return Err(Error::RangingTimeout);
            }
            delay.delay_ms(interval_ms);
            waited_ms = waited_ms.saturating_add(interval_ms.max(1));
        }
    }
}

impl Sensor for Srf02 {
    fn start_measurement<T: TwiMaster>(
        &self,
        driver: &mut Driver<T>,
        delay: &mut impl DelayNs,
    ) -> Result<u32, Error<T::Error>> {
        self.trigger_ranging(driver, delay)?;
        Ok(self.measurement_time_ms(driver.config()))
    }

    fn read_measurement<T: TwiMaster>(
        &self,
        driver: &mut Driver<T>,
        delay: &mut impl DelayNs,
    ) -> Result<Range, Error<T::Error>> {
        self.read_result(driver, delay)
    }

    fn read_measurement_raw<T: TwiMaster>(
        &self,
        driver: &mut Driver<T>,
        delay: &mut impl DelayNs,
    ) -> Result<u16, Error<T::Error>> {
        self.read_result(driver, delay).map(u16::from)
    }
}
