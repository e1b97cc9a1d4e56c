use crate::{Driver, Error, Range, TwiMaster};
use embedded_hal::delay::DelayNs;

pub trait Sensor {
    /// returns the milliseconds required to wait until the measurement finished
    fn start_measurement<T: TwiMaster>(
        &self,
        driver: &mut Driver<T>,
        delay: &mut impl DelayNs,
    ) -> Result<u32, Error<T::Error>>;

    /// returns the measured value
    fn read_measurement<T: TwiMaster>(
        &self,
        driver: &mut Driver<T>,
        delay: &mut impl DelayNs,
    ) -> Result<Range, Error<T::Error>>;

    fn read_measurement_raw<T: TwiMaster>(
        &self,
        driver: &mut Driver<T>,
        delay: &mut impl DelayNs,
    ) -> Result<u16, Error<T::Error>>;
}
