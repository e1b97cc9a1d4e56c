use core::fmt::{Debug, Display, Formatter, Result as FmtResult};

use crate::Flag;

/// Error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E: Sized + Debug> {
    /// The device did not acknowledge its address frame, not even after retrying
    AddressNack { address: u8, attempts: u8 },
    /// The device refused a data byte
    DataNack,
    /// The flag never came up within the configured deadline
    BusTimeout(Flag),
    /// Arbitration lost or bus error reported by the peripheral
    BusFault,
    /// The sensor was still ranging when the completion poll gave up
    RangingTimeout,
    PortError(E),
}

impl<E: Sized + Debug> Error<E> {
    /// A missing acknowledge usually means the sensor is busy or absent,
    /// so trying again later may succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::AddressNack { .. } | Error::DataNack | Error::RangingTimeout
        )
    }
}

impl<E: Sized + Debug> Display for Error<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{self:?}")
    }
}

impl<E: Sized + Debug> From<E> for Error<E> {
    fn from(e: E) -> Self {
        Error::PortError(e)
    }
}
