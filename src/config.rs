use crate::twi::baud_divisor;

/// What to do between triggering a ranging cycle and reading its result
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RangingWait {
    /// Read back right away. The result may belong to the previous cycle.
    Immediate,
    /// Sleep a fixed time, the SRF02 needs up to 65ms per cycle
    Delay { ms: u32 },
    /// Poll the revision register, which reads 0xFF (or NACKs) while ranging
    Poll { interval_ms: u32, timeout_ms: u32 },
}

impl RangingWait {
    /// Upper bound of milliseconds the wait may take
    pub fn time_ms(&self) -> u32 {
        match self {
            RangingWait::Immediate => 0,
            RangingWait::Delay { ms } => *ms,
            RangingWait::Poll { timeout_ms, .. } => *timeout_ms,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Peripheral input clock
    pub cpu_hz: u32,
    /// Target SCL frequency
    pub bus_hz: u32,
    pub poll_interval_us: u32,
    /// Deadline for any single status wait
    pub timeout_us: u32,
    /// Address phases tried before giving up on a NACK, at least one
    pub address_attempts: u8,
    pub ranging: RangingWait,
}

impl Config {
    pub const fn baud(&self) -> u8 {
        baud_divisor(self.cpu_hz, self.bus_hz)
    }

    /// Number of status reads a wait may take before timing out
    pub fn poll_budget(&self) -> u32 {
        match self.poll_interval_us {
            0 => self.timeout_us.max(1),
            interval => (self.timeout_us / interval).max(1),
        }
    }

    pub fn with_ranging(mut self, ranging: RangingWait) -> Self {
        self.ranging = ranging;
        self
    }

    pub fn with_timeout_us(mut self, timeout_us: u32) -> Self {
        self.timeout_us = timeout_us;
        self
    }

    pub fn with_address_attempts(mut self, attempts: u8) -> Self {
        self.address_attempts = attempts;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cpu_hz: 32_000_000,
            bus_hz: 100_000,
            poll_interval_us: 10,
            timeout_us: 10_000,
            address_attempts: 3,
            ranging: RangingWait::Delay { ms: 70 },
        }
    }
}
