pub trait OpCode {
    fn op_code(&self) -> u8;
}

/// Commands written to the SRF02 command register
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Command {
    /// Real ranging mode, result in inches
    RangeInches = 0x50,
    /// Real ranging mode, result in centimeters
    RangeCentimeters = 0x51,
    /// Real ranging mode, result in microseconds
    RangeMicroseconds = 0x52,
}

impl OpCode for Command {
    fn op_code(&self) -> u8 {
        *self as _
    }
}

/// Internal register index of the SRF02
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Register {
    /// Command register when written, software revision when read
    Command = 0x00,
    /// First of the two result bytes, high byte first
    RangeHigh = 0x02,
}

impl OpCode for Register {
    fn op_code(&self) -> u8 {
        *self as _
    }
}
