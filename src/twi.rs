use core::fmt::{Debug, Formatter, Result as FmtResult};
use core::ptr;

// CTRLA
const CTRLA_ENABLE: u8 = 0x08;

// STATUS
const STATUS_RIF: u8 = 0x80; // read interrupt flag, a byte has arrived
const STATUS_WIF: u8 = 0x40; // write interrupt flag
const STATUS_CLKHOLD: u8 = 0x20;
const STATUS_RXACK: u8 = 0x10; // set when the last frame was NOT acknowledged
const STATUS_ARBLOST: u8 = 0x08;
const STATUS_BUSERR: u8 = 0x04;
const STATUS_BUSSTATE_MASK: u8 = 0x03;
const BUSSTATE_IDLE: u8 = 0x01;

// CTRLC
const CTRLC_ACKACT: u8 = 0x04;
const CTRLC_CMD_RECVTRANS: u8 = 0x02;
const CTRLC_CMD_STOP: u8 = 0x03;

/// Master-mode two-wire peripheral, one register access per method
pub trait TwiMaster {
    type Error: Debug;

    /// Programs the clock-rate divisor
    fn set_baud(&mut self, divisor: u8) -> Result<(), Self::Error>;

    /// Turns the master function on, leaving other control bits as they are
    fn enable_master(&mut self) -> Result<(), Self::Error>;

    /// Forces the bus state machine to idle
    fn force_idle(&mut self) -> Result<(), Self::Error>;

    /// Snapshot of the status register
    fn status(&self) -> Result<Status, Self::Error>;

    /// Issues a (repeated) start condition and transmits the address frame
    ///
    /// *NOTE* bit 0 of `frame` is the read/write bit
    fn write_address(&mut self, frame: u8) -> Result<(), Self::Error>;

    /// Transmits a data byte
    fn write_data(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Fetches the last received byte
    fn read_data(&mut self) -> Result<u8, Self::Error>;

    fn command(&mut self, command: MasterCommand) -> Result<(), Self::Error>;
}

impl<T: TwiMaster + ?Sized> TwiMaster for &mut T {
    type Error = T::Error;

    fn set_baud(&mut self, divisor: u8) -> Result<(), Self::Error> {
        (**self).set_baud(divisor)
    }

    fn enable_master(&mut self) -> Result<(), Self::Error> {
        (**self).enable_master()
    }

    fn force_idle(&mut self) -> Result<(), Self::Error> {
        (**self).force_idle()
    }

    fn status(&self) -> Result<Status, Self::Error> {
        (**self).status()
    }

    fn write_address(&mut self, frame: u8) -> Result<(), Self::Error> {
        (**self).write_address(frame)
    }

    fn write_data(&mut self, byte: u8) -> Result<(), Self::Error> {
        (**self).write_data(byte)
    }

    fn read_data(&mut self) -> Result<u8, Self::Error> {
        (**self).read_data()
    }

    fn command(&mut self, command: MasterCommand) -> Result<(), Self::Error> {
        (**self).command(command)
    }
}

/// Commands accepted by the master control register
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum MasterCommand {
    /// Acknowledge the byte just received and clock in the next one
    AckContinue = CTRLC_CMD_RECVTRANS,
    Stop = CTRLC_CMD_STOP,
    /// Refuse further bytes and release the bus
    NackStop = CTRLC_ACKACT | CTRLC_CMD_STOP,
}

impl MasterCommand {
    pub fn bits(&self) -> u8 {
        *self as _
    }
}

/// Status condition the driver can wait for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Flag {
    /// Outbound byte phase complete, clock held until the next instruction
    ClockHold,
    /// An inbound byte has fully arrived
    ReceiveComplete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusState {
    Unknown,
    Idle,
    Owner,
    Busy,
}

#[derive(Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status(pub u8);

impl Status {
    pub const RECEIVE_COMPLETE: u8 = STATUS_RIF;
    pub const WRITE_COMPLETE: u8 = STATUS_WIF;
    pub const CLOCK_HOLD: u8 = STATUS_CLKHOLD;
    pub const NACK: u8 = STATUS_RXACK;
    pub const ARBITRATION_LOST: u8 = STATUS_ARBLOST;
    pub const BUS_ERROR: u8 = STATUS_BUSERR;

    pub fn is_receive_complete(&self) -> bool {
        0 != self.0 & STATUS_RIF
    }
    pub fn is_write_complete(&self) -> bool {
        0 != self.0 & STATUS_WIF
    }
    pub fn is_clock_hold(&self) -> bool {
        0 != self.0 & STATUS_CLKHOLD
    }
    /// The slave pulled SDA low on the ninth clock of the last frame
    pub fn is_acknowledged(&self) -> bool {
        0 == self.0 & STATUS_RXACK
    }
    pub fn is_arbitration_lost(&self) -> bool {
        0 != self.0 & STATUS_ARBLOST
    }
    pub fn is_bus_error(&self) -> bool {
        0 != self.0 & STATUS_BUSERR
    }
    pub fn is_fault(&self) -> bool {
        self.is_arbitration_lost() || self.is_bus_error()
    }

    pub fn is_set(&self, flag: Flag) -> bool {
        match flag {
            Flag::ClockHold => self.is_clock_hold(),
            Flag::ReceiveComplete => self.is_receive_complete(),
        }
    }

    pub fn bus_state(&self) -> BusState {
        match self.0 & STATUS_BUSSTATE_MASK {
            0x00 => BusState::Unknown,
            0x01 => BusState::Idle,
            0x02 => BusState::Owner,
            _ => BusState::Busy,
        }
    }

    pub fn with(self, bits: u8) -> Self {
        Status(self.0 | bits)
    }

    pub fn without(self, bits: u8) -> Self {
        Status(self.0 & !bits)
    }

    pub fn with_bus_state(self, state: BusState) -> Self {
        let bits = match state {
            BusState::Unknown => 0x00,
            BusState::Idle => 0x01,
            BusState::Owner => 0x02,
            BusState::Busy => 0x03,
        };
        Status((self.0 & !STATUS_BUSSTATE_MASK) | bits)
    }
}

impl Debug for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "0x{:02x} ({:?}", self.0, self.bus_state())?;
        if self.is_receive_complete() { write!(f, " [RIF]")?; }
        if self.is_write_complete() { write!(f, " [WIF]")?; }
        if self.is_clock_hold() { write!(f, " [CLKHOLD]")?; }
        if !self.is_acknowledged() { write!(f, " [NACK]")?; }
        if self.is_arbitration_lost() { write!(f, " [ARBLOST]")?; }
        if self.is_bus_error() { write!(f, " [BUSERR]")?; }
        write!(f, ")")
    }
}

/// `BAUD = f_cpu / (2 * f_scl) - 5`, saturating at the register bounds.
/// A zero bus frequency yields the slowest clock.
pub const fn baud_divisor(cpu_hz: u32, bus_hz: u32) -> u8 {
    let ratio = match bus_hz.checked_mul(2) {
        Some(0) => return u8::MAX,
        Some(twice) => cpu_hz / twice,
        None => 0,
    };
    if ratio <= 5 {
        0
    } else if ratio - 5 > u8::MAX as u32 {
        u8::MAX
    } else {
        (ratio - 5) as u8
    }
}

/// Memory-mapped XMEGA `TWIx.MASTER` register block
pub struct Registers {
    base: *mut u8,
}

impl Registers {
    /// `TWIC.MASTER` on the ATxmega A/AU parts
    pub const TWIC_MASTER: usize = 0x0481;

    const CTRLA: usize = 0;
    // CTRLB (smart mode, quick command) is left at reset
    const CTRLC: usize = 2;
    const STATUS: usize = 3;
    const BAUD: usize = 4;
    const ADDR: usize = 5;
    const DATA: usize = 6;

    /// The length of the register block in bytes
    pub const LEN: usize = 7;

    /// # Safety
    ///
    /// `base` must point at a TWI master register block (or [`Self::LEN`] bytes
    /// of writable memory) that nothing else accesses while this value lives.
    pub unsafe fn new(base: usize) -> Self {
        Registers {
            base: base as *mut u8,
        }
    }

    #[inline(always)]
    fn read(&self, offset: usize) -> u8 {
        unsafe { ptr::read_volatile(self.base.add(offset)) }
    }

    #[inline(always)]
    fn write(&mut self, offset: usize, value: u8) {
        unsafe { ptr::write_volatile(self.base.add(offset), value) }
    }
}

impl TwiMaster for Registers {
    type Error = core::convert::Infallible;

    fn set_baud(&mut self, divisor: u8) -> Result<(), Self::Error> {
        self.write(Self::BAUD, divisor);
        Ok(())
    }

    fn enable_master(&mut self) -> Result<(), Self::Error> {
        let ctrla = self.read(Self::CTRLA);
        self.write(Self::CTRLA, ctrla | CTRLA_ENABLE);
        Ok(())
    }

    fn force_idle(&mut self) -> Result<(), Self::Error> {
        let status = self.read(Self::STATUS);
        self.write(
            Self::STATUS,
            (status & !STATUS_BUSSTATE_MASK) | BUSSTATE_IDLE,
        );
        Ok(())
    }

    fn status(&self) -> Result<Status, Self::Error> {
        Ok(Status(self.read(Self::STATUS)))
    }

    fn write_address(&mut self, frame: u8) -> Result<(), Self::Error> {
        self.write(Self::ADDR, frame);
        Ok(())
    }

    fn write_data(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.write(Self::DATA, byte);
        Ok(())
    }

    fn read_data(&mut self) -> Result<u8, Self::Error> {
        Ok(self.read(Self::DATA))
    }

    fn command(&mut self, command: MasterCommand) -> Result<(), Self::Error> {
        self.write(Self::CTRLC, command.bits());
        Ok(())
    }
}
