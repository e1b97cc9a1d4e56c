use crate::{Address, Config, Error, Flag, MasterCommand, Status, TwiMaster};
use core::fmt::Debug;
use embedded_hal::delay::DelayNs;

pub struct Driver<T: TwiMaster> {
    twi: T,
    config: Config,
}

impl<E: Debug, T: TwiMaster<Error = E>> Driver<T> {
    pub fn new(twi: T, config: Config) -> Self {
        Driver { twi, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Gives the peripheral back
    pub fn release(self) -> T {
        self.twi
    }

    /// Programs the clock divisor, enables the master and forces the bus
    /// state to idle. Must run before the first transaction; repeating it
    /// leaves the peripheral in the same state.
    pub fn initialize_bus(&mut self) -> Result<(), Error<E>> {
        let baud = self.config.baud();
        self.twi.set_baud(baud)?;
        self.twi.enable_master()?;
        self.twi.force_idle()?;
        debug!("bus initialized, baud divisor {}", baud);
        Ok(())
    }

    /// start + write frame, register index, data bytes, stop
    pub fn write_register(
        &mut self,
        delay: &mut impl DelayNs,
        address: Address,
        register: u8,
        data: &[u8],
    ) -> Result<(), Error<E>> {
        self.start(delay, address.write_frame())?;
        self.send(delay, register)?;
        self.send_bytes(delay, data)?;
        self.stop()
    }

    /// Selects `register` in a write transaction, then reads `dst.len()`
    /// bytes starting there in a second, read transaction. The last byte is
    /// answered with NACK + stop.
    pub fn read_registers(
        &mut self,
        delay: &mut impl DelayNs,
        address: Address,
        register: u8,
        dst: &mut [u8],
    ) -> Result<(), Error<E>> {
        self.start(delay, address.write_frame())?;
        self.send(delay, register)?;
        self.stop()?;
        if dst.is_empty() {
            return Ok(());
        }
        self.start(delay, address.read_frame())?;
        self.receive(delay, dst)
    }

    /// Sends an address frame, re-sending it after a NACK until the
    /// configured number of attempts is used up
    pub fn start(&mut self, delay: &mut impl DelayNs, frame: u8) -> Result<(), Error<E>> {
        let attempts = self.config.address_attempts.max(1);
        for attempt in 1..=attempts {
            trace!("start, address frame {:#x}", frame);
            self.twi.write_address(frame)?;
            let status = self.wait_for(delay, Flag::ClockHold)?;
            if status.is_acknowledged() {
                return Ok(());
            }
            warn!(
                "address frame {:#x} not acknowledged (attempt {} of {})",
                frame,
                attempt,
                attempts
            );
            self.stop()?;
        }
        Err(Error::AddressNack {
            address: frame,
            attempts,
        })
    }

    pub fn send(&mut self, delay: &mut impl DelayNs, byte: u8) -> Result<(), Error<E>> {
        self.twi.write_data(byte)?;
        let status = self.wait_for(delay, Flag::ClockHold)?;
        if !status.is_acknowledged() {
            warn!("data byte {:#x} not acknowledged", byte);
            self.stop()?;
            return Err(Error::DataNack);
        }
        Ok(())
    }

    pub fn send_bytes(&mut self, delay: &mut impl DelayNs, bytes: &[u8]) -> Result<(), Error<E>> {
        for b in bytes {
            self.send(delay, *b)?;
        }
        Ok(())
    }

    /// Reads bytes of an addressed read transaction, every byte but the
    /// last is acknowledged
    pub fn receive(&mut self, delay: &mut impl DelayNs, dst: &mut [u8]) -> Result<(), Error<E>> {
        for (i, d) in dst.iter_mut().enumerate() {
            if i > 0 {
                self.command(MasterCommand::AckContinue)?;
            }
            self.wait_for(delay, Flag::ReceiveComplete)?;
            *d = self.twi.read_data()?;
        }
        self.command(MasterCommand::NackStop)
    }

    pub fn stop(&mut self) -> Result<(), Error<E>> {
        self.command(MasterCommand::Stop)
    }

    #[inline(always)]
    pub(crate) fn command(&mut self, command: MasterCommand) -> Result<(), Error<E>> {
        self.twi.command(command)?;
        Ok(())
    }

    /// Polls the status register until `flag` is set. Gives up with a
    /// timeout after the configured deadline, or right away on a bus fault.
    /// Either way a stop is attempted to release the bus.
    fn wait_for(&mut self, delay: &mut impl DelayNs, flag: Flag) -> Result<Status, Error<E>> {
        for _ in 0..self.config.poll_budget() {
            let status = self.twi.status()?;
            if status.is_fault() {
                error!("bus fault while waiting for {:?}: {:?}", flag, status);
                let _ = self.twi.command(MasterCommand::Stop);
                return Err(Error::BusFault);
            }
            if status.is_set(flag) {
                return Ok(status);
            }
            delay.delay_us(self.config.poll_interval_us);
        }
        error!(
            "timed out after {}us waiting for {:?}",
            self.config.timeout_us,
            flag
        );
        let _ = self.twi.command(MasterCommand::Stop);
        Err(Error::BusTimeout(flag))
    }
}
