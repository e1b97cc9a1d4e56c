//! Simulated TWI master with an SRF02 attached, for tests

use core::convert::Infallible;
use embedded_hal::delay::DelayNs;

use crate::{BusState, Flag, MasterCommand, Status, TwiMaster};

const CTRLA_ENABLE: u8 = 0x08;
const SOFTWARE_REVISION: u8 = 0x06;
const PHASE_FLAGS: u8 =
    Status::RECEIVE_COMPLETE | Status::WRITE_COMPLETE | Status::CLOCK_HOLD | Status::NACK;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Address(u8),
    Data(u8),
    Read(u8),
    Command(MasterCommand),
}

pub struct SimTwi {
    pub baud: u8,
    pub ctrla: u8,
    pub status: Status,
    pub events: Vec<Event>,
    /// Sensor register file
    pub memory: [u8; 6],
    /// Copied into the result registers by a ranging command
    pub range: [u8; 2],
    pub present: bool,
    /// Address phases to refuse before acknowledging
    pub nack_addresses: u8,
    pub nack_data: bool,
    /// Address frame to refuse, and how many times
    pub nack_frame: Option<(u8, u8)>,
    /// Data byte to refuse
    pub nack_byte: Option<u8>,
    /// Flag that is never reported set
    pub stuck: Option<Flag>,
    pub bus_error: bool,
    /// Revision reads answered with 0xFF after each ranging command
    pub ranging_busy_reads: u8,
    /// Address phases refused after each ranging command
    pub ranging_busy_nacks: u8,
    pub rangings: u32,
    busy_reads: u8,
    busy_nacks: u8,
    data: u8,
    pointer: u8,
    selecting: bool,
    reading: bool,
}

impl SimTwi {
    pub fn new() -> Self {
        let mut memory = [0u8; 6];
        memory[0] = SOFTWARE_REVISION;
        SimTwi {
            baud: 0,
            ctrla: 0,
            status: Status::default(),
            events: Vec::new(),
            memory,
            range: [0, 0],
            present: true,
            nack_addresses: 0,
            nack_data: false,
            nack_frame: None,
            nack_byte: None,
            stuck: None,
            bus_error: false,
            ranging_busy_reads: 0,
            ranging_busy_nacks: 0,
            rangings: 0,
            busy_reads: 0,
            busy_nacks: 0,
            data: 0,
            pointer: 0,
            selecting: false,
            reading: false,
        }
    }

    pub fn with_range(high: u8, low: u8) -> Self {
        let mut sim = Self::new();
        sim.range = [high, low];
        sim
    }

    pub fn master_enabled(&self) -> bool {
        0 != self.ctrla & CTRLA_ENABLE
    }

    /// Configuration registers: baud, control A and status
    pub fn snapshot(&self) -> (u8, u8, u8) {
        (self.baud, self.ctrla, self.status.0)
    }

    fn acknowledge_address(&mut self, frame: u8) -> bool {
        if !self.present {
            return false;
        }
        if let Some((refused, remaining)) = self.nack_frame {
            if refused == frame && remaining > 0 {
                self.nack_frame = Some((refused, remaining - 1));
                return false;
            }
        }
        if self.nack_addresses > 0 {
            self.nack_addresses -= 1;
            return false;
        }
        if self.busy_nacks > 0 {
            self.busy_nacks -= 1;
            return false;
        }
        true
    }

    fn load_next(&mut self) {
        let index = self.pointer as usize;
        self.data = if index == 0 && self.busy_reads > 0 {
            self.busy_reads -= 1;
            0xFF
        } else {
            self.memory.get(index).copied().unwrap_or(0)
        };
        self.pointer = self.pointer.wrapping_add(1);
    }

    fn execute(&mut self, command: u8) {
        if (0x50..=0x52).contains(&command) {
            self.memory[2] = self.range[0];
            self.memory[3] = self.range[1];
            self.busy_reads = self.ranging_busy_reads;
            self.busy_nacks = self.ranging_busy_nacks;
            self.rangings += 1;
        }
    }
}

impl TwiMaster for SimTwi {
    type Error = Infallible;

    fn set_baud(&mut self, divisor: u8) -> Result<(), Self::Error> {
        self.baud = divisor;
        Ok(())
    }

    fn enable_master(&mut self) -> Result<(), Self::Error> {
        self.ctrla |= CTRLA_ENABLE;
        Ok(())
    }

    fn force_idle(&mut self) -> Result<(), Self::Error> {
        self.status = self.status.with_bus_state(BusState::Idle);
        Ok(())
    }

    fn status(&self) -> Result<Status, Self::Error> {
        let mut status = self.status;
        match self.stuck {
            Some(Flag::ClockHold) => status = status.without(Status::CLOCK_HOLD),
            Some(Flag::ReceiveComplete) => status = status.without(Status::RECEIVE_COMPLETE),
            None => {}
        }
        if self.bus_error {
            status = status.with(Status::BUS_ERROR);
        }
        Ok(status)
    }

    fn write_address(&mut self, frame: u8) -> Result<(), Self::Error> {
        self.events.push(Event::Address(frame));
        self.status = self
            .status
            .without(PHASE_FLAGS)
            .with_bus_state(BusState::Owner);
        if !self.acknowledge_address(frame) {
            self.status = self
                .status
                .with(Status::WRITE_COMPLETE | Status::CLOCK_HOLD | Status::NACK);
            return Ok(());
        }
        if frame & 0x01 != 0 {
            self.reading = true;
            self.load_next();
            self.status = self
                .status
                .with(Status::RECEIVE_COMPLETE | Status::CLOCK_HOLD);
        } else {
            self.reading = false;
            self.selecting = true;
            self.status = self
                .status
                .with(Status::WRITE_COMPLETE | Status::CLOCK_HOLD);
        }
        Ok(())
    }

    fn write_data(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.events.push(Event::Data(byte));
        self.status = self.status.without(PHASE_FLAGS);
        if self.nack_data || self.nack_byte == Some(byte) {
            self.status = self
                .status
                .with(Status::WRITE_COMPLETE | Status::CLOCK_HOLD | Status::NACK);
            return Ok(());
        }
        if self.selecting {
            self.pointer = byte;
            self.selecting = false;
        } else {
            match self.pointer as usize {
                0 => self.execute(byte),
                index if index < self.memory.len() => self.memory[index] = byte,
                _ => {}
            }
            self.pointer = self.pointer.wrapping_add(1);
        }
        self.status = self
            .status
            .with(Status::WRITE_COMPLETE | Status::CLOCK_HOLD);
        Ok(())
    }

    fn read_data(&mut self) -> Result<u8, Self::Error> {
        self.events.push(Event::Read(self.data));
        Ok(self.data)
    }

    fn command(&mut self, command: MasterCommand) -> Result<(), Self::Error> {
        self.events.push(Event::Command(command));
        match command {
            MasterCommand::AckContinue => {
                if self.reading {
                    self.load_next();
                    self.status = self
                        .status
                        .with(Status::RECEIVE_COMPLETE | Status::CLOCK_HOLD);
                }
            }
            MasterCommand::Stop | MasterCommand::NackStop => {
                self.reading = false;
                self.selecting = false;
                self.status = self
                    .status
                    .without(PHASE_FLAGS)
                    .with_bus_state(BusState::Idle);
            }
        }
        Ok(())
    }
}

/// Delay that only counts the time it was asked to wait
#[derive(Debug, Default)]
pub struct Clock {
    elapsed_ns: u64,
}

impl Clock {
    pub fn elapsed_us(&self) -> u64 {
        self.elapsed_ns / 1_000
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ns / 1_000_000
    }
}

impl DelayNs for Clock {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns += u64::from(ns);
    }
}
