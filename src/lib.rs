#![cfg_attr(not(test), no_std)]
#![doc = include_str!("../README.md")]

mod fmt; // must stay first, the logging macros are textually scoped

mod address;
mod command;
mod config;
mod driver;
mod result;
mod sensor;
#[cfg(test)]
mod sim;
mod srf02;
mod twi;

pub use address::Address;
pub use command::{Command, OpCode, Register};
pub use config::{Config, RangingWait};
pub use driver::Driver;
pub use result::Error;
pub use sensor::Sensor;
pub use srf02::{Range, Srf02};
pub use twi::{baud_divisor, BusState, Flag, MasterCommand, Registers, Status, TwiMaster};
