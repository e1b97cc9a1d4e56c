/// 7-bit bus address of a slave device
#[derive(Debug, Clone, Copy, PartialOrd, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct Address {
    raw: u8,
}

impl Address {
    /// The length of a device address in bits
    pub const BITS: u8 = 7;

    /// Address the SRF02 ships with, `0xE0`/`0xE1` once framed
    pub const SRF02_DEFAULT: Address = Address { raw: 0x70 };

    pub const fn new(raw: u8) -> Option<Self> {
        if raw >> Self::BITS == 0 {
            Some(Address { raw })
        } else {
            None
        }
    }

    pub const fn raw(&self) -> u8 {
        self.raw
    }

    /// Address byte followed by a cleared R/W bit
    pub const fn write_frame(&self) -> u8 {
        self.raw << 1
    }

    /// Address byte followed by a set R/W bit
    pub const fn read_frame(&self) -> u8 {
        (self.raw << 1) | 0x01
    }
}

impl Default for Address {
    fn default() -> Self {
        Self::SRF02_DEFAULT
    }
}

impl From<Address> for u8 {
    fn from(addr: Address) -> u8 {
        addr.raw
    }
}
