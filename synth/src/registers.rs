use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use crate::error::{Error, Result};
use crate::parameter::REGISTER_COUNT;

/// In-process mirror of the synth's 512-byte working patch buffer.
///
/// The cache does no I/O on its own: the controller decides when a value
/// comes from the wire and stores the result here.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterCache {
    #[serde_as(as = "Box<[_; 512]>")]
    registers: Box<[u8; REGISTER_COUNT]>,

    /// Set once a full dump has been received. Until then single reads go
    /// to the hardware and single writes stay local.
    #[serde(skip)]
    initialized: bool,
}

impl Default for RegisterCache {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            registers: Box::new([0; REGISTER_COUNT]),
            initialized: false,
        }
    }

    fn index(address: u16) -> Result<usize> {
        if (address as usize) < REGISTER_COUNT {
            Ok(address as usize)
        } else {
            Err(Error::AddressOutOfRange(address))
        }
    }

    pub fn get(&self, address: u16) -> Result<u8> {
        Ok(self.registers[Self::index(address)?])
    }

    pub fn set(&mut self, address: u16, value: u8) -> Result<()> {
        self.registers[Self::index(address)?] = value;
        Ok(())
    }

    /// Replaces the whole image with a full dump and marks the cache as trusted.
    pub fn load_image(&mut self, image: &[u8; REGISTER_COUNT]) {
        self.registers.copy_from_slice(image);
        self.initialized = true;
    }

    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    #[must_use]
    pub fn image(&self) -> &[u8; REGISTER_COUNT] {
        &self.registers
    }
}
