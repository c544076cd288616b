//! XFM2 serial command set.
//!
//! Every exchange is one request from the controller followed by a fixed-size
//! response (possibly empty). There is no framing or correlation id, so a
//! response always belongs to the most recent request.
//!
//! | Command  | Request                     | Response  |
//! |----------|-----------------------------|-----------|
//! | Init     | `i`                         | 1 status  |
//! | DumpRead | `d`                         | 512 bytes |
//! | Recall   | `r` slot                    | 1 status  |
//! | Store    | `w` slot                    | 1 status  |
//! | GetOne   | `g` address                 | 1 value   |
//! | SetOne   | `s` address value           | none      |
//!
//! Addresses 0..=255 go out as one byte; 256..=511 as `0xFF, address - 256`.

use crate::parameter::REGISTER_COUNT;

pub const CMD_INIT: u8 = b'i';
pub const CMD_DUMP: u8 = b'd';
pub const CMD_RECALL: u8 = b'r';
pub const CMD_STORE: u8 = b'w';
pub const CMD_GET: u8 = b'g';
pub const CMD_SET: u8 = b's';

/// Prefix for addresses in the upper half of the register space.
pub const HIGH_ADDRESS_ESCAPE: u8 = 0xFF;

/// Number of hardware patch slots.
pub const SLOT_COUNT: usize = 128;
pub const MAX_SLOT: u8 = 127;

/// Clamps any requested slot number into the hardware range.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub const fn clamp_slot(slot: i32) -> u8 {
    if slot < 0 {
        0
    } else if slot > MAX_SLOT as i32 {
        MAX_SLOT
    } else {
        slot as u8
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Reset the working buffer to the default patch.
    Init,
    /// Stream the whole working buffer.
    DumpRead,
    /// Load a patch slot into the working buffer.
    Recall(u8),
    /// Persist the working buffer into a patch slot.
    Store(u8),
    /// Read one register.
    GetOne(u16),
    /// Write one register.
    SetOne(u16, u8),
}

/// An encoded request. The longest one is `s 0xFF lo value`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    bytes: [u8; 4],
    len: usize,
}

impl Frame {
    const fn new(opcode: u8) -> Self {
        Self {
            bytes: [opcode, 0, 0, 0],
            len: 1,
        }
    }

    const fn push(mut self, byte: u8) -> Self {
        self.bytes[self.len] = byte;
        self.len += 1;
        self
    }

    #[allow(clippy::cast_possible_truncation)]
    const fn push_address(self, address: u16) -> Self {
        debug_assert!((address as usize) < REGISTER_COUNT);
        if address < 256 {
            self.push(address as u8)
        } else {
            self.push(HIGH_ADDRESS_ESCAPE).push((address - 256) as u8)
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

impl Command {
    #[must_use]
    pub const fn opcode(self) -> u8 {
        match self {
            Self::Init => CMD_INIT,
            Self::DumpRead => CMD_DUMP,
            Self::Recall(_) => CMD_RECALL,
            Self::Store(_) => CMD_STORE,
            Self::GetOne(_) => CMD_GET,
            Self::SetOne(..) => CMD_SET,
        }
    }

    #[must_use]
    pub const fn encode(self) -> Frame {
        let frame = Frame::new(self.opcode());
        match self {
            Self::Init | Self::DumpRead => frame,
            Self::Recall(slot) | Self::Store(slot) => frame.push(slot),
            Self::GetOne(address) => frame.push_address(address),
            Self::SetOne(address, value) => frame.push_address(address).push(value),
        }
    }

    /// Bytes the synth sends back for this request.
    #[must_use]
    pub const fn response_len(self) -> usize {
        match self {
            Self::Init | Self::Recall(_) | Self::Store(_) | Self::GetOne(_) => 1,
            Self::DumpRead => REGISTER_COUNT,
            Self::SetOne(..) => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn single_byte_commands() {
        assert_eq!(Command::Init.encode().as_bytes(), &[0x69]);
        assert_eq!(Command::DumpRead.encode().as_bytes(), &[0x64]);
    }

    #[test]
    fn slot_commands() {
        assert_eq!(Command::Recall(5).encode().as_bytes(), &[0x72, 5]);
        assert_eq!(Command::Store(127).encode().as_bytes(), &[0x77, 127]);
    }

    #[test]
    fn low_address_is_one_byte() {
        assert_eq!(Command::GetOne(0).encode().as_bytes(), &[0x67, 0]);
        assert_eq!(Command::GetOne(255).encode().as_bytes(), &[0x67, 255]);
        assert_eq!(Command::SetOne(13, 2).encode().as_bytes(), &[0x73, 13, 2]);
    }

    #[test]
    fn high_address_is_escaped() {
        assert_eq!(Command::GetOne(256).encode().as_bytes(), &[0x67, 0xFF, 0]);
        assert_eq!(Command::GetOne(511).encode().as_bytes(), &[0x67, 0xFF, 255]);
        assert_eq!(
            Command::SetOne(410, 7).encode().as_bytes(),
            &[0x73, 0xFF, 154, 7]
        );
    }

    #[test]
    fn response_lengths() {
        assert_eq!(Command::Init.response_len(), 1);
        assert_eq!(Command::DumpRead.response_len(), 512);
        assert_eq!(Command::Recall(0).response_len(), 1);
        assert_eq!(Command::Store(0).response_len(), 1);
        assert_eq!(Command::GetOne(300).response_len(), 1);
        assert_eq!(Command::SetOne(300, 1).response_len(), 0);
    }

    #[test]
    fn slot_clamping() {
        assert_eq!(clamp_slot(-5), 0);
        assert_eq!(clamp_slot(0), 0);
        assert_eq!(clamp_slot(64), 64);
        assert_eq!(clamp_slot(127), 127);
        assert_eq!(clamp_slot(200), 127);
    }
}
