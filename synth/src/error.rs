//! Error types for the synth controller

use thiserror::Error;

/// Synth controller error type
#[derive(Debug, Error)]
pub enum Error {
    /// The operation needs the hardware but the serial port is not open
    #[error("synth is not connected")]
    NotConnected,

    /// Register address outside the 512-byte image
    #[error("register address {0} is out of range (0..=511)")]
    AddressOutOfRange(u16),

    /// Patch slot outside the 128 hardware slots
    #[error("patch slot {0} is out of range (0..=127)")]
    SlotOutOfRange(i32),

    /// Operator index outside the six FM operators
    #[error("operator {0} is out of range (0..=5)")]
    OperatorOutOfRange(usize),

    /// Algorithm number outside the DX7 numbering
    #[error("algorithm {0} is out of range (1..=32)")]
    AlgorithmOutOfRange(u8),

    /// The configured response deadline elapsed
    #[error("response timeout: expected {expected} bytes, received {received}")]
    Timeout { expected: usize, received: usize },

    /// The link reported end of stream in the middle of a response
    #[error("link closed: expected {expected} bytes, received {received}")]
    LinkClosed { expected: usize, received: usize },

    /// Transport or patch-name file I/O
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Opening or configuring the serial port
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// Malformed configuration or snapshot JSON
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
