//! DX7 algorithm numbering on top of the free-form XFM2 topology.
//!
//! Each row holds the six algorithm bytes (operators 1 to 6) followed by the
//! feedback selector of that algorithm. The byte layout is described in
//! [`crate::operator`].

use crate::controller::Controller;
use crate::error::{Error, Result};
use crate::events::SynthEvent;
use crate::parameter::{OPERATOR_COUNT, algorithm_address};
use crate::transport::Transport;

pub const ALGORITHM_COUNT: u8 = 32;

#[rustfmt::skip]
pub const ALGORITHMS: [[u8; OPERATOR_COUNT + 1]; ALGORITHM_COUNT as usize] = [
    [ 5, 0,  17, 32, 64,  0, 5],
    [ 5, 0,  17, 32, 64,  0, 1],
    [ 5, 8,   0, 33, 64,  0, 5],
    [ 5, 8,   0, 33, 64, 16, 5],
    [ 5, 0,  17,  0, 65,  0, 5],
    [ 1, 4,  17,  0, 65, 32, 5],
    [ 5, 0,  49,  0, 64,  0, 5],
    [ 5, 0,  49,  0, 64,  0, 3],
    [ 5, 0,  49,  0, 64,  0, 1],
    [ 5, 8,   0, 97,  0,  0, 2],
    [ 5, 8,   0, 97,  0,  0, 5],
    [ 5, 0, 113,  0,  0,  0, 1],
    [ 5, 0, 113,  0,  0,  0, 5],
    [ 5, 0,  17, 96,  0,  0, 5],
    [ 5, 0,  17, 96,  0,  0, 1],
    [45, 0,  16,  0, 64,  0, 5],
    [45, 0,  16,  0, 64,  0, 1],
    [29, 0,   0, 32, 64,  0, 2],
    [ 5, 8,   0, 65, 65,  0, 5],
    [ 9, 9,   0, 65, 64,  0, 2],
    [ 9, 9,   0, 65, 65,  0, 2],
    [ 5, 0,  65, 65, 65,  0, 5],
    [ 1, 9,   0, 65, 65,  0, 5],
    [ 1, 1,  65, 65, 65,  0, 5],
    [ 1, 1,   1, 65, 65,  0, 5],
    [ 1, 9,   0, 97,  0,  0, 5],
    [ 1, 9,   0, 97,  0,  0, 2],
    [ 5, 0,  17, 32,  0,  1, 4],
    [ 1, 1,  17,  0, 65,  0, 5],
    [ 1, 1,  17, 32,  0,  1, 4],
    [ 1, 1,   1,  1, 65,  0, 5],
    [ 1, 1,   1,  1,  1,  1, 5],
];

fn row(algorithm: u8) -> Result<&'static [u8; OPERATOR_COUNT + 1]> {
    algorithm
        .checked_sub(1)
        .and_then(|i| ALGORITHMS.get(usize::from(i)))
        .ok_or(Error::AlgorithmOutOfRange(algorithm))
}

/// The six algorithm bytes of DX7 algorithm `algorithm` (1-based).
pub fn operator_bytes(algorithm: u8) -> Result<[u8; OPERATOR_COUNT]> {
    let row = row(algorithm)?;
    let mut bytes = [0; OPERATOR_COUNT];
    bytes.copy_from_slice(&row[..OPERATOR_COUNT]);
    Ok(bytes)
}

/// Feedback selector of DX7 algorithm `algorithm` (1-based).
pub fn feedback_selector(algorithm: u8) -> Result<u8> {
    Ok(row(algorithm)?[OPERATOR_COUNT])
}

/// Finds the DX7 algorithm whose operator bytes match `bytes` exactly.
/// Algorithms that differ only in feedback routing share their bytes; the
/// lowest number wins.
#[must_use]
pub fn find_algorithm(bytes: &[u8; OPERATOR_COUNT]) -> Option<u8> {
    (1..=ALGORITHM_COUNT).find(|&n| operator_bytes(n).is_ok_and(|row| &row == bytes))
}

impl<T: Transport> Controller<T> {
    /// Rewrites the six algorithm bytes for DX7 algorithm `algorithm`
    /// (1..=32). Nothing else is touched; the feedback selector is only
    /// available through [`feedback_selector`].
    pub fn apply_algorithm(&mut self, algorithm: u8) -> Result<()> {
        let bytes = operator_bytes(algorithm)?;

        for (op, byte) in bytes.into_iter().enumerate() {
            self.write_parameter(algorithm_address(op), byte)?;
        }

        tracing::debug!("applied algorithm {algorithm}");
        self.notify(SynthEvent::TopologyChanged);
        Ok(())
    }

    /// The DX7 algorithm matching the current topology, if there is one.
    pub fn current_algorithm(&mut self) -> Result<Option<u8>> {
        let mut bytes = [0; OPERATOR_COUNT];
        for (op, byte) in bytes.iter_mut().enumerate() {
            *byte = self.read_parameter(algorithm_address(op), true)?;
        }
        Ok(find_algorithm(&bytes))
    }
}
