#[allow(clippy::cast_possible_truncation)]
mod bitwise;

pub mod algorithm;
pub mod config;

#[allow(clippy::missing_errors_doc)]
pub mod controller;
pub mod error;
pub mod events;

#[allow(clippy::missing_errors_doc)]
pub mod operator;
pub mod parameter;

#[allow(clippy::missing_errors_doc)]
pub mod patch_names;
pub mod protocol;

#[allow(clippy::missing_errors_doc)]
pub mod registers;

#[allow(clippy::missing_errors_doc)]
pub mod snapshot;

#[allow(clippy::missing_errors_doc)]
pub mod transport;

pub use config::Config;
pub use controller::Controller;
pub use error::{Error, Result};
pub use events::{Observer, SynthEvent};
pub use parameter::{Global, OperatorParameter, Parameter};
pub use snapshot::PatchSnapshot;
