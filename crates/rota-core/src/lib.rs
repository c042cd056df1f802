pub mod command;
pub mod config;
pub mod error;
pub mod rotation;
pub mod secret;

pub use error::{Result, RotaError};
