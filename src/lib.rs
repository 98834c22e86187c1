pub mod config;
pub mod error;
pub mod keymap;
pub mod messages;
pub mod shutdown;
pub mod teleop;
pub mod terminal;

pub use error::{Result, TeleopError};
