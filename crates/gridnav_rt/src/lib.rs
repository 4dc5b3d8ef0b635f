pub mod error;
pub mod health;
pub mod solver;
pub mod wire;

pub use error::{Result, RtError};
