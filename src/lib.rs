pub use crate::errors::{AssembleError, Phase, Result};

pub mod builder;
pub mod cli;
pub mod declarations;
pub mod entry;
pub mod errors;
pub mod layout;
pub mod manifest;
pub mod relocate;
