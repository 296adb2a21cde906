#![forbid(unsafe_code)]

pub mod audit;
pub mod autofix;
pub mod cli;
pub mod color;
pub mod config;
pub mod contrast;
pub mod driver;
pub mod error;
pub mod report;
pub mod theme;
pub mod util;

pub use cli::run_from_env;
pub use error::{CheckError, Result};
