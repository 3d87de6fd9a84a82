pub mod types;
pub mod error;
pub mod storage;
pub mod history;
pub mod source;
pub mod ingest;
pub mod aggregate;
pub mod refdata;
pub mod predict;
pub mod config;
pub mod utils;

pub use types::*;
pub use error::{OddsError, Result};
