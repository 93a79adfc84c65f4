//! Transaction module: the value types moved from the pending pool into blocks

pub mod types;

pub use types::*;
