pub mod dvalue;

// Re-export types for convenience.
pub use crate::types::dvalue::{DValue, IntoDValue};
