// Types representing taxa, resources, and their revision history

mod error;
mod types;

// Re-export all public symbols
pub use error::*;
pub use types::*;
