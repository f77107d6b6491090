//! Presentation of the problems found while parsing a document.

mod display;

pub use display::*;
