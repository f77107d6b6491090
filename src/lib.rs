//! Parse indented taxonomic identification keys into taxon records whose
//! identifiers survive edits to the key.

#[macro_use]
mod regex;

pub mod catalog;
pub mod diffing;
pub mod error;
pub mod language;
pub mod parsing;
