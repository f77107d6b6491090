// Compiled-once regular expressions

#[macro_use]
mod cache;
