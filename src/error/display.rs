use std::{fmt, path::Path};

use owo_colors::OwoColorize;

use crate::parsing::ParsingError;

/// One problem found in a document, located by line (and column, except for
/// header problems which concern the whole header).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub problem: String,
    pub line: usize,
    pub column: Option<usize>,
    pub code: String,
}

impl ParseError {
    pub fn new(source: &str, error: &ParsingError) -> ParseError {
        let offset = error
            .offset()
            .min(source.len());
        let i = calculate_line_number(source, offset);
        let j = calculate_column_number(source, offset);

        let code = source
            .split('\n')
            .nth(i)
            .unwrap_or("")
            .trim_end()
            .to_string();

        ParseError {
            problem: error.message(),
            line: i + 1,
            column: if error.has_column() { Some(j + 1) } else { None },
            code,
        }
    }

    // Verbose detailed explanation
    pub fn full_details(&self, filename: &Path) -> String {
        let width = self
            .line
            .to_string()
            .len();
        let width = 3.max(width);

        let position = match self.column {
            Some(column) => format!("{}:{}", self.line, column),
            None => self
                .line
                .to_string(),
        };
        let j = self
            .column
            .unwrap_or(1);

        format!(
            r#"
{}: {}
{}:{}

{:width$} {}
{:width$} {} {}
{:width$} {} {:>j$}
            "#,
            "error".bright_red(),
            self.problem
                .bold(),
            filename.to_string_lossy(),
            position,
            ' ',
            '|'.bright_blue(),
            self.line
                .bright_blue(),
            '|'.bright_blue(),
            self.code,
            ' ',
            '|'.bright_blue(),
            '^'.bright_red(),
        )
        .trim_ascii()
        .to_string()
    }
}

// Concise version for internal use
impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.column {
            Some(column) => write!(f, "{}:{} {}", self.line, column, self.problem),
            None => write!(f, "{} {}", self.line, self.problem),
        }
    }
}

/// Every problem found in a document. A document either parses completely or
/// fails with all of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    pub errors: Vec<ParseError>,
}

impl ParseFailure {
    pub fn new(source: &str, mut errors: Vec<ParsingError>) -> ParseFailure {
        errors.sort_by_key(ParsingError::offset);

        ParseFailure {
            errors: errors
                .iter()
                .map(|error| ParseError::new(source, error))
                .collect(),
        }
    }

    pub fn full_details(&self, filename: &Path) -> String {
        self.errors
            .iter()
            .map(|error| error.full_details(filename))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self
            .errors
            .len();
        write!(
            f,
            "Parsing failed with {} error{}",
            n,
            if n == 1 { "" } else { "s" }
        )?;
        for error in &self.errors {
            write!(f, "\n  {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseFailure {}

// This returns a zero-origin result so that it can subsequently be used for
// splitting; for display to humans you'll have to add 1.
fn calculate_line_number(content: &str, offset: usize) -> usize {
    content[..offset]
        .bytes()
        .filter(|&b| b == b'\n')
        .count()
}

// Calculate the column number, also zero-origin for consistency.
fn calculate_column_number(content: &str, offset: usize) -> usize {
    let before = &content[..offset];
    match before.rfind('\n') {
        Some(start) => before[start + 1..]
            .chars()
            .count(),
        None => before
            .chars()
            .count(),
    }
}
