//! Parser for documents holding one or more identification keys

use std::path::Path;
use tracing::debug;

use crate::error::ParseFailure;
use crate::language::{History, LoadingError, Resource, ResourceMetadata};

mod header;
pub mod names;
mod parser;
mod scope;

pub use header::{parse_header, HeaderError};
pub use parser::ParsingError;

use parser::ResourceParser;

const SEPARATOR: &str = "\n\n===\n\n";

/// Read a key file, or the earlier revision of one handed to `--previous`.
/// Key files are often saved by editors that prepend a byte order mark; it
/// is dropped so that offsets count from the first header line.
pub fn load(filename: &Path) -> Result<String, LoadingError<'_>> {
    let failure = |problem: &str, details: String| LoadingError {
        problem: problem.to_string(),
        details,
        filename,
    };

    let content = std::fs::read_to_string(filename).map_err(|error| {
        debug!(?error, file = %filename.display());
        match error.kind() {
            std::io::ErrorKind::NotFound => failure("Key file not found", String::new()),
            std::io::ErrorKind::InvalidData => failure("Key file is not UTF-8 text", String::new()),
            kind => failure("Failed reading key file", kind.to_string()),
        }
    })?;

    Ok(match content.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => content,
    })
}

/// A resource as written: where it starts in the document, its YAML header,
/// and its lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Block<'i> {
    offset: usize,
    header: &'i str,
    content: &'i str,
    content_offset: usize,
}

fn split_blocks(source: &str) -> Vec<(usize, &str)> {
    let mut blocks = Vec::new();
    let mut start = 0;

    for (at, _) in source.match_indices(SEPARATOR) {
        blocks.push((start, &source[start..at]));
        start = at + SEPARATOR.len();
    }
    blocks.push((start, &source[start..]));

    blocks
}

fn split_block(offset: usize, text: &str) -> Result<Block<'_>, ParsingError> {
    match compile!(r"\n---\n+").find(text) {
        Some(found) => Ok(Block {
            offset,
            header: &text[..found.start()],
            content: &text[found.end()..],
            content_offset: offset + found.end(),
        }),
        None => Err(ParsingError::InvalidHeader(
            offset,
            HeaderError::MissingSeparator,
        )),
    }
}

fn read_block(offset: usize, text: &str) -> Result<(Block<'_>, ResourceMetadata), ParsingError> {
    let block = split_block(offset, text)?;
    let metadata = parse_header(block.header)
        .map_err(|problem| ParsingError::InvalidHeader(block.offset, problem))?;
    Ok((block, metadata))
}

/// Parse every resource in a document. The resources of work `work_id` are
/// numbered from 1 in document order. Given the previous revision of the
/// document, taxa whose lines survived keep the identifiers they had.
pub fn parse_file(
    source: &str,
    work_id: &str,
    previous: Option<&History>,
) -> Result<Vec<Resource>, ParseFailure> {
    let old_blocks: Vec<Option<&str>> = match previous {
        Some(history) => split_blocks(&history.text)
            .into_iter()
            .map(|(offset, text)| {
                split_block(offset, text)
                    .ok()
                    .map(|block| block.content)
            })
            .collect(),
        None => Vec::new(),
    };

    let mut resources = Vec::new();
    let mut errors = Vec::new();

    for (index, (offset, text)) in split_blocks(source)
        .into_iter()
        .enumerate()
    {
        let (block, metadata) = match read_block(offset, text) {
            Ok(result) => result,
            Err(error) => {
                errors.push(error);
                continue;
            }
        };

        let resource = Resource::new(work_id, index + 1, metadata);
        let old = old_blocks
            .get(index)
            .copied()
            .flatten();
        let old_ids = previous
            .and_then(|history| {
                history
                    .ids
                    .get(index)
            })
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        match ResourceParser::new(resource, block.content, block.content_offset).parse(old, old_ids) {
            Ok(resource) => {
                let n = resource
                    .taxa
                    .len();
                debug!(
                    "Resource {} has {} tax{}",
                    resource.id,
                    n,
                    if n == 1 { "on" } else { "a" }
                );
                resources.push(resource);
            }
            Err(problems) => errors.extend(problems),
        }
    }

    if errors.is_empty() {
        debug!(
            "Found {} resource{}",
            resources.len(),
            if resources.len() == 1 { "" } else { "s" }
        );
        Ok(resources)
    } else {
        debug!("errors: {}", errors.len());
        Err(ParseFailure::new(source, errors))
    }
}

/// Read only the headers of a document's resources.
pub fn parse_file_header(source: &str) -> Result<Vec<ResourceMetadata>, ParseFailure> {
    let mut headers = Vec::new();
    let mut errors = Vec::new();

    for (offset, text) in split_blocks(source) {
        match read_block(offset, text) {
            Ok((_, metadata)) => headers.push(metadata),
            Err(error) => errors.push(error),
        }
    }

    if errors.is_empty() {
        Ok(headers)
    } else {
        Err(ParseFailure::new(source, errors))
    }
}
