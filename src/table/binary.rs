//! Binary Format Loader
//!
//! Layout:
//!
//! ```text
//! "<W> <D>\n"
//! word₀ ' ' f32le × D  ['\n']
//! word₁ ' ' f32le × D  ['\n']
//! ...
//! ```
//!
//! Words are not length-prefixed, so each one is scanned up to its space
//! delimiter. A single newline left before a word (after the header or a
//! previous record) is dropped. Every decoded vector is L2-normalized.

use std::io::{self, BufRead};
use tracing::{debug, info};

use super::normalize::l2_normalize;
use super::scanner::{DelimitedReader, ScanError};
use super::{decode_word, LoadOptions, TableBuilder, VectorTable};
use crate::error::{LoadError, LoadResult};

/// Longest accepted header line
const MAX_HEADER_BYTES: usize = 128;

pub(crate) fn read_binary<R: BufRead>(reader: R, options: &LoadOptions) -> LoadResult<VectorTable> {
    let mut scanner = DelimitedReader::new(reader);
    let (words, dimension) = read_header(&mut scanner)?;

    info!("vocabulary size: {}, vector size: {}", words, dimension);

    let block_len = dimension
        .checked_mul(4)
        .ok_or_else(|| LoadError::MalformedHeader(format!("dimension {} too large", dimension)))?;

    let mut builder = TableBuilder::with_capacity(dimension, words)?;
    let mut block = vec![0u8; block_len];
    let mut row = vec![0.0f32; dimension];
    // Room for one leading newline in front of the word
    let word_limit = options.max_word_bytes.saturating_add(1);

    for record in 0..words {
        let truncated = || LoadError::TruncatedFile {
            expected: words,
            found: record,
        };

        let mut word = match scanner.read_until(b' ', word_limit) {
            Ok(Some(word)) => word,
            Ok(None) | Err(ScanError::Incomplete { .. }) => return Err(truncated()),
            Err(ScanError::Overrun { limit }) => {
                return Err(LoadError::CorruptRecord {
                    record,
                    reason: format!(
                        "no word delimiter within {} bytes at offset {}",
                        limit,
                        scanner.offset()
                    ),
                })
            }
            Err(ScanError::Io(e)) => return Err(e.into()),
        };

        if word.first() == Some(&b'\n') {
            word.remove(0);
        }
        if word.is_empty() {
            return Err(LoadError::CorruptRecord {
                record,
                reason: format!("empty word at offset {}", scanner.offset()),
            });
        }

        scanner.read_exact(&mut block).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                truncated()
            } else {
                LoadError::Io(e)
            }
        })?;

        for (value, bytes) in row.iter_mut().zip(block.chunks_exact(4)) {
            *value = f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        }

        let norm = l2_normalize(&mut row);
        if norm == 0.0 {
            debug!(record, word = %decode_word(&word), "Zero-norm vector left unnormalized");
        }

        builder.push(word, &row)?;
    }

    Ok(builder.finish())
}

/// Parse the `"<words> <dimension>"` header line
fn read_header<R: BufRead>(scanner: &mut DelimitedReader<R>) -> LoadResult<(usize, usize)> {
    let line = match scanner.read_until(b'\n', MAX_HEADER_BYTES) {
        Ok(Some(line)) => line,
        Ok(None) => return Err(LoadError::MalformedHeader("empty file".to_string())),
        Err(ScanError::Io(e)) => return Err(e.into()),
        Err(e) => return Err(LoadError::MalformedHeader(e.to_string())),
    };

    let text = std::str::from_utf8(&line)
        .map_err(|_| LoadError::MalformedHeader("header is not ASCII".to_string()))?;

    let fields: Vec<&str> = text.split_ascii_whitespace().collect();
    let &[words, dimension] = fields.as_slice() else {
        return Err(LoadError::MalformedHeader(format!(
            "expected '<words> <dimension>', got '{}'",
            text.trim_end()
        )));
    };

    let parse = |field: &str, name: &str| {
        field.parse::<usize>().map_err(|e| {
            LoadError::MalformedHeader(format!("invalid {} '{}': {}", name, field, e))
        })
    };
    let words = parse(words, "vocabulary size")?;
    let dimension = parse(dimension, "dimension")?;

    if dimension == 0 {
        return Err(LoadError::MalformedHeader(
            "dimension must be greater than 0".to_string(),
        ));
    }

    Ok((words, dimension))
}
