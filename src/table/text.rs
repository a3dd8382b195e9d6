//! Text Format Loader
//!
//! One record per line: a word token followed by exactly `D` float tokens,
//! separated by spaces or tabs. Blank lines are skipped. A record with fewer
//! or more than `D` values on its line is rejected. Values are stored as
//! read, without normalization.

use std::io::BufRead;
use tracing::info;

use super::scanner::{DelimitedReader, ScanError};
use super::{LoadOptions, TableBuilder, VectorTable};
use crate::error::{LoadError, LoadResult};

pub(crate) fn read_text<R: BufRead>(
    reader: R,
    dimension: usize,
    options: &LoadOptions,
) -> LoadResult<VectorTable> {
    if dimension == 0 {
        return Err(LoadError::InvalidDimension(dimension));
    }

    info!(dimension, "Reading text word vectors");

    let mut scanner = DelimitedReader::new(reader);
    let mut builder = TableBuilder::new(dimension);
    let mut row = vec![0.0f32; dimension];
    let limit = options.max_word_bytes;

    loop {
        let record = builder.len();

        let word = match scan(&mut scanner, record, |s| s.read_token(limit))? {
            Some(word) => word,
            None => break,
        };

        for (i, slot) in row.iter_mut().enumerate() {
            let token = scan(&mut scanner, record, |s| s.read_token_in_line(limit))?;
            let token = token.ok_or_else(|| LoadError::MalformedRecord {
                record,
                reason: format!("expected {} values, found {} before end of line", dimension, i),
            })?;
            *slot = parse_float(&token).ok_or_else(|| LoadError::MalformedRecord {
                record,
                reason: format!(
                    "value {} '{}' is not a float",
                    i,
                    String::from_utf8_lossy(&token)
                ),
            })?;
        }

        if let Some(extra) = scan(&mut scanner, record, |s| s.read_token_in_line(limit))? {
            return Err(LoadError::MalformedRecord {
                record,
                reason: format!(
                    "expected {} values, found trailing '{}'",
                    dimension,
                    String::from_utf8_lossy(&extra)
                ),
            });
        }

        builder.push(word, &row)?;
    }

    Ok(builder.finish())
}

fn scan<R, F>(scanner: &mut DelimitedReader<R>, record: usize, read: F) -> LoadResult<Option<Vec<u8>>>
where
    R: BufRead,
    F: FnOnce(&mut DelimitedReader<R>) -> Result<Option<Vec<u8>>, ScanError>,
{
    read(&mut *scanner).map_err(|e| match e {
        ScanError::Io(e) => LoadError::Io(e),
        other => LoadError::MalformedRecord {
            record,
            reason: format!("token at byte {}: {}", scanner.offset(), other),
        },
    })
}

fn parse_float(token: &[u8]) -> Option<f32> {
    std::str::from_utf8(token).ok()?.parse().ok()
}
