//! Vector Table
//!
//! Read-only vocabulary and feature vector table, loaded once from a text
//! or binary word vector file and shared by reference afterwards.

mod binary;
mod normalize;
mod scanner;
mod text;

pub use normalize::{l2_norm, l2_normalize};
pub use scanner::{DelimitedReader, ScanError};

use crate::error::{LoadError, LoadResult};
use hashbrown::HashMap;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// On-disk encoding of a word vector file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// Whitespace-delimited `word f1 .. fD` records; `D` supplied by the caller
    Text { dimension: usize },
    /// `W D` header line followed by `W` packed records; vectors are L2-normalized
    Binary,
}

impl TableFormat {
    /// Build a format from the `binary` / `size` process flags.
    ///
    /// The dimension is required (and must be positive) for text files and
    /// ignored for binary files.
    pub fn from_flags(binary: bool, dimension: Option<usize>) -> LoadResult<Self> {
        if binary {
            return Ok(TableFormat::Binary);
        }
        match dimension {
            Some(d) if d > 0 => Ok(TableFormat::Text { dimension: d }),
            Some(d) => Err(LoadError::InvalidDimension(d)),
            None => Err(LoadError::InvalidDimension(0)),
        }
    }
}

/// Loader tuning
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Longest accepted word (and text token) in bytes
    pub max_word_bytes: usize,

    /// Read buffer capacity
    pub buffer_capacity: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            max_word_bytes: 4096,
            buffer_capacity: 64 * 1024,
        }
    }
}

impl LoadOptions {
    pub fn with_max_word_bytes(mut self, max: usize) -> Self {
        self.max_word_bytes = max;
        self
    }

    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }
}

/// Load a vector table from `path`.
///
/// Runs to completion or fails on the first error; the table is only
/// returned once every record has been read.
pub fn load_table(
    path: impl AsRef<Path>,
    format: TableFormat,
    options: &LoadOptions,
) -> LoadResult<VectorTable> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| LoadError::open(path.to_path_buf(), e))?;
    let reader = BufReader::with_capacity(options.buffer_capacity.max(1), file);

    let start = Instant::now();
    let table = VectorTable::from_reader(reader, format, options)?;

    info!(
        "Word vector loaded from {}, time consumed: {:.3}s, vocabulary size: {}, dimension: {}",
        path.display(),
        start.elapsed().as_secs_f64(),
        table.len(),
        table.dimension()
    );

    Ok(table)
}

/// Outcome of a lookup. A missing word is a normal result with
/// `found == false`, `index == -1` and no features.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookupResult<'a> {
    pub found: bool,
    pub index: i64,
    pub features: &'a [f32],
}

impl<'a> LookupResult<'a> {
    pub fn not_found() -> Self {
        Self {
            found: false,
            index: -1,
            features: &[],
        }
    }
}

/// Immutable word -> (row index, feature vector) table.
///
/// Words are keyed by their raw bytes, exactly as stored in the file, so
/// distinct byte sequences never collide even when they are not valid UTF-8.
#[derive(Debug, Clone)]
pub struct VectorTable {
    vocabulary: HashMap<Box<[u8]>, usize>,
    words: Vec<Box<[u8]>>,
    /// Row-major, `words.len() * dimension` values
    features: Vec<f32>,
    dimension: usize,
}

impl VectorTable {
    /// Parse a table from any buffered reader
    pub fn from_reader<R: BufRead>(
        reader: R,
        format: TableFormat,
        options: &LoadOptions,
    ) -> LoadResult<Self> {
        match format {
            TableFormat::Text { dimension } => text::read_text(reader, dimension, options),
            TableFormat::Binary => binary::read_binary(reader, options),
        }
    }

    /// Exact-match lookup by word
    pub fn lookup(&self, word: &str) -> LookupResult<'_> {
        self.lookup_bytes(word.as_bytes())
    }

    /// Exact-match lookup by raw word bytes
    pub fn lookup_bytes(&self, word: &[u8]) -> LookupResult<'_> {
        match self.vocabulary.get(word) {
            Some(&index) => LookupResult {
                found: true,
                index: index as i64,
                features: self.row(index),
            },
            None => LookupResult::not_found(),
        }
    }

    /// Number of words
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Width of every feature vector
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn contains(&self, word: &str) -> bool {
        self.vocabulary.contains_key(word.as_bytes())
    }

    /// Word stored at `index`, with invalid UTF-8 replaced for display
    pub fn word(&self, index: usize) -> Option<Cow<'_, str>> {
        self.words.get(index).map(|w| decode_word(w))
    }

    /// Raw bytes of the word stored at `index`
    pub fn word_bytes(&self, index: usize) -> Option<&[u8]> {
        self.words.get(index).map(|w| &w[..])
    }

    /// Feature vector stored at `index`
    pub fn vector(&self, index: usize) -> Option<&[f32]> {
        (index < self.words.len()).then(|| self.row(index))
    }

    /// Raw words in row order
    pub fn words(&self) -> impl Iterator<Item = &[u8]> {
        self.words.iter().map(|w| &w[..])
    }

    fn row(&self, index: usize) -> &[f32] {
        let start = index * self.dimension;
        &self.features[start..start + self.dimension]
    }
}

/// Accumulates rows during a single load
#[derive(Debug)]
pub(crate) struct TableBuilder {
    table: VectorTable,
}

impl TableBuilder {
    pub(crate) fn new(dimension: usize) -> Self {
        Self {
            table: VectorTable {
                vocabulary: HashMap::new(),
                words: Vec::new(),
                features: Vec::new(),
                dimension,
            },
        }
    }

    /// Reserve room for exactly `rows` rows, failing instead of aborting when
    /// the allocation is impossible
    pub(crate) fn with_capacity(dimension: usize, rows: usize) -> LoadResult<Self> {
        let mut builder = Self::new(dimension);
        let values = rows.checked_mul(dimension).ok_or_else(|| {
            LoadError::MalformedHeader(format!("{} x {} values overflows", rows, dimension))
        })?;

        let table = &mut builder.table;
        let reserved = table.features.try_reserve_exact(values).is_ok()
            && table.words.try_reserve_exact(rows).is_ok()
            && table.vocabulary.try_reserve(rows).is_ok();
        if !reserved {
            return Err(LoadError::MalformedHeader(format!(
                "cannot allocate {} rows of dimension {}",
                rows, dimension
            )));
        }

        Ok(builder)
    }

    /// Number of rows pushed so far
    pub(crate) fn len(&self) -> usize {
        self.table.words.len()
    }

    /// Append a row; the word receives the next sequential index
    pub(crate) fn push(&mut self, word: Vec<u8>, features: &[f32]) -> LoadResult<()> {
        debug_assert_eq!(features.len(), self.table.dimension);

        let index = self.table.words.len();
        if self.table.vocabulary.contains_key(word.as_slice()) {
            return Err(LoadError::DuplicateWord {
                word: decode_word(&word).into_owned(),
                record: index,
            });
        }

        let word = word.into_boxed_slice();
        self.table.vocabulary.insert(word.clone(), index);
        self.table.words.push(word);
        self.table.features.extend_from_slice(features);
        Ok(())
    }

    pub(crate) fn finish(self) -> VectorTable {
        self.table
    }
}

/// Render word bytes for display, replacing invalid UTF-8 sequences
pub(crate) fn decode_word(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn text_table(data: &str, dimension: usize) -> VectorTable {
        VectorTable::from_reader(
            data.as_bytes(),
            TableFormat::Text { dimension },
            &LoadOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_lookup_found() {
        let table = text_table("cat 1.0 0.0\ndog 0.0 1.0\n", 2);
        assert_eq!(table.len(), 2);
        assert_eq!(table.dimension(), 2);

        let cat = table.lookup("cat");
        assert!(cat.found);
        assert_eq!(cat.index, 0);
        assert_eq!(cat.features, &[1.0, 0.0]);

        let dog = table.lookup("dog");
        assert!(dog.found);
        assert_eq!(dog.index, 1);
        assert_eq!(dog.features, &[0.0, 1.0]);
    }

    #[test]
    fn test_lookup_missing() {
        let table = text_table("cat 1.0 0.0\n", 2);
        let miss = table.lookup("bird");
        assert!(!miss.found);
        assert_eq!(miss.index, -1);
        assert!(miss.features.is_empty());
        assert_eq!(miss, LookupResult::not_found());

        // Exact match only
        assert!(!table.lookup("Cat").found);
        assert!(!table.lookup("").found);
    }

    #[test]
    fn test_indices_are_dense_and_unique() {
        let table = text_table("a 1\nb 2\nc 3\nd 4\ne 5\n", 1);
        let mut seen: Vec<i64> = table.words().map(|w| table.lookup_bytes(w).index).collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);

        for (i, word) in table.words().enumerate() {
            assert_eq!(table.word_bytes(i), Some(word));
            assert_eq!(table.vector(i), Some(table.lookup_bytes(word).features));
        }
        assert_eq!(table.word(2).as_deref(), Some("c"));
        assert_eq!(table.word(5), None);
        assert_eq!(table.word_bytes(5), None);
        assert_eq!(table.vector(5), None);
    }

    #[test]
    fn test_concurrent_lookups() {
        let table = std::sync::Arc::new(text_table("x 1 2\ny 3 4\n", 2));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let table = table.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        let word = if i % 2 == 0 { "x" } else { "y" };
                        let result = table.lookup(word);
                        assert!(result.found);
                        assert_eq!(result.index, (i % 2) as i64);
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }
    }

    #[test]
    fn test_format_from_flags() {
        assert_eq!(TableFormat::from_flags(true, None).unwrap(), TableFormat::Binary);
        assert_eq!(TableFormat::from_flags(true, Some(0)).unwrap(), TableFormat::Binary);
        assert_eq!(
            TableFormat::from_flags(false, Some(300)).unwrap(),
            TableFormat::Text { dimension: 300 }
        );
        assert!(matches!(
            TableFormat::from_flags(false, Some(0)),
            Err(LoadError::InvalidDimension(0))
        ));
        assert!(matches!(
            TableFormat::from_flags(false, None),
            Err(LoadError::InvalidDimension(0))
        ));
    }

    #[test]
    fn test_load_table_text_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"cat 1.0 0.0\ndog 0.0 1.0\n").unwrap();

        let table = load_table(
            file.path(),
            TableFormat::Text { dimension: 2 },
            &LoadOptions::default(),
        )
        .unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.contains("dog"));
    }

    #[test]
    fn test_load_table_binary_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"1 2\n").unwrap();
        file.write_all(b"up ").unwrap();
        file.write_all(&0.0f32.to_le_bytes()).unwrap();
        file.write_all(&2.0f32.to_le_bytes()).unwrap();

        let table = load_table(file.path(), TableFormat::Binary, &LoadOptions::default()).unwrap();
        assert_eq!(table.dimension(), 2);
        assert_eq!(table.lookup("up").features, &[0.0, 1.0]);
    }

    #[test]
    fn test_load_table_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_table(
            dir.path().join("absent.txt"),
            TableFormat::Text { dimension: 2 },
            &LoadOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LoadError::FileNotFound(_)));
    }

    #[test]
    fn test_builder_rejects_duplicates() {
        let mut builder = TableBuilder::new(1);
        builder.push(b"same".to_vec(), &[1.0]).unwrap();
        let err = builder.push(b"same".to_vec(), &[2.0]).unwrap_err();
        assert!(matches!(err, LoadError::DuplicateWord { record: 1, .. }));
    }

    #[test]
    fn test_builder_keys_on_raw_bytes() {
        let mut builder = TableBuilder::new(1);
        builder.push(b"ab\xe4\xb8".to_vec(), &[1.0]).unwrap();
        builder.push(b"ab\xe5\xb9".to_vec(), &[2.0]).unwrap();
        let err = builder.push(b"ab\xe4\xb8".to_vec(), &[3.0]).unwrap_err();
        match err {
            LoadError::DuplicateWord { word, record } => {
                assert_eq!(word, "ab\u{FFFD}");
                assert_eq!(record, 2);
            }
            other => panic!("unexpected error: {other}"),
        }

        let table = builder.finish();
        assert_eq!(table.lookup_bytes(b"ab\xe5\xb9").index, 1);
    }

    #[test]
    fn test_builder_capacity_overflow() {
        let err = TableBuilder::with_capacity(usize::MAX, 2).unwrap_err();
        assert!(matches!(err, LoadError::MalformedHeader(_)));
    }

    #[test]
    fn test_decode_word_lossy() {
        assert_eq!(decode_word(b"caf\xc3\xa9"), "café");
        assert_eq!(decode_word(b"caf\xc3"), "caf\u{FFFD}");
    }
}
