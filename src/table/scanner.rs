//! Streaming Scanner
//!
//! Delimiter and whitespace scanning over a buffered reader. Tokens are
//! accumulated across internal buffer refills, so a token that straddles a
//! buffer boundary is returned exactly as if it had been read in one piece.

use std::io::{self, BufRead, Read};
use thiserror::Error;

/// Scanning failures
#[derive(Error, Debug)]
pub enum ScanError {
    /// No delimiter found within the allowed token length
    #[error("no delimiter within {limit} bytes")]
    Overrun { limit: usize },

    /// Input ended in the middle of a token
    #[error("input ended after {read} bytes without a delimiter")]
    Incomplete { read: usize },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Buffered reader exposing token-level primitives
#[derive(Debug)]
pub struct DelimitedReader<R> {
    inner: R,
    offset: u64,
}

impl<R: BufRead> DelimitedReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, offset: 0 }
    }

    /// Bytes consumed so far
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Read bytes up to `delim`, consuming the delimiter but not returning it.
    ///
    /// Returns `Ok(None)` when the input is already exhausted. The token may
    /// hold at most `limit` bytes.
    pub fn read_until(&mut self, delim: u8, limit: usize) -> Result<Option<Vec<u8>>, ScanError> {
        let mut token = Vec::new();

        loop {
            let available = match self.inner.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };

            if available.is_empty() {
                return if token.is_empty() {
                    Ok(None)
                } else {
                    Err(ScanError::Incomplete { read: token.len() })
                };
            }

            let (chunk, found) = match available.iter().position(|&b| b == delim) {
                Some(i) => (i, true),
                None => (available.len(), false),
            };

            if token.len() + chunk > limit {
                return Err(ScanError::Overrun { limit });
            }
            token.extend_from_slice(&available[..chunk]);

            let used = if found { chunk + 1 } else { chunk };
            self.inner.consume(used);
            self.offset += used as u64;

            if found {
                return Ok(Some(token));
            }
        }
    }

    /// Read the next whitespace-separated token.
    ///
    /// Leading ASCII whitespace is skipped; the token ends at the next
    /// whitespace byte (left unconsumed) or at end of input. Returns
    /// `Ok(None)` if only whitespace remains.
    pub fn read_token(&mut self, limit: usize) -> Result<Option<Vec<u8>>, ScanError> {
        self.scan_token(limit, false)
    }

    /// Like [`read_token`](Self::read_token), but never crosses a newline.
    ///
    /// Returns `Ok(None)` when the current line (or the input) ends before a
    /// token starts. The newline itself is left unconsumed.
    pub fn read_token_in_line(&mut self, limit: usize) -> Result<Option<Vec<u8>>, ScanError> {
        self.scan_token(limit, true)
    }

    fn scan_token(&mut self, limit: usize, stop_at_newline: bool) -> Result<Option<Vec<u8>>, ScanError> {
        let mut token = Vec::new();

        loop {
            let available = match self.inner.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };

            if available.is_empty() {
                return Ok(if token.is_empty() { None } else { Some(token) });
            }

            let mut used = 0;
            let mut done = false;
            for &b in available {
                if b.is_ascii_whitespace() {
                    if !token.is_empty() || (stop_at_newline && b == b'\n') {
                        done = true;
                        break;
                    }
                    used += 1;
                    continue;
                }
                if token.len() == limit {
                    return Err(ScanError::Overrun { limit });
                }
                token.push(b);
                used += 1;
            }

            self.inner.consume(used);
            self.offset += used as u64;

            if done {
                return Ok(if token.is_empty() { None } else { Some(token) });
            }
        }
    }

    /// Fill `buf` completely, failing with `UnexpectedEof` on short input
    pub fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.inner.read_exact(buf)?;
        self.offset += buf.len() as u64;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor};

    fn reader(data: &[u8], capacity: usize) -> DelimitedReader<BufReader<Cursor<Vec<u8>>>> {
        DelimitedReader::new(BufReader::with_capacity(capacity, Cursor::new(data.to_vec())))
    }

    #[test]
    fn test_read_until() {
        let mut r = reader(b"hello world", 64);
        assert_eq!(r.read_until(b' ', 16).unwrap(), Some(b"hello".to_vec()));
        assert_eq!(r.offset(), 6);

        let mut rest = [0u8; 5];
        r.read_exact(&mut rest).unwrap();
        assert_eq!(&rest, b"world");
        assert_eq!(r.read_until(b' ', 16).unwrap(), None);
    }

    #[test]
    fn test_read_until_across_buffer_boundary() {
        // Capacity 3 forces the token to be assembled from several refills
        let mut r = reader(b"straddling tail", 3);
        assert_eq!(r.read_until(b' ', 64).unwrap(), Some(b"straddling".to_vec()));

        let mut rest = [0u8; 4];
        r.read_exact(&mut rest).unwrap();
        assert_eq!(&rest, b"tail");
    }

    #[test]
    fn test_read_until_overrun() {
        let mut r = reader(b"abcdefghij ", 4);
        assert!(matches!(
            r.read_until(b' ', 5),
            Err(ScanError::Overrun { limit: 5 })
        ));
    }

    #[test]
    fn test_read_until_exact_limit() {
        let mut r = reader(b"abcde ", 2);
        assert_eq!(r.read_until(b' ', 5).unwrap(), Some(b"abcde".to_vec()));
    }

    #[test]
    fn test_read_until_incomplete() {
        let mut r = reader(b"dangling", 4);
        assert!(matches!(
            r.read_until(b' ', 64),
            Err(ScanError::Incomplete { read: 8 })
        ));
    }

    #[test]
    fn test_read_token() {
        let mut r = reader(b"  cat 1.0\n\tdog\n", 4);
        assert_eq!(r.read_token(64).unwrap(), Some(b"cat".to_vec()));
        assert_eq!(r.read_token(64).unwrap(), Some(b"1.0".to_vec()));
        assert_eq!(r.read_token(64).unwrap(), Some(b"dog".to_vec()));
        assert_eq!(r.read_token(64).unwrap(), None);
    }

    #[test]
    fn test_read_token_at_eof_without_trailing_whitespace() {
        let mut r = reader(b"last", 2);
        assert_eq!(r.read_token(64).unwrap(), Some(b"last".to_vec()));
        assert_eq!(r.read_token(64).unwrap(), None);
    }

    #[test]
    fn test_read_token_in_line_stops_at_newline() {
        let mut r = reader(b"cat \t1.0 \r\n  1999 2\n", 3);
        assert_eq!(r.read_token_in_line(64).unwrap(), Some(b"cat".to_vec()));
        assert_eq!(r.read_token_in_line(64).unwrap(), Some(b"1.0".to_vec()));
        assert_eq!(r.read_token_in_line(64).unwrap(), None);
        // Still at the newline until a line-crossing read moves past it
        assert_eq!(r.read_token_in_line(64).unwrap(), None);
        assert_eq!(r.read_token(64).unwrap(), Some(b"1999".to_vec()));
        assert_eq!(r.read_token_in_line(64).unwrap(), Some(b"2".to_vec()));
        assert_eq!(r.read_token_in_line(64).unwrap(), None);
        assert_eq!(r.read_token(64).unwrap(), None);
    }

    #[test]
    fn test_read_exact_short() {
        let mut r = reader(b"abc", 8);
        let mut buf = [0u8; 4];
        let err = r.read_exact(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
