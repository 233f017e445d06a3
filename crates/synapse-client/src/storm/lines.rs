//! Reassembles newline-terminated lines from arbitrarily split chunks.

use crate::error::{Error, Result};

/// Buffers bytes until a full line is available.
///
/// Chunk boundaries may fall anywhere, including inside a multi-byte UTF-8
/// sequence; bytes are only interpreted once their line is complete.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a chunk and return every line it completes, without the newline.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<String>> {
        self.pending.extend_from_slice(chunk);

        let Some(last_newline) = self.pending.iter().rposition(|&b| b == b'\n') else {
            return Ok(Vec::new());
        };

        let rest = self.pending.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.pending, rest);

        complete[..last_newline]
            .split(|&b| b == b'\n')
            .map(|line| {
                std::str::from_utf8(line)
                    .map(str::to_string)
                    .map_err(Error::from)
            })
            .collect()
    }

    /// Take the unterminated tail, if any.
    pub fn finish(&mut self) -> Result<Option<String>> {
        if self.pending.is_empty() {
            return Ok(None);
        }
        let tail = std::mem::take(&mut self.pending);
        Ok(Some(String::from_utf8(tail).map_err(|e| e.utf8_error())?))
    }

    /// Number of buffered bytes not yet returned.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_split_across_chunks() {
        let mut buf = LineBuffer::new();
        assert!(buf.push(b"[\"print\", {\"me").unwrap().is_empty());
        assert_eq!(
            buf.push(b"sg\": \"a\"}]\n[\"fini\"").unwrap(),
            vec![r#"["print", {"mesg": "a"}]"#.to_string()]
        );
        assert_eq!(buf.pending_len(), 7);
        assert_eq!(
            buf.push(b", {}]\n\n").unwrap(),
            vec![r#"["fini", {}]"#.to_string(), String::new()]
        );
        assert_eq!(buf.finish().unwrap(), None);
    }

    #[test]
    fn test_multibyte_character_split_across_chunks() {
        let text = "caf\u{e9}\n".as_bytes();
        let (head, tail) = text.split_at(4);
        let mut buf = LineBuffer::new();
        assert!(buf.push(head).unwrap().is_empty());
        assert_eq!(buf.push(tail).unwrap(), vec!["caf\u{e9}".to_string()]);
    }

    #[test]
    fn test_finish_returns_tail_once() {
        let mut buf = LineBuffer::new();
        buf.push(b"partial").unwrap();
        assert_eq!(buf.finish().unwrap(), Some("partial".to_string()));
        assert_eq!(buf.finish().unwrap(), None);
    }

    #[test]
    fn test_invalid_utf8_line_is_an_error() {
        let mut buf = LineBuffer::new();
        assert!(buf.push(&[0xff, b'\n']).is_err());
    }
}
