//! Chunk-to-lines normalization.
//!
//! [`LineSplitter`] turns a stream of arbitrarily-sized text chunks into a
//! sequence of logical lines, normalizing `LF`/`CRLF`/`CR` terminators even
//! when a terminator straddles two chunks. It buffers the trailing partial
//! line between calls so the block parser only ever sees whole lines.

use arcstr::ArcStr;

/// A single logical line, terminator stripped. Cheaply cloneable: most lines
/// end up referenced from exactly one leaf block, but list/blockquote
/// re-slicing and the reference-definition sweep both want to hand out their
/// own copies without re-allocating the backing bytes.
pub type Line = ArcStr;

#[derive(Debug, Default)]
pub struct LineSplitter {
    partial_line: String,
    pending_cr: bool,
}

impl LineSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split `chunk` into complete lines, buffering any trailing partial
    /// line. When `stream` is false, the buffered partial line (if any) is
    /// flushed as a final line.
    pub fn split(&mut self, chunk: &str, stream: bool) -> Vec<Line> {
        let mut lines = Vec::new();
        let mut rest = chunk;

        // `pending_cr` is a one-shot lookahead: it is consulted here, used at
        // most once to swallow a split CRLF, and then unconditionally
        // cleared -- even if this call's chunk is empty or doesn't start
        // with `\n`. That quirk is what makes a CR-then-empty-chunk-then-LF
        // sequence produce an empty line instead of swallowing the LF
        // indefinitely.
        if self.pending_cr {
            if let Some(stripped) = rest.strip_prefix('\n') {
                rest = stripped;
            }
            self.pending_cr = false;
        }

        let bytes = rest.as_bytes();
        let mut start = 0usize;
        let mut search_from = 0usize;
        while let Some(found) = memchr::memchr2(b'\n', b'\r', &bytes[search_from..]) {
            let i = search_from + found;
            match bytes[i] {
                b'\n' => {
                    lines.push(self.take_line(&rest[start..i]));
                    start = i + 1;
                    search_from = start;
                }
                b'\r' => {
                    if i + 1 < bytes.len() && bytes[i + 1] == b'\n' {
                        lines.push(self.take_line(&rest[start..i]));
                        start = i + 2;
                        search_from = start;
                    } else if i + 1 == bytes.len() {
                        lines.push(self.take_line(&rest[start..i]));
                        self.pending_cr = true;
                        start = i + 1;
                        search_from = start;
                    } else {
                        // A lone CR in the middle of a chunk is still a
                        // terminator on its own.
                        lines.push(self.take_line(&rest[start..i]));
                        start = i + 1;
                        search_from = start;
                    }
                }
                _ => unreachable!("memchr2 only returns the bytes it was asked for"),
            }
        }

        self.partial_line.push_str(&rest[start..]);

        if !stream && !self.partial_line.is_empty() {
            lines.push(ArcStr::from(std::mem::take(&mut self.partial_line)));
        }

        lines
    }

    /// Combine any buffered partial line with `segment` into one emitted
    /// [`Line`], clearing the buffer.
    fn take_line(&mut self, segment: &str) -> Line {
        if self.partial_line.is_empty() {
            ArcStr::from(segment)
        } else {
            self.partial_line.push_str(segment);
            ArcStr::from(std::mem::take(&mut self.partial_line))
        }
    }
}
