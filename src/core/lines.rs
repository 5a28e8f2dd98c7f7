//! Single-byte line decoding
//!
//! PDF bodies mix text with binary streams, so lines are decoded as ISO-8859-1:
//! every byte maps to the codepoint of the same value and decoding cannot fail.

use std::io::{self, BufRead};

/// Iterator over the lines of a byte stream, decoded as ISO-8859-1
///
/// Lines end at `\n`, `\r\n` or a lone `\r`; the terminator is stripped.
/// A trailing terminator does not produce an extra empty line.
pub struct Latin1Lines<R> {
    reader: R,
}

impl<R: BufRead> Latin1Lines<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Read the next line, or `None` once the stream is exhausted
    pub fn next_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        let mut read_any = false;

        loop {
            let (consumed, terminator) = {
                let buf = match self.reader.fill_buf() {
                    Ok(buf) => buf,
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                };
                if buf.is_empty() {
                    return Ok(read_any.then_some(line));
                }
                read_any = true;

                match buf.iter().position(|&b| b == b'\n' || b == b'\r') {
                    Some(end) => {
                        line.extend(buf[..end].iter().copied().map(char::from));
                        (end + 1, Some(buf[end]))
                    }
                    None => {
                        line.extend(buf.iter().copied().map(char::from));
                        (buf.len(), None)
                    }
                }
            };
            self.reader.consume(consumed);

            match terminator {
                Some(b'\r') => {
                    self.skip_line_feed()?;
                    return Ok(Some(line));
                }
                Some(_) => return Ok(Some(line)),
                None => {}
            }
        }
    }

    // A '\r' directly followed by '\n' is a single terminator.
    fn skip_line_feed(&mut self) -> io::Result<()> {
        loop {
            match self.reader.fill_buf() {
                Ok(buf) => {
                    if buf.first() == Some(&b'\n') {
                        self.reader.consume(1);
                    }
                    return Ok(());
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

impl<R: BufRead> Iterator for Latin1Lines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line().transpose()
    }
}
