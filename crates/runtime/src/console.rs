//! Shared program I/O
//!
//! Every unit of an interpreter reads `,` input from one source and writes `.`
//! output to one sink. Each access takes the corresponding mutex for a single
//! character, so output from racing units interleaves per character in
//! whatever order the units execute.

use std::io::{self, Read, Write};
use std::sync::Arc;

use parking_lot::Mutex;

/// Input source and output sink shared by all units
pub struct Console {
    input: Mutex<Box<dyn Read + Send>>,
    output: Mutex<Box<dyn Write + Send>>,
}

impl Console {
    pub fn new(input: impl Read + Send + 'static, output: impl Write + Send + 'static) -> Self {
        Self {
            input: Mutex::new(Box::new(input)),
            output: Mutex::new(Box::new(output)),
        }
    }

    /// Process standard input and output
    pub fn stdio() -> Self {
        Self::new(io::stdin(), io::stdout())
    }

    /// Console with scripted input and an in-memory sink
    pub fn captured(input: impl Into<Vec<u8>>) -> (Self, CapturedOutput) {
        let output = CapturedOutput::default();
        let console = Self::new(io::Cursor::new(input.into()), output.clone());
        (console, output)
    }

    /// Read one byte; `None` once the source is exhausted
    pub fn read_byte(&self) -> io::Result<Option<u8>> {
        let mut input = self.input.lock();
        let mut buf = [0u8; 1];
        loop {
            match input.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Emit the character whose code point is `value`, flushed immediately
    pub fn write_char(&self, value: u8) -> io::Result<()> {
        let mut encoded = [0u8; 4];
        let bytes = char::from(value).encode_utf8(&mut encoded).as_bytes();
        let mut output = self.output.lock();
        output.write_all(bytes)?;
        output.flush()
    }
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console").finish_non_exhaustive()
    }
}

/// In-memory output sink, cloneable so the caller keeps a handle
#[derive(Debug, Clone, Default)]
pub struct CapturedOutput(Arc<Mutex<Vec<u8>>>);

impl CapturedOutput {
    pub fn bytes(&self) -> Vec<u8> {
        self.0.lock().clone()
    }

    /// Output decoded as UTF-8 (lossy)
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl Write for CapturedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
