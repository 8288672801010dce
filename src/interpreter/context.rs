use super::SystemContext;
use std::io::{Stdout, Write};

/// Sends program output to a writer, flushing after every write.
///
/// A failed write does not stop the program. It is logged and counted so the
/// caller can report it once the run is over.
#[derive(Debug)]
pub struct WriterContext<W: Write> {
    writer: W,
    failures: usize,
}

pub type StdioContext = WriterContext<Stdout>;

impl StdioContext {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> WriterContext<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            failures: 0,
        }
    }

    /// Number of writes that could not be delivered.
    pub fn failures(&self) -> usize {
        self.failures
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> SystemContext for WriterContext<W> {
    fn write(&mut self, text: &str) {
        let result = self
            .writer
            .write_all(text.as_bytes())
            .and_then(|()| self.writer.flush());
        if let Err(error) = result {
            self.failures += 1;
            tracing::warn!(%error, "failed to write program output");
        }
    }
}

#[derive(Debug, Default)]
pub struct BufferedContext {
    buffer: String,
}

impl BufferedContext {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    pub fn data(&self) -> &str {
        &self.buffer
    }

    pub fn into_data(self) -> String {
        self.buffer
    }
}

impl SystemContext for BufferedContext {
    fn write(&mut self, text: &str) {
        self.buffer.push_str(text);
    }
}
