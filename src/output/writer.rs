//! JSON lines writer
//!
//! Writes one compact JSON object per line.

use super::sink::MessageSink;
use crate::engine::Message;
use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::io::{self, Stdout, Write};

/// Writes messages as JSON lines
#[derive(Debug)]
pub struct JsonLinesWriter<W: Write> {
    writer: W,
    lines: u64,
}

impl JsonLinesWriter<Stdout> {
    /// Writer on standard output
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> JsonLinesWriter<W> {
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self { writer, lines: 0 }
    }

    /// Write any serializable value as one line
    pub fn write_json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        serde_json::to_writer(&mut self.writer, value)?;
        self.writer.write_all(b"\n")?;
        self.lines += 1;
        Ok(())
    }

    /// Lines written so far
    pub fn lines_written(&self) -> u64 {
        self.lines
    }

    /// Unwrap the inner writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W: Write + Send> MessageSink for JsonLinesWriter<W> {
    async fn send(&mut self, message: Message) -> Result<()> {
        self.write_json(&message)
    }

    async fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
