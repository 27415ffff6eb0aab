//! Message sinks

use crate::engine::Message;
use crate::error::Result;
use async_trait::async_trait;

/// Destination for engine messages
#[async_trait]
pub trait MessageSink: Send {
    /// Deliver one message
    async fn send(&mut self, message: Message) -> Result<()>;

    /// Flush anything buffered
    async fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Sink that keeps every message in memory
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    messages: Vec<Message>,
}

impl CollectingSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages, in delivery order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Record messages of one stream
    pub fn records(&self, stream: &str) -> Vec<&Message> {
        self.messages
            .iter()
            .filter(|m| m.is_record() && m.stream() == stream)
            .collect()
    }

    /// Names of streams that received a schema message, in order
    pub fn streams(&self) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|m| m.is_schema())
            .map(Message::stream)
            .collect()
    }

    /// Take the collected messages
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}

#[async_trait]
impl MessageSink for CollectingSink {
    async fn send(&mut self, message: Message) -> Result<()> {
        self.messages.push(message);
        Ok(())
    }
}
