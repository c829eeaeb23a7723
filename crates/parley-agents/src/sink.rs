use std::io::Write;

use parley_models::SessionRecord;

use crate::error::AgentError;

/// Receives the end-of-session record. How it is stored is up to the sink.
pub trait SessionSink {
    fn save(&mut self, record: &SessionRecord) -> Result<(), AgentError>;
}

/// Writes each record as one JSON document.
pub struct JsonSink<W: Write> {
    writer: W,
    pretty: bool,
}

impl<W: Write> JsonSink<W> {
    pub fn new(writer: W, pretty: bool) -> Self {
        Self { writer, pretty }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> SessionSink for JsonSink<W> {
    fn save(&mut self, record: &SessionRecord) -> Result<(), AgentError> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, record)?;
        } else {
            serde_json::to_writer(&mut self.writer, record)?;
        }
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Keeps records in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub records: Vec<SessionRecord>,
}

impl SessionSink for MemorySink {
    fn save(&mut self, record: &SessionRecord) -> Result<(), AgentError> {
        self.records.push(record.clone());
        Ok(())
    }
}
