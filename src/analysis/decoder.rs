// src/analysis/decoder.rs
//! Incremental `event:` / `data:` line decoder

use crate::app_log;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub name: String,
    pub data: String,
}

/// Bytes go in as they arrive; complete `event` + `data` pairs come out.
///
/// Lines are split on `\n` only, with one trailing `\r` removed. A partial
/// line stays buffered as raw bytes, so a multi-byte character split across
/// chunks is reassembled before decoding. A blank line forgets the pending
/// event name.
#[derive(Debug, Default)]
pub struct EventDecoder {
    buffer: Vec<u8>,
    pending_event: Option<String>,
}

impl EventDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) -> Vec<RawEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            self.handle_line(&line[..line.len() - 1], &mut events);
        }
        events
    }

    /// End of stream: treat whatever is buffered as a final line
    pub fn finish(&mut self) -> Vec<RawEvent> {
        let mut events = Vec::new();
        if !self.buffer.is_empty() {
            let line = std::mem::take(&mut self.buffer);
            self.handle_line(&line, &mut events);
        }
        self.pending_event = None;
        events
    }

    fn handle_line(&mut self, line: &[u8], events: &mut Vec<RawEvent>) {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        let line = String::from_utf8_lossy(line);

        if line.trim().is_empty() {
            self.pending_event = None;
        } else if let Some(name) = line.strip_prefix("event:") {
            self.pending_event = Some(name.trim().to_string());
        } else if let Some(data) = line.strip_prefix("data:") {
            match self.pending_event.take() {
                Some(name) => events.push(RawEvent {
                    name,
                    data: data.trim().to_string(),
                }),
                None => app_log!(trace, "Data line without event name skipped"),
            }
        }
    }
}
