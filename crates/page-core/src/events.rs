use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Mutations the edit agent can apply to the page document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mutation", rename_all = "snake_case")]
pub enum PageMutation {
    ReplaceMarkup { bytes: usize },
    AppendStyle { bytes: usize },
}

impl PageMutation {
    pub fn description(&self) -> String {
        match self {
            PageMutation::ReplaceMarkup { bytes } => {
                format!("replace editable markup ({} bytes)", bytes)
            }
            PageMutation::AppendStyle { bytes } => {
                format!("append style element ({} bytes)", bytes)
            }
        }
    }
}

/// Event emitted when a mutation is applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageEvent {
    pub sequence: u64,
    pub mutation: PageMutation,
    pub timestamp_ms: u64,
}

impl PageEvent {
    pub fn new(sequence: u64, mutation: PageMutation, timestamp_ms: u64) -> Self {
        Self {
            sequence,
            mutation,
            timestamp_ms,
        }
    }
}

/// In-memory instrumentation layer that records page mutations.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct PageInstrumentation {
    events: Vec<PageEvent>,
    next_sequence: u64,
}

impl PageInstrumentation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, mutation: PageMutation) -> PageEvent {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.saturating_add(1);
        let event = PageEvent::new(sequence, mutation, current_timestamp_ms());
        self.events.push(event.clone());
        event
    }

    pub fn events(&self) -> &[PageEvent] {
        &self.events
    }
}

fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_assigns_monotonic_sequence_numbers() {
        let mut instrumentation = PageInstrumentation::new();
        let first = instrumentation.record(PageMutation::ReplaceMarkup { bytes: 10 });
        let second = instrumentation.record(PageMutation::AppendStyle { bytes: 4 });
        assert_eq!(first.sequence, 0);
        assert_eq!(second.sequence, 1);
        assert_eq!(instrumentation.events().len(), 2);
    }
}
