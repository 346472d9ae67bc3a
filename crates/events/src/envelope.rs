use serde::{Deserialize, Serialize};

use crate::event::Event;

/// Envelope for an event committed to a log, with its stream position.
///
/// `sequence_number` is 1-based and monotonically increasing within one log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    stream: String,
    sequence_number: u64,
    event_type: String,
    payload: E,
}

impl<E: Event> EventEnvelope<E> {
    pub fn new(stream: impl Into<String>, sequence_number: u64, payload: E) -> Self {
        Self {
            stream: stream.into(),
            sequence_number,
            event_type: payload.event_type().to_string(),
            payload,
        }
    }
}

impl<E> EventEnvelope<E> {
    pub fn stream(&self) -> &str {
        &self.stream
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Counted(DateTime<Utc>);

    impl Event for Counted {
        fn event_type(&self) -> &'static str {
            "test.counted"
        }

        fn version(&self) -> u32 {
            2
        }

        fn occurred_at(&self) -> DateTime<Utc> {
            self.0
        }
    }

    #[test]
    fn envelope_stamps_type_from_payload() {
        let at = Utc.with_ymd_and_hms(2025, 8, 20, 9, 0, 0).unwrap();
        let envelope = EventEnvelope::new("lab.counts", 3, Counted(at));
        assert_eq!(envelope.stream(), "lab.counts");
        assert_eq!(envelope.sequence_number(), 3);
        assert_eq!(envelope.event_type(), "test.counted");
        assert_eq!(envelope.payload().version(), 2);
        assert_eq!(envelope.payload().occurred_at(), at);
    }
}
