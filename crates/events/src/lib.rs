//! Lending events and their stream metadata.

pub mod envelope;
pub mod event;

pub use envelope::EventEnvelope;
pub use event::Event;
