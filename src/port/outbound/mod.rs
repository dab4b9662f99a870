//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the collaborators around the engine: where raw
//! stats come from and where finished metric batches go.

pub mod sink;
pub mod source;
