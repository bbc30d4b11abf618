//! Streaming of assistant replies
//!
//! `completion` drives the provider through any number of function calls and yields the
//! visible text. `responder` turns that text into client events and persists the reply.
//! `sink` carries the events to the HTTP layer.
pub mod completion;
pub mod responder;
pub mod sink;

pub use responder::Responder;
pub use sink::{EventReceiver, EventSink};
