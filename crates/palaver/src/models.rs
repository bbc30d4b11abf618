//! These models represent the objects passed around by the chat core
//!
//! There are a few related formats we need to interact with:
//! - chat messages as stored and exchanged with the web client
//! - server-sent events streamed from the responder to the client
//! - openai-style messages/functions, sent from the responder to the LLM
//!
//! The web client and storage share the `Message` model. Provider payloads are built
//! from it at the edge in `providers::utils`, so the vendor format never leaks inward.
pub mod assistant;
pub mod event;
pub mod message;
pub mod role;
pub mod tool;
