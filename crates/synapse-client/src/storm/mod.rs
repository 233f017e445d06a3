//! Storm response stream: message model and decoder.
//!
//! The `/api/v1/storm` endpoint answers with newline-delimited JSON
//! envelopes of the form `[tag, payload]`. This module turns a response
//! body into typed [`StormMessage`]s, skipping anything it does not
//! understand.

mod decode;
mod lines;
mod message;

pub use decode::{DecodeError, SchemaPolicy, decode, decode_envelope, decode_line, decode_with};
pub use lines::LineBuffer;
pub use message::{
    FiniMessage, InitMessage, MessageKind, NodeInfo, NodeMessage, PrintMessage, StormMessage,
    StormResults,
};
