//! Media URL rewriting for relayed chat payloads.
//!
//! `gate` decides whether a payload is worth parsing, `message` walks the
//! payload's `items`, and `url` rewrites the media URLs inside each message.

pub mod gate;
pub mod hosts;
pub mod message;
pub mod url;
