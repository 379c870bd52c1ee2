//! rkey-rewrite: refreshes media access tokens in relayed chat payloads.
//!
//! Re-exports the rewriting entry points used by the binary and by
//! integration tests in `tests/`.

pub mod config;
pub mod errors;
pub mod models;
pub mod rewrite;

pub use models::rkey::TokenPayload;
pub use rewrite::gate::should_apply;
pub use rewrite::message::{apply, apply_gated};
pub use rewrite::url::{rewrite_message, rewrite_url, select_token};
