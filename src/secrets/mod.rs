//! Handling of sensitive configuration values.
//!
//! Provider credentials (AppRole secrets, access keys, client secrets, private
//! keys) and pending certificate key material are held as [`SecretString`] so
//! that they never leak through `Debug`, `Display`, or structured logging.
//! Outgoing configuration documents opt in to the real value explicitly with
//! [`expose`].

pub mod types;

pub use types::{expose, SecretString, REDACTED};
