//! Client for the remote code-signing (notary) service
//!
//! Configuration comes from four environment variables snapshotted by
//! [`shipwright_core::Environment`]:
//!
//! - `NOTARY_URL` — service base URL; absent means signing is skipped
//! - `NOTARY_SIGNING_KEY` — name of the key to sign with
//! - `NOTARY_SIGNING_COMMENT` — comment recorded in the notary log
//! - `NOTARY_AUTH_TOKEN` — shared secret the auth token is derived from

pub mod client;
pub mod token;

pub use client::NotaryClient;
pub use token::{auth_token, current_auth_token, salt};
