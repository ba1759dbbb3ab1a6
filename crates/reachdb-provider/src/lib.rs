//! Data-provider client for reachdb.
//!
//! The external provider exposes an actor-run protocol: a fetch is started as
//! a run, polled until it reaches a terminal status, and its output read from
//! a dataset. Runs routinely take minutes; this crate deliberately enforces
//! no overall deadline of its own — per the collaborator contract, timeout
//! enforcement belongs to the pipeline executor (each individual HTTP request
//! still carries the reqwest timeout).
//!
//! Wire responses are deserialized into explicit typed structs ([`types`])
//! and mapped into the shared domain types in a single normalization step
//! ([`normalize`]). Transient HTTP failures are retried with exponential
//! back-off ([`retry`]); application-level run failures are not.

pub mod client;
pub mod error;
pub mod normalize;
pub mod source;
pub mod types;

mod retry;

pub use client::ApifyClient;
pub use error::ProviderError;
pub use source::ProfileSource;
