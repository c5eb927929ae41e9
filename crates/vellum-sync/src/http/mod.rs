//! HTTP transport for freshness probes and archive transfers.

mod client;

pub use client::{HttpClient, HttpClientConfig};
