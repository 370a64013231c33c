//! Async Rust client for QRadar-style versioned SIEM REST APIs.
//!
//! Provides an authenticated HTTP client with pluggable TLS trust, a
//! generic poller for server-side asynchronous tasks, Range-header
//! pagination, and the asynchronous search workflow built on all three.
//!
//! # Modules
//!
//! - [`client`] — Transport client: one authenticated HTTPS round trip per
//!   call, HTTP errors returned as data.
//! - [`config`] — Resolved configuration: server address, credentials, TLS
//!   trust policy.
//! - [`error`] — Typed error hierarchy (`ApiError`) for all library
//!   operations.
//! - [`paging`] — `Range`/`Content-Range` window arithmetic.
//! - [`search`] — The asynchronous search endpoint family.
//! - [`task`] — Fixed-interval polling of task status endpoints.
//!
//! # Quick Start
//!
//! ```ignore
//! use qradar_client::client::ApiClient;
//! use qradar_client::config::ClientConfig;
//! use qradar_client::search::{SearchApi, SearchOptions};
//! use qradar_client::task::PollConfig;
//!
//! let config = ClientConfig::new("qradar.example.com").api_token("...");
//! let client = ApiClient::new(config)?;
//!
//! let searches = SearchApi::new(&client);
//! let created = searches.create_search("SELECT sourceip FROM events", &Default::default()).await?;
//! let search: qradar_client::search::Search = created.json()?;
//! searches.wait_for_completion(&search.search_id, &PollConfig::default()).await?;
//! let results = searches.results(&search.search_id, "application/json", None).await?;
//! ```

#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod error;
pub mod paging;
pub mod search;
pub mod task;
