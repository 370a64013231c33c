//! The asynchronous search endpoint family.
//!
//! Searches are the canonical long-running-task workflow:
//!
//! 1. `POST ariel/searches` with a query expression — the server accepts
//!    the search and returns its metadata, including a `search_id`.
//! 2. Poll `GET ariel/searches/{id}` until `status` is `COMPLETED`
//!    (delegated to [`crate::task::wait_for_completion`]).
//! 3. `GET ariel/searches/{id}/results` — fetch results, optionally one
//!    `Range` window at a time, as JSON or CSV by content negotiation.
//!
//! Methods here return the raw [`ApiResponse`] rather than failing on HTTP
//! error statuses: a rejected query (422 with the parser's complaint) or a
//! missing search (404) is something the caller inspects and prints, in
//! keeping with the client's errors-are-data contract. Parse the body with
//! [`ApiResponse::json`] into [`Search`] once the status has been checked.

use serde::Deserialize;

use crate::client::{ApiClient, ApiRequest, ApiResponse};
use crate::error::Result;
use crate::paging::PageWindow;
use crate::task::{self, PollConfig};

/// Base path for the search endpoint family.
const ENDPOINT_START: &str = "ariel/";

/// Search metadata as returned by the create and status endpoints.
///
/// Fields beyond `search_id` and `status` are optional because the server
/// omits or nulls them while the search is still queued.
#[derive(Debug, Clone, Deserialize)]
pub struct Search {
    /// The identifier used for status polling and result retrieval.
    pub search_id: String,
    /// The raw search status (`WAIT`, `EXECUTE`, `SORTING`, `COMPLETED`,
    /// `ERROR`, `CANCELED`).
    pub status: String,
    /// Completion percentage, when the server reports one.
    #[serde(default)]
    pub progress: Option<u32>,
    /// Number of result records, populated once the search completes.
    #[serde(default)]
    pub record_count: Option<u64>,
}

/// Optional parameters for [`SearchApi::create_search`]. Unset fields are
/// omitted from the request.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Query language revision understood by the server.
    pub query_language_version: Option<String>,
    /// Search window start, milliseconds since the epoch.
    pub start_time: Option<String>,
    /// Search window end, milliseconds since the epoch.
    pub end_time: Option<String>,
}

/// Typed access to the search endpoints, borrowing a configured
/// [`ApiClient`].
pub struct SearchApi<'a> {
    client: &'a ApiClient,
}

impl<'a> SearchApi<'a> {
    /// Wraps the given client.
    pub fn new(client: &'a ApiClient) -> Self {
        SearchApi { client }
    }

    /// Lists the databases available to search.
    pub async fn databases(&self) -> Result<ApiResponse> {
        self.client
            .get(&format!("{ENDPOINT_START}databases"))
            .await
    }

    /// Submits a new search. On acceptance (201) the body parses as
    /// [`Search`]; on rejection the body carries the server's diagnostic.
    pub async fn create_search(
        &self,
        query_expression: &str,
        options: &SearchOptions,
    ) -> Result<ApiResponse> {
        let mut request = ApiRequest::post(format!("{ENDPOINT_START}searches"))
            .query("query_expression", query_expression);
        if let Some(version) = &options.query_language_version {
            request = request.query("query_language_version", version.clone());
        }
        if let Some(start) = &options.start_time {
            request = request.query("start_time", start.clone());
        }
        if let Some(end) = &options.end_time {
            request = request.query("end_time", end.clone());
        }
        self.client.call(&request).await
    }

    /// Fetches the current metadata for a search.
    pub async fn status(&self, search_id: &str) -> Result<ApiResponse> {
        self.client
            .get(&format!("{ENDPOINT_START}searches/{search_id}"))
            .await
    }

    /// Blocks until the search completes, fails, or the poll budget runs
    /// out. Returns the terminal status string (`COMPLETED`) on success.
    pub async fn wait_for_completion(&self, search_id: &str, config: &PollConfig) -> Result<String> {
        let status_endpoint = format!("{ENDPOINT_START}searches/{search_id}");
        task::wait_for_completion(self.client, &status_endpoint, task::classify_search_status, config)
            .await
    }

    /// Retrieves search results, negotiating the response format through
    /// the `Accept` header (`application/json` or `application/csv`) and
    /// optionally restricting to one `Range` window.
    pub async fn results(
        &self,
        search_id: &str,
        content_type: &str,
        window: Option<PageWindow>,
    ) -> Result<ApiResponse> {
        let mut request = ApiRequest::get(format!("{ENDPOINT_START}searches/{search_id}/results"))
            .header("Accept", content_type);
        if let Some(window) = window {
            request = request.range(window);
        }
        self.client.call(&request).await
    }

    /// Asks the server to retain this search's results past their normal
    /// retention window.
    pub async fn save_results(&self, search_id: &str) -> Result<ApiResponse> {
        let request = ApiRequest::post(format!("{ENDPOINT_START}searches/{search_id}"))
            .query("save_results", "true");
        self.client.call(&request).await
    }

    /// Deletes a search and its results.
    pub async fn delete_search(&self, search_id: &str) -> Result<ApiResponse> {
        self.client
            .delete(&format!("{ENDPOINT_START}searches/{search_id}"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_deserializes_minimal_metadata() {
        let json = r#"{"search_id": "sid-123", "status": "WAIT"}"#;
        let search: Search = serde_json::from_str(json).unwrap();
        assert_eq!(search.search_id, "sid-123");
        assert_eq!(search.status, "WAIT");
        assert!(search.progress.is_none());
        assert!(search.record_count.is_none());
    }

    #[test]
    fn search_deserializes_completed_metadata() {
        let json = r#"{
            "search_id": "sid-123",
            "status": "COMPLETED",
            "progress": 100,
            "record_count": 5812,
            "save_results": false
        }"#;
        let search: Search = serde_json::from_str(json).unwrap();
        assert_eq!(search.status, "COMPLETED");
        assert_eq!(search.progress, Some(100));
        assert_eq!(search.record_count, Some(5812));
    }

    #[test]
    fn create_search_omits_unset_options() {
        // Only query_expression should appear when options are defaulted;
        // the query builder drops nothing silently besides empty values.
        let request = ApiRequest::post("ariel/searches").query("query_expression", "SELECT 1");
        assert_eq!(request.query.len(), 1);

        let options = SearchOptions::default();
        assert!(options.query_language_version.is_none());
        assert!(options.start_time.is_none());
        assert!(options.end_time.is_none());
    }
}
