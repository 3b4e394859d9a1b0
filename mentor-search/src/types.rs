use serde::{Deserialize, Serialize};

/// Request body for `POST /web-search`.
#[derive(Debug, Clone, Serialize)]
pub struct WebSearchRequest {
    pub query: String,
}

/// Success envelope returned by the proxy.
#[derive(Debug, Clone, Deserialize)]
pub struct WebSearchResponse {
    pub result: String,
}
