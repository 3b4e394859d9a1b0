//! Client for the external web-search proxy.
//!
//! The proxy is a separate stateless service exposing a single route,
//! `POST /web-search {query} -> {result}`; internally it calls an LLM
//! provider with a web-search tool and falls back to a plain completion
//! when the tool invocation fails. All of that is the proxy's business;
//! this crate only speaks the wire contract and maps its error envelope.
mod client;
mod types;

pub use client::SearchClient;
pub use types::{WebSearchRequest, WebSearchResponse};
