//! Common test infrastructure
//!
//! This module provides all the infrastructure needed for end-to-end tests.
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestServer, TestClient, TOOL_X_URI};
//! use reqwest::StatusCode;
//!
//! #[tokio::test]
//! async fn test_get_tool() {
//!     let server = TestServer::spawn().await;
//!     let client = TestClient::new(server.api_url.clone());
//!
//!     let response = client.get_tool(TOOL_X_URI).await;
//!     assert_eq!(response.status(), StatusCode::OK);
//! }
//! ```

mod client;
mod constants;
mod fixtures;
mod server;

// Public API - this is what tests import
pub use client::TestClient;
pub use constants::*;
pub use server::{TestServer, TestServerOptions};
