//! HTTP client for end-to-end tests
//!
//! Wraps reqwest and provides one method per endpoint. When API routes or
//! request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::Value;
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// URL including the API prefix
    pub api_url: String,
}

impl TestClient {
    pub fn new(api_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, api_url }
    }

    // ========================================================================
    // Tools Endpoints
    // ========================================================================

    pub async fn get_all_tools(&self) -> Response {
        self.client
            .get(format!("{}/tools/", self.api_url))
            .send()
            .await
            .expect("Get all tools request failed")
    }

    pub async fn get_tool(&self, identifier: &str) -> Response {
        self.client
            .get(format!("{}/tools/{}", self.api_url, identifier))
            .send()
            .await
            .expect("Get tool request failed")
    }

    pub async fn search_tools(&self, tool_uri: Option<&str>, type_uri: Option<&str>) -> Response {
        let mut query = Vec::new();
        if let Some(uri) = tool_uri {
            query.push(("toolURI", uri));
        }
        if let Some(uri) = type_uri {
            query.push(("typeURI", uri));
        }

        self.client
            .get(format!("{}/tools/search", self.api_url))
            .query(&query)
            .send()
            .await
            .expect("Search tools request failed")
    }

    pub async fn get_tools_by_input(&self, extension: &str) -> Response {
        self.client
            .get(format!("{}/tools/input/{}", self.api_url, extension))
            .send()
            .await
            .expect("Get tools by input request failed")
    }

    // ========================================================================
    // Jobs Endpoints
    // ========================================================================

    pub async fn submit_search_job(&self, criteria: &Value) -> Response {
        self.client
            .post(format!("{}/jobs/search", self.api_url))
            .json(criteria)
            .send()
            .await
            .expect("Submit search job request failed")
    }

    /// Submits a search job and returns its id, asserting it was accepted.
    pub async fn submit_search_job_id(&self, criteria: &Value) -> String {
        let response = self.submit_search_job(criteria).await;
        assert_eq!(response.status(), reqwest::StatusCode::ACCEPTED);

        let body: Value = response.json().await.expect("Invalid submit response");
        assert_eq!(body["status"], "pending");
        body["job_id"]
            .as_str()
            .expect("Missing job_id")
            .to_string()
    }

    pub async fn submit_raw_search_job(&self, body: &str) -> Response {
        self.client
            .post(format!("{}/jobs/search", self.api_url))
            .header("content-type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .expect("Submit search job request failed")
    }

    pub async fn get_job(&self, job_id: &str) -> Response {
        self.client
            .get(format!("{}/jobs/{}", self.api_url, job_id))
            .send()
            .await
            .expect("Get job request failed")
    }

    /// Polls a job until it reaches `status`.
    ///
    /// # Panics
    ///
    /// Panics if the job is not found or does not reach the status in time.
    pub async fn wait_for_job_status(&self, job_id: &str, status: &str) -> Value {
        let start = std::time::Instant::now();
        loop {
            let response = self.get_job(job_id).await;
            assert_eq!(response.status(), reqwest::StatusCode::OK);
            let job: Value = response.json().await.expect("Invalid job body");
            if job["status"] == status {
                return job;
            }

            if start.elapsed() > Duration::from_millis(JOB_WAIT_TIMEOUT_MS) {
                panic!("Job {} did not reach {}: {}", job_id, status, job);
            }
            tokio::time::sleep(Duration::from_millis(JOB_POLL_INTERVAL_MS)).await;
        }
    }
}
