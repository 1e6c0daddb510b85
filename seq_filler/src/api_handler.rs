// src/api_handler.rs

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use thiserror::Error;
use tracing::warn;

use crate::config::RunConfig;

/// Raw answer from the lookup service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupResponse {
    pub status: u16,
    pub body: String,
}

impl LookupResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }
}

/// A single failed round-trip.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("connection error: {0}")]
    Connection(String),
}

/// One POST to the lookup endpoint, no retries.
pub trait LookupTransport {
    fn post_lookup(&self, coordinate: &str) -> Result<LookupResponse, TransportError>;
}

pub struct ReqwestTransport {
    client: Client,
    endpoint: String,
    database: String,
}

impl ReqwestTransport {
    pub fn new(config: &RunConfig) -> Result<Self, reqwest::Error> {
        Self::with_settings(
            &config.endpoint,
            &config.database,
            &config.user_agent,
            config.request_timeout(),
        )
    }

    pub fn with_settings(
        endpoint: &str,
        database: &str,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml"),
        );
        match HeaderValue::from_str(user_agent) {
            Ok(ua) => {
                headers.insert(USER_AGENT, ua);
            }
            Err(_) => warn!(
                "User-Agent {:?} is not a valid header value; sending none",
                user_agent
            ),
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            database: database.to_string(),
        })
    }
}

impl LookupTransport for ReqwestTransport {
    fn post_lookup(&self, coordinate: &str) -> Result<LookupResponse, TransportError> {
        let form = [("database", self.database.as_str()), ("ID", coordinate)];
        let response = self
            .client
            .post(&self.endpoint)
            .form(&form)
            .send()
            .map_err(classify)?;

        let status = response.status().as_u16();
        let body = response.text().map_err(classify)?;
        Ok(LookupResponse { status, body })
    }
}

fn classify(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Connection(e.to_string())
    }
}
