// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client for the trip service.
//!
//! Wraps a [`Transport`] with two interceptor stages:
//! - Outbound: bearer credential and a per-request correlation id
//! - Inbound: credential wipe on 401, failure classification, and bounded
//!   exponential backoff for retryable classes

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use super::credentials::CredentialStore;
use super::error::{ClientError, ErrorKind};
use super::retry::RetryPolicy;
use super::transport::{HttpRequest, Method, ReqwestTransport, Transport, TransportError};

/// Header carrying the correlation id.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Trip service client.
pub struct ApiClient<T: Transport = ReqwestTransport> {
    transport: T,
    credentials: Arc<dyn CredentialStore>,
    retry: RetryPolicy,
}

impl<T: Transport> ApiClient<T> {
    /// Creates a client with the default retry policy.
    pub fn new(transport: T, credentials: Arc<dyn CredentialStore>) -> Self {
        ApiClient {
            transport,
            credentials,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Sends a request and returns the decoded body of a 2xx response.
    ///
    /// Retryable failures are retried up to `max_retries` times. The same
    /// request, correlation id included, is sent on every attempt.
    pub async fn request(&self, mut request: HttpRequest) -> Result<Value, ClientError> {
        let request_id = Uuid::new_v4().to_string();
        if let Some(token) = self.credentials.token() {
            request.set_header("Authorization", format!("Bearer {token}"));
        }
        request.set_header(REQUEST_ID_HEADER, request_id.as_str());

        let mut retries = 0;
        loop {
            debug!(
                request_id = %request_id,
                attempt = retries + 1,
                "{} {}",
                request.method,
                request.path
            );

            let err = match self.transport.send(request.clone()).await {
                Ok(response) => {
                    match ClientError::from_response(
                        response.status,
                        &response.body,
                        response.retry_after(),
                    ) {
                        None => return Ok(response.body),
                        Some(err) => err,
                    }
                }
                Err(e) => classify_transport_error(e),
            };

            if err.kind() == ErrorKind::Auth {
                warn!(request_id = %request_id, "server rejected credentials, clearing them");
                self.credentials.clear();
            }

            if !err.is_retryable() || retries >= self.retry.max_retries {
                debug!(request_id = %request_id, kind = %err.kind(), "request failed");
                return Err(err);
            }

            let hint = match &err {
                ClientError::RateLimited { retry_after, .. } => *retry_after,
                _ => None,
            };
            let delay = self.retry.retry_delay_with_hint(retries, hint);
            warn!(
                request_id = %request_id,
                kind = %err.kind(),
                "{} {} failed, retrying in {:?}",
                request.method,
                request.path,
                delay
            );
            tokio::time::sleep(delay).await;
            retries += 1;
        }
    }

    pub async fn get(&self, path: &str) -> Result<Value, ClientError> {
        self.request(HttpRequest::new(Method::Get, path)).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<Value, ClientError> {
        self.request(HttpRequest::new(Method::Post, path).with_body(body))
            .await
    }

    pub async fn put(&self, path: &str, body: Value) -> Result<Value, ClientError> {
        self.request(HttpRequest::new(Method::Put, path).with_body(body))
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, ClientError> {
        self.request(HttpRequest::new(Method::Delete, path)).await
    }
}

fn classify_transport_error(e: TransportError) -> ClientError {
    match e {
        TransportError::Timeout(msg) => ClientError::Timeout(msg),
        TransportError::NoResponse(msg) => ClientError::Network(msg),
        TransportError::Other(msg) => ClientError::Unknown(msg),
    }
}
