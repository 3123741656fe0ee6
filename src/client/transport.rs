use reqwest::{Client, Url};
use serde::Serialize;
use std::sync::Arc;

use super::error::{ClientError, ClientResult};
use crate::models::{AcquireLeaseRequest, LeaseResponse, LeaseStatusResponse, LeaseTokenRequest};

/// HTTP calls against the lease API. Cheap to clone; every handle keeps one.
#[derive(Clone, Debug)]
pub(crate) struct LeaseTransport {
    http: Client,
    base_url: Arc<Url>,
}

impl LeaseTransport {
    pub(crate) fn new(base_url: &str, http: Client) -> ClientResult<Self> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ClientError::MissingArgument("service base URL"));
        }

        let url = Url::parse(trimmed).map_err(|_| ClientError::InvalidBaseUrl(trimmed.to_string()))?;
        if url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(trimmed.to_string()));
        }

        Ok(Self {
            http,
            base_url: Arc::new(url),
        })
    }

    pub(crate) fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) async fn acquire(&self, resource_name: &str, owner_id: &str) -> ClientResult<LeaseResponse> {
        let body = AcquireLeaseRequest {
            resource_name: Some(resource_name.to_string()),
            owner_id: Some(owner_id.to_string()),
        };
        self.post(&["api", "lock", "acquire"], &body).await
    }

    pub(crate) async fn heartbeat(&self, resource_name: &str, token: &str) -> ClientResult<LeaseResponse> {
        self.post(&["api", "lock", "heartbeat"], &token_body(resource_name, token))
            .await
    }

    pub(crate) async fn release(&self, resource_name: &str, token: &str) -> ClientResult<LeaseResponse> {
        self.post(&["api", "lock", "release"], &token_body(resource_name, token))
            .await
    }

    pub(crate) async fn status(&self, resource_name: &str) -> ClientResult<LeaseStatusResponse> {
        let url = self.endpoint(&["api", "lock", "status", resource_name])?;
        let response = self.http.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::UnexpectedStatus(status.as_u16()));
        }

        response
            .json::<LeaseStatusResponse>()
            .await
            .map_err(|e| ClientError::Malformed(e.to_string()))
    }

    /// Lease endpoints answer with a `LeaseResponse` body on 2xx, 400, 404 and 409 alike,
    /// so the body decides the outcome and the status only matters when there is no body.
    async fn post<B: Serialize>(&self, segments: &[&str], body: &B) -> ClientResult<LeaseResponse> {
        let url = self.endpoint(segments)?;
        let response = self.http.post(url).json(body).send().await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        match serde_json::from_slice::<LeaseResponse>(&bytes) {
            Ok(parsed) => Ok(parsed),
            Err(_) if !status.is_success() => Err(ClientError::UnexpectedStatus(status.as_u16())),
            Err(e) => Err(ClientError::Malformed(e.to_string())),
        }
    }

    fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = (*self.base_url).clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn token_body(resource_name: &str, token: &str) -> LeaseTokenRequest {
    LeaseTokenRequest {
        resource_name: Some(resource_name.to_string()),
        token: Some(token.to_string()),
    }
}
