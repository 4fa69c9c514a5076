//! Blocking HTTP client for the tracker's REST API.
//!
//! Pagination follows the server-supplied `Link: <...>; rel="next"`
//! header until absent. A non-success response aborts the retrieval
//! entirely; no partial results are returned and no retry is attempted
//! (rate-limit backoff is out of scope).

use chrono::{DateTime, Utc};
use reqwest::blocking::Response;
use reqwest::header;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use warden_core::time_utils::format_rfc3339;
use warden_github::models::{RawUser, RepoRef};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("request to {url} failed with status {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("token is not a valid authorization header value")]
    InvalidToken,
}

pub struct GithubApiClient {
    http: reqwest::blocking::Client,
    api_base: String,
}

impl GithubApiClient {
    pub fn new(api_base: &str, token: &str) -> Result<Self, ApiError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::USER_AGENT, header::HeaderValue::from_static("issue-warden"));
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );
        let mut auth_value = header::HeaderValue::from_str(&format!("token {}", token.trim()))
            .map_err(|_| ApiError::InvalidToken)?;
        auth_value.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth_value);

        let http = reqwest::blocking::Client::builder()
            .default_headers(headers)
            .build()?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    pub fn issues_url(&self, repo: &RepoRef, since: Option<DateTime<Utc>>) -> String {
        let mut url = format!(
            "{}/repos/{}/{}/issues?state=open",
            self.api_base, repo.owner, repo.name
        );
        if let Some(since) = since {
            url.push_str(&format!("&since={}", format_rfc3339(since)));
        }
        url
    }

    pub fn pulls_url(&self, repo: &RepoRef) -> String {
        format!(
            "{}/repos/{}/{}/pulls?state=open",
            self.api_base, repo.owner, repo.name
        )
    }

    /// The bot's own identity; needed to recognize its past comments.
    pub fn bot_identity(&self) -> Result<RawUser, ApiError> {
        self.get_json(&format!("{}/user", self.api_base))
    }

    pub fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        debug!(%url, "GET");
        let response = self.http.get(url).send()?;
        let body = Self::success_body(url, response)?;
        serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })
    }

    pub fn post_json(&self, url: &str, payload: &Value) -> Result<(), ApiError> {
        debug!(%url, %payload, "POST");
        let response = self.http.post(url).json(payload).send()?;
        Self::success_body(url, response).map(|_| ())
    }

    pub fn patch_json(&self, url: &str, payload: &Value) -> Result<(), ApiError> {
        debug!(%url, %payload, "PATCH");
        let response = self.http.patch(url).json(payload).send()?;
        Self::success_body(url, response).map(|_| ())
    }

    /// Fetches every page starting at `first_url`, concatenating the
    /// records of all pages in server order.
    pub fn list_paginated<T: DeserializeOwned>(&self, first_url: &str) -> Result<Vec<T>, ApiError> {
        let mut url = first_url.to_string();
        let mut rows = Vec::new();
        loop {
            debug!(%url, "GET page");
            let response = self.http.get(&url).send()?;
            let next = response
                .headers()
                .get(header::LINK)
                .and_then(|value| value.to_str().ok())
                .and_then(next_page_url);
            let body = Self::success_body(&url, response)?;
            let chunk: Vec<T> = serde_json::from_str(&body).map_err(|source| ApiError::Decode {
                url: url.clone(),
                source,
            })?;
            debug!(count = chunk.len(), "+ records");
            rows.extend(chunk);

            match next {
                Some(next_url) => url = next_url,
                None => break,
            }
        }
        Ok(rows)
    }

    fn success_body(url: &str, response: Response) -> Result<String, ApiError> {
        let status = response.status();
        let body = response.text().unwrap_or_default();
        if !status.is_success() {
            return Err(ApiError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

/// Extracts the `rel="next"` target from a `Link` header value.
fn next_page_url(link_header: &str) -> Option<String> {
    link_header.split(',').find_map(|entry| {
        let mut parts = entry.split(';');
        let target = parts.next()?.trim();
        let is_next = parts.any(|param| param.trim() == "rel=\"next\"");
        if !is_next {
            return None;
        }
        Some(
            target
                .strip_prefix('<')?
                .strip_suffix('>')?
                .to_string(),
        )
    })
}
