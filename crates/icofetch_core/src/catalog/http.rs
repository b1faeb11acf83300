//! Iconify-compatible HTTP catalog client.
//!
//! # Responsibility
//! - Implement [`CatalogClient`] over the public catalog HTTP API.
//!
//! # Invariants
//! - Every request honors the configured timeout.
//! - Non-success statuses become `CatalogError::Transport` with status, url
//!   and a body snippet; they are never silently mapped to empty results,
//!   except the documented 404 leg of `exists`.

use super::{CatalogClient, CatalogError, CatalogResult};
use crate::config::CoreConfig;
use crate::model::icon::IconId;
use log::{debug, warn};
use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::Deserialize;
use std::collections::BTreeMap;

const BODY_SNIPPET_MAX: usize = 200;

/// Blocking HTTP client for the remote catalog.
pub struct HttpCatalogClient {
    http: Client,
    base: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    icons: Vec<String>,
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    icons: BTreeMap<String, serde_json::Value>,
}

#[derive(Deserialize)]
struct CollectionResponse {
    #[serde(default)]
    uncategorized: Vec<String>,
    #[serde(default)]
    categories: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    hidden: Vec<String>,
}

impl HttpCatalogClient {
    /// Builds a client from process configuration.
    ///
    /// # Errors
    /// - `Transport` when the underlying client cannot be constructed.
    pub fn new(config: &CoreConfig) -> CatalogResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("icofetch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| CatalogError::Transport {
                url: config.api_base.clone(),
                status: None,
                message: format!("failed to build http client: {err}"),
            })?;

        Ok(Self {
            http,
            base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    fn get(&self, url: &str, query: &[(&str, &str)]) -> CatalogResult<Response> {
        debug!("event=catalog_request module=catalog url={url}");
        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .map_err(|err| CatalogError::Transport {
                url: url.to_string(),
                status: err.status().map(|s| s.as_u16()),
                message: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(CatalogError::Transport {
                url: url.to_string(),
                status: Some(status.as_u16()),
                message: body_snippet(&body),
            });
        }
        Ok(response)
    }

    fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> CatalogResult<T> {
        let response = self.get(url, query)?;
        response.json::<T>().map_err(|err| CatalogError::Decode {
            url: url.to_string(),
            message: err.to_string(),
        })
    }

    fn parse_ids(raw: Vec<String>, url: &str) -> Vec<IconId> {
        let mut ids = Vec::with_capacity(raw.len());
        for value in raw {
            match IconId::parse(&value) {
                Ok(id) => ids.push(id),
                // Malformed entries from the server are skipped, not fatal.
                Err(err) => warn!(
                    "event=catalog_bad_id module=catalog status=skipped url={url} error={err}"
                ),
            }
        }
        ids
    }
}

impl CatalogClient for HttpCatalogClient {
    fn search(&self, query: &str, limit: u32) -> CatalogResult<Vec<IconId>> {
        let url = format!("{}/search", self.base);
        let limit = limit.to_string();
        let response: SearchResponse =
            self.get_json(&url, &[("query", query), ("limit", limit.as_str())])?;
        Ok(Self::parse_ids(response.icons, &url))
    }

    fn exists(&self, id: &IconId) -> CatalogResult<bool> {
        let url = format!("{}/{}.json", self.base, id.prefix());
        match self.get_json::<LookupResponse>(&url, &[("icons", id.name())]) {
            Ok(response) => Ok(response.icons.contains_key(id.name())),
            // An unknown prefix is a clean "does not exist", not a fault.
            Err(CatalogError::Transport {
                status: Some(status),
                ..
            }) if status == StatusCode::NOT_FOUND.as_u16() => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn list_collection_prefixes(&self) -> CatalogResult<Vec<String>> {
        let url = format!("{}/collections", self.base);
        let response: BTreeMap<String, serde_json::Value> = self.get_json(&url, &[])?;
        Ok(response.into_keys().collect())
    }

    fn list_collection_icons(
        &self,
        prefix: &str,
        include_hidden: bool,
    ) -> CatalogResult<Vec<IconId>> {
        let url = format!("{}/collection", self.base);
        let response: CollectionResponse = self.get_json(&url, &[("prefix", prefix)])?;

        let mut names = response.uncategorized;
        for (_, mut category_names) in response.categories {
            names.append(&mut category_names);
        }
        if include_hidden {
            names.extend(response.hidden);
        }

        let raw = names
            .into_iter()
            .map(|name| format!("{prefix}:{name}"))
            .collect();
        Ok(Self::parse_ids(raw, &url))
    }

    fn download_svg(&self, id: &IconId) -> CatalogResult<Vec<u8>> {
        let url = format!("{}/{}/{}.svg", self.base, id.prefix(), id.name());
        let response = self.get(&url, &[])?;
        let bytes = response.bytes().map_err(|err| CatalogError::Decode {
            url: url.clone(),
            message: err.to_string(),
        })?;
        Ok(bytes.to_vec())
    }
}

fn body_snippet(body: &str) -> String {
    let normalized = body.replace(['\n', '\r'], " ");
    let mut snippet: String = normalized.chars().take(BODY_SNIPPET_MAX).collect();
    if normalized.chars().count() > BODY_SNIPPET_MAX {
        snippet.push_str("...");
    }
    snippet
}

#[cfg(test)]
mod tests {
    use super::body_snippet;

    #[test]
    fn body_snippet_flattens_and_truncates() {
        let long = "x".repeat(300);
        let snippet = body_snippet(&long);
        assert!(snippet.ends_with("..."));
        assert_eq!(snippet.chars().count(), 203);

        assert_eq!(body_snippet("a\nb\r"), "a b ");
    }
}
