//! HTTP client for a single Firestore collection.
//!
//! Uses the Firestore REST surface directly:
//! - `GET    <collection>`            list documents
//! - `POST   <collection>`            create a document with a generated id
//! - `PATCH  <collection>/<id>`       update the masked fields of an existing document
//! - `DELETE <collection>/<id>`       delete a document
//!
//! The access key, when present, rides along as the `key` query parameter.

use std::collections::BTreeMap;

use reqwest::{Method, RequestBuilder, Response};

use super::document::{Document, ListDocumentsResponse, Value};
use super::error::StoreError;
use crate::sync::RecordStore;

/// REST client bound to one collection URL.
#[derive(Debug, Clone)]
pub struct FirestoreClient {
    http: reqwest::Client,
    collection_url: String,
    api_key: Option<String>,
}

impl FirestoreClient {
    /// Creates a client for `collection_url`, e.g.
    /// `https://firestore.googleapis.com/v1/projects/<p>/databases/(default)/documents/Users`.
    pub fn new(collection_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self::with_http(reqwest::Client::new(), collection_url, api_key)
    }

    /// Creates a client that reuses an existing `reqwest::Client`.
    pub fn with_http(
        http: reqwest::Client,
        collection_url: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        let collection_url = collection_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            collection_url,
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    /// Returns the collection URL.
    pub fn collection_url(&self) -> &str {
        &self.collection_url
    }

    /// Builds the URL of a single document.
    fn document_url(&self, id: &str) -> String {
        format!("{}/{}", self.collection_url, urlencoding::encode(id))
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let request = self.http.request(method, url);
        match &self.api_key {
            Some(key) => request.query(&[("key", key)]),
            None => request,
        }
    }

    /// Sends a request and turns non-2xx responses into `StoreError::Status`.
    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(StoreError::from_body(
            status.as_u16(),
            status.canonical_reason(),
            &body,
        ))
    }

    async fn read_document(response: Response) -> Result<Document, StoreError> {
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl RecordStore for FirestoreClient {
    async fn list(&self) -> Result<Vec<Document>, StoreError> {
        tracing::debug!("GET {}", self.collection_url);
        let response = self
            .send(self.request(Method::GET, &self.collection_url))
            .await?;

        let body = response.text().await?;
        let listing: ListDocumentsResponse = serde_json::from_str(&body)?;
        if listing.next_page_token.is_some() {
            tracing::warn!("collection has more pages; only the first page was read");
        }
        Ok(listing.documents)
    }

    async fn create(&self, fields: &BTreeMap<String, Value>) -> Result<Document, StoreError> {
        tracing::debug!("POST {}", self.collection_url);
        let body = Document::with_fields(fields.clone());
        let response = self
            .send(self.request(Method::POST, &self.collection_url).json(&body))
            .await?;
        Self::read_document(response).await
    }

    async fn patch(&self, id: &str, fields: &BTreeMap<String, Value>) -> Result<(), StoreError> {
        let url = self.document_url(id);
        tracing::debug!("PATCH {}", url);

        // Without the precondition a PATCH on a missing document creates it
        let mut query: Vec<(&str, &str)> = fields
            .keys()
            .map(|field| ("updateMask.fieldPaths", field.as_str()))
            .collect();
        query.push(("currentDocument.exists", "true"));
        let body = Document::with_fields(fields.clone());

        self.send(
            self.request(Method::PATCH, &url)
                .query(&query)
                .json(&body),
        )
        .await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let url = self.document_url(id);
        tracing::debug!("DELETE {}", url);
        self.send(self.request(Method::DELETE, &url)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = FirestoreClient::new("https://example.com/v1/documents/Users/", None);
        assert_eq!(
            client.collection_url(),
            "https://example.com/v1/documents/Users"
        );
    }

    #[test]
    fn test_document_url() {
        let client = FirestoreClient::new("https://example.com/documents/Users", None);
        assert_eq!(
            client.document_url("abc123"),
            "https://example.com/documents/Users/abc123"
        );
    }

    #[test]
    fn test_document_url_encodes_id() {
        let client = FirestoreClient::new("https://example.com/documents/Users", None);
        assert_eq!(
            client.document_url("a b/c"),
            "https://example.com/documents/Users/a%20b%2Fc"
        );
    }

    #[test]
    fn test_empty_api_key_is_dropped() {
        let client = FirestoreClient::new("https://example.com/Users", Some(String::new()));
        assert!(client.api_key.is_none());
    }

    #[test]
    fn test_api_key_goes_in_query() {
        let client = FirestoreClient::new("https://example.com/Users", Some("k1".to_string()));
        let request = client
            .request(Method::GET, client.collection_url())
            .build()
            .unwrap();
        assert_eq!(request.url().as_str(), "https://example.com/Users?key=k1");
    }
}
