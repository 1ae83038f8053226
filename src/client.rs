use std::env;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures::Stream;
use futures::stream::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::client_logger::ClientLogger;
use crate::error::{Error, Result};
use crate::observability;
use crate::sse::frame_stream;
use crate::types::{ChatRequest, ChatResponse, Document, MessageRecord, StreamFrame, Thread};

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api/";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for a retrieval-augmented chat backend.
///
/// Covers the chat endpoints (streaming and not) plus the thin thread
/// and document management endpoints the chat surface needs.
#[derive(Clone)]
pub struct Client {
    client: ReqwestClient,
    base_url: String,
    timeout: Duration,
    logger: Option<Arc<dyn ClientLogger>>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Client {
    /// Create a new client.
    ///
    /// The base URL can be provided directly, read from the
    /// CICERO_BASE_URL environment variable, or left to the default of
    /// a local backend.
    pub fn new(base_url: Option<String>) -> Result<Self> {
        Self::with_options(base_url, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(base_url: Option<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut base_url = base_url
            .or_else(|| env::var("CICERO_BASE_URL").ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Url::parse(&base_url)?;

        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            client,
            base_url,
            timeout,
            logger: None,
        })
    }

    /// Attach a logger that will see every request and decoded frame.
    pub fn with_logger(mut self, logger: Arc<dyn ClientLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Create and return default headers for API requests.
    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    /// Map a reqwest send error to our error type.
    fn request_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::timeout(
                format!("Request timed out: {}", e),
                Some(self.timeout.as_secs_f64()),
            )
        } else if e.is_connect() {
            Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
        } else {
            Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
        }
    }

    /// Process API response errors and convert to our Error type.
    async fn process_error_response(response: Response) -> Error {
        let status = response.status();
        let status_code = status.as_u16();

        // FastAPI-style backends report errors as {"detail": "..."}.
        #[derive(Deserialize)]
        struct ErrorResponse {
            detail: Option<String>,
            error: Option<String>,
        }

        let error_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {}", e),
                    Some(Box::new(e)),
                );
            }
        };

        let parsed = serde_json::from_str::<ErrorResponse>(&error_body).ok();
        let message = parsed
            .and_then(|e| e.detail.or(e.error))
            .unwrap_or_else(|| error_body.clone());

        match status_code {
            400 => Error::bad_request(message, None),
            404 => Error::not_found(message, None, None),
            408 => Error::timeout(message, None),
            500 => Error::internal_server(message),
            502..=504 => Error::service_unavailable(message),
            _ => Error::api(status_code, message),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        observability::CLIENT_REQUESTS.click();

        let response = self
            .client
            .get(&url)
            .headers(self.default_headers())
            .send()
            .await
            .map_err(|e| {
                observability::CLIENT_REQUEST_ERRORS.click();
                self.request_error(e)
            })?;

        if !response.status().is_success() {
            observability::CLIENT_REQUEST_ERRORS.click();
            return Err(Self::process_error_response(response).await);
        }

        response.json::<T>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let url = format!("{}{}", self.base_url, path);
        observability::CLIENT_REQUESTS.click();

        let response = self
            .client
            .delete(&url)
            .headers(self.default_headers())
            .send()
            .await
            .map_err(|e| {
                observability::CLIENT_REQUEST_ERRORS.click();
                self.request_error(e)
            })?;

        if !response.status().is_success() {
            observability::CLIENT_REQUEST_ERRORS.click();
            return Err(Self::process_error_response(response).await);
        }
        Ok(())
    }

    /// List all threads.
    pub async fn list_threads(&self) -> Result<Vec<Thread>> {
        self.get_json("threads/").await
    }

    /// Create a new thread.
    ///
    /// Passing no title lets the backend pick its default.
    pub async fn create_thread(&self, title: Option<&str>) -> Result<Thread> {
        #[derive(Serialize)]
        struct CreateThread<'a> {
            #[serde(skip_serializing_if = "Option::is_none")]
            title: Option<&'a str>,
        }

        let url = format!("{}threads/", self.base_url);
        observability::CLIENT_REQUESTS.click();

        let response = self
            .client
            .post(&url)
            .headers(self.default_headers())
            .json(&CreateThread { title })
            .send()
            .await
            .map_err(|e| {
                observability::CLIENT_REQUEST_ERRORS.click();
                self.request_error(e)
            })?;

        if !response.status().is_success() {
            observability::CLIENT_REQUEST_ERRORS.click();
            return Err(Self::process_error_response(response).await);
        }

        response.json::<Thread>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })
    }

    /// Delete a thread and its messages.
    pub async fn delete_thread(&self, thread_id: &str) -> Result<()> {
        self.delete(&format!("threads/{}", thread_id)).await
    }

    /// Fetch the persisted messages of a thread, oldest first.
    pub async fn list_messages(&self, thread_id: &str) -> Result<Vec<MessageRecord>> {
        self.get_json(&format!("threads/{}/messages", thread_id))
            .await
    }

    /// List all uploaded documents.
    pub async fn list_documents(&self) -> Result<Vec<Document>> {
        self.get_json("documents/").await
    }

    /// Upload a document for retrieval indexing.
    pub async fn upload_document(&self, path: &Path) -> Result<Document> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                Error::validation(
                    format!("Path has no usable file name: {}", path.display()),
                    Some("path".to_string()),
                )
            })?
            .to_string();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| Error::io(format!("Failed to read {}", path.display()), e))?;

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new().part("file", part);

        let url = format!("{}documents/upload", self.base_url);
        observability::CLIENT_REQUESTS.click();

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                observability::CLIENT_REQUEST_ERRORS.click();
                self.request_error(e)
            })?;

        if !response.status().is_success() {
            observability::CLIENT_REQUEST_ERRORS.click();
            return Err(Self::process_error_response(response).await);
        }

        response.json::<Document>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })
    }

    /// Delete a document and its retrieval chunks.
    pub async fn delete_document(&self, document_id: &str) -> Result<()> {
        self.delete(&format!("documents/{}", document_id)).await
    }

    /// Send a chat message and wait for the complete response.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        Self::validate_request(request)?;
        let url = format!("{}chat/", self.base_url);
        observability::CLIENT_REQUESTS.click();
        if let Some(logger) = &self.logger {
            logger.log_request(request);
        }

        let response = self
            .client
            .post(&url)
            .headers(self.default_headers())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                observability::CLIENT_REQUEST_ERRORS.click();
                self.request_error(e)
            })?;

        if !response.status().is_success() {
            observability::CLIENT_REQUEST_ERRORS.click();
            return Err(Self::process_error_response(response).await);
        }

        let response = response.json::<ChatResponse>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })?;
        if let Some(logger) = &self.logger {
            logger.log_response(&response);
        }
        Ok(response)
    }

    /// Send a chat message and stream the response.
    ///
    /// Returns a stream of decoded [`StreamFrame`]s. The stream ends
    /// when the server closes the connection; a transport failure
    /// surfaces as a single fatal `Err` item.
    pub async fn stream_chat(
        &self,
        request: &ChatRequest,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<StreamFrame>> + Send>>> {
        Self::validate_request(request)?;
        let url = format!("{}chat/stream", self.base_url);
        observability::CLIENT_REQUESTS.click();
        if let Some(logger) = &self.logger {
            logger.log_request(request);
        }

        let mut headers = self.default_headers();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/event-stream"),
        );

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                observability::CLIENT_REQUEST_ERRORS.click();
                self.request_error(e)
            })?;

        if !response.status().is_success() {
            observability::CLIENT_REQUEST_ERRORS.click();
            return Err(Self::process_error_response(response).await);
        }

        // Convert transport errors as they occur mid-stream.
        let bytes = response.bytes_stream().map(|result| {
            result.map_err(|e| {
                Error::streaming(format!("Error in HTTP stream: {}", e), Some(Box::new(e)))
            })
        });

        Ok(Box::pin(frame_stream(bytes, self.logger.clone())))
    }

    /// Callers check this already; re-checked here so a bad request
    /// never reaches the wire.
    fn validate_request(request: &ChatRequest) -> Result<()> {
        if request.message.trim().is_empty() {
            return Err(Error::validation(
                "message must not be empty",
                Some("message".to_string()),
            ));
        }
        Ok(())
    }

    /// The resolved base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation_defaults() {
        let client = Client::new(Some("http://localhost:9999/api/".to_string())).unwrap();
        assert_eq!(client.base_url(), "http://localhost:9999/api/");
        assert_eq!(client.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn client_appends_trailing_slash() {
        let client = Client::new(Some("http://localhost:9999/api".to_string())).unwrap();
        assert_eq!(client.base_url(), "http://localhost:9999/api/");
    }

    #[test]
    fn client_rejects_invalid_base_url() {
        let err = Client::new(Some("not a url".to_string())).unwrap_err();
        assert!(matches!(err, Error::Url { .. }));
    }

    #[tokio::test]
    async fn chat_rejects_empty_message() {
        let client = Client::new(Some("http://127.0.0.1:9/api/".to_string())).unwrap();
        let request = ChatRequest::new("   ", "t-1");
        let err = client.stream_chat(&request).await.err().unwrap();
        assert!(err.is_validation());
        let err = client.chat(&request).await.unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn client_with_custom_timeout() {
        let client = Client::with_options(
            Some("http://localhost:9999/api/".to_string()),
            Some(Duration::from_secs(5)),
        )
        .unwrap();
        assert_eq!(client.timeout, Duration::from_secs(5));
    }
}
