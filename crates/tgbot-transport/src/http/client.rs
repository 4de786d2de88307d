//! reqwest-backed [`Transport`] implementation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, ClientBuilder};
use tracing::{debug, trace};

use tgbot_core::{
    FileStream, MultipartField, Params, PartContents, RawResponse, RequestBody, RequestDescriptor,
    Transport, TransportError, TransportResult,
};

/// Default Bot API server.
pub const DEFAULT_BASE_URL: &str = "https://api.telegram.org";

/// Builds `{base_url}/file/bot{token}/{file_path}`.
pub fn file_url(base_url: &str, token: &str, file_path: &str) -> String {
    format!(
        "{}/file/bot{}/{}",
        base_url.trim_end_matches('/'),
        token,
        file_path.trim_start_matches('/')
    )
}

/// HTTP transport for the Bot API.
///
/// Requests are POSTed to `{base_url}/bot{token}/{endpoint}`. The per-request
/// timeout comes from the [`RequestDescriptor`]; because reqwest fixes the
/// connect timeout per client, one client is kept per distinct connect
/// timeout. Nothing is retried.
pub struct HttpTransport {
    base_url: String,
    clients: Mutex<HashMap<Duration, Client>>,
}

impl HttpTransport {
    /// Creates a transport for the public Bot API server.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Creates a transport for a custom server (e.g. a local Bot API server).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// The server this transport talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the URL of an API method.
    pub fn method_url(&self, token: &str, endpoint: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, token, endpoint)
    }

    /// Builds the download URL of a file returned by `getFile`.
    pub fn file_url(&self, token: &str, file_path: &str) -> String {
        file_url(&self.base_url, token, file_path)
    }

    /// Returns the client for `connect_timeout`, building it on first use.
    fn client_for(&self, connect_timeout: Duration) -> TransportResult<Client> {
        let mut clients = self.clients.lock();
        if let Some(client) = clients.get(&connect_timeout) {
            return Ok(client.clone());
        }
        let client = ClientBuilder::new()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| TransportError::Http(e.without_url().to_string()))?;
        debug!(connect_timeout_secs = connect_timeout.as_secs(), "Built HTTP client");
        clients.insert(connect_timeout, client.clone());
        Ok(client)
    }

    /// Builds the multipart form, downloading remote files first.
    async fn multipart_form(
        &self,
        client: &Client,
        parts: &[MultipartField],
    ) -> TransportResult<Form> {
        let mut form = Form::new();
        for field in parts {
            form = match &field.contents {
                PartContents::Text(text) => form.text(field.name.clone(), text.clone()),
                PartContents::Stream(stream) => {
                    let part = self.file_part(client, &field.name, stream).await?;
                    form.part(field.name.clone(), part)
                }
            };
        }
        Ok(form)
    }

    async fn file_part(
        &self,
        client: &Client,
        name: &str,
        stream: &FileStream,
    ) -> TransportResult<Part> {
        let file_name = stream.file_name().unwrap_or_else(|| name.to_string());
        let bytes = match stream {
            FileStream::Bytes { bytes, .. } => bytes.clone(),
            FileStream::Remote(url) => {
                trace!(name = %name, url = %url, "Downloading remote attachment");
                let attachment_err = |reason: String| TransportError::Attachment {
                    name: name.to_string(),
                    reason,
                };
                client
                    .get(url.clone())
                    .send()
                    .await
                    .and_then(reqwest::Response::error_for_status)
                    .map_err(|e| attachment_err(e.to_string()))?
                    .bytes()
                    .await
                    .map_err(|e| attachment_err(e.to_string()))?
            }
        };
        Ok(Part::bytes(bytes.to_vec()).file_name(file_name))
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: Arc<RequestDescriptor>) -> TransportResult<RawResponse> {
        let client = self.client_for(request.connect_timeout())?;
        let url = self.method_url(request.token(), request.endpoint());

        let builder = client
            .post(&url)
            .timeout(request.timeout())
            .header(reqwest::header::USER_AGENT, request.user_agent());

        let builder = match request.body() {
            RequestBody::Form(params) => builder.form(&form_fields(params)?),
            RequestBody::Multipart(parts) => {
                builder.multipart(self.multipart_form(&client, parts).await?)
            }
        };

        let response = builder
            .send()
            .await
            .map_err(|e| map_send_error(e, &self.base_url, request.endpoint()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Http(e.without_url().to_string()))?;

        trace!(endpoint = %request.endpoint(), status = status, len = body.len(), "HTTP response");
        Ok(RawResponse { status, body })
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// Renders form fields, skipping nulls.
///
/// A form body cannot carry file contents, so a file value is an error
/// rather than being left out of the request.
fn form_fields(params: &Params) -> TransportResult<Vec<(&str, String)>> {
    let mut fields = Vec::with_capacity(params.len());
    for (name, value) in params.iter() {
        if value.is_file() {
            return Err(TransportError::Attachment {
                name: name.to_string(),
                reason: "file values need a multipart body".to_string(),
            });
        }
        if let Some(text) = value.to_form_string() {
            fields.push((name, text));
        }
    }
    Ok(fields)
}

/// Maps a reqwest error, making sure the token-bearing URL never leaks.
fn map_send_error(err: reqwest::Error, base_url: &str, endpoint: &str) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout {
            endpoint: endpoint.to_string(),
        }
    } else if err.is_connect() {
        TransportError::ConnectionFailed {
            url: base_url.to_string(),
            reason: err.without_url().to_string(),
        }
    } else {
        TransportError::Http(err.without_url().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use serde_json::json;
    use tgbot_core::InputFile;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn descriptor(endpoint: &str, body: RequestBody) -> Arc<RequestDescriptor> {
        Arc::new(RequestDescriptor::new(
            "123:abc",
            endpoint,
            body,
            Duration::from_secs(5),
            Duration::from_secs(2),
            false,
        ))
    }

    #[test]
    fn test_urls() {
        let transport = HttpTransport::with_base_url("http://localhost:8081/");
        assert_eq!(
            transport.method_url("1:x", "getMe"),
            "http://localhost:8081/bot1:x/getMe"
        );
        assert_eq!(
            transport.file_url("1:x", "/photos/file_0.jpg"),
            "http://localhost:8081/file/bot1:x/photos/file_0.jpg"
        );
    }

    #[tokio::test]
    async fn test_form_body_refuses_file_values() {
        let params = Params::new()
            .with("chat_id", 42)
            .with("thumb", InputFile::memory("t.jpg", &b"\xff\xd8"[..]));
        let transport = HttpTransport::with_base_url("http://127.0.0.1:9");

        let err = transport
            .send(descriptor("sendMessage", RequestBody::form(params)))
            .await
            .unwrap_err();
        match err {
            TransportError::Attachment { name, .. } => assert_eq!(name, "thumb"),
            other => panic!("Expected attachment error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_form_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot123:abc/sendMessage"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("chat_id=42"))
            .and(body_string_contains("text=hi"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": {"message_id": 1}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let transport = HttpTransport::with_base_url(server.uri());
        let params = Params::new()
            .with("chat_id", 42)
            .with("text", "hi")
            .with("parse_mode", tgbot_core::ParamValue::Null);
        let raw = transport
            .send(descriptor("sendMessage", RequestBody::form(params)))
            .await
            .unwrap();

        assert_eq!(raw.status, 200);
        let body: serde_json::Value = serde_json::from_slice(&raw.body).unwrap();
        assert_eq!(body["result"]["message_id"], 1);
    }

    #[tokio::test]
    async fn test_error_status_is_not_a_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(
                json!({"ok": false, "error_code": 401, "description": "Unauthorized"}),
            ))
            .mount(&server)
            .await;

        let transport = HttpTransport::with_base_url(server.uri());
        let raw = transport
            .send(descriptor("getMe", RequestBody::form(Params::new())))
            .await
            .unwrap();
        assert_eq!(raw.status, 401);
    }

    #[tokio::test]
    async fn test_multipart_request_carries_file() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bot123:abc/sendPhoto"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": {}})))
            .mount(&server)
            .await;

        let transport = HttpTransport::with_base_url(server.uri());
        let params = Params::new().with("chat_id", 1).with(
            "photo",
            FileStream::Bytes {
                file_name: Some("cat.png".into()),
                bytes: Bytes::from_static(b"PNGDATA"),
            },
        );
        transport
            .send(descriptor("sendPhoto", RequestBody::multipart(params)))
            .await
            .unwrap();

        let received = server.received_requests().await.unwrap();
        assert_eq!(received.len(), 1);
        let content_type = received[0]
            .headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.starts_with("multipart/form-data"));
        let body = String::from_utf8_lossy(&received[0].body);
        assert!(body.contains("name=\"chat_id\""));
        assert!(body.contains("filename=\"cat.png\""));
        assert!(body.contains("PNGDATA"));
    }

    #[tokio::test]
    async fn test_connection_failure_hides_token() {
        // Port 9 (discard) on localhost is reliably closed in test environments.
        let transport = HttpTransport::with_base_url("http://127.0.0.1:9");
        let err = transport
            .send(descriptor("getMe", RequestBody::form(Params::new())))
            .await
            .unwrap_err();
        assert!(!err.to_string().contains("123:abc"));
    }
}
