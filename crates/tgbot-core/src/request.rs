//! Outbound request descriptors.

use std::fmt;
use std::time::Duration;

use crate::input_file::FileStream;
use crate::params::{ParamValue, Params};

/// Version reported in the `User-Agent` header.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Field that is always sent as a string in form bodies.
const REPLY_MARKUP: &str = "reply_markup";

// =============================================================================
// Request body
// =============================================================================

/// Contents of one multipart part.
#[derive(Debug, Clone, PartialEq)]
pub enum PartContents {
    /// A textual field.
    Text(String),
    /// File contents.
    Stream(FileStream),
}

/// One `{name, contents}` multipart entry.
#[derive(Debug, Clone, PartialEq)]
pub struct MultipartField {
    /// Field name.
    pub name: String,
    /// Field contents.
    pub contents: PartContents,
}

/// The encoded parameters of a request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// `application/x-www-form-urlencoded` fields.
    Form(Params),
    /// `multipart/form-data` parts, in order.
    Multipart(Vec<MultipartField>),
}

impl RequestBody {
    /// Encodes `params` as form fields.
    ///
    /// A `reply_markup` value is converted to its string form; every other
    /// field is passed through unchanged.
    pub fn form(mut params: Params) -> Self {
        params.map_value(REPLY_MARKUP, ParamValue::into_stringified);
        Self::Form(params)
    }

    /// Flattens `params` into multipart parts, skipping `Null` values.
    ///
    /// File values are expected to have been opened with
    /// [`prepare_upload`](crate::prepare_upload) first, as `Api::invoke`
    /// does. An unopened [`InputFile`](crate::InputFile) has no textual form
    /// and no part is written for it.
    pub fn multipart(params: Params) -> Self {
        let parts = params
            .into_iter()
            .filter_map(|(name, value)| {
                let contents = match value {
                    ParamValue::Null => return None,
                    ParamValue::Stream(stream) => PartContents::Stream(stream),
                    other => PartContents::Text(other.to_form_string()?),
                };
                Some(MultipartField { name, contents })
            })
            .collect();
        Self::Multipart(parts)
    }

    /// Returns `true` for multipart bodies.
    pub fn is_multipart(&self) -> bool {
        matches!(self, Self::Multipart(_))
    }

    /// Returns the names of the encoded fields, in order.
    pub fn field_names(&self) -> Vec<&str> {
        match self {
            Self::Form(params) => params
                .iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, _)| k)
                .collect(),
            Self::Multipart(parts) => parts.iter().map(|p| p.name.as_str()).collect(),
        }
    }

    /// Returns the textual value of `name`, if the body has one.
    pub fn text(&self, name: &str) -> Option<String> {
        match self {
            Self::Form(params) => params.get(name).and_then(ParamValue::to_form_string),
            Self::Multipart(parts) => parts.iter().find(|p| p.name == name).and_then(|p| {
                match &p.contents {
                    PartContents::Text(text) => Some(text.clone()),
                    PartContents::Stream(_) => None,
                }
            }),
        }
    }
}

// =============================================================================
// RequestDescriptor
// =============================================================================

/// An immutable, fully specified outbound API call.
#[derive(Clone)]
pub struct RequestDescriptor {
    token: String,
    endpoint: String,
    body: RequestBody,
    timeout: Duration,
    connect_timeout: Duration,
    is_async: bool,
}

impl RequestDescriptor {
    /// Creates a new descriptor.
    pub fn new(
        token: impl Into<String>,
        endpoint: impl Into<String>,
        body: RequestBody,
        timeout: Duration,
        connect_timeout: Duration,
        is_async: bool,
    ) -> Self {
        Self {
            token: token.into(),
            endpoint: endpoint.into(),
            body,
            timeout,
            connect_timeout,
            is_async,
        }
    }

    /// The bot token used for this request.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The API method name (e.g. `"sendMessage"`).
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The encoded parameters.
    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    /// Returns `true` if the body is multipart.
    pub fn is_multipart(&self) -> bool {
        self.body.is_multipart()
    }

    /// Total request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Connection establishment timeout.
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Whether the request was submitted in non-blocking mode.
    pub fn is_async(&self) -> bool {
        self.is_async
    }

    /// The `User-Agent` header value sent with every request.
    pub fn user_agent(&self) -> String {
        format!("tgbot/{SDK_VERSION}")
    }
}

impl fmt::Debug for RequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestDescriptor")
            .field("token", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("body", &self.body)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("is_async", &self.is_async)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use serde_json::json;

    #[test]
    fn test_form_stringifies_reply_markup_only() {
        let params = Params::new()
            .with("chat_id", 1)
            .with("reply_markup", json!({"remove_keyboard": true}))
            .with("entities", json!([{"type": "bold"}]));

        let body = RequestBody::form(params);
        let RequestBody::Form(encoded) = &body else {
            panic!("Expected form body");
        };
        assert_eq!(
            encoded.get("reply_markup"),
            Some(&ParamValue::Str(r#"{"remove_keyboard":true}"#.into()))
        );
        assert_eq!(encoded.get("chat_id"), Some(&ParamValue::Int(1)));
        assert!(matches!(encoded.get("entities"), Some(ParamValue::Json(_))));
        assert!(!body.is_multipart());
    }

    #[test]
    fn test_multipart_skips_null_and_keeps_order() {
        let photo = FileStream::Bytes {
            file_name: Some("cat.png".into()),
            bytes: Bytes::from_static(b"png"),
        };
        let params = Params::new()
            .with("chat_id", 1)
            .with("photo", photo.clone())
            .with("caption", ParamValue::Null);

        let body = RequestBody::multipart(params);
        assert!(body.is_multipart());
        assert_eq!(body.field_names(), ["chat_id", "photo"]);
        let RequestBody::Multipart(parts) = body else {
            unreachable!()
        };
        assert_eq!(parts[0].contents, PartContents::Text("1".into()));
        assert_eq!(parts[1].contents, PartContents::Stream(photo));
    }

    #[test]
    fn test_debug_redacts_token() {
        let request = RequestDescriptor::new(
            "123:secret",
            "getMe",
            RequestBody::form(Params::new()),
            Duration::from_secs(60),
            Duration::from_secs(10),
            false,
        );
        let rendered = format!("{request:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("getMe"));
    }
}
