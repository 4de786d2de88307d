//! File upload handles.
//!
//! A file slot (`photo`, `document`, `certificate`, ...) accepts three shapes
//! interchangeably: a local path, a remote URL, or contents that are already
//! open. [`InputFile`] names a file that has not been opened yet;
//! [`FileStream`] is the opened form the multipart encoder consumes.

use std::fmt;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use url::Url;

use crate::error::ValidationError;
use crate::params::ParamValue;

/// A file that can be opened for upload.
#[derive(Clone, PartialEq)]
pub enum InputFile {
    /// A file on the local filesystem.
    Path(PathBuf),
    /// A remote resource, fetched when the request body is encoded.
    Url(Url),
    /// In-memory contents with the file name to report to the server.
    Memory {
        /// File name sent in the multipart `filename` attribute.
        file_name: String,
        /// Raw contents.
        bytes: Bytes,
    },
}

impl InputFile {
    /// Creates a handle for a local file.
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    /// Creates a handle for a remote file.
    pub fn url(url: Url) -> Self {
        Self::Url(url)
    }

    /// Creates a handle for in-memory contents.
    pub fn memory(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self::Memory {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    /// Opens the file.
    ///
    /// Local files are read in full; remote URLs are only wrapped and are
    /// downloaded by the transport while it encodes the body.
    pub async fn open(self) -> Result<FileStream, ValidationError> {
        match self {
            Self::Path(path) => {
                let bytes = tokio::fs::read(&path).await.map_err(|e| {
                    ValidationError::UnreadableFile {
                        path: path.display().to_string(),
                        reason: e.to_string(),
                    }
                })?;
                Ok(FileStream::Bytes {
                    file_name: file_name_of(&path),
                    bytes: Bytes::from(bytes),
                })
            }
            Self::Url(url) => Ok(FileStream::Remote(url)),
            Self::Memory { file_name, bytes } => Ok(FileStream::Bytes {
                file_name: Some(file_name),
                bytes,
            }),
        }
    }
}

impl fmt::Debug for InputFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Url(url) => f.debug_tuple("Url").field(&url.as_str()).finish(),
            Self::Memory { file_name, bytes } => f
                .debug_struct("Memory")
                .field("file_name", file_name)
                .field("len", &bytes.len())
                .finish(),
        }
    }
}

/// Opened file contents ready for multipart encoding.
#[derive(Clone, PartialEq)]
pub enum FileStream {
    /// Contents held in memory.
    Bytes {
        /// File name reported to the server, if known.
        file_name: Option<String>,
        /// Raw contents.
        bytes: Bytes,
    },
    /// A remote resource the transport streams into the request.
    Remote(Url),
}

impl FileStream {
    /// Returns the file name to report in the multipart part.
    pub fn file_name(&self) -> Option<String> {
        match self {
            Self::Bytes { file_name, .. } => file_name.clone(),
            Self::Remote(url) => url
                .path_segments()
                .and_then(|mut segments| segments.next_back())
                .filter(|name| !name.is_empty())
                .map(str::to_string),
        }
    }

    /// Returns the in-memory length, or `None` for remote streams.
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Bytes { bytes, .. } => Some(bytes.len()),
            Self::Remote(_) => None,
        }
    }
}

impl fmt::Debug for FileStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes { file_name, bytes } => f
                .debug_struct("Bytes")
                .field("file_name", file_name)
                .field("len", &bytes.len())
                .finish(),
            Self::Remote(url) => f.debug_tuple("Remote").field(&url.as_str()).finish(),
        }
    }
}

fn file_name_of(path: &Path) -> Option<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

/// Parses `value` as an absolute URL with a host.
///
/// Mirrors what the Bot API itself accepts as a URL: a scheme and an
/// authority are both required, so `mailto:` or bare paths are rejected.
pub fn parse_absolute_url(value: &str) -> Option<Url> {
    Url::parse(value).ok().filter(Url::has_host)
}

/// Normalizes the value of a file slot for multipart upload.
///
/// * Opened streams pass through untouched.
/// * [`InputFile`]s are opened.
/// * Strings naming an existing local file, or forming an absolute URL, are
///   opened as files.
/// * Anything else (typically a `file_id` already known to the server) is
///   coerced to its string form. `Null` stays `Null` so the encoder drops it.
pub async fn prepare_upload(value: ParamValue) -> Result<ParamValue, ValidationError> {
    match value {
        ParamValue::Stream(_) | ParamValue::Null => Ok(value),
        ParamValue::File(file) => file.open().await.map(ParamValue::Stream),
        ParamValue::Str(text) => {
            if is_local_file(&text).await {
                return InputFile::Path(PathBuf::from(text))
                    .open()
                    .await
                    .map(ParamValue::Stream);
            }
            if let Some(url) = parse_absolute_url(&text) {
                return Ok(ParamValue::Stream(FileStream::Remote(url)));
            }
            Ok(ParamValue::Str(text))
        }
        other => Ok(other
            .to_form_string()
            .map(ParamValue::Str)
            .unwrap_or(ParamValue::Null)),
    }
}

async fn is_local_file(candidate: &str) -> bool {
    if candidate.is_empty() {
        return false;
    }
    tokio::fs::metadata(candidate)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_local_path_is_opened() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"\x89PNG").unwrap();
        let path = file.path().to_string_lossy().into_owned();

        let prepared = prepare_upload(ParamValue::from(path)).await.unwrap();
        match prepared {
            ParamValue::Stream(FileStream::Bytes { bytes, file_name }) => {
                assert_eq!(&bytes[..], b"\x89PNG");
                assert!(file_name.is_some());
            }
            other => panic!("Expected opened stream, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_url_is_wrapped() {
        let prepared = prepare_upload(ParamValue::from("https://example.com/cat.jpg"))
            .await
            .unwrap();
        match prepared {
            ParamValue::Stream(stream) => {
                assert_eq!(stream.file_name().as_deref(), Some("cat.jpg"));
                assert_eq!(stream.len(), None);
            }
            other => panic!("Expected remote stream, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_file_id_is_coerced_to_string() {
        let prepared = prepare_upload(ParamValue::from("AgACAgIAAxkBAAIB")).await.unwrap();
        assert_eq!(prepared, ParamValue::Str("AgACAgIAAxkBAAIB".into()));

        let prepared = prepare_upload(ParamValue::from(42_i64)).await.unwrap();
        assert_eq!(prepared, ParamValue::Str("42".into()));
    }

    #[tokio::test]
    async fn test_open_stream_passes_through() {
        let stream = FileStream::Bytes {
            file_name: Some("a.bin".into()),
            bytes: Bytes::from_static(b"abc"),
        };
        let prepared = prepare_upload(ParamValue::Stream(stream.clone())).await.unwrap();
        assert_eq!(prepared, ParamValue::Stream(stream));
    }

    #[tokio::test]
    async fn test_missing_path_reports_unreadable() {
        let err = InputFile::path("/definitely/not/here.webp").open().await.unwrap_err();
        assert!(matches!(err, ValidationError::UnreadableFile { .. }));
    }

    #[test]
    fn test_absolute_url_requires_host() {
        assert!(parse_absolute_url("https://example.com/hook").is_some());
        assert!(parse_absolute_url("mailto:someone@example.com").is_none());
        assert!(parse_absolute_url("not a url").is_none());
    }
}
