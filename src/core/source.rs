use crate::utils::error::{Result, SourceError};
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Where the delimited text comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    File(PathBuf),
    Url(String),
    /// Bytes already in memory, e.g. an uploaded file.
    Upload { name: String, content: Vec<u8> },
}

impl Source {
    /// `http(s)://` locations become URLs, anything else a file path.
    pub fn from_location(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            Source::Url(location.to_string())
        } else {
            Source::File(PathBuf::from(location))
        }
    }

    pub fn label(&self) -> String {
        match self {
            Source::File(path) => path.display().to_string(),
            Source::Url(url) => url.clone(),
            Source::Upload { name, .. } => format!("upload:{}", name),
        }
    }
}

/// Reads a whole source into memory before parsing starts.
pub struct SourceReader {
    client: Client,
    timeout: Option<Duration>,
}

impl SourceReader {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            client: Client::new(),
            timeout,
        }
    }

    pub async fn read_text(&self, source: &Source) -> Result<String> {
        let bytes = match source {
            Source::File(path) => read_file(path).await?,
            Source::Url(url) => self.fetch(url).await?,
            Source::Upload { content, .. } => content.clone(),
        };
        decode_text(bytes, &source.label())
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        tracing::debug!("Fetching market data from: {}", url);

        let mut request = self.client.get(url);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| SourceError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        tracing::debug!("Source response status: {}", status);
        if !status.is_success() {
            return Err(SourceError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let body = response.bytes().await.map_err(|e| SourceError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(body.to_vec())
    }
}

impl Default for SourceReader {
    fn default() -> Self {
        Self::new(None)
    }
}

async fn read_file(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|e| {
        let location = path.display().to_string();
        if e.kind() == std::io::ErrorKind::NotFound {
            SourceError::NotFound { path: location }.into()
        } else {
            SourceError::Unreadable {
                location,
                reason: e.to_string(),
            }
            .into()
        }
    })
}

/// UTF-8 only; a leading BOM is dropped.
pub fn decode_text(bytes: Vec<u8>, location: &str) -> Result<String> {
    let bytes = match bytes.strip_prefix(UTF8_BOM) {
        Some(rest) => rest.to_vec(),
        None => bytes,
    };

    let text = String::from_utf8(bytes).map_err(|_| SourceError::UnsupportedEncoding {
        location: location.to_string(),
    })?;

    if text.trim().is_empty() {
        return Err(SourceError::Empty {
            location: location.to_string(),
        }
        .into());
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::EtlError;
    use httpmock::prelude::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_location_kinds() {
        assert_eq!(
            Source::from_location("https://example.com/a.csv"),
            Source::Url("https://example.com/a.csv".to_string())
        );
        assert_eq!(
            Source::from_location("data/a.csv"),
            Source::File(PathBuf::from("data/a.csv"))
        );
    }

    #[test]
    fn test_decode_strips_bom() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(b"Region,Year\n");
        let text = decode_text(bytes, "test").unwrap();
        assert!(text.starts_with("Region"));
    }

    #[test]
    fn test_decode_rejects_non_utf8_and_empty() {
        let err = decode_text(vec![0x53, 0xE9, 0xFF], "latin.csv").unwrap_err();
        assert!(matches!(
            err,
            EtlError::Source(SourceError::UnsupportedEncoding { .. })
        ));

        let err = decode_text(b"  \n\n".to_vec(), "blank.csv").unwrap_err();
        assert!(matches!(err, EtlError::Source(SourceError::Empty { .. })));
    }

    #[tokio::test]
    async fn test_read_file_source() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"Region,Year\nGlobal,2024\n").unwrap();

        let reader = SourceReader::default();
        let text = reader
            .read_text(&Source::File(file.path().to_path_buf()))
            .await
            .unwrap();
        assert!(text.contains("Global"));
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let reader = SourceReader::default();
        let err = reader
            .read_text(&Source::File(PathBuf::from("/definitely/not/here.csv")))
            .await
            .unwrap_err();
        assert!(matches!(err, EtlError::Source(SourceError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_url_source_success_and_failure() {
        let server = MockServer::start();
        let ok_mock = server.mock(|when, then| {
            when.method(GET).path("/market.csv");
            then.status(200)
                .header("Content-Type", "text/csv")
                .body("Region,Year\nGlobal,2024\n");
        });
        let failing_mock = server.mock(|when, then| {
            when.method(GET).path("/missing.csv");
            then.status(404);
        });

        let reader = SourceReader::new(Some(Duration::from_secs(5)));

        let text = reader
            .read_text(&Source::Url(server.url("/market.csv")))
            .await
            .unwrap();
        ok_mock.assert();
        assert!(text.contains("Global"));

        let err = reader
            .read_text(&Source::Url(server.url("/missing.csv")))
            .await
            .unwrap_err();
        failing_mock.assert();
        assert!(matches!(
            err,
            EtlError::Source(SourceError::HttpStatus { status: 404, .. })
        ));
    }
}
