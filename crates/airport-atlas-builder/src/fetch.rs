use crate::error::FetchError;
use flate2::read::GzDecoder;
use log::{debug, info};
use std::fmt;
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Where a feed comes from: an HTTP(S) URL or a local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Remote(String),
    Local(PathBuf),
}

impl Source {
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.starts_with("http://") || s.starts_with("https://") {
            Source::Remote(s.to_string())
        } else {
            Source::Local(PathBuf::from(s.strip_prefix("file://").unwrap_or(s)))
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Remote(url) => write!(f, "{}", url),
            Source::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Reads the whole feed into memory, following redirects and gunzipping
/// gzip bodies.
pub fn fetch_bytes(source: &Source, timeout: Duration) -> Result<Vec<u8>, FetchError> {
    let raw = match source {
        Source::Remote(url) => {
            info!(
                "Downloading feed — url={} timeout_secs={}",
                url,
                timeout.as_secs()
            );
            let client = reqwest::blocking::Client::builder()
                .timeout(timeout)
                .build()?;
            let response = client.get(url).send()?.error_for_status()?;
            response.bytes()?.to_vec()
        }
        Source::Local(path) => {
            info!("Reading feed from disk — path={}", path.display());
            fs::read(path)?
        }
    };

    debug!("Feed fetched — source={} bytes={}", source, raw.len());
    maybe_gunzip(raw)
}

fn maybe_gunzip(raw: Vec<u8>) -> Result<Vec<u8>, FetchError> {
    if !raw.starts_with(&GZIP_MAGIC) {
        return Ok(raw);
    }

    let mut decoder = GzDecoder::new(&raw[..]);
    let mut out = Vec::with_capacity(raw.len() * 4);
    decoder.read_to_end(&mut out)?;
    debug!(
        "Decompressed gzip feed — compressed_bytes={} uncompressed_bytes={}",
        raw.len(),
        out.len()
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn test_source_parse() {
        assert_eq!(
            Source::parse("https://example.org/airports.json"),
            Source::Remote("https://example.org/airports.json".to_string())
        );
        assert_eq!(
            Source::parse("  /tmp/airports.json "),
            Source::Local(PathBuf::from("/tmp/airports.json"))
        );
        assert_eq!(
            Source::parse("file:///data/airports.csv"),
            Source::Local(PathBuf::from("/data/airports.csv"))
        );
    }

    #[test]
    fn test_plain_body_passes_through() {
        let body = b"{\"a\": 1}".to_vec();
        assert_eq!(maybe_gunzip(body.clone()).unwrap(), body);
    }

    #[test]
    fn test_gzip_body_is_decoded() {
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(b"iata_code,type\nMEX,large_airport\n").unwrap();
        let gz = enc.finish().unwrap();

        let out = maybe_gunzip(gz).unwrap();
        assert_eq!(out, b"iata_code,type\nMEX,large_airport\n");
    }

    #[test]
    fn test_missing_local_file_is_io_error() {
        let src = Source::Local(PathBuf::from("/definitely/not/here.json"));
        let err = fetch_bytes(&src, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, FetchError::Io(_)));
    }
}
