//! Blob descriptors: what the server reports about a stored blob.

use serde::{Deserialize, Serialize};

use blobgate_core::ContentHash;

/// Public description of a stored blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobDescriptor {
    /// Where the blob can be fetched.
    pub url: String,

    /// SHA-256 of the blob bytes.
    pub sha256: ContentHash,

    /// Size in bytes.
    pub size: u64,

    /// MIME type reported at upload, if any.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    /// Upload time (Unix seconds).
    pub uploaded: i64,
}

impl BlobDescriptor {
    /// Describe a freshly uploaded blob served under `service_url`.
    ///
    /// The URL is `<service_url>/<hash>[.<extension>]`.
    pub fn new(
        service_url: &str,
        sha256: ContentHash,
        size: u64,
        mime_type: Option<String>,
        extension: Option<&str>,
        uploaded: i64,
    ) -> Self {
        let suffix = extension
            .map(|ext| ext.trim_start_matches('.'))
            .filter(|ext| !ext.is_empty())
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default();

        Self {
            url: format!("{}/{}{}", service_url.trim_end_matches('/'), sha256, suffix),
            sha256,
            size,
            mime_type,
            uploaded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_with_extension() {
        let hash = ContentHash::digest(b"hello");
        let d = BlobDescriptor::new("http://host:3334/", hash, 5, None, Some(".png"), 1);
        assert_eq!(d.url, format!("http://host:3334/{}.png", hash));

        let bare = BlobDescriptor::new("http://host:3334", hash, 5, None, Some(""), 1);
        assert_eq!(bare.url, format!("http://host:3334/{}", hash));
    }

    #[test]
    fn test_json_uses_type_field() {
        let hash = ContentHash::digest(b"hello");
        let d = BlobDescriptor::new("http://h", hash, 5, Some("text/plain".into()), None, 7);
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["type"], "text/plain");
        assert_eq!(json["sha256"], hash.to_hex());
        assert_eq!(json["size"], 5);
    }
}
