//! Pre-signed upload descriptors.

/// Where to PUT a file, and where it will be publicly readable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    /// Time-limited pre-signed URL (carries the signature in its query string).
    pub upload_url: String,
    /// `upload_url` with the query string removed.
    pub file_url: String,
}

impl UploadTarget {
    pub fn new(upload_url: impl Into<String>) -> Self {
        let upload_url = upload_url.into();
        let file_url = strip_query(&upload_url).to_owned();
        Self { upload_url, file_url }
    }
}

/// Everything before the first `?`.
pub fn strip_query(url: &str) -> &str {
    url.split_once('?').map_or(url, |(head, _)| head)
}

/// Raw transport answer to an upload PUT. Callers only care that it succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResponse {
    pub status: u16,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_url_drops_signature() {
        let target = UploadTarget::new("https://storage.example.com/v/123.mp4?X-Amz-Signature=abc&x=1");
        assert_eq!(target.file_url, "https://storage.example.com/v/123.mp4");
        assert!(target.upload_url.ends_with("x=1"));
    }

    #[test]
    fn url_without_query_is_unchanged() {
        assert_eq!(strip_query("https://cdn.example.com/a.html"), "https://cdn.example.com/a.html");
    }
}
