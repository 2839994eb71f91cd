//! Public URLs for exercise media kept in an object-storage bucket.

/// Bucket holding exercise images and videos.
pub const DEFAULT_BUCKET: &str = "fitness-exercise";

#[derive(Clone, Debug)]
pub struct MediaResolver {
    storage_url: String,
    bucket: String,
}

impl MediaResolver {
    pub fn new(storage_url: &str, bucket: &str) -> Self {
        Self {
            storage_url: storage_url.trim_end_matches('/').to_string(),
            bucket: bucket.trim_matches('/').to_string(),
        }
    }

    /// Resolve a path in the default bucket.
    pub fn public_url(&self, path: &str) -> Option<String> {
        self.public_url_in(&self.bucket, path)
    }

    /// Resolve a path in `bucket`.
    ///
    /// Blank paths resolve to nothing. Values that already are absolute
    /// `http(s)` URLs are returned unchanged. Without a storage host, only
    /// absolute URLs resolve.
    pub fn public_url_in(&self, bucket: &str, path: &str) -> Option<String> {
        let path = path.trim();
        if path.is_empty() {
            return None;
        }
        if path.starts_with("http://") || path.starts_with("https://") {
            return Some(path.to_string());
        }
        if self.storage_url.is_empty() {
            return None;
        }

        Some(format!(
            "{}/storage/v1/object/public/{}/{}",
            self.storage_url,
            bucket.trim_matches('/'),
            path.trim_start_matches('/')
        ))
    }
}

impl Default for MediaResolver {
    fn default() -> Self {
        Self::new("", DEFAULT_BUCKET)
    }
}
