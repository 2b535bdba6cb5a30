//! Media ingestion adapter backed by S3-compatible object storage
//!
//! Multipart uploads are spooled to a local directory, probed (videos need a
//! duration), pushed to the bucket, and the local file is removed on every
//! path, success or failure. Releasing objects reports per-object outcomes
//! so callers can surface compensating-action failures instead of
//! swallowing them.

use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ApiError;

/// What kind of object is being stored; decides the key prefix and whether
/// a duration is probed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Image,
}

impl MediaKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Video => "videos",
            Self::Image => "images",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Image => "image",
        }
    }
}

/// Result of a successful ingestion
#[derive(Debug, Clone)]
pub struct StoredMedia {
    /// Public URL the object is served from
    pub url: String,
    /// Stable identifier (the object key) used for later release
    pub public_id: String,
    /// Probed duration in seconds, present for videos
    pub duration: Option<f64>,
}

/// Per-object outcome of a compensating storage release
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaCleanup {
    pub public_id: String,
    pub kind: &'static str,
    pub released: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Object-storage client wrapper
#[derive(Clone)]
pub struct MediaStore {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl MediaStore {
    pub fn new(client: Client, bucket: String, public_base_url: String) -> Self {
        Self {
            client,
            bucket,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Upload a spooled file to the bucket and remove the local copy
    ///
    /// For videos the duration is probed first; a file we cannot probe is
    /// rejected before anything reaches the bucket.
    pub async fn ingest(&self, local_path: &Path, kind: MediaKind) -> Result<StoredMedia, ApiError> {
        let duration = if kind == MediaKind::Video {
            match probe_duration(local_path) {
                Ok(seconds) => Some(seconds),
                Err(e) => {
                    discard_local(local_path).await;
                    return Err(ApiError::validation(format!(
                        "Could not determine video duration: {e}"
                    )));
                }
            }
        } else {
            None
        };

        let key = object_key(kind.prefix(), local_path.file_name().and_then(|n| n.to_str()));

        let body = match ByteStream::from_path(local_path).await {
            Ok(body) => body,
            Err(e) => {
                discard_local(local_path).await;
                return Err(ApiError::Upload(format!("Failed to read upload: {e}")));
            }
        };

        let result = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(body)
            .send()
            .await;

        discard_local(local_path).await;

        if let Err(e) = result {
            return Err(ApiError::Upload(format!("Failed to store object: {e}")));
        }

        info!("Stored {} object: {}", kind.as_str(), key);

        Ok(StoredMedia {
            url: format!("{}/{}", self.public_base_url, key),
            public_id: key,
            duration,
        })
    }

    /// Delete a stored object
    pub async fn release(&self, public_id: &str, kind: MediaKind) -> Result<(), String> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(public_id)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        info!("Released {} object: {}", kind.as_str(), public_id);
        Ok(())
    }

    /// Release several objects, reporting the outcome per object
    pub async fn release_all(&self, objects: &[(&str, MediaKind)]) -> Vec<MediaCleanup> {
        let mut report = Vec::with_capacity(objects.len());

        for (public_id, kind) in objects {
            let outcome = self.release(public_id, *kind).await;
            if let Err(e) = &outcome {
                warn!("Failed to release {} object {}: {}", kind.as_str(), public_id, e);
            }
            report.push(MediaCleanup {
                public_id: public_id.to_string(),
                kind: kind.as_str(),
                released: outcome.is_ok(),
                error: outcome.err(),
            });
        }

        report
    }
}

/// Spool one multipart field to the upload directory
pub async fn spool_upload(
    field: &mut axum::extract::multipart::Field<'_>,
    upload_dir: &str,
) -> Result<PathBuf, ApiError> {
    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| ApiError::Upload(format!("Failed to prepare upload directory: {e}")))?;

    let original = field.file_name().unwrap_or("upload").to_string();
    let path = Path::new(upload_dir).join(format!("{}-{}", Uuid::new_v4(), original));

    let mut file = tokio::fs::File::create(&path)
        .await
        .map_err(|e| ApiError::Upload(format!("Failed to spool upload: {e}")))?;

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| ApiError::validation(format!("Malformed upload: {e}")))?
    {
        if let Err(e) = file.write_all(&chunk).await {
            drop(file);
            discard_local(&path).await;
            return Err(ApiError::Upload(format!("Failed to spool upload: {e}")));
        }
    }

    file.flush()
        .await
        .map_err(|e| ApiError::Upload(format!("Failed to spool upload: {e}")))?;

    Ok(path)
}

/// Remove a spooled file; missing files are fine, other failures are logged
pub async fn discard_local(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Failed to remove temp file {}: {}", path.display(), e);
        }
    }
}

/// Remove several spooled files
pub async fn discard_all(paths: &[PathBuf]) {
    for path in paths {
        discard_local(path).await;
    }
}

fn object_key(prefix: &str, original_name: Option<&str>) -> String {
    let extension = original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default();

    format!("{}/{}{}", prefix, Uuid::new_v4(), extension)
}

/// Probe a local video file for its duration in seconds
fn probe_duration(path: &Path) -> Result<f64, String> {
    let probe = ffprobe::ffprobe(path).map_err(|e| format!("probe failed: {e:?}"))?;

    let duration = probe
        .format
        .duration
        .or_else(|| probe.streams.iter().find_map(|s| s.duration.clone()));

    parse_duration(duration.as_deref())
}

fn parse_duration(raw: Option<&str>) -> Result<f64, String> {
    let raw = raw.ok_or_else(|| "no duration reported".to_string())?;
    let seconds: f64 = raw
        .parse()
        .map_err(|_| format!("unparseable duration: {raw}"))?;

    if seconds <= 0.0 {
        return Err(format!("non-positive duration: {raw}"));
    }

    Ok(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_keeps_extension() {
        let key = object_key("videos", Some("My Clip.MP4"));
        assert!(key.starts_with("videos/"));
        assert!(key.ends_with(".mp4"));
    }

    #[test]
    fn test_object_key_without_extension() {
        let key = object_key("images", Some("thumbnail"));
        assert!(key.starts_with("images/"));
        assert!(!key.contains('.'));
    }

    #[test]
    fn test_object_keys_are_unique() {
        let a = object_key("videos", Some("a.mp4"));
        let b = object_key("videos", Some("a.mp4"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration(Some("12.5")).unwrap(), 12.5);
        assert!(parse_duration(None).is_err());
        assert!(parse_duration(Some("abc")).is_err());
        assert!(parse_duration(Some("0")).is_err());
        assert!(parse_duration(Some("-3")).is_err());
    }

    #[test]
    fn test_cleanup_report_serialization() {
        let entry = MediaCleanup {
            public_id: "videos/abc.mp4".to_string(),
            kind: "video",
            released: false,
            error: Some("timeout".to_string()),
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["publicId"], "videos/abc.mp4");
        assert_eq!(value["released"], false);
        assert_eq!(value["error"], "timeout");
    }
}
