//! Image asset download for references collected during simplification.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};

use futures::stream::{self, StreamExt};
use serde::Serialize;

use crate::error::Result;
use crate::figma_client::FigmaClient;
use crate::simplify::ImageAssetReference;

/// Downloads in flight at once.
pub const MAX_CONCURRENT_DOWNLOADS: usize = 8;

/// Extension used when the payload's format is not recognized.
const FALLBACK_EXTENSION: &str = "png";

/// One `imageRef` together with every node that paints it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageGroup {
    pub image_ref: String,
    pub node_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum AssetOutcome {
    Downloaded { path: PathBuf },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDownload {
    pub image_ref: String,
    pub node_ids: Vec<String>,
    #[serde(flatten)]
    pub outcome: AssetOutcome,
}

impl AssetDownload {
    pub fn is_downloaded(&self) -> bool {
        matches!(self.outcome, AssetOutcome::Downloaded { .. })
    }
}

/// Group references by `imageRef`, keeping first-seen order.
pub fn group_image_refs(refs: &[ImageAssetReference]) -> Vec<ImageGroup> {
    let mut groups: Vec<ImageGroup> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for reference in refs {
        match index.get(reference.image_ref.as_str()) {
            Some(&slot) => {
                let group = &mut groups[slot];
                if !group.node_ids.contains(&reference.node_id) {
                    group.node_ids.push(reference.node_id.clone());
                }
            }
            None => {
                index.insert(reference.image_ref.as_str(), groups.len());
                groups.push(ImageGroup {
                    image_ref: reference.image_ref.clone(),
                    node_ids: vec![reference.node_id.clone()],
                });
            }
        }
    }

    groups
}

/// File name for an image ref: anything outside `[A-Za-z0-9_-]` becomes `_`,
/// and the extension follows the format sniffed from `bytes`.
pub fn asset_file_name(image_ref: &str, bytes: &[u8]) -> String {
    let stem: String = image_ref
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = if stem.is_empty() { "image".to_string() } else { stem };
    format!("{stem}.{}", image_extension(bytes))
}

fn image_extension(bytes: &[u8]) -> &'static str {
    image::guess_format(bytes)
        .ok()
        .and_then(|format| format.extensions_str().first().copied())
        .unwrap_or(FALLBACK_EXTENSION)
}

/// Resolve every referenced image through the file's image fills and write it under `dir`.
///
/// A failure to list the file's image fills is an error; a single missing
/// or failed image is reported in its [`AssetDownload`] and never stops the others.
pub async fn download_image_assets(
    client: &FigmaClient,
    file_key: &str,
    refs: &[ImageAssetReference],
    dir: &Path,
) -> Result<Vec<AssetDownload>> {
    let groups = group_image_refs(refs);
    if groups.is_empty() {
        return Ok(Vec::new());
    }

    let fills = client.image_fills(file_key).await?;
    tracing::debug!(
        resolved = fills.meta.images.len(),
        requested = groups.len(),
        "resolved image fills"
    );

    save_assets(groups, &fills.meta.images, dir, |url| async move {
        client.download(&url).await
    })
    .await
}

pub(crate) async fn save_assets<F, Fut>(
    groups: Vec<ImageGroup>,
    urls: &HashMap<String, String>,
    dir: &Path,
    fetch: F,
) -> Result<Vec<AssetDownload>>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<Vec<u8>>>,
{
    tokio::fs::create_dir_all(dir).await?;

    let fetch = &fetch;
    let jobs = groups.into_iter().map(|group| async move {
        let outcome = match urls.get(&group.image_ref) {
            None => AssetOutcome::Failed {
                reason: "no download URL for this image ref".to_string(),
            },
            Some(url) => match fetch(url.clone()).await {
                Ok(bytes) => {
                    let path = dir.join(asset_file_name(&group.image_ref, &bytes));
                    match tokio::fs::write(&path, bytes).await {
                        Ok(()) => AssetOutcome::Downloaded { path },
                        Err(err) => AssetOutcome::Failed {
                            reason: err.to_string(),
                        },
                    }
                }
                Err(err) => AssetOutcome::Failed {
                    reason: err.to_string(),
                },
            },
        };

        if let AssetOutcome::Failed { reason } = &outcome {
            tracing::warn!(image_ref = %group.image_ref, %reason, "image download failed");
        }

        AssetDownload {
            image_ref: group.image_ref,
            node_ids: group.node_ids,
            outcome,
        }
    });

    Ok(stream::iter(jobs)
        .buffered(MAX_CONCURRENT_DOWNLOADS)
        .collect::<Vec<_>>()
        .await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DctxError;
    use crate::simplify::ImageSource;
    use futures::future::ready;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10];
    const GIF: &[u8] = b"GIF89a\x01\x00";

    fn reference(node: &str, image_ref: &str) -> ImageAssetReference {
        ImageAssetReference {
            node_id: node.to_string(),
            image_ref: image_ref.to_string(),
            source: ImageSource::Fill,
        }
    }

    #[test]
    fn groups_by_image_ref_in_first_seen_order() {
        let groups = group_image_refs(&[
            reference("1:1", "b"),
            reference("1:2", "a"),
            reference("1:3", "b"),
            reference("1:3", "b"),
        ]);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].image_ref, "b");
        assert_eq!(groups[0].node_ids, vec!["1:1", "1:3"]);
        assert_eq!(groups[1].node_ids, vec!["1:2"]);
    }

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(asset_file_name("abc123", PNG), "abc123.png");
        assert_eq!(asset_file_name("../etc/passwd", PNG), "___etc_passwd.png");
        assert_eq!(asset_file_name("", PNG), "image.png");
    }

    #[test]
    fn extension_follows_payload_format() {
        assert_eq!(asset_file_name("photo", JPEG), "photo.jpg");
        assert_eq!(asset_file_name("anim", GIF), "anim.gif");
        assert_eq!(asset_file_name("blob", &[1, 2, 3]), "blob.png");
    }

    #[tokio::test]
    async fn one_failure_does_not_stop_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let groups = group_image_refs(&[
            reference("1:1", "ok"),
            reference("1:2", "broken"),
            reference("1:3", "unknown"),
        ]);
        let urls = HashMap::from([
            ("ok".to_string(), "https://cdn.example/ok".to_string()),
            ("broken".to_string(), "https://cdn.example/broken".to_string()),
        ]);

        let results = save_assets(groups, &urls, dir.path(), |url| {
            ready(if url.ends_with("ok") {
                Ok(PNG.to_vec())
            } else {
                Err(DctxError::figma_api(None, "boom"))
            })
        })
        .await
        .unwrap();

        assert_eq!(results.len(), 3);
        assert!(results[0].is_downloaded());
        let written = std::fs::read(dir.path().join("ok.png")).unwrap();
        assert_eq!(written, PNG);

        match &results[1].outcome {
            AssetOutcome::Failed { reason } => assert!(reason.contains("boom")),
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(!results[2].is_downloaded());
    }

    #[tokio::test]
    async fn creates_missing_output_directory() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("assets").join("images");
        let groups = group_image_refs(&[reference("1:1", "img")]);
        let urls = HashMap::from([("img".to_string(), "u".to_string())]);

        let results = save_assets(groups, &urls, &nested, |_| ready(Ok(JPEG.to_vec())))
            .await
            .unwrap();

        assert!(results[0].is_downloaded());
        assert!(nested.join("img.jpg").exists());
    }

    #[tokio::test]
    async fn downloads_run_with_bounded_concurrency() {
        let dir = tempfile::tempdir().unwrap();
        let refs: Vec<_> = (0..30)
            .map(|i| reference(&format!("1:{i}"), &format!("img{i}")))
            .collect();
        let urls: HashMap<_, _> = (0..30)
            .map(|i| (format!("img{i}"), format!("https://cdn.example/{i}")))
            .collect();
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let results = save_assets(group_image_refs(&refs), &urls, dir.path(), |_| {
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok(PNG.to_vec())
            }
        })
        .await
        .unwrap();

        assert_eq!(results.len(), 30);
        assert!(results.iter().all(AssetDownload::is_downloaded));
        assert_eq!(results[29].image_ref, "img29");
        assert!(peak.load(Ordering::SeqCst) <= MAX_CONCURRENT_DOWNLOADS);
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let download = AssetDownload {
            image_ref: "x".into(),
            node_ids: vec!["1:1".into()],
            outcome: AssetOutcome::Failed {
                reason: "missing".into(),
            },
        };
        let value = serde_json::to_value(&download).unwrap();
        assert_eq!(value["status"], "failed");
        assert_eq!(value["imageRef"], "x");
        assert_eq!(value["reason"], "missing");
    }
}
