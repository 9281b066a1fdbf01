//! Best-effort image prefetch: every source is tried concurrently, a failure
//! is logged and recorded as missing, and the batch as a whole never fails.

use std::collections::BTreeMap;

use futures_util::future::join_all;

use crate::fetch::fetch_bytes;

#[derive(Debug, Default)]
pub struct AssetCache {
    pub loaded: BTreeMap<String, Vec<u8>>,
    pub missing: Vec<String>,
}

impl AssetCache {
    pub fn get(&self, src: &str) -> Option<&[u8]> {
        self.loaded.get(src).map(Vec::as_slice)
    }
}

/// PNG, JPEG, GIF, WebP or SVG, judged by content rather than extension.
pub fn looks_like_image(bytes: &[u8]) -> bool {
    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n";
    const JPEG: &[u8] = &[0xff, 0xd8, 0xff];
    if bytes.starts_with(PNG)
        || bytes.starts_with(JPEG)
        || bytes.starts_with(b"GIF87a")
        || bytes.starts_with(b"GIF89a")
    {
        return true;
    }
    if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return true;
    }
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(512)]);
    head.contains("<svg")
}

async fn load_one(client: &reqwest::Client, src: &str) -> Result<Vec<u8>, String> {
    let bytes = if src.starts_with("http://") || src.starts_with("https://") {
        fetch_bytes(client, src).await.map_err(|e| e.to_string())?
    } else {
        tokio::fs::read(src).await.map_err(|e| e.to_string())?
    };
    if looks_like_image(&bytes) {
        Ok(bytes)
    } else {
        Err("not an image".to_string())
    }
}

pub async fn preload(client: &reqwest::Client, sources: &[String]) -> AssetCache {
    let results = join_all(sources.iter().map(|src| async move {
        let result = load_one(client, src).await;
        (src, result)
    }))
    .await;

    let mut cache = AssetCache::default();
    for (src, result) in results {
        match result {
            Ok(bytes) => {
                cache.loaded.insert(src.clone(), bytes);
            }
            Err(reason) => {
                tracing::warn!(src = %src, reason = %reason, "asset failed to load");
                cache.missing.push(src.clone());
            }
        }
    }
    cache
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_common_image_signatures() {
        assert!(looks_like_image(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR"));
        assert!(looks_like_image(&[0xff, 0xd8, 0xff, 0xe0]));
        assert!(looks_like_image(b"GIF89a\x01\x00"));
        assert!(looks_like_image(b"RIFF\x10\x00\x00\x00WEBPVP8 "));
        assert!(looks_like_image(b"<?xml version=\"1.0\"?>\n<svg xmlns=\"x\"/>"));
    }

    #[test]
    fn rejects_html_and_empty_bodies() {
        assert!(!looks_like_image(b""));
        assert!(!looks_like_image(b"<html><body>404</body></html>"));
    }

    #[tokio::test]
    async fn missing_local_files_are_recorded_not_raised() {
        let client = reqwest::Client::new();
        let sources = vec!["/nonexistent/grepomap/temple.png".to_string()];
        let cache = preload(&client, &sources).await;
        assert!(cache.loaded.is_empty());
        assert_eq!(cache.missing, sources);
    }
}
