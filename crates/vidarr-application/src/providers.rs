// SPDX-License-Identifier: GPL-3.0-or-later

//! Collaborator seams for everything outside the decision core: library
//! lookups, media identity resolution, torrent content inspection and the
//! actual download client. The selection engine only ever talks to these
//! traits; tests substitute in-memory fakes.

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};
use vidarr_domain::{Candidate, LibrarySnapshot, MediaInfo, MediaKey, ParsedMeta, TorrentInfo};

use crate::title_parsing::{self, VIDEO_EXTS};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider unavailable: {0}")]
    Unavailable(String),
    #[error("provider response invalid: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum InspectError {
    /// Magnet-only or dead torrents expose no file list.
    #[error("torrent carries no file list")]
    NoFileList,
    #[error("failed to fetch torrent contents: {0}")]
    Fetch(String),
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("download client rejected the job: {0}")]
    Rejected(String),
    #[error("download client unreachable: {0}")]
    Unreachable(String),
}

/// What the download client accepted; the id keys later history lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReceipt {
    pub id: String,
}

/// Reports which seasons/episodes the library already holds for a media.
#[async_trait]
pub trait LibraryExistenceProvider: Send + Sync {
    /// `None` means the library has no copy at all.
    async fn existing(
        &self,
        key: &MediaKey,
        season: Option<u32>,
    ) -> Result<Option<LibrarySnapshot>, ProviderError>;
}

/// Resolves parsed metadata to a catalog identity with full season data.
#[async_trait]
pub trait MediaRecognizer: Send + Sync {
    /// `Ok(None)` means this provider does not know the title.
    async fn recognize(&self, meta: &ParsedMeta) -> Result<Option<MediaInfo>, ProviderError>;
}

/// An ordered list of recognizers; the first non-empty answer wins. Provider
/// failures are logged and skipped so one flaky backend never blocks
/// recognition.
#[derive(Default)]
pub struct RecognizerChain {
    providers: Vec<Arc<dyn MediaRecognizer>>,
}

impl RecognizerChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, provider: Arc<dyn MediaRecognizer>) -> &mut Self {
        self.providers.push(provider);
        self
    }

    pub async fn recognize(&self, meta: &ParsedMeta) -> Option<MediaInfo> {
        for (index, provider) in self.providers.iter().enumerate() {
            match provider.recognize(meta).await {
                Ok(Some(media)) => {
                    debug!(
                        target: "providers",
                        title = %meta.raw_title,
                        provider = index,
                        media = %media.key,
                        "recognized"
                    );
                    return Some(media);
                }
                Ok(None) => {}
                Err(error) => {
                    warn!(
                        target: "providers",
                        title = %meta.raw_title,
                        provider = index,
                        %error,
                        "recognizer failed, trying next"
                    );
                }
            }
        }
        None
    }
}

/// The file listing inside a torrent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TorrentListing {
    pub folder: Option<String>,
    pub files: Vec<String>,
}

/// Fetches and decodes torrent contents so selection can see the real
/// episode coverage behind an ambiguous title.
#[async_trait]
pub trait TorrentInspector: Send + Sync {
    async fn inspect(&self, torrent: &TorrentInfo) -> Result<TorrentListing, InspectError>;
}

/// Hands an accepted candidate to the download client, optionally restricted
/// to a subset of its episodes.
#[async_trait]
pub trait Downloader: Send + Sync {
    async fn download(
        &self,
        candidate: &Candidate,
        episodes: Option<&BTreeSet<u32>>,
    ) -> Result<DownloadReceipt, DownloadError>;
}

/// Episode numbers observed in a torrent file listing, sorted and deduped.
/// Non-video files and files whose names parse to no episode are ignored.
pub fn episodes_from_files(files: &[String]) -> Vec<u32> {
    let mut episodes = BTreeSet::new();
    for path in files {
        let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
        let ext = name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
        if !matches!(ext.as_deref(), Some(ext) if VIDEO_EXTS.contains(&ext)) {
            continue;
        }
        let meta = title_parsing::parse_title(name, None);
        episodes.extend(meta.episode_list());
    }
    episodes.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::{episodes_from_files, MediaRecognizer, ProviderError, RecognizerChain};
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use vidarr_domain::{MediaInfo, MediaKey, MediaKind, ParsedMeta};

    #[test]
    fn episodes_are_recovered_from_video_files() {
        let files = vec![
            "Show.S01E01.1080p.mkv".to_string(),
            "Show.S01E02.1080p.mkv".to_string(),
            "Show/Show.S01E03.1080p.mp4".to_string(),
            "Show.S01E02.1080p.mkv".to_string(),
            "readme.txt".to_string(),
            "Show.S01E99.sample.nfo".to_string(),
        ];
        assert_eq!(episodes_from_files(&files), vec![1, 2, 3]);
    }

    #[test]
    fn episode_ranges_expand() {
        let files = vec!["Show.S01E01-E04.2160p.mkv".to_string()];
        assert_eq!(episodes_from_files(&files), vec![1, 2, 3, 4]);
    }

    struct FixedRecognizer(Option<MediaInfo>);

    #[async_trait]
    impl MediaRecognizer for FixedRecognizer {
        async fn recognize(&self, _: &ParsedMeta) -> Result<Option<MediaInfo>, ProviderError> {
            Ok(self.0.clone())
        }
    }

    struct FailingRecognizer;

    #[async_trait]
    impl MediaRecognizer for FailingRecognizer {
        async fn recognize(&self, _: &ParsedMeta) -> Result<Option<MediaInfo>, ProviderError> {
            Err(ProviderError::Unavailable("offline".to_string()))
        }
    }

    fn media(id: u64) -> MediaInfo {
        MediaInfo {
            key: MediaKey::Tmdb(id),
            title: "Show".to_string(),
            year: None,
            kind: MediaKind::Tv,
            seasons: BTreeMap::new(),
            original_language: None,
        }
    }

    #[tokio::test]
    async fn chain_takes_first_non_empty_answer() {
        let mut chain = RecognizerChain::new();
        chain
            .push(Arc::new(FixedRecognizer(None)))
            .push(Arc::new(FixedRecognizer(Some(media(1)))))
            .push(Arc::new(FixedRecognizer(Some(media(2)))));

        let found = chain.recognize(&ParsedMeta::new("Show")).await;
        assert_eq!(found.map(|m| m.key), Some(MediaKey::Tmdb(1)));
    }

    #[tokio::test]
    async fn chain_skips_failing_providers() {
        let mut chain = RecognizerChain::new();
        chain
            .push(Arc::new(FailingRecognizer))
            .push(Arc::new(FixedRecognizer(Some(media(3)))));

        let found = chain.recognize(&ParsedMeta::new("Show")).await;
        assert_eq!(found.map(|m| m.key), Some(MediaKey::Tmdb(3)));
    }

    #[tokio::test]
    async fn empty_chain_returns_none() {
        let chain = RecognizerChain::new();
        assert!(chain.recognize(&ParsedMeta::new("Show")).await.is_none());
    }
}
