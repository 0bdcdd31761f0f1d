// SPDX-License-Identifier: GPL-3.0-or-later
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Value Objects & IDs
// ============================================================================

/// Resolved catalog identity of a media item. Never the raw release title.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKey {
    Tmdb(u64),
    Douban(String),
}

impl std::fmt::Display for MediaKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tmdb(id) => write!(f, "tmdb:{}", id),
            Self::Douban(id) => write!(f, "douban:{}", id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
    #[default]
    Unknown,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Movie => write!(f, "movie"),
            Self::Tv => write!(f, "tv"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

// ============================================================================
// Parsed release metadata
// ============================================================================

/// Resource attributes recovered from a release title: quality markers that
/// carry no season/episode meaning but drive rule matching and naming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ResourceAttrs {
    pub resolution: Option<String>,
    pub source: Option<String>,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
    pub release_group: Option<String>,
    pub effects: Vec<String>,
    pub part: Option<String>,
}

impl ResourceAttrs {
    /// Edition string: source + effects, without resolution.
    pub fn edition(&self) -> String {
        let mut parts = Vec::new();
        if let Some(source) = &self.source {
            parts.push(source.clone());
        }
        parts.extend(self.effects.iter().cloned());
        parts.join(" ")
    }

    fn merge(&mut self, other: &ResourceAttrs) {
        if self.resolution.is_none() {
            self.resolution = other.resolution.clone();
        }
        if self.source.is_none() {
            self.source = other.source.clone();
        }
        if self.video_codec.is_none() {
            self.video_codec = other.video_codec.clone();
        }
        if self.audio_codec.is_none() {
            self.audio_codec = other.audio_codec.clone();
        }
        if self.release_group.is_none() {
            self.release_group = other.release_group.clone();
        }
        if self.effects.is_empty() {
            self.effects = other.effects.clone();
        }
        if self.part.is_none() {
            self.part = other.part.clone();
        }
    }
}

/// Structured metadata recovered from one release title (and subtitle).
///
/// Season/episode bounds are optional; a TV item with no season information
/// implicitly means season 1. When both bounds of a range are present the
/// total is always `end - begin + 1`; a lone total with no begin means the
/// range itself is unknown but its size was stated (e.g. "全12集").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ParsedMeta {
    pub raw_title: String,
    pub kind: MediaKind,
    pub cn_name: Option<String>,
    pub en_name: Option<String>,
    pub year: Option<String>,
    pub total_seasons: u32,
    pub begin_season: Option<u32>,
    pub end_season: Option<u32>,
    pub total_episodes: u32,
    pub begin_episode: Option<u32>,
    pub end_episode: Option<u32>,
    pub attrs: ResourceAttrs,
}

impl ParsedMeta {
    pub fn new(raw_title: impl Into<String>) -> Self {
        Self {
            raw_title: raw_title.into(),
            ..Self::default()
        }
    }

    /// Preferred display name: Chinese when fully Chinese, else English.
    pub fn name(&self) -> &str {
        if let Some(cn) = &self.cn_name {
            if is_all_chinese(cn) {
                return cn;
            }
        }
        if let Some(en) = &self.en_name {
            return en;
        }
        self.cn_name.as_deref().unwrap_or("")
    }

    /// Seasons named by this release. TV with no season token means season 1.
    pub fn season_list(&self) -> Vec<u32> {
        match (self.begin_season, self.end_season) {
            (Some(begin), Some(end)) => (begin..=end).collect(),
            (Some(begin), None) => vec![begin],
            (None, _) => {
                if self.kind == MediaKind::Tv {
                    vec![1]
                } else {
                    Vec::new()
                }
            }
        }
    }

    /// Episodes explicitly named by this release; empty for whole-season drops.
    pub fn episode_list(&self) -> Vec<u32> {
        match (self.begin_episode, self.end_episode) {
            (Some(begin), Some(end)) => (begin..=end).collect(),
            (Some(begin), None) => vec![begin],
            (None, _) => Vec::new(),
        }
    }

    /// Overwrite the episode range, keeping the total in step.
    pub fn set_episodes(&mut self, begin: u32, end: u32) {
        let (begin, end) = if begin <= end { (begin, end) } else { (end, begin) };
        self.begin_episode = Some(begin);
        self.end_episode = if end != begin { Some(end) } else { None };
        self.total_episodes = end - begin + 1;
    }

    pub fn is_in_season(&self, season: u32) -> bool {
        self.season_list().contains(&season)
    }

    pub fn is_in_episode(&self, episode: u32) -> bool {
        self.episode_list().contains(&episode)
    }

    /// Season display string, `S01` or `S01-S03`. TV without a season token
    /// renders as `S01`.
    pub fn season_text(&self) -> String {
        match (self.begin_season, self.end_season) {
            (Some(begin), Some(end)) => format!("S{:02}-S{:02}", begin, end),
            (Some(begin), None) => format!("S{:02}", begin),
            (None, _) => {
                if self.kind == MediaKind::Tv {
                    "S01".to_string()
                } else {
                    String::new()
                }
            }
        }
    }

    /// Episode display string, `E05` or `E01-E12`.
    pub fn episode_text(&self) -> String {
        match (self.begin_episode, self.end_episode) {
            (Some(begin), Some(end)) => format!("E{:02}-E{:02}", begin, end),
            (Some(begin), None) => format!("E{:02}", begin),
            (None, _) => String::new(),
        }
    }

    pub fn season_episode_text(&self) -> String {
        let season = self.season_text();
        let episode = self.episode_text();
        match (season.is_empty(), episode.is_empty()) {
            (false, false) => format!("{} {}", season, episode),
            (false, true) => season,
            (true, false) => episode,
            (true, true) => String::new(),
        }
    }

    /// Concatenated per-episode signature (`E01E02E05`), the episode part of
    /// the candidate dedup identity.
    pub fn episode_signature(&self) -> String {
        self.episode_list()
            .iter()
            .map(|episode| format!("E{:02}", episode))
            .collect()
    }

    /// Fill fields absent on `self` from a parent-scope meta. First non-empty
    /// wins; a set field is never overwritten. Used to cascade
    /// file -> directory -> grandparent metadata.
    pub fn merge(&mut self, other: &ParsedMeta) {
        if self.kind == MediaKind::Unknown && other.kind != MediaKind::Unknown {
            self.kind = other.kind;
        }
        if self.name().is_empty() {
            self.cn_name = other.cn_name.clone();
            self.en_name = other.en_name.clone();
        }
        if self.year.is_none() {
            self.year = other.year.clone();
        }
        if self.kind == MediaKind::Tv && self.begin_season.is_none() {
            self.begin_season = other.begin_season;
            self.end_season = other.end_season;
            self.total_seasons = other.total_seasons;
        }
        if self.kind == MediaKind::Tv && self.begin_episode.is_none() {
            self.begin_episode = other.begin_episode;
            self.end_episode = other.end_episode;
            self.total_episodes = other.total_episodes;
        }
        self.attrs.merge(&other.attrs);
    }
}

fn is_all_chinese(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| ('\u{4e00}'..='\u{9fff}').contains(&c) || c.is_whitespace())
}

// ============================================================================
// Resolved media & torrents
// ============================================================================

/// Catalog-resolved identity of a media item, including the full canonical
/// season -> episode-number map for TV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaInfo {
    pub key: MediaKey,
    pub title: String,
    pub year: Option<String>,
    pub kind: MediaKind,
    /// Season number -> full canonical episode list. Empty for movies.
    pub seasons: BTreeMap<u32, Vec<u32>>,
    pub original_language: Option<String>,
}

impl MediaInfo {
    pub fn title_year(&self) -> String {
        match &self.year {
            Some(year) => format!("{} ({})", self.title, year),
            None => self.title.clone(),
        }
    }
}

/// One downloadable torrent as reported by a candidate supplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TorrentInfo {
    pub title: String,
    pub description: Option<String>,
    pub enclosure: String,
    pub site: String,
    /// Site priority, higher sorts first.
    pub site_priority: u32,
    pub seeders: u32,
    pub size_bytes: u64,
    pub upload_volume_factor: f32,
    pub download_volume_factor: f32,
    pub labels: Vec<String>,
    pub pubdate: Option<DateTime<Utc>>,
    /// Written by the rule engine, read by the selection sort. Zero until a
    /// priority tier matches.
    pub priority_rank: u32,
}

impl Default for TorrentInfo {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: None,
            enclosure: String::new(),
            site: String::new(),
            site_priority: 0,
            seeders: 0,
            size_bytes: 0,
            upload_volume_factor: 1.0,
            download_volume_factor: 1.0,
            labels: Vec::new(),
            pubdate: None,
            priority_rank: 0,
        }
    }
}

/// The atomic unit passed through filtering and selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub meta: ParsedMeta,
    pub media: MediaInfo,
    pub torrent: TorrentInfo,
}

/// Dedup identity of a candidate within one selection batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CandidateIdentity {
    pub key: MediaKey,
    pub season: String,
    pub episodes: String,
}

impl Candidate {
    pub fn identity(&self) -> CandidateIdentity {
        // Movies collapse to their key alone; TV keys on season + episode
        // signature so distinct episode drops of one show stay distinct.
        if self.media.kind == MediaKind::Movie {
            CandidateIdentity {
                key: self.media.key.clone(),
                season: String::new(),
                episodes: String::new(),
            }
        } else {
            CandidateIdentity {
                key: self.media.key.clone(),
                season: self.meta.season_text(),
                episodes: self.meta.episode_signature(),
            }
        }
    }
}

// ============================================================================
// Gap tracking
// ============================================================================

/// Missing-episode record for one season.
///
/// An empty `episodes` list is a sentinel meaning the entire season is
/// missing; a populated list names exactly the missing episode numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonGap {
    pub season: u32,
    pub episodes: Vec<u32>,
    pub total_episodes: u32,
    pub start_episode: u32,
}

impl SeasonGap {
    pub fn whole_season(season: u32, total_episodes: u32, start_episode: u32) -> Self {
        Self {
            season,
            episodes: Vec::new(),
            total_episodes,
            start_episode,
        }
    }

    pub fn is_whole_season(&self) -> bool {
        self.episodes.is_empty()
    }

    /// The concrete episode set still needed: the explicit list, or the full
    /// `start..start+total` range for a whole-season sentinel.
    pub fn needed_episodes(&self) -> Vec<u32> {
        if self.episodes.is_empty() {
            (self.start_episode..self.start_episode + self.total_episodes).collect()
        } else {
            self.episodes.clone()
        }
    }
}

/// Missing seasons/episodes per media, keyed by resolved catalog identity.
/// A season entry's absence means that season is fully satisfied. Ordered
/// maps keep repeated reconciliations byte-identical.
pub type GapMap = BTreeMap<MediaKey, BTreeMap<u32, SeasonGap>>;

/// What the library already holds for one media item, as reported by the
/// library existence provider. Seasons are empty for movies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LibrarySnapshot {
    pub seasons: BTreeMap<u32, Vec<u32>>,
}
