// SPDX-License-Identifier: GPL-3.0-or-later

//! Greedy download selection: four ordered passes over a pre-sorted,
//! deduplicated candidate list, each pass folding `(downloaded, gap_map)`
//! state forward. A batch call never fails as a whole; inspection and
//! download errors drop the single candidate involved.

use std::collections::{BTreeSet, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};
use vidarr_domain::{Candidate, CandidateIdentity, GapMap, MediaKey, MediaKind};

use crate::providers::{episodes_from_files, Downloader, TorrentInspector};

/// Cooperative cancellation, checked at the top of every per-candidate
/// iteration. Whatever gap subtractions happened before the flag was raised
/// stay applied.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Sort candidates for selection: site priority, then rule-assigned rank,
/// then seeders, then season span, then episode span, all descending. Ties
/// keep input order. Afterwards deduplicate on candidate identity, keeping
/// the first occurrence.
pub fn sort_candidates(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort_by(|a, b| {
        b.torrent
            .site_priority
            .cmp(&a.torrent.site_priority)
            .then(b.torrent.priority_rank.cmp(&a.torrent.priority_rank))
            .then(b.torrent.seeders.cmp(&a.torrent.seeders))
            .then(b.meta.season_list().len().cmp(&a.meta.season_list().len()))
            .then(b.meta.episode_list().len().cmp(&a.meta.episode_list().len()))
    });
    let mut seen: HashSet<CandidateIdentity> = HashSet::new();
    candidates.retain(|candidate| seen.insert(candidate.identity()));
    candidates
}

/// Mutable state threaded through the passes.
#[derive(Debug, Default)]
struct SelectionState {
    downloaded: Vec<Candidate>,
    consumed: HashSet<CandidateIdentity>,
    gap_map: GapMap,
}

impl SelectionState {
    /// Subtract covered episodes from a season's gap; removes the entry when
    /// nothing remains, and the media entry when no season remains.
    fn cover_episodes(&mut self, key: &MediaKey, season: u32, covered: &BTreeSet<u32>) {
        let Some(seasons) = self.gap_map.get_mut(key) else {
            return;
        };
        let remaining: Vec<u32> = match seasons.get(&season) {
            Some(gap) => gap
                .needed_episodes()
                .into_iter()
                .filter(|episode| !covered.contains(episode))
                .collect(),
            None => return,
        };
        if remaining.is_empty() {
            seasons.remove(&season);
        } else if let Some(gap) = seasons.get_mut(&season) {
            gap.start_episode = remaining[0];
            gap.episodes = remaining;
        }
        if seasons.is_empty() {
            self.gap_map.remove(key);
        }
    }

    fn remove_season(&mut self, key: &MediaKey, season: u32) {
        if let Some(seasons) = self.gap_map.get_mut(key) {
            seasons.remove(&season);
            if seasons.is_empty() {
                self.gap_map.remove(key);
            }
        }
    }
}

pub struct SelectionEngine {
    inspector: Arc<dyn TorrentInspector>,
    downloader: Arc<dyn Downloader>,
    cancellation: CancellationFlag,
}

impl SelectionEngine {
    pub fn new(inspector: Arc<dyn TorrentInspector>, downloader: Arc<dyn Downloader>) -> Self {
        Self {
            inspector,
            downloader,
            cancellation: CancellationFlag::new(),
        }
    }

    pub fn with_cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancellation = flag;
        self
    }

    /// Run the full selection over pre-filtered candidates against the gap
    /// map. Returns everything downloaded plus the residual gaps; a non-empty
    /// residual means the subscription should persist.
    pub async fn select_downloads(
        &self,
        candidates: Vec<Candidate>,
        gap_map: GapMap,
    ) -> (Vec<Candidate>, GapMap) {
        let candidates = sort_candidates(candidates);
        let mut state = SelectionState {
            gap_map,
            ..SelectionState::default()
        };

        self.download_movies(&candidates, &mut state).await;
        self.match_whole_seasons(&candidates, &mut state).await;
        self.match_explicit_episodes(&candidates, &mut state).await;
        self.harvest_partials(&candidates, &mut state).await;

        info!(
            target: "selection",
            downloaded = state.downloaded.len(),
            residual_media = state.gap_map.len(),
            "selection finished"
        );
        (state.downloaded, state.gap_map)
    }

    async fn try_download(
        &self,
        candidate: &Candidate,
        episodes: Option<&BTreeSet<u32>>,
    ) -> bool {
        match self.downloader.download(candidate, episodes).await {
            Ok(receipt) => {
                info!(
                    target: "selection",
                    title = %candidate.torrent.title,
                    id = %receipt.id,
                    "download accepted"
                );
                true
            }
            Err(error) => {
                warn!(
                    target: "selection",
                    title = %candidate.torrent.title,
                    %error,
                    "download failed, skipping candidate"
                );
                false
            }
        }
    }

    /// Pass 0: every movie candidate is attempted independently; movies never
    /// interact with the gap map.
    async fn download_movies(&self, candidates: &[Candidate], state: &mut SelectionState) {
        for candidate in candidates {
            if self.cancellation.is_cancelled() {
                return;
            }
            if candidate.media.kind != MediaKind::Movie
                || state.consumed.contains(&candidate.identity())
            {
                continue;
            }
            if self.try_download(candidate, None).await {
                state.consumed.insert(candidate.identity());
                state.downloaded.push(candidate.clone());
            }
        }
    }

    /// Pass 1: cover whole-season-missing gaps with season packs. A pack
    /// naming exactly one season is untrustworthy alone and must prove its
    /// episode count via inspection; multi-season bundles are accepted as-is.
    async fn match_whole_seasons(&self, candidates: &[Candidate], state: &mut SelectionState) {
        let mut needed: BTreeSet<(MediaKey, u32)> = state
            .gap_map
            .iter()
            .flat_map(|(key, seasons)| {
                seasons
                    .iter()
                    .filter(|(_, gap)| gap.is_whole_season())
                    .map(|(&season, _)| (key.clone(), season))
            })
            .collect();

        for candidate in candidates {
            if self.cancellation.is_cancelled() {
                return;
            }
            if needed.is_empty() {
                break;
            }
            if candidate.media.kind != MediaKind::Tv
                || state.consumed.contains(&candidate.identity())
                || !candidate.meta.episode_list().is_empty()
            {
                continue;
            }
            let seasons = candidate.meta.season_list();
            if seasons.is_empty()
                || !seasons
                    .iter()
                    .all(|&season| needed.contains(&(candidate.media.key.clone(), season)))
            {
                continue;
            }

            if let [season] = seasons[..] {
                let total = state
                    .gap_map
                    .get(&candidate.media.key)
                    .and_then(|gaps| gaps.get(&season))
                    .map(|gap| gap.total_episodes)
                    .unwrap_or(0);
                let listing = match self.inspector.inspect(&candidate.torrent).await {
                    Ok(listing) => listing,
                    Err(error) => {
                        warn!(
                            target: "selection",
                            title = %candidate.torrent.title,
                            %error,
                            "inspection failed, skipping candidate"
                        );
                        continue;
                    }
                };
                let observed = episodes_from_files(&listing.files);
                if (observed.len() as u32) < total {
                    debug!(
                        target: "selection",
                        title = %candidate.torrent.title,
                        observed = observed.len(),
                        expected = total,
                        "season pack short on episodes"
                    );
                    continue;
                }
            }

            if self.try_download(candidate, None).await {
                for &season in &seasons {
                    needed.remove(&(candidate.media.key.clone(), season));
                    state.remove_season(&candidate.media.key, season);
                }
                state.consumed.insert(candidate.identity());
                state.downloaded.push(candidate.clone());
            }
        }
    }

    /// Pass 2: candidates declaring an explicit episode set that fits
    /// entirely inside a season's needed set.
    async fn match_explicit_episodes(&self, candidates: &[Candidate], state: &mut SelectionState) {
        for candidate in candidates {
            if self.cancellation.is_cancelled() {
                return;
            }
            if candidate.media.kind != MediaKind::Tv
                || state.consumed.contains(&candidate.identity())
            {
                continue;
            }
            let [season] = candidate.meta.season_list()[..] else {
                continue;
            };
            let declared: BTreeSet<u32> = candidate.meta.episode_list().into_iter().collect();
            if declared.is_empty() {
                continue;
            }
            let needed: BTreeSet<u32> = match state
                .gap_map
                .get(&candidate.media.key)
                .and_then(|gaps| gaps.get(&season))
            {
                Some(gap) => gap.needed_episodes().into_iter().collect(),
                None => continue,
            };
            if !declared.is_subset(&needed) {
                continue;
            }

            if self.try_download(candidate, None).await {
                state.cover_episodes(&candidate.media.key, season, &declared);
                state.consumed.insert(candidate.identity());
                state.downloaded.push(candidate.clone());
            }
        }
    }

    /// Pass 3: last resort. Inspect anything still covering a gap season,
    /// download whatever subset of its files is actually needed, and write
    /// the covered range back onto the candidate metadata for history.
    async fn harvest_partials(&self, candidates: &[Candidate], state: &mut SelectionState) {
        let pending: Vec<(MediaKey, u32)> = state
            .gap_map
            .iter()
            .flat_map(|(key, seasons)| seasons.keys().map(|&season| (key.clone(), season)))
            .collect();

        for (key, season) in pending {
            let mut needed: BTreeSet<u32> = match state
                .gap_map
                .get(&key)
                .and_then(|gaps| gaps.get(&season))
            {
                Some(gap) => gap.needed_episodes().into_iter().collect(),
                None => continue,
            };

            for candidate in candidates {
                if self.cancellation.is_cancelled() {
                    return;
                }
                if needed.is_empty() {
                    break;
                }
                if candidate.media.kind != MediaKind::Tv
                    || candidate.media.key != key
                    || state.consumed.contains(&candidate.identity())
                    || !candidate.meta.is_in_season(season)
                {
                    continue;
                }
                let declared: BTreeSet<u32> = candidate.meta.episode_list().into_iter().collect();
                if !declared.is_empty() && declared.is_disjoint(&needed) {
                    continue;
                }

                let listing = match self.inspector.inspect(&candidate.torrent).await {
                    Ok(listing) => listing,
                    Err(error) => {
                        warn!(
                            target: "selection",
                            title = %candidate.torrent.title,
                            %error,
                            "inspection failed, skipping candidate"
                        );
                        continue;
                    }
                };
                let observed: BTreeSet<u32> =
                    episodes_from_files(&listing.files).into_iter().collect();
                let subset: BTreeSet<u32> = observed.intersection(&needed).copied().collect();
                if subset.is_empty() {
                    continue;
                }

                if self.try_download(candidate, Some(&subset)).await {
                    let mut chosen = candidate.clone();
                    if let (Some(&begin), Some(&end)) =
                        (subset.iter().next(), subset.iter().next_back())
                    {
                        chosen.meta.set_episodes(begin, end);
                    }
                    for episode in &subset {
                        needed.remove(episode);
                    }
                    state.cover_episodes(&key, season, &subset);
                    state.consumed.insert(candidate.identity());
                    state.downloaded.push(chosen);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::sort_candidates;
    use std::collections::BTreeMap;
    use vidarr_domain::{Candidate, MediaInfo, MediaKey, MediaKind, ParsedMeta, TorrentInfo};

    fn candidate(title: &str, site_priority: u32, rank: u32, seeders: u32) -> Candidate {
        let mut meta = ParsedMeta::new(title);
        meta.kind = MediaKind::Movie;
        Candidate {
            meta,
            media: MediaInfo {
                key: MediaKey::Tmdb(1),
                title: "Movie".to_string(),
                year: None,
                kind: MediaKind::Movie,
                seasons: BTreeMap::new(),
                original_language: None,
            },
            torrent: TorrentInfo {
                title: title.to_string(),
                site_priority,
                priority_rank: rank,
                seeders,
                ..TorrentInfo::default()
            },
        }
    }

    #[test]
    fn sort_is_site_then_rank_then_seeders() {
        let sorted = sort_candidates(vec![
            candidate("low-site", 1, 9, 900),
            candidate("high-site", 5, 1, 10),
            candidate("mid-rank", 1, 9, 100),
        ]);
        // identity dedup collapses same-movie candidates to the first
        assert_eq!(sorted.len(), 1);
        assert_eq!(sorted[0].torrent.title, "high-site");
    }

    #[test]
    fn distinct_tv_episodes_survive_dedup() {
        let mut a = candidate("Show.S01E01", 1, 1, 10);
        a.media.kind = MediaKind::Tv;
        a.meta.kind = MediaKind::Tv;
        a.meta.begin_season = Some(1);
        a.meta.set_episodes(1, 1);
        let mut b = a.clone();
        b.torrent.title = "Show.S01E02".to_string();
        b.meta.set_episodes(2, 2);
        let duplicate = a.clone();

        let sorted = sort_candidates(vec![a, b, duplicate]);
        assert_eq!(sorted.len(), 2);
    }
}
