// SPDX-License-Identifier: GPL-3.0-or-later

//! Library reconciliation: which seasons/episodes of a requested media are
//! still missing, recorded into a caller-owned [`GapMap`] accumulator so one
//! subscription sweep can collect gaps across many media.

use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::{debug, warn};
use vidarr_domain::{GapMap, LibrarySnapshot, MediaInfo, MediaKind, ParsedMeta, SeasonGap};

use crate::providers::{LibraryExistenceProvider, RecognizerChain};

#[derive(Debug, Error)]
pub enum GapError {
    /// A TV item reached reconciliation without its canonical season map;
    /// identity resolution should have filled it.
    #[error("no season data for {0}; media identity is incomplete")]
    NoSeasonData(String),
}

/// Reconcile one media against the library and record what is missing.
///
/// Returns whether the request is fully satisfied. Movies never create gap
/// entries: satisfied means the library reports any existing copy. For TV,
/// every catalog season (restricted to the requested seasons when the request
/// names one) is compared against `existing`; a wholly absent season records
/// a whole-season sentinel, a partially present one records the exact
/// missing-episode set.
///
/// `totals` optionally overrides the per-season episode count, recomputing
/// missing sets against `start..start+total` instead of the canonical list.
///
/// The accumulator is shared across sequential calls in one workflow; calling
/// twice with unchanged inputs rewrites byte-identical entries.
pub fn compute_gaps(
    requested: &ParsedMeta,
    media: &MediaInfo,
    existing: Option<&LibrarySnapshot>,
    totals: Option<&BTreeMap<u32, u32>>,
    gap_map: &mut GapMap,
) -> Result<bool, GapError> {
    if media.kind == MediaKind::Movie {
        let satisfied = existing.is_some();
        debug!(
            target: "gap_tracking",
            media = %media.key,
            satisfied,
            "movie existence check"
        );
        return Ok(satisfied);
    }

    if media.seasons.is_empty() {
        return Err(GapError::NoSeasonData(media.title_year()));
    }

    // Restrict to the named seasons only when the request carries one; a bare
    // TV request means every catalog season.
    let restriction: Option<Vec<u32>> = requested.begin_season.map(|_| requested.season_list());

    let mut recorded = false;
    for (&season, canonical) in &media.seasons {
        if canonical.is_empty() {
            continue;
        }
        if let Some(wanted) = &restriction {
            if !wanted.contains(&season) {
                continue;
            }
        }
        let total = totals
            .and_then(|t| t.get(&season).copied())
            .unwrap_or(canonical.len() as u32);
        let start = canonical.iter().copied().min().unwrap_or(1);

        let held: Option<&Vec<u32>> = existing
            .and_then(|snapshot| snapshot.seasons.get(&season))
            .filter(|episodes| !episodes.is_empty());
        let gap = if let Some(held_episodes) = held {
            let held_set: BTreeSet<u32> = held_episodes.iter().copied().collect();
            let wanted_set: BTreeSet<u32> = if totals.and_then(|t| t.get(&season)).is_some() {
                (start..start + total).collect()
            } else {
                canonical.iter().copied().collect()
            };
            let missing: Vec<u32> = wanted_set.difference(&held_set).copied().collect();
            if missing.is_empty() {
                None
            } else {
                let start_episode = missing[0];
                Some(SeasonGap {
                    season,
                    episodes: missing,
                    total_episodes: total,
                    start_episode,
                })
            }
        } else {
            Some(SeasonGap::whole_season(season, total, start))
        };

        if let Some(gap) = gap {
            debug!(
                target: "gap_tracking",
                media = %media.key,
                season,
                whole_season = gap.is_whole_season(),
                missing = gap.episodes.len(),
                "recorded gap"
            );
            gap_map
                .entry(media.key.clone())
                .or_default()
                .insert(season, gap);
            recorded = true;
        }
    }

    Ok(!recorded && existing.is_some())
}

/// Resolve a request to a catalog identity and reconcile it against the
/// library in one step. `None` means no recognizer knew the title; a library
/// provider failure is logged and treated as "nothing held" so the sweep
/// continues.
pub async fn reconcile(
    requested: &ParsedMeta,
    recognizers: &RecognizerChain,
    library: &dyn LibraryExistenceProvider,
    totals: Option<&BTreeMap<u32, u32>>,
    gap_map: &mut GapMap,
) -> Result<Option<(MediaInfo, bool)>, GapError> {
    let Some(media) = recognizers.recognize(requested).await else {
        debug!(
            target: "gap_tracking",
            title = %requested.raw_title,
            "unrecognized request"
        );
        return Ok(None);
    };
    let snapshot = match library.existing(&media.key, requested.begin_season).await {
        Ok(snapshot) => snapshot,
        Err(error) => {
            warn!(
                target: "gap_tracking",
                media = %media.key,
                %error,
                "library lookup failed, assuming nothing held"
            );
            None
        }
    };
    let satisfied = compute_gaps(requested, &media, snapshot.as_ref(), totals, gap_map)?;
    Ok(Some((media, satisfied)))
}

#[cfg(test)]
mod tests {
    use super::{compute_gaps, reconcile, GapError};
    use crate::providers::{
        LibraryExistenceProvider, MediaRecognizer, ProviderError, RecognizerChain,
    };
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use vidarr_domain::{
        GapMap, LibrarySnapshot, MediaInfo, MediaKey, MediaKind, ParsedMeta,
    };

    fn tv_media(seasons: &[(u32, u32)]) -> MediaInfo {
        MediaInfo {
            key: MediaKey::Tmdb(100),
            title: "Show".to_string(),
            year: Some("2020".to_string()),
            kind: MediaKind::Tv,
            seasons: seasons
                .iter()
                .map(|&(season, count)| (season, (1..=count).collect()))
                .collect(),
            original_language: None,
        }
    }

    fn movie_media() -> MediaInfo {
        MediaInfo {
            key: MediaKey::Tmdb(7),
            title: "Movie".to_string(),
            year: None,
            kind: MediaKind::Movie,
            seasons: BTreeMap::new(),
            original_language: None,
        }
    }

    fn tv_request() -> ParsedMeta {
        ParsedMeta {
            kind: MediaKind::Tv,
            ..ParsedMeta::new("req")
        }
    }

    #[test]
    fn movie_present_is_satisfied_without_gaps() {
        let mut gaps = GapMap::new();
        let satisfied = compute_gaps(
            &ParsedMeta::new("req"),
            &movie_media(),
            Some(&LibrarySnapshot::default()),
            None,
            &mut gaps,
        )
        .expect("compute");
        assert!(satisfied);
        assert!(gaps.is_empty());
    }

    #[test]
    fn movie_absent_is_unsatisfied_without_gaps() {
        let mut gaps = GapMap::new();
        let satisfied =
            compute_gaps(&ParsedMeta::new("req"), &movie_media(), None, None, &mut gaps)
                .expect("compute");
        assert!(!satisfied);
        assert!(gaps.is_empty());
    }

    #[test]
    fn missing_second_season_records_sentinel() {
        // media seasons {1: 1..10, 2: 1..8}, library holds all of season 1
        let media = tv_media(&[(1, 10), (2, 8)]);
        let existing = LibrarySnapshot {
            seasons: [(1u32, (1..=10).collect::<Vec<u32>>())].into_iter().collect(),
        };
        let mut gaps = GapMap::new();
        let satisfied =
            compute_gaps(&tv_request(), &media, Some(&existing), None, &mut gaps).expect("compute");

        assert!(!satisfied);
        let seasons = gaps.get(&media.key).expect("gap entry");
        assert!(!seasons.contains_key(&1));
        let gap = seasons.get(&2).expect("season 2 gap");
        assert!(gap.is_whole_season());
        assert_eq!(gap.total_episodes, 8);
        assert_eq!(gap.start_episode, 1);
    }

    #[test]
    fn partial_season_records_exact_difference() {
        let media = tv_media(&[(1, 10)]);
        let existing = LibrarySnapshot {
            seasons: [(1u32, vec![1, 2, 3, 4, 6, 7])].into_iter().collect(),
        };
        let mut gaps = GapMap::new();
        let satisfied =
            compute_gaps(&tv_request(), &media, Some(&existing), None, &mut gaps).expect("compute");

        assert!(!satisfied);
        let gap = &gaps[&media.key][&1];
        assert_eq!(gap.episodes, vec![5, 8, 9, 10]);
        assert_eq!(gap.start_episode, 5);
        // Every missing episode is part of the canonical season list.
        assert!(gap.episodes.iter().all(|e| media.seasons[&1].contains(e)));
    }

    #[test]
    fn requested_season_restricts_reconciliation() {
        let media = tv_media(&[(1, 10), (2, 8), (3, 6)]);
        let mut request = tv_request();
        request.begin_season = Some(2);

        let mut gaps = GapMap::new();
        let satisfied = compute_gaps(&request, &media, None, None, &mut gaps).expect("compute");

        assert!(!satisfied);
        let seasons = &gaps[&media.key];
        assert_eq!(seasons.len(), 1);
        assert!(seasons.contains_key(&2));
    }

    #[test]
    fn fully_present_library_is_satisfied() {
        let media = tv_media(&[(1, 4)]);
        let existing = LibrarySnapshot {
            seasons: [(1u32, vec![1, 2, 3, 4])].into_iter().collect(),
        };
        let mut gaps = GapMap::new();
        let satisfied =
            compute_gaps(&tv_request(), &media, Some(&existing), None, &mut gaps).expect("compute");
        assert!(satisfied);
        assert!(gaps.is_empty());
    }

    #[test]
    fn accumulator_is_shared_across_calls() {
        let first = tv_media(&[(1, 4)]);
        let mut second = tv_media(&[(1, 6)]);
        second.key = MediaKey::Tmdb(200);

        let mut gaps = GapMap::new();
        compute_gaps(&tv_request(), &first, None, None, &mut gaps).expect("first");
        compute_gaps(&tv_request(), &second, None, None, &mut gaps).expect("second");

        assert_eq!(gaps.len(), 2);
    }

    #[test]
    fn recomputation_is_idempotent() {
        let media = tv_media(&[(1, 10), (2, 8)]);
        let existing = LibrarySnapshot {
            seasons: [(1u32, vec![1, 2, 3])].into_iter().collect(),
        };

        let mut gaps = GapMap::new();
        compute_gaps(&tv_request(), &media, Some(&existing), None, &mut gaps).expect("first");
        let snapshot = gaps.clone();
        compute_gaps(&tv_request(), &media, Some(&existing), None, &mut gaps).expect("second");
        assert_eq!(gaps, snapshot);
    }

    #[test]
    fn totals_override_recomputes_range() {
        let media = tv_media(&[(1, 10)]);
        let existing = LibrarySnapshot {
            seasons: [(1u32, (1..=10).collect::<Vec<u32>>())].into_iter().collect(),
        };
        // Catalog says 10 episodes but the override expects 12.
        let totals: BTreeMap<u32, u32> = [(1u32, 12u32)].into_iter().collect();

        let mut gaps = GapMap::new();
        let satisfied = compute_gaps(&tv_request(), &media, Some(&existing), Some(&totals), &mut gaps)
            .expect("compute");
        assert!(!satisfied);
        assert_eq!(gaps[&media.key][&1].episodes, vec![11, 12]);
    }

    struct KnowsOneShow(MediaInfo);

    #[async_trait]
    impl MediaRecognizer for KnowsOneShow {
        async fn recognize(&self, _: &ParsedMeta) -> Result<Option<MediaInfo>, ProviderError> {
            Ok(Some(self.0.clone()))
        }
    }

    struct HoldsSeasons(BTreeMap<u32, Vec<u32>>);

    #[async_trait]
    impl LibraryExistenceProvider for HoldsSeasons {
        async fn existing(
            &self,
            _: &MediaKey,
            _: Option<u32>,
        ) -> Result<Option<LibrarySnapshot>, ProviderError> {
            Ok(Some(LibrarySnapshot {
                seasons: self.0.clone(),
            }))
        }
    }

    #[tokio::test]
    async fn reconcile_resolves_identity_then_records_gaps() {
        let media = tv_media(&[(1, 10), (2, 8)]);
        let mut recognizers = RecognizerChain::new();
        recognizers.push(Arc::new(KnowsOneShow(media.clone())));
        let library = HoldsSeasons([(1u32, (1..=10).collect::<Vec<u32>>())].into_iter().collect());

        let mut gaps = GapMap::new();
        let resolved = reconcile(&tv_request(), &recognizers, &library, None, &mut gaps)
            .await
            .expect("reconcile");

        let (resolved_media, satisfied) = resolved.expect("recognized");
        assert_eq!(resolved_media.key, media.key);
        assert!(!satisfied);
        assert!(gaps[&media.key][&2].is_whole_season());
    }

    #[tokio::test]
    async fn reconcile_without_recognition_is_a_noop() {
        let recognizers = RecognizerChain::new();
        let library = HoldsSeasons(BTreeMap::new());
        let mut gaps = GapMap::new();
        let resolved = reconcile(&tv_request(), &recognizers, &library, None, &mut gaps)
            .await
            .expect("reconcile");
        assert!(resolved.is_none());
        assert!(gaps.is_empty());
    }

    #[test]
    fn tv_without_season_data_fails_fast() {
        let mut media = tv_media(&[]);
        media.seasons.clear();
        let mut gaps = GapMap::new();
        let err = compute_gaps(&tv_request(), &media, None, None, &mut gaps).unwrap_err();
        assert!(matches!(err, GapError::NoSeasonData(_)));
    }
}
