// SPDX-License-Identifier: GPL-3.0-or-later

//! Season/episode extraction from release subtitles and descriptions.
//!
//! Subtitles carry the most reliable structure for Chinese-convention
//! releases: "第三季", "全12集", "第01-12集". Patterns are tried in a fixed
//! priority order; every numeral token goes through [`numerals::parse_numeral`]
//! and implausible values are discarded as false positives from unrelated
//! numbers (resolutions, years), never surfaced as errors.

use crate::numerals::parse_numeral;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;
use vidarr_domain::{MediaKind, ParsedMeta};

/// Any parsed season above this is assumed to come from an unrelated number.
const MAX_PLAUSIBLE_SEASON: u32 = 100;
/// Any parsed episode at or above this is assumed to be a false positive.
const MAX_PLAUSIBLE_EPISODE: u32 = 10_000;

lazy_static! {
    // "Episode 3"
    static ref EPISODE_TOKEN: Regex =
        Regex::new(r"(?i)Episode\s+(\d+)").expect("valid episode token regex");
    // "全3季" / "3季全"
    static ref SEASON_ALL: Regex = Regex::new(
        r"[全共]\s*([0-9一二三四五六七八九十]+)\s*季|([0-9一二三四五六七八九十]+)\s*季\s*全"
    )
    .expect("valid season-all regex");
    // "第3季" / "第3-5季"
    static ref SEASON: Regex =
        Regex::new(r"[第\s]([0-9一二三四五六七八九十S\-]+)\s*季").expect("valid season regex");
    // "第1-12集" / "第1集-第12集"
    static ref EPISODE_BETWEEN: Regex = Regex::new(
        r"第?\s*([0-9一二三四五六七八九十百零]+)\s*[集话話期幕]?\s*-\s*第?\s*([0-9一二三四五六七八九十百零]+)\s*[集话話期幕]"
    )
    .expect("valid episode-between regex");
    // "第3集"
    static ref EPISODE: Regex = Regex::new(
        r"[第\s]([0-9一二三四五六七八九十百零EP]+)\s*[集话話期幕]"
    )
    .expect("valid episode regex");
    // "12集全" / "全12集"
    static ref EPISODE_ALL: Regex = Regex::new(
        r"([0-9一二三四五六七八九十百零]+)\s*集\s*全|[全共]\s*([0-9一二三四五六七八九十百零]+)\s*[集话話期幕]"
    )
    .expect("valid episode-all regex");
    static ref CJK_MARKERS: Regex =
        Regex::new(r"[全第季集话話期幕]").expect("valid marker regex");
}

/// Apply subtitle-derived season/episode facts onto an in-progress meta.
/// Already-set fields are never overwritten. Returns true when any pattern
/// yielded something.
pub(crate) fn apply_subtitle(meta: &mut ParsedMeta, subtitle: &str) -> bool {
    if subtitle.trim().is_empty() {
        return false;
    }
    // Pad so start-of-string tokens can satisfy the leading-separator class.
    let text = format!(" {} ", subtitle.trim());

    if let Some(caps) = EPISODE_TOKEN.captures(&text) {
        let Some(episode) = caps.get(1).and_then(|m| parse_numeral(m.as_str())) else {
            return false;
        };
        if episode >= MAX_PLAUSIBLE_EPISODE {
            debug!(target: "subtitle_parsing", episode, "discarding implausible episode token");
            return false;
        }
        if meta.begin_episode.is_none() {
            meta.begin_episode = Some(episode);
            meta.total_episodes = 1;
        }
        meta.kind = MediaKind::Tv;
        return true;
    }

    if !CJK_MARKERS.is_match(&text) {
        return false;
    }

    if try_season_all(meta, &text) {
        return true;
    }
    let matched_season = try_season(meta, &text);
    if try_episode_between(meta, &text) {
        return true;
    }
    if try_episode(meta, &text) {
        return true;
    }
    if try_episode_all(meta, &text) {
        return true;
    }
    matched_season
}

/// "全N季" or "N季全": N seasons in total, starting at season 1.
fn try_season_all(meta: &mut ParsedMeta, text: &str) -> bool {
    for caps in SEASON_ALL.captures_iter(text) {
        let (token, start) = match (caps.get(1), caps.get(2)) {
            (Some(m), _) => (m.as_str(), m.start()),
            (None, Some(m)) => (m.as_str(), m.start()),
            _ => continue,
        };
        // "第三季 全..." must stay a single-season match, not a count.
        if preceding_char(text, start) == Some('第') {
            continue;
        }
        let Some(total) = parse_numeral(token) else { continue };
        if total == 0 || total > MAX_PLAUSIBLE_SEASON {
            continue;
        }
        if meta.begin_season.is_none() && meta.begin_episode.is_none() {
            meta.total_seasons = total;
            meta.begin_season = Some(1);
            meta.end_season = if total > 1 { Some(total) } else { None };
            meta.kind = MediaKind::Tv;
        }
        return true;
    }
    false
}

/// "第N季" or "第N-M季".
fn try_season(meta: &mut ParsedMeta, text: &str) -> bool {
    for caps in SEASON.captures_iter(text) {
        let Some(group) = caps.get(1) else { continue };
        let (start, end) = caps.get(0).map(|m| (m.start(), m.end())).unwrap_or((0, 0));
        // An explicit "第N季" is never a count; the guards only reject the
        // "全 N季" / "N季 全" total-count forms.
        let explicit = text[start..].starts_with('第');
        if !explicit
            && (preceding_char(text, start) == Some('全')
                || next_meaningful_char(text, end)
                    .map(|c| c == '全' || c == '共')
                    .unwrap_or(false))
        {
            continue;
        }
        let token = group.as_str().replace(['S', 's'], "");
        let (begin, end) = match token.split_once('-') {
            Some((left, right)) => {
                let Some(begin) = parse_numeral(left) else { continue };
                match parse_numeral(right) {
                    Some(end) => (begin.min(end), Some(begin.max(end))),
                    None => (begin, None),
                }
            }
            None => {
                let Some(begin) = parse_numeral(&token) else { continue };
                (begin, None)
            }
        };
        if begin > MAX_PLAUSIBLE_SEASON || end.map(|e| e > MAX_PLAUSIBLE_SEASON).unwrap_or(false) {
            debug!(target: "subtitle_parsing", begin, "discarding implausible season token");
            continue;
        }
        if meta.begin_season.is_none() {
            meta.begin_season = Some(begin);
            meta.total_seasons = 1;
        }
        if let Some(end) = end {
            if meta.end_season.is_none() && Some(end) != meta.begin_season {
                meta.end_season = Some(end);
                meta.total_seasons = end - meta.begin_season.unwrap_or(end) + 1;
            }
        }
        meta.kind = MediaKind::Tv;
        return true;
    }
    false
}

/// "第N-M集" ranges.
fn try_episode_between(meta: &mut ParsedMeta, text: &str) -> bool {
    for caps in EPISODE_BETWEEN.captures_iter(text) {
        let (Some(left), Some(right)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let (Some(a), Some(b)) = (parse_numeral(left.as_str()), parse_numeral(right.as_str()))
        else {
            continue;
        };
        if a >= MAX_PLAUSIBLE_EPISODE || b >= MAX_PLAUSIBLE_EPISODE {
            continue;
        }
        let (begin, end) = (a.min(b), a.max(b));
        if meta.begin_episode.is_none() {
            meta.begin_episode = Some(begin);
            meta.total_episodes = 1;
        }
        if meta.end_episode.is_none() && end != begin {
            meta.end_episode = Some(end);
            meta.total_episodes = end - begin + 1;
        }
        meta.kind = MediaKind::Tv;
        return true;
    }
    false
}

/// "第N集" single episodes.
fn try_episode(meta: &mut ParsedMeta, text: &str) -> bool {
    for caps in EPISODE.captures_iter(text) {
        let Some(group) = caps.get(1) else { continue };
        let whole = caps.get(0).map(|m| (m.start(), m.end())).unwrap_or((0, 0));
        // "12集全" is a total, not episode 12; "全12集" likewise.
        if next_meaningful_char(text, whole.1)
            .map(|c| c == '全' || c == '共')
            .unwrap_or(false)
            || preceding_char(text, whole.0) == Some('全')
            || preceding_char(text, whole.0) == Some('共')
        {
            continue;
        }
        let token = group.as_str().replace(['E', 'P', 'e', 'p'], "");
        let Some(episode) = parse_numeral(&token) else { continue };
        if episode >= MAX_PLAUSIBLE_EPISODE {
            debug!(target: "subtitle_parsing", episode, "discarding implausible episode token");
            continue;
        }
        if meta.begin_episode.is_none() {
            meta.begin_episode = Some(episode);
            meta.total_episodes = 1;
        }
        meta.kind = MediaKind::Tv;
        return true;
    }
    false
}

/// "N集全" or "全N集": a bare total, range unknown.
fn try_episode_all(meta: &mut ParsedMeta, text: &str) -> bool {
    for caps in EPISODE_ALL.captures_iter(text) {
        let token = match (caps.get(1), caps.get(2)) {
            (Some(m), _) => m.as_str(),
            (None, Some(m)) => m.as_str(),
            _ => continue,
        };
        let Some(total) = parse_numeral(token) else { continue };
        if total >= MAX_PLAUSIBLE_EPISODE {
            continue;
        }
        if meta.begin_episode.is_none() {
            meta.total_episodes = total;
            meta.begin_episode = None;
            meta.end_episode = None;
            meta.kind = MediaKind::Tv;
        }
        return true;
    }
    false
}

/// The first non-whitespace character strictly before byte offset `at`.
fn preceding_char(text: &str, at: usize) -> Option<char> {
    text[..at].chars().rev().find(|c| !c.is_whitespace())
}

/// The first non-whitespace character at or after byte offset `at`.
fn next_meaningful_char(text: &str, at: usize) -> Option<char> {
    text[at..].chars().find(|c| !c.is_whitespace())
}
