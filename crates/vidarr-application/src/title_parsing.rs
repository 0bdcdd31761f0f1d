// SPDX-License-Identifier: GPL-3.0-or-later

//! Release-title parsing: turns one unstructured torrent/feed title (plus an
//! optional subtitle) into a [`ParsedMeta`].
//!
//! Two naming conventions are handled. Standard releases carry
//! `SxxEyy`-style tokens (`Breaking.Bad.S01E05.1080p.BluRay.x264-GRP`);
//! fan-sub releases wrap everything in bracket groups
//! (`[Sub][Show Name][01][1080p]`). An ordered heuristic picks the branch and
//! falls back to the token branch when unsure. Parsing never fails: a title
//! that yields nothing usable comes back as `MediaKind::Unknown` with empty
//! fields.

use crate::subtitle_parsing::apply_subtitle;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;
use vidarr_domain::{MediaKind, ParsedMeta};

pub(crate) const VIDEO_EXTS: &[&str] = &[
    "mkv", "mp4", "avi", "ts", "mov", "wmv", "m2ts", "mpg", "flv", "rmvb", "iso", "webm",
];

lazy_static! {
    // --- classification -----------------------------------------------------
    static ref ANIME_FULLWIDTH_BRACKETS: Regex =
        Regex::new(r"【[+0-9XVPI-]+】\s*【").expect("valid anime bracket regex");
    static ref ANIME_DASH_NUMBER: Regex =
        Regex::new(r"\s+-\s+[\dv]{1,4}\s+").expect("valid anime dash regex");
    static ref STANDARD_TOKENS: Regex = Regex::new(
        r"(?i)S\d{2}\s*-\s*S\d{2}|S\d{2}|\s+S\d{1,2}|EP?\d{2,4}\s*-\s*EP?\d{2,4}|EP?\d{2,4}|\s+EP?\d{1,4}"
    )
    .expect("valid standard token regex");
    static ref ANIME_HALFWIDTH_BRACKETS: Regex =
        Regex::new(r"\[[+0-9XVPI-]+\]\s*\[").expect("valid anime halfwidth regex");

    // --- standard season/episode tokens -------------------------------------
    static ref SEASON_EPISODE: Regex = Regex::new(
        r"(?i)\bS(\d{1,2})\s*E(\d{1,4})(?:\s*-\s*(?:S(\d{1,2}))?E?(\d{1,4}))?"
    )
    .expect("valid SxxEyy regex");
    static ref SEASON_RANGE: Regex =
        Regex::new(r"(?i)\bS(\d{1,2})\s*-\s*S(\d{1,2})\b").expect("valid season range regex");
    static ref SEASON_ONLY: Regex =
        Regex::new(r"(?i)\bS(\d{1,2})\b").expect("valid season regex");
    static ref EPISODE_ONLY: Regex = Regex::new(r"(?i)\bEP?(\d{2,4})(?:\s*-\s*EP?(\d{2,4}))?\b")
        .expect("valid episode regex");
    // 4-digit season+episode code, e.g. "0102" = S01E02
    static ref COMPACT_CODE: Regex =
        Regex::new(r"\b(\d{2})(\d{2})\b").expect("valid compact code regex");
    static ref YEAR: Regex = Regex::new(r"\b(19\d{2}|20\d{2})\b").expect("valid year regex");

    // --- anime tokens --------------------------------------------------------
    static ref ANIME_BRACKET_GROUPS: Regex =
        Regex::new(r"[\[【]([^\]】]+)[\]】]").expect("valid bracket group regex");
    static ref ANIME_EPISODE: Regex =
        Regex::new(r"^(\d{1,4})(?:\s*-\s*(\d{1,4}))?(?:[vV]\d)?$").expect("valid anime episode regex");
    static ref ANIME_DASH_EPISODE: Regex =
        Regex::new(r"\s-\s(\d{1,4})(?:[vV]\d)?(?:\s|$)").expect("valid anime dash episode regex");

    // --- resource attribute extractors (fixed order, first match wins) -------
    static ref RESOLUTION: Regex =
        Regex::new(r"(?i)\b(\d{3,4}[pi]|[48]K)\b").expect("valid resolution regex");
    static ref SOURCE: Regex = Regex::new(
        r"(?i)\b(UHD[\s.-]?BluRay|Blu-?Ray|BDRip|BDMV|WEB-?DL|WEBRip|HDTV|DVDRip|Remux)\b"
    )
    .expect("valid source regex");
    static ref VIDEO_CODEC: Regex =
        Regex::new(r"(?i)\b(x26[45]|H\.?26[45]|HEVC|AVC|AV1|VP9)\b").expect("valid codec regex");
    static ref AUDIO_CODEC: Regex = Regex::new(
        r"(?i)\b(DDP(?:[\s.]?[257]\.[01])?|DTS(?:-?HD)?(?:[\s.]?MA)?|TrueHD|Atmos|AAC(?:[\s.]?[257]\.[01])?|FLAC|E?AC-?3|OPUS)\b"
    )
    .expect("valid audio regex");
    static ref EFFECTS: Regex = Regex::new(r"(?i)\b(HDR10\+|HDR10|HDR|DoVi|DV|Dolby\s?Vision|SDR|HLG)\b")
        .expect("valid effects regex");
    static ref PART: Regex = Regex::new(r"(?i)\b(Part[\s.]?\d+|CD[\s.]?\d+|Dis[ck][\s.]?\d+)\b")
        .expect("valid part regex");
    static ref GROUP_SUFFIX: Regex =
        Regex::new(r"[-@]([A-Za-z0-9@]+)$").expect("valid group suffix regex");

    // --- naming --------------------------------------------------------------
    static ref BRACKETED: Regex =
        Regex::new(r"\[[^\]]*\]|【[^】]*】|\([^)]*\)|（[^）]*）").expect("valid bracketed regex");
    static ref STRUCTURAL: Regex = Regex::new(
        r"(?i)\b(19\d{2}|20\d{2}|S\d{1,2}(?:E\d{1,4}(?:-E?\d{1,4})?)?|EP?\d{2,4}|\d{3,4}[pi]|[48]K|Blu-?Ray|BDRip|WEB-?DL|WEBRip|HDTV|Remux|HEVC|x26[45]|H\.?26[45])\b"
    )
    .expect("valid structural token regex");
}

/// Parse one release title (and optional subtitle) into structured metadata.
///
/// Never fails; on total failure the result has `kind == Unknown` and all
/// other fields empty.
pub fn parse_title(title: &str, subtitle: Option<&str>) -> ParsedMeta {
    let mut meta = ParsedMeta::new(title);
    let trimmed = strip_video_extension(title.trim());
    if trimmed.is_empty() && subtitle.map(str::trim).unwrap_or("").is_empty() {
        return meta;
    }

    let anime = is_anime(trimmed);

    // The subtitle carries the most reliable season/episode facts; the main
    // title only fills what the subtitle left unset.
    if let Some(subtitle) = subtitle {
        apply_subtitle(&mut meta, subtitle);
    }

    if anime {
        parse_anime_tokens(&mut meta, trimmed);
    } else {
        parse_standard_tokens(&mut meta, trimmed);
    }

    extract_year(&mut meta, trimmed);
    extract_resource_attrs(&mut meta, trimmed, anime);
    extract_names(&mut meta, trimmed, anime);

    if meta.kind == MediaKind::Unknown {
        if meta.begin_season.is_some()
            || meta.begin_episode.is_some()
            || meta.total_seasons > 0
            || meta.total_episodes > 0
        {
            meta.kind = MediaKind::Tv;
        } else if !meta.name().is_empty() {
            meta.kind = MediaKind::Movie;
        } else {
            debug!(target: "title_parsing", title, "no usable metadata recovered");
        }
    }
    meta
}

/// Anime-vs-standard branch heuristic. Ordered checks; anything ambiguous
/// falls through to the standard token branch. Best effort only.
fn is_anime(title: &str) -> bool {
    if ANIME_FULLWIDTH_BRACKETS.is_match(title) {
        return true;
    }
    if ANIME_DASH_NUMBER.is_match(title) {
        return true;
    }
    if STANDARD_TOKENS.is_match(title) {
        return false;
    }
    ANIME_HALFWIDTH_BRACKETS.is_match(title)
}

fn strip_video_extension(title: &str) -> &str {
    if let Some((stem, ext)) = title.rsplit_once('.') {
        if VIDEO_EXTS.contains(&ext.to_ascii_lowercase().as_str()) {
            return stem;
        }
    }
    title
}

fn parse_standard_tokens(meta: &mut ParsedMeta, title: &str) {
    if let Some(caps) = SEASON_EPISODE.captures(title) {
        let season = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok());
        let begin = caps.get(2).and_then(|m| m.as_str().parse::<u32>().ok());
        let end_season = caps.get(3).and_then(|m| m.as_str().parse::<u32>().ok());
        let end = caps.get(4).and_then(|m| m.as_str().parse::<u32>().ok());

        // A span that crosses seasons ("S01E05-S02E08") is a multi-season
        // release; the episode bounds are per-season and cannot describe it.
        if let (Some(a), Some(b)) = (season, end_season.filter(|&b| Some(b) != season)) {
            if meta.begin_season.is_none() {
                let (begin, end) = (a.min(b), a.max(b));
                meta.begin_season = Some(begin);
                meta.end_season = Some(end);
                meta.total_seasons = end - begin + 1;
            }
            meta.kind = MediaKind::Tv;
            return;
        }

        if meta.begin_season.is_none() {
            meta.begin_season = season;
            meta.total_seasons = 1;
        }
        if meta.begin_episode.is_none() {
            if let Some(begin) = begin {
                match end {
                    Some(end) if end != begin => meta.set_episodes(begin, end),
                    _ => {
                        meta.begin_episode = Some(begin);
                        meta.total_episodes = 1;
                    }
                }
            }
        }
        meta.kind = MediaKind::Tv;
        return;
    }

    if let Some(caps) = SEASON_RANGE.captures(title) {
        let (Some(a), Some(b)) = (
            caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok()),
            caps.get(2).and_then(|m| m.as_str().parse::<u32>().ok()),
        ) else {
            return;
        };
        if meta.begin_season.is_none() {
            let (begin, end) = (a.min(b), a.max(b));
            meta.begin_season = Some(begin);
            if end != begin {
                meta.end_season = Some(end);
            }
            meta.total_seasons = end - begin + 1;
        }
        meta.kind = MediaKind::Tv;
        return;
    }

    let mut found = false;
    if let Some(caps) = SEASON_ONLY.captures(title) {
        if meta.begin_season.is_none() {
            meta.begin_season = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok());
            meta.total_seasons = 1;
        }
        meta.kind = MediaKind::Tv;
        found = true;
    }
    if let Some(caps) = EPISODE_ONLY.captures(title) {
        let begin = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok());
        let end = caps.get(2).and_then(|m| m.as_str().parse::<u32>().ok());
        if let Some(begin) = begin {
            if !is_year_like(begin) && meta.begin_episode.is_none() {
                match end {
                    Some(end) if end != begin => meta.set_episodes(begin, end),
                    _ => {
                        meta.begin_episode = Some(begin);
                        meta.total_episodes = 1;
                    }
                }
                meta.kind = MediaKind::Tv;
                found = true;
            }
        }
    }
    if found {
        return;
    }

    // Last resort: a compact 4-digit code such as "0102" (season 1 episode 2).
    // Year-shaped values are left for the year extractor.
    if meta.begin_season.is_none() && meta.begin_episode.is_none() {
        for caps in COMPACT_CODE.captures_iter(title) {
            let (Some(season), Some(episode)) = (
                caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok()),
                caps.get(2).and_then(|m| m.as_str().parse::<u32>().ok()),
            ) else {
                continue;
            };
            let code = season * 100 + episode;
            if is_year_like(code) || season == 0 || season > 19 || episode == 0 {
                continue;
            }
            meta.begin_season = Some(season);
            meta.begin_episode = Some(episode);
            meta.total_seasons = 1;
            meta.total_episodes = 1;
            meta.kind = MediaKind::Tv;
            return;
        }
    }
}

fn parse_anime_tokens(meta: &mut ParsedMeta, title: &str) {
    // Bracket groups: the first is conventionally the fan-sub group, episode
    // numbers appear as a bare bracketed value further along.
    for (index, caps) in ANIME_BRACKET_GROUPS.captures_iter(title).enumerate() {
        let Some(inner) = caps.get(1) else { continue };
        let inner = inner.as_str().trim();
        if index == 0 && meta.attrs.release_group.is_none() && !inner.chars().all(|c| c.is_ascii_digit()) {
            meta.attrs.release_group = Some(inner.to_string());
            continue;
        }
        if meta.begin_episode.is_none() {
            if let Some(ep_caps) = ANIME_EPISODE.captures(inner) {
                let begin = ep_caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok());
                let end = ep_caps.get(2).and_then(|m| m.as_str().parse::<u32>().ok());
                if let Some(begin) = begin {
                    if is_year_like(begin) {
                        continue;
                    }
                    match end {
                        Some(end) if end != begin => meta.set_episodes(begin, end),
                        _ => {
                            meta.begin_episode = Some(begin);
                            meta.total_episodes = 1;
                        }
                    }
                    meta.kind = MediaKind::Tv;
                }
            }
        }
    }

    // " Title - 12 " numbering outside brackets.
    if meta.begin_episode.is_none() {
        if let Some(caps) = ANIME_DASH_EPISODE.captures(title) {
            if let Some(episode) = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok()) {
                if !is_year_like(episode) {
                    meta.begin_episode = Some(episode);
                    meta.total_episodes = 1;
                    meta.kind = MediaKind::Tv;
                }
            }
        }
    }

    if meta.begin_season.is_none() {
        if let Some(caps) = SEASON_ONLY.captures(title) {
            meta.begin_season = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok());
            meta.total_seasons = 1;
            meta.kind = MediaKind::Tv;
        }
    }
}

fn is_year_like(value: u32) -> bool {
    (1900..=2100).contains(&value)
}

fn extract_year(meta: &mut ParsedMeta, title: &str) {
    if meta.year.is_some() {
        return;
    }
    // The last year-shaped token wins: names may themselves look like years
    // ("1917.2019.1080p").
    if let Some(m) = YEAR.find_iter(title).last() {
        meta.year = Some(m.as_str().to_string());
    }
}

/// Run the fixed, ordered attribute extractors. Each attribute is independent
/// and keeps its first match only.
fn extract_resource_attrs(meta: &mut ParsedMeta, title: &str, anime: bool) {
    let attrs = &mut meta.attrs;
    if attrs.resolution.is_none() {
        if let Some(caps) = RESOLUTION.captures(title) {
            attrs.resolution = caps.get(1).map(|m| normalize_resolution(m.as_str()));
        }
    }
    if attrs.source.is_none() {
        if let Some(caps) = SOURCE.captures(title) {
            attrs.source = caps.get(1).map(|m| m.as_str().to_string());
        }
    }
    if attrs.video_codec.is_none() {
        if let Some(caps) = VIDEO_CODEC.captures(title) {
            attrs.video_codec = caps.get(1).map(|m| m.as_str().to_string());
        }
    }
    if attrs.audio_codec.is_none() {
        if let Some(caps) = AUDIO_CODEC.captures(title) {
            attrs.audio_codec = caps.get(1).map(|m| m.as_str().to_string());
        }
    }
    for caps in EFFECTS.captures_iter(title) {
        if let Some(effect) = caps.get(1).map(|m| m.as_str().to_uppercase()) {
            if !attrs.effects.contains(&effect) {
                attrs.effects.push(effect);
            }
        }
    }
    if attrs.part.is_none() {
        if let Some(caps) = PART.captures(title) {
            attrs.part = caps.get(1).map(|m| m.as_str().to_string());
        }
    }
    if attrs.release_group.is_none() && !anime {
        if let Some(caps) = GROUP_SUFFIX.captures(title) {
            attrs.release_group = caps.get(1).map(|m| m.as_str().to_string());
        }
    }
}

fn extract_names(meta: &mut ParsedMeta, title: &str, anime: bool) {
    if !meta.name().is_empty() {
        return;
    }
    let region = if anime {
        anime_name_region(title)
    } else {
        standard_name_region(title)
    };

    let mut cn_words: Vec<&str> = Vec::new();
    let mut en_words: Vec<&str> = Vec::new();
    for token in region.split_whitespace() {
        let token = token.trim_matches(|c| c == '-' || c == '–');
        if token.is_empty() {
            continue;
        }
        if token.chars().any(is_cjk) {
            // English words stop accumulating once a second CJK run begins:
            // the tail is usually a translated duplicate.
            if en_words.is_empty() {
                cn_words.push(token);
            }
        } else if token.chars().any(|c| c.is_ascii_alphanumeric()) {
            en_words.push(token);
        }
    }
    if !cn_words.is_empty() {
        meta.cn_name = Some(cn_words.join(""));
    }
    if !en_words.is_empty() {
        meta.en_name = Some(en_words.join(" "));
    }
}

fn standard_name_region(title: &str) -> String {
    let cleaned = BRACKETED.replace_all(title, " ");
    let cleaned = cleaned.replace(['.', '_'], " ");
    let cut = STRUCTURAL
        .find(&cleaned)
        .map(|m| m.start())
        .unwrap_or(cleaned.len());
    cleaned[..cut].trim().to_string()
}

fn anime_name_region(title: &str) -> String {
    // The name is usually the first bracket group that is neither the fan-sub
    // group nor a numeric/quality tag; failing that, whatever sits outside
    // the brackets.
    let groups: Vec<&str> = ANIME_BRACKET_GROUPS
        .captures_iter(title)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().trim()))
        .collect();
    for group in groups.iter().skip(1) {
        if group.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        if STRUCTURAL.is_match(group) || RESOLUTION.is_match(group) {
            continue;
        }
        if group.chars().any(|c| c.is_alphabetic() || is_cjk(c)) {
            return group.to_string();
        }
    }
    let outside = BRACKETED.replace_all(title, " ");
    let outside = ANIME_DASH_EPISODE.replace_all(&outside, " ");
    outside.replace(['.', '_'], " ").trim().to_string()
}

fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
        || ('\u{3040}'..='\u{30ff}').contains(&c)
        || ('\u{ac00}'..='\u{d7af}').contains(&c)
}

fn normalize_resolution(token: &str) -> String {
    let lower = token.to_lowercase();
    match lower.as_str() {
        "4k" => "2160p".to_string(),
        "8k" => "4320p".to_string(),
        _ => lower,
    }
}

#[cfg(test)]
mod tests {
    use super::{is_anime, parse_title};
    use vidarr_domain::MediaKind;

    #[test]
    fn parses_standard_tv_release() {
        let meta = parse_title("Breaking.Bad.S01E05.1080p.BluRay.x264-GRP.mkv", None);
        assert_eq!(meta.kind, MediaKind::Tv);
        assert_eq!(meta.begin_season, Some(1));
        assert_eq!(meta.begin_episode, Some(5));
        assert_eq!(meta.attrs.resolution.as_deref(), Some("1080p"));
        assert_eq!(meta.attrs.source.as_deref(), Some("BluRay"));
        assert_eq!(meta.attrs.video_codec.as_deref(), Some("x264"));
        assert_eq!(meta.attrs.release_group.as_deref(), Some("GRP"));
        assert_eq!(meta.en_name.as_deref(), Some("Breaking Bad"));
    }

    #[test]
    fn parses_episode_range() {
        let meta = parse_title("Show.Name.S02E01-E12.2160p.WEB-DL.H265", None);
        assert_eq!(meta.begin_season, Some(2));
        assert_eq!(meta.begin_episode, Some(1));
        assert_eq!(meta.end_episode, Some(12));
        assert_eq!(meta.total_episodes, 12);
        assert_eq!(meta.attrs.resolution.as_deref(), Some("2160p"));
    }

    #[test]
    fn cross_season_span_is_a_season_range() {
        let meta = parse_title("Show.S01E05-S02E08.1080p.WEB-DL", None);
        assert_eq!(meta.begin_season, Some(1));
        assert_eq!(meta.end_season, Some(2));
        assert_eq!(meta.total_seasons, 2);
        assert!(meta.episode_list().is_empty());

        // a repeated same-season marker is still an episode range
        let meta = parse_title("Show.S01E05-S01E08.1080p.WEB-DL", None);
        assert_eq!(meta.begin_season, Some(1));
        assert_eq!(meta.end_season, None);
        assert_eq!(meta.begin_episode, Some(5));
        assert_eq!(meta.end_episode, Some(8));
    }

    #[test]
    fn parses_season_range_bundle() {
        let meta = parse_title("Some.Show.S01-S03.1080p.WEB-DL.Complete", None);
        assert_eq!(meta.begin_season, Some(1));
        assert_eq!(meta.end_season, Some(3));
        assert_eq!(meta.total_seasons, 3);
        assert!(meta.episode_list().is_empty());
    }

    #[test]
    fn parses_movie_release() {
        let meta = parse_title("Inception.2010.1080p.BluRay.DTS.x264-CMRG", None);
        assert_eq!(meta.kind, MediaKind::Movie);
        assert_eq!(meta.year.as_deref(), Some("2010"));
        assert_eq!(meta.en_name.as_deref(), Some("Inception"));
        assert_eq!(meta.begin_season, None);
        assert_eq!(meta.attrs.audio_codec.as_deref(), Some("DTS"));
    }

    #[test]
    fn four_k_is_normalized() {
        let meta = parse_title("Dune.2021.4K.UHD.BluRay.Remux.HDR", None);
        assert_eq!(meta.attrs.resolution.as_deref(), Some("2160p"));
        assert_eq!(meta.year.as_deref(), Some("2021"));
        assert!(meta.attrs.effects.contains(&"HDR".to_string()));
    }

    #[test]
    fn chinese_name_splits_from_english() {
        let meta = parse_title("风骚律师 Better Call Saul S04E01 1080p WEB-DL", None);
        assert_eq!(meta.cn_name.as_deref(), Some("风骚律师"));
        assert_eq!(meta.en_name.as_deref(), Some("Better Call Saul"));
        assert_eq!(meta.begin_season, Some(4));
    }

    #[test]
    fn anime_bracket_release() {
        let title = "[Nekomoe kissaten][Spice and Wolf][08][1080p][JPSC]";
        assert!(is_anime(title));
        let meta = parse_title(title, None);
        assert_eq!(meta.kind, MediaKind::Tv);
        assert_eq!(meta.begin_episode, Some(8));
        assert_eq!(meta.attrs.release_group.as_deref(), Some("Nekomoe kissaten"));
        assert_eq!(meta.en_name.as_deref(), Some("Spice and Wolf"));
    }

    #[test]
    fn sxxeyy_titles_are_not_anime() {
        assert!(!is_anime("Frieren S01E05 1080p"));
        assert!(!is_anime("Show.S01E01-E12.WEB-DL"));
    }

    #[test]
    fn subtitle_facts_take_priority_over_title_tokens() {
        let meta = parse_title("Some Show 1080p", Some("第二季 第3集"));
        assert_eq!(meta.begin_season, Some(2));
        assert_eq!(meta.begin_episode, Some(3));
        assert_eq!(meta.kind, MediaKind::Tv);
    }

    #[test]
    fn subtitle_total_without_begin() {
        let meta = parse_title("Some Show WEB-DL", Some("全24集"));
        assert_eq!(meta.total_episodes, 24);
        assert_eq!(meta.begin_episode, None);
        assert_eq!(meta.kind, MediaKind::Tv);
    }

    #[test]
    fn compact_code_fallback() {
        let meta = parse_title("某剧 0102 1080p", None);
        assert_eq!(meta.begin_season, Some(1));
        assert_eq!(meta.begin_episode, Some(2));
    }

    #[test]
    fn year_shaped_code_is_not_an_episode() {
        let meta = parse_title("Movie 2024 1080p", None);
        assert_eq!(meta.begin_episode, None);
        assert_eq!(meta.year.as_deref(), Some("2024"));
        assert_eq!(meta.kind, MediaKind::Movie);
    }

    #[test]
    fn total_failure_is_unknown() {
        let meta = parse_title("", None);
        assert_eq!(meta.kind, MediaKind::Unknown);
        assert!(meta.name().is_empty());
        assert_eq!(meta.year, None);
    }

    #[test]
    fn hdr_effects_collect() {
        let meta = parse_title("Show.S01E01.2160p.WEB-DL.HDR10.DV.HEVC", None);
        assert!(meta.attrs.effects.contains(&"HDR10".to_string()));
        assert!(meta.attrs.effects.contains(&"DV".to_string()));
    }
}
