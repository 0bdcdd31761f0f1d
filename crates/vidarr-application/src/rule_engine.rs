// SPDX-License-Identifier: GPL-3.0-or-later

//! Rule-based candidate filtering and priority ranking. Rules are data: named
//! bundles of include/exclude regexes plus optional media-language and
//! volume-factor predicates, loaded from configuration. A priority expression
//! is a `>`-delimited list of rule-group expressions; the first tier a
//! candidate satisfies decides its rank.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};
use vidarr_domain::{Candidate, GapMap, MediaKind};

use crate::rule_expr::RuleExpr;

/// One named predicate over a candidate, configured as data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleDefinition {
    pub name: String,
    /// Every pattern must match the candidate text (case-insensitive search).
    pub include: Vec<String>,
    /// Any match rejects the candidate.
    pub exclude: Vec<String>,
    /// Original-language codes; a match short-circuits the rule to success
    /// without consulting include/exclude.
    pub languages: Vec<String>,
    /// Exact download-volume-factor requirement (e.g. 0.0 for freeleech).
    pub download_volume_factor: Option<f32>,
}

/// A rule with its patterns compiled once at catalog build time.
#[derive(Debug, Clone)]
struct CompiledRule {
    definition: RuleDefinition,
    include: Vec<Regex>,
    exclude: Vec<Regex>,
    /// Set when an include pattern failed to compile; the regex path of such
    /// a rule can never succeed (the language predicate still can).
    include_broken: bool,
}

impl CompiledRule {
    fn compile(definition: RuleDefinition) -> Self {
        let mut include = Vec::new();
        let mut include_broken = false;
        for pattern in &definition.include {
            match build_pattern(&definition.name, pattern) {
                Some(re) => include.push(re),
                None => include_broken = true,
            }
        }
        // a broken exclude pattern simply never excludes
        let exclude = definition
            .exclude
            .iter()
            .filter_map(|pattern| build_pattern(&definition.name, pattern))
            .collect();
        Self {
            definition,
            include,
            exclude,
            include_broken,
        }
    }

    fn matches(&self, candidate: &Candidate) -> bool {
        if !self.definition.languages.is_empty() {
            if let Some(lang) = &candidate.media.original_language {
                if self
                    .definition
                    .languages
                    .iter()
                    .any(|wanted| wanted.eq_ignore_ascii_case(lang))
                {
                    return true;
                }
            }
        }

        if self.include_broken {
            return false;
        }
        let text = candidate_text(candidate);
        if !self.include.iter().all(|re| re.is_match(&text)) {
            return false;
        }
        if self.exclude.iter().any(|re| re.is_match(&text)) {
            return false;
        }
        if let Some(factor) = self.definition.download_volume_factor {
            if (candidate.torrent.download_volume_factor - factor).abs() > f32::EPSILON {
                return false;
            }
        }
        true
    }
}

/// The searchable text a rule sees: title, description and site labels.
fn candidate_text(candidate: &Candidate) -> String {
    let mut text = String::new();
    text.push_str(&candidate.torrent.title);
    if let Some(description) = &candidate.torrent.description {
        text.push(' ');
        text.push_str(description);
    }
    for label in &candidate.torrent.labels {
        text.push(' ');
        text.push_str(label);
    }
    text
}

/// Case-insensitive search pattern, compiled once. Invalid patterns are
/// reported here, at catalog build time, and nowhere else.
fn build_pattern(rule: &str, pattern: &str) -> Option<Regex> {
    match RegexBuilder::new(pattern).case_insensitive(true).build() {
        Ok(re) => Some(re),
        Err(error) => {
            warn!(target: "rule_engine", rule, pattern, %error, "invalid rule pattern");
            None
        }
    }
}

/// Externally configured table of named rules, with all patterns compiled
/// up front.
#[derive(Debug, Clone, Default)]
pub struct RuleCatalog {
    rules: BTreeMap<String, CompiledRule>,
}

impl RuleCatalog {
    pub fn new(rules: impl IntoIterator<Item = RuleDefinition>) -> Self {
        Self {
            rules: rules
                .into_iter()
                .map(|rule| (rule.name.clone(), CompiledRule::compile(rule)))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&RuleDefinition> {
        self.rules.get(name).map(|rule| &rule.definition)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether the named rule matches the candidate. Unknown names never
    /// match; atoms referencing missing rules degrade rather than abort.
    pub fn evaluate(&self, name: &str, candidate: &Candidate) -> bool {
        match self.rules.get(name) {
            Some(rule) => rule.matches(candidate),
            None => {
                debug!(target: "rule_engine", rule = name, "unknown rule name");
                false
            }
        }
    }
}

/// A parsed `>`-delimited priority expression. Tier 0 is the most wanted.
/// A malformed tier is kept as a never-matching hole so the remaining tiers
/// still evaluate.
#[derive(Debug, Clone)]
pub struct PriorityExpr {
    tiers: Vec<Option<RuleExpr>>,
}

impl PriorityExpr {
    pub fn parse(input: &str) -> Self {
        let tiers = input
            .split('>')
            .map(str::trim)
            .filter(|tier| !tier.is_empty())
            .map(|tier| match RuleExpr::parse(tier) {
                Ok(expr) => Some(expr),
                Err(error) => {
                    warn!(target: "rule_engine", tier, %error, "malformed priority tier");
                    None
                }
            })
            .collect();
        Self { tiers }
    }

    pub fn total_tiers(&self) -> usize {
        self.tiers.len()
    }

    /// Rank for a candidate: `totalTiers - indexMatched` for the first tier
    /// that evaluates true, `None` when no tier matches.
    pub fn rank(&self, catalog: &RuleCatalog, candidate: &Candidate) -> Option<u32> {
        let total = self.tiers.len() as u32;
        for (index, tier) in self.tiers.iter().enumerate() {
            let Some(expr) = tier else { continue };
            if expr.evaluate(&|name| catalog.evaluate(name, candidate)) {
                return Some(total - index as u32);
            }
        }
        None
    }
}

/// Filter candidates through the optional plain filter expression, the
/// season/episode gate (when a gap map is supplied) and the priority
/// expression, writing the assigned rank onto each survivor.
///
/// Order preservation: survivors come out in input order; ranking assigns
/// `priority_rank` but does not sort.
pub fn filter_and_rank(
    candidates: Vec<Candidate>,
    catalog: &RuleCatalog,
    filter: Option<&RuleExpr>,
    priority: &PriorityExpr,
    gaps: Option<&GapMap>,
) -> Vec<Candidate> {
    let mut accepted = Vec::new();
    for mut candidate in candidates {
        if let Some(filter) = filter {
            if !filter.evaluate(&|name| catalog.evaluate(name, &candidate)) {
                debug!(
                    target: "rule_engine",
                    title = %candidate.torrent.title,
                    "dropped by filter expression"
                );
                continue;
            }
        }
        if let Some(gaps) = gaps {
            if !passes_gap_gate(&candidate, gaps) {
                debug!(
                    target: "rule_engine",
                    title = %candidate.torrent.title,
                    "dropped by season/episode gate"
                );
                continue;
            }
        }
        let Some(rank) = priority.rank(catalog, &candidate) else {
            debug!(
                target: "rule_engine",
                title = %candidate.torrent.title,
                "no priority tier matched"
            );
            continue;
        };
        candidate.torrent.priority_rank = rank;
        accepted.push(candidate);
    }
    accepted
}

/// Season/episode gate: the candidate's season set must be a subset of the
/// seasons still carrying gaps, and declared episodes must overlap a needed
/// set. Sentinel gaps (whole season wanted) pass any episode declaration;
/// whole-season candidates pass any gap.
fn passes_gap_gate(candidate: &Candidate, gaps: &GapMap) -> bool {
    if candidate.media.kind != MediaKind::Tv {
        return true;
    }
    let Some(season_gaps) = gaps.get(&candidate.media.key) else {
        return false;
    };
    let seasons = candidate.meta.season_list();
    if !seasons.iter().all(|season| season_gaps.contains_key(season)) {
        return false;
    }
    let episodes: BTreeSet<u32> = candidate.meta.episode_list().into_iter().collect();
    if episodes.is_empty() {
        return true;
    }
    seasons.iter().any(|season| {
        season_gaps
            .get(season)
            .map(|gap| {
                gap.is_whole_season() || gap.episodes.iter().any(|e| episodes.contains(e))
            })
            .unwrap_or(false)
    })
}
