// SPDX-License-Identifier: GPL-3.0-or-later
use std::path::Path;

use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use vidarr_application::{RuleCatalog, RuleDefinition};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    /// `>`-delimited priority tiers over rule names, e.g. `"4K & !BLU > 1080P"`.
    pub priority: String,
    /// Optional plain filter expression applied before priority evaluation.
    pub filter: Option<String>,
    /// Named rules; merged over the stock catalog by name.
    pub catalog: Vec<RuleDefinition>,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            priority: "4K > 1080P".to_string(),
            filter: None,
            catalog: Vec::new(),
        }
    }
}

impl RulesConfig {
    /// Stock catalog plus configured rules; a configured rule with a stock
    /// name replaces the stock definition.
    pub fn catalog(&self) -> RuleCatalog {
        RuleCatalog::new(stock_rules().into_iter().chain(self.catalog.iter().cloned()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Ceiling on candidates fed into one selection batch.
    pub max_candidates: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            max_candidates: 200,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub telemetry: TelemetryConfig,
    pub rules: RulesConfig,
    pub selection: SelectionConfig,
}

/// Load configuration from defaults, optional TOML file, and environment overrides (prefix: VIDARR_).
pub fn load(config_path: Option<&Path>) -> Result<AppConfig> {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

    if let Some(path) = config_path {
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Env::prefixed("VIDARR_").split("__"));

    let config: AppConfig = figment.extract()?;
    info!(target: "config", "configuration loaded");
    Ok(config)
}

/// Built-in rule definitions; overridable per name from the rules section.
fn stock_rules() -> Vec<RuleDefinition> {
    vec![
        RuleDefinition {
            name: "4K".to_string(),
            include: vec![r"2160[pi]|\b4K\b|\bUHD\b".to_string()],
            ..RuleDefinition::default()
        },
        RuleDefinition {
            name: "1080P".to_string(),
            include: vec![r"1080[pi]|\bFHD\b".to_string()],
            ..RuleDefinition::default()
        },
        RuleDefinition {
            name: "720P".to_string(),
            include: vec![r"720[pi]|\bHD\b".to_string()],
            ..RuleDefinition::default()
        },
        RuleDefinition {
            name: "BLU".to_string(),
            include: vec![r"Blu-?Ray|BDRip".to_string()],
            exclude: vec![r"WEB-?DL|WEBRip|HDTV".to_string()],
            ..RuleDefinition::default()
        },
        RuleDefinition {
            name: "WEB".to_string(),
            include: vec![r"WEB-?DL|WEBRip".to_string()],
            ..RuleDefinition::default()
        },
        RuleDefinition {
            name: "HDR".to_string(),
            include: vec![r"\bHDR\b|Dolby.?Vision|\bDV\b".to_string()],
            ..RuleDefinition::default()
        },
        RuleDefinition {
            name: "CN".to_string(),
            include: vec![r"国语|国配|中字|简体|繁体|字幕组".to_string()],
            languages: vec!["zh".to_string(), "cn".to_string()],
            ..RuleDefinition::default()
        },
        RuleDefinition {
            name: "FREE".to_string(),
            download_volume_factor: Some(0.0),
            ..RuleDefinition::default()
        },
    ]
}
