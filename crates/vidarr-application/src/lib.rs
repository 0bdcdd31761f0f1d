// SPDX-License-Identifier: GPL-3.0-or-later

//! The acquisition decision engine: title parsing, gap tracking, rule-based
//! filtering/ranking and greedy download selection. Everything here is
//! deterministic given its inputs; network and library access happen behind
//! the collaborator traits in [`providers`].

pub mod gap_tracking;
pub mod numerals;
pub mod providers;
pub mod rule_engine;
pub mod rule_expr;
pub mod selection;
pub mod subtitle_parsing;
pub mod title_parsing;

pub use gap_tracking::{compute_gaps, reconcile, GapError};
pub use providers::{
    episodes_from_files, DownloadError, DownloadReceipt, Downloader, InspectError,
    LibraryExistenceProvider, MediaRecognizer, ProviderError, RecognizerChain, TorrentInspector,
    TorrentListing,
};
pub use rule_engine::{filter_and_rank, PriorityExpr, RuleCatalog, RuleDefinition};
pub use rule_expr::{ExprError, RuleExpr};
pub use selection::{CancellationFlag, SelectionEngine};
pub use title_parsing::parse_title;
