//! **revsift** - Fast CLI for sifting automated code-review comments into paste-ready LLM suggestions
//!
//! Heuristic, fallback-layered extraction over untrusted review-page markup,
//! content-derived suggestion identity, persistent per-page selection state,
//! and three output encodings (prompt / Markdown / JSON).

/// Command-line interface with clap integration
pub mod cli;

/// Shell completion generation
pub mod completion;

/// Core extraction pipeline - classification, segmentation, and selection state
pub mod core {
    /// Reviewer-authorship classification (ordered OR of evidence predicates)
    pub mod classify;
    pub use classify::Classifier;

    /// Extraction orchestration, global author filter, page sessions
    pub mod extract;
    pub use extract::{Extractor, PageSession, filter_primary, query, run as extract_run};

    /// Content hashing for ids and dedupe keys
    pub mod hash;
    pub use hash::content_hash;

    /// Context locators: file path, line range, mentioned code
    pub mod locate;

    /// Core value types
    pub mod model;
    pub use model::{LineRange, QueryResult, Suggestion};

    /// Output builders (prompt / Markdown / JSON) and clipboard edge
    pub mod output;
    pub use output::{BuildKind, build_json, build_markdown, build_prompt};

    /// Review-page parsing, address resolution, text flattening
    pub mod page;
    pub use page::ReviewPage;

    /// Suggestion segmentation (four strategies + fallback)
    pub mod segment;
    pub use segment::segment;

    /// Persistent selection state scoped by page identity
    pub mod state;
    pub use state::{PageState, SelectOp, SelectionStore};

    /// Debounced page watching and re-extraction
    pub mod watch;
}

/// Infrastructure - Configuration and text utilities
pub mod infra {
    /// Configuration management with TOML support
    pub mod config;
    pub use config::{Config, init as config_init, load_config};

    /// Text utility helpers for extracted fragments
    pub mod utils;
    pub use utils::TextUtils;
}

// Strategic re-exports for clean CLI interface
pub use cli::{AppContext, Cli, Commands};
pub use core::{PageSession, QueryResult, ReviewPage, Suggestion};
pub use infra::{Config, load_config};
