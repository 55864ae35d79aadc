// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI configuration loaded from environment variables.

use spacemark_engine::{MarkOptions, ResolveOptions};

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Outline growth used by room matching.
    pub offset: f64,
    /// Stretch element outlines to their level elevation.
    pub project_to_level: bool,
    pub mark_prefix: String,
    pub mark_separator: String,
    /// Door mark suffixes (comma-separated in the environment).
    pub mark_suffixes: Vec<String>,
    /// Number of worker threads for batch matching.
    pub worker_threads: usize,
    /// Phase to work in; the model's last phase when unset.
    pub phase: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = MarkOptions::default();
        Self {
            offset: std::env::var("SPACEMARK_OFFSET")
                .unwrap_or_else(|_| "1.0".into())
                .parse()
                .unwrap_or(1.0),
            project_to_level: std::env::var("SPACEMARK_PROJECT_TO_LEVEL")
                .unwrap_or_else(|_| "true".into())
                .parse()
                .unwrap_or(true),
            mark_prefix: std::env::var("SPACEMARK_MARK_PREFIX").unwrap_or_default(),
            mark_separator: std::env::var("SPACEMARK_MARK_SEPARATOR").unwrap_or_default(),
            mark_suffixes: std::env::var("SPACEMARK_MARK_SUFFIXES")
                .map(|s| {
                    s.split(',')
                        .map(|part| part.trim().to_string())
                        .filter(|part| !part.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.suffixes),
            worker_threads: std::env::var("SPACEMARK_WORKER_THREADS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(num_cpus::get),
            phase: std::env::var("SPACEMARK_PHASE")
                .ok()
                .filter(|s| !s.trim().is_empty()),
        }
    }

    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions::default()
            .with_offset(self.offset)
            .with_project_to_level(self.project_to_level)
    }

    pub fn mark_options(&self) -> MarkOptions {
        MarkOptions {
            prefix: self.mark_prefix.clone(),
            separator: self.mark_separator.clone(),
            suffixes: self.mark_suffixes.clone(),
        }
    }
}
