// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;

use crate::genai::{DEFAULT_ENDPOINT, DEFAULT_MODEL, DEFAULT_TTS_MODEL};
use crate::gist::DEFAULT_API_BASE;

/// Runtime settings read from the environment (and `.env` when present).
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_endpoint: String,
    pub gemini_tts_model: String,
    pub github_token: Option<String>,
    pub gist_api: String,
    pub db_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            gemini_api_key: None,
            gemini_model: DEFAULT_MODEL.to_string(),
            gemini_endpoint: DEFAULT_ENDPOINT.to_string(),
            gemini_tts_model: DEFAULT_TTS_MODEL.to_string(),
            github_token: None,
            gist_api: DEFAULT_API_BASE.to_string(),
            db_path: None,
        }
    }
}

impl AppConfig {
    pub fn load() -> Self {
        if let Err(e) = dotenvy::dotenv() {
            tracing::debug!(error = %e, "no .env loaded");
        }
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Builds the config from any key lookup; blank values count as unset.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let get = |k: &str| get(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let d = AppConfig::default();
        AppConfig {
            gemini_api_key: get("GEMINI_API_KEY").or_else(|| get("API_KEY")),
            gemini_model: get("MASTERYHUB_GEMINI_MODEL").unwrap_or(d.gemini_model),
            gemini_endpoint: get("MASTERYHUB_GEMINI_ENDPOINT").unwrap_or(d.gemini_endpoint),
            gemini_tts_model: get("MASTERYHUB_TTS_MODEL").unwrap_or(d.gemini_tts_model),
            github_token: get("GITHUB_TOKEN"),
            gist_api: get("MASTERYHUB_GIST_API").unwrap_or(d.gist_api),
            db_path: get("MASTERYHUB_DB").map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn blank_values_fall_back() {
        let env: HashMap<&str, &str> = [
            ("GEMINI_API_KEY", "  "),
            ("API_KEY", "k2"),
            ("MASTERYHUB_DB", "/tmp/hub.sqlite"),
        ]
        .into_iter()
        .collect();
        let cfg = AppConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.gemini_api_key.as_deref(), Some("k2"));
        assert_eq!(cfg.gemini_model, DEFAULT_MODEL);
        assert_eq!(cfg.gemini_tts_model, DEFAULT_TTS_MODEL);
        assert_eq!(cfg.db_path, Some(PathBuf::from("/tmp/hub.sqlite")));
        assert!(cfg.github_token.is_none());
    }
}
