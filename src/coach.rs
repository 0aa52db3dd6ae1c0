// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Short coaching lines from the text model, with canned fallbacks whenever
//! the model is unavailable or keeps failing.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::genai::{GeminiClient, Prompt, SpeechModel, TextModel};
use crate::live::decode_pcm16;
use crate::metrics::BudgetReport;
use crate::retry::{CallError, RetryPolicy};
use crate::store::Debouncer;
use crate::utils::{fmt_money, http_client};

pub const IDLE_MESSAGE: &str = "Focus on one small win at a time.";
pub const LOADING_MESSAGE: &str = "Coach is analyzing your progress...";
pub const TRIGGER_DELAY: Duration = Duration::from_millis(1_500);

const CHECKIN_SYSTEM: &str = "You are an ADHD-specialist success coach. Your tone is dopamine-friendly, ultra-short (max 15 words), and encouraging. Focus on the momentum of tiny iterations and the beauty of small wins. Avoid generic platitudes; be specific about compounding momentum.";
const INCOME_SYSTEM: &str = "You are a strategic wealth and discipline advisor. Provide exactly one sentence of tactical advice on how to allocate new income. Prioritize financial security (emergency funds/needs) and mental peace of mind. Keep it sharp and actionable.";
const INSIGHTS_SYSTEM: &str = "You are an ADHD-friendly financial coach. Your insights are positive, non-judgmental, and focus on patterns. Provide 2-3 short, bullet-pointed insights (max 15 words each). Highlight good habits (like high savings allocation) and gently point out areas for awareness (like high spending in one category). Use emojis. Format as a simple string with each insight on a new line starting with a bullet point.";

static BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"•|-|\*").expect("static regex"));

pub fn checkin_fallback(done: usize, total: usize) -> &'static str {
    if done == total && total > 0 {
        "Momentum peak achieved. Your focus today was undeniable. Time for deliberate rest."
    } else if done > 0 {
        "Momentum secured. You've broken the friction of zero. Keep the streak alive."
    } else {
        "Focus on the smallest possible starting point. The first step is the loudest."
    }
}

pub fn income_fallback(priorities: &[String]) -> String {
    let first = priorities.first().map(String::as_str).unwrap_or("safety net");
    format!("New capital locked. Prioritize your {first} to protect your creative energy.")
}

pub const INSIGHTS_FALLBACK: &str =
    "Insights are currently unavailable. Focus on your allocation accuracy.";

/// Splits model output into insight lines, dropping the leading bullet mark.
pub fn clean_insights(text: &str) -> Vec<String> {
    text.lines()
        .map(|l| BULLET.replace(l, "").trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}

pub struct Coach {
    model: Option<Arc<dyn TextModel + Send + Sync>>,
    voice: Option<Arc<dyn SpeechModel + Send + Sync>>,
    policy: RetryPolicy,
}

impl Coach {
    pub fn new(model: Option<Arc<dyn TextModel + Send + Sync>>, policy: RetryPolicy) -> Self {
        Coach {
            model,
            voice: None,
            policy,
        }
    }

    pub fn with_voice(mut self, voice: Arc<dyn SpeechModel + Send + Sync>) -> Self {
        self.voice = Some(voice);
        self
    }

    pub fn offline() -> Self {
        Coach::new(None, RetryPolicy::default())
    }

    /// Uses Gemini when a key is configured, otherwise answers from the fallbacks.
    pub fn from_config(cfg: &AppConfig) -> Self {
        let Some(key) = cfg.gemini_api_key.as_deref() else {
            tracing::debug!("no Gemini key, coach runs offline");
            return Coach::offline();
        };
        match http_client() {
            Ok(http) => {
                let client = GeminiClient::with_endpoint(
                    http.clone(),
                    key,
                    &cfg.gemini_model,
                    &cfg.gemini_endpoint,
                );
                let voice =
                    GeminiClient::with_endpoint(http, key, &cfg.gemini_tts_model, &cfg.gemini_endpoint);
                Coach::new(Some(Arc::new(client)), RetryPolicy::default()).with_voice(Arc::new(voice))
            }
            Err(e) => {
                tracing::warn!(error = %e, "HTTP client unavailable, coach runs offline");
                Coach::offline()
            }
        }
    }

    fn ask(&self, prompt: &Prompt) -> Result<String, CallError> {
        let model = self.model.as_ref().ok_or(CallError::MissingKey)?;
        self.policy.run(|| model.generate(prompt))
    }

    /// Reads `text` aloud. Frames are mono at the output sample rate.
    pub fn speak(&self, text: &str) -> Result<Vec<f32>, CallError> {
        let voice = self.voice.as_ref().ok_or(CallError::MissingKey)?;
        let text = text.trim();
        if text.is_empty() {
            return Err(CallError::Other("nothing to say".into()));
        }
        let audio = self.policy.run(|| voice.synthesize(text))?;
        decode_pcm16(&audio).map_err(|e| CallError::Other(e.to_string()))
    }

    pub fn check_in(&self, done: usize, total: usize) -> String {
        let prompt = Prompt {
            system_instruction: CHECKIN_SYSTEM.to_string(),
            contents: format!(
                "User has completed {done} out of {total} daily wins. Generate their check-in message."
            ),
            temperature: 0.8,
            top_p: Some(0.95),
        };
        match self.ask(&prompt) {
            Ok(text) => text,
            Err(CallError::Empty) => {
                "Small wins are proof of momentum. One more iteration today.".to_string()
            }
            Err(e) => {
                tracing::info!(error = %e, "coach check-in degraded to fallback");
                checkin_fallback(done, total).to_string()
            }
        }
    }

    pub fn income_advice(&self, amount: Decimal, currency: &str, priorities: &[String]) -> String {
        let list = if priorities.is_empty() {
            "emergency savings".to_string()
        } else {
            priorities.join(", ")
        };
        let prompt = Prompt {
            system_instruction: INCOME_SYSTEM.to_string(),
            contents: format!(
                "New capital received: {}{}. Targets needing funding: {}.",
                currency,
                amount.normalize(),
                list
            ),
            temperature: 0.7,
            top_p: None,
        };
        match self.ask(&prompt) {
            Ok(text) => text,
            Err(CallError::Empty) => {
                "Capital secured. Fund your foundational needs first to stabilize your focus."
                    .to_string()
            }
            Err(e) => {
                tracing::info!(error = %e, "income advice degraded to fallback");
                income_fallback(priorities)
            }
        }
    }

    pub fn budget_insights(&self, report: &BudgetReport, currency: &str) -> Vec<String> {
        let breakdown: Vec<String> = report
            .lines
            .iter()
            .map(|l| format!("{}: {}", l.label, fmt_money(&l.used, currency)))
            .collect();
        let data = format!(
            "\n- Total Allocated: {}\n- Total Used: {}\n- Savings/Growth Allocation: {}\n- Spending Breakdown: {}\n",
            fmt_money(&report.allocated, currency),
            fmt_money(&report.used, currency),
            fmt_money(&report.growth_allocation, currency),
            serde_json::to_string(&breakdown).unwrap_or_default()
        );
        let prompt = Prompt {
            system_instruction: INSIGHTS_SYSTEM.to_string(),
            contents: format!(
                "Analyze this monthly budget data: {data}. The user has ADHD. Provide 2-3 short, bulleted insights."
            ),
            temperature: 0.7,
            top_p: None,
        };
        match self.ask(&prompt) {
            Ok(text) => {
                let lines = clean_insights(&text);
                if lines.is_empty() {
                    vec!["Keep tracking to see your patterns emerge.".to_string()]
                } else {
                    lines
                }
            }
            Err(CallError::Empty) => vec!["Keep tracking to see your patterns emerge.".to_string()],
            Err(e) => {
                tracing::error!(error = %e, "budget insight error");
                vec![INSIGHTS_FALLBACK.to_string()]
            }
        }
    }
}

/// Re-asks the coach once habit progress settles. Each `notify` restarts the
/// wait; dropping the trigger delivers a pending request.
pub struct CoachTrigger {
    debouncer: Debouncer<(usize, usize)>,
}

impl CoachTrigger {
    pub fn new<F>(coach: Arc<Coach>, delay: Duration, mut on_message: F) -> Self
    where
        F: FnMut(String) + Send + 'static,
    {
        let debouncer = Debouncer::new(delay, move |(done, total): (usize, usize)| {
            on_message(coach.check_in(done, total));
        });
        CoachTrigger { debouncer }
    }

    pub fn notify(&self, done: usize, total: usize) {
        self.debouncer.call((done, total));
    }

    pub fn flush(self) {
        self.debouncer.flush();
    }
}
