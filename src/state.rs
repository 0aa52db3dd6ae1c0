// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use serde::{Deserialize, Serialize};

use crate::models::*;
use crate::seed;

/// Everything the hub persists under the single state key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub wins: Vec<Win>,
    pub mastery_habits: Vec<MasteryHabit>,
    pub trades: Vec<Trade>,
    pub strategies: Vec<Strategy>,
    pub accounts: Vec<TradingAccount>,
    pub envelopes: Vec<Envelope>,
    pub tasks: Vec<ScheduleTask>,
    pub letters: Vec<FutureLetter>,
    pub currency: String,
    pub buckets: Vec<BudgetBucket>,
    pub expenses: Vec<Expense>,
    pub income_records: Vec<Income>,
    pub skills: Vec<Skill>,
    pub projects: Vec<PipelineProject>,
    pub hearted_scriptures: Vec<Devotion>,
    pub budget_mantra: String,
}

impl Default for AppState {
    fn default() -> Self {
        AppState {
            wins: seed::wins(),
            mastery_habits: seed::mastery_habits(),
            trades: seed::trades(),
            strategies: seed::strategies(),
            accounts: seed::accounts(),
            envelopes: seed::envelopes(),
            tasks: seed::tasks(),
            letters: seed::letters(),
            currency: "$".to_string(),
            buckets: seed::buckets(),
            expenses: Vec::new(),
            income_records: Vec::new(),
            skills: seed::skills(),
            projects: seed::projects(),
            hearted_scriptures: Vec::new(),
            budget_mantra: seed::DEFAULT_MANTRA.to_string(),
        }
    }
}

impl AppState {
    /// A state with every collection empty, used as a clean slate by `init --empty`.
    pub fn empty() -> Self {
        AppState {
            wins: Vec::new(),
            mastery_habits: Vec::new(),
            trades: Vec::new(),
            strategies: Vec::new(),
            accounts: Vec::new(),
            envelopes: seed::envelopes(),
            tasks: Vec::new(),
            letters: Vec::new(),
            currency: "$".to_string(),
            buckets: Vec::new(),
            expenses: Vec::new(),
            income_records: Vec::new(),
            skills: Vec::new(),
            projects: Vec::new(),
            hearted_scriptures: Vec::new(),
            budget_mantra: seed::DEFAULT_MANTRA.to_string(),
        }
    }

    pub fn account(&self, id: &str) -> Option<&TradingAccount> {
        self.accounts.iter().find(|a| a.id == id)
    }

    pub fn primary_account(&self) -> Option<&TradingAccount> {
        self.accounts
            .iter()
            .find(|a| a.is_primary)
            .or_else(|| self.accounts.first())
    }

    pub fn strategy(&self, id: &str) -> Option<&Strategy> {
        self.strategies.iter().find(|s| s.id == id)
    }
}
