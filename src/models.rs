// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::utils::{hhmm, hhmm_opt, trade_time};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Win {
    pub id: String,
    pub label: String,
    pub icon: String,
    #[serde(default)]
    pub completed: bool,
    pub color: String,
    #[serde(default)]
    pub streak: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_icon: Option<String>,
    #[serde(default)]
    pub completion_history: Vec<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryHabit {
    pub id: String,
    pub label: String,
    pub icon: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub progress: u32,
    pub total: u32,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>, // minutes
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub id: u32,
    pub value: Decimal,
    pub completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Urgent,
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "urgent" => Some(Priority::Urgent),
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Urgent => "urgent",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketType {
    Need,
    Want,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BucketCategory {
    #[serde(rename = "Wealth & Growth")]
    WealthGrowth,
    Stability,
    Lifestyle,
    Learning,
}

impl BucketCategory {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "wealth" | "growth" | "wealth & growth" | "wealth-growth" => {
                Some(BucketCategory::WealthGrowth)
            }
            "stability" => Some(BucketCategory::Stability),
            "lifestyle" => Some(BucketCategory::Lifestyle),
            "learning" => Some(BucketCategory::Learning),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BucketCategory::WealthGrowth => "Wealth & Growth",
            BucketCategory::Stability => "Stability",
            BucketCategory::Lifestyle => "Lifestyle",
            BucketCategory::Learning => "Learning",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubAllocation {
    pub id: String,
    pub name: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetBucket {
    pub id: String,
    pub label: String,
    pub icon: String,
    pub remaining: Decimal,
    pub total: Decimal,
    pub color: String,
    pub priority: Priority,
    pub r#type: BucketType,
    pub category: BucketCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_icon: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_allocations: Vec<SubAllocation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub date: NaiveDate,
    pub category_id: String,
    pub category_label: String,
    pub description: String,
    pub amount: Decimal,
    pub payment_type: String,
    pub is_planned: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Income {
    pub id: String,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleTask {
    pub id: String,
    pub title: String,
    #[serde(with = "hhmm")]
    pub time_start: NaiveTime,
    #[serde(default, with = "hhmm_opt", skip_serializing_if = "Option::is_none")]
    pub time_end: Option<NaiveTime>,
    pub priority: Priority,
    pub completed: bool,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl ScheduleTask {
    /// Tasks without a date belong to whichever day is "today".
    pub fn day(&self, today: NaiveDate) -> NaiveDate {
        self.date.unwrap_or(today)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountKind {
    Live,
    #[serde(rename = "Prop Firm")]
    PropFirm,
    Demo,
}

impl AccountKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(['-', '_'], " ").as_str() {
            "live" => Some(AccountKind::Live),
            "prop" | "prop firm" | "propfirm" => Some(AccountKind::PropFirm),
            "demo" => Some(AccountKind::Demo),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AccountKind::Live => "Live",
            AccountKind::PropFirm => "Prop Firm",
            AccountKind::Demo => "Demo",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    #[serde(rename = "Phase 1")]
    Phase1,
    #[serde(rename = "Phase 2")]
    Phase2,
    Funded,
}

impl Phase {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "1" | "phase1" => Some(Phase::Phase1),
            "2" | "phase2" => Some(Phase::Phase2),
            "funded" | "3" | "phase3" => Some(Phase::Funded),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Phase::Phase1 => "Phase 1",
            Phase::Phase2 => "Phase 2",
            Phase::Funded => "Funded",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingAccount {
    pub id: String,
    pub name: String,
    pub r#type: AccountKind,
    pub balance: Decimal,
    pub currency: String,
    pub is_primary: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<Phase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_profit_pct: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_drawdown_pct: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_drawdown_pct: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_phase_balance: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase1_target: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase2_target: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase3_target: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equity: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_of_day_balance: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highest_equity: Option<Decimal>,
}

impl TradingAccount {
    pub fn new(id: &str, name: &str, kind: AccountKind, balance: Decimal, currency: &str) -> Self {
        TradingAccount {
            id: id.to_string(),
            name: name.to_string(),
            r#type: kind,
            balance,
            currency: currency.to_string(),
            is_primary: false,
            phase: None,
            target_profit_pct: None,
            daily_drawdown_pct: None,
            max_drawdown_pct: None,
            initial_phase_balance: None,
            phase1_target: None,
            phase2_target: None,
            phase3_target: None,
            equity: None,
            start_of_day_balance: None,
            highest_equity: None,
        }
    }

    pub fn is_prop_firm(&self) -> bool {
        self.r#type == AccountKind::PropFirm
    }

    /// Floating equity; the balance stands in when no live equity was recorded.
    pub fn current_equity(&self) -> Decimal {
        self.equity.unwrap_or(self.balance)
    }

    pub fn start_of_day(&self) -> Decimal {
        self.start_of_day_balance.unwrap_or(self.balance)
    }

    pub fn peak_equity(&self) -> Decimal {
        self.highest_equity.unwrap_or_else(|| self.current_equity())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "long" | "buy" => Some(Direction::Long),
            "short" | "sell" => Some(Direction::Short),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeStatus {
    Win,
    Loss,
    Breakeven,
}

impl TradeStatus {
    pub fn from_pnl(pnl: Decimal) -> Self {
        if pnl > Decimal::ZERO {
            TradeStatus::Win
        } else if pnl < Decimal::ZERO {
            TradeStatus::Loss
        } else {
            TradeStatus::Breakeven
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mood {
    Confident,
    Hesitant,
    Overconfident,
    Disciplined,
    Emotional,
}

impl Mood {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "confident" => Some(Mood::Confident),
            "hesitant" => Some(Mood::Hesitant),
            "overconfident" => Some(Mood::Overconfident),
            "disciplined" => Some(Mood::Disciplined),
            "emotional" => Some(Mood::Emotional),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Session {
    London,
    #[serde(rename = "New York")]
    NewYork,
    Asia,
    Sydney,
}

impl Session {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace(['-', '_'], " ").as_str() {
            "london" => Some(Session::London),
            "new york" | "newyork" | "ny" => Some(Session::NewYork),
            "asia" => Some(Session::Asia),
            "sydney" => Some(Session::Sydney),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reflection {
    pub wrong: String,
    pub right: String,
    pub improve: String,
    #[serde(default)]
    pub additional: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: String,
    pub pair: String,
    pub r#type: Direction,
    #[serde(default)]
    pub entry: Decimal,
    pub pnl: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(with = "trade_time")]
    pub time: NaiveDateTime,
    pub rr: String,
    pub status: TradeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<Mood>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<Session>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reflection: Option<Reflection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>, // base64 data url
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
}

impl Trade {
    pub fn day(&self) -> NaiveDate {
        self.time.date()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strategy {
    pub id: String,
    pub title: String,
    pub description: String,
    pub tag: String,
    #[serde(default)]
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_criteria: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_model: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FutureLetter {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: NaiveDate,
    pub unlock_date: NaiveDate,
    #[serde(default)]
    pub is_locked: bool,
}

impl FutureLetter {
    /// The stored flag is only a snapshot; the date decides.
    pub fn is_locked_on(&self, today: NaiveDate) -> bool {
        self.unlock_date > today
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeEntry {
    pub id: String,
    pub date: NaiveDate,
    pub notes: String,
    pub time_spent: u32, // minutes
    #[serde(default)]
    pub achievements: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: String,
    pub skill_name: String,
    pub target_time: u32, // minutes
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub practice_log: Vec<PracticeEntry>,
    pub icon: String,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Idea,
    Active,
    Done,
}

impl ProjectStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "idea" => Some(ProjectStatus::Idea),
            "active" => Some(ProjectStatus::Active),
            "done" => Some(ProjectStatus::Done),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineProject {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: ProjectStatus,
    pub category: String,
    pub progress: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Devotion {
    #[serde(rename = "ref")]
    pub reference: String,
    pub verse: String,
    pub reflection: String,
}
