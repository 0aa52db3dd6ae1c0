// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Derived numbers for the dashboard. Everything here is a pure function of
//! its inputs and tolerates empty collections.

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::calendar::week_of_month;
use crate::models::*;

pub const BASE_XP: u64 = 11_250;
pub const XP_PER_LEVEL: u64 = 1_000;
pub const DEFAULT_TARGET_PROFIT_PCT: u32 = 10;

/// Length of the run of consecutive completion days ending on `today`, or on
/// the day before when `today` has not been completed yet.
pub fn habit_streak(history: &[NaiveDate], today: NaiveDate) -> u32 {
    let days: BTreeSet<NaiveDate> = history.iter().copied().collect();
    let mut cursor = if days.contains(&today) {
        today
    } else {
        today - Duration::days(1)
    };
    let mut streak = 0;
    while days.contains(&cursor) {
        streak += 1;
        cursor -= Duration::days(1);
    }
    streak
}

/// Wins over total as a ratio in `[0, 1]`.
pub fn win_rate<'a>(trades: impl IntoIterator<Item = &'a Trade>) -> f64 {
    let (mut wins, mut total) = (0u32, 0u32);
    for t in trades {
        total += 1;
        if t.pnl > Decimal::ZERO {
            wins += 1;
        }
    }
    if total == 0 {
        0.0
    } else {
        f64::from(wins) / f64::from(total)
    }
}

pub fn net_pnl<'a>(trades: impl IntoIterator<Item = &'a Trade>) -> Decimal {
    trades.into_iter().map(|t| t.pnl).sum()
}

/// Reward side of a `1:3` style ratio; anything unparsable counts as 0.
pub fn reward_multiple(rr: &str) -> f64 {
    let mut parts = rr.split(':');
    match (parts.next(), parts.next()) {
        (Some(_), Some(reward)) => reward.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    }
}

fn to_f64(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

/// Trades of one account in chronological order.
pub fn account_trades<'a>(trades: &'a [Trade], account_id: &str) -> Vec<&'a Trade> {
    let mut out: Vec<&Trade> = trades
        .iter()
        .filter(|t| t.account_id.as_deref() == Some(account_id))
        .collect();
    out.sort_by_key(|t| t.time);
    out
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountStats {
    pub account_id: String,
    pub name: String,
    pub win_rate: f64,
    pub net_profit: Decimal,
    pub trade_count: usize,
    /// Percent of the profit target reached, clamped to `0..=100`.
    pub progress: f64,
}

pub fn account_stats(accounts: &[TradingAccount], trades: &[Trade]) -> Vec<AccountStats> {
    let mut out: Vec<AccountStats> = accounts
        .iter()
        .map(|acc| {
            let own = account_trades(trades, &acc.id);
            let net = net_pnl(own.iter().copied());
            let initial = acc.initial_phase_balance.unwrap_or(acc.balance - net);
            let pct = acc
                .target_profit_pct
                .unwrap_or(Decimal::from(DEFAULT_TARGET_PROFIT_PCT));
            let target = initial * pct / Decimal::ONE_HUNDRED;
            let progress = if target > Decimal::ZERO {
                (to_f64(net) / to_f64(target) * 100.0).clamp(0.0, 100.0)
            } else {
                0.0
            };
            AccountStats {
                account_id: acc.id.clone(),
                name: acc.name.clone(),
                win_rate: win_rate(own.iter().copied()),
                net_profit: net,
                trade_count: own.len(),
                progress,
            }
        })
        .collect();
    out.sort_by(|a, b| b.net_profit.cmp(&a.net_profit));
    out
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStats {
    pub total_trades: usize,
    pub win_rate: f64,
    pub total_pnl: Decimal,
    pub best_day_pnl: Decimal,
    pub worst_day_pnl: Decimal,
    pub avg_r: f64,
}

fn in_month(t: &Trade, year: i32, month: u32) -> bool {
    let d = t.day();
    d.year() == year && d.month() == month
}

pub fn monthly_stats(trades: &[&Trade], year: i32, month: u32) -> MonthlyStats {
    let month_trades: Vec<&Trade> = trades
        .iter()
        .copied()
        .filter(|t| in_month(t, year, month))
        .collect();
    if month_trades.is_empty() {
        return MonthlyStats::default();
    }

    let mut daily: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for t in &month_trades {
        *daily.entry(t.day()).or_default() += t.pnl;
    }
    let best = daily.values().copied().fold(Decimal::ZERO, Decimal::max);
    let worst = daily.values().copied().fold(Decimal::ZERO, Decimal::min);

    let total_r: f64 = month_trades
        .iter()
        .map(|t| {
            if t.status == TradeStatus::Win {
                reward_multiple(&t.rr)
            } else {
                -1.0
            }
        })
        .sum();

    MonthlyStats {
        total_trades: month_trades.len(),
        win_rate: win_rate(month_trades.iter().copied()),
        total_pnl: net_pnl(month_trades.iter().copied()),
        best_day_pnl: best,
        worst_day_pnl: worst,
        avg_r: total_r / month_trades.len() as f64,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WeekSummary {
    pub week: u32,
    pub pnl: Decimal,
    pub days: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyStats {
    pub weeks: Vec<WeekSummary>,
    pub total_pnl: Decimal,
    pub total_days: usize,
}

pub fn weekly_stats(trades: &[&Trade], year: i32, month: u32) -> WeeklyStats {
    let mut weeks: BTreeMap<u32, (Decimal, BTreeSet<NaiveDate>)> =
        (1..=5).map(|w| (w, (Decimal::ZERO, BTreeSet::new()))).collect();
    let mut all_days = BTreeSet::new();
    let mut total = Decimal::ZERO;

    for t in trades.iter().filter(|t| in_month(t, year, month)) {
        let day = t.day();
        total += t.pnl;
        all_days.insert(day);
        if let Some((pnl, days)) = weeks.get_mut(&week_of_month(day)) {
            *pnl += t.pnl;
            days.insert(day);
        }
    }

    WeeklyStats {
        weeks: weeks
            .into_iter()
            .take(4)
            .map(|(week, (pnl, days))| WeekSummary {
                week,
                pnl,
                days: days.len(),
            })
            .collect(),
        total_pnl: total,
        total_days: all_days.len(),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyEvaluation {
    pub strategy_id: String,
    pub title: String,
    pub total_trades: usize,
    pub win_rate: f64,
    pub total_profit: Decimal,
    pub average_return: Decimal,
    pub avg_r: f64,
    pub best_trade: Decimal,
    pub worst_trade: Decimal,
    pub screenshots: usize,
    pub status: &'static str,
}

pub fn evaluate_strategies(strategies: &[Strategy], trades: &[Trade]) -> Vec<StrategyEvaluation> {
    let mut out: Vec<StrategyEvaluation> = strategies
        .iter()
        .map(|s| {
            let own: Vec<&Trade> = trades
                .iter()
                .filter(|t| t.strategy_id.as_deref() == Some(s.id.as_str()))
                .collect();
            let n = own.len();
            let total = net_pnl(own.iter().copied());
            let total_r: f64 = own.iter().map(|t| reward_multiple(&t.rr)).sum();
            StrategyEvaluation {
                strategy_id: s.id.clone(),
                title: s.title.clone(),
                total_trades: n,
                win_rate: win_rate(own.iter().copied()),
                total_profit: total,
                average_return: if n > 0 {
                    total / Decimal::from(n)
                } else {
                    Decimal::ZERO
                },
                avg_r: if n > 0 { total_r / n as f64 } else { 0.0 },
                best_trade: own.iter().map(|t| t.pnl).max().unwrap_or_default(),
                worst_trade: own.iter().map(|t| t.pnl).min().unwrap_or_default(),
                screenshots: own.iter().filter(|t| t.image.is_some()).count(),
                status: if total < Decimal::ZERO && n >= 3 {
                    "Needs Review"
                } else {
                    "Optimal"
                },
            }
        })
        .collect();
    out.sort_by(|a, b| b.total_profit.cmp(&a.total_profit));
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionView {
    Daily,
    Monthly,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectionPoint {
    pub name: String,
    pub projected: i64,
    pub actual: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub base_capital: Decimal,
    pub points: Vec<ProjectionPoint>,
    pub is_on_track: bool,
    pub today_target: i64,
    pub total_pnl: Decimal,
    pub current_actual: Decimal,
}

pub const MIN_PROJECTION_STEPS: usize = 28;
pub const TRADING_DAYS_PER_MONTH: u32 = 20;

/// Compounding target curve against the realised equity curve.
///
/// `trades` must be chronological. `rate_pct` is the daily growth target in
/// percent. Without an explicit `starting_capital` the base is the account
/// balance minus the realised pnl, or 5000 with no account.
pub fn compounding_projection(
    trades: &[&Trade],
    account: Option<&TradingAccount>,
    starting_capital: Option<Decimal>,
    rate_pct: f64,
    view: ProjectionView,
) -> Projection {
    let total_pnl = net_pnl(trades.iter().copied());
    let base = starting_capital.unwrap_or_else(|| match account {
        Some(a) => a.balance - total_pnl,
        None => Decimal::from(5000),
    });
    let base_f = to_f64(base);
    let rate = rate_pct / 100.0;
    let round = |v: f64| v.round() as i64;

    let mut points = Vec::new();
    match view {
        ProjectionView::Daily => {
            points.push(ProjectionPoint {
                name: "0".into(),
                projected: round(base_f),
                actual: Some(round(base_f)),
            });
            let steps = MIN_PROJECTION_STEPS.max(trades.len() + 5);
            let (mut projected, mut actual) = (base_f, base_f);
            for i in 1..=steps {
                projected *= 1.0 + rate;
                let actual_val = trades.get(i - 1).map(|t| {
                    actual += to_f64(t.pnl);
                    round(actual)
                });
                points.push(ProjectionPoint {
                    name: i.to_string(),
                    projected: round(projected),
                    actual: actual_val,
                });
            }
        }
        ProjectionView::Monthly => {
            let mut groups: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();
            for t in trades {
                let d = t.day();
                *groups.entry((d.year(), d.month())).or_default() += t.pnl;
            }
            points.push(ProjectionPoint {
                name: "Start".into(),
                projected: round(base_f),
                actual: Some(round(base_f)),
            });
            let (mut projected, mut actual) = (base_f, base_f);
            for ((y, m), pnl) in groups {
                for _ in 0..TRADING_DAYS_PER_MONTH {
                    projected *= 1.0 + rate;
                }
                actual += to_f64(pnl);
                let label = NaiveDate::from_ymd_opt(y, m, 1)
                    .map(|d| d.format("%b %y").to_string())
                    .unwrap_or_else(|| format!("{m}/{y}"));
                points.push(ProjectionPoint {
                    name: label,
                    projected: round(projected),
                    actual: Some(round(actual)),
                });
            }
        }
    }

    let current_actual = base + total_pnl;
    let checkpoint = trades.len().min(points.len().saturating_sub(1));
    let projected_now = points
        .get(checkpoint)
        .map(|p| p.projected)
        .unwrap_or_else(|| round(base_f));
    let current_f = to_f64(current_actual);

    Projection {
        base_capital: base,
        is_on_track: current_f >= projected_now as f64,
        today_target: round(current_f * rate),
        total_pnl,
        current_actual,
        points,
    }
}

pub const DEFAULT_GREETING_NAME: &str = "PDTrades";

const GREET_STANDARD: &[&str] = &[
    "Hi, hello {NAME} 👋",
    "Welcome back, {NAME}",
    "Good to see you, {NAME}",
    "Let’s cook today, {NAME}",
    "Locked in, {NAME}?",
];
const GREET_LANGUAGES: &[&str] = &[
    "Hola, {NAME} 🇪🇸",
    "Bonjour, {NAME} 🇫🇷",
    "Sawubona, {NAME} 🇿🇦",
    "Dumela, {NAME}",
    "Hallo, {NAME} 🇩🇪",
    "Ciao, {NAME} 🇮🇹",
    "Konnichiwa, {NAME} 🇯🇵",
    "Molo, {NAME}",
];
const GREET_GREEN: &[&str] = &[
    "Looking good, {NAME} 🔥",
    "Clean execution, {NAME}",
    "Discipline paying off, {NAME}",
    "That’s how pros move, {NAME}",
];
const GREET_DRAWDOWN: &[&str] = &[
    "Stay sharp, {NAME}",
    "Protect the capital, {NAME}",
    "Reset. Refocus. Reload, {NAME}",
    "Process over emotion, {NAME}",
];
const GREET_FLAT: &[&str] = &[
    "Patience wins, {NAME}",
    "No rush, {NAME}",
    "Wait for your setup, {NAME}",
];

/// How the trading day is going, as far as the greeting cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TradingMood {
    NoTrades,
    Green,
    Drawdown,
    Flat,
}

pub fn trading_mood(trades: &[Trade], today: NaiveDate) -> TradingMood {
    let todays: Vec<&Trade> = trades.iter().filter(|t| t.day() == today).collect();
    if todays.is_empty() {
        return TradingMood::NoTrades;
    }
    let pnl = net_pnl(todays);
    if pnl > Decimal::ZERO {
        TradingMood::Green
    } else if pnl < Decimal::ZERO {
        TradingMood::Drawdown
    } else {
        TradingMood::Flat
    }
}

pub fn greeting_pool(mood: TradingMood) -> Vec<&'static str> {
    match mood {
        TradingMood::Green => GREET_GREEN.to_vec(),
        TradingMood::Drawdown => GREET_DRAWDOWN.to_vec(),
        TradingMood::Flat => GREET_FLAT.to_vec(),
        TradingMood::NoTrades => [GREET_STANDARD, GREET_LANGUAGES, GREET_FLAT].concat(),
    }
}

/// Picks entry `pick` (wrapping) from the mood's pool and fills in the name.
pub fn greeting(mood: TradingMood, pick: usize, name: Option<&str>) -> String {
    let pool = greeting_pool(mood);
    let name = name.unwrap_or(DEFAULT_GREETING_NAME);
    pool[pick % pool.len()].replace("{NAME}", name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusStats {
    pub level: u64,
    pub xp: u64,
    pub xp_to_next: u64,
    pub total_xp: u64,
}

pub fn focus_stats(
    wins: &[Win],
    tasks: &[ScheduleTask],
    trades: &[Trade],
    habits: &[MasteryHabit],
) -> FocusStats {
    let completed_wins = wins.iter().filter(|w| w.completed).count() as u64;
    let completed_tasks = tasks.iter().filter(|t| t.completed).count() as u64;
    let mastery: u64 = habits.iter().map(|h| u64::from(h.progress)).sum();
    let total = BASE_XP
        + completed_wins * 100
        + completed_tasks * 150
        + trades.len() as u64 * 500
        + mastery * 250;
    FocusStats {
        level: total / XP_PER_LEVEL,
        xp: total % XP_PER_LEVEL,
        xp_to_next: XP_PER_LEVEL,
        total_xp: total,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GrowthStage {
    Seed,
    Sprout,
    Sapling,
    Palm,
    Bloomed,
}

impl GrowthStage {
    pub fn from_pct(pct: f64) -> Self {
        if pct >= 100.0 {
            GrowthStage::Bloomed
        } else if pct >= 76.0 {
            GrowthStage::Palm
        } else if pct >= 51.0 {
            GrowthStage::Sapling
        } else if pct >= 26.0 {
            GrowthStage::Sprout
        } else {
            GrowthStage::Seed
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            GrowthStage::Seed => "🌱",
            GrowthStage::Sprout => "🌿",
            GrowthStage::Sapling => "🌳",
            GrowthStage::Palm => "🌴",
            GrowthStage::Bloomed => "🌺",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GardenProgress {
    pub filled: usize,
    pub total: usize,
    pub saved: Decimal,
    pub possible: Decimal,
    pub pct: f64,
    pub stage: GrowthStage,
}

impl GardenProgress {
    pub fn label(&self) -> String {
        if self.stage == GrowthStage::Bloomed {
            "Fully Bloomed!".to_string()
        } else {
            format!("{} of {} Envelopes Filled", self.filled, self.total)
        }
    }
}

pub fn garden(envelopes: &[Envelope]) -> GardenProgress {
    let filled = envelopes.iter().filter(|e| e.completed).count();
    let total = envelopes.len();
    let pct = if total > 0 {
        filled as f64 / total as f64 * 100.0
    } else {
        0.0
    };
    GardenProgress {
        filled,
        total,
        saved: envelopes.iter().filter(|e| e.completed).map(|e| e.value).sum(),
        possible: envelopes.iter().map(|e| e.value).sum(),
        pct,
        stage: GrowthStage::from_pct(pct),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillProgress {
    pub skill_id: String,
    pub name: String,
    pub practiced: u32,
    pub target: u32,
    pub pct: f64,
    pub remaining: u32,
    pub mastered: bool,
}

pub fn skill_progress(skill: &Skill) -> SkillProgress {
    let practiced: u32 = skill.practice_log.iter().map(|e| e.time_spent).sum();
    let raw = if skill.target_time > 0 {
        f64::from(practiced) / f64::from(skill.target_time) * 100.0
    } else {
        0.0
    };
    SkillProgress {
        skill_id: skill.id.clone(),
        name: skill.skill_name.clone(),
        practiced,
        target: skill.target_time,
        pct: raw.min(100.0),
        remaining: skill.target_time.saturating_sub(practiced),
        mastered: raw >= 100.0,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCompletion {
    pub date: NaiveDate,
    pub completed: usize,
    pub total: usize,
    pub pct: f64,
}

/// Habit completion for the Sunday-first week containing `today`, read from
/// the completion histories. Days after `today` count as zero.
pub fn habit_week(wins: &[Win], today: NaiveDate) -> (Vec<DayCompletion>, u32) {
    let start = today - Duration::days(i64::from(today.weekday().num_days_from_sunday()));
    let total = wins.len();
    let days: Vec<DayCompletion> = (0..7)
        .map(|i| {
            let date = start + Duration::days(i);
            let completed = if date > today {
                0
            } else {
                wins.iter()
                    .filter(|w| w.completion_history.contains(&date))
                    .count()
            };
            let pct = if total > 0 {
                completed as f64 / total as f64 * 100.0
            } else {
                0.0
            };
            DayCompletion {
                date,
                completed,
                total,
                pct,
            }
        })
        .collect();
    let avg = (days.iter().map(|d| d.pct).sum::<f64>() / 7.0).round() as u32;
    (days, avg)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketLine {
    pub bucket_id: String,
    pub label: String,
    pub category: &'static str,
    pub total: Decimal,
    pub remaining: Decimal,
    pub used: Decimal,
    pub used_pct: f64,
    pub sub_allocated: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetReport {
    pub allocated: Decimal,
    pub used: Decimal,
    pub remaining: Decimal,
    pub growth_allocation: Decimal,
    pub income: Decimal,
    pub spent: Decimal,
    pub lines: Vec<BucketLine>,
}

pub fn budget_report(buckets: &[BudgetBucket], expenses: &[Expense], income: &[Income]) -> BudgetReport {
    let lines: Vec<BucketLine> = buckets
        .iter()
        .map(|b| {
            let used = b.total - b.remaining;
            BucketLine {
                bucket_id: b.id.clone(),
                label: b.label.clone(),
                category: b.category.label(),
                total: b.total,
                remaining: b.remaining,
                used,
                used_pct: if b.total > Decimal::ZERO {
                    to_f64(used) / to_f64(b.total) * 100.0
                } else {
                    0.0
                },
                sub_allocated: b.sub_allocations.iter().map(|s| s.amount).sum(),
            }
        })
        .collect();
    BudgetReport {
        allocated: buckets.iter().map(|b| b.total).sum(),
        used: lines.iter().map(|l| l.used).sum(),
        remaining: buckets.iter().map(|b| b.remaining).sum(),
        growth_allocation: buckets
            .iter()
            .filter(|b| b.category == BucketCategory::WealthGrowth)
            .map(|b| b.total)
            .sum(),
        income: income.iter().map(|i| i.amount).sum(),
        spent: expenses.iter().map(|e| e.amount).sum(),
        lines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn streak_counts_back_from_yesterday_when_today_open() {
        let h = [d(2024, 1, 1), d(2024, 1, 2)];
        assert_eq!(habit_streak(&h, d(2024, 1, 3)), 2);
        assert_eq!(habit_streak(&h, d(2024, 1, 4)), 0);
        assert_eq!(habit_streak(&[], d(2024, 1, 4)), 0);
    }

    #[test]
    fn reward_multiple_reads_right_hand_side() {
        assert_eq!(reward_multiple("1:3"), 3.0);
        assert_eq!(reward_multiple("1:1.5"), 1.5);
        assert_eq!(reward_multiple("3"), 0.0);
        assert_eq!(reward_multiple("1:x"), 0.0);
    }

    #[test]
    fn seed_focus_level() {
        let s = crate::state::AppState::default();
        let f = focus_stats(&s.wins, &s.tasks, &s.trades, &s.mastery_habits);
        // 11250 + 1 task*150 + 2 trades*500 + 4 progress*250
        assert_eq!(f.total_xp, 13_400);
        assert_eq!(f.level, 13);
        assert_eq!(f.xp, 400);
    }

    #[test]
    fn growth_stage_thresholds() {
        assert_eq!(GrowthStage::from_pct(25.0), GrowthStage::Seed);
        assert_eq!(GrowthStage::from_pct(26.0), GrowthStage::Sprout);
        assert_eq!(GrowthStage::from_pct(51.0), GrowthStage::Sapling);
        assert_eq!(GrowthStage::from_pct(76.0), GrowthStage::Palm);
        assert_eq!(GrowthStage::from_pct(100.0), GrowthStage::Bloomed);
    }
}
