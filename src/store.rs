// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Single-owner state container.
//!
//! Commands never touch [`AppState`] directly: they dispatch a typed [`Action`],
//! the matching reducer validates and mutates one slice, and every successful
//! dispatch publishes a snapshot to the subscribers. Autosave is one such
//! subscriber, draining the channel through a trailing debounce.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::error::HubError;
use crate::metrics::habit_streak;
use crate::models::*;
use crate::state::AppState;
use crate::storage::{StoragePort, save_state};

pub const AUTOSAVE_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub enum Action {
    Habit(HabitAction),
    Mastery(MasteryAction),
    Trade(TradeAction),
    Account(AccountAction),
    Strategy(StrategyAction),
    Envelope(EnvelopeAction),
    Budget(BudgetAction),
    Task(TaskAction),
    Letter(LetterAction),
    Skill(SkillAction),
    Project(ProjectAction),
    Scripture(ScriptureAction),
    /// Swap in a whole state, e.g. after a gist restore.
    Replace(Box<AppState>),
}

#[derive(Debug, Clone)]
pub enum HabitAction {
    Add(Win),
    Toggle {
        id: String,
        on: NaiveDate,
        today: NaiveDate,
    },
    Update { id: String, patch: WinPatch },
    Delete { id: String },
    /// Re-derive `completed` and `streak` from the histories for a new day.
    SyncDay { today: NaiveDate },
}

#[derive(Debug, Clone, Default)]
pub struct WinPatch {
    pub label: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub custom_icon: Option<String>,
}

#[derive(Debug, Clone)]
pub enum MasteryAction {
    Add(MasteryHabit),
    Increment { id: String },
    Update { id: String, patch: MasteryPatch },
    Delete { id: String },
}

#[derive(Debug, Clone, Default)]
pub struct MasteryPatch {
    pub label: Option<String>,
    pub subject: Option<String>,
    pub duration: Option<u32>,
    pub total: Option<u32>,
}

#[derive(Debug, Clone)]
pub enum TradeAction {
    Add(Trade),
    Delete { id: String },
    Reflect { id: String, reflection: Reflection },
}

#[derive(Debug, Clone)]
pub enum AccountAction {
    Add(TradingAccount),
    Update { id: String, patch: AccountPatch },
    Select { id: String },
    Delete { id: String },
}

#[derive(Debug, Clone, Default)]
pub struct AccountPatch {
    pub name: Option<String>,
    pub balance: Option<Decimal>,
    pub currency: Option<String>,
    pub phase: Option<Phase>,
    pub target_profit_pct: Option<Decimal>,
    pub daily_drawdown_pct: Option<Decimal>,
    pub max_drawdown_pct: Option<Decimal>,
    pub initial_phase_balance: Option<Decimal>,
    pub phase1_target: Option<Decimal>,
    pub phase2_target: Option<Decimal>,
    pub phase3_target: Option<Decimal>,
    pub equity: Option<Decimal>,
    pub start_of_day_balance: Option<Decimal>,
    pub highest_equity: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub enum StrategyAction {
    Add(Strategy),
    Update { id: String, patch: StrategyPatch },
    Delete { id: String },
}

#[derive(Debug, Clone, Default)]
pub struct StrategyPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tag: Option<String>,
    pub notes: Option<String>,
    pub market_condition: Option<String>,
    pub timeframe: Option<String>,
    pub entry_criteria: Option<String>,
    pub risk_model: Option<String>,
}

#[derive(Debug, Clone)]
pub enum EnvelopeAction {
    Toggle { id: u32 },
    Reset,
}

#[derive(Debug, Clone)]
pub enum BudgetAction {
    AddBucket(BudgetBucket),
    UpdateBucket { id: String, patch: BucketPatch },
    DeleteBucket { id: String },
    Allocate { bucket_id: String, sub: SubAllocation },
    Unallocate { bucket_id: String, sub_id: String },
    AddExpense(Expense),
    DeleteExpense { id: String },
    AddIncome(Income),
    DeleteIncome { id: String },
    SetCurrency(String),
    SetMantra(String),
}

#[derive(Debug, Clone, Default)]
pub struct BucketPatch {
    pub label: Option<String>,
    pub icon: Option<String>,
    pub total: Option<Decimal>,
    pub remaining: Option<Decimal>,
    pub priority: Option<Priority>,
    pub r#type: Option<BucketType>,
    pub category: Option<BucketCategory>,
}

#[derive(Debug, Clone)]
pub enum TaskAction {
    Add(ScheduleTask),
    Toggle { id: String },
    Delete { id: String },
}

#[derive(Debug, Clone)]
pub enum LetterAction {
    Add(FutureLetter),
    Delete { id: String },
}

#[derive(Debug, Clone)]
pub enum SkillAction {
    Add(Skill),
    SetGoal { id: String, goal: Option<String> },
    Delete { id: String },
    LogPractice { skill_id: String, entry: PracticeEntry },
}

#[derive(Debug, Clone)]
pub enum ProjectAction {
    Add(PipelineProject),
    Update {
        id: String,
        status: Option<ProjectStatus>,
        progress: Option<u32>,
    },
    Delete { id: String },
}

#[derive(Debug, Clone)]
pub enum ScriptureAction {
    ToggleHeart(Devotion),
}

pub struct Store {
    state: AppState,
    subscribers: Vec<Sender<AppState>>,
    autosave: Option<JoinHandle<()>>,
}

impl Store {
    pub fn new(state: AppState) -> Self {
        Store {
            state,
            subscribers: Vec::new(),
            autosave: None,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Every successful dispatch sends a snapshot down the returned channel.
    pub fn subscribe(&mut self) -> Receiver<AppState> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Persists the state `delay` after the last change. Dropping the store
    /// flushes a save that is still pending.
    pub fn enable_autosave(&mut self, storage: Arc<dyn StoragePort + Send + Sync>, delay: Duration) {
        let rx = self.subscribe();
        let handle = spawn_debounced(rx, delay, move |state: AppState| {
            match save_state(storage.as_ref(), &state) {
                Ok(()) => tracing::debug!("state saved"),
                Err(e) => tracing::error!(error = %e, "autosave failed"),
            }
        });
        self.autosave = Some(handle);
    }

    pub fn dispatch(&mut self, action: Action) -> Result<(), HubError> {
        tracing::trace!(?action, "dispatch");
        // Reducers work on a copy so a rejected action leaves no partial edit.
        let mut next = self.state.clone();
        let s = &mut next;
        match action {
            Action::Habit(a) => reduce_habits(s, a)?,
            Action::Mastery(a) => reduce_mastery(s, a)?,
            Action::Trade(a) => reduce_trades(s, a)?,
            Action::Account(a) => reduce_accounts(s, a)?,
            Action::Strategy(a) => reduce_strategies(s, a)?,
            Action::Envelope(a) => reduce_envelopes(s, a)?,
            Action::Budget(a) => reduce_budget(s, a)?,
            Action::Task(a) => reduce_tasks(s, a)?,
            Action::Letter(a) => reduce_letters(s, a)?,
            Action::Skill(a) => reduce_skills(s, a)?,
            Action::Project(a) => reduce_projects(s, a)?,
            Action::Scripture(a) => reduce_scriptures(s, a),
            Action::Replace(replacement) => *s = *replacement,
        }
        self.state = next;
        self.publish();
        Ok(())
    }

    fn publish(&mut self) {
        let snapshot = &self.state;
        self.subscribers.retain(|tx| tx.send(snapshot.clone()).is_ok());
    }

    /// Drops every subscriber and waits for the autosave worker to finish.
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.subscribers.clear();
        if let Some(h) = self.autosave.take() {
            if h.join().is_err() {
                tracing::error!("autosave worker panicked");
            }
        }
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn require(value: &str, what: &'static str) -> Result<(), HubError> {
    if value.trim().is_empty() {
        Err(HubError::Empty(what))
    } else {
        Ok(())
    }
}

fn find_mut<'a, T>(
    items: &'a mut [T],
    kind: &'static str,
    id: &str,
    key: impl Fn(&T) -> &str,
) -> Result<&'a mut T, HubError> {
    items
        .iter_mut()
        .find(|x| key(x) == id)
        .ok_or_else(|| HubError::not_found(kind, id))
}

fn remove_by<T>(
    items: &mut Vec<T>,
    kind: &'static str,
    id: &str,
    key: impl Fn(&T) -> &str,
) -> Result<T, HubError> {
    let pos = items
        .iter()
        .position(|x| key(x) == id)
        .ok_or_else(|| HubError::not_found(kind, id))?;
    Ok(items.remove(pos))
}

fn reduce_habits(s: &mut AppState, a: HabitAction) -> Result<(), HubError> {
    match a {
        HabitAction::Add(mut w) => {
            require(&w.label, "habit label")?;
            w.completion_history.sort();
            w.completion_history.dedup();
            s.wins.push(w);
        }
        HabitAction::Toggle { id, on, today } => {
            let w = find_mut(&mut s.wins, "habit", &id, |w| w.id.as_str())?;
            if let Some(pos) = w.completion_history.iter().position(|d| *d == on) {
                w.completion_history.remove(pos);
            } else {
                w.completion_history.push(on);
                w.completion_history.sort();
            }
            w.completed = w.completion_history.contains(&today);
            w.streak = habit_streak(&w.completion_history, today);
        }
        HabitAction::Update { id, patch } => {
            let w = find_mut(&mut s.wins, "habit", &id, |w| w.id.as_str())?;
            if let Some(label) = patch.label {
                require(&label, "habit label")?;
                w.label = label;
            }
            if let Some(icon) = patch.icon {
                w.icon = icon;
            }
            if let Some(color) = patch.color {
                w.color = color;
            }
            if patch.custom_icon.is_some() {
                w.custom_icon = patch.custom_icon;
            }
        }
        HabitAction::Delete { id } => {
            remove_by(&mut s.wins, "habit", &id, |w| w.id.as_str())?;
        }
        HabitAction::SyncDay { today } => {
            for w in &mut s.wins {
                w.completed = w.completion_history.contains(&today);
                w.streak = habit_streak(&w.completion_history, today);
            }
        }
    }
    Ok(())
}

fn reduce_mastery(s: &mut AppState, a: MasteryAction) -> Result<(), HubError> {
    match a {
        MasteryAction::Add(h) => {
            require(&h.label, "habit label")?;
            if h.total == 0 {
                return Err(HubError::invalid("total", "must be at least 1"));
            }
            s.mastery_habits.push(h);
        }
        MasteryAction::Increment { id } => {
            let h = find_mut(&mut s.mastery_habits, "mastery habit", &id, |h| h.id.as_str())?;
            h.progress = if h.progress < h.total { h.progress + 1 } else { 0 };
        }
        MasteryAction::Update { id, patch } => {
            let h = find_mut(&mut s.mastery_habits, "mastery habit", &id, |h| h.id.as_str())?;
            if let Some(label) = patch.label {
                require(&label, "habit label")?;
                h.label = label;
            }
            if patch.subject.is_some() {
                h.subject = patch.subject;
            }
            if patch.duration.is_some() {
                h.duration = patch.duration;
            }
            if let Some(total) = patch.total {
                if total == 0 {
                    return Err(HubError::invalid("total", "must be at least 1"));
                }
                h.total = total;
                h.progress = h.progress.min(total);
            }
        }
        MasteryAction::Delete { id } => {
            remove_by(&mut s.mastery_habits, "mastery habit", &id, |h| h.id.as_str())?;
        }
    }
    Ok(())
}

fn reduce_trades(s: &mut AppState, a: TradeAction) -> Result<(), HubError> {
    match a {
        TradeAction::Add(t) => {
            require(&t.pair, "pair")?;
            require(&t.rr, "risk/reward")?;
            if let Some(acc_id) = &t.account_id {
                let acc = s
                    .accounts
                    .iter_mut()
                    .find(|a| &a.id == acc_id)
                    .ok_or_else(|| HubError::UnknownAccount(acc_id.clone()))?;
                acc.balance += t.pnl;
            }
            s.trades.insert(0, t);
        }
        TradeAction::Delete { id } => {
            let t = remove_by(&mut s.trades, "trade", &id, |t| t.id.as_str())?;
            if let Some(acc_id) = &t.account_id {
                if let Some(acc) = s.accounts.iter_mut().find(|a| &a.id == acc_id) {
                    acc.balance -= t.pnl;
                }
            }
        }
        TradeAction::Reflect { id, reflection } => {
            let t = find_mut(&mut s.trades, "trade", &id, |t| t.id.as_str())?;
            t.reflection = Some(reflection);
        }
    }
    Ok(())
}

fn reduce_accounts(s: &mut AppState, a: AccountAction) -> Result<(), HubError> {
    match a {
        AccountAction::Add(mut acc) => {
            require(&acc.name, "account name")?;
            if acc.balance < Decimal::ZERO {
                return Err(HubError::invalid("balance", "must not be negative"));
            }
            check_pcts(
                acc.target_profit_pct,
                acc.daily_drawdown_pct,
                acc.max_drawdown_pct,
            )?;
            if s.accounts.iter().any(|a| a.id == acc.id) {
                return Err(HubError::invalid("id", format!("'{}' already exists", acc.id)));
            }
            if s.accounts.is_empty() {
                acc.is_primary = true;
            }
            if acc.is_primary {
                for other in &mut s.accounts {
                    other.is_primary = false;
                }
            }
            s.accounts.push(acc);
        }
        AccountAction::Update { id, patch } => {
            let acc = find_mut(&mut s.accounts, "account", &id, |a| a.id.as_str())?;
            apply_account_patch(acc, patch)?;
        }
        AccountAction::Select { id } => {
            if !s.accounts.iter().any(|a| a.id == id) {
                return Err(HubError::not_found("account", id));
            }
            for acc in &mut s.accounts {
                acc.is_primary = acc.id == id;
            }
        }
        AccountAction::Delete { id } => {
            remove_by(&mut s.accounts, "account", &id, |a| a.id.as_str())?;
            if !s.accounts.iter().any(|a| a.is_primary) {
                if let Some(first) = s.accounts.first_mut() {
                    first.is_primary = true;
                }
            }
            s.trades.retain(|t| t.account_id.as_deref() != Some(id.as_str()));
        }
    }
    Ok(())
}

fn check_pcts(
    target: Option<Decimal>,
    daily: Option<Decimal>,
    max: Option<Decimal>,
) -> Result<(), HubError> {
    for (field, pct) in [
        ("targetProfitPct", target),
        ("dailyDrawdownPct", daily),
        ("maxDrawdownPct", max),
    ] {
        if let Some(v) = pct {
            if v <= Decimal::ZERO || v > Decimal::ONE_HUNDRED {
                return Err(HubError::invalid(field, "must be within (0, 100]"));
            }
        }
    }
    Ok(())
}

fn apply_account_patch(acc: &mut TradingAccount, p: AccountPatch) -> Result<(), HubError> {
    if let Some(name) = p.name {
        require(&name, "account name")?;
        acc.name = name;
    }
    check_pcts(p.target_profit_pct, p.daily_drawdown_pct, p.max_drawdown_pct)?;
    if let Some(v) = p.balance {
        acc.balance = v;
    }
    if let Some(v) = p.currency {
        acc.currency = v;
    }
    if p.phase.is_some() {
        acc.phase = p.phase;
    }
    macro_rules! set_opt {
        ($($f:ident),*) => { $( if p.$f.is_some() { acc.$f = p.$f; } )* };
    }
    set_opt!(
        target_profit_pct,
        daily_drawdown_pct,
        max_drawdown_pct,
        initial_phase_balance,
        phase1_target,
        phase2_target,
        phase3_target,
        equity,
        start_of_day_balance,
        highest_equity
    );
    Ok(())
}

fn reduce_strategies(s: &mut AppState, a: StrategyAction) -> Result<(), HubError> {
    match a {
        StrategyAction::Add(st) => {
            require(&st.title, "strategy title")?;
            s.strategies.insert(0, st);
        }
        StrategyAction::Update { id, patch } => {
            let st = find_mut(&mut s.strategies, "strategy", &id, |x| x.id.as_str())?;
            if let Some(title) = patch.title {
                require(&title, "strategy title")?;
                st.title = title;
            }
            if let Some(d) = patch.description {
                st.description = d;
            }
            if let Some(t) = patch.tag {
                st.tag = t;
            }
            macro_rules! set_opt {
                ($($f:ident),*) => { $( if patch.$f.is_some() { st.$f = patch.$f; } )* };
            }
            set_opt!(notes, market_condition, timeframe, entry_criteria, risk_model);
        }
        StrategyAction::Delete { id } => {
            remove_by(&mut s.strategies, "strategy", &id, |x| x.id.as_str())?;
        }
    }
    Ok(())
}

fn reduce_envelopes(s: &mut AppState, a: EnvelopeAction) -> Result<(), HubError> {
    match a {
        EnvelopeAction::Toggle { id } => {
            let env = s
                .envelopes
                .iter_mut()
                .find(|e| e.id == id)
                .ok_or(HubError::EnvelopeOutOfRange(id))?;
            env.completed = !env.completed;
        }
        EnvelopeAction::Reset => {
            for e in &mut s.envelopes {
                e.completed = false;
            }
        }
    }
    Ok(())
}

fn reduce_budget(s: &mut AppState, a: BudgetAction) -> Result<(), HubError> {
    match a {
        BudgetAction::AddBucket(b) => {
            require(&b.label, "bucket label")?;
            if b.total < Decimal::ZERO {
                return Err(HubError::invalid("total", "must not be negative"));
            }
            s.buckets.push(b);
        }
        BudgetAction::UpdateBucket { id, patch } => {
            let b = find_mut(&mut s.buckets, "bucket", &id, |b| b.id.as_str())?;
            if let Some(label) = patch.label {
                require(&label, "bucket label")?;
                b.label = label;
            }
            if let Some(icon) = patch.icon {
                b.icon = icon;
            }
            if let Some(total) = patch.total {
                if total < Decimal::ZERO {
                    return Err(HubError::invalid("total", "must not be negative"));
                }
                b.total = total;
            }
            if let Some(r) = patch.remaining {
                b.remaining = r;
            }
            if let Some(p) = patch.priority {
                b.priority = p;
            }
            if let Some(t) = patch.r#type {
                b.r#type = t;
            }
            if let Some(c) = patch.category {
                b.category = c;
            }
        }
        BudgetAction::DeleteBucket { id } => {
            remove_by(&mut s.buckets, "bucket", &id, |b| b.id.as_str())?;
        }
        BudgetAction::Allocate { bucket_id, sub } => {
            require(&sub.name, "allocation name")?;
            let b = find_mut(&mut s.buckets, "bucket", &bucket_id, |b| b.id.as_str())?;
            b.sub_allocations.push(sub);
        }
        BudgetAction::Unallocate { bucket_id, sub_id } => {
            let b = find_mut(&mut s.buckets, "bucket", &bucket_id, |b| b.id.as_str())?;
            remove_by(&mut b.sub_allocations, "allocation", &sub_id, |x| x.id.as_str())?;
        }
        BudgetAction::AddExpense(e) => {
            if e.amount <= Decimal::ZERO {
                return Err(HubError::invalid("amount", "must be positive"));
            }
            let b = find_mut(&mut s.buckets, "bucket", &e.category_id, |b| b.id.as_str())?;
            b.remaining -= e.amount;
            s.expenses.insert(0, e);
        }
        BudgetAction::DeleteExpense { id } => {
            let e = remove_by(&mut s.expenses, "expense", &id, |x| x.id.as_str())?;
            if let Some(b) = s.buckets.iter_mut().find(|b| b.id == e.category_id) {
                b.remaining += e.amount;
            }
        }
        BudgetAction::AddIncome(i) => {
            if i.amount <= Decimal::ZERO {
                return Err(HubError::invalid("amount", "must be positive"));
            }
            s.income_records.insert(0, i);
        }
        BudgetAction::DeleteIncome { id } => {
            remove_by(&mut s.income_records, "income", &id, |x| x.id.as_str())?;
        }
        BudgetAction::SetCurrency(sym) => {
            require(&sym, "currency")?;
            s.currency = sym;
        }
        BudgetAction::SetMantra(m) => {
            require(&m, "mantra")?;
            s.budget_mantra = m;
        }
    }
    Ok(())
}

fn reduce_tasks(s: &mut AppState, a: TaskAction) -> Result<(), HubError> {
    match a {
        TaskAction::Add(t) => {
            require(&t.title, "task title")?;
            if let Some(end) = t.time_end {
                if end < t.time_start {
                    return Err(HubError::invalid("timeEnd", "ends before it starts"));
                }
            }
            s.tasks.push(t);
        }
        TaskAction::Toggle { id } => {
            let t = find_mut(&mut s.tasks, "task", &id, |t| t.id.as_str())?;
            t.completed = !t.completed;
        }
        TaskAction::Delete { id } => {
            remove_by(&mut s.tasks, "task", &id, |t| t.id.as_str())?;
        }
    }
    Ok(())
}

fn reduce_letters(s: &mut AppState, a: LetterAction) -> Result<(), HubError> {
    match a {
        LetterAction::Add(l) => {
            require(&l.title, "letter title")?;
            require(&l.content, "letter content")?;
            s.letters.insert(0, l);
        }
        LetterAction::Delete { id } => {
            remove_by(&mut s.letters, "letter", &id, |l| l.id.as_str())?;
        }
    }
    Ok(())
}

fn reduce_skills(s: &mut AppState, a: SkillAction) -> Result<(), HubError> {
    match a {
        SkillAction::Add(sk) => {
            require(&sk.skill_name, "skill name")?;
            if sk.target_time == 0 {
                return Err(HubError::invalid("targetTime", "must be at least 1 minute"));
            }
            s.skills.push(sk);
        }
        SkillAction::SetGoal { id, goal } => {
            let sk = find_mut(&mut s.skills, "skill", &id, |x| x.id.as_str())?;
            sk.goal = goal.filter(|g| !g.trim().is_empty());
        }
        SkillAction::Delete { id } => {
            remove_by(&mut s.skills, "skill", &id, |x| x.id.as_str())?;
        }
        SkillAction::LogPractice { skill_id, entry } => {
            if entry.time_spent == 0 {
                return Err(HubError::invalid("timeSpent", "must be at least 1 minute"));
            }
            let sk = find_mut(&mut s.skills, "skill", &skill_id, |x| x.id.as_str())?;
            sk.streak += 1;
            sk.practice_log.insert(0, entry);
        }
    }
    Ok(())
}

fn reduce_projects(s: &mut AppState, a: ProjectAction) -> Result<(), HubError> {
    match a {
        ProjectAction::Add(p) => {
            require(&p.title, "project title")?;
            if p.progress > 100 {
                return Err(HubError::invalid("progress", "must be within 0..=100"));
            }
            s.projects.push(p);
        }
        ProjectAction::Update {
            id,
            status,
            progress,
        } => {
            let p = find_mut(&mut s.projects, "project", &id, |x| x.id.as_str())?;
            if let Some(pr) = progress {
                if pr > 100 {
                    return Err(HubError::invalid("progress", "must be within 0..=100"));
                }
                p.progress = pr;
            }
            if let Some(st) = status {
                p.status = st;
            }
        }
        ProjectAction::Delete { id } => {
            remove_by(&mut s.projects, "project", &id, |x| x.id.as_str())?;
        }
    }
    Ok(())
}

fn reduce_scriptures(s: &mut AppState, a: ScriptureAction) {
    match a {
        ScriptureAction::ToggleHeart(d) => {
            if let Some(pos) = s
                .hearted_scriptures
                .iter()
                .position(|x| x.reference == d.reference)
            {
                s.hearted_scriptures.remove(pos);
            } else {
                s.hearted_scriptures.push(d);
            }
        }
    }
}

/// Runs `f` with the latest value once `delay` passes without a newer one.
/// A value still pending when every sender is gone is delivered before the
/// worker exits.
pub fn spawn_debounced<T, F>(rx: Receiver<T>, delay: Duration, mut f: F) -> JoinHandle<()>
where
    T: Send + 'static,
    F: FnMut(T) + Send + 'static,
{
    thread::spawn(move || {
        let mut pending: Option<T> = None;
        loop {
            let next = if pending.is_some() {
                rx.recv_timeout(delay)
            } else {
                rx.recv().map_err(|_| RecvTimeoutError::Disconnected)
            };
            match next {
                Ok(v) => pending = Some(v),
                Err(RecvTimeoutError::Timeout) => {
                    if let Some(v) = pending.take() {
                        f(v);
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    if let Some(v) = pending.take() {
                        f(v);
                    }
                    break;
                }
            }
        }
    })
}

/// Owned trailing-edge debouncer. Each `call` cancels the pending one.
pub struct Debouncer<T: Send + 'static> {
    tx: Option<Sender<T>>,
    worker: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new<F>(delay: Duration, f: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        Debouncer {
            tx: Some(tx),
            worker: Some(spawn_debounced(rx, delay, f)),
        }
    }

    pub fn call(&self, value: T) {
        if let Some(tx) = &self.tx {
            if tx.send(value).is_err() {
                tracing::warn!("debounce worker is gone, dropping value");
            }
        }
    }

    /// Delivers a pending value now and stops the worker.
    pub fn flush(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.tx.take();
        if let Some(w) = self.worker.take() {
            if w.join().is_err() {
                tracing::error!("debounce worker panicked");
            }
        }
    }
}

impl<T: Send + 'static> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.stop();
    }
}
