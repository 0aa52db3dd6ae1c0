// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Drawdown tracking and position sizing for trading accounts.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use thiserror::Error;

use crate::metrics::net_pnl;
use crate::models::{AccountKind, Phase, Trade, TradingAccount};

pub const MIN_LOT: Decimal = Decimal::from_parts(1, 0, 0, false, 2);
pub const MAX_LOT: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskParams {
    pub max_risk_per_trade_pct: Decimal,
    pub daily_drawdown_pct: Decimal,
    pub max_drawdown_pct: Decimal,
}

pub fn phase_settings(phase: Phase) -> RiskParams {
    let (risk, daily, max) = match phase {
        Phase::Phase1 | Phase::Phase2 => (Decimal::ONE, 5, 10),
        Phase::Funded => (Decimal::new(5, 1), 5, 10),
    };
    RiskParams {
        max_risk_per_trade_pct: risk,
        daily_drawdown_pct: Decimal::from(daily),
        max_drawdown_pct: Decimal::from(max),
    }
}

pub fn risk_params(acc: &TradingAccount) -> RiskParams {
    match (acc.r#type, acc.phase) {
        (AccountKind::PropFirm, Some(phase)) => phase_settings(phase),
        _ => RiskParams {
            max_risk_per_trade_pct: Decimal::TWO,
            daily_drawdown_pct: acc.daily_drawdown_pct.unwrap_or(Decimal::TEN),
            max_drawdown_pct: acc.max_drawdown_pct.unwrap_or(Decimal::from(20)),
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Band {
    Safe,
    Caution,
    Breached,
}

impl Band {
    pub fn from_used_pct(pct: f64) -> Self {
        if pct >= 100.0 {
            Band::Breached
        } else if pct >= 70.0 {
            Band::Caution
        } else {
            Band::Safe
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Band::Safe => "SAFE",
            Band::Caution => "CAUTION",
            Band::Breached => "BREACHED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Drawdown {
    /// Start-of-day balance for the daily window, highest equity overall.
    pub reference: Decimal,
    pub used: Decimal,
    pub limit: Decimal,
    pub remaining: Decimal,
    pub used_pct: f64,
    pub band: Band,
}

impl Drawdown {
    fn new(reference: Decimal, used: Decimal, limit: Decimal) -> Self {
        let used_pct = if limit > Decimal::ZERO {
            (used / limit * Decimal::ONE_HUNDRED).to_f64().unwrap_or(0.0)
        } else {
            0.0
        };
        Drawdown {
            reference,
            used,
            limit,
            remaining: limit - used,
            used_pct,
            band: Band::from_used_pct(used_pct),
        }
    }

    pub fn is_breached(&self) -> bool {
        self.used >= self.limit
    }
}

fn pct_of(base: Decimal, pct: Decimal) -> Decimal {
    base * pct / Decimal::ONE_HUNDRED
}

pub fn daily_drawdown(acc: &TradingAccount) -> Drawdown {
    let params = risk_params(acc);
    let start = acc.start_of_day();
    let base = if acc.is_prop_firm() {
        acc.initial_phase_balance
    } else {
        acc.start_of_day_balance
    };
    let limit = pct_of(base.unwrap_or(start), params.daily_drawdown_pct);
    let used = (start - acc.current_equity()).max(Decimal::ZERO);
    Drawdown::new(start, used, limit)
}

pub fn overall_drawdown(acc: &TradingAccount) -> Drawdown {
    let params = risk_params(acc);
    let peak = acc.peak_equity();
    let base = if acc.is_prop_firm() {
        acc.initial_phase_balance
    } else {
        Some(acc.balance)
    };
    let limit = pct_of(base.unwrap_or(peak), params.max_drawdown_pct);
    let used = (peak - acc.current_equity()).max(Decimal::ZERO);
    Drawdown::new(peak, used, limit)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instrument {
    Index,
    Gold,
    Forex,
}

impl Instrument {
    pub fn classify(symbol: &str) -> Self {
        let s = symbol.to_lowercase();
        if s.contains("nas") || s.contains("us100") {
            Instrument::Index
        } else if s.contains("xau") || s.contains("gold") {
            Instrument::Gold
        } else {
            Instrument::Forex
        }
    }

    /// Account currency per unit of stop loss for one lot.
    pub fn value_per_point(&self) -> Decimal {
        match self {
            Instrument::Index => Decimal::ONE,
            Instrument::Gold => Decimal::ONE_HUNDRED,
            Instrument::Forex => Decimal::TEN,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LotRequest {
    pub instrument: String,
    pub risk_pct: Option<Decimal>,
    pub stop_loss: Option<Decimal>,
    pub use_equity: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LotWarning {
    RaisedToMinimum,
    ClampedToMaximum,
}

impl std::fmt::Display for LotWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LotWarning::RaisedToMinimum => write!(f, "Lot set to broker minimum (0.01)"),
            LotWarning::ClampedToMaximum => write!(f, "Lot adjusted to broker maximum (50.0)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LotSize {
    pub lot: Decimal,
    pub risk_amount: Decimal,
    pub warning: Option<LotWarning>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LotSizeError {
    #[error("Enter All Parameters")]
    MissingParameters,
    #[error("Daily Drawdown Limit Reached")]
    DailyDrawdownReached,
    #[error("Stop Loss Must Be > 0")]
    StopLossNotPositive,
    #[error("Exceeds Phase Limit ({}%)", .0.normalize())]
    ExceedsPhaseLimit(Decimal),
    #[error("Exceeds Remaining Daily Drawdown")]
    ExceedsRemainingDaily { risk_amount: Decimal },
    #[error("Calculation Error")]
    Calculation,
}

pub fn lot_size(acc: Option<&TradingAccount>, req: &LotRequest) -> Result<LotSize, LotSizeError> {
    let (Some(acc), Some(risk_pct), Some(stop_loss)) = (acc, req.risk_pct, req.stop_loss) else {
        return Err(LotSizeError::MissingParameters);
    };
    if risk_pct.is_zero() {
        return Err(LotSizeError::MissingParameters);
    }
    let params = risk_params(acc);
    let daily = daily_drawdown(acc);
    if daily.is_breached() {
        return Err(LotSizeError::DailyDrawdownReached);
    }
    if stop_loss <= Decimal::ZERO {
        return Err(LotSizeError::StopLossNotPositive);
    }
    if risk_pct > params.max_risk_per_trade_pct {
        return Err(LotSizeError::ExceedsPhaseLimit(params.max_risk_per_trade_pct));
    }

    let capital = if req.use_equity {
        acc.current_equity()
    } else {
        acc.balance
    };
    let risk_amount = pct_of(capital, risk_pct);
    if risk_amount > daily.remaining {
        return Err(LotSizeError::ExceedsRemainingDaily { risk_amount });
    }

    let divisor = stop_loss * Instrument::classify(&req.instrument).value_per_point();
    let raw = risk_amount
        .checked_div(divisor)
        .ok_or(LotSizeError::Calculation)?;
    if raw <= Decimal::ZERO {
        return Err(LotSizeError::Calculation);
    }
    if raw < MIN_LOT {
        tracing::warn!(%raw, "lot below broker minimum");
        return Ok(LotSize {
            lot: MIN_LOT,
            risk_amount,
            warning: Some(LotWarning::RaisedToMinimum),
        });
    }

    let floored = (raw * Decimal::ONE_HUNDRED).floor() / Decimal::ONE_HUNDRED;
    if floored > MAX_LOT {
        tracing::warn!(%raw, "lot above broker maximum");
        return Ok(LotSize {
            lot: MAX_LOT,
            risk_amount,
            warning: Some(LotWarning::ClampedToMaximum),
        });
    }
    Ok(LotSize {
        lot: floored,
        risk_amount,
        warning: None,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExposureLevel {
    Low,
    Moderate,
    Elevated,
    HighRisk,
    Locked,
}

impl ExposureLevel {
    pub fn from_pct(pct: f64) -> Self {
        if pct >= 100.0 {
            ExposureLevel::Locked
        } else if pct >= 80.0 {
            ExposureLevel::HighRisk
        } else if pct >= 60.0 {
            ExposureLevel::Elevated
        } else if pct >= 30.0 {
            ExposureLevel::Moderate
        } else {
            ExposureLevel::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExposureLevel::Low => "Low",
            ExposureLevel::Moderate => "Moderate",
            ExposureLevel::Elevated => "Elevated",
            ExposureLevel::HighRisk => "High Risk",
            ExposureLevel::Locked => "Locked",
        }
    }
}

/// Daily drawdown use, in percent, if the next trade is stopped out.
pub fn projected_exposure(daily: &Drawdown, risk_amount: Decimal) -> f64 {
    if daily.limit <= Decimal::ZERO || risk_amount <= Decimal::ZERO {
        return 0.0;
    }
    ((daily.used + risk_amount) / daily.limit * Decimal::ONE_HUNDRED)
        .to_f64()
        .unwrap_or(0.0)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropFirmIntel {
    pub phase: Phase,
    pub target_profit_pct: Decimal,
    pub target_profit_amount: Decimal,
    pub daily_limit: Decimal,
    pub max_limit: Decimal,
    pub today_pnl: Decimal,
    pub total_pnl: Decimal,
    pub profit_progress: f64,
    pub daily_consumed: f64,
    pub max_consumed: f64,
    pub daily_band: Band,
    pub max_band: Band,
    pub remaining_to_target: Decimal,
    pub estimated_days: u32,
    pub goal_value: Decimal,
}

/// Phase target for the account's current phase, falling back to the
/// generic profit target and finally to 10%.
pub fn phase_target_pct(acc: &TradingAccount) -> Decimal {
    let specific = match acc.phase {
        Some(Phase::Phase1) => acc.phase1_target,
        Some(Phase::Phase2) => acc.phase2_target,
        Some(Phase::Funded) => acc.phase3_target,
        None => None,
    };
    specific
        .or(acc.target_profit_pct)
        .unwrap_or(Decimal::TEN)
}

fn ratio_pct(num: Decimal, den: Decimal) -> f64 {
    if den <= Decimal::ZERO {
        return 0.0;
    }
    (num / den * Decimal::ONE_HUNDRED).to_f64().unwrap_or(0.0)
}

/// Progress snapshot for a prop firm challenge. `None` for other accounts.
pub fn prop_firm_intel(
    acc: &TradingAccount,
    trades: &[&Trade],
    today: NaiveDate,
    daily_rate_pct: f64,
) -> Option<PropFirmIntel> {
    if !acc.is_prop_firm() {
        return None;
    }
    let initial = acc.initial_phase_balance.unwrap_or(acc.balance);
    let target_pct = phase_target_pct(acc);
    let target = pct_of(initial, target_pct);
    let daily_limit = pct_of(initial, acc.daily_drawdown_pct.unwrap_or(Decimal::from(5)));
    let max_limit = pct_of(initial, acc.max_drawdown_pct.unwrap_or(Decimal::TEN));

    let today_pnl = net_pnl(trades.iter().copied().filter(|t| t.day() == today));
    let total_pnl = net_pnl(trades.iter().copied());

    let daily_consumed = ratio_pct(-today_pnl, daily_limit).max(0.0);
    let max_consumed = ratio_pct(-total_pnl, max_limit).max(0.0);

    let estimated_days = {
        let goal = (initial + target).to_f64().unwrap_or(0.0);
        let now = (initial + total_pnl).to_f64().unwrap_or(0.0);
        if daily_rate_pct > 0.0 && goal > 0.0 && now > 0.0 {
            let days = ((goal / now).ln() / (1.0 + daily_rate_pct / 100.0).ln()).ceil();
            if days.is_finite() && days > 0.0 {
                days as u32
            } else {
                0
            }
        } else {
            0
        }
    };

    Some(PropFirmIntel {
        phase: acc.phase.unwrap_or(Phase::Phase1),
        target_profit_pct: target_pct,
        target_profit_amount: target,
        daily_limit,
        max_limit,
        today_pnl,
        total_pnl,
        profit_progress: ratio_pct(total_pnl, target).clamp(0.0, 100.0),
        daily_consumed,
        max_consumed,
        daily_band: Band::from_used_pct(daily_consumed),
        max_band: Band::from_used_pct(max_consumed),
        remaining_to_target: (target - total_pnl).max(Decimal::ZERO),
        estimated_days,
        goal_value: initial + target,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn funded() -> TradingAccount {
        let mut a = TradingAccount::new(
            "p",
            "Funded",
            AccountKind::PropFirm,
            Decimal::from(100_000),
            "$",
        );
        a.phase = Some(Phase::Funded);
        a.initial_phase_balance = Some(Decimal::from(100_000));
        a
    }

    #[test]
    fn phase_limit_message_matches_ui_copy() {
        let err = LotSizeError::ExceedsPhaseLimit(Decimal::new(5, 1));
        assert_eq!(err.to_string(), "Exceeds Phase Limit (0.5%)");
        let err = LotSizeError::ExceedsPhaseLimit(Decimal::new(10, 1));
        assert_eq!(err.to_string(), "Exceeds Phase Limit (1%)");
    }

    #[test]
    fn drawdown_bands() {
        assert_eq!(Band::from_used_pct(69.9), Band::Safe);
        assert_eq!(Band::from_used_pct(70.0), Band::Caution);
        assert_eq!(Band::from_used_pct(100.0), Band::Breached);
    }

    #[test]
    fn daily_drawdown_uses_phase_balance_for_prop_firms() {
        let mut a = funded();
        a.start_of_day_balance = Some(Decimal::from(101_000));
        a.equity = Some(Decimal::from(99_000));
        let dd = daily_drawdown(&a);
        assert_eq!(dd.limit, Decimal::from(5_000));
        assert_eq!(dd.used, Decimal::from(2_000));
        assert_eq!(dd.band, Band::Safe);
    }

    #[test]
    fn instruments_resolve_by_substring() {
        assert_eq!(Instrument::classify("US100.cash"), Instrument::Index);
        assert_eq!(Instrument::classify("XAUUSD"), Instrument::Gold);
        assert_eq!(Instrument::classify("EURUSD"), Instrument::Forex);
    }
}
