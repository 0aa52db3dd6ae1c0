// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, bail};
use serde_json::json;

use super::trades::resolve_account;
use super::{Ctx, arg, decimal_arg, json_flags, required};
use crate::metrics::account_trades;
use crate::risk::{
    ExposureLevel, LotRequest, daily_drawdown, lot_size, overall_drawdown, projected_exposure,
    prop_firm_intel, risk_params,
};
use crate::store::Store;
use crate::utils::{fmt_money, fmt_pct, maybe_print_json};

pub fn handle(store: &mut Store, ctx: &Ctx, m: &clap::ArgMatches) -> Result<()> {
    let st = store.state();
    match m.subcommand() {
        Some(("status", sub)) => {
            let Some(acc) = resolve_account(st, sub)? else {
                bail!("No trading account yet. Add one with `masteryhub account add`.");
            };
            let rate: f64 = arg(sub, "rate")
                .unwrap_or("1")
                .parse()
                .context("--rate must be a number")?;
            let params = risk_params(acc);
            let daily = daily_drawdown(acc);
            let overall = overall_drawdown(acc);
            let trades = account_trades(&st.trades, &acc.id);
            let intel = prop_firm_intel(acc, &trades, ctx.today(), rate);

            let (json, jsonl) = json_flags(sub);
            let payload = json!({
                "account": acc.id,
                "params": params,
                "daily": daily,
                "overall": overall,
                "propFirm": intel,
            });
            if maybe_print_json(json, jsonl, &payload)? {
                return Ok(());
            }

            let cur = &acc.currency;
            let rows = vec![
                vec![
                    "Daily".to_string(),
                    fmt_money(&daily.used, cur),
                    fmt_money(&daily.limit, cur),
                    fmt_money(&daily.remaining, cur),
                    fmt_pct(daily.used_pct),
                    daily.band.label().to_string(),
                ],
                vec![
                    "Overall".to_string(),
                    fmt_money(&overall.used, cur),
                    fmt_money(&overall.limit, cur),
                    fmt_money(&overall.remaining, cur),
                    fmt_pct(overall.used_pct),
                    overall.band.label().to_string(),
                ],
            ];
            println!("{} ({})", acc.name, acc.r#type.label());
            println!(
                "{}",
                ctx.table(&["Window", "Used", "Limit", "Remaining", "Used %", "Status"], rows)
            );
            println!(
                "Max risk per trade: {}%",
                params.max_risk_per_trade_pct.normalize()
            );
            if let Some(i) = intel {
                println!(
                    "{}: {} of {} target ({}), {} to go, ~{} day(s) at {}%/day",
                    i.phase.label(),
                    fmt_money(&i.total_pnl, cur),
                    fmt_money(&i.target_profit_amount, cur),
                    fmt_pct(i.profit_progress),
                    fmt_money(&i.remaining_to_target, cur),
                    i.estimated_days,
                    rate
                );
            }
        }
        Some(("lot", sub)) => {
            let acc = resolve_account(st, sub)?;
            let req = LotRequest {
                instrument: required(sub, "symbol")?.to_string(),
                risk_pct: decimal_arg(sub, "risk")?,
                stop_loss: decimal_arg(sub, "sl")?,
                use_equity: sub.get_flag("equity"),
            };
            let sized = lot_size(acc, &req)?;
            let exposure = acc
                .map(|a| projected_exposure(&daily_drawdown(a), sized.risk_amount))
                .unwrap_or(0.0);
            let level = ExposureLevel::from_pct(exposure);

            let (json, jsonl) = json_flags(sub);
            let payload = json!({
                "lot": sized.lot,
                "riskAmount": sized.risk_amount,
                "warning": sized.warning.map(|w| w.to_string()),
                "exposurePct": exposure,
                "exposure": level.label(),
            });
            if maybe_print_json(json, jsonl, &payload)? {
                return Ok(());
            }
            let cur = acc.map(|a| a.currency.as_str()).unwrap_or("$");
            println!(
                "{} lots | risking {} | exposure {} ({})",
                sized.lot,
                fmt_money(&sized.risk_amount, cur),
                fmt_pct(exposure),
                level.label()
            );
            if let Some(w) = sized.warning {
                println!("{}", w);
            }
        }
        _ => {}
    }
    Ok(())
}
