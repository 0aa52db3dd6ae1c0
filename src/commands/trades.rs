// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow, bail};
use chrono::Datelike;

use super::{Ctx, arg, decimal_arg, json_flags, required};
use crate::metrics::{
    ProjectionView, account_stats, account_trades, compounding_projection, monthly_stats,
    weekly_stats,
};
use crate::models::{Direction, Mood, Reflection, Session, Trade, TradeStatus, TradingAccount};
use crate::state::AppState;
use crate::store::{Action, Store, TradeAction};
use crate::utils::{fmt_money, fmt_pct, maybe_print_json, new_id, parse_decimal, parse_month, parse_trade_time};

pub fn handle(store: &mut Store, ctx: &Ctx, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(store.state(), ctx, sub)?,
        Some(("add", sub)) => add(store, ctx, sub)?,
        Some(("delete", sub)) => {
            let id = required(sub, "id")?.to_string();
            store.dispatch(Action::Trade(TradeAction::Delete { id: id.clone() }))?;
            println!("Removed trade {} and reverted its P&L", id);
        }
        Some(("reflect", sub)) => {
            let id = required(sub, "id")?.to_string();
            let reflection = Reflection {
                wrong: required(sub, "wrong")?.to_string(),
                right: required(sub, "right")?.to_string(),
                improve: required(sub, "improve")?.to_string(),
                additional: arg(sub, "additional").unwrap_or_default().to_string(),
            };
            store.dispatch(Action::Trade(TradeAction::Reflect {
                id: id.clone(),
                reflection,
            }))?;
            println!("Reflection saved for {}", id);
        }
        Some(("stats", sub)) => stats(store.state(), ctx, sub)?,
        Some(("accounts", sub)) => {
            let st = store.state();
            let all = account_stats(&st.accounts, &st.trades);
            let (json, jsonl) = json_flags(sub);
            if maybe_print_json(json, jsonl, &all)? {
                return Ok(());
            }
            let rows = all
                .iter()
                .map(|a| {
                    vec![
                        a.name.clone(),
                        a.trade_count.to_string(),
                        fmt_pct(a.win_rate * 100.0),
                        fmt_money(&a.net_profit, &st.currency),
                        fmt_pct(a.progress),
                    ]
                })
                .collect();
            println!(
                "{}",
                ctx.table(&["Account", "Trades", "Win rate", "Net", "Target"], rows)
            );
        }
        Some(("project", sub)) => project(store.state(), ctx, sub)?,
        _ => {}
    }
    Ok(())
}

/// An explicit `--account` must exist; otherwise the primary account is used.
pub fn resolve_account<'s>(
    st: &'s AppState,
    sub: &clap::ArgMatches,
) -> Result<Option<&'s TradingAccount>> {
    match arg(sub, "account") {
        Some(id) => st
            .account(id)
            .map(Some)
            .ok_or_else(|| anyhow!("Unknown account '{}'", id)),
        None => Ok(st.primary_account()),
    }
}

fn list(st: &AppState, ctx: &Ctx, sub: &clap::ArgMatches) -> Result<()> {
    let limit = sub.get_one::<usize>("limit").copied().unwrap_or(usize::MAX);
    let filter = arg(sub, "account");
    let trades: Vec<&Trade> = st
        .trades
        .iter()
        .filter(|t| filter.is_none() || t.account_id.as_deref() == filter)
        .take(limit)
        .collect();

    let (json, jsonl) = json_flags(sub);
    if maybe_print_json(json, jsonl, &trades)? {
        return Ok(());
    }
    let rows = trades
        .iter()
        .map(|t| {
            vec![
                t.id.clone(),
                t.time.format("%Y-%m-%d %H:%M").to_string(),
                t.pair.clone(),
                format!("{:?}", t.r#type).to_uppercase(),
                fmt_money(&t.pnl, &st.currency),
                t.rr.clone(),
                format!("{:?}", t.status),
                t.strategy_id
                    .as_deref()
                    .and_then(|id| st.strategy(id))
                    .map(|s| s.title.clone())
                    .unwrap_or_default(),
            ]
        })
        .collect();
    println!(
        "{}",
        ctx.table(
            &["Id", "Time", "Pair", "Side", "P&L", "R:R", "Result", "Strategy"],
            rows
        )
    );
    Ok(())
}

fn add(store: &mut Store, ctx: &Ctx, sub: &clap::ArgMatches) -> Result<()> {
    let st = store.state();
    let kind = required(sub, "type")?;
    let direction =
        Direction::parse(kind).ok_or_else(|| anyhow!("Unknown trade type '{}'", kind))?;
    let pnl = parse_decimal(required(sub, "pnl")?)?;
    let time = match arg(sub, "time") {
        Some(raw) => parse_trade_time(raw)
            .ok_or_else(|| anyhow!("Invalid time '{}', expected YYYY-MM-DD HH:MM", raw))?,
        None => ctx.now,
    };
    let mood = arg(sub, "mood")
        .map(|s| Mood::parse(s).ok_or_else(|| anyhow!("Unknown mood '{}'", s)))
        .transpose()?;
    let session = arg(sub, "session")
        .map(|s| Session::parse(s).ok_or_else(|| anyhow!("Unknown session '{}'", s)))
        .transpose()?;
    // The store rejects an unknown explicit account.
    let account_id = match arg(sub, "account") {
        Some(id) => Some(id.to_string()),
        None => st.primary_account().map(|a| a.id.clone()),
    };
    let strategy_id = arg(sub, "strategy").map(str::to_string);
    if let Some(sid) = &strategy_id {
        if st.strategy(sid).is_none() {
            tracing::warn!(strategy = %sid, "trade references an unknown strategy");
        }
    }

    let trade = Trade {
        id: new_id(),
        pair: required(sub, "pair")?.to_uppercase(),
        r#type: direction,
        entry: decimal_arg(sub, "entry")?.unwrap_or_default(),
        pnl,
        duration: arg(sub, "duration").map(str::to_string),
        time,
        rr: required(sub, "rr")?.to_string(),
        status: TradeStatus::from_pnl(pnl),
        mood,
        session,
        notes: arg(sub, "notes").map(str::to_string),
        reflection: None,
        chart_link: arg(sub, "chart").map(str::to_string),
        image: None,
        strategy_id,
        account_id,
    };
    let id = trade.id.clone();
    store
        .dispatch(Action::Trade(TradeAction::Add(trade)))
        .context("Trade rejected")?;
    println!("Logged trade {} ({:?})", id, TradeStatus::from_pnl(pnl));
    Ok(())
}

fn stats(st: &AppState, ctx: &Ctx, sub: &clap::ArgMatches) -> Result<()> {
    let (year, month) = match arg(sub, "month") {
        Some(s) => parse_month(s)?,
        None => (ctx.today().year(), ctx.today().month()),
    };
    let trades: Vec<&Trade> = match resolve_account(st, sub)? {
        Some(acc) => account_trades(&st.trades, &acc.id),
        None => st.trades.iter().collect(),
    };
    let monthly = monthly_stats(&trades, year, month);
    let weekly = weekly_stats(&trades, year, month);

    let (json, jsonl) = json_flags(sub);
    let payload = serde_json::json!({ "monthly": monthly, "weekly": weekly });
    if maybe_print_json(json, jsonl, &payload)? {
        return Ok(());
    }
    let cur = &st.currency;
    let rows = vec![
        vec!["Trades".into(), monthly.total_trades.to_string()],
        vec!["Win rate".into(), fmt_pct(monthly.win_rate * 100.0)],
        vec!["Total P&L".into(), fmt_money(&monthly.total_pnl, cur)],
        vec!["Best day".into(), fmt_money(&monthly.best_day_pnl, cur)],
        vec!["Worst day".into(), fmt_money(&monthly.worst_day_pnl, cur)],
        vec!["Avg R".into(), format!("{:.2}R", monthly.avg_r)],
    ];
    println!("{}", ctx.table(&["Metric", "Value"], rows));
    let week_rows = weekly
        .weeks
        .iter()
        .map(|w| {
            vec![
                format!("Week {}", w.week),
                fmt_money(&w.pnl, cur),
                w.days.to_string(),
            ]
        })
        .collect();
    println!("{}", ctx.table(&["Week", "P&L", "Days"], week_rows));
    Ok(())
}

fn project(st: &AppState, ctx: &Ctx, sub: &clap::ArgMatches) -> Result<()> {
    let account = resolve_account(st, sub)?;
    let mut trades: Vec<&Trade> = match account {
        Some(acc) => account_trades(&st.trades, &acc.id),
        None => st.trades.iter().collect(),
    };
    trades.sort_by_key(|t| t.time);
    let rate: f64 = arg(sub, "rate")
        .unwrap_or("1")
        .parse()
        .context("--rate must be a number")?;
    if !(0.0..=100.0).contains(&rate) {
        bail!("--rate must be within 0..=100");
    }
    let view = match arg(sub, "view") {
        Some("monthly") => ProjectionView::Monthly,
        _ => ProjectionView::Daily,
    };
    let p = compounding_projection(&trades, account, decimal_arg(sub, "capital")?, rate, view);

    let (json, jsonl) = json_flags(sub);
    if maybe_print_json(json, jsonl, &p)? {
        return Ok(());
    }
    let rows = p
        .points
        .iter()
        .map(|pt| {
            vec![
                pt.name.clone(),
                pt.projected.to_string(),
                pt.actual.map(|a| a.to_string()).unwrap_or_default(),
            ]
        })
        .collect();
    println!("{}", ctx.table(&["Step", "Projected", "Actual"], rows));
    println!(
        "{} | current {} | today's target {}",
        if p.is_on_track { "ON TRACK" } else { "BEHIND" },
        fmt_money(&p.current_actual, &st.currency),
        p.today_target
    );
    Ok(())
}
