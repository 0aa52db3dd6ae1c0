// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use super::{Ctx, arg, json_flags, required};
use crate::metrics::evaluate_strategies;
use crate::models::Strategy;
use crate::store::{Action, Store, StrategyAction, StrategyPatch};
use crate::utils::{fmt_money, fmt_pct, maybe_print_json, new_id};

pub fn handle(store: &mut Store, ctx: &Ctx, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => {
            let strategies = &store.state().strategies;
            let (json, jsonl) = json_flags(sub);
            if maybe_print_json(json, jsonl, strategies)? {
                return Ok(());
            }
            let rows = strategies
                .iter()
                .map(|s| {
                    vec![
                        s.id.clone(),
                        s.title.clone(),
                        s.tag.clone(),
                        s.timeframe.clone().unwrap_or_default(),
                        s.description.clone(),
                    ]
                })
                .collect();
            println!(
                "{}",
                ctx.table(&["Id", "Title", "Tag", "Timeframe", "Description"], rows)
            );
        }
        Some(("add", sub)) => {
            let s = Strategy {
                id: new_id(),
                title: required(sub, "title")?.to_string(),
                description: arg(sub, "description").unwrap_or_default().to_string(),
                tag: arg(sub, "tag").unwrap_or("Setup").to_string(),
                image: String::new(),
                model_image: None,
                notes: arg(sub, "notes").map(str::to_string),
                market_condition: arg(sub, "market").map(str::to_string),
                timeframe: arg(sub, "timeframe").map(str::to_string),
                entry_criteria: arg(sub, "entry").map(str::to_string),
                risk_model: arg(sub, "risk-model").map(str::to_string),
            };
            let id = s.id.clone();
            store.dispatch(Action::Strategy(StrategyAction::Add(s)))?;
            println!("Added strategy {}", id);
        }
        Some(("update", sub)) => {
            let id = required(sub, "id")?.to_string();
            let patch = StrategyPatch {
                title: arg(sub, "title").map(str::to_string),
                description: arg(sub, "description").map(str::to_string),
                tag: arg(sub, "tag").map(str::to_string),
                notes: arg(sub, "notes").map(str::to_string),
                market_condition: arg(sub, "market").map(str::to_string),
                timeframe: arg(sub, "timeframe").map(str::to_string),
                entry_criteria: arg(sub, "entry").map(str::to_string),
                risk_model: arg(sub, "risk-model").map(str::to_string),
            };
            store.dispatch(Action::Strategy(StrategyAction::Update {
                id: id.clone(),
                patch,
            }))?;
            println!("Updated strategy {}", id);
        }
        Some(("delete", sub)) => {
            let id = required(sub, "id")?.to_string();
            store.dispatch(Action::Strategy(StrategyAction::Delete { id: id.clone() }))?;
            println!("Removed strategy {}", id);
        }
        Some(("evaluate", sub)) => {
            let st = store.state();
            let evals = evaluate_strategies(&st.strategies, &st.trades);
            let (json, jsonl) = json_flags(sub);
            if maybe_print_json(json, jsonl, &evals)? {
                return Ok(());
            }
            let cur = &st.currency;
            let rows = evals
                .iter()
                .map(|e| {
                    vec![
                        e.title.clone(),
                        e.total_trades.to_string(),
                        fmt_pct(e.win_rate * 100.0),
                        fmt_money(&e.total_profit, cur),
                        fmt_money(&e.average_return, cur),
                        format!("{:.2}R", e.avg_r),
                        fmt_money(&e.best_trade, cur),
                        fmt_money(&e.worst_trade, cur),
                        e.status.to_string(),
                    ]
                })
                .collect();
            println!(
                "{}",
                ctx.table(
                    &["Strategy", "Trades", "Win rate", "Profit", "Avg", "Avg R", "Best", "Worst", "Status"],
                    rows
                )
            );
        }
        _ => {}
    }
    Ok(())
}
