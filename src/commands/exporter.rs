// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::json;
use std::path::Path;

use super::{Ctx, arg, required};
use crate::state::AppState;
use crate::store::Store;

/// The string a value is stored as, e.g. `"LONG"` or `"New York"`.
fn wire<T: Serialize>(v: &T) -> String {
    match serde_json::to_value(v) {
        Ok(serde_json::Value::String(s)) => s,
        Ok(other) => other.to_string(),
        Err(_) => String::new(),
    }
}

pub fn handle(store: &mut Store, _ctx: &Ctx, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("trades", sub)) => {
            let out = required(sub, "path")?;
            let fmt = arg(sub, "format").unwrap_or("csv").to_lowercase();
            export_trades(store.state(), &fmt, Path::new(out))?;
            println!("Exported {} trade(s) to {}", store.state().trades.len(), out);
        }
        Some(("state", sub)) => {
            let out = required(sub, "path")?;
            std::fs::write(out, serde_json::to_string_pretty(store.state())?)
                .with_context(|| format!("writing {}", out))?;
            println!("Exported state to {}", out);
        }
        _ => {}
    }
    Ok(())
}

pub fn export_trades(st: &AppState, fmt: &str, out: &Path) -> Result<()> {
    let account_name = |id: &Option<String>| {
        id.as_deref()
            .and_then(|id| st.account(id))
            .map(|a| a.name.clone())
            .unwrap_or_default()
    };
    let strategy_title = |id: &Option<String>| {
        id.as_deref()
            .and_then(|id| st.strategy(id))
            .map(|s| s.title.clone())
            .unwrap_or_default()
    };

    match fmt {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)
                .with_context(|| format!("creating {}", out.display()))?;
            wtr.write_record([
                "time", "pair", "type", "entry", "pnl", "rr", "status", "account", "strategy",
                "mood", "session", "duration", "notes",
            ])?;
            for t in &st.trades {
                wtr.write_record([
                    t.time.format("%Y-%m-%d %H:%M").to_string(),
                    t.pair.clone(),
                    wire(&t.r#type),
                    t.entry.to_string(),
                    t.pnl.to_string(),
                    t.rr.clone(),
                    wire(&t.status),
                    account_name(&t.account_id),
                    strategy_title(&t.strategy_id),
                    t.mood.as_ref().map(wire).unwrap_or_default(),
                    t.session.as_ref().map(wire).unwrap_or_default(),
                    t.duration.clone().unwrap_or_default(),
                    t.notes.clone().unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let items: Vec<_> = st
                .trades
                .iter()
                .map(|t| {
                    json!({
                        "trade": t,
                        "account": account_name(&t.account_id),
                        "strategy": strategy_title(&t.strategy_id),
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)
                .with_context(|| format!("writing {}", out.display()))?;
        }
        other => anyhow::bail!("Unknown format: {} (use csv|json)", other),
    }
    Ok(())
}
