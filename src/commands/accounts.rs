// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, anyhow};

use super::{Ctx, arg, decimal_arg, json_flags, required};
use crate::models::{AccountKind, Phase, TradingAccount};
use crate::store::{AccountAction, AccountPatch, Action, Store};
use crate::utils::{fmt_money, maybe_print_json, new_id, parse_decimal};

fn phase_arg(sub: &clap::ArgMatches) -> Result<Option<Phase>> {
    arg(sub, "phase")
        .map(|p| Phase::parse(p).ok_or_else(|| anyhow!("Unknown phase '{}'", p)))
        .transpose()
}

fn patch_from(sub: &clap::ArgMatches) -> Result<AccountPatch> {
    Ok(AccountPatch {
        name: arg(sub, "name").map(str::to_string),
        balance: decimal_arg(sub, "balance")?,
        currency: arg(sub, "currency").map(str::to_string),
        phase: phase_arg(sub)?,
        target_profit_pct: decimal_arg(sub, "target")?,
        daily_drawdown_pct: decimal_arg(sub, "daily-dd")?,
        max_drawdown_pct: decimal_arg(sub, "max-dd")?,
        initial_phase_balance: decimal_arg(sub, "initial")?,
        equity: decimal_arg(sub, "equity")?,
        start_of_day_balance: decimal_arg(sub, "start-of-day")?,
        highest_equity: decimal_arg(sub, "peak")?,
        ..AccountPatch::default()
    })
}

pub fn handle(store: &mut Store, ctx: &Ctx, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => {
            let accounts = &store.state().accounts;
            let (json, jsonl) = json_flags(sub);
            if maybe_print_json(json, jsonl, accounts)? {
                return Ok(());
            }
            let rows = accounts
                .iter()
                .map(|a| {
                    vec![
                        a.id.clone(),
                        a.name.clone(),
                        a.r#type.label().to_string(),
                        fmt_money(&a.balance, &a.currency),
                        a.phase.map(|p| p.label().to_string()).unwrap_or_default(),
                        if a.is_primary { "★".into() } else { String::new() },
                    ]
                })
                .collect();
            println!(
                "{}",
                ctx.table(&["Id", "Name", "Type", "Balance", "Phase", "Primary"], rows)
            );
        }
        Some(("add", sub)) => {
            let kind_raw = required(sub, "type")?;
            let kind = AccountKind::parse(kind_raw)
                .ok_or_else(|| anyhow!("Unknown account type '{}'", kind_raw))?;
            let balance = parse_decimal(required(sub, "balance")?)?;
            let mut acc = TradingAccount::new(
                &new_id(),
                required(sub, "name")?,
                kind,
                balance,
                arg(sub, "currency").unwrap_or("$"),
            );
            acc.is_primary = sub.get_flag("primary");
            acc.target_profit_pct = decimal_arg(sub, "target")?;
            acc.daily_drawdown_pct = decimal_arg(sub, "daily-dd")?;
            acc.max_drawdown_pct = decimal_arg(sub, "max-dd")?;
            acc.equity = decimal_arg(sub, "equity")?;
            acc.start_of_day_balance = decimal_arg(sub, "start-of-day")?;
            acc.highest_equity = decimal_arg(sub, "peak")?;
            if kind == AccountKind::PropFirm {
                acc.phase = Some(phase_arg(sub)?.unwrap_or(Phase::Phase1));
                acc.initial_phase_balance = Some(decimal_arg(sub, "initial")?.unwrap_or(balance));
            }
            let id = acc.id.clone();
            store.dispatch(Action::Account(AccountAction::Add(acc)))?;
            println!("Added account {}", id);
        }
        Some(("update", sub)) => {
            let id = required(sub, "id")?.to_string();
            let patch = patch_from(sub)?;
            store.dispatch(Action::Account(AccountAction::Update {
                id: id.clone(),
                patch,
            }))?;
            println!("Updated account {}", id);
        }
        Some(("select", sub)) => {
            let id = required(sub, "id")?.to_string();
            store.dispatch(Action::Account(AccountAction::Select { id: id.clone() }))?;
            println!("Primary account is now {}", id);
        }
        Some(("delete", sub)) => {
            let id = required(sub, "id")?.to_string();
            let trades = store
                .state()
                .trades
                .iter()
                .filter(|t| t.account_id.as_deref() == Some(id.as_str()))
                .count();
            store.dispatch(Action::Account(AccountAction::Delete { id: id.clone() }))?;
            println!("Removed account {} and {} trade(s)", id, trades);
        }
        _ => {}
    }
    Ok(())
}
