// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use rand::Rng;
use rust_decimal::Decimal;
use serde_json::json;
use std::collections::BTreeMap;

use super::{Ctx, arg, json_flags};
use crate::calendar::{daily_devotion, day_clock, month_grid, upcoming_letter, week_of_month};
use crate::metrics::{focus_stats, greeting, habit_week, monthly_stats, trading_mood};
use crate::models::Trade;
use crate::seed::devotions;
use crate::storage::preferred_name;
use crate::store::Store;
use crate::utils::{fmt_money, fmt_pct, maybe_print_json, parse_month};

fn daily_pnl(trades: &[Trade]) -> BTreeMap<NaiveDate, Decimal> {
    let mut out = BTreeMap::new();
    for t in trades {
        *out.entry(t.day()).or_insert(Decimal::ZERO) += t.pnl;
    }
    out
}

pub fn handle(store: &mut Store, ctx: &Ctx, m: &clap::ArgMatches) -> Result<()> {
    let st = store.state();
    let today = ctx.today();
    match m.subcommand() {
        Some(("dashboard", sub)) => {
            let focus = focus_stats(&st.wins, &st.tasks, &st.trades, &st.mastery_habits);
            let clock = day_clock(ctx.now);
            let (week, avg) = habit_week(&st.wins, today);
            let done = st.wins.iter().filter(|w| w.completed).count();
            let all = devotions();
            let devotion = daily_devotion(&all, today);
            let letter = upcoming_letter(&st.letters, today);
            let name = preferred_name(ctx.storage)?;
            let mood = trading_mood(&st.trades, today);
            let hello = greeting(mood, rand::rng().random_range(0..usize::MAX), name.as_deref());

            let (json, jsonl) = json_flags(sub);
            let payload = json!({
                "focus": focus,
                "clock": clock,
                "greeting": hello,
                "mood": mood,
                "winsCompleted": done,
                "winsTotal": st.wins.len(),
                "week": week,
                "weekAverage": avg,
                "devotion": devotion,
                "upcomingLetter": letter.map(|l| &l.title),
            });
            if maybe_print_json(json, jsonl, &payload)? {
                return Ok(());
            }

            println!("{}", hello);
            println!(
                "Level {} | {} / {} XP",
                focus.level, focus.xp, focus.xp_to_next
            );
            println!(
                "Day {} of {} | {:02}:{:02}:{:02} left | {} of the day gone",
                clock.day_of_year,
                clock.days_in_year,
                clock.hours_left,
                clock.minutes_left,
                clock.seconds_left,
                fmt_pct(clock.elapsed_pct)
            );
            println!("Wins today: {}/{}", done, st.wins.len());
            let rows = vec![
                week.iter().map(|d| d.date.format("%a").to_string()).collect(),
                week.iter().map(|d| format!("{:.0}%", d.pct)).collect(),
            ];
            let headers: Vec<String> = week.iter().map(|d| d.date.format("%d").to_string()).collect();
            let headers: Vec<&str> = headers.iter().map(String::as_str).collect();
            println!("{}", ctx.table(&headers, rows));
            println!("Weekly average: {}%", avg);
            if let Some(d) = devotion {
                println!("{}: \"{}\"", d.reference, d.verse);
            }
            if let Some(l) = letter {
                println!("Letter \"{}\" unlocks in 5 days", l.title);
            }
        }
        Some(("calendar", sub)) => {
            let (year, month) = match arg(sub, "month") {
                Some(raw) => parse_month(raw)?,
                None => (today.year(), today.month()),
            };
            let grid = month_grid(year, month);
            let pnl = daily_pnl(&st.trades);
            let journal: Vec<&Trade> = st.trades.iter().collect();
            let summary = monthly_stats(&journal, year, month);

            let (json, jsonl) = json_flags(sub);
            if json || jsonl {
                let days: Vec<_> = grid
                    .iter()
                    .filter(|c| c.in_month)
                    .map(|c| {
                        json!({
                            "date": c.date,
                            "week": week_of_month(c.date),
                            "pnl": pnl.get(&c.date),
                        })
                    })
                    .collect();
                maybe_print_json(json, jsonl, &json!({"days": days, "summary": summary}))?;
                return Ok(());
            }

            let cur = &st.currency;
            let rows = grid
                .chunks(7)
                .map(|week| {
                    week.iter()
                        .map(|c| {
                            if !c.in_month {
                                return String::new();
                            }
                            let mark = if c.date == today { "*" } else { "" };
                            match pnl.get(&c.date) {
                                Some(p) => format!("{}{}\n{}", c.date.day(), mark, fmt_money(p, cur)),
                                None => format!("{}{}", c.date.day(), mark),
                            }
                        })
                        .collect()
                })
                .collect();
            println!("{}-{:02}", year, month);
            println!(
                "{}",
                ctx.table(&["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"], rows)
            );
            println!(
                "{} trade(s) | win rate {} | P&L {} | best day {} | worst day {}",
                summary.total_trades,
                fmt_pct(summary.win_rate * 100.0),
                fmt_money(&summary.total_pnl, cur),
                fmt_money(&summary.best_day_pnl, cur),
                fmt_money(&summary.worst_day_pnl, cur)
            );
        }
        _ => {}
    }
    Ok(())
}
