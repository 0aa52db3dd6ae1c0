// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::sync::Arc;

use super::{Ctx, arg, date_arg, json_flags, required, yes_no};
use crate::coach::{Coach, CoachTrigger, LOADING_MESSAGE, TRIGGER_DELAY};
use crate::metrics::habit_week;
use crate::models::Win;
use crate::store::{Action, HabitAction, Store, WinPatch};
use crate::utils::{maybe_print_json, new_id};

pub fn handle(store: &mut Store, ctx: &Ctx, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(store, ctx, sub)?,
        Some(("add", sub)) => {
            let win = Win {
                id: new_id(),
                label: required(sub, "label")?.to_string(),
                icon: arg(sub, "icon").unwrap_or("check_circle").to_string(),
                completed: false,
                color: arg(sub, "color").unwrap_or("blue").to_string(),
                streak: 0,
                custom_icon: None,
                completion_history: Vec::new(),
            };
            let id = win.id.clone();
            store.dispatch(Action::Habit(HabitAction::Add(win)))?;
            println!("Added win {}", id);
        }
        Some(("toggle", sub)) => toggle(store, ctx, sub)?,
        Some(("update", sub)) => {
            let patch = WinPatch {
                label: arg(sub, "label").map(str::to_string),
                icon: arg(sub, "icon").map(str::to_string),
                color: arg(sub, "color").map(str::to_string),
                custom_icon: arg(sub, "custom-icon").map(str::to_string),
            };
            let id = required(sub, "id")?.to_string();
            store.dispatch(Action::Habit(HabitAction::Update { id: id.clone(), patch }))?;
            println!("Updated win {}", id);
        }
        Some(("delete", sub)) => {
            let id = required(sub, "id")?.to_string();
            store.dispatch(Action::Habit(HabitAction::Delete { id: id.clone() }))?;
            println!("Removed win {}", id);
        }
        Some(("week", sub)) => week(store, ctx, sub)?,
        _ => {}
    }
    Ok(())
}

fn list(store: &Store, ctx: &Ctx, sub: &clap::ArgMatches) -> Result<()> {
    let wins = &store.state().wins;
    let (json, jsonl) = json_flags(sub);
    if maybe_print_json(json, jsonl, wins)? {
        return Ok(());
    }
    let rows = wins
        .iter()
        .map(|w| {
            vec![
                w.id.clone(),
                w.label.clone(),
                yes_no(w.completed),
                format!("{}🔥", w.streak),
                w.completion_history.len().to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        ctx.table(&["Id", "Win", "Done", "Streak", "Days"], rows)
    );
    let done = wins.iter().filter(|w| w.completed).count();
    println!("{}/{} wins today", done, wins.len());
    Ok(())
}

fn toggle(store: &mut Store, ctx: &Ctx, sub: &clap::ArgMatches) -> Result<()> {
    let id = required(sub, "id")?.to_string();
    let today = ctx.today();
    let on = date_arg(sub, "date")?.unwrap_or(today);
    store.dispatch(Action::Habit(HabitAction::Toggle {
        id: id.clone(),
        on,
        today,
    }))?;

    if let Some(w) = store.state().wins.iter().find(|w| w.id == id) {
        let marked = w.completion_history.contains(&on);
        println!(
            "{} '{}' for {} (streak {})",
            if marked { "Marked" } else { "Unmarked" },
            w.label,
            on,
            w.streak
        );
    }

    if sub.get_flag("coach") {
        let wins = &store.state().wins;
        let done = wins.iter().filter(|w| w.completed).count();
        let coach = Arc::new(Coach::from_config(ctx.config));
        println!("{}", LOADING_MESSAGE);
        let trigger = CoachTrigger::new(coach, TRIGGER_DELAY, |msg| println!("{}", msg));
        trigger.notify(done, wins.len());
        trigger.flush();
    }
    Ok(())
}

fn week(store: &Store, ctx: &Ctx, sub: &clap::ArgMatches) -> Result<()> {
    let (days, avg) = habit_week(&store.state().wins, ctx.today());
    let (json, jsonl) = json_flags(sub);
    if maybe_print_json(json, jsonl, &days)? {
        return Ok(());
    }
    let rows = days
        .iter()
        .map(|d| {
            vec![
                d.date.format("%a %d").to_string(),
                format!("{}/{}", d.completed, d.total),
                format!("{:.0}%", d.pct),
            ]
        })
        .collect();
    println!("{}", ctx.table(&["Day", "Done", "Rate"], rows));
    println!("Weekly average: {}%", avg);
    Ok(())
}
