// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use super::{Ctx, arg, json_flags, required};
use crate::models::MasteryHabit;
use crate::store::{Action, MasteryAction, MasteryPatch, Store};
use crate::utils::{maybe_print_json, new_id};

pub fn handle(store: &mut Store, ctx: &Ctx, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => {
            let habits = &store.state().mastery_habits;
            let (json, jsonl) = json_flags(sub);
            if maybe_print_json(json, jsonl, habits)? {
                return Ok(());
            }
            let rows = habits
                .iter()
                .map(|h| {
                    vec![
                        h.id.clone(),
                        h.label.clone(),
                        format!("{}/{}", h.progress, h.total),
                        h.subject.clone().unwrap_or_default(),
                        h.duration.map(|d| format!("{}m", d)).unwrap_or_default(),
                        h.tags.join(", "),
                    ]
                })
                .collect();
            println!(
                "{}",
                ctx.table(&["Id", "Habit", "Progress", "Subject", "Duration", "Tags"], rows)
            );
        }
        Some(("add", sub)) => {
            let total = *sub.get_one::<u32>("total").unwrap_or(&1);
            let tags = arg(sub, "tags")
                .map(|t| {
                    t.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default();
            let habit = MasteryHabit {
                id: new_id(),
                label: required(sub, "label")?.to_string(),
                icon: arg(sub, "icon").unwrap_or("bolt").to_string(),
                tags,
                progress: 0,
                total,
                color: arg(sub, "color").unwrap_or("indigo").to_string(),
                subject: arg(sub, "subject").map(str::to_string),
                duration: sub.get_one::<u32>("duration").copied(),
            };
            let id = habit.id.clone();
            store.dispatch(Action::Mastery(MasteryAction::Add(habit)))?;
            println!("Added mastery habit {}", id);
        }
        Some(("inc", sub)) => {
            let id = required(sub, "id")?.to_string();
            store.dispatch(Action::Mastery(MasteryAction::Increment { id: id.clone() }))?;
            if let Some(h) = store.state().mastery_habits.iter().find(|h| h.id == id) {
                println!("{}: {}/{}", h.label, h.progress, h.total);
            }
        }
        Some(("update", sub)) => {
            let id = required(sub, "id")?.to_string();
            let patch = MasteryPatch {
                label: arg(sub, "label").map(str::to_string),
                subject: arg(sub, "subject").map(str::to_string),
                duration: sub.get_one::<u32>("duration").copied(),
                total: sub.get_one::<u32>("total").copied(),
            };
            store.dispatch(Action::Mastery(MasteryAction::Update { id: id.clone(), patch }))?;
            println!("Updated mastery habit {}", id);
        }
        Some(("delete", sub)) => {
            let id = required(sub, "id")?.to_string();
            store.dispatch(Action::Mastery(MasteryAction::Delete { id: id.clone() }))?;
            println!("Removed mastery habit {}", id);
        }
        _ => {}
    }
    Ok(())
}
