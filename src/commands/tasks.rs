// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, anyhow};
use serde_json::json;

use super::{Ctx, arg, date_arg, json_flags, required, yes_no};
use crate::calendar::{agenda_highlight, schedule_strip, tasks_on};
use crate::models::{Priority, ScheduleTask};
use crate::store::{Action, Store, TaskAction};
use crate::utils::{maybe_print_json, new_id, parse_time};

fn time_span(t: &ScheduleTask) -> String {
    match t.time_end {
        Some(end) => format!("{}-{}", t.time_start.format("%H:%M"), end.format("%H:%M")),
        None => t.time_start.format("%H:%M").to_string(),
    }
}

pub fn handle(store: &mut Store, ctx: &Ctx, m: &clap::ArgMatches) -> Result<()> {
    let today = ctx.today();
    match m.subcommand() {
        Some(("list", sub)) => {
            let date = date_arg(sub, "date")?.unwrap_or(today);
            let tasks = tasks_on(&store.state().tasks, date, today);
            let (json, jsonl) = json_flags(sub);
            if maybe_print_json(json, jsonl, &tasks)? {
                return Ok(());
            }
            let rows = tasks
                .iter()
                .map(|t| {
                    vec![
                        t.id.clone(),
                        time_span(t),
                        t.title.clone(),
                        t.priority.as_str().to_string(),
                        t.category.clone(),
                        yes_no(t.completed),
                    ]
                })
                .collect();
            println!("{}", date.format("%A, %B %-d"));
            println!(
                "{}",
                ctx.table(&["Id", "Time", "Task", "Priority", "Category", "Done"], rows)
            );
        }
        Some(("add", sub)) => {
            let raw_priority = arg(sub, "priority").unwrap_or("medium");
            let task = ScheduleTask {
                id: new_id(),
                title: required(sub, "title")?.to_string(),
                time_start: parse_time(required(sub, "start")?)?,
                time_end: arg(sub, "end").map(parse_time).transpose()?,
                priority: Priority::parse(raw_priority)
                    .ok_or_else(|| anyhow!("Unknown priority '{}'", raw_priority))?,
                completed: false,
                category: arg(sub, "category").unwrap_or("General").to_string(),
                date: date_arg(sub, "date")?,
            };
            let id = task.id.clone();
            store.dispatch(Action::Task(TaskAction::Add(task)))?;
            println!("Scheduled task {}", id);
        }
        Some(("toggle", sub)) => {
            let id = required(sub, "id")?.to_string();
            store.dispatch(Action::Task(TaskAction::Toggle { id: id.clone() }))?;
            let done = store
                .state()
                .tasks
                .iter()
                .any(|t| t.id == id && t.completed);
            println!("Task {} {}", id, if done { "completed" } else { "reopened" });
        }
        Some(("delete", sub)) => {
            let id = required(sub, "id")?.to_string();
            store.dispatch(Action::Task(TaskAction::Delete { id: id.clone() }))?;
            println!("Removed task {}", id);
        }
        Some(("agenda", sub)) => {
            let hl = agenda_highlight(&store.state().tasks, ctx.now);
            let (json, jsonl) = json_flags(sub);
            if maybe_print_json(json, jsonl, &hl)? {
                return Ok(());
            }
            match hl.active {
                Some(t) => println!("Now: {} ({})", t.title, time_span(t)),
                None => println!("Now: nothing scheduled"),
            }
            match (hl.upcoming, hl.time_until_next.as_deref()) {
                (Some(t), Some(wait)) => println!("Next: {} at {} (in {})", t.title, time_span(t), wait),
                _ => println!("Next: free for the rest of the day"),
            }
        }
        Some(("strip", sub)) => {
            let st = store.state();
            let days: Vec<_> = schedule_strip(today)
                .into_iter()
                .map(|d| {
                    let tasks = tasks_on(&st.tasks, d, today);
                    let done = tasks.iter().filter(|t| t.completed).count();
                    (d, tasks.len(), done)
                })
                .collect();
            let (json, jsonl) = json_flags(sub);
            let payload: Vec<_> = days
                .iter()
                .map(|(d, total, done)| json!({"date": d, "tasks": total, "completed": done}))
                .collect();
            if maybe_print_json(json, jsonl, &payload)? {
                return Ok(());
            }
            let rows = days
                .iter()
                .map(|(d, total, done)| {
                    let marker = if *d == today { " •" } else { "" };
                    vec![
                        format!("{}{}", d.format("%a %d"), marker),
                        total.to_string(),
                        done.to_string(),
                    ]
                })
                .collect();
            println!("{}", ctx.table(&["Day", "Tasks", "Done"], rows));
        }
        _ => {}
    }
    Ok(())
}
