// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, anyhow, bail};
use serde_json::json;

use super::{Ctx, arg, date_arg, json_flags, required};
use crate::metrics::skill_progress;
use crate::models::{PracticeEntry, Skill};
use crate::store::{Action, SkillAction, Store};
use crate::utils::{fmt_pct, maybe_print_json, new_id};

fn minutes_arg(sub: &clap::ArgMatches, name: &str) -> Result<u32> {
    sub.get_one::<u32>(name)
        .copied()
        .ok_or_else(|| anyhow!("--{} is required", name))
}

fn hours(mins: u32) -> String {
    format!("{}h {:02}m", mins / 60, mins % 60)
}

pub fn handle(store: &mut Store, ctx: &Ctx, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => {
            let st = store.state();
            let progress: Vec<_> = st.skills.iter().map(skill_progress).collect();
            let (json, jsonl) = json_flags(sub);
            if maybe_print_json(json, jsonl, &progress)? {
                return Ok(());
            }
            let rows = st
                .skills
                .iter()
                .zip(&progress)
                .map(|(s, p)| {
                    vec![
                        s.id.clone(),
                        s.skill_name.clone(),
                        format!("{} / {}", hours(p.practiced), hours(p.target)),
                        fmt_pct(p.pct),
                        s.streak.to_string(),
                        if p.mastered { "mastered".into() } else { s.goal.clone().unwrap_or_default() },
                    ]
                })
                .collect();
            println!(
                "{}",
                ctx.table(&["Id", "Skill", "Practiced", "Progress", "Sessions", "Goal"], rows)
            );
        }
        Some(("add", sub)) => {
            let skill = Skill {
                id: new_id(),
                skill_name: required(sub, "name")?.to_string(),
                target_time: minutes_arg(sub, "target")?,
                start_date: date_arg(sub, "start")?.unwrap_or(ctx.today()),
                goal: arg(sub, "goal").map(str::to_string),
                streak: 0,
                practice_log: Vec::new(),
                icon: arg(sub, "icon").unwrap_or("school").to_string(),
                color: arg(sub, "color").unwrap_or("emerald").to_string(),
            };
            let id = skill.id.clone();
            store.dispatch(Action::Skill(SkillAction::Add(skill)))?;
            println!("Tracking skill {}", id);
        }
        Some(("log", sub)) => {
            let skill_id = required(sub, "id")?.to_string();
            let entry = PracticeEntry {
                id: new_id(),
                date: date_arg(sub, "date")?.unwrap_or(ctx.today()),
                notes: arg(sub, "notes").unwrap_or_default().to_string(),
                time_spent: minutes_arg(sub, "minutes")?,
                achievements: arg(sub, "achievements").unwrap_or_default().to_string(),
            };
            store.dispatch(Action::Skill(SkillAction::LogPractice {
                skill_id: skill_id.clone(),
                entry,
            }))?;
            if let Some(s) = store.state().skills.iter().find(|s| s.id == skill_id) {
                let p = skill_progress(s);
                println!(
                    "{}: {} practiced, {} to go ({})",
                    s.skill_name,
                    hours(p.practiced),
                    hours(p.remaining),
                    fmt_pct(p.pct)
                );
            }
        }
        Some(("goal", sub)) => {
            let id = required(sub, "id")?.to_string();
            let goal = arg(sub, "text").map(str::to_string);
            let cleared = goal.is_none();
            store.dispatch(Action::Skill(SkillAction::SetGoal { id: id.clone(), goal }))?;
            println!("{} goal for {}", if cleared { "Cleared" } else { "Set" }, id);
        }
        Some(("show", sub)) => {
            let id = required(sub, "id")?;
            let Some(s) = store.state().skills.iter().find(|s| s.id == id) else {
                bail!("skill '{}' not found", id);
            };
            let p = skill_progress(s);
            let (json, jsonl) = json_flags(sub);
            if maybe_print_json(json, jsonl, &json!({"skill": s, "progress": p}))? {
                return Ok(());
            }
            println!(
                "{} since {}: {} of {} ({})",
                s.skill_name,
                s.start_date,
                hours(p.practiced),
                hours(p.target),
                fmt_pct(p.pct)
            );
            if let Some(g) = &s.goal {
                println!("Goal: {}", g);
            }
            let rows = s
                .practice_log
                .iter()
                .map(|e| {
                    vec![
                        e.date.to_string(),
                        hours(e.time_spent),
                        e.notes.clone(),
                        e.achievements.clone(),
                    ]
                })
                .collect();
            println!(
                "{}",
                ctx.table(&["Date", "Time", "Notes", "Achievements"], rows)
            );
        }
        Some(("delete", sub)) => {
            let id = required(sub, "id")?.to_string();
            store.dispatch(Action::Skill(SkillAction::Delete { id: id.clone() }))?;
            println!("Removed skill {}", id);
        }
        _ => {}
    }
    Ok(())
}
