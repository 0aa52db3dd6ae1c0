// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, anyhow};

use super::{Ctx, arg, json_flags, required};
use crate::models::{PipelineProject, ProjectStatus};
use crate::store::{Action, ProjectAction, Store};
use crate::utils::{maybe_print_json, new_id};

fn status_arg(sub: &clap::ArgMatches) -> Result<Option<ProjectStatus>> {
    arg(sub, "status")
        .map(|s| ProjectStatus::parse(s).ok_or_else(|| anyhow!("Unknown status '{}' (idea|active|done)", s)))
        .transpose()
}

fn status_label(s: ProjectStatus) -> &'static str {
    match s {
        ProjectStatus::Idea => "idea",
        ProjectStatus::Active => "active",
        ProjectStatus::Done => "done",
    }
}

pub fn handle(store: &mut Store, ctx: &Ctx, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => {
            let projects = &store.state().projects;
            let (json, jsonl) = json_flags(sub);
            if maybe_print_json(json, jsonl, projects)? {
                return Ok(());
            }
            // Pipeline order: ideas, then active work, then finished.
            let mut sorted: Vec<&PipelineProject> = projects.iter().collect();
            sorted.sort_by_key(|p| p.status as u8);
            let rows = sorted
                .iter()
                .map(|p| {
                    vec![
                        p.id.clone(),
                        status_label(p.status).to_string(),
                        p.title.clone(),
                        p.category.clone(),
                        format!("{}%", p.progress),
                    ]
                })
                .collect();
            println!(
                "{}",
                ctx.table(&["Id", "Stage", "Title", "Category", "Progress"], rows)
            );
        }
        Some(("add", sub)) => {
            let status = status_arg(sub)?.unwrap_or(ProjectStatus::Idea);
            let project = PipelineProject {
                id: new_id(),
                title: required(sub, "title")?.to_string(),
                description: arg(sub, "description").unwrap_or_default().to_string(),
                status,
                category: arg(sub, "category").unwrap_or("General").to_string(),
                progress: sub.get_one::<u32>("progress").copied().unwrap_or(0),
            };
            let id = project.id.clone();
            store.dispatch(Action::Project(ProjectAction::Add(project)))?;
            println!("Added project {}", id);
        }
        Some(("update", sub)) => {
            let id = required(sub, "id")?.to_string();
            store.dispatch(Action::Project(ProjectAction::Update {
                id: id.clone(),
                status: status_arg(sub)?,
                progress: sub.get_one::<u32>("progress").copied(),
            }))?;
            println!("Updated project {}", id);
        }
        Some(("delete", sub)) => {
            let id = required(sub, "id")?.to_string();
            store.dispatch(Action::Project(ProjectAction::Delete { id: id.clone() }))?;
            println!("Removed project {}", id);
        }
        _ => {}
    }
    Ok(())
}
