// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use super::{Ctx, required};
use crate::gist::load_config;
use crate::metrics::focus_stats;
use crate::storage::{compact_output, preferred_name, set_compact_output, set_preferred_name};
use crate::store::Store;

pub fn handle(store: &mut Store, ctx: &Ctx, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", _)) => {
            let st = store.state();
            let focus = focus_stats(&st.wins, &st.tasks, &st.trades, &st.mastery_habits);
            let name = preferred_name(ctx.storage)?;
            let linked = !load_config(ctx.storage)?.token.trim().is_empty();
            let rows = vec![
                vec!["Name".to_string(), name.unwrap_or_else(|| "(not set)".into())],
                vec!["Level".to_string(), focus.level.to_string()],
                vec!["Total XP".to_string(), focus.total_xp.to_string()],
                vec!["Currency".to_string(), st.currency.clone()],
                vec![
                    "Compact tables".to_string(),
                    if compact_output(ctx.storage) { "on" } else { "off" }.to_string(),
                ],
                vec![
                    "GitHub backup".to_string(),
                    if linked { "linked" } else { "not linked" }.to_string(),
                ],
            ];
            println!("{}", ctx.table(&["Setting", "Value"], rows));
        }
        Some(("set-name", sub)) => {
            let name = required(sub, "name")?;
            set_preferred_name(ctx.storage, Some(name))?;
            println!("Hello, {}", name);
        }
        Some(("clear-name", _)) => {
            set_preferred_name(ctx.storage, None)?;
            println!("Display name cleared");
        }
        Some(("compact", sub)) => {
            let on = sub.get_one::<String>("mode").map(String::as_str) == Some("on");
            set_compact_output(ctx.storage, on)?;
            println!("Compact tables {}", if on { "on" } else { "off" });
        }
        _ => {}
    }
    Ok(())
}
