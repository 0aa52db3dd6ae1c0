// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};

use super::{Ctx, json_flags, required};
use crate::calendar::daily_devotion;
use crate::models::Devotion;
use crate::seed::devotions;
use crate::store::{Action, ScriptureAction, Store};
use crate::utils::maybe_print_json;

fn print_devotion(d: &Devotion, hearted: bool) {
    println!("{}{}", d.reference, if hearted { " ♥" } else { "" });
    println!("\"{}\"", d.verse);
    println!();
    println!("{}", d.reflection);
}

pub fn handle(store: &mut Store, ctx: &Ctx, m: &clap::ArgMatches) -> Result<()> {
    let all = devotions();
    match m.subcommand() {
        Some(("today", sub)) => {
            let Some(d) = daily_devotion(&all, ctx.today()) else {
                bail!("no devotions available");
            };
            let (json, jsonl) = json_flags(sub);
            if maybe_print_json(json, jsonl, d)? {
                return Ok(());
            }
            let hearted = store
                .state()
                .hearted_scriptures
                .iter()
                .any(|h| h.reference == d.reference);
            print_devotion(d, hearted);
        }
        Some(("list", sub)) => {
            let (json, jsonl) = json_flags(sub);
            if maybe_print_json(json, jsonl, &all)? {
                return Ok(());
            }
            let hearted = &store.state().hearted_scriptures;
            let rows = all
                .iter()
                .map(|d| {
                    let mark = hearted.iter().any(|h| h.reference == d.reference);
                    vec![
                        d.reference.clone(),
                        d.verse.clone(),
                        if mark { "♥".into() } else { String::new() },
                    ]
                })
                .collect();
            println!("{}", ctx.table(&["Reference", "Verse", ""], rows));
        }
        Some(("heart", sub)) => {
            let reference = required(sub, "ref")?;
            let found = all
                .iter()
                .chain(store.state().hearted_scriptures.iter())
                .find(|d| d.reference.eq_ignore_ascii_case(reference))
                .cloned();
            let Some(d) = found else {
                bail!("no verse with reference '{}'", reference);
            };
            let name = d.reference.clone();
            store.dispatch(Action::Scripture(ScriptureAction::ToggleHeart(d)))?;
            let on = store
                .state()
                .hearted_scriptures
                .iter()
                .any(|h| h.reference == name);
            println!("{} {}", name, if on { "bookmarked" } else { "removed from bookmarks" });
        }
        Some(("hearted", sub)) => {
            let hearted = &store.state().hearted_scriptures;
            let (json, jsonl) = json_flags(sub);
            if maybe_print_json(json, jsonl, hearted)? {
                return Ok(());
            }
            if hearted.is_empty() {
                println!("No bookmarked verses yet");
                return Ok(());
            }
            for (i, d) in hearted.iter().enumerate() {
                if i > 0 {
                    println!("---");
                }
                print_devotion(d, true);
            }
        }
        _ => {}
    }
    Ok(())
}
