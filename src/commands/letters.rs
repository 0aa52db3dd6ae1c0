// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};

use super::{Ctx, json_flags, required};
use crate::calendar::upcoming_letter;
use crate::models::FutureLetter;
use crate::store::{Action, LetterAction, Store};
use crate::utils::{maybe_print_json, new_id, parse_date};

pub fn handle(store: &mut Store, ctx: &Ctx, m: &clap::ArgMatches) -> Result<()> {
    let today = ctx.today();
    match m.subcommand() {
        Some(("list", sub)) => {
            let st = store.state();
            // Lock state is re-derived from the date, the stored flag may be stale.
            let letters: Vec<FutureLetter> = st
                .letters
                .iter()
                .cloned()
                .map(|mut l| {
                    l.is_locked = l.is_locked_on(today);
                    if l.is_locked {
                        l.content.clear();
                    }
                    l
                })
                .collect();
            let (json, jsonl) = json_flags(sub);
            if maybe_print_json(json, jsonl, &letters)? {
                return Ok(());
            }
            let rows = letters
                .iter()
                .map(|l| {
                    let status = if l.is_locked {
                        format!("locked, {} day(s) left", (l.unlock_date - today).num_days())
                    } else {
                        "open".to_string()
                    };
                    vec![
                        l.id.clone(),
                        l.title.clone(),
                        l.created_at.to_string(),
                        l.unlock_date.to_string(),
                        status,
                    ]
                })
                .collect();
            println!(
                "{}",
                ctx.table(&["Id", "Title", "Written", "Unlocks", "Status"], rows)
            );
            if let Some(l) = upcoming_letter(&st.letters, today) {
                println!("\"{}\" unlocks in 5 days", l.title);
            }
        }
        Some(("add", sub)) => {
            let unlock = parse_date(required(sub, "unlock")?)?;
            let letter = FutureLetter {
                id: new_id(),
                title: required(sub, "title")?.to_string(),
                content: required(sub, "content")?.to_string(),
                created_at: today,
                unlock_date: unlock,
                is_locked: unlock > today,
            };
            let id = letter.id.clone();
            store.dispatch(Action::Letter(LetterAction::Add(letter)))?;
            println!("Saved letter {} (unlocks {})", id, unlock);
        }
        Some(("read", sub)) => {
            let id = required(sub, "id")?;
            let Some(l) = store.state().letters.iter().find(|l| l.id == id) else {
                bail!("letter '{}' not found", id);
            };
            if l.is_locked_on(today) {
                bail!(
                    "\"{}\" stays sealed until {} ({} day(s) left)",
                    l.title,
                    l.unlock_date,
                    (l.unlock_date - today).num_days()
                );
            }
            println!("{}  (written {})", l.title, l.created_at);
            println!();
            println!("{}", l.content);
        }
        Some(("delete", sub)) => {
            let id = required(sub, "id")?.to_string();
            store.dispatch(Action::Letter(LetterAction::Delete { id: id.clone() }))?;
            println!("Removed letter {}", id);
        }
        _ => {}
    }
    Ok(())
}
