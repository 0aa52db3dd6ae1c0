// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};

use super::{Ctx, arg, json_flags};
use crate::coach::{Coach, IDLE_MESSAGE};
use crate::live::{DashboardContext, OUTPUT_SAMPLE_RATE, duration_secs, system_instruction, wav_bytes};
use crate::storage::{CoachMemory, Speaker};
use crate::store::Store;
use crate::utils::maybe_print_json;

pub fn handle(store: &mut Store, ctx: &Ctx, m: &clap::ArgMatches) -> Result<()> {
    let st = store.state();
    match m.subcommand() {
        Some(("checkin", _)) => {
            let total = st.wins.len();
            if total == 0 {
                println!("{}", IDLE_MESSAGE);
                return Ok(());
            }
            let done = st.wins.iter().filter(|w| w.completed).count();
            let coach = Coach::from_config(ctx.config);
            println!("{}", coach.check_in(done, total));
        }
        Some(("memory", sub)) => {
            let memory = CoachMemory::new(ctx.storage);
            if sub.get_flag("clear") {
                memory.clear()?;
                println!("Coach memory cleared");
                return Ok(());
            }
            let entries = memory.entries();
            let (json, jsonl) = json_flags(sub);
            if maybe_print_json(json, jsonl, &entries)? {
                return Ok(());
            }
            if entries.is_empty() {
                println!("No conversations remembered yet");
                return Ok(());
            }
            let rows = entries
                .iter()
                .map(|e| {
                    vec![
                        e.date.format("%Y-%m-%d %H:%M").to_string(),
                        match e.sender {
                            Speaker::User => "you".to_string(),
                            Speaker::Coach => "coach".to_string(),
                        },
                        e.text.clone(),
                    ]
                })
                .collect();
            println!("{}", ctx.table(&["When", "Who", "Said"], rows));
        }
        Some(("speak", sub)) => {
            let coach = Coach::from_config(ctx.config);
            let text = match arg(sub, "text") {
                Some(t) => t.to_string(),
                None if st.wins.is_empty() => IDLE_MESSAGE.to_string(),
                None => {
                    let done = st.wins.iter().filter(|w| w.completed).count();
                    coach.check_in(done, st.wins.len())
                }
            };
            let frames = coach.speak(&text).context("speech synthesis failed")?;
            let out = arg(sub, "out").unwrap_or("coach.wav");
            std::fs::write(out, wav_bytes(&frames, OUTPUT_SAMPLE_RATE))
                .with_context(|| format!("writing {out}"))?;
            println!(
                "\"{}\" saved to {} ({:.1}s)",
                text,
                out,
                duration_secs(frames.len(), OUTPUT_SAMPLE_RATE)
            );
        }
        Some(("context", _)) => {
            let dashboard = DashboardContext::from_state(st);
            let history = CoachMemory::new(ctx.storage).transcript();
            println!("{}", system_instruction(Some(&dashboard), &history));
        }
        _ => {}
    }
    Ok(())
}
