// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use super::{Ctx, json_flags};
use crate::metrics::garden;
use crate::store::{Action, EnvelopeAction, Store};
use crate::utils::{fmt_money, fmt_pct, maybe_print_json};

const ROW_WIDTH: usize = 10;

pub fn handle(store: &mut Store, ctx: &Ctx, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => {
            let st = store.state();
            let (json, jsonl) = json_flags(sub);
            if maybe_print_json(json, jsonl, &st.envelopes)? {
                return Ok(());
            }
            // Ten envelopes per row; filled ones show a check instead of the amount.
            let rows = st
                .envelopes
                .chunks(ROW_WIDTH)
                .map(|chunk| {
                    chunk
                        .iter()
                        .map(|e| {
                            if e.completed {
                                format!("#{} ✓", e.id)
                            } else {
                                format!("#{} {}", e.id, fmt_money(&e.value, &st.currency))
                            }
                        })
                        .collect()
                })
                .collect();
            let headers: Vec<String> = (1..=ROW_WIDTH).map(|i| i.to_string()).collect();
            let headers: Vec<&str> = headers.iter().map(String::as_str).collect();
            println!("{}", ctx.table(&headers, rows));
            let g = garden(&st.envelopes);
            println!(
                "{} | saved {} of {}",
                g.label(),
                fmt_money(&g.saved, &st.currency),
                fmt_money(&g.possible, &st.currency)
            );
        }
        Some(("toggle", sub)) => {
            let id = *sub
                .get_one::<u32>("id")
                .ok_or_else(|| anyhow::anyhow!("--id is required"))?;
            store.dispatch(Action::Envelope(EnvelopeAction::Toggle { id }))?;
            let st = store.state();
            if let Some(e) = st.envelopes.iter().find(|e| e.id == id) {
                println!(
                    "Envelope #{} ({}) {}",
                    e.id,
                    fmt_money(&e.value, &st.currency),
                    if e.completed { "filled" } else { "emptied" }
                );
            }
        }
        Some(("reset", _)) => {
            store.dispatch(Action::Envelope(EnvelopeAction::Reset))?;
            println!("All envelopes emptied");
        }
        Some(("garden", sub)) => {
            let st = store.state();
            let g = garden(&st.envelopes);
            let (json, jsonl) = json_flags(sub);
            if maybe_print_json(json, jsonl, &g)? {
                return Ok(());
            }
            println!(
                "{} {} ({})",
                g.stage.emoji(),
                g.label(),
                fmt_pct(g.pct)
            );
            println!(
                "Saved {} of {}",
                fmt_money(&g.saved, &st.currency),
                fmt_money(&g.possible, &st.currency)
            );
        }
        _ => {}
    }
    Ok(())
}
