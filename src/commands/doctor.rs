// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::collections::HashSet;

use super::Ctx;
use crate::state::AppState;
use crate::store::Store;

/// Dangling references and values the reducers would refuse today.
pub fn find_issues(st: &AppState) -> Vec<Vec<String>> {
    let mut rows = Vec::new();

    // 1) Trades pointing at accounts or strategies that are gone
    for t in &st.trades {
        if let Some(acc) = &t.account_id {
            if st.account(acc).is_none() {
                rows.push(vec!["trade_unknown_account".into(), format!("{} -> {}", t.id, acc)]);
            }
        }
        if let Some(s) = &t.strategy_id {
            if st.strategy(s).is_none() {
                rows.push(vec!["trade_unknown_strategy".into(), format!("{} -> {}", t.id, s)]);
            }
        }
    }

    // 2) Expenses against deleted buckets
    let buckets: HashSet<&str> = st.buckets.iter().map(|b| b.id.as_str()).collect();
    for e in &st.expenses {
        if !buckets.contains(e.category_id.as_str()) {
            rows.push(vec![
                "expense_unknown_bucket".into(),
                format!("{} -> {} ({})", e.id, e.category_id, e.category_label),
            ]);
        }
    }

    // 3) Primary account count
    if !st.accounts.is_empty() {
        let primaries = st.accounts.iter().filter(|a| a.is_primary).count();
        if primaries != 1 {
            rows.push(vec!["primary_accounts".into(), format!("{} marked primary", primaries)]);
        }
    }

    // 4) Envelope numbering
    for (i, e) in st.envelopes.iter().enumerate() {
        if e.id as usize != i + 1 {
            rows.push(vec!["envelope_order".into(), format!("slot {} holds #{}", i + 1, e.id)]);
            break;
        }
    }

    // 5) Mastery habits past their total
    for h in &st.mastery_habits {
        if h.progress > h.total {
            rows.push(vec![
                "mastery_overflow".into(),
                format!("{} at {}/{}", h.label, h.progress, h.total),
            ]);
        }
    }

    rows
}

pub fn handle(store: &mut Store, ctx: &Ctx) -> Result<()> {
    let rows = find_issues(store.state());
    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", ctx.table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
