// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, anyhow};
use rust_decimal::Decimal;

use super::{Ctx, arg, date_arg, decimal_arg, json_flags, required, yes_no};
use crate::coach::Coach;
use crate::metrics::budget_report;
use crate::models::{BucketCategory, BucketType, BudgetBucket, Expense, Income, Priority, SubAllocation};
use crate::seed::currency_symbol;
use crate::state::AppState;
use crate::store::{Action, BucketPatch, BudgetAction, Store};
use crate::utils::{fmt_money, fmt_pct, maybe_print_json, new_id, parse_decimal};

fn priority_arg(sub: &clap::ArgMatches) -> Result<Option<Priority>> {
    arg(sub, "priority")
        .map(|p| Priority::parse(p).ok_or_else(|| anyhow!("Unknown priority '{}'", p)))
        .transpose()
}

fn type_arg(sub: &clap::ArgMatches) -> Result<Option<BucketType>> {
    arg(sub, "type")
        .map(|t| match t.to_lowercase().as_str() {
            "need" => Ok(BucketType::Need),
            "want" => Ok(BucketType::Want),
            _ => Err(anyhow!("Unknown bucket type '{}' (need|want)", t)),
        })
        .transpose()
}

fn category_arg(sub: &clap::ArgMatches) -> Result<Option<BucketCategory>> {
    arg(sub, "category")
        .map(|c| BucketCategory::parse(c).ok_or_else(|| anyhow!("Unknown category '{}'", c)))
        .transpose()
}

/// Buckets still short of their total, most urgent first.
pub fn funding_priorities(st: &AppState) -> Vec<String> {
    let mut open: Vec<&BudgetBucket> = st
        .buckets
        .iter()
        .filter(|b| b.remaining < b.total)
        .collect();
    open.sort_by_key(|b| b.priority);
    open.into_iter().map(|b| b.label.clone()).collect()
}

pub fn handle(store: &mut Store, ctx: &Ctx, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("buckets", sub)) => {
            let st = store.state();
            let (json, jsonl) = json_flags(sub);
            if maybe_print_json(json, jsonl, &st.buckets)? {
                return Ok(());
            }
            let rows = st
                .buckets
                .iter()
                .map(|b| {
                    let allocated: Decimal = b.sub_allocations.iter().map(|s| s.amount).sum();
                    vec![
                        b.id.clone(),
                        b.label.clone(),
                        b.category.label().to_string(),
                        b.priority.as_str().to_string(),
                        fmt_money(&b.remaining, &st.currency),
                        fmt_money(&b.total, &st.currency),
                        fmt_money(&allocated, &st.currency),
                    ]
                })
                .collect();
            println!(
                "{}",
                ctx.table(
                    &["Id", "Bucket", "Category", "Priority", "Remaining", "Total", "Earmarked"],
                    rows
                )
            );
            println!("\"{}\"", st.budget_mantra);
        }
        Some(("add-bucket", sub)) => {
            let total = parse_decimal(required(sub, "total")?)?;
            let bucket = BudgetBucket {
                id: new_id(),
                label: required(sub, "label")?.to_string(),
                icon: arg(sub, "icon").unwrap_or("savings").to_string(),
                remaining: total,
                total,
                color: arg(sub, "color").unwrap_or("blue").to_string(),
                priority: priority_arg(sub)?.unwrap_or(Priority::Medium),
                r#type: type_arg(sub)?.unwrap_or(BucketType::Need),
                category: category_arg(sub)?.unwrap_or(BucketCategory::Stability),
                custom_icon: None,
                sub_allocations: Vec::new(),
            };
            let id = bucket.id.clone();
            store.dispatch(Action::Budget(BudgetAction::AddBucket(bucket)))?;
            println!("Added bucket {}", id);
        }
        Some(("update-bucket", sub)) => {
            let id = required(sub, "id")?.to_string();
            let patch = BucketPatch {
                label: arg(sub, "label").map(str::to_string),
                icon: arg(sub, "icon").map(str::to_string),
                total: decimal_arg(sub, "total")?,
                remaining: decimal_arg(sub, "remaining")?,
                priority: priority_arg(sub)?,
                r#type: type_arg(sub)?,
                category: category_arg(sub)?,
            };
            store.dispatch(Action::Budget(BudgetAction::UpdateBucket {
                id: id.clone(),
                patch,
            }))?;
            println!("Updated bucket {}", id);
        }
        Some(("delete-bucket", sub)) => {
            let id = required(sub, "id")?.to_string();
            store.dispatch(Action::Budget(BudgetAction::DeleteBucket { id: id.clone() }))?;
            println!("Removed bucket {}", id);
        }
        Some(("allocate", sub)) => {
            let sub_alloc = SubAllocation {
                id: new_id(),
                name: required(sub, "name")?.to_string(),
                amount: parse_decimal(required(sub, "amount")?)?,
            };
            let id = sub_alloc.id.clone();
            store.dispatch(Action::Budget(BudgetAction::Allocate {
                bucket_id: required(sub, "bucket")?.to_string(),
                sub: sub_alloc,
            }))?;
            println!("Earmarked {}", id);
        }
        Some(("unallocate", sub)) => {
            store.dispatch(Action::Budget(BudgetAction::Unallocate {
                bucket_id: required(sub, "bucket")?.to_string(),
                sub_id: required(sub, "id")?.to_string(),
            }))?;
            println!("Earmark removed");
        }
        Some(("spend", sub)) => {
            let bucket_id = required(sub, "bucket")?.to_string();
            let label = store
                .state()
                .buckets
                .iter()
                .find(|b| b.id == bucket_id)
                .map(|b| b.label.clone())
                .unwrap_or_default();
            let expense = Expense {
                id: new_id(),
                date: date_arg(sub, "date")?.unwrap_or(ctx.today()),
                category_id: bucket_id,
                category_label: label,
                description: arg(sub, "description").unwrap_or_default().to_string(),
                amount: parse_decimal(required(sub, "amount")?)?,
                payment_type: arg(sub, "payment").unwrap_or("Card").to_string(),
                is_planned: sub.get_flag("planned"),
            };
            let (id, bucket) = (expense.id.clone(), expense.category_id.clone());
            store.dispatch(Action::Budget(BudgetAction::AddExpense(expense)))?;
            let st = store.state();
            if let Some(b) = st.buckets.iter().find(|b| b.id == bucket) {
                println!(
                    "Recorded expense {}; {} left in {}",
                    id,
                    fmt_money(&b.remaining, &st.currency),
                    b.label
                );
            }
        }
        Some(("expenses", sub)) => {
            let st = store.state();
            let (json, jsonl) = json_flags(sub);
            if maybe_print_json(json, jsonl, &st.expenses)? {
                return Ok(());
            }
            let rows = st
                .expenses
                .iter()
                .map(|e| {
                    vec![
                        e.id.clone(),
                        e.date.to_string(),
                        e.category_label.clone(),
                        e.description.clone(),
                        fmt_money(&e.amount, &st.currency),
                        e.payment_type.clone(),
                        yes_no(e.is_planned),
                    ]
                })
                .collect();
            println!(
                "{}",
                ctx.table(
                    &["Id", "Date", "Bucket", "Description", "Amount", "Payment", "Planned"],
                    rows
                )
            );
        }
        Some(("delete-expense", sub)) => {
            let id = required(sub, "id")?.to_string();
            store.dispatch(Action::Budget(BudgetAction::DeleteExpense { id: id.clone() }))?;
            println!("Removed expense {}", id);
        }
        Some(("income", sub)) => {
            let income = Income {
                id: new_id(),
                date: date_arg(sub, "date")?.unwrap_or(ctx.today()),
                amount: parse_decimal(required(sub, "amount")?)?,
                note: arg(sub, "note").unwrap_or_default().to_string(),
            };
            let (id, amount) = (income.id.clone(), income.amount);
            store.dispatch(Action::Budget(BudgetAction::AddIncome(income)))?;
            println!("Recorded income {}", id);
            if sub.get_flag("advise") {
                let st = store.state();
                let coach = Coach::from_config(ctx.config);
                println!(
                    "{}",
                    coach.income_advice(amount, &st.currency, &funding_priorities(st))
                );
            }
        }
        Some(("incomes", sub)) => {
            let st = store.state();
            let (json, jsonl) = json_flags(sub);
            if maybe_print_json(json, jsonl, &st.income_records)? {
                return Ok(());
            }
            let rows = st
                .income_records
                .iter()
                .map(|i| {
                    vec![
                        i.id.clone(),
                        i.date.to_string(),
                        fmt_money(&i.amount, &st.currency),
                        i.note.clone(),
                    ]
                })
                .collect();
            println!("{}", ctx.table(&["Id", "Date", "Amount", "Note"], rows));
        }
        Some(("delete-income", sub)) => {
            let id = required(sub, "id")?.to_string();
            store.dispatch(Action::Budget(BudgetAction::DeleteIncome { id: id.clone() }))?;
            println!("Removed income {}", id);
        }
        Some(("currency", sub)) => {
            let raw = required(sub, "symbol")?;
            let symbol = currency_symbol(raw).unwrap_or(raw).to_string();
            store.dispatch(Action::Budget(BudgetAction::SetCurrency(symbol.clone())))?;
            println!("Currency set to {}", symbol);
        }
        Some(("mantra", sub)) => {
            let text = required(sub, "text")?.to_string();
            store.dispatch(Action::Budget(BudgetAction::SetMantra(text)))?;
            println!("Mantra updated");
        }
        Some(("report", sub)) => {
            let st = store.state();
            let report = budget_report(&st.buckets, &st.expenses, &st.income_records);
            let (json, jsonl) = json_flags(sub);
            if maybe_print_json(json, jsonl, &report)? {
                return Ok(());
            }
            let cur = &st.currency;
            let rows = report
                .lines
                .iter()
                .map(|l| {
                    vec![
                        l.label.clone(),
                        l.category.to_string(),
                        fmt_money(&l.used, cur),
                        fmt_money(&l.total, cur),
                        fmt_pct(l.used_pct),
                    ]
                })
                .collect();
            println!(
                "{}",
                ctx.table(&["Bucket", "Category", "Used", "Total", "Used %"], rows)
            );
            println!(
                "Allocated {} | used {} | remaining {} | growth {} | income {} | spent {}",
                fmt_money(&report.allocated, cur),
                fmt_money(&report.used, cur),
                fmt_money(&report.remaining, cur),
                fmt_money(&report.growth_allocation, cur),
                fmt_money(&report.income, cur),
                fmt_money(&report.spent, cur)
            );
        }
        Some(("insights", _)) => {
            let st = store.state();
            let report = budget_report(&st.buckets, &st.expenses, &st.income_records);
            let coach = Coach::from_config(ctx.config);
            for line in coach.budget_insights(&report, &st.currency) {
                println!("• {}", line);
            }
        }
        _ => {}
    }
    Ok(())
}
