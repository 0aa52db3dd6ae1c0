// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};
use std::sync::Arc;

use masteryhub::commands::{self, Ctx};
use masteryhub::config::AppConfig;
use masteryhub::state::AppState;
use masteryhub::storage::{STATE_KEY, SqliteStorage, StoragePort, db_path, load_state, save_state};
use masteryhub::store::{AUTOSAVE_DELAY, Action, HabitAction, Store};
use masteryhub::{cli, logging};

fn init(storage: &dyn StoragePort, sub: &clap::ArgMatches) -> Result<()> {
    if storage.get(STATE_KEY)?.is_some() && !sub.get_flag("force") {
        bail!("State already exists; pass --force to overwrite it");
    }
    let state = if sub.get_flag("empty") {
        AppState::empty()
    } else {
        AppState::default()
    };
    save_state(storage, &state)?;
    Ok(())
}

fn run(store: &mut Store, ctx: &Ctx, matches: &clap::ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("profile", sub)) => commands::profile::handle(store, ctx, sub)?,
        Some(("habit", sub)) => commands::habits::handle(store, ctx, sub)?,
        Some(("mastery", sub)) => commands::mastery::handle(store, ctx, sub)?,
        Some(("trade", sub)) => commands::trades::handle(store, ctx, sub)?,
        Some(("account", sub)) => commands::accounts::handle(store, ctx, sub)?,
        Some(("strategy", sub)) => commands::strategies::handle(store, ctx, sub)?,
        Some(("risk", sub)) => commands::risk::handle(store, ctx, sub)?,
        Some(("envelope", sub)) => commands::envelopes::handle(store, ctx, sub)?,
        Some(("budget", sub)) => commands::budget::handle(store, ctx, sub)?,
        Some(("task", sub)) => commands::tasks::handle(store, ctx, sub)?,
        Some(("letter", sub)) => commands::letters::handle(store, ctx, sub)?,
        Some(("skill", sub)) => commands::skills::handle(store, ctx, sub)?,
        Some(("project", sub)) => commands::projects::handle(store, ctx, sub)?,
        Some(("scripture", sub)) => commands::scripture::handle(store, ctx, sub)?,
        Some(("stats", sub)) => commands::stats::handle(store, ctx, sub)?,
        Some(("coach", sub)) => commands::coach::handle(store, ctx, sub)?,
        Some(("sync", sub)) => commands::sync::handle(store, ctx, sub)?,
        Some(("export", sub)) => commands::exporter::handle(store, ctx, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(store, ctx)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let matches = cli::build_cli().get_matches();
    logging::init_tracing(matches.get_flag("verbose"));

    let config = AppConfig::load();
    let storage = Arc::new(match &config.db_path {
        Some(p) => SqliteStorage::open(p)?,
        None => SqliteStorage::open_default()?,
    });

    if let Some(("init", sub)) = matches.subcommand() {
        init(storage.as_ref(), sub)?;
        match &config.db_path {
            Some(p) => println!("Data store initialized at {}", p.display()),
            None => println!("Data store initialized at {}", db_path()?.display()),
        }
        return Ok(());
    }

    let now = chrono::Local::now().naive_local();
    let mut store = Store::new(load_state(storage.as_ref()));
    store.enable_autosave(storage.clone(), AUTOSAVE_DELAY);
    store.dispatch(Action::Habit(HabitAction::SyncDay { today: now.date() }))?;

    let ctx = Ctx::new(storage.as_ref(), &config, now);
    let result = run(&mut store, &ctx, &matches);
    // Flushes the pending autosave even when the command failed half way.
    store.close();
    result
}
