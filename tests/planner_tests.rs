// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use masteryhub::calendar::{agenda_highlight, tasks_on};
use masteryhub::cli;
use masteryhub::commands::doctor::find_issues;
use masteryhub::commands::{Ctx, letters, projects, scripture, skills, tasks};
use masteryhub::config::AppConfig;
use masteryhub::metrics::skill_progress;
use masteryhub::models::{Priority, ProjectStatus};
use masteryhub::state::AppState;
use masteryhub::storage::MemoryStorage;
use masteryhub::store::Store;

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 1)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn run(store: &mut Store, args: &[&str]) -> anyhow::Result<()> {
    let storage = MemoryStorage::new();
    let config = AppConfig::default();
    let ctx = Ctx::new(&storage, &config, now());
    let mut argv = vec!["masteryhub"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("task", m)) => tasks::handle(store, &ctx, m),
        Some(("letter", m)) => letters::handle(store, &ctx, m),
        Some(("skill", m)) => skills::handle(store, &ctx, m),
        Some(("project", m)) => projects::handle(store, &ctx, m),
        Some(("scripture", m)) => scripture::handle(store, &ctx, m),
        _ => panic!("command not parsed"),
    }
}

#[test]
fn tasks_schedule_toggle_and_order() {
    let mut store = Store::new(AppState::empty());
    assert!(run(
        &mut store,
        &["task", "add", "--title", "Backwards", "--start", "11:00", "--end", "10:00"]
    )
    .is_err());

    run(
        &mut store,
        &["task", "add", "--title", "Review", "--start", "09:30", "--end", "10:30", "--priority", "high"],
    )
    .unwrap();
    run(
        &mut store,
        &["task", "add", "--title", "Gym", "--start", "18:00", "--date", "2025-06-01"],
    )
    .unwrap();
    run(
        &mut store,
        &["task", "add", "--title", "Later", "--start", "08:00", "--date", "2025-06-02"],
    )
    .unwrap();

    let st = store.state();
    let today = now().date();
    let titles: Vec<&str> = tasks_on(&st.tasks, today, today)
        .iter()
        .map(|t| t.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Review", "Gym"]);
    assert_eq!(st.tasks[0].priority, Priority::High);

    let agenda = agenda_highlight(&st.tasks, now());
    assert_eq!(agenda.active.map(|t| t.title.as_str()), Some("Review"));
    assert_eq!(agenda.upcoming.map(|t| t.time_start), Some(hm(18, 0)));

    let id = st.tasks[0].id.clone();
    run(&mut store, &["task", "toggle", "--id", &id]).unwrap();
    assert!(store.state().tasks[0].completed);
    assert!(agenda_highlight(&store.state().tasks, now()).active.is_none());
    run(&mut store, &["task", "delete", "--id", &id]).unwrap();
    assert_eq!(store.state().tasks.len(), 2);
}

#[test]
fn locked_letters_stay_sealed() {
    // Seed letter "2" unlocks on 2025-12-31, letter "1" opened in February.
    let mut store = Store::new(AppState::default());
    let err = run(&mut store, &["letter", "read", "--id", "2"]).unwrap_err();
    assert!(err.to_string().contains("213 day(s) left"));
    run(&mut store, &["letter", "read", "--id", "1"]).unwrap();

    run(
        &mut store,
        &["letter", "add", "--title", "Soon", "--content", "Hold the line.", "--unlock", "2025-06-06"],
    )
    .unwrap();
    let l = &store.state().letters[0];
    assert_eq!(l.title, "Soon");
    assert!(l.is_locked);
    assert_eq!(l.created_at, now().date());
    assert!(run(&mut store, &["letter", "read", "--id", "missing"]).is_err());
}

#[test]
fn practice_sessions_build_progress() {
    let mut store = Store::new(AppState::empty());
    assert!(run(&mut store, &["skill", "add", "--name", "Piano", "--target", "0"]).is_err());
    run(
        &mut store,
        &["skill", "add", "--name", "Piano", "--target", "120", "--goal", "Nocturne"],
    )
    .unwrap();
    let id = store.state().skills[0].id.clone();

    run(&mut store, &["skill", "log", "--id", &id, "--minutes", "90", "--notes", "Scales"]).unwrap();
    run(&mut store, &["skill", "log", "--id", &id, "--minutes", "45"]).unwrap();
    assert!(run(&mut store, &["skill", "log", "--id", &id, "--minutes", "0"]).is_err());

    let sk = &store.state().skills[0];
    assert_eq!(sk.streak, 2);
    assert_eq!(sk.practice_log[0].time_spent, 45);
    let p = skill_progress(sk);
    assert_eq!(p.practiced, 135);
    assert_eq!(p.pct, 100.0);
    assert_eq!(p.remaining, 0);
    assert!(p.mastered);

    run(&mut store, &["skill", "goal", "--id", &id]).unwrap();
    assert_eq!(store.state().skills[0].goal, None);
}

#[test]
fn project_progress_is_bounded() {
    let mut store = Store::new(AppState::empty());
    run(&mut store, &["project", "add", "--title", "Site", "--progress", "10"]).unwrap();
    let p = &store.state().projects[0];
    assert_eq!(p.status, ProjectStatus::Idea);
    let id = p.id.clone();

    assert!(run(&mut store, &["project", "update", "--id", &id, "--progress", "101"]).is_err());
    assert_eq!(store.state().projects[0].progress, 10);

    run(
        &mut store,
        &["project", "update", "--id", &id, "--status", "done", "--progress", "100"],
    )
    .unwrap();
    let p = &store.state().projects[0];
    assert_eq!(p.status, ProjectStatus::Done);
    assert_eq!(p.progress, 100);
}

#[test]
fn hearting_a_verse_toggles_the_bookmark() {
    let mut store = Store::new(AppState::empty());
    run(&mut store, &["scripture", "heart", "--ref", "joshua 1:9"]).unwrap();
    assert_eq!(store.state().hearted_scriptures.len(), 1);
    assert_eq!(store.state().hearted_scriptures[0].reference, "Joshua 1:9");
    run(&mut store, &["scripture", "heart", "--ref", "Joshua 1:9"]).unwrap();
    assert!(store.state().hearted_scriptures.is_empty());
    assert!(run(&mut store, &["scripture", "heart", "--ref", "Nowhere 9:99"]).is_err());
}

#[test]
fn doctor_flags_dangling_references() {
    let mut st = AppState::default();
    assert!(find_issues(&st).is_empty());

    st.trades[0].strategy_id = Some("gone".into());
    st.accounts[1].is_primary = true;
    st.mastery_habits[0].progress = st.mastery_habits[0].total + 1;
    let kinds: Vec<String> = find_issues(&st).into_iter().map(|r| r[0].clone()).collect();
    assert_eq!(
        kinds,
        vec!["trade_unknown_strategy", "primary_accounts", "mastery_overflow"]
    );
}
