// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::Arc;
use std::time::Duration;

use masteryhub::seed;
use masteryhub::state::AppState;
use masteryhub::storage::{
    COACH_MEMORY_LIMIT, CoachMemory, MemoryStorage, STATE_KEY, SqliteStorage, Speaker,
    StoragePort, compact_output, load_state, preferred_name, save_state, set_compact_output,
    set_preferred_name, state_from_json,
};
use masteryhub::store::{Action, BudgetAction, Store};

#[test]
fn missing_blob_loads_the_seeded_defaults() {
    let storage = MemoryStorage::new();
    assert_eq!(load_state(&storage), AppState::default());
}

#[test]
fn saved_state_loads_back_unchanged() {
    let storage = MemoryStorage::new();
    let mut state = AppState::default();
    state.currency = "£".into();
    state.hearted_scriptures = vec![seed::devotions()[0].clone()];
    save_state(&storage, &state).unwrap();
    assert_eq!(load_state(&storage), state);
}

#[test]
fn malformed_fields_fall_back_one_by_one() {
    let st = state_from_json(r#"{"currency":"€","wins":"bad","budgetMantra":42}"#);
    assert_eq!(st.currency, "€");
    assert_eq!(st.wins, seed::wins());
    assert_eq!(st.budget_mantra, seed::DEFAULT_MANTRA);
    assert_eq!(st.buckets, seed::buckets());

    assert_eq!(state_from_json("not json"), AppState::default());
    assert_eq!(state_from_json("[1, 2]"), AppState::default());
}

#[test]
fn sqlite_storage_survives_reopening() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hub.sqlite");
    let mut state = AppState::empty();
    state.budget_mantra = "Steady".into();
    {
        let storage = SqliteStorage::open(&path).unwrap();
        save_state(&storage, &state).unwrap();
        set_preferred_name(&storage, Some("  Ada ")).unwrap();
    }
    let storage = SqliteStorage::open(&path).unwrap();
    assert!(storage.get(STATE_KEY).unwrap().is_some());
    assert_eq!(load_state(&storage), state);
    assert_eq!(preferred_name(&storage).unwrap().as_deref(), Some("Ada"));

    set_preferred_name(&storage, Some("   ")).unwrap();
    assert_eq!(preferred_name(&storage).unwrap(), None);
}

#[test]
fn compact_flag_defaults_off() {
    let storage = MemoryStorage::new();
    assert!(!compact_output(&storage));
    set_compact_output(&storage, true).unwrap();
    assert!(compact_output(&storage));
}

#[test]
fn closing_the_store_flushes_a_pending_autosave() {
    let storage = Arc::new(MemoryStorage::new());
    let mut store = Store::new(AppState::default());
    // Long enough that only the flush on close can write.
    store.enable_autosave(storage.clone(), Duration::from_secs(30));
    store
        .dispatch(Action::Budget(BudgetAction::SetCurrency("¥".into())))
        .unwrap();
    store
        .dispatch(Action::Budget(BudgetAction::SetMantra("Less, better".into())))
        .unwrap();
    store.close();

    let saved = load_state(storage.as_ref());
    assert_eq!(saved.currency, "¥");
    assert_eq!(saved.budget_mantra, "Less, better");
}

#[test]
fn rejected_actions_are_not_saved() {
    let storage = Arc::new(MemoryStorage::new());
    let mut store = Store::new(AppState::default());
    store.enable_autosave(storage.clone(), Duration::from_millis(10));
    assert!(store
        .dispatch(Action::Budget(BudgetAction::SetCurrency("  ".into())))
        .is_err());
    store.close();
    assert!(storage.get(STATE_KEY).unwrap().is_none());
}

#[test]
fn coach_memory_keeps_the_latest_entries() {
    let storage = MemoryStorage::new();
    let memory = CoachMemory::new(&storage);
    assert!(memory.transcript().contains("very first session"));

    memory.record("   ", Speaker::User).unwrap();
    assert!(memory.entries().is_empty());

    for i in 0..COACH_MEMORY_LIMIT + 5 {
        let who = if i % 2 == 0 { Speaker::User } else { Speaker::Coach };
        memory.record(&format!("line {i}"), who).unwrap();
    }
    let entries = memory.entries();
    assert_eq!(entries.len(), COACH_MEMORY_LIMIT);
    assert_eq!(entries[0].text, "line 5");
    assert!(memory.transcript().contains("User: line 34"));

    memory.clear().unwrap();
    assert!(memory.entries().is_empty());
}
