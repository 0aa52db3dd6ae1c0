// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use masteryhub::cli;
use masteryhub::commands::exporter::{self, export_trades};
use masteryhub::commands::Ctx;
use masteryhub::config::AppConfig;
use masteryhub::state::AppState;
use masteryhub::storage::{MemoryStorage, state_from_json};
use masteryhub::store::Store;

#[test]
fn csv_export_resolves_names() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trades.csv");
    export_trades(&AppState::default(), "csv", &path).unwrap();

    let mut rdr = csv::Reader::from_path(&path).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(&headers[0], "time");
    assert_eq!(&headers[7], "account");
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);

    let first = &rows[0];
    assert_eq!(&first[0], "2024-10-24 09:15");
    assert_eq!(&first[1], "NAS100");
    assert_eq!(&first[2], "LONG");
    assert_eq!(&first[4], "450");
    assert_eq!(&first[6], "Win");
    assert_eq!(&first[7], "Master Live");
    assert_eq!(&first[8], "Silver Bullet v2");
    assert_eq!(&first[9], "Confident");
    assert_eq!(&first[10], "");
    assert_eq!(&rows[1][2], "SHORT");
}

#[test]
fn json_export_wraps_each_trade() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trades.json");
    let mut st = AppState::default();
    st.trades[1].account_id = Some("gone".into());
    export_trades(&st, "json", &path).unwrap();

    let v: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let items = v.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["trade"]["id"], "tr1");
    assert_eq!(items[0]["account"], "Master Live");
    // Dangling references export as blanks.
    assert_eq!(items[1]["account"], "");
}

#[test]
fn unknown_format_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trades.xml");
    assert!(export_trades(&AppState::default(), "xml", &path).is_err());
    assert!(!path.exists());
}

#[test]
fn state_export_reloads_identically() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let path_str = path.to_str().unwrap();

    let storage = MemoryStorage::new();
    let config = AppConfig::default();
    let now = NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap();
    let ctx = Ctx::new(&storage, &config, now);
    let mut store = Store::new(AppState::default());
    let matches =
        cli::build_cli().get_matches_from(["masteryhub", "export", "state", "--path", path_str]);
    let Some(("export", m)) = matches.subcommand() else {
        panic!("command not parsed");
    };
    exporter::handle(&mut store, &ctx, m).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    assert_eq!(state_from_json(&raw), *store.state());
}
