// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::config::AppConfig;
use crate::storage::{StoragePort, compact_output};
use crate::utils::{parse_date, parse_decimal, table_with_preset};

pub mod accounts;
pub mod budget;
pub mod coach;
pub mod doctor;
pub mod envelopes;
pub mod exporter;
pub mod habits;
pub mod letters;
pub mod mastery;
pub mod profile;
pub mod projects;
pub mod risk;
pub mod scripture;
pub mod skills;
pub mod stats;
pub mod strategies;
pub mod sync;
pub mod tasks;
pub mod trades;

/// What every handler gets besides the store: preferences, settings and the clock.
pub struct Ctx<'a> {
    pub storage: &'a dyn StoragePort,
    pub config: &'a AppConfig,
    pub now: NaiveDateTime,
    pub compact: bool,
}

impl<'a> Ctx<'a> {
    pub fn new(storage: &'a dyn StoragePort, config: &'a AppConfig, now: NaiveDateTime) -> Self {
        Ctx {
            storage,
            config,
            now,
            compact: compact_output(storage),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date()
    }

    pub fn table(&self, headers: &[&str], rows: Vec<Vec<String>>) -> comfy_table::Table {
        table_with_preset(headers, rows, self.compact)
    }
}

/// Trimmed value of an argument, treating blanks as absent.
pub fn arg<'m>(m: &'m clap::ArgMatches, name: &str) -> Option<&'m str> {
    m.get_one::<String>(name)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}

pub fn required<'m>(m: &'m clap::ArgMatches, name: &str) -> Result<&'m str> {
    arg(m, name).ok_or_else(|| anyhow!("--{} must not be empty", name))
}

pub fn decimal_arg(m: &clap::ArgMatches, name: &str) -> Result<Option<Decimal>> {
    arg(m, name)
        .map(parse_decimal)
        .transpose()
        .with_context(|| format!("--{}", name))
}

pub fn date_arg(m: &clap::ArgMatches, name: &str) -> Result<Option<NaiveDate>> {
    arg(m, name).map(parse_date).transpose()
}

pub fn json_flags(m: &clap::ArgMatches) -> (bool, bool) {
    (m.get_flag("json"), m.get_flag("jsonl"))
}

pub fn yes_no(b: bool) -> String {
    if b { "yes" } else { "no" }.to_string()
}
