// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod calendar;
pub mod cli;
pub mod coach;
pub mod commands;
pub mod config;
pub mod error;
pub mod genai;
pub mod gist;
pub mod live;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod retry;
pub mod risk;
pub mod seed;
pub mod state;
pub mod storage;
pub mod store;
pub mod utils;
