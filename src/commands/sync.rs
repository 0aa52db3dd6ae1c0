// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::Local;

use super::{Ctx, required};
use crate::gist::{GistClient, GitHubConfig, SyncError, SyncStatus, load_config, save_config};
use crate::store::{Action, Store};
use crate::utils::http_client;

const PERMISSION_HINT: &str = "Check that the token is valid and has the `gist` permission.";

/// Stored token first, then GITHUB_TOKEN from the environment.
fn effective_token(cfg: &GitHubConfig, ctx: &Ctx) -> Option<String> {
    Some(cfg.token.trim().to_string())
        .filter(|t| !t.is_empty())
        .or_else(|| ctx.config.github_token.clone())
}

fn client(ctx: &Ctx, cfg: &GitHubConfig) -> Result<GistClient> {
    let token = effective_token(cfg, ctx).unwrap_or_default();
    Ok(GistClient::with_api_base(http_client()?, &token, &ctx.config.gist_api)?)
}

fn report_failure(err: SyncError) -> anyhow::Error {
    tracing::warn!(error = %err, "gist sync failed");
    println!("Status: {}", SyncStatus::Error);
    anyhow::Error::new(err).context(PERMISSION_HINT)
}

pub fn handle(store: &mut Store, ctx: &Ctx, m: &clap::ArgMatches) -> Result<()> {
    let mut cfg = load_config(ctx.storage)?;
    match m.subcommand() {
        Some(("link", sub)) => {
            cfg.token = required(sub, "token")?.to_string();
            save_config(ctx.storage, &cfg)?;
            println!("GitHub token linked");
        }
        Some(("unlink", _)) => {
            save_config(ctx.storage, &GitHubConfig::default())?;
            println!("GitHub token removed");
        }
        Some(("status", _)) => {
            let status = if effective_token(&cfg, ctx).is_some() {
                SyncStatus::Idle
            } else {
                cfg.status()
            };
            println!("Status: {}", status);
            match &cfg.last_sync {
                Some(at) => println!("Last sync: {}", at),
                None => println!("Last sync: never"),
            }
        }
        Some(("push", _)) => {
            let gc = client(ctx, &cfg)?;
            println!("Status: {}", SyncStatus::Syncing);
            let gist = gc.push(store.state()).map_err(report_failure)?;
            cfg.last_sync = Some(Local::now().format("%Y-%m-%d %H:%M:%S").to_string());
            save_config(ctx.storage, &cfg).context("recording sync time")?;
            println!("Status: {}", SyncStatus::Success);
            println!("Backed up to {}", gist.html_url.unwrap_or(gist.url));
        }
        Some(("restore", _)) => {
            let gc = client(ctx, &cfg)?;
            println!("Status: {}", SyncStatus::Restoring);
            let restored = gc.restore().map_err(report_failure)?;
            store.dispatch(Action::Replace(Box::new(restored)))?;
            println!("Status: {}", SyncStatus::Success);
            println!("Local state replaced with the cloud backup");
        }
        _ => {}
    }
    Ok(())
}
