// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Manual backup of the whole state blob to a private GitHub gist.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

use crate::state::AppState;
use crate::storage::{GITHUB_KEY, StoragePort, state_from_value};

pub const GIST_FILENAME: &str = "mastery_hub_data.json";
pub const GIST_DESCRIPTION: &str = "Mastery Hub Data (Encrypted Local Protocol)";
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("no GitHub token linked")]
    MissingToken,
    #[error("Failed to fetch gists")]
    ListFailed,
    #[error("{0}")]
    Api(String),
    #[error("No cloud backup found on this account.")]
    NoBackup,
    #[error("backup gist has no {GIST_FILENAME} file")]
    MissingFile,
    #[error("backup content is not valid JSON: {0}")]
    Corrupt(#[source] serde_json::Error),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Unlinked,
    Idle,
    Syncing,
    Restoring,
    Success,
    Error,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SyncStatus::Unlinked => "Not Connected",
            SyncStatus::Idle => "IDLE",
            SyncStatus::Syncing => "SYNCING",
            SyncStatus::Restoring => "RESTORING",
            SyncStatus::Success => "SUCCESS",
            SyncStatus::Error => "ERROR",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitHubConfig {
    #[serde(default)]
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<String>,
}

impl GitHubConfig {
    pub fn status(&self) -> SyncStatus {
        if self.token.trim().is_empty() {
            SyncStatus::Unlinked
        } else {
            SyncStatus::Idle
        }
    }
}

pub fn load_config(store: &dyn StoragePort) -> anyhow::Result<GitHubConfig> {
    Ok(match store.get(GITHUB_KEY)? {
        Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "gist config unreadable, treating as unlinked");
            GitHubConfig::default()
        }),
        None => GitHubConfig::default(),
    })
}

pub fn save_config(store: &dyn StoragePort, cfg: &GitHubConfig) -> anyhow::Result<()> {
    store.set(GITHUB_KEY, &serde_json::to_string(cfg)?)
}

#[derive(Debug, Clone, Deserialize)]
pub struct GistSummary {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub files: HashMap<String, Value>,
}

/// The backup is the gist carrying our description, or failing that our file.
pub fn find_backup(gists: &[GistSummary]) -> Option<&GistSummary> {
    gists.iter().find(|g| {
        g.description.as_deref() == Some(GIST_DESCRIPTION) || g.files.contains_key(GIST_FILENAME)
    })
}

#[derive(Deserialize)]
struct GistDetail {
    #[serde(default)]
    files: HashMap<String, GistFile>,
}

#[derive(Deserialize)]
struct GistFile {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiMessage {
    message: Option<String>,
}

pub struct GistClient {
    http: reqwest::blocking::Client,
    token: String,
    api_base: String,
}

impl GistClient {
    pub fn new(http: reqwest::blocking::Client, token: &str) -> Result<Self, SyncError> {
        Self::with_api_base(http, token, DEFAULT_API_BASE)
    }

    pub fn with_api_base(
        http: reqwest::blocking::Client,
        token: &str,
        api_base: &str,
    ) -> Result<Self, SyncError> {
        if token.trim().is_empty() {
            return Err(SyncError::MissingToken);
        }
        Ok(GistClient {
            http,
            token: token.trim().to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    fn authed(&self, rb: reqwest::blocking::RequestBuilder) -> reqwest::blocking::RequestBuilder {
        rb.header("Authorization", format!("token {}", self.token))
            .header("Accept", "application/vnd.github.v3+json")
    }

    pub fn list(&self) -> Result<Vec<GistSummary>, SyncError> {
        let resp = self
            .authed(self.http.get(format!("{}/gists", self.api_base)))
            .send()?;
        if !resp.status().is_success() {
            tracing::warn!(status = %resp.status(), "gist listing rejected");
            return Err(SyncError::ListFailed);
        }
        Ok(resp.json()?)
    }

    /// Pushes the full state, updating the existing backup when there is one.
    pub fn push(&self, state: &AppState) -> Result<GistSummary, SyncError> {
        let gists = self.list()?;
        let content = serde_json::to_string_pretty(state).map_err(SyncError::Corrupt)?;
        let body = json!({
            "description": GIST_DESCRIPTION,
            "public": false,
            "files": { GIST_FILENAME: { "content": content } },
        });

        let rb = match find_backup(&gists) {
            Some(existing) => {
                tracing::info!(gist = %existing.id, "updating backup gist");
                self.http
                    .patch(format!("{}/gists/{}", self.api_base, existing.id))
            }
            None => {
                tracing::info!("creating backup gist");
                self.http.post(format!("{}/gists", self.api_base))
            }
        };
        let resp = self.authed(rb).json(&body).send()?;
        if !resp.status().is_success() {
            let msg = resp
                .json::<ApiMessage>()
                .ok()
                .and_then(|m| m.message)
                .unwrap_or_else(|| "Failed to sync to GitHub".to_string());
            return Err(SyncError::Api(msg));
        }
        Ok(resp.json()?)
    }

    /// Fetches the backup and rebuilds state with per-field fallback.
    pub fn restore(&self) -> Result<AppState, SyncError> {
        let gists = self.list()?;
        let backup = find_backup(&gists).ok_or(SyncError::NoBackup)?;
        let resp = self.authed(self.http.get(&backup.url)).send()?;
        if !resp.status().is_success() {
            let msg = resp
                .json::<ApiMessage>()
                .ok()
                .and_then(|m| m.message)
                .unwrap_or_else(|| "Failed to restore from GitHub".to_string());
            return Err(SyncError::Api(msg));
        }
        let detail: GistDetail = resp.json()?;
        let content = detail
            .files
            .get(GIST_FILENAME)
            .and_then(|f| f.content.as_deref())
            .ok_or(SyncError::MissingFile)?;
        parse_backup(content)
    }
}

pub fn parse_backup(content: &str) -> Result<AppState, SyncError> {
    let value: Value = serde_json::from_str(content).map_err(SyncError::Corrupt)?;
    Ok(state_from_value(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gists(raw: &str) -> Vec<GistSummary> {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn backup_matches_by_description_or_filename() {
        let list = gists(
            r#"[
            {"id":"a","url":"u/a","description":"notes","files":{"x.md":{}}},
            {"id":"b","url":"u/b","description":null,"files":{"mastery_hub_data.json":{}}},
            {"id":"c","url":"u/c","description":"Mastery Hub Data (Encrypted Local Protocol)","files":{}}
        ]"#,
        );
        assert_eq!(find_backup(&list).map(|g| g.id.as_str()), Some("b"));
        assert!(find_backup(&list[..1]).is_none());
        assert_eq!(find_backup(&list[2..]).map(|g| g.id.as_str()), Some("c"));
    }

    struct Request {
        method: String,
        path: String,
        auth: String,
        body: String,
    }

    fn local_http() -> reqwest::blocking::Client {
        reqwest::blocking::Client::builder().no_proxy().build().unwrap()
    }

    /// Answers one request per connection with the canned bodies, in order.
    fn serve(replies: Vec<String>) -> (String, std::thread::JoinHandle<Vec<Request>>) {
        use std::io::{BufRead, BufReader, Read, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let handle = std::thread::spawn(move || {
            let mut seen = Vec::new();
            for reply in replies {
                let (mut stream, _) = listener.accept().unwrap();
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let mut parts = line.split_whitespace();
                let method = parts.next().unwrap_or_default().to_string();
                let path = parts.next().unwrap_or_default().to_string();
                let (mut len, mut auth) = (0usize, String::new());
                loop {
                    let mut header = String::new();
                    reader.read_line(&mut header).unwrap();
                    let header = header.trim_end();
                    if header.is_empty() {
                        break;
                    }
                    if let Some((k, v)) = header.split_once(':') {
                        match k.to_ascii_lowercase().as_str() {
                            "content-length" => len = v.trim().parse().unwrap(),
                            "authorization" => auth = v.trim().to_string(),
                            _ => {}
                        }
                    }
                }
                let mut body = vec![0; len];
                reader.read_exact(&mut body).unwrap();
                write!(
                    stream,
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    reply.len(),
                    reply
                )
                .unwrap();
                seen.push(Request {
                    method,
                    path,
                    auth,
                    body: String::from_utf8(body).unwrap(),
                });
            }
            seen
        });
        (base, handle)
    }

    #[test]
    fn push_updates_the_existing_backup() {
        let list = format!(
            r#"[{{"id":"other","url":"u","description":"notes","files":{{}}}},
               {{"id":"g1","url":"u","description":"{GIST_DESCRIPTION}","files":{{}}}}]"#
        );
        let (base, server) = serve(vec![list, r#"{"id":"g1","url":"u"}"#.to_string()]);
        let client = GistClient::with_api_base(local_http(), " tok ", &base).unwrap();
        let saved = client.push(&AppState::default()).unwrap();
        assert_eq!(saved.id, "g1");

        let seen = server.join().unwrap();
        assert_eq!(seen[0].method, "GET");
        assert_eq!(seen[0].path, "/gists");
        assert_eq!(seen[0].auth, "token tok");
        assert_eq!(seen[1].method, "PATCH");
        assert_eq!(seen[1].path, "/gists/g1");
        let body: Value = serde_json::from_str(&seen[1].body).unwrap();
        assert_eq!(body["public"], false);
        let content = body["files"][GIST_FILENAME]["content"].as_str().unwrap();
        assert_eq!(parse_backup(content).unwrap(), AppState::default());
    }

    #[test]
    fn push_creates_a_backup_when_none_matches() {
        let list = r#"[{"id":"other","url":"u","description":"notes","files":{"x.md":{}}}]"#;
        let (base, server) = serve(vec![list.to_string(), r#"{"id":"new","url":"u"}"#.to_string()]);
        let client = GistClient::with_api_base(local_http(), "tok", &base).unwrap();
        assert_eq!(client.push(&AppState::empty()).unwrap().id, "new");

        let seen = server.join().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].method, "POST");
        assert_eq!(seen[1].path, "/gists");
        let body: Value = serde_json::from_str(&seen[1].body).unwrap();
        assert_eq!(body["description"], GIST_DESCRIPTION);
    }

    #[test]
    fn empty_token_is_rejected() {
        let http = reqwest::blocking::Client::new();
        assert!(matches!(
            GistClient::new(http, "  "),
            Err(SyncError::MissingToken)
        ));
    }

    #[test]
    fn corrupt_backup_is_an_error_but_partial_blob_loads() {
        assert!(matches!(parse_backup("{not json"), Err(SyncError::Corrupt(_))));
        let s = parse_backup(r#"{"currency":"€","wins":"garbage"}"#).unwrap();
        assert_eq!(s.currency, "€");
        assert_eq!(s.wins.len(), AppState::default().wins.len());
    }
}
