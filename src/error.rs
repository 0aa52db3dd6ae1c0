// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Validation failures raised by the store's reducers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HubError {
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },
    #[error("trading account '{0}' does not exist")]
    UnknownAccount(String),
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("envelope {0} is outside 1..=100")]
    EnvelopeOutOfRange(u32),
}

impl HubError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        HubError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        HubError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
