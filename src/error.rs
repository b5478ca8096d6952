/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by the engine. Every variant is fatal for the operation
/// that raised it; there are no retries and no partial results.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A relation file does not match its declared schema. Raised at load
    /// time, before any iterator is constructed over the relation.
    #[error("malformed input in relation '{relation}' at line {line}: {reason}")]
    MalformedInput {
        relation: String,
        line: usize,
        reason: String,
    },

    /// The join attribute structure violates the positional assumption the
    /// trie join relies on: every shared attribute must be a leading column
    /// of its relation, in the global variable order.
    #[error("join shape assumption violated in relation '{relation}': {detail}")]
    JoinShape { relation: String, detail: String },

    /// File-system failure while reading or writing relation data.
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A schema declaration file could not be decoded.
    #[error("invalid schema file {}: {source}", path.display())]
    Schema {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// An aggregate query string could not be parsed or refers to unknown
    /// relations or attributes.
    #[error("invalid aggregate query: {0}")]
    Query(String),
}
