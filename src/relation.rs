/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::error::EngineError;
use log::debug;
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// An immutable, sorted relation: a name, an ordered attribute list and a
/// tuple array of fixed-width integers.
///
/// Tuples are kept sorted lexicographically by attribute position. The trie
/// iterators assume this order; it is established here, once, at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    name: String,
    attributes: Vec<String>,
    tuples: Vec<Vec<i64>>,
}

impl Relation {
    /// Create an empty relation with the given schema.
    pub fn new(name: impl Into<String>, attributes: Vec<String>) -> Self {
        Relation {
            name: name.into(),
            attributes,
            tuples: Vec::new(),
        }
    }

    /// Create a relation from in-memory tuples. The tuples are sorted here;
    /// callers may pass them in any order. Every tuple must match the arity
    /// of the attribute list.
    pub fn with_tuples(
        name: impl Into<String>,
        attributes: Vec<String>,
        mut tuples: Vec<Vec<i64>>,
    ) -> Self {
        debug_assert!(tuples.iter().all(|tuple| tuple.len() == attributes.len()));
        tuples.par_sort_unstable();
        Relation {
            name: name.into(),
            attributes,
            tuples,
        }
    }

    /// Read tuples from a flat file: one tuple per line, integer fields
    /// separated by `|`. The field count of every line must equal the arity
    /// of the declared schema. Tuples are fully materialized and sorted
    /// before they become visible to any iterator.
    pub fn load_tuples(&mut self, path: &Path) -> Result<(), EngineError> {
        let file = File::open(path).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let reader = BufReader::new(file);

        let mut tuples = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(|source| EngineError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            if line.is_empty() {
                continue;
            }
            let mut tuple = Vec::with_capacity(self.attributes.len());
            for field in line.split('|') {
                let value = field
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| EngineError::MalformedInput {
                        relation: self.name.clone(),
                        line: index + 1,
                        reason: format!("field '{}' is not an integer", field),
                    })?;
                tuple.push(value);
            }
            if tuple.len() != self.attributes.len() {
                return Err(EngineError::MalformedInput {
                    relation: self.name.clone(),
                    line: index + 1,
                    reason: format!(
                        "expected {} fields, found {}",
                        self.attributes.len(),
                        tuple.len()
                    ),
                });
            }
            tuples.push(tuple);
        }

        tuples.par_sort_unstable();
        debug!(
            "loaded {} tuples into relation '{}' from {}",
            tuples.len(),
            self.name,
            path.display()
        );
        self.tuples = tuples;
        Ok(())
    }

    /// Verify the sort invariant. Construction always sorts, so this only
    /// matters for tuple arrays supplied through external code paths.
    pub fn check_sorted(&self) -> Result<(), EngineError> {
        for (index, window) in self.tuples.windows(2).enumerate() {
            if window[0] > window[1] {
                return Err(EngineError::MalformedInput {
                    relation: self.name.clone(),
                    line: index + 2,
                    reason: "tuples are not in sorted order".to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Number of attributes in each tuple.
    pub fn arity(&self) -> usize {
        self.attributes.len()
    }

    pub fn tuples(&self) -> &[Vec<i64>] {
        &self.tuples
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }
}
