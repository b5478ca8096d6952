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
use crate::relation::Relation;
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Statically declared schema of one relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationSchema {
    pub name: String,
    pub attributes: Vec<String>,
}

impl RelationSchema {
    pub fn new(name: &str, attributes: &[&str]) -> Self {
        RelationSchema {
            name: name.to_string(),
            attributes: attributes.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// The housing schema used by the benchmark datasets.
pub fn housing_schema() -> Vec<RelationSchema> {
    vec![
        RelationSchema::new(
            "House",
            &[
                "postcode", "area", "price", "bedrooms", "bathrooms", "kitchen", "house", "flat",
                "condo", "garden", "parking",
            ],
        ),
        RelationSchema::new(
            "Shop",
            &[
                "postcode",
                "openinghoursshop",
                "pricerangeshop",
                "sainsburys",
                "tesco",
                "ms",
            ],
        ),
        RelationSchema::new("Institution", &["postcode", "typeeducation", "sizeinstitution"]),
        RelationSchema::new("Restaurant", &["postcode", "openinghoursrest", "pricerangerest"]),
        RelationSchema::new(
            "Demographics",
            &[
                "postcode",
                "averagesalary",
                "crimesperyear",
                "unemployment",
                "nbhospitals",
            ],
        ),
        RelationSchema::new(
            "Transport",
            &["postcode", "nbbuslines", "nbtrainstations", "distancecitycentre"],
        ),
    ]
}

/// A small schema with several overlapping join variables, handy for tests.
pub fn test_schema() -> Vec<RelationSchema> {
    vec![
        RelationSchema::new("R1", &["A", "B", "C"]),
        RelationSchema::new("R2", &["A", "B", "D"]),
        RelationSchema::new("R3", &["A", "E"]),
        RelationSchema::new("R4", &["E", "F"]),
    ]
}

/// Load a schema declaration from a JSON file: a list of
/// `{ "name": ..., "attributes": [...] }` objects.
pub fn schemas_from_json(path: &Path) -> Result<Vec<RelationSchema>, EngineError> {
    let file = File::open(path).map_err(|source| EngineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| EngineError::Schema {
        path: path.to_path_buf(),
        source,
    })
}

/// A set of relations queried together.
#[derive(Debug, Clone)]
pub struct Database {
    relations: Vec<Relation>,
}

impl Database {
    pub fn new(relations: Vec<Relation>) -> Self {
        Database { relations }
    }

    /// Read one `<name>.tbl` file per declared relation from a directory.
    /// Relations are loaded and sorted in parallel; the join itself never
    /// sees a relation before its load completed.
    pub fn from_directory(
        directory: &Path,
        schemas: &[RelationSchema],
    ) -> Result<Self, EngineError> {
        let relations = schemas
            .par_iter()
            .map(|schema| {
                let mut relation = Relation::new(&schema.name, schema.attributes.clone());
                relation.load_tuples(&directory.join(format!("{}.tbl", schema.name)))?;
                Ok(relation)
            })
            .collect::<Result<Vec<_>, EngineError>>()?;
        debug!(
            "loaded database with {} relations from {}",
            relations.len(),
            directory.display()
        );
        Ok(Database { relations })
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    pub fn relation(&self, index: usize) -> &Relation {
        &self.relations[index]
    }
}
