/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::database::{Database, RelationSchema};
use crate::error::EngineError;
use crate::relation::Relation;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Generate a deterministic synthetic database for the given schemas.
///
/// Attributes shared between schemas are drawn from `1..=key_range`; keeping
/// that range small relative to `rows_per_relation` produces tie blocks and
/// join hits. Non-shared attributes are drawn from a wider range.
pub fn generate_database(
    schemas: &[RelationSchema],
    rows_per_relation: usize,
    key_range: i64,
    seed: u64,
) -> Database {
    let mut occurrence_counts: FxHashMap<&str, usize> = FxHashMap::default();
    for schema in schemas {
        for attribute in &schema.attributes {
            *occurrence_counts.entry(attribute.as_str()).or_insert(0) += 1;
        }
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let relations = schemas
        .iter()
        .map(|schema| {
            let tuples: Vec<Vec<i64>> = (0..rows_per_relation)
                .map(|_| {
                    schema
                        .attributes
                        .iter()
                        .map(|attribute| {
                            if occurrence_counts[attribute.as_str()] > 1 {
                                rng.gen_range(1..=key_range)
                            } else {
                                rng.gen_range(0..1_000)
                            }
                        })
                        .collect()
                })
                .collect();
            Relation::with_tuples(schema.name.clone(), schema.attributes.clone(), tuples)
        })
        .collect();
    debug!(
        "generated {} relations with {} rows each (key range 1..={}, seed {})",
        schemas.len(),
        rows_per_relation,
        key_range,
        seed
    );
    Database::new(relations)
}

/// Write every relation of the database as a `<name>.tbl` file in the flat
/// `|`-delimited format the loader reads back.
pub fn write_directory(database: &Database, directory: &Path) -> Result<(), EngineError> {
    fs::create_dir_all(directory).map_err(|source| EngineError::Io {
        path: directory.to_path_buf(),
        source,
    })?;
    for relation in database.relations() {
        let path = directory.join(format!("{}.tbl", relation.name()));
        let file = File::create(&path).map_err(|source| EngineError::Io {
            path: path.clone(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        for tuple in relation.tuples() {
            let line = tuple
                .iter()
                .map(|value| value.to_string())
                .collect::<Vec<_>>()
                .join("|");
            writeln!(writer, "{}", line).map_err(|source| EngineError::Io {
                path: path.clone(),
                source,
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_schema;
    use crate::planner::JoinPlan;

    #[test]
    fn generation_is_deterministic_for_a_seed() {
        let first = generate_database(&test_schema(), 50, 10, 7);
        let second = generate_database(&test_schema(), 50, 10, 7);
        assert_eq!(first.relations(), second.relations());
    }

    #[test]
    fn generated_databases_satisfy_the_join_shape() {
        let db = generate_database(&test_schema(), 30, 5, 1);
        assert!(JoinPlan::new(&db).is_ok());
        for relation in db.relations() {
            assert_eq!(relation.len(), 30);
            assert!(relation.check_sorted().is_ok());
        }
    }

    #[test]
    fn roundtrips_through_the_directory_format() {
        let db = generate_database(&test_schema(), 20, 5, 3);
        let dir = std::env::temp_dir().join(format!("leapjoin-synth-{}", std::process::id()));
        write_directory(&db, &dir).unwrap();
        let reloaded = Database::from_directory(&dir, &test_schema()).unwrap();
        assert_eq!(db.relations(), reloaded.relations());
        fs::remove_dir_all(&dir).unwrap();
    }
}
