/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Reference engine used only to cross-validate the trie-join algorithms:
//! it materializes the natural join with an explicit nested-loop equality
//! join and evaluates textual aggregate queries over the result.

use crate::database::Database;
use crate::error::EngineError;
use crate::parser::parse_aggregate_query;
use crate::relation::Relation;

/// A fully materialized natural join: the merged attribute list and every
/// result row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedJoin {
    pub attributes: Vec<String>,
    pub rows: Vec<Vec<i64>>,
}

/// Fold the relations left to right, nested-loop joining each one on every
/// attribute name it shares with the accumulated schema.
pub fn materialize_natural_join(relations: &[&Relation]) -> MaterializedJoin {
    let Some((first, rest)) = relations.split_first() else {
        return MaterializedJoin {
            attributes: Vec::new(),
            rows: Vec::new(),
        };
    };
    let mut attributes: Vec<String> = first.attributes().to_vec();
    let mut rows: Vec<Vec<i64>> = first.tuples().to_vec();

    for relation in rest {
        let common: Vec<(usize, usize)> = attributes
            .iter()
            .enumerate()
            .filter_map(|(left, name)| {
                relation
                    .attributes()
                    .iter()
                    .position(|other| other == name)
                    .map(|right| (left, right))
            })
            .collect();
        let fresh: Vec<usize> = (0..relation.arity())
            .filter(|column| !common.iter().any(|&(_, right)| right == *column))
            .collect();

        let mut joined = Vec::new();
        for row in &rows {
            for tuple in relation.tuples() {
                if common.iter().all(|&(left, right)| row[left] == tuple[right]) {
                    let mut out = row.clone();
                    out.extend(fresh.iter().map(|&column| tuple[column]));
                    joined.push(out);
                }
            }
        }

        attributes.extend(fresh.iter().map(|&column| relation.attributes()[column].clone()));
        rows = joined;
    }

    MaterializedJoin { attributes, rows }
}

/// Build the query computing every pairwise aggregate over the natural join
/// of the whole database.
pub fn build_query_all(database: &Database) -> String {
    let names = distinct_attribute_names(database);
    let mut sums = Vec::new();
    for i in 0..names.len() {
        for j in i..names.len() {
            sums.push(format!("SUM({}*{})", names[i], names[j]));
        }
    }
    format!("SELECT {} FROM {};", sums.join(", "), join_chain(database))
}

/// Build the query computing only the first pairwise aggregate.
pub fn build_query_one(database: &Database) -> String {
    let first = &database.relation(0).attributes()[0];
    format!(
        "SELECT SUM({}*{}) FROM {};",
        first,
        first,
        join_chain(database)
    )
}

/// Evaluate an aggregate query against the database: parse it, materialize
/// the natural join of the named relations, and return one row of sums in
/// query order.
pub fn run_query(database: &Database, query: &str) -> Result<Vec<i64>, EngineError> {
    let parsed = parse_aggregate_query(query)?;

    let relations = parsed
        .relations
        .iter()
        .map(|name| {
            database
                .relations()
                .iter()
                .find(|relation| relation.name() == name)
                .ok_or_else(|| EngineError::Query(format!("unknown relation '{}'", name)))
        })
        .collect::<Result<Vec<_>, EngineError>>()?;

    let join = materialize_natural_join(&relations);
    let column = |name: &str| {
        join.attributes
            .iter()
            .position(|attribute| attribute == name)
            .ok_or_else(|| EngineError::Query(format!("unknown attribute '{}'", name)))
    };

    parsed
        .sums
        .iter()
        .map(|(first, second)| {
            let (a, b) = (column(first)?, column(second)?);
            Ok(join.rows.iter().map(|row| row[a] * row[b]).sum())
        })
        .collect()
}

fn distinct_attribute_names(database: &Database) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for relation in database.relations() {
        for attribute in relation.attributes() {
            if !names.contains(attribute) {
                names.push(attribute.clone());
            }
        }
    }
    names
}

fn join_chain(database: &Database) -> String {
    database
        .relations()
        .iter()
        .map(|relation| relation.name())
        .collect::<Vec<_>>()
        .join(" NATURAL JOIN ")
}
