/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::database::Database;
use crate::error::EngineError;
use log::debug;
use rustc_hash::FxHashMap;
use std::cmp::Ordering;

/// An attribute shared by at least two relations, together with every
/// `(relation, position)` at which it occurs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinVariable {
    pub name: String,
    pub occurrences: Vec<(usize, usize)>,
}

/// An unordered pair of distinct global attributes, each identified by its
/// first occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributePair {
    pub first: (usize, usize),
    pub second: (usize, usize),
}

/// Derived join structure of a database: the globally ordered join
/// variables, the deduplicated attribute list and all unordered attribute
/// pairs the aggregate queries range over.
#[derive(Debug, Clone)]
pub struct JoinPlan {
    variables: Vec<JoinVariable>,
    distinct_attributes: Vec<(String, (usize, usize))>,
    pairs: Vec<AttributePair>,
    join_attribute_counts: Vec<usize>,
}

impl JoinPlan {
    /// Derive the plan from the relation schemas and verify the positional
    /// assumption the trie join relies on.
    pub fn new(database: &Database) -> Result<Self, EngineError> {
        let occurrences = attribute_occurrences(database);

        let mut variables: Vec<JoinVariable> = occurrences
            .iter()
            .filter(|(_, positions)| positions.len() > 1)
            .map(|(name, positions)| JoinVariable {
                name: name.clone(),
                occurrences: positions.clone(),
            })
            .collect();
        variables.sort_by(compare_variables);

        let distinct_attributes: Vec<(String, (usize, usize))> = occurrences
            .iter()
            .map(|(name, positions)| (name.clone(), positions[0]))
            .collect();

        let mut pairs = Vec::new();
        for i in 0..distinct_attributes.len() {
            for j in i..distinct_attributes.len() {
                pairs.push(AttributePair {
                    first: distinct_attributes[i].1,
                    second: distinct_attributes[j].1,
                });
            }
        }

        let mut join_attribute_counts = vec![0usize; database.relations().len()];
        for variable in &variables {
            for &(relation, _) in &variable.occurrences {
                join_attribute_counts[relation] += 1;
            }
        }

        let plan = JoinPlan {
            variables,
            distinct_attributes,
            pairs,
            join_attribute_counts,
        };
        plan.validate(database)?;
        debug!(
            "join plan: {} variables over {} relations, {} aggregate pairs",
            plan.variables.len(),
            database.relations().len(),
            plan.pairs.len()
        );
        Ok(plan)
    }

    /// Every shared attribute must sit in the leading columns of each
    /// relation it occurs in, following the global variable order. Leapfrog
    /// search runs directly over storage order and is unsound otherwise.
    fn validate(&self, database: &Database) -> Result<(), EngineError> {
        let mut expected = vec![0usize; database.relations().len()];
        for variable in &self.variables {
            for &(relation, position) in &variable.occurrences {
                if position != expected[relation] {
                    return Err(EngineError::JoinShape {
                        relation: database.relation(relation).name().to_string(),
                        detail: format!(
                            "join attribute '{}' found at column {}, expected column {}",
                            variable.name, position, expected[relation]
                        ),
                    });
                }
                expected[relation] += 1;
            }
        }
        Ok(())
    }

    /// Join variables in global trie order, one per join depth.
    pub fn variables(&self) -> &[JoinVariable] {
        &self.variables
    }

    /// All global attributes after deduplicating shared names, each at its
    /// first `(relation, position)` occurrence, in first-seen order.
    pub fn distinct_attributes(&self) -> &[(String, (usize, usize))] {
        &self.distinct_attributes
    }

    /// Every unordered pair of distinct global attributes, ordered by the
    /// `(relation, position)` of the first then the second attribute.
    pub fn attribute_pairs(&self) -> &[AttributePair] {
        &self.pairs
    }

    /// How many of the relation's leading columns are join attributes.
    pub fn join_attribute_count(&self, relation: usize) -> usize {
        self.join_attribute_counts[relation]
    }
}

/// Every attribute name with all its `(relation, position)` occurrences, in
/// first-seen order.
fn attribute_occurrences(database: &Database) -> Vec<(String, Vec<(usize, usize)>)> {
    let mut ordered: Vec<(String, Vec<(usize, usize)>)> = Vec::new();
    let mut index: FxHashMap<String, usize> = FxHashMap::default();
    for (i, relation) in database.relations().iter().enumerate() {
        for (j, attribute) in relation.attributes().iter().enumerate() {
            match index.get(attribute) {
                Some(&slot) => ordered[slot].1.push((i, j)),
                None => {
                    index.insert(attribute.clone(), ordered.len());
                    ordered.push((attribute.clone(), vec![(i, j)]));
                }
            }
        }
    }
    ordered
}

/// Global variable order: compare occurrence positions in the earliest
/// relation two variables share; if they share none, more widely occurring
/// variables come first. The sort is stable, so full ties keep first-seen
/// order.
fn compare_variables(a: &JoinVariable, b: &JoinVariable) -> Ordering {
    for &(relation_a, position_a) in &a.occurrences {
        for &(relation_b, position_b) in &b.occurrences {
            if relation_a == relation_b {
                return position_a.cmp(&position_b);
            }
        }
    }
    b.occurrences.len().cmp(&a.occurrences.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{test_schema, Database};
    use crate::relation::Relation;

    fn empty_database(schemas: &[crate::database::RelationSchema]) -> Database {
        Database::new(
            schemas
                .iter()
                .map(|schema| Relation::new(&schema.name, schema.attributes.clone()))
                .collect(),
        )
    }

    #[test]
    fn variable_order_follows_earliest_shared_relation() {
        let database = empty_database(&test_schema());
        let plan = JoinPlan::new(&database).unwrap();
        let names: Vec<&str> = plan.variables().iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["A", "B", "E"]);
        assert_eq!(plan.variables()[0].occurrences, [(0, 0), (1, 0), (2, 0)]);
        assert_eq!(plan.variables()[2].occurrences, [(2, 1), (3, 0)]);
    }

    #[test]
    fn join_attribute_counts_per_relation() {
        let database = empty_database(&test_schema());
        let plan = JoinPlan::new(&database).unwrap();
        assert_eq!(
            (0..4).map(|r| plan.join_attribute_count(r)).collect::<Vec<_>>(),
            [2, 2, 2, 1]
        );
    }

    #[test]
    fn attribute_pairs_are_deduplicated_and_ordered() {
        let database = empty_database(&test_schema());
        let plan = JoinPlan::new(&database).unwrap();
        // Distinct attributes: A B C D E F.
        assert_eq!(plan.distinct_attributes().len(), 6);
        assert_eq!(plan.attribute_pairs().len(), 21);
        assert_eq!(plan.attribute_pairs()[0].first, (0, 0));
        assert_eq!(plan.attribute_pairs()[0].second, (0, 0));
        // Last pair is (F, F), first occurring in relation 3 position 1.
        assert_eq!(plan.attribute_pairs()[20].first, (3, 1));
        assert_eq!(plan.attribute_pairs()[20].second, (3, 1));
    }

    #[test]
    fn misplaced_join_attribute_is_rejected() {
        // B is shared but is not a leading column of the second relation.
        let database = Database::new(vec![
            Relation::new("R1", vec!["A".to_string(), "B".to_string()]),
            Relation::new("R2", vec!["A".to_string(), "C".to_string(), "B".to_string()]),
        ]);
        assert!(matches!(
            JoinPlan::new(&database),
            Err(EngineError::JoinShape { .. })
        ));
    }

    #[test]
    fn single_relation_has_no_variables() {
        let database = Database::new(vec![Relation::new(
            "R",
            vec!["A".to_string(), "B".to_string()],
        )]);
        let plan = JoinPlan::new(&database).unwrap();
        assert!(plan.variables().is_empty());
        assert_eq!(plan.attribute_pairs().len(), 3);
    }
}
