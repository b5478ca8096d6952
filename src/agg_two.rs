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
use crate::leapfrog_triejoin::LeapfrogTriejoin;
use crate::planner::JoinPlan;
use crate::relation::Relation;
use crate::trie_iterator::TrieIterator;
use log::debug;

/// How one pairwise aggregate is recombined from summed tuples. Column
/// indices are absolute positions in the summed tuple, resolved once at
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Instruction {
    /// Both attributes live in the same relation: look up the precomputed
    /// product sum and scale by the counts of all other relations.
    WithinRelation { relation: usize, product_column: usize },
    /// The attributes live in two relations: multiply their partial sums and
    /// scale by the counts of all remaining relations.
    AcrossRelations {
        first: usize,
        first_sum_column: usize,
        second: usize,
        second_sum_column: usize,
    },
}

/// Pushdown aggregation: pre-summarize every relation per join key, join the
/// summaries, and recombine with count scaling. Each relation contributes at
/// most one row per distinct key, so the join enumerates distinct key groups
/// instead of whole tie blocks.
///
/// Accumulators are plain 64-bit integers; overflow is not detected. This is
/// an accepted limitation for benchmark-scale data.
pub struct AggTwo {
    summed: Database,
    plan: JoinPlan,
    instructions: Vec<Instruction>,
    count_columns: Vec<usize>,
}

impl AggTwo {
    pub fn new(database: &Database) -> Result<Self, EngineError> {
        let plan = JoinPlan::new(database)?;
        let count_columns: Vec<usize> = (0..database.relations().len())
            .map(|relation| plan.join_attribute_count(relation))
            .collect();
        let instructions = build_instructions(database, &plan);
        let summed = summarize_database(database, &plan);
        Ok(AggTwo {
            summed,
            plan,
            instructions,
            count_columns,
        })
    }

    /// SUM(a·b) for every distinct unordered pair of global attributes, in
    /// pair order. Bit-identical to the one-pass enumeration.
    pub fn compute_all(&self) -> Vec<i64> {
        let mut totals = vec![0i64; self.instructions.len()];
        self.scan(|iterators, count_product| {
            for (slot, &instruction) in self.instructions.iter().enumerate() {
                totals[slot] += self.recombine(instruction, iterators, count_product);
            }
        });
        totals
    }

    /// SUM(a·b) for the first attribute pair only.
    pub fn compute_one(&self) -> i64 {
        let instruction = self.instructions[0];
        let mut total = 0i64;
        self.scan(|iterators, count_product| {
            total += self.recombine(instruction, iterators, count_product);
        });
        total
    }

    /// Join the summed relations; every match is one distinct join-key
    /// group, visited with the product of the group counts.
    fn scan<F: FnMut(&[TrieIterator], i64)>(&self, mut visit: F) {
        let mut join = LeapfrogTriejoin::new(&self.summed, self.plan.variables());
        while !join.overall_at_end() {
            let count_product: i64 = join
                .iterators()
                .iter()
                .enumerate()
                .map(|(relation, iterator)| iterator.value()[self.count_columns[relation]])
                .product();
            visit(join.iterators(), count_product);
            join.overall_next();
        }
    }

    /// The divisions are exact: each divisor is a COUNT that is a factor of
    /// `count_product`.
    fn recombine(
        &self,
        instruction: Instruction,
        iterators: &[TrieIterator],
        count_product: i64,
    ) -> i64 {
        match instruction {
            Instruction::WithinRelation {
                relation,
                product_column,
            } => {
                let count = iterators[relation].value()[self.count_columns[relation]];
                (count_product / count) * iterators[relation].value()[product_column]
            }
            Instruction::AcrossRelations {
                first,
                first_sum_column,
                second,
                second_sum_column,
            } => {
                let first_count = iterators[first].value()[self.count_columns[first]];
                let second_count = iterators[second].value()[self.count_columns[second]];
                ((count_product / first_count) / second_count)
                    * iterators[first].value()[first_sum_column]
                    * iterators[second].value()[second_sum_column]
            }
        }
    }
}

/// Map every attribute pair onto its summed-tuple columns.
fn build_instructions(database: &Database, plan: &JoinPlan) -> Vec<Instruction> {
    plan.attribute_pairs()
        .iter()
        .map(|pair| {
            let (r1, p1) = pair.first;
            let (r2, p2) = pair.second;
            if r1 == r2 {
                let arity = database.relation(r1).arity();
                Instruction::WithinRelation {
                    relation: r1,
                    product_column: plan.join_attribute_count(r1)
                        + 1
                        + arity
                        + product_index(p1, p2, arity),
                }
            } else {
                Instruction::AcrossRelations {
                    first: r1,
                    first_sum_column: plan.join_attribute_count(r1) + 1 + p1,
                    second: r2,
                    second_sum_column: plan.join_attribute_count(r2) + 1 + p2,
                }
            }
        })
        .collect()
}

/// Position of the pair (i, j), i <= j, in the row-major upper-triangle
/// enumeration of all attribute pairs of one relation.
fn product_index(i: usize, j: usize, arity: usize) -> usize {
    (0..i).map(|t| arity - t).sum::<usize>() + (j - i)
}

/// Derive the summed database: one relation per source relation, one row per
/// distinct join-key group, laid out as
/// `[join keys…, COUNT, SUM(attr)…, SUM(attr_i·attr_j)…]`.
fn summarize_database(database: &Database, plan: &JoinPlan) -> Database {
    let relations = database
        .relations()
        .iter()
        .enumerate()
        .map(|(index, relation)| summarize_relation(relation, plan.join_attribute_count(index)))
        .collect();
    let summed = Database::new(relations);
    debug!(
        "summarized {} relations: {:?} groups",
        database.relations().len(),
        summed
            .relations()
            .iter()
            .map(|relation| relation.len())
            .collect::<Vec<_>>()
    );
    summed
}

/// Group the (already sorted) tuples by their leading join-key columns and
/// emit one summed row per group.
fn summarize_relation(relation: &Relation, key_width: usize) -> Relation {
    let arity = relation.arity();
    let pairs: Vec<(usize, usize)> = (0..arity)
        .flat_map(|i| (i..arity).map(move |j| (i, j)))
        .collect();

    let mut attributes: Vec<String> = relation.attributes()[..key_width].to_vec();
    attributes.push(format!("COUNT({})", relation.name()));
    attributes.extend(
        relation
            .attributes()
            .iter()
            .map(|attribute| format!("SUM({})", attribute)),
    );
    attributes.extend(
        pairs
            .iter()
            .map(|&(i, j)| format!("SUM({}*{})", relation.attributes()[i], relation.attributes()[j])),
    );

    let width = attributes.len();
    let mut rows: Vec<Vec<i64>> = Vec::new();
    let mut row: Vec<i64> = Vec::new();
    for tuple in relation.tuples() {
        if row.is_empty() || row[..key_width] != tuple[..key_width] {
            if !row.is_empty() {
                rows.push(std::mem::take(&mut row));
            }
            row = vec![0i64; width];
            row[..key_width].copy_from_slice(&tuple[..key_width]);
        }
        row[key_width] += 1;
        for (offset, &value) in tuple.iter().enumerate() {
            row[key_width + 1 + offset] += value;
        }
        let mut column = key_width + 1 + arity;
        for &(i, j) in &pairs {
            row[column] += tuple[i] * tuple[j];
            column += 1;
        }
    }
    if !row.is_empty() {
        rows.push(row);
    }

    Relation::with_tuples(relation.name(), attributes, rows)
}
