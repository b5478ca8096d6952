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
use crate::trie_iterator::TrieIterator;

/// One-pass aggregation over the raw join: enumerate every result tuple of
/// the natural join by walking tie blocks, and accumulate all pairwise
/// attribute products as they stream by.
///
/// Accumulators are plain 64-bit integers; overflow is not detected. This is
/// an accepted limitation for benchmark-scale data.
pub struct AggOne<'a> {
    database: &'a Database,
    plan: JoinPlan,
}

impl<'a> AggOne<'a> {
    pub fn new(database: &'a Database) -> Result<Self, EngineError> {
        let plan = JoinPlan::new(database)?;
        Ok(AggOne { database, plan })
    }

    pub fn plan(&self) -> &JoinPlan {
        &self.plan
    }

    /// SUM(a·b) for every distinct unordered pair of global attributes, in
    /// pair order.
    pub fn compute_all(&self) -> Vec<i64> {
        let pairs = self.plan.attribute_pairs();
        let mut totals = vec![0i64; pairs.len()];
        self.scan(|iterators| {
            for (slot, pair) in pairs.iter().enumerate() {
                let (r1, p1) = pair.first;
                let (r2, p2) = pair.second;
                totals[slot] += iterators[r1].value()[p1] * iterators[r2].value()[p2];
            }
        });
        totals
    }

    /// SUM(a·b) for the first attribute pair only.
    pub fn compute_one(&self) -> i64 {
        let pair = self.plan.attribute_pairs()[0];
        let (r1, p1) = pair.first;
        let (r2, p2) = pair.second;
        let mut total = 0i64;
        self.scan(|iterators| {
            total += iterators[r1].value()[p1] * iterators[r2].value()[p2];
        });
        total
    }

    /// Number of tuples in the raw join result.
    pub fn count_result_tuples(&self) -> u64 {
        let mut count = 0u64;
        self.scan(|_| count += 1);
        count
    }

    /// Drive the trie join and visit every combination of tied rows for
    /// every distinct join-key binding.
    fn scan<F: FnMut(&[TrieIterator])>(&self, mut visit: F) {
        let mut join = LeapfrogTriejoin::new(self.database, self.plan.variables());
        let mut advanced = vec![0usize; self.database.relations().len()];
        while !join.overall_at_end() {
            loop {
                visit(join.iterators());
                if !advance_within_block(&mut join, &mut advanced) {
                    break;
                }
            }
            join.overall_next();
        }
    }
}

/// Move to the next combination of rows tied on the current join keys,
/// odometer style: step the lowest-indexed relation that still has a row in
/// its tie block and rewind every relation below it to its block start. When
/// no relation can step, rewind everything so the trie join can advance to
/// the next distinct key binding, and report exhaustion.
fn advance_within_block(join: &mut LeapfrogTriejoin, advanced: &mut [usize]) -> bool {
    let mut mover = None;
    for (index, iterator) in join.iterators().iter().enumerate() {
        if iterator.is_next_in_block() {
            mover = Some(index);
            break;
        }
    }
    let iterators = join.iterators_mut();
    match mover {
        Some(index) => {
            iterators[index].next_in_block();
            advanced[index] += 1;
            for other in 0..index {
                if advanced[other] > 0 {
                    iterators[other].back(advanced[other]);
                    advanced[other] = 0;
                }
            }
            true
        }
        None => {
            for (other, steps) in advanced.iter_mut().enumerate() {
                if *steps > 0 {
                    iterators[other].back(*steps);
                    *steps = 0;
                }
            }
            false
        }
    }
}
