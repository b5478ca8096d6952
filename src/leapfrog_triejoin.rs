/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Leapfrog Triejoin. Based on:
//! Leapfrog Triejoin: A Simple, Worst-Case Optimal Join Algorithm by
//! Todd L. Veldhuizen, https://openproceedings.org/2014/conf/icdt/Veldhuizen14.pdf

use crate::database::Database;
use crate::planner::JoinVariable;
use crate::trie_iterator::TrieIterator;

/// Intersection iterator for the subset of relations sharing one join
/// variable. Holds member indices into the orchestrator's iterator array;
/// the iterators themselves are owned by the orchestrator, since one
/// relation participates in several unary joins.
#[derive(Debug)]
pub struct UnaryLeapfrogTriejoin {
    members: Vec<usize>,
    p: usize,
    at_end: bool,
}

impl UnaryLeapfrogTriejoin {
    fn new(members: Vec<usize>) -> Self {
        UnaryLeapfrogTriejoin {
            members,
            p: 0,
            at_end: false,
        }
    }

    pub fn at_end(&self) -> bool {
        self.at_end
    }

    /// Open every member iterator one level down, then search for the first
    /// agreed key. Exhaustion of any member means no binding at this level.
    fn open(&mut self, iterators: &mut [TrieIterator]) {
        for &member in &self.members {
            iterators[member].open();
        }
        self.at_end = self.members.iter().any(|&member| iterators[member].at_end());
        if !self.at_end {
            self.leapfrog_search(iterators);
        }
    }

    /// Advance the lagging iterator to the maximum known key until all
    /// members agree. Each seek strictly advances or exhausts an iterator,
    /// so the loop terminates.
    fn leapfrog_search(&mut self, iterators: &mut [TrieIterator]) {
        let k = self.members.len();
        let mut max_key = iterators[self.members[(self.p + k - 1) % k]].key();
        loop {
            let member = self.members[self.p];
            if iterators[member].key() == max_key {
                return;
            }
            iterators[member].seek(max_key);
            if iterators[member].at_end() {
                self.at_end = true;
                return;
            }
            max_key = iterators[member].key();
            self.p = (self.p + 1) % k;
        }
    }

    /// Move past the current agreed key to the next one, in strictly
    /// increasing order.
    fn next(&mut self, iterators: &mut [TrieIterator]) {
        let member = self.members[self.p];
        iterators[member].next();
        if iterators[member].at_end() {
            self.at_end = true;
        } else {
            self.p = (self.p + 1) % self.members.len();
            self.leapfrog_search(iterators);
        }
    }

    fn up(&mut self, iterators: &mut [TrieIterator]) {
        for &member in &self.members {
            iterators[member].up();
        }
    }
}

/// Backtracking orchestrator over one unary leapfrog join per global join
/// variable, enumerating full join results in trie order. Only one tuple
/// position per relation is ever held; no partial cross product is
/// materialized.
#[derive(Debug)]
pub struct LeapfrogTriejoin<'a> {
    iterators: Vec<TrieIterator<'a>>,
    levels: Vec<UnaryLeapfrogTriejoin>,
    depth: isize,
    overall_at_end: bool,
}

impl<'a> LeapfrogTriejoin<'a> {
    /// Build the join over the database's relations and position it on the
    /// first result (or at the end if the join is empty). With no join
    /// variables at all, the single pseudo-binding covers the full cross
    /// product of the relations.
    pub fn new(database: &'a Database, variables: &[JoinVariable]) -> Self {
        let iterators = database
            .relations()
            .iter()
            .map(|relation| TrieIterator::new(relation.tuples()))
            .collect();
        let levels = variables
            .iter()
            .map(|variable| {
                UnaryLeapfrogTriejoin::new(
                    variable
                        .occurrences
                        .iter()
                        .map(|&(relation, _)| relation)
                        .collect(),
                )
            })
            .collect();
        let mut join = LeapfrogTriejoin {
            iterators,
            levels,
            depth: -1,
            overall_at_end: false,
        };
        join.init();
        join
    }

    fn init(&mut self) {
        if self.levels.is_empty() {
            self.overall_at_end = self.iterators.iter().any(|iterator| iterator.at_end());
            return;
        }
        self.find_next(false);
    }

    pub fn overall_at_end(&self) -> bool {
        self.overall_at_end
    }

    /// Advance to the next result, backtracking as far up as needed.
    pub fn overall_next(&mut self) {
        if self.levels.is_empty() {
            self.overall_at_end = true;
            return;
        }
        self.find_next(true);
    }

    /// One tuple reference per relation, valid while the join stays on the
    /// current result.
    pub fn result_tuple(&self) -> Vec<&'a [i64]> {
        self.iterators.iter().map(|iterator| iterator.value()).collect()
    }

    pub fn iterators(&self) -> &[TrieIterator<'a>] {
        &self.iterators
    }

    pub fn iterators_mut(&mut self) -> &mut [TrieIterator<'a>] {
        &mut self.iterators
    }

    /// Depth-first backtracking step. Climbing stops at the shallowest level
    /// that can still advance; descending stops as soon as a level has no
    /// binding, pruning the branch instead of exploring it.
    fn find_next(&mut self, mut should_advance: bool) {
        loop {
            while self.depth > 0 && self.level_at_end() {
                self.up();
                self.next();
                if !self.level_at_end() {
                    should_advance = false;
                }
            }
            if self.depth == 0 && self.level_at_end() {
                self.overall_at_end = true;
                return;
            }
            if should_advance {
                self.next();
                should_advance = self.level_at_end();
            }
            while self.depth < self.levels.len() as isize - 1 {
                self.open();
                if self.level_at_end() {
                    break;
                }
            }
            if !self.level_at_end() {
                return;
            }
        }
    }

    fn level_at_end(&self) -> bool {
        self.levels[self.depth as usize].at_end()
    }

    fn next(&mut self) {
        self.levels[self.depth as usize].next(&mut self.iterators);
    }

    fn open(&mut self) {
        self.depth += 1;
        self.levels[self.depth as usize].open(&mut self.iterators);
    }

    fn up(&mut self) {
        self.levels[self.depth as usize].up(&mut self.iterators);
        self.depth -= 1;
    }
}
