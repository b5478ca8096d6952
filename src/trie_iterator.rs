/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

/// Cursor over one relation's sorted tuple array, presenting it as a trie.
///
/// The depth is the number of leading columns currently bound. At a fixed
/// depth the key (the value in the depth's column) is non-decreasing with
/// position and equal keys are contiguous, so `seek` can advance
/// monotonically without ever moving backward. `open` saves the current
/// position on an owned frame stack and descends one level; `up` pops the
/// frame and restores it. The stack is bounded by the number of join
/// variables.
///
/// Calling `key`/`value` while `at_end` is a contract violation by the
/// caller, not a recoverable condition.
pub struct TrieIterator<'a> {
    tuples: &'a [Vec<i64>],
    position: usize,
    depth: isize,
    at_end: bool,
    saved: Vec<usize>,
}

impl<'a> TrieIterator<'a> {
    /// Cursor starting above the root of the trie (depth -1). An iterator
    /// over an empty relation is exhausted from the start.
    pub fn new(tuples: &'a [Vec<i64>]) -> Self {
        TrieIterator {
            tuples,
            position: 0,
            depth: -1,
            at_end: tuples.is_empty(),
            saved: Vec::new(),
        }
    }

    pub fn at_end(&self) -> bool {
        self.at_end
    }

    /// Value of the current tuple in the column bound at the current depth.
    pub fn key(&self) -> i64 {
        self.tuples[self.position][self.depth as usize]
    }

    /// The full current tuple.
    pub fn value(&self) -> &'a [i64] {
        &self.tuples[self.position]
    }

    /// Advance forward at the current depth until `key() >= x` or the view
    /// is exhausted. Never moves backward.
    pub fn seek(&mut self, x: i64) {
        while !self.at_end && self.key() < x {
            self.next();
        }
    }

    /// Skip the entire run of rows tied on the current key, landing on the
    /// next distinct key within the bound prefix, or at the end of it.
    pub fn next(&mut self) {
        let depth = self.depth as usize;
        let start = self.tuples[self.position][depth];
        while self.next_in_view() && self.tuples[self.position][depth] == start {
            self.position += 1;
        }
        if self.tuples[self.position][depth] == start {
            self.at_end = true;
        }
    }

    /// Bind one more column: push a frame, descend, and reposition to the
    /// first row consistent with all bound levels.
    pub fn open(&mut self) {
        debug_assert!(!self.at_end || self.tuples.is_empty());
        self.saved.push(self.position);
        self.depth += 1;
        while self.previous_in_view() {
            self.position -= 1;
        }
    }

    /// Unbind the deepest column, restoring the saved frame.
    pub fn up(&mut self) {
        let restored = self.saved.pop().expect("up() without a matching open()");
        self.position = restored;
        self.depth -= 1;
        self.at_end = self.tuples.is_empty();
    }

    /// Does the following row share every bound column including the
    /// current depth's key?
    pub fn is_next_in_block(&self) -> bool {
        self.next_same_up_to((self.depth + 1) as usize)
    }

    /// Step one row forward inside the current tie block.
    pub fn next_in_block(&mut self) {
        self.position += 1;
    }

    /// Retreat by `count` rows (towards the start of the tie block).
    pub fn back(&mut self, count: usize) {
        self.position -= count;
        self.at_end = self.tuples.is_empty();
    }

    /// Does the following row match the current one on the bound prefix
    /// (all columns above the current depth)?
    fn next_in_view(&self) -> bool {
        self.next_same_up_to(self.depth as usize)
    }

    fn next_same_up_to(&self, limit: usize) -> bool {
        if self.position + 1 >= self.tuples.len() {
            return false;
        }
        self.tuples[self.position][..limit] == self.tuples[self.position + 1][..limit]
    }

    fn previous_in_view(&self) -> bool {
        if self.position == 0 {
            return false;
        }
        let depth = self.depth as usize;
        self.tuples[self.position - 1][..depth] == self.tuples[self.position][..depth]
    }
}

impl fmt::Debug for TrieIterator<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrieIterator")
            .field("position", &self.position)
            .field("depth", &self.depth)
            .field("at_end", &self.at_end)
            .finish()
    }
}
