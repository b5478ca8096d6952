/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

pub mod agg_one;
pub mod agg_two;
pub mod database;
pub mod error;
pub mod leapfrog_triejoin;
pub mod naive;
pub mod parser;
pub mod planner;
pub mod relation;
pub mod synthetic;
pub mod trie_iterator;
