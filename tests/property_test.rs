/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

extern crate leapjoin;

use leapjoin::agg_one::AggOne;
use leapjoin::agg_two::AggTwo;
use leapjoin::database::Database;
use leapjoin::naive;
use leapjoin::relation::Relation;
use proptest::prelude::*;

fn rows(arity: usize) -> impl Strategy<Value = Vec<Vec<i64>>> {
    prop::collection::vec(prop::collection::vec(0i64..4, arity), 0..12)
}

fn build(name: &str, attributes: &[&str], tuples: Vec<Vec<i64>>) -> Relation {
    Relation::with_tuples(
        name,
        attributes.iter().map(|s| s.to_string()).collect(),
        tuples,
    )
}

proptest! {
    /// The pushdown rewrite and the one-pass enumeration are the same
    /// function, and both match brute force over the materialized join.
    #[test]
    fn engines_agree_on_random_databases(
        r1 in rows(3),
        r2 in rows(3),
        r3 in rows(2),
        r4 in rows(2),
    ) {
        let db = Database::new(vec![
            build("R1", &["A", "B", "C"], r1),
            build("R2", &["A", "B", "D"], r2),
            build("R3", &["A", "E"], r3),
            build("R4", &["E", "F"], r4),
        ]);

        let one_pass = AggOne::new(&db).unwrap().compute_all();
        let pushdown = AggTwo::new(&db).unwrap().compute_all();
        prop_assert_eq!(&one_pass, &pushdown);

        let reference = naive::run_query(&db, &naive::build_query_all(&db)).unwrap();
        prop_assert_eq!(one_pass, reference);
    }

    /// The raw join enumerated through tie blocks has exactly as many tuples
    /// as the explicit nested-loop join.
    #[test]
    fn join_cardinality_matches_nested_loop(
        r1 in rows(2),
        r2 in rows(2),
    ) {
        let db = Database::new(vec![
            build("R1", &["A", "B"], r1),
            build("R2", &["A", "C"], r2),
        ]);
        let agg = AggOne::new(&db).unwrap();
        let relations: Vec<&Relation> = db.relations().iter().collect();
        let join = naive::materialize_natural_join(&relations);
        prop_assert_eq!(agg.count_result_tuples(), join.rows.len() as u64);
    }
}
