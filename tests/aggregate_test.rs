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
use leapjoin::leapfrog_triejoin::LeapfrogTriejoin;
use leapjoin::naive;
use leapjoin::planner::JoinPlan;
use leapjoin::relation::Relation;

#[cfg(test)]
mod tests {
    use super::*;

    fn relation(name: &str, attributes: &[&str], tuples: Vec<Vec<i64>>) -> Relation {
        Relation::with_tuples(
            name,
            attributes.iter().map(|s| s.to_string()).collect(),
            tuples,
        )
    }

    /// Two relations joining on A, with a tie block in the first.
    fn scenario_database() -> Database {
        Database::new(vec![
            relation("R1", &["A", "B", "C"], vec![vec![1, 1, 5], vec![1, 2, 6]]),
            relation("R2", &["A", "D"], vec![vec![1, 9]]),
        ])
    }

    /// Four relations over the variables A, B and E, with tie blocks and
    /// keys that are missing from some relations.
    fn four_relation_database() -> Database {
        Database::new(vec![
            relation(
                "R1",
                &["A", "B", "C"],
                vec![vec![1, 1, 2], vec![1, 1, 3], vec![1, 2, 4], vec![2, 1, 5]],
            ),
            relation(
                "R2",
                &["A", "B", "D"],
                vec![vec![1, 1, 10], vec![1, 2, 11], vec![2, 1, 12], vec![3, 1, 13]],
            ),
            relation("R3", &["A", "E"], vec![vec![1, 7], vec![1, 8], vec![2, 7]]),
            relation("R4", &["E", "F"], vec![vec![7, 100], vec![8, 101], vec![9, 102]]),
        ])
    }

    #[test]
    fn scenario_enumerates_both_tie_combinations() {
        let db = scenario_database();
        let agg = AggOne::new(&db).unwrap();
        assert_eq!(agg.count_result_tuples(), 2);
        // SUM(A*A) over {(1,1,5),(1,9)} and {(1,2,6),(1,9)}.
        assert_eq!(agg.compute_one(), 2);
    }

    #[test]
    fn scenario_pushdown_reproduces_the_one_pass_result() {
        let db = scenario_database();
        let one_pass = AggOne::new(&db).unwrap();
        let pushdown = AggTwo::new(&db).unwrap();
        assert_eq!(pushdown.compute_one(), 2);
        assert_eq!(one_pass.compute_all(), pushdown.compute_all());
    }

    #[test]
    fn all_engines_agree_on_the_scenario() {
        let db = scenario_database();
        let reference = naive::run_query(&db, &naive::build_query_all(&db)).unwrap();
        assert_eq!(AggOne::new(&db).unwrap().compute_all(), reference);
        assert_eq!(AggTwo::new(&db).unwrap().compute_all(), reference);
    }

    #[test]
    fn all_engines_agree_on_four_relations() {
        let db = four_relation_database();
        let one_pass = AggOne::new(&db).unwrap().compute_all();
        let pushdown = AggTwo::new(&db).unwrap().compute_all();
        let reference = naive::run_query(&db, &naive::build_query_all(&db)).unwrap();
        assert_eq!(one_pass, pushdown);
        assert_eq!(one_pass, reference);
    }

    #[test]
    fn one_aggregate_matches_the_first_of_all() {
        let db = four_relation_database();
        let one_pass = AggOne::new(&db).unwrap();
        let pushdown = AggTwo::new(&db).unwrap();
        assert_eq!(one_pass.compute_one(), one_pass.compute_all()[0]);
        assert_eq!(pushdown.compute_one(), pushdown.compute_all()[0]);
    }

    #[test]
    fn raw_join_count_matches_nested_loop_join() {
        let db = four_relation_database();
        let agg = AggOne::new(&db).unwrap();
        let relations: Vec<&Relation> = db.relations().iter().collect();
        let join = naive::materialize_natural_join(&relations);
        assert_eq!(agg.count_result_tuples(), join.rows.len() as u64);
    }

    #[test]
    fn enumeration_is_in_lexicographic_trie_order() {
        let db = four_relation_database();
        let plan = JoinPlan::new(&db).unwrap();
        let bindings: Vec<Vec<i64>> = drain_bindings(&db, &plan);
        assert!(!bindings.is_empty());
        for window in bindings.windows(2) {
            assert!(window[0] < window[1], "bindings must strictly increase");
        }
    }

    #[test]
    fn draining_twice_yields_the_same_sequence() {
        let db = four_relation_database();
        let plan = JoinPlan::new(&db).unwrap();
        assert_eq!(drain_bindings(&db, &plan), drain_bindings(&db, &plan));
    }

    #[test]
    fn key_absent_from_one_relation_is_skipped() {
        let db = Database::new(vec![
            relation("R1", &["A", "B"], vec![vec![1, 1], vec![2, 2], vec![3, 3]]),
            relation("R2", &["A", "C"], vec![vec![1, 4], vec![3, 5]]),
        ]);
        let plan = JoinPlan::new(&db).unwrap();
        let bindings = drain_bindings(&db, &plan);
        assert_eq!(bindings, vec![vec![1], vec![3]]);
    }

    #[test]
    fn single_relation_join_is_the_relation_itself() {
        let rows = vec![vec![1, 2], vec![3, 4], vec![5, 6]];
        let db = Database::new(vec![relation("R", &["A", "B"], rows.clone())]);
        let agg = AggOne::new(&db).unwrap();
        assert_eq!(agg.count_result_tuples(), rows.len() as u64);
        let reference = naive::run_query(&db, &naive::build_query_all(&db)).unwrap();
        assert_eq!(agg.compute_all(), reference);
    }

    #[test]
    fn empty_relation_empties_the_join() {
        let db = Database::new(vec![
            relation("R1", &["A", "B"], vec![vec![1, 1]]),
            relation("R2", &["A", "C"], vec![]),
        ]);
        let agg = AggOne::new(&db).unwrap();
        assert_eq!(agg.count_result_tuples(), 0);
        assert!(agg.compute_all().iter().all(|&total| total == 0));
        assert!(AggTwo::new(&db).unwrap().compute_all().iter().all(|&total| total == 0));
    }

    /// Drain a fresh trie join, projecting each result onto the bound join
    /// variables (taken at their first occurrence).
    fn drain_bindings(db: &Database, plan: &JoinPlan) -> Vec<Vec<i64>> {
        let positions: Vec<(usize, usize)> = plan
            .variables()
            .iter()
            .map(|variable| variable.occurrences[0])
            .collect();
        let mut join = LeapfrogTriejoin::new(db, plan.variables());
        let mut bindings = Vec::new();
        while !join.overall_at_end() {
            let tuple = join.result_tuple();
            bindings.push(
                positions
                    .iter()
                    .map(|&(relation, position)| tuple[relation][position])
                    .collect(),
            );
            join.overall_next();
        }
        bindings
    }
}
