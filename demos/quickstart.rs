/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use leapjoin::agg_one::AggOne;
use leapjoin::agg_two::AggTwo;
use leapjoin::database::Database;
use leapjoin::naive;
use leapjoin::relation::Relation;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let database = Database::new(vec![
        Relation::with_tuples(
            "R1",
            vec!["A".to_string(), "B".to_string(), "C".to_string()],
            vec![vec![1, 1, 5], vec![1, 2, 6]],
        ),
        Relation::with_tuples(
            "R2",
            vec!["A".to_string(), "D".to_string()],
            vec![vec![1, 9]],
        ),
    ]);

    let agg_one = AggOne::new(&database)?;
    let agg_two = AggTwo::new(&database)?;

    println!("query: {}", naive::build_query_all(&database));
    println!("one-pass:  {:?}", agg_one.compute_all());
    println!("pushdown:  {:?}", agg_two.compute_all());
    println!("reference: {:?}", naive::run_query(&database, &naive::build_query_all(&database))?);

    Ok(())
}
