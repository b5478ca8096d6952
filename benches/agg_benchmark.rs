/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

extern crate criterion;
extern crate leapjoin;

use criterion::*;
use leapjoin::agg_one::AggOne;
use leapjoin::agg_two::AggTwo;
use leapjoin::database::{housing_schema, Database};
use leapjoin::synthetic::generate_database;

fn setup_database() -> Database {
    generate_database(&housing_schema(), 5_000, 500, 42)
}

fn my_benchmark(c: &mut Criterion) {
    let db = setup_database();

    c.bench_function("agg_one all aggregates", |b| {
        b.iter(|| AggOne::new(&db).unwrap().compute_all())
    });

    c.bench_function("agg_two all aggregates", |b| {
        b.iter(|| AggTwo::new(&db).unwrap().compute_all())
    });
}

fn my_benchmark2(c: &mut Criterion) {
    let db = setup_database();

    c.bench_function("agg_one one aggregate", |b| {
        b.iter(|| AggOne::new(&db).unwrap().compute_one())
    });

    c.bench_function("agg_two one aggregate", |b| {
        b.iter(|| AggTwo::new(&db).unwrap().compute_one())
    });
}

criterion_group!(benches, my_benchmark, my_benchmark2);
criterion_main!(benches);
