/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use clap::{Parser, Subcommand};
use leapjoin::agg_one::AggOne;
use leapjoin::agg_two::AggTwo;
use leapjoin::database::{housing_schema, schemas_from_json, test_schema, Database, RelationSchema};
use leapjoin::naive;
use leapjoin::synthetic::{generate_database, write_directory};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(
    name = "benchmarker",
    version = "0.1.0",
    about = "Benchmark harness for the leapjoin aggregation engine",
    long_about = "Loads (or generates) a database of flat .tbl relation files and times \
                  the one-pass and pushdown aggregation algorithms over its natural join."
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a synthetic database directory in loader format
    Generate {
        #[arg(long, help = "Output directory", value_name = "DIR")]
        out: PathBuf,
        #[arg(long, default_value = "housing", help = "Schema: housing, test or a JSON file")]
        schema: String,
        #[arg(long, default_value_t = 10_000, help = "Rows per relation")]
        rows: usize,
        #[arg(long, default_value_t = 1_000, help = "Range of shared key values")]
        key_range: i64,
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Run and time the aggregation algorithms on a database directory
    Run {
        #[arg(long, help = "Database directory with one .tbl per relation", value_name = "DIR")]
        data: PathBuf,
        #[arg(long, default_value = "housing", help = "Schema: housing, test or a JSON file")]
        schema: String,
        #[arg(long, default_value_t = 4, help = "Timed repeats per query (after one warmup)")]
        repeats: usize,
        #[arg(long, help = "Print query results, not only timings")]
        output_results: bool,
        #[arg(long, help = "Cross-validate against the naive reference engine")]
        check: bool,
    },
}

fn resolve_schema(name: &str) -> Result<Vec<RelationSchema>, Box<dyn std::error::Error>> {
    match name {
        "housing" => Ok(housing_schema()),
        "test" => Ok(test_schema()),
        path => Ok(schemas_from_json(std::path::Path::new(path))?),
    }
}

fn time_millis<T>(mut run: impl FnMut() -> T) -> (T, u128) {
    let start = Instant::now();
    let value = run();
    (value, start.elapsed().as_millis())
}

fn average(times: &[u128]) -> u128 {
    times.iter().sum::<u128>() / times.len() as u128
}

fn run_runner(
    name: &str,
    database: &Database,
    repeats: usize,
    output_results: bool,
    compute_all: &dyn Fn(&Database) -> Vec<i64>,
    compute_one: &dyn Fn(&Database) -> i64,
) {
    // Warmup run, not counted.
    let (result_all, _) = time_millis(|| compute_all(database));
    let (result_one, _) = time_millis(|| compute_one(database));
    if output_results {
        println!("RESULT\t{}\tAll\t{:?}", name, result_all);
        println!("RESULT\t{}\tOne\t{}", name, result_one);
    }

    let mut all_times = Vec::with_capacity(repeats);
    let mut one_times = Vec::with_capacity(repeats);
    for _ in 0..repeats {
        all_times.push(time_millis(|| compute_all(database)).1);
        one_times.push(time_millis(|| compute_one(database)).1);
    }
    println!("TIME\t{}\tAll\t{}", name, average(&all_times));
    println!("TIME\t{}\tOne\t{}", name, average(&one_times));
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Command::Generate {
            out,
            schema,
            rows,
            key_range,
            seed,
        } => {
            let schemas = resolve_schema(&schema)?;
            let database = generate_database(&schemas, rows, key_range, seed);
            write_directory(&database, &out)?;
            println!(
                "generated {} relations with {} rows each under {}",
                schemas.len(),
                rows,
                out.display()
            );
        }
        Command::Run {
            data,
            schema,
            repeats,
            output_results,
            check,
        } => {
            let schemas = resolve_schema(&schema)?;
            let database = Database::from_directory(&data, &schemas)?;

            run_runner(
                "AggOne",
                &database,
                repeats,
                output_results,
                &|db| AggOne::new(db).expect("valid join shape").compute_all(),
                &|db| AggOne::new(db).expect("valid join shape").compute_one(),
            );
            run_runner(
                "AggTwo",
                &database,
                repeats,
                output_results,
                &|db| AggTwo::new(db).expect("valid join shape").compute_all(),
                &|db| AggTwo::new(db).expect("valid join shape").compute_one(),
            );

            if check {
                let one_pass = AggOne::new(&database)?.compute_all();
                let pushdown = AggTwo::new(&database)?.compute_all();
                let reference = naive::run_query(&database, &naive::build_query_all(&database))?;
                if one_pass != pushdown || one_pass != reference {
                    eprintln!("CHECK FAILED: algorithms disagree");
                    eprintln!("  AggOne: {:?}", one_pass);
                    eprintln!("  AggTwo: {:?}", pushdown);
                    eprintln!("  Naive:  {:?}", reference);
                    std::process::exit(1);
                }
                println!("CHECK OK: AggOne, AggTwo and the reference engine agree");
            }
        }
    }
    Ok(())
}
