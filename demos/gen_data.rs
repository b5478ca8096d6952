/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use leapjoin::database::housing_schema;
use leapjoin::synthetic::{generate_database, write_directory};
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let database = generate_database(&housing_schema(), 10_000, 1_000, 42);
    let out = Path::new("housing-synthetic");
    write_directory(&database, out)?;
    for relation in database.relations() {
        println!("{}: {} tuples", relation.name(), relation.len());
    }
    println!("written to {}", out.display());
    Ok(())
}
