/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fs;
use std::process;
use std::sync::Arc;

use clap::Parser;
use log::debug;
use sparql_criteria::{
    Condition, PrefixNamespaceResolver, Result, SearchCompiler, SearchConfig, SolrQueryPreparer,
};

#[derive(Parser)]
#[command(
    name = "sparql-criteria-cli",
    version = "0.1.0",
    author = "Volodymyr Kadzhaia <vkadzhaia@gmail.com>",
    author = "Pieter Bonte <pieter.bonte@kuleuven.be>",
    about = "Compiles a search condition tree into a SPARQL fragment",
    long_about = "sparql-criteria CLI - reads a JSON condition tree of AND/OR junctions over field/operator/type/values rules and prints the SPARQL graph pattern that selects the matching instances."
)]
struct Args {
    #[arg(short = 'c', long, help = "JSON condition tree", value_name = "FILE")]
    condition: String,

    #[arg(long, help = "JSON file overriding the reserved names", value_name = "FILE")]
    config: Option<String>,

    #[arg(short, long, help = "Print PREFIX declarations before the fragment")]
    prefixes: bool,
}

fn run(args: &Args) -> Result<String> {
    let config = match &args.config {
        Some(path) => SearchConfig::from_file(path)?,
        None => SearchConfig::default(),
    };
    let tree = Condition::from_json(&fs::read_to_string(&args.condition)?)?;
    debug!("loaded condition tree with {} rules", tree.rule_count());

    let resolver = Arc::new(PrefixNamespaceResolver::with_defaults());
    let compiler = SearchCompiler::with_defaults(config, resolver.clone(), Arc::new(SolrQueryPreparer::new()));

    let mut output = String::new();
    if args.prefixes {
        output.push_str(&resolver.prefix_declarations());
        output.push('\n');
    }
    output.push_str(compiler.compile(&tree).trim());
    Ok(output)
}

fn main() {
    let args = Args::parse();

    match run(&args) {
        Ok(fragment) => println!("{}", fragment),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
