#![deny(unused_must_use)]

mod assembler;
mod cli_parser;
mod config;
mod error;
mod files;
mod first_pass;
mod line_record;
mod macro_expander;
mod second_pass;
mod symbol_table;

use clap::Parser;

use crate::cli_parser::CliParser;


fn main() {

    let args = CliParser::parse();

    let mut any_failed = false;
    for base_name in &args.input_files {
        if !assembler::assemble_unit(base_name, args.verbose, args.keep_intermediates) {
            any_failed = true;
        }
    }

    if any_failed {
        std::process::exit(1);
    }

}
