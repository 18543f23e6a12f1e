use std::path::Path;

use crate::error;
use crate::files;
use crate::first_pass;
use crate::macro_expander;
use crate::second_pass;


/// Run the full pipeline for one input unit: macro expansion, first pass,
/// second pass, and (on success) the `.ob`/`.ent`/`.ext` files (§2).
/// Returns whether the unit assembled without error.
pub fn assemble_unit(base_name: &str, verbose: bool, keep_intermediates: bool) -> bool {
    if let Some(extension) = Path::new(base_name).extension() {
        if extension != "as" {
            error::warn(&format!("Input file \"{base_name}\" does not have an \".as\" extension."));
        }
    }

    let source_path = Path::new(base_name).with_extension("as");
    let raw_lines = files::read_lines(&source_path)
        .unwrap_or_else(|err| error::io_error(err, &format!("Could not read \"{}\".", source_path.display())));

    if verbose {
        println!("[{base_name}] expanding macros");
    }

    let expanded = match macro_expander::expand(base_name, &raw_lines) {
        Ok(lines) => lines,
        Err(()) => {
            println!("[{base_name}] macro expansion failed; no output files written.");
            return false;
        }
    };

    let am_path = Path::new(base_name).with_extension("am");
    files::write_lines(&am_path, &expanded)
        .unwrap_or_else(|err| error::io_error(err, &format!("Could not write \"{}\".", am_path.display())));

    if verbose {
        println!("[{base_name}] first pass");
    }
    let (records, symbols, first_pass_had_error) = first_pass::run(base_name, &expanded);

    if verbose {
        println!("[{base_name}] second pass");
    }
    let second_pass_result = second_pass::run(&records, &symbols);

    let had_error = first_pass_had_error || second_pass_result.had_error;

    if had_error {
        println!("[{base_name}] assembly failed; .ob/.ent/.ext were not written.");
    } else {
        let ob_path = Path::new(base_name).with_extension("ob");
        files::write_object(&ob_path, &second_pass_result)
            .unwrap_or_else(|err| error::io_error(err, &format!("Could not write \"{}\".", ob_path.display())));

        let entries: Vec<(String, usize)> = symbols.entries().map(|(name, address)| (name.to_string(), address)).collect();
        if !entries.is_empty() {
            let ent_path = Path::new(base_name).with_extension("ent");
            files::write_entries(&ent_path, &entries)
                .unwrap_or_else(|err| error::io_error(err, &format!("Could not write \"{}\".", ent_path.display())));
        }

        if !second_pass_result.externs.is_empty() {
            let ext_path = Path::new(base_name).with_extension("ext");
            files::write_externs(&ext_path, &second_pass_result.externs)
                .unwrap_or_else(|err| error::io_error(err, &format!("Could not write \"{}\".", ext_path.display())));
        }
    }

    if !keep_intermediates {
        let _ = std::fs::remove_file(&am_path);
    }

    !had_error
}
