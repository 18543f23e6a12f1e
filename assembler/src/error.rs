use std::rc::Rc;

use colored::Colorize;
use indoc::{formatdoc, printdoc};

use asm_core::source::SourceToken;


pub fn warn(message: &str) {
    println!("{}", formatdoc!("
        Warning: {}
        ",
        message
    ).bright_yellow());
}


fn print_source_line(token: &SourceToken) {
    println!("  {} | {}", token.line_number(), token.line_text());
}


/// A lexical, structural, or semantic diagnostic (§7 kinds 1-3). Prints and
/// returns; the caller marks the offending line record and keeps going.
pub fn recoverable(token: &Rc<SourceToken>, message: &str) {
    printdoc!("
        {} in \"{}\" at line {}:

        ",
        "Error".red().bold(), token.unit_name(), token.line_number()
    );
    print_source_line(token);
    println!("{}\n", message);
}


pub fn duplicate_label(token: &Rc<SourceToken>, previous: &Rc<SourceToken>, name: &str) {
    printdoc!("
        {} in \"{}\" at line {}:

        ",
        "Error".red().bold(), token.unit_name(), token.line_number()
    );
    print_source_line(token);
    println!("Label \"{}\" is already declared at line {}.\n", name, previous.line_number());
}


pub fn undefined_entry(token: &Rc<SourceToken>, name: &str) {
    printdoc!("
        {} in \"{}\" at line {}:

        ",
        "Error".red().bold(), token.unit_name(), token.line_number()
    );
    print_source_line(token);
    println!("\".entry {}\" names a symbol that is never declared in this unit.\n", name);
}


/// A resource failure (§7 kind 4): the file couldn't be opened, created, or
/// the macro table overflowed its capacity. Fatal, matching main.rs's
/// `unwrap_or_else(|err| error::io_error(...))` idiom.
pub fn io_error(err: std::io::Error, context: &str) -> ! {
    printdoc!("
        {}: {}
        {}
        ",
        "I/O error".red().bold(), context, err
    );
    std::process::exit(1);
}


pub fn capacity_exceeded(token: &Rc<SourceToken>, what: &str, limit: usize) -> ! {
    printdoc!("
        {} in \"{}\" at line {}:

        ",
        "Error".red().bold(), token.unit_name(), token.line_number()
    );
    print_source_line(token);
    println!("{} exceeds the configured limit of {}.\n", what, limit);
    std::process::exit(1);
}
