use std::collections::HashSet;
use std::rc::Rc;

use asm_core::addressing::AddressingMode;
use asm_core::opcode::Opcode;
use asm_core::source::SourceToken;
use asm_core::word::{MAX_LABEL_LENGTH, MEMORY_START};
use asm_core::registers::Registers;

use crate::error;
use crate::line_record::{LineKind, LineRecord, Operand};
use crate::symbol_table::{Symbol, SymbolTable};


/// Validate a label per invariant 1: at most 30 characters, starts with a
/// letter, the rest alphanumeric, and not the name of a register. Checks
/// run in the same order as the original's `badLabel`, so a diagnostic
/// always names the first rule that actually failed.
fn validate_label(token: &Rc<SourceToken>, name: &str) -> Result<(), ()> {
    if name.len() > MAX_LABEL_LENGTH {
        error::recoverable(token, &format!("Label \"{name}\" is longer than {MAX_LABEL_LENGTH} characters."));
        return Err(());
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => {
            error::recoverable(token, &format!("Label \"{name}\" must start with a letter."));
            return Err(());
        }
    }
    if !chars.all(|c| c.is_ascii_alphanumeric()) {
        error::recoverable(token, &format!("Label \"{name}\" must contain only letters and digits."));
        return Err(());
    }
    if Registers::from_name(name).is_some() {
        error::recoverable(token, &format!("Label \"{name}\" is the name of a register."));
        return Err(());
    }
    Ok(())
}

/// Split the label off the front of a line, if present, validating it.
/// Returns the remaining text (trimmed) and the label, if any.
fn take_label<'a>(token: &Rc<SourceToken>, text: &'a str) -> Result<(Option<String>, &'a str), ()> {
    match text.split_once(char::is_whitespace) {
        Some((first, rest)) if first.ends_with(':') => {
            let name = first.trim_end_matches(':').to_string();
            validate_label(token, &name)?;
            Ok((Some(name), rest.trim_start()))
        }
        _ if text.ends_with(':') => {
            let name = text.trim_end_matches(':').to_string();
            validate_label(token, &name)?;
            Ok((Some(name), ""))
        }
        _ => Ok((None, text)),
    }
}

fn parse_operands(token: &Rc<SourceToken>, text: &str) -> Result<(Option<Operand>, Option<Operand>), ()> {
    if text.is_empty() {
        return Ok((None, None));
    }
    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    if parts.len() > 2 {
        error::recoverable(token, "Too many operands; at most two are allowed.");
        return Err(());
    }
    if parts.iter().any(|p| p.is_empty()) {
        error::recoverable(token, "Expected an operand between commas.");
        return Err(());
    }
    let operands: Vec<Operand> = parts.into_iter()
        .map(|p| Operand { mode: AddressingMode::classify(p), text: p.to_string() })
        .collect();
    match operands.len() {
        1 => Ok((None, operands.into_iter().next())),
        2 => {
            let mut it = operands.into_iter();
            let source = it.next();
            let destination = it.next();
            Ok((source, destination))
        }
        _ => Ok((None, None)),
    }
}

fn parse_string_literal(token: &Rc<SourceToken>, text: &str) -> Result<String, ()> {
    let text = text.trim();
    if text.len() < 2 || !text.starts_with('"') || !text.ends_with('"') {
        error::recoverable(token, "Missing terminating quote on \".string\" directive.");
        return Err(());
    }
    Ok(text[1..text.len() - 1].to_string())
}

fn parse_data_literals(token: &Rc<SourceToken>, text: &str) -> Result<Vec<String>, ()> {
    if text.trim().is_empty() {
        error::recoverable(token, "\".data\" directive requires at least one literal.");
        return Err(());
    }
    let literals: Vec<String> = text.split(',').map(|s| s.trim().to_string()).collect();
    if literals.iter().any(|l| l.is_empty()) {
        error::recoverable(token, "Expected a literal between commas in \".data\".");
        return Err(());
    }
    Ok(literals)
}

fn instruction_width(opcode: &Opcode, source: &Option<Operand>, destination: &Option<Operand>) -> usize {
    match (source, destination) {
        (None, None) => 1,
        (None, Some(_)) => 2,
        (Some(s), Some(d)) if s.mode.is_register_class() && d.mode.is_register_class() => 2,
        _ => {
            let _ = opcode;
            3
        }
    }
}

fn parse_line(token: Rc<SourceToken>) -> Result<LineRecord, ()> {
    let text = token.line_text().to_string();
    let (label, rest) = take_label(&token, &text)?;

    let (mnemonic, payload) = match rest.split_once(char::is_whitespace) {
        Some((m, p)) => (m, p.trim_start()),
        None => (rest, ""),
    };

    if mnemonic.is_empty() {
        error::recoverable(&token, "Expected an instruction or directive after the label.");
        return Err(());
    }

    let kind = if let Some(opcode) = Opcode::from_mnemonic(mnemonic) {
        let (source, destination) = parse_operands(&token, payload)?;
        let width = instruction_width(&opcode, &source, &destination);
        return Ok(LineRecord {
            token,
            label,
            address: 0,
            width,
            kind: LineKind::Instruction { opcode, source, destination },
            is_entry: false,
            is_extern: false,
        });
    } else {
        match mnemonic {
            ".data" => {
                let literals = parse_data_literals(&token, payload)?;
                LineKind::Data { literals }
            }
            ".string" => {
                let text = parse_string_literal(&token, payload)?;
                LineKind::Str { text }
            }
            ".entry" => {
                if payload.is_empty() {
                    error::recoverable(&token, "\".entry\" requires a symbol name.");
                    return Err(());
                }
                LineKind::Entry { symbol: payload.to_string() }
            }
            ".extern" => {
                if payload.is_empty() {
                    error::recoverable(&token, "\".extern\" requires a symbol name.");
                    return Err(());
                }
                LineKind::Extern { symbol: payload.to_string() }
            }
            _ => {
                error::recoverable(&token, &format!("Unknown instruction or directive \"{mnemonic}\"."));
                return Err(());
            }
        }
    };

    let width = match &kind {
        LineKind::Data { literals } => literals.len(),
        LineKind::Str { text } => text.chars().count() + 1,
        LineKind::Entry { .. } | LineKind::Extern { .. } => 0,
        LineKind::Instruction { .. } => unreachable!(),
    };

    Ok(LineRecord {
        token,
        label,
        address: 0,
        width,
        kind,
        is_entry: false,
        is_extern: false,
    })
}

/// Parse the full expanded source into line records with addresses
/// assigned and the symbol table resolved (§4.2). Returns `Err(())` if any
/// line failed to parse or the entry/extern resolution sweep found a
/// problem; in that case `records` may still be partially populated for
/// whatever later stages choose to do with it, but per §7 no output files
/// should be written.
pub fn run(unit_name: &str, expanded_lines: &[String]) -> (Vec<LineRecord>, SymbolTable, bool) {
    let mut records = Vec::new();
    let mut symbols = SymbolTable::new();
    let mut had_error = false;
    let mut address = MEMORY_START;

    for (index, text) in expanded_lines.iter().enumerate() {
        let token = SourceToken::new(unit_name, index + 1, text.clone());
        match parse_line(token) {
            Ok(mut record) => {
                if record.emits_words() {
                    record.address = address;
                    address += record.width;
                }
                if let Some(name) = record.label.clone() {
                    if !matches!(record.kind, LineKind::Entry { .. } | LineKind::Extern { .. }) {
                        if let Some(previous) = symbols.declare_local(name.clone(), record.address, Rc::clone(&record.token)) {
                            let previous_token = match previous {
                                Symbol::Local { token, .. } => token,
                                Symbol::Extern { token } => token,
                            };
                            error::duplicate_label(&record.token, &previous_token, &name);
                            had_error = true;
                        }
                    }
                }
                records.push(record);
            }
            Err(()) => had_error = true,
        }
    }

    let mut entry_names: HashSet<String> = HashSet::new();
    let mut extern_names: HashSet<String> = HashSet::new();

    for record in &records {
        match &record.kind {
            LineKind::Extern { symbol } => {
                extern_names.insert(symbol.clone());
                if let Some(previous) = symbols.declare_extern(symbol.clone(), Rc::clone(&record.token)) {
                    if matches!(previous, Symbol::Local { .. }) {
                        error::duplicate_label(&record.token, record_token_for(&previous), symbol);
                        had_error = true;
                    }
                }
            }
            _ => {}
        }
    }

    for record in &records {
        if let LineKind::Entry { symbol } = &record.kind {
            if symbols.mark_entry(symbol).is_err() {
                error::undefined_entry(&record.token, symbol);
                had_error = true;
            } else {
                entry_names.insert(symbol.clone());
            }
        }
    }

    // §3's Lifecycle paragraph (a): retroactively mark every record whose
    // label is named by a `.entry`/`.extern` directive.
    for record in records.iter_mut() {
        if let Some(label) = record.label.clone() {
            if entry_names.contains(&label) {
                record.is_entry = true;
            }
            if extern_names.contains(&label) {
                record.is_extern = true;
            }
            if record.is_entry && record.is_extern {
                error::recoverable(&record.token, &format!("\"{label}\" cannot be both an entry and an extern symbol."));
                had_error = true;
            }
        }
    }

    (records, symbols, had_error)
}

fn record_token_for(symbol: &Symbol) -> &Rc<SourceToken> {
    match symbol {
        Symbol::Local { token, .. } => token,
        Symbol::Extern { token } => token,
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses_are_assigned_densely_from_one_hundred() {
        let lines = vec!["stop".to_string(), "stop".to_string()];
        let (records, _, had_error) = run("t.as", &lines);
        assert!(!had_error);
        assert_eq!(records[0].address, 100);
        assert_eq!(records[1].address, 101);
    }

    #[test]
    fn a_label_exactly_thirty_characters_is_accepted() {
        let name = "a".repeat(30);
        let lines = vec![format!("{name}: stop")];
        let (records, symbols, had_error) = run("t.as", &lines);
        assert!(!had_error);
        assert!(matches!(symbols.get(&name), Some(Symbol::Local { .. })));
        assert_eq!(records[0].label.as_deref(), Some(name.as_str()));
    }

    #[test]
    fn a_label_thirty_one_characters_is_rejected() {
        let name = "a".repeat(31);
        let lines = vec![format!("{name}: stop")];
        let (_, _, had_error) = run("t.as", &lines);
        assert!(had_error);
    }

    #[test]
    fn a_register_name_is_not_a_valid_label() {
        let lines = vec!["r3: stop".to_string()];
        let (_, _, had_error) = run("t.as", &lines);
        assert!(had_error);
    }

    #[test]
    fn duplicate_labels_are_diagnosed() {
        let lines = vec!["LOOP: stop".to_string(), "LOOP: stop".to_string()];
        let (_, _, had_error) = run("t.as", &lines);
        assert!(had_error);
    }

    #[test]
    fn instruction_width_rules_match_the_addressing_modes() {
        let lines = vec![
            "stop".to_string(),
            "jmp LOOP".to_string(),
            "mov r1, r2".to_string(),
            "mov #5, r3".to_string(),
            "LOOP: stop".to_string(),
        ];
        let (records, _, had_error) = run("t.as", &lines);
        assert!(!had_error);
        assert_eq!(records[0].width, 1);
        assert_eq!(records[1].width, 2);
        assert_eq!(records[2].width, 2);
        assert_eq!(records[3].width, 3);
    }

    #[test]
    fn entry_for_an_undefined_symbol_is_an_error() {
        let lines = vec![".entry MISSING".to_string()];
        let (_, _, had_error) = run("t.as", &lines);
        assert!(had_error);
    }

    #[test]
    fn entry_and_extern_on_the_same_symbol_is_an_error() {
        let lines = vec![".extern SHARED".to_string(), ".entry SHARED".to_string()];
        let (_, _, had_error) = run("t.as", &lines);
        assert!(had_error);
    }

    #[test]
    fn a_entry_directive_retroactively_marks_its_labels_record() {
        let lines = vec!["LOOP: stop".to_string(), ".entry LOOP".to_string()];
        let (records, _, had_error) = run("t.as", &lines);
        assert!(!had_error);
        assert!(records[0].is_entry);
        assert!(!records[0].is_extern);
    }

    #[test]
    fn a_data_directive_with_one_literal_has_width_one() {
        let lines = vec!["NUM: .data 7".to_string()];
        let (records, _, had_error) = run("t.as", &lines);
        assert!(!had_error);
        assert_eq!(records[0].width, 1);
    }

    #[test]
    fn a_string_directive_width_is_length_plus_one() {
        let lines = vec!["STR: .string \"ab\"".to_string()];
        let (records, _, had_error) = run("t.as", &lines);
        assert!(!had_error);
        assert_eq!(records[0].width, 3);
    }
}
