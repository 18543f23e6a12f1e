use std::rc::Rc;

use asm_core::addressing::AddressingMode;
use asm_core::opcode::Opcode;
use asm_core::registers::Registers;
use asm_core::source::SourceToken;
use asm_core::word::{fits_signed, mask_to_word, Are, Word, IMMEDIATE_VALUE_BITS, WORD_BITS};

use crate::error;
use crate::line_record::{LineKind, LineRecord, Operand};
use crate::symbol_table::{Symbol, SymbolTable};


/// One emitted word, already assigned its final memory address.
#[derive(Debug, Clone, Copy)]
pub struct ObjectWord {
    pub address: usize,
    pub value: Word,
}

/// Everything the second pass produces for a single unit (§4.3).
#[derive(Debug, Default)]
pub struct SecondPassResult {
    pub words: Vec<ObjectWord>,
    pub instruction_count: usize,
    pub data_count: usize,
    /// One `(symbol, use_site_address)` pair per extern reference, in the
    /// order they were encountered.
    pub externs: Vec<(String, usize)>,
    pub had_error: bool,
}

/// Which operand slot a register occupies, which decides which nibble of
/// the shared or lone register word it's packed into (§4.3).
#[derive(Clone, Copy)]
enum Role {
    Source,
    Destination,
}

/// Encode every line record into its final words, resolving symbol
/// references against the first pass's symbol table (§4.3). If any record
/// fails to encode, `had_error` is set and its words are simply omitted —
/// the caller is responsible for suppressing output files in that case.
pub fn run(records: &[LineRecord], symbols: &SymbolTable) -> SecondPassResult {
    let mut result = SecondPassResult::default();

    for record in records {
        match &record.kind {
            LineKind::Instruction { opcode, source, destination } => {
                match encode_instruction(record, *opcode, source, destination, symbols, &mut result.externs) {
                    Ok(words) => {
                        result.instruction_count += words.len();
                        for (offset, value) in words.into_iter().enumerate() {
                            result.words.push(ObjectWord { address: record.address + offset, value });
                        }
                    }
                    Err(()) => result.had_error = true,
                }
            }
            LineKind::Data { literals } => match encode_data(&record.token, literals) {
                Ok(values) => {
                    result.data_count += values.len();
                    for (offset, value) in values.into_iter().enumerate() {
                        result.words.push(ObjectWord { address: record.address + offset, value });
                    }
                }
                Err(()) => result.had_error = true,
            },
            LineKind::Str { text } => {
                let values = encode_string(text);
                result.data_count += values.len();
                for (offset, value) in values.into_iter().enumerate() {
                    result.words.push(ObjectWord { address: record.address + offset, value });
                }
            }
            LineKind::Entry { .. } | LineKind::Extern { .. } => {}
        }
    }

    result.words.sort_by_key(|w| w.address);
    result
}

/// Encode one instruction record's opcode word plus its operand word(s),
/// per the bit layout and legality table in §4.3.
fn encode_instruction(
    record: &LineRecord,
    opcode: Opcode,
    source: &Option<Operand>,
    destination: &Option<Operand>,
    symbols: &SymbolTable,
    externs: &mut Vec<(String, usize)>,
) -> Result<Vec<Word>, ()> {
    let token = &record.token;

    let expected = opcode.operand_count();
    let actual = source.is_some() as u8 + destination.is_some() as u8;
    if actual != expected {
        error::recoverable(
            token,
            &format!("\"{}\" expects {} operand(s), found {}.", opcode.mnemonic(), expected, actual),
        );
        return Err(());
    }

    let mut illegal = false;
    if let Some(src) = source {
        if !opcode.legal_source(src.mode) {
            error::recoverable(token, &format!("\"{}\" does not allow a {} source operand.", opcode.mnemonic(), src.mode));
            illegal = true;
        }
    }
    if let Some(dst) = destination {
        if !opcode.legal_destination(dst.mode) {
            error::recoverable(token, &format!("\"{}\" does not allow a {} destination operand.", opcode.mnemonic(), dst.mode));
            illegal = true;
        }
    }
    if illegal {
        return Err(());
    }

    let absolute = Are::Absolute.bits();
    let mut opcode_word = ((opcode.value() as u32) << 11) | absolute;
    if let Some(src) = source {
        opcode_word |= 1 << (7 + src.mode.encoded());
    }
    if let Some(dst) = destination {
        opcode_word |= 1 << (3 + dst.mode.encoded());
    }

    let mut words = vec![mask_to_word(opcode_word as i32)];

    match (source, destination) {
        (Some(src), Some(dst)) if src.mode.is_register_class() && dst.mode.is_register_class() => {
            let src_reg = parse_register(token, &src.text)?;
            let dst_reg = parse_register(token, &dst.text)?;
            let shared = ((src_reg as u32) << 6) | ((dst_reg as u32) << 3) | absolute;
            words.push(mask_to_word(shared as i32));
        }
        _ => {
            if let Some(src) = source {
                let address = record.address + words.len();
                words.push(encode_operand(token, src, Role::Source, symbols, address, externs)?);
            }
            if let Some(dst) = destination {
                let address = record.address + words.len();
                words.push(encode_operand(token, dst, Role::Destination, symbols, address, externs)?);
            }
        }
    }

    Ok(words)
}

/// Encode a single non-shared operand word: an Immediate literal, a Direct
/// symbol reference (recorded as a use site if the symbol is extern), or a
/// lone register packed into the nibble its role dictates (§4.3, and Open
/// Question decision 2: the destination nibble is used whenever the
/// register is the destination operand, never the source nibble).
fn encode_operand(
    token: &Rc<SourceToken>,
    operand: &Operand,
    role: Role,
    symbols: &SymbolTable,
    address: usize,
    externs: &mut Vec<(String, usize)>,
) -> Result<Word, ()> {
    let absolute = Are::Absolute.bits();

    match operand.mode {
        AddressingMode::Immediate => {
            let literal = operand.text.strip_prefix('#').unwrap_or(&operand.text);
            let value = parse_signed_literal(literal).ok_or_else(|| {
                error::recoverable(token, &format!("\"{}\" is not a valid immediate literal.", operand.text));
            })?;
            if !fits_signed(value as i64, IMMEDIATE_VALUE_BITS) {
                error::recoverable(token, &format!("Immediate value {value} does not fit in {IMMEDIATE_VALUE_BITS} bits."));
                return Err(());
            }
            Ok(mask_to_word(((value as i32) << 3) | absolute as i32))
        }
        AddressingMode::Direct => match symbols.get(&operand.text) {
            Some(Symbol::Extern { .. }) => {
                externs.push((operand.text.clone(), address));
                Ok(mask_to_word(Are::External.bits() as i32))
            }
            Some(Symbol::Local { address: symbol_address, .. }) => {
                Ok(mask_to_word(((*symbol_address as i32) << 3) | Are::Relocatable.bits() as i32))
            }
            None => {
                error::recoverable(token, &format!("Undefined label \"{}\".", operand.text));
                Err(())
            }
        },
        AddressingMode::IndirectRegister | AddressingMode::DirectRegister => {
            let reg = parse_register(token, &operand.text)?;
            let shift = match role {
                Role::Source => 6,
                Role::Destination => 3,
            };
            Ok(mask_to_word(((reg as i32) << shift) | absolute as i32))
        }
    }
}

fn parse_register(token: &Rc<SourceToken>, text: &str) -> Result<u8, ()> {
    let name = text.trim_start_matches('*');
    Registers::from_name(name).map(|r| r.number()).ok_or_else(|| {
        error::recoverable(token, &format!("\"{text}\" is not a valid register."));
    })
}

/// Parse one `.data` literal: an optional leading sign followed by one or
/// more digits and nothing else (`firstPass.c`'s `generateOutput` data
/// branch is the authority for this exact grammar).
fn parse_signed_literal(text: &str) -> Option<i32> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let magnitude: i32 = digits.parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

fn encode_data(token: &Rc<SourceToken>, literals: &[String]) -> Result<Vec<Word>, ()> {
    let mut values = Vec::with_capacity(literals.len());
    let mut had_error = false;
    for literal in literals {
        match parse_signed_literal(literal) {
            Some(value) if fits_signed(value as i64, WORD_BITS) => values.push(mask_to_word(value)),
            Some(value) => {
                error::recoverable(token, &format!("{value} does not fit in a {WORD_BITS}-bit word."));
                had_error = true;
            }
            None => {
                error::recoverable(token, &format!("\"{literal}\" is not a valid integer literal."));
                had_error = true;
            }
        }
    }
    if had_error {
        Err(())
    } else {
        Ok(values)
    }
}

/// Encode a `.string` literal: one word per character, masked to 15 bits,
/// followed by a terminating zero word (§3 invariant 5).
fn encode_string(text: &str) -> Vec<Word> {
    let mut values: Vec<Word> = text.chars().map(|c| mask_to_word(c as i32)).collect();
    values.push(0);
    values
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::first_pass;

    fn run_source(lines: &[&str]) -> (SecondPassResult, SymbolTable, bool) {
        let lines: Vec<String> = lines.iter().map(|s| s.to_string()).collect();
        let (records, symbols, first_pass_error) = first_pass::run("t.as", &lines);
        let result = run(&records, &symbols);
        (result, symbols, first_pass_error)
    }

    #[test]
    fn minimal_empty_program_encodes_to_scenario_one() {
        let (result, _, had_error) = run_source(&["stop"]);
        assert!(!had_error && !result.had_error);
        assert_eq!(result.instruction_count, 1);
        assert_eq!(result.words[0].address, 100);
        assert_eq!(result.words[0].value, 0o74004);
    }

    #[test]
    fn immediate_move_to_register_encodes_three_words() {
        let (result, _, had_error) = run_source(&["mov #5, r3"]);
        assert!(!had_error && !result.had_error);
        assert_eq!(result.words.len(), 3);
        assert_eq!(result.words[1].value, (5 << 3) | 4);
        assert_eq!(result.words[2].value, (3 << 3) | 4);
    }

    #[test]
    fn data_directive_masks_negative_literals_to_fifteen_bits() {
        let (result, _, had_error) = run_source(&["LIST: .data 7, -3, 10"]);
        assert!(!had_error && !result.had_error);
        let values: Vec<Word> = result.words.iter().map(|w| w.value).collect();
        assert_eq!(values, vec![7, 0x7FFD, 10]);
    }

    #[test]
    fn string_directive_emits_one_word_per_character_plus_terminator() {
        let (result, _, had_error) = run_source(&["STR: .string \"ab\""]);
        assert!(!had_error && !result.had_error);
        let values: Vec<Word> = result.words.iter().map(|w| w.value).collect();
        assert_eq!(values, vec!['a' as Word, 'b' as Word, 0]);
    }

    #[test]
    fn forward_label_reference_is_relocatable() {
        let (result, _, had_error) = run_source(&["jmp LOOP", "LOOP: stop"]);
        assert!(!had_error && !result.had_error);
        // jmp's operand word sits at 101; LOOP resolves to 102.
        let operand_word = result.words.iter().find(|w| w.address == 101).unwrap();
        assert_eq!(operand_word.value, (102 << 3) | 2);
    }

    #[test]
    fn extern_reference_is_recorded_as_a_use_site() {
        let (result, _, had_error) = run_source(&[".extern EXT", "mov EXT, r1"]);
        assert!(!had_error && !result.had_error);
        assert_eq!(result.externs, vec![("EXT".to_string(), 101)]);
        let operand_word = result.words.iter().find(|w| w.address == 101).unwrap();
        assert_eq!(operand_word.value, 1);
    }

    #[test]
    fn rts_with_an_operand_is_rejected() {
        let (result, _, had_error) = run_source(&["rts r3"]);
        assert!(!had_error);
        assert!(result.had_error);
    }

    #[test]
    fn lea_with_a_non_direct_source_is_rejected() {
        let (result, _, had_error) = run_source(&["lea r1, r2"]);
        assert!(!had_error);
        assert!(result.had_error);
    }

    #[test]
    fn a_label_referenced_but_never_declared_is_an_error() {
        let (result, _, had_error) = run_source(&["mov MISSING, r1"]);
        assert!(!had_error);
        assert!(result.had_error);
    }

    #[test]
    fn shared_register_word_packs_source_and_destination_nibbles() {
        let (result, _, had_error) = run_source(&["mov r1, r2"]);
        assert!(!had_error && !result.had_error);
        assert_eq!(result.words.len(), 2);
        assert_eq!(result.words[1].value, (1 << 6) | (2 << 3) | 4);
    }
}
