use std::rc::Rc;

use asm_core::addressing::AddressingMode;
use asm_core::opcode::Opcode;
use asm_core::source::SourceToken;


/// An operand as parsed by the first pass: its addressing mode plus the raw
/// operand text, resolved against registers/symbols by the second pass.
#[derive(Debug, Clone)]
pub struct Operand {
    pub mode: AddressingMode,
    pub text: String,
}

/// The classification-specific payload of a line record (§3; Design Note 1:
/// a sum type discriminated by line kind rather than one struct carrying
/// every field regardless of classification).
#[derive(Debug)]
pub enum LineKind {
    Instruction {
        opcode: Opcode,
        source: Option<Operand>,
        destination: Option<Operand>,
    },
    Data {
        literals: Vec<String>,
    },
    Str {
        text: String,
    },
    Entry {
        symbol: String,
    },
    Extern {
        symbol: String,
    },
}

/// One parsed source line. Created once by the first pass; mutated
/// afterwards only via `is_entry`/`is_extern` (§3's Lifecycle paragraph).
#[derive(Debug)]
pub struct LineRecord {
    pub token: Rc<SourceToken>,
    pub label: Option<String>,
    pub address: usize,
    pub width: usize,
    pub kind: LineKind,
    pub is_entry: bool,
    pub is_extern: bool,
}

impl LineRecord {
    /// Whether this record occupies space in the memory image. Directive
    /// lines for `.entry`/`.extern` carry no memory-cell width of their own.
    pub fn emits_words(&self) -> bool {
        !matches!(self.kind, LineKind::Entry { .. } | LineKind::Extern { .. })
    }
}
