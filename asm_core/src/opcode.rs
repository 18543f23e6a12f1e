use crate::addressing::AddressingMode;


/// A predicate over addressing modes, used to express each opcode's legal
/// source/destination constraints (§4.3's opcode legality table).
pub type ModePredicate = fn(AddressingMode) -> bool;

fn any_mode(_: AddressingMode) -> bool {
    true
}

fn no_mode(_: AddressingMode) -> bool {
    false
}

fn not_immediate(mode: AddressingMode) -> bool {
    !matches!(mode, AddressingMode::Immediate)
}

fn direct_only(mode: AddressingMode) -> bool {
    matches!(mode, AddressingMode::Direct)
}

fn not_immediate_not_direct_register(mode: AddressingMode) -> bool {
    !matches!(mode, AddressingMode::Immediate | AddressingMode::DirectRegister)
}


macro_rules! declare_opcodes {
    ($($name:ident $mnemonic:literal = $value:literal, operands: $operand_count:literal, src: $src:expr, dst: $dst:expr);+ $(;)?) => {

#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    $($name = $value),+
}

impl Opcode {

    /// Look up an opcode by its mnemonic (§4.2 point 2).
    pub fn from_mnemonic(mnemonic: &str) -> Option<Self> {
        Some(match mnemonic {
            $($mnemonic => Self::$name,)+
            _ => return None,
        })
    }

    pub const fn mnemonic(&self) -> &'static str {
        match self {
            $(Self::$name => $mnemonic),+
        }
    }

    pub const fn value(&self) -> u8 {
        *self as u8
    }

    /// How many operands this opcode takes (0, 1, or 2), per §4.3.
    pub const fn operand_count(&self) -> u8 {
        match self {
            $(Self::$name => $operand_count),+
        }
    }

    /// Whether `mode` is a legal source addressing mode for this opcode.
    /// Meaningless (and unchecked by callers) when `operand_count() < 2`.
    pub fn legal_source(&self, mode: AddressingMode) -> bool {
        let predicate: ModePredicate = match self {
            $(Self::$name => $src),+
        };
        predicate(mode)
    }

    /// Whether `mode` is a legal destination addressing mode for this
    /// opcode. Meaningless when `operand_count() == 0`.
    pub fn legal_destination(&self, mode: AddressingMode) -> bool {
        let predicate: ModePredicate = match self {
            $(Self::$name => $dst),+
        };
        predicate(mode)
    }

}

    };
}

declare_opcodes! {
    Mov "mov" = 0,  operands: 2, src: any_mode,   dst: not_immediate;
    Cmp "cmp" = 1,  operands: 2, src: any_mode,   dst: any_mode;
    Add "add" = 2,  operands: 2, src: any_mode,   dst: not_immediate;
    Sub "sub" = 3,  operands: 2, src: any_mode,   dst: not_immediate;
    Lea "lea" = 4,  operands: 2, src: direct_only, dst: not_immediate;
    Clr "clr" = 5,  operands: 1, src: no_mode,    dst: not_immediate;
    Not "not" = 6,  operands: 1, src: no_mode,    dst: not_immediate;
    Inc "inc" = 7,  operands: 1, src: no_mode,    dst: not_immediate;
    Dec "dec" = 8,  operands: 1, src: no_mode,    dst: not_immediate;
    Jmp "jmp" = 9,  operands: 1, src: no_mode,    dst: not_immediate_not_direct_register;
    Bne "bne" = 10, operands: 1, src: no_mode,    dst: not_immediate_not_direct_register;
    Red "red" = 11, operands: 1, src: no_mode,    dst: not_immediate;
    Prn "prn" = 12, operands: 1, src: no_mode,    dst: any_mode;
    Jsr "jsr" = 13, operands: 1, src: no_mode,    dst: not_immediate_not_direct_register;
    Rts "rts" = 14, operands: 0, src: no_mode,    dst: no_mode;
    Stop "stop" = 15, operands: 0, src: no_mode,  dst: no_mode;
}
