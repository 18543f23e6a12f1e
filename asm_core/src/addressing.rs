use std::fmt;


/// The four ways an operand can name its value, encoded as specified by the
/// source machine: 0 = Immediate, 1 = Direct, 2 = Indirect-Register,
/// 3 = Direct-Register.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum AddressingMode {
    Immediate = 0,
    Direct = 1,
    IndirectRegister = 2,
    DirectRegister = 3,
}

impl AddressingMode {

    pub const fn encoded(&self) -> u8 {
        *self as u8
    }

    /// Whether this mode addresses a register directly or indirectly,
    /// which is what decides if two operands can share one word (§4.3).
    pub const fn is_register_class(&self) -> bool {
        matches!(self, Self::IndirectRegister | Self::DirectRegister)
    }

    /// Classify an operand token by its leading character, per §4.2 point 4:
    /// `#` -> Immediate, `r` -> Direct-Register, `*` -> Indirect-Register,
    /// anything else -> Direct.
    ///
    /// The `r` case is a syntactic guess, not a semantic one: `r` only
    /// signals Direct-Register when the rest of the token is a valid
    /// register name. Callers must still validate the operand value
    /// against the chosen mode.
    pub fn classify(operand: &str) -> Self {
        match operand.as_bytes().first() {
            Some(b'#') => Self::Immediate,
            Some(b'r') if crate::registers::Registers::from_name(operand).is_some() => Self::DirectRegister,
            Some(b'*') => Self::IndirectRegister,
            _ => Self::Direct,
        }
    }
}

impl fmt::Display for AddressingMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", match self {
            Self::Immediate => "immediate",
            Self::Direct => "direct",
            Self::IndirectRegister => "indirect-register",
            Self::DirectRegister => "direct-register",
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_every_leading_character() {
        assert_eq!(AddressingMode::classify("#5"), AddressingMode::Immediate);
        assert_eq!(AddressingMode::classify("r3"), AddressingMode::DirectRegister);
        assert_eq!(AddressingMode::classify("*r3"), AddressingMode::IndirectRegister);
        assert_eq!(AddressingMode::classify("LOOP"), AddressingMode::Direct);
    }

    #[test]
    fn a_label_starting_with_r_is_not_mistaken_for_a_register() {
        // "result" starts with 'r' but isn't a register name -> Direct.
        assert_eq!(AddressingMode::classify("result"), AddressingMode::Direct);
    }
}
