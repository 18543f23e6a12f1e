use lazy_static::lazy_static;
use std::env;

pub use asm_core::word::{MEMORY_START, MAX_LABEL_LENGTH, IMMEDIATE_VALUE_BITS};

/// Default ceiling on the number of distinct macros a unit may define, used
/// when `ASM_MAX_MACROS` is unset or unparsable.
const DEFAULT_MAX_MACROS: usize = 100;

/// Default ceiling on the number of lines a single macro body may hold.
const DEFAULT_MAX_MACRO_BODY_LINES: usize = 50;

/// Maximum length of a raw input line (§6: ".as" lines are up to 255
/// characters); longer lines are a structural error.
pub const MAX_LINE_LENGTH: usize = 255;

lazy_static! {

    /// Implementation-defined ceiling on the number of macros a unit may
    /// define (§4.1 leaves this to the implementer).
    pub static ref MAX_MACROS: usize = {
        env::var("ASM_MAX_MACROS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_MACROS)
    };

    /// Implementation-defined ceiling on the number of lines in a macro body.
    pub static ref MAX_MACRO_BODY_LINES: usize = {
        env::var("ASM_MAX_MACRO_BODY_LINES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_MACRO_BODY_LINES)
    };

}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_the_compiled_in_defaults() {
        // ASM_MAX_MACROS isn't set in the test environment.
        assert_eq!(*MAX_MACROS, DEFAULT_MAX_MACROS);
        assert_eq!(*MAX_MACRO_BODY_LINES, DEFAULT_MAX_MACRO_BODY_LINES);
    }
}
