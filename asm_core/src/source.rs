use std::fmt;
use std::rc::Rc;


/// Points a diagnostic back at the exact input line it came from.
///
/// Cheap to clone (`Rc`-backed) so every parsed value downstream of the
/// first pass can carry its own provenance without copying the source text.
#[derive(Debug, PartialEq, Eq)]
pub struct SourceToken {
    unit_name: String,
    line_number: usize,
    line_text: String,
}

impl SourceToken {
    pub fn new(unit_name: impl Into<String>, line_number: usize, line_text: impl Into<String>) -> Rc<Self> {
        Rc::new(Self {
            unit_name: unit_name.into(),
            line_number,
            line_text: line_text.into(),
        })
    }

    pub fn unit_name(&self) -> &str {
        &self.unit_name
    }

    pub fn line_number(&self) -> usize {
        self.line_number
    }

    pub fn line_text(&self) -> &str {
        &self.line_text
    }
}

impl fmt::Display for SourceToken {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.unit_name, self.line_number)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carries_the_fields_it_was_built_with() {
        let token = SourceToken::new("prog.as", 12, "MAIN: mov r1, r2");
        assert_eq!(token.unit_name(), "prog.as");
        assert_eq!(token.line_number(), 12);
        assert_eq!(token.line_text(), "MAIN: mov r1, r2");
        assert_eq!(token.to_string(), "prog.as:12");
    }
}
