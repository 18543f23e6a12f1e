use std::collections::HashMap;
use std::rc::Rc;

use asm_core::source::SourceToken;

use crate::config;
use crate::error;


/// Strip comments and blank lines, trim, and collapse interior whitespace
/// runs to a single space (§4.1 steps 1-2), keeping each surviving line
/// paired with its original 1-based line number for diagnostics.
fn preprocess(raw_lines: &[String]) -> Vec<(usize, String)> {
    raw_lines.iter()
        .enumerate()
        .filter_map(|(index, line)| {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with(';') {
                return None;
            }
            let normalized = trimmed.split_whitespace().collect::<Vec<_>>().join(" ");
            Some((index + 1, normalized))
        })
        .collect()
}

struct MacroTable {
    bodies: HashMap<String, Vec<String>>,
}

impl MacroTable {
    fn new() -> Self {
        Self { bodies: HashMap::new() }
    }

    fn get(&self, name: &str) -> Option<&[String]> {
        self.bodies.get(name).map(|v| v.as_slice())
    }

    fn define(&mut self, token: &Rc<SourceToken>, name: String, body: Vec<String>) -> Result<(), ()> {
        if self.bodies.len() >= *config::MAX_MACROS {
            error::capacity_exceeded(token, "the number of macro definitions", *config::MAX_MACROS);
        }
        if self.bodies.contains_key(&name) {
            error::recoverable(token, &format!("Macro \"{name}\" is already defined."));
            return Err(());
        }
        self.bodies.insert(name, body);
        Ok(())
    }
}

/// Expand `macr`/`endmacr` definitions and verbatim macro-name substitution
/// (§4.1). Returns the expanded lines (to be written as `.am`) or `Err(())`
/// if any malformed framing or macro-table error was encountered.
pub fn expand(unit_name: &str, raw_lines: &[String]) -> Result<Vec<String>, ()> {
    let preprocessed = preprocess(raw_lines);

    let mut macros = MacroTable::new();
    let mut output = Vec::new();
    let mut had_error = false;

    let mut defining: Option<(String, Vec<String>, Rc<SourceToken>)> = None;

    for (line_number, text) in preprocessed {
        let token = SourceToken::new(unit_name, line_number, text.clone());

        if text.len() > config::MAX_LINE_LENGTH {
            error::recoverable(&token, &format!("Line is longer than {} characters.", config::MAX_LINE_LENGTH));
            had_error = true;
            continue;
        }

        if let Some((name, body, _start_token)) = defining.as_mut() {
            if text == "endmacr" {
                let (name, body, start_token) = defining.take().unwrap();
                if body.len() > *config::MAX_MACRO_BODY_LINES {
                    error::capacity_exceeded(&start_token, "the macro body line count", *config::MAX_MACRO_BODY_LINES);
                }
                if macros.define(&start_token, name, body).is_err() {
                    had_error = true;
                }
            } else {
                body.push(text);
                let _ = name;
            }
            continue;
        }

        if let Some(rest) = text.strip_prefix("macr ") {
            let name = rest.trim().to_string();
            defining = Some((name, Vec::new(), token));
            continue;
        }
        if text == "macr" {
            error::recoverable(&token, "\"macr\" directive is missing a macro name.");
            had_error = true;
            continue;
        }

        let mut line_buffer: Vec<&str> = Vec::new();
        for word in text.split(' ') {
            match macros.get(word) {
                Some(body) => {
                    if !line_buffer.is_empty() {
                        output.push(line_buffer.join(" "));
                        line_buffer.clear();
                    }
                    output.extend(body.iter().cloned());
                }
                None => line_buffer.push(word),
            }
        }
        if !line_buffer.is_empty() {
            output.push(line_buffer.join(" "));
        }
    }

    if let Some((name, _, start_token)) = defining {
        error::recoverable(&start_token, &format!("Macro \"{name}\" is never closed with \"endmacr\"."));
        had_error = true;
    }

    if had_error {
        Err(())
    } else {
        Ok(output)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_comments_and_blank_lines() {
        let raw = vec![
            "; a comment".to_string(),
            "".to_string(),
            "   ".to_string(),
            "mov r1, r2".to_string(),
        ];
        assert_eq!(expand("t.as", &raw).unwrap(), vec!["mov r1, r2".to_string()]);
    }

    #[test]
    fn collapses_interior_whitespace() {
        let raw = vec!["mov   r1,    r2".to_string()];
        assert_eq!(expand("t.as", &raw).unwrap(), vec!["mov r1, r2".to_string()]);
    }

    #[test]
    fn substitutes_a_defined_macro_verbatim() {
        let raw = vec![
            "macr M".to_string(),
            "inc r1".to_string(),
            "dec r2".to_string(),
            "endmacr".to_string(),
            "M".to_string(),
            "stop".to_string(),
        ];
        assert_eq!(expand("t.as", &raw).unwrap(), vec!["inc r1".to_string(), "dec r2".to_string(), "stop".to_string()]);
    }

    #[test]
    fn a_macro_cannot_be_used_before_it_is_defined() {
        let raw = vec![
            "M".to_string(),
            "macr M".to_string(),
            "stop".to_string(),
            "endmacr".to_string(),
        ];
        assert_eq!(expand("t.as", &raw).unwrap(), vec!["M".to_string()]);
    }

    #[test]
    fn an_unterminated_macro_is_an_error() {
        let raw = vec!["macr M".to_string(), "stop".to_string()];
        assert!(expand("t.as", &raw).is_err());
    }

    #[test]
    fn redefining_a_macro_is_an_error() {
        let raw = vec![
            "macr M".to_string(), "stop".to_string(), "endmacr".to_string(),
            "macr M".to_string(), "rts".to_string(), "endmacr".to_string(),
        ];
        assert!(expand("t.as", &raw).is_err());
    }

    #[test]
    fn a_line_longer_than_the_configured_limit_is_an_error() {
        let raw = vec!["a".repeat(config::MAX_LINE_LENGTH + 1)];
        assert!(expand("t.as", &raw).is_err());
    }

    #[test]
    fn substitution_happens_anywhere_in_the_line_not_just_leading_position() {
        let raw = vec![
            "macr TARGET".to_string(), "LOOP".to_string(), "endmacr".to_string(),
            "jmp TARGET".to_string(),
        ];
        // "TARGET" is the second token on its line, not the leading one, and
        // still gets substituted per the permissive original behavior.
        assert_eq!(expand("t.as", &raw).unwrap(), vec!["jmp".to_string(), "LOOP".to_string()]);
    }
}
