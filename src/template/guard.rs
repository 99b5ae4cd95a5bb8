//! Nesting checks run on template source before it reaches the engine.
//!
//! The engine parses and executes recursively. Knowing how deep a template
//! nests up front lets gotter reject pathological sources with a parse error
//! and size the stack for the rest.

use crate::{
    constants::{
        delimiters::{LEFT, LEFT_COMMENT, RIGHT, RIGHT_COMMENT},
        MAX_EXPRESSION_DEPTH,
    },
    error::{Error, Result},
};

const CONTROL_KEYWORDS: [&str; 5] = ["if", "range", "with", "block", "define"];

/// Returns the deepest nesting of parentheses or control blocks in `text`.
///
/// Fails when parenthesised pipelines nest [`MAX_EXPRESSION_DEPTH`] levels or
/// more. Malformed actions are left for the parser to report.
pub(crate) fn check_nesting(name: &str, text: &str) -> Result<usize> {
    let bytes = text.as_bytes();
    let mut deepest_parens = 0;
    let mut control: usize = 0;
    let mut deepest_control = 0;
    let mut pos = 0;
    while let Some(found) = text[pos..].find(LEFT) {
        let mut i = pos + found + LEFT.len();
        if text[i..].starts_with("- ") {
            i += 2;
        }
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if text[i..].starts_with(LEFT_COMMENT) {
            pos = match text[i..].find(RIGHT_COMMENT) {
                Some(end) => i + end + RIGHT_COMMENT.len(),
                None => return Ok(deepest_parens.max(deepest_control)),
            };
            continue;
        }

        let keyword_end = text[i..]
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .map_or(text.len(), |end| i + end);
        match &text[i..keyword_end] {
            "end" => control = control.saturating_sub(1),
            word if CONTROL_KEYWORDS.contains(&word) => {
                control += 1;
                deepest_control = deepest_control.max(control);
            }
            _ => {}
        }

        let mut parens: usize = 0;
        let mut closed = false;
        while i < bytes.len() {
            match bytes[i] {
                b'"' | b'\'' => i = skip_quoted(bytes, i, bytes[i]),
                b'`' => {
                    i = text[i + 1..].find('`').map_or(bytes.len(), |end| i + 1 + end + 1);
                    continue;
                }
                b'(' => {
                    parens += 1;
                    if parens >= MAX_EXPRESSION_DEPTH {
                        return Err(Error::Parse {
                            name: name.to_string(),
                            message: "max expression depth exceeded".to_string(),
                        });
                    }
                    deepest_parens = deepest_parens.max(parens);
                }
                b')' => parens = parens.saturating_sub(1),
                _ if bytes[i..].starts_with(RIGHT.as_bytes()) => {
                    closed = true;
                    break;
                }
                _ => {}
            }
            i += 1;
        }
        if !closed {
            break;
        }
        pos = i + RIGHT.len();
    }
    Ok(deepest_parens.max(deepest_control))
}

/// Returns the index of the closing quote of the literal opened at `start`.
fn skip_quoted(bytes: &[u8], start: usize, quote: u8) -> usize {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return i,
            b'\n' => return i,
            _ => i += 1,
        }
    }
    bytes.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested(depth: usize) -> String {
        format!("{{{{ {}1{} }}}}", "(".repeat(depth), ")".repeat(depth))
    }

    #[test]
    fn measures_parentheses() {
        assert_eq!(check_nesting("", "plain text").unwrap(), 0);
        assert_eq!(check_nesting("", "{{ len (print (print 1)) }}").unwrap(), 2);
        assert_eq!(check_nesting("", &nested(1_000)).unwrap(), 1_000);
    }

    #[test]
    fn measures_control_blocks() {
        let text = "{{ if . }}{{ range . }}{{ with . }}x{{ end }}{{ end }}{{ else }}{{ end }}";
        assert_eq!(check_nesting("", text).unwrap(), 3);
        assert_eq!(check_nesting("", "{{- if . -}}a{{- end -}}").unwrap(), 1);
    }

    #[test]
    fn ignores_parentheses_in_literals_and_comments() {
        let text = r#"{{ print "((" '(' `((` }}{{/* ((( */}}{{ print "\"(" }}"#;
        assert_eq!(check_nesting("", text).unwrap(), 0);
    }

    #[test]
    fn rejects_excessive_expression_depth() {
        let err = check_nesting("deep", &nested(MAX_EXPRESSION_DEPTH)).unwrap_err();
        assert!(matches!(err, Error::Parse { ref message, .. } if message == "max expression depth exceeded"));
        assert!(check_nesting("deep", &nested(MAX_EXPRESSION_DEPTH - 1)).is_ok());
    }
}
