//! `print`, `println` and `printf` over dynamic values.
//!
//! Values render with Go's `%v` rules (see [`Value`]'s `Display`). `printf`
//! supports the verbs `%v %s %d %f %F %e %E %g %G %t %q %x %X %o %b %c`,
//! the `+ - 0 #` and space flags, and width and precision given inline or
//! as `*` arguments. Problems are written inline the way Go's `fmt` reports
//! them (`%!d(string=x)`, `%!s(MISSING)`, `%!(EXTRA ...)`, `%!(BADWIDTH)`)
//! rather than failing the render.

use crate::{
    constants::MAX_FORMAT_WIDTH,
    value::{format_float, Number, Value},
};

/// Concatenates operands, adding a space between two operands when neither
/// is a string.
pub(crate) fn sprint(args: &[&Value]) -> String {
    let mut out = String::new();
    let mut prev_string = true;
    for (i, arg) in args.iter().enumerate() {
        let is_string = matches!(arg, Value::String(_));
        if i > 0 && !is_string && !prev_string {
            out.push(' ');
        }
        out.push_str(&arg.to_string());
        prev_string = is_string;
    }
    out
}

/// Space-separated operands followed by a newline.
pub(crate) fn sprintln(args: &[&Value]) -> String {
    let mut out = args.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(" ");
    out.push('\n');
    out
}

#[derive(Debug, Default)]
struct Spec {
    plus: bool,
    minus: bool,
    zero: bool,
    space: bool,
    sharp: bool,
    width: Option<usize>,
    precision: Option<usize>,
}

/// Result of reading an inline width or precision.
enum Num {
    Absent,
    Present(usize),
    /// Too many digits; the rest of the format is abandoned.
    Overflow,
}

fn parse_num(bytes: &[u8], mut i: usize) -> (Num, usize) {
    let mut num: usize = 0;
    let mut found = false;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        if num > MAX_FORMAT_WIDTH {
            return (Num::Overflow, bytes.len());
        }
        num = num * 10 + usize::from(bytes[i] - b'0');
        found = true;
        i += 1;
    }
    (if found { Num::Present(num) } else { Num::Absent }, i)
}

/// Takes the next argument as a `*` width or precision.
fn int_from_arg(args: &[&Value], used: &mut usize) -> Option<i64> {
    let arg = args.get(*used)?;
    *used += 1;
    match arg {
        Value::Number(Number::Int(i)) if i.unsigned_abs() <= MAX_FORMAT_WIDTH as u64 => Some(*i),
        _ => None,
    }
}

pub(crate) fn sprintf(format: &str, args: &[&Value]) -> String {
    let bytes = format.as_bytes();
    let end = bytes.len();
    let mut out = String::with_capacity(format.len());
    let mut used = 0;
    let mut i = 0;
    while i < end {
        let literal = format[i..].find('%').map_or(end, |at| i + at);
        out.push_str(&format[i..literal]);
        if literal >= end {
            break;
        }
        i = literal + 1;

        let mut spec = Spec::default();
        while i < end {
            match bytes[i] {
                b'+' => spec.plus = true,
                b'-' => {
                    spec.minus = true;
                    spec.zero = false;
                }
                b'0' => spec.zero = !spec.minus,
                b' ' => spec.space = true,
                b'#' => spec.sharp = true,
                _ => break,
            }
            i += 1;
        }

        if i < end && bytes[i] == b'*' {
            i += 1;
            match int_from_arg(args, &mut used) {
                Some(w) if w < 0 => {
                    spec.width = Some(w.unsigned_abs() as usize);
                    spec.minus = true;
                    spec.zero = false;
                }
                Some(w) => spec.width = Some(w as usize),
                None => out.push_str("%!(BADWIDTH)"),
            }
        } else {
            let (num, next) = parse_num(bytes, i);
            i = next;
            if let Num::Present(w) = num {
                spec.width = Some(w);
            }
        }

        if i < end && bytes[i] == b'.' {
            i += 1;
            if i < end && bytes[i] == b'*' {
                i += 1;
                match int_from_arg(args, &mut used) {
                    Some(p) if p >= 0 => spec.precision = Some(p as usize),
                    _ => out.push_str("%!(BADPREC)"),
                }
            } else {
                let (num, next) = parse_num(bytes, i);
                i = next;
                spec.precision = match num {
                    Num::Present(p) => Some(p),
                    Num::Absent | Num::Overflow => Some(0),
                };
            }
        }

        let Some(verb) = format[i..].chars().next() else {
            out.push_str("%!(NOVERB)");
            break;
        };
        i += verb.len_utf8();
        if verb == '%' {
            out.push('%');
            continue;
        }
        let Some(arg) = args.get(used) else {
            out.push_str(&format!("%!{verb}(MISSING)"));
            continue;
        };
        used += 1;
        match format_arg(verb, &spec, arg) {
            Some(text) => out.push_str(&pad(text, &spec, is_numeric(verb, arg))),
            None => out.push_str(&bad_verb(verb, arg)),
        }
    }
    if used < args.len() {
        let extra: Vec<String> = args[used..].iter().map(|a| describe(a)).collect();
        out.push_str(&format!("%!(EXTRA {})", extra.join(", ")));
    }
    out
}

fn describe(arg: &Value) -> String {
    match arg {
        Value::Null => "<nil>".to_string(),
        other => format!("{}={}", other.kind(), other),
    }
}

fn bad_verb(verb: char, arg: &Value) -> String {
    format!("%!{verb}({})", describe(arg))
}

fn is_numeric(verb: char, arg: &Value) -> bool {
    matches!(arg, Value::Number(_)) && verb != 'c' && verb != 'q'
}

fn format_arg(verb: char, spec: &Spec, arg: &Value) -> Option<String> {
    match (verb, arg) {
        ('v', Value::Number(n)) => Some(signed(n.to_string(), spec)),
        ('v', other) => Some(other.to_string()),
        ('s', Value::String(s)) => Some(match spec.precision {
            Some(p) => s.chars().take(p).collect(),
            None => s.clone(),
        }),
        ('s', Value::List(_) | Value::Map(_) | Value::Object(_)) => Some(arg.to_string()),
        ('d', Value::Number(Number::Int(i))) => Some(signed(i.to_string(), spec)),
        ('o', Value::Number(Number::Int(i))) => Some(radix(*i, 8, spec, "0")),
        ('b', Value::Number(Number::Int(i))) => Some(radix(*i, 2, spec, "")),
        ('x', Value::Number(Number::Int(i))) => Some(radix(*i, 16, spec, "0x")),
        ('X', Value::Number(Number::Int(i))) => Some(radix(*i, 16, spec, "0X").to_uppercase()),
        ('x', Value::String(s)) => Some(s.bytes().map(|b| format!("{b:02x}")).collect()),
        ('X', Value::String(s)) => Some(s.bytes().map(|b| format!("{b:02X}")).collect()),
        ('c', Value::Number(Number::Int(i))) => {
            Some(char_of(*i).map(String::from).unwrap_or_else(|| "\u{fffd}".to_string()))
        }
        ('q', Value::String(s)) => Some(quote(s, '"')),
        ('q', Value::Number(Number::Int(i))) => {
            Some(quote(&char_of(*i).unwrap_or('\u{fffd}').to_string(), '\''))
        }
        ('t', Value::Bool(b)) => Some(b.to_string()),
        ('f' | 'F' | 'e' | 'E' | 'g' | 'G', Value::Number(n)) => {
            Some(signed(format_float_verb(verb, n.as_f64(), spec.precision), spec))
        }
        _ => None,
    }
}

fn char_of(i: i64) -> Option<char> {
    u32::try_from(i).ok().and_then(char::from_u32)
}

fn signed(text: String, spec: &Spec) -> String {
    if text.starts_with('-') || text.starts_with('+') {
        text
    } else if spec.plus {
        format!("+{text}")
    } else if spec.space {
        format!(" {text}")
    } else {
        text
    }
}

fn radix(i: i64, radix: u32, spec: &Spec, prefix: &str) -> String {
    let magnitude = i.unsigned_abs();
    let digits = match radix {
        2 => format!("{magnitude:b}"),
        8 => format!("{magnitude:o}"),
        _ => format!("{magnitude:x}"),
    };
    let prefix = if spec.sharp { prefix } else { "" };
    let sign = if i < 0 { "-" } else { "" };
    signed(format!("{sign}{prefix}{digits}"), spec)
}

fn format_float_verb(verb: char, v: f64, precision: Option<usize>) -> String {
    if !v.is_finite() {
        return format_float(v);
    }
    match verb {
        'f' | 'F' => format!("{:.*}", precision.unwrap_or(6), v),
        'e' => exponent_form(v, precision.unwrap_or(6)),
        'E' => exponent_form(v, precision.unwrap_or(6)).to_uppercase(),
        'G' => general_form(v, precision).to_uppercase(),
        _ => general_form(v, precision),
    }
}

/// Rewrites Rust's `1.5e3` exponent into Go's `1.5e+03`.
fn go_exponent(sci: &str) -> String {
    match sci.split_once('e') {
        Some((mantissa, exp)) => {
            let exp: i32 = exp.parse().unwrap_or(0);
            let sign = if exp < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exp.abs())
        }
        None => sci.to_string(),
    }
}

fn exponent_form(v: f64, precision: usize) -> String {
    go_exponent(&format!("{:.*e}", precision, v))
}

fn general_form(v: f64, precision: Option<usize>) -> String {
    let Some(precision) = precision else {
        return format_float(v);
    };
    let precision = precision.max(1);
    let sci = format!("{:.*e}", precision - 1, v);
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exp: i32 = exp.parse().unwrap_or(0);
    let mantissa = if mantissa.contains('.') {
        mantissa.trim_end_matches('0').trim_end_matches('.')
    } else {
        mantissa
    };
    let digits = mantissa.chars().filter(|c| c.is_ascii_digit()).count() as i32;
    let mut eprec = precision as i32;
    if eprec > digits && digits >= exp + 1 {
        eprec = digits;
    }
    if exp < -4 || exp >= eprec {
        go_exponent(&format!("{mantissa}e{exp}"))
    } else {
        let decimals = (digits - (exp + 1)).max(0) as usize;
        format!("{:.*}", decimals, v)
    }
}

fn pad(text: String, spec: &Spec, numeric: bool) -> String {
    let Some(width) = spec.width else {
        return text;
    };
    let len = text.chars().count();
    if len >= width {
        return text;
    }
    let fill = width - len;
    if spec.minus {
        format!("{text}{}", " ".repeat(fill))
    } else if spec.zero && numeric {
        let sign_len = if text.starts_with(['-', '+', ' ']) { 1 } else { 0 };
        let (sign, digits) = text.split_at(sign_len);
        format!("{sign}{}{digits}", "0".repeat(fill))
    } else if spec.zero {
        format!("{}{text}", "0".repeat(fill))
    } else {
        format!("{}{text}", " ".repeat(fill))
    }
}

/// Double-quotes (or single-quotes) `s` with Go escape sequences.
pub(crate) fn quote(s: &str, delim: char) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push(delim);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{07}' => out.push_str("\\a"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0c}' => out.push_str("\\f"),
            '\u{0b}' => out.push_str("\\v"),
            c if c == delim => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => {
                let code = u32::from(c);
                if code < 0x80 {
                    out.push_str(&format!("\\x{code:02x}"));
                } else if code <= 0xffff {
                    out.push_str(&format!("\\u{code:04x}"));
                } else {
                    out.push_str(&format!("\\U{code:08x}"));
                }
            }
            c => out.push(c),
        }
    }
    out.push(delim);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(format: &str, args: &[Value]) -> String {
        let refs: Vec<&Value> = args.iter().collect();
        sprintf(format, &refs)
    }

    fn print(args: &[Value]) -> String {
        let refs: Vec<&Value> = args.iter().collect();
        sprint(&refs)
    }

    #[test]
    fn sprint_spacing_follows_operand_kinds() {
        assert_eq!(print(&[1.into(), 2.into()]), "1 2");
        assert_eq!(print(&["a".into(), 2.into()]), "a2");
        assert_eq!(print(&["a".into(), "b".into()]), "ab");
        assert_eq!(print(&[Value::Null]), "<nil>");
        let refs = [&Value::from("a"), &Value::from("b")];
        assert_eq!(sprintln(&refs), "a b\n");
    }

    #[test]
    fn basic_verbs() {
        assert_eq!(fmt("%s=%d", &["n".into(), 5.into()]), "n=5");
        assert_eq!(fmt("%v|%v|%v", &[Value::Null, true.into(), 1.5.into()]), "<nil>|true|1.5");
        assert_eq!(fmt("%t", &[false.into()]), "false");
        assert_eq!(fmt("%q", &["a\"b\n".into()]), r#""a\"b\n""#);
        assert_eq!(fmt("%q", &[97.into()]), "'a'");
        assert_eq!(fmt("%c", &[65.into()]), "A");
        assert_eq!(fmt("100%%", &[]), "100%");
        assert_eq!(fmt("héllo %s!", &["wörld".into()]), "héllo wörld!");
    }

    #[test]
    fn numbers() {
        assert_eq!(
            fmt("%x %X %#x %o %b", &[255.into(), 255.into(), 255.into(), 8.into(), 5.into()]),
            "ff FF 0xff 10 101"
        );
        assert_eq!(fmt("%+d % d", &[3.into(), 3.into()]), "+3  3");
        assert_eq!(fmt("%.2f", &[3.14159.into()]), "3.14");
        assert_eq!(fmt("%f", &[2.into()]), "2.000000");
        assert_eq!(fmt("%e", &[1234.5678.into()]), "1.234568e+03");
        assert_eq!(fmt("%g", &[1e6.into()]), "1e+06");
        assert_eq!(fmt("%.3g", &[3.14159.into()]), "3.14");
        assert_eq!(fmt("%.3g", &[1234567.0.into()]), "1.23e+06");
        assert_eq!(fmt("%.3g", &[1.0.into()]), "1");
    }

    #[test]
    fn width_and_padding() {
        assert_eq!(fmt("[%5s]", &["ab".into()]), "[   ab]");
        assert_eq!(fmt("[%-5s]", &["ab".into()]), "[ab   ]");
        assert_eq!(fmt("[%05d]", &[(-42).into()]), "[-0042]");
        assert_eq!(fmt("[%.2s]", &["héllo".into()]), "[hé]");
        assert_eq!(fmt("[%-05d]", &[7.into()]), "[7    ]");
    }

    #[test]
    fn width_and_precision_from_arguments() {
        assert_eq!(fmt("[%*d]", &[4.into(), 7.into()]), "[   7]");
        assert_eq!(fmt("[%*d]", &[(-4).into(), 7.into()]), "[7   ]");
        assert_eq!(fmt("[%.*f]", &[2.into(), 3.14159.into()]), "[3.14]");
        assert_eq!(fmt("[%*.*s]", &[5.into(), 2.into(), "abc".into()]), "[   ab]");
        assert_eq!(fmt("%*d", &["x".into(), 7.into()]), "%!(BADWIDTH)7");
        assert_eq!(fmt("%.*d", &[(-1).into(), 7.into()]), "%!(BADPREC)7");
        assert_eq!(fmt("%*d", &[2_000_000.into(), 7.into()]), "%!(BADWIDTH)7");
    }

    #[test]
    fn oversized_widths_are_rejected() {
        assert_eq!(fmt("%9999999999999d", &[1.into()]), "%!(NOVERB)%!(EXTRA int=1)");
        assert_eq!(fmt("%.9999999999999f", &[1.into()]), "%!(NOVERB)%!(EXTRA int=1)");
        assert_eq!(fmt("%8d", &[1.into()]).len(), 8);
    }

    #[test]
    fn reports_problems_inline() {
        assert_eq!(fmt("%d", &["x".into()]), "%!d(string=x)");
        assert_eq!(fmt("%s %s", &["a".into()]), "a %!s(MISSING)");
        assert_eq!(fmt("%s", &["a".into(), 1.into()]), "a%!(EXTRA int=1)");
        assert_eq!(fmt("%s", &[Value::Null]), "%!s(<nil>)");
        assert_eq!(fmt("trailing %", &[]), "trailing %!(NOVERB)");
    }
}
