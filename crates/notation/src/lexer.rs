//! Command-line lexer.
//!
//! Every line after the header (and after the grid matrix) has the shape
//!
//! ```text
//! CMD arg "quoted arg" -flag --long-flag {"data": 1, "style": {"color": "red"}}
//! ```
//!
//! - `CMD` is one or more uppercase ASCII letters
//! - at least one argument, bare or double-quoted (`\"`, `\\`, `\n`, `\r`,
//!   `\t` and `\u{..}` escape)
//! - options start with `-` and follow the arguments; `-3` is an argument
//! - an optional trailing JSON object whose `style` key is split out
//!
//! Lines starting with `#` are comments.

use plyboard_core::{DataBag, ParsingError, PlyError, PlyResult, Value};

use crate::preprocess::SourceLine;

/// Example shown for lines that are not a command at all.
pub const COMMAND_EXAMPLE: &str = r#"CMD args -o --long-option {"x": 1, "style": {"color": "red"}}"#;

/// A positional argument and the column it starts at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arg {
    /// Unquoted text.
    pub value: String,
    /// 1-based column.
    pub column: usize,
}

/// One lexed command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// 1-based source line.
    pub line: usize,
    /// Uppercase command word.
    pub command: String,
    /// Positional arguments.
    pub args: Vec<Arg>,
    /// Options, leading dashes included.
    pub options: Vec<String>,
    /// Payload without its `style` key.
    pub data: DataBag,
    /// The payload's `style` object.
    pub style: DataBag,
}

impl Statement {
    /// Whether either spelling of a flag was given.
    pub fn has_flag(&self, short: &str, long: &str) -> bool {
        self.options.iter().any(|o| o == short || o == long)
    }

    /// Fail unless exactly `expected` arguments were given.
    pub fn expect_args(&self, expected: usize, phase: &str) -> PlyResult<()> {
        if self.args.len() == expected {
            return Ok(());
        }
        Err(ParsingError::new(
            format!(
                "Invalid argument count in {}, expected {}, received {}",
                phase,
                expected,
                self.args.len()
            ),
            self.line,
            self.command.chars().count() + 2,
        )
        .into())
    }

    /// Argument `i`; callers check the count first.
    pub fn arg(&self, i: usize) -> &Arg {
        &self.args[i]
    }
}

fn invalid_command_syntax(line: usize) -> PlyError {
    ParsingError::new(
        "Couldn't parse line contents into a valid command, commands must contain an uppercase command and at least one argument",
        line,
        0,
    )
    .with_example(COMMAND_EXAMPLE)
    .into()
}

fn starts_number(chars: &[char], i: usize) -> bool {
    match chars.get(i + 1) {
        Some(c) if c.is_ascii_digit() => true,
        Some('.') => chars.get(i + 2).map_or(false, char::is_ascii_digit),
        _ => false,
    }
}

/// Lex one line. Comments yield `None`.
pub fn parse_statement(line: &SourceLine<'_>) -> PlyResult<Option<Statement>> {
    let text = line.text.trim();
    if text.is_empty() || text.starts_with('#') {
        return Ok(None);
    }
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;

    while i < chars.len() && chars[i].is_ascii_uppercase() {
        i += 1;
    }
    if i == 0 || i >= chars.len() || !chars[i].is_whitespace() {
        return Err(invalid_command_syntax(line.number));
    }
    let command: String = chars[..i].iter().collect();

    let mut args = Vec::new();
    let mut options: Vec<String> = Vec::new();
    let mut payload: Option<(String, usize)> = None;

    loop {
        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }
        if i >= chars.len() {
            break;
        }
        let column = i + 1;
        match chars[i] {
            '{' => {
                payload = Some((chars[i..].iter().collect(), column));
                break;
            }
            '-' if !starts_number(&chars, i) => {
                let start = i;
                while i < chars.len() && !chars[i].is_whitespace() && chars[i] != '{' {
                    i += 1;
                }
                let option: String = chars[start..i].iter().collect();
                let body = option.trim_start_matches('-');
                if body.is_empty() || !body.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
                    return Err(ParsingError::new(format!("Invalid option \"{}\"", option), line.number, column)
                        .with_example(COMMAND_EXAMPLE)
                        .into());
                }
                options.push(option);
            }
            '"' => {
                i += 1;
                let mut value = String::new();
                let mut closed = false;
                while i < chars.len() {
                    match chars[i] {
                        '\\' if i + 1 < chars.len() => {
                            i += 1;
                            let (c, used) = unescape(&chars[i..]);
                            value.push(c);
                            i += used;
                        }
                        '"' => {
                            closed = true;
                            i += 1;
                            break;
                        }
                        c => {
                            value.push(c);
                            i += 1;
                        }
                    }
                }
                if !closed {
                    return Err(ParsingError::new("Unterminated quoted argument", line.number, column)
                        .with_example(r#"NODE "node with spaces""#)
                        .into());
                }
                if i < chars.len() && !chars[i].is_whitespace() && chars[i] != '{' {
                    return Err(ParsingError::new(
                        "Quoted argument must be followed by whitespace",
                        line.number,
                        i + 1,
                    )
                    .with_example(r#"NODE "node with spaces""#)
                    .into());
                }
                push_arg(&mut args, &options, value, line.number, column)?;
            }
            _ => {
                let start = i;
                while i < chars.len() && !chars[i].is_whitespace() && chars[i] != '{' {
                    i += 1;
                }
                let value: String = chars[start..i].iter().collect();
                push_arg(&mut args, &options, value, line.number, column)?;
            }
        }
    }

    if args.is_empty() {
        return Err(invalid_command_syntax(line.number));
    }

    let (data, style) = match payload {
        Some((raw, column)) => parse_payload(&raw, line.number, column)?,
        None => (DataBag::new(), DataBag::new()),
    };

    Ok(Some(Statement {
        line: line.number,
        command,
        args,
        options,
        data,
        style,
    }))
}

fn push_arg(args: &mut Vec<Arg>, options: &[String], value: String, line: usize, column: usize) -> PlyResult<()> {
    if !options.is_empty() {
        return Err(ParsingError::new("Arguments must come before options", line, column)
            .with_example(COMMAND_EXAMPLE)
            .into());
    }
    args.push(Arg { value, column });
    Ok(())
}

fn parse_payload(raw: &str, line: usize, column: usize) -> PlyResult<(DataBag, DataBag)> {
    let value: Value = serde_json::from_str(raw).map_err(|e| {
        ParsingError::new(
            format!("Invalid data object: {}", e),
            line,
            column + e.column().saturating_sub(1),
        )
        .with_example(r#"{"label": "A", "style": {"color": "red"}}"#)
    })?;
    match value {
        Value::Object(map) => Ok(DataBag::from_map(map).split_style()),
        _ => Err(ParsingError::new("Data must be a JSON object", line, column).into()),
    }
}

/// Quote an argument when the bare form would not lex back to the same text.
pub fn format_arg(value: &str) -> String {
    let bare_ok = !value.is_empty()
        && !value.starts_with('-')
        && !value
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || c == '"' || c == '{' || c == '\\');
    if bare_ok {
        return value.to_string();
    }
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' | '\\' => {
                quoted.push('\\');
                quoted.push(c);
            }
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c if c.is_control() => quoted.push_str(&format!("\\u{{{:x}}}", c as u32)),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Decode the escape starting right after a backslash.
///
/// Returns the character and how many input characters it used. Unknown
/// escapes stand for the escaped character itself.
fn unescape(rest: &[char]) -> (char, usize) {
    match rest[0] {
        'n' => ('\n', 1),
        'r' => ('\r', 1),
        't' => ('\t', 1),
        'u' if rest.get(1) == Some(&'{') => {
            let hex: String = rest[2..].iter().take_while(|c| **c != '}').collect();
            let closed = rest.get(2 + hex.len()) == Some(&'}');
            match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                Some(c) if closed => (c, hex.len() + 3),
                _ => ('u', 1),
            }
        }
        c => (c, 1),
    }
}

/// Whitespace-separated tokens with their 1-based columns.
pub fn tokens_with_columns(text: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut start: Option<usize> = None;
    for (i, c) in text.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                out.push((s, &text[s..i]));
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        out.push((s, &text[s..]));
    }
    out.into_iter()
        .map(|(byte, token)| (text[..byte].chars().count() + 1, token))
        .collect()
}
