//! Reader: S-expression text to generic forms.
//!
//! Forms are untyped syntax nodes (string, number, symbol, list) tagged with
//! the position they were read from. Symbol literals are kept as raw text;
//! their grammar belongs to [`crate::parse_symbol`].

use thiserror::Error;

use crate::wire::SourceContext;

/// Errors that can occur while reading text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReadError {
    #[error("{at}: unexpected end of input")]
    UnexpectedEof { at: SourceContext },

    #[error("{at}: unterminated string literal")]
    UnterminatedString { at: SourceContext },

    #[error("{at}: unterminated list")]
    UnterminatedList { at: SourceContext },

    #[error("{at}: unterminated comment")]
    UnterminatedComment { at: SourceContext },

    #[error("{at}: unexpected ')'")]
    UnexpectedCloseParen { at: SourceContext },

    #[error("{at}: invalid escape sequence {sequence:?}")]
    BadEscape { at: SourceContext, sequence: String },

    #[error("{at}: unexpected trailing input after form")]
    TrailingInput { at: SourceContext },
}

/// Classification of a numeric literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberClass {
    Integer,
    Float,
}

/// A generic syntax node.
#[derive(Debug, Clone, PartialEq)]
pub struct Form {
    pub kind: FormKind,
    pub position: SourceContext,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormKind {
    String(String),
    Number { literal: String, class: NumberClass },
    Symbol(String),
    List(Vec<Form>),
}

/// Reads exactly one form from `src`.
pub fn read_form(src: &str) -> Result<Form, ReadError> {
    let mut reader = Reader::new(src);
    let form = reader
        .next_form()?
        .ok_or_else(|| ReadError::UnexpectedEof { at: reader.here() })?;
    reader.skip_trivia()?;
    if !reader.at_end() {
        return Err(ReadError::TrailingInput { at: reader.here() });
    }
    Ok(form)
}

/// Reads every form in `src`.
pub fn read_forms(src: &str) -> Result<Vec<Form>, ReadError> {
    let mut reader = Reader::new(src);
    let mut forms = Vec::new();
    while let Some(form) = reader.next_form()? {
        forms.push(form);
    }
    Ok(forms)
}

/// Incremental reader over a source string.
pub struct Reader<'a> {
    src: &'a str,
    pos: usize,
    line: u32,
    column: u32,
    file: Option<String>,
}

impl<'a> Reader<'a> {
    pub fn new(src: &'a str) -> Self {
        Reader {
            src,
            pos: 0,
            line: 1,
            column: 1,
            file: None,
        }
    }

    /// Sets the file name recorded in form positions.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Reads the next form, or `None` at end of input.
    pub fn next_form(&mut self) -> Result<Option<Form>, ReadError> {
        self.skip_trivia()?;
        let Some(ch) = self.peek() else {
            return Ok(None);
        };
        let start = self.here();
        let kind = match ch {
            '(' => {
                self.bump();
                FormKind::List(self.read_list(&start)?)
            }
            ')' => return Err(ReadError::UnexpectedCloseParen { at: start }),
            '"' => {
                self.bump();
                FormKind::String(self.read_string(&start)?)
            }
            _ => {
                let atom = self.read_atom();
                match classify_number(atom) {
                    Some(class) => FormKind::Number {
                        literal: atom.to_string(),
                        class,
                    },
                    None => FormKind::Symbol(atom.to_string()),
                }
            }
        };
        Ok(Some(Form {
            kind,
            position: start,
        }))
    }

    fn read_list(&mut self, start: &SourceContext) -> Result<Vec<Form>, ReadError> {
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            match self.peek() {
                None => {
                    return Err(ReadError::UnterminatedList {
                        at: start.clone(),
                    });
                }
                Some(')') => {
                    self.bump();
                    return Ok(items);
                }
                Some(_) => {
                    if let Some(form) = self.next_form()? {
                        items.push(form);
                    }
                }
            }
        }
    }

    fn read_string(&mut self, start: &SourceContext) -> Result<String, ReadError> {
        let mut out = String::new();
        loop {
            let Some(ch) = self.bump() else {
                return Err(ReadError::UnterminatedString {
                    at: start.clone(),
                });
            };
            match ch {
                '"' => return Ok(out),
                '\\' => {
                    let at = self.here();
                    let Some(esc) = self.bump() else {
                        return Err(ReadError::UnterminatedString {
                            at: start.clone(),
                        });
                    };
                    match esc {
                        '"' => out.push('"'),
                        '\'' => out.push('\''),
                        '\\' => out.push('\\'),
                        'n' => out.push('\n'),
                        'r' => out.push('\r'),
                        't' => out.push('\t'),
                        '0' => out.push('\0'),
                        'u' => out.push(self.read_unicode_escape(at)?),
                        other => {
                            return Err(ReadError::BadEscape {
                                at,
                                sequence: format!("\\{other}"),
                            });
                        }
                    }
                }
                other => out.push(other),
            }
        }
    }

    /// Reads the `{XXXX}` part of a `\u{XXXX}` escape.
    fn read_unicode_escape(&mut self, at: SourceContext) -> Result<char, ReadError> {
        let src = self.src;
        let rest = &src[self.pos..];
        let bad = |sequence: &str| ReadError::BadEscape {
            at: at.clone(),
            sequence: format!("\\u{sequence}"),
        };
        let Some(body) = rest.strip_prefix('{') else {
            return Err(bad(""));
        };
        let Some(end) = body.find('}') else {
            return Err(bad(body));
        };
        let hex = &body[..end];
        let ch = u32::from_str_radix(hex, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| bad(&format!("{{{hex}}}")))?;
        // '{' + hex digits + '}'
        for _ in 0..end + 2 {
            self.bump();
        }
        Ok(ch)
    }

    fn read_atom(&mut self) -> &'a str {
        let src = self.src;
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() || matches!(ch, '(' | ')' | '"' | ';') || self.at_comment() {
                break;
            }
            self.bump();
        }
        &src[start..self.pos]
    }

    /// Skips whitespace, `; line` comments, and `/* block */` comments.
    pub(crate) fn skip_trivia(&mut self) -> Result<(), ReadError> {
        loop {
            match self.peek() {
                Some(ch) if ch.is_whitespace() => {
                    self.bump();
                }
                Some(';') => {
                    while let Some(ch) = self.bump() {
                        if ch == '\n' {
                            break;
                        }
                    }
                }
                Some('/') if self.at_comment() => {
                    let start = self.here();
                    self.bump();
                    self.bump();
                    loop {
                        if self.src[self.pos..].starts_with("*/") {
                            self.bump();
                            self.bump();
                            break;
                        }
                        if self.bump().is_none() {
                            return Err(ReadError::UnterminatedComment { at: start });
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn at_comment(&self) -> bool {
        self.src[self.pos..].starts_with("/*")
    }

    pub(crate) fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    pub(crate) fn here(&self) -> SourceContext {
        SourceContext {
            file: self.file.clone(),
            line: self.line,
            column: self.column,
        }
    }
}

/// Classifies `text` as a numeric literal: optional sign, digits, optional
/// fraction, optional exponent. Returns `None` for anything else.
fn classify_number(text: &str) -> Option<NumberClass> {
    let body = text.strip_prefix(['+', '-']).unwrap_or(text);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(idx) => (&body[..idx], Some(&body[idx + 1..])),
        None => (body, None),
    };
    let (whole, fraction) = match mantissa.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (mantissa, None),
    };

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || !fraction.is_none_or(all_digits) {
        return None;
    }
    if whole.is_empty() && fraction.is_none_or(str::is_empty) {
        return None;
    }
    if let Some(exponent) = exponent {
        let digits = exponent.strip_prefix(['+', '-']).unwrap_or(exponent);
        if digits.is_empty() || !all_digits(digits) {
            return None;
        }
    }

    if fraction.is_some() || exponent.is_some() {
        Some(NumberClass::Float)
    } else {
        Some(NumberClass::Integer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(src: &str) -> FormKind {
        read_form(src).unwrap().kind
    }

    #[test]
    fn test_classify_number() {
        assert_eq!(classify_number("1"), Some(NumberClass::Integer));
        assert_eq!(classify_number("-12"), Some(NumberClass::Integer));
        assert_eq!(classify_number("+7"), Some(NumberClass::Integer));
        assert_eq!(classify_number("2.5"), Some(NumberClass::Float));
        assert_eq!(classify_number("-3e5"), Some(NumberClass::Float));
        assert_eq!(classify_number(".5"), Some(NumberClass::Float));
        assert_eq!(classify_number("1E-3"), Some(NumberClass::Float));
        assert_eq!(classify_number("+"), None);
        assert_eq!(classify_number("-"), None);
        assert_eq!(classify_number("."), None);
        assert_eq!(classify_number("1e"), None);
        assert_eq!(classify_number("1a"), None);
        assert_eq!(classify_number("abc"), None);
    }

    #[test]
    fn test_read_atoms() {
        assert_eq!(kind("abc"), FormKind::Symbol("abc".into()));
        assert_eq!(kind("a::b"), FormKind::Symbol("a::b".into()));
        assert_eq!(
            kind("42"),
            FormKind::Number {
                literal: "42".into(),
                class: NumberClass::Integer
            }
        );
        assert_eq!(kind(r#""hi\n\"there\"""#), FormKind::String("hi\n\"there\"".into()));
        assert_eq!(kind(r#""\u{1b}""#), FormKind::String("\u{1b}".into()));
    }

    #[test]
    fn test_read_list_with_comments() {
        let form = read_form("(1 /* skipped */ two ; trailing\n \"three\")").unwrap();
        let FormKind::List(items) = form.kind else {
            panic!("expected list");
        };
        assert_eq!(items.len(), 3);
        assert_eq!(items[1].kind, FormKind::Symbol("two".into()));
        assert_eq!(items[2].position.line, 2);
    }

    #[test]
    fn test_positions() {
        let forms = read_forms("a\n  (b)").unwrap();
        assert_eq!(forms[0].position, SourceContext::new(1, 1));
        assert_eq!(forms[1].position, SourceContext::new(2, 3));
    }

    #[test]
    fn test_read_errors() {
        assert!(matches!(read_form("(a b"), Err(ReadError::UnterminatedList { .. })));
        assert!(matches!(read_form("\"abc"), Err(ReadError::UnterminatedString { .. })));
        assert!(matches!(read_form(")"), Err(ReadError::UnexpectedCloseParen { .. })));
        assert!(matches!(read_form("/* open"), Err(ReadError::UnterminatedComment { .. })));
        assert!(matches!(read_form(r#""\q""#), Err(ReadError::BadEscape { .. })));
        assert!(matches!(read_form("a b"), Err(ReadError::TrailingInput { .. })));
        assert!(matches!(read_form("   "), Err(ReadError::UnexpectedEof { .. })));
    }
}
