//! Document Normalizer
//!
//! The vendor publishes pricing as minified JavaScript: a comment banner
//! followed by `callback({vers:0.01,config:{...}});` with bare object keys.
//! This module decodes that text as *data*. A tokenizer and a
//! recursive-descent parser accept only the literal grammar below; nothing
//! in the document is ever evaluated.
//!
//! ```text
//! document := "callback" "(" value ")" ";"* EOF
//! value    := object | array | string | number | "true" | "false" | "null"
//! object   := "{" ( key ":" value ( "," key ":" value )* ","? )? "}"
//! key      := identifier | string | number
//! array    := "[" ( value ( "," value )* ","? )? "]"
//! ```
//!
//! Block (`/* */`) and line (`//`) comments are allowed anywhere whitespace is.

use serde_json::{Map, Number, Value};

use crate::error::{PricingError, PricingResult};

/// Name of the JSONP-style wrapper around every pricing document
pub const CALLBACK: &str = "callback";

/// Maximum nesting of objects and arrays
pub const MAX_DEPTH: usize = 128;

/// Decode a raw pricing document into a generic tree.
///
/// Only the wrapped literal is returned; the wrapper itself is checked and
/// dropped.
pub fn normalize(raw: &str) -> PricingResult<Value> {
    Parser::new(raw)?.document()
}

/// The `config.regions` blocks of a normalized document.
///
/// Empty when the path is absent, null or not a sequence: some legacy feeds
/// are placeholders without data.
pub fn regions_of(document: &Value) -> &[Value] {
    document
        .get("config")
        .and_then(|config| config.get("regions"))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// `value[key]` as a sequence; empty when absent or not a sequence
pub fn sequence<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn malformed(src: &str, offset: usize, reason: impl Into<String>) -> PricingError {
    let before = &src[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before[line_start..].chars().count() + 1;
    PricingError::MalformedDocument {
        line,
        column,
        reason: reason.into(),
    }
}

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Colon,
    Comma,
    Semicolon,
    Str(String),
    Num(String),
    Ident(String),
    Eof,
}

impl TokenKind {
    fn describe(&self) -> String {
        match self {
            TokenKind::LBrace => "'{'".to_string(),
            TokenKind::RBrace => "'}'".to_string(),
            TokenKind::LBracket => "'['".to_string(),
            TokenKind::RBracket => "']'".to_string(),
            TokenKind::LParen => "'('".to_string(),
            TokenKind::RParen => "')'".to_string(),
            TokenKind::Colon => "':'".to_string(),
            TokenKind::Comma => "','".to_string(),
            TokenKind::Semicolon => "';'".to_string(),
            TokenKind::Str(_) => "a string".to_string(),
            TokenKind::Num(raw) => format!("number `{raw}`"),
            TokenKind::Ident(word) => format!("identifier `{word}`"),
            TokenKind::Eof => "end of document".to_string(),
        }
    }
}

#[derive(Debug)]
struct Token {
    kind: TokenKind,
    offset: usize,
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.src[self.pos..].chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_trivia(&mut self) -> PricingResult<()> {
        loop {
            match (self.peek(), self.peek_second()) {
                (Some(c), _) if c.is_whitespace() || c == '\u{feff}' => {
                    self.bump();
                }
                (Some('/'), Some('*')) => {
                    let start = self.pos;
                    match self.src[self.pos + 2..].find("*/") {
                        Some(end) => self.pos += 2 + end + 2,
                        None => return Err(malformed(self.src, start, "unterminated comment")),
                    }
                }
                (Some('/'), Some('/')) => {
                    self.pos = self.src[self.pos..]
                        .find('\n')
                        .map_or(self.src.len(), |end| self.pos + end);
                }
                _ => return Ok(()),
            }
        }
    }

    fn next_token(&mut self) -> PricingResult<Token> {
        self.skip_trivia()?;
        let offset = self.pos;
        let Some(c) = self.peek() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                offset,
            });
        };

        let kind = match c {
            '{' | '}' | '[' | ']' | '(' | ')' | ':' | ',' | ';' => {
                self.bump();
                match c {
                    '{' => TokenKind::LBrace,
                    '}' => TokenKind::RBrace,
                    '[' => TokenKind::LBracket,
                    ']' => TokenKind::RBracket,
                    '(' => TokenKind::LParen,
                    ')' => TokenKind::RParen,
                    ':' => TokenKind::Colon,
                    ',' => TokenKind::Comma,
                    _ => TokenKind::Semicolon,
                }
            }
            '"' | '\'' => {
                self.bump();
                TokenKind::Str(self.string(c, offset)?)
            }
            c if starts_number(c, self.peek_second()) => {
                let raw = self.number();
                // Digit-led bare words such as `8xlarge` or `1yr`
                if raw.bytes().all(|b| b.is_ascii_digit()) && self.peek().is_some_and(is_ident_char) {
                    while self.peek().is_some_and(is_ident_char) {
                        self.bump();
                    }
                    TokenKind::Ident(self.src[offset..self.pos].to_string())
                } else {
                    TokenKind::Num(raw)
                }
            }
            c if is_ident_char(c) => {
                while self.peek().is_some_and(is_ident_char) {
                    self.bump();
                }
                TokenKind::Ident(self.src[offset..self.pos].to_string())
            }
            other => {
                return Err(malformed(
                    self.src,
                    offset,
                    format!("unexpected character {other:?}"),
                ));
            }
        };

        Ok(Token { kind, offset })
    }

    fn number(&mut self) -> String {
        let start = self.pos;
        if matches!(self.peek(), Some('-' | '+')) {
            self.bump();
        }
        self.digits();
        if self.peek() == Some('.') {
            self.bump();
            self.digits();
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            self.bump();
            if matches!(self.peek(), Some('-' | '+')) {
                self.bump();
            }
            self.digits();
        }
        self.src[start..self.pos].to_string()
    }

    fn digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
    }

    fn string(&mut self, quote: char, start: usize) -> PricingResult<String> {
        let mut out = String::new();
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(out),
                Some('\\') => self.escape(&mut out, start)?,
                Some('\n' | '\r') | None => {
                    return Err(malformed(self.src, start, "unterminated string"));
                }
                Some(c) => out.push(c),
            }
        }
    }

    fn escape(&mut self, out: &mut String, start: usize) -> PricingResult<()> {
        let escape_at = self.pos - 1;
        let Some(c) = self.bump() else {
            return Err(malformed(self.src, start, "unterminated string"));
        };
        match c {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' => out.push('\0'),
            'x' => {
                let code = self.hex(2, escape_at)?;
                out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            'u' => {
                let high = self.hex(4, escape_at)?;
                if (0xD800..0xDC00).contains(&high) && self.src[self.pos..].starts_with("\\u") {
                    self.pos += 2;
                    let low = self.hex(4, escape_at)?;
                    if (0xDC00..0xE000).contains(&low) {
                        let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                        out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
                    } else {
                        // Unpaired high surrogate; the second escape stands alone.
                        out.push(char::REPLACEMENT_CHARACTER);
                        out.push(char::from_u32(low).unwrap_or(char::REPLACEMENT_CHARACTER));
                    }
                } else {
                    out.push(char::from_u32(high).unwrap_or(char::REPLACEMENT_CHARACTER));
                }
            }
            // line continuation
            '\n' => {}
            '\r' => {
                if self.peek() == Some('\n') {
                    self.bump();
                }
            }
            other => out.push(other),
        }
        Ok(())
    }

    fn hex(&mut self, len: usize, escape_at: usize) -> PricingResult<u32> {
        let mut code = 0;
        for _ in 0..len {
            let digit = self
                .bump()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| malformed(self.src, escape_at, "invalid escape sequence"))?;
            code = code * 16 + digit;
        }
        Ok(code)
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

fn starts_number(c: char, next: Option<char>) -> bool {
    match c {
        '0'..='9' => true,
        '-' | '+' => next.is_some_and(|n| n.is_ascii_digit() || n == '.'),
        '.' => next.is_some_and(|n| n.is_ascii_digit()),
        _ => false,
    }
}

fn parse_number(raw: &str) -> Option<Value> {
    if !raw.contains(['.', 'e', 'E']) {
        if let Ok(int) = raw.parse::<i64>() {
            return Some(Value::from(int));
        }
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> PricingResult<Self> {
        let mut lexer = Lexer::new(src);
        let current = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            depth: 0,
        })
    }

    fn advance(&mut self) -> PricingResult<Token> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn error_at(&self, offset: usize, reason: impl Into<String>) -> PricingError {
        malformed(self.lexer.src, offset, reason)
    }

    fn unexpected(&self, expected: &str) -> PricingError {
        self.error_at(
            self.current.offset,
            format!("expected {expected}, found {}", self.current.kind.describe()),
        )
    }

    fn expect(&mut self, kind: TokenKind) -> PricingResult<()> {
        if self.current.kind == kind {
            self.advance()?;
            Ok(())
        } else {
            Err(self.unexpected(&kind.describe()))
        }
    }

    fn document(mut self) -> PricingResult<Value> {
        match &self.current.kind {
            TokenKind::Ident(name) if name == CALLBACK => {}
            _ => return Err(self.unexpected("`callback(` wrapper")),
        }
        self.advance()?;
        self.expect(TokenKind::LParen)?;
        let value = self.value()?;
        self.expect(TokenKind::RParen)?;
        while self.current.kind == TokenKind::Semicolon {
            self.advance()?;
        }
        if self.current.kind != TokenKind::Eof {
            return Err(self.unexpected("end of document"));
        }
        Ok(value)
    }

    fn value(&mut self) -> PricingResult<Value> {
        let token = self.advance()?;
        match token.kind {
            TokenKind::LBrace => self.object(token.offset),
            TokenKind::LBracket => self.array(token.offset),
            TokenKind::Str(text) => Ok(Value::String(text)),
            TokenKind::Num(raw) => parse_number(&raw)
                .ok_or_else(|| self.error_at(token.offset, format!("invalid number `{raw}`"))),
            TokenKind::Ident(word) => match word.as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                "null" => Ok(Value::Null),
                _ => Err(self.error_at(token.offset, format!("unexpected identifier `{word}`"))),
            },
            other => Err(self.error_at(
                token.offset,
                format!("expected a value, found {}", other.describe()),
            )),
        }
    }

    fn enter(&mut self, offset: usize) -> PricingResult<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.error_at(offset, format!("nesting deeper than {MAX_DEPTH}")));
        }
        Ok(())
    }

    fn object(&mut self, offset: usize) -> PricingResult<Value> {
        self.enter(offset)?;
        let mut map = Map::new();
        loop {
            if self.current.kind == TokenKind::RBrace {
                self.advance()?;
                break;
            }
            let key_token = self.advance()?;
            let key = match key_token.kind {
                TokenKind::Ident(key) | TokenKind::Str(key) | TokenKind::Num(key) => key,
                other => {
                    return Err(self.error_at(
                        key_token.offset,
                        format!("expected an object key, found {}", other.describe()),
                    ));
                }
            };
            self.expect(TokenKind::Colon)?;
            let value = self.value()?;
            map.insert(key, value);
            match self.current.kind {
                TokenKind::Comma => {
                    self.advance()?;
                }
                TokenKind::RBrace => {
                    self.advance()?;
                    break;
                }
                _ => return Err(self.unexpected("',' or '}'")),
            }
        }
        self.depth -= 1;
        Ok(Value::Object(map))
    }

    fn array(&mut self, offset: usize) -> PricingResult<Value> {
        self.enter(offset)?;
        let mut items = Vec::new();
        loop {
            if self.current.kind == TokenKind::RBracket {
                self.advance()?;
                break;
            }
            items.push(self.value()?);
            match self.current.kind {
                TokenKind::Comma => {
                    self.advance()?;
                }
                TokenKind::RBracket => {
                    self.advance()?;
                    break;
                }
                _ => return Err(self.unexpected("',' or ']'")),
            }
        }
        self.depth -= 1;
        Ok(Value::Array(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn position(err: PricingError) -> (usize, usize, String) {
        match err {
            PricingError::MalformedDocument {
                line,
                column,
                reason,
            } => (line, column, reason),
            other => panic!("expected MalformedDocument, got {other:?}"),
        }
    }

    #[test]
    fn test_minified_document_with_banner() {
        let raw = "/*\n * This file is intended for use only on aws.amazon.com.\n */\n\
            callback({vers:0.01,config:{currency:\"USD\",rate:\"perhr\",regions:[{region:\"us-east\"}]}});";
        let doc = normalize(raw).unwrap();
        assert_eq!(
            doc,
            json!({
                "vers": 0.01,
                "config": {"currency": "USD", "rate": "perhr", "regions": [{"region": "us-east"}]}
            })
        );
    }

    #[test]
    fn test_comments_between_data_are_not_greedy() {
        let raw = "/* a */ callback({x:1, /* b */ y:2}); /* c */";
        assert_eq!(normalize(raw).unwrap(), json!({"x": 1, "y": 2}));
    }

    #[test]
    fn test_line_comments_and_comment_markers_in_strings() {
        let raw = "// banner\ncallback({url:'http://a0.awsstatic.com/x', note:\"/* not a comment */\"})";
        assert_eq!(
            normalize(raw).unwrap(),
            json!({"url": "http://a0.awsstatic.com/x", "note": "/* not a comment */"})
        );
    }

    #[test]
    fn test_keys_quoted_bare_and_numeric() {
        let raw = r#"callback({bare:1, "double":2, 'single':3, 42:4, yrTerm1Hourly:5, $x_y:6})"#;
        assert_eq!(
            normalize(raw).unwrap(),
            json!({"bare": 1, "double": 2, "single": 3, "42": 4, "yrTerm1Hourly": 5, "$x_y": 6})
        );
    }

    #[test]
    fn test_digit_led_bare_keys() {
        let raw = r#"callback({8xlarge:1, 1yr:"a", 3:true})"#;
        assert_eq!(
            normalize(raw).unwrap(),
            json!({"8xlarge": 1, "1yr": "a", "3": true})
        );
    }

    #[test]
    fn test_digit_led_word_is_not_a_value() {
        assert!(normalize("callback({a:8xlarge})").is_err());
    }

    #[test]
    fn test_trailing_commas_and_empty_containers() {
        let raw = "callback({a:[1,2,],b:{},c:[],d:{e:null,},});";
        assert_eq!(
            normalize(raw).unwrap(),
            json!({"a": [1, 2], "b": {}, "c": [], "d": {"e": null}})
        );
    }

    #[test]
    fn test_scalars() {
        let raw = "callback([true,false,null,-3,+4,0.25,.5,1e3,-2.5E-1,\"$0.850 per Hour\"])";
        assert_eq!(
            normalize(raw).unwrap(),
            json!([true, false, null, -3, 4, 0.25, 0.5, 1000.0, -0.25, "$0.850 per Hour"])
        );
    }

    #[test]
    fn test_string_escapes() {
        let raw = r#"callback(["a\"b", 'it\'s', "tab\there", "é\x41", "😀", "back\\slash\/"])"#;
        assert_eq!(
            normalize(raw).unwrap(),
            json!(["a\"b", "it's", "tab\there", "éA", "😀", "back\\slash/"])
        );
    }

    #[test]
    fn test_unicode_escapes_and_surrogate_pairs() {
        let raw = r#"callback(["\u0041", "\uD83D\uDE00", "\uD83D\u0041", "\uD83Dx"])"#;
        assert_eq!(
            normalize(raw).unwrap(),
            json!(["A", "😀", "\u{FFFD}A", "\u{FFFD}x"])
        );
    }

    #[test]
    fn test_array_order_is_preserved() {
        let raw = "callback({regions:[{region:'c'},{region:'a'},{region:'b'}]})";
        let doc = normalize(raw).unwrap();
        let names: Vec<_> = doc["regions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["region"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_region_block_count_matches_source() {
        let blocks: Vec<String> = (0..7)
            .map(|i| format!("{{region:\"r{i}\",instanceTypes:[]}}"))
            .collect();
        let raw = format!("callback({{config:{{regions:[{}]}}}});", blocks.join(","));
        let doc = normalize(&raw).unwrap();
        assert_eq!(regions_of(&doc).len(), 7);
    }

    #[test]
    fn test_regions_of_tolerates_missing_paths() {
        assert!(regions_of(&json!({})).is_empty());
        assert!(regions_of(&json!({"config": null})).is_empty());
        assert!(regions_of(&json!({"config": {}})).is_empty());
        assert!(regions_of(&json!({"config": {"regions": null}})).is_empty());
        assert!(regions_of(&json!({"config": {"regions": "x"}})).is_empty());
        assert!(regions_of(&json!([1, 2])).is_empty());
    }

    #[test]
    fn test_sequence_lookup() {
        let doc = json!({"tiers": [1, 2], "size": "dw1.xlarge"});
        assert_eq!(sequence(&doc, "tiers").len(), 2);
        assert!(sequence(&doc, "size").is_empty());
        assert!(sequence(&doc, "terms").is_empty());
    }

    #[test]
    fn test_missing_wrapper_is_malformed() {
        let (line, column, reason) = position(normalize("{config:{}}").unwrap_err());
        assert_eq!((line, column), (1, 1));
        assert!(reason.contains("callback"), "{reason}");
    }

    #[test]
    fn test_other_wrapper_name_is_malformed() {
        assert!(normalize("jsonp({a:1});").is_err());
    }

    #[test]
    fn test_code_is_never_accepted() {
        for raw in [
            "callback(alert(1));",
            "callback({a:process.exit()});",
            "callback({a:1}); callback({b:2});",
            "callback({a:1}) + 1",
            "callback({a: 1 + 2})",
            "callback({a:function(){}})",
        ] {
            assert!(normalize(raw).is_err(), "accepted {raw:?}");
        }
    }

    #[test]
    fn test_error_position_points_at_offending_token() {
        let raw = "callback({\n  a:1,\n  b 2\n});";
        let (line, column, reason) = position(normalize(raw).unwrap_err());
        assert_eq!((line, column), (3, 5));
        assert!(reason.contains("':'"), "{reason}");
    }

    #[test]
    fn test_unterminated_constructs() {
        let (_, _, reason) = position(normalize("/* banner callback({})").unwrap_err());
        assert_eq!(reason, "unterminated comment");

        let (_, _, reason) = position(normalize("callback({a:'open})").unwrap_err());
        assert_eq!(reason, "unterminated string");

        assert!(normalize("callback({a:1}").is_err());
        assert!(normalize("callback([1,2").is_err());
        assert!(normalize("").is_err());
    }

    #[test]
    fn test_nesting_is_bounded() {
        let shallow = format!("callback({}{})", "[".repeat(MAX_DEPTH), "]".repeat(MAX_DEPTH));
        assert!(normalize(&shallow).is_ok());

        let deep = format!(
            "callback({}{})",
            "[".repeat(MAX_DEPTH + 1),
            "]".repeat(MAX_DEPTH + 1)
        );
        let (_, _, reason) = position(normalize(&deep).unwrap_err());
        assert!(reason.contains("nesting"), "{reason}");
    }

    #[test]
    fn test_invalid_number() {
        let (_, _, reason) = position(normalize("callback([1e])").unwrap_err());
        assert!(reason.contains("invalid number"), "{reason}");
    }

    #[test]
    fn test_large_integers_fall_back_to_float() {
        let doc = normalize("callback([99999999999999999999])").unwrap();
        assert_eq!(doc[0].as_f64(), Some(1e20));
    }
}
