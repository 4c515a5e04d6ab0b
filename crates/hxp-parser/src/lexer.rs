//! Lexer (tokenizer) for Hyper source, with a JSX sub-mode.
//!
//! The parser pulls tokens on demand. Whether a `<` opens a JSX element
//! depends on the previous token, the same way a JavaScript lexer decides
//! between a regex and a division: after an operand it is a comparison,
//! anywhere else a `<` directly followed by a letter starts a tag.
//!
//! Inside JSX the lexer tracks nesting depth. Tags produce attribute,
//! equals, string and expression tokens; element bodies produce text and
//! expression tokens. `{...}` inside JSX is captured whole (brace balanced)
//! and not tokenized further.
//!
//! Lexical errors never abort scanning: they come back as
//! [`TokenKind::Error`] and the next call continues after the bad input.

use crate::span::Span;
use crate::token::{keyword_from_str, Token, TokenKind};

/// Where the lexer is inside a JSX element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JsxState {
    /// Between `<name` and `>` or `/>`.
    Tag,
    /// Between `</` and `>`.
    EndTag,
    /// Between a tag's `>` and the next `<` (element body).
    Children,
}

/// The lexer state.
#[derive(Clone)]
pub struct Lexer<'a> {
    /// Source code as bytes (for fast indexing).
    source: &'a [u8],
    text: &'a str,
    /// Current byte position.
    pos: usize,
    /// Start position of the current token.
    token_start: usize,
    /// 1-based line/column of `pos`.
    line: u32,
    column: u32,
    /// Line/column of `token_start`.
    start_line: u32,
    start_column: u32,
    /// Open JSX elements. Zero means normal mode.
    jsx_depth: u32,
    jsx_state: JsxState,
    /// Whether a `<` here may open a JSX element.
    allow_jsx: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code.
    pub fn new(source: &'a str) -> Self {
        Self {
            source: source.as_bytes(),
            text: source,
            pos: 0,
            token_start: 0,
            line: 1,
            column: 1,
            start_line: 1,
            start_column: 1,
            jsx_depth: 0,
            jsx_state: JsxState::Tag,
            allow_jsx: true,
        }
    }

    /// Get the current byte position.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Whether the lexer is currently inside a JSX element.
    pub fn in_jsx(&self) -> bool {
        self.jsx_depth > 0
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Token {
        if self.in_jsx() && self.jsx_state == JsxState::Children {
            return self.next_jsx_child();
        }

        self.skip_whitespace_and_comments();
        self.start_token();

        if self.is_eof() {
            return self.make_token(TokenKind::Eof);
        }

        let kind = if self.in_jsx() {
            self.scan_jsx_tag_token()
        } else {
            self.scan_normal_token()
        };

        // A finished element is an operand; `close_jsx_element` already said so.
        if !kind.is_jsx() {
            self.allow_jsx = !kind.ends_operand();
        }
        self.make_token(kind)
    }

    /// Peek at the next token without consuming it.
    pub fn peek(&self) -> Token {
        self.clone().next_token()
    }

    fn scan_normal_token(&mut self) -> TokenKind {
        let ch = self.current();
        match ch {
            // Identifiers and keywords
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.scan_identifier(),

            // Numbers
            b'0'..=b'9' => self.scan_number(),

            // Strings
            b'"' | b'\'' => self.scan_string(ch),

            // Punctuation and operators
            b'(' => { self.advance(); TokenKind::LParen }
            b')' => { self.advance(); TokenKind::RParen }
            b'{' => { self.advance(); TokenKind::LBrace }
            b'}' => { self.advance(); TokenKind::RBrace }
            b'[' => { self.advance(); TokenKind::LBracket }
            b']' => { self.advance(); TokenKind::RBracket }
            b';' => { self.advance(); TokenKind::Semicolon }
            b',' => { self.advance(); TokenKind::Comma }
            b':' => { self.advance(); TokenKind::Colon }
            b'.' => { self.advance(); TokenKind::Dot }
            b'?' => { self.advance(); TokenKind::Question }
            b'~' => { self.advance(); TokenKind::Tilde }

            b'+' => self.scan_plus(),
            b'-' => self.scan_minus(),
            b'*' => self.scan_star(),
            b'/' => self.scan_pair(TokenKind::Slash, b'=', TokenKind::SlashEq),
            b'%' => self.scan_pair(TokenKind::Percent, b'=', TokenKind::PercentEq),
            b'^' => self.scan_pair(TokenKind::Caret, b'=', TokenKind::CaretEq),
            b'!' => self.scan_pair(TokenKind::Bang, b'=', TokenKind::BangEq),
            b'=' => self.scan_equals(),
            b'<' => self.scan_less_than(),
            b'>' => self.scan_greater_than(),
            b'&' => self.scan_ampersand(),
            b'|' => self.scan_pipe(),

            _ => {
                self.advance_char();
                TokenKind::Error("Unexpected character".to_string())
            }
        }
    }

    // === Helper methods ===

    fn is_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn current(&self) -> u8 {
        self.source.get(self.pos).copied().unwrap_or(0)
    }

    fn peek_char(&self) -> u8 {
        self.source.get(self.pos + 1).copied().unwrap_or(0)
    }

    fn advance(&mut self) {
        let b = self.current();
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
            self.column = 1;
        } else if b & 0xC0 != 0x80 {
            // Continuation bytes of a UTF-8 sequence share their lead byte's column.
            self.column += 1;
        }
    }

    fn advance_n(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    /// Advance over one whole UTF-8 character.
    fn advance_char(&mut self) {
        let len = match self.current() {
            0xF0..=0xFF => 4,
            0xE0..=0xEF => 3,
            0xC0..=0xDF => 2,
            _ => 1,
        };
        self.advance_n(len.min(self.source.len() - self.pos));
    }

    fn start_token(&mut self) {
        self.token_start = self.pos;
        self.start_line = self.line;
        self.start_column = self.column;
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(
            kind,
            Span::new(self.token_start as u32, self.pos as u32),
            self.start_line,
            self.start_column,
        )
    }

    fn slice(&self, start: usize, end: usize) -> &'a str {
        self.text.get(start..end).unwrap_or("")
    }

    fn token_slice(&self) -> &'a str {
        self.slice(self.token_start, self.pos)
    }

    // === Whitespace and comments ===

    fn skip_whitespace(&mut self) {
        while matches!(self.current(), b' ' | b'\t' | b'\r' | b'\n') {
            self.advance();
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.current() {
                b' ' | b'\t' | b'\r' | b'\n' => self.advance(),
                b'/' if self.peek_char() == b'/' => {
                    while !self.is_eof() && self.current() != b'\n' {
                        self.advance();
                    }
                }
                b'/' if self.peek_char() == b'*' => {
                    self.advance_n(2);
                    while !self.is_eof() {
                        if self.current() == b'*' && self.peek_char() == b'/' {
                            self.advance_n(2);
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    // === Token scanning ===

    fn scan_identifier(&mut self) -> TokenKind {
        while matches!(self.current(), b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_') {
            self.advance();
        }

        let ident = self.token_slice();
        keyword_from_str(ident).unwrap_or_else(|| TokenKind::Identifier(ident.to_string()))
    }

    fn scan_number(&mut self) -> TokenKind {
        let start = self.pos;

        while self.current().is_ascii_digit() {
            self.advance();
        }

        // Fraction, only when a digit follows the dot (`1.foo` is member access)
        if self.current() == b'.' && self.peek_char().is_ascii_digit() {
            self.advance();
            while self.current().is_ascii_digit() {
                self.advance();
            }
        }

        // Exponent
        if matches!(self.current(), b'e' | b'E') {
            let sign = usize::from(matches!(self.peek_char(), b'+' | b'-'));
            let digit = self.source.get(self.pos + 1 + sign).copied().unwrap_or(0);
            if digit.is_ascii_digit() {
                self.advance_n(1 + sign);
                while self.current().is_ascii_digit() {
                    self.advance();
                }
            }
        }

        let num_str = self.slice(start, self.pos);
        TokenKind::Number(num_str.parse().unwrap_or(f64::NAN))
    }

    fn scan_string(&mut self, quote: u8) -> TokenKind {
        self.advance(); // Skip opening quote

        let mut value = String::new();
        let mut run_start = self.pos;
        loop {
            if self.is_eof() {
                return TokenKind::Error("Unterminated string".to_string());
            }
            match self.current() {
                c if c == quote => {
                    value.push_str(self.slice(run_start, self.pos));
                    self.advance();
                    return TokenKind::String(value);
                }
                b'\\' => {
                    value.push_str(self.slice(run_start, self.pos));
                    self.advance();
                    if self.is_eof() {
                        return TokenKind::Error("Unterminated string".to_string());
                    }
                    if let Some(ch) = self.scan_escape_sequence() {
                        value.push(ch);
                    }
                    run_start = self.pos;
                }
                _ => self.advance(),
            }
        }
    }

    /// Interpret the character after a backslash. Non-ASCII characters are
    /// left in place and picked up by the next literal run.
    fn scan_escape_sequence(&mut self) -> Option<char> {
        let ch = self.current();
        if !ch.is_ascii() {
            return None;
        }
        self.advance();

        Some(match ch {
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            b'0' => '\0',
            _ => ch as char,
        })
    }

    // === Multi-character operators ===

    /// `single` or, if followed by `next`, `double`.
    fn scan_pair(&mut self, single: TokenKind, next: u8, double: TokenKind) -> TokenKind {
        self.advance();
        if self.current() == next {
            self.advance();
            double
        } else {
            single
        }
    }

    fn scan_plus(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'+' => { self.advance(); TokenKind::PlusPlus }
            b'=' => { self.advance(); TokenKind::PlusEq }
            _ => TokenKind::Plus,
        }
    }

    fn scan_minus(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'-' => { self.advance(); TokenKind::MinusMinus }
            b'=' => { self.advance(); TokenKind::MinusEq }
            b'>' => { self.advance(); TokenKind::Arrow }
            _ => TokenKind::Minus,
        }
    }

    fn scan_star(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'*' => { self.advance(); TokenKind::StarStar }
            b'=' => { self.advance(); TokenKind::StarEq }
            _ => TokenKind::Star,
        }
    }

    fn scan_equals(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'=' => { self.advance(); TokenKind::EqEq }
            b'>' => { self.advance(); TokenKind::FatArrow }
            _ => TokenKind::Eq,
        }
    }

    fn scan_less_than(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'=' => { self.advance(); TokenKind::LtEq }
            b'<' => { self.advance(); TokenKind::LtLt }
            c if c.is_ascii_alphabetic() && self.allow_jsx => {
                self.jsx_depth = 1;
                self.jsx_state = JsxState::Tag;
                TokenKind::JsxOpenTag
            }
            _ => TokenKind::Lt,
        }
    }

    fn scan_greater_than(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'=' => { self.advance(); TokenKind::GtEq }
            b'>' => { self.advance(); TokenKind::GtGt }
            _ => TokenKind::Gt,
        }
    }

    fn scan_ampersand(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'&' => { self.advance(); TokenKind::AmpAmp }
            b'=' => { self.advance(); TokenKind::AmpEq }
            _ => TokenKind::Amp,
        }
    }

    fn scan_pipe(&mut self) -> TokenKind {
        self.advance();
        match self.current() {
            b'|' => { self.advance(); TokenKind::PipePipe }
            b'=' => { self.advance(); TokenKind::PipeEq }
            _ => TokenKind::Pipe,
        }
    }

    // === JSX ===

    /// One token inside `<name ...>` or `</name>`.
    fn scan_jsx_tag_token(&mut self) -> TokenKind {
        match self.current() {
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                while matches!(
                    self.current(),
                    b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_' | b'-'
                ) {
                    self.advance();
                }
                TokenKind::JsxAttribute(self.token_slice().to_string())
            }
            b'=' => {
                self.advance();
                TokenKind::JsxEquals
            }
            b'"' | b'\'' => self.scan_string(self.current()),
            b'{' => self.scan_jsx_expression(),
            b'>' => {
                self.advance();
                if self.jsx_state == JsxState::EndTag {
                    self.close_jsx_element();
                } else {
                    self.jsx_state = JsxState::Children;
                }
                TokenKind::JsxCloseTag
            }
            b'/' if self.peek_char() == b'>' => {
                self.advance_n(2);
                self.close_jsx_element();
                TokenKind::JsxSelfClose
            }
            _ => {
                self.advance_char();
                TokenKind::Error("Unexpected character".to_string())
            }
        }
    }

    /// One token in an element body: nested tag, end tag, expression or text.
    fn next_jsx_child(&mut self) -> Token {
        self.skip_whitespace();
        self.start_token();

        if self.is_eof() {
            return self.make_token(TokenKind::Eof);
        }

        let kind = match self.current() {
            b'<' if self.peek_char() == b'/' => {
                self.advance_n(2);
                self.jsx_state = JsxState::EndTag;
                TokenKind::JsxEndTag
            }
            b'<' if self.peek_char().is_ascii_alphabetic() => {
                self.advance();
                self.jsx_depth += 1;
                self.jsx_state = JsxState::Tag;
                TokenKind::JsxOpenTag
            }
            b'{' => self.scan_jsx_expression(),
            _ => {
                // A stray `<` is part of the text.
                self.advance();
                while !self.is_eof() && !matches!(self.current(), b'<' | b'{') {
                    self.advance();
                }
                TokenKind::JsxText(self.token_slice().to_string())
            }
        };

        self.make_token(kind)
    }

    /// Capture `{...}` with balanced braces. The payload is the inner text.
    fn scan_jsx_expression(&mut self) -> TokenKind {
        self.advance(); // Skip {
        let inner_start = self.pos;
        let mut depth = 1u32;

        while !self.is_eof() {
            match self.current() {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        let inner = self.slice(inner_start, self.pos).to_string();
                        self.advance(); // Skip }
                        return TokenKind::JsxExpression(inner);
                    }
                }
                _ => {}
            }
            self.advance();
        }

        TokenKind::Error("Unterminated JSX expression".to_string())
    }

    fn close_jsx_element(&mut self) {
        self.jsx_depth = self.jsx_depth.saturating_sub(1);
        self.jsx_state = JsxState::Children;
        if self.jsx_depth == 0 {
            // Back in normal mode, right after a complete element (an operand).
            self.allow_jsx = false;
        }
    }
}

/// Tokenize a whole source string. The last token is always `Eof`.
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token();
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            return tokens;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut tokens: Vec<TokenKind> = tokenize(source).into_iter().map(|t| t.kind).collect();
        tokens.pop(); // Eof
        tokens
    }

    fn ident(name: &str) -> TokenKind {
        TokenKind::Identifier(name.into())
    }

    #[test]
    fn test_identifiers_and_keywords() {
        assert_eq!(
            kinds("let foo = fn_1 and not bar"),
            vec![
                TokenKind::Let,
                ident("foo"),
                TokenKind::Eq,
                ident("fn_1"),
                TokenKind::AmpAmp,
                TokenKind::Bang,
                ident("bar"),
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("42 3.14 1e3 2.5E-2 7."),
            vec![
                TokenKind::Number(42.0),
                TokenKind::Number(3.14),
                TokenKind::Number(1000.0),
                TokenKind::Number(0.025),
                TokenKind::Number(7.0),
                TokenKind::Dot,
            ]
        );
    }

    #[test]
    fn test_exponent_needs_digits() {
        assert_eq!(kinds("1e"), vec![TokenKind::Number(1.0), ident("e")]);
    }

    #[test]
    fn test_strings_and_escapes() {
        assert_eq!(
            kinds(r#""hello" 'single' "a\"b" "tab\there" "\\""#),
            vec![
                TokenKind::String("hello".into()),
                TokenKind::String("single".into()),
                TokenKind::String("a\"b".into()),
                TokenKind::String("tab\there".into()),
                TokenKind::String("\\".into()),
            ]
        );
    }

    #[test]
    fn test_unicode_string() {
        assert_eq!(kinds("\"héllo ✓\""), vec![TokenKind::String("héllo ✓".into())]);
    }

    #[test]
    fn test_unterminated_string_is_error_token() {
        let tokens = tokenize("let s = \"oops");
        assert_eq!(tokens[3].kind, TokenKind::Error("Unterminated string".into()));
        assert_eq!(tokens[4].kind, TokenKind::Eof);
    }

    #[test]
    fn test_unexpected_character_resumes() {
        assert_eq!(
            kinds("a @ b"),
            vec![ident("a"), TokenKind::Error("Unexpected character".into()), ident("b")]
        );
    }

    #[test]
    fn test_longest_operator_match() {
        assert_eq!(
            kinds("== != <= >= && || += -= *= /= %= ** ++ -- -> << >> &= |= ^= =>"),
            vec![
                TokenKind::EqEq,
                TokenKind::BangEq,
                TokenKind::LtEq,
                TokenKind::GtEq,
                TokenKind::AmpAmp,
                TokenKind::PipePipe,
                TokenKind::PlusEq,
                TokenKind::MinusEq,
                TokenKind::StarEq,
                TokenKind::SlashEq,
                TokenKind::PercentEq,
                TokenKind::StarStar,
                TokenKind::PlusPlus,
                TokenKind::MinusMinus,
                TokenKind::Arrow,
                TokenKind::LtLt,
                TokenKind::GtGt,
                TokenKind::AmpEq,
                TokenKind::PipeEq,
                TokenKind::CaretEq,
                TokenKind::FatArrow,
            ]
        );
    }

    #[test]
    fn test_comments_and_positions() {
        let tokens = tokenize("// header\nlet x /* inline */ = 1;\n  x");
        assert_eq!(tokens[0].kind, TokenKind::Let);
        assert_eq!((tokens[0].line, tokens[0].column), (2, 1));
        assert_eq!(tokens[2].kind, TokenKind::Eq);
        assert_eq!((tokens[2].line, tokens[2].column), (2, 20));
        assert_eq!((tokens[5].line, tokens[5].column), (3, 3));
    }

    #[test]
    fn test_less_than_after_operand_is_comparison() {
        assert_eq!(kinds("a<b"), vec![ident("a"), TokenKind::Lt, ident("b")]);
        assert_eq!(kinds("(1)<x"), vec![
            TokenKind::LParen,
            TokenKind::Number(1.0),
            TokenKind::RParen,
            TokenKind::Lt,
            ident("x"),
        ]);
    }

    #[test]
    fn test_jsx_element() {
        assert_eq!(
            kinds(r#"let el = <div id="main">Hello {name}</div>;"#),
            vec![
                TokenKind::Let,
                ident("el"),
                TokenKind::Eq,
                TokenKind::JsxOpenTag,
                TokenKind::JsxAttribute("div".into()),
                TokenKind::JsxAttribute("id".into()),
                TokenKind::JsxEquals,
                TokenKind::String("main".into()),
                TokenKind::JsxCloseTag,
                TokenKind::JsxText("Hello ".into()),
                TokenKind::JsxExpression("name".into()),
                TokenKind::JsxEndTag,
                TokenKind::JsxAttribute("div".into()),
                TokenKind::JsxCloseTag,
                TokenKind::Semicolon,
            ]
        );
    }

    #[test]
    fn test_jsx_nesting_and_self_close() {
        let mut lexer = Lexer::new("<ul><li data-x={ {a: 1} }/></ul> x");
        let mut seen = Vec::new();
        loop {
            let token = lexer.next_token();
            if token.kind == TokenKind::Eof {
                break;
            }
            seen.push(token.kind);
        }
        assert_eq!(
            seen,
            vec![
                TokenKind::JsxOpenTag,
                TokenKind::JsxAttribute("ul".into()),
                TokenKind::JsxCloseTag,
                TokenKind::JsxOpenTag,
                TokenKind::JsxAttribute("li".into()),
                TokenKind::JsxAttribute("data-x".into()),
                TokenKind::JsxEquals,
                TokenKind::JsxExpression(" {a: 1} ".into()),
                TokenKind::JsxSelfClose,
                TokenKind::JsxEndTag,
                TokenKind::JsxAttribute("ul".into()),
                TokenKind::JsxCloseTag,
                ident("x"),
            ]
        );
        assert!(!lexer.in_jsx());
    }

    #[test]
    fn test_self_closing_root_exits_jsx() {
        assert_eq!(
            kinds("<br/> + 1"),
            vec![
                TokenKind::JsxOpenTag,
                TokenKind::JsxAttribute("br".into()),
                TokenKind::JsxSelfClose,
                TokenKind::Plus,
                TokenKind::Number(1.0),
            ]
        );
    }

    #[test]
    fn test_less_than_after_element_is_comparison() {
        let tokens = kinds("<p>hi</p> <b");
        assert_eq!(&tokens[tokens.len() - 2..], &[TokenKind::Lt, ident("b")]);
    }

    #[test]
    fn test_relex_token_substring() {
        let source = r#"fn add(a, b) { return a + b * 2.5 >= "x\"y" && !c; } let q = a<b;"#;
        for token in tokenize(source) {
            if token.kind == TokenKind::Eof {
                continue;
            }
            let text = token.lexeme(source);
            let again = Lexer::new(text).next_token();
            assert_eq!(again.kind, token.kind, "relexing {text:?}");
        }
    }
}
