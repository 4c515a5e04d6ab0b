//! Token types for Hyper source (`.hxp`), including the JSX sub-language.

use crate::span::Span;

/// A token with its kind and source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    /// 1-based line of the first byte.
    pub line: u32,
    /// 1-based column of the first byte.
    pub column: u32,
}

impl Token {
    #[inline]
    pub const fn new(kind: TokenKind, span: Span, line: u32, column: u32) -> Self {
        Self { kind, span, line, column }
    }

    /// The exact source text of this token.
    pub fn lexeme<'s>(&self, source: &'s str) -> &'s str {
        self.span.text(source)
    }
}

/// The kind of token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // === Literals ===
    /// Identifier: `foo`, `_bar`
    Identifier(String),
    /// String literal with escapes already interpreted: `"hi\n"`, `'x'`
    String(String),
    /// Number literal: `42`, `3.14`, `6.02e23`
    Number(f64),

    // === Keywords ===
    Let,
    Const,
    Fn,
    If,
    Else,
    While,
    For,
    In,
    Return,
    Break,
    Continue,
    Match,
    Case,
    Default,
    Struct,
    Enum,
    Import,
    Export,
    Module,
    True,
    False,
    Null,
    Async,
    Await,
    Try,
    Catch,
    Finally,
    Throw,
    State,

    // === Punctuation ===
    LParen,     // (
    RParen,     // )
    LBrace,     // {
    RBrace,     // }
    LBracket,   // [
    RBracket,   // ]
    Semicolon,  // ;
    Comma,      // ,
    Colon,      // :
    Dot,        // .
    Question,   // ?
    Arrow,      // ->
    FatArrow,   // =>

    // === Operators ===
    // Assignment
    Eq,         // =
    PlusEq,     // +=
    MinusEq,    // -=
    StarEq,     // *=
    SlashEq,    // /=
    PercentEq,  // %=
    AmpEq,      // &=
    PipeEq,     // |=
    CaretEq,    // ^=

    // Comparison
    EqEq,       // ==
    BangEq,     // !=
    Lt,         // <
    LtEq,       // <=
    Gt,         // >
    GtEq,       // >=

    // Arithmetic
    Plus,       // +
    Minus,      // -
    Star,       // *
    Slash,      // /
    Percent,    // %
    StarStar,   // **
    PlusPlus,   // ++
    MinusMinus, // --

    // Bitwise
    Amp,        // &
    Pipe,       // |
    Caret,      // ^
    Tilde,      // ~
    LtLt,       // <<
    GtGt,       // >>

    // Logical (also spelled `and`, `or`, `not`)
    AmpAmp,     // &&
    PipePipe,   // ||
    Bang,       // !

    // === JSX ===
    JsxOpenTag,     // < starting an element
    JsxCloseTag,    // > ending a tag
    JsxSelfClose,   // />
    JsxEndTag,      // </
    JsxEquals,      // = between attribute name and value
    /// Tag or attribute name: `div`, `data-id`
    JsxAttribute(String),
    /// Raw text between tags.
    JsxText(String),
    /// Brace-balanced `{...}` capture. Holds the inner text, not re-tokenized.
    JsxExpression(String),

    // === Special ===
    Eof,
    /// Lexical error with its message. Scanning resumes after it.
    Error(String),
}

impl TokenKind {
    /// Tokens after which an operand can no longer start, so a following
    /// `<` is a comparison rather than a JSX tag.
    pub fn ends_operand(&self) -> bool {
        matches!(
            self,
            TokenKind::Identifier(_)
                | TokenKind::String(_)
                | TokenKind::Number(_)
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
                | TokenKind::RParen
                | TokenKind::RBracket
        )
    }

    /// Keywords that start a statement. Error recovery resynchronizes on these.
    pub fn starts_statement(&self) -> bool {
        matches!(
            self,
            TokenKind::Fn
                | TokenKind::Let
                | TokenKind::Const
                | TokenKind::If
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Return
        )
    }

    /// Reserved words the parser recognizes but does not implement.
    pub fn is_reserved(&self) -> bool {
        matches!(
            self,
            TokenKind::Match
                | TokenKind::Case
                | TokenKind::Default
                | TokenKind::Struct
                | TokenKind::Enum
                | TokenKind::Import
                | TokenKind::Export
                | TokenKind::Module
                | TokenKind::Async
                | TokenKind::Await
                | TokenKind::Try
                | TokenKind::Catch
                | TokenKind::Finally
                | TokenKind::Throw
                | TokenKind::State
        )
    }

    pub fn is_jsx(&self) -> bool {
        matches!(
            self,
            TokenKind::JsxOpenTag
                | TokenKind::JsxCloseTag
                | TokenKind::JsxSelfClose
                | TokenKind::JsxEndTag
                | TokenKind::JsxEquals
                | TokenKind::JsxAttribute(_)
                | TokenKind::JsxText(_)
                | TokenKind::JsxExpression(_)
        )
    }

    /// Short human-readable name, used by `hxp tokens`.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Identifier(_) => "identifier",
            TokenKind::String(_) => "string",
            TokenKind::Number(_) => "number",
            TokenKind::JsxAttribute(_) => "jsx-attribute",
            TokenKind::JsxText(_) => "jsx-text",
            TokenKind::JsxExpression(_) => "jsx-expression",
            TokenKind::JsxOpenTag => "jsx-open-tag",
            TokenKind::JsxCloseTag => "jsx-close-tag",
            TokenKind::JsxSelfClose => "jsx-self-close",
            TokenKind::JsxEndTag => "jsx-end-tag",
            TokenKind::JsxEquals => "jsx-equals",
            TokenKind::Eof => "eof",
            TokenKind::Error(_) => "error",
            k if k.is_keyword() => "keyword",
            _ => "punct",
        }
    }

    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Let
                | TokenKind::Const
                | TokenKind::Fn
                | TokenKind::If
                | TokenKind::Else
                | TokenKind::While
                | TokenKind::For
                | TokenKind::In
                | TokenKind::Return
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
        ) || self.is_reserved()
    }
}

/// Look up a keyword from an identifier string.
pub fn keyword_from_str(s: &str) -> Option<TokenKind> {
    match s {
        "let" => Some(TokenKind::Let),
        "const" => Some(TokenKind::Const),
        "fn" => Some(TokenKind::Fn),
        "if" => Some(TokenKind::If),
        "else" => Some(TokenKind::Else),
        "while" => Some(TokenKind::While),
        "for" => Some(TokenKind::For),
        "in" => Some(TokenKind::In),
        "return" => Some(TokenKind::Return),
        "break" => Some(TokenKind::Break),
        "continue" => Some(TokenKind::Continue),
        "match" => Some(TokenKind::Match),
        "case" => Some(TokenKind::Case),
        "default" => Some(TokenKind::Default),
        "struct" => Some(TokenKind::Struct),
        "enum" => Some(TokenKind::Enum),
        "import" => Some(TokenKind::Import),
        "export" => Some(TokenKind::Export),
        "module" => Some(TokenKind::Module),
        "true" => Some(TokenKind::True),
        "false" => Some(TokenKind::False),
        "null" => Some(TokenKind::Null),
        "and" => Some(TokenKind::AmpAmp),
        "or" => Some(TokenKind::PipePipe),
        "not" => Some(TokenKind::Bang),
        "async" => Some(TokenKind::Async),
        "await" => Some(TokenKind::Await),
        "try" => Some(TokenKind::Try),
        "catch" => Some(TokenKind::Catch),
        "finally" => Some(TokenKind::Finally),
        "throw" => Some(TokenKind::Throw),
        "state" => Some(TokenKind::State),
        _ => None,
    }
}
