//! `hxp tokens` command implementation.

use std::fs;
use std::path::Path;

use hxp_core::{Config, Error};
use hxp_parser::{tokenize, Token, TokenKind};
use miette::Result;
use serde::Serialize;

use super::{fail, print_json};

#[derive(Serialize)]
struct TokensJson<'s> {
    ok: bool,
    file: String,
    tokens: Vec<TokenJson<'s>>,
}

#[derive(Serialize)]
struct TokenJson<'s> {
    kind: &'static str,
    lexeme: &'s str,
    line: u32,
    column: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'s str>,
}

impl<'s> TokenJson<'s> {
    fn new(token: &'s Token, source: &'s str) -> Self {
        let message = match &token.kind {
            TokenKind::Error(message) => Some(message.as_str()),
            _ => None,
        };
        Self {
            kind: token.kind.name(),
            lexeme: token.lexeme(source),
            line: token.line,
            column: token.column,
            message,
        }
    }
}

/// Run the tokens command.
pub fn run(config: &Config, file: &Path, json: bool) -> Result<()> {
    let path = config.resolve(file);
    let source = match fs::read_to_string(&path) {
        Ok(source) => source,
        Err(source) => fail(&Error::ReadInput { path, source }, json),
    };
    let tokens = tokenize(&source);

    if json {
        print_json(&TokensJson {
            ok: true,
            file: path.display().to_string(),
            tokens: tokens.iter().map(|t| TokenJson::new(t, &source)).collect(),
        });
        return Ok(());
    }

    for token in &tokens {
        match &token.kind {
            TokenKind::Error(message) => {
                println!("{}:{} error {message}", token.line, token.column);
            }
            TokenKind::Eof => println!("{}:{} eof", token.line, token.column),
            kind => println!(
                "{}:{} {} {}",
                token.line,
                token.column,
                kind.name(),
                token.lexeme(&source)
            ),
        }
    }
    Ok(())
}
