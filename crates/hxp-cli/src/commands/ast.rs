//! `hxp ast` command implementation.

use std::fs;
use std::path::Path;

use hxp_core::{Config, Error};
use hxp_parser::{Arena, LineIndex, Parser, Stmt, StmtKind};
use miette::Result;
use serde::Serialize;

use super::{fail, print_json};

#[derive(Serialize)]
struct AstJson<'a> {
    ok: bool,
    file: String,
    statements: Vec<StmtJson<'a>>,
}

/// Outline of one top-level statement.
#[derive(Serialize)]
struct StmtJson<'a> {
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    line: u32,
    column: u32,
}

impl<'a> StmtJson<'a> {
    fn new(stmt: &Stmt<'a>, lines: &LineIndex) -> Self {
        let name = match stmt.kind {
            StmtKind::Var { name, .. } => Some(name),
            StmtKind::Function(function) => function.name,
            _ => None,
        };
        let (line, column) = lines.line_col(stmt.span.start);
        Self {
            kind: stmt.kind.name(),
            name,
            line,
            column,
        }
    }
}

/// Run the ast command.
pub fn run(config: &Config, file: &Path, json: bool) -> Result<()> {
    let path = config.resolve(file);
    let source = match fs::read_to_string(&path) {
        Ok(source) => source,
        Err(source) => fail(&Error::ReadInput { path, source }, json),
    };

    let arena = Arena::new();
    let program = match Parser::new(&arena, &source).parse() {
        Ok(program) => program,
        Err(errors) => fail(&Error::Parse(errors), json),
    };

    if json {
        let lines = LineIndex::new(&source);
        print_json(&AstJson {
            ok: true,
            file: path.display().to_string(),
            statements: program.stmts.iter().map(|s| StmtJson::new(s, &lines)).collect(),
        });
    } else {
        println!("{:#?}", program.stmts);
    }
    Ok(())
}
