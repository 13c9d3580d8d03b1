mod lexer;
mod parser;

use compiler__diagnostics::{Diagnostic, ErrorCode};
use compiler__syntax::Module;

/// Parses one policy module. `file` is recorded on the module and on every diagnostic.
pub fn parse_module(source: &str, file: &str) -> Result<Module, Vec<Diagnostic>> {
    let mut lexer = lexer::Lexer::new(source);
    let tokens = lexer.lex_all_tokens();
    let mut diagnostics: Vec<Diagnostic> = lexer
        .into_errors()
        .into_iter()
        .map(|error| Diagnostic::located(ErrorCode::Parse, error.message, file, &error.span))
        .collect();

    let mut parser = parser::Parser::new(tokens, file);
    let module = parser.parse_module();
    diagnostics.extend(parser.into_diagnostics());

    if diagnostics.is_empty() {
        Ok(module)
    } else {
        diagnostics.sort_by_key(|diagnostic| {
            diagnostic
                .location
                .as_ref()
                .map_or((0, 0), |location| (location.row, location.col))
        });
        Err(diagnostics)
    }
}
