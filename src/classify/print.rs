//! Parsing and comment-free printing of declaration sources.

use oxc::allocator::Allocator;
use oxc::ast::ast::Program;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

use super::ExtractError;

/// Declarations may carry JSX and type annotations.
fn source_type() -> SourceType {
    SourceType::tsx().with_module(true)
}

pub fn parse<'a>(allocator: &'a Allocator, source: &'a str) -> Result<Program<'a>, ExtractError> {
    let ret = Parser::new(allocator, source, source_type()).parse();
    if let Some(err) = ret.errors.first() {
        return Err(ExtractError::Parse(err.to_string()));
    }
    if ret.panicked {
        return Err(ExtractError::Parse("parser gave up".into()));
    }
    Ok(ret.program)
}

/// Reprint `source` without comments and with normalized layout.
pub fn strip_comments(source: &str) -> Result<String, ExtractError> {
    let allocator = Allocator::default();
    let program = parse(&allocator, source)?;
    let code = Codegen::new()
        .with_options(CodegenOptions {
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .build(&program)
        .code;
    Ok(code)
}
