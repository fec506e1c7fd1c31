//! View-region extraction on the oxc AST.
//!
//! Locates the parts of a declaration that only produce its view: the
//! top-level `return` statements of a function-shaped component, the body of
//! an expression-bodied arrow, or the build member of a class-shaped one.
//! Each region is replaced by a fixed placeholder; everything else is
//! compared after reprinting.

use oxc::ast::ast::{
    Class, ClassElement, Declaration, ExportDefaultDeclarationKind, Expression, FunctionBody,
    Program, PropertyKey, Statement, VariableDeclaration,
};
use oxc::span::{GetSpan, Span};

use super::ExtractError;

const VIEW: &str = "__hmr_view__";
const RETURN_VIEW: &str = "return __hmr_view__;";
const BLOCK_VIEW: &str = "{ __hmr_view__; }";

/// A source range and the placeholder that replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mask {
    pub span: Span,
    pub replacement: &'static str,
}

impl Mask {
    fn new(span: Span, replacement: &'static str) -> Self {
        Self { span, replacement }
    }
}

/// Replace every masked range of `source`.
pub fn apply(source: &str, masks: &[Mask]) -> String {
    let mut sorted = masks.to_vec();
    sorted.sort_by_key(|m| m.span.start);

    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    for mask in sorted {
        let (start, end) = (mask.span.start as usize, mask.span.end as usize);
        if start < cursor {
            continue;
        }
        out.push_str(&source[cursor..start]);
        out.push_str(mask.replacement);
        cursor = end;
    }
    out.push_str(&source[cursor..]);
    out
}

// =============================================================================
// Function-shaped
// =============================================================================

/// View regions of the first function-shaped declaration in `program`.
pub fn function_masks(program: &Program) -> Result<Vec<Mask>, ExtractError> {
    let (body, expression) = program
        .body
        .iter()
        .find_map(function_in)
        .ok_or(ExtractError::NoBody)?;

    if expression {
        return match body.statements.first() {
            Some(Statement::ExpressionStatement(stmt)) => {
                Ok(vec![Mask::new(stmt.expression.span(), VIEW)])
            }
            _ => Err(ExtractError::NoBody),
        };
    }

    Ok(body
        .statements
        .iter()
        .filter_map(|stmt| match stmt {
            Statement::ReturnStatement(ret) => Some(Mask::new(ret.span, RETURN_VIEW)),
            _ => None,
        })
        .collect())
}

/// Body of a function-shaped statement; `true` for an arrow's expression body.
fn function_in<'p, 'a>(stmt: &'p Statement<'a>) -> Option<(&'p FunctionBody<'a>, bool)> {
    match stmt {
        Statement::FunctionDeclaration(func) => func.body.as_deref().map(|b| (b, false)),
        Statement::VariableDeclaration(var) => variable_function(var),
        Statement::ExpressionStatement(stmt) => expression_function(&stmt.expression),
        Statement::ExportNamedDeclaration(export) => match &export.declaration {
            Some(Declaration::FunctionDeclaration(func)) => func.body.as_deref().map(|b| (b, false)),
            Some(Declaration::VariableDeclaration(var)) => variable_function(var),
            _ => None,
        },
        Statement::ExportDefaultDeclaration(export) => match &export.declaration {
            ExportDefaultDeclarationKind::FunctionDeclaration(func) => {
                func.body.as_deref().map(|b| (b, false))
            }
            ExportDefaultDeclarationKind::ArrowFunctionExpression(arrow) => {
                Some((&*arrow.body, arrow.expression))
            }
            _ => None,
        },
        _ => None,
    }
}

fn variable_function<'p, 'a>(var: &'p VariableDeclaration<'a>) -> Option<(&'p FunctionBody<'a>, bool)> {
    var.declarations
        .iter()
        .find_map(|d| d.init.as_ref().and_then(expression_function))
}

/// `() => ..`, `function () {..}`, and `Name = <either>` as scanned from a
/// declarator.
fn expression_function<'p, 'a>(expr: &'p Expression<'a>) -> Option<(&'p FunctionBody<'a>, bool)> {
    match expr {
        Expression::ArrowFunctionExpression(arrow) => Some((&*arrow.body, arrow.expression)),
        Expression::FunctionExpression(func) => func.body.as_deref().map(|b| (b, false)),
        Expression::AssignmentExpression(assign) => expression_function(&assign.right),
        Expression::ParenthesizedExpression(paren) => expression_function(&paren.expression),
        _ => None,
    }
}

// =============================================================================
// Class-shaped
// =============================================================================

/// The single build member of the first class in `program`.
pub fn class_masks(
    program: &Program,
    source: &str,
    build_method: &str,
) -> Result<Vec<Mask>, ExtractError> {
    let class = program
        .body
        .iter()
        .find_map(class_in)
        .ok_or(ExtractError::NoBody)?;

    let is_build = |key: &PropertyKey<'_>, is_static: bool, computed: bool| {
        !is_static && !computed && key_text(source, key) == build_method
    };

    let mut masks = Vec::new();
    for element in &class.body.body {
        match element {
            ClassElement::MethodDefinition(method)
                if is_build(&method.key, method.r#static, method.computed) =>
            {
                // overload signatures have no body
                if let Some(body) = &method.value.body {
                    masks.push(Mask::new(body.span, BLOCK_VIEW));
                }
            }
            ClassElement::PropertyDefinition(prop)
                if is_build(&prop.key, prop.r#static, prop.computed) =>
            {
                if let Some(value) = &prop.value {
                    masks.push(Mask::new(value.span(), VIEW));
                }
            }
            _ => {}
        }
    }

    match masks.len() {
        0 => Err(ExtractError::MissingBuildMethod(build_method.to_string())),
        1 => Ok(masks),
        _ => Err(ExtractError::AmbiguousBuildMethod),
    }
}

fn key_text<'s>(source: &'s str, key: &PropertyKey<'_>) -> &'s str {
    let span = key.span();
    &source[span.start as usize..span.end as usize]
}

fn class_in<'p, 'a>(stmt: &'p Statement<'a>) -> Option<&'p Class<'a>> {
    match stmt {
        Statement::ClassDeclaration(class) => Some(&**class),
        Statement::VariableDeclaration(var) => var
            .declarations
            .iter()
            .find_map(|d| d.init.as_ref().and_then(class_expression)),
        Statement::ExpressionStatement(stmt) => class_expression(&stmt.expression),
        Statement::ExportNamedDeclaration(export) => match &export.declaration {
            Some(Declaration::ClassDeclaration(class)) => Some(&**class),
            _ => None,
        },
        Statement::ExportDefaultDeclaration(export) => match &export.declaration {
            ExportDefaultDeclarationKind::ClassDeclaration(class) => Some(&**class),
            _ => None,
        },
        _ => None,
    }
}

fn class_expression<'p, 'a>(expr: &'p Expression<'a>) -> Option<&'p Class<'a>> {
    match expr {
        Expression::ClassExpression(class) => Some(&**class),
        Expression::AssignmentExpression(assign) => class_expression(&assign.right),
        Expression::ParenthesizedExpression(paren) => class_expression(&paren.expression),
        _ => None,
    }
}
