//! Component discovery on the oxc AST.
//!
//! The parse tree lives in an arena that is dropped at the end of
//! [`analyze`], so everything needed later is copied out as byte offsets and
//! owned strings.

use std::path::Path;

use oxc::allocator::Allocator;
use oxc::ast::ast::{
    Argument, CallExpression, Class, ClassElement, Declaration, ExportDefaultDeclarationKind,
    Expression, Function, FunctionBody, ImportDeclaration, ImportDeclarationSpecifier, Program,
    Statement, VariableDeclaration,
};
use oxc::parser::Parser;
use oxc::span::{GetSpan, SourceType, Span};

use super::{ComponentInfo, ExportKind, InstrumentError, InstrumentOptions};
use crate::core::{ComponentKind, SourceKind};

/// Everything the injector needs to know about one file.
#[derive(Debug)]
pub(super) struct Analysis {
    pub components: Vec<Component>,
    /// Offset the runtime import goes to (after hashbang and directives).
    pub import_at: u32,
    pub has_runtime_import: bool,
}

impl Analysis {
    pub fn into_infos(self) -> Vec<ComponentInfo> {
        self.components.into_iter().map(|c| c.info).collect()
    }
}

#[derive(Debug)]
pub(super) struct Component {
    pub info: ComponentInfo,
    pub body: Body,
    pub states: Vec<StateSite>,
}

/// Where the prologue of a component goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Body {
    /// Function body with braces; prologue after `{` and any directives.
    Block { prologue_at: u32 },
    /// Expression-bodied arrow; the expression is wrapped in a block.
    Expression { start: u32, end: u32 },
    /// Class body; prologue fields after `{`.
    Class { prologue_at: u32 },
}

/// A recognized state constructor call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct StateSite {
    pub name: String,
    pub init: Init,
    /// End of the declaring statement or class field.
    pub publish_at: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Init {
    /// First argument span.
    Arg { start: u32, end: u32 },
    /// No arguments; offset of the closing parenthesis.
    Empty { at: u32 },
}

pub(super) fn analyze(
    source: &str,
    path: &Path,
    kind: SourceKind,
    options: &InstrumentOptions,
) -> Result<Analysis, InstrumentError> {
    let allocator = Allocator::default();
    let source_type = match kind {
        SourceKind::Jsx => SourceType::jsx(),
        SourceKind::Tsx => SourceType::tsx(),
    }
    .with_module(true);

    let ret = Parser::new(&allocator, source, source_type).parse();
    if let Some(err) = ret.errors.first() {
        return Err(InstrumentError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        });
    }
    if ret.panicked {
        return Err(InstrumentError::Parse {
            path: path.to_path_buf(),
            message: "parser gave up".into(),
        });
    }

    let mut scanner = Scanner {
        source,
        options,
        components: Vec::new(),
        has_runtime_import: false,
    };
    scanner.program(&ret.program);

    Ok(Analysis {
        components: scanner.components,
        import_at: import_offset(&ret.program),
        has_runtime_import: scanner.has_runtime_import,
    })
}

fn import_offset(program: &Program) -> u32 {
    let hashbang = program.hashbang.as_ref().map_or(0, |h| h.span.end);
    let directive = program.directives.last().map_or(0, |d| d.span.end);
    hashbang.max(directive)
}

/// Component names start with an uppercase letter.
fn is_component_name(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

struct Scanner<'s> {
    source: &'s str,
    options: &'s InstrumentOptions,
    components: Vec<Component>,
    has_runtime_import: bool,
}

impl Scanner<'_> {
    fn text(&self, span: Span) -> &str {
        &self.source[span.start as usize..span.end as usize]
    }

    fn program(&mut self, program: &Program) {
        for stmt in &program.body {
            match stmt {
                Statement::ImportDeclaration(import) => self.import(import),
                Statement::FunctionDeclaration(func) => self.function(func, ExportKind::None),
                Statement::ClassDeclaration(class) => self.class(class, ExportKind::None),
                Statement::VariableDeclaration(var) => self.variables(var, ExportKind::None),
                Statement::ExportNamedDeclaration(export) => match &export.declaration {
                    Some(Declaration::FunctionDeclaration(func)) => {
                        self.function(func, ExportKind::Named)
                    }
                    Some(Declaration::ClassDeclaration(class)) => {
                        self.class(class, ExportKind::Named)
                    }
                    Some(Declaration::VariableDeclaration(var)) => {
                        self.variables(var, ExportKind::Named)
                    }
                    _ => {}
                },
                Statement::ExportDefaultDeclaration(export) => match &export.declaration {
                    ExportDefaultDeclarationKind::FunctionDeclaration(func) => {
                        self.function(func, ExportKind::Default)
                    }
                    ExportDefaultDeclarationKind::ClassDeclaration(class) => {
                        self.class(class, ExportKind::Default)
                    }
                    _ => {}
                },
                _ => {}
            }
        }
    }

    fn import(&mut self, import: &ImportDeclaration) {
        if import.source.value.as_str() != self.options.runtime_module {
            return;
        }
        let Some(specifiers) = &import.specifiers else {
            return;
        };
        self.has_runtime_import |= specifiers.iter().any(|spec| {
            matches!(spec, ImportDeclarationSpecifier::ImportNamespaceSpecifier(ns)
                if ns.local.name.as_str() == super::inject::NAMESPACE)
        });
    }

    /// `function Name() {}`; anonymous default exports are skipped since
    /// they have no name to register under.
    fn function(&mut self, func: &Function, export: ExportKind) {
        let Some(id) = &func.id else {
            return;
        };
        let name = id.name.as_str();
        if !is_component_name(name) {
            return;
        }
        let Some(body) = &func.body else {
            return;
        };
        let states = self.body_states(body);
        self.push(name, ComponentKind::Function, export, func.span, block(body), states);
    }

    /// `const Name = () => ..` and `const Name = function () {..}`.
    fn variables(&mut self, var: &VariableDeclaration, export: ExportKind) {
        for declarator in &var.declarations {
            let Some(id) = declarator.id.get_binding_identifier() else {
                continue;
            };
            let name = id.name.as_str();
            if !is_component_name(name) {
                continue;
            }
            match &declarator.init {
                Some(Expression::ArrowFunctionExpression(arrow)) => {
                    if arrow.expression {
                        let Some(expr) = arrow.body.statements.first() else {
                            continue;
                        };
                        let span = expr.span();
                        let body = Body::Expression {
                            start: span.start,
                            end: span.end,
                        };
                        self.push(name, ComponentKind::Function, export, declarator.span, body, Vec::new());
                    } else {
                        let states = self.body_states(&arrow.body);
                        let body = block(&arrow.body);
                        self.push(name, ComponentKind::Function, export, declarator.span, body, states);
                    }
                }
                Some(Expression::FunctionExpression(func)) => {
                    if let Some(body) = &func.body {
                        let states = self.body_states(body);
                        self.push(name, ComponentKind::Function, export, declarator.span, block(body), states);
                    }
                }
                _ => {}
            }
        }
    }

    /// Classes count as components when they declare the build method.
    fn class(&mut self, class: &Class, export: ExportKind) {
        let Some(id) = &class.id else {
            return;
        };
        let name = id.name.as_str();
        let build = self.options.build_method.as_str();
        let mut has_build = false;
        let mut states = Vec::new();

        for element in &class.body.body {
            match element {
                ClassElement::MethodDefinition(method) => {
                    if !method.r#static && !method.computed && self.text(method.key.span()) == build {
                        has_build = true;
                    }
                }
                ClassElement::PropertyDefinition(prop) => {
                    if prop.r#static || prop.computed {
                        continue;
                    }
                    let key = self.text(prop.key.span());
                    match &prop.value {
                        Some(
                            Expression::ArrowFunctionExpression(_) | Expression::FunctionExpression(_),
                        ) if key == build => has_build = true,
                        Some(Expression::CallExpression(call)) if is_identifier(key) => {
                            if let Some(init) = self.state_init(call) {
                                states.push(StateSite {
                                    name: key.to_string(),
                                    init,
                                    publish_at: prop.span.end,
                                });
                            }
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
        }

        if !has_build {
            return;
        }
        let body = Body::Class {
            prologue_at: class.body.span.start + 1,
        };
        self.push(name, ComponentKind::Class, export, class.span, body, states);
    }

    /// State declarations among the top-level statements of a body.
    fn body_states(&self, body: &FunctionBody) -> Vec<StateSite> {
        let mut states = Vec::new();
        for stmt in &body.statements {
            let Statement::VariableDeclaration(var) = stmt else {
                continue;
            };
            for declarator in &var.declarations {
                let Some(id) = declarator.id.get_binding_identifier() else {
                    continue;
                };
                if let Some(Expression::CallExpression(call)) = &declarator.init
                    && let Some(init) = self.state_init(call)
                {
                    states.push(StateSite {
                        name: id.name.to_string(),
                        init,
                        publish_at: var.span.end,
                    });
                }
            }
        }
        states
    }

    fn state_init(&self, call: &CallExpression) -> Option<Init> {
        let Expression::Identifier(callee) = &call.callee else {
            return None;
        };
        if !self.options.is_state_constructor(callee.name.as_str()) {
            return None;
        }
        match call.arguments.first() {
            None => Some(Init::Empty {
                at: call.span.end.saturating_sub(1),
            }),
            Some(Argument::SpreadElement(_)) => None,
            Some(arg) => {
                let span = arg.span();
                Some(Init::Arg {
                    start: span.start,
                    end: span.end,
                })
            }
        }
    }

    fn push(
        &mut self,
        name: &str,
        kind: ComponentKind,
        export: ExportKind,
        span: Span,
        body: Body,
        states: Vec<StateSite>,
    ) {
        let info = ComponentInfo {
            name: name.to_string(),
            kind,
            export,
            source: self.text(span).to_string(),
            state: states.iter().map(|s| s.name.clone()).collect(),
        };
        self.components.push(Component { info, body, states });
    }
}

fn block(body: &FunctionBody) -> Body {
    let prologue_at = body
        .directives
        .last()
        .map_or(body.span.start + 1, |d| d.span.end);
    Body::Block { prologue_at }
}
