//! Component declarations and the module exports carrying them.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use super::instance::Instance;
use super::value::Value;
use super::view::View;
use crate::core::{ComponentKind, DeclarationKey};

/// Produces the initial value of a field.
pub type FieldInit = Rc<dyn Fn() -> Value>;

/// The component's build (render) function.
pub type BuildFn = Rc<dyn Fn(&Instance) -> View>;

/// How a field takes part in a hot update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Preserved: restored from the snapshot and migrated on soft update.
    State,
    /// Re-created fresh in every instance, never copied.
    Effect,
    /// Owned by the framework, never copied.
    Intrinsic,
}

/// One declared instance field.
#[derive(Clone)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub init: FieldInit,
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// A component declaration as loaded from a module.
pub struct Declaration {
    key: DeclarationKey,
    name: String,
    module: String,
    kind: ComponentKind,
    source: String,
    fields: Vec<FieldSpec>,
    build: BuildFn,
}

impl Declaration {
    /// Start a function-shaped declaration.
    pub fn function(
        module: impl Into<String>,
        name: impl Into<String>,
        source: impl Into<String>,
    ) -> DeclarationBuilder {
        DeclarationBuilder::new(ComponentKind::Function, module.into(), name.into(), source.into())
    }

    /// Start a class-shaped declaration.
    pub fn class(
        module: impl Into<String>,
        name: impl Into<String>,
        source: impl Into<String>,
    ) -> DeclarationBuilder {
        DeclarationBuilder::new(ComponentKind::Class, module.into(), name.into(), source.into())
    }

    #[inline]
    pub fn key(&self) -> DeclarationKey {
        self.key
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn module(&self) -> &str {
        &self.module
    }

    #[inline]
    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    /// Declaration source text, compared by the classifier.
    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[inline]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether any field is preserved across updates.
    pub fn has_state(&self) -> bool {
        self.fields.iter().any(|f| f.kind == FieldKind::State)
    }

    pub fn build(&self, instance: &Instance) -> View {
        (self.build)(instance)
    }
}

impl fmt::Debug for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Declaration")
            .field("key", &self.key)
            .field("name", &self.name)
            .field("module", &self.module)
            .field("kind", &self.kind)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Declaration`].
pub struct DeclarationBuilder {
    kind: ComponentKind,
    module: String,
    name: String,
    source: String,
    fields: Vec<FieldSpec>,
}

impl DeclarationBuilder {
    fn new(kind: ComponentKind, module: String, name: String, source: String) -> Self {
        Self {
            kind,
            module,
            name,
            source,
            fields: Vec::new(),
        }
    }

    fn field(mut self, name: impl Into<String>, kind: FieldKind, init: FieldInit) -> Self {
        let name = name.into();
        self.fields.retain(|f| f.name != name);
        self.fields.push(FieldSpec { name, kind, init });
        self
    }

    /// A preserved state field with its default value.
    pub fn state(self, name: impl Into<String>, init: impl Fn() -> Value + 'static) -> Self {
        self.field(name, FieldKind::State, Rc::new(init))
    }

    /// A reactive effect created fresh for every instance.
    pub fn effect(self, name: impl Into<String>) -> Self {
        self.field(name, FieldKind::Effect, Rc::new(|| Value::Null))
    }

    /// A framework-owned field.
    pub fn intrinsic(self, name: impl Into<String>, init: impl Fn() -> Value + 'static) -> Self {
        self.field(name, FieldKind::Intrinsic, Rc::new(init))
    }

    pub fn build(self, build: impl Fn(&Instance) -> View + 'static) -> Rc<Declaration> {
        Rc::new(Declaration {
            key: DeclarationKey::new(&self.module, &self.name),
            name: self.name,
            module: self.module,
            kind: self.kind,
            source: self.source,
            fields: self.fields,
            build: Rc::new(build),
        })
    }
}

/// The exported surface of a freshly loaded module.
#[derive(Debug, Clone)]
pub struct ModuleExports {
    path: String,
    named: IndexMap<String, Rc<Declaration>>,
    default: Option<Rc<Declaration>>,
}

impl ModuleExports {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            named: IndexMap::new(),
            default: None,
        }
    }

    pub fn export(mut self, decl: Rc<Declaration>) -> Self {
        self.named.insert(decl.name().to_string(), decl);
        self
    }

    pub fn export_default(mut self, decl: Rc<Declaration>) -> Self {
        self.default = Some(decl);
        self
    }

    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Named export `name`, falling back to a default export of that name.
    pub fn get(&self, name: &str) -> Option<&Rc<Declaration>> {
        self.named
            .get(name)
            .or_else(|| self.default.as_ref().filter(|d| d.name() == name))
    }

    pub fn declarations(&self) -> impl Iterator<Item = &Rc<Declaration>> {
        self.named.values().chain(self.default.iter())
    }
}
