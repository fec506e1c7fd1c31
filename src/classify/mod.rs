//! Diff Classifier
//!
//! Decides whether an edit to a component declaration only touched its view
//! (`render-only`) or anything else (`structural`).
//!
//! # Pipeline
//!
//! ```text
//! source -> oxc parse -> mask view regions -> reprint without comments
//!                                               |
//!        old skeleton == new skeleton ? render-only : structural
//! ```
//!
//! The comparison is over reprinted text, not a tree diff. It produces false
//! `structural` verdicts (harmless: the instance is remounted) but must never
//! produce a false `render-only`, which would keep state the new code no
//! longer matches. Every parse or extraction failure therefore maps to
//! `structural`.

mod extract;
mod print;

pub use print::strip_comments;

use oxc::allocator::Allocator;
use thiserror::Error;

pub use crate::core::{Classification, ComponentKind};

/// Default name of the class-shaped build method.
pub const DEFAULT_BUILD_METHOD: &str = "render";

/// Reasons the view regions of a declaration could not be located.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("no component body found")]
    NoBody,

    #[error("build method `{0}` not found")]
    MissingBuildMethod(String),

    #[error("build method declared more than once")]
    AmbiguousBuildMethod,
}

/// Classifies old/new declaration pairs.
#[derive(Debug, Clone)]
pub struct Classifier {
    build_method: String,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(DEFAULT_BUILD_METHOD)
    }
}

impl Classifier {
    pub fn new(build_method: impl Into<String>) -> Self {
        Self {
            build_method: build_method.into(),
        }
    }

    pub fn build_method(&self) -> &str {
        &self.build_method
    }

    /// Classify an edit from `old` to `new`.
    pub fn classify(&self, old: &str, new: &str, kind: ComponentKind) -> Classification {
        match (self.skeleton(old, kind), self.skeleton(new, kind)) {
            (Ok(a), Ok(b)) if a == b => Classification::RenderOnly,
            (Ok(_), Ok(_)) => Classification::Structural,
            (Err(e), _) | (_, Err(e)) => {
                crate::debug!("classify"; "extraction failed, treating as structural: {}", e);
                Classification::Structural
            }
        }
    }

    /// The declaration reprinted without comments, view regions masked.
    ///
    /// Two versions with equal skeletons differ only inside their views.
    pub fn skeleton(&self, source: &str, kind: ComponentKind) -> Result<String, ExtractError> {
        let allocator = Allocator::default();
        let program = print::parse(&allocator, source)?;
        let masks = match kind {
            ComponentKind::Function => extract::function_masks(&program)?,
            ComponentKind::Class => {
                if self.build_method.is_empty() {
                    return Err(ExtractError::MissingBuildMethod(String::new()));
                }
                extract::class_masks(&program, source, &self.build_method)?
            }
        };
        print::strip_comments(&extract::apply(source, &masks))
    }
}

/// Classify with the default build method name.
pub fn classify(old: &str, new: &str, kind: ComponentKind) -> Classification {
    Classifier::default().classify(old, new, kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    const COUNTER: &str = r#"export function Counter() {
  const count = signal(0);
  return <button onClick={() => count.set(count() + 1)}>{count()}</button>;
}"#;

    #[test]
    fn test_view_change_is_render_only() {
        let new = COUNTER.replace("{count()}</button>", "Clicked {count()} times</button>");
        assert_eq!(
            classify(COUNTER, &new, ComponentKind::Function),
            Classification::RenderOnly
        );
    }

    #[test]
    fn test_identical_sources_are_render_only() {
        assert_eq!(
            classify(COUNTER, COUNTER, ComponentKind::Function),
            Classification::RenderOnly
        );
    }

    #[test]
    fn test_comment_edits_are_render_only() {
        let new = COUNTER.replace("const count", "// the counter\n  const count");
        let new = new.replace("signal(0);", "signal(0); /* default */");
        assert_eq!(
            classify(COUNTER, &new, ComponentKind::Function),
            Classification::RenderOnly
        );
    }

    #[test]
    fn test_state_default_change_is_structural() {
        let new = COUNTER.replace("signal(0)", "signal(10)");
        assert_eq!(
            classify(COUNTER, &new, ComponentKind::Function),
            Classification::Structural
        );
    }

    #[test]
    fn test_new_statement_is_structural() {
        let new = COUNTER.replace(
            "  return",
            "  effect(() => console.log(count()));\n  return",
        );
        assert_eq!(
            classify(COUNTER, &new, ComponentKind::Function),
            Classification::Structural
        );
    }

    #[test]
    fn test_signature_change_is_structural() {
        let new = COUNTER.replace("Counter()", "Counter(props)");
        assert_eq!(
            classify(COUNTER, &new, ComponentKind::Function),
            Classification::Structural
        );
    }

    #[test]
    fn test_code_after_return_without_semicolon_is_compared() {
        let old = "function App() {\n  return <a/>\n  function init() { return 1 }\n}";
        let new = "function App() {\n  return <a/>\n  function init() { return 2 }\n}";
        assert_eq!(
            classify(old, new, ComponentKind::Function),
            Classification::Structural
        );
    }

    #[test]
    fn test_extraction_failure_is_structural() {
        let broken = "export function Counter() {\n  const count = signal(0;\n  return <b/>;\n}";
        assert_eq!(
            classify(broken, broken, ComponentKind::Function),
            Classification::Structural
        );
        assert_eq!(
            classify(COUNTER, broken, ComponentKind::Function),
            Classification::Structural
        );
        let open_comment = "function App() { /* oops\n return 1; }";
        assert_eq!(
            classify(open_comment, open_comment, ComponentKind::Function),
            Classification::Structural
        );
    }

    #[test]
    fn test_class_render_change_is_render_only() {
        let old = "class Counter extends Component {\n  count = signal(0);\n  render() {\n    return <b>{this.count()}</b>;\n  }\n}";
        let new = old.replace("<b>", "<i>").replace("</b>", "</i>");
        assert_eq!(
            classify(old, &new, ComponentKind::Class),
            Classification::RenderOnly
        );
    }

    #[test]
    fn test_class_field_change_is_structural() {
        let old = "class Counter extends Component {\n  count = signal(0);\n  render() {\n    return <b/>;\n  }\n}";
        let new = old.replace("signal(0)", "signal(1)");
        assert_eq!(
            classify(old, &new, ComponentKind::Class),
            Classification::Structural
        );
    }

    #[test]
    fn test_custom_build_method() {
        let old = "class Card extends Widget {\n  build() { return 1; }\n}";
        let new = "class Card extends Widget {\n  build() { return 2; }\n}";
        let classifier = Classifier::new("build");
        assert_eq!(
            classifier.classify(old, new, ComponentKind::Class),
            Classification::RenderOnly
        );
        // default method name is `render`, so extraction fails
        assert_eq!(
            classify(old, new, ComponentKind::Class),
            Classification::Structural
        );
    }

    #[test]
    fn test_layout_edits_are_render_only() {
        let new = COUNTER.replace("const count = signal(0);", "const count = signal( 0 )");
        assert_eq!(
            classify(COUNTER, &new, ComponentKind::Function),
            Classification::RenderOnly
        );
    }

    fn state_edit(old: &str, kind: ComponentKind) -> Classification {
        classify(old, &old.replace("signal(0)", "signal(5)"), kind)
    }

    #[test]
    fn test_return_word_in_jsx_text_keeps_siblings_compared() {
        let old = "function App() {\n  const a = <p>return home</p>, count = signal(0);\n  return a;\n}";
        assert_eq!(state_edit(old, ComponentKind::Function), Classification::Structural);
    }

    #[test]
    fn test_slashes_in_jsx_text_are_not_comments() {
        let old = "function App() {\n  const a = <a>http://x</a>, count = signal(0);\n  return a;\n}";
        assert_eq!(state_edit(old, ComponentKind::Function), Classification::Structural);

        let new = old.replace("http://x", "http://y");
        assert_eq!(classify(old, &new, ComponentKind::Function), Classification::Structural);
    }

    #[test]
    fn test_class_build_property_masks_only_itself() {
        let old = "class Clock extends Component {\n  render = this.draw;\n  setup = () => { this.count = signal(0); };\n}";
        assert_eq!(state_edit(old, ComponentKind::Class), Classification::Structural);

        let arrow = "class Clock extends Component {\n  render = () => <b>1</b>;\n  count = signal(0);\n}";
        let new = arrow.replace("<b>1</b>", "<b>2</b>");
        assert_eq!(classify(arrow, &new, ComponentKind::Class), Classification::RenderOnly);
    }

    #[test]
    fn test_typed_declaration() {
        let old = "function Card(props: { title: string }) {\n  return <h2>{props.title}</h2>;\n}";
        let new = old.replace("<h2>", "<h3>").replace("</h2>", "</h3>");
        assert_eq!(classify(old, &new, ComponentKind::Function), Classification::RenderOnly);
    }

    #[test]
    fn test_skeleton_masks_view() {
        let skeleton = Classifier::default()
            .skeleton(COUNTER, ComponentKind::Function)
            .unwrap();
        assert!(skeleton.contains("signal(0)"));
        assert!(!skeleton.contains("<button"));
    }
}
