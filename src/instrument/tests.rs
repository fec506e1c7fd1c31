use std::path::Path;

use oxc::allocator::Allocator;
use oxc::parser::Parser;
use oxc::span::SourceType;

use super::*;

const COUNTER: &str = r#"import { signal } from "ui";

export function Counter() {
  const count = signal(0);
  return <button onClick={() => count.set(count() + 1)}>{count()}</button>;
}
"#;

fn dev() -> InstrumentOptions {
    InstrumentOptions::default()
}

/// Instrumented output must still be valid module code.
fn assert_parses(code: &str, tsx: bool) {
    let allocator = Allocator::default();
    let source_type = if tsx { SourceType::tsx() } else { SourceType::jsx() }.with_module(true);
    let ret = Parser::new(&allocator, code, source_type).parse();
    assert!(
        ret.errors.is_empty(),
        "output does not parse: {:?}\n{code}",
        ret.errors.iter().map(|e| e.to_string()).collect::<Vec<_>>()
    );
}

#[test]
fn test_function_component_injections() {
    let out = instrument(COUNTER, Path::new("src/Counter.jsx"), &dev()).unwrap();
    assert!(out.injected);
    let code = &out.code;

    assert!(code.starts_with("import * as __hmr from \"hotpatch/runtime\";\n"));
    assert!(code.contains("const __hmr_node = __hmr.current();"));
    assert!(code.contains("__hmr.register(__hmr_node, \"Counter\", import.meta.url);"));
    assert!(code.contains("signal(__hmr.restore(__hmr_node, \"count\", () => (0)))"));
    assert!(code.contains("__hmr_node.$state = { get count() { return count; } };"));
    assert!(code.contains("import.meta.hot.accept"));

    // binding and registration precede state initialization
    let register = code.find("__hmr.register").unwrap();
    let state = code.find("__hmr.restore").unwrap();
    assert!(register < state);

    // publication comes after the last state declaration, before the view
    let publish = code.find("queueMicrotask").unwrap();
    assert!(publish > state);
    assert!(publish < code.find("return <button").unwrap());

    assert_parses(code, false);
}

#[test]
fn test_user_code_is_preserved() {
    let out = instrument(COUNTER, Path::new("Counter.jsx"), &dev()).unwrap();
    assert!(out.code.contains("return <button onClick={() => count.set(count() + 1)}>{count()}</button>;"));
    assert!(out.code.contains("import { signal } from \"ui\";"));
}

#[test]
fn test_production_is_untouched() {
    let options = InstrumentOptions {
        mode: BuildMode::Production,
        ..dev()
    };
    let out = instrument(COUNTER, Path::new("Counter.jsx"), &options).unwrap();
    assert!(!out.injected);
    assert_eq!(out.code, COUNTER);
}

#[test]
fn test_ungated_file_is_untouched() {
    let out = instrument("const a = /x/;", Path::new("style.css"), &dev()).unwrap();
    assert!(!out.injected);
    assert_eq!(out.code, "const a = /x/;");

    // .js parses as JSX but is not in the default allow-list
    let out = instrument(COUNTER, Path::new("Counter.js"), &dev()).unwrap();
    assert!(!out.injected);
}

#[test]
fn test_file_without_components_is_untouched() {
    let source = "export function helper() { return 1; }\nexport const VALUE = 2;\n";
    let out = instrument(source, Path::new("util.jsx"), &dev()).unwrap();
    assert!(!out.injected);
    assert_eq!(out.code, source);
}

#[test]
fn test_expression_arrow_becomes_block() {
    let source = "export const Hello = ({ name }) => <p>Hello {name}</p>;\n";
    let out = instrument(source, Path::new("Hello.jsx"), &dev()).unwrap();
    assert!(out.code.contains("=> {\nconst __hmr_node = __hmr.current();"));
    assert!(out.code.contains("return (<p>Hello {name}</p>);\n}"));
    assert_parses(&out.code, false);
}

#[test]
fn test_block_arrow_and_function_expression() {
    let source = r#"const Panel = () => {
  const open = state(false);
  const items = reactive();
  return <div hidden={!open()}>{items.length}</div>;
};
const Footer = function () {
  return <footer />;
};
export default Panel;
"#;
    let out = instrument(source, Path::new("Panel.jsx"), &dev()).unwrap();
    let names: Vec<_> = out.components.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Panel", "Footer"]);
    assert_eq!(out.components[0].state, ["open", "items"]);
    assert!(out.code.contains("state(__hmr.restore(__hmr_node, \"open\", () => (false)))"));
    assert!(out.code.contains("reactive(__hmr.restore(__hmr_node, \"items\", () => undefined))"));
    assert!(out.code.contains("get open() { return open; }, get items() { return items; }"));
    assert!(out.code.contains("__hmr.register(__hmr_node, \"Footer\", import.meta.url);"));
    assert_parses(&out.code, false);
}

#[test]
fn test_class_component() {
    let source = r#"export class Clock extends Component {
  ticks = signal(0)
  label = "clock";
  render() {
    return <time>{this.ticks()}</time>;
  }
}
"#;
    let out = instrument(source, Path::new("Clock.jsx"), &dev()).unwrap();
    assert_eq!(out.components.len(), 1);
    assert_eq!(out.components[0].kind, ComponentKind::Class);
    assert_eq!(out.components[0].state, ["ticks"]);
    let code = &out.code;
    assert!(code.contains("__hmr_node = __hmr.current();"));
    assert!(code.contains("__hmr.register(this.__hmr_node, \"Clock\", import.meta.url);"));
    assert!(code.contains("signal(__hmr.restore(this.__hmr_node, \"ticks\", () => (0)))"));
    assert!(code.contains("get ticks() { return self.ticks; }"));
    assert_parses(code, false);
}

#[test]
fn test_class_without_build_method_is_ignored() {
    let source = "export class Store {\n  items = signal([]);\n}\n";
    let out = instrument(source, Path::new("store.jsx"), &dev()).unwrap();
    assert!(!out.injected);
}

#[test]
fn test_custom_build_method_and_constructors() {
    let options = InstrumentOptions {
        build_method: "build".into(),
        state_constructors: vec!["useState".into()],
        ..dev()
    };
    let source = "export class Card extends Widget {\n  n = useState(1);\n  build() { return <b/>; }\n}\n";
    let out = instrument(source, Path::new("Card.jsx"), &options).unwrap();
    assert_eq!(out.components[0].state, ["n"]);
    assert!(out.code.contains("useState(__hmr.restore(this.__hmr_node, \"n\", () => (1)))"));
}

#[test]
fn test_existing_runtime_import_is_reused() {
    let source = format!("import * as __hmr from \"hotpatch/runtime\";\n{COUNTER}");
    let out = instrument(&source, Path::new("Counter.jsx"), &dev()).unwrap();
    assert_eq!(out.code.matches("import * as __hmr").count(), 1);
    assert_parses(&out.code, false);
}

#[test]
fn test_import_goes_after_directives() {
    let source = format!("\"use client\";\n{COUNTER}");
    let out = instrument(&source, Path::new("Counter.jsx"), &dev()).unwrap();
    assert!(out.code.starts_with("\"use client\""));
    assert!(out.code.find("import * as __hmr").unwrap() > 0);
    assert_parses(&out.code, false);
}

#[test]
fn test_footer_can_be_disabled() {
    let options = InstrumentOptions {
        accept_footer: false,
        ..dev()
    };
    let out = instrument(COUNTER, Path::new("Counter.jsx"), &options).unwrap();
    assert!(!out.code.contains("import.meta.hot"));
}

#[test]
fn test_typescript_generic_state() {
    let source = r#"export function Typed(props: { step: number }) {
  const total = signal<number>();
  return <span>{total() + props.step}</span>;
}
"#;
    let out = instrument(source, Path::new("Typed.tsx"), &dev()).unwrap();
    assert!(out.code.contains("signal<number>(__hmr.restore(__hmr_node, \"total\", () => undefined))"));
    assert_parses(&out.code, true);
}

#[test]
fn test_parse_error() {
    let err = instrument("export function Broken( {", Path::new("Broken.jsx"), &dev()).unwrap_err();
    assert!(matches!(err, InstrumentError::Parse { .. }));
}

#[test]
fn test_scan_reports_declarations() {
    let source = r#"function Local() { return <i/>; }
export default function Page() {
  const title = ref("home");
  return <h1>{title.value}</h1>;
}
"#;
    let infos = scan(source, Path::new("Page.jsx"), &dev()).unwrap();
    assert_eq!(infos.len(), 2);
    assert_eq!(infos[0].name, "Local");
    assert_eq!(infos[0].export, ExportKind::None);
    assert_eq!(infos[1].name, "Page");
    assert_eq!(infos[1].export, ExportKind::Default);
    assert_eq!(infos[1].state, ["title"]);
    assert!(infos[1].source.starts_with("function Page()"));
    assert_eq!(infos[1].key("src/Page.jsx"), DeclarationKey::new("src/Page.jsx", "Page"));
}

#[test]
fn test_anonymous_default_export_is_skipped() {
    let source = "export default function () { return <p/>; }\n";
    let infos = scan(source, Path::new("anon.jsx"), &dev()).unwrap();
    assert!(infos.is_empty());
}

#[test]
fn test_scan_rejects_ungated_file() {
    let err = scan("", Path::new("a.css"), &dev()).unwrap_err();
    assert!(matches!(err, InstrumentError::Unsupported(_)));
}

#[test]
fn test_scanned_source_feeds_classifier() {
    let infos = scan(COUNTER, Path::new("Counter.jsx"), &dev()).unwrap();
    let edited = COUNTER.replace("{count()}</button>", "Count: {count()}</button>");
    let next = scan(&edited, Path::new("Counter.jsx"), &dev()).unwrap();
    assert_eq!(
        crate::classify::classify(&infos[0].source, &next[0].source, infos[0].kind),
        crate::core::Classification::RenderOnly
    );
}
