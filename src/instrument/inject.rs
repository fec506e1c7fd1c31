//! Generated code fragments.

use super::edit::Insertions;
use super::scan::{Body, Component, Init, StateSite};

/// Local name of the runtime namespace import.
pub const NAMESPACE: &str = "__hmr";

/// Binding holding the node currently being constructed.
pub const NODE: &str = "__hmr_node";

/// JSON string literal, used for every user-controlled name.
fn quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\""))
}

pub fn import(runtime_module: &str, after_prologue: bool) -> String {
    let line = format!("import * as {NAMESPACE} from {};", quote(runtime_module));
    if after_prologue {
        format!("\n{line}")
    } else {
        format!("{line}\n")
    }
}

pub fn accept_footer() -> String {
    format!(
        "\nif (import.meta.hot) {{\n  \
           import.meta.hot.accept((mod) => {{\n    \
             const reason = {NAMESPACE}.manager.update(mod, import.meta.url);\n    \
             if (reason) import.meta.hot.invalidate(reason);\n  \
           }});\n\
         }}\n"
    )
}

/// Queue every insertion for one component.
pub fn component(edits: &mut Insertions, component: &Component) {
    let name = quote(&component.info.name);
    let is_class = matches!(component.body, Body::Class { .. });
    let node = if is_class {
        format!("this.{NODE}")
    } else {
        NODE.to_string()
    };

    match component.body {
        Body::Block { prologue_at } => {
            edits.insert(
                prologue_at,
                format!(
                    "\nconst {NODE} = {NAMESPACE}.current();\n\
                     {NAMESPACE}.register({NODE}, {name}, import.meta.url);"
                ),
            );
        }
        Body::Expression { start, end } => {
            edits.insert(
                start,
                format!(
                    "{{\nconst {NODE} = {NAMESPACE}.current();\n\
                     {NAMESPACE}.register({NODE}, {name}, import.meta.url);\nreturn ("
                ),
            );
            edits.insert(end, ");\n}");
        }
        Body::Class { prologue_at } => {
            edits.insert(
                prologue_at,
                format!(
                    "\n{NODE} = {NAMESPACE}.current();\n\
                     __hmr_registered = {NAMESPACE}.register(this.{NODE}, {name}, import.meta.url);"
                ),
            );
        }
    }

    for site in &component.states {
        restore(edits, site, &node);
    }

    if let Some(publish_at) = component.states.iter().map(|s| s.publish_at).max() {
        edits.insert(publish_at, publish(&component.states, is_class));
    }
}

fn restore(edits: &mut Insertions, site: &StateSite, node: &str) {
    let key = quote(&site.name);
    match site.init {
        Init::Arg { start, end } => {
            edits.insert(start, format!("{NAMESPACE}.restore({node}, {key}, () => ("));
            edits.insert(end, "))");
        }
        Init::Empty { at } => {
            edits.insert(at, format!("{NAMESPACE}.restore({node}, {key}, () => undefined)"));
        }
    }
}

/// Deferred publication of the live state getters.
fn publish(states: &[StateSite], is_class: bool) -> String {
    if is_class {
        let getters = states
            .iter()
            .map(|s| format!("get {0}() {{ return self.{0}; }}", s.name))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "\n__hmr_publish = ((self) => queueMicrotask(() => {{ \
             self.{NODE}.$state = {{ {getters} }}; }}))(this);"
        )
    } else {
        let getters = states
            .iter()
            .map(|s| format!("get {0}() {{ return {0}; }}", s.name))
            .collect::<Vec<_>>()
            .join(", ");
        format!("\nqueueMicrotask(() => {{ {NODE}.$state = {{ {getters} }}; }});")
    }
}
