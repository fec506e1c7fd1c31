//! Views produced by component build functions.

/// A description of the UI a component wants, diffed against the previous
/// one by the host on patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        children: Vec<View>,
    },
    Text(String),
}

impl View {
    pub fn element(tag: impl Into<String>) -> Self {
        Self::Element {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Add an attribute; ignored on text views.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let Self::Element { attrs, .. } = &mut self {
            attrs.push((name.into(), value.into()));
        }
        self
    }

    /// Add a child; ignored on text views.
    pub fn child(mut self, child: View) -> Self {
        if let Self::Element { children, .. } = &mut self {
            children.push(child);
        }
        self
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Element { tag, .. } => Some(tag),
            Self::Text(_) => None,
        }
    }

    pub fn children(&self) -> &[View] {
        match self {
            Self::Element { children, .. } => children,
            Self::Text(_) => &[],
        }
    }

    /// Whether `other` can be patched onto the node rendered from `self`.
    pub fn same_shape(&self, other: &View) -> bool {
        match (self, other) {
            (Self::Text(_), Self::Text(_)) => true,
            (Self::Element { tag: a, .. }, Self::Element { tag: b, .. }) => a == b,
            _ => false,
        }
    }
}
