//! Field values held by component instances.

use std::fmt;

use super::effect::Effect;

/// Value of an instance field.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<Value>),
    /// Live reactive object; never copied across instances.
    Effect(Effect),
}

impl Value {
    #[inline]
    pub fn is_effect(&self) -> bool {
        matches!(self, Self::Effect(_))
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_effect(&self) -> Option<&Effect> {
        match self {
            Self::Effect(e) => Some(e),
            _ => None,
        }
    }

    /// Whether this value, or anything nested in it, is an effect.
    pub fn contains_effect(&self) -> bool {
        match self {
            Self::Effect(_) => true,
            Self::List(items) => items.iter().any(Value::contains_effect),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Effect> for Value {
    fn from(e: Effect) -> Self {
        Self::Effect(e)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Effect(e) => write!(f, "<effect {}>", e.label()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Value::from(3).to_string(), "3");
        assert_eq!(Value::from("hi").to_string(), "hi");
        let list = Value::List(vec![Value::Null, Value::from(true)]);
        assert_eq!(list.to_string(), "[null, true]");
    }

    #[test]
    fn test_contains_effect() {
        let nested = Value::List(vec![Value::from(1), Value::from(Effect::new("e"))]);
        assert!(nested.contains_effect());
        assert!(!nested.is_effect());
        assert!(!Value::from(1).contains_effect());
    }
}
