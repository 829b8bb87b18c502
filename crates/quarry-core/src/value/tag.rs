use serde::Serialize;
use std::fmt;

///
/// ValueTag
///
/// Runtime type tag captured next to a literal at construction time.
/// Adapters use it to coerce the literal on their side.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueTag {
    Null,
    Bool,
    Int,
    Uint,
    Float64,
    Text,
    List,
    Map,
}

impl ValueTag {
    /// Stable lowercase label for diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Uint => "uint",
            Self::Float64 => "float64",
            Self::Text => "text",
            Self::List => "list",
            Self::Map => "map",
        }
    }
}

impl fmt::Display for ValueTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
