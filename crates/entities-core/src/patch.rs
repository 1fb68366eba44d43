//! # JSON Patch Documents
//!
//! An ordered list of RFC 6902 operations targeting an entity. Construction
//! validates structure only: the operation name is known, every pointer is a
//! well-formed JSON Pointer (RFC 6901), and each operation carries the
//! members it needs. Whether the operations can be applied to a particular
//! entity is the backend's concern.
//!
//! ```text
//! [
//!   { "op": "replace", "path": "/firstname", "value": "Dave" }
//! ]
//! ```

use serde_json::Value;

use crate::error::PatchError;

/// A validated JSON Pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPointer {
    raw: String,
    tokens: Vec<String>,
}

impl JsonPointer {
    /// Parse a JSON Pointer, unescaping `~1` to `/` and `~0` to `~`.
    pub fn parse(raw: &str) -> Result<Self, PatchError> {
        if raw.is_empty() {
            return Ok(Self {
                raw: String::new(),
                tokens: Vec::new(),
            });
        }
        let Some(rest) = raw.strip_prefix('/') else {
            return Err(PatchError::InvalidPointer(raw.to_string()));
        };

        let mut tokens = Vec::new();
        for segment in rest.split('/') {
            let mut token = String::with_capacity(segment.len());
            let mut chars = segment.chars();
            while let Some(c) = chars.next() {
                if c != '~' {
                    token.push(c);
                    continue;
                }
                match chars.next() {
                    Some('0') => token.push('~'),
                    Some('1') => token.push('/'),
                    _ => return Err(PatchError::InvalidEscape(raw.to_string())),
                }
            }
            tokens.push(token);
        }

        Ok(Self {
            raw: raw.to_string(),
            tokens,
        })
    }

    /// The pointer exactly as supplied.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Unescaped reference tokens. Empty for the whole-document pointer.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Whether this pointer refers to the whole document.
    pub fn is_root(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl std::fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// One RFC 6902 operation.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchOperation {
    Add { path: JsonPointer, value: Value },
    Remove { path: JsonPointer },
    Replace { path: JsonPointer, value: Value },
    Move { from: JsonPointer, path: JsonPointer },
    Copy { from: JsonPointer, path: JsonPointer },
    Test { path: JsonPointer, value: Value },
}

impl PatchOperation {
    /// Build an operation from its wire members.
    ///
    /// `value` is required by `add`, `replace` and `test`; `from` by `move`
    /// and `copy`. Members an operation does not use are ignored.
    pub fn parse(
        op: &str,
        path: &str,
        from: Option<&str>,
        value: Option<Value>,
    ) -> Result<Self, PatchError> {
        let path = JsonPointer::parse(path)?;
        let require_value = |name: &'static str, value: Option<Value>| {
            value.ok_or(PatchError::MissingMember {
                op: name,
                member: "value",
            })
        };
        let require_from = |name: &'static str| match from {
            Some(f) => JsonPointer::parse(f),
            None => Err(PatchError::MissingMember {
                op: name,
                member: "from",
            }),
        };

        match op {
            "add" => Ok(Self::Add {
                path,
                value: require_value("add", value)?,
            }),
            "remove" => Ok(Self::Remove { path }),
            "replace" => Ok(Self::Replace {
                path,
                value: require_value("replace", value)?,
            }),
            "move" => Ok(Self::Move {
                from: require_from("move")?,
                path,
            }),
            "copy" => Ok(Self::Copy {
                from: require_from("copy")?,
                path,
            }),
            "test" => Ok(Self::Test {
                path,
                value: require_value("test", value)?,
            }),
            other => Err(PatchError::UnknownOperation(other.to_string())),
        }
    }

    /// The wire name of this operation.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Remove { .. } => "remove",
            Self::Replace { .. } => "replace",
            Self::Move { .. } => "move",
            Self::Copy { .. } => "copy",
            Self::Test { .. } => "test",
        }
    }

    /// The target location of this operation.
    pub fn path(&self) -> &JsonPointer {
        match self {
            Self::Add { path, .. }
            | Self::Remove { path }
            | Self::Replace { path, .. }
            | Self::Move { path, .. }
            | Self::Copy { path, .. }
            | Self::Test { path, .. } => path,
        }
    }
}

/// Ordered sequence of patch operations. An empty document is valid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatchDocument {
    operations: Vec<PatchOperation>,
}

impl PatchDocument {
    pub fn new(operations: Vec<PatchOperation>) -> Self {
        Self { operations }
    }

    pub fn operations(&self) -> &[PatchOperation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl FromIterator<PatchOperation> for PatchDocument {
    fn from_iter<I: IntoIterator<Item = PatchOperation>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
