//! Type references, modifiers and declaration kinds.

use crate::error::ModelError;
use bitflags::bitflags;
use std::fmt;
use std::str::FromStr;

/// A return or parameter type as written in a signature.
///
/// The model does not resolve type names; two references are the same type
/// when they are structurally equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Void,
    Named { name: String, args: Vec<TypeRef> },
}

impl TypeRef {
    /// A non-generic named type (`int`, `Task`, `Customer`).
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// A generic named type (`Task<int>`, `Dictionary<string, int>`).
    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        Self::Named {
            name: name.into(),
            args,
        }
    }

    pub const fn is_void(&self) -> bool {
        matches!(self, Self::Void)
    }

    /// `name` with no type arguments.
    pub fn is_plain(&self, expected: &str) -> bool {
        matches!(self, Self::Named { name, args } if name == expected && args.is_empty())
    }

    /// `name<T>` with exactly one type argument.
    pub fn is_generic_of(&self, expected: &str) -> bool {
        matches!(self, Self::Named { name, args } if name == expected && args.len() == 1)
    }

    /// The single type argument of a one-argument generic.
    pub fn single_type_arg(&self) -> Option<&TypeRef> {
        match self {
            Self::Named { args, .. } if args.len() == 1 => args.first(),
            _ => None,
        }
    }

    /// Parse a type written as `void`, `int`, `Task<int>` or
    /// `Dictionary<string, List<int>>`.
    pub fn parse(text: &str) -> Result<Self, ModelError> {
        let mut parser = TypeRefParser {
            chars: text.char_indices().peekable(),
            text,
        };
        let ty = parser.parse_type()?;
        parser.skip_ws();
        if parser.chars.peek().is_some() {
            return Err(ModelError::InvalidTypeRef(text.to_string()));
        }
        Ok(ty)
    }
}

/// Serialized as its source text.
impl serde::Serialize for TypeRef {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl FromStr for TypeRef {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void => f.write_str("void"),
            Self::Named { name, args } => {
                f.write_str(name)?;
                if !args.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str(">")?;
                }
                Ok(())
            }
        }
    }
}

struct TypeRefParser<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    text: &'a str,
}

impl TypeRefParser<'_> {
    fn skip_ws(&mut self) {
        while self.chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
    }

    fn error(&self) -> ModelError {
        ModelError::InvalidTypeRef(self.text.to_string())
    }

    fn parse_type(&mut self) -> Result<TypeRef, ModelError> {
        self.skip_ws();
        let mut name = String::new();
        while let Some((_, c)) = self
            .chars
            .next_if(|(_, c)| c.is_alphanumeric() || matches!(*c, '_' | '.' | '[' | ']' | '?'))
        {
            name.push(c);
        }
        if name.is_empty() {
            return Err(self.error());
        }
        if name == "void" {
            return Ok(TypeRef::Void);
        }

        self.skip_ws();
        let mut args = Vec::new();
        if self.chars.next_if(|(_, c)| *c == '<').is_some() {
            loop {
                args.push(self.parse_type()?);
                self.skip_ws();
                match self.chars.next() {
                    Some((_, ',')) => continue,
                    Some((_, '>')) => break,
                    _ => return Err(self.error()),
                }
            }
        }
        Ok(TypeRef::Named { name, args })
    }
}

bitflags! {
    /// Declaration modifiers relevant to override resolution and async
    /// conversion.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ModifierFlags: u16 {
        const PUBLIC = 1 << 0;
        const STATIC = 1 << 1;
        const ABSTRACT = 1 << 2;
        const VIRTUAL = 1 << 3;
        const OVERRIDE = 1 << 4;
        const ASYNC = 1 << 5;
    }
}

impl ModifierFlags {
    /// Keywords in source order.
    const KEYWORDS: [(ModifierFlags, &'static str); 6] = [
        (ModifierFlags::PUBLIC, "public"),
        (ModifierFlags::STATIC, "static"),
        (ModifierFlags::ABSTRACT, "abstract"),
        (ModifierFlags::VIRTUAL, "virtual"),
        (ModifierFlags::OVERRIDE, "override"),
        (ModifierFlags::ASYNC, "async"),
    ];

    pub fn from_keyword(keyword: &str) -> Result<Self, ModelError> {
        Self::KEYWORDS
            .iter()
            .find(|(_, kw)| *kw == keyword)
            .map(|(flag, _)| *flag)
            .ok_or_else(|| ModelError::UnknownModifier(keyword.to_string()))
    }

    pub fn keywords(self) -> impl Iterator<Item = &'static str> {
        Self::KEYWORDS
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, kw)| kw)
    }
}

/// Whether a type is a class or an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Class,
    Interface,
}

/// The declaration kinds a method symbol can have.
///
/// Matched exhaustively by the hierarchy navigator and the declaration
/// rewriter, so a new kind cannot be silently ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum MethodKind {
    /// A class method with a body.
    Concrete,
    /// An `abstract` class method.
    Abstract,
    /// A member declared by an interface.
    InterfaceMember,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Param {
    pub name: String,
    pub ty: TypeRef,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_generics() {
        let ty = TypeRef::parse("Dictionary<string, List<int>>").unwrap();
        assert_eq!(
            ty,
            TypeRef::generic(
                "Dictionary",
                vec![
                    TypeRef::named("string"),
                    TypeRef::generic("List", vec![TypeRef::named("int")]),
                ],
            )
        );
        assert_eq!(ty.to_string(), "Dictionary<string, List<int>>");
    }

    #[test]
    fn parses_void_and_rejects_garbage() {
        assert_eq!(TypeRef::parse(" void ").unwrap(), TypeRef::Void);
        assert!(TypeRef::parse("Task<int").is_err());
        assert!(TypeRef::parse("").is_err());
        assert!(TypeRef::parse("int extra").is_err());
    }

    #[test]
    fn task_shape_queries() {
        let task = TypeRef::named("Task");
        let task_of_int = TypeRef::parse("Task<int>").unwrap();
        assert!(task.is_plain("Task"));
        assert!(!task.is_generic_of("Task"));
        assert!(task_of_int.is_generic_of("Task"));
        assert_eq!(task_of_int.single_type_arg(), Some(&TypeRef::named("int")));
    }

    #[test]
    fn modifier_keywords_round_trip_in_source_order() {
        let flags = ModifierFlags::ASYNC | ModifierFlags::PUBLIC | ModifierFlags::OVERRIDE;
        let words: Vec<_> = flags.keywords().collect();
        assert_eq!(words, vec!["public", "override", "async"]);
        assert_eq!(
            ModifierFlags::from_keyword("virtual").unwrap(),
            ModifierFlags::VIRTUAL
        );
        assert!(ModifierFlags::from_keyword("sealed").is_err());
    }
}
