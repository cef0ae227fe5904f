//! This module contains sluice IR type definitions.
use std::fmt;

use cranelift_entity::entity_impl;
use indexmap::IndexSet;

use crate::ast::AstContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Type {
    /// The empty tuple. Functions returning it may fall off their end.
    #[default]
    Unit,
    I1,
    I8,
    I16,
    I32,
    I64,
    I128,
    I256,
    /// An opaque function value, e.g. the result of `builtin_ref`.
    Fn,
    /// A source-level named type such as `Int`.
    Nominal(NominalRef),
}

impl Type {
    pub fn is_unit(self) -> bool {
        self == Type::Unit
    }

    pub fn is_integral(self) -> bool {
        matches!(
            self,
            Type::I1 | Type::I8 | Type::I16 | Type::I32 | Type::I64 | Type::I128 | Type::I256
        )
    }

    /// Parses a builtin type name. Nominal types are interned through
    /// [`TypeStore::make_nominal`] instead.
    pub fn builtin_by_name(name: &str) -> Option<Self> {
        let ty = match name {
            "unit" => Type::Unit,
            "i1" => Type::I1,
            "i8" => Type::I8,
            "i16" => Type::I16,
            "i32" => Type::I32,
            "i64" => Type::I64,
            "i128" => Type::I128,
            "i256" => Type::I256,
            "fn" => Type::Fn,
            _ => return None,
        };
        Some(ty)
    }

    pub fn display(self, ast: &AstContext) -> DisplayType<'_> {
        DisplayType { ty: self, ast }
    }
}

/// An opaque reference to a nominal type name held by [`TypeStore`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NominalRef(u32);
entity_impl!(NominalRef, "nominal");

#[derive(Debug, Default, Clone)]
pub struct TypeStore {
    nominals: IndexSet<String>,
}

impl TypeStore {
    pub fn make_nominal(&mut self, name: &str) -> Type {
        let (idx, _) = self.nominals.insert_full(name.to_string());
        Type::Nominal(NominalRef(idx as u32))
    }

    pub fn lookup_nominal(&self, name: &str) -> Option<Type> {
        self.nominals
            .get_index_of(name)
            .map(|idx| Type::Nominal(NominalRef(idx as u32)))
    }

    pub fn nominal_name(&self, nominal: NominalRef) -> Option<&str> {
        self.nominals
            .get_index(nominal.0 as usize)
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.nominals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nominals.is_empty()
    }
}

pub struct DisplayType<'a> {
    ty: Type,
    ast: &'a AstContext,
}

impl fmt::Display for DisplayType<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ty {
            Type::Unit => "unit".fmt(f),
            Type::I1 => "i1".fmt(f),
            Type::I8 => "i8".fmt(f),
            Type::I16 => "i16".fmt(f),
            Type::I32 => "i32".fmt(f),
            Type::I64 => "i64".fmt(f),
            Type::I128 => "i128".fmt(f),
            Type::I256 => "i256".fmt(f),
            Type::Fn => "fn".fmt(f),
            Type::Nominal(nominal) => match self.ast.types.nominal_name(nominal) {
                Some(name) => name.fmt(f),
                None => write!(f, "<unknown {nominal}>"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nominal_types_are_interned() {
        let mut ast = AstContext::default();
        let int = ast.types.make_nominal("Int");
        let string = ast.types.make_nominal("String");

        assert_eq!(ast.types.make_nominal("Int"), int);
        assert_ne!(int, string);
        assert_eq!(ast.types.lookup_nominal("String"), Some(string));
        assert_eq!(ast.types.lookup_nominal("Bool"), None);
        assert_eq!(int.display(&ast).to_string(), "Int");
        assert_eq!(Type::I1.display(&ast).to_string(), "i1");
    }

    #[test]
    fn builtin_names() {
        assert_eq!(Type::builtin_by_name("unit"), Some(Type::Unit));
        assert_eq!(Type::builtin_by_name("i64"), Some(Type::I64));
        assert_eq!(Type::builtin_by_name("Int"), None);
        assert!(Type::I1.is_integral());
        assert!(!Type::Fn.is_integral());
    }
}
