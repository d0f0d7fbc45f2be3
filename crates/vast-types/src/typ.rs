//! Algebraic type descriptors.

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::offset::Offset;
use crate::record::RecordType;

/// The shape of a type, independent of its name and aliases.
///
/// Equality here is name-sensitive (it delegates to [`Type`]'s equality for
/// nested element types); use [`congruent`] for shape-only comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeKind {
    Bool,
    Int,
    Count,
    Real,
    Time,
    Duration,
    String,
    Pattern,
    Address,
    Subnet,
    Port,
    Vector(Type),
    Set(Type),
    Table(Type, Type),
    Record(RecordType),
}

/// A named (or anonymous) algebraic type.
///
/// Equality is name-sensitive: two types with the same shape but different
/// names are unequal. [`congruent`] compares shape alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Type {
    kind: Box<TypeKind>,
    name: Option<String>,
    aliases: Vec<String>,
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && *self.kind == *other.kind
    }
}

impl Type {
    fn of(kind: TypeKind) -> Self {
        Self {
            kind: Box::new(kind),
            name: None,
            aliases: Vec::new(),
        }
    }

    pub fn bool() -> Self {
        Self::of(TypeKind::Bool)
    }
    pub fn int() -> Self {
        Self::of(TypeKind::Int)
    }
    pub fn count() -> Self {
        Self::of(TypeKind::Count)
    }
    pub fn real() -> Self {
        Self::of(TypeKind::Real)
    }
    pub fn time() -> Self {
        Self::of(TypeKind::Time)
    }
    pub fn duration() -> Self {
        Self::of(TypeKind::Duration)
    }
    pub fn string() -> Self {
        Self::of(TypeKind::String)
    }
    pub fn pattern() -> Self {
        Self::of(TypeKind::Pattern)
    }
    pub fn address() -> Self {
        Self::of(TypeKind::Address)
    }
    pub fn subnet() -> Self {
        Self::of(TypeKind::Subnet)
    }
    pub fn port() -> Self {
        Self::of(TypeKind::Port)
    }
    pub fn vector(elem: Type) -> Self {
        Self::of(TypeKind::Vector(elem))
    }
    pub fn set(elem: Type) -> Self {
        Self::of(TypeKind::Set(elem))
    }
    pub fn table(key: Type, value: Type) -> Self {
        Self::of(TypeKind::Table(key, value))
    }
    pub fn record(r: RecordType) -> Self {
        Self::of(TypeKind::Record(r))
    }

    /// Attaches a name, consuming self (builder style).
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Registers an additional alias name.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub fn is_record(&self) -> bool {
        matches!(*self.kind, TypeKind::Record(_))
    }

    pub fn as_record(&self) -> Option<&RecordType> {
        match &*self.kind {
            TypeKind::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Returns the type reachable at `offset`.
    ///
    /// The empty offset always yields `self`. A non-empty offset requires
    /// `self` to be a record.
    pub fn at(&self, offset: &Offset) -> Result<&Type, TypeError> {
        if offset.is_empty() {
            return Ok(self);
        }
        match self.as_record() {
            Some(r) => r.at(offset),
            None => Err(TypeError::NotARecord {
                type_name: self.display_name(),
                offset: offset.to_string(),
            }),
        }
    }

    /// Yields every leaf of this type as `(trace, offset)` in preorder.
    ///
    /// For a non-record type there is exactly one leaf: itself, at the root
    /// offset, with a trace containing only itself.
    pub fn leaves(&self) -> Vec<(Vec<Type>, Offset)> {
        match self.as_record() {
            Some(r) => r.leaves(),
            None => vec![(vec![self.clone()], Offset::root())],
        }
    }

    fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.shape_name())
    }

    fn shape_name(&self) -> String {
        match &*self.kind {
            TypeKind::Bool => "bool",
            TypeKind::Int => "int",
            TypeKind::Count => "count",
            TypeKind::Real => "real",
            TypeKind::Time => "time",
            TypeKind::Duration => "duration",
            TypeKind::String => "string",
            TypeKind::Pattern => "pattern",
            TypeKind::Address => "addr",
            TypeKind::Subnet => "subnet",
            TypeKind::Port => "port",
            TypeKind::Vector(_) => "vector",
            TypeKind::Set(_) => "set",
            TypeKind::Table(_, _) => "table",
            TypeKind::Record(_) => "record",
        }
        .to_string()
    }
}

/// Structural shape equivalence: names are ignored, element types must be
/// pairwise congruent. An alias of a type is always congruent to it, since
/// congruence never looks at names in the first place.
pub fn congruent(a: &Type, b: &Type) -> bool {
    congruent_kind(&a.kind, &b.kind)
}

fn congruent_kind(a: &TypeKind, b: &TypeKind) -> bool {
    use TypeKind::*;
    match (a, b) {
        (Bool, Bool)
        | (Int, Int)
        | (Count, Count)
        | (Real, Real)
        | (Time, Time)
        | (Duration, Duration)
        | (String, String)
        | (Pattern, Pattern)
        | (Address, Address)
        | (Subnet, Subnet)
        | (Port, Port) => true,
        (Vector(x), Vector(y)) | (Set(x), Set(y)) => congruent(x, y),
        (Table(k1, v1), Table(k2, v2)) => congruent(k1, k2) && congruent(v1, v2),
        (Record(x), Record(y)) => {
            x.len() == y.len()
                && x.fields()
                    .iter()
                    .zip(y.fields())
                    .all(|((_, xt), (_, yt))| congruent(xt, yt))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn congruent_is_reflexive() {
        let t = Type::count();
        assert!(congruent(&t, &t));
    }

    #[test]
    fn congruent_is_symmetric() {
        let a = Type::count();
        let b = Type::count();
        assert_eq!(congruent(&a, &b), congruent(&b, &a));
    }

    #[test]
    fn congruent_ignores_names() {
        let a = Type::count().named("bytes");
        let b = Type::count().named("packets");
        assert!(congruent(&a, &b));
        assert_ne!(a, b);
    }

    #[test]
    fn congruent_alias_is_congruent() {
        let canonical = Type::count().named("bytes");
        let alias = Type::count().named("bytes").with_alias("octets");
        assert!(congruent(&canonical, &alias));
    }

    #[test]
    fn not_congruent_across_shapes() {
        assert!(!congruent(&Type::count(), &Type::string()));
    }

    #[test]
    fn congruent_records_require_pairwise_congruence() {
        let a = RecordType::new(vec![("x".to_string(), Type::count())]);
        let b = RecordType::new(vec![("y".to_string(), Type::count())]);
        assert!(congruent(&Type::record(a), &Type::record(b)));

        let c = RecordType::new(vec![("x".to_string(), Type::string())]);
        assert!(!congruent(
            &Type::record(RecordType::new(vec![("x".to_string(), Type::count())])),
            &Type::record(c)
        ));
    }

    #[test]
    fn at_root_offset_returns_self() {
        let t = Type::count();
        assert_eq!(*t.at(&Offset::root()).unwrap(), t);
    }

    #[test]
    fn at_nonempty_on_non_record_errors() {
        let t = Type::count();
        let err = t.at(&Offset::new(vec![0])).unwrap_err();
        assert!(matches!(err, TypeError::NotARecord { .. }));
    }

    #[test]
    fn name_sensitive_equality() {
        assert_ne!(Type::count().named("a"), Type::count().named("b"));
        assert_eq!(Type::count().named("a"), Type::count().named("a"));
    }
}
