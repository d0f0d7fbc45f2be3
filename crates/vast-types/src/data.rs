//! Value-level data mirroring the [`crate::typ::Type`] sum.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// A subnet: a base address plus a prefix length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Subnet {
    pub network: IpAddr,
    pub prefix: u8,
}

/// A transport-layer port, with an optional protocol tag (e.g. "tcp").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Port {
    pub number: u16,
    pub proto: Option<String>,
}

/// A bit-pattern-ordered wrapper making `f64` usable as a `Data` payload
/// with total `Eq`/`Ord`/`Hash`. `Display`/arithmetic still operate on the
/// plain `f64` value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Real(pub f64);

impl PartialEq for Real {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}
impl Eq for Real {}
impl PartialOrd for Real {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.0.partial_cmp(&other.0)
    }
}
impl std::hash::Hash for Real {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state)
    }
}

/// A tagged value, structurally mirroring [`crate::typ::TypeKind`].
///
/// Equality and ordering are defined per-variant. Comparing values of
/// different variants never panics: `PartialEq` reports them unequal and
/// `PartialOrd` reports them incomparable. The resolver, not `Data` itself,
/// is what catches a query comparing incompatible types — see
/// `vast-resolve`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Data {
    Bool(bool),
    Int(i64),
    Count(u64),
    Real(Real),
    /// Nanoseconds since the Unix epoch.
    Time(i64),
    /// Nanoseconds.
    Duration(i64),
    String(String),
    /// Source text of a regular expression (already glob-translated if it
    /// originated from a glob literal).
    Pattern(String),
    Address(IpAddr),
    Subnet(Subnet),
    Port(Port),
    Vector(Vec<Data>),
    Set(Vec<Data>),
    Table(BTreeMap<String, Data>),
    Record(Vec<(String, Data)>),
}

impl Data {
    /// Name of this value's variant, used in resolver diagnostics.
    pub fn variant_name(&self) -> &'static str {
        match self {
            Data::Bool(_) => "bool",
            Data::Int(_) => "int",
            Data::Count(_) => "count",
            Data::Real(_) => "real",
            Data::Time(_) => "time",
            Data::Duration(_) => "duration",
            Data::String(_) => "string",
            Data::Pattern(_) => "pattern",
            Data::Address(_) => "addr",
            Data::Subnet(_) => "subnet",
            Data::Port(_) => "port",
            Data::Vector(_) => "vector",
            Data::Set(_) => "set",
            Data::Table(_) => "table",
            Data::Record(_) => "record",
        }
    }
}

impl PartialOrd for Data {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        use Data::*;
        match (self, other) {
            (Bool(a), Bool(b)) => a.partial_cmp(b),
            (Int(a), Int(b)) => a.partial_cmp(b),
            (Count(a), Count(b)) => a.partial_cmp(b),
            (Real(a), Real(b)) => a.partial_cmp(b),
            (Time(a), Time(b)) => a.partial_cmp(b),
            (Duration(a), Duration(b)) => a.partial_cmp(b),
            (String(a), String(b)) => a.partial_cmp(b),
            (Pattern(a), Pattern(b)) => a.partial_cmp(b),
            (Address(a), Address(b)) => a.partial_cmp(b),
            (Subnet(a), Subnet(b)) => a.partial_cmp(b),
            (Port(a), Port(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_false_across_variants() {
        assert_ne!(Data::Int(5), Data::Count(5));
    }

    #[test]
    fn ordering_is_none_across_variants() {
        assert_eq!(Data::Int(5).partial_cmp(&Data::Count(5)), None);
    }

    #[test]
    fn same_variant_orders_normally() {
        assert!(Data::Count(1) < Data::Count(2));
        assert!(Data::Real(Real(1.5)) < Data::Real(Real(2.5)));
    }

    #[test]
    fn real_equality_uses_bit_pattern() {
        assert_eq!(Real(f64::NAN), Real(f64::NAN));
        assert_ne!(Real(0.0), Real(-0.0));
    }

    #[test]
    fn variant_name_matches_shape() {
        assert_eq!(Data::Count(1).variant_name(), "count");
        assert_eq!(Data::String("x".into()).variant_name(), "string");
    }

    #[test]
    fn round_trips_through_json() {
        let d = Data::Record(vec![
            ("a".to_string(), Data::Count(1)),
            ("b".to_string(), Data::String("x".to_string())),
        ]);
        let json = serde_json::to_string(&d).unwrap();
        let back: Data = serde_json::from_str(&json).unwrap();
        assert_eq!(d, back);
    }
}
