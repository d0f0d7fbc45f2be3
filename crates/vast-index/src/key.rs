//! `IndexKey`: a totally-ordered projection of the comparable [`Data`]
//! variants, used as the key type for each attribute's value index.
//!
//! Structured types (`Vector`, `Set`, `Table`, `Record`, `Subnet`) are not
//! indexed by value — predicates against them fall back to a full
//! partition scan, which `Partition::evaluate` performs directly rather
//! than through an `AttributeIndex`.

use std::cmp::Ordering;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use vast_types::Data;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IndexKey {
    Bool(bool),
    Int(i64),
    Count(u64),
    Real(f64),
    Time(i64),
    Duration(i64),
    Str(String),
    Addr(IpAddr),
    PortNumber(u16),
}

impl Eq for IndexKey {}

impl PartialOrd for IndexKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IndexKey {
    fn cmp(&self, other: &Self) -> Ordering {
        use IndexKey::*;
        match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (Int(a), Int(b)) => a.cmp(b),
            (Count(a), Count(b)) => a.cmp(b),
            (Real(a), Real(b)) => a.total_cmp(b),
            (Time(a), Time(b)) => a.cmp(b),
            (Duration(a), Duration(b)) => a.cmp(b),
            (Str(a), Str(b)) => a.cmp(b),
            (Addr(a), Addr(b)) => a.cmp(b),
            (PortNumber(a), PortNumber(b)) => a.cmp(b),
            // Different variants never arise within one attribute's index
            // (every value stored there came from events of the same
            // type at the same offset), but ranking by discriminant keeps
            // `Ord` total if it ever does.
            _ => rank(self).cmp(&rank(other)),
        }
    }
}

fn rank(key: &IndexKey) -> u8 {
    use IndexKey::*;
    match key {
        Bool(_) => 0,
        Int(_) => 1,
        Count(_) => 2,
        Real(_) => 3,
        Time(_) => 4,
        Duration(_) => 5,
        Str(_) => 6,
        Addr(_) => 7,
        PortNumber(_) => 8,
    }
}

/// Projects `data` into an `IndexKey`, or `None` for a variant this index
/// does not cover (structured/compound values).
pub fn index_key(data: &Data) -> Option<IndexKey> {
    match data {
        Data::Bool(b) => Some(IndexKey::Bool(*b)),
        Data::Int(i) => Some(IndexKey::Int(*i)),
        Data::Count(c) => Some(IndexKey::Count(*c)),
        Data::Real(r) => Some(IndexKey::Real(r.0)),
        Data::Time(t) => Some(IndexKey::Time(*t)),
        Data::Duration(d) => Some(IndexKey::Duration(*d)),
        Data::String(s) => Some(IndexKey::Str(s.clone())),
        Data::Pattern(p) => Some(IndexKey::Str(p.clone())),
        Data::Address(a) => Some(IndexKey::Addr(*a)),
        Data::Port(p) => Some(IndexKey::PortNumber(p.number)),
        Data::Subnet(_) | Data::Vector(_) | Data::Set(_) | Data::Table(_) | Data::Record(_) => None,
    }
}
