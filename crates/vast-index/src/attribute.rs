//! A per-attribute value index: one `BTreeMap<IndexKey, RoaringTreemap>`
//! mapping each distinct value seen at a `(type, offset)` leaf to the set
//! of event ids carrying it. Range predicates use `BTreeMap::range`;
//! equality is a single lookup; `~`/`!~` fall back to scanning the
//! distinct string keys already collected (still far cheaper than
//! scanning every event).

use std::collections::BTreeMap;

use regex::Regex;
use roaring::RoaringTreemap;
use serde::{Deserialize, Serialize};

use vast_expr::RelOp;
use vast_types::Data;

use crate::key::{index_key, IndexKey};
use crate::treemap::TreemapField;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct AttributeIndex {
    by_value: BTreeMap<IndexKey, TreemapField>,
}

impl AttributeIndex {
    pub fn insert(&mut self, value: &Data, id: u64) {
        if let Some(key) = index_key(value) {
            self.by_value.entry(key).or_default().insert(id);
        }
    }

    /// Evaluates `op rhs` against this index, returning the matching ids.
    /// Returns `None` when `rhs` is a variant this index can't reason
    /// about (structured data, or a scalar `op` this index doesn't
    /// support), signalling the caller to fall back to a full scan.
    pub fn evaluate(&self, op: RelOp, rhs: &Data) -> Option<RoaringTreemap> {
        match op {
            RelOp::Eq => Some(self.eq_ids(rhs)?),
            RelOp::Ne => {
                let matching = self.eq_ids(rhs)?;
                Some(self.all_ids() - matching)
            }
            RelOp::Lt | RelOp::Le | RelOp::Gt | RelOp::Ge => self.range_ids(op, rhs),
            RelOp::Match => self.regex_ids(rhs, false),
            RelOp::NotMatch => self.regex_ids(rhs, true),
            RelOp::In | RelOp::NotIn => self.membership_ids(op, rhs),
        }
    }

    fn eq_ids(&self, rhs: &Data) -> Option<RoaringTreemap> {
        let key = index_key(rhs)?;
        Some(self.by_value.get(&key).map(|f| f.0.clone()).unwrap_or_default())
    }

    fn range_ids(&self, op: RelOp, rhs: &Data) -> Option<RoaringTreemap> {
        let key = index_key(rhs)?;
        let mut out = RoaringTreemap::new();
        let matches: Box<dyn Iterator<Item = &TreemapField>> = match op {
            RelOp::Lt => Box::new(self.by_value.range(..key).map(|(_, v)| v)),
            RelOp::Le => Box::new(self.by_value.range(..=key).map(|(_, v)| v)),
            RelOp::Gt => {
                let excl = self.by_value.range(key.clone()..).filter(move |(k, _)| **k != key);
                Box::new(excl.map(|(_, v)| v))
            }
            RelOp::Ge => Box::new(self.by_value.range(key..).map(|(_, v)| v)),
            _ => unreachable!("range_ids only called for ordering operators"),
        };
        for bitmap in matches {
            out |= &bitmap.0;
        }
        Some(out)
    }

    fn regex_ids(&self, rhs: &Data, negate: bool) -> Option<RoaringTreemap> {
        let pattern = match rhs {
            Data::Pattern(p) | Data::String(p) => p,
            _ => return None,
        };
        let re = Regex::new(pattern).ok()?;
        let mut out = RoaringTreemap::new();
        for (key, bitmap) in &self.by_value {
            let text = match key {
                IndexKey::Str(s) => s.as_str(),
                _ => continue,
            };
            if re.is_match(text) != negate {
                out |= &bitmap.0;
            }
        }
        if negate {
            // `!~` also matches non-string values deterministically: any
            // id whose value isn't a string at all trivially doesn't
            // match the pattern, so it belongs in the negated result too.
            for (key, bitmap) in &self.by_value {
                if !matches!(key, IndexKey::Str(_)) {
                    out |= &bitmap.0;
                }
            }
        }
        Some(out)
    }

    fn membership_ids(&self, op: RelOp, rhs: &Data) -> Option<RoaringTreemap> {
        let elements: &[Data] = match rhs {
            Data::Vector(v) | Data::Set(v) => v,
            _ => return None,
        };
        let mut out = RoaringTreemap::new();
        for element in elements {
            if let Some(ids) = self.eq_ids(element) {
                out |= ids;
            }
        }
        Some(match op {
            RelOp::In => out,
            RelOp::NotIn => self.all_ids() - out,
            _ => unreachable!("membership_ids only called for in/not-in"),
        })
    }

    fn all_ids(&self) -> RoaringTreemap {
        let mut out = RoaringTreemap::new();
        for bitmap in self.by_value.values() {
            out |= &bitmap.0;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_with(values: &[(u64, u64)]) -> AttributeIndex {
        let mut index = AttributeIndex::default();
        for (id, count) in values {
            index.insert(&Data::Count(*count), *id);
        }
        index
    }

    #[test]
    fn eq_finds_exact_matches() {
        let index = index_with(&[(0, 5), (1, 6), (2, 5)]);
        let ids = index.evaluate(RelOp::Eq, &Data::Count(5)).unwrap();
        assert_eq!(ids.iter().collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn ne_is_the_complement_of_eq() {
        let index = index_with(&[(0, 5), (1, 6)]);
        let ids = index.evaluate(RelOp::Ne, &Data::Count(5)).unwrap();
        assert_eq!(ids.iter().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn range_operators_use_btreemap_range() {
        let index = index_with(&[(0, 1), (1, 2), (2, 3)]);
        assert_eq!(index.evaluate(RelOp::Lt, &Data::Count(2)).unwrap().iter().collect::<Vec<_>>(), vec![0]);
        assert_eq!(index.evaluate(RelOp::Ge, &Data::Count(2)).unwrap().iter().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(index.evaluate(RelOp::Gt, &Data::Count(2)).unwrap().iter().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn match_scans_string_keys_by_regex() {
        let mut index = AttributeIndex::default();
        index.insert(&Data::String("foo.com".to_string()), 0);
        index.insert(&Data::String("bar.org".to_string()), 1);
        let ids = index.evaluate(RelOp::Match, &Data::Pattern(".*\\.com".to_string())).unwrap();
        assert_eq!(ids.iter().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn in_unions_over_set_elements() {
        let index = index_with(&[(0, 1), (1, 2), (2, 3)]);
        let rhs = Data::Set(vec![Data::Count(1), Data::Count(3)]);
        let ids = index.evaluate(RelOp::In, &rhs).unwrap();
        assert_eq!(ids.iter().collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn structured_rhs_signals_fallback_with_none() {
        let index = index_with(&[(0, 1)]);
        assert!(index.evaluate(RelOp::Eq, &Data::Vector(vec![])).is_none());
    }
}
