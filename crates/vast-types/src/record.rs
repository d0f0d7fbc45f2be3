//! Record types: ordered named fields.

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::offset::Offset;
use crate::typ::Type;

/// An ordered set of named fields, each bound to a type.
///
/// Record types form trees by construction — the grammar that produces them
/// has no way to introduce a cycle — so they are owned by value rather than
/// built over an arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordType {
    fields: Vec<(String, Type)>,
}

impl RecordType {
    pub fn new(fields: Vec<(String, Type)>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[(String, Type)] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the type at `offset`, descending through nested records.
    pub fn at(&self, offset: &Offset) -> Result<&Type, TypeError> {
        let indices = offset.as_slice();
        let Some((&first, rest)) = indices.split_first() else {
            return Err(TypeError::NotARecord {
                type_name: "record".to_string(),
                offset: offset.to_string(),
            });
        };
        let (_, field_type) = self.fields.get(first).ok_or_else(|| TypeError::OffsetOutOfBounds {
            offset: offset.to_string(),
            field_count: self.fields.len(),
        })?;
        if rest.is_empty() {
            Ok(field_type)
        } else {
            field_type.at(&Offset::new(rest.to_vec()))
        }
    }

    /// Yields every leaf of this record as `(trace, offset)` in preorder.
    ///
    /// `trace` is the list of types on the path from this record's root to
    /// the leaf (inclusive of the leaf itself); `offset` is the index path
    /// to reach it.
    pub fn leaves(&self) -> Vec<(Vec<Type>, Offset)> {
        let mut out = Vec::new();
        for (i, (_, field_type)) in self.fields.iter().enumerate() {
            self.collect_leaves(field_type, Offset::root().child(i), vec![field_type.clone()], &mut out);
        }
        out
    }

    fn collect_leaves(
        &self,
        ty: &Type,
        offset: Offset,
        trace: Vec<Type>,
        out: &mut Vec<(Vec<Type>, Offset)>,
    ) {
        if let Some(record) = ty.as_record() {
            for (i, (_, field_type)) in record.fields.iter().enumerate() {
                let mut child_trace = trace.clone();
                child_trace.push(field_type.clone());
                self.collect_leaves(field_type, offset.child(i), child_trace, out);
            }
        } else {
            out.push((trace, offset));
        }
    }

    /// Returns all `(offset, trace)` pairs whose trailing field-name path
    /// equals `key` (a dotted sequence of field names), searched in
    /// tree-preorder.
    ///
    /// If `key` has a single element and a field of this record is directly
    /// named `key[0]`, the match reports the field itself; nested matches
    /// require every trailing path component to line up with consecutive
    /// field names from some depth down to the leaf.
    pub fn find_suffix(&self, key: &[String]) -> Vec<(Offset, Vec<Type>)> {
        let mut out = Vec::new();
        for (i, (name, field_type)) in self.fields.iter().enumerate() {
            self.search(
                field_type,
                name,
                Offset::root().child(i),
                vec![field_type.clone()],
                vec![name.clone()],
                key,
                &mut out,
            );
        }
        out
    }

    #[allow(clippy::too_many_arguments)]
    fn search(
        &self,
        ty: &Type,
        _name: &str,
        offset: Offset,
        trace: Vec<Type>,
        path: Vec<String>,
        key: &[String],
        out: &mut Vec<(Offset, Vec<Type>)>,
    ) {
        if is_suffix(&path, key) {
            out.push((offset.clone(), trace.clone()));
        }
        if let Some(record) = ty.as_record() {
            for (i, (child_name, child_type)) in record.fields.iter().enumerate() {
                let mut child_path = path.clone();
                child_path.push(child_name.clone());
                let mut child_trace = trace.clone();
                child_trace.push(child_type.clone());
                self.search(
                    child_type,
                    child_name,
                    offset.child(i),
                    child_trace,
                    child_path,
                    key,
                    out,
                );
            }
        }
    }
}

/// True iff `key` is a (possibly improper) trailing subsequence of `path`.
fn is_suffix(path: &[String], key: &[String]) -> bool {
    if key.len() > path.len() {
        return false;
    }
    path[path.len() - key.len()..] == key[..]
}
