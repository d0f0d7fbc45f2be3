//! A partition: a unit of index lifecycle owning a contiguous id subrange
//! and one [`AttributeIndex`] per `(type, offset)` leaf seen among the
//! events it has ingested (spec.md §3, "Partition").

use std::collections::HashMap;
use std::path::Path;

use roaring::RoaringTreemap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vast_expr::{Expr, Extractor, Operand, Predicate};
use vast_types::{Data, Event, Offset, Type};

use crate::attribute::AttributeIndex;
use crate::error::IndexError;
use crate::treemap::TreemapField;

/// A partition's place in its lifecycle (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartitionState {
    /// Mutable, accepts new events.
    Active,
    /// Sealed; query-only, may be evicted to disk.
    Passive,
    /// Evicted and excluded from further queries until reloaded.
    Dead,
}

/// Key identifying one attribute index: the event type it was built for
/// (by name, since `data_extractor` equality in the type-resolved phase
/// is name-sensitive) and the leaf offset within it.
type AttributeKey = (String, Offset);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Partition {
    pub id: Uuid,
    pub lo: u64,
    pub hi: u64,
    pub state: PartitionState,
    event_count: usize,
    ids: TreemapField,
    attributes: HashMap<AttributeKey, AttributeIndex>,
}

impl Partition {
    pub fn new(id: Uuid, lo: u64) -> Self {
        Partition {
            id,
            lo,
            hi: lo,
            state: PartitionState::Active,
            event_count: 0,
            ids: TreemapField::default(),
            attributes: HashMap::new(),
        }
    }

    pub fn event_count(&self) -> usize {
        self.event_count
    }

    pub fn is_active(&self) -> bool {
        self.state == PartitionState::Active
    }

    /// Indexes `event`, extending `hi` to cover its id.
    pub fn ingest(&mut self, event: &Event) {
        self.ids.insert(event.id);
        self.hi = self.hi.max(event.id + 1);
        self.event_count += 1;
        let type_name = event.ty.name().unwrap_or("<anonymous>").to_string();
        for (offset, value) in leaves_of(&event.ty, &event.value) {
            let key = (type_name.clone(), offset);
            self.attributes.entry(key).or_default().insert(&value, event.id);
        }
    }

    /// Seals the partition: no further `ingest` calls are expected.
    pub fn seal(&mut self) {
        self.state = PartitionState::Passive;
    }

    /// Evaluates a type-resolved expression (only `data_extractor` leaves
    /// and literal data remain) against this partition's indexes.
    pub fn evaluate(&self, expr: &Expr) -> RoaringTreemap {
        match expr {
            Expr::None => RoaringTreemap::new(),
            Expr::Conjunction(ops) => {
                let mut acc = (*self.ids).clone();
                for op in ops {
                    acc &= self.evaluate(op);
                }
                acc
            }
            Expr::Disjunction(ops) => {
                let mut acc = RoaringTreemap::new();
                for op in ops {
                    acc |= self.evaluate(op);
                }
                acc
            }
            Expr::Negation(inner) => (*self.ids).clone() - self.evaluate(inner),
            Expr::Predicate(p) => self.evaluate_predicate(p),
        }
    }

    fn evaluate_predicate(&self, p: &Predicate) -> RoaringTreemap {
        match &p.lhs {
            Operand::Extractor(Extractor::Data { ty, offset }) => {
                let Some(rhs) = p.rhs.as_data() else { return RoaringTreemap::new() };
                let type_name = ty.name().unwrap_or("<anonymous>").to_string();
                match self.attributes.get(&(type_name, offset.clone())) {
                    Some(index) => index.evaluate(p.op, rhs).unwrap_or_else(|| (*self.ids).clone()),
                    None => RoaringTreemap::new(),
                }
            }
            Operand::Data(lhs) => {
                let matches = p
                    .rhs
                    .as_data()
                    .map(|rhs| crate::compare::compare(lhs, p.op, rhs))
                    .unwrap_or(false);
                if matches {
                    (*self.ids).clone()
                } else {
                    RoaringTreemap::new()
                }
            }
            _ => RoaringTreemap::new(),
        }
    }

    pub async fn persist(&mut self, dir: &Path) -> Result<(), IndexError> {
        let partition_dir = dir.join(self.id.to_string());
        tokio::fs::create_dir_all(&partition_dir).await.map_err(|source| IndexError::Io {
            path: partition_dir.display().to_string(),
            source,
        })?;
        let bytes = bincode::serde::encode_to_vec(&*self, bincode::config::standard())
            .map_err(IndexError::Encode)?;
        let path = partition_dir.join("partition.bin");
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|source| IndexError::Io { path: path.display().to_string(), source })
    }

    pub async fn load(dir: &Path, id: Uuid) -> Result<Self, IndexError> {
        let path = dir.join(id.to_string()).join("partition.bin");
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|source| IndexError::Io { path: path.display().to_string(), source })?;
        let (partition, _): (Partition, usize) =
            bincode::serde::decode_from_slice(&bytes, bincode::config::standard())
                .map_err(IndexError::Decode)?;
        Ok(partition)
    }
}

/// Walks `ty`/`value` together, yielding `(offset, leaf_value)` for every
/// scalar leaf — the same tree shape `Type::leaves` walks, but paired with
/// the concrete data so each leaf can be inserted into its attribute
/// index.
fn leaves_of(ty: &Type, value: &Data) -> Vec<(Offset, Data)> {
    let mut out = Vec::new();
    collect(ty, value, Offset::root(), &mut out);
    out
}

fn collect(ty: &Type, value: &Data, offset: Offset, out: &mut Vec<(Offset, Data)>) {
    match (ty.as_record(), value) {
        (Some(record), Data::Record(fields)) => {
            for (i, (_, field_value)) in fields.iter().enumerate() {
                if let Ok(field_type) = record.at(&Offset::new(vec![i])) {
                    collect(field_type, field_value, offset.child(i), out);
                }
            }
        }
        _ => out.push((offset, value.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vast_expr::RelOp;
    use vast_types::RecordType;

    fn conn_type() -> Type {
        Type::record(RecordType::new(vec![
            ("bytes".to_string(), Type::count()),
            ("service".to_string(), Type::string()),
        ]))
        .named("conn")
    }

    fn conn_event(id: u64, bytes: u64, service: &str) -> Event {
        Event::new(
            id,
            conn_type(),
            0,
            Data::Record(vec![
                ("bytes".to_string(), Data::Count(bytes)),
                ("service".to_string(), Data::String(service.to_string())),
            ]),
        )
    }

    #[test]
    fn ingest_extends_the_hi_bound() {
        let mut partition = Partition::new(Uuid::new_v4(), 0);
        partition.ingest(&conn_event(0, 10, "http"));
        partition.ingest(&conn_event(1, 20, "dns"));
        assert_eq!(partition.hi, 2);
        assert_eq!(partition.event_count(), 2);
    }

    #[test]
    fn evaluate_predicate_against_indexed_field() {
        let mut partition = Partition::new(Uuid::new_v4(), 0);
        partition.ingest(&conn_event(0, 10, "http"));
        partition.ingest(&conn_event(1, 20, "dns"));

        let expr = Expr::predicate(
            Operand::resolved(conn_type(), Offset::new(vec![1])),
            RelOp::Eq,
            Operand::data(Data::String("http".to_string())),
        );
        let ids = partition.evaluate(&expr);
        assert_eq!(ids.iter().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn evaluate_unindexed_type_returns_empty() {
        let mut partition = Partition::new(Uuid::new_v4(), 0);
        partition.ingest(&conn_event(0, 10, "http"));
        let other = Type::record(RecordType::new(vec![])).named("other");
        let expr = Expr::predicate(
            Operand::resolved(other, Offset::root()),
            RelOp::Eq,
            Operand::data(Data::Bool(true)),
        );
        assert!(partition.evaluate(&expr).is_empty());
    }
}
