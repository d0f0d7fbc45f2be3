//! Ingress and egress framing for VAST (spec.md §4.9, L9): batching raw
//! records into segments on the way in (Receiver, fed by an Importer),
//! and rendering a query's result stream to a file sink on the way out
//! (Exporter).

mod error;
mod exporter;
mod importer;
mod receiver;
mod record;

pub use error::IngestError;
pub use exporter::{Exporter, OutputFormat};
pub use importer::{import_json_lines, import_json_lines_as};
pub use receiver::{Msg, Receiver};
pub use record::UnidentifiedRecord;
