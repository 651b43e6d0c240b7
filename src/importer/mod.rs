// ==========================================
// Fiber-splice billing - import layer
// ==========================================
// The ingestion pipeline, leaves first: table_loader ->
// header_normalizer -> alias_resolver -> content_guesser ->
// table_assembler, with the header-strategy fallback and the
// orchestrator on top. Data flows strictly forward; no stage reads
// a later stage's output.
// ==========================================

pub mod alias_resolver;
pub mod content_guesser;
pub mod error;
pub mod header_normalizer;
pub mod strategy;
pub mod table_assembler;
pub mod table_loader;
pub mod work_record_importer;

pub use error::{ImportError, ImportResult};
pub use header_normalizer::{dedup_headers, normalize_label};
pub use strategy::{assemble_with_fallback, HeaderStrategy, REQUIRED_FIELDS};
pub use table_assembler::{assemble, AssembledSheet};
pub use table_loader::load_sheets;
pub use work_record_importer::{SchemaMode, WorkRecordImporter};
