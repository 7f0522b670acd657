// Adapters layer: concrete implementations for external systems (files, HTTP, output).

pub mod fasta;
pub mod interpro;
pub mod ndjson;
