use crate::domain::model::{Batch, SequenceRecord};

/// Split records into consecutive batches of at most `max_per_query`,
/// numbered from 1. Yields `ceil(len / max_per_query)` batches.
pub fn batches(records: Vec<SequenceRecord>, max_per_query: usize) -> Vec<Batch> {
    let size = max_per_query.max(1);
    let mut out = Vec::with_capacity(records.len().div_ceil(size));
    let mut records = records.into_iter().peekable();

    while records.peek().is_some() {
        let chunk: Vec<SequenceRecord> = records.by_ref().take(size).collect();
        out.push(Batch {
            index: out.len() + 1,
            records: chunk,
        });
    }

    out
}
