//! Annotation import/export as JSON
//!
//! Export writes an [`AnnotationExport`] envelope. Import accepts either the
//! envelope or a bare array of records, and converts record by record so
//! one malformed entry does not sink the whole file.

use std::collections::BTreeMap;

use chrono::Utc;
use doc_model::{AnnotationExport, AnnotationRecord, EXPORT_SCHEMA_VERSION};
use serde_json::Value;
use thiserror::Error;

use crate::annotation::{Annotation, AnnotationDraft, AnnotationId, DocumentId};
use crate::wire::{annotation_from_record, annotation_to_record, draft_from_record};

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected an annotation array or an export object with `annotations`")]
    UnexpectedShape,
    #[error("unsupported export version {0}")]
    UnsupportedVersion(u64),
}

/// Statistics about imported annotations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportStats {
    /// Records found in the input
    pub total_found: usize,
    /// Records converted into drafts
    pub imported: usize,
    /// Records dropped (malformed or unknown kind)
    pub skipped: usize,
    /// Imported count by annotation type
    pub by_type: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub drafts: Vec<AnnotationDraft>,
    pub stats: ImportStats,
}

pub fn export_annotations(document_id: Option<&DocumentId>, annotations: &[Annotation]) -> AnnotationExport {
    AnnotationExport {
        version: EXPORT_SCHEMA_VERSION,
        document_id: document_id.cloned(),
        exported_at: Some(Utc::now()),
        annotations: annotations.iter().map(annotation_to_record).collect(),
    }
}

pub fn export_json(
    document_id: Option<&DocumentId>,
    annotations: &[Annotation],
) -> Result<String, ExchangeError> {
    Ok(serde_json::to_string_pretty(&export_annotations(document_id, annotations))?)
}

fn records_from_json(json: &str) -> Result<Vec<Value>, ExchangeError> {
    let value: Value = serde_json::from_str(json)?;
    match value {
        Value::Array(records) => Ok(records),
        Value::Object(mut envelope) => {
            if let Some(version) = envelope.get("version").and_then(Value::as_u64) {
                if version > u64::from(EXPORT_SCHEMA_VERSION) {
                    return Err(ExchangeError::UnsupportedVersion(version));
                }
            }
            match envelope.remove("annotations") {
                Some(Value::Array(records)) => Ok(records),
                _ => Err(ExchangeError::UnexpectedShape),
            }
        }
        _ => Err(ExchangeError::UnexpectedShape),
    }
}

/// Read an export as annotations, keeping ids, documents and timestamps.
///
/// Records without an id get a positional `import-N` id. Unknown kinds are
/// kept; they simply render nothing.
pub fn read_annotations(json: &str) -> Result<Vec<Annotation>, ExchangeError> {
    let mut annotations = Vec::new();
    for (index, value) in records_from_json(json)?.into_iter().enumerate() {
        let mut record: AnnotationRecord = match serde_json::from_value(value) {
            Ok(record) => record,
            Err(err) => {
                log::warn!("skipping annotation #{index}: {err}");
                continue;
            }
        };
        if record.id.is_none() {
            record.id = Some(AnnotationId::new(format!("import-{index}")));
        }
        match annotation_from_record(&record) {
            Ok(annotation) => annotations.push(annotation),
            Err(err) => log::warn!("skipping annotation #{index}: {err}"),
        }
    }
    Ok(annotations)
}

/// Parse exported annotations into drafts for `target`.
///
/// Ids and timestamps are dropped so the receiving store assigns fresh ones,
/// and every draft is moved onto the target document.
pub fn import_json(json: &str, target: &DocumentId) -> Result<Import, ExchangeError> {
    let records = records_from_json(json)?;

    let mut stats = ImportStats { total_found: records.len(), ..ImportStats::default() };
    let mut drafts = Vec::with_capacity(records.len());

    for (index, value) in records.into_iter().enumerate() {
        let record: AnnotationRecord = match serde_json::from_value(value) {
            Ok(record) => record,
            Err(err) => {
                log::warn!("skipping annotation #{index}: {err}");
                stats.skipped += 1;
                continue;
            }
        };
        if !record.kind.is_known() {
            log::warn!("skipping annotation #{index}: unsupported type {}", record.kind);
            stats.skipped += 1;
            continue;
        }
        match draft_from_record(&record) {
            Ok(mut draft) => {
                draft.document_id = target.clone();
                *stats.by_type.entry(draft.kind.to_string()).or_insert(0) += 1;
                stats.imported += 1;
                drafts.push(draft);
            }
            Err(err) => {
                log::warn!("skipping annotation #{index}: {err}");
                stats.skipped += 1;
            }
        }
    }

    log::info!(
        "imported {} of {} annotations ({} skipped)",
        stats.imported,
        stats.total_found,
        stats.skipped
    );
    Ok(Import { drafts, stats })
}
