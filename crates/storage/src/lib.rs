use chrono::Utc;
use directories::ProjectDirs;
use doc_model::AnnotationRecord;
use markup_core::store::{new_annotation_id, AnnotationStore, StoreError, StoreResult};
use markup_core::wire::{annotation_from_record, annotation_to_record};
use markup_core::{Annotation, AnnotationDraft, AnnotationId, AnnotationPatch, DocumentId, MarkupSettings};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

const SETTINGS_SCHEMA_VERSION: u32 = 1;
const ANNOTATIONS_SCHEMA_VERSION: u32 = 1;
const FILE_PREFIX_LEN: usize = 48;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("unable to resolve local data directory")]
    NoDataDirectory,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SettingsEnvelope {
    version: u32,
    settings: MarkupSettings,
}

impl Storage {
    pub fn from_default_project() -> Result<Self, StorageError> {
        let dirs =
            ProjectDirs::from("dev", "Markup", "Markup").ok_or(StorageError::NoDataDirectory)?;

        Ok(Self { root: dirs.data_local_dir().to_path_buf() })
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn load_settings(&self) -> Result<MarkupSettings, StorageError> {
        let path = self.settings_path();
        if !path.exists() {
            return Ok(MarkupSettings::default());
        }

        let bytes = fs::read(path)?;
        let envelope: SettingsEnvelope = serde_json::from_slice(&bytes)?;

        Ok(envelope.settings)
    }

    pub fn save_settings(&self, settings: &MarkupSettings) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root)?;

        let envelope =
            SettingsEnvelope { version: SETTINGS_SCHEMA_VERSION, settings: settings.clone() };

        let bytes = serde_json::to_vec_pretty(&envelope)?;
        fs::write(self.settings_path(), bytes)?;
        Ok(())
    }

    /// Annotation store rooted in this storage directory.
    pub fn annotation_store(&self) -> JsonFileStore {
        JsonFileStore::new(self.root.join("annotations"))
    }

    fn settings_path(&self) -> PathBuf {
        self.root.join("settings.json")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotationFile {
    version: u32,
    document_id: DocumentId,
    annotations: Vec<AnnotationRecord>,
}

/// Annotation store keeping one JSON file per document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File for `document_id`: a readable prefix plus a digest of the raw id,
    /// so ids that sanitize to the same prefix still get distinct files.
    fn path_for(&self, document_id: &DocumentId) -> PathBuf {
        let name: String = document_id
            .as_str()
            .chars()
            .take(FILE_PREFIX_LEN)
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{name}-{}.json", document_digest(document_id)))
    }

    fn read_file(&self, path: &Path) -> StoreResult<AnnotationFile> {
        let file: AnnotationFile = serde_json::from_slice(&fs::read(path)?)?;
        if file.version > ANNOTATIONS_SCHEMA_VERSION {
            return Err(StoreError::Backend(format!(
                "{} was written by a newer version (schema {})",
                path.display(),
                file.version
            )));
        }
        Ok(file)
    }

    fn read(&self, document_id: &DocumentId) -> StoreResult<Vec<AnnotationRecord>> {
        let path = self.path_for(document_id);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let file = self.read_file(&path)?;
        if &file.document_id != document_id {
            return Err(StoreError::Backend(format!(
                "{} belongs to document {}, not {document_id}",
                path.display(),
                file.document_id
            )));
        }
        Ok(file.annotations)
    }

    fn write(&self, document_id: &DocumentId, annotations: Vec<AnnotationRecord>) -> StoreResult<()> {
        fs::create_dir_all(&self.dir)?;
        let file = AnnotationFile {
            version: ANNOTATIONS_SCHEMA_VERSION,
            document_id: document_id.clone(),
            annotations,
        };
        let path = self.path_for(document_id);
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, serde_json::to_vec_pretty(&file)?)?;
        fs::rename(&staging, &path)?;
        Ok(())
    }

    /// Locate the file and index holding `id`.
    fn find(&self, id: &AnnotationId) -> StoreResult<(DocumentId, Vec<AnnotationRecord>, usize)> {
        if !self.dir.exists() {
            return Err(StoreError::NotFound(id.clone()));
        }
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let file = self.read_file(&path)?;
            if let Some(index) = file.annotations.iter().position(|r| r.id.as_ref() == Some(id)) {
                return Ok((file.document_id, file.annotations, index));
            }
        }
        Err(StoreError::NotFound(id.clone()))
    }
}

fn document_digest(document_id: &DocumentId) -> String {
    let mut hasher = Sha256::new();
    hasher.update(document_id.as_str().as_bytes());
    hasher.finalize().iter().take(8).map(|b| format!("{b:02x}")).collect()
}

impl AnnotationStore for JsonFileStore {
    fn create(&mut self, draft: AnnotationDraft) -> StoreResult<Annotation> {
        let document_id = draft.document_id.clone();
        let annotation = Annotation::from_draft(new_annotation_id(), draft, Utc::now());

        let mut records = self.read(&document_id)?;
        records.push(annotation_to_record(&annotation));
        self.write(&document_id, records)?;

        log::debug!("stored annotation {} for document {document_id}", annotation.id());
        Ok(annotation)
    }

    fn update(&mut self, id: &AnnotationId, patch: AnnotationPatch) -> StoreResult<Annotation> {
        let (document_id, mut records, index) = self.find(id)?;
        let mut annotation = annotation_from_record(&records[index])?;
        annotation.apply(patch, Utc::now());
        records[index] = annotation_to_record(&annotation);
        self.write(&document_id, records)?;
        Ok(annotation)
    }

    fn delete(&mut self, id: &AnnotationId) -> StoreResult<()> {
        let (document_id, mut records, index) = self.find(id)?;
        records.remove(index);
        self.write(&document_id, records)
    }

    fn list(&self, document_id: &DocumentId) -> StoreResult<Vec<Annotation>> {
        let records = self.read(document_id)?;
        let mut annotations = Vec::with_capacity(records.len());
        for record in &records {
            match annotation_from_record(record) {
                Ok(annotation) => annotations.push(annotation),
                Err(err) => log::warn!("skipping stored annotation in {document_id}: {err}"),
            }
        }
        Ok(annotations)
    }
}
