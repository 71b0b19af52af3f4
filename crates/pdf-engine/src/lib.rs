//! Page geometry from PDF files, backed by lopdf.

use lopdf::{Dictionary, Document, Object};
use std::fs;
use std::path::{Path, PathBuf};
use viewer_core::{PageSource, PageSourceError, Size};

/// US Letter, used when a page carries no usable MediaBox.
const FALLBACK_PAGE_SIZE: Size = Size::new(612.0, 792.0);

#[derive(Debug, Clone)]
pub enum OpenSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl From<PathBuf> for OpenSource {
    fn from(value: PathBuf) -> Self {
        Self::Path(value)
    }
}

impl From<&Path> for OpenSource {
    fn from(value: &Path) -> Self {
        Self::Path(value.to_path_buf())
    }
}

impl From<Vec<u8>> for OpenSource {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PdfEngineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF parse error: {0}")]
    Parse(#[from] lopdf::Error),
    #[error("encrypted PDFs are not supported")]
    EncryptedUnsupported,
    #[error("document has no pages")]
    NoPages,
}

/// Page sizes of one PDF, as displayed (rotation applied).
#[derive(Debug, Clone)]
pub struct LopdfPageSource {
    page_sizes: Vec<Size>,
}

impl LopdfPageSource {
    pub fn open(source: impl Into<OpenSource>) -> Result<Self, PdfEngineError> {
        let bytes = match source.into() {
            OpenSource::Path(path) => fs::read(path)?,
            OpenSource::Bytes(bytes) => bytes,
        };
        let page_sizes = parse_sizes(&bytes)?;
        log::debug!("opened PDF with {} pages", page_sizes.len());
        Ok(Self { page_sizes })
    }
}

impl PageSource for LopdfPageSource {
    fn page_count(&self) -> u32 {
        self.page_sizes.len() as u32
    }

    fn page_size(&self, page: u32) -> Result<Size, PageSourceError> {
        page.checked_sub(1)
            .and_then(|index| self.page_sizes.get(index as usize))
            .copied()
            .ok_or(PageSourceError::PageOutOfRange { page, page_count: self.page_count() })
    }
}

fn parse_sizes(bytes: &[u8]) -> Result<Vec<Size>, PdfEngineError> {
    if bytes.windows("/Encrypt".len()).any(|window| window == b"/Encrypt") {
        return Err(PdfEngineError::EncryptedUnsupported);
    }

    let doc = Document::load_mem(bytes)?;
    let pages = doc.get_pages();
    let mut sizes = Vec::with_capacity(pages.len());

    for (number, object_id) in pages {
        let dict = doc.get_dictionary(object_id)?;
        let size = inherited(&doc, dict, b"MediaBox")
            .and_then(media_box_size)
            .unwrap_or_else(|| {
                log::warn!("page {number} has no usable MediaBox, assuming US Letter");
                FALLBACK_PAGE_SIZE
            });
        let rotate = inherited(&doc, dict, b"Rotate").and_then(|obj| obj.as_i64().ok()).unwrap_or(0);
        sizes.push(if rotate.rem_euclid(180) == 90 { Size::new(size.height, size.width) } else { size });
    }

    if sizes.is_empty() {
        return Err(PdfEngineError::NoPages);
    }

    Ok(sizes)
}

/// Look up a page attribute, walking up the page tree for inheritable keys.
fn inherited<'a>(doc: &'a Document, mut dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    // Bounded walk: malformed files can contain Parent cycles
    for _ in 0..32 {
        if let Ok(value) = dict.get(key) {
            return Some(value);
        }
        let parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
        dict = doc.get_dictionary(parent).ok()?;
    }
    None
}

fn media_box_size(obj: &Object) -> Option<Size> {
    let array = obj.as_array().ok()?;
    if array.len() != 4 {
        return None;
    }
    let x0 = array[0].as_float().ok()?;
    let y0 = array[1].as_float().ok()?;
    let x1 = array[2].as_float().ok()?;
    let y1 = array[3].as_float().ok()?;
    Some(Size::new(f64::from((x1 - x0).abs()), f64::from((y1 - y0).abs())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    /// Minimal PDF with one page per (media box, rotation) entry. The first
    /// entry's box is put on the page tree root and inherited when `inherit`.
    fn pdf_bytes(pages: &[([i64; 4], i64)], inherit: bool) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut kids = Vec::new();
        for (index, (media_box, rotate)) in pages.iter().enumerate() {
            let mut page = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Rotate" => *rotate,
            };
            if !(inherit && index == 0) {
                page.set("MediaBox", media_box.iter().map(|v| Object::Integer(*v)).collect::<Vec<_>>());
            }
            kids.push(Object::Reference(doc.add_object(page)));
        }
        let mut tree = dictionary! {
            "Type" => "Pages",
            "Count" => pages.len() as i64,
            "Kids" => kids,
        };
        if inherit {
            tree.set("MediaBox", pages[0].0.iter().map(|v| Object::Integer(*v)).collect::<Vec<_>>());
        }
        doc.objects.insert(pages_id, Object::Dictionary(tree));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).expect("serialize test PDF");
        bytes
    }

    #[test]
    fn reads_page_count_and_sizes() {
        let bytes = pdf_bytes(&[([0, 0, 612, 792], 0), ([0, 0, 842, 595], 0)], false);
        let source = LopdfPageSource::open(bytes).expect("open should succeed");

        assert_eq!(source.page_count(), 2);
        assert_eq!(source.page_size(1).expect("page 1"), Size::new(612.0, 792.0));
        assert_eq!(source.page_size(2).expect("page 2"), Size::new(842.0, 595.0));
        assert_eq!(source.viewport(2, 2.0).expect("page 2"), Size::new(1684.0, 1190.0));
    }

    #[test]
    fn rotation_swaps_axes() {
        let bytes = pdf_bytes(&[([0, 0, 612, 792], 90)], false);
        let source = LopdfPageSource::open(bytes).expect("open should succeed");
        assert_eq!(source.page_size(1).expect("page 1"), Size::new(792.0, 612.0));
    }

    #[test]
    fn media_box_is_inherited_from_page_tree() {
        let bytes = pdf_bytes(&[([0, 0, 300, 400], 0)], true);
        let source = LopdfPageSource::open(bytes).expect("open should succeed");
        assert_eq!(source.page_size(1).expect("page 1"), Size::new(300.0, 400.0));
    }

    #[test]
    fn out_of_range_pages_are_errors() {
        let bytes = pdf_bytes(&[([0, 0, 612, 792], 0)], false);
        let source = LopdfPageSource::open(bytes).expect("open should succeed");
        assert!(matches!(
            source.page_size(0),
            Err(PageSourceError::PageOutOfRange { page: 0, page_count: 1 })
        ));
        assert!(matches!(
            source.page_size(2),
            Err(PageSourceError::PageOutOfRange { page: 2, page_count: 1 })
        ));
    }

    #[test]
    fn opens_from_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("one.pdf");
        fs::write(&path, pdf_bytes(&[([0, 0, 200, 100], 0)], false)).expect("write");

        let source = LopdfPageSource::open(path).expect("open should succeed");
        assert_eq!(source.page_count(), 1);
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let err = LopdfPageSource::open(b"not a pdf".to_vec()).expect_err("should fail");
        assert!(matches!(err, PdfEngineError::Parse(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = LopdfPageSource::open(PathBuf::from("/nonexistent/markup.pdf")).expect_err("should fail");
        assert!(matches!(err, PdfEngineError::Io(_)));
    }
}
