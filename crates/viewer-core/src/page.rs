//! Page geometry supplied by the PDF rendering backend
//!
//! The overlay is laid over a page rendered at `scale == zoom`; annotations
//! only line up when that correspondence holds, so the viewport size of a
//! page is always computed here from the unscaled page size.

use crate::coords::Size;

#[derive(Debug, thiserror::Error)]
pub enum PageSourceError {
    #[error("page {page} out of range (page_count={page_count})")]
    PageOutOfRange { page: u32, page_count: u32 },
    #[error("backend error: {0}")]
    Backend(String),
}

/// Read-only view of a loaded document's pages. Pages are 1-based.
pub trait PageSource {
    fn page_count(&self) -> u32;

    /// Unscaled page size in document-space pixels.
    fn page_size(&self, page: u32) -> Result<Size, PageSourceError>;

    /// Size of the page rendered at `scale`.
    fn viewport(&self, page: u32, scale: f64) -> Result<Size, PageSourceError> {
        Ok(self.page_size(page)?.scaled(scale))
    }
}

/// Page sizes known up front. Used when no PDF is at hand.
#[derive(Debug, Clone, Default)]
pub struct FixedPages {
    sizes: Vec<Size>,
}

impl FixedPages {
    pub fn new(sizes: Vec<Size>) -> Self {
        Self { sizes }
    }

    /// `count` pages of US Letter at 72 dpi.
    pub fn letter(count: u32) -> Self {
        Self::new(vec![Size::new(612.0, 792.0); count as usize])
    }
}

impl PageSource for FixedPages {
    fn page_count(&self) -> u32 {
        self.sizes.len() as u32
    }

    fn page_size(&self, page: u32) -> Result<Size, PageSourceError> {
        page.checked_sub(1)
            .and_then(|index| self.sizes.get(index as usize))
            .copied()
            .ok_or(PageSourceError::PageOutOfRange { page, page_count: self.page_count() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_scales_page_size_by_zoom() {
        let pages = FixedPages::letter(2);
        let viewport = pages.viewport(2, 1.5).expect("page 2 exists");
        assert_eq!(viewport, Size::new(918.0, 1188.0));
    }

    #[test]
    fn page_zero_and_past_end_are_rejected() {
        let pages = FixedPages::letter(1);
        assert!(matches!(
            pages.page_size(0),
            Err(PageSourceError::PageOutOfRange { page: 0, page_count: 1 })
        ));
        assert!(pages.page_size(2).is_err());
    }
}
