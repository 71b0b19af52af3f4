//! Viewport state and the double-click zoom cycle
//!
//! Double-clicking a page steps the zoom 1x -> 2x -> 4x -> 1x and scrolls so
//! the clicked content point ends up centered. The zoom is applied right
//! away; the scroll has to wait until the surface has been laid out at the
//! new size, so it is parked as a pending offset until the caller reports
//! that layout settled.

use crate::coords::{Size, ViewPoint};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const MIN_ZOOM: f64 = 0.25;
pub const MAX_ZOOM: f64 = 5.0;
pub const RECENTER_MAX_ZOOM: f64 = 4.0;
pub const ZOOM_STEP: f64 = 0.25;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ViewportError {
    #[error("page numbers are 1-based, got {0}")]
    InvalidPage(u32),
    #[error("rotation must be 0, 90, 180 or 270 degrees, got {0}")]
    InvalidRotation(u16),
    #[error("zoom must be a finite positive number, got {0}")]
    InvalidZoom(f64),
}

/// Zoom behaviour knobs, part of the user settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ZoomSettings {
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Ceiling of the double-click cycle; reaching it wraps back to 1x.
    pub recenter_max_zoom: f64,
    /// How long the caller should wait before applying a pending scroll.
    pub settle_delay_ms: u64,
}

impl Default for ZoomSettings {
    fn default() -> Self {
        Self {
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            recenter_max_zoom: RECENTER_MAX_ZOOM,
            settle_delay_ms: 50,
        }
    }
}

impl ZoomSettings {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn clamp(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    pub fn from_degrees(degrees: u16) -> Result<Self, ViewportError> {
        match degrees % 360 {
            0 => Ok(Self::Deg0),
            90 => Ok(Self::Deg90),
            180 => Ok(Self::Deg180),
            270 => Ok(Self::Deg270),
            _ => Err(ViewportError::InvalidRotation(degrees)),
        }
    }

    pub fn degrees(self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    pub fn rotated_clockwise(self) -> Self {
        match self {
            Self::Deg0 => Self::Deg90,
            Self::Deg90 => Self::Deg180,
            Self::Deg180 => Self::Deg270,
            Self::Deg270 => Self::Deg0,
        }
    }
}

/// Scroll position of the page container, in view-space pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollOffset {
    pub x: f64,
    pub y: f64,
}

impl ScrollOffset {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Ephemeral view state owned by the page controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    zoom: f64,
    rotation: Rotation,
    page: u32,
    scroll: ScrollOffset,
    /// Size of the visible scroll container (not the page surface).
    size: Size,
    #[serde(skip)]
    settings: ZoomSettings,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(Size::new(1280.0, 800.0))
    }
}

impl Viewport {
    pub fn new(size: Size) -> Self {
        Self::with_settings(size, ZoomSettings::default())
    }

    pub fn with_settings(size: Size, settings: ZoomSettings) -> Self {
        Self {
            zoom: 1.0,
            rotation: Rotation::Deg0,
            page: 1,
            scroll: ScrollOffset::default(),
            size,
            settings,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn scroll(&self) -> ScrollOffset {
        self.scroll
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn settings(&self) -> &ZoomSettings {
        &self.settings
    }

    /// Set the zoom, clamped to the configured bounds.
    pub fn set_zoom(&mut self, zoom: f64) -> Result<f64, ViewportError> {
        if !zoom.is_finite() || zoom <= 0.0 {
            return Err(ViewportError::InvalidZoom(zoom));
        }
        self.zoom = self.settings.clamp(zoom);
        Ok(self.zoom)
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.zoom = self.settings.clamp(self.zoom + ZOOM_STEP);
        self.zoom
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.zoom = self.settings.clamp(self.zoom - ZOOM_STEP);
        self.zoom
    }

    pub fn set_page(&mut self, page: u32) -> Result<(), ViewportError> {
        if page == 0 {
            return Err(ViewportError::InvalidPage(page));
        }
        if page != self.page {
            self.page = page;
            self.scroll = ScrollOffset::default();
        }
        Ok(())
    }

    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    pub fn set_scroll(&mut self, scroll: ScrollOffset) {
        self.scroll = ScrollOffset::new(scroll.x.max(0.0), scroll.y.max(0.0));
    }

    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }
}

/// Next step of the double-click zoom cycle.
pub fn next_cycle_zoom(current: f64, cycle_max: f64) -> f64 {
    if current >= cycle_max {
        1.0
    } else {
        (current * 2.0).min(cycle_max)
    }
}

/// Zoom and scroll produced by one double-click.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecenterPlan {
    pub previous_zoom: f64,
    pub zoom: f64,
    pub scroll: ScrollOffset,
}

/// Compute the re-center plan for a double-click at `click` (view space,
/// relative to the scroll container's top-left).
pub fn plan_recenter(
    click: ViewPoint,
    current_zoom: f64,
    scroll: ScrollOffset,
    viewport_size: Size,
    settings: &ZoomSettings,
) -> RecenterPlan {
    // The cycle tops out at whichever ceiling is lower so it still wraps.
    let cycle_max = settings.recenter_max_zoom.min(settings.max_zoom);
    let zoom = settings.clamp(next_cycle_zoom(current_zoom, cycle_max));
    let ratio = zoom / current_zoom;

    let content_x = click.x + scroll.x;
    let content_y = click.y + scroll.y;

    let scroll = ScrollOffset::new(
        (content_x * ratio - viewport_size.width / 2.0).max(0.0),
        (content_y * ratio - viewport_size.height / 2.0).max(0.0),
    );

    RecenterPlan { previous_zoom: current_zoom, zoom, scroll }
}

/// Applies double-click re-centering to a [`Viewport`].
#[derive(Debug, Default)]
pub struct RecenterController {
    pending_scroll: Option<ScrollOffset>,
}

impl RecenterController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the zoom change now and park the scroll until layout settles.
    ///
    /// A second double-click before the first settles replaces the pending
    /// scroll with the newer plan.
    pub fn on_double_click(&mut self, click: ViewPoint, viewport: &mut Viewport) -> RecenterPlan {
        let plan = plan_recenter(
            click,
            viewport.zoom,
            viewport.scroll,
            viewport.size,
            &viewport.settings,
        );

        viewport.zoom = plan.zoom;
        self.pending_scroll = Some(plan.scroll);

        log::debug!(
            "double-click zoom {} -> {}, pending scroll ({}, {})",
            plan.previous_zoom,
            plan.zoom,
            plan.scroll.x,
            plan.scroll.y
        );

        plan
    }

    pub fn pending_scroll(&self) -> Option<ScrollOffset> {
        self.pending_scroll
    }

    /// Apply the parked scroll once the surface has re-laid-out.
    pub fn on_layout_settled(&mut self, viewport: &mut Viewport) -> Option<ScrollOffset> {
        let scroll = self.pending_scroll.take()?;
        viewport.set_scroll(scroll);
        Some(viewport.scroll)
    }
}
