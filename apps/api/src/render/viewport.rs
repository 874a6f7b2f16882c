use serde::Serialize;

use crate::render::layout::PageGeometry;

/// How the fixed-width page is shown inside a container of a given width.
///
/// The page is never reflowed: narrower containers get a uniform scale-down, wider ones show
/// it at natural size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub scale: f32,
    /// Height the container must reserve when scaled; `None` means natural height.
    pub wrapper_height_px: Option<f32>,
}

impl Viewport {
    pub const UNSCALED: Viewport = Viewport {
        scale: 1.0,
        wrapper_height_px: None,
    };

    /// Non-positive or non-finite widths are treated as "unknown" and leave the page unscaled.
    pub fn fit(container_width_px: f32, page: &PageGeometry) -> Self {
        if !container_width_px.is_finite() || container_width_px <= 0.0 {
            return Self::UNSCALED;
        }
        if container_width_px >= page.width_px {
            return Self::UNSCALED;
        }
        let scale = container_width_px / page.width_px;
        Self {
            scale,
            wrapper_height_px: Some(page.height_px() * scale),
        }
    }
}
