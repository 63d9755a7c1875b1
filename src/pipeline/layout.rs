//! Page geometry: the fixed target page and fit-to-page placement.
//!
//! All lengths are PDF points (1/72 inch).

use serde::{Deserialize, Serialize};

const MM_PER_INCH: f32 = 25.4;
const POINTS_PER_INCH: f32 = 72.0;

/// Width × height of a page in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn from_mm(width_mm: f32, height_mm: f32) -> Self {
        Self {
            width: width_mm * POINTS_PER_INCH / MM_PER_INCH,
            height: height_mm * POINTS_PER_INCH / MM_PER_INCH,
        }
    }

    /// Same page with the longer side horizontal.
    pub fn landscape(self) -> Self {
        if self.width >= self.height {
            self
        } else {
            Self::new(self.height, self.width)
        }
    }
}

/// A5 (148 × 210 mm) turned landscape: 595.28 × 419.53 pt.
pub fn a5_landscape() -> PageSize {
    PageSize::from_mm(148.0, 210.0).landscape()
}

/// Physical size of a raster rendered at `dpi`.
pub fn image_size_points(pixel_width: u32, pixel_height: u32, dpi: u32) -> PageSize {
    let dpi = dpi as f32;
    PageSize::new(
        pixel_width as f32 * POINTS_PER_INCH / dpi,
        pixel_height as f32 * POINTS_PER_INCH / dpi,
    )
}

/// Where and how large an image is drawn on the target page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Uniform scale applied to the image's natural size; never above 1.
    pub scale: f32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Shrink `image` to fit inside `target` without distortion and centre it.
///
/// Images already fitting keep their natural size (`scale == 1.0`).
pub fn fit_centered(image: PageSize, target: PageSize) -> Placement {
    let scale = (target.width / image.width)
        .min(target.height / image.height)
        .min(1.0);
    let width = image.width * scale;
    let height = image.height * scale;
    Placement {
        scale,
        x: (target.width - width) / 2.0,
        y: (target.height - height) / 2.0,
        width,
        height,
    }
}
