//! Placeholder page rasterizer and the annotation overlay surface.
//!
//! The interaction and export engines only depend on the pixel dimensions
//! the renderer reports; the painted raster itself is presentation detail.

use crate::PageSize;
use image::{ImageBuffer, Rgba};

pub type RgbaImage = ImageBuffer<Rgba<u8>, Vec<u8>>;

/// A rendered page raster plus its pixel dimensions at the requested scale.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub width_px: u32,
    pub height_px: u32,
    pub image: RgbaImage,
}

/// Paints one page at a scale factor and reports the resulting pixel size.
///
/// The annotation canvas is sized to exactly these dimensions so that canvas
/// pixels and rendered page pixels share one coordinate space.
pub trait PageRenderer {
    fn render_page(&self, page: PageSize, scale: f32) -> RenderedPage;
}

/// Default renderer: paints a white page with a light border.
///
/// Stands in for a real rasterizer backend; dimensions are exact, pixels are
/// placeholder.
#[derive(Debug, Default)]
pub struct RasterRenderer;

impl RasterRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl PageRenderer for RasterRenderer {
    fn render_page(&self, page: PageSize, scale: f32) -> RenderedPage {
        let scale = if scale <= 0.0 { 1.0 } else { scale };
        let width = (page.width_pt * scale).round().max(1.0) as u32;
        let height = (page.height_pt * scale).round().max(1.0) as u32;

        let mut image = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));

        if width >= 4 && height >= 4 {
            for x in 0..width {
                image.put_pixel(x, 0, Rgba([220, 220, 220, 255]));
                image.put_pixel(x, height - 1, Rgba([220, 220, 220, 255]));
            }
            for y in 0..height {
                image.put_pixel(0, y, Rgba([220, 220, 220, 255]));
                image.put_pixel(width - 1, y, Rgba([220, 220, 220, 255]));
            }
        }

        RenderedPage { width_px: width, height_px: height, image }
    }
}

/// Transparent raster surface the annotation strokes are painted onto.
///
/// The eraser tool clears discs of pixels here; it never touches the element
/// set (visual scratch-out, not semantic delete).
#[derive(Debug, Clone)]
pub struct Overlay {
    image: RgbaImage,
}

impl Overlay {
    /// Create a fully transparent overlay matching the rendered page size.
    pub fn new(width_px: u32, height_px: u32) -> Self {
        Self { image: RgbaImage::from_pixel(width_px.max(1), height_px.max(1), Rgba([0, 0, 0, 0])) }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn image_mut(&mut self) -> &mut RgbaImage {
        &mut self.image
    }

    /// Clear every pixel within `radius` of `(cx, cy)` back to transparent.
    pub fn erase_disc(&mut self, cx: f32, cy: f32, radius: f32) {
        let radius = radius.max(0.0);
        let min_x = (cx - radius).floor().max(0.0) as u32;
        let min_y = (cy - radius).floor().max(0.0) as u32;
        let max_x = ((cx + radius).ceil() as u32).min(self.image.width().saturating_sub(1));
        let max_y = ((cy + radius).ceil() as u32).min(self.image.height().saturating_sub(1));
        let radius_sq = radius * radius;

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let dx = x as f32 - cx;
                let dy = y as f32 - cy;
                if dx * dx + dy * dy <= radius_sq {
                    self.image.put_pixel(x, y, Rgba([0, 0, 0, 0]));
                }
            }
        }
    }
}
