//! Explicit multi-panel canvas.
//!
//! Panels are laid out on a fixed grid of equally sized slots. Each panel
//! image is alpha-composited over the canvas background at its slot.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{RenderError, Result};
use crate::gradient::RgbaImage;
use crate::png::encode_png;

/// Slot arrangement of a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelLayout {
    pub rows: usize,
    pub columns: usize,
    pub panel_width: usize,
    pub panel_height: usize,
    /// Pixels between slots and around the border
    #[serde(default)]
    pub gap: usize,
}

impl PanelLayout {
    /// Two rows of two panels.
    pub fn two_by_two(panel_width: usize, panel_height: usize) -> Self {
        Self {
            rows: 2,
            columns: 2,
            panel_width,
            panel_height,
            gap: 8,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.columns == 0 {
            return Err(RenderError::layout(format!(
                "{}x{} panels",
                self.rows, self.columns
            )));
        }
        if self.panel_width == 0 || self.panel_height == 0 {
            return Err(RenderError::layout(format!(
                "panel size {}x{}",
                self.panel_width, self.panel_height
            )));
        }
        Ok(())
    }

    pub fn slots(&self) -> usize {
        self.rows * self.columns
    }

    pub fn canvas_size(&self) -> (usize, usize) {
        (
            self.columns * self.panel_width + (self.columns + 1) * self.gap,
            self.rows * self.panel_height + (self.rows + 1) * self.gap,
        )
    }

    /// Top-left pixel of slot `index`, counted row by row from the top left.
    pub fn origin(&self, index: usize) -> Option<(usize, usize)> {
        if index >= self.slots() {
            return None;
        }
        let (row, column) = (index / self.columns, index % self.columns);
        Some((
            self.gap + column * (self.panel_width + self.gap),
            self.gap + row * (self.panel_height + self.gap),
        ))
    }
}

/// A raster being assembled from panels.
#[derive(Debug, Clone)]
pub struct Canvas {
    layout: PanelLayout,
    image: RgbaImage,
}

impl Canvas {
    pub fn new(layout: PanelLayout, background: [u8; 4]) -> Result<Self> {
        layout.validate()?;
        let (width, height) = layout.canvas_size();
        Ok(Self {
            layout,
            image: RgbaImage::filled(width, height, background),
        })
    }

    pub fn layout(&self) -> &PanelLayout {
        &self.layout
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Composite `panel` into slot `index`.
    pub fn draw_panel(&mut self, index: usize, panel: &RgbaImage) -> Result<()> {
        let (x0, y0) = self.layout.origin(index).ok_or_else(|| {
            RenderError::layout(format!(
                "slot {} out of range for {} slots",
                index,
                self.layout.slots()
            ))
        })?;
        if panel.width() != self.layout.panel_width || panel.height() != self.layout.panel_height
        {
            return Err(RenderError::layout(format!(
                "panel is {}x{}, slot is {}x{}",
                panel.width(),
                panel.height(),
                self.layout.panel_width,
                self.layout.panel_height
            )));
        }

        let canvas_width = self.image.width();
        let source = panel.pixels();
        let row_bytes = panel.width() * 4;
        let target = self.image.pixels_mut();

        for (row, src_row) in source.chunks_exact(row_bytes).enumerate() {
            let start = ((y0 + row) * canvas_width + x0) * 4;
            let dst_row = &mut target[start..start + row_bytes];
            for (dst, src) in dst_row.chunks_exact_mut(4).zip(src_row.chunks_exact(4)) {
                blend_over(dst, src);
            }
        }
        Ok(())
    }

    pub fn to_png(&self) -> Result<Vec<u8>> {
        encode_png(&self.image)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let png = self.to_png()?;
        std::fs::write(path, &png)
            .map_err(|e| RenderError::Io(format!("{}: {}", path.display(), e)))?;
        info!(
            path = %path.display(),
            width = self.image.width(),
            height = self.image.height(),
            bytes = png.len(),
            "Saved canvas"
        );
        Ok(())
    }
}

/// Source-over compositing of straight-alpha RGBA8.
fn blend_over(dst: &mut [u8], src: &[u8]) {
    let sa = src[3] as f64 / 255.0;
    if sa <= 0.0 {
        return;
    }
    let da = dst[3] as f64 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    for c in 0..3 {
        let s = src[c] as f64 / 255.0;
        let d = dst[c] as f64 / 255.0;
        let v = (s * sa + d * da * (1.0 - sa)) / out_a;
        dst[c] = (v * 255.0).round() as u8;
    }
    dst[3] = (out_a * 255.0).round() as u8;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_by_two_origins() {
        let layout = PanelLayout::two_by_two(10, 5);
        assert_eq!(layout.canvas_size(), (44, 34));
        assert_eq!(layout.origin(0), Some((8, 8)));
        assert_eq!(layout.origin(3), Some((26, 21)));
        assert_eq!(layout.origin(4), None);
    }

    #[test]
    fn test_blend_over() {
        let mut dst = [255, 255, 255, 255];
        blend_over(&mut dst, &[0, 0, 0, 0]);
        assert_eq!(dst, [255, 255, 255, 255]);

        blend_over(&mut dst, &[0, 0, 0, 255]);
        assert_eq!(dst, [0, 0, 0, 255]);
    }
}
