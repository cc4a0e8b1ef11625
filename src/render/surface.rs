//! CPU drawing surfaces.
//!
//! A [`Surface`] is a premultiplied RGBA8 pixel buffer. [`Surface::blit_scaled`]
//! is the workhorse of both warp stages: it stretches a fractional source
//! rectangle into a fractional destination rectangle with nearest-neighbor
//! sampling and source-over compositing.

use crate::foundation::core::Vec2;
use crate::foundation::error::{PinwarpError, PinwarpResult};
use crate::warp::geometry::SliceRect;

/// Premultiplied RGBA8 pixel buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Surface {
    /// A transparent surface of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
        }
    }

    /// Wrap an existing premultiplied RGBA8 buffer.
    pub fn from_rgba8_premul(width: u32, height: u32, data: Vec<u8>) -> PinwarpResult<Self> {
        if data.len() != width as usize * height as usize * 4 {
            return Err(PinwarpError::render(format!(
                "surface buffer size {} does not match {width}x{height} rgba8",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let off = (y as usize * self.width as usize + x as usize) * 4;
        Some([
            self.data[off],
            self.data[off + 1],
            self.data[off + 2],
            self.data[off + 3],
        ])
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Resize and clear, reusing the allocation where possible.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        let len = width as usize * height as usize * 4;
        self.data.clear();
        self.data.resize(len, 0);
    }

    /// Draw `src` at (0, 0), replacing pixels. Clipped to both surfaces.
    pub fn copy_from(&mut self, src: &Surface) {
        let rows = self.height.min(src.height) as usize;
        let row_bytes = (self.width.min(src.width) as usize) * 4;
        for y in 0..rows {
            let dst_off = y * self.width as usize * 4;
            let src_off = y * src.width as usize * 4;
            self.data[dst_off..dst_off + row_bytes]
                .copy_from_slice(&src.data[src_off..src_off + row_bytes]);
        }
    }

    /// Stretch `src_rect` of `src` into `dst_rect` of `self`, offset by
    /// `origin` (the drawing-origin translation), with nearest-neighbor
    /// sampling and source-over compositing. Output is clipped to `self`.
    ///
    /// A zero or negative rectangle dimension is a render error; callers
    /// decide whether that aborts the tick or only skips the overlay.
    pub fn blit_scaled(
        &mut self,
        src: &Surface,
        src_rect: SliceRect,
        dst_rect: SliceRect,
        origin: Vec2,
    ) -> PinwarpResult<()> {
        if !(src_rect.w > 0.0 && src_rect.h > 0.0) {
            return Err(PinwarpError::render(format!(
                "source rectangle must have positive size, got {}x{}",
                src_rect.w, src_rect.h
            )));
        }
        if !(dst_rect.w > 0.0 && dst_rect.h > 0.0) {
            return Err(PinwarpError::render(format!(
                "destination rectangle must have positive size, got {}x{}",
                dst_rect.w, dst_rect.h
            )));
        }
        if src.width == 0 || src.height == 0 {
            return Err(PinwarpError::render("source surface is empty"));
        }

        let dx = dst_rect.x + origin.x;
        let dy = dst_rect.y + origin.y;
        let x0 = (dx.floor() as i64).max(0);
        let y0 = (dy.floor() as i64).max(0);
        let x1 = ((dx + dst_rect.w).ceil() as i64).min(self.width as i64);
        let y1 = ((dy + dst_rect.h).ceil() as i64).min(self.height as i64);

        for py in y0..y1 {
            // Map the destination pixel center back into the source rect.
            let v = ((py as f64 + 0.5 - dy) / dst_rect.h).clamp(0.0, 1.0);
            let sy = sample_index(src_rect.y + v * src_rect.h, src.height);
            for px in x0..x1 {
                let u = ((px as f64 + 0.5 - dx) / dst_rect.w).clamp(0.0, 1.0);
                let sx = sample_index(src_rect.x + u * src_rect.w, src.width);
                let src_off = (sy * src.width as usize + sx) * 4;
                let s = [
                    src.data[src_off],
                    src.data[src_off + 1],
                    src.data[src_off + 2],
                    src.data[src_off + 3],
                ];
                let dst_off = (py as usize * self.width as usize + px as usize) * 4;
                over_px(&mut self.data[dst_off..dst_off + 4], s);
            }
        }
        Ok(())
    }
}

/// Nearest-neighbor sample coordinate, clamped into the surface.
fn sample_index(coord: f64, extent: u32) -> usize {
    let max = extent as i64 - 1;
    (coord.floor() as i64).clamp(0, max) as usize
}

/// Source-over for premultiplied RGBA8.
fn over_px(dst: &mut [u8], src: [u8; 4]) {
    match src[3] {
        0 => {}
        255 => dst.copy_from_slice(&src),
        sa => {
            let inv = 255u16 - u16::from(sa);
            for i in 0..4 {
                dst[i] = src[i].saturating_add(mul_div255(u16::from(dst[i]), inv));
            }
        }
    }
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
