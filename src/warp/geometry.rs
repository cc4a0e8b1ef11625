//! Per-frame warp geometry.
//!
//! The warp maps a rectangular image into an arbitrary quad with two
//! sequential scanline passes instead of per-pixel projective math:
//!
//! 1. **Stage 1** (row-wise, image space): each horizontal image row is
//!    shifted and scaled as it descends from the top edge width to the bottom
//!    edge width, following the quad's left-edge slant.
//! 2. **Stage 2** (column-wise, intermediate space): each column of the
//!    stage-1 result is placed at its final x and stretched vertically
//!    between heights interpolated along the quad's top and bottom edges.
//!
//! The approximation is affine per scanline, which is adequate while the
//! per-frame quad distortion stays modest.

use crate::foundation::core::Canvas;
use crate::foundation::error::{PinwarpError, PinwarpResult};
use crate::tracking::model::FrameCorners;

/// An axis-aligned rectangle in the originating surface's own coordinate
/// space, `(x, y, width, height)` with fractional precision.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SliceRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl SliceRect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }
}

/// One (source rect, destination rect) unit of a staged blit.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScanlinePair {
    pub src: SliceRect,
    pub dst: SliceRect,
}

/// Precomputed warp geometry for a single frame. Immutable once produced.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameGeometry {
    /// Width of the intermediate surface (`max(P1.x, P3.x) - min(P0.x, P2.x)`).
    pub width: f64,
    /// Height of the intermediate surface (the image's natural height).
    pub height: u32,
    /// Row-wise pairs, image space -> intermediate space. Exactly `height`
    /// entries, in row order.
    pub stage1: Vec<ScanlinePair>,
    /// Column-wise pairs, intermediate space -> final space. Exactly
    /// `floor(width)` entries, in column order.
    pub stage2: Vec<ScanlinePair>,
}

/// Compute the two-stage scanline geometry for one frame.
pub fn prerender_frame(corners: &FrameCorners, image: Canvas) -> PinwarpResult<FrameGeometry> {
    corners.validate()?;
    if image.width == 0 || image.height == 0 {
        return Err(PinwarpError::media(
            "warp source image must have non-zero dimensions",
        ));
    }

    let p0 = corners.top_left;
    let p1 = corners.top_right;
    let p2 = corners.bottom_left;
    let p3 = corners.bottom_right;
    let w = f64::from(image.width);
    let h = f64::from(image.height);

    let left_space = p0.x.min(p2.x);
    let total_width = p1.x.max(p3.x) - left_space;
    let top_width = p1.x - p0.x;
    let bottom_width = p3.x - p2.x;
    let left_change = p2.x - p0.x;

    let mut stage1 = Vec::with_capacity(image.height as usize);
    for i in 0..image.height {
        let fi = f64::from(i);
        stage1.push(ScanlinePair {
            src: SliceRect::new(0.0, fi, w, 1.0),
            dst: SliceRect::new(
                left_change * fi / h,
                fi,
                ((top_width * (h - fi) + bottom_width * fi) / h).abs(),
                1.0,
            ),
        });
    }

    // Similar-triangles extrapolation of the top and bottom edges out to the
    // vertical lines x = left_space and x = left_space + total_width. The
    // bottom anchors are stored relative to the top anchors (heights).
    let left_top = p0.y - (p1.y - p0.y) * (p0.x - left_space) / (p1.x - p0.x);
    let right_top = p1.y + (p1.y - p0.y) * (left_space + total_width - p1.x) / (p1.x - p0.x);
    let left_bottom = p2.y - (p3.y - p2.y) * (p2.x - left_space) / (p3.x - p2.x) - left_top;
    let right_bottom =
        p3.y + (p3.y - p2.y) * (left_space + total_width - p3.x) / (p3.x - p2.x) - right_top;

    let columns = total_width.floor().max(0.0) as u32;
    let mut stage2 = Vec::with_capacity(columns as usize);
    for i in 0..columns {
        let fi = f64::from(i);
        stage2.push(ScanlinePair {
            src: SliceRect::new(fi, 0.0, 1.0, h),
            dst: SliceRect::new(
                left_space + fi,
                (left_top * (total_width - fi) + right_top * fi) / total_width,
                1.0,
                (left_bottom * (total_width - fi) + right_bottom * fi) / total_width,
            ),
        });
    }

    Ok(FrameGeometry {
        width: total_width,
        height: image.height,
        stage1,
        stage2,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/warp/geometry.rs"]
mod tests;
