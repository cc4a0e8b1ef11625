use super::*;

use std::sync::Arc;

use crate::foundation::core::{Canvas, Fps, Point};
use crate::tracking::model::{FrameCorners, TrackMeta};
use crate::warp::prerender::Prerenderer;

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];

fn solid(width: u32, height: u32, px: [u8; 4]) -> Surface {
    let mut data = Vec::with_capacity(width as usize * height as usize * 4);
    for _ in 0..width * height {
        data.extend_from_slice(&px);
    }
    Surface::from_rgba8_premul(width, height, data).unwrap()
}

fn meta() -> TrackMeta {
    TrackMeta {
        fps: Fps::new(24, 1).unwrap(),
        width: 16,
        height: 16,
        source_pixel_aspect: 1.0,
        comp_pixel_aspect: 1.0,
    }
}

fn rect_corners(x: f64, y: f64, w: f64, h: f64) -> FrameCorners {
    FrameCorners::new(
        Point::new(x, y),
        Point::new(x + w, y),
        Point::new(x, y + h),
        Point::new(x + w, y + h),
    )
}

fn sequence_of(frames: Vec<FrameCorners>) -> Arc<TrackingSequence> {
    Arc::new(TrackingSequence::new(meta(), frames).unwrap())
}

fn table_for(sequence: &Arc<TrackingSequence>, image: &Surface) -> GeometryTable {
    let mut pre = Prerenderer::new(
        sequence.clone(),
        Canvas {
            width: image.width(),
            height: image.height(),
        },
    );
    pre.run_to_completion().unwrap();
    pre.into_table().unwrap()
}

#[test]
fn overlay_lands_inside_the_quad() {
    let image = solid(4, 4, RED);
    let video = solid(16, 16, BLUE);
    let seq = sequence_of(vec![
        rect_corners(2.0, 2.0, 4.0, 4.0),
        rect_corners(2.0, 2.0, 4.0, 4.0),
    ]);
    let table = table_for(&seq, &image);
    let mut target = Surface::new(16, 16);
    let mut comp = FrameCompositor::new(0);

    let outcome = comp
        .composite(&mut target, &video, &image, &table, &seq, FrameIndex(0))
        .unwrap();
    assert_eq!(outcome, TickOutcome::Rendered);

    // Inside the quad: overlay; outside: raw video.
    assert_eq!(target.pixel(3, 3).unwrap(), RED);
    assert_eq!(target.pixel(5, 5).unwrap(), RED);
    assert_eq!(target.pixel(0, 0).unwrap(), BLUE);
    assert_eq!(target.pixel(10, 10).unwrap(), BLUE);
}

#[test]
fn delay_frames_draw_raw_video_only() {
    let image = solid(4, 4, RED);
    let video = solid(16, 16, BLUE);
    let seq = sequence_of(vec![rect_corners(2.0, 2.0, 4.0, 4.0); 8]);
    let table = table_for(&seq, &image);
    let mut target = Surface::new(16, 16);
    let mut comp = FrameCompositor::new(5);

    for f in 0..5u64 {
        let outcome = comp
            .composite(&mut target, &video, &image, &table, &seq, FrameIndex(f))
            .unwrap();
        assert_eq!(outcome, TickOutcome::DelayHold, "frame {f}");
        assert_eq!(target.pixel(3, 3).unwrap(), BLUE, "frame {f}");
    }

    let outcome = comp
        .composite(&mut target, &video, &image, &table, &seq, FrameIndex(5))
        .unwrap();
    assert_eq!(outcome, TickOutcome::Rendered);
    assert_eq!(target.pixel(3, 3).unwrap(), RED);
}

#[test]
fn missing_geometry_skips_overlay_without_error() {
    let image = solid(4, 4, RED);
    let video = solid(16, 16, BLUE);
    // Table built from a 2-frame sequence, but playback indexes a longer one:
    // frames 2..4 have corners but no geometry.
    let short = sequence_of(vec![
        rect_corners(2.0, 2.0, 4.0, 4.0),
        rect_corners(2.0, 2.0, 4.0, 4.0),
    ]);
    let long = sequence_of(vec![rect_corners(2.0, 2.0, 4.0, 4.0); 5]);
    let table = table_for(&short, &image);
    let mut target = Surface::new(16, 16);
    let mut comp = FrameCompositor::new(0);

    let outcome = comp
        .composite(&mut target, &video, &image, &table, &long, FrameIndex(3))
        .unwrap();
    assert_eq!(outcome, TickOutcome::NoGeometry);
    assert_eq!(target.pixel(3, 3).unwrap(), BLUE);
}

#[test]
fn last_frame_finishes_the_loop() {
    let image = solid(4, 4, RED);
    let video = solid(16, 16, BLUE);
    let seq = sequence_of(vec![rect_corners(2.0, 2.0, 4.0, 4.0); 3]);
    let table = table_for(&seq, &image);
    let mut target = Surface::new(16, 16);
    let mut comp = FrameCompositor::new(0);

    let outcome = comp
        .composite(&mut target, &video, &image, &table, &seq, FrameIndex(2))
        .unwrap();
    assert_eq!(outcome, TickOutcome::Finished);
    // The final frame still rendered its overlay before finishing.
    assert_eq!(target.pixel(3, 3).unwrap(), RED);
}

#[test]
fn frames_beyond_the_sequence_finish_without_error() {
    let image = solid(4, 4, RED);
    let video = solid(16, 16, BLUE);
    let seq = sequence_of(vec![rect_corners(2.0, 2.0, 4.0, 4.0); 3]);
    let table = table_for(&seq, &image);
    let mut target = Surface::new(16, 16);
    let mut comp = FrameCompositor::new(0);

    let outcome = comp
        .composite(&mut target, &video, &image, &table, &seq, FrameIndex(40))
        .unwrap();
    assert_eq!(outcome, TickOutcome::Finished);
    assert_eq!(target.pixel(3, 3).unwrap(), BLUE);
}

#[test]
fn left_lean_compensation_keeps_rows_on_surface() {
    let image = solid(4, 4, RED);
    let video = solid(16, 16, BLUE);
    // bottom-left (2) sits left of top-left (4): the compensated case.
    let corners = FrameCorners::new(
        Point::new(4.0, 0.0),
        Point::new(8.0, 0.0),
        Point::new(2.0, 4.0),
        Point::new(6.0, 4.0),
    );
    let seq = sequence_of(vec![corners, corners]);
    let table = table_for(&seq, &image);
    let mut target = Surface::new(16, 16);
    let mut comp = FrameCompositor::new(0);

    let outcome = comp
        .composite(&mut target, &video, &image, &table, &seq, FrameIndex(0))
        .unwrap();
    assert_eq!(outcome, TickOutcome::Rendered);

    // The bottom rows drift to negative intermediate x; with the origin
    // shifted they survive and reach the leftmost output column.
    assert_eq!(target.pixel(2, 3).unwrap(), RED);
    // Above the quad's slanted left edge the video shows through.
    assert_eq!(target.pixel(2, 0).unwrap(), BLUE);
}

#[test]
fn flipped_quad_drops_the_overlay_and_keeps_the_video() {
    let image = solid(4, 4, RED);
    let video = solid(16, 16, BLUE);
    // Bottom edge above the top edge passes corner validation (only x
    // ordering is checked) but drives the stage-2 destination heights
    // negative. The tick must survive, drop the overlay, and report it.
    let corners = FrameCorners::new(
        Point::new(2.0, 10.0),
        Point::new(6.0, 10.0),
        Point::new(2.0, 2.0),
        Point::new(6.0, 2.0),
    );
    let seq = sequence_of(vec![corners, corners]);
    let table = table_for(&seq, &image);
    let mut target = Surface::new(16, 16);
    let mut comp = FrameCompositor::new(0);

    let outcome = comp
        .composite(&mut target, &video, &image, &table, &seq, FrameIndex(0))
        .unwrap();
    assert_eq!(outcome, TickOutcome::OverlaySkipped);

    // Only the raw video frame made it to the target.
    for y in 0..16 {
        for x in 0..16 {
            assert_eq!(target.pixel(x, y).unwrap(), BLUE, "pixel ({x}, {y})");
        }
    }
}

#[test]
fn right_lean_receives_no_compensation() {
    // The mirror-image quad (bottom-left right of top-left) is rendered
    // without any origin shift. Known one-sided behavior, kept as-is.
    let image = solid(4, 4, RED);
    let video = solid(16, 16, BLUE);
    let corners = FrameCorners::new(
        Point::new(2.0, 0.0),
        Point::new(6.0, 0.0),
        Point::new(4.0, 4.0),
        Point::new(8.0, 4.0),
    );
    let seq = sequence_of(vec![corners, corners]);
    let table = table_for(&seq, &image);
    let mut target = Surface::new(16, 16);
    let mut comp = FrameCompositor::new(0);

    let outcome = comp
        .composite(&mut target, &video, &image, &table, &seq, FrameIndex(0))
        .unwrap();
    assert_eq!(outcome, TickOutcome::Rendered);
}
