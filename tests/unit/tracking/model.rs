use super::*;

use crate::foundation::core::{Fps, FrameIndex, Point};

fn meta() -> TrackMeta {
    TrackMeta {
        fps: Fps::new(24, 1).unwrap(),
        width: 320,
        height: 240,
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

#[test]
fn validate_rejects_degenerate_edges() {
    let mut corners = rect_corners(10.0, 10.0, 50.0, 40.0);
    corners.top_right.x = corners.top_left.x;
    assert!(corners.validate().is_err());

    let mut corners = rect_corners(10.0, 10.0, 50.0, 40.0);
    corners.bottom_right.x = corners.bottom_left.x - 1.0;
    assert!(corners.validate().is_err());

    assert!(rect_corners(10.0, 10.0, 50.0, 40.0).validate().is_ok());
}

#[test]
fn sequence_validates_every_frame_at_load() {
    let mut bad = rect_corners(0.0, 0.0, 10.0, 10.0);
    bad.top_right.x = bad.top_left.x;
    let err = TrackingSequence::new(meta(), vec![rect_corners(0.0, 0.0, 10.0, 10.0), bad])
        .unwrap_err();
    assert!(err.to_string().contains("frame 1"));
}

#[test]
fn sequence_rejects_empty() {
    assert!(TrackingSequence::new(meta(), vec![]).is_err());
}

#[test]
fn out_of_range_index_yields_none() {
    let seq = TrackingSequence::new(
        meta(),
        vec![
            rect_corners(0.0, 0.0, 10.0, 10.0),
            rect_corners(1.0, 0.0, 10.0, 10.0),
        ],
    )
    .unwrap();

    assert!(seq.corners(FrameIndex(0)).is_some());
    assert!(seq.corners(FrameIndex(1)).is_some());
    assert!(seq.corners(FrameIndex(2)).is_none());
    assert!(seq.corners(FrameIndex(u64::MAX)).is_none());
    assert_eq!(seq.last_frame(), FrameIndex(1));
}
