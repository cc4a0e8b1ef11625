//! Parsers for the tab-delimited pin and tracking exports.
//!
//! Both files share the same shape: a header carrying `Units Per Second`,
//! `Source Width`, `Source Height` and the pixel aspect ratios as
//! `label<whitespace>value` lines, followed by blank-line-separated data
//! blocks. The pin file carries four corner-point blocks ordered top-left,
//! top-right, bottom-left, bottom-right; the tracking file carries anchor,
//! position, scale and rotation blocks. A trailing `End of Keyframe Data`
//! block is ignored in both.

use crate::foundation::core::{Fps, Point};
use crate::foundation::error::{PinwarpError, PinwarpResult};
use crate::tracking::model::{
    FrameCorners, MotionChannels, TrackMeta, TrackingData, TrackingSequence,
};

const END_MARKER: &str = "End of Keyframe Data";

/// Parse a pin export into a [`TrackingSequence`].
pub fn parse_pin(text: &str) -> PinwarpResult<TrackingSequence> {
    let meta = parse_meta(text)?;
    let blocks = data_blocks(text)?;
    if blocks.len() != 4 {
        return Err(PinwarpError::meta(format!(
            "pin file must contain 4 corner tracks (top-left, top-right, bottom-left, \
             bottom-right), found {}",
            blocks.len()
        )));
    }

    let tracks = blocks
        .iter()
        .map(|block| parse_point_block(block))
        .collect::<PinwarpResult<Vec<Vec<Point>>>>()?;

    let len = tracks[0].len();
    if len == 0 {
        return Err(PinwarpError::meta("pin corner tracks contain no frames"));
    }
    if tracks.iter().any(|t| t.len() != len) {
        return Err(PinwarpError::meta(
            "pin corner tracks must all have the same frame count",
        ));
    }

    let frames = (0..len)
        .map(|i| FrameCorners::new(tracks[0][i], tracks[1][i], tracks[2][i], tracks[3][i]))
        .collect();
    TrackingSequence::new(meta, frames)
}

/// Parse a tracking export into [`TrackingData`].
pub fn parse_tracking(text: &str) -> PinwarpResult<TrackingData> {
    let meta = parse_meta(text)?;
    let blocks = data_blocks(text)?;
    if blocks.len() < 4 {
        return Err(PinwarpError::meta(format!(
            "tracking file must contain anchor, position, scale and rotation blocks, found {}",
            blocks.len()
        )));
    }

    let channels = MotionChannels {
        anchor: parse_xyz_block(&blocks[0])?,
        position: parse_xyz_block(&blocks[1])?,
        scale: parse_xyz_block(&blocks[2])?,
        rotation: parse_scalar_block(&blocks[3])?,
    };
    Ok(TrackingData { meta, channels })
}

/// Parse the shared header fields.
pub fn parse_meta(text: &str) -> PinwarpResult<TrackMeta> {
    let fps = Fps::from_decimal_str(header_value(text, "Units Per Second")?)?;
    let width = parse_header_num::<u32>(text, "Source Width")?;
    let height = parse_header_num::<u32>(text, "Source Height")?;
    let source_pixel_aspect = parse_header_num::<f64>(text, "Source Pixel Aspect Ratio")?;
    let comp_pixel_aspect = parse_header_num::<f64>(text, "Comp Pixel Aspect Ratio")?;

    Ok(TrackMeta {
        fps,
        width,
        height,
        source_pixel_aspect,
        comp_pixel_aspect,
    })
}

fn header_value<'a>(text: &'a str, label: &str) -> PinwarpResult<&'a str> {
    for line in text.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix(label) {
            let value = rest.trim();
            if !value.is_empty() {
                return Ok(value);
            }
        }
    }
    Err(PinwarpError::meta(format!(
        "missing '{label}' in metadata header"
    )))
}

fn parse_header_num<T: std::str::FromStr>(text: &str, label: &str) -> PinwarpResult<T> {
    let value = header_value(text, label)?;
    value
        .parse::<T>()
        .map_err(|_| PinwarpError::meta(format!("invalid '{label}' value '{value}'")))
}

/// Split into blank-line-separated sections and return the data blocks:
/// everything after the two header sections, minus a trailing end marker.
fn data_blocks(text: &str) -> PinwarpResult<Vec<String>> {
    let mut sections: Vec<String> = Vec::new();
    let mut current = String::new();
    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            if !current.is_empty() {
                sections.push(std::mem::take(&mut current));
            }
        } else {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
        }
    }
    if !current.is_empty() {
        sections.push(current);
    }

    if sections
        .last()
        .is_some_and(|s| s.trim_start().starts_with(END_MARKER))
    {
        sections.pop();
    }
    if sections.len() < 2 {
        return Err(PinwarpError::meta(
            "metadata file is missing its header sections",
        ));
    }
    Ok(sections.split_off(2))
}

/// Data rows are `frameIndex<TAB>…` lines; column-header lines within a block
/// (anything whose first field is not an integer) are skipped.
fn data_fields(line: &str) -> Option<Vec<&str>> {
    let fields: Vec<&str> = line
        .split('\t')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect();
    let first = fields.first()?;
    first.parse::<u64>().ok()?;
    Some(fields)
}

fn parse_point_block(block: &str) -> PinwarpResult<Vec<Point>> {
    let mut points = Vec::new();
    for line in block.lines() {
        let Some(fields) = data_fields(line) else {
            continue;
        };
        if fields.len() < 3 {
            return Err(PinwarpError::meta(format!(
                "corner track line '{line}' must be frame<TAB>x<TAB>y"
            )));
        }
        let x = parse_coord(fields[1], line)?;
        let y = parse_coord(fields[2], line)?;
        points.push(Point::new(x, y));
    }
    Ok(points)
}

fn parse_xyz_block(block: &str) -> PinwarpResult<Vec<[f64; 3]>> {
    let mut rows = Vec::new();
    for line in block.lines() {
        let Some(fields) = data_fields(line) else {
            continue;
        };
        if fields.len() < 4 {
            return Err(PinwarpError::meta(format!(
                "motion track line '{line}' must be frame<TAB>x<TAB>y<TAB>z"
            )));
        }
        rows.push([
            parse_coord(fields[1], line)?,
            parse_coord(fields[2], line)?,
            parse_coord(fields[3], line)?,
        ]);
    }
    Ok(rows)
}

fn parse_scalar_block(block: &str) -> PinwarpResult<Vec<f64>> {
    let mut rows = Vec::new();
    for line in block.lines() {
        let Some(fields) = data_fields(line) else {
            continue;
        };
        if fields.len() < 2 {
            return Err(PinwarpError::meta(format!(
                "rotation track line '{line}' must be frame<TAB>value"
            )));
        }
        rows.push(parse_coord(fields[1], line)?);
    }
    Ok(rows)
}

fn parse_coord(field: &str, line: &str) -> PinwarpResult<f64> {
    field
        .parse::<f64>()
        .map_err(|_| PinwarpError::meta(format!("invalid numeric value '{field}' in '{line}'")))
}

#[cfg(test)]
#[path = "../../tests/unit/tracking/parse.rs"]
mod tests;
