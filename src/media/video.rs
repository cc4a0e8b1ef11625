//! Video frame sources.
//!
//! The playback controller consumes video through the [`VideoSource`] trait:
//! a source knows its dimensions and duration, and can produce the decoded
//! frame for a playback time. [`FfmpegVideoSource`] implements the trait by
//! shelling out to the system `ffmpeg`/`ffprobe` binaries (enable the
//! `media-ffmpeg` feature); tests use synthetic in-memory sources.

use std::path::{Path, PathBuf};

use crate::foundation::error::{PinwarpError, PinwarpResult};
use crate::render::surface::Surface;

#[derive(Clone, Debug)]
pub struct VideoSourceInfo {
    pub width: u32,
    pub height: u32,
    pub duration_sec: f64,
}

/// A playing video, reduced to "give me the frame at time t".
pub trait VideoSource {
    fn info(&self) -> &VideoSourceInfo;

    /// Decode the frame displayed at `time_sec` as a premultiplied RGBA8
    /// surface. Implementations clamp the time into the source's duration.
    fn frame_at(&mut self, time_sec: f64) -> PinwarpResult<Surface>;
}

/// Frame source backed by the system `ffmpeg` binary.
#[cfg_attr(not(feature = "media-ffmpeg"), allow(dead_code))]
pub struct FfmpegVideoSource {
    info: VideoSourceInfo,
    source_path: PathBuf,
}

impl FfmpegVideoSource {
    #[cfg(feature = "media-ffmpeg")]
    pub fn open(source_path: &Path) -> PinwarpResult<Self> {
        let info = probe_video(source_path)?;
        Ok(Self {
            info,
            source_path: source_path.to_path_buf(),
        })
    }

    #[cfg(not(feature = "media-ffmpeg"))]
    pub fn open(_source_path: &Path) -> PinwarpResult<Self> {
        Err(PinwarpError::media(
            "video decoding requires the 'media-ffmpeg' feature",
        ))
    }
}

impl VideoSource for FfmpegVideoSource {
    fn info(&self) -> &VideoSourceInfo {
        &self.info
    }

    #[cfg(feature = "media-ffmpeg")]
    fn frame_at(&mut self, time_sec: f64) -> PinwarpResult<Surface> {
        let t = time_sec.clamp(0.0, self.info.duration_sec.max(0.0));
        let out = std::process::Command::new("ffmpeg")
            .args(["-v", "error", "-ss", &format!("{t:.9}")])
            .arg("-i")
            .arg(&self.source_path)
            .args([
                "-frames:v",
                "1",
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgba",
                "pipe:1",
            ])
            .output()
            .map_err(|e| {
                PinwarpError::media(format!("failed to run ffmpeg for video decode: {e}"))
            })?;

        if !out.status.success() {
            return Err(PinwarpError::media(format!(
                "ffmpeg video decode failed for '{}': {}",
                self.source_path.display(),
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }

        let expected_len = self.info.width as usize * self.info.height as usize * 4;
        if out.stdout.len() < expected_len {
            return Err(PinwarpError::media(format!(
                "decoded video frame has invalid size: got {} bytes, expected {expected_len}",
                out.stdout.len()
            )));
        }

        // Decoded video frames are opaque; rgba with a = 255 is already
        // premultiplied.
        Surface::from_rgba8_premul(
            self.info.width,
            self.info.height,
            out.stdout[..expected_len].to_vec(),
        )
    }

    #[cfg(not(feature = "media-ffmpeg"))]
    fn frame_at(&mut self, _time_sec: f64) -> PinwarpResult<Surface> {
        Err(PinwarpError::media(
            "video decoding requires the 'media-ffmpeg' feature",
        ))
    }
}

#[cfg(feature = "media-ffmpeg")]
fn probe_video(source_path: &Path) -> PinwarpResult<VideoSourceInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| PinwarpError::media(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(PinwarpError::media(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| PinwarpError::media(format!("ffprobe json parse failed: {e}")))?;
    let video_stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| PinwarpError::media("no video stream found"))?;
    let width = video_stream
        .width
        .ok_or_else(|| PinwarpError::media("missing video width from ffprobe"))?;
    let height = video_stream
        .height
        .ok_or_else(|| PinwarpError::media("missing video height from ffprobe"))?;
    let duration_sec = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);

    Ok(VideoSourceInfo {
        width,
        height,
        duration_sec,
    })
}
