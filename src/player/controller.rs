//! Playback controller.
//!
//! [`Player`] orchestrates loading, geometry precomputation, readiness
//! gating and the frame-synchronized render loop. Everything runs on the
//! caller's thread: [`Player::poll`] is the cooperative scheduler that
//! advances whichever piece of work is due at the given instant: one
//! prerender step, a pending play retry, or one render tick.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;

use crate::foundation::core::{Canvas, FrameIndex};
use crate::foundation::error::{PinwarpError, PinwarpResult};
use crate::media::image::{decode_image, load_image};
use crate::media::video::VideoSource;
use crate::render::compositor::{FrameCompositor, TickOutcome};
use crate::render::surface::Surface;
use crate::tracking::model::{TrackingData, TrackingSequence};
use crate::tracking::parse::{parse_pin, parse_tracking};
use crate::warp::prerender::{GeometryTable, Prerenderer};

/// Poll interval for a `play()` issued before loading and precomputation have
/// finished. Retries are unbounded; they only stall playback start.
pub const PLAY_RETRY_INTERVAL: Duration = Duration::from_millis(500);

/// Named player events a handler can be bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayerEvent {
    /// Playback actually started (after readiness).
    Play,
}

/// Where the overlay image comes from.
pub enum ImageSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

/// The two metadata text resources, as file contents.
pub struct MetaSources {
    pub pin: String,
    pub tracking: String,
}

impl MetaSources {
    pub fn from_paths(pin: &std::path::Path, tracking: &std::path::Path) -> PinwarpResult<Self> {
        let pin = std::fs::read_to_string(pin)
            .with_context(|| format!("read pin file '{}'", pin.display()))?;
        let tracking = std::fs::read_to_string(tracking)
            .with_context(|| format!("read tracking file '{}'", tracking.display()))?;
        Ok(Self { pin, tracking })
    }
}

/// Inputs to [`Player::activate`]. `video`, `image` and `meta` are required;
/// a missing one is a configuration error reported immediately.
pub struct ActivateConfig {
    pub video: Option<Box<dyn VideoSource>>,
    pub image: Option<ImageSource>,
    pub meta: Option<MetaSources>,
    /// Leading frames during which no overlay is drawn.
    pub delay: u64,
}

impl Default for ActivateConfig {
    fn default() -> Self {
        Self {
            video: None,
            image: None,
            meta: None,
            delay: 0,
        }
    }
}

/// What a single [`Player::poll`] call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollOutcome {
    /// Nothing was due.
    Idle,
    /// One frame of warp geometry was precomputed.
    Prerendered(FrameIndex),
    /// Precomputation finished; the player is ready to start.
    Ready,
    /// A pending play request went through.
    Started,
    /// One render tick ran.
    Ticked(FrameIndex, TickOutcome),
    /// The render loop reached the end of the sequence and stopped.
    Finished(FrameIndex),
}

// Video readiness needs no flag of its own: activation is synchronous and
// fail-fast, so a loaded video is implied by a loaded image.
#[derive(Clone, Copy, Debug, Default)]
struct LoadFlags {
    image: bool,
    prerendering: bool,
}

/// Playback controller tying tracking data, warp geometry and video playback
/// together.
#[derive(Default)]
pub struct Player {
    flags: LoadFlags,
    sequence: Option<Arc<TrackingSequence>>,
    tracking: Option<TrackingData>,
    image: Option<Surface>,
    video: Option<Box<dyn VideoSource>>,
    prerenderer: Option<Prerenderer>,
    geometry: Option<GeometryTable>,
    compositor: Option<FrameCompositor>,
    canvas: Option<Surface>,
    clock: crate::player::timer::PlaybackClock,
    interval: Option<crate::player::timer::IntervalTimer>,
    pending_play: Option<Instant>,
    handlers: HashMap<PlayerEvent, Box<dyn FnMut()>>,
}

impl Player {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load metadata, video and image, size the visible surface to the video
    /// and queue geometry precomputation. Fails fast on a missing input or an
    /// unreadable resource; on failure no partial state is kept.
    pub fn activate(&mut self, config: ActivateConfig) -> PinwarpResult<()> {
        let Some(video) = config.video else {
            return Err(PinwarpError::config("activate requires a video source"));
        };
        let Some(image_source) = config.image else {
            return Err(PinwarpError::config("activate requires an image source"));
        };
        let Some(meta) = config.meta else {
            return Err(PinwarpError::config(
                "activate requires pin and tracking metadata",
            ));
        };

        let sequence = Arc::new(parse_pin(&meta.pin)?);
        let tracking = parse_tracking(&meta.tracking)?;
        let image = match image_source {
            ImageSource::Path(path) => load_image(&path)?,
            ImageSource::Bytes(bytes) => decode_image(&bytes)?,
        };

        let info = video.info();
        let canvas = Surface::new(info.width, info.height);
        let image_size = Canvas {
            width: image.width(),
            height: image.height(),
        };

        self.prerenderer = Some(Prerenderer::new(sequence.clone(), image_size));
        self.geometry = None;
        self.compositor = Some(FrameCompositor::new(config.delay));
        self.canvas = Some(canvas);
        self.sequence = Some(sequence);
        self.tracking = Some(tracking);
        self.image = Some(image);
        self.video = Some(video);
        self.flags = LoadFlags {
            image: true,
            prerendering: false,
        };
        self.clock = crate::player::timer::PlaybackClock::new();
        self.interval = None;
        self.pending_play = None;

        tracing::debug!("activated: metadata, video and image loaded");
        Ok(())
    }

    /// Image loaded and geometry precomputation complete.
    pub fn is_ready(&self) -> bool {
        self.flags.image && self.flags.prerendering
    }

    /// Whether the render loop is currently armed.
    pub fn is_playing(&self) -> bool {
        self.interval.is_some()
    }

    /// Start playback. If loading or precomputation has not finished yet this
    /// is not an error: the request is retried every
    /// [`PLAY_RETRY_INTERVAL`] from [`Player::poll`] until readiness.
    pub fn play(&mut self, now: Instant) -> PinwarpResult<()> {
        if self.sequence.is_none() {
            return Err(PinwarpError::config("play requires a successful activate"));
        }
        if !self.is_ready() {
            tracing::debug!("play requested before readiness; will retry");
            self.pending_play = Some(now + PLAY_RETRY_INTERVAL);
            return Ok(());
        }
        self.start_playback(now)
    }

    /// Cancel the render loop and pause playback. Idempotent.
    pub fn stop(&mut self, now: Instant) {
        self.interval = None;
        self.pending_play = None;
        self.clock.pause(now);
    }

    /// Register a handler for a named event. Rebinding replaces the previous
    /// handler.
    pub fn bind(&mut self, event: PlayerEvent, handler: impl FnMut() + 'static) {
        self.handlers.insert(event, Box::new(handler));
    }

    /// Advance whichever piece of work is due at `now`:
    ///
    /// 1. while precomputation is incomplete, compute one frame of geometry
    ///    (the cooperative yield point between frames);
    /// 2. service a pending play retry;
    /// 3. when the render interval fires, run one tick.
    pub fn poll(&mut self, now: Instant) -> PinwarpResult<PollOutcome> {
        if let Some(pre) = self.prerenderer.as_mut() {
            let progress = pre.step()?;
            if pre.is_complete() {
                let pre = self
                    .prerenderer
                    .take()
                    .ok_or_else(|| PinwarpError::render("internal error: prerenderer vanished"))?;
                self.geometry = Some(pre.into_table()?);
                self.flags.prerendering = true;
                tracing::debug!("prerendering complete");
                return Ok(PollOutcome::Ready);
            }
            return match progress {
                crate::warp::prerender::PrerenderProgress::Frame(f) => {
                    Ok(PollOutcome::Prerendered(f))
                }
                crate::warp::prerender::PrerenderProgress::Complete => Ok(PollOutcome::Idle),
            };
        }

        if let Some(at) = self.pending_play
            && now >= at
        {
            self.pending_play = None;
            if self.is_ready() {
                self.start_playback(now)?;
                return Ok(PollOutcome::Started);
            }
            self.pending_play = Some(now + PLAY_RETRY_INTERVAL);
            return Ok(PollOutcome::Idle);
        }

        let interval_due = match self.interval.as_mut() {
            Some(interval) => interval.due(now),
            None => false,
        };
        if interval_due {
            return self.tick(now);
        }

        Ok(PollOutcome::Idle)
    }

    /// The visible surface (video background plus overlay after each tick).
    pub fn surface(&self) -> Option<&Surface> {
        self.canvas.as_ref()
    }

    /// The tracking file's motion channels, retained for callers that want
    /// them; the warp pipeline itself does not consume them.
    pub fn tracking_data(&self) -> Option<&TrackingData> {
        self.tracking.as_ref()
    }

    /// Blocking convenience loop: request playback, poll until the sequence
    /// finishes, and hand every rendered tick to `on_frame`.
    pub fn run_until_finished(
        &mut self,
        mut on_frame: impl FnMut(FrameIndex, &Surface),
    ) -> PinwarpResult<()> {
        self.play(Instant::now())?;
        loop {
            let now = Instant::now();
            match self.poll(now)? {
                PollOutcome::Finished(frame) => {
                    if let Some(surface) = self.canvas.as_ref() {
                        on_frame(frame, surface);
                    }
                    return Ok(());
                }
                PollOutcome::Ticked(frame, _) => {
                    if let Some(surface) = self.canvas.as_ref() {
                        on_frame(frame, surface);
                    }
                }
                _ => {}
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    fn start_playback(&mut self, now: Instant) -> PinwarpResult<()> {
        let sequence = self
            .sequence
            .as_ref()
            .ok_or_else(|| PinwarpError::config("play requires a successful activate"))?;
        let period = sequence.meta.fps.tick_period();

        self.clock.reset_and_start(now);
        if let Some(handler) = self.handlers.get_mut(&PlayerEvent::Play) {
            handler();
        }
        // Replacing the interval cancels any prior render loop.
        self.interval = Some(crate::player::timer::IntervalTimer::new(period, now));
        tracing::debug!("playback started");
        Ok(())
    }

    fn tick(&mut self, now: Instant) -> PinwarpResult<PollOutcome> {
        let sequence = self
            .sequence
            .as_ref()
            .ok_or_else(|| PinwarpError::render("internal error: tick without sequence"))?;
        let table = self
            .geometry
            .as_ref()
            .ok_or_else(|| PinwarpError::render("internal error: tick without geometry"))?;
        let image = self
            .image
            .as_ref()
            .ok_or_else(|| PinwarpError::render("internal error: tick without image"))?;
        let video = self
            .video
            .as_mut()
            .ok_or_else(|| PinwarpError::render("internal error: tick without video"))?;
        let compositor = self
            .compositor
            .as_mut()
            .ok_or_else(|| PinwarpError::render("internal error: tick without compositor"))?;
        let canvas = self
            .canvas
            .as_mut()
            .ok_or_else(|| PinwarpError::render("internal error: tick without canvas"))?;

        let time_sec = self.clock.current_time_secs(now);
        let frame = FrameIndex(sequence.meta.fps.secs_to_frames_floor(time_sec));
        let video_frame = video.frame_at(time_sec)?;

        let outcome = compositor.composite(canvas, &video_frame, image, table, sequence, frame)?;
        if outcome == TickOutcome::Finished {
            self.interval = None;
            self.clock.pause(now);
            return Ok(PollOutcome::Finished(frame));
        }
        Ok(PollOutcome::Ticked(frame, outcome))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/player/controller.rs"]
mod tests;
