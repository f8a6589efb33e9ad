//! Playback position scrubbing.
//!
//! [`Scrubber`] layers a played-region shade and a position handle over the
//! bar renderer and turns pointer events into seek events. It never mutates
//! playback time itself; the caller owns the [`PlaybackState`] and applies the
//! seeks it is handed.
//!
//! Drag capture contract: the host forwards `Down` only when it lands inside
//! the scrub surface, but while [`Scrubber::is_dragging`] it must forward
//! every `Move` and `Up` regardless of where the pointer is, so drags that
//! leave the surface keep seeking and always end.

use crate::render::bars::{draw_bars, BarStyle};
use crate::render::color::{Rgba, Theme};
use crate::render::surface::Framebuffer;

/// Shade drawn over the played portion of the waveform.
const PLAYED_OVERLAY: Rgba = Rgba::rgb(0x9c, 0xa3, 0xaf);
const PLAYED_OPACITY: f32 = 0.3;

/// Playback position against a fixed duration, in seconds.
///
/// `current_time` is clamped into `[0, duration]` on every mutation, so the
/// progress ratio is always in `[0, 1]` and zero for a zero duration.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlaybackState {
    current_time: f32,
    duration: f32,
}

impl PlaybackState {
    pub fn new(current_time: f32, duration: f32) -> Self {
        let duration = duration.max(0.0);
        Self {
            current_time: current_time.clamp(0.0, duration),
            duration,
        }
    }

    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Moves the position, clamped into `[0, duration]`.
    pub fn seek(&mut self, time: f32) {
        self.current_time = time.clamp(0.0, self.duration);
    }

    /// Fraction played in `[0, 1]`; zero while the duration is zero.
    pub fn progress(&self) -> f32 {
        if self.duration > 0.0 {
            self.current_time / self.duration
        } else {
            0.0
        }
    }
}

/// Pointer input in surface-local logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { x: f32, y: f32 },
    Move { x: f32, y: f32 },
    Up,
}

/// What the scrubber asks of its caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrubEvent {
    /// Seek playback to this time in seconds.
    Seek(f32),
}

#[derive(Debug, Clone, Copy)]
struct DragState {
    last_x: f32,
    last_y: f32,
}

/// Interactive seek controller over a waveform surface.
pub struct Scrubber {
    style: BarStyle,
    /// Draw the position handle line.
    pub show_handle: bool,
    /// Handle line color. The played shade is fixed.
    pub handle_color: Rgba,
    drag: Option<DragState>,
}

impl Scrubber {
    pub fn new(style: BarStyle) -> Self {
        Self {
            style,
            show_handle: true,
            handle_color: Rgba::rgb(255, 255, 255),
            drag: None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Pointer position recorded by the live drag, if any.
    pub fn drag_position(&self) -> Option<(f32, f32)> {
        self.drag.map(|d| (d.last_x, d.last_y))
    }

    /// Feeds one pointer event; `width` is the scrub surface's logical width.
    ///
    /// `Down` starts a drag and seeks immediately; `Move` seeks only while a
    /// drag is live; `Up` anywhere ends the drag without seeking.
    pub fn handle_pointer(
        &mut self,
        event: PointerEvent,
        width: f32,
        playback: &PlaybackState,
    ) -> Option<ScrubEvent> {
        match event {
            PointerEvent::Down { x, y } => {
                self.drag = Some(DragState { last_x: x, last_y: y });
                Some(ScrubEvent::Seek(seek_time(x, width, playback.duration())))
            }
            PointerEvent::Move { x, y } => {
                let drag = self.drag.as_mut()?;
                drag.last_x = x;
                drag.last_y = y;
                Some(ScrubEvent::Seek(seek_time(x, width, playback.duration())))
            }
            PointerEvent::Up => {
                self.drag = None;
                None
            }
        }
    }

    /// Draws bars, the played-region shade, and the handle. Empty sample
    /// buffers draw nothing at all.
    pub fn draw(
        &self,
        fb: &mut Framebuffer,
        samples: &[f32],
        playback: &PlaybackState,
        theme: Option<&dyn Theme>,
    ) {
        if samples.is_empty() {
            return;
        }
        draw_bars(fb, samples, &self.style, theme);

        let width = fb.width();
        let height = fb.height();
        let progress_x = playback.progress() * width;
        if progress_x > 0.0 {
            fb.blend_rect(0.0, 0.0, progress_x, height, PLAYED_OVERLAY, PLAYED_OPACITY);
        }
        if self.show_handle {
            // 2px line centered on the position, half-visible at the edges.
            fb.fill_rect(progress_x - 1.0, 0.0, 2.0, height, self.handle_color);
        }
    }
}

/// Maps a pointer x to a playback time: `clamp(x / width, 0, 1) * duration`.
///
/// Positions outside the surface clamp to the nearest end; a degenerate width
/// maps everything to zero.
pub fn seek_time(x: f32, width: f32, duration: f32) -> f32 {
    if width <= 0.0 {
        return 0.0;
    }
    (x / width).clamp(0.0, 1.0) * duration
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::surface::SurfaceSize;

    fn playback_120() -> PlaybackState {
        PlaybackState::new(0.0, 120.0)
    }

    fn scrubber() -> Scrubber {
        Scrubber::new(BarStyle::new(4.0, 2.0).with_fade(false, 0.0))
    }

    #[test]
    fn click_at_quarter_width_seeks_to_quarter_duration() {
        let mut scrub = scrubber();
        let event = scrub.handle_pointer(
            PointerEvent::Down { x: 50.0, y: 10.0 },
            200.0,
            &playback_120(),
        );
        assert_eq!(event, Some(ScrubEvent::Seek(30.0)));
    }

    #[test]
    fn drag_seeks_on_down_and_each_move_then_goes_quiet() {
        let mut scrub = scrubber();
        let playback = playback_120();
        let width = 200.0;

        let mut seeks = Vec::new();
        for event in [
            PointerEvent::Down { x: 20.0, y: 5.0 },
            PointerEvent::Move { x: 180.0, y: 5.0 },
            PointerEvent::Up,
            PointerEvent::Move { x: 100.0, y: 5.0 },
        ] {
            if let Some(ScrubEvent::Seek(t)) = scrub.handle_pointer(event, width, &playback) {
                seeks.push(t);
            }
        }
        assert_eq!(seeks, vec![12.0, 108.0]);
        assert!(!scrub.is_dragging());
    }

    #[test]
    fn moves_without_a_drag_do_nothing() {
        let mut scrub = scrubber();
        let event = scrub.handle_pointer(
            PointerEvent::Move { x: 50.0, y: 0.0 },
            200.0,
            &playback_120(),
        );
        assert_eq!(event, None);
    }

    #[test]
    fn drag_records_the_last_pointer_position() {
        let mut scrub = scrubber();
        let playback = playback_120();
        assert_eq!(scrub.drag_position(), None);

        scrub.handle_pointer(PointerEvent::Down { x: 30.0, y: 4.0 }, 200.0, &playback);
        assert_eq!(scrub.drag_position(), Some((30.0, 4.0)));

        // Positions keep tracking even once the pointer leaves the surface.
        scrub.handle_pointer(PointerEvent::Move { x: -15.0, y: 99.0 }, 200.0, &playback);
        assert_eq!(scrub.drag_position(), Some((-15.0, 99.0)));

        scrub.handle_pointer(PointerEvent::Up, 200.0, &playback);
        assert_eq!(scrub.drag_position(), None);
    }

    #[test]
    fn drag_outside_the_surface_clamps_to_the_ends() {
        let mut scrub = scrubber();
        let playback = playback_120();
        scrub.handle_pointer(PointerEvent::Down { x: 100.0, y: 0.0 }, 200.0, &playback);

        let low = scrub.handle_pointer(PointerEvent::Move { x: -50.0, y: 0.0 }, 200.0, &playback);
        assert_eq!(low, Some(ScrubEvent::Seek(0.0)));
        let high = scrub.handle_pointer(PointerEvent::Move { x: 450.0, y: 0.0 }, 200.0, &playback);
        assert_eq!(high, Some(ScrubEvent::Seek(120.0)));
    }

    #[test]
    fn playback_time_stays_inside_the_duration() {
        let mut playback = PlaybackState::new(-3.0, 10.0);
        assert_eq!(playback.current_time(), 0.0);
        playback.seek(15.0);
        assert_eq!(playback.current_time(), 10.0);
        playback.seek(2.5);
        assert_eq!(playback.progress(), 0.25);
    }

    #[test]
    fn zero_duration_pins_progress_to_zero() {
        let playback = PlaybackState::new(5.0, 0.0);
        assert_eq!(playback.current_time(), 0.0);
        assert_eq!(playback.progress(), 0.0);
        assert_eq!(seek_time(10.0, 0.0, 100.0), 0.0);
    }

    #[test]
    fn draw_shades_the_played_region_and_places_the_handle() {
        let style = BarStyle::new(4.0, 0.0).with_fade(false, 0.0);
        let mut scrub = Scrubber::new(style.with_color(Some(Rgba::rgb(0, 0, 255))));
        scrub.handle_color = Rgba::rgb(255, 255, 255);

        let mut fb = Framebuffer::new(SurfaceSize::new(20, 8, 1.0));
        let playback = PlaybackState::new(60.0, 120.0);
        scrub.draw(&mut fb, &[1.0], &playback, None);

        // Played half picks up the gray shade; unplayed half stays pure.
        assert!(fb.pixel(2, 4).r > fb.pixel(16, 4).r);
        assert_eq!(fb.pixel(16, 4), Rgba::rgb(0, 0, 255));
        // Handle straddles the midpoint.
        assert_eq!(fb.pixel(9, 0), Rgba::rgb(255, 255, 255));
        assert_eq!(fb.pixel(10, 0), Rgba::rgb(255, 255, 255));
    }

    #[test]
    fn empty_samples_draw_nothing() {
        let scrub = scrubber();
        let mut fb = Framebuffer::new(SurfaceSize::new(10, 4, 1.0));
        fb.fill_rect(0.0, 0.0, 10.0, 4.0, Rgba::rgb(3, 3, 3));
        scrub.draw(&mut fb, &[], &PlaybackState::new(1.0, 2.0), None);
        assert_eq!(fb.pixel(5, 2), Rgba::rgb(3, 3, 3));
    }
}
