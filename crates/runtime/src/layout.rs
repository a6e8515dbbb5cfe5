//! First-paint measurement of the host surface.
//!
//! Reading a box size before the host has finished its first layout pass
//! yields zeros or stale numbers. The measurer therefore waits for the first
//! `updated` after `connected`, asks the host for one animation frame, and
//! only measures inside that frame. After that, resizes update the size
//! directly.

pub use foundation::{ClientRect, ViewportSize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutMeasurer {
    viewbox_height: f64,
    connected: bool,
    frame_requested: bool,
    size: Option<ViewportSize>,
}

impl LayoutMeasurer {
    pub fn new(viewbox_height: f64) -> Self {
        Self {
            viewbox_height,
            connected: false,
            frame_requested: false,
            size: None,
        }
    }

    pub fn viewbox_height(&self) -> f64 {
        self.viewbox_height
    }

    /// Host surface attached. Starts a fresh measurement cycle.
    pub fn connected(&mut self) {
        self.connected = true;
        self.frame_requested = false;
        self.size = None;
    }

    /// Host finished an update. Returns `true` when the host must schedule
    /// an animation frame and report it via [`LayoutMeasurer::animation_frame`].
    pub fn updated(&mut self) -> bool {
        if !self.connected || self.frame_requested || self.size.is_some() {
            return false;
        }
        self.frame_requested = true;
        true
    }

    /// The requested frame ran; `rect` is the surface box read inside it.
    ///
    /// Returns the new size when this frame produced the first measurement.
    /// A box with no area does not count; the next `updated` asks again.
    pub fn animation_frame(&mut self, rect: ClientRect) -> Option<ViewportSize> {
        if !self.frame_requested {
            return None;
        }
        self.frame_requested = false;
        self.size = ViewportSize::from_rect(rect, self.viewbox_height);
        debug!(width = rect.width, height = rect.height, measured = self.size.is_some(), "first paint");
        self.size
    }

    /// The surface was resized. Ignored until the first paint was measured.
    ///
    /// Returns the size when it changed.
    pub fn resize(&mut self, rect: ClientRect) -> Option<ViewportSize> {
        if self.size.is_none() {
            return None;
        }
        let next = ViewportSize::from_rect(rect, self.viewbox_height)?;
        if self.size == Some(next) {
            return None;
        }
        self.size = Some(next);
        Some(next)
    }

    pub fn disconnected(&mut self) {
        self.connected = false;
        self.frame_requested = false;
        self.size = None;
    }

    /// Latest measured size; `None` until the first paint.
    pub fn measure(&self) -> Option<ViewportSize> {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::{ClientRect, LayoutMeasurer};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn nothing_measured_before_first_frame() {
        let mut m = LayoutMeasurer::new(1000.0);
        assert!(!m.updated());
        m.connected();
        assert!(m.measure().is_none());
        assert!(m.resize(ClientRect::new(800.0, 400.0)).is_none());
        assert!(m.measure().is_none());
    }

    #[test]
    fn exactly_one_frame_request_per_connection() {
        let mut m = LayoutMeasurer::new(1000.0);
        m.connected();
        assert!(m.updated());
        assert!(!m.updated());
        let size = m.animation_frame(ClientRect::new(800.0, 400.0)).unwrap();
        assert_close(size.width, 2000.0, 1e-9);
        assert_close(size.height, 1000.0, 1e-9);
        assert!(!m.updated());
        assert_eq!(m.measure(), Some(size));
    }

    #[test]
    fn unsolicited_frame_is_ignored() {
        let mut m = LayoutMeasurer::new(1000.0);
        m.connected();
        assert!(m.animation_frame(ClientRect::new(800.0, 400.0)).is_none());
        assert!(m.measure().is_none());
    }

    #[test]
    fn empty_box_retries_on_next_update() {
        let mut m = LayoutMeasurer::new(1000.0);
        m.connected();
        assert!(m.updated());
        assert!(m.animation_frame(ClientRect::new(0.0, 0.0)).is_none());
        assert!(m.updated());
        assert!(m.animation_frame(ClientRect::new(300.0, 300.0)).is_some());
    }

    #[test]
    fn resize_tracks_latest_box() {
        let mut m = LayoutMeasurer::new(1000.0);
        m.connected();
        m.updated();
        m.animation_frame(ClientRect::new(800.0, 400.0));
        let next = m.resize(ClientRect::new(500.0, 500.0)).unwrap();
        assert_close(next.width, 1000.0, 1e-9);
        assert!(m.resize(ClientRect::new(250.0, 250.0)).is_none());
        assert!(m.resize(ClientRect::new(0.0, 250.0)).is_none());
        assert_eq!(m.measure(), Some(next));
    }

    #[test]
    fn disconnect_resets_measurement() {
        let mut m = LayoutMeasurer::new(1000.0);
        m.connected();
        m.updated();
        m.animation_frame(ClientRect::new(800.0, 400.0));
        m.disconnected();
        assert!(m.measure().is_none());
        assert!(!m.updated());
        m.connected();
        assert!(m.updated());
    }
}
