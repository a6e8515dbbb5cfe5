/// Rendered box of the host surface, in CSS pixels.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ClientRect {
    pub width: f64,
    pub height: f64,
}

impl ClientRect {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Size of the drawing surface in abstract view-box units (not pixels).
///
/// The height is fixed by configuration; the width follows the measured
/// aspect ratio of the host surface.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl ViewportSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Scales a measured `width x height` box to `viewbox_height` units.
    ///
    /// `None` when the box has no usable area yet (not laid out).
    pub fn from_aspect(width: f64, height: f64, viewbox_height: f64) -> Option<Self> {
        let usable = |v: f64| v.is_finite() && v > 0.0;
        if !(usable(width) && usable(height) && usable(viewbox_height)) {
            return None;
        }
        Some(Self::new(viewbox_height * width / height, viewbox_height))
    }

    pub fn from_rect(rect: ClientRect, viewbox_height: f64) -> Option<Self> {
        Self::from_aspect(rect.width, rect.height, viewbox_height)
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }

    pub fn as_array(self) -> [f64; 2] {
        [self.width, self.height]
    }
}

#[cfg(test)]
mod tests {
    use super::{ClientRect, ViewportSize};

    #[test]
    fn scales_to_fixed_height() {
        let v = ViewportSize::from_aspect(640.0, 480.0, 1000.0).unwrap();
        assert_eq!(v.height, 1000.0);
        assert!((v.width - 1333.333_333).abs() < 1e-3);
        assert!((v.aspect_ratio() - 640.0 / 480.0).abs() < 1e-12);
    }

    #[test]
    fn zero_sized_box_is_not_a_viewport() {
        assert!(ViewportSize::from_aspect(0.0, 480.0, 1000.0).is_none());
        assert!(ViewportSize::from_aspect(640.0, 0.0, 1000.0).is_none());
        assert!(ViewportSize::from_aspect(f64::NAN, 1.0, 1000.0).is_none());
        assert!(ViewportSize::from_rect(ClientRect::default(), 1000.0).is_none());
    }
}
