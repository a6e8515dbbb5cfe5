/// Axis-aligned bounding box in planar (projected) coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb2 {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Aabb2 {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Aabb2 { min, max }
    }

    /// An inverted box that any `extend` call will replace.
    pub fn empty() -> Self {
        Aabb2 {
            min: [f64::INFINITY, f64::INFINITY],
            max: [f64::NEG_INFINITY, f64::NEG_INFINITY],
        }
    }

    pub fn extend(&mut self, p: [f64; 2]) {
        if !(p[0].is_finite() && p[1].is_finite()) {
            return;
        }
        self.min[0] = self.min[0].min(p[0]);
        self.min[1] = self.min[1].min(p[1]);
        self.max[0] = self.max[0].max(p[0]);
        self.max[1] = self.max[1].max(p[1]);
    }

    pub fn is_valid(&self) -> bool {
        self.min[0] <= self.max[0] && self.min[1] <= self.max[1]
    }

    pub fn width(&self) -> f64 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> f64 {
        self.max[1] - self.min[1]
    }
}

#[cfg(test)]
mod tests {
    use super::Aabb2;

    #[test]
    fn empty_box_is_invalid_until_extended() {
        let mut b = Aabb2::empty();
        assert!(!b.is_valid());
        b.extend([1.0, -2.0]);
        b.extend([3.0, 4.0]);
        b.extend([f64::NAN, 100.0]);
        assert!(b.is_valid());
        assert_eq!(b, Aabb2::new([1.0, -2.0], [3.0, 4.0]));
        assert_eq!(b.width(), 2.0);
        assert_eq!(b.height(), 6.0);
    }
}
