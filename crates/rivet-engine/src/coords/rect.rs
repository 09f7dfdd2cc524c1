use super::Vec2;

/// Axis-aligned rectangle in pixels (top-left origin).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        self.origin + self.size
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    /// Normalizes the rectangle so width/height are non-negative.
    pub fn normalized(self) -> Self {
        let (x, w) = if self.size.x < 0.0 {
            (self.origin.x + self.size.x, -self.size.x)
        } else {
            (self.origin.x, self.size.x)
        };
        let (y, h) = if self.size.y < 0.0 {
            (self.origin.y + self.size.y, -self.size.y)
        } else {
            (self.origin.y, self.size.y)
        };
        Rect::new(x, y, w, h)
    }

    /// Half-open containment: [min, max).
    pub fn contains(self, p: Vec2) -> bool {
        let r = self.normalized();
        let max = r.max();
        p.x >= r.origin.x && p.y >= r.origin.y && p.x < max.x && p.y < max.y
    }

    /// Rounds outward to whole pixels, returning `(x, y, width, height)`.
    ///
    /// This is the integer form UI layers hand to scissor APIs.
    pub fn to_pixels(self) -> (i32, i32, i32, i32) {
        let r = self.normalized();
        let x0 = r.origin.x.floor() as i32;
        let y0 = r.origin.y.floor() as i32;
        let x1 = r.max().x.ceil() as i32;
        let y1 = r.max().y.ceil() as i32;
        (x0, y0, x1 - x0, y1 - y0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(x: f32, y: f32, w: f32, h: f32) -> Rect { Rect::new(x, y, w, h) }

    #[test]
    fn normalized_flips_negative_extents() {
        let n = r(10.0, 10.0, -4.0, -3.0).normalized();
        assert_eq!(n, r(6.0, 7.0, 4.0, 3.0));
    }

    #[test]
    fn contains_is_half_open() {
        let rect = r(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains(Vec2::new(0.0, 0.0)));
        assert!(rect.contains(Vec2::new(9.5, 9.5)));
        assert!(!rect.contains(Vec2::new(10.0, 10.0)));
        assert!(!rect.contains(Vec2::new(-1.0, 5.0)));
    }

    #[test]
    fn to_pixels_rounds_outward() {
        assert_eq!(r(1.5, 2.25, 3.0, 3.5).to_pixels(), (1, 2, 4, 4));
        assert_eq!(r(10.0, 10.0, 50.0, 50.0).to_pixels(), (10, 10, 50, 50));
    }
}
