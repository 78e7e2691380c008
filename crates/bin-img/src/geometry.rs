//! Half-open pixel rectangles.

/// A rectangle covering `min_x..max_x` by `min_y..max_y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl Rect {
    pub const fn new(min_x: u32, min_y: u32, max_x: u32, max_y: u32) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    /// Rectangle anchored at the origin.
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn width(&self) -> u32 {
        self.max_x.saturating_sub(self.min_x)
    }

    pub fn height(&self) -> u32 {
        self.max_y.saturating_sub(self.min_y)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.min_x && x < self.max_x && y >= self.min_y && y < self.max_y
    }

    /// Largest rectangle contained in both. Disjoint inputs give an empty rect.
    pub fn intersect(&self, other: &Rect) -> Rect {
        let r = Rect::new(
            self.min_x.max(other.min_x),
            self.min_y.max(other.min_y),
            self.max_x.min(other.max_x),
            self.max_y.min(other.max_y),
        );
        if r.is_empty() { Rect::default() } else { r }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions() {
        let r = Rect::new(3, 4, 11, 6);
        assert_eq!(r.width(), 8);
        assert_eq!(r.height(), 2);
        assert!(!r.is_empty());
    }

    #[test]
    fn test_contains_is_half_open() {
        let r = Rect::from_size(8, 2);
        assert!(r.contains(0, 0));
        assert!(r.contains(7, 1));
        assert!(!r.contains(8, 1));
        assert!(!r.contains(7, 2));
    }

    #[test]
    fn test_intersect() {
        let a = Rect::from_size(16, 16);
        let b = Rect::new(8, 4, 24, 10);
        assert_eq!(a.intersect(&b), Rect::new(8, 4, 16, 10));
    }

    #[test]
    fn test_intersect_disjoint_is_empty() {
        let a = Rect::from_size(8, 8);
        let b = Rect::new(8, 0, 16, 8);
        assert!(a.intersect(&b).is_empty());
    }
}
