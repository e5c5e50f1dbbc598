/// Position of a pointer in overlay-local pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Pixel the point falls into. Hit tests and drag deltas work on whole pixels.
    pub fn pixel(&self) -> (i32, i32) {
        (self.x as i32, self.y as i32)
    }
}

/// Axis-aligned rectangle, half-open on the right and bottom edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn from_origin(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x.saturating_add(width), y.saturating_add(height))
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        !self.is_empty() && x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }

    pub fn contains_point(&self, point: Point) -> bool {
        let (x, y) = point.pixel();
        self.contains(x, y)
    }

    pub fn center(&self) -> (f32, f32) {
        (
            (self.left + self.right) as f32 / 2.0,
            (self.top + self.bottom) as f32 / 2.0,
        )
    }

    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self::new(
            self.left.saturating_add(dx),
            self.top.saturating_add(dy),
            self.right.saturating_add(dx),
            self.bottom.saturating_add(dy),
        )
    }

    /// Same size, moved so its center lands on `(cx, cy)`.
    pub fn centered_on(&self, cx: f32, cy: f32) -> Self {
        let width = self.width();
        let height = self.height();
        let left = (cx - width as f32 / 2.0) as i32;
        let top = (cy - height as f32 / 2.0) as i32;
        Self::from_origin(left, top, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::{Point, Rect};

    #[test]
    fn contains_is_half_open() {
        let rect = Rect::from_origin(10, 20, 30, 40);

        assert!(rect.contains(10, 20));
        assert!(rect.contains(39, 59));
        assert!(!rect.contains(40, 20));
        assert!(!rect.contains(10, 60));
        assert!(!rect.contains(9, 30));
    }

    #[test]
    fn empty_rect_contains_nothing() {
        let rect = Rect::new(5, 5, 5, 10);

        assert!(rect.is_empty());
        assert!(!rect.contains(5, 5));
    }

    #[test]
    fn point_hit_test_truncates_coordinates() {
        let rect = Rect::from_origin(0, 0, 10, 10);

        assert!(rect.contains_point(Point::new(9.9, 9.9)));
        assert!(!rect.contains_point(Point::new(10.0, 0.5)));
    }

    #[test]
    fn far_origins_saturate_instead_of_overflowing() {
        let rect = Rect::from_origin(i32::MAX - 5, 0, 10, 10);

        assert_eq!(rect.right, i32::MAX);
        assert_eq!(rect.translated(i32::MIN, 0).left, -6);
        assert_eq!(rect.translated(20, 0).left, i32::MAX);
    }

    #[test]
    fn centered_on_keeps_size() {
        let rect = Rect::from_origin(0, 0, 20, 20);
        let moved = rect.centered_on(50.0, 60.0);

        assert_eq!(moved, Rect::new(40, 50, 60, 70));
        assert_eq!(moved.width(), 20);
    }
}
