/// 2-D point in frame coordinates. The feature set of the Lucas-Kanade
/// tracker is an ordered `Vec<Point>`, fixed in count after initialization
/// and mutated in place every frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned region of interest in frame coordinates (top-left origin).
#[derive(Debug, Clone, Copy, Default)]
pub struct Rect {
    /// Top-left x coordinate
    pub x: f32,
    /// Top-left y coordinate
    pub y: f32,
    /// Width of the region
    pub width: f32,
    /// Height of the region
    pub height: f32,
}

impl Rect {
    #[inline]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True when either dimension is non-positive.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Get the center point of the region.
    #[inline]
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Get the area of the region.
    #[inline]
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Half-open point-in-rectangle test: `x ∈ [rx, rx+rw)`, `y ∈ [ry, ry+rh)`.
    #[inline]
    pub fn contains(&self, point: &Point) -> bool {
        self.x <= point.x
            && point.x < self.x + self.width
            && self.y <= point.y
            && point.y < self.y + self.height
    }

    /// Clamp the region in place so it lies fully inside a
    /// `frame_width x frame_height` frame. The size is clamped to the frame
    /// size first, then the origin to `[0, frame - size]`.
    pub fn clamp_to(&mut self, frame_width: usize, frame_height: usize) {
        let fw = frame_width as f32;
        let fh = frame_height as f32;
        self.width = self.width.min(fw);
        self.height = self.height.min(fh);
        self.x = self.x.max(0.0).min(fw - self.width);
        self.y = self.y.max(0.0).min(fh - self.height);
    }

    /// Intersection area with another region.
    pub fn intersection_area(&self, other: &Rect) -> f32 {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = (self.x + self.width).min(other.x + other.width);
        let y2 = (self.y + self.height).min(other.y + other.height);
        (x2 - x1).max(0.0) * (y2 - y1).max(0.0)
    }

    /// Intersection over Union with another region.
    ///
    /// Returns the raw quotient `inter / (area(a) + area(b) - inter)`. When
    /// both rectangles are degenerate the union area is zero and the result
    /// is NaN; this is deliberate — callers scoring tracker output must guard
    /// against NaN themselves rather than rely on a made-up default.
    pub fn iou(&self, other: &Rect) -> f32 {
        let inter = self.intersection_area(other);
        inter / (self.area() + other.area() - inter)
    }
}
