use communication::Point;

/// Points waiting for the next flush, in arrival order.
///
/// Owned by the flush loop alone. `clear` keeps the allocation, so a buffer
/// sized once at startup is reused for every batch.
#[derive(Debug)]
pub(crate) struct PointBuffer {
    points: Vec<Point>,
    max_points: usize,
}

impl PointBuffer {
    pub fn with_capacity(max_points: usize) -> Self {
        Self {
            points: Vec::with_capacity(max_points),
            max_points,
        }
    }

    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    /// True once the buffer holds as many points as one batch may carry.
    pub fn is_full(&self) -> bool {
        self.points.len() >= self.max_points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}
