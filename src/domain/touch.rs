use super::geometry::Point;

pub type PointerId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    /// First pointer of a gesture touched the surface.
    Down,
    /// Another pointer joined an ongoing gesture.
    PointerDown,
    Move,
    /// Last pointer of a gesture left the surface.
    Up,
    /// A pointer left while others stay down.
    PointerUp,
    /// The platform aborted the pointer; handled like a release.
    Cancel,
}

impl TouchPhase {
    pub fn is_press(self) -> bool {
        matches!(self, Self::Down | Self::PointerDown)
    }

    pub fn is_release(self) -> bool {
        matches!(self, Self::Up | Self::PointerUp | Self::Cancel)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchEvent {
    pub phase: TouchPhase,
    pub pointer: PointerId,
    pub position: Point,
}

impl TouchEvent {
    pub fn new(phase: TouchPhase, pointer: PointerId, x: f32, y: f32) -> Self {
        Self {
            phase,
            pointer,
            position: Point::new(x, y),
        }
    }

    pub fn down(pointer: PointerId, x: f32, y: f32) -> Self {
        Self::new(TouchPhase::Down, pointer, x, y)
    }

    pub fn pointer_down(pointer: PointerId, x: f32, y: f32) -> Self {
        Self::new(TouchPhase::PointerDown, pointer, x, y)
    }

    pub fn moved(pointer: PointerId, x: f32, y: f32) -> Self {
        Self::new(TouchPhase::Move, pointer, x, y)
    }

    pub fn up(pointer: PointerId, x: f32, y: f32) -> Self {
        Self::new(TouchPhase::Up, pointer, x, y)
    }

    pub fn pointer_up(pointer: PointerId, x: f32, y: f32) -> Self {
        Self::new(TouchPhase::PointerUp, pointer, x, y)
    }
}
