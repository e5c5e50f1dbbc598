use super::geometry::{Point, Rect};
use super::touch::{PointerId, TouchEvent, TouchPhase};

/// Bitmask of button categories shown by the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OverlayMask(pub u32);

impl OverlayMask {
    pub const NONE: Self = Self(0);
    pub const BASIC: Self = Self(1);
    pub const L2R2: Self = Self(2);
    pub const TOUCH_SCREEN_SWITCH: Self = Self(4);
    pub const ALL: Self = Self(1 | 2 | 4);

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub fn toggled(self, other: Self) -> Self {
        Self(self.0 ^ other.0)
    }
}

impl std::ops::BitOr for OverlayMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Button {
    pub legacy_id: i32,
    pub control: i32,
    /// Single category bit; compared against the overlay mask.
    pub role: OverlayMask,
    pub bounds: Rect,
    pub alpha: u8,
    pointer: Option<PointerId>,
    pressed: bool,
}

impl Button {
    pub fn new(legacy_id: i32, control: i32, role: OverlayMask, bounds: Rect, alpha: u8) -> Self {
        Self {
            legacy_id,
            control,
            role,
            bounds,
            alpha,
            pointer: None,
            pressed: false,
        }
    }

    pub fn is_touch_switch(&self) -> bool {
        self.role == OverlayMask::TOUCH_SCREEN_SWITCH
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn pointer(&self) -> Option<PointerId> {
        self.pointer
    }

    /// Binds `pointer` when it lands inside an idle button.
    pub fn press(&mut self, pointer: PointerId, position: Point) -> bool {
        if self.pointer.is_some() || !self.bounds.contains_point(position) {
            return false;
        }
        self.pointer = Some(pointer);
        self.pressed = true;
        true
    }

    pub fn release(&mut self, pointer: PointerId) -> bool {
        if self.pointer != Some(pointer) {
            return false;
        }
        self.pointer = None;
        self.pressed = false;
        true
    }

    pub fn reset(&mut self) {
        self.pointer = None;
        self.pressed = false;
    }
}

/// The four direction flags of a dpad touch. Independent, so diagonals happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DpadZones {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl DpadZones {
    /// Zones for a touch at pixel `(x, y)`. Each edge claims a third of the
    /// bound, measured from that edge alone.
    pub fn at(bounds: &Rect, x: i32, y: i32) -> Self {
        let third_h = bounds.height() / 3;
        let third_w = bounds.width() / 3;
        Self {
            up: bounds.top + third_h > y,
            down: bounds.bottom - third_h < y,
            left: bounds.left + third_w > x,
            right: bounds.right - third_w < x,
        }
    }

    pub fn as_array(&self) -> [bool; 4] {
        [self.up, self.down, self.left, self.right]
    }

    pub fn any(&self) -> bool {
        self.up || self.down || self.left || self.right
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DpadState {
    #[default]
    Idle,
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

impl DpadState {
    /// Up wins over down and left over right, so opposite pairs never combine.
    pub fn from_zones(zones: DpadZones) -> Self {
        match (zones.up, zones.down, zones.left, zones.right) {
            (true, _, true, _) => Self::UpLeft,
            (true, _, false, true) => Self::UpRight,
            (true, _, false, false) => Self::Up,
            (false, true, true, _) => Self::DownLeft,
            (false, true, false, true) => Self::DownRight,
            (false, true, false, false) => Self::Down,
            (false, false, true, _) => Self::Left,
            (false, false, false, true) => Self::Right,
            (false, false, false, false) => Self::Idle,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dpad {
    pub legacy_id: i32,
    /// Output ids for up, down, left, right.
    pub controls: [i32; 4],
    pub bounds: Rect,
    pub alpha: u8,
    pointer: Option<PointerId>,
    state: DpadState,
}

impl Dpad {
    pub fn new(legacy_id: i32, controls: [i32; 4], bounds: Rect, alpha: u8) -> Self {
        Self {
            legacy_id,
            controls,
            bounds,
            alpha,
            pointer: None,
            state: DpadState::Idle,
        }
    }

    pub fn state(&self) -> DpadState {
        self.state
    }

    pub fn pointer(&self) -> Option<PointerId> {
        self.pointer
    }

    pub fn bind(&mut self, pointer: PointerId, position: Point) -> bool {
        if self.pointer.is_some() || !self.bounds.contains_point(position) {
            return false;
        }
        self.pointer = Some(pointer);
        true
    }

    /// Recomputes the zones for the bound pointer. `None` if `pointer` is not ours.
    pub fn steer(&mut self, pointer: PointerId, position: Point) -> Option<DpadZones> {
        if self.pointer != Some(pointer) {
            return None;
        }
        let (x, y) = position.pixel();
        let zones = DpadZones::at(&self.bounds, x, y);
        self.state = DpadState::from_zones(zones);
        Some(zones)
    }

    pub fn release(&mut self, pointer: PointerId) -> bool {
        if self.pointer != Some(pointer) {
            return false;
        }
        self.pointer = None;
        self.state = DpadState::Idle;
        true
    }

    pub fn reset(&mut self) {
        self.pointer = None;
        self.state = DpadState::Idle;
    }
}

/// Maps a normalized stick component to a signed 16-bit axis value.
pub fn axis_value(component: f32) -> i16 {
    let scaled = (component * 32768.0).round();
    scaled.clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

#[derive(Debug, Clone, PartialEq)]
pub struct Joystick {
    pub legacy_id: i32,
    pub x_axis: i32,
    pub y_axis: i32,
    /// Range of travel.
    pub outer: Rect,
    /// Stick cap; follows the stick vector inside `outer`.
    pub inner: Rect,
    pub alpha: u8,
    pointer: Option<PointerId>,
    pressed: bool,
    vector: (f32, f32),
}

impl Joystick {
    pub fn new(
        legacy_id: i32,
        x_axis: i32,
        y_axis: i32,
        outer: Rect,
        cap_size: i32,
        alpha: u8,
    ) -> Self {
        let (cx, cy) = outer.center();
        let inner = Rect::from_origin(0, 0, cap_size, cap_size).centered_on(cx, cy);
        Self {
            legacy_id,
            x_axis,
            y_axis,
            outer,
            inner,
            alpha,
            pointer: None,
            pressed: false,
            vector: (0.0, 0.0),
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn pointer(&self) -> Option<PointerId> {
        self.pointer
    }

    /// Current stick deflection, each component in `[-1, 1]`.
    pub fn vector(&self) -> (f32, f32) {
        self.vector
    }

    pub fn axes(&self) -> (i16, i16) {
        (axis_value(self.vector.0), axis_value(self.vector.1))
    }

    /// Feeds one pointer event through the stick's capture logic. Returns
    /// `true` when the event belonged to this stick and its axes should be
    /// re-emitted.
    pub fn track(&mut self, event: &TouchEvent) -> bool {
        match event.phase {
            TouchPhase::Down | TouchPhase::PointerDown => {
                if self.pointer.is_some() || !self.outer.contains_point(event.position) {
                    return false;
                }
                self.pointer = Some(event.pointer);
                self.pressed = true;
                self.steer(event.position);
                true
            }
            TouchPhase::Move => {
                if self.pointer != Some(event.pointer) {
                    return false;
                }
                self.steer(event.position);
                true
            }
            TouchPhase::Up | TouchPhase::PointerUp | TouchPhase::Cancel => {
                if self.pointer != Some(event.pointer) {
                    return false;
                }
                self.reset();
                true
            }
        }
    }

    pub fn translate(&mut self, dx: i32, dy: i32) {
        self.outer = self.outer.translated(dx, dy);
        self.inner = self.inner.translated(dx, dy);
    }

    pub fn reset(&mut self) {
        self.pointer = None;
        self.pressed = false;
        self.vector = (0.0, 0.0);
        let (cx, cy) = self.outer.center();
        self.inner = self.inner.centered_on(cx, cy);
    }

    fn steer(&mut self, position: Point) {
        let (cx, cy) = self.outer.center();
        let rx = (self.outer.width() as f32 / 2.0).max(1.0);
        let ry = (self.outer.height() as f32 / 2.0).max(1.0);
        let mut x = (position.x - cx) / rx;
        let mut y = (position.y - cy) / ry;
        let magnitude = x.hypot(y);
        if magnitude > 1.0 {
            x /= magnitude;
            y /= magnitude;
        }
        self.vector = (x, y);
        self.inner = self.inner.centered_on(cx + x * rx, cy + y * ry);
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    // Property: dpad zones never report both opposite directions on a square pad
    proptest! {
        #[test]
        fn prop_dpad_square_has_no_opposites(size in 3i32..600, fx in 0.0f64..1.0, fy in 0.0f64..1.0) {
            let bounds = Rect::from_origin(0, 0, size, size);
            let x = (fx * size as f64) as i32;
            let y = (fy * size as f64) as i32;
            let zones = DpadZones::at(&bounds, x, y);

            prop_assert!(!(zones.up && zones.down));
            prop_assert!(!(zones.left && zones.right));
        }
    }

    // Property: the dpad state agrees with the strongest vertical/horizontal zone
    proptest! {
        #[test]
        fn prop_dpad_state_matches_zones(up in any::<bool>(), down in any::<bool>(), left in any::<bool>(), right in any::<bool>()) {
            let state = DpadState::from_zones(DpadZones { up, down, left, right });
            let vertical = if up { 1 } else if down { 2 } else { 0 };
            let horizontal = if left { 1 } else if right { 2 } else { 0 };
            let expected = match (vertical, horizontal) {
                (0, 0) => DpadState::Idle,
                (1, 0) => DpadState::Up,
                (2, 0) => DpadState::Down,
                (0, 1) => DpadState::Left,
                (0, 2) => DpadState::Right,
                (1, 1) => DpadState::UpLeft,
                (1, 2) => DpadState::UpRight,
                (2, 1) => DpadState::DownLeft,
                _ => DpadState::DownRight,
            };

            prop_assert_eq!(state, expected);
        }
    }

    // Property: axis values stay in range for any stick deflection up to unit length
    proptest! {
        #[test]
        fn prop_axis_value_in_range(component in -1.0001f32..1.0001f32) {
            let value = axis_value(component) as i32;

            prop_assert!((-32768..=32767).contains(&value));
        }
    }

    // Property: joystick vector magnitude never exceeds one
    proptest! {
        #[test]
        fn prop_joystick_vector_clamped(x in -2000.0f32..2000.0, y in -2000.0f32..2000.0) {
            let mut stick = Joystick::new(10, 0, 1, Rect::from_origin(100, 100, 200, 200), 145, 255);
            stick.track(&TouchEvent::down(7, 200.0, 200.0));
            stick.track(&TouchEvent::moved(7, x, y));
            let (vx, vy) = stick.vector();

            prop_assert!(vx.hypot(vy) <= 1.0 + 1e-4);
        }
    }
}
