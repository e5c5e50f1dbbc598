//! Fixed description of the Vita control set: which controls exist, what
//! they emit, how big they are and where they sit on a fresh layout.

use super::control::OverlayMask;

/// Persistence keys of the controls. Stable across releases.
pub mod legacy {
    pub const BUTTON_CROSS: i32 = 0;
    pub const BUTTON_CIRCLE: i32 = 1;
    pub const BUTTON_SQUARE: i32 = 2;
    pub const BUTTON_TRIANGLE: i32 = 3;
    pub const BUTTON_SELECT: i32 = 4;
    pub const BUTTON_START: i32 = 5;
    pub const DPAD: i32 = 6;
    pub const BUTTON_PS: i32 = 7;
    pub const STICK_LEFT: i32 = 10;
    pub const STICK_RIGHT: i32 = 15;
    pub const TRIGGER_L: i32 = 20;
    pub const TRIGGER_R: i32 = 21;
    pub const TRIGGER_L2: i32 = 22;
    pub const TRIGGER_R2: i32 = 23;
    pub const BUTTON_TOUCH_SWITCH: i32 = 1024;
}

/// Ids understood by the controller backend (SDL game controller numbering).
pub mod output {
    pub const A: i32 = 0;
    pub const B: i32 = 1;
    pub const X: i32 = 2;
    pub const Y: i32 = 3;
    pub const SELECT: i32 = 4;
    pub const GUIDE: i32 = 5;
    pub const START: i32 = 6;
    pub const L1: i32 = 9;
    pub const R1: i32 = 10;
    pub const DPAD_UP: i32 = 11;
    pub const DPAD_DOWN: i32 = 12;
    pub const DPAD_LEFT: i32 = 13;
    pub const DPAD_RIGHT: i32 = 14;
    // Axes on the SDL side, buttons on the Vita.
    pub const L2: i32 = -4;
    pub const R2: i32 = -5;
    pub const TOUCH: i32 = 1024;

    pub const AXIS_LEFT_X: i32 = 0;
    pub const AXIS_LEFT_Y: i32 = 1;
    pub const AXIS_RIGHT_X: i32 = 2;
    pub const AXIS_RIGHT_Y: i32 = 3;
}

const FACE_BUTTON_SIZE: f32 = 0.15;
const WIDE_BUTTON_SIZE: f32 = 0.25;
const SMALL_BUTTON_SIZE: f32 = 0.11;
pub const DPAD_SIZE: f32 = 0.35;
pub const STICK_SIZE: f32 = 0.275;
/// Ratio between the stick range and its cap.
pub const STICK_CAP_RATIO: f32 = 1.375;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButtonSpec {
    pub legacy_id: i32,
    pub control: i32,
    pub role: OverlayMask,
    /// Side length as a fraction of the smaller display dimension.
    pub size: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DpadSpec {
    pub legacy_id: i32,
    pub controls: [i32; 4],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JoystickSpec {
    pub legacy_id: i32,
    pub x_axis: i32,
    pub y_axis: i32,
}

const fn button(legacy_id: i32, control: i32, role: OverlayMask, size: f32) -> ButtonSpec {
    ButtonSpec {
        legacy_id,
        control,
        role,
        size,
    }
}

pub const BUTTONS: [ButtonSpec; 12] = [
    button(legacy::BUTTON_CROSS, output::A, OverlayMask::BASIC, FACE_BUTTON_SIZE),
    button(legacy::BUTTON_CIRCLE, output::B, OverlayMask::BASIC, FACE_BUTTON_SIZE),
    button(legacy::BUTTON_SQUARE, output::X, OverlayMask::BASIC, FACE_BUTTON_SIZE),
    button(legacy::BUTTON_TRIANGLE, output::Y, OverlayMask::BASIC, FACE_BUTTON_SIZE),
    button(legacy::BUTTON_START, output::START, OverlayMask::BASIC, WIDE_BUTTON_SIZE),
    button(legacy::BUTTON_PS, output::GUIDE, OverlayMask::BASIC, SMALL_BUTTON_SIZE),
    button(legacy::BUTTON_SELECT, output::SELECT, OverlayMask::BASIC, WIDE_BUTTON_SIZE),
    button(legacy::TRIGGER_L, output::L1, OverlayMask::BASIC, WIDE_BUTTON_SIZE),
    button(legacy::TRIGGER_R, output::R1, OverlayMask::BASIC, WIDE_BUTTON_SIZE),
    button(legacy::TRIGGER_L2, output::L2, OverlayMask::L2R2, WIDE_BUTTON_SIZE),
    button(legacy::TRIGGER_R2, output::R2, OverlayMask::L2R2, WIDE_BUTTON_SIZE),
    button(
        legacy::BUTTON_TOUCH_SWITCH,
        output::TOUCH,
        OverlayMask::TOUCH_SCREEN_SWITCH,
        SMALL_BUTTON_SIZE,
    ),
];

pub const DPADS: [DpadSpec; 1] = [DpadSpec {
    legacy_id: legacy::DPAD,
    controls: [
        output::DPAD_UP,
        output::DPAD_DOWN,
        output::DPAD_LEFT,
        output::DPAD_RIGHT,
    ],
}];

pub const JOYSTICKS: [JoystickSpec; 2] = [
    JoystickSpec {
        legacy_id: legacy::STICK_LEFT,
        x_axis: output::AXIS_LEFT_X,
        y_axis: output::AXIS_LEFT_Y,
    },
    JoystickSpec {
        legacy_id: legacy::STICK_RIGHT,
        x_axis: output::AXIS_RIGHT_X,
        y_axis: output::AXIS_RIGHT_Y,
    },
];

/// Fresh-layout origins in per-mille of the horizontal and vertical span.
pub const DEFAULT_POSITIONS: [(i32, u16, u16); 15] = [
    (legacy::BUTTON_CROSS, 840, 730),
    (legacy::BUTTON_CIRCLE, 910, 580),
    (legacy::BUTTON_SQUARE, 760, 580),
    (legacy::BUTTON_TRIANGLE, 840, 430),
    (legacy::BUTTON_SELECT, 390, 40),
    (legacy::BUTTON_START, 540, 40),
    (legacy::BUTTON_PS, 475, 300),
    (legacy::DPAD, 40, 330),
    (legacy::STICK_LEFT, 230, 690),
    (legacy::STICK_RIGHT, 600, 690),
    (legacy::TRIGGER_L, 20, 20),
    (legacy::TRIGGER_R, 840, 20),
    (legacy::TRIGGER_L2, 180, 20),
    (legacy::TRIGGER_R2, 685, 20),
    (legacy::BUTTON_TOUCH_SWITCH, 930, 880),
];

/// Side of the control as a fraction of the smaller display dimension.
pub fn size_fraction(legacy_id: i32) -> Option<f32> {
    if let Some(spec) = BUTTONS.iter().find(|spec| spec.legacy_id == legacy_id) {
        return Some(spec.size);
    }
    if DPADS.iter().any(|spec| spec.legacy_id == legacy_id) {
        return Some(DPAD_SIZE);
    }
    JOYSTICKS
        .iter()
        .any(|spec| spec.legacy_id == legacy_id)
        .then_some(STICK_SIZE)
}

pub fn all_legacy_ids() -> impl Iterator<Item = i32> {
    BUTTONS
        .iter()
        .map(|spec| spec.legacy_id)
        .chain(DPADS.iter().map(|spec| spec.legacy_id))
        .chain(JOYSTICKS.iter().map(|spec| spec.legacy_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_control_has_a_default_position() {
        let with_defaults: HashSet<i32> = DEFAULT_POSITIONS.iter().map(|(id, _, _)| *id).collect();

        for id in all_legacy_ids() {
            assert!(with_defaults.contains(&id), "no default for {id}");
        }
        assert_eq!(with_defaults.len(), all_legacy_ids().count());
    }

    #[test]
    fn sizes_follow_control_kind() {
        assert_eq!(size_fraction(legacy::BUTTON_CROSS), Some(FACE_BUTTON_SIZE));
        assert_eq!(size_fraction(legacy::DPAD), Some(DPAD_SIZE));
        assert_eq!(size_fraction(legacy::STICK_RIGHT), Some(STICK_SIZE));
        assert_eq!(size_fraction(99), None);
    }

    #[test]
    fn only_triggers_two_use_the_l2r2_category() {
        let l2r2: Vec<i32> = BUTTONS
            .iter()
            .filter(|spec| spec.role == OverlayMask::L2R2)
            .map(|spec| spec.legacy_id)
            .collect();

        assert_eq!(l2r2, vec![legacy::TRIGGER_L2, legacy::TRIGGER_R2]);
    }
}
