use super::control::{Button, Dpad, Joystick};
use super::control_set::{ControlRef, ControlSet};
use super::output::OutputSink;
use super::touch::{PointerId, TouchEvent, TouchPhase};

/// New resting place of a control after an edit-mode drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionCommit {
    pub legacy_id: i32,
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RouteOutcome {
    /// Some control changed state; the host redraws and does not forward
    /// the event to the view underneath.
    pub handled: bool,
    pub commit: Option<PositionCommit>,
}

impl RouteOutcome {
    fn ignored() -> Self {
        Self::default()
    }

    fn handled() -> Self {
        Self {
            handled: true,
            commit: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EditCapture {
    target: ControlRef,
    pointer: PointerId,
    last: (i32, i32),
}

/// Turns pointer events into control state changes and controller output.
#[derive(Debug, Default)]
pub struct TouchRouter {
    capture: Option<EditCapture>,
    touch_back: bool,
}

impl TouchRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the touch-switch currently routes to the rear panel.
    pub fn touch_back(&self) -> bool {
        self.touch_back
    }

    /// Control being dragged in edit mode, if any.
    pub fn configuring(&self) -> Option<ControlRef> {
        self.capture.map(|capture| capture.target)
    }

    /// Forgets an uncommitted drag. Needed whenever the control set is rebuilt.
    /// Returns `true` if a drag was in progress.
    pub fn cancel_edit(&mut self) -> bool {
        match self.capture.take() {
            Some(capture) => {
                log::debug!("dropped edit capture of {:?}", capture.target);
                true
            }
            None => false,
        }
    }

    /// Normal mode: drives buttons, dpads and sticks. Returns `true` if any
    /// control changed state.
    pub fn route(
        &mut self,
        controls: &mut ControlSet,
        event: &TouchEvent,
        sink: &mut dyn OutputSink,
    ) -> bool {
        if !controls.is_enabled() {
            return false;
        }
        let mut handled = false;

        for button in controls.visible_buttons_mut() {
            handled |= self.route_button(button, event, sink);
        }
        for dpad in &mut controls.dpads {
            handled |= route_dpad(dpad, event, sink);
        }
        for stick in &mut controls.joysticks {
            handled |= route_joystick(stick, event, sink);
        }

        handled
    }

    /// Edit mode: drags one control at a time and reports where it was dropped.
    /// Never talks to the output sink.
    pub fn route_edit(&mut self, controls: &mut ControlSet, event: &TouchEvent) -> RouteOutcome {
        if !controls.is_enabled() {
            return RouteOutcome::ignored();
        }
        let (x, y) = event.position.pixel();

        match event.phase {
            TouchPhase::Down | TouchPhase::PointerDown => {
                if self.capture.is_some() {
                    return RouteOutcome::ignored();
                }
                let Some(target) = controls.hit_test(event.position) else {
                    return RouteOutcome::ignored();
                };
                log::debug!("editing {target:?} with pointer {}", event.pointer);
                self.capture = Some(EditCapture {
                    target,
                    pointer: event.pointer,
                    last: (x, y),
                });
                RouteOutcome::handled()
            }
            TouchPhase::Move => {
                let Some(capture) = self.capture.as_mut() else {
                    return RouteOutcome::ignored();
                };
                if capture.pointer != event.pointer {
                    return RouteOutcome::ignored();
                }
                let (last_x, last_y) = capture.last;
                controls.translate(capture.target, x - last_x, y - last_y);
                capture.last = (x, y);
                RouteOutcome::handled()
            }
            TouchPhase::Up | TouchPhase::PointerUp | TouchPhase::Cancel => {
                let Some(capture) = self.capture else {
                    return RouteOutcome::ignored();
                };
                if capture.pointer != event.pointer {
                    return RouteOutcome::ignored();
                }
                self.capture = None;
                let commit = controls
                    .origin(capture.target)
                    .zip(controls.legacy_id(capture.target))
                    .map(|((x, y), legacy_id)| PositionCommit { legacy_id, x, y });
                RouteOutcome {
                    handled: true,
                    commit,
                }
            }
        }
    }

    /// Releases every control a live pointer is holding, with output, so the
    /// controller is not left with stuck inputs.
    pub fn release_held(&mut self, controls: &mut ControlSet, sink: &mut dyn OutputSink) {
        for button in &mut controls.buttons {
            if let Some(pointer) = button.pointer() {
                button.release(pointer);
                if !button.is_touch_switch() {
                    sink.set_button(button.control, false);
                }
            }
        }
        for dpad in &mut controls.dpads {
            if let Some(pointer) = dpad.pointer() {
                dpad.release(pointer);
                release_dpad_outputs(dpad, sink);
            }
        }
        for stick in &mut controls.joysticks {
            if stick.pointer().is_some() {
                stick.reset();
                sink.set_axis(stick.x_axis, 0);
                sink.set_axis(stick.y_axis, 0);
            }
        }
    }

    fn route_button(
        &mut self,
        button: &mut Button,
        event: &TouchEvent,
        sink: &mut dyn OutputSink,
    ) -> bool {
        match event.phase {
            TouchPhase::Down | TouchPhase::PointerDown => {
                if !button.press(event.pointer, event.position) {
                    return false;
                }
                if button.is_touch_switch() {
                    self.touch_back = !self.touch_back;
                    sink.set_touch_region(self.touch_back);
                } else {
                    sink.set_button(button.control, true);
                }
                true
            }
            TouchPhase::Up | TouchPhase::PointerUp | TouchPhase::Cancel => {
                if !button.release(event.pointer) {
                    return false;
                }
                // The touch switch toggles on press only.
                if !button.is_touch_switch() {
                    sink.set_button(button.control, false);
                }
                true
            }
            TouchPhase::Move => false,
        }
    }
}

fn route_dpad(dpad: &mut Dpad, event: &TouchEvent, sink: &mut dyn OutputSink) -> bool {
    let mut handled = false;
    if event.phase.is_press() && dpad.bind(event.pointer, event.position) {
        handled = true;
    }

    if event.phase.is_press() || event.phase == TouchPhase::Move {
        if let Some(zones) = dpad.steer(event.pointer, event.position) {
            handled = true;
            for (control, pressed) in dpad.controls.iter().zip(zones.as_array()) {
                if pressed {
                    sink.set_button(*control, true);
                }
            }
        }
    }

    if event.phase.is_release() && dpad.release(event.pointer) {
        handled = true;
        release_dpad_outputs(dpad, sink);
    }
    handled
}

fn release_dpad_outputs(dpad: &Dpad, sink: &mut dyn OutputSink) {
    for control in dpad.controls {
        sink.set_button(control, false);
    }
}

fn route_joystick(stick: &mut Joystick, event: &TouchEvent, sink: &mut dyn OutputSink) -> bool {
    if !stick.track(event) {
        return false;
    }
    let (x, y) = stick.axes();
    sink.set_axis(stick.x_axis, x);
    sink.set_axis(stick.y_axis, y);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{legacy, output};
    use crate::domain::control::{DpadState, OverlayMask};
    use crate::domain::control_set::{ControlParams, DisplayMetrics, LayoutSource};
    use crate::domain::output::{OutputEvent, RecordingSink};
    use std::collections::HashMap;

    // Cross at (1000, 500) 162px, L2 at (1300, 100) 270px, touch switch at
    // (1600, 900) 118px, dpad at (0, 0) 378px, left stick at (500, 600) 297px.
    // Everything else is parked off screen.
    struct TestLayout(HashMap<i32, (i32, i32)>);

    impl LayoutSource for TestLayout {
        fn position(&self, legacy_id: i32) -> (i32, i32) {
            self.0.get(&legacy_id).copied().unwrap_or((-5000, -5000))
        }
    }

    fn controls(mask: OverlayMask) -> ControlSet {
        let mut positions = HashMap::new();
        positions.insert(legacy::BUTTON_CROSS, (1000, 500));
        positions.insert(legacy::TRIGGER_L2, (1300, 100));
        positions.insert(legacy::BUTTON_TOUCH_SWITCH, (1600, 900));
        positions.insert(legacy::DPAD, (0, 0));
        positions.insert(legacy::STICK_LEFT, (500, 600));
        let params = ControlParams {
            mask,
            scale: 1.0,
            opacity: 100,
            display: DisplayMetrics::new(1920, 1080),
        };
        ControlSet::build(&TestLayout(positions), &params)
    }

    fn button(id: i32, pressed: bool) -> OutputEvent {
        OutputEvent::Button { id, pressed }
    }

    #[test]
    fn button_press_and_release_once() {
        let mut set = controls(OverlayMask::ALL);
        let mut router = TouchRouter::new();
        let mut sink = RecordingSink::new();

        assert!(router.route(&mut set, &TouchEvent::down(0, 1010.0, 510.0), &mut sink));
        assert!(set.buttons[0].is_pressed());
        assert!(!router.route(&mut set, &TouchEvent::moved(0, 1900.0, 10.0), &mut sink));
        assert!(router.route(&mut set, &TouchEvent::up(0, 1900.0, 10.0), &mut sink));

        assert_eq!(
            sink.events(),
            &[button(output::A, true), button(output::A, false)]
        );
        assert!(!set.buttons[0].is_pressed());
    }

    #[test]
    fn unmatched_release_is_ignored() {
        let mut set = controls(OverlayMask::ALL);
        let mut router = TouchRouter::new();
        let mut sink = RecordingSink::new();

        assert!(!router.route(&mut set, &TouchEvent::up(4, 1010.0, 510.0), &mut sink));
        assert!(sink.events().is_empty());
    }

    #[test]
    fn touch_switch_toggles_without_release() {
        let mut set = controls(OverlayMask::ALL);
        let mut router = TouchRouter::new();
        let mut sink = RecordingSink::new();

        for _ in 0..2 {
            router.route(&mut set, &TouchEvent::down(0, 1610.0, 910.0), &mut sink);
            router.route(&mut set, &TouchEvent::up(0, 1610.0, 910.0), &mut sink);
        }

        assert_eq!(
            sink.events(),
            &[
                OutputEvent::TouchRegion { is_back: true },
                OutputEvent::TouchRegion { is_back: false },
            ]
        );
    }

    #[test]
    fn basic_mask_ignores_l2r2_buttons() {
        let mut set = controls(OverlayMask::BASIC);
        let mut router = TouchRouter::new();
        let mut sink = RecordingSink::new();

        assert!(!router.route(&mut set, &TouchEvent::down(0, 1310.0, 110.0), &mut sink));
        assert!(sink.events().is_empty());
    }

    #[test]
    fn empty_mask_routes_nothing() {
        let mut set = controls(OverlayMask::NONE);
        let mut router = TouchRouter::new();
        let mut sink = RecordingSink::new();

        assert!(!router.route(&mut set, &TouchEvent::down(0, 10.0, 10.0), &mut sink));
        assert!(sink.events().is_empty());
    }

    #[test]
    fn dpad_center_presses_nothing() {
        let mut set = controls(OverlayMask::ALL);
        let mut router = TouchRouter::new();
        let mut sink = RecordingSink::new();

        assert!(router.route(&mut set, &TouchEvent::down(0, 189.0, 189.0), &mut sink));
        assert!(sink.events().is_empty());
        assert_eq!(set.dpads[0].state(), DpadState::Idle);
    }

    #[test]
    fn dpad_diagonal_then_release_all_four() {
        let mut set = controls(OverlayMask::ALL);
        let mut router = TouchRouter::new();
        let mut sink = RecordingSink::new();

        router.route(&mut set, &TouchEvent::down(0, 20.0, 20.0), &mut sink);
        assert_eq!(set.dpads[0].state(), DpadState::UpLeft);
        assert_eq!(
            sink.take(),
            vec![button(output::DPAD_UP, true), button(output::DPAD_LEFT, true)]
        );

        router.route(&mut set, &TouchEvent::moved(0, 360.0, 189.0), &mut sink);
        assert_eq!(set.dpads[0].state(), DpadState::Right);
        assert_eq!(sink.take(), vec![button(output::DPAD_RIGHT, true)]);

        router.route(&mut set, &TouchEvent::up(0, 360.0, 189.0), &mut sink);
        assert_eq!(
            sink.take(),
            vec![
                button(output::DPAD_UP, false),
                button(output::DPAD_DOWN, false),
                button(output::DPAD_LEFT, false),
                button(output::DPAD_RIGHT, false),
            ]
        );
        assert_eq!(set.dpads[0].state(), DpadState::Idle);
    }

    #[test]
    fn dpad_follows_its_own_pointer_only() {
        let mut set = controls(OverlayMask::ALL);
        let mut router = TouchRouter::new();
        let mut sink = RecordingSink::new();

        router.route(&mut set, &TouchEvent::down(0, 189.0, 20.0), &mut sink);
        sink.clear();
        router.route(&mut set, &TouchEvent::pointer_down(1, 189.0, 360.0), &mut sink);
        router.route(&mut set, &TouchEvent::moved(1, 20.0, 360.0), &mut sink);

        assert!(sink.events().is_empty());
        assert_eq!(set.dpads[0].state(), DpadState::Up);
    }

    #[test]
    fn joystick_emits_x_then_y_on_every_move() {
        let mut set = controls(OverlayMask::ALL);
        let mut router = TouchRouter::new();
        let mut sink = RecordingSink::new();
        let (cx, cy) = set.joysticks[0].outer.center();

        router.route(&mut set, &TouchEvent::down(0, cx, cy), &mut sink);
        router.route(&mut set, &TouchEvent::moved(0, cx + 500.0, cy), &mut sink);
        router.route(&mut set, &TouchEvent::up(0, cx + 500.0, cy), &mut sink);

        assert_eq!(
            sink.events(),
            &[
                OutputEvent::Axis { id: output::AXIS_LEFT_X, value: 0 },
                OutputEvent::Axis { id: output::AXIS_LEFT_Y, value: 0 },
                OutputEvent::Axis { id: output::AXIS_LEFT_X, value: 32767 },
                OutputEvent::Axis { id: output::AXIS_LEFT_Y, value: 0 },
                OutputEvent::Axis { id: output::AXIS_LEFT_X, value: 0 },
                OutputEvent::Axis { id: output::AXIS_LEFT_Y, value: 0 },
            ]
        );
    }

    #[test]
    fn pointers_drive_controls_independently() {
        let mut set = controls(OverlayMask::ALL);
        let mut router = TouchRouter::new();
        let mut sink = RecordingSink::new();

        router.route(&mut set, &TouchEvent::down(0, 1010.0, 510.0), &mut sink);
        router.route(&mut set, &TouchEvent::pointer_down(1, 20.0, 189.0), &mut sink);
        router.route(&mut set, &TouchEvent::pointer_up(0, 1010.0, 510.0), &mut sink);

        assert!(!set.buttons[0].is_pressed());
        assert_eq!(set.dpads[0].pointer(), Some(1));
        assert_eq!(
            sink.events(),
            &[
                button(output::A, true),
                button(output::DPAD_LEFT, true),
                button(output::A, false),
            ]
        );
    }

    #[test]
    fn cancel_releases_like_up() {
        let mut set = controls(OverlayMask::ALL);
        let mut router = TouchRouter::new();
        let mut sink = RecordingSink::new();

        router.route(&mut set, &TouchEvent::down(3, 1010.0, 510.0), &mut sink);
        let cancel = TouchEvent::new(TouchPhase::Cancel, 3, 0.0, 0.0);
        assert!(router.route(&mut set, &cancel, &mut sink));

        assert_eq!(sink.events().last(), Some(&button(output::A, false)));
    }

    #[test]
    fn edit_drag_commits_new_origin_without_output() {
        let mut set = controls(OverlayMask::ALL);
        let mut router = TouchRouter::new();

        let down = router.route_edit(&mut set, &TouchEvent::down(0, 1010.0, 510.0));
        assert!(down.handled);
        assert_eq!(router.configuring(), Some(ControlRef::Button(0)));

        router.route_edit(&mut set, &TouchEvent::moved(0, 1060.0, 480.0));
        router.route_edit(&mut set, &TouchEvent::moved(0, 1070.0, 470.0));
        let up = router.route_edit(&mut set, &TouchEvent::up(0, 1070.0, 470.0));

        assert_eq!(
            up.commit,
            Some(PositionCommit {
                legacy_id: legacy::BUTTON_CROSS,
                x: 1060,
                y: 460,
            })
        );
        assert_eq!(set.buttons[0].bounds.width(), 162);
        assert_eq!(router.configuring(), None);
        assert!(!set.buttons[0].is_pressed());
    }

    #[test]
    fn edit_capture_is_exclusive() {
        let mut set = controls(OverlayMask::ALL);
        let mut router = TouchRouter::new();

        router.route_edit(&mut set, &TouchEvent::down(0, 1010.0, 510.0));
        let second = router.route_edit(&mut set, &TouchEvent::pointer_down(1, 20.0, 20.0));
        assert!(!second.handled);

        router.route_edit(&mut set, &TouchEvent::moved(1, 120.0, 120.0));
        assert_eq!(set.dpads[0].bounds.left, 0);

        let other_up = router.route_edit(&mut set, &TouchEvent::pointer_up(1, 120.0, 120.0));
        assert_eq!(other_up.commit, None);
        assert_eq!(router.configuring(), Some(ControlRef::Button(0)));
    }

    #[test]
    fn edit_moves_joystick_cap_with_range() {
        let mut set = controls(OverlayMask::ALL);
        let mut router = TouchRouter::new();
        let cap_offset = set.joysticks[0].inner.left - set.joysticks[0].outer.left;

        router.route_edit(&mut set, &TouchEvent::down(0, 510.0, 610.0));
        router.route_edit(&mut set, &TouchEvent::moved(0, 610.0, 610.0));
        let up = router.route_edit(&mut set, &TouchEvent::up(0, 610.0, 610.0));

        assert_eq!(
            up.commit.map(|c| (c.legacy_id, c.x, c.y)),
            Some((legacy::STICK_LEFT, 600, 600))
        );
        let stick = &set.joysticks[0];
        assert_eq!(stick.inner.left - stick.outer.left, cap_offset);
    }

    #[test]
    fn release_held_synthesizes_releases() {
        let mut set = controls(OverlayMask::ALL);
        let mut router = TouchRouter::new();
        let mut sink = RecordingSink::new();
        let (cx, cy) = set.joysticks[0].outer.center();

        router.route(&mut set, &TouchEvent::down(0, 1010.0, 510.0), &mut sink);
        router.route(&mut set, &TouchEvent::pointer_down(1, cx + 50.0, cy), &mut sink);
        sink.clear();

        router.release_held(&mut set, &mut sink);

        assert_eq!(
            sink.events(),
            &[
                button(output::A, false),
                OutputEvent::Axis { id: output::AXIS_LEFT_X, value: 0 },
                OutputEvent::Axis { id: output::AXIS_LEFT_Y, value: 0 },
            ]
        );
        assert!(!set.buttons[0].is_pressed());
        assert!(!set.joysticks[0].is_pressed());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::catalog::output;
    use crate::domain::control::OverlayMask;
    use crate::domain::control_set::{ControlParams, DisplayMetrics, LayoutSource};
    use crate::domain::output::{OutputEvent, RecordingSink};
    use proptest::prelude::*;

    // Every control stacked in the top-left corner; only the cross sits apart.
    struct CrossApart;

    impl LayoutSource for CrossApart {
        fn position(&self, legacy_id: i32) -> (i32, i32) {
            if legacy_id == crate::domain::catalog::legacy::BUTTON_CROSS {
                (1000, 500)
            } else {
                (-5000, -5000)
            }
        }
    }

    fn controls() -> ControlSet {
        let params = ControlParams {
            mask: OverlayMask::ALL,
            scale: 1.0,
            opacity: 100,
            display: DisplayMetrics::new(1920, 1080),
        };
        ControlSet::build(&CrossApart, &params)
    }

    // Property: one pointer on a button yields exactly one press and one release
    proptest! {
        #[test]
        fn prop_button_gesture_is_balanced(
            start in (1000.0f32..1161.0, 500.0f32..661.0),
            moves in prop::collection::vec((-100.0f32..2000.0, -100.0f32..1200.0), 0..20),
        ) {
            let mut set = controls();
            let mut router = TouchRouter::new();
            let mut sink = RecordingSink::new();

            router.route(&mut set, &TouchEvent::down(9, start.0, start.1), &mut sink);
            let mut last = start;
            for (x, y) in moves {
                router.route(&mut set, &TouchEvent::moved(9, x, y), &mut sink);
                last = (x, y);
            }
            router.route(&mut set, &TouchEvent::up(9, last.0, last.1), &mut sink);

            prop_assert_eq!(
                sink.events(),
                &[
                    OutputEvent::Button { id: output::A, pressed: true },
                    OutputEvent::Button { id: output::A, pressed: false },
                ]
            );
        }
    }
}
