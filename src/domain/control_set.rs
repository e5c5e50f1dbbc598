use serde::{Deserialize, Serialize};

use super::catalog::{self, ButtonSpec, DpadSpec, JoystickSpec};
use super::control::{Button, Dpad, Joystick, OverlayMask};
use super::geometry::{Point, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayMetrics {
    pub width: u32,
    pub height: u32,
}

impl DisplayMetrics {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn min_dimension(&self) -> u32 {
        self.width.min(self.height)
    }

    pub fn max_dimension(&self) -> u32 {
        self.width.max(self.height)
    }
}

impl Default for DisplayMetrics {
    fn default() -> Self {
        Self::new(1920, 1080)
    }
}

/// Where each control sits. Implemented by the layout store.
pub trait LayoutSource {
    /// Top-left origin of the control keyed by `legacy_id`.
    fn position(&self, legacy_id: i32) -> (i32, i32);
}

/// Everything a rebuild depends on besides the stored positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlParams {
    pub mask: OverlayMask,
    pub scale: f32,
    /// Percent, 0 to 100.
    pub opacity: u8,
    pub display: DisplayMetrics,
}

impl ControlParams {
    pub fn alpha(&self) -> u8 {
        (self.opacity.min(100) as f64 * 0.01 * 255.0) as u8
    }

    fn side(&self, fraction: f32) -> i32 {
        (self.display.min_dimension() as f32 * fraction * self.scale) as i32
    }
}

/// Identifies one control inside a [`ControlSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlRef {
    Button(usize),
    Dpad(usize),
    Joystick(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControlSet {
    mask: OverlayMask,
    pub buttons: Vec<Button>,
    pub dpads: Vec<Dpad>,
    pub joysticks: Vec<Joystick>,
}

impl ControlSet {
    pub fn empty() -> Self {
        Self {
            mask: OverlayMask::NONE,
            buttons: Vec::new(),
            dpads: Vec::new(),
            joysticks: Vec::new(),
        }
    }

    /// Builds every catalog control from scratch at its stored position.
    pub fn build(layout: &dyn LayoutSource, params: &ControlParams) -> Self {
        let alpha = params.alpha();
        let buttons = catalog::BUTTONS
            .iter()
            .map(|spec| build_button(spec, layout, params, alpha))
            .collect();
        let dpads = catalog::DPADS
            .iter()
            .map(|spec| build_dpad(spec, layout, params, alpha))
            .collect();
        let joysticks = catalog::JOYSTICKS
            .iter()
            .map(|spec| build_joystick(spec, layout, params, alpha))
            .collect();
        log::debug!(
            "built controls: mask={:#x} scale={} opacity={}",
            params.mask.bits(),
            params.scale,
            params.opacity
        );
        Self {
            mask: params.mask,
            buttons,
            dpads,
            joysticks,
        }
    }

    pub fn mask(&self) -> OverlayMask {
        self.mask
    }

    pub fn is_enabled(&self) -> bool {
        !self.mask.is_empty()
    }

    pub fn visible_buttons(&self) -> impl Iterator<Item = &Button> {
        let mask = self.mask;
        self.buttons
            .iter()
            .filter(move |button| button.role.intersects(mask))
    }

    pub fn visible_buttons_mut(&mut self) -> impl Iterator<Item = &mut Button> {
        let mask = self.mask;
        self.buttons
            .iter_mut()
            .filter(move |button| button.role.intersects(mask))
    }

    pub fn is_visible(&self, target: ControlRef) -> bool {
        match target {
            ControlRef::Button(index) => self
                .buttons
                .get(index)
                .is_some_and(|button| button.role.intersects(self.mask)),
            ControlRef::Dpad(index) => index < self.dpads.len(),
            ControlRef::Joystick(index) => index < self.joysticks.len(),
        }
    }

    /// Drops every pointer binding and press state. Emits nothing.
    pub fn release_all(&mut self) {
        self.buttons.iter_mut().for_each(Button::reset);
        self.dpads.iter_mut().for_each(Dpad::reset);
        self.joysticks.iter_mut().for_each(Joystick::reset);
    }

    /// First visible control under `point`, buttons before dpads before sticks.
    pub fn hit_test(&self, point: Point) -> Option<ControlRef> {
        let mask = self.mask;
        let button = self
            .buttons
            .iter()
            .position(|button| button.role.intersects(mask) && button.bounds.contains_point(point))
            .map(ControlRef::Button);
        button
            .or_else(|| {
                self.dpads
                    .iter()
                    .position(|dpad| dpad.bounds.contains_point(point))
                    .map(ControlRef::Dpad)
            })
            .or_else(|| {
                self.joysticks
                    .iter()
                    .position(|stick| stick.outer.contains_point(point))
                    .map(ControlRef::Joystick)
            })
    }

    pub fn bounds(&self, target: ControlRef) -> Option<Rect> {
        match target {
            ControlRef::Button(index) => self.buttons.get(index).map(|button| button.bounds),
            ControlRef::Dpad(index) => self.dpads.get(index).map(|dpad| dpad.bounds),
            ControlRef::Joystick(index) => self.joysticks.get(index).map(|stick| stick.outer),
        }
    }

    /// Top-left corner, the part of a control that gets persisted.
    pub fn origin(&self, target: ControlRef) -> Option<(i32, i32)> {
        self.bounds(target).map(|bounds| (bounds.left, bounds.top))
    }

    pub fn legacy_id(&self, target: ControlRef) -> Option<i32> {
        match target {
            ControlRef::Button(index) => self.buttons.get(index).map(|button| button.legacy_id),
            ControlRef::Dpad(index) => self.dpads.get(index).map(|dpad| dpad.legacy_id),
            ControlRef::Joystick(index) => self.joysticks.get(index).map(|stick| stick.legacy_id),
        }
    }

    /// Moves a control by whole pixels, keeping its size.
    pub fn translate(&mut self, target: ControlRef, dx: i32, dy: i32) {
        match target {
            ControlRef::Button(index) => {
                if let Some(button) = self.buttons.get_mut(index) {
                    button.bounds = button.bounds.translated(dx, dy);
                }
            }
            ControlRef::Dpad(index) => {
                if let Some(dpad) = self.dpads.get_mut(index) {
                    dpad.bounds = dpad.bounds.translated(dx, dy);
                }
            }
            ControlRef::Joystick(index) => {
                if let Some(stick) = self.joysticks.get_mut(index) {
                    stick.translate(dx, dy);
                }
            }
        }
    }
}

impl Default for ControlSet {
    fn default() -> Self {
        Self::empty()
    }
}

fn build_button(
    spec: &ButtonSpec,
    layout: &dyn LayoutSource,
    params: &ControlParams,
    alpha: u8,
) -> Button {
    let (x, y) = layout.position(spec.legacy_id);
    let side = params.side(spec.size);
    Button::new(
        spec.legacy_id,
        spec.control,
        spec.role,
        Rect::from_origin(x, y, side, side),
        alpha,
    )
}

fn build_dpad(spec: &DpadSpec, layout: &dyn LayoutSource, params: &ControlParams, alpha: u8) -> Dpad {
    let (x, y) = layout.position(spec.legacy_id);
    let side = params.side(catalog::DPAD_SIZE);
    Dpad::new(
        spec.legacy_id,
        spec.controls,
        Rect::from_origin(x, y, side, side),
        alpha,
    )
}

fn build_joystick(
    spec: &JoystickSpec,
    layout: &dyn LayoutSource,
    params: &ControlParams,
    alpha: u8,
) -> Joystick {
    let (x, y) = layout.position(spec.legacy_id);
    let side = params.side(catalog::STICK_SIZE);
    let cap = (side as f32 / catalog::STICK_CAP_RATIO) as i32;
    Joystick::new(
        spec.legacy_id,
        spec.x_axis,
        spec.y_axis,
        Rect::from_origin(x, y, side, side),
        cap,
        alpha,
    )
}
