use std::collections::HashMap;

use super::control::DpadState;
use super::control_set::ControlSet;
use super::framebuffer::{FRAME_CHANNELS, Framebuffer};
use super::geometry::Rect;

/// Which piece of artwork a draw command wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtKey {
    Button { legacy_id: i32, pressed: bool },
    TouchSwitch { back: bool },
    Dpad(DpadState),
    StickRange { legacy_id: i32 },
    StickCap { legacy_id: i32, pressed: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCommand {
    pub art: ArtKey,
    pub bounds: Rect,
    pub alpha: u8,
}

/// Decoded RGBA8 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sprite {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Sprite {
    /// `None` when `pixels` does not hold exactly `width * height` RGBA texels.
    pub fn new(width: usize, height: usize, pixels: Vec<u8>) -> Option<Self> {
        if pixels.len() != width * height * FRAME_CHANNELS {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn solid(width: usize, height: usize, rgba: [u8; 4]) -> Self {
        let pixels = rgba.repeat(width * height);
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

/// Source of control artwork. A missing sprite falls back to flat shapes.
pub trait Artwork {
    fn sprite(&self, key: &ArtKey) -> Option<&Sprite>;
}

/// No artwork at all; everything is drawn flat.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatArtwork;

impl Artwork for FlatArtwork {
    fn sprite(&self, _key: &ArtKey) -> Option<&Sprite> {
        None
    }
}

#[derive(Debug, Clone, Default)]
pub struct SpriteSheet {
    sprites: HashMap<ArtKey, Sprite>,
}

impl SpriteSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: ArtKey, sprite: Sprite) -> Option<Sprite> {
        self.sprites.insert(key, sprite)
    }
}

impl Artwork for SpriteSheet {
    fn sprite(&self, key: &ArtKey) -> Option<&Sprite> {
        self.sprites.get(key)
    }
}

/// Everything to paint this frame, back to front.
pub fn draw_list(controls: &ControlSet, showing: bool, touch_back: bool) -> Vec<DrawCommand> {
    if !controls.is_enabled() || !showing {
        return Vec::new();
    }
    let mut commands = Vec::new();

    for button in controls.visible_buttons() {
        let art = if button.is_touch_switch() {
            ArtKey::TouchSwitch { back: touch_back }
        } else {
            ArtKey::Button {
                legacy_id: button.legacy_id,
                pressed: button.is_pressed(),
            }
        };
        commands.push(DrawCommand {
            art,
            bounds: button.bounds,
            alpha: button.alpha,
        });
    }

    for dpad in &controls.dpads {
        commands.push(DrawCommand {
            art: ArtKey::Dpad(dpad.state()),
            bounds: dpad.bounds,
            alpha: dpad.alpha,
        });
    }

    for stick in &controls.joysticks {
        commands.push(DrawCommand {
            art: ArtKey::StickRange {
                legacy_id: stick.legacy_id,
            },
            bounds: stick.outer,
            alpha: stick.alpha,
        });
        commands.push(DrawCommand {
            art: ArtKey::StickCap {
                legacy_id: stick.legacy_id,
                pressed: stick.is_pressed(),
            },
            bounds: stick.inner,
            alpha: stick.alpha,
        });
    }

    commands
}

/// Paints `commands` over whatever `frame` already holds.
pub fn compose(commands: &[DrawCommand], artwork: &dyn Artwork, frame: &mut Framebuffer) {
    for command in commands {
        match artwork.sprite(&command.art) {
            Some(sprite) => frame.blit(
                sprite.pixels(),
                sprite.width(),
                sprite.height(),
                command.bounds,
                command.alpha,
            ),
            None => draw_flat(command, frame),
        }
    }
}

const IDLE: [u8; 3] = [0xC8, 0xC8, 0xC8];
const PRESSED: [u8; 3] = [0x5A, 0xA0, 0xFF];
const SWITCH_FRONT: [u8; 3] = [0x78, 0xC8, 0x78];
const SWITCH_BACK: [u8; 3] = [0xC8, 0x78, 0xC8];
const STICK_RANGE: [u8; 3] = [0x40, 0x40, 0x40];

fn draw_flat(command: &DrawCommand, frame: &mut Framebuffer) {
    let bounds = command.bounds;
    let alpha = command.alpha;
    match command.art {
        ArtKey::Button { pressed, .. } => {
            frame.fill_rect(bounds, if pressed { PRESSED } else { IDLE }, alpha);
        }
        ArtKey::TouchSwitch { back } => {
            frame.fill_rect(bounds, if back { SWITCH_BACK } else { SWITCH_FRONT }, alpha);
        }
        ArtKey::Dpad(state) => draw_flat_dpad(bounds, state, alpha, frame),
        ArtKey::StickRange { .. } => frame.fill_ellipse(bounds, STICK_RANGE, alpha),
        ArtKey::StickCap { pressed, .. } => {
            frame.fill_ellipse(bounds, if pressed { PRESSED } else { IDLE }, alpha);
        }
    }
}

// Plus-shaped pad; the active directions light up their outer thirds.
fn draw_flat_dpad(bounds: Rect, state: DpadState, alpha: u8, frame: &mut Framebuffer) {
    let w = bounds.width() / 3;
    let h = bounds.height() / 3;
    let vertical = Rect::new(bounds.left + w, bounds.top, bounds.right - w, bounds.bottom);
    let horizontal = Rect::new(bounds.left, bounds.top + h, bounds.right, bounds.bottom - h);
    frame.fill_rect(vertical, IDLE, alpha);
    frame.fill_rect(horizontal, IDLE, alpha);

    let (up, down, left, right) = directions(state);
    let arms = [
        (up, Rect::new(vertical.left, bounds.top, vertical.right, bounds.top + h)),
        (down, Rect::new(vertical.left, bounds.bottom - h, vertical.right, bounds.bottom)),
        (left, Rect::new(bounds.left, horizontal.top, bounds.left + w, horizontal.bottom)),
        (right, Rect::new(bounds.right - w, horizontal.top, bounds.right, horizontal.bottom)),
    ];
    for (lit, arm) in arms {
        if lit {
            frame.fill_rect(arm, PRESSED, alpha);
        }
    }
}

fn directions(state: DpadState) -> (bool, bool, bool, bool) {
    match state {
        DpadState::Idle => (false, false, false, false),
        DpadState::Up => (true, false, false, false),
        DpadState::Down => (false, true, false, false),
        DpadState::Left => (false, false, true, false),
        DpadState::Right => (false, false, false, true),
        DpadState::UpLeft => (true, false, true, false),
        DpadState::UpRight => (true, false, false, true),
        DpadState::DownLeft => (false, true, true, false),
        DpadState::DownRight => (false, true, false, true),
    }
}
