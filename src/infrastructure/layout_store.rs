use serde::{Deserialize, Serialize};

use crate::domain::DisplayMetrics;
use crate::domain::LayoutSource;
use crate::domain::catalog::{self, DEFAULT_POSITIONS, legacy};

use super::preferences::Preferences;

/// Set once default positions have been written.
pub const INIT_KEY: &str = "OverlayInit";

/// Stored coordinates are clamped to this many pixels either side of the
/// origin when read back.
pub const MAX_COORDINATE: f32 = 1_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Landscape,
    Portrait,
}

impl Orientation {
    /// Suffix appended to the legacy id in preference keys.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Landscape => "",
            Self::Portrait => "-Portrait",
        }
    }
}

/// Per-control positions on top of a [`Preferences`] backend.
#[derive(Debug)]
pub struct LayoutStore<P> {
    prefs: P,
    orientation: Orientation,
}

impl<P: Preferences> LayoutStore<P> {
    pub fn new(prefs: P, orientation: Orientation) -> Self {
        Self { prefs, orientation }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    pub fn x_key(&self, legacy_id: i32) -> String {
        format!("{legacy_id}{}-X", self.orientation.tag())
    }

    pub fn y_key(&self, legacy_id: i32) -> String {
        format!("{legacy_id}{}-Y", self.orientation.tag())
    }

    pub fn is_initialized(&self) -> bool {
        self.prefs.get_bool(INIT_KEY, false)
    }

    /// Whether positions exist under the current orientation's keys.
    pub fn has_layout(&self) -> bool {
        let probe = self.x_key(legacy::BUTTON_CROSS);
        !self.prefs.get_float(&probe, f32::NAN).is_nan()
    }

    /// Seeds the default layout unless that already happened for the current
    /// orientation. Returns `true` if it seeded.
    pub fn ensure_initialized(&mut self, display: DisplayMetrics) -> bool {
        if self.is_initialized() && self.has_layout() {
            return false;
        }
        self.seed_defaults(display);
        true
    }

    /// Overwrites every control position with its default for `display`.
    pub fn seed_defaults(&mut self, display: DisplayMetrics) {
        for (legacy_id, _, _) in DEFAULT_POSITIONS {
            if let Some((x, y)) = default_position(legacy_id, self.orientation, display) {
                let x_key = self.x_key(legacy_id);
                let y_key = self.y_key(legacy_id);
                self.prefs.put_float(&x_key, x as f32);
                self.prefs.put_float(&y_key, y as f32);
            }
        }
        self.prefs.put_bool(INIT_KEY, true);
        log::info!(
            "seeded default layout for {}x{}",
            display.width,
            display.height
        );
        self.commit();
    }

    pub fn save_position(&mut self, legacy_id: i32, x: i32, y: i32) {
        let x_key = self.x_key(legacy_id);
        let y_key = self.y_key(legacy_id);
        self.prefs.put_float(&x_key, x as f32);
        self.prefs.put_float(&y_key, y as f32);
        log::debug!("saved position of {legacy_id}: ({x}, {y})");
        self.commit();
    }

    // Layout writes are best-effort; the overlay keeps running on failure.
    fn commit(&mut self) {
        if let Err(err) = self.prefs.commit() {
            log::warn!("failed to persist layout: {err}");
        }
    }
}

impl<P: Preferences> LayoutSource for LayoutStore<P> {
    fn position(&self, legacy_id: i32) -> (i32, i32) {
        let x = self.prefs.get_float(&self.x_key(legacy_id), 0.0);
        let y = self.prefs.get_float(&self.y_key(legacy_id), 0.0);
        (stored_coordinate(x), stored_coordinate(y))
    }
}

fn stored_coordinate(value: f32) -> i32 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(-MAX_COORDINATE, MAX_COORDINATE) as i32
}

/// Fresh-layout origin of `legacy_id`, kept inside the display at scale 1.
///
/// Landscape spreads the layout over the larger dimension horizontally and
/// the smaller one vertically. Portrait uses the surface width and height
/// as they are.
pub fn default_position(
    legacy_id: i32,
    orientation: Orientation,
    display: DisplayMetrics,
) -> Option<(i32, i32)> {
    let (_, x_permille, y_permille) = DEFAULT_POSITIONS
        .iter()
        .find(|(id, _, _)| *id == legacy_id)?;
    let side = (display.min_dimension() as f32 * catalog::size_fraction(legacy_id)?) as i32;
    let (span_x, span_y) = match orientation {
        Orientation::Landscape => (display.max_dimension(), display.min_dimension()),
        Orientation::Portrait => (display.width, display.height),
    };
    Some((
        fit_in_span(*x_permille, span_x, side),
        fit_in_span(*y_permille, span_y, side),
    ))
}

fn fit_in_span(permille: u16, span: u32, side: i32) -> i32 {
    let origin = (permille as f32 / 1000.0 * span as f32) as i32;
    origin.min(span as i32 - side).max(0)
}
