use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::domain::renderer::{self, Artwork, DrawCommand};
use crate::domain::{
    ControlParams, ControlSet, DisplayMetrics, Framebuffer, OutputSink, OverlayMask, TouchEvent,
    TouchRouter, Visibility,
};
use crate::infrastructure::config::{OverlayConfig, clamp_scale};
use crate::infrastructure::layout_store::{LayoutStore, Orientation};
use crate::infrastructure::preferences::Preferences;

use super::idle_timer::{IdleTimer, RedrawHook};

/// What a routed pointer event means for the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TouchOutcome {
    /// A control consumed the event; do not pass it further.
    pub handled: bool,
    /// The overlay changed on screen and must be repainted.
    pub redraw: bool,
}

/// The on-screen gamepad: owns the controls, routes touches into `sink`
/// and keeps the layout in `prefs`.
pub struct Overlay<S: OutputSink, P: Preferences> {
    sink: S,
    store: LayoutStore<P>,
    controls: ControlSet,
    router: TouchRouter,
    params: ControlParams,
    editing: bool,
    visibility: Arc<Visibility>,
    tick_period: Duration,
    timer: Option<IdleTimer>,
}

impl<S: OutputSink, P: Preferences> Overlay<S, P> {
    pub fn new(config: &OverlayConfig, sink: S, prefs: P) -> Self {
        let config = config.clone().sanitized();
        let mut store = LayoutStore::new(prefs, config.orientation);
        store.ensure_initialized(config.display);

        let params = ControlParams {
            mask: OverlayMask::NONE,
            scale: config.scale,
            opacity: config.opacity,
            display: config.display,
        };
        let controls = ControlSet::build(&store, &params);
        let visibility = Arc::new(Visibility::new(config.idle_timeout(), Instant::now()));

        let mut overlay = Self {
            sink,
            store,
            controls,
            router: TouchRouter::new(),
            params,
            editing: false,
            visibility,
            tick_period: config.tick_period(),
            timer: None,
        };
        let mask = config.initial_mask();
        if !mask.is_empty() {
            overlay.set_state(mask);
        }
        overlay
    }

    pub fn on_touch(&mut self, event: &TouchEvent) -> TouchOutcome {
        self.on_touch_at(event, Instant::now())
    }

    /// Routes one pointer event. A touch anywhere brings a hidden overlay
    /// back, so `redraw` can be set even when no control was hit.
    pub fn on_touch_at(&mut self, event: &TouchEvent, now: Instant) -> TouchOutcome {
        if self.params.mask.is_empty() {
            return TouchOutcome::default();
        }
        let revealed = self.visibility.touch(now);
        if revealed {
            log::debug!("overlay shown again by touch");
        }

        let handled = if self.editing {
            let outcome = self.router.route_edit(&mut self.controls, event);
            if let Some(commit) = outcome.commit {
                self.store
                    .save_position(commit.legacy_id, commit.x, commit.y);
            }
            outcome.handled
        } else {
            self.router
                .route(&mut self.controls, event, &mut self.sink)
        };
        TouchOutcome {
            handled,
            redraw: handled || revealed,
        }
    }

    /// Changes the shown control categories. Connects the virtual controller
    /// when the overlay turns on and disconnects it when it turns off.
    pub fn set_state(&mut self, mask: OverlayMask) {
        self.visibility.touch(Instant::now());
        let previous = self.params.mask;
        if mask == previous {
            return;
        }
        self.params.mask = mask;
        self.visibility.set_enabled(!mask.is_empty());
        self.rebuild();

        match (previous.is_empty(), mask.is_empty()) {
            (true, false) => {
                log::info!("overlay enabled, attaching controller");
                self.sink.attach_controller();
            }
            (false, true) => {
                log::info!("overlay disabled, detaching controller");
                self.sink.detach_controller();
            }
            _ => {}
        }
    }

    /// Returns `true` if the clamped scale differs from the current one.
    pub fn set_scale(&mut self, scale: f32) -> bool {
        let scale = clamp_scale(scale);
        if scale == self.params.scale {
            return false;
        }
        self.params.scale = scale;
        self.rebuild();
        true
    }

    pub fn set_opacity(&mut self, percent: u8) -> bool {
        let opacity = percent.min(100);
        if opacity == self.params.opacity {
            return false;
        }
        self.params.opacity = opacity;
        self.rebuild();
        true
    }

    pub fn set_edit_mode(&mut self, editing: bool) {
        if editing == self.editing {
            return;
        }
        self.editing = editing;
        self.visibility.set_editing(editing);
        self.visibility.touch(Instant::now());

        if editing {
            self.router
                .release_held(&mut self.controls, &mut self.sink);
            log::debug!("edit mode on");
        } else {
            if self.router.cancel_edit() {
                // Put the half-dragged control back where the store has it.
                self.rebuild();
            }
            log::debug!("edit mode off");
        }
    }

    /// Restores the default position of every control.
    pub fn reset_layout(&mut self) {
        self.store.seed_defaults(self.params.display);
        self.rebuild();
        log::info!("layout reset to defaults");
    }

    /// The host surface changed size.
    pub fn set_display(&mut self, display: DisplayMetrics) {
        if display == self.params.display {
            return;
        }
        self.params.display = display;
        self.rebuild();
    }

    pub fn set_orientation(&mut self, orientation: Orientation, display: DisplayMetrics) {
        if orientation == self.store.orientation() && display == self.params.display {
            return;
        }
        self.store.set_orientation(orientation);
        self.store.ensure_initialized(display);
        self.params.display = display;
        self.rebuild();
    }

    pub fn draw_list(&self) -> Vec<DrawCommand> {
        renderer::draw_list(
            &self.controls,
            self.visibility.is_showing(),
            self.router.touch_back(),
        )
    }

    /// Clears `frame` to transparent and paints the overlay into it.
    pub fn draw(&self, artwork: &dyn Artwork, frame: &mut Framebuffer) {
        frame.clear([0, 0, 0, 0]);
        renderer::compose(&self.draw_list(), artwork, frame);
    }

    /// One idle-timer step at `now`. Returns `true` if the overlay just hid.
    pub fn tick_at(&self, now: Instant) -> bool {
        self.visibility.tick(now)
    }

    pub fn start_idle_timer(&mut self, redraw: RedrawHook) {
        if self.timer.is_some() {
            return;
        }
        self.timer = Some(IdleTimer::spawn(
            Arc::clone(&self.visibility),
            self.tick_period,
            redraw,
        ));
    }

    pub fn stop_idle_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.stop();
        }
    }

    pub fn is_showing(&self) -> bool {
        self.visibility.is_showing()
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn mask(&self) -> OverlayMask {
        self.params.mask
    }

    pub fn scale(&self) -> f32 {
        self.params.scale
    }

    pub fn opacity(&self) -> u8 {
        self.params.opacity
    }

    pub fn display(&self) -> DisplayMetrics {
        self.params.display
    }

    pub fn touch_back(&self) -> bool {
        self.router.touch_back()
    }

    pub fn controls(&self) -> &ControlSet {
        &self.controls
    }

    pub fn store(&self) -> &LayoutStore<P> {
        &self.store
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    // Pointer bindings do not survive a rebuild.
    fn rebuild(&mut self) {
        self.router.cancel_edit();
        self.controls = ControlSet::build(&self.store, &self.params);
    }
}
