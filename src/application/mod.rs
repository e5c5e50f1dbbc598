pub mod idle_timer;
pub mod overlay;

pub use idle_timer::{IdleTimer, RedrawHook};
pub use overlay::{Overlay, TouchOutcome};
