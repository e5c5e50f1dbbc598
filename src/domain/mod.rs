pub mod catalog;
pub mod control;
pub mod control_set;
pub mod framebuffer;
pub mod geometry;
pub mod output;
pub mod renderer;
pub mod router;
pub mod touch;
pub mod visibility;

pub use control::{Button, Dpad, DpadState, DpadZones, Joystick, OverlayMask, axis_value};
pub use control_set::{ControlParams, ControlRef, ControlSet, DisplayMetrics, LayoutSource};
pub use framebuffer::Framebuffer;
pub use geometry::{Point, Rect};
pub use output::{LogSink, OutputEvent, OutputSink, RecordingSink};
pub use renderer::{ArtKey, Artwork, DrawCommand, FlatArtwork, Sprite, SpriteSheet};
pub use router::{PositionCommit, RouteOutcome, TouchRouter};
pub use touch::{PointerId, TouchEvent, TouchPhase};
pub use visibility::{DEFAULT_IDLE_TIMEOUT, Visibility};
