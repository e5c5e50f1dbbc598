pub mod config;
pub mod layout_store;
pub mod preferences;

pub use config::{ConfigError, OverlayConfig};
pub use layout_store::{LayoutStore, Orientation};
pub use preferences::{FilePreferences, LayoutStoreError, MemoryPreferences, PrefValue, Preferences};
