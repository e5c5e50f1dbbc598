pub mod cli;
#[cfg(feature = "gui")]
pub mod gui;
