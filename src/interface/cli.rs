use std::path::PathBuf;

use crate::application::Overlay;
use crate::domain::catalog::legacy;
use crate::domain::{ControlSet, LogSink};
use crate::infrastructure::{ConfigError, FilePreferences, OverlayConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub config: Option<PathBuf>,
    pub reset: bool,
    pub gui: bool,
    pub prefs: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Parsed {
    Run(CliArgs),
    Help,
}

pub fn run() {
    let mut args = std::env::args();
    let program = args.next().unwrap_or_else(|| "overpad".to_string());
    let parsed = match parse_args(args) {
        Ok(parsed) => parsed,
        Err(message) => {
            eprintln!("{message}");
            print_usage(&program);
            std::process::exit(2);
        }
    };
    let args = match parsed {
        Parsed::Run(args) => args,
        Parsed::Help => {
            print_usage(&program);
            return;
        }
    };

    let config = match load_config(args.config.as_ref()) {
        Ok(config) => config,
        Err(err) => {
            report_config_error(args.config.as_ref(), err);
            std::process::exit(1);
        }
    };

    if args.gui {
        run_gui(config, args);
        return;
    }

    let prefs = FilePreferences::open(&args.prefs);
    let mut overlay = Overlay::new(&config, LogSink, prefs);
    if args.reset {
        overlay.reset_layout();
    }
    print_layout(overlay.controls(), &config);
}

#[cfg(feature = "gui")]
fn run_gui(config: OverlayConfig, args: CliArgs) {
    if args.reset {
        let prefs = FilePreferences::open(&args.prefs);
        Overlay::new(&config, LogSink, prefs).reset_layout();
    }
    super::gui::run(config, args.prefs);
}

#[cfg(not(feature = "gui"))]
fn run_gui(_config: OverlayConfig, _args: CliArgs) {
    eprintln!("This build has no window support (enable the `gui` feature)");
    std::process::exit(2);
}

fn parse_args(args: impl Iterator<Item = String>) -> Result<Parsed, String> {
    let mut config = None;
    let mut reset = false;
    let mut gui = false;
    let mut prefs = None;
    let mut args = args;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Parsed::Help),
            "--reset" => reset = true,
            "--gui" => gui = true,
            "--config" => match args.next() {
                Some(path) => config = Some(PathBuf::from(path)),
                None => return Err("--config needs a file".to_string()),
            },
            flag if flag.starts_with("--") => return Err(format!("Unknown option '{flag}'")),
            path => {
                if prefs.is_some() {
                    return Err(format!("Unexpected argument '{path}'"));
                }
                prefs = Some(PathBuf::from(path));
            }
        }
    }

    let prefs = prefs.ok_or_else(|| "Missing preferences file".to_string())?;
    Ok(Parsed::Run(CliArgs {
        config,
        reset,
        gui,
        prefs,
    }))
}

fn load_config(path: Option<&PathBuf>) -> Result<OverlayConfig, ConfigError> {
    match path {
        Some(path) => OverlayConfig::load(path),
        None => Ok(OverlayConfig::default()),
    }
}

fn print_layout(controls: &ControlSet, config: &OverlayConfig) {
    println!(
        "Display: {}x{} ({:?})",
        config.display.width, config.display.height, config.orientation
    );
    println!("Scale: {:.2}", config.scale);
    println!("Opacity: {}%", config.opacity);
    for button in &controls.buttons {
        let b = button.bounds;
        println!(
            "{:<14} #{:<5} button    at ({}, {}) size {}",
            control_label(button.legacy_id),
            button.legacy_id,
            b.left,
            b.top,
            b.width()
        );
    }
    for dpad in &controls.dpads {
        let b = dpad.bounds;
        println!(
            "{:<14} #{:<5} dpad      at ({}, {}) size {}",
            control_label(dpad.legacy_id),
            dpad.legacy_id,
            b.left,
            b.top,
            b.width()
        );
    }
    for stick in &controls.joysticks {
        let b = stick.outer;
        println!(
            "{:<14} #{:<5} joystick  at ({}, {}) size {}",
            control_label(stick.legacy_id),
            stick.legacy_id,
            b.left,
            b.top,
            b.width()
        );
    }
}

fn control_label(legacy_id: i32) -> &'static str {
    match legacy_id {
        legacy::BUTTON_CROSS => "Cross",
        legacy::BUTTON_CIRCLE => "Circle",
        legacy::BUTTON_SQUARE => "Square",
        legacy::BUTTON_TRIANGLE => "Triangle",
        legacy::BUTTON_SELECT => "Select",
        legacy::BUTTON_START => "Start",
        legacy::DPAD => "D-Pad",
        legacy::BUTTON_PS => "PS",
        legacy::STICK_LEFT => "Left Stick",
        legacy::STICK_RIGHT => "Right Stick",
        legacy::TRIGGER_L => "L",
        legacy::TRIGGER_R => "R",
        legacy::TRIGGER_L2 => "L2",
        legacy::TRIGGER_R2 => "R2",
        legacy::BUTTON_TOUCH_SWITCH => "Touch Switch",
        _ => "Unknown",
    }
}

fn report_config_error(path: Option<&PathBuf>, err: ConfigError) {
    let path = path.map(|path| path.display().to_string()).unwrap_or_default();
    match err {
        ConfigError::Io(io_err) => {
            eprintln!("Failed to read config '{}': {}", path, io_err);
        }
        ConfigError::Parse(parse_err) => {
            eprintln!("Invalid config '{}': {}", path, parse_err);
        }
    }
}

fn print_usage(program: &str) {
    eprintln!(
        "Usage: {} [--config <file>] [--reset] [--gui] <prefs-file>",
        program
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Parsed, String> {
        parse_args(args.iter().map(|arg| arg.to_string()))
    }

    #[test]
    fn parses_flags_in_any_order() {
        let parsed = parse(&["--reset", "layout.bin", "--config", "overlay.json"]);

        assert_eq!(
            parsed,
            Ok(Parsed::Run(CliArgs {
                config: Some(PathBuf::from("overlay.json")),
                reset: true,
                gui: false,
                prefs: PathBuf::from("layout.bin"),
            }))
        );
    }

    #[test]
    fn help_wins() {
        assert_eq!(parse(&["layout.bin", "--help"]), Ok(Parsed::Help));
    }

    #[test]
    fn rejects_bad_usage() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["--config"]).is_err());
        assert!(parse(&["a.bin", "b.bin"]).is_err());
        assert!(parse(&["--verbose", "a.bin"]).is_err());
    }

    #[test]
    fn every_catalog_control_has_a_label() {
        for id in crate::domain::catalog::all_legacy_ids() {
            assert_ne!(control_label(id), "Unknown", "no label for {id}");
        }
    }
}
