//! Build script for glint-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates gimbal.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

fn main() {
    setup_linker();
    validate_config();
    watch_scripts();
}

/// Set up linker search paths and scripts
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Embedded drawings are pulled in with include_str!
fn watch_scripts() {
    if let Ok(entries) = fs::read_dir("scripts") {
        for entry in entries.flatten() {
            println!("cargo:rerun-if-changed={}", entry.path().display());
        }
    }
}

/// Validate gimbal.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=gimbal.toml");

    let config_path = Path::new("gimbal.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: gimbal.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds gimbal.toml as its default configuration.   ║\n\
            ║  Please create one in the glint-firmware directory.              ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read gimbal.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in gimbal.toml                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_sections(&config, &mut errors);
    validate_link(&config, &mut errors);
    validate_playback(&config, &mut errors);
    validate_shapes(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid values in gimbal.toml                            ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=gimbal.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The runtime parser only knows these sections and rejects the rest
fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(table) = config.as_table() else {
        return;
    };
    for (name, value) in table {
        match (name.as_str(), value) {
            ("link" | "playback" | "shapes", toml::Value::Table(_)) => {}
            ("link" | "playback" | "shapes", _) => {
                errors.push(format!("[{}] must be a table", name));
            }
            _ => errors.push(format!("unknown section [{}]", name)),
        }
    }
}

fn section<'a>(config: &'a toml::Value, name: &str) -> Option<&'a toml::value::Table> {
    config.get(name).and_then(toml::Value::as_table)
}

fn validate_link(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(link) = section(config, "link") else {
        return;
    };

    match link.get("baudrate") {
        None => {}
        Some(toml::Value::Integer(baud)) if (1200..=1_000_000).contains(baud) => {}
        Some(_) => errors.push("[link] baudrate must be an integer 1200-1000000".into()),
    }
    expect_bool(link, "link", "startup_beep", errors);
}

fn validate_playback(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(playback) = section(config, "playback") else {
        return;
    };

    for key in ["point_delay_ms", "seed_beep_ms", "seed_settle_ms", "finish_settle_ms"] {
        match playback.get(key) {
            None => {}
            Some(toml::Value::Integer(ms)) if (0..=60_000).contains(ms) => {}
            Some(_) => errors.push(format!("[playback] {} must be an integer 0-60000", key)),
        }
    }
    expect_bool(playback, "playback", "seed", errors);
}

fn validate_shapes(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(shapes) = section(config, "shapes") else {
        return;
    };

    for (key, len) in [("triangle", 6), ("rectangle", 4), ("circle_center", 2)] {
        match shapes.get(key) {
            None => {}
            Some(toml::Value::Array(items)) => {
                if items.len() != len {
                    errors.push(format!("[shapes] {} needs {} numbers", key, len));
                } else if !items.iter().all(is_number) {
                    errors.push(format!("[shapes] {} must contain only numbers", key));
                }
            }
            Some(_) => errors.push(format!("[shapes] {} must be an array", key)),
        }
    }

    for key in ["circle_radius", "sine_amplitude", "sine_offset", "sine_wavelength"] {
        if let Some(value) = shapes.get(key) {
            if !is_number(value) {
                errors.push(format!("[shapes] {} must be a number", key));
            }
        }
    }

    if let Some(toml::Value::Array(items)) = shapes.get("rectangle") {
        let v: Vec<f64> = items.iter().filter_map(as_f64).collect();
        if v.len() == 4 && (v[2] <= v[0] || v[3] <= v[1]) {
            errors.push("[shapes] rectangle max must exceed min on both axes".into());
        }
    }
    if let Some(radius) = shapes.get("circle_radius").and_then(as_f64) {
        if radius <= 0.0 {
            errors.push("[shapes] circle_radius must be positive".into());
        }
    }
    if let Some(wavelength) = shapes.get("sine_wavelength").and_then(as_f64) {
        if wavelength <= 0.0 {
            errors.push("[shapes] sine_wavelength must be positive".into());
        }
    }
}

fn expect_bool(table: &toml::value::Table, section: &str, key: &str, errors: &mut Vec<String>) {
    if let Some(value) = table.get(key) {
        if !value.is_bool() {
            errors.push(format!("[{}] {} must be true or false", section, key));
        }
    }
}

fn is_number(value: &toml::Value) -> bool {
    as_f64(value).is_some()
}

fn as_f64(value: &toml::Value) -> Option<f64> {
    match value {
        toml::Value::Float(f) => Some(*f),
        toml::Value::Integer(i) => Some(*i as f64),
        _ => None,
    }
}
