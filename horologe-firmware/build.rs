//! Build script for horologe-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates clock.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
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
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate clock.toml at compile time
///
/// The firmware parses the same file with its own minimal parser; this
/// catches mistakes with readable errors before flashing.
fn validate_config() {
    println!("cargo:rerun-if-changed=clock.toml");

    let config_path = Path::new("clock.toml");
    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read clock.toml", &[e.to_string()]),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => fail(
            "Invalid TOML syntax in clock.toml",
            &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
        ),
    };

    let mut errors = Vec::new();

    let Some(table) = config.as_table() else {
        fail("clock.toml must be a table", &[]);
    };
    for key in table.keys() {
        if key != "clock" {
            errors.push(format!("Unknown section [{}]", key));
        }
    }

    let clock = match config.get("clock") {
        Some(toml::Value::Table(t)) => t.clone(),
        Some(_) => fail("[clock] must be a table", &[]),
        None => fail("Missing [clock] section", &[]),
    };

    for (key, value) in &clock {
        match key.as_str() {
            "steps_per_minute" => match value.as_integer() {
                Some(v) if (1..=1024).contains(&v) => {}
                _ => errors.push("steps_per_minute must be an integer 1-1024".to_string()),
            },
            "delay_time" => match value.as_integer() {
                Some(v) if (2..=255).contains(&v) => {}
                _ => errors.push("delay_time must be an integer 2-255".to_string()),
            },
            "flip_rotation" | "allow_backward" | "chime" => {
                if value.as_bool().is_none() {
                    errors.push(format!("{} must be true or false", key));
                }
            }
            other => errors.push(format!("Unknown key '{}' in [clock]", other)),
        }
    }

    if !errors.is_empty() {
        fail("Invalid clock configuration", &errors);
    }

    println!("cargo:warning=clock.toml validated successfully");
}

/// Shorten `line` to `width` characters, ending in `...` when cut
fn truncate(line: &str, width: usize) -> String {
    if line.chars().count() > width {
        let head: String = line.chars().take(width - 3).collect();
        format!("{}...", head)
    } else {
        line.to_string()
    }
}

/// Abort the build with a boxed error message
fn fail(title: &str, lines: &[String]) -> ! {
    let body = lines
        .iter()
        .map(|line| format!("║  • {:<62} ║", truncate(line, 62)))
        .collect::<Vec<_>>()
        .join("\n");

    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title, body
    );
}
