//! Build script for keeptime-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates board.toml and generates the board constants

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Retained length field is 16 bits wide
const MAX_USER_MEM: i64 = u16::MAX as i64;

fn main() {
    setup_linker();
    let board = validate_config();
    generate_board_config(&board);
}

/// Validated board settings
struct BoardConfig {
    user_mem_max: u16,
    default_datetime: [i64; 6],
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
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate board.toml at compile time
fn validate_config() -> BoardConfig {
    // Re-run if board.toml changes
    println!("cargo:rerun-if-changed=board.toml");

    let config_path = Path::new("board.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: board.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a board.toml configuration file.          ║\n\
            ║  Please create one in the keeptime-firmware directory.           ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read board.toml                                ║\n\
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
                ║  ERROR: Invalid TOML syntax in board.toml                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    let board = validate_rtc(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid board configuration                              ║\n\
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

    println!("cargo:warning=board.toml validated successfully");
    board
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

/// Validate the [rtc] section
fn validate_rtc(config: &toml::Value, errors: &mut Vec<String>) -> BoardConfig {
    let mut board = BoardConfig {
        user_mem_max: 0,
        default_datetime: [2000, 1, 1, 0, 0, 0],
    };

    let rtc = match config.get("rtc") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => {
            errors.push("[rtc] must be a table".to_string());
            return board;
        }
        None => {
            errors.push("Missing [rtc] section".to_string());
            return board;
        }
    };

    match rtc.get("user_mem_max") {
        Some(toml::Value::Integer(n)) if (0..=MAX_USER_MEM).contains(n) => {
            board.user_mem_max = *n as u16;
        }
        Some(toml::Value::Integer(_)) => {
            errors.push(format!("[rtc] user_mem_max must be 0-{}", MAX_USER_MEM));
        }
        Some(_) => errors.push("[rtc] user_mem_max must be an integer".to_string()),
        None => errors.push("[rtc] missing 'user_mem_max'".to_string()),
    }

    // Optional: fall back to 2000-01-01T00:00:00
    if let Some(value) = rtc.get("default_datetime") {
        match value.as_array() {
            Some(fields) if fields.len() == 6 => {
                const LIMITS: [(&str, i64, i64); 6] = [
                    ("year", 0, 4095),
                    ("month", 1, 12),
                    ("day", 1, 31),
                    ("hour", 0, 23),
                    ("minute", 0, 59),
                    ("second", 0, 59),
                ];
                for (i, (field, (name, min, max))) in fields.iter().zip(LIMITS).enumerate() {
                    match field.as_integer() {
                        Some(v) if (min..=max).contains(&v) => board.default_datetime[i] = v,
                        _ => errors.push(format!(
                            "[rtc] default_datetime {} must be {}-{}",
                            name, min, max
                        )),
                    }
                }
            }
            _ => errors.push(
                "[rtc] default_datetime must be [year, month, day, hour, minute, second]"
                    .to_string(),
            ),
        }
    }

    board
}

/// Write board constants to $OUT_DIR/board_config.rs
fn generate_board_config(board: &BoardConfig) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let [year, month, day, hour, minute, second] = board.default_datetime;

    let generated = format!(
        "/// Retained user memory capacity in bytes\n\
         pub const USER_MEM_MAX: usize = {};\n\
         \n\
         /// Calendar time applied when the RTC is not running\n\
         pub const DEFAULT_DATETIME: keeptime_core::DateTime =\n    \
         keeptime_core::DateTime::new({}, {}, {}, {}, {}, {}, 0);\n",
        board.user_mem_max, year, month, day, hour, minute, second
    );
    fs::write(out_dir.join("board_config.rs"), generated).unwrap();

    println!("cargo:rustc-check-cfg=cfg(user_mem)");
    if board.user_mem_max > 0 {
        println!("cargo:rustc-cfg=user_mem");
    }
}
