//! Centralized CLI color functions using the Tallinn Night brand palette.
//!
//! All functions automatically respect `NO_COLOR`, `FORCE_COLOR`, and TTY detection
//! via `owo-colors`' `if_supports_color()`. The `--no-color` flag sets an internal
//! flag that bypasses owo-colors entirely (no unsafe env mutation needed).
//!
//! The statusline itself is never colored; these apply to the operator-facing
//! subcommands (`status`, `events`, `lock`, `cache`) only.

use std::sync::atomic::{AtomicBool, Ordering};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

/// Global override: when true, forces color off (set by `--no-color` flag).
static NO_COLOR_FLAG: AtomicBool = AtomicBool::new(false);

/// Call once from main.rs when `--no-color` is passed.
///
/// Sets an in-process flag checked by all color functions. No environment
/// mutation — the pre-existing `NO_COLOR` env var is handled separately
/// by owo-colors at the library level.
pub fn set_no_color() {
    NO_COLOR_FLAG.store(true, Ordering::Relaxed);
}

// =============================================================================
// TALLINN NIGHT PALETTE — hex codes are the single source of truth.
// =============================================================================

/// Type-safe RGB color with compile-time hex-to-component conversion.
#[derive(Debug, Clone, Copy)]
struct Rgb {
    r: u8,
    g: u8,
    b: u8,
}

impl Rgb {
    const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
        }
    }
}

const ICE: Rgb = Rgb::from_hex(0x7CB4C8); // Primary accent
const AURORA: Rgb = Rgb::from_hex(0x6B8F5E); // Fresh/success
const COPPER: Rgb = Rgb::from_hex(0xC49A5C); // Stale/warning
const EMBER: Rgb = Rgb::from_hex(0xB87060); // Critical/error
const MUTED: Rgb = Rgb::from_hex(0x5C6370); // Secondary info

// =============================================================================
// COLOR FUNCTIONS
// =============================================================================

/// Returns true when color output is disabled (--no-color flag).
fn no_color() -> bool {
    NO_COLOR_FLAG.load(Ordering::Relaxed)
}

/// Apply ice blue (source names, primary accent).
pub fn ice(text: &str) -> String {
    if no_color() {
        return text.to_string();
    }
    text.if_supports_color(Stdout, |t| t.truecolor(ICE.r, ICE.g, ICE.b))
        .to_string()
}

/// Apply aurora green (fresh/success).
pub fn aurora(text: &str) -> String {
    if no_color() {
        return text.to_string();
    }
    text.if_supports_color(Stdout, |t| t.truecolor(AURORA.r, AURORA.g, AURORA.b))
        .to_string()
}

/// Apply copper amber (stale/warning).
pub fn copper(text: &str) -> String {
    if no_color() {
        return text.to_string();
    }
    text.if_supports_color(Stdout, |t| t.truecolor(COPPER.r, COPPER.g, COPPER.b))
        .to_string()
}

/// Apply ember red (critical/error).
pub fn ember(text: &str) -> String {
    if no_color() {
        return text.to_string();
    }
    text.if_supports_color(Stdout, |t| t.truecolor(EMBER.r, EMBER.g, EMBER.b))
        .to_string()
}

/// Apply bold bright text (headers).
pub fn bold(text: &str) -> String {
    if no_color() {
        return text.to_string();
    }
    text.if_supports_color(Stdout, |t| t.bold()).to_string()
}

/// Apply muted gray (secondary info, borders, hints).
pub fn muted(text: &str) -> String {
    if no_color() {
        return text.to_string();
    }
    text.if_supports_color(Stdout, |t| t.truecolor(MUTED.r, MUTED.g, MUTED.b))
        .to_string()
}

/// Color-code a freshness status value (fresh/stale/critical/unknown).
pub fn freshness(status_str: &str) -> String {
    match status_str {
        "fresh" => aurora(status_str),
        "stale" => copper(status_str),
        "critical" => ember(status_str),
        "unknown" => muted(status_str),
        _ => status_str.to_string(),
    }
}

/// Apply error styling (ember red, for stderr messages).
pub fn error(text: &str) -> String {
    if no_color() {
        return text.to_string();
    }
    text.if_supports_color(owo_colors::Stream::Stderr, |t| {
        t.truecolor(EMBER.r, EMBER.g, EMBER.b)
    })
    .to_string()
}

/// Apply hint styling (muted gray, for secondary info on stderr).
pub fn hint(text: &str) -> String {
    if no_color() {
        return text.to_string();
    }
    text.if_supports_color(owo_colors::Stream::Stderr, |t| {
        t.truecolor(MUTED.r, MUTED.g, MUTED.b)
    })
    .to_string()
}
