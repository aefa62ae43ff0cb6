/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD), unless an
/// explicit path is given on the command line.
/// Falls back to sensible defaults if the file is missing or incomplete.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use log::{info, warn};
use serde::Deserialize;

use crate::error::CardError;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct CardConfig {
    /// Configured target, if any. `None` means "next New Year".
    pub target: Option<DateTime<Utc>>,
    pub timing: TimingConfig,
    pub fireworks: FireworksConfig,
    pub gamepad: GamepadConfig,
    pub sound: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TimingConfig {
    pub tick_ms: u64,
    pub fireworks_ms: u64,   // fireworks run this long after midnight
    pub message_ms: u64,     // then the message overlay, before Intro
    pub frame_ms: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FireworksConfig {
    pub launch_chance: f32,
    pub sparks_per_burst: usize,
    pub gravity: f32,
    pub spark_life: u32,
    pub trail_alpha: f32,
    pub px_per_cell: f32,    // logical pixels covered by one surface pixel
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub confirm: Vec<String>,
    pub back: Vec<String>,
    pub next_button: Vec<String>,
    pub prev_button: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    card: TomlCard,
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    fireworks: TomlFireworks,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug, Default)]
struct TomlCard {
    #[serde(default)]
    target: Option<String>,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_tick")]
    tick_ms: u64,
    #[serde(default = "default_fireworks_ms")]
    fireworks_ms: u64,
    #[serde(default = "default_message_ms")]
    message_ms: u64,
    #[serde(default = "default_frame")]
    frame_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlFireworks {
    #[serde(default = "default_launch_chance")]
    launch_chance: f32,
    #[serde(default = "default_sparks")]
    sparks_per_burst: usize,
    #[serde(default = "default_gravity")]
    gravity: f32,
    #[serde(default = "default_spark_life")]
    spark_life: u32,
    #[serde(default = "default_trail_alpha")]
    trail_alpha: f32,
    #[serde(default = "default_px_per_cell")]
    px_per_cell: f32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_back")]
    back: Vec<String>,
    #[serde(default = "default_next_button")]
    next_button: Vec<String>,
    #[serde(default = "default_prev_button")]
    prev_button: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_sound")]
    sound: bool,
}

// ── Defaults ──

fn default_tick() -> u64 { 1000 }
fn default_fireworks_ms() -> u64 { 5000 }
fn default_message_ms() -> u64 { 3000 }
fn default_frame() -> u64 { 16 }         // ~60 frames per second

/// Longest accepted timing value: one day.
const MAX_SPAN_MS: u64 = 86_400_000;

fn default_launch_chance() -> f32 { 0.05 }
fn default_sparks() -> usize { 60 }
fn default_gravity() -> f32 { 0.05 }
fn default_spark_life() -> u32 { 100 }
fn default_trail_alpha() -> f32 { 0.2 }
fn default_px_per_cell() -> f32 { 8.0 }

fn default_confirm() -> Vec<String> { vec!["A".into(), "Start".into()] }
fn default_back() -> Vec<String> { vec!["B".into(), "Select".into()] }
fn default_next_button() -> Vec<String> { vec!["R1".into()] }
fn default_prev_button() -> Vec<String> { vec!["L1".into()] }

fn default_sound() -> bool { true }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            tick_ms: default_tick(),
            fireworks_ms: default_fireworks_ms(),
            message_ms: default_message_ms(),
            frame_ms: default_frame(),
        }
    }
}

impl Default for TomlFireworks {
    fn default() -> Self {
        TomlFireworks {
            launch_chance: default_launch_chance(),
            sparks_per_burst: default_sparks(),
            gravity: default_gravity(),
            spark_life: default_spark_life(),
            trail_alpha: default_trail_alpha(),
            px_per_cell: default_px_per_cell(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            confirm: default_confirm(),
            back: default_back(),
            next_button: default_next_button(),
            prev_button: default_prev_button(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            sound: default_sound(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        CardConfig::from_toml(TomlConfig::default()).timing
    }
}

impl Default for FireworksConfig {
    fn default() -> Self {
        CardConfig::from_toml(TomlConfig::default()).fireworks
    }
}

// ── Loading ──

impl CardConfig {
    /// Load config from `explicit` if given, else search for `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load(explicit: Option<&Path>) -> Self {
        let toml_cfg = match explicit {
            Some(path) => read_toml(path).unwrap_or_default(),
            None => load_toml(&candidate_dirs()),
        };
        Self::from_toml(toml_cfg)
    }

    /// Parse config text directly. Invalid text yields the defaults.
    #[cfg(test)]
    pub(crate) fn from_str_or_default(text: &str) -> Self {
        Self::from_toml(toml::from_str(text).unwrap_or_default())
    }

    fn from_toml(t: TomlConfig) -> Self {
        let target = t.card.target.as_deref().and_then(|s| match parse_target(s) {
            Ok(at) => Some(at),
            Err(e) => {
                warn!("config.toml: {e}; counting down to the next New Year instead");
                None
            }
        });

        CardConfig {
            target,
            timing: TimingConfig {
                tick_ms: t.timing.tick_ms.clamp(1, MAX_SPAN_MS),
                fireworks_ms: t.timing.fireworks_ms.min(MAX_SPAN_MS),
                message_ms: t.timing.message_ms.min(MAX_SPAN_MS),
                frame_ms: t.timing.frame_ms.clamp(1, MAX_SPAN_MS),
            },
            fireworks: FireworksConfig {
                launch_chance: t.fireworks.launch_chance.clamp(0.0, 1.0),
                sparks_per_burst: t.fireworks.sparks_per_burst,
                gravity: t.fireworks.gravity,
                spark_life: t.fireworks.spark_life,
                trail_alpha: t.fireworks.trail_alpha.clamp(0.0, 1.0),
                px_per_cell: t.fireworks.px_per_cell.max(1.0),
            },
            gamepad: GamepadConfig {
                confirm: t.gamepad.confirm,
                back: t.gamepad.back,
                next_button: t.gamepad.next_button,
                prev_button: t.gamepad.prev_button,
            },
            sound: t.general.sound,
        }
    }
}

// ── Target instant ──

/// Parse a local calendar date-time (`YYYY-MM-DDTHH:MM:SS`, a space also
/// works as separator) into the absolute instant it denotes here.
pub fn parse_target(s: &str) -> Result<DateTime<Utc>, CardError> {
    let naive = parse_naive(s)?;
    local_instant(naive).ok_or_else(|| CardError::NonexistentTarget(s.trim().to_string()))
}

fn parse_naive(s: &str) -> Result<NaiveDateTime, CardError> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .map_err(|source| CardError::InvalidTarget { value: s.to_string(), source })
}

/// Earliest instant for a local wall-clock time; `None` inside a DST gap.
fn local_instant(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Midnight of the coming January 1st, local time.
pub fn next_new_year(now: DateTime<Local>) -> DateTime<Utc> {
    let midnight = next_new_year_naive(now.naive_local());
    local_instant(midnight).unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

fn next_new_year_naive(now: NaiveDateTime) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(now.year() + 1, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(NaiveDateTime::MAX)
}

// ── File discovery ──

/// Candidate directories to search: exe dir + CWD + system paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/newyear-card)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/newyear-card");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. System data directory
    let sys = PathBuf::from("/usr/share/newyear-card");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            if let Some(cfg) = read_toml(&path) {
                return cfg;
            }
        }
    }
    TomlConfig::default()
}

fn read_toml(path: &Path) -> Option<TomlConfig> {
    match std::fs::read_to_string(path) {
        Ok(text) => match toml::from_str::<TomlConfig>(&text) {
            Ok(cfg) => {
                info!("loaded {}", path.display());
                Some(cfg)
            }
            Err(e) => {
                warn!("{} parse error: {e}; using default settings", path.display());
                Some(TomlConfig::default())
            }
        },
        Err(e) => {
            warn!("could not read {}: {e}", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn empty_file_gives_card_defaults() {
        let c = CardConfig::from_str_or_default("");
        assert_eq!(c.target, None);
        assert_eq!(c.timing, TimingConfig {
            tick_ms: 1000, fireworks_ms: 5000, message_ms: 3000, frame_ms: 16,
        });
        assert_eq!(c.fireworks.sparks_per_burst, 60);
        assert_eq!(c.fireworks.spark_life, 100);
        assert!((c.fireworks.launch_chance - 0.05).abs() < 1e-6);
        assert!((c.fireworks.trail_alpha - 0.2).abs() < 1e-6);
        assert!(c.sound);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let c = CardConfig::from_str_or_default(
            "[fireworks]\nsparks_per_burst = 12\n[general]\nsound = false\n",
        );
        assert_eq!(c.fireworks.sparks_per_burst, 12);
        assert_eq!(c.fireworks.spark_life, 100);
        assert!(!c.sound);
        assert_eq!(c.gamepad.confirm, vec!["A".to_string(), "Start".to_string()]);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let c = CardConfig::from_str_or_default(
            "[fireworks]\nlaunch_chance = 3.0\ntrail_alpha = -1.0\npx_per_cell = 0.0\n\
             [timing]\nframe_ms = 0\n",
        );
        assert_eq!(c.fireworks.launch_chance, 1.0);
        assert_eq!(c.fireworks.trail_alpha, 0.0);
        assert_eq!(c.fireworks.px_per_cell, 1.0);
        assert_eq!(c.timing.frame_ms, 1);
    }

    #[test]
    fn huge_timings_are_capped_at_a_day() {
        let c = CardConfig::from_str_or_default(
            "[timing]\ntick_ms = 10000000000000000\nfireworks_ms = 10000000000000000\n\
             message_ms = 18446744073709551615\nframe_ms = 10000000000000000\n",
        );
        assert_eq!(c.timing.tick_ms, MAX_SPAN_MS);
        assert_eq!(c.timing.fireworks_ms, MAX_SPAN_MS);
        assert_eq!(c.timing.message_ms, MAX_SPAN_MS);
        assert_eq!(c.timing.frame_ms, MAX_SPAN_MS);
    }

    #[test]
    fn broken_toml_falls_back_to_defaults() {
        let c = CardConfig::from_str_or_default("[fireworks\nsparks_per_burst = ");
        assert_eq!(c.fireworks.sparks_per_burst, 60);
    }

    #[test]
    fn bad_target_is_ignored() {
        let c = CardConfig::from_str_or_default("[card]\ntarget = \"soon\"\n");
        assert_eq!(c.target, None);
    }

    #[test]
    fn naive_target_formats() {
        let a = parse_naive("2026-01-01T00:00:00").unwrap();
        let b = parse_naive(" 2026-01-01 00:00:00 ").unwrap();
        assert_eq!(a, b);
        assert_eq!((a.year(), a.month(), a.day(), a.hour()), (2026, 1, 1, 0));
        assert!(matches!(
            parse_naive("January 1, 2026"),
            Err(CardError::InvalidTarget { .. })
        ));
    }

    #[test]
    fn next_new_year_rolls_over() {
        let d = |s| parse_naive(s).unwrap();
        assert_eq!(next_new_year_naive(d("2025-12-31T23:59:58")), d("2026-01-01T00:00:00"));
        // Exactly at midnight the next one is a year away.
        assert_eq!(next_new_year_naive(d("2026-01-01T00:00:00")), d("2027-01-01T00:00:00"));
        assert_eq!(next_new_year_naive(d("2026-10-18T12:00:00")), d("2027-01-01T00:00:00"));
    }
}
