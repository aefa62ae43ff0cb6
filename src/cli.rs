/// Command-line options.
///
/// The target instant is resolved here, in priority order:
/// `--in` seconds from now, `--target`, `[card] target` from config, and
/// finally midnight of the coming January 1st.

use std::path::PathBuf;

use chrono::{DateTime, Local, TimeDelta, Utc};
use clap::Parser;
use log::LevelFilter;

use crate::config::{next_new_year, parse_target};
use crate::error::CardError;

#[derive(Parser, Debug)]
#[command(name = "newyear-card")]
#[command(about = "A New Year countdown card with fireworks, in your terminal", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Count down to this local date-time (YYYY-MM-DDTHH:MM:SS)
    #[arg(long, value_name = "DATETIME", conflicts_with = "in_secs")]
    pub target: Option<String>,

    /// Count down this many seconds from now instead (max one year)
    #[arg(long = "in", value_name = "SECS", value_parser = clap::value_parser!(u32).range(0..=31_622_400))]
    pub in_secs: Option<u32>,

    /// Config file (default: config.toml next to the binary or in the working directory)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Disable sound effects
    #[arg(short, long)]
    pub mute: bool,

    /// Write a log to this file
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log level: off, error, warn, info, debug, trace
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    pub log_level: LevelFilter,
}

impl Cli {
    /// Pick the countdown target.
    pub fn resolve_target(
        &self,
        configured: Option<DateTime<Utc>>,
        now: DateTime<Local>,
    ) -> Result<DateTime<Utc>, CardError> {
        if let Some(secs) = self.in_secs {
            return Ok(now.with_timezone(&Utc) + TimeDelta::seconds(i64::from(secs)));
        }
        if let Some(text) = &self.target {
            return parse_target(text);
        }
        Ok(configured.unwrap_or_else(|| next_new_year(now)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("newyear-card").chain(args.iter().copied()))
    }

    fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, mo, d, h, mi, s).earliest().unwrap()
    }

    #[test]
    fn defaults() {
        let cli = parse(&[]).unwrap();
        assert!(cli.target.is_none() && cli.in_secs.is_none() && cli.config.is_none());
        assert!(!cli.mute);
        assert_eq!(cli.log_level, LevelFilter::Info);
    }

    #[test]
    fn all_flags() {
        let cli = parse(&[
            "--in", "10", "-c", "card.toml", "--mute", "--log-file", "card.log", "--log-level", "debug",
        ])
        .unwrap();
        assert_eq!(cli.in_secs, Some(10));
        assert_eq!(cli.config, Some(PathBuf::from("card.toml")));
        assert!(cli.mute);
        assert_eq!(cli.log_file, Some(PathBuf::from("card.log")));
        assert_eq!(cli.log_level, LevelFilter::Debug);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse(&["--in", "-5"]).is_err());
        assert!(parse(&["--in", "99999999"]).is_err());
        assert!(parse(&["--in", "5", "--target", "2026-01-01T00:00:00"]).is_err());
        assert!(parse(&["--log-level", "loud"]).is_err());
    }

    #[test]
    fn in_seconds_wins() {
        let now = local(2025, 6, 1, 12, 0, 0);
        let cli = parse(&["--in", "90"]).unwrap();
        let at = cli.resolve_target(Some(Utc::now()), now).unwrap();
        assert_eq!(at - now.with_timezone(&Utc), TimeDelta::seconds(90));
    }

    #[test]
    fn explicit_target_beats_config() {
        let now = local(2025, 6, 1, 12, 0, 0);
        let cli = parse(&["--target", "2025-07-04T09:30:00"]).unwrap();
        let at = cli.resolve_target(Some(Utc::now()), now).unwrap();
        assert_eq!(at, local(2025, 7, 4, 9, 30, 0).with_timezone(&Utc));

        let cli = parse(&["--target", "tomorrow"]).unwrap();
        assert!(matches!(
            cli.resolve_target(None, now),
            Err(CardError::InvalidTarget { .. })
        ));
    }

    #[test]
    fn falls_back_to_config_then_new_year() {
        let now = local(2025, 6, 1, 12, 0, 0);
        let cli = parse(&[]).unwrap();
        let configured = local(2025, 8, 1, 0, 0, 0).with_timezone(&Utc);
        assert_eq!(cli.resolve_target(Some(configured), now).unwrap(), configured);
        assert_eq!(
            cli.resolve_target(None, now).unwrap(),
            local(2026, 1, 1, 0, 0, 0).with_timezone(&Utc)
        );
    }
}
