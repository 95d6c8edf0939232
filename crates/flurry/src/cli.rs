//! Command line arguments.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use flurry_core::{ConfigOverrides, Direction};

/// Snowfall particle effect for your terminal.
#[derive(Debug, Parser)]
#[command(name = "flurry", version, about)]
pub struct Cli {
    /// Settings file to read and save (defaults to the platform config dir).
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Number of snowflakes.
    #[arg(short = 'n', long, value_name = "N")]
    pub count: Option<usize>,

    /// Travel direction.
    #[arg(short, long, value_enum)]
    pub direction: Option<DirectionArg>,

    /// Seed for a reproducible particle stream.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print the resolved settings as TOML and exit.
    #[arg(long)]
    pub print_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DirectionArg {
    Down,
    Up,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Down => Direction::Down,
            DirectionArg::Up => Direction::Up,
        }
    }
}

impl Cli {
    /// Effect overrides given on the command line.
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            snowflake_count: self.count,
            direction: self.direction.map(Direction::from),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_overrides() {
        let cli = Cli::parse_from(["flurry", "-n", "300", "--direction", "up", "--seed", "7"]);
        let overrides = cli.overrides();
        assert_eq!(overrides.snowflake_count, Some(300));
        assert_eq!(overrides.direction, Some(Direction::Up));
        assert_eq!(cli.seed, Some(7));
        assert!(!cli.print_config);
    }

    #[test]
    fn test_no_flags_means_no_overrides() {
        let cli = Cli::parse_from(["flurry"]);
        assert_eq!(cli.overrides(), ConfigOverrides::default());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_rejects_unknown_direction() {
        assert!(Cli::try_parse_from(["flurry", "--direction", "sideways"]).is_err());
    }
}
