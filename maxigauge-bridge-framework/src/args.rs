//! CLI argument parsing for bridges.

use std::path::PathBuf;

use clap::Parser;

/// Default configuration path when none is given.
pub const DEFAULT_CONFIG: &str = "config.yaml";

/// Command line of a bridge binary: one optional positional config path.
#[derive(Parser, Debug, Clone)]
#[command(about = "Polls an instrument and publishes its readings to MQTT")]
pub struct BridgeArgs {
    /// Path to configuration file (YAML).
    #[arg(default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,
}

impl BridgeArgs {
    /// Parse CLI arguments of the running process.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_default_config() {
        let args = BridgeArgs::try_parse_from(["maxigauge-mqtt"]).unwrap();
        assert_eq!(args.config, PathBuf::from("config.yaml"));
    }

    #[test]
    fn test_args_positional_config() {
        let args = BridgeArgs::try_parse_from(["maxigauge-mqtt", "/etc/maxigauge.yaml"]).unwrap();
        assert_eq!(args.config, PathBuf::from("/etc/maxigauge.yaml"));
    }

    #[test]
    fn test_args_reject_extra() {
        assert!(BridgeArgs::try_parse_from(["maxigauge-mqtt", "a.yaml", "b.yaml"]).is_err());
    }
}
