use std::path::PathBuf;

use clap::Parser;

use crate::utils::version;

#[derive(Parser, Debug)]
#[command(author, version = version(), about)]
pub struct Cli {
    /// Extra configuration file, applied on top of the config directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn config_flag_is_optional() {
        let cli = Cli::try_parse_from(["netdeck"]).unwrap();
        assert_eq!(cli.config, None);
        let cli = Cli::try_parse_from(["netdeck", "--config", "/tmp/deck.json5"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/deck.json5")));
    }
}
