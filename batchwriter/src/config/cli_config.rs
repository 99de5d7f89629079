use clap::Parser;

use super::options::Options;

pub fn default_dir() -> String {
    let home = dirs::home_dir();
    match home {
        Some(home_dir) => home_dir
            .join(".batchwriter")
            .join("config")
            .to_str()
            .unwrap_or("./batchwriter.config")
            .to_string(),
        None => "./batchwriter.config".to_string(),
    }
}

/// Command line arguments, with the config file's lines taking their place
/// when the file exists. Each non-empty line that is not a `#` comment is
/// one argument, e.g. `--database=metrics`.
pub fn get_args() -> Options {
    let command_line_args = Options::parse();

    let opts = match std::fs::read_to_string(&command_line_args.config_file) {
        Ok(config_file_str) => {
            log::debug!("Using config file: {:?}", command_line_args.config_file);
            let mut args = config_args(&config_file_str);
            args.extend(std::env::args().skip(1));
            match Options::try_parse_from(args) {
                Ok(opts) => opts,
                Err(e) => {
                    log::warn!("ignoring unusable config file: {e}");
                    command_line_args
                }
            }
        }
        Err(_) => command_line_args,
    };
    log::debug!("Config: {:?}", opts);
    opts
}

/// Config file arguments come first so the real command line overrides them.
fn config_args(config_file_str: &str) -> Vec<String> {
    std::iter::once("batchwriter".to_string())
        .chain(
            config_file_str
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(str::to_string),
        )
        .collect()
}
