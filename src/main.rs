use std::path::PathBuf;

use argh::FromArgs;
use miette::WrapErr;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

use autoaway::consts::DEFAULT_CONFIG_PATH;
use autoaway::{AutoAway, Config};

/// Marks you away on IRC while your screen is locked
#[derive(Debug, FromArgs)]
struct Opts {
    /// path to config file
    #[argh(option, default = "PathBuf::from(DEFAULT_CONFIG_PATH)")]
    config_path: PathBuf,
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Parse command-line arguments
    let opts: Opts = argh::from_env();

    // Load the config file and override values from the environment
    let config = Config::load(&opts.config_path)
        .wrap_err_with(|| format!("loading {}", opts.config_path.display()))?;

    // Initialize logging
    autoaway::tracing::try_init(&config.tracing)?;

    debug!(?config, "loaded configuration");

    // Load the persisted settings before anything else, a missing settings directory is fatal
    let mut autoaway = AutoAway::new(config)?;

    let console = BufReader::new(tokio::io::stdin()).lines();
    let result = autoaway.run(console).await;

    warn!("autoaway stopped");

    result.wrap_err("running autoaway")
}
