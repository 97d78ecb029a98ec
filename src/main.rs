use anyhow::Result;
use log::{info, warn};
use mia::Config;
use mia::app::Application;

fn main() -> Result<()> {
    mia::init_logger();
    info!("Starting MIA");

    let config = Config::load().unwrap_or_else(|e| {
        warn!("Could not load config, using defaults: {:#}", e);
        Config::default()
    });

    Application::new(&config)?.run()
}
