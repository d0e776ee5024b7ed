//! Main application entry point.

use collabboard_app::{App, AppConfig};
use std::path::PathBuf;

fn main() {
    env_logger::init();
    log::info!("Starting CollabBoard");

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let result = AppConfig::load(config_path.as_deref()).and_then(App::run);
    match result {
        Ok(path) => println!("{}", path.display()),
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    }
}
