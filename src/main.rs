use std::path::PathBuf;
use std::process::ExitCode;

use iconforge::config::Config;
use iconforge::pipeline;

fn setup_logging() {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stdout))
        .init();
}

fn main() -> ExitCode {
    setup_logging();

    let mut args = std::env::args().skip(1);
    let config_path = match args.next().as_deref() {
        Some("-h") | Some("--help") => {
            println!("Usage: iconforge [CONFIG]\n\nBuilds .ico/.icns files from PNG icon sets.\nCONFIG defaults to ./iconforge.toml, or the built-in icon sets if absent.");
            return ExitCode::SUCCESS;
        }
        Some(path) => Some(PathBuf::from(path)),
        None => None,
    };

    let config = match Config::load(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{:#}", e);
            return ExitCode::from(2);
        }
    };

    let report = pipeline::run(&config);
    print!("{}", report);

    if report.success() {
        tracing::info!("Icon conversion complete");
        ExitCode::SUCCESS
    } else {
        let failed = report.failures().count();
        tracing::error!("{} icon target(s) failed", failed);
        ExitCode::FAILURE
    }
}
