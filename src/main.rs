use std::process::ExitCode;

use pyramid_scene::{config::AppConfig, window};

const DEFAULT_LOG_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn,naga=warn";

fn main() -> ExitCode {
    let mut builder = pretty_env_logger::formatted_builder();
    match std::env::var("RUST_LOG") {
        Ok(filter) => builder.parse_filters(&filter),
        Err(_) => builder.parse_filters(DEFAULT_LOG_FILTER),
    };
    builder.init();

    let config = AppConfig::from_env();
    exit_code(pollster::block_on(window::run(config)))
}

/// The single place a fatal error is reported.
fn exit_code(result: anyhow::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            log::error!("Exiting: {error:#}");
            ExitCode::FAILURE
        }
    }
}
