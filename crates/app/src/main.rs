//! Entry point: logging + CLI configuration, then hand off to the platform loop.

mod config;

use anyhow::Result;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = config::parse_args(std::env::args().skip(1));
    log::info!(
        "Starting freecam3d. Backend: {:?}, mesh={}, window_size={}x{}, fov={}°, show_fps={}",
        cfg.backends,
        cfg.mesh,
        cfg.width,
        cfg.height,
        cfg.projection.fov_deg,
        cfg.show_fps
    );

    platform::run(cfg)?;

    log::info!("Graceful shutdown. Bye!");
    Ok(())
}
