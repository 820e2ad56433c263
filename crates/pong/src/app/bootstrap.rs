use arcade::LoopConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::config::{self, ConfigResult};
use super::pong::PongScene;

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: PongScene,
}

pub(crate) fn build_app() -> ConfigResult<AppWiring> {
    init_tracing();
    info!("=== Pong Startup ===");

    let pong_config = config::load_from_env()?;
    info!(
        window_width = pong_config.window_width,
        window_height = pong_config.window_height,
        target_tps = pong_config.target_tps,
        paddle_speed = pong_config.paddle_speed,
        "pong_config_loaded"
    );

    Ok(AppWiring {
        config: pong_config.to_loop_config(),
        scene: PongScene::new(pong_config),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
