use std::env;
use std::path::PathBuf;

use overworld_engine::{
    resolve_app_paths, AreaLoader, LoopConfig, OverworldContext, Scene, StartupError,
};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::content::{load_unit_animations, ContentAreaLoader, ContentError};
use super::overworld_scene::OverworldScene;

const START_AREA_ENV_VAR: &str = "OVERWORLD_START_AREA";
const DEFAULT_START_AREA: &str = "Pallet Town";
const PLAYER_UNIT: &str = "trainer";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
    pub(crate) asset_root: PathBuf,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Content(#[from] ContentError),
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Overworld Startup ===");

    let paths = resolve_app_paths()?;
    info!(
        root = %paths.root.display(),
        assets_dir = %paths.assets_dir.display(),
        "paths_resolved"
    );

    let start_area = start_area_from_env();
    let mut loader = ContentAreaLoader::open(&paths.assets_dir)?;
    let area = loader.load_area(&start_area)?;
    let trainer = load_unit_animations(&paths.assets_dir, PLAYER_UNIT)?;
    info!(
        start_area = start_area.as_str(),
        known_areas = loader.area_names().count(),
        "content_ready"
    );

    let context = OverworldContext::new(area, trainer);
    Ok(AppWiring {
        config: LoopConfig::default(),
        scene: Box::new(OverworldScene::new(context, loader)),
        asset_root: paths.assets_dir,
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

fn start_area_from_env() -> String {
    parse_start_area(env::var(START_AREA_ENV_VAR).ok().as_deref())
}

fn parse_start_area(raw: Option<&str>) -> String {
    raw.map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_START_AREA)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_area_defaults_when_unset_or_blank() {
        assert_eq!(parse_start_area(None), DEFAULT_START_AREA);
        assert_eq!(parse_start_area(Some("   ")), DEFAULT_START_AREA);
    }

    #[test]
    fn start_area_is_trimmed() {
        assert_eq!(parse_start_area(Some(" Route 1 ")), "Route 1");
    }
}
