use anyhow::{Context, Result};

use lumen_engine::logging::{init_logging, LoggingConfig};
use lumen_engine::resources::{DirResources, EmbeddedResources, Layered, ResourceLoader};
use lumen_engine::window::{Runtime, RuntimeConfig, WindowConfig, WinitPlatform};

/// Directory whose files override the built-in shader sources.
const ASSETS_ENV: &str = "LUMEN_ASSETS";

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let resources = resources();

    let platform = WinitPlatform::open(WindowConfig {
        title: "Lumen".to_string(),
        ..WindowConfig::default()
    })
    .context("failed to open the window")?;

    let mut runtime = Runtime::new(platform, resources, RuntimeConfig::default());
    runtime.run().context("render loop failed")?;

    Ok(())
}

fn resources() -> Box<dyn ResourceLoader> {
    match std::env::var_os(ASSETS_ENV) {
        Some(dir) => {
            let assets = DirResources::new(dir);
            log::info!("loading assets from {} (built-ins as fallback)", assets.root().display());
            Box::new(Layered::new(assets, EmbeddedResources::builtin()))
        }
        None => Box::new(EmbeddedResources::builtin()),
    }
}
