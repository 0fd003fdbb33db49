#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod detail;
pub mod interaction;
pub mod ir;
pub mod keymap;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod resize;
pub mod scene;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::Config;
pub use ir::Topology;
pub use scene::{Scene, SceneError, SceneUpdate};

use layout::{RandomSource, SeededRandom, ThreadRandom};

/// Builds a scene at the configured render size and draws it. A seed makes
/// the last-chance placement search reproducible.
pub fn render_topology(topology: Topology, config: Config, seed: Option<u64>) -> Result<String, SceneError> {
    let rng: Box<dyn RandomSource> = match seed {
        Some(seed) => Box::new(SeededRandom::new(seed)),
        None => Box::new(ThreadRandom),
    };
    let (width, height) = (config.render.width, config.render.height);
    let theme = config.theme.clone();
    let scene = Scene::with_random(topology, config, width, height, rng)?;
    Ok(render::render_svg(&scene, &theme))
}

/// Like [`render_topology`] but falls back to the static placeholder when
/// the scene cannot be built.
pub fn render_topology_or_fallback(topology: Topology, config: Config, seed: Option<u64>) -> String {
    let (width, height) = (config.render.width, config.render.height);
    let theme = config.theme.clone();
    match render_topology(topology, config, seed) {
        Ok(svg) => svg,
        Err(err) => {
            tracing::error!(%err, "scene initialization failed, rendering fallback");
            render::render_fallback_svg(width, height, &theme)
        }
    }
}
