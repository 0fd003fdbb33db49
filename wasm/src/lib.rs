use std::time::Duration;

use infraviz::config::Config;
use infraviz::layout::SeededRandom;
use infraviz::render::{render_fallback_svg, render_svg};
use infraviz::theme::Theme;
use infraviz::{Scene, SceneUpdate, Topology};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SceneOptions {
    theme: Option<String>,
    font_family: Option<String>,
    seed: Option<u64>,
    compact: Option<bool>,
    vertical_ratio_threshold: Option<f32>,
    topology: Option<String>,
}

fn build_config(options: &SceneOptions) -> Config {
    let mut config = Config::default();
    if let Some(theme) = options.theme.as_deref().and_then(Theme::from_name) {
        config.theme = theme;
        config.render.background = config.theme.background.clone();
    }
    if let Some(font_family) = &options.font_family {
        config.theme.font_family = font_family.clone();
    }
    if let Some(threshold) = options.vertical_ratio_threshold {
        config.layout.vertical_ratio_threshold = threshold;
    }
    if options.compact.unwrap_or(false) {
        config.layout.hidden_nodes.push("webapp".to_string());
    }
    config
}

fn parse_options(options_json: Option<String>) -> Result<SceneOptions, JsValue> {
    match options_json {
        Some(raw) => serde_json::from_str(&raw).map_err(|error| JsValue::from_str(&error.to_string())),
        None => Ok(SceneOptions::default()),
    }
}

fn to_js(updates: &[SceneUpdate]) -> Result<String, JsValue> {
    serde_json::to_string(updates).map_err(|error| JsValue::from_str(&error.to_string()))
}

/// Host milliseconds to a timestamp. NaN and negatives map to zero,
/// anything too large to represent saturates.
fn timestamp(ms: f64) -> Duration {
    if ms.is_nan() || ms <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(ms / 1000.0).unwrap_or(Duration::MAX)
}

/// Browser handle on a scene. Every event method returns the resulting
/// update commands as a JSON array.
#[wasm_bindgen]
pub struct InfraScene {
    scene: Scene,
    theme: Theme,
}

#[wasm_bindgen]
impl InfraScene {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32, options_json: Option<String>) -> Result<InfraScene, JsValue> {
        let options = parse_options(options_json)?;
        let config = build_config(&options);
        let topology = match &options.topology {
            Some(raw) => Topology::from_json_str(raw),
            None => Topology::builtin(),
        }
        .map_err(|error| JsValue::from_str(&error.to_string()))?;
        let theme = config.theme.clone();
        let rng = Box::new(SeededRandom::new(options.seed.unwrap_or(0)));
        let scene = Scene::with_random(topology, config, width, height, rng)
            .map_err(|error| JsValue::from_str(&error.to_string()))?;
        Ok(InfraScene { scene, theme })
    }

    pub fn svg(&self) -> String {
        render_svg(&self.scene, &self.theme)
    }

    #[wasm_bindgen(js_name = layoutJson)]
    pub fn layout_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.scene.layout()).map_err(|error| JsValue::from_str(&error.to_string()))
    }

    #[wasm_bindgen(js_name = geometry)]
    pub fn geometry(&self) -> Result<String, JsValue> {
        to_js(&self.scene.geometry_updates())
    }

    #[wasm_bindgen(js_name = beginDrag)]
    pub fn begin_drag(&mut self, id: &str) -> Result<String, JsValue> {
        to_js(&self.scene.begin_drag(id))
    }

    #[wasm_bindgen(js_name = dragTo)]
    pub fn drag_to(&mut self, id: &str, x: f32, y: f32) -> Result<String, JsValue> {
        to_js(&self.scene.drag_to(id, x, y))
    }

    #[wasm_bindgen(js_name = endDrag)]
    pub fn end_drag(&mut self, id: &str) -> Result<String, JsValue> {
        to_js(&self.scene.end_drag(id))
    }

    #[wasm_bindgen(js_name = pointerEnter)]
    pub fn pointer_enter(&mut self, id: &str) -> Result<String, JsValue> {
        to_js(&self.scene.pointer_enter(id))
    }

    #[wasm_bindgen(js_name = pointerLeave)]
    pub fn pointer_leave(&mut self, id: &str) -> Result<String, JsValue> {
        to_js(&self.scene.pointer_leave(id))
    }

    /// `now_ms` is any monotonic host clock, e.g. `performance.now()`.
    pub fn click(&mut self, id: &str, now_ms: f64) -> Result<String, JsValue> {
        to_js(&self.scene.click(id, timestamp(now_ms)))
    }

    pub fn key(&mut self, key: &str, now_ms: f64) -> Result<String, JsValue> {
        to_js(&self.scene.key(key, timestamp(now_ms)))
    }

    #[wasm_bindgen(js_name = hideDetail)]
    pub fn hide_detail(&mut self) -> Result<String, JsValue> {
        to_js(&self.scene.hide_detail())
    }

    #[wasm_bindgen(js_name = requestResize)]
    pub fn request_resize(&mut self, width: f32, height: f32, now_ms: f64) {
        self.scene.request_resize(width, height, timestamp(now_ms));
    }

    pub fn advance(&mut self, now_ms: f64) -> Result<String, JsValue> {
        to_js(&self.scene.advance(timestamp(now_ms)))
    }
}

/// Placeholder markup for hosts whose scene failed to initialize.
#[wasm_bindgen(js_name = fallbackSvg)]
pub fn fallback_svg(width: f32, height: f32, theme: Option<String>) -> String {
    let theme = theme.as_deref().and_then(Theme::from_name).unwrap_or_default();
    render_fallback_svg(width, height, &theme)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_compact_dark_config() {
        let options: SceneOptions =
            serde_json::from_str(r#"{ "theme": "dark", "compact": true, "verticalRatioThreshold": 1.2 }"#).unwrap();
        let config = build_config(&options);
        assert_eq!(config.theme.background, Theme::dark().background);
        assert_eq!(config.layout.hidden_nodes, vec!["webapp".to_string()]);
        assert_eq!(config.layout.vertical_ratio_threshold, 1.2);
    }

    #[test]
    fn scene_events_serialize_to_json() {
        let config = build_config(&SceneOptions::default());
        let mut scene = Scene::with_random(
            Topology::builtin().unwrap(),
            config,
            1200.0,
            800.0,
            Box::new(SeededRandom::new(0)),
        )
        .unwrap();
        let json = to_js(&scene.begin_drag("bastion")).unwrap();
        assert!(json.contains("\"type\":\"set-dragging\""));
    }

    #[test]
    fn timestamps_never_panic() {
        assert_eq!(timestamp(1500.0), Duration::from_millis(1500));
        assert_eq!(timestamp(-20.0), Duration::ZERO);
        assert_eq!(timestamp(f64::NAN), Duration::ZERO);
        assert_eq!(timestamp(f64::INFINITY), Duration::MAX);
        assert_eq!(timestamp(f64::MAX), Duration::MAX);
    }
}
