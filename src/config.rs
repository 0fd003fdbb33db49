use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

const DEFAULT_KEY_BINDINGS: [(&str, &str); 9] = [
    ("1", "bastion"),
    ("2", "orchestrator"),
    ("3", "clarity"),
    ("4", "grammar"),
    ("5", "documentation"),
    ("6", "structure"),
    ("7", "granularity"),
    ("8", "tooling"),
    ("9", "repetition"),
];

/// Font sizes per text role. Used both for the unscaled base sizes in the
/// config and for the resolved sizes of a layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontSizes {
    pub instance_icon: f32,
    pub instance_label: f32,
    pub port_label: f32,
    pub address_label: f32,
    pub vpc_label: f32,
    pub region_label: f32,
    pub region_cidr: f32,
    pub group_label: f32,
}

impl FontSizes {
    pub fn scaled(&self, scale: f32, min_size: f32) -> Self {
        let f = |base: f32| (base * scale).max(min_size);
        Self {
            instance_icon: f(self.instance_icon),
            instance_label: f(self.instance_label),
            port_label: f(self.port_label),
            address_label: f(self.address_label),
            vpc_label: f(self.vpc_label),
            region_label: f(self.region_label),
            region_cidr: f(self.region_cidr),
            group_label: f(self.group_label),
        }
    }
}

impl Default for FontSizes {
    fn default() -> Self {
        Self {
            instance_icon: 10.0,
            instance_label: 11.0,
            port_label: 12.0,
            address_label: 11.0,
            vpc_label: 14.0,
            region_label: 12.0,
            region_cidr: 10.0,
            group_label: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub base_width: f32,
    pub base_height: f32,
    pub margin: f32,
    pub base_radius: f32,
    pub min_distance_multiplier: f32,
    /// Below this width/height ratio the regions stack vertically.
    pub vertical_ratio_threshold: f32,
    pub min_font_size: f32,
    pub base_stroke_width: f32,
    pub min_stroke_width: f32,
    pub placement_padding: f32,
    pub drag_padding: f32,
    pub spiral_step_ratio: f32,
    pub spiral_angle_steps: usize,
    pub grid_step_ratio: f32,
    pub random_attempts: usize,
    pub label_offset: f32,
    pub label_line_height: f32,
    pub label_box_width: f32,
    pub label_box_height: f32,
    pub label_side_gap: f32,
    pub group_padding: f32,
    pub hidden_nodes: Vec<String>,
    pub fonts: FontSizes,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            base_width: 1200.0,
            base_height: 800.0,
            margin: 40.0,
            base_radius: 25.0,
            min_distance_multiplier: 4.0,
            vertical_ratio_threshold: 1.5,
            min_font_size: 8.0,
            base_stroke_width: 3.0,
            min_stroke_width: 1.0,
            placement_padding: 60.0,
            drag_padding: 40.0,
            spiral_step_ratio: 0.75,
            spiral_angle_steps: 12,
            grid_step_ratio: 0.8,
            random_attempts: 100,
            label_offset: 15.0,
            label_line_height: 12.0,
            label_box_width: 60.0,
            label_box_height: 12.0,
            label_side_gap: 20.0,
            group_padding: 30.0,
            hidden_nodes: Vec::new(),
            fonts: FontSizes::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionConfig {
    pub resize_debounce_ms: u64,
    pub container_gutter: f32,
    pub min_viewport_width: f32,
    pub min_viewport_height: f32,
    pub hover_scale: f32,
    pub idle_edge_opacity: f32,
    pub idle_edge_width: f32,
    pub preview_edge_opacity: f32,
    pub preview_edge_width: f32,
    pub flow_edge_opacity: f32,
    pub flow_edge_width: f32,
    pub click_flow_highlight: bool,
    pub flow_highlight_ms: u64,
    pub particle_duration_ms: u64,
    pub show_all_key: String,
    pub key_bindings: BTreeMap<String, String>,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            resize_debounce_ms: 250,
            container_gutter: 40.0,
            min_viewport_width: 400.0,
            min_viewport_height: 300.0,
            hover_scale: 1.1,
            idle_edge_opacity: 0.4,
            idle_edge_width: 2.0,
            preview_edge_opacity: 0.8,
            preview_edge_width: 3.0,
            flow_edge_opacity: 1.0,
            flow_edge_width: 3.0,
            click_flow_highlight: true,
            flow_highlight_ms: 2000,
            particle_duration_ms: 1200,
            show_all_key: "a".to_string(),
            key_bindings: DEFAULT_KEY_BINDINGS
                .iter()
                .map(|(key, id)| (key.to_string(), id.to_string()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            background: "#fafafa".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub interaction: InteractionConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::classic();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            interaction: InteractionConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    mono_font_family: Option<String>,
    background: Option<String>,
    public_fill: Option<String>,
    public_stroke: Option<String>,
    private_fill: Option<String>,
    private_stroke: Option<String>,
    label_color: Option<String>,
    api_edge_color: Option<String>,
    ssh_edge_color: Option<String>,
    api_edge_dasharray: Option<String>,
    ssh_edge_dasharray: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    base_width: Option<f32>,
    base_height: Option<f32>,
    margin: Option<f32>,
    base_radius: Option<f32>,
    min_distance_multiplier: Option<f32>,
    vertical_ratio_threshold: Option<f32>,
    placement_padding: Option<f32>,
    drag_padding: Option<f32>,
    random_attempts: Option<usize>,
    group_padding: Option<f32>,
    hidden_nodes: Option<Vec<String>>,
    fonts: Option<FontSizes>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct InteractionConfigFile {
    resize_debounce_ms: Option<u64>,
    hover_scale: Option<f32>,
    click_flow_highlight: Option<bool>,
    flow_highlight_ms: Option<u64>,
    particle_duration_ms: Option<u64>,
    show_all_key: Option<String>,
    key_bindings: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    interaction: Option<InteractionConfigFile>,
    width: Option<f32>,
    height: Option<f32>,
}

impl Config {
    /// Applies a JSON document of optional overrides on top of the defaults.
    pub fn from_json_str(contents: &str) -> anyhow::Result<Config> {
        let parsed: ConfigFile = serde_json::from_str(contents)?;
        Ok(apply_config_file(Config::default(), parsed))
    }
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    Config::from_json_str(&contents)
}

fn apply_config_file(mut config: Config, parsed: ConfigFile) -> Config {
    if let Some(theme_name) = parsed.theme.as_deref() {
        match Theme::from_name(theme_name) {
            Some(theme) => config.theme = theme,
            None => tracing::warn!(theme = theme_name, "unknown theme, keeping default"),
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.mono_font_family {
            config.theme.mono_font_family = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.public_fill {
            config.theme.public_fill = v;
        }
        if let Some(v) = vars.public_stroke {
            config.theme.public_stroke = v;
        }
        if let Some(v) = vars.private_fill {
            config.theme.private_fill = v;
        }
        if let Some(v) = vars.private_stroke {
            config.theme.private_stroke = v;
        }
        if let Some(v) = vars.label_color {
            config.theme.label_color = v;
        }
        if let Some(v) = vars.api_edge_color {
            config.theme.api_edge_color = v;
        }
        if let Some(v) = vars.ssh_edge_color {
            config.theme.ssh_edge_color = v;
        }
        if let Some(v) = vars.api_edge_dasharray {
            config.theme.api_edge_dasharray = v;
        }
        if let Some(v) = vars.ssh_edge_dasharray {
            config.theme.ssh_edge_dasharray = v;
        }
    }
    config.render.background = config.theme.background.clone();

    if let Some(layout) = parsed.layout {
        let target = &mut config.layout;
        if let Some(v) = layout.base_width {
            target.base_width = v;
        }
        if let Some(v) = layout.base_height {
            target.base_height = v;
        }
        if let Some(v) = layout.margin {
            target.margin = v;
        }
        if let Some(v) = layout.base_radius {
            target.base_radius = v;
        }
        if let Some(v) = layout.min_distance_multiplier {
            target.min_distance_multiplier = v;
        }
        if let Some(v) = layout.vertical_ratio_threshold {
            target.vertical_ratio_threshold = v;
        }
        if let Some(v) = layout.placement_padding {
            target.placement_padding = v;
        }
        if let Some(v) = layout.drag_padding {
            target.drag_padding = v;
        }
        if let Some(v) = layout.random_attempts {
            target.random_attempts = v;
        }
        if let Some(v) = layout.group_padding {
            target.group_padding = v;
        }
        if let Some(v) = layout.hidden_nodes {
            target.hidden_nodes = v;
        }
        if let Some(v) = layout.fonts {
            target.fonts = v;
        }
    }

    if let Some(interaction) = parsed.interaction {
        let target = &mut config.interaction;
        if let Some(v) = interaction.resize_debounce_ms {
            target.resize_debounce_ms = v;
        }
        if let Some(v) = interaction.hover_scale {
            target.hover_scale = v;
        }
        if let Some(v) = interaction.click_flow_highlight {
            target.click_flow_highlight = v;
        }
        if let Some(v) = interaction.flow_highlight_ms {
            target.flow_highlight_ms = v;
        }
        if let Some(v) = interaction.particle_duration_ms {
            target.particle_duration_ms = v;
        }
        if let Some(v) = interaction.show_all_key {
            target.show_all_key = v;
        }
        if let Some(v) = interaction.key_bindings {
            target.key_bindings = v;
        }
    }

    if let Some(v) = parsed.width {
        config.render.width = v;
    }
    if let Some(v) = parsed.height {
        config.render.height = v;
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_geometry() {
        let config = Config::default();
        assert_eq!(config.layout.base_width, 1200.0);
        assert_eq!(config.layout.base_height, 800.0);
        assert_eq!(config.layout.vertical_ratio_threshold, 1.5);
        assert_eq!(config.interaction.resize_debounce_ms, 250);
        assert_eq!(
            config.interaction.key_bindings.get("9").map(String::as_str),
            Some("repetition")
        );
    }

    #[test]
    fn overrides_apply_on_top_of_defaults() {
        let config = Config::from_json_str(
            r##"{
                "theme": "dark",
                "themeVariables": { "apiEdgeColor": "#123456" },
                "layout": { "verticalRatioThreshold": 1.2, "hiddenNodes": ["webapp"] },
                "interaction": { "clickFlowHighlight": false, "keyBindings": { "0": "bastion" } }
            }"##,
        )
        .unwrap();
        assert_eq!(config.theme.background, Theme::dark().background);
        assert_eq!(config.render.background, Theme::dark().background);
        assert_eq!(config.theme.api_edge_color, "#123456");
        assert_eq!(config.layout.vertical_ratio_threshold, 1.2);
        assert_eq!(config.layout.hidden_nodes, vec!["webapp".to_string()]);
        assert!(!config.interaction.click_flow_highlight);
        assert_eq!(config.interaction.key_bindings.len(), 1);
        assert_eq!(config.layout.base_radius, 25.0);
    }

    #[test]
    fn scaled_fonts_respect_floor() {
        let fonts = FontSizes::default().scaled(0.5, 8.0);
        assert_eq!(fonts.vpc_label, 8.0);
        assert_eq!(fonts.region_cidr, 8.0);
        let fonts = FontSizes::default().scaled(2.0, 8.0);
        assert_eq!(fonts.port_label, 24.0);
    }

    #[test]
    fn missing_path_yields_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.layout.margin, 40.0);
    }
}
