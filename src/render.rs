use crate::config::RenderConfig;
use crate::interaction::NodeInteraction;
use crate::ir::Instance;
use crate::layout::{Layout, NodeLayout};
use crate::scene::Scene;
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

const FALLBACK_TITLE: &str = "Infrastructure Visualization";
const FALLBACK_SUBTITLE: &str = "FrizzlesRubric Distributed AI System";
const FALLBACK_NOTE: &str = "Interactive diagram of evaluation experts across a secure VPC";

/// Draws the current state of `scene`, including hover and highlight
/// styling.
pub fn render_svg(scene: &Scene, theme: &Theme) -> String {
    let layout = scene.layout();
    let topology = scene.topology();
    let metrics = &layout.metrics;
    let fonts = &metrics.fonts;
    let width = layout.viewport.width;
    let height = layout.viewport.height;
    let mut svg = String::new();

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        escape_xml(&scene.config().render.background)
    ));
    svg.push_str("<defs>");
    svg.push_str("<filter id=\"glow\" x=\"-50%\" y=\"-50%\" width=\"200%\" height=\"200%\"><feGaussianBlur stdDeviation=\"3\" result=\"blur\"/><feMerge><feMergeNode in=\"blur\"/><feMergeNode in=\"SourceGraphic\"/></feMerge></filter>");
    svg.push_str("</defs>");

    let vpc = layout.vpc;
    svg.push_str(&format!(
        "<rect class=\"vpc-boundary\" x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"8\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\" stroke-dasharray=\"10,5\"/>",
        vpc.x, vpc.y, vpc.width, vpc.height, theme.vpc_stroke
    ));
    let vpc_label = if topology.network.id.is_empty() {
        format!("VPC ({})", topology.network.cidr)
    } else {
        format!("{} ({})", topology.network.id, topology.network.cidr)
    };
    svg.push_str(&format!(
        "<text class=\"vpc-label\" x=\"{:.2}\" y=\"{:.2}\" font-family=\"{}\" font-size=\"{:.2}\" font-weight=\"bold\" fill=\"{}\">{}</text>",
        vpc.x + 10.0,
        vpc.y - 8.0,
        escape_xml(&theme.font_family),
        fonts.vpc_label,
        theme.vpc_label_color,
        escape_xml(&vpc_label)
    ));

    for region in layout.regions.values() {
        let (fill, stroke) = theme.region_colors(region.access);
        let b = region.bounds;
        svg.push_str(&format!(
            "<rect id=\"subnet-{}\" x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"6\" fill=\"{}\" stroke=\"{}\" stroke-width=\"2\"/>",
            region.access.as_str(),
            b.x,
            b.y,
            b.width,
            b.height,
            fill,
            stroke
        ));
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" font-family=\"{}\" font-size=\"{:.2}\" font-weight=\"bold\" fill=\"{}\">{}</text>",
            b.x + 10.0,
            b.y + 18.0,
            escape_xml(&theme.font_family),
            fonts.region_label,
            theme.region_label_color,
            escape_xml(&region.name)
        ));
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" font-family=\"{}\" font-size=\"{:.2}\" fill=\"{}\">{}</text>",
            b.x + 10.0,
            b.y + 18.0 + fonts.region_label + 4.0,
            escape_xml(&theme.mono_font_family),
            fonts.region_cidr,
            theme.region_cidr_color,
            escape_xml(&region.cidr)
        ));
    }

    for group in &layout.groups {
        let b = group.bounds;
        let color = group.color.as_deref().unwrap_or(&theme.group_fallback_color);
        svg.push_str(&format!(
            "<rect id=\"sg-{}\" x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"10\" fill=\"none\" stroke=\"{}\" stroke-width=\"1.5\" stroke-dasharray=\"8,4\" opacity=\"0.7\"/>",
            escape_xml(&group.id),
            b.x,
            b.y,
            b.width,
            b.height,
            escape_xml(color)
        ));
        svg.push_str(&format!(
            "<text class=\"sg-label\" x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"end\" font-family=\"{}\" font-size=\"{:.2}\" fill=\"{}\">{}</text>",
            b.right() - 5.0,
            b.y - 5.0,
            escape_xml(&theme.mono_font_family),
            fonts.group_label,
            escape_xml(color),
            escape_xml(&group.id)
        ));
    }

    let interaction = &scene.config().interaction;
    for edge in &topology.edges {
        let Some((from, to)) = scene.edge_endpoints(edge) else {
            continue;
        };
        let style = scene.edge_emphasis(&edge.id).style(interaction);
        svg.push_str(&format!(
            "<line id=\"line-{}\" class=\"connection-line\" x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"{:.2}\" stroke-opacity=\"{:.2}\" stroke-dasharray=\"{}\"/>",
            escape_xml(&edge.id),
            from.x,
            from.y,
            to.x,
            to.y,
            theme.edge_color(edge.channel_kind),
            style.width,
            style.opacity,
            theme.edge_dasharray(edge.channel_kind)
        ));
    }

    for instance in &topology.nodes {
        let Some(node) = layout.node(&instance.id) else {
            continue;
        };
        svg.push_str(&node_svg(scene, instance, node, layout, theme));
    }

    for instance in &topology.nodes {
        let Some(node) = layout.node(&instance.id) else {
            continue;
        };
        svg.push_str(&labels_svg(instance, node, layout, theme));
    }

    svg.push_str("</svg>");
    svg
}

fn node_svg(scene: &Scene, instance: &Instance, node: &NodeLayout, layout: &Layout, theme: &Theme) -> String {
    let metrics = &layout.metrics;
    let state = scene.node_state(&instance.id);
    let fill = instance
        .color
        .as_deref()
        .unwrap_or_else(|| theme.role_color(instance.role));
    let filter = if state == NodeInteraction::Hovering {
        " filter=\"url(#glow)\""
    } else {
        ""
    };
    let class = match state {
        NodeInteraction::Dragging => "instance dragging",
        _ => "instance",
    };
    format!(
        "<g id=\"node-{id}\" class=\"{class}\" data-id=\"{id}\" transform=\"translate({:.2}, {:.2}) scale({})\"{filter}><circle r=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{:.2}\"/><text text-anchor=\"middle\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{:.2}\" font-weight=\"bold\" fill=\"{}\">{}</text></g>",
        node.position.x,
        node.position.y,
        scene.node_scale(&instance.id),
        metrics.node_radius,
        escape_xml(fill),
        theme.node_stroke,
        metrics.stroke_width,
        escape_xml(&theme.font_family),
        metrics.fonts.instance_icon,
        theme.node_text_color,
        instance.role.abbreviation(),
        id = escape_xml(&instance.id),
    )
}

fn labels_svg(instance: &Instance, node: &NodeLayout, layout: &Layout, theme: &Theme) -> String {
    let fonts = &layout.metrics.fonts;
    let labels = &node.labels;
    let id = escape_xml(&instance.id);
    let mut out = String::new();
    out.push_str(&text_svg(
        &format!("label-name-{id}"),
        labels.name.x,
        labels.name.y,
        &theme.font_family,
        fonts.instance_label,
        &theme.label_color,
        &theme.label_halo,
        &instance.display_name,
    ));
    if let (Some(port), Some(anchor)) = (instance.port, labels.port) {
        out.push_str(&text_svg(
            &format!("label-port-{id}"),
            anchor.x,
            anchor.y,
            &theme.mono_font_family,
            fonts.port_label,
            &theme.port_label_color,
            &theme.label_halo,
            &format!(":{port}"),
        ));
    }
    out.push_str(&text_svg(
        &format!("label-ip-{id}"),
        labels.address.x,
        labels.address.y,
        &theme.mono_font_family,
        fonts.address_label,
        &theme.address_label_color,
        &theme.label_halo,
        &instance.address,
    ));
    out
}

#[allow(clippy::too_many_arguments)]
fn text_svg(id: &str, x: f32, y: f32, family: &str, size: f32, fill: &str, halo: &str, text: &str) -> String {
    format!(
        "<text id=\"{id}\" x=\"{x:.2}\" y=\"{y:.2}\" text-anchor=\"middle\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{size:.2}\" fill=\"{fill}\" stroke=\"{halo}\" stroke-width=\"3\" paint-order=\"stroke\">{}</text>",
        escape_xml(family),
        escape_xml(text)
    )
}

/// Static placeholder shown when the scene cannot be built.
pub fn render_fallback_svg(width: f32, height: f32, theme: &Theme) -> String {
    let sane = |v: f32, default: f32| if v.is_finite() && v > 0.0 { v.max(200.0) } else { default };
    let width = sane(width, 1200.0);
    let height = sane(height, 800.0);
    let cx = width / 2.0;
    let cy = height / 2.0;
    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));
    let family = escape_xml(&theme.font_family);
    svg.push_str(&format!(
        "<text x=\"{cx:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{family}\" font-size=\"18\" font-weight=\"bold\" fill=\"{}\">{}</text>",
        cy - 24.0,
        theme.vpc_label_color,
        FALLBACK_TITLE
    ));
    svg.push_str(&format!(
        "<text x=\"{cx:.2}\" y=\"{cy:.2}\" text-anchor=\"middle\" font-family=\"{family}\" font-size=\"14\" fill=\"{}\">{}</text>",
        theme.vpc_label_color, FALLBACK_SUBTITLE
    ));
    svg.push_str(&format!(
        "<text x=\"{cx:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{family}\" font-size=\"12\" fill=\"{}\">{}</text>",
        cy + 24.0,
        theme.vpc_label_color,
        FALLBACK_NOTE
    ));
    svg.push_str("</svg>");
    svg
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig, theme: &Theme) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = theme
        .font_family
        .split(',')
        .next()
        .map(str::trim)
        .unwrap_or("Inter")
        .to_string();
    let default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .or_else(|| usvg::Size::from_wh(1200.0, 800.0))
        .ok_or_else(|| anyhow::anyhow!("Invalid render size"))?;
    opt.default_size = default_size;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig, _theme: &Theme) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::ir::Topology;
    use crate::layout::SeededRandom;
    use std::time::Duration;

    fn scene() -> Scene {
        Scene::with_random(
            Topology::builtin().unwrap(),
            Config::default(),
            1200.0,
            800.0,
            Box::new(SeededRandom::new(11)),
        )
        .unwrap()
    }

    #[test]
    fn render_svg_draws_every_element() {
        let scene = scene();
        let svg = render_svg(&scene, &Theme::classic());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("vpc-frizzlesrubric (172.31.0.0/16)"));
        assert!(svg.contains("Private Subnet (Main)"));
        assert!(svg.contains("id=\"sg-sg-private\""));
        assert_eq!(svg.matches("class=\"connection-line\"").count(), 17);
        assert_eq!(svg.matches("<circle").count(), 10);
        assert!(svg.contains("id=\"label-name-bastion\""));
        assert!(svg.contains("id=\"label-ip-bastion\""));
        assert!(!svg.contains("id=\"label-port-bastion\""));
        assert!(svg.contains("id=\"label-port-clarity\""));
        assert!(svg.contains(":8003"));
        assert!(svg.contains(">SSH<"));
        assert!(svg.contains("stroke-dasharray=\"5,5\""));
    }

    #[test]
    fn render_reflects_interaction_state() {
        let mut scene = scene();
        scene.pointer_enter("clarity");
        let svg = render_svg(&scene, &Theme::classic());
        assert!(svg.contains("filter=\"url(#glow)\""));
        assert!(svg.contains("scale(1.1)"));
        assert!(svg.contains("stroke-opacity=\"0.80\""));

        scene.pointer_leave("clarity");
        scene.highlight_all(Duration::ZERO);
        let svg = render_svg(&scene, &Theme::classic());
        assert!(!svg.contains("filter=\"url(#glow)\""));
        assert!(!svg.contains("stroke-opacity=\"0.40\""));
    }

    #[test]
    fn background_comes_from_render_config() {
        let mut config = Config::default();
        config.render.background = "#101820".to_string();
        let scene = Scene::with_random(
            Topology::builtin().unwrap(),
            config,
            1200.0,
            800.0,
            Box::new(SeededRandom::new(11)),
        )
        .unwrap();
        let svg = render_svg(&scene, &Theme::classic());
        assert!(svg.contains("<rect width=\"100%\" height=\"100%\" fill=\"#101820\"/>"));
    }

    #[test]
    fn group_label_sits_at_top_right() {
        let scene = scene();
        let group = scene
            .layout()
            .groups
            .iter()
            .find(|group| group.id == "sg-private")
            .unwrap();
        let expected = format!(
            "<text class=\"sg-label\" x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"end\"",
            group.bounds.right() - 5.0,
            group.bounds.y - 5.0
        );
        let svg = render_svg(&scene, &Theme::classic());
        assert!(svg.contains(&expected), "missing {expected}");
    }

    #[test]
    fn fallback_svg_shows_message() {
        let svg = render_fallback_svg(f32::NAN, 0.0, &Theme::classic());
        assert!(svg.contains("width=\"1200\""));
        assert!(svg.contains(FALLBACK_TITLE));
        assert!(svg.contains(FALLBACK_SUBTITLE));
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_xml("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
    }
}
