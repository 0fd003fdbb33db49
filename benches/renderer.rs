use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use infraviz::config::{Config, LayoutConfig};
use infraviz::layout::{SeededRandom, Viewport, compute_layout};
use infraviz::render::render_svg;
use infraviz::{Scene, Topology};
use std::hint::black_box;

/// A coordinator fanning out to `evaluators` compute nodes, plus a gateway
/// with an ssh edge to everything in the private region.
fn synthetic_topology(evaluators: usize) -> Topology {
    let mut nodes = vec![
        r#"{ "id": "gw", "displayName": "Gateway", "role": "gateway", "region": "edge", "address": "10.0.0.10" }"#
            .to_string(),
        r#"{ "id": "hub", "displayName": "Hub", "role": "coordinator", "region": "core", "address": "10.0.1.10", "port": 8000 }"#
            .to_string(),
    ];
    let mut edges = vec![r#"{ "sourceId": "gw", "targetId": "hub", "channelKind": "ssh", "port": 22 }"#.to_string()];
    for i in 0..evaluators {
        nodes.push(format!(
            r#"{{ "id": "ev{i}", "displayName": "Evaluator {i}", "role": "compute-evaluator", "region": "core", "address": "10.0.1.{}", "port": {} }}"#,
            20 + i % 200,
            8001 + i
        ));
        edges.push(format!(
            r#"{{ "sourceId": "hub", "targetId": "ev{i}", "channelKind": "api", "port": {} }}"#,
            8001 + i
        ));
        edges.push(format!(
            r#"{{ "sourceId": "gw", "targetId": "ev{i}", "channelKind": "ssh", "port": 22 }}"#
        ));
    }
    let input = format!(
        r#"{{
  "network": {{ "id": "vpc-bench", "cidr": "10.0.0.0/16", "regions": [
    {{ "id": "edge", "access": "public", "cidr": "10.0.0.0/24" }},
    {{ "id": "core", "access": "private", "cidr": "10.0.1.0/24" }}
  ] }},
  "nodes": [{}],
  "edges": [{}]
}}"#,
        nodes.join(","),
        edges.join(",")
    );
    Topology::from_json_str(&input).expect("synthetic topology")
}

const VIEWPORTS: [(f32, f32); 4] = [(1200.0, 800.0), (600.0, 800.0), (1920.0, 1080.0), (400.0, 300.0)];

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let topology = Topology::builtin().expect("builtin topology");
    let config = LayoutConfig::default();
    for (width, height) in VIEWPORTS {
        group.bench_with_input(
            BenchmarkId::new("builtin", format!("{width}x{height}")),
            &Viewport::new(width, height),
            |b, viewport| {
                b.iter(|| {
                    let mut rng = SeededRandom::new(7);
                    let layout = compute_layout(black_box(&topology), *viewport, &config, &mut rng);
                    black_box(layout.nodes.len());
                });
            },
        );
    }
    for evaluators in [12usize, 30, 60] {
        let topology = synthetic_topology(evaluators);
        group.bench_with_input(BenchmarkId::new("crowded", evaluators), &topology, |b, topology| {
            b.iter(|| {
                let mut rng = SeededRandom::new(7);
                let layout = compute_layout(black_box(topology), Viewport::new(1200.0, 800.0), &config, &mut rng);
                black_box(layout.nodes.len());
            });
        });
    }
    group.finish();
}

fn bench_drag(c: &mut Criterion) {
    let mut group = c.benchmark_group("drag");
    for (name, topology) in [("builtin", Topology::builtin().expect("builtin topology")), ("crowded_30", synthetic_topology(30))] {
        let mut scene = Scene::with_random(topology, Config::default(), 1200.0, 800.0, Box::new(SeededRandom::new(3)))
            .expect("scene");
        let id = if name == "builtin" { "orchestrator" } else { "hub" };
        scene.begin_drag(id);
        group.bench_function(BenchmarkId::from_parameter(name), |b| {
            let mut step = 0u32;
            b.iter(|| {
                step = step.wrapping_add(1);
                let x = 600.0 + (step % 400) as f32;
                let y = 100.0 + (step % 500) as f32;
                let updates = scene.drag_to(id, black_box(x), black_box(y));
                black_box(updates.len());
            });
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let config = Config::default();
    for (width, height) in VIEWPORTS {
        let scene = Scene::with_random(
            Topology::builtin().expect("builtin topology"),
            config.clone(),
            width,
            height,
            Box::new(SeededRandom::new(11)),
        )
        .expect("scene");
        group.bench_with_input(BenchmarkId::from_parameter(format!("{width}x{height}")), &scene, |b, scene| {
            b.iter(|| {
                let svg = render_svg(black_box(scene), &config.theme);
                black_box(svg.len());
            });
        });
    }
    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("end_to_end");
    for evaluators in [6usize, 30] {
        let topology = synthetic_topology(evaluators);
        group.bench_with_input(BenchmarkId::from_parameter(evaluators), &topology, |b, topology| {
            b.iter(|| {
                let svg = infraviz::render_topology(black_box(topology.clone()), Config::default(), Some(5))
                    .expect("render");
                black_box(svg.len());
            });
        });
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_layout, bench_drag, bench_render, bench_end_to_end
);
criterion_main!(benches);
