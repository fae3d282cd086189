use criterion::{black_box, criterion_group, criterion_main, Criterion};

use tui_roadmap::braille::BrailleLayers;
use tui_roadmap::config::RenderConfig;
use tui_roadmap::data::sample_network;
use tui_roadmap::geo::GeoPosition;
use tui_roadmap::map::trig::sincos;
use tui_roadmap::map::{MapRenderer, NoPlugin, ProjectionContext};
use tui_roadmap::style::StyleSheet;

fn bench_sincos(c: &mut Criterion) {
    c.bench_function("sincos full turn", |b| {
        b.iter(|| {
            let mut sum = 0i64;
            for angle in -180..180 {
                let (s, c) = sincos(black_box(angle));
                sum += (s ^ c) as i64;
            }
            sum
        })
    });
}

fn bench_clip_segment(c: &mut Criterion) {
    let mut ctx = ProjectionContext::new(&RenderConfig::default());
    ctx.set_size(400, 400);
    let inside = GeoPosition::new(100, -200);
    let outside = GeoPosition::new(90_000, 45_000);

    c.bench_function("clip_segment crossing", |b| {
        b.iter(|| ctx.clip_segment(black_box(&inside), black_box(&outside)))
    });
}

fn bench_repaint(c: &mut Criterion) {
    let config = RenderConfig::default();
    let center = GeoPosition::from_degrees(-81.38, 28.54);
    let mut style = StyleSheet::road_defaults(config.projection_areas);
    let map = sample_network(center, &style);

    let mut ctx = ProjectionContext::new(&config);
    ctx.set_size(320, 160);
    ctx.set_context(center, 200);
    style.adjust(&ctx);

    let mut renderer = MapRenderer::new(&config);
    let mut layers = BrailleLayers::new(160, 40, &style);

    c.bench_function("repaint sample city", |b| {
        b.iter(|| renderer.repaint_now(&mut ctx, &map, &style, &NoPlugin, &mut layers, false))
    });

    ctx.set_horizon(config.horizon);
    c.bench_function("repaint sample city 3d", |b| {
        b.iter(|| renderer.repaint_now(&mut ctx, &map, &style, &NoPlugin, &mut layers, false))
    });
}

criterion_group!(benches, bench_sincos, bench_clip_segment, bench_repaint);
criterion_main!(benches);
