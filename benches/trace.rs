use criterion::{black_box, criterion_group, criterion_main, Criterion};
use optibench::{simulate, trace, Component, ComponentKind, ComponentType, Setup};

fn part(id: &str, t: ComponentType, x: f64, y: f64, rotation: f64) -> Component {
    Component::new(id, ComponentKind::defaults(t), x, y, rotation)
}

fn michelson() -> Setup {
    Setup::new(vec![
        part("laser", ComponentType::Laser, 8.0, 12.0, 0.0),
        part("bs", ComponentType::Beamsplitter, 15.0, 12.0, 45.0),
        part("m1", ComponentType::Mirror, 15.0, 5.0, 90.0),
        part("m2", ComponentType::Mirror, 22.0, 12.0, 180.0),
        part("det", ComponentType::Detector, 15.0, 19.0, 270.0),
    ])
}

/// Splitters on a diagonal lattice with several lasers feeding it.
fn splitter_lattice() -> Setup {
    let mut components = Vec::new();
    for row in 0..4 {
        components.push(part(&format!("laser{}", row), ComponentType::Laser, 0.0, 3.0 + 5.0 * row as f64, 0.0));
    }
    for row in 0..4 {
        for col in 0..6 {
            let rotation = if (row + col) % 2 == 0 { 45.0 } else { 135.0 };
            components.push(part(
                &format!("bs{}-{}", row, col),
                ComponentType::Beamsplitter,
                5.0 + 5.0 * col as f64,
                3.0 + 5.0 * row as f64,
                rotation,
            ));
        }
    }
    Setup::new(components)
}

fn bench_trace(c: &mut Criterion) {
    let michelson = michelson();
    c.bench_function("trace_michelson", |b| b.iter(|| trace(black_box(&michelson))));

    let lattice = splitter_lattice();
    c.bench_function("trace_splitter_lattice", |b| b.iter(|| trace(black_box(&lattice))));

    let mut traced = splitter_lattice();
    traced.rays = trace(&traced);
    c.bench_function("simulate_splitter_lattice", |b| b.iter(|| simulate(black_box(&traced))));
}

criterion_group!(benches, bench_trace);
criterion_main!(benches);
