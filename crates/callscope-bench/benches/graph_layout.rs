use callscope_bench::util::hub_call_graph;
use callscope_graph::{ForceLayouter, ForceSimulation, GraphModel, LayoutConfig, Layouter};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn bench_force_layout_hub(c: &mut Criterion) {
    let graph = hub_call_graph(200);
    let model =
        GraphModel::for_selection(&graph, "hub.py", "hub").expect("hub function is in the graph");
    let layouter = ForceLayouter::default();

    c.bench_function("force_layout_hub_401_nodes", |b| {
        b.iter(|| {
            let positions = layouter.execute(black_box(&model));
            black_box(positions);
        })
    });
}

fn bench_single_tick(c: &mut Criterion) {
    let graph = hub_call_graph(1000);
    let model =
        GraphModel::for_selection(&graph, "hub.py", "hub").expect("hub function is in the graph");
    let mut simulation = ForceSimulation::new(model, LayoutConfig::default());

    c.bench_function("force_tick_2001_nodes", |b| {
        b.iter(|| {
            simulation.tick();
            black_box(simulation.alpha());
        })
    });
}

criterion_group!(benches, bench_force_layout_hub, bench_single_tick);
criterion_main!(benches);
