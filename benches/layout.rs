use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use lanegraph::GraphConfig;
use lanegraph::graph::GraphEngine;
use lanegraph::protocol::CommitDescriptor;
use lanegraph::scene::SvgSurface;

/// Branchy history shaped like a busy repository: short first-parent hops
/// with a second parent merged in every few commits.
fn synthetic_history(count: usize) -> Vec<CommitDescriptor> {
    let mut state = 0x9E37_79B9_7F4A_7C15u64;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };

    let mut parents: Vec<Vec<usize>> = vec![Vec::new(); count];
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); count];
    for i in 0..count {
        let first = i + 1 + (next() % 3) as usize;
        if first < count {
            parents[i].push(first);
            children[first].push(i);
        }
        if next() % 5 == 0 {
            let second = i + 2 + (next() % 20) as usize;
            if second < count && parents[i].first() != Some(&second) {
                parents[i].push(second);
                children[second].push(i);
            }
        }
    }

    (0..count)
        .map(|i| CommitDescriptor {
            sha: format!("{i:07x}"),
            parent_shas: parents[i].iter().map(|p| format!("{p:07x}")).collect(),
            child_shas: children[i].iter().map(|c| format!("{c:07x}")).collect(),
            summary: format!("change {i}"),
            row_pixel_y: None,
        })
        .collect()
}

fn prepend_batch(old_tip: &str, count: usize) -> Vec<CommitDescriptor> {
    (0..count)
        .map(|i| {
            let parent = if i + 1 < count {
                format!("new{}", i + 1)
            } else {
                old_tip.to_string()
            };
            CommitDescriptor {
                sha: format!("new{i}"),
                parent_shas: vec![parent],
                child_shas: if i > 0 {
                    vec![format!("new{}", i - 1)]
                } else {
                    Vec::new()
                },
                summary: format!("incoming {i}"),
                row_pixel_y: None,
            }
        })
        .collect()
}

fn bench_layout_full(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout_full");
    for count in [1_000usize, 5_000, 10_000] {
        let commits = synthetic_history(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &commits, |b, commits| {
            b.iter(|| {
                let mut engine = GraphEngine::new(GraphConfig::default());
                engine.layout_full(black_box(commits), &[]);
                black_box(engine.rows().len());
            });
        });
    }
    group.finish();
}

fn bench_incremental_prepend(c: &mut Criterion) {
    let mut group = c.benchmark_group("incremental_prepend");
    let commits = synthetic_history(10_000);
    let batch = prepend_batch("0000000", 8);
    group.bench_function("batch_of_8_onto_10k", |b| {
        b.iter_batched(
            || {
                let mut engine = GraphEngine::new(GraphConfig::default());
                engine.resize(800.0);
                engine.layout_full(&commits, &[]);
                engine
            },
            |mut engine| {
                engine.layout_incremental_add(black_box(&batch));
                black_box(engine.rows().len());
            },
            BatchSize::LargeInput,
        );
    });
    group.finish();
}

fn bench_scroll_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("scroll");
    let commits = synthetic_history(10_000);
    let mut engine = GraphEngine::new(GraphConfig::default());
    engine.resize(800.0);
    engine.layout_full(&commits, &[]);
    group.bench_function("wheel_step_over_10k", |b| {
        b.iter(|| {
            engine.on_scroll(black_box(24.0));
            engine.on_scroll(black_box(-24.0));
        });
    });
    group.finish();
}

fn bench_render_window(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let commits = synthetic_history(10_000);
    let mut engine = GraphEngine::new(GraphConfig::default());
    engine.resize(800.0);
    engine.layout_full(&commits, &[]);
    let (width, _) = engine.content_size();
    group.bench_function("svg_window_of_10k", |b| {
        b.iter(|| {
            let mut surface = SvgSurface::new(width, 800.0);
            engine.render(&mut surface);
            black_box(surface.document().len());
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_layout_full,
    bench_incremental_prepend,
    bench_scroll_step,
    bench_render_window
);
criterion_main!(benches);
