// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the folio-document crate.
// Currently benchmarks outline visibility reduction on a synthetic tree.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use folio_core::BookmarkLevel;
use folio_document::{OutlineItem, apply_level};

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// A full tree `depth` levels deep with `fanout` children per item.
fn synthetic_forest(depth: usize, fanout: usize) -> Vec<OutlineItem> {
    fn level(prefix: &str, remaining: usize, fanout: usize) -> Vec<OutlineItem> {
        (0..fanout)
            .map(|i| {
                let title = format!("{prefix}.{i}");
                let children = if remaining > 1 {
                    level(&title, remaining - 1, fanout)
                } else {
                    Vec::new()
                };
                OutlineItem::new(title.clone())
                    .with_children(children)
                    .with_open(true)
            })
            .collect()
    }
    level("ch", depth, fanout)
}

/// Reduce a 5-level, 6-way outline (9330 items) at a few levels.
///
/// The tree is cloned on every iteration so each run starts fully expanded.
fn bench_apply_level(c: &mut Criterion) {
    let forest = synthetic_forest(5, 6);

    for level in [0, 1, 3] {
        let level = BookmarkLevel::new(level).unwrap_or_default();
        c.bench_function(&format!("apply_level ({level}, 9330 items)"), |b| {
            b.iter(|| {
                let mut forest = black_box(forest.clone());
                apply_level(&mut forest, level);
                black_box(forest);
            });
        });
    }
}

criterion_group!(benches, bench_apply_level);
criterion_main!(benches);
