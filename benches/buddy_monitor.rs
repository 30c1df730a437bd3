// Copyright 2026 Dissent Contributors.
//
// This file is licensed under the GNU General Public License v3.0 or later
// <https://www.gnu.org/licenses/gpl-3.0.html>. This file may not be copied,
// modified, or distributed except according to that license.

//! Benchmarks the `n * n` bit-vector bookkeeping in `BuddyMonitor`
//! (spec.md §4.4): `should_reveal_nyms`'s tentative-reveal-then-rollback
//! walk is the hot path on every round's anonymity-set update, and its
//! cost is quadratic in group size.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use dissent::anonymity::buddies::{BuddyPolicy, StaticBuddyPolicy};
use dissent::anonymity::buddy_monitor::BuddyMonitor;

fn monitor_with_some_offline(count: usize, set_size: usize) -> BuddyMonitor {
    let mut policy = BuddyPolicy::Static(StaticBuddyPolicy::by_id(count, set_size));
    let online: Vec<bool> = (0..count).map(|i| i % 5 != 0).collect();
    policy.set_online_members(online, 0);
    BuddyMonitor::new(policy, set_size)
}

fn bench_should_reveal_nyms(c: &mut Criterion) {
    let mut group = c.benchmark_group("buddy_monitor_should_reveal_nyms");
    for &count in &[16usize, 64, 256] {
        let monitor = monitor_with_some_offline(count, 4);
        let candidates: Vec<bool> = (0..count).map(|i| i % 2 == 0).collect();

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| monitor.should_reveal_nyms(&candidates))
        });
    }
    group.finish();
}

fn bench_set_active_nyms(c: &mut Criterion) {
    let mut group = c.benchmark_group("buddy_monitor_set_active_nyms");
    for &count in &[16usize, 64, 256] {
        let revealed: Vec<bool> = (0..count).map(|i| i % 3 == 0).collect();

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| {
                let mut monitor = monitor_with_some_offline(count, 4);
                monitor.set_active_nyms(&revealed);
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_should_reveal_nyms, bench_set_active_nyms);
criterion_main!(benches);
