//! # Interceptor Benchmark
//!
//! The handler runs on every inbound packet, so the cost that matters is
//! the miss path: traffic that is not for a proxy.
//!
//! Measures:
//! 1. Non-interaction traffic (type check only)
//! 2. Interactions with real entities, scanned against N proxies
//! 3. Proxy hits handed to the combat queue

#![allow(missing_docs)]
#![allow(dead_code)]

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use servant_core::EntityId;
use servant_networking::{
    BasicProxy, CombatQueue, InboundPacket, InteractEntity, PacketEvent, PacketHandler,
    PacketType, ProxyRoster,
};

const PACKETS: usize = 10_000;

fn roster_with(proxies: usize) -> (Arc<ProxyRoster>, Vec<EntityId>) {
    let roster = Arc::new(ProxyRoster::new());
    let ids = (0..proxies)
        .map(|i| {
            let proxy = BasicProxy::spawn(EntityId::new(i as i32), 20.0);
            roster.add(proxy.clone());
            proxy.id()
        })
        .collect();
    (roster, ids)
}

/// Deterministic real-entity ids, well below the synthetic range.
fn real_targets(count: usize, seed: u64) -> Vec<EntityId> {
    let mut state = seed;
    (0..count)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            EntityId::new((state % 100_000) as i32)
        })
        .collect()
}

// =============================================================================
// MISS PATH
// =============================================================================

fn bench_passthrough(c: &mut Criterion) {
    let (roster, _) = roster_with(64);
    let (queue, _requests) = CombatQueue::unbounded();
    let handler = PacketHandler::new(roster, queue);
    let packet = InboundPacket::new(PacketType::Movement, vec![0; 24]);

    c.bench_function("passthrough_movement_10k", |b| {
        b.iter(|| {
            for _ in 0..PACKETS {
                let mut event = PacketEvent::new(EntityId::new(1), packet.clone());
                black_box(handler.on_packet_receiving(&mut event));
            }
        });
    });
}

fn bench_interaction_miss(c: &mut Criterion) {
    let mut group = c.benchmark_group("interaction_miss_10k");
    let targets = real_targets(PACKETS, 0x5EED);

    for proxies in [1usize, 16, 256] {
        let (roster, _) = roster_with(proxies);
        let (queue, _requests) = CombatQueue::unbounded();
        let handler = PacketHandler::new(roster, queue);

        group.bench_with_input(BenchmarkId::from_parameter(proxies), &targets, |b, targets| {
            b.iter(|| {
                for &target in targets {
                    let mut event = PacketEvent::new(
                        EntityId::new(1),
                        InboundPacket::interact(InteractEntity::attack(target)),
                    );
                    black_box(handler.on_packet_receiving(&mut event));
                }
            });
        });
    }
    group.finish();
}

// =============================================================================
// HIT PATH
// =============================================================================

fn bench_proxy_hit(c: &mut Criterion) {
    let (roster, ids) = roster_with(16);
    let (queue, requests) = CombatQueue::unbounded();
    let handler = PacketHandler::new(roster, queue);
    let target = ids[ids.len() / 2];

    c.bench_function("proxy_hit_enqueue", |b| {
        b.iter(|| {
            let mut event = PacketEvent::new(
                EntityId::new(99_999),
                InboundPacket::interact(InteractEntity::attack(target)),
            );
            black_box(handler.on_packet_receiving(&mut event));
            // Keep the channel from growing across iterations.
            while requests.try_recv().is_ok() {}
        });
    });
}

criterion_group!(benches, bench_passthrough, bench_interaction_miss, bench_proxy_hit);
criterion_main!(benches);
