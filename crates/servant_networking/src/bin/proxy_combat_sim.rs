//! # Proxy Combat Simulation
//!
//! End-to-end run of the interception path with real threads:
//!
//! 1. An I/O thread splits raw wire frames into packets and feeds them
//!    through the [`PacketHandler`]; frames of unknown type are rejected
//! 2. Hits on servant proxies cross a bounded [`CombatQueue`]
//! 3. The simulation loop drains the queue each tick and resolves combat
//!
//! Exits non-zero if any proxy dies more than once, a removed proxy is still
//! listed, or the notification count doesn't match the deaths.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use servant_core::{EntityId, TICKS_PER_SECOND};
use servant_networking::{
    BasicProxy, CombatOutcome, CombatQueue, CombatResolver, InboundPacket, InteractEntity,
    MockNotifier, PacketEvent, PacketHandler, PacketType, ProxyEntity, ProxyRegistry,
    ProxyRoster, DEFAULT_COMBAT_QUEUE_CAPACITY,
};

const PLAYERS: i32 = 32;
const PROXIES: usize = 48;
const PROXY_HEALTH: f64 = 20.0;
const PACKETS: usize = 200_000;
const TICK: Duration = Duration::from_millis(1000 / TICKS_PER_SECOND);

/// Linear congruential generator; deterministic traffic without extra deps.
struct Lcg(u64);

impl Lcg {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
        self.0 >> 33
    }

    fn below(&mut self, bound: usize) -> usize {
        (self.next_u64() % bound as u64) as usize
    }
}

fn main() {
    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║              SERVANT PROXY COMBAT SIMULATION                     ║");
    println!("╠══════════════════════════════════════════════════════════════════╣");
    println!("║  Players: {PLAYERS:<6}  Proxies: {PROXIES:<6}  Packets: {PACKETS:<10}         ║");
    println!("║                                                                  ║");
    println!("║  Flow: I/O thread → PacketHandler → CombatQueue → Sim tick       ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");

    let roster = Arc::new(ProxyRoster::new());
    let notifier = Arc::new(MockNotifier::new());
    let proxy_ids: Vec<EntityId> = (0..PROXIES)
        .map(|i| {
            let owner = EntityId::new(i as i32 % PLAYERS);
            let proxy = BasicProxy::spawn(owner, PROXY_HEALTH);
            roster.add(proxy.clone());
            proxy.id()
        })
        .collect();

    let (queue, requests) = CombatQueue::bounded(DEFAULT_COMBAT_QUEUE_CAPACITY);
    let handler = Arc::new(PacketHandler::new(roster.clone(), queue));
    let resolver = CombatResolver::new(roster.clone(), notifier.clone());

    let started = Instant::now();
    let io = {
        let handler = Arc::clone(&handler);
        let proxy_ids = proxy_ids.clone();
        thread::spawn(move || {
            let mut rng = Lcg(0xC0FF_EE00);
            let mut rejected = 0usize;
            for _ in 0..PACKETS {
                let player = EntityId::new((rng.below(PLAYERS as usize)) as i32);
                let frame = match rng.below(20) {
                    0..=5 => {
                        let target = proxy_ids[rng.below(proxy_ids.len())];
                        InboundPacket::interact(InteractEntity::attack(target)).to_frame()
                    }
                    6..=9 => {
                        let target = EntityId::new(rng.below(50_000) as i32);
                        InboundPacket::interact(InteractEntity::attack(target)).to_frame()
                    }
                    10..=11 => InboundPacket::new(PacketType::InteractEntity, vec![0; 2]).to_frame(),
                    12 => vec![0xFF, 1, 2, 3],
                    _ => InboundPacket::new(PacketType::Movement, vec![0; 24]).to_frame(),
                };
                match InboundPacket::from_frame(&frame) {
                    Ok(packet) => {
                        let mut event = PacketEvent::new(player, packet);
                        handler.on_packet_receiving(&mut event);
                    }
                    Err(_) => rejected += 1,
                }
            }
            rejected
        })
    };

    let mut ticks = 0u64;
    let mut damaged = 0usize;
    let mut defeated = 0usize;
    let mut ignored = 0usize;
    loop {
        let io_done = io.is_finished();
        for outcome in resolver.drain(&requests) {
            match outcome {
                CombatOutcome::Damaged { .. } => damaged += 1,
                CombatOutcome::Defeated => defeated += 1,
                CombatOutcome::SelfHit | CombatOutcome::AlreadyDefeated => ignored += 1,
            }
        }
        ticks += 1;
        if io_done && requests.is_empty() {
            break;
        }
        thread::sleep(TICK);
    }
    let io_result = io.join();
    let rejected = io_result.as_ref().copied().unwrap_or(0);
    let elapsed = started.elapsed();

    let stats = handler.stats();
    let survivors = roster.proxies();
    let dead_still_listed = survivors
        .iter()
        .filter(|p| ProxyEntity::health(p.as_ref()) <= 0.0)
        .count();
    let notifications = notifier.sent().len();

    println!();
    println!("┌─────────────────────────── RESULTS ──────────────────────────────┐");
    println!("│  Elapsed:            {:>10.2?}                                  │", elapsed);
    println!("│  Sim ticks:          {ticks:>10}                                  │");
    println!("│  Frames rejected:    {rejected:>10}                                  │");
    println!("│  Packets seen:       {:>10}                                  │", stats.packets_seen);
    println!("│  Interactions:       {:>10}                                  │", stats.interactions);
    println!("│  Malformed:          {:>10}                                  │", stats.malformed);
    println!("│  Proxy hits:         {:>10}                                  │", stats.proxy_hits);
    println!("│  Dropped (queue):    {:>10}                                  │", stats.dispatch_failures);
    println!("│  Damaged:            {damaged:>10}                                  │");
    println!("│  Defeated:           {defeated:>10}                                  │");
    println!("│  Ignored:            {ignored:>10}                                  │");
    println!("│  Proxies left:       {:>10}                                  │", survivors.len());
    println!("└──────────────────────────────────────────────────────────────────┘");

    let checks = [
        ("I/O thread finished cleanly", io_result.is_ok()),
        ("every frame decoded or rejected", stats.packets_seen + rejected as u64 == PACKETS as u64),
        ("every death removed exactly one proxy", survivors.len() + defeated == PROXIES),
        ("no dead proxy left listed", dead_still_listed == 0),
        ("two notifications per death", notifications == defeated * 2),
    ];

    let mut passed = true;
    for (name, ok) in checks {
        println!("  [{}] {name}", if ok { "PASS" } else { "FAIL" });
        passed &= ok;
    }

    if passed {
        println!("\n✅ ALL CHECKS PASSED");
        std::process::exit(0);
    } else {
        println!("\n❌ CHECKS FAILED");
        std::process::exit(1);
    }
}
