//! # Combat Hand-off Integration Test
//!
//! Drives hits from an I/O thread through the interceptor and combat queue,
//! then resolves them on the "simulation" side.

use std::sync::{Arc, Barrier};
use std::thread;

use servant_core::EntityId;
use servant_networking::{
    BasicProxy, CombatOutcome, CombatQueue, CombatResolver, InboundPacket, InteractEntity,
    MockNotifier, NetworkError, PacketEvent, PacketHandler, PacketType, ProxyEntity,
    ProxyRegistry, ProxyRoster, ProxyState, ACTOR_DEFEAT_MESSAGE, OWNER_DEFEAT_MESSAGE,
};

const OWNER: EntityId = EntityId::new(10);
const ATTACKER: EntityId = EntityId::new(20);

#[test]
fn test_hits_from_io_thread_resolve_on_sim_thread() {
    let roster = Arc::new(ProxyRoster::new());
    let notifier = Arc::new(MockNotifier::new());
    let victim = BasicProxy::spawn(OWNER, 3.0);
    let bystander = BasicProxy::spawn(OWNER, 3.0);
    roster.add(victim.clone());
    roster.add(bystander.clone());

    let (queue, requests) = CombatQueue::unbounded();
    let handler = Arc::new(PacketHandler::new(roster.clone(), queue));

    let io = {
        let handler = Arc::clone(&handler);
        let target = victim.id();
        thread::spawn(move || {
            let mut consumed = 0;
            for i in 0..10 {
                let packet = if i % 2 == 0 {
                    InboundPacket::interact(InteractEntity::attack(target))
                } else {
                    InboundPacket::new(PacketType::KeepAlive, vec![])
                };
                let mut event = PacketEvent::new(ATTACKER, packet);
                handler.on_packet_receiving(&mut event);
                if event.is_handled() {
                    consumed += 1;
                }
            }
            consumed
        })
    };
    assert_eq!(io.join().unwrap(), 5);

    // Nothing mutated until the simulation side drains.
    assert_eq!(victim.state(), ProxyState::Alive);
    assert_eq!(roster.len(), 2);

    let resolver = CombatResolver::new(roster.clone(), notifier.clone());
    let outcomes = resolver.drain(&requests);
    assert_eq!(
        outcomes,
        vec![
            CombatOutcome::Damaged { remaining: 2.0 },
            CombatOutcome::Damaged { remaining: 1.0 },
            CombatOutcome::Defeated,
            CombatOutcome::AlreadyDefeated,
            CombatOutcome::AlreadyDefeated,
        ]
    );

    assert_eq!(roster.len(), 1);
    assert!(roster.proxies().iter().all(|p| !p.is_proxy_for(victim.id())));
    assert_eq!(bystander.state(), ProxyState::Alive);
    assert_eq!(
        notifier.sent(),
        vec![
            (OWNER, OWNER_DEFEAT_MESSAGE.to_string()),
            (ATTACKER, ACTOR_DEFEAT_MESSAGE.to_string()),
        ]
    );

    // Once removed, further attacks on the dead id reach the engine.
    let mut late = PacketEvent::new(ATTACKER, InboundPacket::interact(InteractEntity::attack(victim.id())));
    handler.on_packet_receiving(&mut late);
    assert!(!late.is_handled());

    let stats = handler.stats();
    assert_eq!(stats.packets_seen, 11);
    assert_eq!(stats.interactions, 6);
    assert_eq!(stats.proxy_hits, 5);
}

#[test]
fn test_owner_attacks_are_consumed_but_harmless() {
    let roster = Arc::new(ProxyRoster::new());
    let notifier = Arc::new(MockNotifier::new());
    let proxy = BasicProxy::spawn(OWNER, 1.0);
    roster.add(proxy.clone());

    let (queue, requests) = CombatQueue::bounded(servant_networking::DEFAULT_COMBAT_QUEUE_CAPACITY);
    let handler = PacketHandler::new(roster.clone(), queue);

    let mut event = PacketEvent::new(OWNER, InboundPacket::interact(InteractEntity::attack(proxy.id())));
    handler.on_packet_receiving(&mut event);
    assert!(event.is_handled());

    let resolver = CombatResolver::new(roster.clone(), notifier.clone());
    assert_eq!(resolver.drain(&requests), vec![CombatOutcome::SelfHit]);
    assert_eq!(proxy.state(), ProxyState::Alive);
    assert_eq!(roster.len(), 1);
    assert!(notifier.sent().is_empty());
}

#[test]
fn test_inline_resolver_as_dispatch() {
    let roster = Arc::new(ProxyRoster::new());
    let notifier = Arc::new(MockNotifier::new());
    let proxy = BasicProxy::spawn(OWNER, 1.0);
    roster.add(proxy.clone());

    let handler = PacketHandler::new(
        roster.clone(),
        CombatResolver::new(roster.clone(), notifier.clone()),
    );

    let mut event = PacketEvent::new(ATTACKER, InboundPacket::interact(InteractEntity::attack(proxy.id())));
    handler.on_packet_receiving(&mut event);

    assert!(event.is_handled());
    assert!(roster.is_empty());
    assert_eq!(notifier.sent().len(), 2);
}

/// Proxy whose damage step only proceeds once every attacker is in flight.
struct GatedProxy {
    inner: BasicProxy,
    gate: Barrier,
}

impl ProxyEntity for GatedProxy {
    fn entity_id(&self) -> EntityId {
        self.inner.entity_id()
    }

    fn owner(&self) -> EntityId {
        self.inner.owner()
    }

    fn health(&self) -> f64 {
        self.inner.health()
    }

    fn set_health(&self, health: f64) {
        self.inner.set_health(health);
    }

    fn apply_damage(&self, damage: f64) -> Option<(f64, f64)> {
        self.gate.wait();
        self.inner.apply_damage(damage)
    }
}

#[test]
fn test_simultaneous_inline_hits_defeat_once() {
    const ATTACKERS: usize = 4;

    let roster = Arc::new(ProxyRoster::new());
    let notifier = Arc::new(MockNotifier::new());
    let proxy = Arc::new(GatedProxy {
        inner: BasicProxy::new(PacketHandler::<CombatResolver>::next_entity_id(), OWNER, 1.0),
        gate: Barrier::new(ATTACKERS),
    });
    roster.add(proxy.clone());

    let handler = Arc::new(PacketHandler::new(
        roster.clone(),
        CombatResolver::new(roster.clone(), notifier.clone()),
    ));

    let target = proxy.entity_id();
    let handles: Vec<_> = (0..ATTACKERS)
        .map(|i| {
            let handler = Arc::clone(&handler);
            thread::spawn(move || {
                let attacker = EntityId::new(100 + i as i32);
                let mut event = PacketEvent::new(attacker, InboundPacket::interact(InteractEntity::attack(target)));
                handler.on_packet_receiving(&mut event);
                event.is_handled()
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }

    assert!(roster.is_empty());
    assert_eq!(proxy.state(), ProxyState::Dead);

    let sent = notifier.sent();
    assert_eq!(sent.len(), 2, "{sent:?}");
    assert_eq!(sent[0], (OWNER, OWNER_DEFEAT_MESSAGE.to_string()));
    assert_eq!(sent[1].1, ACTOR_DEFEAT_MESSAGE);
}

#[test]
fn test_wire_frames_reach_the_interceptor() {
    let roster = Arc::new(ProxyRoster::new());
    let proxy = BasicProxy::spawn(OWNER, 5.0);
    roster.add(proxy.clone());
    let (queue, requests) = CombatQueue::unbounded();
    let handler = PacketHandler::new(roster.clone(), queue);

    let frames = [
        InboundPacket::interact(InteractEntity::attack(proxy.id())).to_frame(),
        InboundPacket::new(PacketType::Chat, b"hi".to_vec()).to_frame(),
        vec![0xFF, 0, 0, 0, 0],
    ];

    let mut handled = Vec::new();
    let mut rejected = Vec::new();
    for frame in &frames {
        match InboundPacket::from_frame(frame) {
            Ok(packet) => {
                let mut event = PacketEvent::new(ATTACKER, packet);
                handler.on_packet_receiving(&mut event);
                handled.push(event.is_handled());
            }
            Err(e) => rejected.push(e),
        }
    }

    assert_eq!(handled, vec![true, false]);
    assert_eq!(rejected, vec![NetworkError::UnknownPacketType(0xFF)]);
    assert_eq!(requests.len(), 1);
}
