//! # Inbound Packet Definitions
//!
//! The slice of the client -> server protocol the interceptor cares about.
//!
//! ## Frame Layout
//!
//! ```text
//! ┌──────────┬──────────────────────────────────────────────┐
//! │ Type (1) │ Payload                                      │
//! └──────────┴──────────────────────────────────────────────┘
//!
//! InteractEntity payload (8 bytes):
//! ┌────────────┬────────────┬──────────────┬──────────┬─────────┐
//! │ Target (4) │ Action (1) │ Sneaking (1) │ Hand (1) │ Pad (1) │
//! └────────────┴────────────┴──────────────┴──────────┴─────────┘
//! ```
//!
//! Fields use the same fixed layout on both ends, so the target id is read
//! straight out of the payload without decoding the rest.

use bytemuck::{Pod, Zeroable};
use servant_core::EntityId;

use crate::error::{NetworkError, NetworkResult};

/// Types of inbound packets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PacketType {
    /// Keep-alive heartbeat.
    KeepAlive = 0,
    /// Chat message.
    Chat = 1,
    /// Player attacked or used an entity.
    InteractEntity = 2,
    /// Player position update.
    Movement = 3,
    /// Arm swing animation.
    ArmAnimation = 4,
    /// Block dig progress.
    BlockDig = 5,
}

impl PacketType {
    /// Decodes a packet type byte.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::KeepAlive),
            1 => Some(Self::Chat),
            2 => Some(Self::InteractEntity),
            3 => Some(Self::Movement),
            4 => Some(Self::ArmAnimation),
            5 => Some(Self::BlockDig),
            _ => None,
        }
    }
}

/// Interaction payload - Client -> Server.
///
/// Size: 8 bytes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct InteractEntity {
    /// Entity the player interacted with.
    pub target: EntityId,
    /// Interaction kind (see `ACTION_*`).
    pub action: u8,
    /// Non-zero if the player was sneaking.
    pub sneaking: u8,
    /// Hand used (0 = main, 1 = off).
    pub hand: u8,
    /// Padding for alignment.
    pub _padding: u8,
}

impl InteractEntity {
    /// Size in bytes.
    pub const SIZE: usize = 8;

    /// Byte offset of the target id inside the payload.
    pub const TARGET_ID_OFFSET: usize = 0;

    /// Action: right-click use.
    pub const ACTION_INTERACT: u8 = 0;
    /// Action: left-click attack.
    pub const ACTION_ATTACK: u8 = 1;
    /// Action: right-click at a position on the entity.
    pub const ACTION_INTERACT_AT: u8 = 2;

    /// Creates an interaction with the given action.
    #[inline]
    #[must_use]
    pub const fn new(target: EntityId, action: u8) -> Self {
        Self {
            target,
            action,
            sneaking: 0,
            hand: 0,
            _padding: 0,
        }
    }

    /// Creates an attack on `target`.
    #[inline]
    #[must_use]
    pub const fn attack(target: EntityId) -> Self {
        Self::new(target, Self::ACTION_ATTACK)
    }

    /// Reads only the target id from a raw payload.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::MalformedPacket`] if the payload is too short.
    pub fn read_target(payload: &[u8]) -> NetworkResult<EntityId> {
        let end = Self::TARGET_ID_OFFSET + std::mem::size_of::<EntityId>();
        payload
            .get(Self::TARGET_ID_OFFSET..end)
            .map(bytemuck::pod_read_unaligned)
            .ok_or(NetworkError::MalformedPacket {
                expected: end,
                actual: payload.len(),
            })
    }

    /// Encodes to payload bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes.copy_from_slice(bytemuck::bytes_of(self));
        bytes
    }
}

/// A raw inbound packet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboundPacket {
    /// Packet type.
    pub packet_type: PacketType,
    /// Undecoded payload.
    pub payload: Vec<u8>,
}

impl InboundPacket {
    /// Creates a packet from type and payload.
    #[must_use]
    pub fn new(packet_type: PacketType, payload: Vec<u8>) -> Self {
        Self {
            packet_type,
            payload,
        }
    }

    /// Creates an interaction packet.
    #[must_use]
    pub fn interact(interaction: InteractEntity) -> Self {
        Self::new(PacketType::InteractEntity, interaction.to_bytes().to_vec())
    }

    /// Splits a wire frame into type and payload.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty frame or an unknown type byte.
    pub fn from_frame(frame: &[u8]) -> NetworkResult<Self> {
        let (&kind, payload) = frame.split_first().ok_or(NetworkError::MalformedPacket {
            expected: 1,
            actual: 0,
        })?;
        let packet_type = PacketType::from_u8(kind).ok_or(NetworkError::UnknownPacketType(kind))?;
        Ok(Self::new(packet_type, payload.to_vec()))
    }

    /// Encodes to a wire frame.
    #[must_use]
    pub fn to_frame(&self) -> Vec<u8> {
        let mut frame = Vec::with_capacity(1 + self.payload.len());
        frame.push(self.packet_type as u8);
        frame.extend_from_slice(&self.payload);
        frame
    }
}

/// An inbound packet as seen by a listener.
///
/// Marking it handled stops the host engine from processing it.
#[derive(Clone, Debug)]
pub struct PacketEvent {
    player: EntityId,
    packet: InboundPacket,
    handled: bool,
}

impl PacketEvent {
    /// Wraps a packet received from `player`.
    #[must_use]
    pub fn new(player: EntityId, packet: InboundPacket) -> Self {
        Self {
            player,
            packet,
            handled: false,
        }
    }

    /// Player who sent the packet.
    #[inline]
    #[must_use]
    pub const fn player(&self) -> EntityId {
        self.player
    }

    /// The packet.
    #[inline]
    #[must_use]
    pub const fn packet(&self) -> &InboundPacket {
        &self.packet
    }

    /// Whether a listener consumed the packet.
    #[inline]
    #[must_use]
    pub const fn is_handled(&self) -> bool {
        self.handled
    }

    /// Consumes the packet.
    #[inline]
    pub fn set_handled(&mut self) {
        self.handled = true;
    }
}
