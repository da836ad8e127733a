//! Collaborator contracts consumed by the controller.
//!
//! The engine never owns a socket or a world: it reads aim/target state from
//! a `TargetSource` and hands outbound messages to a `CommandSink`. Hosts
//! plug in their own implementations; `ChannelSink` adapts the in-proc byte
//! channel for tests and the local loop.

use data_runtime::ids::ActorId;
use net_core::channel::Tx;
use net_core::codec;
use net_core::message::ClientMsg;

/// Position/targeting source (camera or world state owned by the host).
pub trait TargetSource {
    /// Current world position used as the origin of ground-targeted casts.
    fn aim_origin(&self) -> [f32; 3];
    /// Current facing used for ground-targeted casts.
    fn aim_dir(&self) -> [f32; 3];
    /// Currently selected entity, if any.
    fn selected_target(&self) -> Option<ActorId>;
}

/// Outbound send primitive for the two client message types.
pub trait CommandSink {
    /// Hand one message to the transport. Returns false if the transport is
    /// gone; the engine treats that like a drop (the ack will never come).
    fn send(&mut self, msg: &ClientMsg) -> bool;
}

/// `CommandSink` over the in-proc byte channel: JSON-encodes and frames.
pub struct ChannelSink {
    tx: Tx,
}

impl ChannelSink {
    #[must_use]
    pub fn new(tx: Tx) -> Self {
        Self { tx }
    }
}

impl CommandSink for ChannelSink {
    fn send(&mut self, msg: &ClientMsg) -> bool {
        self.tx.try_send(codec::encode_client(msg))
    }
}
