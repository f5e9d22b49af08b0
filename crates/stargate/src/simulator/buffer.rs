//! Per-endpoint transit queues.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::types::{EntityId, TransitItem};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransitBuffer {
    send: Vec<TransitItem>,
    recv: VecDeque<TransitItem>,
}

impl TransitBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(send: Vec<TransitItem>, recv: Vec<TransitItem>) -> Self {
        Self {
            send,
            recv: VecDeque::from(recv),
        }
    }

    pub fn push_send(&mut self, item: TransitItem) {
        self.send.push(item);
    }

    pub fn push_recv(&mut self, item: TransitItem) {
        self.recv.push_back(item);
    }

    /// Takes every outgoing item, oldest first.
    pub fn take_send(&mut self) -> Vec<TransitItem> {
        std::mem::take(&mut self.send)
    }

    /// Appends a batch to the incoming queue, preserving its order.
    pub fn extend_recv<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = TransitItem>,
    {
        self.recv.extend(items);
    }

    pub fn peek_recv(&self) -> Option<&TransitItem> {
        self.recv.front()
    }

    pub fn pop_recv(&mut self) -> Option<TransitItem> {
        self.recv.pop_front()
    }

    /// Empties both queues, outgoing items first.
    pub fn drain_all(&mut self) -> Vec<TransitItem> {
        let mut items = std::mem::take(&mut self.send);
        items.extend(self.recv.drain(..));
        items
    }

    pub fn send_items(&self) -> &[TransitItem] {
        &self.send
    }

    pub fn recv_items(&self) -> impl Iterator<Item = &TransitItem> {
        self.recv.iter()
    }

    pub fn send_len(&self) -> usize {
        self.send.len()
    }

    pub fn recv_len(&self) -> usize {
        self.recv.len()
    }

    pub fn send_is_empty(&self) -> bool {
        self.send.is_empty()
    }

    pub fn recv_is_empty(&self) -> bool {
        self.recv.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.send.is_empty() && self.recv.is_empty()
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.send.iter().any(|item| item.entity == entity)
            || self.recv.iter().any(|item| item.entity == entity)
    }
}
