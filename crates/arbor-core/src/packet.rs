use crate::address::{Address, Segment};

/// A unit of delivery: a destination address plus an opaque payload.
///
/// Packets are created per routing attempt and never stored by a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet<T, S = Segment> {
    /// Destination address.
    pub address: Address<S>,
    /// Opaque data handed to the delivering node's handler.
    pub payload: T,
}

impl<T, S> Packet<T, S> {
    /// Create a new packet.
    pub fn new(address: Address<S>, payload: T) -> Self {
        Self { address, payload }
    }

    /// Split the packet into its address and payload.
    pub fn into_parts(self) -> (Address<S>, T) {
        (self.address, self.payload)
    }
}

impl<T: Default, S> Default for Packet<T, S> {
    fn default() -> Self {
        Self {
            address: Address::root(),
            payload: T::default(),
        }
    }
}
