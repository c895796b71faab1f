//! Slot and poolable contracts shared with the pool.

/// A reservation in the pool that an allocated object will occupy.
///
/// Slots are owned by the pool. Allocators receive them by reference and may
/// keep a handle inside the object they build (slot handles are usually cheap
/// to clone), but the boundary itself never inspects or retains a slot.
pub trait Slot: Send + Sync {
    /// Hand the object occupying this slot back to the pool.
    fn release(&self);

    /// Mark the occupant as expired so the pool reallocates it.
    fn expire(&self) {}
}

/// An object managed by the pool.
pub trait Poolable: Send {
    /// Return this object to the slot it was allocated into.
    fn release(&mut self);
}
