//! Stack merging.
//!
//! A merge is legal only between two distinct items of the same type whose
//! destination stack still has room. It transfers
//! `min(source.count, capacity − destination.count)` units. Deleting an
//! emptied source is the caller's job (see `Inventory::try_stack`).

use crate::core::{ItemInstance, PlaceError};

/// Counts after a merge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackOutcome {
    pub transferred: u32,
    pub source_remaining: u32,
    pub destination_count: u32,
}

impl StackOutcome {
    /// The whole source stack moved; the source item is gone
    pub fn source_consumed(&self) -> bool {
        self.source_remaining == 0
    }
}

/// Compute a merge without touching either item
pub fn plan_merge(source: &ItemInstance, destination: &ItemInstance) -> Result<StackOutcome, PlaceError> {
    if !destination.accepts_stack_from(source) || source.stack_count == 0 {
        return Err(PlaceError::IncompatibleStack);
    }
    let transferred = source.stack_count.min(destination.stack_room());
    Ok(StackOutcome {
        transferred,
        source_remaining: source.stack_count - transferred,
        destination_count: destination.stack_count + transferred,
    })
}

/// Apply a merge to both items
pub fn merge(source: &mut ItemInstance, destination: &mut ItemInstance) -> Result<StackOutcome, PlaceError> {
    let outcome = plan_merge(source, destination)?;
    source.stack_count = outcome.source_remaining;
    destination.stack_count = outcome.destination_count;
    Ok(outcome)
}
