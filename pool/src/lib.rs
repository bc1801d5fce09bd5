#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! In-memory pooled object store implementing the spawn collaborator traits.
//!
//! [`ObjectArena`] is the reference [`ObjectPool`] + [`ContainerOps`]
//! implementation used by the adapters and the scheduler's integration
//! tests. Slots released by [`ContainerOps::clear_children`] return to a
//! free list and back future allocations, so handle capacity is bounded by
//! the largest wave rather than the total spawn count.

use wave_spawn_core::{
    ContainerId, ContainerOps, HandleId, HandleSet, ObjectPool, Position, SpawnObjectId, Wave,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SlotState {
    Reserved,
    Active,
    Released,
}

#[derive(Clone, Debug)]
struct Slot {
    descriptor: SpawnObjectId,
    container: ContainerId,
    state: SlotState,
    position: Option<Position>,
}

/// Pooled object slots addressed by [`HandleId`].
#[derive(Clone, Debug, Default)]
pub struct ObjectArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl ObjectArena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Position last assigned to `handle`, if it has been placed.
    #[must_use]
    pub fn position(&self, handle: HandleId) -> Option<Position> {
        self.slot(handle).and_then(|slot| slot.position)
    }

    /// Descriptor the slot behind `handle` was reserved for.
    #[must_use]
    pub fn descriptor(&self, handle: HandleId) -> Option<SpawnObjectId> {
        self.slot(handle).map(|slot| slot.descriptor)
    }

    /// Number of acquired, not-yet-released slots parented to `container`.
    #[must_use]
    pub fn active_in(&self, container: ContainerId) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.container == container && slot.state == SlotState::Active)
            .count()
    }

    /// Total slot capacity the arena has grown to.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn slot(&self, handle: HandleId) -> Option<&Slot> {
        self.slots.get(handle.get() as usize)
    }

    fn reserve_slot(&mut self, descriptor: SpawnObjectId, container: ContainerId) -> HandleId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.descriptor = descriptor;
            slot.container = container;
            slot.state = SlotState::Reserved;
            slot.position = None;
            return HandleId::new(index);
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            descriptor,
            container,
            state: SlotState::Reserved,
            position: None,
        });
        HandleId::new(index)
    }
}

impl ObjectPool for ObjectArena {
    fn allocate(&mut self, wave: &Wave, container: ContainerId, count: usize) -> HandleSet {
        let handles = wave
            .spawnable_objects()
            .iter()
            .take(count)
            .map(|descriptor| self.reserve_slot(*descriptor, container))
            .collect();
        HandleSet::from_handles(handles)
    }

    fn acquire(
        &mut self,
        handles: &HandleSet,
        index: usize,
        container: ContainerId,
    ) -> Option<HandleId> {
        let handle = handles.get(index)?;
        let slot = self.slots.get_mut(handle.get() as usize)?;
        if slot.state != SlotState::Reserved {
            return None;
        }
        slot.state = SlotState::Active;
        slot.container = container;
        Some(handle)
    }

    fn place(&mut self, handle: HandleId, position: Position) {
        if let Some(slot) = self.slots.get_mut(handle.get() as usize) {
            slot.position = Some(position);
        }
    }
}

impl ContainerOps for ObjectArena {
    fn clear_children(&mut self, container: ContainerId) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.container == container && slot.state != SlotState::Released {
                slot.state = SlotState::Released;
                slot.position = None;
                self.free.push(index as u32);
            }
        }
    }
}
