use std::collections::HashMap;
use std::sync::Arc;

use crate::ident::SignalId;
use crate::slot::{ErasedSlot, Matcher};

pub(crate) type SlotRef = Arc<dyn ErasedSlot>;

/// Result of an indexed lookup into a signal's slot sequence
pub(crate) enum Fetch {
    Slot(SlotRef),
    /// The slot at this index was removed while an emit was iterating. Skip it.
    Vacant,
    /// Past the end of the sequence, or the signal has no slots
    End,
}

/// Owns the slots of one emitter, keyed by signal.
///
/// Sequences keep insertion order. While at least one emit is iterating
/// (see [`Registry::pin`]) removals leave a tombstone behind instead of shifting
/// later slots down, so the in-flight emit's indices stay valid. Tombstones and
/// emptied entries are swept once the last pin is released.
#[derive(Default)]
pub(crate) struct Registry {
    signals: HashMap<SignalId, Vec<Option<SlotRef>>>,
    pins: usize,
    tombstones: usize,
}

impl Registry {
    pub fn new() -> Self { Self::default() }

    /// Appends a slot to the signal's sequence, creating the entry if needed.
    pub fn store(&mut self, signal: SignalId, slot: SlotRef) { self.signals.entry(signal).or_default().push(Some(slot)); }

    /// The slot at `index` for `signal`. The returned handle is independent of the
    /// registry, so the caller may release any borrow before invoking it.
    pub fn at(&self, signal: &SignalId, index: usize) -> Fetch {
        match self.signals.get(signal).and_then(|slots| slots.get(index)) {
            Some(Some(slot)) => Fetch::Slot(slot.clone()),
            Some(None) => Fetch::Vacant,
            None => Fetch::End,
        }
    }

    /// Removes every slot the matcher selects, across all signals. The removed
    /// slots are handed back so the caller decides where they are dropped.
    pub fn remove(&mut self, matcher: &Matcher) -> Vec<SlotRef> { self.purge(|slot| matcher.matches(slot)) }

    /// Removes every slot.
    pub fn clear(&mut self) -> Vec<SlotRef> { self.purge(|_| true) }

    fn purge(&mut self, mut predicate: impl FnMut(&dyn ErasedSlot) -> bool) -> Vec<SlotRef> {
        let mut removed = Vec::new();
        if self.pins > 0 {
            for slots in self.signals.values_mut() {
                for entry in slots.iter_mut() {
                    if entry.as_deref().is_some_and(|slot| predicate(slot)) {
                        removed.extend(entry.take());
                    }
                }
            }
            self.tombstones += removed.len();
        } else {
            self.signals.retain(|_, slots| {
                let (gone, kept): (Vec<_>, Vec<_>) = slots.drain(..).flatten().partition(|slot| predicate(&**slot));
                removed.extend(gone);
                *slots = kept.into_iter().map(Some).collect();
                !slots.is_empty()
            });
        }
        removed
    }

    /// Marks the start of an indexed iteration.
    #[cfg_attr(feature = "thread-safe", allow(dead_code))]
    pub fn pin(&mut self) { self.pins += 1; }

    /// Marks the end of an indexed iteration. The last one out sweeps.
    #[cfg_attr(feature = "thread-safe", allow(dead_code))]
    pub fn unpin(&mut self) {
        self.pins = self.pins.saturating_sub(1);
        if self.pins == 0 && self.tombstones > 0 {
            self.signals.retain(|_, slots| {
                slots.retain(Option::is_some);
                !slots.is_empty()
            });
            self.tombstones = 0;
        }
    }

    /// Number of live slots across all signals
    pub fn len(&self) -> usize { self.signals.values().map(|slots| live(slots)).sum() }

    pub fn slot_count(&self, signal: &SignalId) -> usize { self.signals.get(signal).map_or(0, |slots| live(slots)) }

    /// Number of signals with at least one live slot
    pub fn signal_count(&self) -> usize { self.signals.values().filter(|slots| live(slots) > 0).count() }
}

fn live(slots: &[Option<SlotRef>]) -> usize { slots.iter().filter(|entry| entry.is_some()).count() }

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (signal, slots) in &self.signals {
            map.entry(&signal.name(), &slots.iter().flatten().collect::<Vec<_>>());
        }
        map.finish()
    }
}
