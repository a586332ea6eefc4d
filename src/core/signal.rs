use std::fmt;

/// Handle returned by [`Signal::connect`], used to disconnect a slot later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Synchronous callback registry.
///
/// Slots run in connection order on the emitting thread. A slot never gets
/// access to the emitter, so notification cascades have to go through state
/// the slot captured (the graph uses a shared event queue for that).
#[derive(Default)]
pub struct Signal {
    next_id: u64,
    slots: Vec<(SubscriptionId, Box<dyn FnMut()>)>,
}

impl Signal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&mut self, slot: impl FnMut() + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.slots.push((id, Box::new(slot)));
        id
    }

    /// Removes a slot. Unknown ids are ignored and report `false`.
    pub fn disconnect(&mut self, id: SubscriptionId) -> bool {
        let before = self.slots.len();
        self.slots.retain(|(slot_id, _)| *slot_id != id);
        before != self.slots.len()
    }

    pub fn emit(&mut self) {
        for (_, slot) in &mut self.slots {
            slot();
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("slots", &self.slots.len())
            .finish()
    }
}
