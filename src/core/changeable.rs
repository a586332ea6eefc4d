use super::signal::{Signal, SubscriptionId};

/// Change notification state shared by every reactive primitive.
///
/// While frozen, notifications are recorded instead of delivered; `thaw`
/// delivers at most one. Ignore mode uses the same flag but drops whatever
/// was recorded. A single flag is kept: freezes do not nest.
#[derive(Debug, Default)]
pub struct Notifier {
    changed: Signal,
    frozen: bool,
    pending: bool,
}

impl Notifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&mut self, slot: impl FnMut() + 'static) -> SubscriptionId {
        self.changed.connect(slot)
    }

    pub fn disconnect(&mut self, id: SubscriptionId) -> bool {
        self.changed.disconnect(id)
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn thaw(&mut self) {
        self.frozen = false;
        if self.pending {
            self.pending = false;
            self.changed.emit();
        }
    }

    pub fn begin_ignore(&mut self) {
        self.frozen = true;
    }

    pub fn end_ignore(&mut self) {
        self.frozen = false;
        self.pending = false;
    }

    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn emit_changed(&mut self) {
        if self.frozen {
            self.pending = true;
        } else {
            self.changed.emit();
        }
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.changed.len()
    }
}

/// Uniform freeze/thaw surface over anything owning a [`Notifier`].
pub trait Changeable {
    fn notifier(&self) -> &Notifier;
    fn notifier_mut(&mut self) -> &mut Notifier;

    fn connect_changed(&mut self, slot: impl FnMut() + 'static) -> SubscriptionId
    where
        Self: Sized,
    {
        self.notifier_mut().connect(slot)
    }

    fn disconnect_changed(&mut self, id: SubscriptionId) -> bool {
        self.notifier_mut().disconnect(id)
    }

    fn freeze(&mut self) {
        self.notifier_mut().freeze();
    }

    fn thaw(&mut self) {
        self.notifier_mut().thaw();
    }

    fn begin_ignore(&mut self) {
        self.notifier_mut().begin_ignore();
    }

    fn end_ignore(&mut self) {
        self.notifier_mut().end_ignore();
    }

    fn emit_changed(&mut self) {
        self.notifier_mut().emit_changed();
    }
}
