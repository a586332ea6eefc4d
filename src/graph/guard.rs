use std::ops::{Deref, DerefMut};

use super::Graph;

/// Mutable borrow of a graph-owned observable.
///
/// Changes made through the guard only queue notifications; dropping the
/// guard runs [`Graph::process_events`] so mode downgrades, aspect
/// correction and invalidation happen before control returns to the caller.
pub struct GraphGuard<'a, T: 'static> {
    graph: &'a mut Graph,
    get: fn(&Graph) -> &T,
    get_mut: fn(&mut Graph) -> &mut T,
}

impl<'a, T: 'static> GraphGuard<'a, T> {
    pub(super) fn new(
        graph: &'a mut Graph,
        get: fn(&Graph) -> &T,
        get_mut: fn(&mut Graph) -> &mut T,
    ) -> Self {
        Self {
            graph,
            get,
            get_mut,
        }
    }
}

impl<T: 'static> Deref for GraphGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        (self.get)(self.graph)
    }
}

impl<T: 'static> DerefMut for GraphGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        (self.get_mut)(self.graph)
    }
}

impl<T: 'static> Drop for GraphGuard<'_, T> {
    fn drop(&mut self) {
        self.graph.process_events();
    }
}
