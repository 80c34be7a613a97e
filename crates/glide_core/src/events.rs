//! Observer lists
//!
//! Ordered callback registries attached to each tween. Observers are invoked
//! in registration order, grouped by [`ObserverKind`]. The list can be
//! detached while its callbacks run so that a callback may freely register,
//! remove or clear observers on the same tween; [`ObserverList::reattach`]
//! merges the two halves back together afterwards.

use smallvec::SmallVec;

/// Handle to a registered observer, unique within its list
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(pub u32);

/// When an observer fires
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObserverKind {
    /// Every tick that writes a value
    Update,
    /// Every terminal signal, including repeat boundaries when enabled
    Complete,
    /// Only the final terminal signal
    LastComplete,
}

struct Observer<F: ?Sized> {
    id: ObserverId,
    kind: ObserverKind,
    callback: Box<F>,
}

/// Ordered list of boxed callbacks of type `F`
pub struct ObserverList<F: ?Sized> {
    entries: SmallVec<[Observer<F>; 2]>,
    next_id: u32,
    /// Bumped by `clear` so a detached half can tell it was cleared meanwhile
    generation: u32,
    /// Ids held by the outstanding detached half, if any
    detached: Option<SmallVec<[ObserverId; 4]>>,
    /// Ids removed while detached, dropped again on reattach
    removed: SmallVec<[ObserverId; 2]>,
}

impl<F: ?Sized> ObserverList<F> {
    pub fn new() -> Self {
        Self {
            entries: SmallVec::new(),
            next_id: 0,
            generation: 0,
            detached: None,
            removed: SmallVec::new(),
        }
    }

    /// Append an observer; it fires after every observer registered before it
    pub fn register(&mut self, kind: ObserverKind, callback: Box<F>) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.entries.push(Observer { id, kind, callback });
        id
    }

    /// Remove an observer. Returns `false` if it is not in this list.
    ///
    /// While detached, ids held by the detached half are recorded and
    /// dropped on reattach.
    pub fn remove(&mut self, id: ObserverId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|observer| observer.id != id);
        if self.entries.len() != before {
            return true;
        }
        let in_detached = self
            .detached
            .as_ref()
            .is_some_and(|ids| ids.contains(&id));
        if in_detached && !self.removed.contains(&id) {
            self.removed.push(id);
            return true;
        }
        false
    }

    /// Drop every observer, including those of an outstanding detached half
    pub fn clear(&mut self) {
        self.entries.clear();
        self.generation = self.generation.wrapping_add(1);
        if let Some(ids) = self.detached.as_mut() {
            ids.clear();
        }
        self.removed.clear();
    }

    /// Whether a detached half is outstanding
    pub fn is_detached(&self) -> bool {
        self.detached.is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of observers of the given kind
    pub fn count(&self, kind: ObserverKind) -> usize {
        self.entries.iter().filter(|o| o.kind == kind).count()
    }

    /// Invoke `f` on every observer of `kind`, in registration order
    pub fn for_each(&mut self, kind: ObserverKind, mut f: impl FnMut(&mut F)) {
        for observer in self.entries.iter_mut().filter(|o| o.kind == kind) {
            f(&mut observer.callback);
        }
    }

    /// Move every observer out, leaving an empty list that keeps allocating
    /// fresh ids.
    pub fn detach(&mut self) -> ObserverList<F> {
        let entries = std::mem::take(&mut self.entries);
        self.detached = Some(entries.iter().map(|observer| observer.id).collect());
        ObserverList {
            entries,
            next_id: self.next_id,
            generation: self.generation,
            detached: None,
            removed: SmallVec::new(),
        }
    }

    /// Forget an outstanding detached half that will never be reattached
    pub fn abandon_detached(&mut self) {
        self.detached = None;
        self.removed.clear();
    }

    /// Merge a list previously produced by [`detach`](Self::detach). Detached
    /// observers go first; anything registered in between follows. If the
    /// list was cleared while detached, the detached observers are dropped.
    pub fn reattach(&mut self, mut detached: ObserverList<F>) {
        if detached.generation == self.generation {
            let removed = std::mem::take(&mut self.removed);
            detached.entries.retain(|observer| !removed.contains(&observer.id));
            detached.entries.extend(self.entries.drain(..));
            self.entries = detached.entries;
        }
        self.removed.clear();
        self.detached = None;
        self.next_id = self.next_id.max(detached.next_id);
    }
}

impl<F: ?Sized> Default for ObserverList<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: ?Sized> std::fmt::Debug for ObserverList<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverList")
            .field("len", &self.entries.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    type Callback = dyn FnMut(&mut Vec<&'static str>);

    fn push(tag: &'static str) -> Box<Callback> {
        Box::new(move |log: &mut Vec<&'static str>| log.push(tag))
    }

    fn fire(list: &mut ObserverList<Callback>, kind: ObserverKind) -> Vec<&'static str> {
        let mut log = Vec::new();
        list.for_each(kind, |cb| cb(&mut log));
        log
    }

    #[test]
    fn test_invocation_order_and_kinds() {
        let mut list: ObserverList<Callback> = ObserverList::new();
        list.register(ObserverKind::Complete, push("a"));
        list.register(ObserverKind::Update, push("u"));
        list.register(ObserverKind::Complete, push("b"));

        assert_eq!(fire(&mut list, ObserverKind::Complete), vec!["a", "b"]);
        assert_eq!(fire(&mut list, ObserverKind::Update), vec!["u"]);
        assert!(fire(&mut list, ObserverKind::LastComplete).is_empty());
        assert_eq!(list.count(ObserverKind::Complete), 2);
    }

    #[test]
    fn test_remove() {
        let mut list: ObserverList<Callback> = ObserverList::new();
        let a = list.register(ObserverKind::Update, push("a"));
        list.register(ObserverKind::Update, push("b"));

        assert!(list.remove(a));
        assert!(!list.remove(a));
        assert_eq!(fire(&mut list, ObserverKind::Update), vec!["b"]);
    }

    #[test]
    fn test_detach_reattach_preserves_order() {
        let mut list: ObserverList<Callback> = ObserverList::new();
        let first = list.register(ObserverKind::Update, push("first"));

        let detached = list.detach();
        assert!(list.is_empty());

        // Registered while detached; must not reuse the detached id
        let late = list.register(ObserverKind::Update, push("late"));
        assert_ne!(first, late);

        list.reattach(detached);
        assert_eq!(fire(&mut list, ObserverKind::Update), vec!["first", "late"]);
    }

    #[test]
    fn test_remove_while_detached() {
        let mut list: ObserverList<Callback> = ObserverList::new();
        let a = list.register(ObserverKind::Update, push("a"));
        list.register(ObserverKind::Update, push("b"));

        let detached = list.detach();
        assert!(list.is_detached());
        assert!(list.remove(a));
        assert!(!list.remove(a));
        assert!(!list.remove(ObserverId(99)));
        list.reattach(detached);

        assert!(!list.is_detached());
        assert_eq!(fire(&mut list, ObserverKind::Update), vec!["b"]);
    }

    #[test]
    fn test_remove_while_detached_rejects_ids_gone_before() {
        let mut list: ObserverList<Callback> = ObserverList::new();
        let gone = list.register(ObserverKind::Update, push("gone"));
        list.register(ObserverKind::Update, push("kept"));
        assert!(list.remove(gone));

        let detached = list.detach();
        assert!(!list.remove(gone));
        list.reattach(detached);
        assert_eq!(fire(&mut list, ObserverKind::Update), vec!["kept"]);
    }

    #[test]
    fn test_abandoned_detached_half() {
        let mut list: ObserverList<Callback> = ObserverList::new();
        let a = list.register(ObserverKind::Update, push("a"));

        drop(list.detach());
        list.abandon_detached();
        assert!(!list.is_detached());
        assert!(!list.remove(a));

        list.register(ObserverKind::Update, push("b"));
        assert_eq!(fire(&mut list, ObserverKind::Update), vec!["b"]);
    }

    #[test]
    fn test_clear_while_detached_drops_detached() {
        let mut list: ObserverList<Callback> = ObserverList::new();
        list.register(ObserverKind::Update, push("old"));

        let detached = list.detach();
        list.clear();
        list.register(ObserverKind::Update, push("new"));
        list.reattach(detached);

        assert_eq!(fire(&mut list, ObserverKind::Update), vec!["new"]);
    }
}
