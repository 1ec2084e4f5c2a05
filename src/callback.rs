//! Named-topic observer registry with safe iteration under mutation
//! (§4.5).

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;

/// A callback with a user-supplied identity, used for targeted removal.
/// Equality for removal purposes is on `id` only (§9).
struct Entry<Id, F> {
    id: Id,
    f: F,
}

/// A map from topic to an ordered list of callbacks.
///
/// A single mutex guards the map; it is released before any callback
/// runs, and `run` snapshots the topic's list before iterating so a
/// callback may safely add/remove callbacks on the same topic without
/// racing the in-flight iteration.
pub struct CallbackBus<Topic, Id, F> {
    topics: Mutex<HashMap<Topic, Vec<Entry<Id, F>>>>,
}

impl<Topic, Id, F> Default for CallbackBus<Topic, Id, F>
where
    Topic: Eq + Hash,
{
    fn default() -> Self {
        Self {
            topics: Mutex::new(HashMap::new()),
        }
    }
}

impl<Topic, Id, F> CallbackBus<Topic, Id, F>
where
    Topic: Eq + Hash + Clone,
    Id: Eq + Clone,
    F: Clone,
{
    /// An empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a callback to `topic`'s list.
    pub fn add(&self, topic: Topic, id: Id, f: F) {
        let mut topics = self.lock();
        topics.entry(topic).or_default().push(Entry { id, f });
    }

    /// Remove all callbacks on `topic` whose identity equals `id`.
    pub fn remove(&self, topic: &Topic, id: &Id) {
        let mut topics = self.lock();
        if let Some(list) = topics.get_mut(topic) {
            list.retain(|e| &e.id != id);
        }
    }

    /// Snapshot `topic`'s callback list. Used by `run` to avoid holding
    /// the lock while invoking callbacks.
    fn snapshot(&self, topic: &Topic) -> Vec<F> {
        let topics = self.lock();
        topics
            .get(topic)
            .map(|list| list.iter().map(|e| e.f.clone()).collect())
            .unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Topic, Vec<Entry<Id, F>>>> {
        self.topics.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<Topic, Id, F> CallbackBus<Topic, Id, F>
where
    Topic: Eq + Hash + Clone,
    Id: Eq + Clone,
    F: Clone + std::ops::Deref,
    F::Target: Fn(),
{
    /// Run every callback currently registered on `topic`, in insertion
    /// order, against a snapshot taken before the first call — a
    /// callback added during this run does not execute until the next
    /// `run`.
    pub fn run(&self, topic: &Topic) {
        for f in self.snapshot(topic) {
            (*f)();
        }
    }
}

impl<Topic, Id, F> CallbackBus<Topic, Id, F>
where
    Topic: Eq + Hash + Clone,
    Id: Eq + Clone,
    F: Clone,
{
    /// Like [`Self::run`], but passes `arg` to every callback. Used by
    /// topics whose callbacks carry a payload (e.g. the PTY bridge's
    /// title/LEDs events) instead of firing bare.
    pub fn run_with<A>(&self, topic: &Topic, arg: &A)
    where
        F: std::ops::Deref,
        F::Target: Fn(&A),
    {
        for f in self.snapshot(topic) {
            (*f)(arg);
        }
    }
}
