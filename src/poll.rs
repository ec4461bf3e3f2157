//! Periodic task registry for the menu's polling loops.
//!
//! Nothing here runs on its own: the host (through
//! [`Menu::pump`](crate::menu::Menu::pump)) asks the [`Scheduler`] which tasks
//! are due at a given instant and runs them itself. Every task is registered
//! under a [`ViewScope`]; when the scope is dropped or cancelled, all of its
//! tasks stop firing. Navigating to another view swaps the scope, which is the
//! only cancellation the menu needs.

use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// Handle of a registered task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

/// Lifetime of a group of tasks. Cancels them all on drop.
#[derive(Debug)]
pub struct ViewScope {
    token: CancellationToken,
}

impl ViewScope {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Repeat {
    Once,
    Every(Duration),
}

#[derive(Debug)]
struct Task<T> {
    id: TaskId,
    due: Instant,
    repeat: Repeat,
    token: CancellationToken,
    payload: T,
}

/// Registry of one-shot and periodic tasks carrying a `T` payload.
#[derive(Debug)]
pub struct Scheduler<T> {
    root: CancellationToken,
    next_id: u64,
    tasks: Vec<Task<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            root: CancellationToken::new(),
            next_id: 0,
            tasks: Vec::new(),
        }
    }
}

impl<T: Clone> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new scope; [`purge`](Self::purge) cancels it along with every other.
    pub fn scope(&self) -> ViewScope {
        ViewScope {
            token: self.root.child_token(),
        }
    }

    fn insert(&mut self, scope: &ViewScope, due: Instant, repeat: Repeat, payload: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.push(Task {
            id,
            due,
            repeat,
            token: scope.token.clone(),
            payload,
        });
        id
    }

    /// Fire `payload` every `every`, first at `now + every`.
    pub fn set_interval(
        &mut self,
        scope: &ViewScope,
        now: Instant,
        every: Duration,
        payload: T,
    ) -> TaskId {
        self.insert(scope, now + every, Repeat::Every(every), payload)
    }

    /// Fire `payload` once at `now + after`.
    pub fn set_timeout(
        &mut self,
        scope: &ViewScope,
        now: Instant,
        after: Duration,
        payload: T,
    ) -> TaskId {
        self.insert(scope, now + after, Repeat::Once, payload)
    }

    /// Remove one task. Returns `false` if it was already gone.
    pub fn clear(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    /// Cancel every scope handed out so far and drop all tasks.
    pub fn purge(&mut self) {
        self.root.cancel();
        self.root = CancellationToken::new();
        self.tasks.clear();
    }

    /// Number of live (not cancelled) tasks.
    pub fn len(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| !t.token.is_cancelled())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Payloads due at `now`, in registration order.
    ///
    /// Periodic tasks fire at most once per call and are rescheduled from
    /// their previous deadline; a task that fell more than one period behind
    /// is rescheduled from `now` instead of firing a burst.
    pub fn due(&mut self, now: Instant) -> Vec<(TaskId, T)> {
        self.tasks.retain(|t| !t.token.is_cancelled());

        let mut fired = Vec::new();
        for task in &mut self.tasks {
            if task.due > now {
                continue;
            }
            fired.push((task.id, task.payload.clone()));
            if let Repeat::Every(every) = task.repeat {
                task.due += every;
                if task.due <= now {
                    task.due = now + every;
                }
            }
        }
        self.tasks
            .retain(|t| !(t.repeat == Repeat::Once && t.due <= now));
        fired
    }
}
