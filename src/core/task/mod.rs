//=========================================================================
// Task System
//=========================================================================
//
// Per-frame cooperative work units and the scheduler that drives them.
//
// Architecture:
//   TaskScheduler
//     ├─ entries: Vec<TaskEntry>   (live set, insertion order)
//     └─ spawned: Vec<TaskEntry>   (added mid-tick, joins next tick)
//
//   TaskEntry = Box<dyn Task> + TaskHandle
//   TaskHandle = id + Rc<Cell<bool>> liveness flag (non-owning)
//
// Flow:
//   advance(delta) → Task::step(delta, frame, handle) for each live entry
//                  → evict dead entries → merge spawned entries
//
//=========================================================================

//=== Module Declarations =================================================

mod scheduler;

//=== External Dependencies ===============================================

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

//=== Internal Dependencies ===============================================

use crate::core::error::TaskError;
use crate::core::stage::Stage;

//=== Public API ==========================================================

pub use scheduler::TaskScheduler;

/// Plain-function task callback operating on a caller-owned context.
pub type TaskFn<C> = fn(f64, &mut C, &mut TaskFrame<'_>, &TaskHandle) -> Result<(), TaskError>;

//=== TaskId ==============================================================

/// Unique, monotonically increasing task identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    #[cfg(test)]
    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

//=== TaskHandle ==========================================================

/// Capability to stop a registered task.
///
/// Handles do not own the task. Cloning a handle shares the same liveness
/// flag, so any clone can stop the task and all clones observe it.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    id: TaskId,
    alive: Rc<Cell<bool>>,
}

impl TaskHandle {
    fn new(id: TaskId) -> Self {
        Self {
            id,
            alive: Rc::new(Cell::new(true)),
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Marks the task dead. Stopping twice is a no-op.
    ///
    /// A task stopping itself finishes its current step; it is never
    /// stepped again.
    pub fn stop(&self) {
        self.alive.set(false);
    }

    pub fn is_alive(&self) -> bool {
        self.alive.get()
    }
}

//=== Task Trait ==========================================================

/// A unit of work re-entered once per tick until stopped.
///
/// Implementors are small state machines: they accumulate elapsed time in
/// their own fields and call [`TaskHandle::stop`] when done. Tasks that
/// never stop must reset or wrap their own progress.
pub trait Task: 'static {
    /// Advances the task by `delta` milliseconds.
    ///
    /// # Errors
    ///
    /// Returning an error stops this task and aborts the rest of the tick.
    fn step(
        &mut self,
        delta: f64,
        frame: &mut TaskFrame<'_>,
        handle: &TaskHandle,
    ) -> Result<(), TaskError>;
}

//--- Adapters ------------------------------------------------------------

/// Pairs a [`TaskFn`] with its context value.
struct Callback<C> {
    callback: TaskFn<C>,
    context: C,
}

impl<C: 'static> Task for Callback<C> {
    fn step(
        &mut self,
        delta: f64,
        frame: &mut TaskFrame<'_>,
        handle: &TaskHandle,
    ) -> Result<(), TaskError> {
        (self.callback)(delta, &mut self.context, frame, handle)
    }
}

/// Wraps a closure as a task.
struct FnTask<F>(F);

impl<F> Task for FnTask<F>
where
    F: FnMut(f64, &mut TaskFrame<'_>, &TaskHandle) -> Result<(), TaskError> + 'static,
{
    fn step(
        &mut self,
        delta: f64,
        frame: &mut TaskFrame<'_>,
        handle: &TaskHandle,
    ) -> Result<(), TaskError> {
        (self.0)(delta, frame, handle)
    }
}

//=== TaskEntry ===========================================================

struct TaskEntry {
    handle: TaskHandle,
    task: Box<dyn Task>,
}

//=== Registry ============================================================

/// Id allocation shared by the scheduler and in-tick frames.
fn register(
    entries: &mut Vec<TaskEntry>,
    next_id: &mut u64,
    task: Box<dyn Task>,
) -> TaskHandle {
    let handle = TaskHandle::new(TaskId(*next_id));
    *next_id += 1;
    entries.push(TaskEntry {
        handle: handle.clone(),
        task,
    });
    handle
}

//=== TaskFrame ===========================================================

/// Per-tick access handed to every task step.
///
/// Gives tasks the stage to mutate and lets them register follow-up
/// tasks. Tasks registered through a frame are first stepped on the next
/// tick.
pub struct TaskFrame<'a> {
    /// The shared display graph.
    pub stage: &'a mut Stage,
    spawned: &'a mut Vec<TaskEntry>,
    next_id: &'a mut u64,
}

impl<'a> TaskFrame<'a> {
    /// Registers a task for the next tick.
    pub fn spawn<T: Task>(&mut self, task: T) -> TaskHandle {
        register(self.spawned, self.next_id, Box::new(task))
    }

    /// Registers a closure task for the next tick.
    pub fn spawn_fn<F>(&mut self, task: F) -> TaskHandle
    where
        F: FnMut(f64, &mut TaskFrame<'_>, &TaskHandle) -> Result<(), TaskError> + 'static,
    {
        self.spawn(FnTask(task))
    }

    /// Registers a callback/context pair for the next tick.
    pub fn add_task<C: 'static>(&mut self, callback: TaskFn<C>, context: C) -> TaskHandle {
        self.spawn(Callback { callback, context })
    }
}
