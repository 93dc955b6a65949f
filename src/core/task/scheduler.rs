//=========================================================================
// Task Scheduler
//=========================================================================
//
// Owns the live task set and steps every live task once per tick.
//
// Ordering guarantees:
// - Tasks are stepped in insertion order
// - A task stopped mid-pass (by itself or another task) is skipped for the
//   rest of the pass and evicted afterwards
// - Tasks registered mid-pass wait in `spawned` and join on the next tick
//
// Fault policy:
// - A task returning `Err` is stopped and the remaining tasks of the tick
//   are not stepped; the error is returned to the host
// - Eviction and the spawned merge still run, so the live set stays
//   consistent for the next tick
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, error, trace};

//=== Internal Dependencies ===============================================

use super::{register, Callback, FnTask, Task, TaskEntry, TaskFn, TaskFrame, TaskHandle};
use crate::core::error::{TaskError, TaskFault};
use crate::core::stage::Stage;

//=== TaskScheduler =======================================================

/// Frame-driven cooperative task runner.
///
/// # Examples
///
/// ```rust
/// use stagecraft::core::stage::Stage;
/// use stagecraft::core::task::{TaskFrame, TaskHandle, TaskScheduler};
/// use stagecraft::core::error::TaskError;
///
/// struct Countdown { left: u32 }
///
/// fn tick(_delta: f64, ctx: &mut Countdown, _frame: &mut TaskFrame<'_>, handle: &TaskHandle)
///     -> Result<(), TaskError>
/// {
///     ctx.left -= 1;
///     if ctx.left == 0 {
///         handle.stop();
///     }
///     Ok(())
/// }
///
/// let mut stage = Stage::new();
/// let mut tasks = TaskScheduler::new();
/// let handle = tasks.add_task(tick, Countdown { left: 2 });
///
/// tasks.advance(16.0, &mut stage).unwrap();
/// tasks.advance(16.0, &mut stage).unwrap();
/// assert!(!handle.is_alive());
/// assert!(tasks.is_empty());
/// ```
pub struct TaskScheduler {
    entries: Vec<TaskEntry>,
    spawned: Vec<TaskEntry>,
    next_id: u64,
    ticks: u64,
}

impl TaskScheduler {
    //--- Construction -----------------------------------------------------

    pub fn new() -> Self {
        Self {
            entries: Vec::with_capacity(32),
            spawned: Vec::new(),
            next_id: 0,
            ticks: 0,
        }
    }

    //--- Registration -----------------------------------------------------

    /// Registers a callback with its context. Always succeeds.
    pub fn add_task<C: 'static>(&mut self, callback: TaskFn<C>, context: C) -> TaskHandle {
        self.spawn(Callback { callback, context })
    }

    /// Registers a [`Task`] value.
    pub fn spawn<T: Task>(&mut self, task: T) -> TaskHandle {
        let handle = register(&mut self.entries, &mut self.next_id, Box::new(task));
        debug!(target: "scheduler", "Task {} added ({} live)", handle.id(), self.len());
        handle
    }

    /// Registers a closure as a task.
    pub fn spawn_fn<F>(&mut self, task: F) -> TaskHandle
    where
        F: FnMut(f64, &mut TaskFrame<'_>, &TaskHandle) -> Result<(), TaskError> + 'static,
    {
        self.spawn(FnTask(task))
    }

    //--- Update Loop ------------------------------------------------------

    /// Steps every live task once with `delta` milliseconds.
    ///
    /// # Errors
    ///
    /// Returns the first [`TaskFault`]; the failing task is stopped and the
    /// tasks after it are not stepped this tick.
    pub fn advance(&mut self, delta: f64, stage: &mut Stage) -> Result<(), TaskFault> {
        self.ticks += 1;

        let mut frame = TaskFrame {
            stage,
            spawned: &mut self.spawned,
            next_id: &mut self.next_id,
        };
        let mut outcome = Ok(());

        for entry in &mut self.entries {
            if !entry.handle.is_alive() {
                continue;
            }

            if let Err(source) = entry.task.step(delta, &mut frame, &entry.handle) {
                entry.handle.stop();
                error!(
                    target: "scheduler",
                    "Task {} failed on tick {}: {}",
                    entry.handle.id(),
                    self.ticks,
                    source
                );
                outcome = Err(TaskFault {
                    id: entry.handle.id(),
                    source,
                });
                break;
            }
        }

        self.evict_and_merge();
        trace!(target: "scheduler", "Tick {} done ({} live)", self.ticks, self.entries.len());
        outcome
    }

    fn evict_and_merge(&mut self) {
        self.entries.retain(|entry| entry.handle.is_alive());
        self.spawned.retain(|entry| entry.handle.is_alive());
        self.entries.append(&mut self.spawned);
    }

    //--- Cancellation -----------------------------------------------------

    /// Stops one task. Idempotent.
    pub fn stop(&mut self, handle: &TaskHandle) {
        if handle.is_alive() {
            debug!(target: "scheduler", "Task {} stopped", handle.id());
        }
        handle.stop();
    }

    /// Stops and evicts every task, including ones spawned this tick.
    pub fn stop_all(&mut self) {
        let count = self.len();
        for entry in self.entries.iter().chain(self.spawned.iter()) {
            entry.handle.stop();
        }
        self.entries.clear();
        self.spawned.clear();
        debug!(target: "scheduler", "Stopped all tasks ({} were live)", count);
    }

    //--- Queries ----------------------------------------------------------

    /// Number of live tasks, including ones waiting for their first tick.
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .chain(self.spawned.iter())
            .filter(|entry| entry.handle.is_alive())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of completed `advance` calls.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl Default for TaskScheduler {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    fn recorder(
        log: &Log,
        name: &'static str,
    ) -> impl FnMut(f64, &mut TaskFrame<'_>, &TaskHandle) -> Result<(), TaskError> {
        let log = Rc::clone(log);
        move |_, _, _| {
            log.borrow_mut().push(name);
            Ok(())
        }
    }

    //=====================================================================
    // Ordering Tests
    //=====================================================================

    #[test]
    fn tasks_run_in_insertion_order() {
        let mut stage = Stage::new();
        let mut tasks = TaskScheduler::new();
        let log: Log = Rc::default();

        tasks.spawn_fn(recorder(&log, "a"));
        tasks.spawn_fn(recorder(&log, "b"));
        tasks.spawn_fn(recorder(&log, "c"));

        tasks.advance(16.0, &mut stage).unwrap();
        tasks.spawn_fn(recorder(&log, "d"));
        tasks.advance(16.0, &mut stage).unwrap();

        assert_eq!(*log.borrow(), vec!["a", "b", "c", "a", "b", "c", "d"]);
    }

    #[test]
    fn delta_and_context_reach_callback() {
        fn accumulate(
            delta: f64,
            total: &mut Rc<RefCell<f64>>,
            _frame: &mut TaskFrame<'_>,
            _handle: &TaskHandle,
        ) -> Result<(), TaskError> {
            *total.borrow_mut() += delta;
            Ok(())
        }

        let mut stage = Stage::new();
        let mut tasks = TaskScheduler::new();
        let total = Rc::new(RefCell::new(0.0));
        tasks.add_task(accumulate, Rc::clone(&total));

        tasks.advance(0.0, &mut stage).unwrap();
        tasks.advance(33.0, &mut stage).unwrap();
        tasks.advance(17.0, &mut stage).unwrap();

        assert_eq!(*total.borrow(), 50.0);
        assert_eq!(tasks.ticks(), 3);
    }

    //=====================================================================
    // Same-Tick Mutation Tests
    //=====================================================================

    #[test]
    fn self_stop_is_not_stepped_again() {
        let mut stage = Stage::new();
        let mut tasks = TaskScheduler::new();
        let calls = Rc::new(RefCell::new(0));

        let counter = Rc::clone(&calls);
        let handle = tasks.spawn_fn(move |_, _, handle| {
            *counter.borrow_mut() += 1;
            handle.stop();
            Ok(())
        });

        for _ in 0..3 {
            tasks.advance(16.0, &mut stage).unwrap();
        }

        assert_eq!(*calls.borrow(), 1);
        assert!(!handle.is_alive());
        assert!(tasks.is_empty());
    }

    #[test]
    fn self_stop_does_not_skip_siblings() {
        let mut stage = Stage::new();
        let mut tasks = TaskScheduler::new();
        let log: Log = Rc::default();

        tasks.spawn_fn(recorder(&log, "a"));
        let inner = Rc::clone(&log);
        tasks.spawn_fn(move |_, _, handle| {
            inner.borrow_mut().push("b");
            handle.stop();
            Ok(())
        });
        tasks.spawn_fn(recorder(&log, "c"));

        tasks.advance(16.0, &mut stage).unwrap();
        tasks.advance(16.0, &mut stage).unwrap();

        assert_eq!(*log.borrow(), vec!["a", "b", "c", "a", "c"]);
    }

    #[test]
    fn task_stopped_by_earlier_sibling_is_skipped() {
        let mut stage = Stage::new();
        let mut tasks = TaskScheduler::new();
        let log: Log = Rc::default();

        let victim_slot: Rc<RefCell<Option<TaskHandle>>> = Rc::default();
        let slot = Rc::clone(&victim_slot);
        tasks.spawn_fn(move |_, _, _| {
            if let Some(victim) = slot.borrow().as_ref() {
                victim.stop();
            }
            Ok(())
        });
        let victim = tasks.spawn_fn(recorder(&log, "victim"));
        *victim_slot.borrow_mut() = Some(victim);

        tasks.advance(16.0, &mut stage).unwrap();

        assert!(log.borrow().is_empty(), "Stopped task must not run in the same pass");
        assert_eq!(tasks.len(), 1);
    }

    #[test]
    fn task_spawned_mid_tick_runs_next_tick() {
        let mut stage = Stage::new();
        let mut tasks = TaskScheduler::new();
        let log: Log = Rc::default();

        let outer = Rc::clone(&log);
        tasks.spawn_fn(move |_, frame, handle| {
            outer.borrow_mut().push("parent");
            let child_log = Rc::clone(&outer);
            frame.spawn_fn(move |_, _, _| {
                child_log.borrow_mut().push("child");
                Ok(())
            });
            handle.stop();
            Ok(())
        });

        tasks.advance(16.0, &mut stage).unwrap();
        assert_eq!(*log.borrow(), vec!["parent"], "Child must not run on tick N");
        assert_eq!(tasks.len(), 1);

        tasks.advance(16.0, &mut stage).unwrap();
        assert_eq!(*log.borrow(), vec!["parent", "child"]);
    }

    #[test]
    fn callback_added_mid_tick_runs_next_tick() {
        fn count(
            _delta: f64,
            hits: &mut Rc<RefCell<u32>>,
            _frame: &mut TaskFrame<'_>,
            _handle: &TaskHandle,
        ) -> Result<(), TaskError> {
            *hits.borrow_mut() += 1;
            Ok(())
        }

        let mut stage = Stage::new();
        let mut tasks = TaskScheduler::new();
        let hits = Rc::new(RefCell::new(0));

        let context = Rc::clone(&hits);
        let mut pending = Some(context);
        tasks.spawn_fn(move |_, frame, handle| {
            if let Some(context) = pending.take() {
                frame.add_task(count, context);
            }
            handle.stop();
            Ok(())
        });

        tasks.advance(16.0, &mut stage).unwrap();
        assert_eq!(*hits.borrow(), 0, "Callback must not run on the tick it was added");
        assert_eq!(tasks.len(), 1);

        tasks.advance(16.0, &mut stage).unwrap();
        tasks.advance(16.0, &mut stage).unwrap();
        assert_eq!(*hits.borrow(), 2);
    }

    #[test]
    fn spawned_task_stopped_before_merge_is_dropped() {
        let mut stage = Stage::new();
        let mut tasks = TaskScheduler::new();

        tasks.spawn_fn(|_, frame, handle| {
            let child = frame.spawn_fn(|_, _, _| Err(TaskError::Custom("must not run".into())));
            child.stop();
            handle.stop();
            Ok(())
        });

        tasks.advance(16.0, &mut stage).unwrap();
        assert!(tasks.is_empty());
        tasks.advance(16.0, &mut stage).unwrap();
    }

    //=====================================================================
    // Cancellation Tests
    //=====================================================================

    #[test]
    fn stop_is_idempotent() {
        let mut stage = Stage::new();
        let mut tasks = TaskScheduler::new();
        let log: Log = Rc::default();

        let handle = tasks.spawn_fn(recorder(&log, "a"));
        tasks.spawn_fn(recorder(&log, "b"));

        tasks.stop(&handle);
        tasks.stop(&handle);
        handle.stop();

        tasks.advance(16.0, &mut stage).unwrap();
        assert_eq!(*log.borrow(), vec!["b"]);
        assert_eq!(tasks.len(), 1);
    }

    #[test]
    fn stop_all_clears_everything() {
        let mut stage = Stage::new();
        let mut tasks = TaskScheduler::new();
        let log: Log = Rc::default();

        let a = tasks.spawn_fn(recorder(&log, "a"));
        let b = tasks.spawn_fn(recorder(&log, "b"));
        tasks.stop(&a);

        tasks.stop_all();

        assert_eq!(tasks.len(), 0);
        assert!(!b.is_alive());
        tasks.advance(16.0, &mut stage).unwrap();
        assert!(log.borrow().is_empty(), "No callback may fire after stop_all");
    }

    //=====================================================================
    // Fault Tests
    //=====================================================================

    #[test]
    fn failing_task_aborts_rest_of_tick() {
        let mut stage = Stage::new();
        let mut tasks = TaskScheduler::new();
        let log: Log = Rc::default();

        tasks.spawn_fn(recorder(&log, "before"));
        let failing = tasks.spawn_fn(|_, _, _| Err(TaskError::Custom("boom".into())));
        tasks.spawn_fn(recorder(&log, "after"));

        let fault = tasks.advance(16.0, &mut stage).unwrap_err();
        assert_eq!(fault.id, failing.id());
        assert!(!failing.is_alive(), "Failing task is stopped");
        assert_eq!(*log.borrow(), vec!["before"]);

        tasks.advance(16.0, &mut stage).unwrap();
        assert_eq!(*log.borrow(), vec!["before", "before", "after"]);
        assert_eq!(tasks.len(), 2);
    }

    #[test]
    fn failing_task_keeps_children_spawned_earlier() {
        let mut stage = Stage::new();
        let mut tasks = TaskScheduler::new();
        let log: Log = Rc::default();

        let outer = Rc::clone(&log);
        tasks.spawn_fn(move |_, frame, _| {
            let child_log = Rc::clone(&outer);
            frame.spawn_fn(move |_, _, handle| {
                child_log.borrow_mut().push("child");
                handle.stop();
                Ok(())
            });
            Err(TaskError::Custom("parent failed".into()))
        });

        assert!(tasks.advance(16.0, &mut stage).is_err());
        tasks.advance(16.0, &mut stage).unwrap();
        assert_eq!(*log.borrow(), vec!["child"]);
    }

    #[test]
    fn stale_node_access_surfaces_as_stage_fault() {
        let mut stage = Stage::new();
        let node = stage.create_container();
        stage.destroy(node).unwrap();

        let mut tasks = TaskScheduler::new();
        tasks.spawn_fn(move |_, frame, _| {
            frame.stage.node_mut(node)?.alpha = 0.0;
            Ok(())
        });

        let fault = tasks.advance(16.0, &mut stage).unwrap_err();
        assert!(matches!(fault.source, TaskError::Stage(_)));
    }
}
