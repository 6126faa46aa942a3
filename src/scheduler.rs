//! Virtual-time task scheduler.
//!
//! Stands in for `setTimeout` / `setInterval`: tasks are plain values queued at an
//! absolute due time and handed back to the owner in due order by `pop_due`. The
//! browser glue feeds it `performance.now()`, tests feed it whatever time they like.
//! Tasks scheduled while a due task is being handled are timed from that task's
//! due time, so a chain of delays plays out identically regardless of how coarse
//! the calls to `advance_to` are.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

struct Entry<T> {
    handle: TaskHandle,
    due: f64,
    every: Option<f64>,
    task: T,
}

pub struct Scheduler<T> {
    now: f64,
    next_id: u64,
    entries: Vec<Entry<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self { now: 0.0, next_id: 0, entries: Vec::new() }
    }

    /// Current virtual time (ms).
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn schedule_once(&mut self, delay_ms: f64, task: T) -> TaskHandle {
        self.push(delay_ms, None, task)
    }

    /// First run happens one `interval_ms` from now.
    pub fn schedule_repeating(&mut self, interval_ms: f64, task: T) -> TaskHandle {
        // A zero interval would spin forever inside one `advance_to`.
        let interval = interval_ms.max(1.0);
        self.push(interval, Some(interval), task)
    }

    /// Returns false when the handle already ran (one-shot) or was cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        self.entries.len() != before
    }

    pub fn is_scheduled(&self, handle: TaskHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }

    fn push(&mut self, delay_ms: f64, every: Option<f64>, task: T) -> TaskHandle {
        let handle = TaskHandle(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry { handle, due: self.now + delay_ms.max(0.0), every, task });
        handle
    }

    /// Index of the earliest entry due at or before `until`. Ties resolve to the
    /// handle scheduled first.
    fn earliest_due(&self, until: f64) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (idx, e) in self.entries.iter().enumerate() {
            if e.due > until {
                continue;
            }
            match best {
                Some(b) => {
                    let cur = &self.entries[b];
                    if e.due < cur.due || (e.due == cur.due && e.handle < cur.handle) {
                        best = Some(idx);
                    }
                }
                None => best = Some(idx),
            }
        }
        best
    }

    /// Set the clock to `now` after every task up to it has been popped.
    pub fn advance_to(&mut self, now: f64) {
        if now > self.now {
            self.now = now;
        }
    }
}

impl<T: Clone> Scheduler<T> {
    /// Pop the next task due at or before `until`, moving the clock to its due
    /// time. Repeating tasks are re-armed one interval later.
    pub fn pop_due(&mut self, until: f64) -> Option<(TaskHandle, T)> {
        let idx = self.earliest_due(until)?;
        let due = self.entries[idx].due;
        if due > self.now {
            self.now = due;
        }
        match self.entries[idx].every {
            Some(every) => {
                let entry = &mut self.entries[idx];
                entry.due += every;
                Some((entry.handle, entry.task.clone()))
            }
            None => {
                let entry = self.entries.remove(idx);
                Some((entry.handle, entry.task))
            }
        }
    }
}
