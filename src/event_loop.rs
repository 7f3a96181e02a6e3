use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

/// Deferred work the page knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    ClearThemeTransition,
    WidgetThemeRetry,
}

#[derive(Debug)]
struct Timer {
    due: Duration,
    // Bumped on every (re)arm; breaks ties between equal deadlines.
    seq: u64,
    interval: Option<Duration>,
    task: Task,
}

/// Single-threaded timer queue on a virtual clock.
///
/// Nothing fires on its own: the owner pulls due tasks with [`EventLoop::pop_due`] and runs them.
#[derive(Debug, Default)]
pub struct EventLoop {
    now: Duration,
    next_id: u64,
    next_seq: u64,
    timers: BTreeMap<TimerId, Timer>,
}

impl EventLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn set_timeout(&mut self, delay: Duration, task: Task) -> TimerId {
        self.schedule(delay, None, task)
    }

    pub fn set_interval(&mut self, period: Duration, task: Task) -> TimerId {
        // A zero period would spin forever inside a single advance.
        let period = period.max(Duration::from_millis(1));
        self.schedule(period, Some(period), task)
    }

    fn schedule(&mut self, delay: Duration, interval: Option<Duration>, task: Task) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let seq = self.bump_seq();
        self.timers.insert(
            id,
            Timer {
                due: self.now + delay,
                seq,
                interval,
                task,
            },
        );
        id
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.timers.remove(&id).is_some()
    }

    pub fn cancel_all(&mut self) -> usize {
        let n = self.timers.len();
        self.timers.clear();
        n
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.contains_key(&id)
    }

    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.values().map(|t| t.due).min()
    }

    /// Takes the earliest timer due at or before `until` and moves the clock to its deadline.
    /// Intervals are re-armed before being handed out, so the task may cancel itself.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerId, Task)> {
        let (id, due) = self
            .timers
            .iter()
            .filter(|(_, t)| t.due <= until)
            .min_by_key(|(_, t)| (t.due, t.seq))
            .map(|(id, t)| (*id, t.due))?;

        self.now = self.now.max(due);
        let seq = self.bump_seq();
        let timer = self.timers.get_mut(&id)?;
        let task = timer.task;
        match timer.interval {
            Some(period) => {
                timer.due = due + period;
                timer.seq = seq;
            }
            None => {
                self.timers.remove(&id);
            }
        }
        Some((id, task))
    }

    pub fn advance_to(&mut self, t: Duration) {
        self.now = self.now.max(t);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    Pending,
    Satisfied,
    Exhausted,
}

/// Repeats a task on an interval until a success predicate holds or attempts run out.
#[derive(Debug)]
pub struct PollingTask {
    interval: Duration,
    max_attempts: u32,
    attempts: u32,
    timer: Option<TimerId>,
}

impl PollingTask {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
            attempts: 0,
            timer: None,
        }
    }

    pub fn start(&mut self, event_loop: &mut EventLoop, task: Task) {
        self.cancel(event_loop);
        self.attempts = 0;
        if self.max_attempts == 0 {
            return;
        }
        self.timer = Some(event_loop.set_interval(self.interval, task));
    }

    pub fn record_attempt(&mut self, event_loop: &mut EventLoop, satisfied: bool) -> PollStatus {
        self.attempts += 1;
        let status = if satisfied {
            PollStatus::Satisfied
        } else if self.attempts >= self.max_attempts {
            PollStatus::Exhausted
        } else {
            PollStatus::Pending
        };
        if status != PollStatus::Pending {
            self.cancel(event_loop);
        }
        status
    }

    pub fn cancel(&mut self, event_loop: &mut EventLoop) {
        if let Some(id) = self.timer.take() {
            event_loop.cancel(id);
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}
