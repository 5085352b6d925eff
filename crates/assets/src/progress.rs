use std::fmt;

/// 進度的生命週期狀態。 / Lifecycle state of a tracked process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressState {
    Running,
    Finished,
    Cancelled,
    Failed,
}

/// 進度快照。 / Point-in-time view handed to observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub name: String,
    pub value: u64,
    pub max: u64,
    pub state: ProgressState,
}

impl ProgressSnapshot {
    /// 完成比例（0.0–1.0）。 / Completed fraction, clamped to `0.0..=1.0`.
    pub fn fraction(&self) -> f64 {
        if self.state == ProgressState::Finished {
            return 1.0;
        }
        if self.max == 0 {
            return 0.0;
        }
        (self.value as f64 / self.max as f64).clamp(0.0, 1.0)
    }
}

type Observer = Box<dyn FnMut(&ProgressSnapshot)>;

/// 長時間工作的進度條模型。 / Progress of one long running job.
///
/// Once finished, cancelled or failed the progress is frozen and further
/// updates are ignored.
pub struct Progress {
    name: String,
    value: u64,
    max: u64,
    state: ProgressState,
    observers: Vec<Observer>,
}

impl fmt::Debug for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Progress")
            .field("name", &self.name)
            .field("value", &self.value)
            .field("max", &self.max)
            .field("state", &self.state)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Progress {
    pub fn new(name: impl Into<String>, max: u64) -> Self {
        Self {
            name: name.into(),
            value: 0,
            max,
            state: ProgressState::Running,
            observers: Vec::new(),
        }
    }

    /// 註冊觀察者。 / Registers a callback that receives every change.
    pub fn observe(&mut self, observer: impl FnMut(&ProgressSnapshot) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn max(&self) -> u64 {
        self.max
    }

    pub fn state(&self) -> ProgressState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ProgressState::Running
    }

    pub fn fraction(&self) -> f64 {
        self.snapshot().fraction()
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            name: self.name.clone(),
            value: self.value,
            max: self.max,
            state: self.state,
        }
    }

    pub fn increment(&mut self) {
        if self.is_running() {
            self.value = self.value.saturating_add(1);
            self.notify();
        }
    }

    pub fn set_value(&mut self, value: u64) {
        if self.is_running() {
            self.value = value;
            self.notify();
        }
    }

    pub fn set_max(&mut self, max: u64) {
        if self.is_running() {
            self.max = max;
            self.notify();
        }
    }

    pub fn finish(&mut self) {
        self.settle(ProgressState::Finished);
    }

    pub fn cancel(&mut self) {
        self.settle(ProgressState::Cancelled);
    }

    pub fn fail(&mut self) {
        self.settle(ProgressState::Failed);
    }

    fn settle(&mut self, state: ProgressState) {
        if self.is_running() {
            self.state = state;
            if state == ProgressState::Finished {
                self.value = self.max;
            }
            tracing::debug!(name = %self.name, ?state, "progress settled");
            self.notify();
        }
    }

    fn notify(&mut self) {
        let snapshot = self.snapshot();
        for observer in &mut self.observers {
            observer(&snapshot);
        }
    }
}
