use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle of a store instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Active,
    Disposed,
}

impl LifecycleState {
    fn as_u8(self) -> u8 {
        match self {
            LifecycleState::Active => 0,
            LifecycleState::Disposed => 1,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => LifecycleState::Active,
            _ => LifecycleState::Disposed,
        }
    }
}

/// Shared, lock-free holder for a [`LifecycleState`].
///
/// Transitions are one-way: once disposed, a store stays disposed.
#[derive(Debug)]
pub struct Lifecycle {
    state: AtomicU8,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(LifecycleState::Active.as_u8()),
        }
    }

    pub fn state(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn dispose(&self) {
        self.state
            .store(LifecycleState::Disposed.as_u8(), Ordering::Release);
    }

    pub fn is_disposed(&self) -> bool {
        self.state() == LifecycleState::Disposed
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_active_and_disposes_once() {
        let lifecycle = Lifecycle::new();
        assert_eq!(lifecycle.state(), LifecycleState::Active);
        lifecycle.dispose();
        assert!(lifecycle.is_disposed());
        lifecycle.dispose();
        assert_eq!(lifecycle.state(), LifecycleState::Disposed);
    }
}
