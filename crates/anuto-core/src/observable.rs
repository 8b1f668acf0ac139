//! Published scalar that notifies subscribers on value transitions only.

use std::fmt;

type Listener<T> = Box<dyn FnMut(&T) + Send>;

/// A value with change listeners. `set` is a no-op, and notifies nobody,
/// when the new value equals the current one.
pub struct Observable<T> {
    value: T,
    listeners: Vec<Listener<T>>,
}

impl<T: PartialEq> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            listeners: Vec::new(),
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Store `value` and notify listeners if it differs. Returns whether it changed.
    pub fn set(&mut self, value: T) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value;
        for listener in &mut self.listeners {
            listener(&self.value);
        }
        true
    }

    /// Register a listener called with the new value after every transition.
    pub fn subscribe(&mut self, listener: impl FnMut(&T) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }
}

impl<T: Copy + PartialEq> Observable<T> {
    pub fn value(&self) -> T {
        self.value
    }

    /// Apply `f` to the current value and store the result.
    pub fn update(&mut self, f: impl FnOnce(T) -> T) -> bool {
        let next = f(self.value);
        self.set(next)
    }
}

impl<T: PartialEq + Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.value)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counted(observable: &mut Observable<bool>) -> Arc<AtomicUsize> {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        observable.subscribe(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });
        calls
    }

    #[test]
    fn test_set_same_value_is_silent() {
        let mut ready = Observable::new(false);
        let calls = counted(&mut ready);

        assert!(!ready.set(false));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_set_new_value_fires_once() {
        let mut ready = Observable::new(false);
        let calls = counted(&mut ready);

        assert!(ready.set(true));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!ready.set(true));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_listener_sees_new_value() {
        let mut count = Observable::new(3u32);
        let seen = Arc::new(AtomicUsize::new(0));
        let s = seen.clone();
        count.subscribe(move |v| s.store(*v as usize, Ordering::SeqCst));

        count.update(|v| v + 4);
        assert_eq!(seen.load(Ordering::SeqCst), 7);
        assert_eq!(count.value(), 7);
    }
}
