// src/sync/interrupt.rs
//! Interrupt controller abstraction and the interrupt-masking spin lock.

use core::fmt;

use spin::Mutex;

/// Controls interrupt delivery on the current core
///
/// Implemented by the embedding kernel for its architecture. Calls nest:
/// `restore` only re-enables interrupts if they were enabled before the
/// matching `disable`.
pub trait InterruptController: Send + Sync {
    /// Mask interrupts on the current core
    ///
    /// # Returns
    /// Whether interrupts were enabled before the call
    fn disable(&self) -> bool;

    /// Undo a `disable` that returned `was_enabled`
    fn restore(&self, was_enabled: bool);
}

/// Controller for contexts without interrupts
///
/// For host builds and executors whose completions only ever arrive from
/// thread context.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInterrupts;

impl InterruptController for NoInterrupts {
    fn disable(&self) -> bool {
        false
    }

    fn restore(&self, _was_enabled: bool) {}
}

/// Run `f` with interrupts masked on the current core
pub fn without_interrupts<F, R>(irq: &dyn InterruptController, f: F) -> R
where
    F: FnOnce() -> R,
{
    let was_enabled = irq.disable();
    let result = f();
    irq.restore(was_enabled);
    result
}

/// Spin lock held only with interrupts masked
///
/// The guard never escapes [`with`](Self::with), so the lock is always
/// released before interrupts come back on.
pub struct IrqMutex<T> {
    lock: Mutex<T>,
    irq: &'static dyn InterruptController,
}

impl<T> IrqMutex<T> {
    /// Create a lock masking interrupts through `irq`
    pub const fn new(value: T, irq: &'static dyn InterruptController) -> Self {
        Self {
            lock: Mutex::new(value),
            irq,
        }
    }

    /// Run `f` on the protected value
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        without_interrupts(self.irq, || f(&mut self.lock.lock()))
    }
}

impl<T: fmt::Debug> fmt::Debug for IrqMutex<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IrqMutex").field("lock", &self.lock).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    /// Single-core interrupt flag
    struct FakeCpu {
        enabled: AtomicBool,
        disables: AtomicU32,
    }

    impl InterruptController for FakeCpu {
        fn disable(&self) -> bool {
            self.disables.fetch_add(1, Ordering::Relaxed);
            self.enabled.swap(false, Ordering::SeqCst)
        }

        fn restore(&self, was_enabled: bool) {
            if was_enabled {
                self.enabled.store(true, Ordering::SeqCst);
            }
        }
    }

    static CPU: FakeCpu = FakeCpu {
        enabled: AtomicBool::new(true),
        disables: AtomicU32::new(0),
    };

    #[test]
    fn test_lock_held_with_interrupts_masked() {
        let outer = IrqMutex::new(1u32, &CPU);
        let inner = IrqMutex::new(2u32, &CPU);

        let sum = outer.with(|a| {
            assert!(!CPU.enabled.load(Ordering::SeqCst));
            // Nested lock keeps interrupts off until the outer one is released
            let b = inner.with(|b| *b);
            assert!(!CPU.enabled.load(Ordering::SeqCst));
            *a + b
        });

        assert_eq!(sum, 3);
        assert!(CPU.enabled.load(Ordering::SeqCst));
        assert_eq!(CPU.disables.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_no_interrupts_is_transparent() {
        let lock = IrqMutex::new(5u32, &NoInterrupts);
        lock.with(|value| *value += 1);
        assert_eq!(lock.with(|value| *value), 6);
    }
}
