//! Thread-confined slot holding the callback handler the stand-in forwards to.
//!
//! A scope remembers only the value it displaced and puts it back when it
//! ends, whether the work returns, fails, or unwinds. Scopes on one thread are
//! therefore strictly nested, and scopes on different threads never observe
//! each other. No locks are involved.

use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::Arc;
use std::thread::LocalKey;

use authbridge_core::CallbackHandler;

/// Per-thread storage cell backing a [`DelegateStore`].
pub type DelegateSlot = RefCell<Option<Arc<dyn CallbackHandler>>>;

thread_local! {
    static INSTALLED: DelegateSlot = const { RefCell::new(None) };
}

static GLOBAL: DelegateStore = DelegateStore { slot: &INSTALLED };

/// Handle to a thread-local delegate slot.
///
/// The process uses exactly one store, [`DelegateStore::global`]. The handle
/// itself is immutable and freely shared; only the per-thread slot changes.
pub struct DelegateStore {
    slot: &'static LocalKey<DelegateSlot>,
}

impl DelegateStore {
    /// The process-wide store.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// A store over a caller-supplied slot. Used to give tests an isolated slot.
    #[cfg(test)]
    pub(crate) const fn with_slot(slot: &'static LocalKey<DelegateSlot>) -> Self {
        Self { slot }
    }

    /// Run `work` with `value` installed on the calling thread and return its
    /// result.
    ///
    /// The previously installed value is restored before this returns, even
    /// if `work` returns an error or panics. Nested calls are independent:
    /// each restores only what it displaced.
    pub fn run_with_value<R>(&self, value: Arc<dyn CallbackHandler>, work: impl FnOnce() -> R) -> R {
        let _scope = Scope::enter(self.slot, value);
        work()
    }

    /// Run `work` with `value` installed on the calling thread.
    ///
    /// Same restore guarantee as [`run_with_value`](Self::run_with_value).
    pub fn run(&self, value: Arc<dyn CallbackHandler>, work: impl FnOnce()) {
        self.run_with_value(value, work);
    }

    /// The value installed on the calling thread, if any.
    #[must_use]
    pub fn current(&self) -> Option<Arc<dyn CallbackHandler>> {
        self.slot.with(|slot| slot.borrow().clone())
    }

    /// Whether any value is installed on the calling thread.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.slot.with(|slot| slot.borrow().is_some())
    }
}

impl std::fmt::Debug for DelegateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DelegateStore")
            .field("active", &self.is_active())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Scope
// ---------------------------------------------------------------------------

/// RAII frame that restores the displaced value on drop.
///
/// Not `Send`: a frame must be closed on the thread that opened it.
struct Scope {
    slot: &'static LocalKey<DelegateSlot>,
    previous: Option<Arc<dyn CallbackHandler>>,
    _not_send: PhantomData<*const ()>,
}

impl Scope {
    fn enter(slot: &'static LocalKey<DelegateSlot>, value: Arc<dyn CallbackHandler>) -> Self {
        let previous = slot.with(|cell| cell.replace(Some(value)));
        tracing::trace!(nested = previous.is_some(), "delegate scope entered");
        Self {
            slot,
            previous,
            _not_send: PhantomData,
        }
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        let previous = self.previous.take();
        // The displaced value is dropped outside the borrow so its destructor
        // may touch the slot.
        let displaced = self.slot.try_with(|cell| cell.replace(previous));
        drop(displaced);
        tracing::trace!("delegate scope restored");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use std::sync::Barrier;
    use std::time::Duration;

    use authbridge_core::CallbackError;
    use proptest::prelude::*;

    use super::*;
    use crate::delegate::handler::ThreadLocalCallbackHandler;
    use crate::delegate::testing::{observed_tag, try_observed_tag, TagHandler};

    thread_local! {
        static TEST_SLOT: DelegateSlot = const { RefCell::new(None) };
    }

    static TEST_STORE: DelegateStore = DelegateStore::with_slot(&TEST_SLOT);

    fn current_tag(store: &DelegateStore) -> Option<String> {
        store.current().map(|handler| observed_tag(handler.as_ref()))
    }

    #[test]
    fn nothing_installed_outside_scope() {
        assert!(TEST_STORE.current().is_none());
        assert!(!TEST_STORE.is_active());
    }

    #[test]
    fn run_with_value_installs_and_restores() {
        let result = TEST_STORE.run_with_value(TagHandler::arc("x"), || {
            assert!(TEST_STORE.is_active());
            current_tag(&TEST_STORE)
        });

        assert_eq!(result.as_deref(), Some("x"));
        assert!(TEST_STORE.current().is_none());
    }

    #[test]
    fn run_flavour_restores() {
        let mut seen = None;
        TEST_STORE.run(TagHandler::arc("unit"), || seen = current_tag(&TEST_STORE));

        assert_eq!(seen.as_deref(), Some("unit"));
        assert!(!TEST_STORE.is_active());
    }

    #[test]
    fn nested_scopes_restore_only_what_they_displaced() {
        TEST_STORE.run(TagHandler::arc("outer"), || {
            TEST_STORE.run(TagHandler::arc("inner"), || {
                assert_eq!(current_tag(&TEST_STORE).as_deref(), Some("inner"));
            });
            assert_eq!(current_tag(&TEST_STORE).as_deref(), Some("outer"));
        });
        assert!(TEST_STORE.current().is_none());
    }

    #[test]
    fn restores_after_error() {
        let result: Result<(), CallbackError> = TEST_STORE.run_with_value(TagHandler::arc("x"), || {
            Err(CallbackError::Unsupported {
                kind: "Other".to_string(),
            })
        });

        assert!(matches!(result, Err(CallbackError::Unsupported { .. })));
        assert!(TEST_STORE.current().is_none());
    }

    #[test]
    fn restores_after_panic() {
        TEST_STORE.run(TagHandler::arc("outer"), || {
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                TEST_STORE.run(TagHandler::arc("doomed"), || panic!("boom"));
            }));
            assert!(outcome.is_err());
            assert_eq!(current_tag(&TEST_STORE).as_deref(), Some("outer"));
        });
        assert!(TEST_STORE.current().is_none());
    }

    #[test]
    fn reentry_from_inside_work_sees_the_inner_value() {
        // Work that reads and re-enters the store while a scope is open must
        // not trip over an outstanding borrow.
        let tags = TEST_STORE.run_with_value(TagHandler::arc("a"), || {
            let first = current_tag(&TEST_STORE);
            let second = TEST_STORE.run_with_value(TagHandler::arc("b"), || current_tag(&TEST_STORE));
            (first, second, current_tag(&TEST_STORE))
        });

        assert_eq!(
            tags,
            (Some("a".to_string()), Some("b".to_string()), Some("a".to_string()))
        );
    }

    #[test]
    fn threads_never_observe_each_other() {
        let barrier = Barrier::new(2);

        std::thread::scope(|s| {
            let a = s.spawn(|| {
                TEST_STORE.run_with_value(TagHandler::arc("X"), || {
                    barrier.wait();
                    std::thread::sleep(Duration::from_millis(50));
                    current_tag(&TEST_STORE)
                })
            });
            let b = s.spawn(|| {
                barrier.wait();
                let outside = current_tag(&TEST_STORE);
                let inside =
                    TEST_STORE.run_with_value(TagHandler::arc("Y"), || current_tag(&TEST_STORE));
                (outside, inside)
            });

            assert_eq!(a.join().unwrap().as_deref(), Some("X"));
            let (outside, inside) = b.join().unwrap();
            assert_eq!(outside, None);
            assert_eq!(inside.as_deref(), Some("Y"));
        });
    }

    #[test]
    fn global_store_is_a_single_instance() {
        assert!(std::ptr::eq(DelegateStore::global(), DelegateStore::global()));
    }

    /// Opens one scope per tag, innermost last. On the way in and on the way
    /// out, both the store and a stand-in reading from it must report the
    /// innermost open scope.
    fn nest(
        store: &DelegateStore,
        stand_in: &ThreadLocalCallbackHandler,
        tags: &[String],
        expected_outside: Option<&str>,
    ) {
        let seen = || {
            let direct = current_tag(store);
            let forwarded = try_observed_tag(stand_in).ok();
            assert_eq!(direct, forwarded);
            direct
        };
        let Some((first, rest)) = tags.split_first() else {
            return;
        };
        store.run(TagHandler::arc(first), || {
            assert_eq!(seen().as_deref(), Some(first.as_str()));
            nest(store, stand_in, rest, Some(first));
            assert_eq!(seen().as_deref(), Some(first.as_str()));
        });
        assert_eq!(seen().as_deref(), expected_outside);
    }

    proptest! {
        #[test]
        fn innermost_scope_always_wins(tags in proptest::collection::vec("[a-z]{1,6}", 0..12)) {
            let stand_in = ThreadLocalCallbackHandler::new(&TEST_STORE);
            nest(&TEST_STORE, &stand_in, &tags, None);
            prop_assert!(try_observed_tag(&stand_in).is_err());
            prop_assert!(TEST_STORE.current().is_none());
        }
    }
}
