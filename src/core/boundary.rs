//! # Fault boundary: turn a panic into a [`CaughtFailure`].
//!
//! Wraps one call (or one future) in `catch_unwind` and converts any panic
//! into a typed value. Unwinding never travels past the boundary.
//!
//! ## Panic site capture
//! By the time `catch_unwind` returns, the panicking stack is gone. To report
//! *where* the panic happened, a process-wide panic hook is installed once.
//! The hook only acts on the current thread while it is inside a boundary:
//! ```text
//! catch(capture, f)
//!   ├─► Scope::enter(capture)          (thread-local depth + capture flag)
//!   ├─► catch_unwind(f)
//!   │     └─ panic ─► hook: inside scope?
//!   │                   ├─ yes → record location (+ backtrace if capture), stay quiet
//!   │                   └─ no  → delegate to the previously installed hook
//!   └─► Scope drop, take recorded site → CaughtFailure
//! ```
//!
//! ## Rules
//! - Panics outside a boundary keep the default (or user-installed) behavior.
//! - Supervised panics are not printed by the hook; they are reported through
//!   `tracing` and events by the supervisor instead.
//! - If the caller replaces the panic hook after the first boundary ran, location
//!   and backtrace are simply missing from [`CaughtFailure`].
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if the operation panics while holding a lock or mid-way through a mutation.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

use crate::error::CaughtFailure;

static HOOK: Once = Once::new();

#[derive(Clone, Copy)]
struct Scope {
    depth: u32,
    capture: bool,
}

/// Panic location and optional backtrace recorded by the hook.
struct Site {
    location: Option<String>,
    backtrace: Option<String>,
}

thread_local! {
    static SCOPE: Cell<Scope> = const { Cell::new(Scope { depth: 0, capture: false }) };
    static SITE: RefCell<Option<Site>> = const { RefCell::new(None) };
}

/// Marks the current thread as inside a boundary until dropped.
pub(crate) struct ScopeGuard {
    prev: Scope,
}

impl ScopeGuard {
    pub(crate) fn enter(capture: bool) -> Self {
        install_hook();
        let prev = SCOPE.with(Cell::get);
        SCOPE.with(|s| {
            s.set(Scope {
                depth: prev.depth + 1,
                capture,
            })
        });
        Self { prev }
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        SCOPE.with(|s| s.set(self.prev));
    }
}

fn install_hook() {
    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let scope = SCOPE.with(Cell::get);
            if scope.depth == 0 {
                previous(info);
                return;
            }
            let site = Site {
                location: info.location().map(|l| l.to_string()),
                backtrace: scope
                    .capture
                    .then(|| Backtrace::force_capture().to_string()),
            };
            SITE.with(|slot| *slot.borrow_mut() = Some(site));
        }));
    });
}

/// Runs `f` inside a boundary.
///
/// Returns `Ok` with the result on normal completion, or the caught panic.
/// With `capture` set, the backtrace at the panic site is attached.
pub(crate) fn catch<T>(capture: bool, f: impl FnOnce() -> T) -> Result<T, CaughtFailure> {
    let res = {
        let _scope = ScopeGuard::enter(capture);
        panic::catch_unwind(AssertUnwindSafe(f))
    };
    res.map_err(into_failure)
}

/// Polls `fut` inside a boundary on every poll, catching panics from any poll.
#[cfg(feature = "tokio")]
pub(crate) async fn catch_async<F>(capture: bool, fut: F) -> Result<F::Output, CaughtFailure>
where
    F: Future,
{
    use futures::FutureExt;

    let mut fut = Box::pin(fut);
    let guarded = futures::future::poll_fn(move |cx| {
        let _scope = ScopeGuard::enter(capture);
        fut.as_mut().poll(cx)
    });
    AssertUnwindSafe(guarded)
        .catch_unwind()
        .await
        .map_err(into_failure)
}

fn into_failure(payload: Box<dyn Any + Send>) -> CaughtFailure {
    let site = SITE.with(|slot| slot.borrow_mut().take());
    let (location, backtrace) = match site {
        Some(site) => (site.location, site.backtrace),
        None => (None, None),
    };
    CaughtFailure {
        message: panic_message(payload.as_ref()),
        location,
        backtrace,
    }
}

/// Renders a panic payload as text.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_completion_passes_value_through() {
        assert_eq!(catch(false, || 42), Ok(42));
    }

    #[test]
    fn test_str_panic_is_caught() {
        let err = catch::<()>(false, || panic!("boom")).unwrap_err();
        assert_eq!(err.message, "boom");
        assert!(err.location.as_deref().unwrap_or("").contains("boundary.rs"));
        assert!(err.backtrace.is_none());
    }

    #[test]
    fn test_formatted_panic_is_caught() {
        let n = 3;
        let err = catch::<()>(false, || panic!("bad index {n}")).unwrap_err();
        assert_eq!(err.message, "bad index 3");
    }

    #[test]
    fn test_index_out_of_bounds_is_caught() {
        let v: Vec<i32> = Vec::new();
        let err = catch(false, || v[1]).unwrap_err();
        assert!(err.message.contains("index out of bounds"), "{}", err.message);
    }

    #[test]
    fn test_non_string_payload() {
        let err = catch::<()>(false, || std::panic::panic_any(17_u8)).unwrap_err();
        assert_eq!(err.message, "unknown panic");
    }

    #[test]
    fn test_capture_attaches_backtrace() {
        let err = catch::<()>(true, || panic!("traced")).unwrap_err();
        assert!(err.backtrace.is_some());
    }

    #[test]
    fn test_nested_boundaries_restore_scope() {
        let outer = catch::<()>(false, || {
            let inner = catch::<()>(true, || panic!("inner"));
            assert!(inner.unwrap_err().backtrace.is_some());
            panic!("outer");
        })
        .unwrap_err();
        assert_eq!(outer.message, "outer");
        assert!(outer.backtrace.is_none());
        assert_eq!(SCOPE.with(Cell::get).depth, 0);
    }
}
