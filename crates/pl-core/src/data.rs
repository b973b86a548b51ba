//! Payload base type.
//!
//! Everything that flows between nodes implements [`Data`]. A payload carries
//! exactly one piece of state of its own: a reader/writer [`DataGuard`] that
//! producers and consumers acquire around their critical sections. This
//! layer never takes the guard itself.

use std::any::Any;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Shared-ownership handle to a payload.
///
/// Any number of ports and nodes may hold the same payload; it is dropped
/// with the last handle.
pub type SharedData = Arc<dyn Data>;

/// Reader/writer guard: many concurrent readers or one exclusive writer.
///
/// Cloning produces a fresh, unlocked guard, and `clone_from` keeps the
/// destination's own guard. Two payloads never share lock state.
#[derive(Default)]
pub struct DataGuard {
    lock: RwLock<()>,
}

impl DataGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire shared read access, blocking while a writer holds the guard.
    pub fn read(&self) -> RwLockReadGuard<'_, ()> {
        self.lock.read()
    }

    /// Acquire exclusive write access, blocking while anyone holds the guard.
    pub fn write(&self) -> RwLockWriteGuard<'_, ()> {
        self.lock.write()
    }

    pub fn try_read(&self) -> Option<RwLockReadGuard<'_, ()>> {
        self.lock.try_read()
    }

    pub fn try_write(&self) -> Option<RwLockWriteGuard<'_, ()>> {
        self.lock.try_write()
    }

    /// True while any reader or the writer holds the guard.
    pub fn is_locked(&self) -> bool {
        self.lock.is_locked()
    }

    pub fn is_locked_exclusive(&self) -> bool {
        self.lock.is_locked_exclusive()
    }
}

impl Clone for DataGuard {
    fn clone(&self) -> Self {
        Self::new()
    }

    fn clone_from(&mut self, _source: &Self) {}
}

impl fmt::Debug for DataGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataGuard")
            .field("locked", &self.is_locked())
            .field("exclusive", &self.is_locked_exclusive())
            .finish()
    }
}

/// Upcasting support so ports can recover the concrete payload type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Base capability of every pipeline value.
///
/// ```
/// use pl_core::{Data, DataGuard};
///
/// struct Histogram {
///     guard: DataGuard,
///     bins: Vec<u32>,
/// }
///
/// impl Data for Histogram {
///     fn guard(&self) -> &DataGuard {
///         &self.guard
///     }
/// }
///
/// let h = Histogram { guard: DataGuard::new(), bins: vec![0; 8] };
/// let _read = h.guard().read();
/// assert_eq!(h.bins.len(), 8);
/// ```
pub trait Data: AsAny + Send + Sync {
    fn guard(&self) -> &DataGuard;

    /// Concrete type name, for diagnostics.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl dyn Data {
    /// Returns true if the payload is of concrete type `T`.
    pub fn is<T: Data>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Data>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

impl fmt::Debug for dyn Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Data<{}>", self.type_name())
    }
}

/// Obtain a typed handle to a shared payload, sharing ownership with `data`.
///
/// Returns `None` if the payload is not a `T`.
pub fn downcast_shared<T: Data>(data: &SharedData) -> Option<Arc<T>> {
    Arc::clone(data).into_any().downcast::<T>().ok()
}

/// Payload wrapper for plain values that do not carry a guard themselves.
#[derive(Clone, Default)]
pub struct Wrap<T> {
    guard: DataGuard,
    value: T,
}

impl<T> Wrap<T> {
    pub fn new(value: T) -> Self {
        Self {
            guard: DataGuard::new(),
            value,
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.value
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T> From<T> for Wrap<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T> Deref for Wrap<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> DerefMut for Wrap<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T: fmt::Debug> fmt::Debug for Wrap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Wrap").field(&self.value).finish()
    }
}

impl<T: Send + Sync + 'static> Data for Wrap<T> {
    fn guard(&self) -> &DataGuard {
        &self.guard
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Image {
        guard: DataGuard,
        width: u32,
    }

    impl Data for Image {
        fn guard(&self) -> &DataGuard {
            &self.guard
        }
    }

    #[test]
    fn fresh_guard_is_unlocked() {
        let guard = DataGuard::new();
        assert!(!guard.is_locked());
        assert!(!guard.is_locked_exclusive());
    }

    #[test]
    fn many_readers_or_one_writer() {
        let guard = DataGuard::new();

        let r1 = guard.read();
        let r2 = guard.try_read();
        assert!(r2.is_some());
        assert!(guard.try_write().is_none());
        drop(r1);
        drop(r2);

        let w = guard.write();
        assert!(guard.is_locked_exclusive());
        assert!(guard.try_read().is_none());
        drop(w);
        assert!(!guard.is_locked());
    }

    #[test]
    fn clone_does_not_copy_lock_state() {
        let guard = DataGuard::new();
        let _w = guard.write();

        let copy = guard.clone();
        assert!(!copy.is_locked());
        assert!(copy.try_write().is_some());
    }

    #[test]
    fn clone_from_keeps_own_guard() {
        let source = DataGuard::new();
        let _w = source.write();

        let mut target = DataGuard::new();
        target.clone_from(&source);
        assert!(!target.is_locked());
    }

    #[test]
    fn wrapped_copy_copies_value_only() {
        let original = Wrap::new(vec![1, 2, 3]);
        let _r = original.guard().read();

        let copy = original.clone();
        assert_eq!(copy.get(), &vec![1, 2, 3]);
        assert!(!copy.guard().is_locked());
        assert!(original.guard().is_locked());
    }

    #[test]
    fn downcast_through_shared_handle() {
        let data: SharedData = Arc::new(Image {
            guard: DataGuard::new(),
            width: 640,
        });

        assert!(data.is::<Image>());
        assert!(!data.is::<Wrap<u32>>());
        assert_eq!(data.downcast_ref::<Image>().map(|i| i.width), Some(640));

        let image = downcast_shared::<Image>(&data).unwrap();
        assert_eq!(image.width, 640);
        assert_eq!(Arc::strong_count(&image), 2);

        assert!(downcast_shared::<Wrap<u32>>(&data).is_none());
    }

    #[test]
    fn type_name_names_concrete_payload() {
        let data: SharedData = Arc::new(Wrap::new(1.5_f64));
        assert!(data.type_name().contains("Wrap<f64>"));
        assert!(format!("{data:?}").starts_with("Data<"));
    }

    #[test]
    fn wrap_derefs_to_value() {
        let mut w = Wrap::from(String::from("abc"));
        assert_eq!(w.len(), 3);
        w.push('d');
        assert_eq!(w.into_inner(), "abcd");
    }
}
