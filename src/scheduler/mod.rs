//! Scheduler - ordered registry of behavior units

use std::any::Any;

use tracing::debug;

/// System trait - each behavior unit implements this
///
/// Systems hold no entity data; everything they act on lives in the
/// [`World`](crate::ecs::World) they are handed.
pub trait System: Any + Send + Sync {
    fn name(&self) -> &str;

    /// Lower values sort first.
    fn priority(&self) -> i32 {
        0
    }

    fn as_any(&self) -> &dyn Any;
}

/// Handle returned from [`Scheduler::register`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SystemHandle(u32);

struct RegisteredSystem {
    handle: SystemHandle,
    priority: i32,
    system: Option<Box<dyn System>>,
}

/// Scheduler keeps systems sorted by priority, ties in registration order
pub struct Scheduler {
    systems: Vec<RegisteredSystem>,
    next_handle: u32,
    needs_sort: bool,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            systems: Vec::new(),
            next_handle: 0,
            needs_sort: false,
        }
    }

    /// Add a system to the scheduler
    pub fn register(&mut self, system: Box<dyn System>) -> SystemHandle {
        let handle = SystemHandle(self.next_handle);
        self.next_handle += 1;
        debug!(system = system.name(), priority = system.priority(), "system registered");
        self.systems.push(RegisteredSystem {
            handle,
            priority: system.priority(),
            system: Some(system),
        });
        self.needs_sort = true;
        handle
    }

    pub fn unregister(&mut self, handle: SystemHandle) -> Option<Box<dyn System>> {
        let index = self.systems.iter().position(|entry| entry.handle == handle)?;
        let removed = self.systems.remove(index).system;
        if let Some(system) = &removed {
            debug!(system = system.name(), "system unregistered");
        }
        removed
    }

    /// Look up the single registered system of type `T`.
    pub fn get<T: System>(&self) -> Option<&T> {
        self.systems
            .iter()
            .filter_map(|entry| entry.system.as_deref())
            .find_map(|system| system.as_any().downcast_ref::<T>())
    }

    pub fn contains<T: System>(&self) -> bool {
        self.get::<T>().is_some()
    }

    pub fn handle_of<T: System>(&self) -> Option<SystemHandle> {
        self.systems.iter().find_map(|entry| {
            entry
                .system
                .as_deref()
                .filter(|system| system.as_any().is::<T>())
                .map(|_| entry.handle)
        })
    }

    /// Re-sort by ascending priority if anything was registered since the last tick.
    pub fn tick(&mut self) {
        if !self.needs_sort {
            return;
        }
        self.systems.sort_by_key(|entry| entry.priority);
        self.needs_sort = false;
        debug!(order = ?self.names(), "system order refreshed");
    }

    pub fn needs_sort(&self) -> bool {
        self.needs_sort
    }

    /// System names in current order.
    pub fn names(&self) -> Vec<&str> {
        self.systems
            .iter()
            .filter_map(|entry| entry.system.as_deref())
            .map(|system| system.name())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Lend the `T` system out so it can run against state that owns this scheduler.
    pub(crate) fn take<T: System>(&mut self) -> Option<(SystemHandle, Box<dyn System>)> {
        let entry = self.systems.iter_mut().find(|entry| {
            entry
                .system
                .as_deref()
                .is_some_and(|system| system.as_any().is::<T>())
        })?;
        let system = entry.system.take()?;
        Some((entry.handle, system))
    }

    pub(crate) fn restore(&mut self, handle: SystemHandle, system: Box<dyn System>) {
        match self.systems.iter_mut().find(|entry| entry.handle == handle) {
            Some(entry) => entry.system = Some(system),
            None => debug!(system = system.name(), "lent system was unregistered, dropping"),
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestSystem {
        name: &'static str,
        priority: i32,
    }

    impl System for TestSystem {
        fn name(&self) -> &str {
            self.name
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    struct OtherSystem;

    impl System for OtherSystem {
        fn name(&self) -> &str {
            "other"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_lookup_by_type() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.register(Box::new(TestSystem { name: "test", priority: 5 }));
        scheduler.tick();

        assert_eq!(scheduler.get::<TestSystem>().map(|s| s.name), Some("test"));
        assert!(!scheduler.contains::<OtherSystem>());
        assert_eq!(scheduler.handle_of::<TestSystem>(), Some(handle));

        let removed = scheduler.unregister(handle);
        assert!(removed.is_some());
        assert!(scheduler.get::<TestSystem>().is_none());
        assert!(scheduler.unregister(handle).is_none());
    }

    #[test]
    fn test_tick_sorts_by_priority_stably() {
        let mut scheduler = Scheduler::new();
        scheduler.register(Box::new(TestSystem { name: "late", priority: 20 }));
        scheduler.register(Box::new(TestSystem { name: "first-tie", priority: 10 }));
        scheduler.register(Box::new(TestSystem { name: "early", priority: -1 }));
        scheduler.register(Box::new(TestSystem { name: "second-tie", priority: 10 }));
        assert!(scheduler.needs_sort());

        scheduler.tick();

        assert!(!scheduler.needs_sort());
        assert_eq!(
            scheduler.names(),
            vec!["early", "first-tie", "second-tie", "late"]
        );

        scheduler.register(Box::new(TestSystem { name: "third-tie", priority: 10 }));
        scheduler.tick();
        assert_eq!(
            scheduler.names(),
            vec!["early", "first-tie", "second-tie", "third-tie", "late"]
        );
    }

    #[test]
    fn test_unregister_does_not_mark_dirty() {
        let mut scheduler = Scheduler::new();
        let handle = scheduler.register(Box::new(OtherSystem));
        scheduler.register(Box::new(TestSystem { name: "test", priority: 1 }));
        scheduler.tick();

        scheduler.unregister(handle);

        assert!(!scheduler.needs_sort());
        assert_eq!(scheduler.names(), vec!["test"]);
    }

    #[test]
    fn test_take_and_restore_keep_position() {
        let mut scheduler = Scheduler::new();
        scheduler.register(Box::new(OtherSystem));
        scheduler.register(Box::new(TestSystem { name: "test", priority: 1 }));
        scheduler.tick();

        let (handle, system) = scheduler.take::<OtherSystem>().unwrap();
        assert!(scheduler.get::<OtherSystem>().is_none());
        assert!(scheduler.take::<OtherSystem>().is_none());

        scheduler.restore(handle, system);
        assert_eq!(scheduler.names(), vec!["other", "test"]);
    }
}
