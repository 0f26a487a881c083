/// A value that is created the first time it's needed and kept until someone calls
/// [`CachedResource::invalidate`]. Used for handles owned by the environment (materials, lights)
/// which can be destroyed or replaced behind our back.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedResource<T> {
    value: Option<T>,
}

impl<T> CachedResource<T> {
    pub const fn new() -> Self {
        Self { value: None }
    }

    /// Returns the cached value, calling `init` first if there isn't one. If `init` returns `None`
    /// nothing is cached and the next call tries again.
    pub fn get_or_try_init(&mut self, init: impl FnOnce() -> Option<T>) -> Option<&T> {
        if self.value.is_none() {
            self.value = init();
        }
        self.value.as_ref()
    }

    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Drops the cached value, returning it. Call this when the environment signals that the
    /// underlying resource was destroyed or replaced.
    pub fn invalidate(&mut self) -> Option<T> {
        self.value.take()
    }

    pub fn is_initialized(&self) -> bool {
        self.value.is_some()
    }
}

impl<T> Default for CachedResource<T> {
    fn default() -> Self {
        Self::new()
    }
}
