//! Dirty-bit cache for derived values.
//!
//! [`Cached`] stores the last computed value next to a validity flag;
//! mutators call [`Cached::invalidate`] and readers call
//! [`Cached::get_or_update`].

/// A lazily recomputed value guarded by a validity flag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cached<T> {
    value: T,
    valid: bool,
}

impl<T: Copy> Cached<T> {
    /// Cache seeded with `value` but marked invalid, so the first read
    /// recomputes.
    pub const fn stale(value: T) -> Self {
        Self {
            value,
            valid: false,
        }
    }

    /// Mark the cached value as out of date.
    #[inline]
    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    /// Whether the stored value is current.
    #[inline]
    pub const fn is_valid(&self) -> bool {
        self.valid
    }

    /// Return the cached value, running `update` first if it is stale.
    ///
    /// `update` is called at most once per invalidation.
    pub fn get_or_update(&mut self, update: impl FnOnce() -> T) -> T {
        if !self.valid {
            self.value = update();
            self.valid = true;
        }
        self.value
    }

    /// Last stored value, current or not.
    pub const fn peek(&self) -> T {
        self.value
    }
}
