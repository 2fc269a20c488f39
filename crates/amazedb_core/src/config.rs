//! Database and group configuration.

/// Configuration for opening a database.
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether opening a missing database creates it ("safe mode").
    pub create_if_missing: bool,

    /// Whether creating a database that already exists is an error.
    pub error_if_exists: bool,

    /// Safe mode for groups: opening a missing group creates it, and
    /// creating an existing group returns it instead of failing.
    pub group_safe_mode: bool,

    /// Whether groups keep an in-memory mirror of their documents.
    pub preload: bool,

    /// Whether group and metadata writes fsync before renaming.
    pub sync_on_write: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            error_if_exists: false,
            group_safe_mode: true,
            preload: false,
            sync_on_write: true,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to create the database if missing.
    #[must_use]
    pub const fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets whether to error if database exists.
    #[must_use]
    pub const fn error_if_exists(mut self, value: bool) -> Self {
        self.error_if_exists = value;
        self
    }

    /// Sets safe mode for groups.
    #[must_use]
    pub const fn group_safe_mode(mut self, value: bool) -> Self {
        self.group_safe_mode = value;
        self
    }

    /// Sets whether groups are preloaded into memory.
    #[must_use]
    pub const fn preload(mut self, value: bool) -> Self {
        self.preload = value;
        self
    }

    /// Sets whether writes are synced to disk.
    #[must_use]
    pub const fn sync_on_write(mut self, value: bool) -> Self {
        self.sync_on_write = value;
        self
    }

    /// Group options derived from this configuration.
    #[must_use]
    pub const fn group_options(&self) -> GroupOptions {
        GroupOptions {
            safe_mode: self.group_safe_mode,
            preload: self.preload,
        }
    }
}

/// Per-call options for opening or creating a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupOptions {
    /// Create missing groups on open; return existing groups on create.
    pub safe_mode: bool,
    /// Keep an in-memory mirror of the group's documents.
    ///
    /// Mirrors hold the whole decoded group; avoid for large groups.
    pub preload: bool,
}

impl Default for GroupOptions {
    fn default() -> Self {
        Config::default().group_options()
    }
}

impl GroupOptions {
    /// Creates options with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets safe mode.
    #[must_use]
    pub const fn safe_mode(mut self, value: bool) -> Self {
        self.safe_mode = value;
        self
    }

    /// Sets preloading.
    #[must_use]
    pub const fn preload(mut self, value: bool) -> Self {
        self.preload = value;
        self
    }
}
