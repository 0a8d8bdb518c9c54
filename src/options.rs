//! Configuration options for the VBS packer.
//!
//! ## Examples
//!
//! ```rust
//! use vbs_writer::{PackOptions, VbsPacker};
//!
//! let options = PackOptions::new().with_max_depth(8).with_buffer_size(1024);
//! let packer = VbsPacker::with_options(Vec::new(), options);
//! assert_eq!(packer.options().max_depth, 8);
//! ```

/// Default limit on container nesting.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Default size of the packer's staging buffer.
pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;

/// Configuration options for [`VbsPacker`](crate::VbsPacker).
///
/// # Examples
///
/// ```rust
/// use vbs_writer::PackOptions;
///
/// let options = PackOptions::new();
/// assert_eq!(options.max_depth, 128);
///
/// let shallow = PackOptions::new().with_max_depth(4);
/// assert_eq!(shallow.max_depth, 4);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackOptions {
    /// Deepest container nesting accepted before the packer latches
    /// [`Error::DepthExceeded`](crate::Error::DepthExceeded).
    pub max_depth: usize,
    /// Number of pending bytes that triggers a flush to the underlying writer.
    pub buffer_size: usize,
}

impl Default for PackOptions {
    fn default() -> Self {
        PackOptions {
            max_depth: DEFAULT_MAX_DEPTH,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl PackOptions {
    /// Creates default options (depth limit 128, 8 KiB staging buffer).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum container nesting depth.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use vbs_writer::PackOptions;
    ///
    /// let options = PackOptions::new().with_max_depth(16);
    /// assert_eq!(options.max_depth, 16);
    /// ```
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the staging buffer size. A size of zero flushes after every write.
    #[must_use]
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }
}
