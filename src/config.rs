//! Parser configuration.

/// Tunables for a single parse. Cloned cheaply and shared across adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ParserConfig {
    /// Initial capacity, in bytes, of the internal ring buffer. Rounded up
    /// to the next power of two. The buffer grows by doubling past this
    /// size as needed, so this is a performance tuning knob, not a limit.
    pub initial_buffer_size: usize,

    /// Maximum number of bytes a single part's header block may occupy
    /// before the terminating blank line is found. Exceeding it produces
    /// [`crate::MultipartError::MaxHeaderSizeExceeded`].
    pub max_header_size: usize,

    /// Maximum number of bytes a single part's body may contain. Exceeding
    /// it produces [`crate::MultipartError::MaxFileSizeExceeded`].
    pub max_file_size: u64,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            initial_buffer_size: 16 * 1024,
            max_header_size: 8 * 1024,
            max_file_size: 10 * 1024 * 1024,
        }
    }
}

impl ParserConfig {
    /// Starts from the defaults; use the builder-style setters to override
    /// individual fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets [`ParserConfig::initial_buffer_size`].
    pub fn initial_buffer_size(mut self, bytes: usize) -> Self {
        self.initial_buffer_size = bytes;
        self
    }

    /// Sets [`ParserConfig::max_header_size`].
    pub fn max_header_size(mut self, bytes: usize) -> Self {
        self.max_header_size = bytes;
        self
    }

    /// Sets [`ParserConfig::max_file_size`].
    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = ParserConfig::default();
        assert!(config.initial_buffer_size > 0);
        assert!(config.max_header_size > 0);
        assert!(config.max_file_size > 0);
    }

    #[test]
    fn builder_overrides_individual_fields() {
        let config = ParserConfig::new().max_header_size(512).max_file_size(1024);
        assert_eq!(config.max_header_size, 512);
        assert_eq!(config.max_file_size, 1024);
        assert_eq!(config.initial_buffer_size, ParserConfig::default().initial_buffer_size);
    }
}
