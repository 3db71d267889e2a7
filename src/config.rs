//! Ingestion settings shared by the driver and the corpus walker.
use crate::io::DEFAULT_MMAP_THRESHOLD_BYTES;

/// Lines processed between two store commits unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 500;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("batch size must be positive")]
    ZeroBatchSize,
    #[error("at least one separator is required")]
    NoSeparators,
    #[error("separators must not be empty")]
    EmptySeparator,
}

/// Ordered set of field separators. Earlier entries win when two separators
/// start at the same offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Separators(Vec<Vec<u8>>);

impl Default for Separators {
    fn default() -> Self {
        Self(vec![b";".to_vec(), b":".to_vec()])
    }
}

impl Separators {
    pub fn new<I, S>(separators: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<Vec<u8>>,
    {
        let mut out: Vec<Vec<u8>> = Vec::new();
        for sep in separators {
            let sep = sep.into();
            if sep.is_empty() {
                return Err(ConfigError::EmptySeparator);
            }
            if !out.contains(&sep) {
                out.push(sep);
            }
        }
        if out.is_empty() {
            return Err(ConfigError::NoSeparators);
        }
        Ok(Self(out))
    }

    pub fn as_slice(&self) -> &[Vec<u8>] {
        &self.0
    }

    /// Length of the separator starting at `pos`, if one does.
    pub fn match_at(&self, line: &[u8], pos: usize) -> Option<usize> {
        let rest = line.get(pos..)?;
        self.0
            .iter()
            .find(|sep| rest.starts_with(sep))
            .map(|sep| sep.len())
    }

    /// Every `(start, len)` separator occurrence, left to right. Occurrences
    /// may overlap when multi-byte separators share bytes.
    pub fn occurrences<'a>(
        &'a self,
        line: &'a [u8],
    ) -> impl DoubleEndedIterator<Item = (usize, usize)> + 'a {
        (0..line.len()).filter_map(move |pos| self.match_at(line, pos).map(|len| (pos, len)))
    }

    /// First occurrence starting at or after `from`.
    pub fn first_from(&self, line: &[u8], from: usize) -> Option<(usize, usize)> {
        (from..line.len()).find_map(|pos| self.match_at(line, pos).map(|len| (pos, len)))
    }

    /// Start of the last occurrence in `line`.
    pub fn last_start(&self, line: &[u8]) -> Option<usize> {
        self.occurrences(line).next_back().map(|(pos, _)| pos)
    }
}

/// Settings for one ingestion run.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    batch_size: usize,
    pub separators: Separators,
    /// Files at least this large are memory-mapped. `u64::MAX` disables mmap.
    pub mmap_threshold_bytes: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            separators: Separators::default(),
            mmap_threshold_bytes: DEFAULT_MMAP_THRESHOLD_BYTES,
        }
    }
}

impl IngestConfig {
    pub fn new(batch_size: usize, separators: Separators) -> Result<Self, ConfigError> {
        if batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        Ok(Self {
            batch_size,
            separators,
            ..Self::default()
        })
    }

    /// A threshold of zero disables memory mapping entirely.
    pub fn with_mmap_threshold(mut self, threshold_bytes: u64) -> Self {
        self.mmap_threshold_bytes = if threshold_bytes == 0 {
            u64::MAX
        } else {
            threshold_bytes
        };
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}
