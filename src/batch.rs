use crate::credential::{CredentialCandidate, PersistableRecord};
use crate::store::{CredentialStore, StoreError};

/// Collects records between two store commits.
///
/// Decoding and hashing happen in [`BatchAccumulator::accept`], one line at a
/// time, so [`BatchAccumulator::flush`] can only fail in the store.
#[derive(Debug, Default)]
pub struct BatchAccumulator {
    records: Vec<PersistableRecord>,
}

impl BatchAccumulator {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
        }
    }

    /// Store a pair into the current batch. Returns false for `Invalid`,
    /// which is dropped.
    pub fn accept(&mut self, candidate: CredentialCandidate) -> bool {
        match candidate {
            CredentialCandidate::Pair { identifier, secret } => {
                self.records.push(PersistableRecord::from_pair(&identifier, &secret));
                true
            }
            CredentialCandidate::Invalid => false,
        }
    }

    /// Commit the batch as one unit and start a new one. The batch is
    /// emptied whether or not the store accepts it. Returns the number of
    /// records committed.
    pub fn flush<S>(&mut self, store: &mut S) -> Result<usize, StoreError>
    where
        S: CredentialStore + ?Sized,
    {
        let records = std::mem::take(&mut self.records);
        store.insert_batch(&records)?;
        let committed = records.len();
        // keep the allocation for the next batch
        self.records = records;
        self.records.clear();
        Ok(committed)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[PersistableRecord] {
        &self.records
    }
}
