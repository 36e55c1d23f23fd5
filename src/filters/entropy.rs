//! Random sources for the grain and scratch stages

use std::sync::Mutex;

use rand::{rngs::SmallRng, Rng, SeedableRng};
use rayon::prelude::*;

use crate::error::{Result, StageError};

/// Bytes filled per rayon task when drawing from thread-local generators
const CHUNK: usize = 64 * 1024;

/// Supplies random bytes to procedural stages
///
/// Implementations may fail; a failed fill makes the calling stage fail, and the
/// pipeline falls back to that stage's input.
pub trait EntropySource: Send + Sync {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<()>;
}

/// Thread-local generator per rayon worker; non-reproducible grain
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadEntropy;

impl EntropySource for ThreadEntropy {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<()> {
        dest.par_chunks_mut(CHUNK).try_for_each(|chunk| {
            rand::thread_rng()
                .try_fill(chunk)
                .map_err(|e| StageError::Entropy { reason: e.to_string() })
        })?;
        Ok(())
    }
}

/// Single seeded generator, reproducible for a given sequence of calls
pub struct SeededEntropy {
    rng: Mutex<SmallRng>,
}

impl SeededEntropy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }
}

impl EntropySource for SeededEntropy {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<()> {
        let mut rng = self.rng.lock().map_err(|_| StageError::Entropy {
            reason: "seeded generator poisoned".to_string(),
        })?;
        rng.try_fill(dest)
            .map_err(|e| StageError::Entropy { reason: e.to_string() })?;
        Ok(())
    }
}

/// Source that always fails
#[cfg(test)]
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct FailingEntropy;

#[cfg(test)]
impl EntropySource for FailingEntropy {
    fn fill_bytes(&self, _dest: &mut [u8]) -> Result<()> {
        Err(StageError::Entropy { reason: "generator unavailable".to_string() }.into())
    }
}

/// Source that succeeds a fixed number of times, then fails
#[cfg(test)]
pub(crate) struct FlakyEntropy {
    remaining: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl FlakyEntropy {
    pub(crate) fn new(successes: usize) -> Self {
        Self {
            remaining: std::sync::atomic::AtomicUsize::new(successes),
        }
    }
}

#[cfg(test)]
impl EntropySource for FlakyEntropy {
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<()> {
        use std::sync::atomic::Ordering;

        self.remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .map_err(|_| StageError::Entropy { reason: "generator exhausted".to_string() })?;
        for (i, b) in dest.iter_mut().enumerate() {
            *b = (i * 31 % 251) as u8;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_is_reproducible() {
        let a = SeededEntropy::new(7);
        let b = SeededEntropy::new(7);
        let mut x = [0u8; 32];
        let mut y = [0u8; 32];
        a.fill_bytes(&mut x).unwrap();
        b.fill_bytes(&mut y).unwrap();
        assert_eq!(x, y);
    }

    #[test]
    fn test_flaky_source_runs_out() {
        let source = FlakyEntropy::new(1);
        let mut buf = [0u8; 8];
        assert!(source.fill_bytes(&mut buf).is_ok());
        assert!(source.fill_bytes(&mut buf).is_err());
    }

    #[test]
    fn test_thread_entropy_fills_large_buffers() {
        let mut buf = vec![0u8; CHUNK * 3 + 17];
        ThreadEntropy.fill_bytes(&mut buf).unwrap();
        assert!(buf.iter().any(|&b| b != 0));
    }
}
