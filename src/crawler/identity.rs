use rand::seq::SliceRandom;

/// Used only if the pool is somehow empty; config validation rejects that
const FALLBACK_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Picks a client identity for each outgoing request
///
/// Selection is uniform and memoryless; repeats are expected.
#[derive(Debug, Clone)]
pub struct IdentityRotator {
    pool: Vec<String>,
}

impl IdentityRotator {
    pub fn new(pool: Vec<String>) -> Self {
        Self { pool }
    }

    /// Returns a user-agent string chosen uniformly at random
    pub fn pick(&self) -> &str {
        self.pool
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
            .unwrap_or(FALLBACK_USER_AGENT)
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }
}
