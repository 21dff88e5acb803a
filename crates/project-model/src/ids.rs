//! Identifier generation for draft entities.
//!
//! Every material, segment, track and the document itself gets an
//! uppercase UUID-shaped id (`8-4-4-4-12` hex). Ids are scoped to a single
//! export, so a fast non-cryptographic generator is sufficient.

use std::collections::HashSet;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

/// Issues unique ids for one export.
#[derive(Debug)]
pub struct IdGenerator {
    rng: SmallRng,
    issued: HashSet<String>,
}

impl IdGenerator {
    /// Create a generator seeded from the OS entropy source.
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
            issued: HashSet::new(),
        }
    }

    /// Create a deterministic generator (tests, reproducible fixtures).
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            issued: HashSet::new(),
        }
    }

    /// Produce a fresh id, unique among all ids issued by this generator.
    ///
    /// # Panics
    ///
    /// Panics if the random source repeats a 122-bit value within one export.
    pub fn new_id(&mut self) -> String {
        let bytes: [u8; 16] = self.rng.gen();
        let uuid = uuid::Builder::from_random_bytes(bytes).into_uuid();
        let id = format_upper(&uuid);
        assert!(
            self.issued.insert(id.clone()),
            "identifier collision within one export: {id}"
        );
        id
    }

    /// Number of ids issued so far.
    pub fn issued(&self) -> usize {
        self.issued.len()
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn format_upper(uuid: &Uuid) -> String {
    let mut buf = Uuid::encode_buffer();
    uuid.hyphenated().encode_upper(&mut buf).to_string()
}
