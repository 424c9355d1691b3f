//! Ephemeral one-time-passcode registry.
//!
//! Codes are purpose-scoped, single-use, and time-bounded. The registry is
//! process-local: a restart forgets every live code, which is acceptable
//! because codes only need to survive their issuance window. At most one
//! live entry exists per email; issuing again overwrites (and thereby
//! invalidates) the previous code.
//!
//! The map is split into hash-addressed shards, each behind its own lock.
//! Operations for one address only contend with other addresses in the same
//! shard, and the expired-entry sweep on insert scans a single shard.

use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, Rng};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use tokio::sync::Mutex;

const SHARD_COUNT: usize = 16;

/// What a code was issued for. A code issued for one purpose never
/// validates the other.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OtpPurpose {
    Signup,
    ResetPassword,
}

/// Result of checking a submitted code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OtpOutcome {
    /// Code matched and was consumed; it will not validate again.
    Valid,
    /// No live code for this email.
    NotFound,
    /// A live code exists but the submission does not match. The entry is
    /// kept so the user can retry until expiry.
    Mismatch,
    /// The code's window elapsed; the stale entry was purged.
    Expired,
    /// Code matched but was issued for a different purpose. The entry is
    /// kept intact.
    WrongPurpose,
}

struct OtpEntry {
    code: String,
    expires_at: DateTime<Utc>,
    purpose: OtpPurpose,
}

/// Process-local OTP store keyed by normalized email, sharded so distinct
/// addresses do not serialize behind one lock.
pub struct OtpStore {
    shards: Vec<Mutex<HashMap<String, OtpEntry>>>,
}

impl Default for OtpStore {
    fn default() -> Self {
        Self {
            shards: (0..SHARD_COUNT)
                .map(|_| Mutex::new(HashMap::new()))
                .collect(),
        }
    }
}

impl OtpStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn shard(&self, email: &str) -> &Mutex<HashMap<String, OtpEntry>> {
        let mut hasher = DefaultHasher::new();
        email.hash(&mut hasher);
        #[allow(clippy::cast_possible_truncation)]
        let index = (hasher.finish() % SHARD_COUNT as u64) as usize;
        &self.shards[index]
    }

    /// Issue a fresh six-digit code for `email`, overwriting any previous
    /// entry for that address. Returns the code and its expiration instant;
    /// delivery is the caller's responsibility.
    pub async fn issue(
        &self,
        email: &str,
        purpose: OtpPurpose,
        ttl: Duration,
    ) -> (String, DateTime<Utc>) {
        let code = generate_code();
        let expires_at = Utc::now() + ttl;
        let mut entries = self.shard(email).lock().await;
        // Opportunistic cleanup so abandoned codes don't accumulate. Only
        // this shard is scanned; other shards stay untouched.
        entries.retain(|_, entry| entry.expires_at > Utc::now());
        entries.insert(
            email.to_string(),
            OtpEntry {
                code: code.clone(),
                expires_at,
                purpose,
            },
        );
        (code, expires_at)
    }

    /// Check a submitted code. `Valid` and `Expired` both remove the entry;
    /// `Mismatch` and `WrongPurpose` leave it for further attempts.
    pub async fn verify(&self, email: &str, code: &str, purpose: OtpPurpose) -> OtpOutcome {
        let mut entries = self.shard(email).lock().await;
        let Some(entry) = entries.get(email) else {
            return OtpOutcome::NotFound;
        };
        if Utc::now() > entry.expires_at {
            entries.remove(email);
            return OtpOutcome::Expired;
        }
        if entry.code != code {
            return OtpOutcome::Mismatch;
        }
        if entry.purpose != purpose {
            return OtpOutcome::WrongPurpose;
        }
        entries.remove(email);
        OtpOutcome::Valid
    }
}

fn generate_code() -> String {
    // OS-backed randomness; range matches the original 6-digit contract.
    OsRng.gen_range(100_000..=999_999).to_string()
}
