//! Chronologically ordered keys in the format the database SDKs generate for `push()`.
//!
//! A key is 8 characters of millisecond timestamp followed by 12 characters of
//! entropy. Keys generated within the same millisecond by one process are
//! strictly increasing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

const PUSH_CHARS: &[u8; 64] = b"-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

static SEED: AtomicU64 = AtomicU64::new(0);
static GLOBAL: Mutex<PushIdGenerator> = Mutex::new(PushIdGenerator::new());

fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn random_suffix() -> [u8; 12] {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() as u64)
        .unwrap_or_default();
    let mut state = SEED.fetch_add(1, Ordering::Relaxed) ^ (nanos << 20) ^ std::process::id() as u64;
    let mut out = [0u8; 12];
    let mut bits = splitmix64(&mut state);
    for (i, slot) in out.iter_mut().enumerate() {
        if i == 10 {
            bits = splitmix64(&mut state);
        }
        *slot = (bits & 63) as u8;
        bits >>= 6;
    }
    out
}

/// Stateful generator; keeps keys from one generator strictly increasing.
#[derive(Debug, Default)]
pub struct PushIdGenerator {
    last_millis: u64,
    last_suffix: [u8; 12],
}

impl PushIdGenerator {
    pub const fn new() -> Self {
        Self {
            last_millis: 0,
            last_suffix: [0; 12],
        }
    }

    pub fn generate_at(&mut self, millis: u64) -> String {
        let suffix = if self.last_millis == millis {
            // Same millisecond: increment the previous suffix to keep keys ordered.
            let mut suffix = self.last_suffix;
            for slot in suffix.iter_mut().rev() {
                if *slot == 63 {
                    *slot = 0;
                } else {
                    *slot += 1;
                    break;
                }
            }
            suffix
        } else {
            random_suffix()
        };
        self.last_millis = millis;
        self.last_suffix = suffix;

        let mut time_chars = [0u8; 8];
        let mut t = millis;
        for slot in time_chars.iter_mut().rev() {
            *slot = PUSH_CHARS[(t % 64) as usize];
            t /= 64;
        }

        let mut id = String::with_capacity(20);
        id.extend(time_chars.iter().map(|&b| b as char));
        id.extend(suffix.iter().map(|&i| PUSH_CHARS[i as usize] as char));
        id
    }
}

/// Generates a new push id for the current time.
pub fn generate() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default();
    GLOBAL
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .generate_at(now)
}
