use parking_lot::Mutex;
use std::hash::{Hash, Hasher};
use std::time::{SystemTime, UNIX_EPOCH};

/// Generates globally-distinct primary keys for documents inserted without one.
///
/// An identifier is 12 bytes, rendered as 24 lowercase hex characters:
///
/// * 4-byte big-endian Unix timestamp (seconds)
/// * 3-byte fingerprint derived from a hash of the host name
/// * 2-byte process identifier (pid modulo 65536)
/// * 3-byte monotonic counter, starting at zero and wrapping modulo 2^24
///
/// The counter increment-and-read is guarded by an exclusive lock, so no two
/// concurrent callers can observe the same counter value. One generator is
/// constructed per database and shared by its collections.
pub struct OidGenerator {
    machine_part: [u8; 3],
    process_part: [u8; 2],
    counter: Mutex<u32>,
}

impl OidGenerator {
    pub fn new() -> Self {
        let pid = std::process::id() % 65536;
        OidGenerator {
            machine_part: machine_fingerprint(),
            process_part: (pid as u16).to_be_bytes(),
            counter: Mutex::new(0),
        }
    }

    /// Produces the next identifier.
    ///
    /// Callable concurrently from any thread; never returns the same value
    /// twice for the process's lifetime.
    pub fn next_id(&self) -> String {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or_else(|err| {
                log::warn!("System clock before Unix epoch: {}", err);
                0
            });

        let sequence = {
            let mut counter = self.counter.lock();
            let current = *counter;
            *counter = (current + 1) % 0x0100_0000;
            current
        };

        let mut oid = [0u8; 12];
        oid[0..4].copy_from_slice(&timestamp.to_be_bytes());
        oid[4..7].copy_from_slice(&self.machine_part);
        oid[7..9].copy_from_slice(&self.process_part);
        // low three bytes of the counter, big-endian
        oid[9..12].copy_from_slice(&sequence.to_be_bytes()[1..4]);

        let mut encoded = String::with_capacity(24);
        for byte in oid {
            encoded.push_str(&format!("{:02x}", byte));
        }
        encoded
    }
}

impl Default for OidGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Derives a 3-byte host fingerprint from a hash of the host name.
fn machine_fingerprint() -> [u8; 3] {
    let host = std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .unwrap_or_else(|_| "localhost".to_string());

    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    host.hash(&mut hasher);
    let digest = hasher.finish().to_be_bytes();
    [digest[0], digest[1], digest[2]]
}
