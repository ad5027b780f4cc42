//! ABA routing numbers: checksum validation and cached directory resolution.

pub mod cache;
pub mod directory;
pub mod resolver;

pub use cache::{CacheEntry, RoutingCache};
pub use directory::{DirectoryError, DirectoryReply, HttpDirectory, RoutingDirectory};
pub use resolver::{LookupError, ResolveError, RoutingResolver};

/// Number of digits in a routing number.
pub const LENGTH: usize = 9;

const WEIGHTS: [u32; 3] = [3, 7, 1];

/// ABA checksum predicate. Never fails: anything malformed is simply invalid.
///
/// `3·(d0+d3+d6) + 7·(d1+d4+d7) + (d2+d5+d8)` must be a multiple of 10.
pub fn validate(routing_number: &str) -> bool {
    if routing_number.len() != LENGTH || !routing_number.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let checksum: u32 = routing_number
        .bytes()
        .enumerate()
        .map(|(idx, b)| WEIGHTS[idx % 3] * u32::from(b - b'0'))
        .sum();
    checksum % 10 == 0
}
