pub mod chat;
pub mod roll;
pub mod show;

use rand::SeedableRng;
use rand::rngs::StdRng;

/// A seeded generator, or one seeded from the OS when no seed is given.
fn rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}
