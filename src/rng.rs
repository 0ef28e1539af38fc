use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

#[derive(Debug, Clone)]
enum RngSource {
    Entropy(StdRng),
    Scripted { outcomes: Vec<f64>, index: usize },
}

/// Uniform random source shared by the battle engine and the shop.
///
/// Every draw is a unit value; callers scale it themselves. Tests script the
/// exact values they need with [`GameRng::new_for_test`].
#[derive(Debug, Clone)]
pub struct GameRng {
    source: RngSource,
}

impl GameRng {
    pub fn new_random() -> Self {
        Self {
            source: RngSource::Entropy(StdRng::from_os_rng()),
        }
    }

    pub fn new_seeded(seed: u64) -> Self {
        Self {
            source: RngSource::Entropy(StdRng::seed_from_u64(seed)),
        }
    }

    /// Replays `outcomes` in order, wrapping around when exhausted.
    /// Values are clamped to `[0, 1]`; an empty script always yields 0.
    pub fn new_for_test(outcomes: Vec<f64>) -> Self {
        Self {
            source: RngSource::Scripted { outcomes, index: 0 },
        }
    }

    /// Next value in `[0, 1)`, or exactly what the script says.
    pub fn next_unit(&mut self, reason: &str) -> f64 {
        let outcome = match &mut self.source {
            RngSource::Entropy(rng) => rng.random::<f64>(),
            RngSource::Scripted { outcomes, index } => {
                if outcomes.is_empty() {
                    0.0
                } else {
                    let value = outcomes[*index % outcomes.len()];
                    *index += 1;
                    value.clamp(0.0, 1.0)
                }
            }
        };
        trace!(outcome, reason, "rng consumed");
        outcome
    }
}
