//! Move choice for whoever is wagging a finger this turn.

use crate::battle::state::BattleState;
use crate::errors::{BattleError, BattleResult};
use crate::player::Side;
use crate::rng::GameRng;
use crate::selector;
use schema::MoveData;

/// A trait for any system that can pick the move a side uses.
///
/// `pool` is the ordered list of moves the side may draw from: the whole
/// catalog for the CPU, the deck for the player.
pub trait Behavior: Send + Sync {
    fn choose_move(
        &self,
        side: Side,
        battle_state: &BattleState,
        pool: &[&'static MoveData],
        rng: &mut GameRng,
    ) -> BattleResult<&'static MoveData>;
}

/// The metronome itself: a weighted draw over the pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedDraw;

impl WeightedDraw {
    pub fn new() -> Self {
        Self
    }
}

impl Behavior for WeightedDraw {
    fn choose_move(
        &self,
        _side: Side,
        _battle_state: &BattleState,
        pool: &[&'static MoveData],
        rng: &mut GameRng,
    ) -> BattleResult<&'static MoveData> {
        Ok(selector::draw(pool, rng)?)
    }
}

/// The player's finger-wag: every deck move is equally likely, whatever its
/// catalog weight.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformDraw;

impl Behavior for UniformDraw {
    fn choose_move(
        &self,
        _side: Side,
        _battle_state: &BattleState,
        pool: &[&'static MoveData],
        rng: &mut GameRng,
    ) -> BattleResult<&'static MoveData> {
        if pool.is_empty() {
            return Err(BattleError::NoEligibleMove);
        }
        let roll = rng.next_unit("finger-wag deck draw");
        // A scripted roll of exactly 1.0 stays on the last move.
        let index = ((roll * pool.len() as f64) as usize).min(pool.len() - 1);
        Ok(pool[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::move_data::moves_named;
    use rstest::rstest;
    use schema::Difficulty;

    #[test]
    fn draws_from_the_given_pool_only() {
        let state = BattleState::new(200, Difficulty::Easy, 10);
        let pool = moves_named(&["방어", "맹독"]);
        let mut rng = GameRng::new_seeded(7);
        for _ in 0..50 {
            let picked = WeightedDraw
                .choose_move(Side::Player, &state, &pool, &mut rng)
                .expect("pool is not empty");
            assert!(picked.name == "방어" || picked.name == "맹독");
        }
    }

    #[test]
    fn empty_pool_has_no_eligible_move() {
        let state = BattleState::new(200, Difficulty::Easy, 10);
        let mut rng = GameRng::new_for_test(vec![0.5]);
        assert_eq!(
            WeightedDraw.choose_move(Side::Player, &state, &[], &mut rng),
            Err(BattleError::NoEligibleMove)
        );
    }

    #[test]
    fn deck_draw_ignores_catalog_weight() {
        let state = BattleState::new(200, Difficulty::Easy, 10);
        // 튀어오르기 weighs 60 and 리프레쉬 20; the deck draw treats them alike.
        let pool = moves_named(&["튀어오르기", "리프레쉬"]);
        let mut rng = GameRng::new_seeded(42);
        let trials = 20_000;
        let splashes = (0..trials)
            .filter(|_| {
                UniformDraw
                    .choose_move(Side::Player, &state, &pool, &mut rng)
                    .expect("pool is not empty")
                    .name
                    == "튀어오르기"
            })
            .count();
        let share = splashes as f64 / trials as f64;
        assert!((share - 0.5).abs() < 0.02, "splash share {}", share);
    }

    #[rstest]
    #[case(0.0, "튀어오르기")]
    #[case(0.49, "튀어오르기")]
    #[case(0.5, "리프레쉬")]
    #[case(1.0, "리프레쉬")]
    fn deck_draw_splits_the_unit_range_evenly(#[case] roll: f64, #[case] expected: &str) {
        let state = BattleState::new(200, Difficulty::Easy, 10);
        let pool = moves_named(&["튀어오르기", "리프레쉬"]);
        let mut rng = GameRng::new_for_test(vec![roll]);
        let picked = UniformDraw
            .choose_move(Side::Player, &state, &pool, &mut rng)
            .expect("pool is not empty");
        assert_eq!(picked.name, expected);
    }

    #[test]
    fn deck_draw_from_nothing_has_no_eligible_move() {
        let state = BattleState::new(200, Difficulty::Easy, 10);
        let mut rng = GameRng::new_for_test(vec![0.5]);
        assert_eq!(
            UniformDraw.choose_move(Side::Player, &state, &[], &mut rng),
            Err(BattleError::NoEligibleMove)
        );
    }
}
