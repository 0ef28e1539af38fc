//! Weighted random draw over an ordered list of moves.
//!
//! The walk is done in list order, so when a draw lands exactly on a
//! boundary between two entries the earlier one wins.

use crate::errors::SelectorError;
use crate::rng::GameRng;
use schema::MoveData;

pub fn total_weight(moves: &[&MoveData]) -> f64 {
    moves.iter().map(|move_data| move_data.weight.0).sum()
}

/// Returns the first entry whose cumulative weight reaches `roll`.
///
/// `roll` is on the weight scale, `0..=W`. A roll past the end (floating
/// error included) falls back to the last entry.
pub fn pick_at<'a>(moves: &[&'a MoveData], roll: f64) -> Result<&'a MoveData, SelectorError> {
    let last = moves.last().ok_or(SelectorError::NoEligibleMove)?;
    let mut cumulative = 0.0;
    for move_data in moves {
        cumulative += move_data.weight.0;
        if cumulative >= roll {
            return Ok(move_data);
        }
    }
    Ok(last)
}

/// Draws one move with probability proportional to its weight.
pub fn draw<'a>(moves: &[&'a MoveData], rng: &mut GameRng) -> Result<&'a MoveData, SelectorError> {
    if moves.is_empty() {
        return Err(SelectorError::NoEligibleMove);
    }
    let roll = rng.next_unit("weighted move draw") * total_weight(moves);
    pick_at(moves, roll)
}

/// Probability of each entry, in list order.
pub fn odds<'a>(moves: &[&'a MoveData]) -> Vec<(&'a MoveData, f64)> {
    let total = total_weight(moves);
    moves
        .iter()
        .map(|&move_data| {
            let chance = if total > 0.0 { move_data.weight.0 / total } else { 0.0 };
            (move_data, chance)
        })
        .collect()
}
