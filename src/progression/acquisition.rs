use super::store::ProgressionStore;
use crate::config::ShopRules;
use crate::errors::{ProgressResult, ValidationFailure};
use crate::move_data::all_moves;
use crate::rng::GameRng;
use crate::selector;
use schema::MoveData;
use serde::Serialize;
use std::collections::HashSet;
use tracing::info;

/// One drawn copy.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PullResult {
    pub name: String,
    /// First copy of a move the player did not own before this pull.
    pub is_new: bool,
}

/// Spends coins on weighted draws and turns duplicate copies into upgrades.
#[derive(Clone)]
pub struct AcquisitionService {
    store: ProgressionStore,
    pull_cost: u32,
}

impl AcquisitionService {
    pub fn new(store: ProgressionStore, rules: &ShopRules) -> Self {
        Self {
            store,
            pull_cost: rules.pull_cost,
        }
    }

    pub fn pull_cost(&self) -> u32 {
        self.pull_cost
    }

    pub fn store(&self) -> &ProgressionStore {
        &self.store
    }

    /// Pays for `count` draws up front, then draws them from the full catalog.
    ///
    /// Results come back in draw order. When one pull draws the same new
    /// move more than once, only its first draw is marked new.
    pub fn pull(&self, count: u32, rng: &mut GameRng) -> ProgressResult<Vec<PullResult>> {
        if count == 0 {
            return Err(ValidationFailure::InvalidPullCount.into());
        }
        let cost = self.pull_cost.saturating_mul(count);
        let balance = self.store.spend_coins(cost)?;

        let pool: Vec<&MoveData> = all_moves().iter().collect();
        let drawn = (0..count)
            .map(|_| selector::draw(&pool, rng).map(|picked| picked.name.clone()))
            .collect::<Result<Vec<_>, _>>()?;

        let introduced = self.store.add_move_copies(&drawn)?;
        let mut unannounced: HashSet<&str> = introduced.iter().map(String::as_str).collect();
        let results: Vec<PullResult> = drawn
            .iter()
            .map(|name| PullResult {
                name: name.clone(),
                is_new: unannounced.remove(name.as_str()),
            })
            .collect();

        info!(count, cost, balance, new = introduced.len(), "moves pulled");
        Ok(results)
    }

    /// Raises a move one level using five of its copies.
    pub fn upgrade(&self, name: &str) -> ProgressResult<u8> {
        self.store.upgrade_move(name)
    }

    /// Draw probability of every catalog move.
    pub fn odds(&self) -> Vec<(&'static MoveData, f64)> {
        let pool: Vec<&'static MoveData> = all_moves().iter().collect();
        selector::odds(&pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ProgressError;
    use pretty_assertions::assert_eq;

    fn service() -> AcquisitionService {
        AcquisitionService::new(ProgressionStore::in_memory(), &ShopRules::default())
    }

    #[test]
    fn single_pull_costs_thirty_and_records_the_copy() {
        let shop = service();
        // 0.9 of 366 lands on 섀도볼, which the default inventory lacks.
        let mut rng = GameRng::new_for_test(vec![0.9]);

        let results = shop.pull(1, &mut rng).expect("pull");
        assert_eq!(
            results,
            vec![PullResult {
                name: "섀도볼".to_string(),
                is_new: true
            }]
        );

        let record = shop.store().progress().expect("load");
        assert_eq!(record.coins, 270);
        assert_eq!(record.copies("섀도볼"), 1);
    }

    #[test]
    fn ten_pull_marks_only_the_first_repeat_of_a_new_move() {
        let shop = service();
        // 0.0 draws 몸통박치기 (already owned); 0.9 draws 섀도볼 (new).
        let mut rng = GameRng::new_for_test(vec![0.0, 0.9, 0.9]);

        let results = shop.pull(10, &mut rng).expect("ten pull");
        assert_eq!(results.len(), 10);

        let new_flags: Vec<(&str, bool)> = results
            .iter()
            .take(3)
            .map(|result| (result.name.as_str(), result.is_new))
            .collect();
        assert_eq!(
            new_flags,
            vec![("몸통박치기", false), ("섀도볼", true), ("섀도볼", false)]
        );
        assert_eq!(results.iter().filter(|result| result.is_new).count(), 1);

        let record = shop.store().progress().expect("load");
        assert_eq!(record.coins, 0);
        assert_eq!(record.copies("몸통박치기"), 1 + 4);
        assert_eq!(record.copies("섀도볼"), 6);
    }

    #[test]
    fn pull_without_enough_coins_draws_nothing() {
        let shop = service();
        shop.store().spend_coins(290).expect("spend down to 10");
        let mut rng = GameRng::new_for_test(vec![0.5]);

        let err = shop.pull(1, &mut rng).expect_err("too poor");
        assert!(matches!(
            err,
            ProgressError::Validation(ValidationFailure::InsufficientCoins { balance: 10, needed: 30 })
        ));
        assert_eq!(shop.store().progress().expect("load").inventory.len(), 6);
    }

    #[test]
    fn zero_pulls_are_refused() {
        let mut rng = GameRng::new_for_test(vec![0.5]);
        assert!(matches!(
            service().pull(0, &mut rng),
            Err(ProgressError::Validation(ValidationFailure::InvalidPullCount))
        ));
    }

    #[test]
    fn odds_cover_the_whole_catalog() {
        let odds = service().odds();
        assert_eq!(odds.len(), all_moves().len());
        assert_eq!(odds[0].0.name, "몸통박치기");
    }
}
