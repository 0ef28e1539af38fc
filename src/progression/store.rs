use super::record::ProgressRecord;
use super::repository::{KeyValueRepository, MemoryStore, ProgressRepository};
use super::{COPIES_PER_UPGRADE, DECK_SIZE, MANDATORY_DECK_MOVE, MAX_UPGRADE_LEVEL};
use crate::battle::runner::ProgressionLink;
use crate::errors::{ProgressResult, StorageResult, ValidationFailure};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// Read-modify-write access to the progression record.
///
/// Every operation loads the latest saved record, changes it and writes it
/// back whole. There is no locking; concurrent writers race and the last one
/// wins. After each successful write the new record is broadcast to every
/// subscriber so other views can refresh.
#[derive(Clone)]
pub struct ProgressionStore {
    repository: Arc<dyn ProgressRepository>,
    changes: broadcast::Sender<ProgressRecord>,
}

impl ProgressionStore {
    pub fn new(repository: impl ProgressRepository + 'static) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            repository: Arc::new(repository),
            changes,
        }
    }

    /// A store backed by process memory only.
    pub fn in_memory() -> Self {
        Self::new(KeyValueRepository::new(MemoryStore::new()))
    }

    /// The latest saved record.
    pub fn progress(&self) -> StorageResult<ProgressRecord> {
        self.repository.load()
    }

    /// Receives the full record after every successful write.
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressRecord> {
        self.changes.subscribe()
    }

    fn update<T>(
        &self,
        operation: &'static str,
        apply: impl FnOnce(&mut ProgressRecord) -> Result<T, ValidationFailure>,
    ) -> ProgressResult<T> {
        let mut record = self.repository.load()?;
        let outcome = match apply(&mut record) {
            Ok(outcome) => outcome,
            Err(failure) => {
                debug!(operation, %failure, "progress update refused");
                return Err(failure.into());
            }
        };
        self.repository.save(&record)?;
        debug!(operation, coins = record.coins, "progress saved");
        // Nobody listening is fine.
        let _ = self.changes.send(record);
        Ok(outcome)
    }

    /// Adds coins and returns the new balance.
    pub fn add_coins(&self, amount: u32) -> ProgressResult<u32> {
        self.update("add_coins", |record| {
            record.coins = record.coins.saturating_add(amount);
            Ok(record.coins)
        })
    }

    /// Spends coins only if the whole amount is available. Returns the new balance.
    pub fn spend_coins(&self, amount: u32) -> ProgressResult<u32> {
        self.update("spend_coins", |record| {
            if record.coins < amount {
                return Err(ValidationFailure::InsufficientCoins {
                    balance: record.coins,
                    needed: amount,
                });
            }
            record.coins -= amount;
            Ok(record.coins)
        })
    }

    /// Appends every name, repeats included.
    ///
    /// Returns the names that were new before this call (no copies and no
    /// upgrade level), each once, in first-appearance order.
    pub fn add_move_copies<S: AsRef<str>>(&self, names: &[S]) -> ProgressResult<Vec<String>> {
        let names: Vec<&str> = names.iter().map(|name| name.as_ref()).collect();
        self.update("add_move_copies", |record| {
            let mut introduced = Vec::new();
            let mut seen: HashSet<&str> = HashSet::new();
            for &name in &names {
                if seen.insert(name) && !record.owns(name) {
                    introduced.push(name.to_string());
                }
            }
            record
                .inventory
                .extend(names.iter().map(|name| name.to_string()));
            Ok(introduced)
        })
    }

    /// Consumes five copies to raise a move one level. Returns the new level.
    pub fn upgrade_move(&self, name: &str) -> ProgressResult<u8> {
        let level = self.update("upgrade_move", |record| {
            let level = record.upgrade_level(name);
            if level >= MAX_UPGRADE_LEVEL {
                return Err(ValidationFailure::MaxLevel {
                    move_name: name.to_string(),
                });
            }
            let have = record.copies(name);
            if have < COPIES_PER_UPGRADE {
                return Err(ValidationFailure::NotEnoughCopies {
                    move_name: name.to_string(),
                    have,
                    need: COPIES_PER_UPGRADE,
                });
            }

            let mut to_remove = COPIES_PER_UPGRADE;
            record.inventory.retain(|owned| {
                if to_remove > 0 && owned == name {
                    to_remove -= 1;
                    false
                } else {
                    true
                }
            });
            record.upgrades.insert(name.to_string(), level + 1);
            Ok(level + 1)
        })?;
        info!(move_name = name, level, "move upgraded");
        Ok(level)
    }

    /// Replaces the deck. Ownership is not checked here; stale entries are
    /// dropped the next time the record is loaded.
    pub fn update_deck<S: AsRef<str>>(&self, names: &[S]) -> ProgressResult<()> {
        let names: Vec<&str> = names.iter().map(|name| name.as_ref()).collect();
        self.update("update_deck", |record| {
            if names.len() > DECK_SIZE {
                return Err(ValidationFailure::DeckTooLarge(names.len()));
            }
            if !names.contains(&MANDATORY_DECK_MOVE) {
                return Err(ValidationFailure::MissingMandatoryMove);
            }
            let mut seen: HashSet<&str> = HashSet::new();
            if let Some(repeated) = names.iter().find(|&&name| !seen.insert(name)) {
                return Err(ValidationFailure::DuplicateDeckMove(repeated.to_string()));
            }
            record.deck = names.iter().map(|name| name.to_string()).collect();
            Ok(())
        })
    }

    pub fn owned_moves(&self) -> StorageResult<Vec<String>> {
        Ok(self.progress()?.owned_moves())
    }
}

impl ProgressionLink for ProgressionStore {
    fn deck(&self) -> Vec<String> {
        match self.progress() {
            Ok(record) => record.deck,
            Err(err) => {
                warn!(%err, "could not read the deck");
                Vec::new()
            }
        }
    }

    fn upgrade_level(&self, move_name: &str) -> u8 {
        match self.progress() {
            Ok(record) => record.upgrade_level(move_name),
            Err(err) => {
                warn!(%err, move_name, "could not read upgrade level");
                0
            }
        }
    }

    fn award_coins(&self, amount: u32) {
        match self.add_coins(amount) {
            Ok(balance) => info!(amount, balance, "battle reward paid"),
            Err(err) => error!(%err, amount, "battle reward could not be saved"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ProgressError;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn empty_store() -> ProgressionStore {
        let store = ProgressionStore::in_memory();
        store
            .update("reset", |record| {
                record.inventory.clear();
                record.deck = vec![MANDATORY_DECK_MOVE.to_string()];
                Ok(())
            })
            .expect("reset record");
        store
    }

    fn validation(err: ProgressError) -> ValidationFailure {
        err.validation().cloned().expect("validation failure")
    }

    #[test]
    fn spend_is_all_or_nothing() {
        let store = ProgressionStore::in_memory();
        assert_eq!(store.spend_coins(120).expect("enough coins"), 180);

        let err = store.spend_coins(181).expect_err("not enough coins");
        assert_eq!(
            validation(err),
            ValidationFailure::InsufficientCoins {
                balance: 180,
                needed: 181
            }
        );
        assert_eq!(store.progress().expect("load").coins, 180);
        assert_eq!(store.add_coins(20).expect("add"), 200);
    }

    #[test]
    fn duplicate_names_in_one_batch_are_all_kept_but_reported_once() {
        let store = empty_store();
        let introduced = store.add_move_copies(&["A", "A"]).expect("add copies");

        assert_eq!(introduced, vec!["A".to_string()]);
        assert_eq!(store.progress().expect("load").copies("A"), 2);
    }

    #[test]
    fn newness_is_judged_against_the_state_before_the_call() {
        let store = empty_store();
        store.add_move_copies(&["맹독"]).expect("first copy");

        let introduced = store
            .add_move_copies(&["섀도볼", "맹독", "섀도볼", "방어"])
            .expect("second batch");
        assert_eq!(introduced, vec!["섀도볼".to_string(), "방어".to_string()]);
    }

    #[test]
    fn upgraded_moves_without_copies_are_not_new() {
        let store = empty_store();
        store.add_move_copies(&["맹독"; 5]).expect("five copies");
        store.upgrade_move("맹독").expect("upgrade");
        assert_eq!(store.progress().expect("load").copies("맹독"), 0);

        let introduced = store.add_move_copies(&["맹독"]).expect("another copy");
        assert!(introduced.is_empty());
    }

    #[test]
    fn upgrade_consumes_exactly_five_copies() {
        let store = empty_store();
        store.add_move_copies(&["방어"; 7]).expect("seven copies");

        assert_eq!(store.upgrade_move("방어").expect("upgrade"), 1);
        let record = store.progress().expect("load");
        assert_eq!(record.copies("방어"), 2);
        assert_eq!(record.upgrade_level("방어"), 1);

        let err = store.upgrade_move("방어").expect_err("only two copies left");
        assert_eq!(
            validation(err),
            ValidationFailure::NotEnoughCopies {
                move_name: "방어".to_string(),
                have: 2,
                need: 5
            }
        );
    }

    #[test]
    fn upgrade_at_max_level_never_mutates() {
        let store = empty_store();
        store.add_move_copies(&["방어"; 30]).expect("thirty copies");
        for expected in 1..=5 {
            assert_eq!(store.upgrade_move("방어").expect("upgrade"), expected);
        }
        let before = store.progress().expect("load");
        assert_eq!(before.copies("방어"), 5);

        for _ in 0..3 {
            let err = store.upgrade_move("방어").expect_err("max level");
            assert_eq!(
                validation(err),
                ValidationFailure::MaxLevel {
                    move_name: "방어".to_string()
                }
            );
        }
        assert_eq!(store.progress().expect("load"), before);
    }

    #[rstest]
    #[case(vec!["몸통박치기", "10만볼트"], ValidationFailure::MissingMandatoryMove)]
    #[case(
        vec!["몸통박치기", "10만볼트", "파괴광선", "HP회복", "째려보기", "튀어오르기", "방어"],
        ValidationFailure::DeckTooLarge(7)
    )]
    #[case(
        vec!["튀어오르기", "몸통박치기", "몸통박치기"],
        ValidationFailure::DuplicateDeckMove("몸통박치기".to_string())
    )]
    fn rejected_decks_leave_the_old_deck(
        #[case] deck: Vec<&str>,
        #[case] expected: ValidationFailure,
    ) {
        let store = ProgressionStore::in_memory();
        let err = store.update_deck(&deck).expect_err("deck rejected");
        assert_eq!(validation(err), expected);
        assert_eq!(store.progress().expect("load").deck, ProgressRecord::default().deck);
    }

    #[test]
    fn smaller_decks_are_accepted() {
        let store = ProgressionStore::in_memory();
        store
            .update_deck(&["튀어오르기", "몸통박치기", "10만볼트"])
            .expect("three-move deck");
        assert_eq!(store.progress().expect("load").deck.len(), 3);
    }

    #[test]
    fn unowned_deck_moves_are_saved_then_stripped_on_load() {
        let store = ProgressionStore::in_memory();
        store
            .update_deck(&["튀어오르기", "하이드로펌프"])
            .expect("deck saved without ownership check");

        assert_eq!(
            store.progress().expect("load").deck,
            vec!["튀어오르기".to_string()]
        );
    }

    #[test]
    fn subscribers_see_every_successful_write() {
        let store = ProgressionStore::in_memory();
        let mut changes = store.subscribe();

        store.add_coins(5).expect("add");
        let _ = store.spend_coins(10_000);
        store.spend_coins(5).expect("spend");

        assert_eq!(changes.try_recv().expect("first change").coins, 305);
        assert_eq!(changes.try_recv().expect("second change").coins, 300);
        assert!(changes.try_recv().is_err());
    }

    #[test]
    fn award_coins_through_the_battle_link() {
        let store = ProgressionStore::in_memory();
        let link: &dyn ProgressionLink = &store;
        link.award_coins(150);
        assert_eq!(store.progress().expect("load").coins, 450);
        assert_eq!(link.deck().len(), 6);
        assert_eq!(link.upgrade_level("몸통박치기"), 0);
    }
}
