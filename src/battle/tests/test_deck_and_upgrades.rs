#[cfg(test)]
mod tests {
    use crate::battle::runner::BattleRunner;
    use crate::battle::scheduler::ManualScheduler;
    use crate::battle::state::{BattleEvent, GameState};
    use crate::battle::tests::common::{
        create_test_battle, heads_rng, play_until, start_with_guess, FixedProgression,
        ScriptedMoves,
    };
    use crate::config::ArenaConfig;
    use crate::errors::BattleError;
    use crate::player::Side;
    use crate::rng::GameRng;
    use pretty_assertions::assert_eq;
    use schema::{CoinSide, Difficulty};
    use std::sync::Arc;

    #[test]
    fn test_deck_without_catalog_moves_cannot_wag() {
        let progression = Arc::new(FixedProgression::new().with_deck(&[
            "없는기술1",
            "없는기술2",
            "없는기술3",
            "없는기술4",
            "없는기술5",
            "없는기술6",
        ]));
        let mut runner = BattleRunner::new(
            &ArenaConfig::default(),
            progression,
            Box::new(ManualScheduler::new()),
            GameRng::new_for_test(heads_rng()),
        );
        runner.start_battle(Difficulty::Easy).expect("six names are enough to start");
        runner.submit_coin_guess(CoinSide::Heads).expect("guess");
        runner.fire_pending().expect("coin timer");
        assert_eq!(runner.state().game_state, GameState::ActionPending);

        assert_eq!(runner.trigger_player_action().err(), Some(BattleError::NoEligibleMove));

        assert_eq!(runner.state().game_state, GameState::ActionPending);
        assert_eq!(runner.pending_timer(), None);
        assert_eq!(
            runner.snapshot().log.last().map(String::as_str),
            Some("오류: 사용할 수 있는 기술이 없습니다! (덱을 확인해주세요)")
        );
    }

    #[test]
    fn test_player_draws_only_from_the_deck() {
        let progression = Arc::new(FixedProgression::new().with_deck(&[
            "방어",
            "튀어오르기",
            "없는기술1",
            "없는기술2",
            "없는기술3",
            "없는기술4",
        ]));
        let mut runner = BattleRunner::new(
            &ArenaConfig::default(),
            progression,
            Box::new(ManualScheduler::new()),
            GameRng::new_seeded(11),
        );
        for _ in 0..20 {
            runner.start_battle(Difficulty::Easy).expect("start");
            runner.submit_coin_guess(CoinSide::Heads).expect("guess");
            runner.fire_pending().expect("coin timer");
            if runner.state().game_state != GameState::ActionPending {
                continue;
            }
            runner.trigger_player_action().expect("deck has eligible moves");
            let current = runner.state().current_move.clone().expect("a move is animating");
            assert!(current == "방어" || current == "튀어오르기", "drew {}", current);
        }
    }

    #[test]
    fn test_finger_wag_treats_deck_moves_equally() {
        let progression = Arc::new(FixedProgression::new().with_deck(&[
            "튀어오르기",
            "리프레쉬",
            "없는기술1",
            "없는기술2",
            "없는기술3",
            "없는기술4",
        ]));
        // 0.1 wins the toss; 0.6 is the second half of a two-move deck,
        // though it would still be 튀어오르기 under the 60/20 catalog weights.
        let mut runner = BattleRunner::new(
            &ArenaConfig::default(),
            progression,
            Box::new(ManualScheduler::new()),
            GameRng::new_for_test(vec![0.1, 0.6]),
        );
        runner.start_battle(Difficulty::Easy).expect("start");
        runner.submit_coin_guess(CoinSide::Heads).expect("guess");
        runner.fire_pending().expect("coin timer");

        runner.trigger_player_action().expect("deck has eligible moves");
        assert_eq!(runner.state().current_move.as_deref(), Some("리프레쉬"));
    }

    #[test]
    fn test_upgraded_attack_hits_harder_and_shows_its_level() {
        let mut battle = create_test_battle(
            Arc::new(FixedProgression::new().with_upgrade("10만볼트", 3)),
            ScriptedMoves::always("튀어오르기"),
            ScriptedMoves::always("10만볼트"),
            heads_rng(),
        );
        start_with_guess(&mut battle, Difficulty::Easy, CoinSide::Heads);

        let events = play_until(&mut battle.runner, |state| {
            state.turn_number == 1 && state.game_state == GameState::CheckResult
        })
        .expect("turn 1");

        assert!(events.iter().any(|event| matches!(
            event,
            BattleEvent::MoveUsed {
                side: Side::Player,
                upgrade_level: 3,
                ..
            }
        )));
        assert_eq!(battle.runner.state().combatant(Side::Cpu).hp, 180 - 91);
        assert!(battle
            .runner
            .snapshot()
            .log
            .iter()
            .any(|line| line == "플레이어의 10만볼트 v3! (-91)"));
    }

    #[test]
    fn test_upgraded_refresh_cures_and_heals() {
        let mut battle = create_test_battle(
            Arc::new(FixedProgression::new().with_upgrade("리프레쉬", 2)),
            ScriptedMoves::always("맹독"),
            ScriptedMoves::always("리프레쉬"),
            heads_rng(),
        );
        start_with_guess(&mut battle, Difficulty::Easy, CoinSide::Tails);

        let events = play_until(&mut battle.runner, |state| {
            state.turn_number == 2 && state.game_state == GameState::CheckResult
        })
        .expect("two turns");

        assert!(events
            .iter()
            .any(|event| matches!(event, BattleEvent::StatusCured { side: Side::Player })));
        assert!(events.iter().any(|event| matches!(
            event,
            BattleEvent::RefreshHealed {
                side: Side::Player,
                amount: 20
            }
        )));
        let player = battle.runner.snapshot().player;
        assert!(!player.poisoned);
        // One poison tick of 20, then 20 back.
        assert_eq!(player.hp, 200);
    }

    #[test]
    fn test_hyper_beam_costs_the_user_its_next_turn() {
        let mut battle = create_test_battle(
            Arc::new(FixedProgression::new()),
            ScriptedMoves::always("파괴광선"),
            ScriptedMoves::always("튀어오르기"),
            heads_rng(),
        );
        start_with_guess(&mut battle, Difficulty::Easy, CoinSide::Tails);

        let events = play_until(&mut battle.runner, |state| {
            state.turn_number == 4 && state.game_state == GameState::ActionPending
        })
        .expect("four turns");

        let cpu_moves = events
            .iter()
            .filter(|event| matches!(event, BattleEvent::MoveUsed { side: Side::Cpu, .. }))
            .count();
        assert_eq!(cpu_moves, 1);
        assert!(events
            .iter()
            .any(|event| matches!(event, BattleEvent::RechargeSkipped { side: Side::Cpu })));

        let snapshot = battle.runner.snapshot();
        assert_eq!(snapshot.player.hp, 80);
        // The skipped turn is remembered as no move at all.
        assert_eq!(snapshot.cpu.last_move, None);
        assert_eq!(battle.runner.state().recharge_pending, None);
    }
}
