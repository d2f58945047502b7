use super::*;
use commonware_codec::{Encode, EncodeSize, ReadExt};

fn record(game_type: GameType, bet: u64, outcome: Outcome, payout: u64) -> OutcomeRecord {
    OutcomeRecord {
        game_type,
        bet,
        outcome,
        payout,
        details: vec![1, 2, 3],
    }
}

#[test]
fn test_game_type_roundtrip() {
    for game_type in GameType::ALL {
        let encoded = game_type.encode();
        let decoded = GameType::read(&mut &encoded[..]).unwrap();
        assert_eq!(game_type, decoded);
    }
}

#[test]
fn test_game_type_rejects_unknown_tag() {
    let encoded = [10u8];
    assert!(GameType::read(&mut &encoded[..]).is_err());
}

#[test]
fn test_game_type_from_name() {
    for game_type in GameType::ALL {
        assert_eq!(game_type.name().parse::<GameType>().unwrap(), game_type);
    }
    assert!("roulette".parse::<GameType>().is_err());
}

#[test]
fn test_outcome_record_roundtrip() {
    let record = record(GameType::MiniDerby, 25, Outcome::Win, 250);
    let encoded = record.encode();
    assert_eq!(encoded.len(), record.encode_size());
    let decoded = OutcomeRecord::read(&mut &encoded[..]).unwrap();
    assert_eq!(record, decoded);
    assert_eq!(decoded.net(), 225);
}

#[test]
fn test_outcome_record_rejects_oversized_details() {
    let mut record = record(GameType::SlotMachine, 1, Outcome::Loss, 0);
    record.details = vec![0; MAX_DETAILS_LENGTH + 1];
    let encoded = record.encode();
    assert!(OutcomeRecord::read(&mut &encoded[..]).is_err());
}

#[test]
fn test_game_event_roundtrip() {
    for highlight in [None, Some(Highlight::Streak(7)), Some(Highlight::Exacta)] {
        let event = GameEvent {
            game_type: GameType::HigherOrLower,
            outcome: Outcome::Win,
            bet: 10,
            payout: 30,
            highlight,
        };
        let encoded = event.encode();
        assert_eq!(encoded.len(), event.encode_size());
        assert_eq!(GameEvent::read(&mut &encoded[..]).unwrap(), event);
    }
}

#[test]
fn test_player_roundtrip() {
    let mut player = Player::new("TestPlayer");
    player.record_outcome(&record(GameType::Blackjack, 10, Outcome::Push, 10));
    let encoded = player.encode();
    let decoded = Player::read(&mut &encoded[..]).unwrap();
    assert_eq!(player, decoded);
}

#[test]
fn test_player_name_is_clamped() {
    let player = Player::new(&"é".repeat(40));
    assert!(player.name.len() <= MAX_NAME_LENGTH);
    assert!(player.name.chars().all(|c| c == 'é'));
}

#[test]
fn test_debit_checks_balance() {
    let mut player = Player::with_balance("p", 50);
    assert_eq!(player.debit(0), Err(LedgerError::ZeroAmount));
    assert_eq!(
        player.debit(51),
        Err(LedgerError::InsufficientFunds {
            balance: 50,
            amount: 51
        })
    );
    assert_eq!(player.balance, 50);

    player.debit(50).unwrap();
    assert_eq!(player.balance, 0);
    assert_eq!(player.lifetime_wagered, 50);
}

#[test]
fn test_settle_round_push_is_not_earnings() {
    let mut player = Player::with_balance("p", 100);
    player.debit(10).unwrap();
    settle_round(&mut player, &record(GameType::Blackjack, 10, Outcome::Push, 10));
    assert_eq!(player.balance, 100);
    assert_eq!(player.lifetime_earned, 0);
    assert_eq!(player.xp, XP_PER_ROUND);

    player.debit(10).unwrap();
    settle_round(&mut player, &record(GameType::Blackjack, 10, Outcome::Win, 20));
    assert_eq!(player.balance, 110);
    assert_eq!(player.lifetime_earned, 20);
    assert_eq!(player.biggest_win, 20);
    assert_eq!(player.xp, 2 * XP_PER_ROUND + XP_PER_WIN);
}

#[test]
fn test_level_progression() {
    assert_eq!(level_for_xp(0), 1);
    assert_eq!(level_for_xp(XP_PER_LEVEL - 1), 1);
    assert_eq!(level_for_xp(XP_PER_LEVEL), 2);
    assert_eq!(level_for_xp(u64::MAX), (1 + u64::MAX / XP_PER_LEVEL).min(u32::MAX as u64) as u32);
}

#[test]
fn test_stats_update() {
    let mut stats = GameStats::default();
    stats.update(&record(GameType::DiceRoll, 10, Outcome::Loss, 0));
    stats.update(&record(GameType::CoinFlip, 10, Outcome::Win, 20));
    stats.update(&record(GameType::DiceRoll, 10, Outcome::Win, 350));

    // Sorted by game type
    assert_eq!(stats.entries.len(), 2);
    assert_eq!(stats.entries[0].game_type, GameType::CoinFlip);
    assert_eq!(stats.entries[1].game_type, GameType::DiceRoll);

    let dice = stats.get(GameType::DiceRoll).unwrap();
    assert_eq!(dice.rounds, 2);
    assert_eq!(dice.wins, 1);
    assert_eq!(dice.losses, 1);
    assert_eq!(dice.wagered, 20);
    assert_eq!(dice.paid_out, 350);
    assert_eq!(dice.biggest_payout, 350);
    assert_eq!(dice.return_bps(), Some(175_000));
    assert_eq!(stats.total_rounds(), 3);
    assert!(stats.get(GameType::MiniPoker).is_none());
}
