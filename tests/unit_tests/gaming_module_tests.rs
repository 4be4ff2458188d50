//! Unit Tests for Gaming Module Components
//! 
//! Tests for the gaming orchestrator, payout engine, and game rules.

use std::collections::HashMap;
use tokio::sync::RwLock;
use std::sync::Arc;

use bitcraps::{
    Error, Result,
    protocol::{PeerId, GameId, CrapTokens, DiceRoll, BetType, random_peer_id},
    gaming::{GameOrchestrator, PayoutEngine},
};
use crate::common::test_harness::{TestResult, test_utils};

/// Game Orchestrator Tests
#[cfg(test)]
mod game_orchestrator_tests {
    use super::*;

    #[tokio::test]
    async fn test_game_orchestrator_creation() -> TestResult {
        let peer_id = random_peer_id();
        
        // Test basic creation - would need to adjust based on actual constructor
        // This is a template showing the testing pattern
        let config = Default::default(); // GameOrchestratorConfig
        let orchestrator = GameOrchestrator::new(peer_id, config).await;
        
        // Basic assertions about initial state
        assert!(orchestrator.is_ok());
        
        Ok(())
    }

    #[tokio::test]
    async fn test_game_creation() -> TestResult {
        let peer_id = random_peer_id();
        let config = Default::default();
        let orchestrator = GameOrchestrator::new(peer_id, config).await?;
        
        // Test game creation
        let game_id = test_utils::test_game_id();
        let min_players = 2;
        let max_players = 8;
        
        // This would need adjustment based on actual GameOrchestrator API
        // let result = orchestrator.create_game(game_id, min_players, max_players).await;
        // assert!(result.is_ok());
        
        Ok(())
    }

    #[tokio::test]
    async fn test_player_join_leave() -> TestResult {
        let host_peer = random_peer_id();
        let player_peer = random_peer_id();
        let config = Default::default();
        let orchestrator = GameOrchestrator::new(host_peer, config).await?;
        
        let game_id = test_utils::test_game_id();
        
        // Test player joining
        // let join_result = orchestrator.join_game(game_id, player_peer).await;
        // assert!(join_result.is_ok());
        
        // Test player leaving
        // let leave_result = orchestrator.leave_game(game_id, player_peer).await;
        // assert!(leave_result.is_ok());
        
        Ok(())
    }

    #[tokio::test]
    async fn test_betting_phase() -> TestResult {
        let orchestrator_config = Default::default();
        let host_peer = random_peer_id();
        let orchestrator = GameOrchestrator::new(host_peer, orchestrator_config).await?;
        
        let game_id = test_utils::test_game_id();
        let player_peer = random_peer_id();
        let bet_amount = CrapTokens::new(100);
        
        // Test placing a bet
        // let bet_result = orchestrator.place_bet(
        //     game_id, 
        //     player_peer, 
        //     BetType::Pass, 
        //     bet_amount
        // ).await;
        // assert!(bet_result.is_ok());
        
        Ok(())
    }
}

/// Payout Engine Tests
#[cfg(test)]
mod payout_engine_tests {
    use super::*;

    #[tokio::test]
    async fn test_payout_engine_creation() -> TestResult {
        let config = Default::default(); // PayoutEngineConfig
        let engine = PayoutEngine::new(config);
        
        assert!(engine.is_ok());
        Ok(())
    }

    #[tokio::test]
    async fn test_pass_line_payout() -> TestResult {
        let config = Default::default();
        let engine = PayoutEngine::new(config)?;
        
        let bet_amount = CrapTokens::new(100);
        let dice_roll = DiceRoll::new(3, 4)?; // Natural 7
        
        // Test pass line bet winning on come-out roll
        // let payout = engine.calculate_payout(BetType::Pass, bet_amount, dice_roll, GamePhase::ComeOut);
        // assert_eq!(payout, CrapTokens::new(200)); // 1:1 payout
        
        Ok(())
    }

    #[tokio::test]
    async fn test_dont_pass_payout() -> TestResult {
        let config = Default::default();
        let engine = PayoutEngine::new(config)?;
        
        let bet_amount = CrapTokens::new(50);
        let dice_roll = DiceRoll::new(1, 2)?; // Craps (3)
        
        // Test don't pass bet winning on craps
        // let payout = engine.calculate_payout(BetType::DontPass, bet_amount, dice_roll, GamePhase::ComeOut);
        // assert_eq!(payout, CrapTokens::new(100)); // 1:1 payout
        
        Ok(())
    }

    #[tokio::test]
    async fn test_field_bet_payout() -> TestResult {
        let config = Default::default();
        let engine = PayoutEngine::new(config)?;
        
        let bet_amount = CrapTokens::new(25);
        
        // Test field bet on different rolls
        let roll_2 = DiceRoll::new(1, 1)?; // Should pay 2:1
        let roll_12 = DiceRoll::new(6, 6)?; // Should pay 2:1
        let roll_3 = DiceRoll::new(1, 2)?; // Should pay 1:1
        
        // let payout_2 = engine.calculate_payout(BetType::Field, bet_amount, roll_2, GamePhase::Point(4));
        // let payout_12 = engine.calculate_payout(BetType::Field, bet_amount, roll_12, GamePhase::Point(4));
        // let payout_3 = engine.calculate_payout(BetType::Field, bet_amount, roll_3, GamePhase::Point(4));
        
        // assert_eq!(payout_2, CrapTokens::new(75)); // 2:1 payout + original bet
        // assert_eq!(payout_12, CrapTokens::new(75)); // 2:1 payout + original bet  
        // assert_eq!(payout_3, CrapTokens::new(50)); // 1:1 payout + original bet
        
        Ok(())
    }

    #[tokio::test]
    async fn test_hard_way_payout() -> TestResult {
        let config = Default::default();
        let engine = PayoutEngine::new(config)?;
        
        let bet_amount = CrapTokens::new(10);
        let hard_6 = DiceRoll::new(3, 3)?; // Hard 6
        
        // Test hard way bet
        // let payout = engine.calculate_payout(BetType::Hard6, bet_amount, hard_6, GamePhase::Point(6));
        // assert_eq!(payout, CrapTokens::new(100)); // 9:1 payout + original bet
        
        Ok(())
    }

    #[tokio::test]
    async fn test_odds_bet_payout() -> TestResult {
        let config = Default::default();
        let engine = PayoutEngine::new(config)?;
        
        let bet_amount = CrapTokens::new(100);
        let point_roll = DiceRoll::new(2, 2)?; // Point 4
        
        // Test odds bet behind pass line
        // let payout = engine.calculate_payout(BetType::OddsPass, bet_amount, point_roll, GamePhase::Point(4));
        // assert_eq!(payout, CrapTokens::new(300)); // 2:1 payout + original bet for point 4
        
        Ok(())
    }

    #[tokio::test]
    async fn test_proposition_bet_payouts() -> TestResult {
        let config = Default::default();
        let engine = PayoutEngine::new(config)?;
        
        let bet_amount = CrapTokens::new(5);
        
        // Test various proposition bets
        let any_seven = DiceRoll::new(3, 4)?;
        let any_craps = DiceRoll::new(1, 1)?;
        
        // let seven_payout = engine.calculate_payout(BetType::Next7, bet_amount, any_seven, GamePhase::Point(6));
        // let craps_payout = engine.calculate_payout(BetType::Next2, bet_amount, any_craps, GamePhase::Point(6));
        
        // assert_eq!(seven_payout, CrapTokens::new(25)); // 4:1 payout + original
        // assert_eq!(craps_payout, CrapTokens::new(155)); // 30:1 payout + original
        
        Ok(())
    }
}

/// Dice Roll and Game Rules Tests
#[cfg(test)]
mod dice_rules_tests {
    use super::*;

    #[tokio::test]
    async fn test_dice_roll_validation() -> TestResult {
        // Test valid dice rolls
        let valid_roll = DiceRoll::new(1, 6);
        assert!(valid_roll.is_ok());
        
        // Test invalid dice rolls
        let invalid_roll1 = DiceRoll::new(0, 3);
        assert!(invalid_roll1.is_err());
        
        let invalid_roll2 = DiceRoll::new(4, 7);
        assert!(invalid_roll2.is_err());
        
        Ok(())
    }

    #[tokio::test]
    async fn test_natural_detection() -> TestResult {
        let natural_7 = DiceRoll::new(3, 4)?;
        let natural_11 = DiceRoll::new(5, 6)?;
        let not_natural = DiceRoll::new(2, 3)?;
        
        assert!(natural_7.is_natural());
        assert!(natural_11.is_natural());
        assert!(!not_natural.is_natural());
        
        Ok(())
    }

    #[tokio::test]
    async fn test_craps_detection() -> TestResult {
        let craps_2 = DiceRoll::new(1, 1)?;
        let craps_3 = DiceRoll::new(1, 2)?;
        let craps_12 = DiceRoll::new(6, 6)?;
        let not_craps = DiceRoll::new(2, 3)?;
        
        assert!(craps_2.is_craps());
        assert!(craps_3.is_craps());
        assert!(craps_12.is_craps());
        assert!(!not_craps.is_craps());
        
        Ok(())
    }

    #[tokio::test]
    async fn test_hard_way_detection() -> TestResult {
        let hard_4 = DiceRoll::new(2, 2)?;
        let hard_6 = DiceRoll::new(3, 3)?;
        let hard_8 = DiceRoll::new(4, 4)?;
        let hard_10 = DiceRoll::new(5, 5)?;
        let easy_6 = DiceRoll::new(2, 4)?;
        
        assert!(hard_4.is_hard_way());
        assert!(hard_6.is_hard_way());
        assert!(hard_8.is_hard_way());
        assert!(hard_10.is_hard_way());
        assert!(!easy_6.is_hard_way());
        
        Ok(())
    }

    #[tokio::test]
    async fn test_point_numbers() -> TestResult {
        let point_4 = DiceRoll::new(2, 2)?;
        let point_5 = DiceRoll::new(2, 3)?;
        let point_6 = DiceRoll::new(3, 3)?;
        let point_8 = DiceRoll::new(4, 4)?;
        let point_9 = DiceRoll::new(4, 5)?;
        let point_10 = DiceRoll::new(5, 5)?;
        let not_point = DiceRoll::new(3, 4)?; // 7
        
        let point_numbers = [4, 5, 6, 8, 9, 10];
        
        assert!(point_numbers.contains(&point_4.total()));
        assert!(point_numbers.contains(&point_5.total()));
        assert!(point_numbers.contains(&point_6.total()));
        assert!(point_numbers.contains(&point_8.total()));
        assert!(point_numbers.contains(&point_9.total()));
        assert!(point_numbers.contains(&point_10.total()));
        assert!(!point_numbers.contains(&not_point.total()));
        
        Ok(())
    }
}

/// Token Economics Tests for Gaming
#[cfg(test)]
mod token_gaming_tests {
    use super::*;

    #[tokio::test]
    async fn test_crap_tokens_arithmetic() -> TestResult {
        let initial = CrapTokens::new(1000);
        let bet = CrapTokens::new(100);
        let winnings = CrapTokens::new(200);
        
        // Test subtraction (placing bet)
        let after_bet = initial.checked_sub(bet).unwrap();
        assert_eq!(after_bet.amount(), 900);
        
        // Test addition (receiving winnings)
        let after_win = after_bet.checked_add(winnings).unwrap();
        assert_eq!(after_win.amount(), 1100);
        
        Ok(())
    }

    #[tokio::test]
    async fn test_crap_tokens_overflow_protection() -> TestResult {
        let max_tokens = CrapTokens::new(u64::MAX);
        let additional = CrapTokens::new(1);
        
        // Should return None on overflow
        assert!(max_tokens.checked_add(additional).is_none());
        
        // Saturating add should cap at max value
        let saturated = max_tokens.saturating_add(additional);
        assert_eq!(saturated.amount(), u64::MAX);
        
        Ok(())
    }

    #[tokio::test]
    async fn test_crap_tokens_underflow_protection() -> TestResult {
        let small_amount = CrapTokens::new(10);
        let large_bet = CrapTokens::new(20);
        
        // Should return None on underflow
        assert!(small_amount.checked_sub(large_bet).is_none());
        
        // Saturating sub should cap at zero
        let saturated = small_amount.saturating_sub(large_bet);
        assert_eq!(saturated.amount(), 0);
        
        Ok(())
    }

    #[tokio::test]
    async fn test_crap_tokens_display() -> TestResult {
        let tokens = CrapTokens::new(1500);
        let display_str = format!("{}", tokens);
        
        // Should include the CRAP symbol
        assert!(display_str.contains("1500"));
        assert!(display_str.contains("Ȼ")); // CRAP token symbol
        
        Ok(())
    }

    #[tokio::test]
    async fn test_crap_tokens_conversion() -> TestResult {
        // Test floating point conversion
        let from_float = CrapTokens::from_crap(5.25)?;
        assert_eq!(from_float.amount(), 5_250_000); // 5.25 CRAP = 5,250,000 atomic units
        
        let to_float = from_float.to_crap();
        assert!((to_float - 5.25).abs() < f64::EPSILON);
        
        // Test integer conversion
        let from_int = CrapTokens::from(1000u64);
        assert_eq!(from_int.amount(), 1000);
        
        let to_int: u64 = from_int.into();
        assert_eq!(to_int, 1000);
        
        Ok(())
    }
}

/// Multi-Game Framework Tests
#[cfg(test)]
mod multi_game_tests {
    use super::*;

    #[tokio::test]
    async fn test_multiple_concurrent_games() -> TestResult {
        let host_peer = random_peer_id();
        let config = Default::default();
        let orchestrator = GameOrchestrator::new(host_peer, config).await?;
        
        let game1_id = test_utils::test_game_id();
        let game2_id = test_utils::test_game_id();
        let game3_id = test_utils::test_game_id();
        
        // Test creating multiple games simultaneously
        // let game1_result = orchestrator.create_game(game1_id, 2, 8).await;
        // let game2_result = orchestrator.create_game(game2_id, 2, 6).await;
        // let game3_result = orchestrator.create_game(game3_id, 2, 4).await;
        
        // assert!(game1_result.is_ok());
        // assert!(game2_result.is_ok());
        // assert!(game3_result.is_ok());
        
        // Test that games are isolated from each other
        let player1 = random_peer_id();
        let player2 = random_peer_id();
        
        // let join1_result = orchestrator.join_game(game1_id, player1).await;
        // let join2_result = orchestrator.join_game(game2_id, player2).await;
        
        // assert!(join1_result.is_ok());
        // assert!(join2_result.is_ok());
        
        Ok(())
    }

    #[tokio::test]
    async fn test_game_resource_limits() -> TestResult {
        let host_peer = random_peer_id();
        let config = Default::default();
        let orchestrator = GameOrchestrator::new(host_peer, config).await?;
        
        // Test maximum game limit (if implemented)
        let mut game_ids = Vec::new();
        for i in 0..100 {
            game_ids.push(test_utils::test_game_id());
        }
        
        // Try to create many games and see if there are limits
        for game_id in game_ids {
            // let result = orchestrator.create_game(game_id, 2, 8).await;
            // This test would verify resource limits are enforced
        }
        
        Ok(())
    }
}

/// Performance Tests for Gaming Components
#[cfg(test)]
mod gaming_performance_tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_payout_calculation_performance() -> TestResult {
        let config = Default::default();
        let engine = PayoutEngine::new(config)?;
        
        let bet_amount = CrapTokens::new(100);
        let dice_roll = DiceRoll::new(3, 4)?;
        
        let start = Instant::now();
        
        // Run many payout calculations
        for _ in 0..10000 {
            // let _payout = engine.calculate_payout(BetType::Pass, bet_amount, dice_roll, GamePhase::ComeOut);
        }
        
        let elapsed = start.elapsed();
        let per_calculation = elapsed.as_nanos() / 10000;
        
        println!("Payout calculation: {}ns per operation", per_calculation);
        
        // Should be very fast (less than 1μs per calculation)
        assert!(per_calculation < 1_000, "Payout calculations should be under 1μs");
        
        Ok(())
    }

    #[tokio::test]
    async fn test_dice_roll_generation_performance() -> TestResult {
        let start = Instant::now();
        
        let mut rolls = Vec::new();
        for _ in 0..10000 {
            rolls.push(DiceRoll::generate());
        }
        
        let elapsed = start.elapsed();
        let per_roll = elapsed.as_nanos() / 10000;
        
        println!("Dice roll generation: {}ns per roll", per_roll);
        
        // Verify randomness distribution
        let mut totals = [0u32; 11]; // totals 2-12
        for roll in rolls {
            totals[(roll.total() - 2) as usize] += 1;
        }
        
        // Check that we got a reasonable distribution
        assert!(totals[5] > 1000); // Total 7 should be most common
        assert!(totals[0] > 100);  // Total 2 should be least common
        assert!(totals[10] > 100); // Total 12 should be least common
        
        Ok(())
    }
}

/// Error Handling Tests
#[cfg(test)]
mod gaming_error_tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_bet_handling() -> TestResult {
        let config = Default::default();
        let engine = PayoutEngine::new(config)?;
        
        // Test bet amount validation
        let zero_bet = CrapTokens::new(0);
        let huge_bet = CrapTokens::new(u64::MAX);
        
        // These should be handled gracefully
        // let zero_result = engine.validate_bet_amount(zero_bet);
        // let huge_result = engine.validate_bet_amount(huge_bet);
        
        // assert!(zero_result.is_err());
        // assert!(huge_result.is_err());
        
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_game_state_handling() -> TestResult {
        let host_peer = random_peer_id();
        let config = Default::default();
        let orchestrator = GameOrchestrator::new(host_peer, config).await?;
        
        let nonexistent_game = test_utils::test_game_id();
        let player = random_peer_id();
        
        // Test operations on nonexistent game
        // let join_result = orchestrator.join_game(nonexistent_game, player).await;
        // assert!(join_result.is_err());
        
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_modification_safety() -> TestResult {
        let host_peer = random_peer_id();
        let config = Default::default();
        let orchestrator = Arc::new(GameOrchestrator::new(host_peer, config).await?);
        
        let game_id = test_utils::test_game_id();
        
        // Test concurrent access to the same game
        let mut handles = Vec::new();
        
        for i in 0..10 {
            let orchestrator_clone = Arc::clone(&orchestrator);
            let player = random_peer_id();
            
            let handle = tokio::spawn(async move {
                // let result = orchestrator_clone.join_game(game_id, player).await;
                // result
                Ok::<(), Error>(())
            });
            
            handles.push(handle);
        }
        
        // Wait for all concurrent operations
        for handle in handles {
            let _result = handle.await.unwrap();
            // Check that concurrent operations either succeed or fail gracefully
        }
        
        Ok(())
    }
}