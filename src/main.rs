//! Tile Clash CLI - Testing and development entry point
//!
//! Plays a seeded demo match on the desktop: a Normal evaluator stands in
//! for the player against the configured AI difficulty.
//!
//! Usage: `tile-clash [seed] [easy|normal|hard|expert]`

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use tile_clash::ai::{AiEvent, PlacementEvaluator};
use tile_clash::config::{DifficultyLevel, DifficultyProfile, Settings};
use tile_clash::game::{AttackRangePattern, BattlePhase, JobClass, Team, UnitTemplate};
use tile_clash::{Result, TileClash};

fn main() {
    let mut args = std::env::args().skip(1);
    let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);
    let level = match args.next().as_deref() {
        Some("easy") => DifficultyLevel::Easy,
        Some("hard") => DifficultyLevel::Hard,
        Some("expert") => DifficultyLevel::Expert,
        _ => DifficultyLevel::Normal,
    };

    println!("Tile Clash - Two-board tile battle AI");
    println!("=====================================");
    println!();

    if let Err(err) = run(seed, level) {
        eprintln!("Demo failed: {}", err);
        std::process::exit(1);
    }
}

fn run(seed: u64, level: DifficultyLevel) -> Result<()> {
    let mut settings = Settings::instant(level);
    settings.battle.max_characters = 5;

    println!("Current Configuration:");
    println!("  - Seed: {}", seed);
    println!("  - AI Difficulty: {:?}", settings.difficulty.level);
    println!(
        "  - Selection Strategy: {}",
        settings.difficulty.selection_strategy
    );
    println!(
        "  - Boards: 2 x {}x{}",
        settings.battle.board_width, settings.battle.board_height
    );
    println!();

    let mut game = TileClash::new(settings, seed)?;
    let pool = sample_roster();

    let player_ids = game.enlist_player(&pool[..5])?;
    let ai_ids = game.select_ai_roster(&pool)?;
    print_roster(&game, "Player", &player_ids);
    print_roster(&game, "AI", &ai_ids);
    println!();

    game.start_battle()?;

    let stand_in = PlacementEvaluator::new();
    let profile = DifficultyProfile::for_level(DifficultyLevel::Normal);
    let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(1));

    while game.session().phase() == BattlePhase::Deployment {
        match game.session().active_team() {
            Team::Player => {
                let Some(id) = game.session().next_deployable(Team::Player) else {
                    break;
                };
                let Some(unit) = game.field().unit(id).cloned() else {
                    break;
                };
                let field = game.field();
                let best = stand_in.best_position(&unit, field, &profile, &mut rng);
                let Some(decision) = best else {
                    break;
                };
                game.place_player_unit(id, decision.board, decision.position)?;
                println!(
                    "Player  {:<10} -> board {} {}",
                    unit.name, decision.board, decision.position
                );
            }
            Team::Ai => {
                for event in game.run_ai_turn()? {
                    if let AiEvent::UnitPlaced {
                        unit_id,
                        board,
                        position,
                    } = event
                    {
                        let name = game
                            .field()
                            .unit(unit_id)
                            .map(|u| u.name.clone())
                            .unwrap_or_default();
                        println!("AI      {:<10} -> board {} {}", name, board, position);
                    }
                }
            }
        }
    }

    println!();
    let result = game.resolve_combat()?;
    if let Some(report) = game.session().combat_report() {
        println!(
            "Combat: {} strike(s), {} casualt(ies)",
            report.strikes.len(),
            report.casualties.len()
        );
    }
    println!("Board A: {:?}", result.board_a);
    println!("Board B: {:?}", result.board_b);
    println!("Result:  {:?}", result.result);

    Ok(())
}

fn print_roster(game: &TileClash, label: &str, ids: &[tile_clash::game::UnitId]) {
    let names: Vec<String> = ids
        .iter()
        .filter_map(|id| game.field().unit(*id))
        .map(|u| format!("{} ({:?}, {})", u.name, u.job_class, u.attack_range.name()))
        .collect();
    println!("{} roster: {}", label, names.join(", "));
}

/// Demo character pool
fn sample_roster() -> Vec<UnitTemplate> {
    vec![
        UnitTemplate::new("warrior_1", JobClass::Warrior, 10.0).with_bulk(120.0, 10.0),
        UnitTemplate::new("mage_1", JobClass::Mage, 8.0)
            .with_range(AttackRangePattern::Square(1))
            .with_bulk(70.0, 7.0)
            .with_synergy(),
        UnitTemplate::new("archer_1", JobClass::Ranger, 7.0)
            .with_range(AttackRangePattern::Line(3))
            .with_bulk(90.0, 8.0),
        UnitTemplate::new("knight_1", JobClass::Knight, 9.0)
            .with_range(AttackRangePattern::LShape)
            .with_bulk(130.0, 15.0),
        UnitTemplate::new("assassin_1", JobClass::Assassin, 11.0)
            .with_range(AttackRangePattern::Diagonal)
            .with_bulk(85.0, 6.0),
        UnitTemplate::new("priest_1", JobClass::Priest, 5.0)
            .with_range(AttackRangePattern::Circle(1))
            .with_bulk(80.0, 9.0)
            .with_synergy(),
        UnitTemplate::new("mage_2", JobClass::Mage, 9.0)
            .with_range(AttackRangePattern::Circle(2))
            .with_bulk(65.0, 6.0)
            .with_synergy(),
        UnitTemplate::new("gunner_1", JobClass::Gunner, 8.0)
            .with_range(AttackRangePattern::Line(4))
            .with_bulk(75.0, 7.0),
    ]
}
