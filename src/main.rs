//! Survivor Royale entry point
//!
//! On the web the JS host drives `WebArena` from the library; natively this
//! runs one headless auto-piloted match and logs the outcome.
//!
//! Usage: `survivor-royale [warrior|mage|ranger] [seed] [config.json]`

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use survivor_royale::consts::SIM_DT;
    use survivor_royale::sim::{Archetype, GameEvent};
    use survivor_royale::{ArenaConfig, Session};

    env_logger::init();

    let mut args = std::env::args().skip(1);
    let archetype = match args.next() {
        Some(name) => name.parse::<Archetype>()?,
        None => Archetype::default(),
    };
    let seed = match args.next() {
        Some(s) => s.parse::<u64>()?,
        None => 1,
    };
    let config = match args.next() {
        Some(path) => ArenaConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => ArenaConfig::default(),
    };

    log::info!("Survivor Royale (native) starting: {archetype:?}, seed {seed}");
    let mut session = Session::new(seed, archetype, config);

    // Ten simulated minutes is far past any zone collapse
    let max_frames = (600.0 / SIM_DT) as u32;
    for _ in 0..max_frames {
        autopilot(&mut session);
        session.frame(SIM_DT);

        for event in session.drain_events() {
            match event {
                GameEvent::UpgradeOffered { choices, .. } => {
                    if let Some(&first) = choices.first() {
                        session.choose_upgrade(first)?;
                    }
                }
                GameEvent::MatchEnded {
                    won,
                    level,
                    kills,
                    time,
                } => {
                    log::info!(
                        "{} after {time:.1}s at level {level} with {kills} kills",
                        if won { "Won" } else { "Lost" }
                    );
                    return Ok(());
                }
            }
        }
    }

    log::warn!("Match still running after the frame limit");
    Ok(())
}

/// Hold position near the zone centre and fire the primary active on cooldown
#[cfg(not(target_arch = "wasm32"))]
fn autopilot(session: &mut survivor_royale::Session) {
    let world = &session.world;
    let center = world.config.center();
    let Some(player) = world.player() else {
        return;
    };
    let toward_center = center - player.pos;
    let movement = if toward_center.length() > world.zone_radius * 0.5 {
        toward_center
    } else {
        glam::Vec2::ZERO
    };
    session.set_movement(movement);
    session.trigger_primary();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is `web::start`, this is just to satisfy the compiler
}
