//! Target Practice entry point
//!
//! On the web the game is driven from JavaScript through `target_practice::web`.
//! Natively this runs a headless auto-clicker session and logs the outcome.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use target_practice::consts::TICK_INTERVAL_MS;
    use target_practice::sim::{Difficulty, GameEvent, GamePhase, PowerUpKind};
    use target_practice::{NullMusic, Session, Settings};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42u64);
    let difficulty = args
        .next()
        .and_then(|s| Difficulty::from_str(&s))
        .unwrap_or(Difficulty::Normal);
    let duration_ms: u64 = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(120_000);

    log::info!("Target Practice (headless) seed={} difficulty={}", seed, difficulty.as_str());

    let mut session = Session::new(seed, Settings::default(), Box::new(NullMusic));
    session.start_session(difficulty);

    // Reaction time of the auto-clicker
    const CLICK_EVERY_MS: u64 = 400;
    let mut now = 0;
    let mut clicks = 0u32;
    let mut popped = 0u32;
    let mut expired = 0u32;
    while now < duration_ms && session.state().phase == GamePhase::Running {
        now += TICK_INTERVAL_MS;
        session.on_tick(now);

        if now % CLICK_EVERY_MS == 0 {
            let state = session.state();
            // Grab helpful power-ups first, otherwise the oldest live target
            let power_up = state
                .power_ups
                .iter()
                .find(|p| p.kind != PowerUpKind::Skull)
                .map(|p| p.center());
            let target = state.targets.iter().find(|t| !t.popping).map(|t| t.center());
            if let Some(point) = power_up.or(target) {
                session.on_pointer_move(point.x, point.y);
                session.on_click(point.x, point.y, now);
                clicks += 1;
            }
        }

        for event in session.take_events() {
            match event {
                GameEvent::TargetRemoved { .. } => popped += 1,
                GameEvent::TargetsExpired { count } => expired += count,
                _ => {}
            }
        }
    }

    let snapshot = session.snapshot(now);
    log::info!(
        "Finished after {:.1}s: phase={:?} score={} lives={} combo={} clicks={} popped={} expired={}",
        now as f64 / 1000.0,
        snapshot.phase,
        snapshot.score,
        snapshot.lives,
        snapshot.combo,
        clicks,
        popped,
        expired
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::wasm_start, this is just to satisfy the compiler
}
