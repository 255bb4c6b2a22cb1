pub mod blueprint;
pub mod cards;
pub mod clustering;
pub mod error;
pub mod evaluator;
pub mod gameplay;
pub mod mccfr;
pub mod save;

/// dimensional analysis types
pub type Chips = i32;
pub type Equity = f32;
pub type Energy = f32;
pub type Utility = f32;
pub type Probability = f32;

// table stakes. the solver is hardcoded to heads-up, and the
// small blind never appears on its own: limp and call decodings
// fold all blind arithmetic into the big blind.
pub const N: usize = 2;
pub const STACK: Chips = 20_000;
pub const B_BLIND: Chips = 100;

// equity estimation parameters
pub const EQUITY_BINS: usize = 50;
pub const OPPONENT_SAMPLES: usize = 100;
pub const ROLLOUT_SAMPLES: usize = 100;

// kmeans clustering parameters
pub const KMEANS_FLOP_CLUSTER_COUNT: usize = 128;
pub const KMEANS_TURN_CLUSTER_COUNT: usize = 144;
pub const KMEANS_RIVE_CLUSTER_COUNT: usize = 101;
pub const KMEANS_TRAINING_ITERATIONS: usize = 24;
pub const RIVER_ARCHETYPE_SAMPLES: usize = 0x100000;

// mccfr parameters
pub const CFR_TRAINING_ITERATIONS: usize = 0x400000;
pub const CFR_CHECKPOINT_INTERVAL: usize = 0x10000;
pub const CFR_DISCOUNT_PHASE: usize = 0x4000;
pub const CFR_EXPLOIT_SAMPLES: usize = 0x400;
pub const STRATEGY_DELAY: usize = 0;

/// trait for random generation, mainly (strictly?) for testing
pub trait Arbitrary {
    fn random() -> Self;
}

/// progress bar
pub fn progress(n: usize) -> indicatif::ProgressBar {
    let tick = std::time::Duration::from_secs(5);
    let style = "{spinner:.cyan} {elapsed} ~ {percent:>3}% {wide_bar:.cyan}";
    let style = indicatif::ProgressStyle::with_template(style).unwrap();
    let progress = indicatif::ProgressBar::new(n as u64);
    progress.set_style(style);
    progress.enable_steady_tick(tick);
    progress
}

/// initialize logging to terminal and timestamped file
pub fn init() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}
