//! Offline training pipeline.
//!
//! Builds (or loads) the hand strength table and the per-street
//! card abstractions, runs CFR+ self-play until the iteration or
//! wall-clock budget runs out, and freezes the blueprint.

use anyhow::Context;
use clap::Parser;
use hupoker::blueprint::blueprint::Blueprint;
use hupoker::clustering::equity::Sampler;
use hupoker::clustering::kmeans::Init;
use hupoker::clustering::layer::Layer;
use hupoker::clustering::metric::Metric;
use hupoker::evaluator::table::HandTable;
use hupoker::mccfr::discount::Discount;
use hupoker::mccfr::encoder::Encoder;
use hupoker::mccfr::trainer;
use hupoker::mccfr::trainer::Trainer;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(about = "train a heads-up no-limit hold'em blueprint")]
struct Args {
    /// CFR+ iterations (each runs one traversal per seat)
    #[arg(long, default_value_t = hupoker::CFR_TRAINING_ITERATIONS)]
    iterations: usize,
    /// worker threads; 0 means all cores, 1 means single-threaded
    #[arg(long, default_value_t = 1)]
    threads: usize,
    /// iterations between checkpoint flushes
    #[arg(long, default_value_t = hupoker::CFR_CHECKPOINT_INTERVAL)]
    checkpoint: usize,
    /// iterations per worker between parallel merges
    #[arg(long, default_value_t = 0x400)]
    batch: usize,
    /// wall clock budget in seconds
    #[arg(long)]
    budget: Option<u64>,
    /// rng seed for dealing, sampling, and clustering
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// strategy averaging delay (0 = plain reach weighting)
    #[arg(long, default_value_t = hupoker::STRATEGY_DELAY)]
    delay: usize,
    /// discount early regrets and strategies (DCFR warmup)
    #[arg(long)]
    dcfr: bool,

    /// k-means cluster count per street
    #[arg(long, default_value_t = hupoker::KMEANS_FLOP_CLUSTER_COUNT)]
    flop_buckets: usize,
    #[arg(long, default_value_t = hupoker::KMEANS_TURN_CLUSTER_COUNT)]
    turn_buckets: usize,
    #[arg(long, default_value_t = hupoker::KMEANS_RIVE_CLUSTER_COUNT)]
    river_buckets: usize,
    /// k-means iteration budget
    #[arg(long, default_value_t = hupoker::KMEANS_TRAINING_ITERATIONS)]
    kmeans_iters: usize,
    /// equity histogram resolution
    #[arg(long, default_value_t = hupoker::EQUITY_BINS)]
    equity_bins: usize,
    /// opponent hands sampled per equity distribution
    #[arg(long, default_value_t = hupoker::OPPONENT_SAMPLES)]
    opponent_samples: usize,
    /// board runouts sampled per opponent hand
    #[arg(long, default_value_t = hupoker::ROLLOUT_SAMPLES)]
    rollout_samples: usize,
    /// river archetypes sampled as the clustering subset
    #[arg(long, default_value_t = hupoker::RIVER_ARCHETYPE_SAMPLES)]
    river_samples: usize,
    /// cluster with euclidean distance instead of EMD
    #[arg(long)]
    euclidean: bool,
    /// seed centroids with k-means++ instead of a uniform sample
    #[arg(long)]
    kmeans_plus_plus: bool,

    /// directory for cached artifacts and the blueprint
    #[arg(long, default_value = "data")]
    data: PathBuf,
}

fn main() -> anyhow::Result<()> {
    hupoker::init();
    let args = Args::parse();
    let threads = match args.threads {
        0 => num_cpus::get(),
        n => n,
    };
    let metric = match args.euclidean {
        true => Metric::Euclidean,
        false => Metric::Emd,
    };
    let init = match args.kmeans_plus_plus {
        true => Init::PlusPlus,
        false => Init::Random,
    };
    let sampler = Sampler {
        opponents: args.opponent_samples,
        rollouts: args.rollout_samples,
        bins: args.equity_bins,
    };

    let table = HandTable::load_or_build(&args.data.join("strength.table"));
    let streets = [
        Layer {
            buckets: args.flop_buckets,
            ..Layer::flop(args.seed)
        },
        Layer {
            buckets: args.turn_buckets,
            ..Layer::turn(args.seed)
        },
        Layer {
            buckets: args.river_buckets,
            river_samples: args.river_samples,
            ..Layer::river(args.seed)
        },
    ]
    .map(|layer| Layer {
        iterations: args.kmeans_iters,
        metric,
        init,
        sampler,
        ..layer
    })
    .map(|layer| layer.load_or_build(&args.data));
    let [flop, turn, river] = streets;
    let encoder = Arc::new(Encoder::new(
        flop,
        turn,
        river,
        sampler,
        Some(table),
        args.seed,
    ));

    let ref blueprint_path = args.data.join("blueprint");
    let budget = args.budget.map(Duration::from_secs);
    let discount = args.dcfr.then(Discount::default);
    let profile = if threads == 1 {
        let mut trainer =
            Trainer::new(encoder.clone(), args.seed, args.delay).discounted(discount);
        let start = std::time::Instant::now();
        let mut remaining = args.iterations;
        while remaining > 0 {
            let chunk = args.checkpoint.min(remaining);
            let left = budget.map(|b| b.saturating_sub(start.elapsed()));
            trainer.train(chunk, args.checkpoint, left);
            remaining -= chunk;
            Blueprint::from(trainer.profile())
                .save(blueprint_path)
                .context("checkpoint flush")?;
            if let Some(left) = left {
                if left.is_zero() {
                    break;
                }
            }
        }
        trainer.into_profile()
    } else {
        let rounds = (args.iterations / (threads * args.batch)).max(1);
        trainer::train_parallel(
            &encoder,
            args.seed,
            args.delay,
            discount,
            threads,
            rounds,
            args.batch,
        )
    };

    log::info!(
        "{:<32}{} infosets after {} iterations",
        "training complete",
        profile.len(),
        profile.iterations(),
    );
    Blueprint::from(&profile)
        .save(blueprint_path)
        .context("final blueprint flush")?;
    Ok(())
}
