use hupoker::cards::archetype::Archetype;
use hupoker::cards::hand::Hand;
use hupoker::clustering::equity::Sampler;
use hupoker::clustering::histogram::Histogram;
use hupoker::clustering::metric::Metric;
use hupoker::evaluator::strength::Strength;
use hupoker::gameplay::action::Action;
use hupoker::gameplay::history::History;
use hupoker::mccfr::node::Node;
use hupoker::Arbitrary;
use rand::rngs::SmallRng;
use rand::SeedableRng;

criterion::criterion_main!(benches);
criterion::criterion_group! {
    name = benches;
    config = criterion::Criterion::default()
        .without_plots()
        .noise_threshold(3.0)
        .significance_level(0.01)
        .sample_size(10)
        .measurement_time(std::time::Duration::from_secs(1));
    targets =
        evaluating_seven_card_strength,
        canonicalizing_archetypes,
        estimating_equity_distribution,
        computing_emd,
        decoding_betting_lines,
        regret_matching,
}

fn evaluating_seven_card_strength(c: &mut criterion::Criterion) {
    c.bench_function("evaluate a 7-card hand", |b| {
        let hand = Hand::random();
        b.iter(|| Strength::from(hand.cards()))
    });
}

fn canonicalizing_archetypes(c: &mut criterion::Criterion) {
    c.bench_function("canonicalize a 7-card hand", |b| {
        let hand = Hand::random();
        b.iter(|| Archetype::from(hand))
    });
}

fn estimating_equity_distribution(c: &mut criterion::Criterion) {
    c.bench_function("estimate a turn equity distribution", |b| {
        let hand = Hand::random();
        let cards = hand.cards();
        let sampler = Sampler {
            opponents: 50,
            rollouts: 50,
            bins: 50,
        };
        let ref mut rng = SmallRng::seed_from_u64(0);
        b.iter(|| sampler.distribution(&cards[..2], &cards[2..6], rng))
    });
}

fn computing_emd(c: &mut criterion::Criterion) {
    c.bench_function("EMD between two histograms", |b| {
        let ref x = Histogram::random();
        let ref y = Histogram::random();
        b.iter(|| Metric::Emd.distance(x, y))
    });
}

fn decoding_betting_lines(c: &mut criterion::Criterion) {
    c.bench_function("decode pot and legal actions", |b| {
        let history = [
            Action::Raise,
            Action::ThreeBet,
            Action::Call,
            Action::HalfPot,
            Action::MinRaise,
            Action::Call,
        ]
        .iter()
        .fold(History::default(), |h, a| h.extend(*a).unwrap());
        b.iter(|| (history.pot().unwrap(), history.legal_actions()))
    });
}

fn regret_matching(c: &mut criterion::Criterion) {
    c.bench_function("regret matching at a node", |b| {
        let mut node = Node::new(&[
            Action::Fold,
            Action::Call,
            Action::MinRaise,
            Action::Shove,
        ]);
        node.add_regret(&Action::Call, 17.0);
        node.add_regret(&Action::Shove, 3.0);
        b.iter(|| node.current_strategy(0.5, 0))
    });
}
