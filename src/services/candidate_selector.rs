//! Candidate Selector (C4) — picks up to `k` indices out of a scored pool,
//! maximizing the mean Priority Scorer (C3) value of the chosen subset.
//!
//! Three metaheuristics run in sequence, each seeded by the previous one's
//! result: a genetic algorithm explores broadly, simulated annealing locally
//! refines the genetic algorithm's best subset, and an ant-colony pass
//! explores once more around the refined subset. None of the three is
//! guaranteed optimal; together they give a fast, repeatable approximation
//! over pools that are too large to score exhaustively.
//!
//! All three draw from a caller-seeded `StdRng` rather than thread-local
//! entropy, so that identical `(scores, k, seed)` inputs always produce the
//! identical subset (§5's reproducibility requirement, P8).

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Performance pre-filter: when the pool is more than `4*k`, keep only the
/// top `4*k` indices by score, breaking ties by original index so the
/// result is deterministic.
pub fn prefilter(scores: &[f64], k: usize) -> Vec<usize> {
    let n = scores.len();
    let cap = (k * 4).min(n);
    let mut order: Vec<usize> = (0..n).collect();
    if n <= cap {
        return order;
    }
    order.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap()
            .then(a.cmp(&b))
    });
    order.truncate(cap);
    order
}

fn mean_score(scores: &[f64], subset: &[usize]) -> f64 {
    if subset.is_empty() {
        return f64::NEG_INFINITY;
    }
    subset.iter().map(|&i| scores[i]).sum::<f64>() / subset.len() as f64
}

/// Genetic algorithm: 25 individuals, 15 generations, elite of 10, single-cut
/// crossover with missing-index repair, swap mutation at p=0.2.
///
/// `k=1` is degenerate and returns the single argmax directly rather than
/// running the population machinery over singleton individuals.
fn genetic(pool: &[usize], scores: &[f64], k: usize, rng: &mut StdRng) -> Vec<usize> {
    let n = pool.len();
    let k = k.min(n);
    if k == 0 {
        return Vec::new();
    }
    if k == 1 {
        let best = (0..n)
            .max_by(|&a, &b| scores[pool[a]].partial_cmp(&scores[pool[b]]).unwrap())
            .unwrap();
        return vec![best];
    }

    const POP_SIZE: usize = 25;
    const GENERATIONS: usize = 15;
    const ELITE: usize = 10;
    const PMUT: f64 = 0.2;

    let fit = |sol: &[usize]| mean_score(scores, &sol.iter().map(|&i| pool[i]).collect::<Vec<_>>());

    let mut population: Vec<Vec<usize>> = (0..POP_SIZE)
        .map(|_| {
            let mut idx: Vec<usize> = (0..n).collect();
            idx.shuffle(rng);
            idx.truncate(k);
            idx
        })
        .collect();

    for _ in 0..GENERATIONS {
        population.sort_by(|a, b| fit(b).partial_cmp(&fit(a)).unwrap());
        let elite: Vec<Vec<usize>> = population[..ELITE.min(population.len())].to_vec();

        let mut children = Vec::new();
        while children.len() + elite.len() < POP_SIZE {
            let a = elite.choose(rng).unwrap();
            let b = elite.choose(rng).unwrap();
            let cut = rng.gen_range(1..k.max(2));
            let mut child: Vec<usize> = a[..cut.min(a.len())].to_vec();
            for &x in b {
                if !child.contains(&x) {
                    child.push(x);
                }
            }
            child.truncate(k);

            if rng.gen_bool(PMUT) && k >= 2 {
                let i = rng.gen_range(0..child.len());
                let j = rng.gen_range(0..child.len());
                child.swap(i, j);
            }

            let mut missing: Vec<usize> = (0..n).filter(|x| !child.contains(x)).collect();
            while child.len() < k {
                match missing.pop() {
                    Some(m) => child.push(m),
                    None => break,
                }
            }
            children.push(child);
        }

        population = elite;
        population.extend(children);
    }

    population.sort_by(|a, b| fit(b).partial_cmp(&fit(a)).unwrap());
    population.into_iter().next().unwrap_or_default()
}

/// Simulated annealing: swap-two neighbor moves, Metropolis acceptance,
/// geometric cooling from `T=100` down below `T=1` at `alpha=0.9`.
fn anneal(pool: &[usize], scores: &[f64], start: &[usize], rng: &mut StdRng) -> Vec<usize> {
    if start.is_empty() {
        return Vec::new();
    }
    let k = start.len();
    let fit = |sol: &[usize]| mean_score(scores, &sol.iter().map(|&i| pool[i]).collect::<Vec<_>>());

    let mut current = start.to_vec();
    let mut best = start.to_vec();
    let mut f_current = fit(&current);
    let mut f_best = f_current;
    let mut temperature = 100.0_f64;

    while temperature >= 1.0 {
        if k >= 2 {
            let i = rng.gen_range(0..k);
            let mut j = rng.gen_range(0..k);
            while j == i {
                j = rng.gen_range(0..k);
            }
            let mut neighbor = current.clone();
            neighbor.swap(i, j);
            let f_neighbor = fit(&neighbor);

            let accept = f_neighbor >= f_current
                || rng.gen::<f64>() < ((f_neighbor - f_current) / temperature).exp();
            if accept {
                current = neighbor;
                f_current = f_neighbor;
                if f_neighbor > f_best {
                    best = current.clone();
                    f_best = f_neighbor;
                }
            }
        }
        temperature *= 0.9;
    }

    best
}

/// Ant colony: pheromone-proportional sampling without replacement,
/// evaporation 0.5, reinforcement `fitness / 10`. Pheromones are floored to
/// `EPSILON` before every sampling round so evaporation can never collapse
/// the whole vector to zero and leave the distribution undefined.
fn ant_colony(pool: &[usize], scores: &[f64], seed: &[usize], k: usize, rng: &mut StdRng) -> Vec<usize> {
    const EPSILON: f64 = 1e-6;

    let n = pool.len();
    if n == 0 {
        return Vec::new();
    }
    let k = k.min(n);

    const ITERATIONS: usize = 10;
    const ANTS: usize = 10;
    const EVAPORATION: f64 = 0.5;

    let fit = |sol: &[usize]| mean_score(scores, &sol.iter().map(|&i| pool[i]).collect::<Vec<_>>());

    let mut pheromone = vec![1.0_f64; n];
    let mut best_sol: Vec<usize> = Vec::new();
    let mut best_fit = f64::NEG_INFINITY;

    if !seed.is_empty() {
        let seed_fit = fit(seed);
        if seed_fit > best_fit {
            best_fit = seed_fit;
            best_sol = seed.to_vec();
        }
        for &i in seed {
            pheromone[i] += seed_fit / 10.0;
        }
    }

    for _ in 0..ITERATIONS {
        for p in &mut pheromone {
            if *p < EPSILON {
                *p = EPSILON;
            }
        }
        for _ in 0..ANTS {
            let total: f64 = pheromone.iter().sum();
            let choice = weighted_sample_without_replacement(&pheromone, total, k, rng);
            let f = fit(&choice);
            if f > best_fit {
                best_fit = f;
                best_sol = choice.clone();
            }
            for &i in &choice {
                pheromone[i] += f / 10.0;
            }
        }
        for p in &mut pheromone {
            *p *= 1.0 - EVAPORATION;
        }
    }

    best_sol
}

fn weighted_sample_without_replacement(
    weights: &[f64],
    total: f64,
    count: usize,
    rng: &mut impl Rng,
) -> Vec<usize> {
    let mut remaining: Vec<usize> = (0..weights.len()).collect();
    let mut remaining_weights: Vec<f64> = weights.to_vec();
    let mut remaining_total = total;
    let mut chosen = Vec::with_capacity(count.min(remaining.len()));

    while chosen.len() < count && !remaining.is_empty() {
        let target = rng.gen::<f64>() * remaining_total;
        let mut cumulative = 0.0;
        let mut pick = remaining.len() - 1;
        for (pos, &w) in remaining_weights.iter().enumerate() {
            cumulative += w;
            if cumulative >= target {
                pick = pos;
                break;
            }
        }
        chosen.push(remaining.remove(pick));
        remaining_total -= remaining_weights.remove(pick);
    }

    chosen
}

/// Select up to `k` indices into `scores`, applying the performance
/// pre-filter before running GA -> SA -> ACO over the survivors.
///
/// `seed` drives every random draw across all three stages: identical
/// `(scores, k, seed)` always yields the identical subset, which is what
/// lets a mocked-oracle run be reproduced bit-for-bit (§5, P8).
pub fn select(scores: &[f64], k: usize, seed: u64) -> Vec<usize> {
    if scores.is_empty() || k == 0 {
        return Vec::new();
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let pool = prefilter(scores, k);
    let ga = genetic(&pool, scores, k, &mut rng);
    let sa = anneal(&pool, scores, &ga, &mut rng);
    let aco = ant_colony(&pool, scores, &sa, k, &mut rng);

    aco.into_iter().map(|local| pool[local]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefilter_keeps_all_when_pool_small() {
        let scores = vec![1.0, 2.0, 3.0];
        let kept = prefilter(&scores, 15);
        assert_eq!(kept.len(), 3);
    }

    #[test]
    fn prefilter_caps_at_four_times_k() {
        let scores: Vec<f64> = (0..200).map(|i| i as f64).collect();
        let kept = prefilter(&scores, 15);
        assert_eq!(kept.len(), 60);
        // highest-scoring indices survive
        assert!(kept.contains(&199));
        assert!(!kept.contains(&0));
    }

    #[test]
    fn select_never_exceeds_k() {
        let scores: Vec<f64> = (0..40).map(|i| i as f64 * 0.3).collect();
        let chosen = select(&scores, 15, 42);
        assert!(chosen.len() <= 15);
    }

    #[test]
    fn select_prefers_high_scoring_candidates() {
        let mut scores = vec![0.0; 20];
        for (i, s) in scores.iter_mut().enumerate() {
            *s = i as f64;
        }
        let chosen = select(&scores, 5, 42);
        let mean: f64 = chosen.iter().map(|&i| scores[i]).sum::<f64>() / chosen.len() as f64;
        // with 20 items and k=5 the mean of a reasonable subset should beat
        // the overall pool mean comfortably
        let pool_mean: f64 = scores.iter().sum::<f64>() / scores.len() as f64;
        assert!(mean > pool_mean);
    }

    #[test]
    fn empty_pool_yields_empty_selection() {
        assert!(select(&[], 15, 42).is_empty());
    }

    #[test]
    fn k_equals_one_returns_single_argmax() {
        let scores = vec![3.0, 9.0, 1.0, 7.0];
        let chosen = select(&scores, 1, 42);
        assert_eq!(chosen, vec![1]);
    }

    #[test]
    fn select_is_deterministic_for_a_given_seed() {
        let scores: Vec<f64> = (0..50).map(|i| ((i * 37) % 23) as f64).collect();
        let first = select(&scores, 10, 1234);
        let second = select(&scores, 10, 1234);
        assert_eq!(first, second);
    }
}
