use fnv::FnvHashMap as HashMap;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tree_util::*;

/// All spanning trees of the complete graph on `nv` vertices, as sorted
/// lists of complete-graph edge ids.
fn enumerate_spanning_trees(nv: usize) -> Vec<Vec<usize>> {
    let nk = num_complete_edges(nv);
    let ne = nv - 1;
    let mut trees = vec![];
    for mask in 0u64..(1u64 << nk) {
        if mask.count_ones() as usize != ne {
            continue;
        }
        let ks: Vec<usize> = (0..nk).filter(|&k| mask & (1 << k) != 0).collect();
        let edges: Vec<Edge> = ks.iter().map(|&k| complete_edge_vertices(k)).collect();
        if is_connected(nv, &edges) {
            trees.push(ks);
        }
    }
    trees
}

fn is_connected(nv: usize, edges: &[Edge]) -> bool {
    let mut seen = vec![false; nv];
    let mut stack = vec![0];
    seen[0] = true;
    while let Some(u) = stack.pop() {
        for &(v1, v2) in edges {
            let w = if v1 == u {
                v2
            } else if v2 == u {
                v1
            } else {
                continue;
            };
            if !seen[w] {
                seen[w] = true;
                stack.push(w);
            }
        }
    }
    seen.iter().all(|&s| s)
}

fn tree_key(edges: &[Edge]) -> Vec<usize> {
    let mut ks: Vec<usize> = edges
        .iter()
        .map(|&(v1, v2)| find_complete_edge(v1, v2))
        .collect();
    ks.sort_unstable();
    ks
}

#[test]
fn spanning_trees_of_k4() {
    // Cayley: 4^(4-2)
    assert_eq!(enumerate_spanning_trees(4).len(), 16);
    assert_eq!(enumerate_spanning_trees(5).len(), 125);
}

#[test]
fn sampler_matches_tree_distribution() -> anyhow::Result<()> {
    let nv = 4;
    let grid = make_complete_graph(nv);
    let logits = vec![0.5, -0.3, 1.2, 0.0, 0.8, -1.0];
    assert_eq!(logits.len(), grid.ncols());

    let trees = enumerate_spanning_trees(nv);
    let weights: Vec<f64> = trees
        .iter()
        .map(|ks| ks.iter().map(|&k| logits[k]).sum::<f64>().exp())
        .collect();
    let z: f64 = weights.iter().sum();
    let target: HashMap<Vec<usize>, f64> = trees
        .iter()
        .cloned()
        .zip(weights.iter().map(|w| w / z))
        .collect();

    let mut rng = SmallRng::seed_from_u64(2017);
    let mut stats = SamplerStats::default();
    let mut edges: Vec<Edge> = vec![(0, 1), (1, 2), (2, 3)];

    for _ in 0..100 {
        edges = sample_tree(&grid, &logits, &edges, 1, &mut rng, &mut stats)?;
    }

    let num_draws = 40_000;
    let thin = 5;
    let mut counts: HashMap<Vec<usize>, usize> = HashMap::default();
    let mut thinned: HashMap<Vec<usize>, usize> = HashMap::default();
    for i in 0..num_draws {
        edges = sample_tree(&grid, &logits, &edges, 1, &mut rng, &mut stats)?;
        let key = tree_key(&edges);
        assert!(target.contains_key(&key), "not a spanning tree: {:?}", edges);
        *counts.entry(key.clone()).or_insert(0) += 1;
        if i % thin == 0 {
            *thinned.entry(key).or_insert(0) += 1;
        }
    }

    let total_variation: f64 = 0.5
        * target
            .iter()
            .map(|(key, p)| {
                let q = *counts.get(key).unwrap_or(&0) as f64 / num_draws as f64;
                (p - q).abs()
            })
            .sum::<f64>();
    assert!(total_variation < 0.04, "total variation = {}", total_variation);

    let num_thinned = (num_draws / thin) as f64;
    let chisq: f64 = target
        .iter()
        .map(|(key, p)| {
            let expected = p * num_thinned;
            let observed = *thinned.get(key).unwrap_or(&0) as f64;
            (observed - expected).powi(2) / expected
        })
        .sum();
    // 15 degrees of freedom; generous bound for residual autocorrelation
    assert!(chisq < 50.0, "chisq = {}", chisq);

    assert_eq!(stats.calls, 100 + num_draws);
    assert_eq!(stats.proposals, 3 * (100 + num_draws));
    assert_eq!(stats.infeasible, 0);
    assert!(stats.accepted > 0);
    Ok(())
}

#[test]
fn single_edge_tree_is_returned_unchanged() -> anyhow::Result<()> {
    let grid = make_complete_graph(2);
    let mut rng = SmallRng::seed_from_u64(0);
    let mut stats = SamplerStats::default();
    let edges = vec![(1, 0)];
    assert_eq!(
        sample_tree(&grid, &[3.0], &edges, 100, &mut rng, &mut stats)?,
        edges
    );
    Ok(())
}

#[test]
fn sampled_edges_rebuild_a_tree_structure() -> anyhow::Result<()> {
    let mut tree = TreeStructure::new(12);
    let logits: Vec<f64> = (0..tree.complete_grid().ncols())
        .map(|k| ((k * 7919) % 13) as f64 / 4.0)
        .collect();
    let mut sampler = TreeSampler::new(SmallRng::seed_from_u64(31));

    for _ in 0..10 {
        let edges = sampler.sample(tree.complete_grid(), &logits, &tree.edges(), 2)?;
        tree.set_edges(&edges)?;
        assert_eq!(tree.edges(), edges);
        let schedule = make_propagation_schedule(tree.tree_grid(), None)?;
        assert_eq!(schedule.len(), 3 * tree.num_vertices() - 1);
    }
    tree.clear_cache();

    assert_eq!(sampler.stats().calls, 10);
    assert_eq!(sampler.stats().proposals, 10 * 2 * 11);
    Ok(())
}

#[test]
fn chains_run_in_parallel() -> anyhow::Result<()> {
    let tree = TreeStructure::new(9);
    let logits = vec![0.0; tree.complete_grid().ncols()];
    let args = TreeSamplerArgs {
        steps: 2,
        num_chains: 6,
        ..Default::default()
    };
    let chains = run_chains(tree.complete_grid(), &logits, &tree.edges(), &args)?;
    assert_eq!(chains.len(), 6);
    for chain in &chains {
        assert_eq!(chain.edges.len(), 8);
        assert_eq!(chain.stats.proposals, 16);
        TreeStructure::from_edges(9, &chain.edges)?;
    }

    let mut merged = SamplerStats::default();
    chains.iter().for_each(|c| merged.merge(&c.stats));
    assert_eq!(merged.calls, 6);
    assert_eq!(merged.proposals, 96);
    let json = serde_json::to_string(&merged)?;
    assert!(json.contains("\"proposals\":96"));
    Ok(())
}
