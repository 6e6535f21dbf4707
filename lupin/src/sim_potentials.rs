use crate::common::*;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use tree_util::{find_complete_edge, num_complete_edges};

#[derive(Args, Debug, Clone)]
pub struct SimPotentialsArgs {
    /// Number of vertices (features)
    #[arg(long, short = 'n')]
    pub num_vertices: usize,

    /// Standard deviation of the background log potentials
    #[arg(long, default_value = "1.0")]
    pub scale: f64,

    /// Log potential added to the edges of a random planted tree
    #[arg(long, default_value = "0.0")]
    pub signal: f64,

    /// Random seed
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Output header: writes `{out}.potentials.gz` and `{out}.planted.tsv.gz`
    #[arg(long, short = 'o', required = true)]
    pub out: Box<str>,
}

/// Random potentials with an optional planted tree.
pub struct SimOut {
    pub potentials: Vec<f64>,
    pub planted: Vec<Edge>,
}

pub fn simulate_potentials(args: &SimPotentialsArgs) -> anyhow::Result<SimOut> {
    if args.num_vertices < 1 {
        anyhow::bail!("need at least one vertex");
    }
    if !(args.scale >= 0.0 && args.scale.is_finite()) {
        anyhow::bail!("scale must be a finite nonnegative number");
    }

    let mut rng = SmallRng::seed_from_u64(args.seed);
    let normal = Normal::new(0.0, args.scale)?;

    let nk = num_complete_edges(args.num_vertices);
    let mut potentials: Vec<f64> = (0..nk).map(|_| normal.sample(&mut rng)).collect();

    // random recursive tree on shuffled labels
    let nv = args.num_vertices;
    let mut labels: Vec<usize> = (0..nv).collect();
    for i in (1..nv).rev() {
        labels.swap(i, rng.random_range(0..=i));
    }
    let mut planted: Vec<Edge> = (1..nv)
        .map(|v| {
            let (a, b) = (labels[rng.random_range(0..v)], labels[v]);
            if a < b {
                (a, b)
            } else {
                (b, a)
            }
        })
        .collect();
    planted.sort_unstable();

    for &(v1, v2) in &planted {
        potentials[find_complete_edge(v1, v2)] += args.signal;
    }

    Ok(SimOut {
        potentials,
        planted,
    })
}

pub fn sim_potentials(args: &SimPotentialsArgs) -> anyhow::Result<()> {
    let out = simulate_potentials(args)?;

    mkdir(&args.out)?;
    let potentials_file = format!("{}.potentials.gz", args.out);
    let planted_file = format!("{}.planted.tsv.gz", args.out);

    write_types(&out.potentials, &potentials_file)?;
    write_edges(&out.planted, &planted_file)?;

    info!(
        "wrote {} potentials for {} vertices: {}, {}",
        out.potentials.len(),
        args.num_vertices,
        potentials_file,
        planted_file
    );
    Ok(())
}
