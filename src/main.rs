use anyhow::Context;
use beta_sampler::histogram::Histogram;
use beta_sampler::inversion::NumericInverse;
use beta_sampler::render::{render_panels, Panel};
use beta_sampler::{checked_count, generate_uniform, stat_tests, transform_all};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Quantiles at which the closed-form inverse is checked against root finding
const CHECK_QUANTILES: [f64; 7] = [0.0, 0.05, 0.25, 0.5, 0.75, 0.95, 1.0];

/// Draw Beta(1,2) samples by inverse-transform sampling and plot their histograms
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Number of uniform samples to draw
    #[arg(short = 'n', long, default_value_t = 100_000, allow_negative_numbers = true)]
    samples: i64,

    /// Number of histogram bins over [0, 1]
    #[arg(short, long, default_value_t = 10)]
    bins: usize,

    /// Seed of the random number generator (entropy if not given)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Path of the rendered figure
    #[arg(short, long, default_value = "beta-sample.png")]
    output: PathBuf,

    /// Skip rendering of the figure
    #[arg(long)]
    no_plot: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let n = checked_count(args.samples)?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let u = generate_uniform(&mut rng, n);
    let x = transform_all(&u)?;
    tracing::info!(samples = n, seed = ?args.seed, "samples generated");

    let u_hist = Histogram::new(&u, args.bins, 0.0..1.0)?;
    let x_hist = Histogram::new(&x, args.bins, 0.0..1.0)?;

    for (lo, hi, density) in x_hist.bins() {
        tracing::debug!(lo, hi, density, "x bin");
    }

    if n > 0 {
        report_fit(&u_hist, &x_hist, x)?;
    }
    check_inverse()?;

    if !args.no_plot {
        let uniform = |_: f64| 1.0;
        let panels = [
            Panel::new("u", &u_hist).with_reference(&uniform),
            Panel::new("x", &x_hist).with_reference(&beta_sampler::pdf),
        ];
        render_panels(&args.output, (800, 900), &panels)
            .with_context(|| format!("rendering {}", args.output.display()))?;
    }
    Ok(())
}

///
/// Log goodness-of-fit of both sample sets against their expected distributions
///
fn report_fit(u_hist: &Histogram, x_hist: &Histogram, x: Vec<f64>) -> anyhow::Result<()> {
    if x_hist.counts().len() < 2 {
        tracing::warn!("single bin, chi-squared tests skipped");
    } else {
        let u_mass = u_hist.bin_mass(|v| v.clamp(0.0, 1.0));
        let x_mass = x_hist.bin_mass(beta_sampler::cdf);
        let u_chi2 = stat_tests::chi2_test(u_hist.counts(), &u_mass)?;
        let x_chi2 = stat_tests::chi2_test(x_hist.counts(), &x_mass)?;

        tracing::info!(
            stat = u_chi2.stat(),
            p = u_chi2.p_value(),
            dof = u_chi2.population(),
            "chi-squared test of u against uniform"
        );
        tracing::info!(
            stat = x_chi2.stat(),
            p = x_chi2.p_value(),
            dof = x_chi2.population(),
            "chi-squared test of x against Beta(1,2)"
        );
    }

    let x_ks = stat_tests::ks1_test(|v| beta_sampler::cdf(*v), x)?;
    tracing::info!(
        stat = x_ks.stat(),
        p = x_ks.p_value(),
        "Kolmogorov-Smirnov test of x against Beta(1,2)"
    );
    Ok(())
}

///
/// Compare the closed-form inverse cdf with a numerical inversion of the cdf
///
fn check_inverse() -> anyhow::Result<()> {
    let numeric = NumericInverse::new(beta_sampler::cdf, 0.0..1.0, 1.0e-12)?;

    let mut max_diff: f64 = 0.0;
    for u in CHECK_QUANTILES {
        let closed = beta_sampler::inverse_cdf(u)?;
        let solved = numeric.quantile(u)?;
        tracing::debug!(u, closed, solved, "quantile");
        max_diff = max_diff.max((closed - solved).abs());
    }
    tracing::info!(max_diff, "closed-form inverse cdf checked against root finding");
    Ok(())
}
