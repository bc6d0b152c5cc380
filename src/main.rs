use ndarray::Array1;
use rlsp::{envs::toy_irreversibility, Mdp, Observation, RewardEstimator, RunConfig};

fn main() -> rlsp::Result<()> {
    tracing_subscriber::fmt::init();

    let config = match std::env::args().nth(1) {
        Some(path) => RunConfig::from_file(path)?,
        None => RunConfig::default(),
    };

    let mdp = toy_irreversibility()?;
    let mut estimator = RewardEstimator::new(&mdp, config.estimator.clone())?;
    if let Some(prior) = &config.prior {
        estimator = estimator.with_prior(prior.build()?)?;
    }

    let mut p_0 = Array1::zeros(mdp.n_s());
    p_0[0] = 1.;
    let est = estimator.estimate(
        Observation {
            s_current: config.s_current,
            p_0: p_0.view(),
        },
        None,
    )?;

    println!(
        "Converged: {}, Number of epochs: {}, Gradient norm: {:.2e}",
        est.converged,
        est.epochs(),
        est.grad_norm
    );
    println!("{}", est.reward);
    println!("{}", serde_json::to_string(&est.history)?);

    Ok(())
}
