use anyhow::Result;
use fib_native::{run, Config};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    tracing::info!(?config, "configuration");

    let stats = run(config, &mut std::io::stdout().lock())?;

    if config.stats {
        eprintln!("{}", serde_json::to_string(&stats)?);
    }

    Ok(())
}
