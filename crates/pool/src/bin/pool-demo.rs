//! pool-demo — run the bounded batch and on-demand compute demonstrations.

use anyhow::Result;

use workpool::demo;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    demo::run_batch_demo()?;
    demo::run_compute_demo()?;

    Ok(())
}
