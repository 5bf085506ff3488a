use clap::Parser;
use player::{PlayerArgs, Runner};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = PlayerArgs::parse();
    let config = args.load_config()?;

    let mut runner = Runner::new(config, args.watch)?;
    let summary = runner.run();

    if args.dump {
        print!("{}", runner.dump());
    }

    if summary.hooks_failed > 0 {
        tracing::warn!("{} hook invocation(s) failed", summary.hooks_failed);
    }

    Ok(())
}
