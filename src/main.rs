use clap::Parser;
use color_eyre::Result;
use gluster_stats_config::{
    Args,
    Config,
};
use gluster_stats_gatherer::{
    dispatch::Dispatcher,
    report,
    topology,
};
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
    Layer,
};

fn init_logging(verbose: bool) -> Result<()> {
    color_eyre::install()?;
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "gluster_stats_gatherer={level},gluster_stats_config={level}"
        ))
    });
    // Diagnostics go to stderr; stdout carries nothing but hook output.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_filter(filter))
        .with(tracing_error::ErrorLayer::default())
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;
    let config = Config::new(args)?;

    let report = report::fetch(&config.volume_info_command).await?;
    let mut topology = topology::parse(&report)?;

    let lines = Dispatcher::new(&config)?.run(&mut topology).await?;
    for line in &lines {
        println!("{line}");
    }
    Ok(())
}
