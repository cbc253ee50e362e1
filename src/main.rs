use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = calibrator::cli::Args::parse();
    calibrator::observability::initialize(&args.log_filter);
    calibrator::run(args).await
}
