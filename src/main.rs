use mimalloc::MiMalloc;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = &vaxsched::config::CONFIG;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false)
                // keep the prompt readable: logs go to stderr, replies to stdout
                .with_writer(std::io::stderr),
        )
        .init();

    info!(
        database_url = %cfg.database_url,
        loglevel = %cfg.loglevel,
    );

    let pool = vaxsched::db::connect(&cfg.database_url).await?;

    println!("{}", vaxsched::repl::GREETING);
    println!();

    let dispatcher = vaxsched::repl::Dispatcher::new(pool);
    vaxsched::repl::run(dispatcher).await?;
    Ok(())
}
