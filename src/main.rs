use fanout::batch::Dispatcher;
use fanout::config::Config;
use fanout::dispatch::Target;
use fanout::payload::verdict_payload;
use fanout::report::write_report;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    dotenvy::dotenv().ok();

    // Missing credential fails here, before any request is built.
    let config = Config::load()?;
    tracing::info!(endpoint = %config.endpoint, model = %config.model, count = config.count, "fanout starting");

    let payload = verdict_payload(&config.model, config.seed, &config.prompt);
    let target = Target::new(config.endpoint, config.api_key).with_timeout(config.timeout);

    let result = Dispatcher::http(target, payload)?.run(config.count).await?;

    write_report(&result, &mut std::io::stdout().lock(), &mut std::io::stderr().lock())?;
    Ok(())
}
