use tracing::{error, info};

use shared_db_reconciler::{Settings, hook_name, run_hook};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging; Juju captures hook stderr into the unit log
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("shared_db_reconciler=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let hook = hook_name(&args).ok_or("No hook name given")?;

    let settings = Settings::from_env()?;
    info!(hook = %hook, unit = %settings.unit_name, "Running hook");

    if let Err(e) = run_hook(&hook, &settings).await {
        error!(
            hook = %hook,
            error = %e,
            retryable = e.is_retryable(),
            "Hook failed"
        );
        return Err(e.into());
    }

    Ok(())
}
