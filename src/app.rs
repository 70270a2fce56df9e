//! Connect, prepare the controller, and run the keyboard pipeline

use jogkit_communication::{
    ConnectionManager, ConnectionParams, ExitReason, InputSource, Pipeline, RetryPrompt,
    TransportFactory,
};
use jogkit_core::ConnectionError;
use jogkit_settings::Config;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Skip the soft reset / soft limits / unlock sequence
    pub skip_startup: bool,
}

/// How a run ended without an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The pipeline ran and stopped
    Finished(ExitReason),
    /// Access to the port was denied and the operator chose not to retry
    RetryDeclined,
}

/// Open the configured port and drive the machine from `input`.
///
/// The connection is closed before this returns, whatever the outcome.
pub async fn run<F: TransportFactory>(
    config: &Config,
    factory: F,
    prompt: &mut dyn RetryPrompt,
    input: &mut dyn InputSource,
    options: RunOptions,
) -> Result<RunOutcome, ConnectionError> {
    let params = ConnectionParams::from(&config.connection);
    let mut manager = ConnectionManager::new(factory)
        .with_backoff(Duration::from_millis(config.timing.connect_backoff_ms));

    let connection = match manager.open(&params, prompt).await {
        Ok(connection) => connection,
        Err(ConnectionError::RetryDeclined { .. }) => return Ok(RunOutcome::RetryDeclined),
        Err(e) => return Err(e),
    };

    let mut pipeline = Pipeline::from_config(connection, config);

    if options.skip_startup {
        tracing::info!("Skipping start-up sequence");
    } else {
        pipeline.startup().await;
    }

    let reason = pipeline.run(input).await;
    pipeline.close();

    Ok(RunOutcome::Finished(reason))
}
