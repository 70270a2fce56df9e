use anyhow::Context;
use clap::Parser;
use jogkit::input::{RawModeGuard, TerminalKeySource, TerminalPrompt};
use jogkit::{init_logging, Cli, RunOptions, RunOutcome, BUILD_DATE, VERSION};
use jogkit_communication::{list_ports, SerialTransportFactory};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.list_ports {
        let ports = list_ports()?;
        if ports.is_empty() {
            println!("No controller ports found");
        }
        for port in ports {
            match &port.manufacturer {
                Some(mfg) => println!("{}\t{} ({})", port.port_name, port.description, mfg),
                None => println!("{}\t{}", port.port_name, port.description),
            }
        }
        return Ok(());
    }

    let mut config = cli.load_config().context("Failed to load configuration")?;
    init_logging(&config.logging)?;
    tracing::info!("jogkit {} (built {})", VERSION, BUILD_DATE);

    if let Some(port) = &cli.port {
        config.apply_port_override(port);
    }

    let _raw_mode = RawModeGuard::enable().context("Failed to put the terminal in raw mode")?;
    let mut prompt = TerminalPrompt::default();
    let mut keys = TerminalKeySource::default();
    let options = RunOptions {
        skip_startup: cli.skip_startup,
    };

    let outcome = jogkit::run(&config, SerialTransportFactory, &mut prompt, &mut keys, options)
        .await
        .with_context(|| format!("Could not connect to {}", config.connection.port))?;

    match outcome {
        RunOutcome::RetryDeclined => tracing::info!("Exiting program."),
        RunOutcome::Finished(reason) => tracing::debug!("Finished: {:?}", reason),
    }

    Ok(())
}
