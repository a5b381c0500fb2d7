use anyhow::{Context, Result};
use clap::CommandFactory as _;
use std::{path::Path, time::Duration};
use tokio_util::sync::CancellationToken;

use crate::{config::BadgedConfig, daemon::Daemon};

mod config;
mod daemon;
mod opts;

fn main() {
    let opts: opts::Opt = opts::Opt::from_env();

    let log_level_filter = if opts.log_debug { log::LevelFilter::Debug } else { log::LevelFilter::Info };
    if std::env::var("RUST_LOG").is_ok() {
        pretty_env_logger::init_timed();
    } else {
        pretty_env_logger::formatted_timed_builder()
            .filter(Some("badged"), log_level_filter)
            .filter(Some("badge_tracker"), log_level_filter)
            .init();
    }

    let show_once = match opts.action {
        opts::Action::ShellCompletions { shell } => {
            clap_complete::generate(shell, &mut opts::RawOpt::command(), "badged", &mut std::io::stdout());
            return;
        }
        opts::Action::Show => true,
        opts::Action::Run => false,
    };

    if let Err(err) = run(opts.config_path.as_deref(), show_once) {
        log::error!("{:?}", err);
        std::process::exit(1);
    }
}

/// Run the daemon until stdin ends, or only refresh and print the menu once with `show_once`.
fn run(config_path: Option<&Path>, show_once: bool) -> Result<()> {
    let config = BadgedConfig::load(config_path).context("Failed to load configuration")?;
    log::debug!("Loaded configuration: {:?}", config);

    let shutdown = CancellationToken::new();
    simple_signal::set_handler(&[simple_signal::Signal::Int, simple_signal::Signal::Term], {
        let shutdown = shutdown.clone();
        move |_| {
            log::info!("Shutting down badged...");
            shutdown.cancel();
        }
    });

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("badged")
        .build()
        .context("Failed to initialize tokio runtime")?;

    let result = rt.block_on(async {
        let daemon = Daemon::new(&config, shutdown.clone())?;
        let listener = daemon.start();

        if show_once {
            daemon.refresh_once().await;
            print!("{}", daemon.render_menu());
        } else {
            log::info!("Reading events from stdin");
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let mut stdout = tokio::io::stdout();
            daemon.run(stdin, &mut stdout).await?;
        }

        shutdown.cancel();
        if let Some(listener) = listener {
            listener.await.context("Event listener task failed")?;
        }
        Ok::<_, anyhow::Error>(())
    });

    // stdin is read on a blocking thread that won't notice the shutdown
    rt.shutdown_timeout(Duration::from_millis(200));
    result
}
