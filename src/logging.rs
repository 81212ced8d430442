use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// `RUST_LOG` directives win over the verbosity flag.
pub fn setup_tracing(verbosity_level: u8) -> anyhow::Result<()> {
    let filter = match verbosity_level {
        0 => tracing::level_filters::LevelFilter::INFO,
        1 => tracing::level_filters::LevelFilter::DEBUG,
        2 => tracing::level_filters::LevelFilter::TRACE,
        _ => tracing::level_filters::LevelFilter::TRACE,
    };

    let stderr_writer = fmt::Layer::default()
        .with_thread_names(true)
        .with_writer(std::io::stderr);

    let subscriber = tracing_subscriber::registry()
        .with(
            EnvFilter::builder()
                .with_default_directive(filter.into())
                .from_env_lossy(),
        )
        .with(stderr_writer);

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
