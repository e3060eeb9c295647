use clap::Args;
use thiserror::Error;
use tracing_subscriber::{EnvFilter, Layer, filter::ParseError, layer::SubscriberExt};

#[derive(Debug, Error)]
pub enum TracerError {
    #[error("Invalid Log Filter: {0}")]
    Filter(#[from] ParseError),
    #[error("Global Subscriber Already Set: {0}")]
    AlreadySet(#[from] tracing::subscriber::SetGlobalDefaultError),
}

#[derive(Clone, Debug, Args)]
pub struct TracerOptions {
    /// Default log filter directive, used when `RUST_LOG` is not set
    #[clap(long, env = "PLUMEID_LOG_FILTER", default_value = "info")]
    pub log_filter: String,

    /// Disable ANSI colour codes in log output
    #[clap(long)]
    pub no_ansi: bool,
}

impl Default for TracerOptions {
    fn default() -> Self {
        Self {
            log_filter: "info".to_owned(),
            no_ansi: false,
        }
    }
}

/// This object initialises the stdout tracer.
/// Log directives are taken from `RUST_LOG` if it is set, otherwise from
/// `TracerOptions::log_filter`.
pub struct TracerEngine {
    service_name: String,
}

impl TracerEngine {
    /// Initialises the stdout tracer for the crate
    /// #Arguments
    /// * `options` - The caller-specified instance of TracerOptions.
    /// * `service_name` - The name of the binary, included in the first log line.
    /// #Returns
    /// An instance of TracerEngine, or an error if the filter is malformed or a
    /// global subscriber has already been installed.
    pub fn new(options: &TracerOptions, service_name: &str) -> Result<Self, TracerError> {
        let stdout_tracer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(!options.no_ansi);

        let log_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(&options.log_filter)?,
        };

        let subscriber =
            tracing_subscriber::Registry::default().with(stdout_tracer.with_filter(log_filter));

        tracing::subscriber::set_global_default(subscriber)?;
        tracing::debug!("Tracer initialised for {service_name}");

        Ok(Self {
            service_name: service_name.to_owned(),
        })
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}
