/// leafscan server
///
/// JSON HTTP API for leaf disease detection.  Loads the classifier and class
/// mapping once, then serves requests on a synchronous tiny_http server.
///
/// Run with:
///   cargo run --bin leafscan-server --release
/// Then POST `{"imageData": "data:image/png;base64,..."}` to
/// http://127.0.0.1:5000/detect
///
/// Endpoints:
///   GET  /health   liveness plus model/classes load state
///   POST /detect   classify an uploaded leaf image
///   GET  /classes  class labels in index order
///   GET  /info     model paths, input size, classes

mod handlers;
mod routes;
mod state;
mod util;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tiny_http::Server;
use tracing::info;

use leafscan::config::{DEFAULT_CLASSES_PATH, DEFAULT_INPUT_SIZE, DEFAULT_MODEL_PATH};
use leafscan::logging::{init_logging, LogConfig};
use leafscan::{ModelRegistry, ServiceConfig};

use state::AppContext;

#[derive(Parser, Debug)]
#[command(name = "leafscan-server", version, about = "Leaf disease detection API")]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "LEAFSCAN_BIND", default_value = "127.0.0.1:5000")]
    bind: String,

    /// Classifier model JSON
    #[arg(long, env = "LEAFSCAN_MODEL_PATH", default_value = DEFAULT_MODEL_PATH)]
    model_path: PathBuf,

    /// Class-index to label JSON
    #[arg(long, env = "LEAFSCAN_CLASSES_PATH", default_value = DEFAULT_CLASSES_PATH)]
    classes_path: PathBuf,

    /// Square size images are resized to before scoring
    #[arg(long, env = "LEAFSCAN_INPUT_SIZE", default_value_t = DEFAULT_INPUT_SIZE,
          value_parser = clap::value_parser!(u32).range(1..))]
    input_size: u32,

    /// Pixel standard deviation below which an image counts as blank
    #[arg(long, env = "LEAFSCAN_BLANK_THRESHOLD", default_value_t = 0.01)]
    blank_threshold: f64,

    /// Confidence below which a prediction is reported healthy (0 disables)
    #[arg(long, env = "LEAFSCAN_LOW_CONFIDENCE", default_value_t = 0.5)]
    low_confidence: f64,

    /// Refuse to serve if the class mapping does not match the model output
    #[arg(long, env = "LEAFSCAN_STRICT_CLASSES")]
    strict_classes: bool,

    /// Maximum request body size in bytes
    #[arg(long, env = "LEAFSCAN_MAX_BODY_BYTES", default_value_t = 16 * 1024 * 1024)]
    max_body_bytes: usize,

    /// Log every pipeline stage
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_config(self) -> ServiceConfig {
        ServiceConfig {
            bind_addr:                self.bind,
            model_path:               self.model_path,
            classes_path:             self.classes_path,
            input_size:               self.input_size,
            blank_std_threshold:      self.blank_threshold,
            low_confidence_threshold: self.low_confidence,
            strict_classes:           self.strict_classes,
            max_body_bytes:           self.max_body_bytes,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&if cli.verbose { LogConfig::verbose() } else { LogConfig::default() });

    let config = cli.into_config();
    info!("Leaf Disease Detection API v{}", env!("CARGO_PKG_VERSION"));
    info!("  Model path:   {}", config.model_path.display());
    info!("  Classes path: {}", config.classes_path.display());
    info!("  Input size:   {}x{}", config.input_size, config.input_size);

    // Blocking load before the listener exists, so no request sees a
    // half-initialised registry.
    let registry = ModelRegistry::load(&config);
    if !registry.is_ready() {
        tracing::warn!("Registry not ready; /detect will answer 503 until artifacts are fixed and the server restarted");
    }

    let ctx = Arc::new(AppContext::new(config, registry));
    let server = Server::http(&ctx.config.bind_addr)
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", ctx.config.bind_addr, e))?;
    info!("API running on http://{}", ctx.config.bind_addr);

    // One thread per request; handlers only read the shared context.
    for request in server.incoming_requests() {
        let ctx = ctx.clone();
        std::thread::spawn(move || {
            routes::dispatch(request, ctx);
        });
    }
    Ok(())
}
