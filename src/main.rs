/// leafscan-mock
///
/// Writes a randomly initialised leaf-disease CNN and its class mapping so
/// the server can start before a real model exists.  Predictions from the
/// mock model are meaningless.
///
/// Run with:
///   cargo run --bin leafscan-mock --release
///   cargo run --bin leafscan-mock -- --spec my_arch.json --classes-file labels.txt

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use leafscan::config::{DEFAULT_CLASSES_PATH, DEFAULT_INPUT_SIZE, DEFAULT_MODEL_PATH};
use leafscan::logging::{init_logging, LogConfig};
use leafscan::mock::{write_artifacts, DEFAULT_CLASSES};
use leafscan::NetworkSpec;

#[derive(Parser, Debug)]
#[command(name = "leafscan-mock", version, about = "Write a mock leaf-disease model and class mapping")]
struct Cli {
    /// Where to write the model JSON
    #[arg(long, env = "LEAFSCAN_MODEL_PATH", default_value = DEFAULT_MODEL_PATH)]
    model_path: PathBuf,

    /// Where to write the class mapping JSON
    #[arg(long, env = "LEAFSCAN_CLASSES_PATH", default_value = DEFAULT_CLASSES_PATH)]
    classes_path: PathBuf,

    /// Square input size the model is built for [default: 224]; also
    /// overrides the size stored in a --spec file
    #[arg(long, env = "LEAFSCAN_INPUT_SIZE", value_parser = clap::value_parser!(u32).range(1..))]
    input_size: Option<u32>,

    /// RNG seed for weight initialisation
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Architecture JSON (NetworkSpec) to use instead of the built-in CNN
    #[arg(long)]
    spec: Option<PathBuf>,

    /// Text file with one class label per line (defaults to the built-in list)
    #[arg(long)]
    classes_file: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&LogConfig::default());

    let custom_labels = match &cli.classes_file {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading labels from {}", path.display()))?;
            Some(text.lines().map(str::trim).filter(|l| !l.is_empty()).map(str::to_owned).collect::<Vec<_>>())
        }
        None => None,
    };
    let labels: Vec<&str> = match &custom_labels {
        Some(l) => l.iter().map(String::as_str).collect(),
        None    => DEFAULT_CLASSES.to_vec(),
    };
    anyhow::ensure!(!labels.is_empty(), "no class labels given");

    let spec = resolve_spec(&cli, labels.len())?;

    info!("Creating mock model '{}' with {} classes...", spec.name, labels.len());
    write_artifacts(&spec, &cli.model_path, &cli.classes_path, &labels, cli.seed)?;

    info!("Mock model created ({} classes, {}x{} input)", labels.len(), spec.input_size, spec.input_size);
    info!("Note: weights are random; predictions are for wiring tests only.");
    Ok(())
}

/// The architecture to build: `--spec` if given, else the default leaf CNN.
/// An explicit `--input-size` wins over the size stored in the spec file.
fn resolve_spec(cli: &Cli, num_classes: usize) -> anyhow::Result<NetworkSpec> {
    let mut spec = match &cli.spec {
        Some(path) => NetworkSpec::load_json(path)
            .with_context(|| format!("reading architecture from {}", path.display()))?,
        None => NetworkSpec::leaf_cnn(num_classes, DEFAULT_INPUT_SIZE),
    };
    if let Some(size) = cli.input_size {
        spec.input_size = size;
    }
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_size_overrides_spec_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("arch.json");
        std::fs::write(&path, serde_json::to_string(&NetworkSpec::leaf_cnn(3, 64)).unwrap()).unwrap();
        let path_arg = path.to_str().unwrap();

        let cli = Cli::parse_from(["leafscan-mock", "--spec", path_arg]);
        assert_eq!(resolve_spec(&cli, 3).unwrap().input_size, 64);

        let cli = Cli::parse_from(["leafscan-mock", "--spec", path_arg, "--input-size", "32"]);
        assert_eq!(resolve_spec(&cli, 3).unwrap().input_size, 32);
    }

    #[test]
    fn default_spec_uses_default_size() {
        let cli = Cli::parse_from(["leafscan-mock"]);
        let spec = resolve_spec(&cli, 4).unwrap();
        assert_eq!(spec.input_size, DEFAULT_INPUT_SIZE);
    }
}
