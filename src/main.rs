use anyhow::Context;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use plytogx::config::{CliArgs, ConvertConfig};
use plytogx::pipeline::Pipeline;

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // Init tracing
    let filter = if args.verbose {
        EnvFilter::new("plytogx=debug")
    } else {
        EnvFilter::new("plytogx=info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config: ConvertConfig = args.into();

    println!("PLYtoGX v{}", env!("CARGO_PKG_VERSION"));

    match Pipeline::run(&config) {
        Ok(result) => {
            if let Some(outputs) = &result.outputs {
                println!(
                    "Done: {} ({} bytes) in {:.3}s",
                    outputs.binary.display(),
                    result.plan.binary_size,
                    result.duration.as_secs_f64()
                );
            }
            Ok(())
        }
        Err(e) => {
            error!(%e, "Conversion failed");
            Err(anyhow::anyhow!(e)).with_context(|| {
                format!("plytogx failed to convert {}", config.input.display())
            })
        }
    }
}
