use anyhow::{Context, Result, bail};
use tracing_subscriber::EnvFilter;

use kssgen::cli;
use kssgen::generator::Compatibility;
use kssgen::{Generator, GenerationConfig, HtmlGenerator};

fn main() -> Result<()> {
    let mut generator = HtmlGenerator::new();
    // Declared options must pass the contract before clap sees them.
    generator.check_generator()?;

    let (host, matches) =
        cli::parse_args(generator.base().options()).unwrap_or_else(|err| err.exit());

    let mut config = GenerationConfig::load(host.config.as_deref())?;
    cli::apply_overrides(&host, &matches, generator.base().options(), &mut config);

    // Logs go to stderr so stdout stays clean for the summary line.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli::log_filter(&config))),
        )
        .init();

    tracing::info!("kssgen starting");

    match generator.base().compatibility() {
        Compatibility::Compatible => {}
        other => tracing::warn!(
            "generator targets API {:?} but this host implements {} ({other:?})",
            generator.base().instance_api(),
            generator.base().api()
        ),
    }

    if let Some(destination) = &host.clone {
        return clone(&generator, &config, destination);
    }

    if config.source.is_empty() {
        bail!("no source given; pass --source <DIR> or set `source` in the config file");
    }

    let destination = config.destination.clone();
    generator.init(config)?;
    generator
        .run()
        .with_context(|| format!("generating style guide into {}", destination.display()))?;

    println!(
        "Style guide generation completed successfully! ({} pages in {})",
        generator.written().len(),
        destination.display()
    );
    Ok(())
}

fn clone(
    generator: &HtmlGenerator,
    config: &GenerationConfig,
    destination: &std::path::Path,
) -> Result<()> {
    let Some(template) = config.template.as_deref() else {
        bail!("--clone needs a template to copy; pass --template <DIR>");
    };

    generator.clone_template(template, destination)?;
    println!(
        "Template cloned to {}. Point --template at it to use your copy.",
        destination.display()
    );
    Ok(())
}
