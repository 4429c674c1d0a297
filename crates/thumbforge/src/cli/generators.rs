//! The `thumbforge generators` command.

use clap::Args;
use thumbforge_core::{Config, GeneratorRegistry};

/// Arguments for the `generators` command.
#[derive(Args, Debug)]
pub struct GeneratorsArgs {
    /// Only list generators claiming this mime type, in the order they are tried
    #[arg(long)]
    pub mime: Option<String>,

    /// Print a JSON array instead of one name per line
    #[arg(long)]
    pub json: bool,
}

/// Execute the generators command.
pub async fn execute(args: GeneratorsArgs, config: Config) -> anyhow::Result<()> {
    let registry = GeneratorRegistry::builtin(&config);
    let names = list(&registry, args.mime.as_deref());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&names)?);
    } else if names.is_empty() {
        if let Some(mime) = &args.mime {
            eprintln!("No generator supports {mime}");
        }
    } else {
        for name in &names {
            println!("{name}");
        }
    }
    Ok(())
}

fn list<'a>(registry: &'a GeneratorRegistry, mime: Option<&'a str>) -> Vec<&'a str> {
    match mime {
        Some(mime) => registry.supporting(mime).map(|g| g.name()).collect(),
        None => registry.names(),
    }
}
