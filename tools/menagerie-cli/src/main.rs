// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! menagerie - polymorphic animals, envelopes, and a kennel database
//!
//! # Usage
//!
//! ```bash
//! # Encode Garfield and Snoopy into one stream and read them back
//! menagerie demo
//!
//! # Persist an animal, then bring it back
//! menagerie --db animal.db save --kind Dog --name Snoopy --toy ball
//! menagerie --db animal.db load --kind Dog --name Snoopy
//!
//! # Look at the raw envelope
//! menagerie inspect --kind Dog --name Snoopy
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use menagerie::{inspect, Animal, Cat, Channel, Dog, VariantRegistry};
use menagerie_store::{Config, Kennel};
use std::fmt::Write as _;

#[derive(Parser, Debug)]
#[command(name = "menagerie")]
#[command(about = "Polymorphic animals with tagged binary serialization", long_about = None)]
struct Args {
    /// Configuration file (JSON); flags below override it
    #[arg(short, long)]
    config: Option<String>,

    /// Database path (SQLite file)
    #[arg(short, long)]
    db: Option<String>,

    /// Lock timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the Garfield/Snoopy round trip through an in-memory stream
    Demo {
        /// Also save both animals into the kennel
        #[arg(long)]
        save: bool,
    },
    /// Give birth to an animal and store it
    Save {
        /// Variant tag (Cat, Dog)
        #[arg(short, long)]
        kind: String,
        /// Animal name
        #[arg(short, long)]
        name: String,
        /// Favorite toy
        #[arg(short, long)]
        toy: Option<String>,
    },
    /// Load a stored animal and let it speak and fetch
    Load {
        #[arg(short, long)]
        kind: String,
        #[arg(short, long)]
        name: String,
        /// What to fetch
        #[arg(long, default_value = "ball")]
        what: String,
        /// Where to fetch it from
        #[arg(long, default_value = "yard")]
        from: String,
    },
    /// List stored animals
    List {
        /// Only this kind
        #[arg(short, long)]
        kind: Option<String>,
    },
    /// Show the raw envelope of a stored animal
    Inspect {
        #[arg(short, long)]
        kind: String,
        #[arg(short, long)]
        name: String,
    },
    /// Remove a stored animal
    Remove {
        #[arg(short, long)]
        kind: String,
        #[arg(short, long)]
        name: String,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;

    let registry = menagerie::global();
    tracing::debug!("Registered variants: {:?}", registry.tags());

    handle_command(args.command, registry, &config)
}

fn build_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };
    if let Some(db) = &args.db {
        config.db_path = db.clone();
    }
    if let Some(ms) = args.timeout_ms {
        config.open_timeout_ms = ms;
    }
    Ok(config)
}

fn run_demo(registry: &VariantRegistry, config: &Config, save: bool) -> Result<()> {
    let mut channel = Channel::new(registry);

    let mut inter: Box<dyn Animal> = Box::new(Cat::new("Garfield"));
    channel.send(inter.as_ref())?;
    inter = Box::new(Dog::new("Snoopy"));
    channel.send(inter.as_ref())?;
    tracing::info!("Encoded 2 animals ({} bytes)", channel.pending_bytes());

    // Now get them back out, in order.
    let first = channel.recv().context("decoding first animal")?;
    println!("{}", first.speak());
    println!("{}", first.fetch("mouse", "closet"));

    let second = channel.recv().context("decoding second animal")?;
    println!("{}", second.speak());
    println!("{}", second.fetch("ball", "yard"));

    if save {
        let kennel = Kennel::open(config, registry)?;
        kennel.save(first.as_ref())?;
        kennel.save(second.as_ref())?;
        println!("Saved both animals to {}", config.db_path);
    }

    Ok(())
}

fn handle_command(cmd: Commands, registry: &VariantRegistry, config: &Config) -> Result<()> {
    match cmd {
        Commands::Demo { save } => run_demo(registry, config, save)?,
        Commands::Save { kind, name, toy } => {
            let mut animal = registry
                .instantiate(&kind)
                .with_context(|| unknown_kind(registry, &kind))?;
            animal.birth(&name);
            if let Some(toy) = toy {
                animal.set_favorite_toy(&toy);
            }
            let size = Kennel::open(config, registry)?.save(animal.as_ref())?;
            println!("Saved {} '{}' ({} bytes)", kind, name, size);
        }
        Commands::Load {
            kind,
            name,
            what,
            from,
        } => match Kennel::open(config, registry)?.load(&kind, &name)? {
            Some(animal) => {
                println!("{}", animal.speak());
                println!("{}", animal.fetch(&what, &from));
                if !animal.favorite_toy().is_empty() {
                    println!("Favorite toy: {}", animal.favorite_toy());
                }
            }
            None => bail!("no {} named '{}' in {}", kind, name, config.db_path),
        },
        Commands::List { kind } => {
            let kennel = Kennel::open(config, registry)?;
            let kinds = match kind {
                Some(kind) => vec![kind],
                None => kennel.kinds()?,
            };
            println!("Stored animals:");
            for kind in &kinds {
                let names = kennel.names(kind)?;
                println!("  {} ({} stored)", kind, names.len());
                for name in names {
                    println!("    {}", name);
                }
            }
        }
        Commands::Inspect { kind, name } => {
            let Some(bytes) = Kennel::open(config, registry)?.load_raw(&kind, &name)? else {
                bail!("no {} named '{}'", kind, name);
            };
            let envelope = inspect(&bytes).context("stored entry is not a valid envelope")?;
            println!("version:     {}", envelope.header.version);
            println!("tag:         {}", envelope.header.tag);
            println!("payload_len: {}", envelope.header.payload_len);
            println!("payload:     {}", String::from_utf8_lossy(&envelope.payload));
            print!("{}", hex_dump(&bytes));
        }
        Commands::Remove { kind, name } => {
            if Kennel::open(config, registry)?.remove(&kind, &name)? {
                println!("Removed {} '{}'", kind, name);
            } else {
                println!("No {} named '{}'", kind, name);
            }
        }
    }

    Ok(())
}

fn unknown_kind(registry: &VariantRegistry, kind: &str) -> String {
    format!(
        "unknown kind '{}' (known: {})",
        kind,
        registry.tags().join(", ")
    )
}

fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::new();
    for (i, chunk) in bytes.chunks(16).enumerate() {
        let _ = write!(out, "{:08x}  ", i * 16);
        for (j, b) in chunk.iter().enumerate() {
            if j == 8 {
                out.push(' ');
            }
            let _ = write!(out, "{b:02x} ");
        }
        for _ in chunk.len()..16 {
            out.push_str("   ");
        }
        if chunk.len() <= 8 {
            out.push(' ');
        }
        out.push_str(" |");
        for b in chunk {
            if b.is_ascii_graphic() || *b == b' ' {
                out.push(*b as char);
            } else {
                out.push('.');
            }
        }
        out.push_str("|\n");
    }
    out
}
