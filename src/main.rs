use clap::{Parser, Subcommand};

pub mod desc;
pub mod error;
pub mod param;
pub mod registry;
pub mod render;
pub mod tree;
pub mod view;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "cfgtree")]
#[command(about = "Object-description registry and configuration emitter", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load object-description records and dump the resolved type registry.
    Registry {
        /// Directory walked recursively for *.odesc records.
        #[arg(long)]
        records: String,

        #[arg(short = 'o', long)]
        out: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Commands::Registry { records, out } => {
            // 1) Enumerate record files (stem = record name).
            let set = collect_records(std::path::Path::new(&records))?;
            if set.is_empty() {
                eprintln!("WARN: no .odesc records found under {}", records);
            }

            // 2) Resolve the class graph.
            let registry = registry::build_registry(&set)?;

            // 3) Dump.
            let json = serde_json::to_string_pretty(&view::registry_view(&registry))?;
            match out {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    println!("Wrote {}", path);
                }
                None => println!("{}", json),
            }
        }
    }

    Ok(())
}

/// Walk `root` for `.odesc` files. Record discovery is deliberately outside
/// the core: the registry builder only ever sees the finished name -> source
/// mapping.
fn collect_records(root: &std::path::Path) -> Result<desc::RecordSet> {
    use anyhow::Context;

    let mut set = desc::RecordSet::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let entries =
            std::fs::read_dir(&dir).with_context(|| format!("read dir {}", dir.display()))?;
        for entry in entries {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "odesc") {
                let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("read record {}", path.display()))?;
                set.insert(stem, text)
                    .with_context(|| format!("while registering {}", path.display()))?;
            }
        }
    }
    Ok(set)
}
