use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use pdf_stamp::{HandleRegistry, Session, StampOptions, StampVariant};
use pdf_stamp_runtime::{
    DiagnosticLog, Direction, PreviewInfo, StampClient, StampCommand, StampUpdate,
    level_for_verbosity, worker_task,
};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(name = "pdfs", about = "Stamp review check marks onto PDF pages", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print diagnostics (repeat for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Stamp every page after the first and save the download
    Stamp {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Directory the stamped PDF or archive is written to
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write the previews into this directory
        #[arg(long)]
        preview_dir: Option<PathBuf>,
    },

    /// Write a preview of every stamped document
    Preview {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Directory the previews are written to
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Args)]
struct SelectionArgs {
    /// Input PDF file(s) - can specify multiple
    #[arg(short, long, num_args = 1..)]
    input: Vec<PathBuf>,

    /// Stamp every PDF found under this directory instead
    #[arg(long, conflicts_with = "input")]
    dir: Option<PathBuf>,

    /// Check mark placement
    #[arg(long, value_enum)]
    variant: Option<VariantArg>,

    /// JSON options file; command line arguments take precedence
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum VariantArg {
    Batch,
    Single,
}

impl From<VariantArg> for StampVariant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Batch => Self::Batch,
            VariantArg::Single => Self::Single,
        }
    }
}

impl SelectionArgs {
    async fn into_options(self) -> Result<StampOptions> {
        let mut options = match &self.config {
            Some(path) => StampOptions::load(path).await?,
            None => StampOptions::default(),
        };

        if !self.input.is_empty() {
            options.input_files = self.input;
            options.input_dir = None;
        }
        if let Some(dir) = self.dir {
            options.input_files.clear();
            options.input_dir = Some(dir);
        }
        if let Some(variant) = self.variant {
            options.variant = variant.into();
        }
        Ok(options)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let diagnostics = DiagnosticLog::new(1000, level_for_verbosity(cli.verbose));
    diagnostics
        .clone()
        .init()
        .map_err(|e| anyhow::anyhow!("Failed to install logger: {}", e))?;

    let (options, preview_only) = match cli.command {
        Commands::Stamp {
            selection,
            output,
            preview_dir,
        } => {
            let mut options = selection.into_options().await?;
            if let Some(output) = output {
                options.output_dir = output;
            }
            if preview_dir.is_some() {
                options.preview_dir = preview_dir;
            }
            (options, false)
        }
        Commands::Preview { selection, output } => {
            let mut options = selection.into_options().await?;
            options.output_dir = output;
            options.preview_dir = None;
            (options, true)
        }
    };
    options.validate()?;
    log::debug!("Running with {:?}", options);

    let registry = HandleRegistry::new();
    let session = Session::with_registry(registry.clone(), options.variant);
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (update_tx, update_rx) = mpsc::unbounded_channel();
    let worker = tokio::spawn(worker_task(session, command_rx, update_tx));
    let mut client = StampClient::new(command_tx, update_rx);

    let result = if preview_only {
        run_preview(&mut client, &registry, &options).await
    } else {
        run_stamp(&mut client, &registry, &options).await
    };

    drop(client);
    worker.await?;

    let entries = if cli.verbose > 0 {
        diagnostics.get_entries()
    } else {
        diagnostics.problems()
    };
    for entry in entries {
        eprintln!("{}", entry);
    }

    result
}

async fn run_stamp(
    client: &mut StampClient,
    registry: &HandleRegistry,
    options: &StampOptions,
) -> Result<()> {
    select(client, options).await?;

    if let Some(preview_dir) = &options.preview_dir {
        write_previews(client, registry, preview_dir).await?;
    }

    match client.request(StampCommand::Commit).await? {
        StampUpdate::Committed { count, failed } => {
            println!("Stamped {} documents", count);
            for name in failed {
                println!("  Skipped {} (not a valid PDF)", name);
            }
        }
        other => bail!("Unexpected update: {:?}", other),
    }

    let unit = match client.request(StampCommand::Package).await? {
        StampUpdate::Packaged { unit } => unit,
        other => bail!("Unexpected update: {:?}", other),
    };

    tokio::fs::create_dir_all(&options.output_dir).await?;
    let path = unit.save_in(&options.output_dir).await?;
    println!("Saved → {}", path.display());
    Ok(())
}

async fn run_preview(
    client: &mut StampClient,
    registry: &HandleRegistry,
    options: &StampOptions,
) -> Result<()> {
    select(client, options).await?;
    write_previews(client, registry, &options.output_dir).await
}

async fn select(client: &mut StampClient, options: &StampOptions) -> Result<()> {
    let command = match &options.input_dir {
        Some(path) => StampCommand::LoadDirectory { path: path.clone() },
        None => StampCommand::LoadFiles {
            paths: options.input_files.clone(),
        },
    };

    match client.request(command).await? {
        StampUpdate::Selected { names, total_bytes } => {
            println!("Selected {} PDF files ({} bytes)", names.len(), total_bytes);
            Ok(())
        }
        other => bail!("Unexpected update: {:?}", other),
    }
}

/// Generate previews and write them one by one, walking forward
async fn write_previews(
    client: &mut StampClient,
    registry: &HandleRegistry,
    dir: &Path,
) -> Result<()> {
    let mut current = match client.request(StampCommand::GeneratePreviews).await? {
        StampUpdate::PreviewsGenerated { failed, active, .. } => {
            for name in failed {
                println!("  No preview for {} (not a valid PDF)", name);
            }
            active
        }
        other => bail!("Unexpected update: {:?}", other),
    };

    tokio::fs::create_dir_all(dir).await?;
    while let Some(preview) = current {
        write_preview(registry, &preview, dir).await?;
        if preview.index + 1 >= preview.total {
            break;
        }

        current = match client
            .request(StampCommand::Navigate {
                direction: Direction::Next,
            })
            .await?
        {
            StampUpdate::PreviewShown { preview } => preview,
            other => bail!("Unexpected update: {:?}", other),
        };
    }
    Ok(())
}

async fn write_preview(registry: &HandleRegistry, preview: &PreviewInfo, dir: &Path) -> Result<()> {
    let Some(bytes) = registry.resolve(preview.handle) else {
        bail!("Preview {} is no longer available", preview.handle);
    };

    let path = dir.join(&preview.name);
    tokio::fs::write(&path, &bytes[..]).await?;
    println!(
        "Preview {}/{}: {} → {}",
        preview.index + 1,
        preview.total,
        preview.source_name,
        path.display()
    );
    Ok(())
}
