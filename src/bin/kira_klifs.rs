use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::info;
use tracing_subscriber::EnvFilter;

use kira_klifs::align::{Aligner, Scores, kabsch_aligner};
use kira_klifs::config::{ConfigLoader, ResolvedConfig};
use kira_klifs::domain::{Entity, FileFormat, Layout, SourceTable, StructureLocator};
use kira_klifs::error::KiraError;
use kira_klifs::fs_util::extract_zip;
use kira_klifs::local::LocalSession;
use kira_klifs::output::JsonOutput;
use kira_klifs::paths::build_path;
use kira_klifs::remote::{KlifsHttpClient, Remote};
use kira_klifs::schema::{canonical_name, columns};
use kira_klifs::structure::Structure;

#[derive(Parser)]
#[command(name = "kira-klifs")]
#[command(about = "KLIFS kinase structures: canonical metadata, artifact paths and superposition")]
#[command(version, author)]
struct Cli {
    /// Config file (defaults to ./kira-klifs.json when present)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Translate a raw column name into its canonical name")]
    Canonical(CanonicalArgs),
    #[command(about = "List the raw column names a source table emits")]
    Columns { source: SourceTable },
    #[command(about = "Build the path of a structure artifact")]
    Path(PathArgs),
    #[command(about = "Query the KLIFS web service")]
    Remote(RemoteArgs),
    #[command(about = "Work with an unpacked KLIFS download")]
    Local(LocalArgs),
    #[command(about = "Superpose two MOL2 structures")]
    Align(AlignArgs),
}

#[derive(Args)]
struct CanonicalArgs {
    source: SourceTable,
    raw: String,
}

#[derive(Args)]
struct PathArgs {
    root: Utf8PathBuf,
    species: String,
    kinase: String,
    pdb: String,
    #[arg(long, default_value = "")]
    alt: String,
    #[arg(long, default_value = "")]
    chain: String,
    #[arg(long, value_enum, default_value_t = Entity::Complex)]
    entity: Entity,
    #[arg(long, value_enum, default_value_t = FileFormat::Mol2)]
    format: FileFormat,
    #[arg(long)]
    nested: bool,
}

#[derive(Args)]
struct RemoteArgs {
    #[command(subcommand)]
    command: RemoteCommand,
}

#[derive(Subcommand)]
enum RemoteCommand {
    #[command(about = "Kinase groups")]
    Groups,
    #[command(about = "Kinase families, optionally within a group")]
    Families {
        #[arg(long)]
        group: Option<String>,
    },
    #[command(about = "Kinases by ID, by name, or filtered by group/family/species")]
    Kinases(KinaseQuery),
    #[command(about = "Structures by structure, kinase or ligand IDs, or PDB codes")]
    Structures(StructureQuery),
    #[command(about = "Ligands bound to the given kinases")]
    Ligands {
        #[arg(long, value_delimiter = ',', required = true)]
        kinase_ids: Vec<u64>,
    },
    #[command(about = "Interaction types, fingerprints or pocket residue numbering")]
    Interactions(InteractionQuery),
    #[command(about = "Bioactivities measured for the given ligands")]
    Bioactivities {
        #[arg(long, value_delimiter = ',', required = true)]
        ligand_ids: Vec<u64>,
    },
    #[command(about = "Fetch the coordinates of one structure entity")]
    Coordinates(CoordinatesArgs),
}

#[derive(Args)]
struct KinaseQuery {
    #[arg(long, value_delimiter = ',')]
    ids: Vec<u64>,
    #[arg(long, value_delimiter = ',')]
    names: Vec<String>,
    #[arg(long)]
    group: Option<String>,
    #[arg(long)]
    family: Option<String>,
    #[arg(long)]
    species: Option<String>,
}

#[derive(Args)]
struct StructureQuery {
    #[arg(long, value_delimiter = ',')]
    ids: Vec<u64>,
    #[arg(long, value_delimiter = ',')]
    kinase_ids: Vec<u64>,
    #[arg(long, value_delimiter = ',')]
    ligand_ids: Vec<u64>,
    #[arg(long, value_delimiter = ',')]
    pdbs: Vec<String>,
}

#[derive(Args)]
struct InteractionQuery {
    #[arg(long)]
    types: bool,
    #[arg(long, value_delimiter = ',')]
    structure_ids: Vec<u64>,
    #[arg(long)]
    pocket: Option<u64>,
}

#[derive(Args)]
struct CoordinatesArgs {
    structure_id: u64,
    #[arg(long, value_enum, default_value_t = Entity::Complex)]
    entity: Entity,
    #[arg(long, value_enum, default_value_t = FileFormat::Mol2)]
    format: FileFormat,
    /// Store the file below this directory instead of printing it
    #[arg(long)]
    download: Option<Utf8PathBuf>,
    #[arg(long)]
    nested: bool,
}

#[derive(Args)]
struct LocalArgs {
    /// Directory containing KLIFS_download (defaults to the configured root)
    #[arg(long)]
    root: Option<Utf8PathBuf>,

    #[command(subcommand)]
    command: LocalCommand,
}

#[derive(Subcommand)]
enum LocalCommand {
    #[command(about = "Merged export/overview metadata with canonical names")]
    Structures,
    #[command(about = "Unpack a KLIFS download archive into the root")]
    Extract { archive: Utf8PathBuf },
}

#[derive(Args)]
struct AlignArgs {
    fixed: Utf8PathBuf,
    mobile: Utf8PathBuf,
}

#[derive(Serialize)]
struct AlignSummary<'a> {
    aligner: &'a str,
    fixed: &'a str,
    mobile: &'a str,
    scores: &'a Scores,
    metadata: &'a Map<String, Value>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(kira) = report.downcast_ref::<KiraError>() {
            return ExitCode::from(map_exit_code(kira));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &KiraError) -> u8 {
    match error {
        KiraError::UnknownField { .. }
        | KiraError::EmptyInput
        | KiraError::SchemaMismatch { .. }
        | KiraError::InvalidInput(_)
        | KiraError::InvalidSourceTable(_)
        | KiraError::InvalidEntity(_)
        | KiraError::InvalidFormat(_)
        | KiraError::ConfigParse(_) => 2,
        KiraError::KlifsHttp(_) | KiraError::KlifsStatus { .. } => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ConfigLoader::resolve(cli.config.as_deref())?;

    match cli.command {
        Commands::Canonical(args) => {
            let canonical = canonical_name(args.source, &args.raw)?;
            print(&json!({
                "source": args.source,
                "raw": args.raw,
                "canonical": canonical,
            }))
        }
        Commands::Columns { source } => print(&columns(source)),
        Commands::Path(args) => run_path(args),
        Commands::Remote(args) => run_remote(args.command, &config),
        Commands::Local(args) => run_local(args, &config),
        Commands::Align(args) => run_align(args, &config),
    }
}

fn run_path(args: PathArgs) -> miette::Result<()> {
    let locator = StructureLocator::new(args.species, args.kinase, args.pdb, args.alt, args.chain);
    let layout = if args.nested { Layout::Nested } else { Layout::Flat };
    let path = build_path(&args.root, &locator, args.entity, args.format, layout);
    print(&json!({ "path": path }))
}

fn run_remote(command: RemoteCommand, config: &ResolvedConfig) -> miette::Result<()> {
    let remote = Remote::new(KlifsHttpClient::new(&config.remote)?);

    match command {
        RemoteCommand::Groups => print(&remote.kinase_groups()?),
        RemoteCommand::Families { group } => print(&remote.kinase_families(group.as_deref())?),
        RemoteCommand::Kinases(query) => {
            let table = if !query.ids.is_empty() {
                remote.kinases_by_ids(&query.ids)?
            } else if !query.names.is_empty() {
                let names = query.names.iter().map(String::as_str).collect::<Vec<_>>();
                remote.kinases_by_names(&names, query.species.as_deref())?
            } else {
                remote.kinase_names(
                    query.group.as_deref(),
                    query.family.as_deref(),
                    query.species.as_deref(),
                )?
            };
            print(&table)
        }
        RemoteCommand::Structures(query) => {
            let table = if !query.ids.is_empty() {
                remote.structures_by_ids(&query.ids)?
            } else if !query.kinase_ids.is_empty() {
                remote.structures_by_kinase_ids(&query.kinase_ids)?
            } else if !query.ligand_ids.is_empty() {
                remote.structures_by_ligand_ids(&query.ligand_ids)?
            } else if !query.pdbs.is_empty() {
                let pdbs = query.pdbs.iter().map(String::as_str).collect::<Vec<_>>();
                remote.structures_by_pdbs(&pdbs)?
            } else {
                return Err(KiraError::InvalidInput(
                    "give --ids, --kinase-ids, --ligand-ids or --pdbs".to_string(),
                )
                .into());
            };
            print(&table)
        }
        RemoteCommand::Ligands { kinase_ids } => print(&remote.ligands_by_kinase_ids(&kinase_ids)?),
        RemoteCommand::Interactions(query) => {
            let table = if query.types {
                remote.interaction_types()?
            } else if let Some(structure_id) = query.pocket {
                remote.pocket_residues(structure_id)?
            } else {
                remote.interaction_fingerprints(&query.structure_ids)?
            };
            print(&table)
        }
        RemoteCommand::Bioactivities { ligand_ids } => {
            print(&remote.bioactivities_by_ligand_ids(&ligand_ids)?)
        }
        RemoteCommand::Coordinates(args) => match args.download {
            Some(root) => {
                let layout = if args.nested { Layout::Nested } else { Layout::Flat };
                let record = remote.download_coordinates(
                    args.structure_id,
                    args.entity,
                    args.format,
                    &root,
                    layout,
                )?;
                info!(path = %record.path, "downloaded coordinates");
                print(&record)
            }
            None => {
                let text = remote.coordinates_text(args.structure_id, args.entity, args.format)?;
                print(&json!({
                    "structure_id": args.structure_id,
                    "entity": args.entity,
                    "format": args.format,
                    "text": text,
                }))
            }
        },
    }
}

fn run_local(args: LocalArgs, config: &ResolvedConfig) -> miette::Result<()> {
    let root = args.root.unwrap_or_else(|| config.local_root.clone());
    match args.command {
        LocalCommand::Structures => {
            let session = LocalSession::open(root)?;
            print(session.structures())
        }
        LocalCommand::Extract { archive } => {
            let files = extract_zip(&archive, &root)?;
            print(&json!({ "root": root, "files": files }))
        }
    }
}

fn run_align(args: AlignArgs, config: &ResolvedConfig) -> miette::Result<()> {
    let structures = [
        Structure::from_mol2_path(&args.fixed)?,
        Structure::from_mol2_path(&args.mobile)?,
    ];
    let aligner = kabsch_aligner(config.scoring);
    let result = aligner.calculate(&structures)?;
    print(&AlignSummary {
        aligner: aligner.name(),
        fixed: &result.superposed.0.name,
        mobile: &result.superposed.1.name,
        scores: &result.scores,
        metadata: &result.metadata,
    })
}

fn print<T: Serialize + ?Sized>(value: &T) -> miette::Result<()> {
    JsonOutput::print_json(value).into_diagnostic()
}
