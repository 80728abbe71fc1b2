use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use sha2::{Digest, Sha256};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use vellum_config::{DocumentTypeDraft, SecurityLevel, WorkflowDraft};
use vellum_control::{DocumentControl, DocumentQuery};
use vellum_document::{CredentialToken, DocumentMetadata, DocumentRecord, SignaturePayload, VersionDraft};
use vellum_engine::NextAction;
use vellum_identity::SystemIdentity;
use vellum_store::{JsonFileStore, SqliteStore, Store};

type Control = DocumentControl<Box<dyn Store>, SystemIdentity>;

/// Vellum - controlled document lifecycle and electronic approval
#[derive(Parser)]
#[command(name = "vellum")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.vellum)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  /// Storage backend for the document register
  #[arg(long, global = true, value_enum, default_value_t = StoreKind::Json)]
  store: StoreKind,

  /// Log at debug level unless RUST_LOG is set
  #[arg(long, short, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum StoreKind {
  Json,
  Sqlite,
}

#[derive(Subcommand)]
enum Commands {
  /// Manage approval workflows
  Workflow {
    #[command(subcommand)]
    command: WorkflowCommand,
  },

  /// Manage document types
  Type {
    #[command(subcommand)]
    command: TypeCommand,
  },

  /// Manage controlled documents
  Document {
    #[command(subcommand)]
    command: DocumentCommand,
  },

  /// Show register totals and the most recently issued documents
  Summary,
}

#[derive(Subcommand)]
enum WorkflowCommand {
  /// List workflows and their steps
  List,

  /// Create a workflow from a JSON draft
  Create {
    /// Path to the workflow draft (JSON), or - to read stdin
    file: PathBuf,
  },
}

#[derive(Subcommand)]
enum TypeCommand {
  /// List document types
  List,

  /// Add a document type
  Add {
    name: String,

    #[arg(long, default_value = "")]
    description: String,
  },
}

#[derive(Subcommand)]
enum DocumentCommand {
  /// List documents, optionally filtered
  List {
    /// Text to match against title, number, type and category
    #[arg(long)]
    search: Option<String>,

    /// Only documents of this type (name or id)
    #[arg(long = "type")]
    document_type: Option<String>,
  },

  /// Show a document with its versions and audit trail
  Show {
    id: String,

    /// Print the stored record as JSON
    #[arg(long)]
    json: bool,
  },

  /// Register a new document
  Create(CreateArgs),

  /// Submit a draft for review
  Submit { id: String },

  /// Sign a workflow step on the latest version
  Sign(SignArgs),

  /// Release an approved document as effective
  Release { id: String },

  /// Draft a new version of a document
  Revise(ReviseArgs),
}

#[derive(Args)]
struct CreateArgs {
  #[arg(long)]
  title: String,

  /// Document number, e.g. SOP-GMP-0042
  #[arg(long)]
  number: String,

  /// Document type (name or id)
  #[arg(long = "type")]
  document_type: String,

  #[arg(long)]
  category: String,

  #[arg(long)]
  created_by: String,

  /// Defaults to the creator
  #[arg(long)]
  issued_by: Option<String>,

  #[arg(long)]
  issuer_role: String,

  /// confidential, internal, restricted or public
  #[arg(long, default_value = "internal")]
  security: SecurityLevel,

  /// Workflow id (default: the default workflow)
  #[arg(long, conflicts_with = "no_workflow")]
  workflow: Option<String>,

  /// Register without a workflow; the document cannot be submitted
  #[arg(long)]
  no_workflow: bool,

  #[arg(long, default_value = "1.0")]
  version_label: String,

  #[arg(long, default_value = "Initial issue")]
  summary: String,

  /// YYYY-MM-DD or RFC 3339 (default: now)
  #[arg(long, value_parser = parse_date)]
  effective_from: Option<DateTime<Utc>>,

  /// YYYY-MM-DD or RFC 3339 (default: 180 days from now)
  #[arg(long, value_parser = parse_date)]
  next_issue: Option<DateTime<Utc>>,
}

#[derive(Args)]
struct SignArgs {
  id: String,

  /// Step id or name
  #[arg(long)]
  step: String,

  #[arg(long)]
  signer_name: String,

  #[arg(long)]
  signer_title: String,

  #[arg(long)]
  signer_id: String,

  #[arg(long)]
  reason: String,

  /// Signing password; read from stdin when omitted. Only its SHA-256 digest is stored
  #[arg(long)]
  credential: Option<String>,
}

#[derive(Args)]
struct ReviseArgs {
  id: String,

  #[arg(long)]
  label: String,

  #[arg(long)]
  summary: String,

  /// YYYY-MM-DD or RFC 3339 (default: 7 days from now)
  #[arg(long, value_parser = parse_date)]
  effective_from: Option<DateTime<Utc>>,

  /// YYYY-MM-DD or RFC 3339 (default: 180 days from now)
  #[arg(long, value_parser = parse_date)]
  next_review: Option<DateTime<Utc>>,
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let filter = if cli.verbose { "debug" } else { "info" };
  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
    .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
    .init();

  let data_dir = match cli.data_dir {
    Some(dir) => dir,
    None => dirs::home_dir()
      .context("could not determine home directory")?
      .join(".vellum"),
  };

  let Some(command) = cli.command else {
    println!("vellum - use --help to see available commands");
    return Ok(());
  };

  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async {
    let mut control = open_control(&data_dir, cli.store).await?;
    run(&mut control, command).await
  })
}

async fn open_control(data_dir: &Path, kind: StoreKind) -> Result<Control> {
  let store: Box<dyn Store> = match kind {
    StoreKind::Json => Box::new(JsonFileStore::new(data_dir.join("vellum.json"))),
    StoreKind::Sqlite => {
      tokio::fs::create_dir_all(data_dir)
        .await
        .with_context(|| format!("failed to create data directory: {}", data_dir.display()))?;
      let path = data_dir.join("vellum.db");
      Box::new(
        SqliteStore::open(&path)
          .await
          .with_context(|| format!("failed to open database: {}", path.display()))?,
      )
    }
  };

  DocumentControl::open(store, SystemIdentity)
    .await
    .context("failed to load document register")
}

async fn run(control: &mut Control, command: Commands) -> Result<()> {
  match command {
    Commands::Workflow { command } => match command {
      WorkflowCommand::List => list_workflows(control),
      WorkflowCommand::Create { file } => {
        let content = read_input(&file)?;
        let draft: WorkflowDraft = serde_json::from_str(&content)
          .with_context(|| format!("failed to parse workflow draft: {}", file.display()))?;
        let workflow = control.create_workflow(draft).await?;
        println!("{}", workflow.id());
      }
    },
    Commands::Type { command } => match command {
      TypeCommand::List => {
        for t in control.document_types() {
          println!("{}  {}  {}", t.id, t.name, t.description);
        }
      }
      TypeCommand::Add { name, description } => {
        let document_type = control
          .add_document_type(DocumentTypeDraft { name, description })
          .await?;
        println!("{}", document_type.id);
      }
    },
    Commands::Document { command } => run_document(control, command).await?,
    Commands::Summary => print_summary(control),
  }
  Ok(())
}

async fn run_document(control: &mut Control, command: DocumentCommand) -> Result<()> {
  match command {
    DocumentCommand::List {
      search,
      document_type,
    } => {
      let mut query = DocumentQuery::text(search.unwrap_or_default());
      if let Some(t) = document_type {
        query = query.with_type(resolve_type(control, &t)?);
      }
      for doc in control.search(&query) {
        print_document_line(doc);
      }
    }
    DocumentCommand::Show { id, json } => {
      let doc = control.document(&id)?;
      if json {
        println!("{}", serde_json::to_string_pretty(doc)?);
      } else {
        show_document(control, doc)?;
      }
    }
    DocumentCommand::Create(args) => {
      let doc = create_document(control, args).await?;
      println!("{}", doc.id());
    }
    DocumentCommand::Submit { id } => {
      let doc = control.submit_for_review(&id).await?;
      print_document_line(&doc);
    }
    DocumentCommand::Sign(args) => {
      let step_id = resolve_step(control, &args.id, &args.step)?;
      let password = match args.credential {
        Some(c) => c,
        None => read_input(Path::new("-"))?.trim().to_string(),
      };
      if password.is_empty() {
        bail!("signing password must not be empty");
      }
      let payload = SignaturePayload {
        signer_name: args.signer_name,
        signer_title: args.signer_title,
        signer_identifier: args.signer_id,
        reason: args.reason,
        credential: credential_token(&password),
      };
      let doc = control.apply_signature(&args.id, &step_id, payload).await?;
      print_document_line(&doc);
    }
    DocumentCommand::Release { id } => {
      let doc = control.release_effective(&id).await?;
      print_document_line(&doc);
    }
    DocumentCommand::Revise(args) => {
      let now = Utc::now();
      let draft = VersionDraft {
        version_label: args.label,
        change_summary: args.summary,
        effective_from: args.effective_from.unwrap_or(now + Duration::days(7)),
        next_review_on: args.next_review.unwrap_or(now + Duration::days(180)),
      };
      let doc = control.draft_new_version(&args.id, draft).await?;
      print_document_line(&doc);
    }
  }
  Ok(())
}

async fn create_document(control: &mut Control, args: CreateArgs) -> Result<DocumentRecord> {
  let now = Utc::now();
  let type_id = resolve_type(control, &args.document_type)?;
  let workflow_id = if args.no_workflow {
    None
  } else {
    match args.workflow {
      Some(id) => Some(id),
      None => control.default_workflow().map(|w| w.id().to_string()),
    }
  };
  let effective_from = args.effective_from.unwrap_or(now);
  let next_issue_date = args.next_issue.unwrap_or(now + Duration::days(180));

  let metadata = DocumentMetadata {
    title: args.title,
    document_number: args.number,
    date_created: now,
    issued_by: args.issued_by.unwrap_or_else(|| args.created_by.clone()),
    created_by: args.created_by,
    date_of_issue: now,
    issuer_role: args.issuer_role,
    effective_from,
    next_issue_date,
    category: args.category,
    security_level: args.security,
    type_id,
    workflow_id,
  };
  let initial = VersionDraft {
    version_label: args.version_label,
    change_summary: args.summary,
    effective_from,
    next_review_on: next_issue_date,
  };

  Ok(control.create_document(metadata, initial).await?)
}

/// Accept a document type id or a case-insensitive name.
fn resolve_type(control: &Control, name_or_id: &str) -> Result<String> {
  control
    .document_types()
    .iter()
    .find(|t| t.id == name_or_id || t.name.eq_ignore_ascii_case(name_or_id))
    .map(|t| t.id.clone())
    .with_context(|| format!("unknown document type: {}", name_or_id))
}

/// Accept a step id or a case-insensitive step name of the document's workflow.
fn resolve_step(control: &Control, document_id: &str, step: &str) -> Result<String> {
  let doc = control.document(document_id)?;
  let Some(workflow_id) = doc.workflow_id() else {
    // Let the engine report the missing workflow.
    return Ok(step.to_string());
  };
  let workflow = control.workflow(workflow_id)?;
  Ok(
    workflow
      .steps()
      .iter()
      .find(|s| s.id == step || s.name.eq_ignore_ascii_case(step))
      .map(|s| s.id.clone())
      .unwrap_or_else(|| step.to_string()),
  )
}

fn list_workflows(control: &Control) {
  let default_id = control.default_workflow().map(|w| w.id().to_string());
  for workflow in control.workflows() {
    let marker = if default_id.as_deref() == Some(workflow.id()) {
      " (default)"
    } else {
      ""
    };
    println!("{}  {}{}", workflow.id(), workflow.name(), marker);
    for (i, step) in workflow.steps().iter().enumerate() {
      println!("  {}. {} [{}] {}", i + 1, step.name, step.responsible_role, step.id);
    }
  }
}

fn print_document_line(doc: &DocumentRecord) {
  let m = doc.metadata();
  println!(
    "{}  {}  {}  v{}  {}  {}",
    doc.id(),
    m.document_number,
    m.title,
    doc.current_version_label(),
    doc.lifecycle_state(),
    m.security_level
  );
}

fn show_document(control: &Control, doc: &DocumentRecord) -> Result<()> {
  let m = doc.metadata();
  let type_name = control
    .document_type(&m.type_id)
    .map(|t| t.name.clone())
    .unwrap_or_else(|_| m.type_id.clone());

  println!("{} - {}", m.document_number, m.title);
  println!("  Type:          {}", type_name);
  println!("  Category:      {}", m.category);
  println!("  Security:      {}", m.security_level);
  println!("  Status:        {}", doc.lifecycle_state());
  println!("  Version:       {}", doc.current_version_label());
  println!("  Issued by:     {} ({})", m.issued_by, m.issuer_role);
  println!("  Effective:     {}", m.effective_from.format("%Y-%m-%d"));
  println!("  Next issue:    {}", m.next_issue_date.format("%Y-%m-%d"));
  if let Some(workflow_id) = doc.workflow_id() {
    let name = control.workflow(workflow_id).map(|w| w.name().to_string())?;
    println!("  Workflow:      {}", name);
  }
  match control.next_action(doc.id())? {
    Some(NextAction::SubmitForReview) => println!("  Next action:   submit for review"),
    Some(NextAction::Sign { step }) => {
      println!("  Next action:   sign '{}' ({})", step.name, step.responsible_role)
    }
    Some(NextAction::ReleaseEffective) => println!("  Next action:   release as effective"),
    None => {}
  }

  println!();
  println!("Versions:");
  for version in doc.versions().iter().rev() {
    println!(
      "  {}  {}  {}  {}",
      version.version_label,
      version.status(),
      version.created_on.format("%Y-%m-%d"),
      version.change_summary
    );
    for approval in version.approvals() {
      println!(
        "    signed {} by {} ({}) at {}",
        approval.step_name,
        approval.signer_name,
        approval.signer_title,
        approval.issued_at.to_rfc3339()
      );
    }
  }

  println!();
  println!("Audit trail:");
  for entry in doc.audit_trail().newest_first() {
    println!(
      "  {}  {}  {}: {}",
      entry.timestamp.to_rfc3339(),
      entry.actor,
      entry.action,
      entry.details
    );
  }
  Ok(())
}

fn print_summary(control: &Control) {
  let summary = control.summary(Utc::now());
  println!("Documents:         {}", summary.total);
  println!("Effective:         {}", summary.effective);
  println!("Restricted:        {}", summary.restricted);
  println!("Reviews due (30d): {}", summary.upcoming_reviews);
  if !summary.recent.is_empty() {
    println!();
    println!("Recently issued:");
    for doc in summary.recent {
      print_document_line(doc);
    }
  }
}

fn read_input(path: &Path) -> Result<String> {
  if path == Path::new("-") {
    let mut input = String::new();
    io::stdin()
      .read_to_string(&mut input)
      .context("failed to read stdin")?;
    return Ok(input);
  }
  std::fs::read_to_string(path).with_context(|| format!("failed to read file: {}", path.display()))
}

/// Hex SHA-256 of the signing password. The plain password never leaves the CLI.
fn credential_token(password: &str) -> CredentialToken {
  CredentialToken::new(hex::encode(Sha256::digest(password.as_bytes())))
}

/// Parse `YYYY-MM-DD` (midnight UTC) or an RFC 3339 timestamp.
fn parse_date(value: &str) -> Result<DateTime<Utc>, String> {
  if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
    return Ok(ts.with_timezone(&Utc));
  }
  let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
    .map_err(|_| format!("expected YYYY-MM-DD or RFC 3339, got '{}'", value))?;
  match date.and_hms_opt(0, 0, 0) {
    Some(dt) => Ok(dt.and_utc()),
    None => Err(format!("invalid date '{}'", value)),
  }
}
