//! Command-line arguments.
//!
//! Argument structs carry clap attributes only; each converts into the
//! interface-agnostic types of `cocoa-core` through `From`.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use cocoa_core::{
    models::ScopeKey,
    params::DraftInput,
    validate::LengthPolicy,
};
use jiff::civil::Date;

/// Command-line front end for the Cocoa project dashboard
///
/// Creates objectives and deliverables through the same validated wizards
/// the dashboard uses, and lists records from the backend.
#[derive(Parser)]
#[command(version, about, name = "cocoa")]
pub struct Args {
    /// Backend API root. Overrides the config file and COCOA_API_URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Settings file. Defaults to $XDG_CONFIG_HOME/cocoa/config.json
    #[arg(long, global = true)]
    pub config_file: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check a value against a field's rules without contacting the backend
    #[command(alias = "v")]
    Validate(ValidateArgs),
    /// Manage deliverables
    #[command(alias = "d")]
    Deliverable {
        #[command(subcommand)]
        command: DeliverableCommands,
    },
    /// Manage objectives
    #[command(alias = "o")]
    Objective {
        #[command(subcommand)]
        command: ObjectiveCommands,
    },
    /// Read activities
    #[command(alias = "a")]
    Activity {
        #[command(subcommand)]
        command: ActivityCommands,
    },
    /// Read weekly sheets
    Sheet {
        #[command(subcommand)]
        command: SheetCommands,
    },
    /// Print the JSON schema of a request body
    Schema(SchemaArgs),
}

/// Fields that can be checked offline.
#[derive(Clone, Copy, ValueEnum)]
pub enum FieldArg {
    Name,
    Criterion,
    Description,
}

impl FieldArg {
    pub fn policy(self) -> LengthPolicy {
        match self {
            FieldArg::Name => LengthPolicy::NAME,
            FieldArg::Criterion => LengthPolicy::CRITERION,
            FieldArg::Description => LengthPolicy::DESCRIPTION,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FieldArg::Name => "name",
            FieldArg::Criterion => "criterion",
            FieldArg::Description => "description",
        }
    }
}


#[derive(ClapArgs)]
pub struct ValidateArgs {
    #[arg(value_enum)]
    pub field: FieldArg,
    /// Value to check, as typed
    #[arg(allow_hyphen_values = true)]
    pub value: String,
}

/// The fields of one draft given on the command line.
#[derive(ClapArgs)]
pub struct DraftArgs {
    #[arg(short, long)]
    pub name: Option<String>,
    #[arg(short, long)]
    pub description: Option<String>,
    /// Acceptance criterion; repeat for several
    #[arg(short, long = "criterion")]
    pub criteria: Vec<String>,
}

impl DraftArgs {
    /// The draft, if any field was given.
    pub fn into_input(self) -> Option<DraftInput> {
        if self.name.is_none() && self.description.is_none() && self.criteria.is_empty() {
            return None;
        }
        Some(DraftInput {
            name: self.name.unwrap_or_default(),
            description: self.description,
            criteria: self.criteria,
        })
    }
}

#[derive(ClapArgs)]
pub struct ObjectiveScopeArgs {
    /// Objective the records belong to
    #[arg(long)]
    pub objective: u64,
}

impl From<ObjectiveScopeArgs> for ScopeKey {
    fn from(val: ObjectiveScopeArgs) -> Self {
        ScopeKey::Objective(val.objective)
    }
}

#[derive(ClapArgs)]
pub struct ProjectScopeArgs {
    /// Project the records belong to
    #[arg(long)]
    pub project: u64,
}

impl From<ProjectScopeArgs> for ScopeKey {
    fn from(val: ProjectScopeArgs) -> Self {
        ScopeKey::Project(val.project)
    }
}

/// Create one or more deliverables
///
/// Drafts come from the flags, from a batch file, or both (the flag draft is
/// submitted last). Drafts are submitted in order and saving stops at the
/// first failure.
#[derive(ClapArgs)]
pub struct CreateDeliverablesArgs {
    #[command(flatten)]
    pub scope: ObjectiveScopeArgs,
    #[command(flatten)]
    pub draft: DraftArgs,
    /// JSON file holding an array of drafts
    #[arg(long)]
    pub batch: Option<PathBuf>,
}

/// Edit an existing deliverable
///
/// Unset fields keep their current value. Criteria given on the command line
/// replace the existing list.
#[derive(ClapArgs)]
pub struct EditDeliverableArgs {
    /// Deliverable to edit
    pub id: u64,
    #[command(flatten)]
    pub scope: ObjectiveScopeArgs,
    #[command(flatten)]
    pub draft: DraftArgs,
}

#[derive(Subcommand)]
pub enum DeliverableCommands {
    /// List the deliverables of an objective
    #[command(aliases = ["l", "ls"])]
    List(ObjectiveScopeArgs),
    /// Create deliverables
    #[command(alias = "c")]
    Create(CreateDeliverablesArgs),
    /// Edit a deliverable
    #[command(alias = "e")]
    Edit(EditDeliverableArgs),
}

#[derive(ClapArgs)]
pub struct CreateObjectiveArgs {
    #[command(flatten)]
    pub scope: ProjectScopeArgs,
    #[command(flatten)]
    pub draft: DraftArgs,
}

#[derive(Subcommand)]
pub enum ObjectiveCommands {
    /// List the objectives of a project
    #[command(aliases = ["l", "ls"])]
    List(ProjectScopeArgs),
    /// Create an objective
    #[command(alias = "c")]
    Create(CreateObjectiveArgs),
}

#[derive(Subcommand)]
pub enum ActivityCommands {
    /// List the activities of an objective
    #[command(aliases = ["l", "ls"])]
    List(ObjectiveScopeArgs),
}

#[derive(ClapArgs)]
pub struct SheetListArgs {
    /// Week day to include (YYYY-MM-DD); repeat for several
    #[arg(long = "date", required = true)]
    pub dates: Vec<Date>,
}

impl From<SheetListArgs> for ScopeKey {
    fn from(val: SheetListArgs) -> Self {
        ScopeKey::dates(val.dates)
    }
}

#[derive(Subcommand)]
pub enum SheetCommands {
    /// List the weekly sheets covering the given dates
    #[command(aliases = ["l", "ls"])]
    List(SheetListArgs),
}

#[derive(Clone, Copy, Default, ValueEnum)]
pub enum SchemaKind {
    /// Body of create and update requests
    #[default]
    Payload,
    /// Batch file accepted by `deliverable create --batch`
    Batch,
}

#[derive(ClapArgs)]
pub struct SchemaArgs {
    #[arg(value_enum, default_value_t)]
    pub kind: SchemaKind,
}
