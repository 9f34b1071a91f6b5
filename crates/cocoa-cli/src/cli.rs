//! Command handlers.
//!
//! Every record-creating command runs the same wizard the dashboard uses, so
//! a draft that the dashboard would refuse is refused here too, before any
//! write reaches the backend.

use std::{path::Path, sync::Arc, time::Duration};

use anyhow::{anyhow, bail, Context, Result};
use cocoa_core::{
    backend::Backend,
    display::{Entities, OperationStatus, SubmitSummary, WizardReport},
    models::{Resource, ScopeKey},
    params::{DraftInput, EntityPayload},
    validate::validate,
    wizard::{SubmitResolution, WizardController, WizardKind, WizardOptions, WizardSession},
    CocoaError,
};
use log::{debug, info};

use crate::{
    args::{
        ActivityCommands, CreateDeliverablesArgs, CreateObjectiveArgs, DeliverableCommands,
        EditDeliverableArgs, ObjectiveCommands, SchemaArgs, SchemaKind, SheetCommands,
        ValidateArgs,
    },
    renderer::TerminalRenderer,
};

pub struct Cli<B: Backend + 'static> {
    backend: Arc<B>,
    renderer: TerminalRenderer,
}

impl<B: Backend + 'static> Cli<B> {
    pub fn new(backend: Arc<B>, renderer: TerminalRenderer) -> Self {
        Self { backend, renderer }
    }

    pub async fn handle_deliverable_command(&self, command: DeliverableCommands) -> Result<()> {
        match command {
            DeliverableCommands::List(scope) => self.list(Resource::Deliverable, scope.into()).await,
            DeliverableCommands::Create(args) => self.create_deliverables(args).await,
            DeliverableCommands::Edit(args) => self.edit_deliverable(args).await,
        }
    }

    pub async fn handle_objective_command(&self, command: ObjectiveCommands) -> Result<()> {
        match command {
            ObjectiveCommands::List(scope) => self.list(Resource::Objective, scope.into()).await,
            ObjectiveCommands::Create(args) => self.create_objective(args).await,
        }
    }

    pub async fn handle_activity_command(&self, command: ActivityCommands) -> Result<()> {
        match command {
            ActivityCommands::List(scope) => self.list(Resource::Activity, scope.into()).await,
        }
    }

    pub async fn handle_sheet_command(&self, command: SheetCommands) -> Result<()> {
        match command {
            SheetCommands::List(dates) => self.list(Resource::WeeklySheet, dates.into()).await,
        }
    }

    async fn list(&self, resource: Resource, scope: ScopeKey) -> Result<()> {
        let items = self
            .backend
            .list_scoped(resource, &scope)
            .await
            .map_err(|failure| anyhow!(failure.user_message()))?;
        info!("Listed {} {resource} record(s) in {scope}", items.len());
        self.renderer
            .render(&Entities::new(resource, items).to_string())
    }

    async fn create_deliverables(&self, args: CreateDeliverablesArgs) -> Result<()> {
        let mut drafts = match &args.batch {
            Some(path) => read_batch(path)?,
            None => Vec::new(),
        };
        drafts.extend(args.draft.into_input());
        if drafts.is_empty() {
            bail!("Nothing to create: pass --name/--criterion or --batch");
        }

        let wizard = self.wizard(WizardSession::open(WizardKind::Deliverable, args.scope.into()));
        let last = drafts.len() - 1;
        for (index, input) in drafts.iter().enumerate() {
            debug!("Filling deliverable {} of {}", index + 1, drafts.len());
            self.attempt(&wizard, fill(&wizard, input, true)).await?;
            if index < last {
                self.attempt(&wizard, wizard.stage_current()).await?;
            }
        }
        self.finish(&wizard, Resource::Deliverable).await
    }

    async fn create_objective(&self, args: CreateObjectiveArgs) -> Result<()> {
        let input = args
            .draft
            .into_input()
            .context("Nothing to create: pass --name and --criterion")?;
        let wizard = self.wizard(WizardSession::open(WizardKind::Objective, args.scope.into()));
        self.attempt(&wizard, fill(&wizard, &input, false)).await?;
        self.finish(&wizard, Resource::Objective).await
    }

    async fn edit_deliverable(&self, args: EditDeliverableArgs) -> Result<()> {
        let scope: ScopeKey = args.scope.into();
        let existing = self
            .backend
            .list_scoped(Resource::Deliverable, &scope)
            .await
            .map_err(|failure| anyhow!(failure.user_message()))?
            .into_iter()
            .find(|entity| entity.id == args.id)
            .with_context(|| format!("Deliverable {} not found in {scope}", args.id))?;

        let mut input = DraftInput {
            name: existing.name.clone(),
            description: existing.description.clone(),
            criteria: existing
                .criteria
                .iter()
                .map(|criterion| criterion.description.clone())
                .collect(),
        };
        if let Some(changes) = args.draft.into_input() {
            if !changes.name.is_empty() {
                input.name = changes.name;
            }
            if changes.description.is_some() {
                input.description = changes.description;
            }
            if !changes.criteria.is_empty() {
                input.criteria = changes.criteria;
            }
        }

        let wizard = self.wizard(WizardSession::edit(&existing, scope, WizardOptions::default()));
        self.attempt(&wizard, fill(&wizard, &input, false)).await?;
        self.finish(&wizard, Resource::Deliverable).await
    }

    fn wizard(&self, session: WizardSession) -> WizardController<B> {
        // Values arrive complete, so there is nothing to debounce.
        WizardController::new(Arc::clone(&self.backend), session).with_debounce(Duration::ZERO)
    }

    /// Runs a wizard step; on rejection shows the wizard state and fails.
    async fn attempt<T>(
        &self,
        wizard: &WizardController<B>,
        step: impl std::future::Future<Output = cocoa_core::Result<T>>,
    ) -> Result<T> {
        match step.await {
            Ok(value) => Ok(value),
            Err(CocoaError::Transition(error)) => {
                self.renderer
                    .render(&WizardReport(&wizard.snapshot().await).to_string())?;
                Err(error.into())
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn finish(&self, wizard: &WizardController<B>, resource: Resource) -> Result<()> {
        let pending = wizard.snapshot().await.staged().len() + 1;
        let resolution = self.attempt(wizard, wizard.submit()).await?;

        let summary = SubmitSummary::resolution(resource, &resolution);
        let summary = match &resolution {
            SubmitResolution::Failed { committed, .. } => {
                summary.with_skipped(pending - committed.len() - 1)
            }
            SubmitResolution::Stale { committed } => {
                summary.with_skipped(pending - committed.len())
            }
            SubmitResolution::Completed(_) => summary,
        };
        self.renderer.render(&summary.to_string())?;
        if summary.is_success() {
            return Ok(());
        }

        match resolution {
            SubmitResolution::Failed { error, .. } => bail!("{error}"),
            _ => bail!("The wizard was closed while saving"),
        }
    }

    pub fn validate(&self, args: ValidateArgs) -> Result<()> {
        let field = args.field.label();
        match validate(&args.value, &args.field.policy()).issue() {
            None => self
                .renderer
                .render(&OperationStatus::success(format!("{field} is valid")).to_string()),
            Some(issue) => bail!("{field} {issue}"),
        }
    }

    pub fn schema(&self, args: SchemaArgs) -> Result<()> {
        let schema = match args.kind {
            SchemaKind::Payload => schemars::schema_for!(EntityPayload),
            SchemaKind::Batch => schemars::schema_for!(Vec<DraftInput>),
        };
        println!("{}", serde_json::to_string_pretty(&schema)?);
        Ok(())
    }
}

/// Enters `input` into the wizard and walks it to the last step.
async fn fill<B: Backend + 'static>(
    wizard: &WizardController<B>,
    input: &DraftInput,
    review: bool,
) -> cocoa_core::Result<()> {
    wizard.set_name(&input.name).await?;
    if let Some(description) = &input.description {
        wizard.set_description(description).await?;
    }
    wizard.next().await?;

    // Edit drafts start with the record's criteria; keep only the first slot.
    let existing = wizard.snapshot().await.draft().criteria.len();
    for _ in 1..existing {
        wizard.remove_criterion(1).await?;
    }
    for (index, criterion) in input.criteria.iter().enumerate() {
        if index > 0 {
            wizard.add_criterion().await?;
        }
        wizard.set_criterion(index, criterion).await?;
    }
    if review {
        wizard.next().await?;
    }
    Ok(())
}

fn read_batch(path: &Path) -> Result<Vec<DraftInput>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read batch file {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Invalid batch file {}", path.display()))
}
