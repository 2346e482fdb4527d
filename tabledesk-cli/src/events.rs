//! Community events commands

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tabledesk_lib::error::ConfigError;
use tabledesk_lib::export::CsvExport;
use tabledesk_lib::gateway::Gateway;
use tabledesk_lib::gateway::RestGateway;
use tabledesk_lib::gateway::TableName;
use tabledesk_lib::model::RowId;
use tabledesk_lib::notify::Notifier;
use tabledesk_lib::schema::Field;
use tabledesk_lib::schema::Schema;
use tabledesk_lib::table::AutoConfirm;
use tabledesk_lib::table::Confirm;
use tabledesk_lib::table::DeleteOutcome;
use tabledesk_lib::table::LoadOutcome;
use tabledesk_lib::table::RowEditor;
use tabledesk_lib::table::SaveOutcome;
use tabledesk_lib::table::TableConfig;
use tabledesk_lib::table::TableController;

use crate::cli::Cli;
use crate::cli::DeleteArgs;
use crate::cli::EditArgs;
use crate::cli::EventsCommand;
use crate::confirm::StdinConfirm;
use crate::error::CliError;
use crate::output;

const TABLE: &str = "communityEvents";
const SELECTION: &str = "*, type (name)";
const DATA_NAME: &str = "event";
const EXPORT_PREFIX: &str = "community-events";

/// Shared state for one invocation.
pub struct Context {
    gateway: Arc<dyn Gateway>,
    notifier: Notifier,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let mut builder = RestGateway::builder()
            .url(&cli.url)
            .api_key(&cli.api_key)
            .timeout(Duration::from_secs(cli.timeout_secs));
        if let Some(token) = &cli.access_token {
            builder = builder.access_token(token);
        }
        let gateway = builder.build()?;
        log::debug!("using {:?}", gateway);

        Ok(Self {
            gateway: Arc::new(gateway),
            notifier: Notifier::new(),
        })
    }
}

/// Column layout of the events table.
pub fn schema() -> Result<Schema, ConfigError> {
    Schema::new(vec![
        Field::text("name", "Event").editable(),
        Field::lookup("type", "Type", "name"),
        Field::text("presenter", "Presenter(s)").editable(),
        Field::text("location", "Location").editable(),
        Field::boolean("virtual", "Virtual").editable(),
        Field::date("date", "Date").editable(),
        Field::integer("hours", "Hours").editable(),
        Field::integer("numChildren", "# of Children Served").editable(),
        Field::integer("numAdults", "# of Adults Served").editable(),
        Field::decimal("foodPounds", "Pounds of Food").editable(),
        Field::text("foodDescription", "Food Description").editable(),
        Field::text("description", "Description").editable(),
    ])
}

pub fn config() -> Result<TableConfig, ConfigError> {
    Ok(TableConfig::new(TableName::new(TABLE)?, schema()?, DATA_NAME)
        .selection(SELECTION)
        .delete_confirm_field("name"))
}

pub async fn run(context: &Context, command: EventsCommand) -> Result<(), CliError> {
    let controller = TableController::new(
        Arc::clone(&context.gateway),
        config()?,
        context.notifier.clone(),
    );
    load(&controller).await?;

    match command {
        EventsCommand::List => {
            println!("{}", output::format_table(&controller.render()));
            Ok(())
        }
        EventsCommand::Edit(args) => edit(&controller, args).await,
        EventsCommand::Delete(args) => delete(&controller, args).await,
        EventsCommand::Export { dir } => {
            let rows = controller.rows().unwrap_or_default();
            let path = CsvExport::new(EXPORT_PREFIX)
                .flatten("type", "name")
                .date_column("date")
                .write_to_dir(&dir, &rows, Utc::now().date_naive())
                .map_err(CliError::Export)?;
            println!("{}", path.display());
            Ok(())
        }
    }
}

async fn load(controller: &TableController) -> Result<(), CliError> {
    let outcome = controller.load().await;
    output::report(controller.notifier());
    match outcome {
        LoadOutcome::Failed(error) => Err(error.into()),
        LoadOutcome::Loaded(_) | LoadOutcome::AlreadyLoaded => Ok(()),
    }
}

fn editor(controller: &TableController, id: &RowId) -> Result<RowEditor, CliError> {
    controller.editor(id).ok_or_else(|| CliError::RowNotFound {
        data_name: DATA_NAME.to_string(),
        id: id.clone(),
    })
}

async fn edit(controller: &TableController, args: EditArgs) -> Result<(), CliError> {
    let schema = controller.config().schema();
    for (key, _) in &args.changes {
        if !schema.field(key).is_some_and(|f| f.is_editable()) {
            return Err(CliError::NotEditable(key.clone()));
        }
    }

    let editor = editor(controller, &args.id)?;
    editor.begin_edit()?;
    for (key, value) in args.changes {
        editor.update_draft(key, value)?;
    }

    let outcome = editor.save().await?;
    output::report(controller.notifier());
    match outcome {
        SaveOutcome::Saved(_) => {
            println!("{}", output::format_table(&controller.render()));
            Ok(())
        }
        SaveOutcome::Invalid(error) | SaveOutcome::Failed(error) => Err(error.into()),
    }
}

async fn delete(controller: &TableController, args: DeleteArgs) -> Result<(), CliError> {
    let editor = editor(controller, &args.id)?;
    let confirm: Box<dyn Confirm> = if args.yes {
        Box::new(AutoConfirm(true))
    } else {
        Box::new(StdinConfirm)
    };

    let outcome = editor.request_delete(confirm.as_ref()).await?;
    output::report(controller.notifier());
    match outcome {
        DeleteOutcome::Deleted => {
            println!("Deleted {} {}", DATA_NAME, args.id);
            Ok(())
        }
        DeleteOutcome::Declined => Ok(()),
        DeleteOutcome::Failed(error) => Err(error.into()),
    }
}
