use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use frameport_channel::{memory_pair, ChannelError, Timeout};
use frameport_host::{HostHandle, HostReport, ModelValidator, SimulatedHost};
use frameport_sdk::{
    init, ContentEditorExtension, ErrorReport, Extension, FixedWindow, InitOptions, SdkError,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::cmd::{CategoryArg, SimulateArgs};
use crate::exit::{
    host_error, io_error, json_error, sdk_error, timeout_arg_error, CliError, CliResult, INTERNAL,
    SUCCESS,
};
use crate::output::{print_report, OutputFormat};

const SCHEMA_ID: &str = "https://schemas.3leaps.dev/frameport/cli/v1/simulate-session.schema.json";

#[derive(Debug, Default, Serialize)]
struct FormReport {
    read_only: bool,
    /// Model the extension could read right after init.
    initial_model: Option<Value>,
    /// Host verdict on the candidate (the `--set` value, else the initial model).
    validation: Option<Vec<ErrorReport>>,
    valid: Option<bool>,
    set_errors: Option<Vec<ErrorReport>>,
    set_rejected: Option<Value>,
    model_pushes: usize,
    final_model: Option<Value>,
}

#[derive(Debug, Serialize)]
struct SessionReport {
    schema_id: &'static str,
    category: &'static str,
    height: u32,
    #[serde(flatten)]
    form: Option<FormReport>,
    host: HostReport,
}

pub fn run(args: SimulateArgs, format: OutputFormat) -> CliResult<i32> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(|err| io_error("failed to start runtime", err))?;

    let report = runtime.block_on(session(args))?;
    print_report(&report, format);
    Ok(SUCCESS)
}

async fn session(args: SimulateArgs) -> CliResult<SessionReport> {
    let connection_timeout: Timeout = args
        .connection_timeout
        .parse()
        .map_err(|err| timeout_arg_error("--connection-timeout", err))?;
    let timeout: Timeout = args
        .timeout
        .parse()
        .map_err(|err| timeout_arg_error("--timeout", err))?;

    let context = match &args.context {
        Some(path) => read_json(path)?,
        None => default_context(args.category),
    };
    let candidate = args
        .set
        .as_deref()
        .map(|raw| serde_json::from_str::<Value>(raw).map_err(|err| json_error("--set", err)))
        .transpose()?;

    let (client, endpoint) = memory_pair();
    let mut host = SimulatedHost::new(endpoint, context);
    if let Some(path) = &args.model {
        host = host.with_model(read_json(path)?);
    }
    if args.read_only {
        host = host.with_read_only(true);
    }
    if let Some(path) = &args.schema {
        let validator =
            ModelValidator::from_file(path).map_err(|err| host_error("--schema", err))?;
        host = host.with_validator(validator);
    }
    if args.refuse_connection {
        host = host.refuse_connection();
    }
    let handle = host.handle();
    let server = tokio::spawn(host.run());

    let options = InitOptions::default()
        .with_window(Arc::new(FixedWindow(args.body_height)))
        .with_connection_timeout(connection_timeout)
        .with_timeout(timeout)
        .with_debug(args.debug);

    // Each early return drops the extension, which ends the host loop.
    let outcome = match init(client, options).await {
        Ok(extension) => drive(extension, &handle, candidate, args.height).await,
        Err(err) => Err(sdk_error("init", err)),
    };

    let host_report = server
        .await
        .map_err(|err| CliError::new(INTERNAL, format!("host task failed: {err}")))?;
    let (category, height, form) = outcome?;

    Ok(SessionReport {
        schema_id: SCHEMA_ID,
        category,
        height,
        form,
        host: host_report,
    })
}

async fn drive(
    extension: Extension,
    handle: &HostHandle,
    candidate: Option<Value>,
    height: Option<f64>,
) -> CliResult<(&'static str, u32, Option<FormReport>)> {
    let category = extension.category().as_str();
    info!(category, "extension initialized");

    let form = match &extension {
        Extension::ContentEditor(editor) => Some(exercise_form(editor, candidate).await?),
        Extension::Dashboard(_) => None,
    };

    let frame = extension.frame();
    frame
        .set_height(height)
        .map_err(|err| sdk_error("set_height", err))?;
    frame.start_auto_resizer();
    let reported = handle
        .request_height()
        .await
        .map_err(|err| host_error("height", err))?;
    frame.stop_auto_resizer();

    Ok((category, reported, form))
}

async fn exercise_form(
    editor: &ContentEditorExtension,
    candidate: Option<Value>,
) -> CliResult<FormReport> {
    let form = &editor.form;
    let pushes = Arc::new(Mutex::new(0usize));
    let counter = Arc::clone(&pushes);
    form.on_model_change(move |errors, _| {
        debug!(errors = errors.len(), "model change");
        *counter.lock().unwrap_or_else(PoisonError::into_inner) += 1;
    })
    .on_read_only_change(|read_only| info!(read_only, "read-only changed"));

    let mut report = FormReport {
        read_only: form.read_only(),
        initial_model: current_model(editor).await?,
        ..FormReport::default()
    };

    if let Some(probe) = candidate.clone().or_else(|| report.initial_model.clone()) {
        report.validation = Some(
            form.validate(probe.clone())
                .await
                .map_err(|err| sdk_error("validate", err))?
                .unwrap_or_default(),
        );
        report.valid = Some(
            form.is_valid(probe)
                .await
                .map_err(|err| sdk_error("is_valid", err))?,
        );
    }

    if let Some(value) = candidate {
        match form.set_value(value).await {
            Ok(errors) => report.set_errors = Some(errors),
            Err(SdkError::Channel(ChannelError::Rejected(reason))) => {
                info!(%reason, "host rejected the write");
                report.set_rejected = Some(reason);
            }
            Err(err) => return Err(sdk_error("set_value", err)),
        }
    }

    report.model_pushes = *pushes.lock().unwrap_or_else(PoisonError::into_inner);
    report.final_model = current_model(editor).await?;
    Ok(report)
}

async fn current_model(editor: &ContentEditorExtension) -> CliResult<Option<Value>> {
    match editor.form.get_value().await {
        Ok(model) => Ok(Some(model)),
        Err(SdkError::NoModel) => Ok(None),
        Err(err) => Err(sdk_error("get_value", err)),
    }
}

fn default_context(category: CategoryArg) -> Value {
    let category = match category {
        CategoryArg::ContentEditor => "CONTENT_EDITOR",
        CategoryArg::Dashboard => "DASHBOARD",
    };
    json!({
        "category": category,
        "readOnly": false,
        "params": { "installation": {}, "instance": {} }
    })
}

fn read_json(path: &Path) -> CliResult<Value> {
    let context = path.display().to_string();
    let raw = std::fs::read_to_string(path).map_err(|err| io_error(&context, err))?;
    serde_json::from_str(&raw).map_err(|err| json_error(&context, err))
}
