//! Content editor extension talking to an in-process simulated host.
//!
//! Usage:
//!   cargo run --example editor-session

use std::sync::Arc;

use frameport::channel::{memory_pair, Timeout};
use frameport::host::{ModelValidator, SimulatedHost};
use frameport::sdk::{init, FixedWindow, InitOptions};
use serde_json::json;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let schema = json!({
        "type": "object",
        "required": ["title"],
        "properties": { "title": { "type": "string", "minLength": 1 } }
    });

    let (client, endpoint) = memory_pair();
    let host = SimulatedHost::new(endpoint, json!({ "category": "CONTENT_EDITOR" }))
        .with_model(json!({ "title": "Draft" }))
        .with_validator(ModelValidator::from_schema(&schema)?);
    let handle = host.handle();
    let server = tokio::spawn(host.run());

    let options = InitOptions::default()
        .with_connection_timeout(Timeout::from_millis(2_000))
        .with_window(Arc::new(FixedWindow(360)));
    let editor = init(client, options)
        .await?
        .into_content_editor()
        .ok_or("host did not report a content editor")?;

    editor.form.on_model_change(|errors, content| {
        println!("model changed: {content} ({} errors)", errors.len());
    });
    editor.form.on_read_only_change(|read_only| {
        println!("read-only: {read_only}");
    });

    println!("current model: {}", editor.form.get_value().await?);
    if let Some(errors) = editor.form.validate(json!({ "title": "" })).await? {
        for error in errors {
            println!("invalid at '{}': {}", error.path, error.message);
        }
    }

    let errors = editor.form.set_value(json!({ "title": "Published" })).await?;
    println!("write accepted with {} errors", errors.len());

    handle.set_read_only(true);
    editor.frame.set_height(None)?;
    println!("host sees height {}", handle.request_height().await?);

    drop(editor);
    let report = server.await?;
    println!(
        "host answered {} requests, final model {}",
        report.requests,
        report.model.unwrap_or_default()
    );
    Ok(())
}
