use std::sync::Arc;

use anyhow::{anyhow, Result};

use crate::state::{AppContext, ToolContent, ToolEntry, ToolFuture, ToolHandler, ToolResponse};

mod get_docs;

pub use get_docs::definition as get_docs_definition;

/// Every tool this crate offers, ready for a host framework to mount.
pub fn tool_entries(context: &AppContext) -> Vec<ToolEntry> {
    let tools = [get_docs::definition(context.lookup.catalog())];

    tools
        .into_iter()
        .map(|(definition, handler)| ToolEntry {
            definition,
            handler,
        })
        .collect()
}

pub(crate) fn text_response(text: String) -> ToolResponse {
    ToolResponse {
        content: vec![ToolContent {
            r#type: "text".to_string(),
            text,
        }],
        metadata: None,
    }
}

pub(crate) fn wrap_handler<F, Fut>(handler: F) -> ToolHandler
where
    F: Fn(Arc<AppContext>, serde_json::Value) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = Result<ToolResponse>> + Send + 'static,
{
    Arc::new(
        move |context: Arc<AppContext>, value: serde_json::Value| -> ToolFuture {
            Box::pin(handler(context, value))
        },
    )
}

pub(crate) fn parse_args<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> Result<T> {
    serde_json::from_value(value).map_err(|error| anyhow!("invalid arguments: {error}"))
}
