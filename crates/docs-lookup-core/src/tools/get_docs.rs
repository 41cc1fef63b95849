use std::sync::Arc;

use anyhow::Result;
use serde::Deserialize;
use serde_json::json;

use crate::{
    catalog::LibraryCatalog,
    state::{AppContext, ToolDefinition, ToolHandler, ToolResponse},
    tools::{parse_args, text_response, wrap_handler},
};

#[derive(Debug, Deserialize)]
struct Args {
    query: String,
    library: String,
}

pub fn definition(catalog: &LibraryCatalog) -> (ToolDefinition, ToolHandler) {
    let libraries: Vec<&str> = catalog.libraries().collect();
    (
        ToolDefinition {
            name: "get_docs".to_string(),
            description: format!(
                "Search the docs for a given query and library and return the text of the top matching pages. Supports {}.",
                libraries.join(", ")
            ),
            input_schema: json!({
                "type": "object",
                "required": ["query", "library"],
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The query to search for (e.g. \"vector store\")."
                    },
                    "library": {
                        "type": "string",
                        "enum": libraries,
                        "description": "The library whose documentation site is searched."
                    }
                }
            }),
        },
        wrap_handler(|context, value| async move {
            let args: Args = parse_args(value)?;
            handle(context, args).await
        }),
    )
}

async fn handle(context: Arc<AppContext>, args: Args) -> Result<ToolResponse> {
    let report = context.lookup.lookup(&args.query, &args.library).await?;

    let metadata = json!({
        "library": report.library,
        "scopedQuery": report.scoped_query,
        "sources": report.sources(),
        "timedOut": report.timed_out(),
    });
    Ok(text_response(report.text()).with_metadata(metadata))
}
