use clap::Subcommand;

use crate::cli::client::ApiClient;
use crate::cli::commands::students::with_query;
use crate::cli::session::Session;
use crate::cli::utils::{output_success, output_value, read_stdin_json};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum DbCommands {
    #[command(about = "List collections")]
    Collections,

    #[command(about = "Select document(s) from a collection")]
    Select {
        #[arg(help = "Collection name")]
        collection: String,
        #[arg(help = "Document ID to retrieve (optional)")]
        id: Option<String>,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long, help = "Free-text search")]
        q: Option<String>,
        #[arg(long = "where", help = "JSON object every document must contain")]
        where_clause: Option<String>,
    },

    #[command(about = "Create a document from stdin")]
    Create {
        #[arg(help = "Collection name")]
        collection: String,
    },

    #[command(about = "Update a document from stdin")]
    Update {
        #[arg(help = "Collection name")]
        collection: String,
        #[arg(help = "Document ID to update")]
        id: String,
    },

    #[command(about = "Delete a document")]
    Delete {
        #[arg(help = "Collection name")]
        collection: String,
        #[arg(help = "Document ID to delete")]
        id: String,
    },
}

pub async fn handle(cmd: DbCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = ApiClient::from_session(&Session::load()?);

    match cmd {
        DbCommands::Collections => {
            let response = client.get("/admin/db/collections").await?;
            output_value(&output_format, &response["collections"])
        }
        DbCommands::Select { collection, id: Some(id), .. } => {
            let document = client.get(&format!("/admin/db/{}/{}", collection, id)).await?;
            output_value(&output_format, &document)
        }
        DbCommands::Select { collection, id: None, page, limit, q, where_clause } => {
            let page = page.map(|p| p.to_string());
            let limit = limit.map(|l| l.to_string());
            let path = with_query(
                &format!("/admin/db/{}", collection),
                &[
                    ("page", page.as_deref()),
                    ("limit", limit.as_deref()),
                    ("q", q.as_deref()),
                    ("where", where_clause.as_deref()),
                ],
            );
            let response = client.get(&path).await?;
            match output_format {
                OutputFormat::Json => output_value(&output_format, &response),
                OutputFormat::Text => {
                    output_value(&output_format, &response["data"])?;
                    println!(
                        "-- page {} of {} documents (limit {})",
                        response["page"], response["total"], response["limit"]
                    );
                    Ok(())
                }
            }
        }
        DbCommands::Create { collection } => {
            let document = client
                .post(&format!("/admin/db/{}", collection), read_stdin_json()?)
                .await?;
            output_value(&output_format, &document)
        }
        DbCommands::Update { collection, id } => {
            let document = client
                .put(&format!("/admin/db/{}/{}", collection, id), read_stdin_json()?)
                .await?;
            output_value(&output_format, &document)
        }
        DbCommands::Delete { collection, id } => {
            client.delete(&format!("/admin/db/{}/{}", collection, id)).await?;
            output_success(&output_format, &format!("Deleted {}/{}", collection, id), None)
        }
    }
}
