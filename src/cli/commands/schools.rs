use clap::Subcommand;
use serde_json::json;

use crate::cli::client::ApiClient;
use crate::cli::session::Session;
use crate::cli::utils::{output_success, output_value, parse_fields};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum SchoolCommands {
    #[command(about = "List all schools")]
    List,

    #[command(about = "Show one school")]
    Get {
        #[arg(help = "School ID")]
        id: String,
    },

    #[command(about = "Create a school")]
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        board: String,
        #[arg(long, help = "Administrator contact")]
        admin_contact: String,
        #[arg(long = "set", value_name = "KEY=VALUE", help = "Extra field, repeatable")]
        fields: Vec<String>,
    },

    #[command(about = "Update fields on a school")]
    Update {
        #[arg(help = "School ID")]
        id: String,
        #[arg(long = "set", value_name = "KEY=VALUE", required = true, help = "Field to change, repeatable")]
        fields: Vec<String>,
    },

    #[command(about = "Delete a school")]
    Delete {
        #[arg(help = "School ID")]
        id: String,
    },

    #[command(about = "Total and active school counts")]
    Stats,
}

pub async fn handle(cmd: SchoolCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = ApiClient::from_session(&Session::load()?);

    match cmd {
        SchoolCommands::List => output_value(&output_format, &client.get("/schools").await?),
        SchoolCommands::Get { id } => {
            output_value(&output_format, &client.get(&format!("/schools/{}", id)).await?)
        }
        SchoolCommands::Create { name, board, admin_contact, fields } => {
            let mut body = parse_fields(&fields)?;
            body["name"] = json!(name);
            body["board"] = json!(board);
            body["adminContact"] = json!(admin_contact);

            let school = client.post("/schools", body).await?;
            output_success(
                &output_format,
                &format!("Created school {}", name),
                Some(json!({ "school": school })),
            )
        }
        SchoolCommands::Update { id, fields } => {
            let school = client.put(&format!("/schools/{}", id), parse_fields(&fields)?).await?;
            output_value(&output_format, &school)
        }
        SchoolCommands::Delete { id } => {
            client.delete(&format!("/schools/{}", id)).await?;
            output_success(&output_format, &format!("Deleted school {}", id), None)
        }
        SchoolCommands::Stats => output_value(&output_format, &client.get("/schools/stats").await?),
    }
}
