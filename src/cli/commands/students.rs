use clap::Subcommand;
use serde_json::json;

use crate::cli::client::ApiClient;
use crate::cli::session::Session;
use crate::cli::utils::{output_success, output_value, parse_fields};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum StudentCommands {
    #[command(about = "List students")]
    List {
        #[arg(long, help = "Only students of this school")]
        school_id: Option<String>,
        #[arg(long, help = "Only students of this class")]
        class: Option<String>,
    },

    #[command(about = "Show one student")]
    Get {
        #[arg(help = "Student ID")]
        id: String,
        #[arg(long, help = "Show only the performance block")]
        performance: bool,
    },

    #[command(about = "Create a student")]
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        class: String,
        #[arg(long)]
        school_id: String,
        #[arg(long = "set", value_name = "KEY=VALUE", help = "Extra field, repeatable")]
        fields: Vec<String>,
    },

    #[command(about = "Update fields on a student")]
    Update {
        #[arg(help = "Student ID")]
        id: String,
        #[arg(long = "set", value_name = "KEY=VALUE", required = true, help = "Field to change, repeatable")]
        fields: Vec<String>,
    },

    #[command(about = "Delete a student")]
    Delete {
        #[arg(help = "Student ID")]
        id: String,
    },

    #[command(about = "Totals across all students")]
    Overview,

    #[command(about = "Top students by XP, accuracy or lessons")]
    Top {
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        school_id: Option<String>,
        #[arg(long)]
        class: Option<String>,
        #[arg(long, help = "xpPoints, accuracyPercentage or lessonsCompleted")]
        sort_by: Option<String>,
    },
}

pub async fn handle(cmd: StudentCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = ApiClient::from_session(&Session::load()?);

    match cmd {
        StudentCommands::List { school_id, class } => {
            let path = with_query(
                "/students",
                &[("schoolId", school_id.as_deref()), ("class", class.as_deref())],
            );
            output_value(&output_format, &client.get(&path).await?)
        }
        StudentCommands::Get { id, performance } => {
            let path = if performance {
                format!("/students/{}/performance", id)
            } else {
                format!("/students/{}", id)
            };
            output_value(&output_format, &client.get(&path).await?)
        }
        StudentCommands::Create { name, class, school_id, fields } => {
            let mut body = parse_fields(&fields)?;
            body["name"] = json!(name);
            body["class"] = json!(class);
            body["schoolId"] = json!(school_id);

            let student = client.post("/students", body).await?;
            output_success(
                &output_format,
                &format!("Created student {}", name),
                Some(json!({ "student": student })),
            )
        }
        StudentCommands::Update { id, fields } => {
            let student = client.put(&format!("/students/{}", id), parse_fields(&fields)?).await?;
            output_value(&output_format, &student)
        }
        StudentCommands::Delete { id } => {
            client.delete(&format!("/students/{}", id)).await?;
            output_success(&output_format, &format!("Deleted student {}", id), None)
        }
        StudentCommands::Overview => {
            output_value(&output_format, &client.get("/students/stats/overview").await?)
        }
        StudentCommands::Top { limit, school_id, class, sort_by } => {
            let limit = limit.map(|l| l.to_string());
            let path = with_query(
                "/leaderboard/students/top",
                &[
                    ("limit", limit.as_deref()),
                    ("schoolId", school_id.as_deref()),
                    ("class", class.as_deref()),
                    ("sortBy", sort_by.as_deref()),
                ],
            );
            output_value(&output_format, &client.get(&path).await?)
        }
    }
}

/// Appends the set parameters as an encoded query string.
pub fn with_query(path: &str, params: &[(&str, Option<&str>)]) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    let mut any = false;
    for (key, value) in params {
        if let Some(value) = value {
            serializer.append_pair(key, value);
            any = true;
        }
    }
    if any {
        format!("{}?{}", path, serializer.finish())
    } else {
        path.to_string()
    }
}
