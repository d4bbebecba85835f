use clap::{Parser, Subcommand};
use sdk_rust::client::{ClientError, ItemRequest, ServiceClient, TaskRequest};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "service-cli")]
#[command(about = "Command-line client for the API and worker services", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8001")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check service health
    Health,
    /// Show worker task counts
    Status,
    /// List submitted tasks
    Tasks,
    /// Submit a task to the worker
    Submit {
        name: String,
        /// JSON object passed as the task payload
        #[arg(short, long)]
        payload: Option<String>,
    },
    /// List items on the API service
    Items,
    /// Create an item on the API service
    CreateItem {
        name: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Dump the Prometheus exposition text
    Metrics,
}

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    let cli = Cli::parse();
    let client = ServiceClient::new(&cli.url);

    match cli.command {
        Commands::Health => print_json(client.health().await?)?,
        Commands::Status => print_json(client.status().await?)?,
        Commands::Tasks => print_json(client.list_tasks().await?)?,
        Commands::Submit { name, payload } => {
            let payload = payload
                .map(|raw| serde_json::from_str::<Value>(&raw))
                .transpose()?;
            print_json(client.submit_task(&TaskRequest { name, payload }).await?)?;
        }
        Commands::Items => print_json(client.list_items().await?)?,
        Commands::CreateItem { name, description } => {
            print_json(client.create_item(&ItemRequest { name, description }).await?)?;
        }
        Commands::Metrics => print!("{}", client.metrics().await?),
    }

    Ok(())
}

fn print_json(value: Value) -> Result<(), ClientError> {
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
