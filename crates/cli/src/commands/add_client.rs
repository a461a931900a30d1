// `lexflow add-client`: add a client record.

use clap::Args;
use lexflow_common::types::{Client, ClientCategory, ClientStatus};

use super::{block_on, emit, given, open_context, today};
use crate::output::OutputFormat;

#[derive(Debug, Args)]
pub struct AddClientArgs {
    /// Full name or company name.
    name: String,
    #[arg(long, default_value = "")]
    email: String,
    #[arg(long, default_value = "")]
    phone: String,
    /// Individual or Corporate.
    #[arg(long, default_value_t = ClientCategory::Individual)]
    category: ClientCategory,
    /// Active or Inactive.
    #[arg(long, default_value_t = ClientStatus::Active)]
    status: ClientStatus,
    /// Defaults to today.
    #[arg(long)]
    last_contact: Option<String>,
    /// Force JSON output.
    #[arg(long)]
    json: bool,
}

pub fn run(args: AddClientArgs) -> anyhow::Result<()> {
    let format = OutputFormat::detect(args.json);
    let result = block_on(add(&args)).and_then(|inner| inner);
    emit(format, result, format_human)
}

async fn add(args: &AddClientArgs) -> anyhow::Result<Client> {
    let context = open_context().await?;
    let added = context.orchestrator().add(new_client(args)).await?;
    context.orchestrator().settle_mirrors().await;
    Ok(added)
}

fn new_client(args: &AddClientArgs) -> Client {
    Client {
        id: String::new(),
        name: args.name.trim().to_string(),
        email: args.email.trim().to_string(),
        phone: args.phone.trim().to_string(),
        category: args.category,
        status: args.status,
        last_contact: given(&args.last_contact).unwrap_or_else(today),
    }
}

fn format_human(client: &Client) -> String {
    format!("Added client {}: {} ({}, {})", client.id, client.name, client.category, client.status)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(name: &str) -> AddClientArgs {
        AddClientArgs {
            name: name.into(),
            email: " meera@example.com ".into(),
            phone: String::new(),
            category: ClientCategory::Corporate,
            status: ClientStatus::Active,
            last_contact: None,
            json: false,
        }
    }

    #[test]
    fn new_client_trims_and_defaults_last_contact() {
        let client = new_client(&args("  Meera Iyer "));
        assert!(client.id.is_empty());
        assert_eq!(client.name, "Meera Iyer");
        assert_eq!(client.email, "meera@example.com");
        assert_eq!(client.last_contact, today());
    }

    #[test]
    fn explicit_last_contact_is_kept() {
        let client = new_client(&AddClientArgs { last_contact: Some("2024-01-02".into()), ..args("Meera") });
        assert_eq!(client.last_contact, "2024-01-02");
    }

    #[test]
    fn human_output_names_the_new_id() {
        let client = Client { id: "1712345678901".into(), ..new_client(&args("Meera Iyer")) };
        assert_eq!(format_human(&client), "Added client 1712345678901: Meera Iyer (Corporate, Active)");
    }
}
