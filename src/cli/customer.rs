//! Customer subcommands, served by [`CustomerRepository`].

use clap::Subcommand;
use color_eyre::eyre::eyre;
use color_eyre::Result;

use crate::models::{Customer, DocumentId};
use crate::repositories::CustomerRepository;

use super::query::filter_arg;
use super::App;

#[derive(Subcommand)]
pub enum CustomerCommand {
    /// Add a customer and print its id
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: Option<String>,
    },

    /// Print one customer as JSON
    Get {
        id: String,
    },

    /// List customers, optionally filtered
    List {
        /// Filter expression, e.g. `email exists`
        #[arg(short, long = "where")]
        filter: Option<String>,
    },

    /// Change a customer's name
    Rename {
        id: String,
        name: String,
    },

    /// Delete a customer
    Delete {
        id: String,
    },
}

impl App {
    pub async fn run_customer(&self, command: &CustomerCommand) -> Result<()> {
        let ctx = self.context().await?;
        let customers = CustomerRepository::new(&ctx);

        match command {
            CustomerCommand::Add { name, email } => {
                let mut customer = Customer::new(name.as_str());
                customer.email = email.clone();
                let id = customers.add(&mut customer).await?;
                tracing::info!(%id, "Added customer '{}'", name);
                println!("{}", id);
            }
            CustomerCommand::Get { id } => {
                let customer = customers.get(&id.parse()?).await?;
                println!("{}", serde_json::to_string_pretty(&customer)?);
            }
            CustomerCommand::List { filter } => {
                let filter = filter_arg(filter.as_deref())?;
                for customer in customers.list_where(filter).await? {
                    println!("{}", serde_json::to_string(&customer)?);
                }
            }
            CustomerCommand::Rename { id, name } => {
                let id: DocumentId = id.parse()?;
                let mut customer = customers.get(&id).await?;
                customer.name = name.clone();
                if customers.update(&customer, &id).await? == 0 {
                    return Err(eyre!("Customer {} was deleted concurrently", id));
                }
                tracing::info!(%id, "Renamed customer to '{}'", name);
            }
            CustomerCommand::Delete { id } => {
                let id: DocumentId = id.parse()?;
                let removed = customers.delete(&id).await?;
                if removed == 0 {
                    tracing::warn!(%id, "No customer with this id");
                }
                println!("{}", removed);
            }
        }
        Ok(())
    }
}
