//! Mise CLI - Database migrations and store administration.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! mise migrate
//!
//! # Create a store and its first director
//! mise store create --name "Main Street" --number 01234
//! mise employee create --store 1 -e gm@example.com -n "Dana Reyes" -r director --password '...'
//!
//! # Reset a forgotten password
//! mise employee password -e gm@example.com --password '...'
//!
//! # Load shift checklists from YAML
//! mise seed checklists --store 1 --file crates/cli/seed/checklists.yaml
//! ```
//!
//! # Environment Variables
//!
//! - `MISE_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use mise_core::{Department, EmployeeRole, StoreId};

mod commands;

#[derive(Parser)]
#[command(name = "mise")]
#[command(author, version, about = "Mise CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage stores
    Store {
        #[command(subcommand)]
        action: StoreAction,
    },
    /// Manage employee accounts
    Employee {
        #[command(subcommand)]
        action: EmployeeAction,
    },
    /// Load data from files
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum StoreAction {
    /// Create a new store
    Create {
        /// Store display name
        #[arg(long)]
        name: String,

        /// Store number (unique)
        #[arg(long)]
        number: String,
    },
}

#[derive(Subcommand)]
enum EmployeeAction {
    /// Create an employee with a password
    Create {
        /// Store ID
        #[arg(long)]
        store: StoreId,

        /// Login email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Role (`team_member`, `leader`, `director`)
        #[arg(short, long, default_value = "team_member")]
        role: EmployeeRole,

        /// Department (`foh`, `boh`, `both`)
        #[arg(short, long, default_value = "both")]
        department: Department,

        /// Job title shown next to the name
        #[arg(long)]
        position: Option<String>,

        /// Initial password
        #[arg(long)]
        password: String,
    },
    /// Set a new password for an employee
    Password {
        /// Login email address
        #[arg(short, long)]
        email: String,

        /// New password
        #[arg(long)]
        password: String,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Replace a store's shift checklists from a YAML file
    Checklists {
        /// Store ID
        #[arg(long)]
        store: StoreId,

        /// Path to the YAML file
        #[arg(short, long, default_value = "crates/cli/seed/checklists.yaml")]
        file: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Store { action } => match action {
            StoreAction::Create { name, number } => {
                commands::store::create(&name, &number).await?;
            }
        },
        Commands::Employee { action } => match action {
            EmployeeAction::Create {
                store,
                email,
                name,
                role,
                department,
                position,
                password,
            } => {
                let employee = commands::employee::EmployeeArgs {
                    email,
                    name,
                    role,
                    department,
                    position,
                };
                commands::employee::create(store, employee, &password).await?;
            }
            EmployeeAction::Password { email, password } => {
                commands::employee::reset_password(&email, &password).await?;
            }
        },
        Commands::Seed { target } => match target {
            SeedTarget::Checklists { store, file } => {
                commands::seed::checklists(store, &file).await?;
            }
        },
    }
    Ok(())
}
