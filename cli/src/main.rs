//! `spendy` command line client.
//!
//! SYSTEM CONTEXT
//! ==============
//! Drives the same `client` stack a browser host would: a session persisted
//! to a JSON file, the route guard, and the HTTP interceptor. Each command
//! first navigates to the view it belongs to, so a signed-out user is sent
//! to Login before any request leaves the machine.
//!
//! ERROR HANDLING
//! ==============
//! Request failures have already been printed as notices by the interceptor,
//! so `main` only exits non-zero for them. Everything else, including a
//! client that could not be built, is printed once.

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use client::notify::Notifier;
use client::storage::FileStorage;
use client::{ApiError, ClientConfig, Navigator, Route, Spendy};
use models::{
    CategoryRequest, Decimal, ExpenseRequest, IncomeRequest, LoginRequest, PasswordRequest, ProfileRequest,
    RegisterRequest,
};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("sign in first: `spendy login --email <EMAIL>`")]
    SignInRequired,
    #[error("already signed in; run `spendy logout` first")]
    AlreadySignedIn,
    #[error("cannot open {target}: redirected to {landed}")]
    Redirected { target: Route, landed: Route },
    #[error("invalid JSON output: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "spendy", about = "Spendy personal finance CLI")]
struct Cli {
    #[arg(long, env = "SPENDY_BASE_URL", default_value = client::http::DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, env = "SPENDY_SESSION_FILE", default_value = ".spendy/session.json")]
    session_file: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "SPENDY_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "SPENDY_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// Change name and email.
    Profile {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
    /// Change password.
    Password {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
    },
    DeleteAccount,
    Categories(CategoryCommand),
    Expenses(ExpenseCommand),
    Incomes(IncomeCommand),
}

#[derive(Args, Debug)]
struct CategoryCommand {
    #[command(subcommand)]
    command: CategorySubcommand,
}

#[derive(Subcommand, Debug)]
enum CategorySubcommand {
    List,
    Create {
        #[arg(long)]
        name: String,
    },
    Update {
        id: i64,
        #[arg(long)]
        name: String,
    },
    Delete {
        id: i64,
    },
    /// List the expenses filed under one category.
    Expenses {
        id: i64,
    },
}

#[derive(Args, Debug)]
struct ExpenseCommand {
    #[command(subcommand)]
    command: ExpenseSubcommand,
}

#[derive(Subcommand, Debug)]
enum ExpenseSubcommand {
    List {
        #[arg(long)]
        category_id: Option<i64>,
    },
    Create(ExpenseFields),
    Update {
        id: i64,
        #[command(flatten)]
        fields: ExpenseFields,
    },
    Delete {
        id: i64,
    },
}

#[derive(Args, Debug)]
struct ExpenseFields {
    #[arg(long)]
    category_id: i64,
    #[arg(long)]
    amount: Decimal,
    #[arg(long)]
    description: Option<String>,
}

impl From<ExpenseFields> for ExpenseRequest {
    fn from(fields: ExpenseFields) -> Self {
        Self { category_id: fields.category_id, amount: fields.amount, description: fields.description }
    }
}

#[derive(Args, Debug)]
struct IncomeCommand {
    #[command(subcommand)]
    command: IncomeSubcommand,
}

#[derive(Subcommand, Debug)]
enum IncomeSubcommand {
    List,
    Create(IncomeFields),
    Update {
        id: i64,
        #[command(flatten)]
        fields: IncomeFields,
    },
    Delete {
        id: i64,
    },
}

#[derive(Args, Debug)]
struct IncomeFields {
    #[arg(long)]
    source: String,
    #[arg(long)]
    amount: Decimal,
    #[arg(long)]
    description: Option<String>,
}

impl From<IncomeFields> for IncomeRequest {
    fn from(fields: IncomeFields) -> Self {
        Self { source: fields.source, amount: fields.amount, description: fields.description }
    }
}

/// Prints interceptor notices for the person at the terminal.
struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, message: &str) {
        eprintln!("{message}");
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        // Request errors were already printed by the notifier.
        Err(CliError::Api(e)) if !matches!(e, ApiError::Build(_)) => {
            tracing::debug!(error = %e, "api call failed");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = ClientConfig { base_url: cli.base_url, ..ClientConfig::default() };
    let storage = Arc::new(FileStorage::new(cli.session_file));
    let app = Spendy::new(&config, storage, Arc::new(StderrNotifier))?;

    open(&app.router, route_for(&cli.command))?;
    match cli.command {
        Command::Register { name, email, password } => {
            print_json(&app.api.register(&RegisterRequest { name, email, password }).await?)
        }
        Command::Login { email, password } => print_json(&app.api.login(&LoginRequest { email, password }).await?),
        Command::Logout => print_json(&app.api.logout().await?),
        Command::Whoami => print_json(&app.api.me().await?),
        Command::Profile { name, email } => {
            print_json(&app.api.update_profile(&ProfileRequest { name, email }).await?)
        }
        Command::Password { current, new } => {
            let req = PasswordRequest { current_password: current, new_password: new };
            print_json(&app.api.update_password(&req).await?)
        }
        Command::DeleteAccount => print_json(&app.api.delete_account().await?),
        Command::Categories(categories) => run_categories(&app, categories).await,
        Command::Expenses(expenses) => run_expenses(&app, expenses).await,
        Command::Incomes(incomes) => run_incomes(&app, incomes).await,
    }
}

async fn run_categories(app: &Spendy, categories: CategoryCommand) -> Result<(), CliError> {
    match categories.command {
        CategorySubcommand::List => print_json(&app.api.list_categories().await?),
        CategorySubcommand::Create { name } => print_json(&app.api.create_category(&CategoryRequest { name }).await?),
        CategorySubcommand::Update { id, name } => {
            print_json(&app.api.update_category(id, &CategoryRequest { name }).await?)
        }
        CategorySubcommand::Delete { id } => print_json(&app.api.delete_category(id).await?),
        CategorySubcommand::Expenses { id } => print_json(&app.api.category_expenses(id).await?),
    }
}

async fn run_expenses(app: &Spendy, expenses: ExpenseCommand) -> Result<(), CliError> {
    match expenses.command {
        ExpenseSubcommand::List { category_id } => print_json(&app.api.list_expenses(category_id).await?),
        ExpenseSubcommand::Create(fields) => print_json(&app.api.create_expense(&fields.into()).await?),
        ExpenseSubcommand::Update { id, fields } => print_json(&app.api.update_expense(id, &fields.into()).await?),
        ExpenseSubcommand::Delete { id } => print_json(&app.api.delete_expense(id).await?),
    }
}

async fn run_incomes(app: &Spendy, incomes: IncomeCommand) -> Result<(), CliError> {
    match incomes.command {
        IncomeSubcommand::List => print_json(&app.api.list_incomes().await?),
        IncomeSubcommand::Create(fields) => print_json(&app.api.create_income(&fields.into()).await?),
        IncomeSubcommand::Update { id, fields } => print_json(&app.api.update_income(id, &fields.into()).await?),
        IncomeSubcommand::Delete { id } => print_json(&app.api.delete_income(id).await?),
    }
}

// =============================================================================
// NAVIGATION
// =============================================================================

/// The view a command belongs to. Account commands live on Home, which is
/// public; the server still rejects them without a token.
fn route_for(command: &Command) -> Route {
    match command {
        Command::Register { .. } => Route::Register,
        Command::Login { .. } => Route::Login,
        Command::Logout
        | Command::Whoami
        | Command::Profile { .. }
        | Command::Password { .. }
        | Command::DeleteAccount => Route::Home,
        Command::Categories(CategoryCommand { command: CategorySubcommand::Expenses { id } }) => {
            Route::CategoryExpenses(*id)
        }
        Command::Categories(_) => Route::Categories,
        Command::Expenses(_) => Route::Expense,
        Command::Incomes(_) => Route::Income,
    }
}

/// Navigate to `target` and fail if a guard redirected elsewhere.
fn open(navigator: &dyn Navigator, target: Route) -> Result<(), CliError> {
    let landed = navigator.navigate(target.clone());
    if landed == target {
        return Ok(());
    }
    Err(match landed {
        Route::Login => CliError::SignInRequired,
        Route::Home => CliError::AlreadySignedIn,
        landed => CliError::Redirected { target, landed },
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
