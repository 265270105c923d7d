//! Command-line front end. Each command plays the part of one dashboard page.

use std::path::PathBuf;

use chrono::{DateTime, SecondsFormat, Utc};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::auth::{GuardDecision, LoginError};
use crate::client::DispatchError;
use crate::models::{CategoryPatch, NewCategory, NewUser, StockStatus, UserRole, UserStatus};
use crate::navigation::Route;
use crate::services::{ListQuery, ProductQuery, SortOrder, SortState, UserQuery};
use crate::state::AppState;
use crate::store::StoreError;

#[derive(Parser, Debug)]
#[command(name = "nexus-admin")]
#[command(about = "Command-line client for the Nexus admin dashboard API")]
#[command(version)]
pub struct Cli {
    /// Configuration file
    #[arg(
        short,
        long,
        global = true,
        default_value = "./config.yaml",
        env = "NEXUS_ADMIN_CONFIG"
    )]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "NEXUS_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out and clear the stored session
    Logout,

    /// Show the signed-in user as reported by the backend
    Whoami,

    /// Show the local session and whether a route would be rendered
    Status {
        /// Dashboard route to check
        #[arg(long, default_value = "/")]
        route: String,
    },

    /// Manage admin users
    Users {
        #[command(subcommand)]
        command: UsersCommand,
    },

    /// Browse the product catalogue
    Products {
        #[command(subcommand)]
        command: ProductsCommand,
    },

    /// Manage product categories
    Categories {
        #[command(subcommand)]
        command: CategoriesCommand,
    },

    /// Print the JSON schema of the configuration file
    Schema,
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    #[arg(long, default_value_t = crate::services::DEFAULT_PAGE)]
    pub page: u32,
    #[arg(long, default_value_t = crate::services::DEFAULT_LIMIT)]
    pub limit: u32,
    #[arg(long)]
    pub search: Option<String>,
    /// Column to sort by
    #[arg(long)]
    pub sort_by: Option<String>,
    /// ASC or DESC; ascending when only --sort-by is given
    #[arg(long, requires = "sort_by")]
    pub sort_order: Option<SortOrder>,
}

impl ListArgs {
    pub fn to_query(&self) -> ListQuery {
        let sort = match &self.sort_by {
            Some(field) => {
                SortState::by(field.clone(), self.sort_order.unwrap_or(SortOrder::Asc))
            }
            None => SortState::default(),
        };
        ListQuery::page(self.page, self.limit)
            .with_search(self.search.clone())
            .with_sort(sort)
    }
}

#[derive(Subcommand, Debug)]
pub enum UsersCommand {
    List {
        #[command(flatten)]
        list: ListArgs,
        /// SUPER_ADMIN or ADMIN
        #[arg(long, value_parser = parse_wire::<UserRole>)]
        role: Option<UserRole>,
        /// ACTIVE or INACTIVE
        #[arg(long, value_parser = parse_wire::<UserStatus>)]
        status: Option<UserStatus>,
    },
    Create {
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "NEXUS_ADMIN_NEW_USER_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, value_parser = parse_wire::<UserRole>, default_value = "ADMIN")]
        role: UserRole,
        #[arg(long, value_parser = parse_wire::<UserStatus>, default_value = "ACTIVE")]
        status: UserStatus,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProductsCommand {
    List {
        #[command(flatten)]
        list: ListArgs,
        /// Category id; repeat to filter by several
        #[arg(long = "category")]
        categories: Vec<String>,
        /// IN_STOCK, LOW_STOCK or OUT_OF_STOCK
        #[arg(long, value_parser = parse_wire::<StockStatus>)]
        status: Option<StockStatus>,
        /// Only discounted products
        #[arg(long)]
        promotion: bool,
        #[arg(long)]
        min_price: Option<f64>,
        #[arg(long)]
        max_price: Option<f64>,
    },
    Get {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum CategoriesCommand {
    List {
        #[command(flatten)]
        list: ListArgs,
    },
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        id: String,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Login(#[from] LoginError),

    #[error("session expired, please log in again ({})", .0.api_error())]
    SessionExpired(DispatchError),

    #[error(transparent)]
    Request(DispatchError),

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error("failed to render output: {0}")]
    Output(#[from] serde_json::Error),

    #[error("not signed in; run `nexus-admin login` first")]
    NotSignedIn,

    #[error("{0}")]
    Usage(String),
}

impl From<DispatchError> for CliError {
    fn from(e: DispatchError) -> Self {
        if e.is_session_expired() {
            CliError::SessionExpired(e)
        } else {
            CliError::Request(e)
        }
    }
}

/// Parses a wire enum value, accepting `-`, `_` or space between words in any case.
pub fn parse_wire<T: DeserializeOwned>(raw: &str) -> Result<T, String> {
    let upper = raw.trim().to_ascii_uppercase();
    let candidates = [
        upper.clone(),
        upper.replace(['-', ' '], "_"),
        upper.replace(['-', '_'], " "),
    ];
    candidates
        .into_iter()
        .find_map(|c| serde_json::from_value(Value::String(c)).ok())
        .ok_or_else(|| format!("invalid value '{}'", raw))
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn format_epoch_ms(ms: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// Renders a route the way the dashboard would: redirect away from it when
/// there is no session.
fn open(state: &AppState, route: Route) -> Result<(), CliError> {
    if state.guard.enforce(&route, state.navigator.as_ref()) {
        Ok(())
    } else {
        Err(CliError::NotSignedIn)
    }
}

/// Runs one command against the shared state. `Schema` needs no state and is
/// handled by the binary.
pub async fn run(command: Command, state: &AppState) -> Result<(), CliError> {
    match command {
        Command::Login { email, password } => {
            let user = state.session.login(&email, &password).await?;
            print_json(&user)
        }
        Command::Logout => {
            state.session.logout().await?;
            println!("Logged out");
            Ok(())
        }
        Command::Whoami => {
            open(state, Route::Dashboard)?;
            let user = state.session.current_user().await?;
            print_json(&user)
        }
        Command::Status { route } => {
            let route = Route::from_path(&route);
            let decision = match state.guard.check(&route) {
                GuardDecision::Allow => "allow".to_string(),
                GuardDecision::Redirect(target) => format!("redirect to {}", target),
            };
            let expires_at = state.store.expires_at();
            print_json(&json!({
                "route": route.path(),
                "decision": decision,
                "signedIn": state.guard.has_session(),
                "user": state.store.profile().map(|p| p.email),
                "expiresAt": expires_at.and_then(format_epoch_ms),
                "expired": expires_at.is_some() && state.store.is_expired(0),
                "storage": state.store.backend_name(),
            }))
        }
        Command::Users { command } => {
            open(state, Route::Users)?;
            run_users(command, state).await
        }
        Command::Products { command } => {
            open(state, Route::Products)?;
            run_products(command, state).await
        }
        Command::Categories { command } => {
            open(state, Route::Categories)?;
            run_categories(command, state).await
        }
        Command::Schema => Err(CliError::Usage(
            "schema is printed without loading a session".to_string(),
        )),
    }
}

async fn run_users(command: UsersCommand, state: &AppState) -> Result<(), CliError> {
    match command {
        UsersCommand::List { list, role, status } => {
            let query = UserQuery {
                list: list.to_query(),
                role,
                status,
            };
            print_json(&state.users.list(&query).await?)
        }
        UsersCommand::Create {
            full_name,
            email,
            password,
            role,
            status,
        } => {
            let user = NewUser {
                full_name,
                email,
                password,
                role,
                status,
            };
            print_json(&state.users.create(&user).await?)
        }
        UsersCommand::Delete { id } => {
            state.users.delete(&id).await?;
            println!("Deleted user {}", id);
            Ok(())
        }
    }
}

async fn run_products(command: ProductsCommand, state: &AppState) -> Result<(), CliError> {
    match command {
        ProductsCommand::List {
            list,
            categories,
            status,
            promotion,
            min_price,
            max_price,
        } => {
            if let (Some(min), Some(max)) = (min_price, max_price) {
                if min > max {
                    return Err(CliError::Usage(format!(
                        "--min-price {} is above --max-price {}",
                        min, max
                    )));
                }
            }
            let query = ProductQuery {
                list: list.to_query(),
                categories,
                status,
                promotion: promotion.then_some(true),
                min_price,
                max_price,
            };
            print_json(&state.products.list(&query).await?)
        }
        ProductsCommand::Get { id } => print_json(&state.products.get(&id).await?),
    }
}

async fn run_categories(command: CategoriesCommand, state: &AppState) -> Result<(), CliError> {
    match command {
        CategoriesCommand::List { list } => {
            print_json(&state.categories.list(&list.to_query()).await?)
        }
        CategoriesCommand::Create { name, description } => {
            let category = NewCategory { name, description };
            print_json(&state.categories.create(&category).await?)
        }
        CategoriesCommand::Update {
            id,
            name,
            description,
        } => {
            if name.is_none() && description.is_none() {
                return Err(CliError::Usage(
                    "nothing to update; pass --name and/or --description".to_string(),
                ));
            }
            let patch = CategoryPatch { name, description };
            print_json(&state.categories.update(&id, &patch).await?)
        }
        CategoriesCommand::Delete { id } => {
            state.categories.delete(&id).await?;
            println!("Deleted category {}", id);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wire_is_lenient() {
        assert_eq!(parse_wire::<UserRole>("super-admin"), Ok(UserRole::SuperAdmin));
        assert_eq!(parse_wire::<UserStatus>("inactive"), Ok(UserStatus::Inactive));
        assert_eq!(parse_wire::<StockStatus>("low_stock"), Ok(StockStatus::LowStock));
        assert_eq!(parse_wire::<StockStatus>("OUT OF STOCK"), Ok(StockStatus::OutOfStock));
        assert!(parse_wire::<UserRole>("owner").is_err());
    }

    #[test]
    fn test_list_args_default_to_ascending() {
        let cli = Cli::try_parse_from([
            "nexus-admin",
            "users",
            "list",
            "--sort-by",
            "fullName",
            "--role",
            "admin",
        ])
        .unwrap();
        let Command::Users {
            command: UsersCommand::List { list, role, .. },
        } = cli.command
        else {
            panic!("expected users list");
        };
        let query = list.to_query();
        assert_eq!(query.pagination.page, 1);
        assert_eq!(query.pagination.limit, 10);
        assert_eq!(query.sort, SortState::by("fullName", SortOrder::Asc));
        assert_eq!(role, Some(UserRole::Admin));
    }

    #[test]
    fn test_sort_order_requires_sort_by() {
        let parsed =
            Cli::try_parse_from(["nexus-admin", "categories", "list", "--sort-order", "DESC"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
