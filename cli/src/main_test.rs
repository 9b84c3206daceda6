use clap::CommandFactory;
use client::{Router, SessionStore};
use models::User;
use serde_json::json;

use super::*;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("spendy").chain(args.iter().copied())).unwrap()
}

fn signed_in() -> SessionStore {
    let session = SessionStore::in_memory();
    let user: User = serde_json::from_value(json!({
        "id": 1, "name": "Ann", "email": "ann@example.com",
        "created_at": "2024-05-01T12:00:00Z", "updated_at": "2024-05-01T12:00:00Z",
    }))
    .unwrap();
    session.set_user(user, "tok".into());
    session
}

#[test]
fn command_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn parses_expense_create_with_decimal_amount() {
    let cli = parse(&["expenses", "create", "--category-id", "2", "--amount", "12.50", "--description", "Lunch"]);
    let Command::Expenses(ExpenseCommand { command: ExpenseSubcommand::Create(fields) }) = cli.command else {
        panic!("expected expenses create");
    };
    let req = ExpenseRequest::from(fields);
    assert_eq!(req.category_id, 2);
    assert_eq!(req.amount, Decimal::new(1250, 2));
    assert_eq!(req.description.as_deref(), Some("Lunch"));
}

#[test]
fn rejects_non_numeric_amount() {
    let args = ["spendy", "incomes", "create", "--source", "Salary", "--amount", "lots"];
    assert!(Cli::try_parse_from(args).is_err());
}

#[test]
fn expense_list_filter_is_optional() {
    let cli = parse(&["expenses", "list"]);
    assert!(matches!(
        cli.command,
        Command::Expenses(ExpenseCommand { command: ExpenseSubcommand::List { category_id: None } })
    ));

    let cli = parse(&["expenses", "list", "--category-id", "4"]);
    assert!(matches!(
        cli.command,
        Command::Expenses(ExpenseCommand { command: ExpenseSubcommand::List { category_id: Some(4) } })
    ));
}

#[test]
fn base_url_defaults_to_local_server() {
    let cli = parse(&["whoami"]);
    assert_eq!(cli.base_url, client::http::DEFAULT_BASE_URL);
    assert_eq!(cli.session_file, ".spendy/session.json");
}

#[test]
fn commands_map_to_their_views() {
    assert_eq!(route_for(&parse(&["login", "--email", "a@b.com", "--password", "x"]).command), Route::Login);
    assert_eq!(route_for(&parse(&["whoami"]).command), Route::Home);
    assert_eq!(route_for(&parse(&["categories", "list"]).command), Route::Categories);
    assert_eq!(route_for(&parse(&["categories", "expenses", "7"]).command), Route::CategoryExpenses(7));
    assert_eq!(route_for(&parse(&["incomes", "delete", "3"]).command), Route::Income);
    assert_eq!(route_for(&parse(&["expenses", "delete", "3"]).command), Route::Expense);
}

#[test]
fn protected_view_requires_sign_in() {
    let router = Router::new(SessionStore::in_memory());
    let err = open(&router, Route::Categories).unwrap_err();
    assert!(matches!(err, CliError::SignInRequired));
    assert_eq!(router.current(), Route::Login);
}

#[test]
fn guest_view_refuses_signed_in_user() {
    let router = Router::new(signed_in());
    let err = open(&router, Route::Register).unwrap_err();
    assert!(matches!(err, CliError::AlreadySignedIn));
}

#[test]
fn allowed_navigation_commits() {
    let router = Router::new(signed_in());
    open(&router, Route::CategoryExpenses(5)).unwrap();
    assert_eq!(router.current(), Route::CategoryExpenses(5));
}
