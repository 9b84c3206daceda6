//! Runs against a real database: `DATABASE_URL=... cargo test -p server --features live-db-tests`.

use rust_decimal::Decimal;

use super::*;
use crate::services::token::generate_token;

async fn store() -> PgStore {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for live-db-tests");
    PgStore::new(crate::db::init_pool(&url, 2).await.unwrap())
}

async fn seed_user(store: &PgStore) -> User {
    let email = format!("{}@example.com", &generate_token()[..16]);
    store
        .create_user(NewUser { name: "Live".into(), email, password_hash: "hash".into() })
        .await
        .unwrap()
}

#[tokio::test]
async fn duplicate_email_maps_to_store_error() {
    let store = store().await;
    let user = seed_user(&store).await;

    let err = store
        .create_user(NewUser { name: "Dup".into(), email: user.email.clone(), password_hash: "h".into() })
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::DuplicateEmail));
    store.delete_user(user.id).await.unwrap();
}

#[tokio::test]
async fn token_lookup_stamps_and_respects_expiry() {
    let store = store().await;
    let user = seed_user(&store).await;
    let now = OffsetDateTime::now_utc();
    let live = generate_token();
    let stale = generate_token();
    store
        .insert_token(NewToken { user_id: user.id, token_hash: live.clone(), name: "t".into(), expires_at: None })
        .await
        .unwrap();
    store
        .insert_token(NewToken {
            user_id: user.id,
            token_hash: stale.clone(),
            name: "t".into(),
            expires_at: Some(now - time::Duration::minutes(1)),
        })
        .await
        .unwrap();

    assert_eq!(store.find_token_owner(&live, now).await.unwrap().unwrap().user.id, user.id);
    assert!(store.find_token_owner(&stale, now).await.unwrap().is_none());
    assert_eq!(store.delete_user_tokens(user.id).await.unwrap(), 2);
    store.delete_user(user.id).await.unwrap();
}

#[tokio::test]
async fn ledger_rows_are_scoped_and_cascade() {
    let store = store().await;
    let a = seed_user(&store).await;
    let b = seed_user(&store).await;
    let (sa, sb) = (Scope::for_user(&a), Scope::for_user(&b));

    let cat = store
        .create_category(sa, &CategoryFields { name: "Food".into() })
        .await
        .unwrap();
    let exp = store
        .create_expense(sa, &ExpenseFields { category_id: cat.id, amount: Decimal::new(1250, 2), description: None })
        .await
        .unwrap();

    assert_eq!(exp.amount.to_string(), "12.50");
    assert!(store.find_category(sb, cat.id).await.unwrap().is_none());
    assert!(store.list_expenses(sb, Some(cat.id)).await.unwrap().is_empty());
    assert!(!store.delete_expense(sb, exp.id).await.unwrap());
    assert_eq!(store.list_expenses(sa, Some(cat.id)).await.unwrap().len(), 1);

    assert!(store.delete_category(sa, cat.id).await.unwrap());
    assert!(store.find_expense(sa, exp.id).await.unwrap().is_none());

    store.delete_user(a.id).await.unwrap();
    store.delete_user(b.id).await.unwrap();
}
