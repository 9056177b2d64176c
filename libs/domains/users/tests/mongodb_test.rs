//! MongoDB repository tests
//!
//! These need Docker for the testcontainers MongoDB instance:
//!
//! ```sh
//! cargo test -p domain_users --test mongodb_test -- --ignored
//! ```

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use domain_users::{
    MongoUserRepository, User, UserChanges, UserError, UserFilter, UserRepository, UserService,
};
use serde_json::json;
use test_utils::assertions::assert_some;
use test_utils::{TestDataBuilder, TestMongo};

async fn repository(mongo: &TestMongo, builder: &TestDataBuilder) -> MongoUserRepository {
    let repo = MongoUserRepository::new(&mongo.database(&builder.database_name()));
    repo.init_indexes().await.unwrap();
    repo
}

fn user(builder: &TestDataBuilder, suffix: &str) -> User {
    let at = Utc.with_ymd_and_hms(2024, 6, 15, 9, 30, 0).unwrap();
    User {
        first_name: "amy".into(),
        last_name: "lee".into(),
        birth_date: NaiveDate::from_ymd_opt(1990, 5, 1).unwrap(),
        email: builder.email(suffix),
        password_hash: "$argon2id$stub".into(),
        username: builder.username(suffix),
        created_at: at,
        updated_at: at,
    }
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_insert_find_round_trip() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("mongo_insert_find");
    let repo = repository(&mongo, &builder).await;

    let amy = user(&builder, "amy");
    repo.insert(amy.clone()).await.unwrap();

    let found = repo.find_by_username(&amy.username).await.unwrap();
    assert_eq!(found, Some(amy));
    assert!(repo.find_by_username("ghost").await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_unique_indexes_map_to_duplicate_key() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("mongo_duplicates");
    let repo = repository(&mongo, &builder).await;

    repo.insert(user(&builder, "amy")).await.unwrap();

    let mut same_email = user(&builder, "bob");
    same_email.email = builder.email("amy");
    let result = repo.insert(same_email).await;
    assert!(matches!(result, Err(UserError::DuplicateKey { ref field }) if field == "email"));

    let mut same_username = user(&builder, "amy");
    same_username.email = builder.email("carol");
    let result = repo.insert(same_username).await;
    assert!(matches!(result, Err(UserError::DuplicateKey { ref field }) if field == "username"));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_count_by_birth_date_and_creation_window() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("mongo_count");
    let repo = repository(&mongo, &builder).await;

    let amy = user(&builder, "amy");
    let mut bob = user(&builder, "bob");
    bob.created_at = amy.created_at - Duration::days(40);
    let mut cat = user(&builder, "cat");
    cat.birth_date = NaiveDate::from_ymd_opt(1985, 1, 1).unwrap();

    for u in [amy.clone(), bob, cat] {
        repo.insert(u).await.unwrap();
    }

    assert_eq!(repo.count(UserFilter::born_on(amy.birth_date)).await.unwrap(), 2);

    let from = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    let before = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
    assert_eq!(
        repo.count(UserFilter::created_between(from, before)).await.unwrap(),
        2
    );
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_update_and_delete() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("mongo_update_delete");
    let repo = repository(&mongo, &builder).await;

    let amy = user(&builder, "amy");
    repo.insert(amy.clone()).await.unwrap();

    let later = amy.updated_at + Duration::hours(1);
    let updated = repo
        .update(
            &amy.username,
            UserChanges {
                first_name: Some("amelia".into()),
                last_name: None,
                birth_date: None,
                email: None,
                password_hash: None,
                updated_at: later,
            },
        )
        .await
        .unwrap();
    let updated = assert_some(updated, "update of an existing user");
    assert_eq!(updated.first_name, "amelia");
    assert_eq!(updated.password_hash, amy.password_hash);
    assert_eq!(updated.updated_at, later);

    let removed = assert_some(repo.delete(&amy.username).await.unwrap(), "first delete");
    assert_eq!(removed.first_name, "amelia");
    assert!(repo.delete(&amy.username).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_service_lifecycle_on_mongo() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("mongo_service_lifecycle");
    let service = UserService::new(repository(&mongo, &builder).await);
    let username = builder.username("amy");

    let input = serde_json::from_value(json!({
        "firstName": "Amy",
        "birthDate": "1990-05-01",
        "email": builder.email("amy"),
        "password": "secret123",
        "username": username,
    }))
    .unwrap();
    service.create_user(input).await.unwrap();

    let profile = service.get_user(&username).await.unwrap();
    assert_eq!(profile.full_name, "Amy");
    assert_eq!(profile.same_birth_date_count, 0);
    assert!(profile.new_monthly_users >= 1);

    let body = json!({ "password": "newsecret1" });
    let serde_json::Value::Object(body) = body else {
        unreachable!()
    };
    service.update_user(&username, body).await.unwrap();
    assert!(service.verify_password(&username, "newsecret1").await.unwrap());
    assert!(!service.verify_password(&username, "secret123").await.unwrap());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_database_bootstrap_against_container() {
    let mongo = TestMongo::new().await;
    let config = database::mongodb::MongoConfig::new(mongo.connection_string());

    let client = database::mongodb::connect_from_config(&config).await.unwrap();
    assert!(database::mongodb::check_health(&client).await);
}
