use super::*;
use crate::testing::RecordingClient;
use crate::value::Value;

fn new_user() -> NewUser {
    NewUser {
        email: "kim@example.com".into(),
        password_hash: "$2a$10$hash".into(),
        name: "Kim".into(),
        phone: None,
        address: None,
        address_detail: None,
    }
}

fn emails(list: &[&str]) -> Vec<String> {
    list.iter().map(|e| e.to_string()).collect()
}

#[tokio::test]
async fn list_users_reads_admin_columns() {
    let client = RecordingClient::new().with_rows(vec![
        Record::new().set("email", "a@example.com"),
        Record::new().set("email", "b@example.com"),
    ]);

    let rows = UserRepo::new(&client).list_users().await.unwrap();

    assert_eq!(rows.len(), 2);
    let (sql, params) = &client.calls()[0];
    assert_eq!(
        sql,
        "SELECT email, user_name, date_of_joining, auth_code, is_deleted FROM \"user\""
    );
    assert!(params.is_empty());
}

#[tokio::test]
async fn email_exists_checks_one_column() {
    let client = RecordingClient::new()
        .with_rows(vec![Record::new().set("email", "kim@example.com")])
        .with_rows(vec![]);
    let repo = UserRepo::new(&client);

    assert!(repo.email_exists(" kim@example.com ").await.unwrap());
    assert!(!repo.email_exists("lee@example.com").await.unwrap());

    let calls = client.calls();
    assert_eq!(calls[0].0, "SELECT email FROM \"user\" WHERE email = ?");
    assert_eq!(calls[0].1, vec![Value::from("kim@example.com")]);
    assert_eq!(calls[1].1, vec![Value::from("lee@example.com")]);
}

#[tokio::test]
async fn blank_email_is_rejected_before_querying() {
    let client = RecordingClient::new();
    let repo = UserRepo::new(&client);

    assert!(matches!(repo.email_exists("  ").await, Err(OrmError::Validation(_))));
    assert!(matches!(repo.find_user("").await, Err(OrmError::Validation(_))));
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn find_user_returns_first_row() {
    let client = RecordingClient::new()
        .with_rows(vec![Record::new().set("email", "kim@example.com").set("password", "h")])
        .with_rows(vec![]);
    let repo = UserRepo::new(&client);

    let user = repo.find_user("kim@example.com").await.unwrap().unwrap();
    assert_eq!(user.get("password"), Some(&Value::from("h")));
    assert!(repo.find_user("nobody@example.com").await.unwrap().is_none());
    assert_eq!(client.statements()[0], "SELECT * FROM \"user\" WHERE email = ?");
}

#[tokio::test]
async fn register_creates_regular_member() {
    let client = RecordingClient::new().with_affected(1);

    UserRepo::new(&client).register(new_user()).await.unwrap();

    let (sql, params) = &client.calls()[0];
    assert_eq!(
        sql,
        "INSERT INTO \"user\" (email, password, user_name, date_of_joining, auth_code, is_deleted) VALUES (?, ?, ?, ?, ?, ?)"
    );
    assert_eq!(params[0], Value::from("kim@example.com"));
    assert_eq!(params[1], Value::from("$2a$10$hash"));
    assert!(matches!(params[3], Value::Timestamp(_)));
    assert_eq!(params[4], Value::from(MEMBER_AUTH));
    assert_eq!(params[5], Value::Bool(false));
}

#[tokio::test]
async fn register_keeps_optional_contact_fields() {
    let client = RecordingClient::new().with_affected(1);
    let user = NewUser {
        phone: Some("010-1234-5678".into()),
        address_detail: Some("101".into()),
        ..new_user()
    };

    UserRepo::new(&client).register(user).await.unwrap();

    let (sql, params) = &client.calls()[0];
    assert!(sql.starts_with(
        "INSERT INTO \"user\" (email, password, user_name, tel_number, address_detail, date_of_joining,"
    ));
    assert_eq!(params[3], Value::from("010-1234-5678"));
    assert_eq!(params[4], Value::from("101"));
}

#[tokio::test]
async fn register_requires_credentials() {
    let client = RecordingClient::new();
    let repo = UserRepo::new(&client);

    for user in [
        NewUser { email: " ".into(), ..new_user() },
        NewUser { password_hash: String::new(), ..new_user() },
        NewUser { name: String::new(), ..new_user() },
    ] {
        let err = repo.register(user).await.unwrap_err();
        assert!(matches!(err, OrmError::Validation(_)));
    }
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn delete_and_restore_flip_soft_delete_flag() {
    let client = RecordingClient::new().with_affected(2).with_affected(1);
    let repo = UserRepo::new(&client);

    let n = repo
        .update_users(UserAction::Delete, &emails(&["a@example.com", "b@example.com"]))
        .await
        .unwrap();
    assert_eq!(n, 2);
    repo.update_users(UserAction::Restore, &emails(&["a@example.com"]))
        .await
        .unwrap();

    let calls = client.calls();
    assert_eq!(calls[0].0, "UPDATE \"user\" SET is_deleted = ? WHERE email IN (?, ?)");
    assert_eq!(
        calls[0].1,
        vec![
            Value::Bool(true),
            Value::from("a@example.com"),
            Value::from("b@example.com"),
        ]
    );
    assert_eq!(calls[1].0, "UPDATE \"user\" SET is_deleted = ? WHERE email IN (?)");
    assert_eq!(calls[1].1[0], Value::Bool(false));
}

#[tokio::test]
async fn update_auth_swaps_member_and_admin() {
    let client = RecordingClient::numbered().with_affected(2);

    UserRepo::new(&client)
        .update_users(UserAction::UpdateAuth, &emails(&["a@example.com", "b@example.com"]))
        .await
        .unwrap();

    let (sql, params) = &client.calls()[0];
    assert_eq!(
        sql,
        "UPDATE \"user\" SET auth_code = CASE WHEN auth_code = 'N0' THEN 'A0' \
         WHEN auth_code = 'A0' THEN 'N0' ELSE auth_code END WHERE email IN ($1, $2)"
    );
    assert_eq!(
        params,
        &vec![Value::from("a@example.com"), Value::from("b@example.com")]
    );
}

#[tokio::test]
async fn update_users_needs_a_selection() {
    let client = RecordingClient::new();

    let err = UserRepo::new(&client)
        .update_users(UserAction::Delete, &[])
        .await
        .unwrap_err();

    assert!(matches!(err, OrmError::Validation(_)));
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn update_users_reports_unknown_accounts() {
    let client = RecordingClient::new().with_affected(0);

    let err = UserRepo::new(&client)
        .update_users(UserAction::UpdateAuth, &emails(&["ghost@example.com"]))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}

#[test]
fn actions_parse_from_request_names() {
    let actions: Vec<UserAction> =
        serde_json::from_str(r#"["delete", "restore", "updateAuth"]"#).unwrap();
    assert_eq!(
        actions,
        vec![UserAction::Delete, UserAction::Restore, UserAction::UpdateAuth]
    );
    assert!(serde_json::from_str::<UserAction>(r#""promote""#).is_err());
}
