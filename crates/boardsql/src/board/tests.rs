use super::*;
use crate::testing::RecordingClient;

fn new_post() -> NewPost {
    NewPost {
        title: "hello".into(),
        contents: "first post".into(),
        writer: "a@example.com".into(),
        ip_location: "127.0.0.1".into(),
        weather: None,
    }
}

fn new_comment() -> NewComment {
    NewComment {
        board_id: 7,
        comment: "nice".into(),
        writer: "b@example.com".into(),
        ip_location: "10.0.0.1".into(),
    }
}

#[tokio::test]
async fn create_post_starts_with_zero_views() {
    let client = RecordingClient::new().with_affected(1);

    BoardRepo::new(&client).create_post(new_post()).await.unwrap();

    let calls = client.calls();
    assert_eq!(calls.len(), 1);
    let (sql, params) = &calls[0];
    assert_eq!(
        sql,
        "INSERT INTO board (title, contents, views, publish_date, email, ip_location) VALUES (?, ?, ?, ?, ?, ?)"
    );
    assert_eq!(params[0], Value::from("hello"));
    assert_eq!(params[2], Value::Int(0));
    assert!(matches!(params[3], Value::Timestamp(_)));
    assert_eq!(params[4], Value::from("a@example.com"));
}

#[tokio::test]
async fn create_post_includes_weather_when_given() {
    let client = RecordingClient::new().with_affected(1);
    let post = NewPost {
        weather: Some("sunny".into()),
        ..new_post()
    };

    BoardRepo::new(&client).create_post(post).await.unwrap();

    let (sql, params) = &client.calls()[0];
    assert!(sql.starts_with("INSERT INTO board (title, contents, views, publish_date, email, ip_location, weather)"));
    assert_eq!(params.last(), Some(&Value::from("sunny")));
}

#[tokio::test]
async fn create_post_requires_all_fields() {
    let client = RecordingClient::new();
    let repo = BoardRepo::new(&client);

    for post in [
        NewPost { title: " ".into(), ..new_post() },
        NewPost { contents: String::new(), ..new_post() },
        NewPost { writer: String::new(), ..new_post() },
        NewPost { ip_location: String::new(), ..new_post() },
    ] {
        let err = repo.create_post(post).await.unwrap_err();
        assert!(matches!(err, OrmError::Validation(_)));
    }
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn list_posts_hides_deleted_newest_first() {
    let client = RecordingClient::new().with_rows(vec![Record::new().set("board_id", 2)]);

    let rows = BoardRepo::new(&client).list_posts().await.unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(
        client.calls(),
        vec![(
            "SELECT board_id, title, views, publish_date, email, is_deleted, update_date FROM board WHERE is_deleted = ? ORDER BY publish_date DESC".to_string(),
            vec![Value::Bool(false)],
        )]
    );
}

#[tokio::test]
async fn view_post_counts_then_reads() {
    let client = RecordingClient::new()
        .with_affected(1)
        .with_rows(vec![Record::new().set("board_id", 3).set("views", 5)]);

    let post = BoardRepo::new(&client).view_post(3).await.unwrap();

    assert_eq!(post.get("views"), Some(&Value::Int(5)));
    assert_eq!(
        client.calls(),
        vec![
            (
                "UPDATE board SET views = views + 1 WHERE board_id = ?".to_string(),
                vec![Value::Int(3)],
            ),
            (
                "SELECT * FROM board WHERE board_id = ?".to_string(),
                vec![Value::Int(3)],
            ),
        ]
    );
}

#[tokio::test]
async fn view_missing_post_is_not_found() {
    let client = RecordingClient::new().with_affected(0);

    let err = BoardRepo::new(&client).view_post(99).await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(client.calls().len(), 1);
}

#[tokio::test]
async fn edit_post_sets_update_date() {
    let client = RecordingClient::new().with_affected(1);

    BoardRepo::new(&client)
        .edit_post(3, "new title", "new body")
        .await
        .unwrap();

    let (sql, params) = &client.calls()[0];
    assert_eq!(
        sql,
        "UPDATE board SET title = ?, contents = ?, update_date = ? WHERE board_id = ?"
    );
    assert!(matches!(params[2], Value::Timestamp(_)));
    assert_eq!(params[3], Value::Int(3));
}

#[tokio::test]
async fn edit_missing_post_is_not_found() {
    let client = RecordingClient::new().with_affected(0);
    let err = BoardRepo::new(&client)
        .edit_post(3, "t", "c")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn delete_post_is_soft() {
    let client = RecordingClient::new().with_affected(1);

    BoardRepo::new(&client).delete_post(4).await.unwrap();

    let (sql, params) = &client.calls()[0];
    assert_eq!(
        sql,
        "UPDATE board SET is_deleted = ?, update_date = ? WHERE board_id IN (?)"
    );
    assert_eq!(params[0], Value::Bool(true));
    assert_eq!(params[2], Value::Int(4));
}

#[tokio::test]
async fn delete_posts_reports_count() {
    let client = RecordingClient::new().with_affected(2);

    let n = BoardRepo::new(&client).delete_posts(&[4, 5]).await.unwrap();

    assert_eq!(n, 2);
    assert!(client.statements()[0].ends_with("WHERE board_id IN (?, ?)"));
}

#[tokio::test]
async fn delete_posts_without_ids_is_rejected() {
    let client = RecordingClient::new();
    let err = BoardRepo::new(&client).delete_posts(&[]).await.unwrap_err();
    assert!(matches!(err, OrmError::Validation(_)));
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn delete_missing_post_is_not_found() {
    let client = RecordingClient::new().with_affected(0);
    let err = BoardRepo::new(&client).delete_post(4).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn search_posts_wraps_term() {
    let client = RecordingClient::new();

    BoardRepo::new(&client).search_posts("rust").await.unwrap();

    let (sql, params) = &client.calls()[0];
    assert!(sql.ends_with(
        "FROM board WHERE is_deleted = ? AND title LIKE ? ORDER BY publish_date DESC"
    ));
    assert_eq!(params, &vec![Value::Bool(false), Value::from("%rust%")]);
}

#[tokio::test]
async fn add_comment_checks_post_then_inserts() {
    let client = RecordingClient::new()
        .with_rows(vec![Record::new().set("board_id", 7)])
        .with_affected(1);

    BoardRepo::new(&client).add_comment(new_comment()).await.unwrap();

    let calls = client.calls();
    assert_eq!(
        calls[0],
        (
            "SELECT board_id FROM board WHERE board_id = ? AND is_deleted = ?".to_string(),
            vec![Value::Int(7), Value::Bool(false)],
        )
    );
    let (sql, params) = &calls[1];
    assert_eq!(
        sql,
        "INSERT INTO comment (comment, email, board_id, publish_date, ip_location, is_deleted) VALUES (?, ?, ?, ?, ?, ?)"
    );
    assert_eq!(params[2], Value::Int(7));
    assert_eq!(params[5], Value::Bool(false));
}

#[tokio::test]
async fn add_comment_to_missing_post_is_not_found() {
    let client = RecordingClient::new();

    let err = BoardRepo::new(&client)
        .add_comment(new_comment())
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(client.calls().len(), 1);
}

#[tokio::test]
async fn add_empty_comment_is_rejected() {
    let client = RecordingClient::new();
    let comment = NewComment {
        comment: String::new(),
        ..new_comment()
    };
    let err = BoardRepo::new(&client).add_comment(comment).await.unwrap_err();
    assert!(matches!(err, OrmError::Validation(_)));
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn list_comments_newest_first() {
    let client = RecordingClient::new();

    BoardRepo::new(&client).list_comments(7).await.unwrap();

    assert_eq!(
        client.statements(),
        vec!["SELECT * FROM comment WHERE board_id = ? AND is_deleted = ? ORDER BY publish_date DESC"]
    );
}

#[tokio::test]
async fn edit_comment_targets_comment_id() {
    let client = RecordingClient::new().with_affected(1);

    BoardRepo::new(&client).edit_comment(11, "edited").await.unwrap();

    let (sql, params) = &client.calls()[0];
    assert_eq!(
        sql,
        "UPDATE comment SET comment = ?, update_date = ? WHERE comment_id = ?"
    );
    assert_eq!(params[0], Value::from("edited"));
    assert_eq!(params[2], Value::Int(11));
}

#[tokio::test]
async fn edit_missing_comment_is_not_found() {
    let client = RecordingClient::new().with_affected(0);
    let err = BoardRepo::new(&client)
        .edit_comment(11, "edited")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn new_post_deserializes_from_request_body() {
    let post: NewPost = serde_json::from_str(
        r#"{"title":"t","contents":"c","writer":"a@example.com","ip_location":"::1"}"#,
    )
    .unwrap();
    assert_eq!(post.writer, "a@example.com");
    assert_eq!(post.weather, None);
}
