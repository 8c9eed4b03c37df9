//! Data access for posts (`board`) and their comments (`comment`).
//!
//! Posts and comments are never physically deleted: `is_deleted` hides them
//! from every listing.

use crate::client::GenericClient;
use crate::condition::ConditionMap;
use crate::crud;
use crate::error::{OrmError, OrmResult};
use crate::exec::execute_async;
use crate::record::Record;
use crate::statement::{Columns, Statement};
use crate::value::Value;
use chrono::Utc;
use serde::Deserialize;

const BOARD: &str = "board";
const COMMENT: &str = "comment";

/// Columns returned by post listings.
pub const POST_LIST_COLUMNS: [&str; 7] = [
    "board_id",
    "title",
    "views",
    "publish_date",
    "email",
    "is_deleted",
    "update_date",
];

const NEWEST_FIRST: &str = "publish_date DESC";

/// A post as submitted by its writer.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub contents: String,
    /// Writer's email.
    pub writer: String,
    pub ip_location: String,
    #[serde(default)]
    pub weather: Option<String>,
}

/// A comment as submitted by its writer.
#[derive(Debug, Clone, Deserialize)]
pub struct NewComment {
    pub board_id: i64,
    pub comment: String,
    pub writer: String,
    pub ip_location: String,
}

fn require(field: &str, value: &str) -> OrmResult<()> {
    if value.trim().is_empty() {
        return Err(OrmError::validation(format!("{field} is required")));
    }
    Ok(())
}

fn live_post(board_id: i64) -> ConditionMap {
    ConditionMap::new()
        .eq("board_id", board_id)
        .eq("is_deleted", false)
}

/// Post and comment operations over any [`GenericClient`].
pub struct BoardRepo<'a, C> {
    conn: &'a C,
}

impl<'a, C: GenericClient> BoardRepo<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Publish a post with zero views.
    pub async fn create_post(&self, post: NewPost) -> OrmResult<()> {
        require("title", &post.title)?;
        require("contents", &post.contents)?;
        require("writer", &post.writer)?;
        require("ip_location", &post.ip_location)?;

        let mut data = Record::new()
            .set("title", post.title)
            .set("contents", post.contents)
            .set("views", 0)
            .set("publish_date", Utc::now())
            .set("email", post.writer)
            .set("ip_location", post.ip_location);
        if let Some(weather) = post.weather {
            data.insert("weather", weather);
        }

        crud::create(self.conn, BOARD, &data).await?;
        Ok(())
    }

    /// Every visible post, newest first.
    pub async fn list_posts(&self) -> OrmResult<Vec<Record>> {
        crud::read(
            self.conn,
            BOARD,
            &Columns::from(POST_LIST_COLUMNS),
            &ConditionMap::new().eq("is_deleted", false),
            Some(NEWEST_FIRST),
        )
        .await
    }

    /// Count a view and return the full post.
    pub async fn view_post(&self, board_id: i64) -> OrmResult<Record> {
        // Raw statement: a payload value would be bound as text, not evaluated.
        let bump = Statement::raw(
            "UPDATE board SET views = views + 1 WHERE board_id = ?",
            [Value::Int(board_id)],
        );
        if execute_async(self.conn, &bump).await?.affected_rows == 0 {
            return Err(OrmError::not_found(format!("post {board_id}")));
        }

        crud::read(
            self.conn,
            BOARD,
            &Columns::All,
            &ConditionMap::new().eq("board_id", board_id),
            None,
        )
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| OrmError::not_found(format!("post {board_id}")))
    }

    pub async fn edit_post(&self, board_id: i64, title: &str, contents: &str) -> OrmResult<()> {
        require("title", title)?;
        require("contents", contents)?;

        let data = Record::new()
            .set("title", title)
            .set("contents", contents)
            .set("update_date", Utc::now());
        let n = crud::update(
            self.conn,
            BOARD,
            &data,
            &ConditionMap::new().eq("board_id", board_id),
        )
        .await?;
        if n == 0 {
            return Err(OrmError::not_found(format!("post {board_id}")));
        }
        Ok(())
    }

    /// Soft-delete one post.
    pub async fn delete_post(&self, board_id: i64) -> OrmResult<()> {
        self.delete_posts(&[board_id]).await.map(|_| ())
    }

    /// Soft-delete several posts at once and return how many were hidden.
    pub async fn delete_posts(&self, board_ids: &[i64]) -> OrmResult<u64> {
        if board_ids.is_empty() {
            return Err(OrmError::validation("no post ids given"));
        }

        let data = Record::new()
            .set("is_deleted", true)
            .set("update_date", Utc::now());
        let n = crud::update(
            self.conn,
            BOARD,
            &data,
            &ConditionMap::new().any_of("board_id", board_ids.iter().copied()),
        )
        .await?;
        if n == 0 {
            return Err(OrmError::not_found(format!("posts {board_ids:?}")));
        }
        Ok(n)
    }

    /// Visible posts whose title contains `term`, newest first.
    pub async fn search_posts(&self, term: &str) -> OrmResult<Vec<Record>> {
        crud::read(
            self.conn,
            BOARD,
            &Columns::from(POST_LIST_COLUMNS),
            &ConditionMap::new()
                .eq("is_deleted", false)
                .like("title", term),
            Some(NEWEST_FIRST),
        )
        .await
    }

    /// Attach a comment to a visible post.
    pub async fn add_comment(&self, comment: NewComment) -> OrmResult<()> {
        require("comment", &comment.comment)?;
        require("writer", &comment.writer)?;
        require("ip_location", &comment.ip_location)?;

        let post = crud::read(
            self.conn,
            BOARD,
            &Columns::from(["board_id"]),
            &live_post(comment.board_id),
            None,
        )
        .await?;
        if post.is_empty() {
            return Err(OrmError::not_found(format!("post {}", comment.board_id)));
        }

        let data = Record::new()
            .set("comment", comment.comment)
            .set("email", comment.writer)
            .set("board_id", comment.board_id)
            .set("publish_date", Utc::now())
            .set("ip_location", comment.ip_location)
            .set("is_deleted", false);
        crud::create(self.conn, COMMENT, &data).await?;
        Ok(())
    }

    /// Visible comments of a post, newest first.
    pub async fn list_comments(&self, board_id: i64) -> OrmResult<Vec<Record>> {
        crud::read(
            self.conn,
            COMMENT,
            &Columns::All,
            &live_post(board_id),
            Some(NEWEST_FIRST),
        )
        .await
    }

    pub async fn edit_comment(&self, comment_id: i64, comment: &str) -> OrmResult<()> {
        require("comment", comment)?;

        let data = Record::new()
            .set("comment", comment)
            .set("update_date", Utc::now());
        let n = crud::update(
            self.conn,
            COMMENT,
            &data,
            &ConditionMap::new().eq("comment_id", comment_id),
        )
        .await?;
        if n == 0 {
            return Err(OrmError::not_found(format!("comment {comment_id}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
