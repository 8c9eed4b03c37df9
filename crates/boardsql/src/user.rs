//! Data access for member accounts (`"user"`) and their administration.
//!
//! Accounts are soft-deleted like posts. Password hashing happens before a
//! [`NewUser`] reaches this layer.

use crate::client::GenericClient;
use crate::condition::{ConditionMap, compile};
use crate::crud;
use crate::error::{OrmError, OrmResult};
use crate::exec::execute_async;
use crate::record::Record;
use crate::statement::{Columns, Statement};
use chrono::Utc;
use serde::Deserialize;

// `user` is reserved in Postgres.
const USER: &str = "\"user\"";

/// Authorization code of a regular member.
pub const MEMBER_AUTH: &str = "N0";
/// Authorization code of an administrator.
pub const ADMIN_AUTH: &str = "A0";

/// Columns returned by the administration listing.
pub const USER_LIST_COLUMNS: [&str; 5] = [
    "email",
    "user_name",
    "date_of_joining",
    "auth_code",
    "is_deleted",
];

/// A sign-up request. `password_hash` is stored as given.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub address_detail: Option<String>,
}

/// Bulk change applied to selected accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UserAction {
    Delete,
    Restore,
    /// Swap members and administrators; other codes are left alone.
    UpdateAuth,
}

fn require(field: &str, value: &str) -> OrmResult<()> {
    if value.trim().is_empty() {
        return Err(OrmError::validation(format!("{field} is required")));
    }
    Ok(())
}

/// Account operations over any [`GenericClient`].
pub struct UserRepo<'a, C> {
    conn: &'a C,
}

impl<'a, C: GenericClient> UserRepo<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Every account, deleted ones included.
    pub async fn list_users(&self) -> OrmResult<Vec<Record>> {
        crud::read(
            self.conn,
            USER,
            &Columns::from(USER_LIST_COLUMNS),
            &ConditionMap::new(),
            None,
        )
        .await
    }

    /// Full account row, password hash included, for credential checks.
    pub async fn find_user(&self, email: &str) -> OrmResult<Option<Record>> {
        require("email", email)?;
        let rows = crud::read(
            self.conn,
            USER,
            &Columns::All,
            &ConditionMap::new().eq("email", email.trim()),
            None,
        )
        .await?;
        Ok(rows.into_iter().next())
    }

    pub async fn email_exists(&self, email: &str) -> OrmResult<bool> {
        require("email", email)?;
        let rows = crud::read(
            self.conn,
            USER,
            &Columns::from(["email"]),
            &ConditionMap::new().eq("email", email.trim()),
            None,
        )
        .await?;
        Ok(!rows.is_empty())
    }

    /// Create a regular member account. A taken email surfaces as
    /// [`OrmError::DuplicateKey`].
    pub async fn register(&self, user: NewUser) -> OrmResult<()> {
        require("email", &user.email)?;
        require("password_hash", &user.password_hash)?;
        require("name", &user.name)?;

        let mut data = Record::new()
            .set("email", user.email.trim())
            .set("password", user.password_hash)
            .set("user_name", user.name);
        for (column, value) in [
            ("tel_number", user.phone),
            ("address", user.address),
            ("address_detail", user.address_detail),
        ] {
            if let Some(value) = value {
                data.insert(column, value);
            }
        }
        let data = data
            .set("date_of_joining", Utc::now())
            .set("auth_code", MEMBER_AUTH)
            .set("is_deleted", false);

        crud::create(self.conn, USER, &data).await?;
        Ok(())
    }

    /// Apply `action` to every account in `emails` and return how many changed.
    pub async fn update_users(&self, action: UserAction, emails: &[String]) -> OrmResult<u64> {
        if emails.is_empty() {
            return Err(OrmError::validation("no users selected"));
        }
        let selected = ConditionMap::new().any_of("email", emails.iter().map(String::as_str));

        let n = match action {
            UserAction::Delete | UserAction::Restore => {
                let data = Record::new().set("is_deleted", action == UserAction::Delete);
                crud::update(self.conn, USER, &data, &selected).await?
            }
            UserAction::UpdateAuth => {
                let clause = compile(&selected)?;
                let toggle = Statement::raw(
                    format!(
                        "UPDATE {USER} SET auth_code = CASE \
                         WHEN auth_code = '{MEMBER_AUTH}' THEN '{ADMIN_AUTH}' \
                         WHEN auth_code = '{ADMIN_AUTH}' THEN '{MEMBER_AUTH}' \
                         ELSE auth_code END WHERE {}",
                        clause.sql()
                    ),
                    clause.params().to_vec(),
                );
                execute_async(self.conn, &toggle).await?.affected_rows
            }
        };
        tracing::debug!(
            target: "boardsql.sql",
            ?action,
            selected = emails.len(),
            changed = n,
            "user update"
        );

        if n == 0 {
            return Err(OrmError::not_found(format!("users {emails:?}")));
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests;
