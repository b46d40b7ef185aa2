//! `users` table.

use chrono::Utc;
use duka_core::{
  Error,
  access::Role,
  user::{Credentials, NewUser, User},
};
use rusqlite::{Connection, OptionalExtension as _, Row, params};

use super::{Outcome, reject};
use crate::encode::{Label, Timestamp, is_foreign_key_violation, is_unique_violation};

const COLUMNS: &str = "id, username, email, role, merchant_id, active, created_at";

fn from_row(row: &Row<'_>) -> rusqlite::Result<User> {
  Ok(User {
    id:          row.get(0)?,
    username:    row.get(1)?,
    email:       row.get(2)?,
    role:        row.get::<_, Label<Role>>(3)?.0,
    merchant_id: row.get(4)?,
    active:      row.get(5)?,
    created_at:  row.get::<_, Timestamp>(6)?.0,
  })
}

pub fn create(conn: &mut Connection, input: NewUser) -> Outcome<User> {
  let tx = conn.transaction()?;

  let taken: Option<String> = tx
    .query_row(
      "SELECT CASE WHEN username = ?1 THEN 'username' ELSE 'email' END
       FROM users WHERE username = ?1 OR email = ?2 LIMIT 1",
      params![input.username, input.email],
      |r| r.get(0),
    )
    .optional()?;
  if let Some(field) = taken {
    reject!(Error::conflict(format!("{field} is already registered")));
  }

  let now = Utc::now();
  let inserted = tx.execute(
    "INSERT INTO users (username, email, password_hash, role, merchant_id, active, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6)",
    params![
      input.username,
      input.email,
      input.password_hash,
      Label(input.role),
      input.merchant_id,
      Timestamp(now),
    ],
  );
  match inserted {
    Ok(_) => {}
    Err(e) if is_unique_violation(&e) => {
      reject!(Error::conflict("username or email is already registered"))
    }
    Err(e) => return Err(e),
  }
  let id = tx.last_insert_rowid();
  tx.commit()?;

  Ok(Ok(User {
    id,
    username: input.username,
    email: input.email,
    role: input.role,
    merchant_id: input.merchant_id,
    active: true,
    created_at: now,
  }))
}

pub fn get(conn: &Connection, id: i64) -> rusqlite::Result<Option<User>> {
  conn
    .query_row(
      &format!("SELECT {COLUMNS} FROM users WHERE id = ?1"),
      params![id],
      from_row,
    )
    .optional()
}

pub fn find_credentials(conn: &Connection, login: &str) -> rusqlite::Result<Option<Credentials>> {
  conn
    .query_row(
      &format!("SELECT {COLUMNS}, password_hash FROM users WHERE username = ?1 OR email = ?1"),
      params![login],
      |row| {
        Ok(Credentials {
          user:          from_row(row)?,
          password_hash: row.get(7)?,
        })
      },
    )
    .optional()
}

pub fn list(conn: &Connection, tenant_id: i64, role: Role) -> rusqlite::Result<Vec<User>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {COLUMNS} FROM users WHERE merchant_id = ?1 AND role = ?2 ORDER BY id"
  ))?;
  let rows = stmt
    .query_map(params![tenant_id, Label(role)], from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

pub fn set_active(
  conn: &Connection,
  tenant_id: i64,
  role: Role,
  id: i64,
  active: bool,
) -> Outcome<User> {
  let changed = conn.execute(
    "UPDATE users SET active = ?4 WHERE id = ?1 AND merchant_id = ?2 AND role = ?3",
    params![id, tenant_id, Label(role), active],
  )?;
  if changed == 0 {
    reject!(Error::not_found(format!("{role} {id}")));
  }
  match get(conn, id)? {
    Some(user) => Ok(Ok(user)),
    None => Ok(Err(Error::not_found(format!("{role} {id}")))),
  }
}

pub fn delete(conn: &Connection, tenant_id: i64, role: Role, id: i64) -> Outcome<()> {
  let deleted = conn.execute(
    "DELETE FROM users WHERE id = ?1 AND merchant_id = ?2 AND role = ?3",
    params![id, tenant_id, Label(role)],
  );
  match deleted {
    Ok(0) => Ok(Err(Error::not_found(format!("{role} {id}")))),
    Ok(_) => Ok(Ok(())),
    Err(e) if is_foreign_key_violation(&e) => Ok(Err(Error::conflict(format!(
      "{role} {id} still owns inventory, sales or requests"
    )))),
    Err(e) => Err(e),
  }
}
