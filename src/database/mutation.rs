//! Outcomes of the two-state join-row mutators (cart, favorites, follows).
//!
//! The existence check each mutator runs first only produces a friendlier
//! message. The unique constraint behind the `INSERT` is what actually
//! rejects a concurrent duplicate, via `Error::from(sqlx::Error)`.

use crate::error::Error;

/// Fails with `Conflict` when the fast-path check already found the row.
pub fn ensure_absent(present: bool, info: &str) -> Result<(), Error> {
    if present {
        return Err(Error::Conflict(info.to_owned()));
    }
    Ok(())
}

/// Fails with `NotFound` when a `DELETE` touched nothing.
pub fn ensure_deleted(rows_affected: u64, info: &str) -> Result<(), Error> {
    if rows_affected == 0 {
        return Err(Error::NotFound(info.to_owned()));
    }
    Ok(())
}

/// Fails with `Validation` when a user targets themselves.
pub fn ensure_distinct(follower_id: i32, author_id: i32) -> Result<(), Error> {
    if follower_id == author_id {
        return Err(Error::Validation(String::from(
            "You can't subscribe to yourself",
        )));
    }
    Ok(())
}
