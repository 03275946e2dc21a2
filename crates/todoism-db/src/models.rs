/// Database row types, mapping directly to SQLite rows.
/// Distinct from todoism-types wire models to keep the DB layer independent.
#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub locale: Option<String>,
    pub password_hash: String,
}

/// An item joined with its author's username.
#[derive(Debug, Clone)]
pub struct ItemRow {
    pub id: i64,
    pub body: String,
    pub done: bool,
    pub author_id: i64,
    pub author_username: String,
}

/// Which of a user's items a collection query selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemFilter {
    All,
    Active,
    Completed,
}

impl ItemFilter {
    /// Value the `done` column must have, `None` for no constraint.
    pub fn done(self) -> Option<bool> {
        match self {
            Self::All => None,
            Self::Active => Some(false),
            Self::Completed => Some(true),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemCounts {
    pub all: i64,
    pub active: i64,
    pub completed: i64,
}
