//! Offset pagination for item collections.
//!
//! Page numbers are 1-based. Page 1 always exists, even for an empty
//! collection. Any other page outside `1..=pages` is `NotFound`, so a link
//! built from a `Page` never names a page that cannot be fetched.

use todoism_db::Database;
use todoism_db::models::{ItemFilter, ItemRow};

use crate::config::MAX_ITEMS_PER_PAGE;
use crate::error::ApiError;

/// `ceil(total / per_page)` without the `total + per_page - 1` overflow.
fn page_count(total: i64, per_page: i64) -> i64 {
    total / per_page + i64::from(total % per_page != 0)
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
}

impl<T> Page<T> {
    /// Number of pages holding at least one item.
    pub fn pages(&self) -> i64 {
        page_count(self.total, self.per_page)
    }

    /// Target of the `last` link.
    pub fn last_page(&self) -> i64 {
        self.pages().max(1)
    }

    pub fn prev_page(&self) -> Option<i64> {
        (self.page > 1).then(|| self.page - 1)
    }

    pub fn next_page(&self) -> Option<i64> {
        (self.page < self.pages()).then(|| self.page + 1)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    per_page: i64,
}

impl Paginator {
    pub fn new(per_page: i64) -> Self {
        Self {
            per_page: per_page.clamp(1, MAX_ITEMS_PER_PAGE),
        }
    }

    pub fn per_page(&self) -> i64 {
        self.per_page
    }

    /// Cuts page `page` out of a collection of `count()` entries;
    /// `fetch(limit, offset)` loads the slice.
    pub fn paginate<T, C, F>(&self, page: i64, count: C, fetch: F) -> Result<Page<T>, ApiError>
    where
        C: FnOnce() -> anyhow::Result<i64>,
        F: FnOnce(i64, i64) -> anyhow::Result<Vec<T>>,
    {
        if page < 1 {
            return Err(ApiError::NotFound);
        }

        let total = count()?;
        let pages = page_count(total, self.per_page);
        if page > 1 && page > pages {
            return Err(ApiError::NotFound);
        }

        let items = fetch(self.per_page, (page - 1) * self.per_page)?;
        Ok(Page {
            items,
            page,
            per_page: self.per_page,
            total,
        })
    }

    /// One page of `author_id`'s items matching `filter`, oldest first.
    pub fn items(
        &self,
        db: &Database,
        author_id: i64,
        filter: ItemFilter,
        page: i64,
    ) -> Result<Page<ItemRow>, ApiError> {
        self.paginate(
            page,
            || db.count_items(author_id, filter),
            |limit, offset| db.list_items(author_id, filter, limit, offset),
        )
    }
}
