//! Mapping from rows to wire representations. Nothing here touches the
//! database; counts and pages are handed in already computed.

use todoism_db::models::{ItemCounts, ItemFilter, ItemRow, UserRow};
use todoism_types::models::{ApiInfo, AuthorSummary, ItemCollection, ItemResource, UserResource};

use crate::pagination::Page;
use crate::version::ApiVersion;

/// Absolute URL builder for one API generation.
#[derive(Debug, Clone)]
pub struct Links {
    base: String,
    version: ApiVersion,
}

impl Links {
    pub fn new(public_url: &str, version: ApiVersion) -> Self {
        Self {
            base: format!("{}{}", public_url.trim_end_matches('/'), version.prefix()),
            version,
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn user(&self) -> String {
        format!("{}/user", self.base)
    }

    pub fn token(&self) -> String {
        format!("{}/oauth/token", self.base)
    }

    pub fn item(&self, id: i64) -> String {
        format!("{}{}/{}", self.base, self.version.item_base(), id)
    }

    pub fn items(&self, filter: ItemFilter) -> String {
        format!("{}{}", self.base, self.version.items_path(filter))
    }

    pub fn items_page(&self, filter: ItemFilter, page: i64) -> String {
        format!("{}?page={}", self.items(filter), page)
    }
}

pub fn user_schema(links: &Links, user: &UserRow, counts: ItemCounts) -> UserResource {
    UserResource {
        id: user.id,
        self_url: links.user(),
        kind: "User".into(),
        username: user.username.clone(),
        all_items_url: links.items(ItemFilter::All),
        active_items_url: links.items(ItemFilter::Active),
        completed_items_url: links.items(ItemFilter::Completed),
        all_items_count: counts.all,
        active_items_count: counts.active,
        completed_items_count: counts.completed,
    }
}

pub fn item_schema(links: &Links, item: &ItemRow) -> ItemResource {
    ItemResource {
        id: item.id,
        self_url: links.item(item.id),
        kind: "Item".into(),
        body: item.body.clone(),
        done: item.done,
        author: AuthorSummary {
            id: item.author_id,
            url: links.user(),
            username: item.author_username.clone(),
            kind: "User".into(),
        },
    }
}

pub fn items_schema(links: &Links, filter: ItemFilter, page: &Page<ItemRow>) -> ItemCollection {
    ItemCollection {
        self_url: links.items_page(filter, page.page),
        kind: "ItemCollection".into(),
        items: page.items.iter().map(|item| item_schema(links, item)).collect(),
        first: links.items_page(filter, 1),
        prev: page.prev_page().map(|p| links.items_page(filter, p)),
        next: page.next_page().map(|p| links.items_page(filter, p)),
        last: links.items_page(filter, page.last_page()),
        count: page.total,
    }
}

pub fn api_info(links: &Links, version: ApiVersion) -> ApiInfo {
    ApiInfo {
        api_version: version.label().into(),
        api_base_url: links.base().to_string(),
        current_user_url: links.user(),
        authentication_url: links.token(),
        item_url: format!("{}{}/{{item_id}}", links.base(), version.item_base()),
        current_user_items_url: format!("{}{{?page}}", links.items(ItemFilter::All)),
        current_user_active_items_url: format!("{}{{?page}}", links.items(ItemFilter::Active)),
        current_user_completed_items_url: format!(
            "{}{{?page}}",
            links.items(ItemFilter::Completed)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i64, done: bool) -> ItemRow {
        ItemRow {
            id,
            body: format!("item {id}"),
            done,
            author_id: 7,
            author_username: "grey".into(),
        }
    }

    #[test]
    fn links_follow_each_version_layout() {
        let v1 = Links::new("http://example.com/", ApiVersion::V1);
        assert_eq!(v1.item(3), "http://example.com/api/v1/items/3");
        assert_eq!(v1.items(ItemFilter::Active), "http://example.com/api/v1/user/items/active");

        let v2 = Links::new("http://example.com", ApiVersion::V2);
        assert_eq!(v2.item(3), "http://example.com/api/v2/item/3");
        assert_eq!(
            v2.items_page(ItemFilter::Completed, 2),
            "http://example.com/api/v2/items/completed?page=2"
        );
    }

    #[test]
    fn item_embeds_author_summary() {
        let links = Links::new("http://x", ApiVersion::V2);
        let item = item_schema(&links, &row(5, true));

        assert_eq!(item.self_url, "http://x/api/v2/item/5");
        assert_eq!(item.kind, "Item");
        assert!(item.done);
        assert_eq!(item.author.id, 7);
        assert_eq!(item.author.username, "grey");
        assert_eq!(item.author.url, "http://x/api/v2/user");
        assert_eq!(item.author.kind, "User");
    }

    #[test]
    fn collection_links_use_their_own_filter() {
        let links = Links::new("http://x", ApiVersion::V2);
        let page = Page {
            items: vec![row(21, false)],
            page: 2,
            per_page: 20,
            total: 45,
        };

        let collection = items_schema(&links, ItemFilter::Active, &page);
        assert_eq!(collection.self_url, "http://x/api/v2/items/active?page=2");
        assert_eq!(collection.first, "http://x/api/v2/items/active?page=1");
        assert_eq!(collection.prev.as_deref(), Some("http://x/api/v2/items/active?page=1"));
        assert_eq!(collection.next.as_deref(), Some("http://x/api/v2/items/active?page=3"));
        assert_eq!(collection.last, "http://x/api/v2/items/active?page=3");
        assert_eq!(collection.count, 45);
        assert_eq!(collection.kind, "ItemCollection");
    }

    #[test]
    fn user_serializes_with_self_key_and_counts() {
        let links = Links::new("http://x", ApiVersion::V1);
        let user = UserRow {
            id: 7,
            username: "grey".into(),
            locale: Some("en_US".into()),
            password_hash: "secret-hash".into(),
        };
        let counts = ItemCounts { all: 3, active: 1, completed: 2 };

        let json = serde_json::to_value(user_schema(&links, &user, counts)).unwrap();
        assert_eq!(json["self"], "http://x/api/v1/user");
        assert_eq!(json["all_items_url"], "http://x/api/v1/user/items");
        assert_eq!(json["completed_items_count"], 2);
        assert!(json.get("password_hash").is_none());
    }
}
