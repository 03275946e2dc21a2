use todoism_db::models::ItemFilter;

/// The two API generations. They share every handler and differ only in
/// where the routes live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    V1,
    V2,
}

impl ApiVersion {
    pub fn prefix(self) -> &'static str {
        match self {
            Self::V1 => "/api/v1",
            Self::V2 => "/api/v2",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::V1 => "1.0",
            Self::V2 => "2.0",
        }
    }

    /// Path of the public info document.
    pub fn index_path(self) -> &'static str {
        match self {
            Self::V1 => "/",
            Self::V2 => "/info",
        }
    }

    /// Prefix under which single items are addressed by id.
    pub fn item_base(self) -> &'static str {
        match self {
            Self::V1 => "/items",
            Self::V2 => "/item",
        }
    }

    /// Route template for a single item.
    pub fn item_route(self) -> String {
        format!("{}/{{item_id}}", self.item_base())
    }

    pub fn items_path(self, filter: ItemFilter) -> &'static str {
        match (self, filter) {
            (Self::V1, ItemFilter::All) => "/user/items",
            (Self::V1, ItemFilter::Active) => "/user/items/active",
            (Self::V1, ItemFilter::Completed) => "/user/items/completed",
            (Self::V2, ItemFilter::All) => "/items",
            (Self::V2, ItemFilter::Active) => "/items/active",
            (Self::V2, ItemFilter::Completed) => "/items/completed",
        }
    }
}
