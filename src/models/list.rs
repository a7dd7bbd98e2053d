/// Pagination and filtering for list endpoints.
///
/// Only fields that differ from the server defaults are sent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListOptions {
    /// 1-based page number; 0 leaves the server default
    pub page: u32,
    /// Records per page; 0 leaves the server default
    pub page_size: u32,
    /// Sort field, e.g. `create_time` or `update_time`
    pub orderby: Option<String>,
    /// Sort descending
    pub desc: bool,
    pub name: Option<String>,
    pub id: Option<String>,
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn orderby(mut self, field: impl Into<String>) -> Self {
        self.orderby = Some(field.into());
        self
    }

    pub fn desc(mut self, desc: bool) -> Self {
        self.desc = desc;
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Query parameters in a stable order.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if self.page > 0 {
            params.push(("page", self.page.to_string()));
        }
        if self.page_size > 0 {
            params.push(("page_size", self.page_size.to_string()));
        }
        if let Some(orderby) = self.orderby.as_deref().filter(|s| !s.is_empty()) {
            params.push(("orderby", orderby.to_string()));
        }
        if self.desc {
            params.push(("desc", "true".to_string()));
        }
        if let Some(name) = self.name.as_deref().filter(|s| !s.is_empty()) {
            params.push(("name", name.to_string()));
        }
        if let Some(id) = self.id.as_deref().filter(|s| !s.is_empty()) {
            params.push(("id", id.to_string()));
        }
        params
    }
}
