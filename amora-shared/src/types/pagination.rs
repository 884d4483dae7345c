use serde::{Deserialize, Serialize};

/// Offset pagination for the member directory. The message inbox does NOT
/// use this; it pages by keyset cursor because it can grow unbounded.
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_page() -> u64 { 1 }
fn default_per_page() -> u64 { 12 }

impl PaginationParams {
    pub fn offset(&self) -> u64 {
        (self.page.saturating_sub(1)) * self.per_page
    }

    pub fn limit(&self) -> u64 {
        self.per_page.min(100)
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self { page: 1, per_page: 12 }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Paginated<T: Serialize> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

impl<T: Serialize> Paginated<T> {
    pub fn new(items: Vec<T>, total_count: u64, params: &PaginationParams) -> Self {
        let per_page = params.limit();
        let total_pages = if total_count == 0 { 0 } else { (total_count + per_page - 1) / per_page };
        Self {
            items,
            total_count,
            page: params.page,
            per_page,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_and_limit() {
        let params = PaginationParams { page: 3, per_page: 12 };
        assert_eq!(params.offset(), 24);
        assert_eq!(params.limit(), 12);

        let capped = PaginationParams { page: 1, per_page: 500 };
        assert_eq!(capped.limit(), 100);
    }

    #[test]
    fn total_pages_rounds_up() {
        let params = PaginationParams { page: 1, per_page: 12 };
        let paged = Paginated::new(vec![1, 2, 3], 25, &params);
        assert_eq!(paged.total_pages, 3);
        assert_eq!(paged.total_count, 25);

        let empty: Paginated<i32> = Paginated::new(vec![], 0, &params);
        assert_eq!(empty.total_pages, 0);
    }
}
