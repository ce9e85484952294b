// src/common/pagination.rs

use serde::Serialize;
use utoipa::ToSchema;

/// Página pedida (1-based), já com os limites aplicados.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn new(page: Option<u32>, page_size: Option<u32>, default_size: u32, max_size: u32) -> Self {
        let page = page.unwrap_or(1).max(1);
        let page_size = page_size.unwrap_or(default_size).clamp(1, max_size.max(1));
        Self { page, page_size }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page,
            page_size: request.page_size,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_limits() {
        let req = PageRequest::new(None, None, 25, 100);
        assert_eq!(req, PageRequest { page: 1, page_size: 25 });

        let req = PageRequest::new(Some(0), Some(500), 25, 100);
        assert_eq!(req, PageRequest { page: 1, page_size: 100 });

        let req = PageRequest::new(Some(3), Some(0), 25, 100);
        assert_eq!(req.page_size, 1);
    }

    #[test]
    fn offset_is_zero_based() {
        let req = PageRequest::new(Some(3), Some(20), 25, 100);
        assert_eq!(req.offset(), 40);
        assert_eq!(req.limit(), 20);
    }
}
