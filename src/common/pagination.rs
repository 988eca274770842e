// src/common/pagination.rs

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    // Começa em 1. Valores menores são tratados como 1.
    pub page: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    pub fn new(page: Option<i64>, per_page: i64) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page,
        }
    }

    // `page` vem direto da query string; satura em vez de estourar
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: i64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total + request.per_page - 1) / request.per_page
        };
        Self {
            items,
            page: request.page,
            per_page: request.per_page,
            total,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_is_clamped_to_one() {
        assert_eq!(PageRequest::new(None, 9).page, 1);
        assert_eq!(PageRequest::new(Some(0), 9).page, 1);
        assert_eq!(PageRequest::new(Some(-3), 9).offset(), 0);
    }

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest::new(Some(3), 9).offset(), 18);
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let req = PageRequest::new(Some(i64::MAX), 9);
        assert_eq!(req.offset(), i64::MAX);
        assert!(PageRequest::new(Some(i64::MAX / 2), 10).offset() >= 0);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let req = PageRequest::new(Some(1), 10);
        assert_eq!(Page::new(Vec::<u8>::new(), req, 0).total_pages, 0);
        assert_eq!(Page::new(Vec::<u8>::new(), req, 10).total_pages, 1);
        assert_eq!(Page::new(Vec::<u8>::new(), req, 11).total_pages, 2);
    }
}
