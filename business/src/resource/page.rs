//! Page bookkeeping and list-response decoding.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};

/// `ceil(total_count / page_size)`, or 0 when `page_size` is 0.
pub fn total_pages(total_count: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    u32::try_from(total_count.div_ceil(u64::from(page_size))).unwrap_or(u32::MAX)
}

/// Parameters of a list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    /// 1-based page number.
    pub page: u32,
    pub size: u32,
    pub search: String,
}

impl PageQuery {
    pub fn new(search: impl Into<String>, page: u32, size: u32) -> Self {
        Self {
            page: page.max(1),
            size,
            search: search.into(),
        }
    }
}

/// One slice of a collection.
///
/// `total_pages` is always derived from `total_count` and `page_size`; the
/// `pages` value the server sends is not trusted.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total_count: u64,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page: u32, page_size: u32, total_count: u64) -> Self {
        Self {
            items,
            page: page.max(1),
            page_size,
            total_count,
            total_pages: total_pages(total_count, page_size),
        }
    }

    pub fn empty(page_size: u32) -> Self {
        Self::new(Vec::new(), 1, page_size, 0)
    }

    /// True if `target` is a navigable page number.
    pub fn contains_page(&self, target: u32) -> bool {
        target >= 1 && target <= self.total_pages
    }

    /// Adjusts the totals after `delta` records were added locally.
    pub fn record_inserted(&mut self, delta: u64) {
        self.total_count += delta;
        self.total_pages = total_pages(self.total_count, self.page_size);
    }
}

impl<T: DeserializeOwned> Page<T> {
    /// Decodes `{ items, total, page, size, pages }`.
    ///
    /// The page number comes from the request; `size` falls back to the
    /// requested size and `total` to the number of items.
    pub fn from_wire(value: Value, query: &PageQuery) -> ApiResult<Self> {
        let Value::Object(mut body) = value else {
            return Err(ApiError::Shape("list response is not an object".to_owned()));
        };

        let Some(Value::Array(raw_items)) = body.remove("items") else {
            return Err(ApiError::Shape(
                "list response `items` is missing or not a sequence".to_owned(),
            ));
        };

        let items = raw_items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                serde_json::from_value(item)
                    .map_err(|e| ApiError::Shape(format!("item {index}: {e}")))
            })
            .collect::<ApiResult<Vec<T>>>()?;

        let page_size = body
            .get("size")
            .and_then(Value::as_u64)
            .and_then(|size| u32::try_from(size).ok())
            .filter(|size| *size > 0)
            .unwrap_or(query.size);

        let total_count = body
            .get("total")
            .and_then(Value::as_u64)
            .unwrap_or(items.len() as u64);

        Ok(Self::new(items, query.page, page_size, total_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct Row {
        id: i64,
    }

    #[test]
    fn total_pages_is_ceiling() {
        for size in 1..=12_u32 {
            for total in 0..=40_u64 {
                let expected = (total as f64 / f64::from(size)).ceil() as u32;
                assert_eq!(total_pages(total, size), expected, "total={total} size={size}");
            }
        }
        assert_eq!(total_pages(10, 0), 0);
    }

    #[test]
    fn contains_page_bounds() {
        let page: Page<Row> = Page::new(Vec::new(), 1, 10, 25);
        assert_eq!(page.total_pages, 3);
        assert!(!page.contains_page(0));
        assert!(page.contains_page(1));
        assert!(page.contains_page(3));
        assert!(!page.contains_page(4));

        let empty: Page<Row> = Page::empty(10);
        assert!(!empty.contains_page(1));
    }

    #[test]
    fn record_inserted_recomputes_pages() {
        let mut page: Page<Row> = Page::new(Vec::new(), 1, 10, 10);
        assert_eq!(page.total_pages, 1);
        page.record_inserted(1);
        assert_eq!(page.total_count, 11);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn from_wire_ignores_server_pages() {
        let query = PageQuery::new("", 2, 10);
        let page: Page<Row> = Page::from_wire(
            json!({"items": [{"id": 11}], "total": 11, "page": 7, "size": 10, "pages": 99}),
            &query,
        )
        .unwrap();

        assert_eq!(page.items, vec![Row { id: 11 }]);
        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn from_wire_defaults_missing_totals() {
        let query = PageQuery::new("", 1, 5);
        let page: Page<Row> =
            Page::from_wire(json!({"items": [{"id": 1}, {"id": 2}]}), &query).unwrap();

        assert_eq!(page.page_size, 5);
        assert_eq!(page.total_count, 2);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn items_must_be_a_sequence() {
        let query = PageQuery::new("", 1, 10);
        for body in [
            json!({"total": 0}),
            json!({"items": {"id": 1}}),
            json!([{"id": 1}]),
        ] {
            let result: ApiResult<Page<Row>> = Page::from_wire(body, &query);
            assert!(matches!(result, Err(ApiError::Shape(_))));
        }
    }

    #[test]
    fn malformed_item_is_shape_error() {
        let query = PageQuery::new("", 1, 10);
        let result: ApiResult<Page<Row>> =
            Page::from_wire(json!({"items": [{"id": "seven"}]}), &query);
        assert!(matches!(result, Err(ApiError::Shape(msg)) if msg.starts_with("item 0")));
    }
}
