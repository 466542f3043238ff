//! Request helpers for the `/products` family of endpoints.

use std::fmt::Display;

use catalog_ordering::SortDirective;

use crate::request::{Page, RequestDescriptor};

/// `GET /products`
pub fn all(page: Page) -> RequestDescriptor {
    RequestDescriptor::get("/products").page(page)
}

/// `GET /products/{id}`
pub fn one(id: impl Display) -> RequestDescriptor {
    RequestDescriptor::get(format!("/products/{}", id))
}

/// `GET /products/search?q=`
pub fn search(term: &str, page: Page) -> RequestDescriptor {
    RequestDescriptor::get("/products/search")
        .query("q", term)
        .page(page)
}

/// `GET /products?select=a,b`, limiting each item to the listed fields.
pub fn select<S: AsRef<str>>(fields: &[S], page: Page) -> RequestDescriptor {
    let joined = fields
        .iter()
        .map(|f| f.as_ref().trim())
        .filter(|f| !f.is_empty())
        .collect::<Vec<_>>()
        .join(",");
    RequestDescriptor::get("/products")
        .query("select", joined)
        .page(page)
}

/// `GET /products?sortBy=&order=`
pub fn sorted(directive: &SortDirective, page: Page) -> RequestDescriptor {
    RequestDescriptor::get("/products")
        .query("sortBy", &directive.field)
        .query("order", directive.order)
        .page(page)
}

/// `GET /products/category/{slug}`
pub fn by_category(slug: &str, page: Page) -> RequestDescriptor {
    RequestDescriptor::get(format!("/products/category/{}", slug)).page(page)
}

/// `GET /products/categories`, category objects with slug, name and url.
pub fn categories() -> RequestDescriptor {
    RequestDescriptor::get("/products/categories")
}

/// `GET /products/category-list`, bare category slugs.
pub fn category_list() -> RequestDescriptor {
    RequestDescriptor::get("/products/category-list")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Method;

    #[test]
    fn paths_are_verbatim() {
        assert_eq!(all(Page::default()).path, "/products");
        assert_eq!(one(7).path, "/products/7");
        assert_eq!(search("phone", Page::default()).path, "/products/search");
        assert_eq!(categories().path, "/products/categories");
        assert_eq!(category_list().path, "/products/category-list");
        assert_eq!(
            by_category("smartphones", Page::default()).path,
            "/products/category/smartphones"
        );
        assert!(all(Page::default()).method == Method::GET);
    }

    #[test]
    fn search_carries_term_and_window() {
        let req = search("laptop", Page::new(5, 10));
        assert_eq!(req.query_value("q"), Some("laptop"));
        assert_eq!(req.query_value("limit"), Some("5"));
        assert_eq!(req.query_value("skip"), Some("10"));
    }

    #[test]
    fn select_joins_and_trims_fields() {
        let req = select(&["title", " price ", ""], Page::default());
        assert_eq!(req.query_value("select"), Some("title,price"));
    }

    #[test]
    fn sorted_uses_sort_by_and_order() {
        let req = sorted(&SortDirective::desc("price"), Page::everything());
        assert_eq!(req.query_value("sortBy"), Some("price"));
        assert_eq!(req.query_value("order"), Some("desc"));
        assert_eq!(req.query_value("limit"), Some("0"));
    }
}
