use std::collections::BTreeSet;

use catalog_client::{products, Page};
use catalog_ordering::{assert_sorted_by_key, SortDirective};
use futures_util::future::BoxFuture;
use serde_json::Value;
use tracing::debug;

use super::expect::{
    expect_count, expect_fields, expect_status, expect_that, str_field, u64_field, CheckResult,
};
use super::{Case, SuiteContext};

const WINDOW: u32 = 10;

pub(crate) fn cases() -> Vec<Case> {
    vec![
        Case::new("products", "default_page", "GET /products returns the default window", default_page),
        Case::new("products", "limit_and_skip", "limit/skip select the requested window", limit_and_skip),
        Case::new("products", "limit_zero_returns_all", "limit=0 returns the whole catalog", limit_zero_returns_all),
        Case::new("products", "single_product", "GET /products/{id} returns one product", single_product),
        Case::new("products", "unknown_product", "an unknown id yields 404", unknown_product),
        Case::new("products", "search_matches_term", "search results mention the term", search_matches_term),
        Case::new("products", "search_without_hits", "an unmatched search is empty", search_without_hits),
        Case::new("products", "select_fields", "select limits each item to id plus the listed fields", select_fields),
        Case::new("products", "sort_title_asc", "sortBy=title order=asc", sort_title_asc),
        Case::new("products", "sort_title_desc", "sortBy=title order=desc", sort_title_desc),
        Case::new("products", "sort_price_asc", "sortBy=price order=asc", sort_price_asc),
        Case::new("products", "sort_price_desc", "sortBy=price order=desc", sort_price_desc),
        Case::new("categories", "category_objects", "categories carry slug, name and url", category_objects),
        Case::new("categories", "category_list_matches", "category-list names the same slugs as categories", category_list_matches),
        Case::new("categories", "products_by_category", "a category listing only holds that category", products_by_category),
    ]
}

fn default_page(ctx: &mut SuiteContext) -> BoxFuture<'_, CheckResult> {
    Box::pin(async move {
        let resp = ctx.call(&products::all(Page::default())).await?;
        expect_status(&resp, 200)?;
        let total = u64_field(&resp.body, "total", "listing")?;
        let returned = resp.items("products").len() as u64;
        expect_count("products returned", ctx.expectations.default_limit.min(total), returned)?;
        expect_count("skip", ctx.expectations.default_skip, u64_field(&resp.body, "skip", "listing")?)?;
        expect_count("limit", returned, u64_field(&resp.body, "limit", "listing")?)
    })
}

fn limit_and_skip(ctx: &mut SuiteContext) -> BoxFuture<'_, CheckResult> {
    Box::pin(async move {
        let resp = ctx.call(&products::all(Page::new(WINDOW, WINDOW))).await?;
        expect_status(&resp, 200)?;
        let total = u64_field(&resp.body, "total", "listing")?;
        let items = resp.items("products");
        let expected = u64::from(WINDOW).min(total.saturating_sub(u64::from(WINDOW)));
        expect_count("products returned", expected, items.len() as u64)?;
        expect_count("skip", u64::from(WINDOW), u64_field(&resp.body, "skip", "listing")?)?;
        if let Some(first) = items.first() {
            // ids are contiguous from 1 on the live service
            expect_count("first id in window", u64::from(WINDOW) + 1, u64_field(first, "id", "product")?)?;
        }
        Ok(())
    })
}

fn limit_zero_returns_all(ctx: &mut SuiteContext) -> BoxFuture<'_, CheckResult> {
    Box::pin(async move {
        let resp = ctx.call(&products::all(Page::everything())).await?;
        expect_status(&resp, 200)?;
        let total = u64_field(&resp.body, "total", "listing")?;
        expect_count("products returned", total, resp.items("products").len() as u64)
    })
}

fn single_product(ctx: &mut SuiteContext) -> BoxFuture<'_, CheckResult> {
    Box::pin(async move {
        let id = ctx.expectations.probe_product_id;
        let resp = ctx.call(&products::one(id)).await?;
        expect_status(&resp, 200)?;
        expect_fields(&resp.body, &["id", "title", "description", "price", "category"], "product")?;
        expect_count("product id", id, u64_field(&resp.body, "id", "product")?)
    })
}

fn unknown_product(ctx: &mut SuiteContext) -> BoxFuture<'_, CheckResult> {
    Box::pin(async move {
        let id = ctx.expectations.missing_product_id;
        let resp = ctx.call(&products::one(id)).await?;
        expect_status(&resp, 404)?;
        let message = str_field(&resp.body, "message", "error body")?;
        expect_that(message.to_lowercase().contains("not found"), || {
            format!("unexpected 404 message: {message}")
        })
    })
}

fn mentions(product: &Value, needle: &str) -> bool {
    ["title", "description", "category", "brand", "tags"]
        .iter()
        .filter_map(|f| product.get(*f))
        .any(|v| v.to_string().to_lowercase().contains(needle))
}

fn search_matches_term(ctx: &mut SuiteContext) -> BoxFuture<'_, CheckResult> {
    Box::pin(async move {
        let term = ctx.expectations.search_term.clone();
        let resp = ctx.call(&products::search(&term, Page::default())).await?;
        expect_status(&resp, 200)?;
        let items = resp.items("products");
        expect_that(!items.is_empty(), || format!("search for '{term}' returned nothing"))?;
        let total = u64_field(&resp.body, "total", "search")?;
        expect_that(total >= items.len() as u64, || {
            format!("total {total} is below the {} returned items", items.len())
        })?;
        let needle = term.to_lowercase();
        for product in items {
            expect_that(mentions(product, &needle), || {
                format!("product {} does not mention '{term}'", product["id"])
            })?;
        }
        Ok(())
    })
}

fn search_without_hits(ctx: &mut SuiteContext) -> BoxFuture<'_, CheckResult> {
    Box::pin(async move {
        let term = ctx.expectations.unmatched_search_term.clone();
        let resp = ctx.call(&products::search(&term, Page::default())).await?;
        expect_status(&resp, 200)?;
        expect_count("total", 0, u64_field(&resp.body, "total", "search")?)?;
        expect_count("products returned", 0, resp.items("products").len() as u64)
    })
}

fn select_fields(ctx: &mut SuiteContext) -> BoxFuture<'_, CheckResult> {
    Box::pin(async move {
        let resp = ctx
            .call(&products::select(&["title", "price"], Page::limit(WINDOW)))
            .await?;
        expect_status(&resp, 200)?;
        let items = resp.items("products");
        expect_that(!items.is_empty(), || "selection returned no products".to_string())?;
        let wanted: BTreeSet<&str> = ["id", "title", "price"].into_iter().collect();
        for product in items {
            let keys: BTreeSet<&str> = product
                .as_object()
                .map(|o| o.keys().map(String::as_str).collect())
                .unwrap_or_default();
            expect_that(keys == wanted, || {
                format!("product {} has fields {:?}, expected {:?}", product["id"], keys, wanted)
            })?;
        }
        Ok(())
    })
}

async fn check_sorted(ctx: &SuiteContext, directive: SortDirective) -> CheckResult {
    let resp = ctx.call(&products::sorted(&directive, Page::everything())).await?;
    expect_status(&resp, 200)?;
    let items = resp.items("products");
    expect_count("products returned", u64_field(&resp.body, "total", "listing")?, items.len() as u64)?;
    debug!(target: "catalog.suite", %directive, count = items.len(), "verifying order");
    assert_sorted_by_key(items, &directive.field, directive.order)?;
    Ok(())
}

fn sort_title_asc(ctx: &mut SuiteContext) -> BoxFuture<'_, CheckResult> {
    Box::pin(check_sorted(ctx, SortDirective::asc("title")))
}

fn sort_title_desc(ctx: &mut SuiteContext) -> BoxFuture<'_, CheckResult> {
    Box::pin(check_sorted(ctx, SortDirective::desc("title")))
}

fn sort_price_asc(ctx: &mut SuiteContext) -> BoxFuture<'_, CheckResult> {
    Box::pin(check_sorted(ctx, SortDirective::asc("price")))
}

fn sort_price_desc(ctx: &mut SuiteContext) -> BoxFuture<'_, CheckResult> {
    Box::pin(check_sorted(ctx, SortDirective::desc("price")))
}

fn category_objects(ctx: &mut SuiteContext) -> BoxFuture<'_, CheckResult> {
    Box::pin(async move {
        let resp = ctx.call(&products::categories()).await?;
        expect_status(&resp, 200)?;
        let list = resp.body.as_array().map(Vec::as_slice).unwrap_or(&[]);
        expect_that(!list.is_empty(), || "no categories returned".to_string())?;
        for category in list {
            for name in ["slug", "name", "url"] {
                str_field(category, name, "category")?;
            }
        }
        Ok(())
    })
}

fn category_list_matches(ctx: &mut SuiteContext) -> BoxFuture<'_, CheckResult> {
    Box::pin(async move {
        let resp = ctx.call(&products::category_list()).await?;
        expect_status(&resp, 200)?;
        let listed: BTreeSet<String> = resp
            .body
            .as_array()
            .map(|a| a.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default();
        expect_that(!listed.is_empty(), || "category-list is empty".to_string())?;

        let resp = ctx.call(&products::categories()).await?;
        expect_status(&resp, 200)?;
        let slugs: BTreeSet<String> = resp
            .body
            .as_array()
            .map(|a| {
                a.iter()
                    .filter_map(|c| c.get("slug").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        expect_that(listed == slugs, || {
            format!("category-list {:?} differs from category slugs {:?}", listed, slugs)
        })
    })
}

fn products_by_category(ctx: &mut SuiteContext) -> BoxFuture<'_, CheckResult> {
    Box::pin(async move {
        let resp = ctx.call(&products::category_list()).await?;
        expect_status(&resp, 200)?;
        let Some(slug) = resp
            .body
            .as_array()
            .and_then(|a| a.first())
            .and_then(Value::as_str)
            .map(str::to_string)
        else {
            return Err(super::CheckFailure::Assertion("category-list is empty".to_string()));
        };

        let resp = ctx.call(&products::by_category(&slug, Page::everything())).await?;
        expect_status(&resp, 200)?;
        let items = resp.items("products");
        expect_that(!items.is_empty(), || format!("category '{slug}' has no products"))?;
        expect_count("products returned", u64_field(&resp.body, "total", "listing")?, items.len() as u64)?;
        for product in items {
            let category = str_field(product, "category", "product")?;
            expect_that(category == slug, || {
                format!("product {} is in '{category}', expected '{slug}'", product["id"])
            })?;
        }
        Ok(())
    })
}
