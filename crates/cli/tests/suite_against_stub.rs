use catalog_cli::config::{Expectations, SuiteConfig};
use catalog_cli::suite::{run_suite, CaseStatus, RunMode, RunnerOptions, Suite, SuiteContext};
use catalog_client::{CatalogClient, ClientConfig, Credentials};
use catalog_stub::{spawn, Catalog, StubOptions, StubServer};
use serde_json::json;

async fn context_for(options: StubOptions) -> (StubServer, SuiteContext) {
    let stub = spawn(options).await.expect("spawn stub");
    let client = CatalogClient::new(&ClientConfig::with_base_url(stub.base_url()))
        .expect("build client");
    let config = SuiteConfig::default();
    let ctx = SuiteContext::new(
        client,
        config.credentials.to_credentials(),
        config.expectations.clone(),
    );
    (stub, ctx)
}

fn options(mode: RunMode, retries: u32, filter: Option<&str>) -> RunnerOptions {
    RunnerOptions {
        mode,
        retries,
        filter: filter.map(str::to_string),
    }
}

#[tokio::test]
async fn whole_suite_passes_against_conforming_service() {
    let (_stub, mut ctx) = context_for(StubOptions::default()).await;

    let report = run_suite(&Suite::standard(), &mut ctx, &options(RunMode::Open, 0, None)).await;

    let failures: Vec<String> = report
        .cases
        .iter()
        .filter(|c| c.status == CaseStatus::Failed)
        .map(|c| format!("{}: {}", c.full_name(), c.error.clone().unwrap_or_default()))
        .collect();
    assert!(failures.is_empty(), "failures: {:#?}", failures);
    assert_eq!(report.passed, Suite::standard().len());
    assert!(ctx.session.is_authenticated());
}

#[tokio::test]
async fn missing_login_is_not_retried() {
    let (_stub, mut ctx) = context_for(StubOptions::default()).await;

    let report = run_suite(
        &Suite::standard(),
        &mut ctx,
        &options(RunMode::Run, 2, Some("auth.current_user")),
    )
    .await;

    let me = report.outcome("auth.current_user").expect("current_user ran");
    assert_eq!(me.status, CaseStatus::Failed);
    assert_eq!(me.attempts, 1);
    assert!(me.error.as_deref().unwrap_or("").contains("missing credential"));

    let bogus = report
        .outcome("auth.current_user_rejects_bogus_token")
        .expect("bogus token case ran");
    assert_eq!(bogus.status, CaseStatus::Passed);
    assert!(report.skipped > 0);
}

#[tokio::test]
async fn unsorted_service_reports_ordering_diagnostic() {
    // every product shares one price and the service ignores ids on ties
    let products = (1..=6)
        .rev()
        .map(|id| {
            json!({
                "id": id,
                "title": format!("Item {id}"),
                "description": "phone accessory",
                "category": "smartphones",
                "price": 5,
            })
        })
        .collect();
    let stub_options = StubOptions {
        catalog: Catalog::from_products(products).without_id_tie_break(),
        ..StubOptions::default()
    };
    let (_stub, mut ctx) = context_for(stub_options).await;

    let report = run_suite(
        &Suite::standard(),
        &mut ctx,
        &options(RunMode::Open, 0, Some("products.sort_price_asc")),
    )
    .await;

    let outcome = report.outcome("products.sort_price_asc").expect("price sort ran");
    assert_eq!(outcome.status, CaseStatus::Failed);
    assert_eq!(outcome.attempts, 1);
    assert!(outcome.error.as_deref().unwrap().contains("not sorted by 'price' asc"));

    let diagnostic = outcome.diagnostic.as_ref().expect("ordering diagnostic attached");
    assert_eq!(diagnostic["index"], 0);
    assert_eq!(diagnostic["key"], "price");
    assert_eq!(diagnostic["order"], "asc");
    assert_eq!(diagnostic["expected"]["id"], 1);
    assert_eq!(diagnostic["actual"]["id"], 6);

    let json = serde_json::to_value(&report).expect("report serializes");
    let case = json["cases"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "sort_price_asc")
        .cloned()
        .unwrap();
    assert_eq!(case["diagnostic"]["index"], 0);
    assert!(!report.is_success());
}

#[tokio::test]
async fn failing_case_is_retried_in_run_mode() {
    let (_stub, mut ctx) = context_for(StubOptions::default()).await;
    ctx.expectations = Expectations {
        missing_product_id: 1,
        ..Expectations::default()
    };

    let report = run_suite(
        &Suite::standard(),
        &mut ctx,
        &options(RunMode::Run, 2, Some("products.unknown_product")),
    )
    .await;

    let outcome = report.outcome("products.unknown_product").unwrap();
    assert_eq!(outcome.status, CaseStatus::Failed);
    assert_eq!(outcome.attempts, 3);
    assert!(outcome.error.as_deref().unwrap().contains("expected status 404, got 200"));
    assert!(!report.is_success());
}

#[tokio::test]
async fn wrong_credentials_fail_login_case() {
    let (_stub, mut ctx) = context_for(StubOptions::default()).await;
    ctx.credentials = Credentials::new("emilys", "nope");

    let report = run_suite(
        &Suite::standard(),
        &mut ctx,
        &options(RunMode::Open, 0, Some("auth.login")),
    )
    .await;

    assert_eq!(report.outcome("auth.login").unwrap().status, CaseStatus::Failed);
    // the wrong-password case derives its password from the configured one
    assert_eq!(
        report.outcome("auth.login_rejects_wrong_password").unwrap().status,
        CaseStatus::Passed
    );
    assert!(!ctx.session.is_authenticated());
}
