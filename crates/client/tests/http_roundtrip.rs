use catalog_client::{
    auth, products, CatalogClient, ClientConfig, ClientError, Credentials, Page, Session,
    TokenKind,
};
use catalog_ordering::{assert_sorted_by_key, SortDirective, SortOrder};
use catalog_stub::{spawn, StubOptions, StubServer};

async fn setup() -> (StubServer, CatalogClient) {
    let stub = spawn(StubOptions::default()).await.expect("spawn stub");
    let client = CatalogClient::new(&ClientConfig::with_base_url(stub.base_url()))
        .expect("build client");
    (stub, client)
}

#[tokio::test]
async fn lists_products_with_window() {
    let (_stub, client) = setup().await;

    let resp = client
        .execute(&products::all(Page::new(5, 3)))
        .await
        .unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(resp.items("products").len(), 5);
    assert_eq!(resp.u64_field("skip"), Some(3));
    assert_eq!(resp.items("products")[0]["id"], 4);
    assert!(resp
        .header("content-type")
        .unwrap_or("")
        .starts_with("application/json"));
}

#[tokio::test]
async fn unknown_product_is_404_with_message() {
    let (_stub, client) = setup().await;

    let resp = client.execute(&products::one(0)).await.unwrap();
    assert_eq!(resp.status, 404);
    assert!(resp.field("message").unwrap().as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn sorted_listing_passes_order_check() {
    let (_stub, client) = setup().await;

    for directive in [SortDirective::asc("title"), SortDirective::desc("price")] {
        let resp = client
            .execute(&products::sorted(&directive, Page::everything()))
            .await
            .unwrap();
        assert_eq!(resp.status, 200);
        assert_sorted_by_key(resp.items("products"), &directive.field, directive.order)
            .expect("stub returns sorted listing");
    }

    let unsorted = client.execute(&products::all(Page::everything())).await.unwrap();
    let err = assert_sorted_by_key(unsorted.items("products"), "title", SortOrder::Asc)
        .unwrap_err();
    assert_eq!(err.index, Some(0));
}

#[tokio::test]
async fn login_me_refresh_flow() {
    let (_stub, client) = setup().await;
    let mut session = Session::new();

    let err = client.current_user(&session).await.unwrap_err();
    assert!(matches!(err, ClientError::MissingCredential(TokenKind::Access)));

    let resp = client
        .login(&mut session, &Credentials::new("emilys", "emilyspass"))
        .await
        .unwrap();
    assert_eq!(resp.status, 200);
    let first_access = session.access_token().unwrap().to_string();
    let first_refresh = session.refresh_token().unwrap().to_string();

    let me = client.current_user(&session).await.unwrap();
    assert_eq!(me.status, 200);
    assert_eq!(me.body["username"], "emilys");

    let refreshed = client.refresh(&mut session, None, Some(30)).await.unwrap();
    assert_eq!(refreshed.status, 200);
    assert_ne!(session.access_token().unwrap(), first_access);
    assert_ne!(session.refresh_token().unwrap(), first_refresh);

    let me = client.current_user(&session).await.unwrap();
    assert_eq!(me.status, 200);
}

#[tokio::test]
async fn refresh_retires_previous_tokens() {
    let (_stub, client) = setup().await;
    let mut session = Session::new();
    client
        .login(&mut session, &Credentials::new("emilys", "emilyspass"))
        .await
        .unwrap();
    let first_access = session.access_token().unwrap().to_string();
    let first_refresh = session.refresh_token().unwrap().to_string();

    let refreshed = client.refresh(&mut session, None, None).await.unwrap();
    assert_eq!(refreshed.status, 200);

    let stale = client
        .execute(&auth::current_user_with_token(&first_access))
        .await
        .unwrap();
    assert_eq!(stale.status, 401);

    let reused = client
        .execute(&auth::refresh(&Session::new(), Some(&first_refresh), None).unwrap())
        .await
        .unwrap();
    assert_eq!(reused.status, 403);

    let me = client.current_user(&session).await.unwrap();
    assert_eq!(me.status, 200);
}

#[tokio::test]
async fn failed_login_leaves_session_empty() {
    let (_stub, client) = setup().await;
    let mut session = Session::new();

    let resp = client
        .login(&mut session, &Credentials::new("emilys", "wrong"))
        .await
        .unwrap();
    assert_eq!(resp.status, 400);
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn bogus_token_is_rejected() {
    let (_stub, client) = setup().await;

    let resp = client
        .execute(&auth::current_user_with_token("not-a-token"))
        .await
        .unwrap();
    assert_eq!(resp.status, 401);
}
