use catalog_client::auth;
use futures_util::future::BoxFuture;

use super::expect::{expect_status, expect_that, str_field, CheckResult};
use super::{Case, SuiteContext};

pub(crate) fn cases() -> Vec<Case> {
    vec![
        Case::new("auth", "login", "valid credentials return and cache both tokens", login),
        Case::new("auth", "login_rejects_wrong_password", "a wrong password is refused with 400", login_rejects_wrong_password),
        Case::new("auth", "current_user", "/auth/me answers for the cached access token", current_user),
        Case::new("auth", "current_user_rejects_bogus_token", "/auth/me refuses an unknown token", current_user_rejects_bogus_token),
        Case::new("auth", "refresh_rotates_tokens", "/auth/refresh hands out tokens that keep working", refresh_rotates_tokens),
    ]
}

fn login(ctx: &mut SuiteContext) -> BoxFuture<'_, CheckResult> {
    Box::pin(async move {
        let resp = ctx.client.login(&mut ctx.session, &ctx.credentials).await?;
        expect_status(&resp, 200)?;
        str_field(&resp.body, "accessToken", "login body")?;
        str_field(&resp.body, "refreshToken", "login body")?;
        let username = str_field(&resp.body, "username", "login body")?;
        expect_that(username == ctx.credentials.username, || {
            format!("logged in as '{username}', expected '{}'", ctx.credentials.username)
        })?;
        expect_that(ctx.session.is_authenticated(), || {
            "login succeeded but no token was cached".to_string()
        })
    })
}

fn login_rejects_wrong_password(ctx: &mut SuiteContext) -> BoxFuture<'_, CheckResult> {
    Box::pin(async move {
        let mut wrong = ctx.credentials.clone();
        wrong.password.push_str("-wrong");
        let resp = ctx.call(&auth::login(&wrong)).await?;
        expect_status(&resp, 400)?;
        str_field(&resp.body, "message", "error body")?;
        Ok(())
    })
}

fn current_user(ctx: &mut SuiteContext) -> BoxFuture<'_, CheckResult> {
    Box::pin(async move {
        let resp = ctx.client.current_user(&ctx.session).await?;
        expect_status(&resp, 200)?;
        let username = str_field(&resp.body, "username", "user")?;
        expect_that(username == ctx.credentials.username, || {
            format!("/auth/me returned '{username}', expected '{}'", ctx.credentials.username)
        })
    })
}

fn current_user_rejects_bogus_token(ctx: &mut SuiteContext) -> BoxFuture<'_, CheckResult> {
    Box::pin(async move {
        let resp = ctx
            .call(&auth::current_user_with_token("invalid-token"))
            .await?;
        expect_status(&resp, 401)
    })
}

fn refresh_rotates_tokens(ctx: &mut SuiteContext) -> BoxFuture<'_, CheckResult> {
    Box::pin(async move {
        let expires = ctx.credentials.expires_in_mins;
        let resp = ctx.client.refresh(&mut ctx.session, None, expires).await?;
        expect_status(&resp, 200)?;
        let access = str_field(&resp.body, "accessToken", "refresh body")?;
        let refresh = str_field(&resp.body, "refreshToken", "refresh body")?;
        expect_that(ctx.session.access_token()? == access, || {
            "cached access token was not overwritten".to_string()
        })?;
        expect_that(ctx.session.refresh_token()? == refresh, || {
            "cached refresh token was not overwritten".to_string()
        })?;

        let me = ctx.client.current_user(&ctx.session).await?;
        expect_status(&me, 200)
    })
}
