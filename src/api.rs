use std::convert::Infallible;
use std::fmt::Display;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use sqlx::sqlite::SqlitePool;
use uuid::Uuid;
use warp::http::header::{self, HeaderValue};
use warp::http::{StatusCode, Uri};
use warp::hyper::Body;
use warp::reply::{Reply, Response};
use warp::Filter;

use crate::accounts::{self, Role};
use crate::db::DATE_FORMAT;
use crate::errors::AccountError;
use crate::session::{self, Session, SessionKey};
use crate::{export, ledger, views};

pub const EMPLOYEE_RECENT_LIMIT: u32 = 10;
pub const ADMIN_RECENT_LIMIT: u32 = 500;

const LOGIN_FAILED: &str = "Usuário ou senha incorretos.";
const MISSING_FIELDS: &str = "Nome e senha são obrigatórios.";
const CREATE_FAILED: &str = "Erro ao criar usuário (talvez já exista).";

/// Everything a handler needs, built once at startup and cloned into each filter.
#[derive(Clone, Debug)]
pub struct AppContext {
    pub pool: SqlitePool,
    pub sessions: SessionKey,
}

impl AppContext {
    pub fn new(pool: SqlitePool, sessions: SessionKey) -> Self {
        AppContext { pool, sessions }
    }
}

#[derive(Deserialize, Default)]
pub struct LoginForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub secret: String,
}

#[derive(Deserialize, Default)]
pub struct PunchForm {
    pub kind: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct AdminForm {
    pub action: Option<String>,
    pub name: Option<String>,
    pub secret: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct AddTimeForm {
    pub account_id: Option<String>,
    pub kind: Option<String>,
}

fn with_ctx(ctx: AppContext) -> impl Filter<Extract = (AppContext,), Error = Infallible> + Clone {
    warp::any().map(move || ctx.clone())
}

fn with_session(
    keys: SessionKey,
) -> impl Filter<Extract = (Option<Session>,), Error = Infallible> + Clone {
    warp::cookie::optional::<String>(session::SESSION_COOKIE)
        .map(move |token: Option<String>| token.and_then(|t| keys.verify(&t)))
}

// A body that doesn't parse is treated as an empty form, so role checks
// still decide the outcome.
fn form_body<T>() -> impl Filter<Extract = (T,), Error = Infallible> + Clone
where
    T: DeserializeOwned + Default + Send + 'static,
{
    warp::body::content_length_limit(1024 * 16)
        .and(warp::body::form())
        .or(warp::any().map(T::default))
        .unify()
}

pub fn routes(
    ctx: AppContext,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    login_form()
        .or(login(ctx.clone()))
        .or(employee_home(ctx.clone()))
        .or(punch(ctx.clone()))
        .or(admin_home(ctx.clone()))
        .or(admin_action(ctx.clone()))
        .or(add_time(ctx.clone()))
        .or(export_csv(ctx))
        .or(logout())
        .with(warp::trace(|info| {
            tracing::info_span!(
                "request",
                request_id = %Uuid::new_v4(),
                method = %info.method(),
                path = %info.path()
            )
        }))
}

// Filters
pub fn login_form() -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::get()
        .and(warp::path::end())
        .map(|| warp::reply::html(views::login_page(None)))
}

pub fn login(ctx: AppContext) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::post()
        .and(warp::path::end())
        .and(form_body::<LoginForm>())
        .and(with_ctx(ctx))
        .and_then(login_handler)
}

pub fn employee_home(
    ctx: AppContext,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::get()
        .and(warp::path!("funcionario"))
        .and(with_session(ctx.sessions.clone()))
        .and(with_ctx(ctx))
        .and_then(employee_home_handler)
}

pub fn punch(ctx: AppContext) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::post()
        .and(warp::path!("funcionario"))
        .and(with_session(ctx.sessions.clone()))
        .and(form_body::<PunchForm>())
        .and(with_ctx(ctx))
        .and_then(punch_handler)
}

pub fn admin_home(
    ctx: AppContext,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::get()
        .and(warp::path!("admin"))
        .and(with_session(ctx.sessions.clone()))
        .and(with_ctx(ctx))
        .and_then(admin_home_handler)
}

pub fn admin_action(
    ctx: AppContext,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::post()
        .and(warp::path!("admin"))
        .and(with_session(ctx.sessions.clone()))
        .and(form_body::<AdminForm>())
        .and(with_ctx(ctx))
        .and_then(admin_action_handler)
}

pub fn add_time(ctx: AppContext) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::post()
        .and(warp::path!("admin" / "add_time"))
        .and(with_session(ctx.sessions.clone()))
        .and(form_body::<AddTimeForm>())
        .and(with_ctx(ctx))
        .and_then(add_time_handler)
}

pub fn export_csv(
    ctx: AppContext,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::get()
        .and(warp::path!("exportar"))
        .and(with_session(ctx.sessions.clone()))
        .and(with_ctx(ctx))
        .and_then(export_handler)
}

pub fn logout() -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::get().and(warp::path!("logout")).map(|| {
        warp::reply::with_header(
            redirect_to("/"),
            header::SET_COOKIE,
            session::cleared_cookie(),
        )
    })
}

// Helpers
fn redirect_to(path: &'static str) -> Response {
    warp::redirect::see_other(Uri::from_static(path)).into_response()
}

fn to_login() -> Response {
    redirect_to("/")
}

fn html(body: String) -> Response {
    warp::reply::html(body).into_response()
}

fn internal_error<E: Display>(err: E) -> Response {
    tracing::error!(error = %err, "request failed");
    warp::reply::with_status("Internal Server Error", StatusCode::INTERNAL_SERVER_ERROR)
        .into_response()
}

fn require(session: Option<Session>, role: Role) -> Option<Session> {
    session.filter(|s| s.role == role)
}

async fn render_employee(ctx: &AppContext, session: &Session, message: Option<&str>) -> Response {
    match ledger::recent_for(&ctx.pool, session.account_id, EMPLOYEE_RECENT_LIMIT).await {
        Ok(events) => html(views::employee_page(&session.display_name, message, &events)),
        Err(e) => internal_error(e),
    }
}

async fn render_admin(ctx: &AppContext, message: Option<&str>) -> Response {
    let punches = match ledger::all_joined(&ctx.pool, ADMIN_RECENT_LIMIT).await {
        Ok(p) => p,
        Err(e) => return internal_error(e),
    };
    let employees = match ledger::list_employees(&ctx.pool).await {
        Ok(e) => e,
        Err(e) => return internal_error(e),
    };

    html(views::admin_page(&punches, &employees, message))
}

// Handlers
async fn login_handler(form: LoginForm, ctx: AppContext) -> Result<Response, Infallible> {
    let name = form.name.trim();
    let secret = form.secret.trim();

    let account = match accounts::authenticate(&ctx.pool, name, secret).await {
        Ok(Some(account)) => account,
        Ok(None) => {
            tracing::info!(account = name, "login failed");
            return Ok(html(views::login_page(Some(LOGIN_FAILED))));
        }
        Err(e) => return Ok(internal_error(e)),
    };

    let token = match ctx.sessions.sign(&Session::for_account(&account)) {
        Ok(token) => token,
        Err(e) => return Ok(internal_error(e)),
    };
    tracing::info!(account_id = account.id, role = %account.role, "login");

    let landing = match account.role {
        Role::Admin => "/admin",
        Role::Employee => "/funcionario",
    };
    Ok(warp::reply::with_header(
        redirect_to(landing),
        header::SET_COOKIE,
        session::session_cookie(&token),
    )
    .into_response())
}

async fn employee_home_handler(
    session: Option<Session>,
    ctx: AppContext,
) -> Result<Response, Infallible> {
    let session = match require(session, Role::Employee) {
        Some(s) => s,
        None => return Ok(to_login()),
    };

    Ok(render_employee(&ctx, &session, None).await)
}

async fn punch_handler(
    session: Option<Session>,
    form: PunchForm,
    ctx: AppContext,
) -> Result<Response, Infallible> {
    let session = match require(session, Role::Employee) {
        Some(s) => s,
        None => return Ok(to_login()),
    };

    let kind = form.kind.unwrap_or_default();
    let event = match ledger::record(&ctx.pool, session.account_id, &kind).await {
        Ok(event) => event,
        Err(e) => return Ok(internal_error(e)),
    };

    let message = format!(
        "Ponto registrado: {} em {}",
        event.kind,
        event.timestamp.format(DATE_FORMAT)
    );
    Ok(render_employee(&ctx, &session, Some(&message)).await)
}

async fn admin_home_handler(
    session: Option<Session>,
    ctx: AppContext,
) -> Result<Response, Infallible> {
    if require(session, Role::Admin).is_none() {
        return Ok(to_login());
    }

    Ok(render_admin(&ctx, None).await)
}

async fn admin_action_handler(
    session: Option<Session>,
    form: AdminForm,
    ctx: AppContext,
) -> Result<Response, Infallible> {
    if require(session, Role::Admin).is_none() {
        return Ok(to_login());
    }

    let message = match form.action.as_deref() {
        Some("create") => {
            let name = form.name.unwrap_or_default();
            let secret = form.secret.unwrap_or_default();

            match accounts::create_employee(&ctx.pool, name.trim(), secret.trim()).await {
                Ok(account) => Some(format!("Funcionário '{}' criado com sucesso.", account.name)),
                Err(AccountError::MissingField) => Some(MISSING_FIELDS.to_string()),
                Err(AccountError::DuplicateName(name)) => {
                    tracing::info!(account = %name, "account name already taken");
                    Some(CREATE_FAILED.to_string())
                }
                Err(e @ AccountError::Storage(_)) => return Ok(internal_error(e)),
            }
        }
        _ => None,
    };

    Ok(render_admin(&ctx, message.as_deref()).await)
}

async fn add_time_handler(
    session: Option<Session>,
    form: AddTimeForm,
    ctx: AppContext,
) -> Result<Response, Infallible> {
    let admin = match require(session, Role::Admin) {
        Some(s) => s,
        None => return Ok(to_login()),
    };

    let account_id = form
        .account_id
        .as_deref()
        .and_then(|raw| raw.trim().parse::<i64>().ok());
    let kind = form.kind.filter(|k| !k.is_empty());

    match (account_id, kind) {
        (Some(account_id), Some(kind)) => {
            if let Err(e) = ledger::record(&ctx.pool, account_id, &kind).await {
                return Ok(internal_error(e));
            }
            tracing::info!(admin_id = admin.account_id, account_id, "punch added by admin");
        }
        _ => tracing::debug!("add_time missing account or kind, nothing recorded"),
    }

    Ok(redirect_to("/admin"))
}

async fn export_handler(session: Option<Session>, ctx: AppContext) -> Result<Response, Infallible> {
    if require(session, Role::Admin).is_none() {
        return Ok(to_login());
    }

    let mut res = Response::new(Body::wrap_stream(export::export_all(ctx.pool.clone())));
    res.headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("text/csv"));
    res.headers_mut().insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static("attachment;filename=registros.csv"),
    );

    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::ledger::tests::at;
    use anyhow::Result;
    use bytes::Bytes;
    use chrono::Duration;
    use warp::http::Response as HttpResponse;

    async fn setup_ctx() -> Result<AppContext> {
        let pool = db::tests::setup_test_db().await?;
        accounts::bootstrap(&pool).await?;
        let key = SessionKey::new(b"test-secret".to_vec(), Duration::hours(1));

        Ok(AppContext::new(pool, key))
    }

    async fn post_form(ctx: &AppContext, path: &str, body: &str, cookie: Option<&str>) -> HttpResponse<Bytes> {
        let mut req = warp::test::request()
            .method("POST")
            .path(path)
            .header("content-type", "application/x-www-form-urlencoded")
            .body(body.to_string());
        if let Some(cookie) = cookie {
            req = req.header("cookie", cookie);
        }
        req.reply(&routes(ctx.clone())).await
    }

    async fn get(ctx: &AppContext, path: &str, cookie: Option<&str>) -> HttpResponse<Bytes> {
        let mut req = warp::test::request().method("GET").path(path);
        if let Some(cookie) = cookie {
            req = req.header("cookie", cookie);
        }
        req.reply(&routes(ctx.clone())).await
    }

    fn location(res: &HttpResponse<Bytes>) -> &str {
        res.headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    fn body(res: &HttpResponse<Bytes>) -> String {
        String::from_utf8_lossy(res.body()).into_owned()
    }

    /// Logs in and returns the `name=value` pair to send back as a cookie.
    async fn login_as(ctx: &AppContext, name: &str, secret: &str) -> Option<String> {
        let res = post_form(ctx, "/", &format!("name={}&secret={}", name, secret), None).await;
        let set_cookie = res.headers().get("set-cookie")?.to_str().ok()?;
        set_cookie.split(';').next().map(str::to_string)
    }

    fn assert_redirects_to_login(res: &HttpResponse<Bytes>) {
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(res), "/");
    }

    #[tokio::test]
    async fn test_login_form() -> Result<()> {
        let ctx = setup_ctx().await?;

        let res = get(&ctx, "/", None).await;

        assert_eq!(res.status(), 200);
        assert!(body(&res).contains("<form method=\"post\" action=\"/\">"));

        Ok(())
    }

    #[tokio::test]
    async fn test_bad_login_shows_generic_error() -> Result<()> {
        let ctx = setup_ctx().await?;

        for form in ["name=admin&secret=wrong", "name=nobody&secret=admin", ""] {
            let res = post_form(&ctx, "/", form, None).await;
            assert_eq!(res.status(), 200);
            assert!(res.headers().get("set-cookie").is_none());
            assert!(body(&res).contains(LOGIN_FAILED));
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_login_trims_fields() -> Result<()> {
        let ctx = setup_ctx().await?;

        let res = post_form(&ctx, "/", "name=+admin+&secret=admin+", None).await;

        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res), "/admin");
        assert!(res.headers().get("set-cookie").is_some());

        Ok(())
    }

    #[tokio::test]
    async fn test_only_english_field_names_are_read() -> Result<()> {
        let ctx = setup_ctx().await?;

        let res = post_form(&ctx, "/", "nome=admin&senha=admin", None).await;
        assert_eq!(res.status(), 200);
        assert!(res.headers().get("set-cookie").is_none());
        assert!(body(&res).contains(LOGIN_FAILED));

        let admin = login_as(&ctx, "admin", "admin").await;
        let res = post_form(&ctx, "/admin", "action=criar&name=maria&secret=1", admin.as_deref()).await;
        assert_eq!(res.status(), 200);
        assert_eq!(accounts::count(&ctx.pool).await?, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_admin_routes_require_admin_session() -> Result<()> {
        let ctx = setup_ctx().await?;
        accounts::create_employee(&ctx.pool, "joao", "1234").await?;
        let employee = login_as(&ctx, "joao", "1234").await;
        assert!(employee.is_some());

        let expired_key = SessionKey::new(b"test-secret".to_vec(), Duration::hours(-1));
        let admin = accounts::authenticate(&ctx.pool, "admin", "admin").await?.unwrap();
        let expired = format!(
            "session={}",
            expired_key.sign(&Session::for_account(&admin))?
        );

        let sessions = [
            None,
            employee.as_deref(),
            Some("session="),
            Some(expired.as_str()),
            Some("session=forged.token"),
        ];
        for cookie in sessions {
            assert_redirects_to_login(&get(&ctx, "/admin", cookie).await);
            assert_redirects_to_login(&get(&ctx, "/exportar", cookie).await);
            assert_redirects_to_login(
                &post_form(&ctx, "/admin", "action=create&name=x&secret=y", cookie).await,
            );
            assert_redirects_to_login(
                &post_form(&ctx, "/admin/add_time", "account_id=1&kind=entrada", cookie).await,
            );
        }

        // Nothing leaked through: no account created, no punch written.
        assert_eq!(accounts::count(&ctx.pool).await?, 2);
        assert_eq!(ledger::count(&ctx.pool).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_employee_routes_require_employee_session() -> Result<()> {
        let ctx = setup_ctx().await?;
        let admin = login_as(&ctx, "admin", "admin").await;

        for cookie in [None, admin.as_deref(), Some("session=")] {
            assert_redirects_to_login(&get(&ctx, "/funcionario", cookie).await);
            assert_redirects_to_login(
                &post_form(&ctx, "/funcionario", "kind=entrada", cookie).await,
            );
        }
        assert_eq!(ledger::count(&ctx.pool).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_admin_creates_employee_who_punches() -> Result<()> {
        let ctx = setup_ctx().await?;

        let res = post_form(&ctx, "/", "name=admin&secret=admin", None).await;
        assert_eq!(location(&res), "/admin");
        let admin = login_as(&ctx, "admin", "admin").await;

        let res = post_form(
            &ctx,
            "/admin",
            "action=create&name=joao&secret=1234",
            admin.as_deref(),
        )
        .await;
        assert_eq!(res.status(), 200);
        assert!(body(&res).contains("Funcionário &#39;joao&#39; criado com sucesso."));

        let res = post_form(&ctx, "/", "name=joao&secret=1234", None).await;
        assert_eq!(location(&res), "/funcionario");
        let joao = login_as(&ctx, "joao", "1234").await;

        let res = post_form(&ctx, "/funcionario", "kind=entrada", joao.as_deref()).await;
        assert_eq!(res.status(), 200);
        assert!(body(&res).contains("Ponto registrado: entrada em "));

        let joao_account = accounts::authenticate(&ctx.pool, "joao", "1234").await?.unwrap();
        let event = ledger::recent_for(&ctx.pool, joao_account.id, 1).await?.remove(0);
        let expected_row = format!(
            "<td>joao</td><td>{}</td><td>entrada</td>",
            event.timestamp.format(DATE_FORMAT)
        );

        let res = get(&ctx, "/admin", admin.as_deref()).await;
        assert_eq!(res.status(), 200);
        assert!(body(&res).contains(&expected_row));

        let res = get(&ctx, "/funcionario", joao.as_deref()).await;
        assert!(body(&res).contains(&format!(
            "<tr><td>{}</td><td>entrada</td></tr>",
            event.timestamp.format(DATE_FORMAT)
        )));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_employee_failures() -> Result<()> {
        let ctx = setup_ctx().await?;
        let admin = login_as(&ctx, "admin", "admin").await;
        accounts::create_employee(&ctx.pool, "joao", "1234").await?;
        let before = accounts::count(&ctx.pool).await?;

        let res = post_form(&ctx, "/admin", "action=create&name=joao&secret=x", admin.as_deref()).await;
        assert!(body(&res).contains(CREATE_FAILED));

        let res = post_form(&ctx, "/admin", "action=create&name=+&secret=x", admin.as_deref()).await;
        assert!(body(&res).contains(MISSING_FIELDS));

        let res = post_form(&ctx, "/admin", "action=create&name=maria", admin.as_deref()).await;
        assert!(body(&res).contains(MISSING_FIELDS));

        assert_eq!(accounts::count(&ctx.pool).await?, before);

        Ok(())
    }

    #[tokio::test]
    async fn test_add_time() -> Result<()> {
        let ctx = setup_ctx().await?;
        let admin = login_as(&ctx, "admin", "admin").await;
        let joao = accounts::create_employee(&ctx.pool, "joao", "1234").await?;

        let res = post_form(
            &ctx,
            "/admin/add_time",
            &format!("account_id={}&kind=saida", joao.id),
            admin.as_deref(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&res), "/admin");

        let recent = ledger::recent_for(&ctx.pool, joao.id, 10).await?;
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].kind, "saida");

        for form in ["account_id=&kind=saida", "account_id=abc&kind=saida", "account_id=2", ""] {
            let res = post_form(&ctx, "/admin/add_time", form, admin.as_deref()).await;
            assert_eq!(location(&res), "/admin");
        }
        assert_eq!(ledger::count(&ctx.pool).await?, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_employee_page_shows_last_ten_own_punches() -> Result<()> {
        let ctx = setup_ctx().await?;
        let joao = accounts::create_employee(&ctx.pool, "joao", "1234").await?;
        let maria = accounts::create_employee(&ctx.pool, "maria", "1234").await?;
        for minute in 0..12 {
            let ts = at(&format!("2024-03-01 08:{:02}:00", minute));
            ledger::record_at(&ctx.pool, joao.id, &format!("k{}", minute), ts).await?;
        }
        ledger::record_at(&ctx.pool, maria.id, "entrada", at("2024-03-01 09:00:00")).await?;
        let cookie = login_as(&ctx, "joao", "1234").await;

        let page = body(&get(&ctx, "/funcionario", cookie.as_deref()).await);

        assert_eq!(page.matches("<tr><td>").count(), EMPLOYEE_RECENT_LIMIT as usize);
        assert!(page.contains("<td>2024-03-01 08:11:00</td><td>k11</td>"));
        assert!(page.contains("<td>2024-03-01 08:02:00</td><td>k2</td>"));
        assert!(!page.contains("<td>k1</td>"));
        assert!(!page.contains("09:00:00"));

        Ok(())
    }

    #[tokio::test]
    async fn test_admin_page_caps_joined_punches() -> Result<()> {
        let ctx = setup_ctx().await?;
        let joao = accounts::create_employee(&ctx.pool, "joao", "1234").await?;
        let total = ADMIN_RECENT_LIMIT + 3;
        for i in 0..total {
            let ts = at(&format!("2024-03-01 {:02}:{:02}:00", 8 + i / 60, i % 60));
            ledger::record_at(&ctx.pool, joao.id, "entrada", ts).await?;
        }
        let cookie = login_as(&ctx, "admin", "admin").await;

        let page = body(&get(&ctx, "/admin", cookie.as_deref()).await);

        assert_eq!(page.matches("<tr><td>").count(), ADMIN_RECENT_LIMIT as usize);
        // The oldest punches fall off the end.
        assert!(page.contains("<td>2024-03-01 16:22:00</td>"));
        assert!(!page.contains("<td>2024-03-01 08:00:00</td>"));

        Ok(())
    }

    #[tokio::test]
    async fn test_export() -> Result<()> {
        let ctx = setup_ctx().await?;
        let admin = login_as(&ctx, "admin", "admin").await;
        let joao = accounts::create_employee(&ctx.pool, "joao", "1234").await?;
        let event = ledger::record(&ctx.pool, joao.id, "entrada").await?;

        let res = get(&ctx, "/exportar", admin.as_deref()).await;

        assert_eq!(res.status(), 200);
        assert_eq!(res.headers()["content-type"], "text/csv");
        assert_eq!(
            res.headers()["content-disposition"],
            "attachment;filename=registros.csv"
        );
        assert_eq!(
            body(&res),
            format!(
                "Funcionario,Horario,Tipo\njoao,{},entrada\n",
                event.timestamp.format(DATE_FORMAT)
            )
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_logout_clears_session() -> Result<()> {
        let ctx = setup_ctx().await?;

        let res = get(&ctx, "/logout", None).await;

        assert_redirects_to_login(&res);
        let cookie = res.headers()["set-cookie"].to_str()?;
        assert!(cookie.starts_with("session=;"));
        assert!(cookie.contains("Max-Age=0"));

        Ok(())
    }
}
