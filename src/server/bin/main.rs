use std::net::SocketAddr;

use anyhow::Result;

use punchclock::api::{self, AppContext};
use punchclock::config::Settings;
use punchclock::telemetry::{get_subscriber, init_subscriber};
use punchclock::{accounts, db};

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = get_subscriber("punchclock".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let settings = Settings::from_env()?;
    let pool = db::setup_pool(&settings.database_url).await?;
    db::setup_db(&pool).await?;
    accounts::bootstrap(&pool).await?;

    let ctx = AppContext::new(pool, settings.session_key());
    run(ctx, settings.addr()).await;

    Ok(())
}

async fn run(ctx: AppContext, addr: SocketAddr) {
    tracing::info!(%addr, "listening");
    warp::serve(api::routes(ctx)).run(addr).await;
}
