use crate::app::http::{self, AppState};
use crate::app::lifecycle::context::StartupContext;
use crate::app::pipeline::core::AsyncTask;
use actix_web::{App, HttpServer, web};
use anyhow::{Error, anyhow, bail};
use async_trait::async_trait;

pub struct StartServerTask;

#[async_trait]
impl AsyncTask<StartupContext, Error> for StartServerTask {
    async fn run(&self, ctx: &StartupContext) -> Result<(), Error> {
        let config = ctx.config.get().ok_or_else(|| anyhow!("config missing during start server task"))?;
        let port = config.port;

        if ctx.auction_pipeline.get().is_none() {
            bail!("auction pipeline not built before server start");
        }

        let state = AppState::from_startup(ctx);

        let server = HttpServer::new(move || App::new().app_data(web::Data::new(state.clone())).configure(http::configure))
            .bind(("0.0.0.0", port))?
            .run();

        let handle = server.handle();
        tokio::spawn(server);

        *ctx.server_handle.lock().unwrap() = Some(handle);

        tracing::info!(port, "http server started");

        Ok(())
    }
}
