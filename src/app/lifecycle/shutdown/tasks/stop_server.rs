use crate::app::lifecycle::context::StartupContext;
use crate::app::pipeline::core::AsyncTask;
use anyhow::Error;
use async_trait::async_trait;

pub struct StopServerTask;

#[async_trait]
impl AsyncTask<StartupContext, Error> for StopServerTask {
    async fn run(&self, ctx: &StartupContext) -> Result<(), Error> {
        let handle = ctx.server_handle.lock().unwrap().take();
        match handle {
            Some(handle) => {
                tracing::info!("stopping http server, draining in-flight requests");
                handle.stop(true).await;
            }
            None => tracing::warn!("shutdown requested but server was never started"),
        }
        Ok(())
    }
}
