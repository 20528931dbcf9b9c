use crate::app::lifecycle::context::StartupContext;
use crate::app::pipeline::core::BlockingTask;
use anyhow::Error;

pub struct StopCurrencyRefresherTask;

impl BlockingTask<StartupContext, Error> for StopCurrencyRefresherTask {
    fn run(&self, ctx: &StartupContext) -> Result<(), Error> {
        if let Some(handle) = ctx.currency_refresher.lock().unwrap().take() {
            handle.abort();
        }
        Ok(())
    }
}
