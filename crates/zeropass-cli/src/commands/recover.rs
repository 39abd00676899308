//! Rule set recovery

use crate::console::CliConsole;
use crate::context::AppContext;
use zeropass_core::RecoveryService;

pub async fn run(ctx: &AppContext, console: &CliConsole, force: bool) -> anyhow::Result<()> {
    let service = RecoveryService::new(ctx.gateway.clone(), ctx.durable.clone()).force(force);
    let report = service.recover().await;

    if console.is_json() {
        console.emit(&report)?;
    } else if report.success {
        console.success(&report.message);
    }

    if !report.success {
        anyhow::bail!(report.message);
    }
    Ok(())
}
