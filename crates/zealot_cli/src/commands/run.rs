//! Run command - one full provisioning pass for a named resource.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use tracing::info;

use zealot_core::{ApplyOutcome, RunSequence, RunSpec};
use zealot_runner::TerraformCli;
use zealot_store::HttpTransport;

#[derive(Args)]
pub struct RunArgs {
    /// Name of the run, selecting its jobconfig namespace
    #[arg(short, long)]
    pub name: String,

    /// Resource type whose template to render
    #[arg(short, long)]
    pub resource: String,

    /// Address of the backing store agent
    #[arg(long, env = "ZEALOT_STORE_ADDR", default_value = "http://127.0.0.1:8500")]
    pub store_addr: String,

    /// Tool version to fetch for the run
    #[arg(long, env = "ZEALOT_TOOL_VERSION", default_value = "0.11.1")]
    pub tool_version: String,

    /// Workspace the run belongs to
    #[arg(long, env = "ZEALOT_WORKSPACE", default_value = "development")]
    pub workspace: String,
}

pub async fn execute(args: RunArgs) -> Result<()> {
    info!(
        "starting run '{}' for resource type '{}' ({})",
        args.name, args.resource, args.workspace
    );

    let transport = Arc::new(HttpTransport::connect(&args.store_addr).await?);
    let provisioner = Arc::new(TerraformCli::new());
    let spec = RunSpec::new(&args.name, &args.resource)
        .workspace(&args.workspace)
        .tool_version(&args.tool_version);

    let mut run = RunSequence::new(spec, transport, provisioner);

    run.init().await?;
    run.plan().await?;
    match run.apply().await? {
        ApplyOutcome::Applied => println!("✅ Changes applied"),
        ApplyOutcome::Skipped => {
            println!("⏭️  No changes available or autoapply not set, apply skipped")
        }
    }
    Ok(())
}
