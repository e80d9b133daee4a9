use crate::cli::utils::output_data;
use crate::cli::{AdminClient, OutputFormat};

pub async fn handle(client: &AdminClient, output_format: OutputFormat) -> anyhow::Result<()> {
    let (healthy, body) = client.health().await?;
    output_data(&output_format, &body)?;

    if !healthy {
        anyhow::bail!("server reported degraded health");
    }
    Ok(())
}
