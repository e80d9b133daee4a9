use crate::cli::utils::output_data;
use crate::cli::{AdminClient, OutputFormat};

pub async fn handle(client: &AdminClient, query: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let results = client.search(query).await?;
    output_data(&output_format, &results)
}
