use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    pdfcal::cli::run().await
}
