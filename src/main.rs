//! Binary entry point for wavebar.

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    wavebar::app::run().await
}
