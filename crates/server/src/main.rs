#[tokio::main]
async fn main() -> anyhow::Result<()> {
    server::server::start_server().await?;
    Ok(())
}
