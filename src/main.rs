#[tokio::main]
async fn main() -> anyhow::Result<()> {
    timetracker::run().await
}
