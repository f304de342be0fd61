use tracing::error;

#[tokio::main]
async fn main() {
    if let Err(err) = upi_bridge::run().await {
        error!("Server exited with error: {}", err);
        std::process::exit(1);
    }
}
