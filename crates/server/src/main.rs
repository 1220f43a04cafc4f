#[tokio::main]
async fn main() {
    if let Err(error) = studygate_server::run().await {
        tracing::error!(%error, "server exited with error");
        std::process::exit(1);
    }
}
