#[tokio::main]
async fn main() {
    // Errors are logged where they occur.
    if gsi_overlay::run_with_config().await.is_err() {
        std::process::exit(1);
    }
}
