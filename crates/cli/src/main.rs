//! benchsink CLI entry point.

#[tokio::main]
async fn main() {
    if let Err(e) = benchsink_cli::run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
