#[tokio::main]
async fn main() {
    if let Err(e) = recovery_hub::start_server().await {
        eprintln!("recovery_hub failed to start: {e}");
        std::process::exit(1);
    }
}
