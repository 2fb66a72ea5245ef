#[tokio::main]
async fn main() {
    if let Err(e) = medivox_lib::run().await {
        eprintln!("medivox: {e}");
        std::process::exit(1);
    }
}
