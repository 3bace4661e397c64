#[tokio::main]
async fn main() {
	if let Err(err) = ticketmill::run().await {
		eprintln!("FATAL: {}", err);
		std::process::exit(1);
	}
}

// vim: ts=4
