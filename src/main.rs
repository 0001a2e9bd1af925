fn main() {
    if let Err(e) = agentcheck::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
