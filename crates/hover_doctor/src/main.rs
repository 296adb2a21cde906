#![forbid(unsafe_code)]

fn main() {
    hover_doctor::util::init_logging();
    let integration = hover_doctor::util::OutputIntegration::detect();
    match hover_doctor::run_from_env() {
        Ok(code) => std::process::exit(code),
        Err(error) => {
            if integration.should_emit_json() {
                eprintln!(
                    "{}",
                    serde_json::json!({
                        "status": "error",
                        "error": error.to_string(),
                        "exit_code": error.exit_code(),
                        "integration": integration,
                    })
                );
            } else {
                eprintln!("{error}");
            }
            std::process::exit(error.exit_code());
        }
    }
}
