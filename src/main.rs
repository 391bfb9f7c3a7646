use std::env;
use std::process::ExitCode;

use recipe_extract::{extract_recipe, ErrorResponse, ScrapeResponse};

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let Some(url) = args.get(1) else {
        eprintln!("Usage: recipe-extract <url> [language]");
        return ExitCode::from(2);
    };
    let language = args.get(2).map(String::as_str).unwrap_or("english");

    let result = extract_recipe(url, language).await;

    match result {
        Ok(extraction) => {
            let response = ScrapeResponse::new(
                extraction.recipe,
                extraction.source,
                extraction.elapsed.as_secs_f64(),
            );
            match serde_json::to_string_pretty(&response) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    eprintln!("Failed to serialize response: {e}");
                    return ExitCode::FAILURE;
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            let response = ErrorResponse::from_error(&e);
            let json = serde_json::to_string_pretty(&response)
                .unwrap_or_else(|_| format!(r#"{{"success":false,"error_type":"{}"}}"#, e.kind()));
            eprintln!("{json}");
            ExitCode::FAILURE
        }
    }
}
