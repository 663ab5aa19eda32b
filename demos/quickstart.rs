//! Quick start for the Surmado client.
//!
//! Creates a Scan and a Signal report, then checks the Scan's status.
//!
//! ```bash
//! export SURMADO_API_KEY=sur_live_xxx
//! cargo run --example quickstart
//! ```

use surmado::models::{ScanRequest, ScanTier, SignalContext, SignalRequest, SignalTier};
use surmado::{Surmado, SurmadoError};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Reads SURMADO_API_KEY from the environment
    let client = Surmado::new(None)?;
    println!("Surmado client initialized");

    println!("\n--- Creating Scan Report ---");
    let scan = ScanRequest::new("https://example.com", "Example Brand", "you@example.com")
        .tier(ScanTier::Basic);
    let scan_result = match client.scan(&scan).await {
        Ok(result) => result,
        Err(SurmadoError::InsufficientCredits { .. }) => {
            eprintln!("Not enough credits. Top up at surmado.com");
            return Ok(());
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(());
        }
    };
    println!("Scan report created: {}", scan_result["report_id"]);
    println!("  Status: {}", scan_result["status"]);
    println!("  Credits used: {}", scan_result["credits_used"]);

    println!("\n--- Creating Signal Report ---");
    let context = SignalContext::new(
        "Technology",
        "United States",
        "Developers and technical decision makers",
        "Finding reliable tools, integration complexity",
        "Developer-focused platform for building modern apps",
        "Vercel, Netlify, Heroku",
    );
    let signal = SignalRequest::new(
        "https://example.com",
        "Example Brand",
        "you@example.com",
        context,
    )
    .tier(SignalTier::Basic);
    match client.signal(&signal).await {
        Ok(result) => {
            println!("Signal report created: {}", result["report_id"]);
            println!(
                "  Token (for Solutions): {}",
                result.get("token").and_then(|t| t.as_str()).unwrap_or("N/A")
            );
        }
        Err(e) if e.is_insufficient_credits() => eprintln!("Not enough credits for Signal report"),
        Err(e) => eprintln!("Error: {}", e),
    }

    println!("\n--- Checking Report Status ---");
    let report_id = scan_result["report_id"].as_str().unwrap_or_default();
    let report = client.get_report(report_id).await?;
    println!("Report {}:", report["report_id"]);
    println!("  Status: {}", report["status"]);
    println!("  Product: {}", report["product"]);

    // Waiting takes around 15 minutes:
    //
    // let completed = client
    //     .wait_for_report(report_id, &surmado::utils::WaitOptions::default())
    //     .await?;
    // println!("PDF: {}", completed["download_url"]);

    println!("\nDone! Reports are processing (~15 min).");
    println!("  Check status: surmado report <report_id>");
    println!("  Or pass a webhook_url to receive a POST when complete.");

    Ok(())
}
