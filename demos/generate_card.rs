//! Generate a WiFi card from the bundled template and print the report
//!
//! Usage: cargo run --example generate_card

use wificard::output::render_report;
use wificard::{CardConfig, CardGenerator, Credential, ErrorCorrection};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let mut config = CardConfig::default();
    std::fs::create_dir_all(&config.output.directory)?;

    let generator = CardGenerator::new(config.clone());

    // A plain network
    let home = config.output.directory.join("home.svg");
    let report = generator.generate(&Credential::new("HomeNet", "s3cr3t!"), &home)?;
    for line in render_report(&report, None).human {
        println!("{line}");
    }

    // Reserved characters are escaped in the payload but printed verbatim
    config.symbol.error_correction = ErrorCorrection::Quartile;
    let cafe = config.output.directory.join("cafe.svg");
    let report = CardGenerator::new(config).generate(&Credential::new("Cafe;Free", "pa:ss"), &cafe)?;
    println!("✓ {} ({} modules)", cafe.display(), report.modules);

    Ok(())
}
