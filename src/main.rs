//! wificard command line entrypoint

use clap::Parser;
use serde_json::json;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use wificard::output::{RenderedReport, ensure_output_path, render_report, with_svg_extension};
use wificard::{CardConfig, CardGenerator, Credential, Error, PdfConverter, Result, SvgToPdf, logging};

#[derive(Parser, Debug)]
#[command(
    name = "wificard",
    version,
    about = "Generate a printable WiFi join card with a scannable QR code"
)]
struct Cli {
    /// WiFi network name
    #[arg(short = 'n', long, value_name = "SSID")]
    name: Option<String>,

    /// WiFi network password
    #[arg(short = 'p', long, value_name = "PASSWORD")]
    password: Option<String>,

    /// Output file name (without extension)
    #[arg(short = 'o', long, value_name = "NAME")]
    output: Option<String>,

    /// Also convert the generated card to PDF
    #[arg(long)]
    pdf: bool,

    /// Only convert an existing SVG card (given by -o) to PDF
    #[arg(long)]
    pdf_only: bool,

    /// Optional configuration file (toml/yaml). Defaults to wificard.{toml,yaml} in cwd/XDG config.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override the card template (takes precedence over config file)
    #[arg(long, value_name = "PATH")]
    template: Option<PathBuf>,

    /// Output results as formatted JSON instead of human-readable text
    #[arg(long)]
    json: bool,
}

/// Everything needed to generate one card
struct Request {
    credential: Credential,
    output: String,
    pdf: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = CardConfig::load(cli.config.as_deref())?;

    if let Some(ref template) = cli.template {
        config.template.path = Some(template.clone());
    }

    logging::init(&config.logging)?;

    if cli.pdf_only {
        let Some(ref output) = cli.output else {
            return Err(Error::Config(
                "--pdf-only requires -o/--output to specify the SVG file".to_string(),
            ));
        };
        let svg_path = ensure_output_path(&config.output.directory, &with_svg_extension(output))?;
        let pdf_path = SvgToPdf::new().convert(&svg_path)?;
        return emit_pdf_only(&svg_path, &pdf_path, cli.json);
    }

    let request = collect_request(&cli, &mut io::stdin().lock())?;
    let svg_path = ensure_output_path(
        &config.output.directory,
        &with_svg_extension(&request.output),
    )?;

    match &config.template.path {
        Some(path) => info!(template = %path.display(), "Generating WiFi card"),
        None => info!("Generating WiFi card from the bundled template"),
    }
    let generator = CardGenerator::new(config);
    let report = generator.generate(&request.credential, &svg_path)?;

    let pdf_path = if request.pdf {
        Some(SvgToPdf::new().convert(&svg_path)?)
    } else {
        None
    };

    emit_report(&render_report(&report, pdf_path.as_deref()), cli.json)
}

/// Fill in whatever the command line left out by prompting on stdin.
fn collect_request(cli: &Cli, input: &mut impl BufRead) -> Result<Request> {
    if let (Some(name), Some(password), Some(output)) = (&cli.name, &cli.password, &cli.output) {
        return Ok(Request {
            credential: Credential::new(name.as_str(), password.as_str()),
            output: output.clone(),
            pdf: cli.pdf,
        });
    }

    let name = match &cli.name {
        Some(name) => name.clone(),
        None => prompt(input, "Enter network name: ")?,
    };
    let password = match &cli.password {
        Some(password) => password.clone(),
        None => prompt(input, "Enter network password: ")?,
    };
    let output = match &cli.output {
        Some(output) => output.clone(),
        None => prompt(input, "Enter output file name (without extension): ")?,
    };
    let pdf = cli.pdf
        || prompt(input, "Generate PDF? (y/n): ")?
            .to_ascii_lowercase()
            .starts_with('y');

    Ok(Request {
        credential: Credential::new(name, password),
        output,
        pdf,
    })
}

fn prompt(input: &mut impl BufRead, question: &str) -> Result<String> {
    let mut stdout = io::stdout();
    write!(stdout, "{question}")?;
    stdout.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "input closed while prompting",
        )));
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn emit_report(rendered: &RenderedReport, as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(&rendered.json)?);
    } else {
        for line in &rendered.human {
            println!("{line}");
        }
    }
    Ok(())
}

fn emit_pdf_only(svg_path: &Path, pdf_path: &Path, as_json: bool) -> Result<()> {
    let rendered = RenderedReport {
        json: json!({ "svg": svg_path, "pdf": pdf_path }),
        human: vec![format!("Generated PDF card: {}", pdf_path.display())],
    };
    emit_report(&rendered, as_json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("wificard").chain(args.iter().copied()))
    }

    #[test]
    fn test_full_arguments_skip_prompting() {
        let cli = cli(&["-n", "HomeNet", "-p", "s3cr3t!", "-o", "home", "--pdf"]);
        let mut input = Cursor::new(Vec::new());
        let request = collect_request(&cli, &mut input).unwrap();
        assert_eq!(request.credential, Credential::new("HomeNet", "s3cr3t!"));
        assert_eq!(request.output, "home");
        assert!(request.pdf);
    }

    #[test]
    fn test_prompts_for_missing_values() {
        let cli = cli(&["-n", "Cafe;Free"]);
        let mut input = Cursor::new(b"pa:ss\ncafe\nY\n".to_vec());
        let request = collect_request(&cli, &mut input).unwrap();
        assert_eq!(request.credential, Credential::new("Cafe;Free", "pa:ss"));
        assert_eq!(request.output, "cafe");
        assert!(request.pdf);
    }

    #[test]
    fn test_pdf_question_defaults_to_no() {
        let cli = cli(&[]);
        let mut input = Cursor::new(b"Net\r\npw\r\ncard\r\n\r\n".to_vec());
        let request = collect_request(&cli, &mut input).unwrap();
        assert_eq!(request.credential.network_name, "Net");
        assert_eq!(request.output, "card");
        assert!(!request.pdf);
    }

    #[test]
    fn test_closed_input_is_an_error() {
        let cli = cli(&["-n", "Net"]);
        let mut input = Cursor::new(Vec::new());
        assert!(matches!(collect_request(&cli, &mut input), Err(Error::Io(_))));
    }

    #[test]
    fn test_pdf_only_requires_output() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = tmp.path().join("wificard.toml");
        std::fs::write(&config, "").unwrap();
        let cli = cli(&["--pdf-only", "--config", config.to_str().unwrap()]);
        assert!(matches!(run(cli), Err(Error::Config(_))));
    }
}
