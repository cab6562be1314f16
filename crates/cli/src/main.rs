use clap::{Parser, Subcommand};
use medassist_core::{
    parse_symptoms, resolve_data_dir, CoreConfig, DiagnosisContext, DiagnosisResponse,
    DiagnosisService,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "medassist")]
#[command(about = "Symptom-to-diagnosis assistant CLI")]
struct Cli {
    /// Reference data directory (default: search for data/)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Diagnose a free-text symptom description
    Diagnose {
        /// Symptom description, e.g. "tengo fiebre y tos"
        text: String,
        /// Write the markdown report to this path when a diagnosis is made
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Diagnose an explicit list of locale-form symptoms, skipping extraction
    Symptoms {
        /// Symptoms, e.g. fiebre tos
        #[arg(required = true)]
        symptoms: Vec<String>,
    },
    /// Load every reference table and print a summary
    CheckData,
}

fn load_service(data_dir: Option<PathBuf>) -> Result<DiagnosisService, Box<dyn std::error::Error>> {
    let cfg = CoreConfig::new(resolve_data_dir(data_dir)?)?;
    let ctx = DiagnosisContext::load(&cfg)?;
    Ok(DiagnosisService::new(Arc::new(ctx)))
}

fn print_response(response: &DiagnosisResponse) {
    match response {
        DiagnosisResponse::Diagnosed { symptoms, .. }
        | DiagnosisResponse::NoReliableDiagnosis { symptoms } => {
            let names: Vec<&str> = symptoms.iter().map(|s| s.as_str()).collect();
            println!("Detected symptoms: {}", names.join(", "));
        }
        DiagnosisResponse::NoSymptoms => {}
    }
    println!("{}", response.message());
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("medassist_core=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Diagnose { text, report }) => {
            let service = load_service(cli.data_dir)?;
            let response = service.diagnose_text(&text, None);
            print_response(&response);

            if let (Some(path), DiagnosisResponse::Diagnosed { report: body, .. }) =
                (report, &response)
            {
                std::fs::write(&path, body)?;
                println!("Report written to {}", path.display());
            }
        }
        Some(Commands::Symptoms { symptoms }) => {
            let service = load_service(cli.data_dir)?;
            let parsed = parse_symptoms(&symptoms);
            let response = service.diagnose_symptoms(&parsed, &symptoms.join(", "), None);
            print_response(&response);
        }
        Some(Commands::CheckData) => {
            let cfg = CoreConfig::new(resolve_data_dir(cli.data_dir)?)?;
            let ctx = DiagnosisContext::load(&cfg)?;
            println!("Data directory: {}", cfg.data_dir().display());
            println!("Dictionary entries: {}", ctx.dictionary().len());
            println!(
                "Classifier columns: {}",
                ctx.classifier().columns().len()
            );
            println!("Rules: {}", ctx.rules().len());
            println!("Disease reference rows: {}", ctx.diseases().len());
        }
        None => {
            println!("Use 'medassist --help' for commands");
        }
    }

    Ok(())
}
