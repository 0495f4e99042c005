use anyhow::Result;
use clap::Parser;
use crop_advisor::{Advisor, AdvisorConfig, FarmerInput};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "crop-advisor")]
#[command(about = "Crop recommendation and farming advisory")]
struct Args {
    /// State or territory, e.g. "Punjab"
    #[arg(long)]
    state: String,

    #[arg(long)]
    soil_type: String,

    #[arg(long)]
    previous_crop: String,

    #[arg(long)]
    fertilizer_used: String,

    #[arg(long)]
    water_hardness: String,

    #[arg(long)]
    livestock: String,

    #[arg(long)]
    resources: String,

    /// Reference dataset CSV (or set CROP_DATASET_PATH)
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// "lookup" or "classifier" (or set CROP_PREDICTOR)
    #[arg(long)]
    predictor: Option<String>,

    /// LLM API key (or set GEMINI_API_KEY / OPENAI_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Print the outcome as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = AdvisorConfig::from_env()?;
    if let Some(path) = args.dataset {
        config.dataset_path = path;
    }
    if let Some(kind) = args.predictor {
        config.predictor = kind.parse()?;
    }
    if let Some(key) = args.api_key {
        config.llm_api_key = key;
    }

    let advisor = Advisor::from_config(&config)?;
    info!("Crop advisor starting with {} predictor", advisor.predictor_name());

    let input = FarmerInput {
        state: args.state,
        soil_type: args.soil_type,
        previous_crop: args.previous_crop,
        fertilizer_used: args.fertilizer_used,
        water_hardness: args.water_hardness,
        livestock: args.livestock,
        resources: args.resources,
    };
    let outcome = advisor.advise(input).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print!("{}", outcome.render_text());
    }

    if outcome.is_error() {
        std::process::exit(1);
    }
    Ok(())
}
