//! Advisor pipeline
//!
//! Owns the startup state (dataset, predictor, clients) and runs one advisory
//! request end to end. Every failure becomes an [`AdvisoryOutcome`] with an
//! error message; `advise` itself never fails.

use crate::advisory::{self, ParsedAdvisory, ADVISORY_FORMAT_VERSION};
use crate::config::AdvisorConfig;
use crate::context::{FarmerInput, FarmingContext};
use crate::dataset::ReferenceDataset;
use crate::error::Result;
use crate::llm::{LlmClient, NarrativeService};
use crate::predictor::{ClassifierPredictor, CropPredictor, LookupPredictor, PredictorKind};
use crate::presentation::{self, PresentationItem, ICON_ACCURACY, ICON_SUGGESTION};
use crate::prompt::build_prompt;
use crate::weather::WeatherResolver;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryOutcome {
    pub items: Vec<PresentationItem>,
    pub suggestions: Vec<String>,
    /// Predictor confidence behind `items`; absent on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AdvisoryOutcome {
    pub fn success(
        items: Vec<PresentationItem>,
        suggestions: Vec<String>,
        confidence_percent: f64,
    ) -> Self {
        Self {
            items,
            suggestions,
            confidence_percent: Some(confidence_percent),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            suggestions: Vec::new(),
            confidence_percent: None,
            error: Some(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Plain-text rendering for terminals.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        if let Some(error) = &self.error {
            let _ = writeln!(out, "Error: {}", error);
            return out;
        }
        let _ = writeln!(out, "\n=== Farming Advisory ===");
        for item in &self.items {
            let _ = writeln!(out, "{} {}: {}", item.icon, item.label, item.value);
        }
        if let Some(confidence) = self.confidence_percent {
            let _ = writeln!(out, "{} Accuracy: {:.1}%", ICON_ACCURACY, confidence);
        }
        for suggestion in &self.suggestions {
            let _ = writeln!(out, "{} {}", ICON_SUGGESTION, suggestion);
        }
        out
    }
}

pub struct Advisor {
    dataset: Arc<ReferenceDataset>,
    predictor: Box<dyn CropPredictor>,
    weather: WeatherResolver,
    narrative: Box<dyn NarrativeService>,
}

impl Advisor {
    pub fn new(
        dataset: Arc<ReferenceDataset>,
        predictor: Box<dyn CropPredictor>,
        weather: WeatherResolver,
        narrative: Box<dyn NarrativeService>,
    ) -> Self {
        Self {
            dataset,
            predictor,
            weather,
            narrative,
        }
    }

    /// Load the dataset and artifacts named by `config` and build the clients.
    pub fn from_config(config: &AdvisorConfig) -> Result<Self> {
        let dataset = Arc::new(ReferenceDataset::load(&config.dataset_path)?);

        let predictor: Box<dyn CropPredictor> = match config.predictor {
            PredictorKind::Lookup => Box::new(LookupPredictor::new(Arc::clone(&dataset))),
            PredictorKind::Classifier => Box::new(ClassifierPredictor::load(
                &config.model_path,
                &config.encoders_path,
            )?),
        };

        let weather = WeatherResolver::new(
            config.weather_api_key.clone(),
            config.weather_base_url.clone(),
            config.weather_timeout,
        )?;

        let llm = LlmClient::new(
            config.llm_provider,
            config.llm_api_key.clone(),
            config.llm_model.clone(),
            config.llm_base_url.clone(),
            config.llm_timeout,
        )?;
        if llm.is_offline() {
            warn!("LLM running in offline mode, advisories come from the dataset only");
        }

        info!(
            "Advisor ready: {} dataset rows, predictor={}, llm={:?}, advisory format v{}",
            dataset.len(),
            predictor.name(),
            config.llm_provider,
            ADVISORY_FORMAT_VERSION
        );
        Ok(Self::new(dataset, predictor, weather, Box::new(llm)))
    }

    pub fn dataset(&self) -> &ReferenceDataset {
        &self.dataset
    }

    pub fn predictor_name(&self) -> &'static str {
        self.predictor.name()
    }

    pub async fn advise(&self, input: FarmerInput) -> AdvisoryOutcome {
        let request_id = Uuid::new_v4();
        let span = info_span!("advise", request_id = %request_id);
        async move {
            match self.run(input).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("Advisory request failed: {}", e);
                    AdvisoryOutcome::failure(e.to_string())
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run(&self, input: FarmerInput) -> Result<AdvisoryOutcome> {
        let input = input.normalized()?;
        info!(
            "Received advisory request: state={}, soil={}, previous_crop={}",
            input.state, input.soil_type, input.previous_crop
        );

        let weather = self.weather.resolve(&input.state).await;
        let context = FarmingContext::new(input, weather);

        let prediction = self.predictor.predict(&context)?;
        info!(
            "Predicted {} at {:.1}% via {}",
            prediction.crop_label,
            prediction.confidence_percent,
            self.predictor.name()
        );

        let prompt = build_prompt(&context, &prediction);
        let reply = match self.narrative.generate(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Narrative generation failed, falling back to dataset: {}", e);
                String::new()
            }
        };
        debug!("Raw advisory reply: {}", reply);

        let ParsedAdvisory { fields, suggestions } = advisory::parse(&reply);
        debug!("Parsed {} field(s), {} suggestion(s)", fields.len(), suggestions.len());

        let fields = advisory::complete(fields, &prediction.crop_label, &self.dataset)?;
        let (items, suggestions) =
            presentation::assemble(&context, &prediction, &fields, suggestions);
        Ok(AdvisoryOutcome::success(
            items,
            suggestions,
            prediction.confidence_percent,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AdvisorError;
    use crate::predictor::Prediction;
    use crate::test_support::dead_url;
    use async_trait::async_trait;
    use std::time::Duration;

    const CSV: &str = "State,Soil Type,Recommend Crop,Required Water,Required Fertilizer,Crop Protection Tip,Limited Resources Tip,Disease Prevention Tip\n\
Punjab,Loamy,Wheat,450 mm,Urea,Use mulch,Drip irrigation,Rotate crops\n";

    struct FixedPredictor(Prediction);

    impl CropPredictor for FixedPredictor {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn predict(&self, _context: &FarmingContext) -> Result<Prediction> {
            Ok(self.0.clone())
        }
    }

    struct FailingNarrative;

    #[async_trait]
    impl NarrativeService for FailingNarrative {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Err(AdvisorError::Llm("connection refused".to_string()))
        }
    }

    fn input() -> FarmerInput {
        FarmerInput {
            state: "Punjab".to_string(),
            soil_type: "Loamy".to_string(),
            previous_crop: "Rice".to_string(),
            fertilizer_used: "Urea".to_string(),
            water_hardness: "Soft".to_string(),
            livestock: "Cattle".to_string(),
            resources: "Canal".to_string(),
        }
    }

    async fn advisor(prediction: Prediction) -> Advisor {
        let dataset = Arc::new(ReferenceDataset::from_reader(CSV.as_bytes()).unwrap());
        let weather =
            WeatherResolver::new("k".to_string(), dead_url().await, Duration::from_secs(1))
                .unwrap();
        Advisor::new(
            dataset,
            Box::new(FixedPredictor(prediction)),
            weather,
            Box::new(FailingNarrative),
        )
    }

    #[test]
    fn test_failure_outcome_shape() {
        let outcome = AdvisoryOutcome::failure("boom");
        assert!(outcome.items.is_empty());
        assert!(outcome.suggestions.is_empty());
        assert_eq!(outcome.error.as_deref(), Some("boom"));
        assert_eq!(outcome.confidence_percent, None);
        let success = AdvisoryOutcome::success(Vec::new(), Vec::new(), 75.0);
        let json = serde_json::to_value(success).unwrap();
        assert!(json.get("error").is_none());
        assert_eq!(json["confidence_percent"], 75.0);
    }

    #[test]
    fn test_render_text() {
        let item = PresentationItem {
            icon: "🌾".to_string(),
            label: "Next Crop".to_string(),
            value: "Wheat".to_string(),
        };
        let text = AdvisoryOutcome::success(vec![item], vec!["Mulch early".to_string()], 72.46)
            .render_text();
        assert!(text.contains("🌾 Next Crop: Wheat\n"));
        assert!(text.contains("📊 Accuracy: 72.5%\n"));
        assert!(text.contains("💡 Mulch early\n"));

        let failed = AdvisoryOutcome::failure("Prediction error: empty").render_text();
        assert_eq!(failed, "Error: Prediction error: empty\n");
    }

    #[tokio::test]
    async fn test_failed_generation_is_repaired_from_dataset() {
        let outcome = advisor(Prediction::new("Wheat", 85.0)).await.advise(input()).await;
        assert!(!outcome.is_error());
        assert_eq!(outcome.items.len(), 7);
        assert_eq!(outcome.items[0].value, "Wheat");
        assert_eq!(outcome.items[1].value, "25°C, 2 mm rainfall");
        assert_eq!(outcome.items[6].value, "Rotate crops");
        assert_eq!(outcome.confidence_percent, Some(85.0));
    }

    #[tokio::test]
    async fn test_unknown_crop_is_terminal() {
        let outcome = advisor(Prediction::new("Quinoa", 85.0)).await.advise(input()).await;
        assert!(outcome.items.is_empty());
        assert!(outcome.suggestions.is_empty());
        assert_eq!(outcome.confidence_percent, None);
        assert!(outcome.error.unwrap().contains("Quinoa"));
    }

    #[tokio::test]
    async fn test_invalid_input_is_terminal() {
        let mut bad = input();
        bad.livestock = "   ".to_string();
        let outcome = advisor(Prediction::new("Wheat", 85.0)).await.advise(bad).await;
        assert!(outcome.items.is_empty());
        assert!(outcome.error.unwrap().contains("livestock"));
    }
}
