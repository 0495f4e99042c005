//! Weather Resolver
//!
//! Maps a state/territory name to a city the weather provider understands,
//! makes one best-effort call and falls back to fixed values on any failure.

use crate::error::{AdvisorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

pub const FALLBACK_TEMPERATURE: f64 = 25.0;
pub const FALLBACK_RAINFALL_MM: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    pub temperature: f64,
    pub rainfall_mm: f64,
}

impl Weather {
    pub fn fallback() -> Self {
        Self {
            temperature: FALLBACK_TEMPERATURE,
            rainfall_mm: FALLBACK_RAINFALL_MM,
        }
    }
}

lazy_static::lazy_static! {
    static ref STATE_TO_CITY: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("Andaman and Nicobar Islands", "Port Blair");
        m.insert("Andhra Pradesh", "Amaravati");
        m.insert("Arunachal Pradesh", "Itanagar");
        m.insert("Assam", "Dispur");
        m.insert("Bihar", "Patna");
        m.insert("Chandigarh", "Chandigarh");
        m.insert("Chhattisgarh", "Raipur");
        m.insert("Dadra and Nagar Haveli", "Silvassa");
        m.insert("Daman and Diu", "Daman");
        m.insert("Delhi", "New Delhi");
        m.insert("Goa", "Panaji");
        m.insert("Gujarat", "Gandhinagar");
        m.insert("Haryana", "Chandigarh");
        m.insert("Himachal Pradesh", "Shimla");
        m.insert("Jammu and Kashmir", "Srinagar");
        m.insert("Jharkhand", "Ranchi");
        m.insert("Karnataka", "Bengaluru");
        m.insert("Kerala", "Thiruvananthapuram");
        m.insert("Ladakh", "Leh");
        m.insert("Madhya Pradesh", "Bhopal");
        m.insert("Maharashtra", "Mumbai");
        m.insert("Manipur", "Imphal");
        m.insert("Meghalaya", "Shillong");
        m.insert("Mizoram", "Aizawl");
        m.insert("Nagaland", "Kohima");
        m.insert("Odisha", "Bhubaneswar");
        m.insert("Puducherry", "Puducherry");
        m.insert("Punjab", "Chandigarh");
        m.insert("Rajasthan", "Jaipur");
        m.insert("Sikkim", "Gangtok");
        m.insert("Tamil Nadu", "Chennai");
        m.insert("Telangana", "Hyderabad");
        m.insert("Tripura", "Agartala");
        m.insert("Uttar Pradesh", "Lucknow");
        m.insert("Uttarakhand", "Dehradun");
        m.insert("West Bengal", "Kolkata");
        m
    };
}

/// City queried for `region`; unknown regions are passed through verbatim.
pub fn locality_for(region: &str) -> &str {
    STATE_TO_CITY.get(region).copied().unwrap_or(region)
}

/// Pull `main.temp` and `rain.1h` out of a current-weather body.
pub fn parse_current_weather(body: &serde_json::Value) -> Option<Weather> {
    let temperature = body.get("main")?.get("temp")?.as_f64()?;
    if !temperature.is_finite() {
        return None;
    }
    let rainfall_mm = match body.get("rain").and_then(|r| r.get("1h")) {
        None | Some(serde_json::Value::Null) => 0.0,
        Some(v) => v.as_f64()?,
    };
    if !rainfall_mm.is_finite() || rainfall_mm < 0.0 {
        return None;
    }
    Some(Weather {
        temperature,
        rainfall_mm,
    })
}

#[derive(Clone)]
pub struct WeatherResolver {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl WeatherResolver {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AdvisorError::Config(format!("Failed to build weather client: {}", e)))?;
        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Current weather for `region`. Never fails; degraded calls return
    /// [`Weather::fallback`].
    pub async fn resolve(&self, region: &str) -> Weather {
        let city = locality_for(region);
        match self.fetch(city).await {
            Ok(weather) => {
                debug!("Weather for {}: {:?}", city, weather);
                weather
            }
            Err(e) => {
                warn!("Weather lookup for {} failed, using fallback: {}", city, e);
                Weather::fallback()
            }
        }
    }

    /// Single attempt against the provider, no retries.
    pub async fn fetch(&self, city: &str) -> Result<Weather> {
        let response = self
            .client
            .get(format!("{}/data/2.5/weather", self.base_url))
            .query(&[("q", city), ("units", "metric"), ("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| AdvisorError::Weather(format!("Weather API call failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AdvisorError::Weather(format!(
                "Weather API error ({}): {}",
                status, error_text
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| {
                AdvisorError::Weather(format!("Failed to parse weather response: {}", e))
            })?;

        parse_current_weather(&body).ok_or_else(|| {
            AdvisorError::Weather(format!("Unexpected weather response shape: {}", body))
        })
    }
}
