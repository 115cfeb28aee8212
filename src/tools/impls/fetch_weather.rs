use crate::tools::core::{Tool, ToolSpec};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::json;

const MOCK_WEATHER: &[(&str, &str)] = &[
    ("New York", "Sunny, 25°C"),
    ("London", "Cloudy, 18°C"),
    ("Tokyo", "Rainy, 22°C"),
];

const NOT_AVAILABLE: &str = "Weather data not available for this location.";

// Input type
#[derive(Deserialize, Serialize)]
pub struct FetchWeatherInput {
    pub location: String,
}

// Output type
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct FetchWeatherOutput {
    pub weather: String,
}

pub struct FetchWeatherTool;

#[async_trait::async_trait]
impl Tool for FetchWeatherTool {
    type Input = FetchWeatherInput;
    type Output = FetchWeatherOutput;

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "fetch_weather",
            description: "Fetches the weather information for the specified location.",
            parameters_schema: json!({
                "type": "object",
                "properties": {
                    "location": {
                        "type": "string",
                        "description": "The location to fetch weather for."
                    }
                },
                "required": ["location"]
            }),
        }
    }

    async fn execute(&self, input: Self::Input) -> Result<Self::Output> {
        let span = tracing::info_span!("fetch_weather", requested_location = %input.location);
        span.in_scope(|| {
            let weather = MOCK_WEATHER
                .iter()
                .find(|(location, _)| *location == input.location)
                .map(|(_, weather)| *weather)
                .unwrap_or(NOT_AVAILABLE);

            tracing::debug!("Weather for '{}': {}", input.location, weather);
            Ok(FetchWeatherOutput {
                weather: weather.to_string(),
            })
        })
    }
}
