use crate::tools::core::{Tool, ToolSpec};
use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Unit {
    Celsius,
    Fahrenheit,
}

fn temperature_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"([-+]?\d+(?:\.\d+)?)\s*°?\s*(?:([Cc])(?:elsius)?|([Ff])(?:ahrenheit)?)\b")
            .expect("valid temperature regex")
    })
}

/// Parse strings like "25°C", "77.0°F", "-5 °C" or "25°Celsius" into value and unit
fn parse_temperature(temperature: &str) -> Result<(f64, Unit), String> {
    let captures = temperature_pattern()
        .captures(temperature)
        .ok_or_else(|| format!("expected a value like '25°C' or '77°F', got '{temperature}'"))?;

    let value: f64 = captures[1]
        .parse()
        .map_err(|e| format!("invalid number '{}': {e}", &captures[1]))?;
    let unit = if captures.get(2).is_some() {
        Unit::Celsius
    } else {
        Unit::Fahrenheit
    };
    Ok((value, unit))
}

/// Convert to the other unit and format with one decimal
fn convert(value: f64, unit: Unit) -> String {
    match unit {
        Unit::Celsius => format!("{:.1}°F", value * 9.0 / 5.0 + 32.0),
        Unit::Fahrenheit => format!("{:.1}°C", (value - 32.0) * 5.0 / 9.0),
    }
}

// Input type
#[derive(Deserialize, Serialize)]
pub struct ConvertTemperatureInput {
    pub temperature: String,
}

/// Conversion failures are reported to the model as data, not as tool errors
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ConvertTemperatureOutput {
    Converted { converted_temperature: String },
    Error { error: String },
}

pub struct ConvertTemperatureTool;

#[async_trait::async_trait]
impl Tool for ConvertTemperatureTool {
    type Input = ConvertTemperatureInput;
    type Output = ConvertTemperatureOutput;

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "convert_temperature",
            description: "Converts temperature between Celsius and Fahrenheit.",
            parameters_schema: json!({
                "type": "object",
                "properties": {
                    "temperature": {
                        "type": "string",
                        "description": "Temperature string in format \"25°C\" or \"77°F\""
                    }
                },
                "required": ["temperature"]
            }),
        }
    }

    async fn execute(&self, input: Self::Input) -> Result<Self::Output> {
        let span = tracing::info_span!("convert_temperature", input_temperature = %input.temperature);
        Ok(span.in_scope(|| match parse_temperature(&input.temperature) {
            Ok((value, unit)) => ConvertTemperatureOutput::Converted {
                converted_temperature: convert(value, unit),
            },
            Err(reason) => {
                tracing::debug!("Temperature conversion failed: {}", reason);
                ConvertTemperatureOutput::Error {
                    error: format!("Failed to convert temperature: {reason}"),
                }
            }
        }))
    }
}
