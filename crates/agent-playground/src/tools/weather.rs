//! Weather Tool
//!
//! Current conditions for a location, served by a pluggable
//! [`WeatherSource`].

use std::sync::Arc;

use agent_core::{Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema, tool::ParameterSchema};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{PlaygroundError, Result};

pub const WEATHER_TOOL: &str = "weather";

/// Temperature unit of a report
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    Fahrenheit,
}

impl TemperatureUnit {
    const fn symbol(self) -> &'static str {
        match self {
            Self::Fahrenheit => "°F",
        }
    }
}

/// Current conditions at a location
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReport {
    pub location: String,
    pub temperature: i32,
    pub conditions: String,
    /// Relative humidity, percent
    pub humidity: u8,
    /// Miles per hour
    pub wind_speed: u32,
    pub unit: TemperatureUnit,
}

impl WeatherReport {
    fn summary(&self) -> String {
        format!(
            "{}: {}{}, {}, humidity {}%, wind {} mph",
            self.location,
            self.temperature,
            self.unit.symbol(),
            self.conditions,
            self.humidity,
            self.wind_speed
        )
    }
}

/// Weather data provider (Strategy pattern)
///
/// Implement this for a real weather API.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Current conditions for `location`
    async fn current(&self, location: &str) -> Result<WeatherReport>;

    /// Source name
    fn name(&self) -> &str;
}

/// Static weather table for demos and tests
#[derive(Debug, Default, Clone, Copy)]
pub struct MockWeatherSource;

impl MockWeatherSource {
    pub const fn new() -> Self {
        Self
    }

    /// (temperature, conditions, humidity, wind speed)
    fn lookup(location: &str) -> (i32, &'static str, u8, u32) {
        match location {
            "Exeter, NH" => (45, "Partly cloudy", 65, 12),
            "New Hampshire" => (42, "Clear", 70, 8),
            _ => (50, "Sunny", 60, 10),
        }
    }
}

#[async_trait]
impl WeatherSource for MockWeatherSource {
    async fn current(&self, location: &str) -> Result<WeatherReport> {
        let (temperature, conditions, humidity, wind_speed) = Self::lookup(location);
        Ok(WeatherReport {
            location: location.to_string(),
            temperature,
            conditions: conditions.to_string(),
            humidity,
            wind_speed,
            unit: TemperatureUnit::Fahrenheit,
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Tool for looking up current weather
pub struct WeatherTool {
    source: Arc<dyn WeatherSource>,
}

impl Default for WeatherTool {
    fn default() -> Self {
        Self::new(Arc::new(MockWeatherSource::new()))
    }
}

impl WeatherTool {
    pub fn new(source: Arc<dyn WeatherSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: WEATHER_TOOL.into(),
            description: "Get current weather for a location".into(),
            parameters: vec![ParameterSchema::required(
                "location",
                "string",
                "The city and state, e.g. San Francisco, CA",
            )],
            category: Some("weather".into()),
            has_side_effects: false,
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let location = call.str_arg("location").ok_or_else(|| PlaygroundError::InvalidArgument {
            name: "location".into(),
            reason: "expected a string".into(),
        })?;

        tracing::debug!(location, source = self.source.name(), "Fetching weather");
        let report = self
            .source
            .current(location)
            .await
            .map_err(|e| PlaygroundError::WeatherFetch {
                location: location.to_string(),
                cause: e.to_string(),
            })?;

        let data = serde_json::to_value(&report).map_err(PlaygroundError::from)?;
        Ok(ToolResult::success(WEATHER_TOOL, report.summary()).with_data(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::AgentError;
    use serde_json::{Value, json};

    struct OfflineSource;

    #[async_trait]
    impl WeatherSource for OfflineSource {
        async fn current(&self, _location: &str) -> Result<WeatherReport> {
            Err(PlaygroundError::SourceUnavailable("connection refused".into()))
        }

        fn name(&self) -> &str {
            "offline"
        }
    }

    fn call(args: Value) -> ToolCall {
        ToolCall::new("call_1", WEATHER_TOOL, serde_json::from_value(args).unwrap())
    }

    #[tokio::test]
    async fn test_known_location() {
        let result = WeatherTool::default()
            .execute(&call(json!({"location": "Exeter, NH"})))
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(
            result.data.unwrap(),
            json!({
                "location": "Exeter, NH",
                "temperature": 45,
                "conditions": "Partly cloudy",
                "humidity": 65,
                "windSpeed": 12,
                "unit": "fahrenheit"
            })
        );
    }

    #[tokio::test]
    async fn test_unknown_location_uses_default_row() {
        let result = WeatherTool::default()
            .execute(&call(json!({"location": "Boston, MA"})))
            .await
            .unwrap();

        assert_eq!(result.output, "Boston, MA: 50°F, Sunny, humidity 60%, wind 10 mph");
        let data = result.data.unwrap();
        assert_eq!(data["location"], "Boston, MA");
        assert_eq!(data["conditions"], "Sunny");
    }

    #[tokio::test]
    async fn test_source_failure_names_location() {
        let tool = WeatherTool::new(Arc::new(OfflineSource));
        let err = tool
            .execute(&call(json!({"location": "Paris"})))
            .await
            .unwrap_err();

        assert!(matches!(err, AgentError::ToolExecution(_)));
        assert!(err.to_string().contains(
            "Failed to fetch weather for Paris: Weather source unavailable: connection refused"
        ));
    }

    #[tokio::test]
    async fn test_non_string_location_is_rejected() {
        let err = WeatherTool::default()
            .execute(&call(json!({"location": 42})))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("location"));
    }
}
