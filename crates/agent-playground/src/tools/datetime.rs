//! Date/Time Tool

use agent_core::{Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema, tool::ParameterSchema};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use serde_json::{Value, json};

pub const DATETIME_TOOL: &str = "datetime";

const FORMATS: [&str; 3] = ["iso", "human", "unix"];

/// Tool reporting the current date and time
#[derive(Debug, Clone, Copy)]
pub struct DateTimeTool {
    clock: fn() -> DateTime<Utc>,
}

impl Default for DateTimeTool {
    fn default() -> Self {
        Self { clock: Utc::now }
    }
}

impl DateTimeTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a fixed clock (tests, replays)
    #[must_use]
    pub const fn with_clock(clock: fn() -> DateTime<Utc>) -> Self {
        Self { clock }
    }
}

#[async_trait]
impl Tool for DateTimeTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: DATETIME_TOOL.into(),
            description: "Get the current date and time, optionally shifted to a UTC offset".into(),
            parameters: vec![
                ParameterSchema::optional("format", "string", "Output format")
                    .with_enum(FORMATS.iter().map(|f| json!(f)).collect())
                    .with_default(json!("iso")),
                ParameterSchema::optional("utc_offset_hours", "number", "Hours east of UTC, -12 to 14")
                    .with_default(json!(0)),
            ],
            category: Some("utility".into()),
            has_side_effects: false,
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let format = call.str_arg("format").unwrap_or("iso");
        if !FORMATS.contains(&format) {
            return Ok(ToolResult::failure(
                DATETIME_TOOL,
                format!("Unsupported format '{format}'. Use one of: {}", FORMATS.join(", ")),
            ));
        }

        let hours = match call.arguments.get("utc_offset_hours") {
            None | Some(Value::Null) => 0.0,
            Some(value) => match value.as_f64() {
                Some(h) if (-12.0..=14.0).contains(&h) => h,
                _ => {
                    return Ok(ToolResult::failure(
                        DATETIME_TOOL,
                        format!("utc_offset_hours must be a number between -12 and 14, got {value}"),
                    ));
                }
            },
        };

        // Range checked above, so the offset always fits
        #[allow(clippy::cast_possible_truncation)]
        let seconds = (hours * 3600.0).round() as i32;
        let Some(offset) = FixedOffset::east_opt(seconds) else {
            return Ok(ToolResult::failure(DATETIME_TOOL, format!("Invalid UTC offset: {hours}")));
        };

        let now = (self.clock)().with_timezone(&offset);
        let rendered = match format {
            "unix" => now.timestamp().to_string(),
            "human" => now.format("%A, %B %-d, %Y %H:%M:%S %:z").to_string(),
            _ => now.to_rfc3339(),
        };

        tracing::debug!(format, offset = %offset, "Reporting current time");
        Ok(ToolResult::success(DATETIME_TOOL, rendered.clone()).with_data(json!({
            "datetime": rendered,
            "format": format,
            "utcOffset": offset.to_string(),
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 15, 30, 0).unwrap()
    }

    fn call(args: Value) -> ToolCall {
        ToolCall::new("call_1", DATETIME_TOOL, serde_json::from_value(args).unwrap())
    }

    #[tokio::test]
    async fn test_default_is_iso_utc() {
        let tool = DateTimeTool::with_clock(fixed_clock);
        let result = tool.execute(&call(json!({}))).await.unwrap();
        assert!(result.success);
        assert_eq!(result.output, "2024-03-09T15:30:00+00:00");
    }

    #[tokio::test]
    async fn test_offset_and_formats() {
        let tool = DateTimeTool::with_clock(fixed_clock);

        let result = tool
            .execute(&call(json!({"format": "human", "utc_offset_hours": -5})))
            .await
            .unwrap();
        assert_eq!(result.output, "Saturday, March 9, 2024 10:30:00 -05:00");

        let result = tool
            .execute(&call(json!({"format": "unix", "utc_offset_hours": 5.5})))
            .await
            .unwrap();
        assert_eq!(result.output, fixed_clock().timestamp().to_string());
    }

    #[tokio::test]
    async fn test_bad_arguments_are_soft_failures() {
        let tool = DateTimeTool::with_clock(fixed_clock);

        let result = tool.execute(&call(json!({"format": "roman"}))).await.unwrap();
        assert!(!result.success);

        let result = tool
            .execute(&call(json!({"utc_offset_hours": 40})))
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.to_model_content().starts_with("Error: utc_offset_hours"));
    }
}
