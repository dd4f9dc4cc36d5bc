//! Built-in Tools
//!
//! Tools that implement `agent_core::Tool` for the playground agents.

mod datetime;
mod weather;

pub use datetime::{DATETIME_TOOL, DateTimeTool};
pub use weather::{MockWeatherSource, TemperatureUnit, WEATHER_TOOL, WeatherReport, WeatherSource, WeatherTool};

use agent_core::ToolRegistry;

/// Registry holding every built-in tool, weather backed by the mock source
pub fn builtin_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register_tool(WeatherTool::default());
    registry.register_tool(DateTimeTool::new());
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry() {
        let registry = builtin_registry();
        assert_eq!(registry.names(), vec![DATETIME_TOOL, WEATHER_TOOL]);
    }
}
