//! End-to-end agent runs against a scripted model

use std::sync::Arc;

use agent_core::{AgentContext, ModelHandle, Role, TokenUsage, Tool, ToolCall, ToolRegistry};
use agent_playground::tools::{WeatherReport, WeatherSource, WeatherTool};
use agent_playground::{AgentOverrides, PlaygroundError, builtin_registry, create_agent};
use agent_test_model::{ScriptedModel, args};
use async_trait::async_trait;
use serde_json::json;

fn registry() -> Arc<ToolRegistry> {
    Arc::new(builtin_registry())
}

fn handle(model: &Arc<ScriptedModel>) -> ModelHandle {
    model.clone()
}

#[tokio::test]
async fn plain_answer_finishes_in_one_step() {
    let model = Arc::new(ScriptedModel::new("test-model").then_text("Clear skies"));
    let agent = create_agent("weather", handle(&model), AgentOverrides::default(), registry()).unwrap();

    let result = agent.execute(&AgentContext::new("Weather in Boston?")).await;

    assert!(result.success);
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["data"]["text"], "Clear skies");
    assert_eq!(value["data"]["toolCalls"], json!([]));
    assert_eq!(value["data"]["steps"].as_array().unwrap().len(), 1);
    assert_eq!(value["data"]["steps"][0]["stepNumber"], 1);
    assert_eq!(value["data"]["steps"][0]["text"], "Clear skies");
    assert_eq!(value["data"]["steps"][0]["toolCalls"], json!([]));
    assert_eq!(value["metadata"]["toolCalls"], 0);
    assert_eq!(value["metadata"]["model"], "test-model");
    assert!(value["metadata"]["duration"].is_u64());
}

#[tokio::test]
async fn model_failure_becomes_failure_envelope() {
    let model = Arc::new(ScriptedModel::new("test-model").then_fail("rate limited"));
    let agent = create_agent("multi", handle(&model), AgentOverrides::default(), registry()).unwrap();

    let result = agent.execute(&AgentContext::new("hi")).await;

    assert!(!result.success);
    assert!(result.data.is_none());
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["error"], "rate limited");
    let metadata = value["metadata"].as_object().unwrap();
    assert_eq!(metadata.len(), 1);
    assert!(metadata["duration"].is_u64());
}

#[tokio::test]
async fn tool_result_is_fed_back_to_the_model() {
    let model = Arc::new(
        ScriptedModel::new("test-model")
            .then_tool_call("", "weather", json!({"location": "Exeter, NH"}))
            .then_text("It is 45°F and partly cloudy in Exeter."),
    );
    let agent = create_agent("weather", handle(&model), AgentOverrides::default(), registry()).unwrap();

    let result = agent.execute(&AgentContext::new("Weather in Exeter, NH?")).await;

    let data = result.data.unwrap();
    assert_eq!(data.text, "It is 45°F and partly cloudy in Exeter.");
    assert!(data.tool_calls.is_empty());
    assert_eq!(data.steps.len(), 2);
    assert_eq!(data.steps[0].tool_calls[0].name, "weather");
    assert_eq!(data.steps[0].tool_results[0].data.as_ref().unwrap()["temperature"], 45);
    assert_eq!(data.usage, TokenUsage::new(20, 10));

    let requests = model.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].tool_names, vec!["weather"]);
    let tool_message = requests[1].messages.last().unwrap();
    assert_eq!(tool_message.role, Role::Tool);
    assert_eq!(tool_message.tool_call_id.as_deref(), Some("call_1"));
    assert!(tool_message.content.contains("Partly cloudy"));
}

#[tokio::test]
async fn loop_stops_after_three_steps() {
    let model = Arc::new(
        ScriptedModel::new("test-model")
            .then_tool_call("one", "weather", json!({"location": "A"}))
            .then_tool_call("two", "weather", json!({"location": "B"}))
            .then_tool_call("three", "weather", json!({"location": "C"}))
            .then_text("never reached"),
    );
    let agent = create_agent("weather", handle(&model), AgentOverrides::default(), registry()).unwrap();

    let result = agent.execute(&AgentContext::new("loop")).await;

    assert!(result.success);
    assert_eq!(model.requests().len(), 3);
    let data = result.data.as_ref().unwrap();
    let numbers: Vec<usize> = data.steps.iter().map(|s| s.step_number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    assert_eq!(data.text, "three");
    // Final-step calls only, and they were still executed
    assert_eq!(data.tool_calls.len(), 1);
    assert_eq!(data.tool_calls[0].str_arg("location"), Some("C"));
    assert_eq!(data.steps[2].tool_results.len(), 1);
    assert_eq!(result.metadata.tool_calls, Some(1));
}

#[tokio::test]
async fn calls_in_one_step_run_in_arrival_order() {
    let calls = vec![
        ToolCall::new("call_exeter", "weather", args(json!({"location": "Exeter, NH"}))),
        ToolCall::new("call_oslo", "weather", args(json!({"location": "Oslo"}))),
    ];
    let model = Arc::new(
        ScriptedModel::new("test-model")
            .with_usage(TokenUsage::new(7, 3))
            .then_tool_calls("Checking both.", calls)
            .then_text("Exeter is colder than Oslo."),
    );
    let agent = create_agent("weather", handle(&model), AgentOverrides::default(), registry()).unwrap();

    let result = agent.execute(&AgentContext::new("Exeter or Oslo?")).await;

    let data = result.data.unwrap();
    assert_eq!(data.usage, TokenUsage::new(14, 6));
    let first = &data.steps[0];
    let call_ids: Vec<&str> = first.tool_calls.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(call_ids, vec!["call_exeter", "call_oslo"]);
    let result_ids: Vec<Option<&str>> = first.tool_results.iter().map(|r| r.id.as_deref()).collect();
    assert_eq!(result_ids, vec![Some("call_exeter"), Some("call_oslo")]);
    assert!(first.tool_results[0].output.starts_with("Exeter, NH: 45°F"));
    assert!(first.tool_results[1].output.starts_with("Oslo: 50°F"));

    let requests = model.requests();
    let messages = &requests[1].messages;
    assert_eq!(messages.len(), 5);
    assert_eq!(messages[2].tool_calls.len(), 2);
    assert_eq!(messages[3].role, Role::Tool);
    assert_eq!(messages[3].tool_call_id.as_deref(), Some("call_exeter"));
    assert_eq!(messages[4].role, Role::Tool);
    assert_eq!(messages[4].tool_call_id.as_deref(), Some("call_oslo"));
}

#[tokio::test(start_paused = true)]
async fn weather_agent_retries_rate_limited_calls() {
    let model = Arc::new(
        ScriptedModel::new("test-model")
            .then_rate_limited("429 Too Many Requests")
            .then_text("Sunny in Boston."),
    );
    let agent = create_agent("weather", handle(&model), AgentOverrides::default(), registry()).unwrap();

    let result = agent.execute(&AgentContext::new("Weather in Boston?")).await;

    assert!(result.success);
    let data = result.data.unwrap();
    assert_eq!(data.text, "Sunny in Boston.");
    assert_eq!(data.steps.len(), 1);
    assert_eq!(model.requests().len(), 2);
}

#[tokio::test]
async fn multi_agent_does_not_retry() {
    let model = Arc::new(
        ScriptedModel::new("test-model")
            .then_rate_limited("429 Too Many Requests")
            .then_text("unreachable"),
    );
    let agent = create_agent("multi", handle(&model), AgentOverrides::default(), registry()).unwrap();

    let result = agent.execute(&AgentContext::new("hi")).await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Rate limited: 429 Too Many Requests"));
    assert_eq!(model.requests().len(), 1);
}

#[tokio::test]
async fn multi_agent_drops_unknown_tool_names() {
    let model = Arc::new(ScriptedModel::new("test-model").then_text("ok"));
    let overrides = AgentOverrides {
        tools: Some(vec!["weather".into(), "doesnotexist".into()]),
        ..Default::default()
    };
    let agent = create_agent("multi", handle(&model), overrides, registry()).unwrap();

    assert!(agent.execute(&AgentContext::new("hi")).await.success);
    assert_eq!(model.requests()[0].tool_names, vec!["weather"]);
}

#[tokio::test]
async fn multi_agent_defaults_to_every_tool() {
    let model = Arc::new(ScriptedModel::new("test-model").then_text("ok"));
    let agent = create_agent("multi", handle(&model), AgentOverrides::default(), registry()).unwrap();

    agent.execute(&AgentContext::new("hi")).await;
    assert_eq!(model.requests()[0].tool_names, vec!["datetime", "weather"]);
}

#[tokio::test]
async fn unknown_tool_from_model_aborts() {
    let model = Arc::new(
        ScriptedModel::new("test-model")
            .then_tool_call("", "teleport", json!({}))
            .then_text("unreachable"),
    );
    let agent = create_agent("weather", handle(&model), AgentOverrides::default(), registry()).unwrap();

    let result = agent.execute(&AgentContext::new("beam me up")).await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Tool not found: teleport"));
    assert_eq!(model.requests().len(), 1);
}

struct BrokenSource;

#[async_trait]
impl WeatherSource for BrokenSource {
    async fn current(&self, _location: &str) -> agent_playground::Result<WeatherReport> {
        Err(PlaygroundError::SourceUnavailable("timeout".into()))
    }

    fn name(&self) -> &str {
        "broken"
    }
}

#[tokio::test]
async fn tool_error_aborts_the_invocation() {
    let mut tools = ToolRegistry::new();
    tools.register_tool(WeatherTool::new(Arc::new(BrokenSource)));

    let model = Arc::new(
        ScriptedModel::new("test-model")
            .then_tool_call("", "weather", json!({"location": "Oslo"}))
            .then_text("unreachable"),
    );
    let agent = create_agent("weather", handle(&model), AgentOverrides::default(), Arc::new(tools)).unwrap();

    let result = agent.execute(&AgentContext::new("Weather in Oslo?")).await;

    assert!(!result.success);
    assert!(result.error.unwrap().contains("Failed to fetch weather for Oslo"));
    assert!(result.metadata.model.is_none());
}

#[tokio::test]
async fn empty_custom_prompt_falls_back_to_default() {
    let model = Arc::new(ScriptedModel::new("test-model").then_text("a").then_text("b"));

    let custom = AgentOverrides {
        system_prompt: Some("Only answer in French.".into()),
        ..Default::default()
    };
    let agent = create_agent("multi", handle(&model), custom, registry()).unwrap();
    agent.execute(&AgentContext::new("")).await;

    let empty = AgentOverrides {
        system_prompt: Some(String::new()),
        ..Default::default()
    };
    let agent = create_agent("weather", handle(&model), empty, registry()).unwrap();
    agent.execute(&AgentContext::new("")).await;

    let requests = model.requests();
    assert_eq!(requests[0].messages[0].content, "Only answer in French.");
    assert_eq!(requests[0].messages[1].content, "");
    assert!(requests[1].messages[0].content.starts_with("You are a helpful weather assistant."));
}

#[tokio::test]
async fn context_options_reach_the_model() {
    let model = Arc::new(ScriptedModel::new("test-model").then_text("ok"));
    let agent = create_agent("multi", handle(&model), AgentOverrides::default(), registry()).unwrap();

    let context = AgentContext::new("hi").with_option("temperature", json!(0.5));
    agent.execute(&context).await;

    assert_eq!(model.requests()[0].options.temperature, Some(0.5));
}

#[test]
fn registry_subset_and_overwrite() {
    let mut tools = builtin_registry();
    let subset = tools.get_many(&["weather", "doesnotexist"]);
    assert_eq!(subset.names(), vec!["weather"]);

    // Re-registering under an existing name replaces the entry
    tools.register("datetime", Arc::new(WeatherTool::default()));
    let replaced = tools.get("datetime").unwrap();
    assert_eq!(replaced.schema().description, "Get current weather for a location");
    assert_eq!(tools.len(), 2);
}

#[tokio::test]
async fn aliased_tool_reports_the_called_name() {
    let mut tools = ToolRegistry::new();
    tools.register("forecast", Arc::new(WeatherTool::default()));
    let model = Arc::new(
        ScriptedModel::new("test-model")
            .then_tool_call("", "forecast", json!({"location": "Boston"}))
            .then_text("Sunny."),
    );
    let overrides = AgentOverrides {
        tools: Some(vec!["forecast".into()]),
        ..Default::default()
    };
    let agent = create_agent("multi", handle(&model), overrides, Arc::new(tools)).unwrap();

    let result = agent.execute(&AgentContext::new("Boston?")).await;

    let data = result.data.unwrap();
    assert_eq!(data.steps[0].tool_results[0].name, "forecast");
    let tool_message = model.requests()[1].messages.last().cloned().unwrap();
    assert_eq!(tool_message.name.as_deref(), Some("forecast"));
}
