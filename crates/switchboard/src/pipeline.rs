//! The tool-selection pipeline: decide which tools a request needs, run
//! them, and synthesize a final answer from the enriched request.

use std::collections::HashSet;
use std::sync::Arc;

use indoc::formatdoc;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::providers::{Provider, ProviderError};
use crate::tools::builtin::{CALCULATOR_TOOL, CURRENT_TIME_TOOL, FETCH_URL_TOOL, WEATHER_TOOL};
use crate::tools::{ToolInfo, ToolInvoker};

/// One planned tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub args: Map<String, Value>,
    #[serde(default)]
    pub reason: String,
}

/// What the analysis step decided. Either parsed from the model's reply or
/// produced by the deterministic fallback; always structurally valid.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolAnalysis {
    pub needs_tools: bool,
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
}

/// Final answer plus the tools that contributed to it.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub response: String,
    pub tools_used: Vec<String>,
}

static LOCATION_RE: Lazy<Regex> = Lazy::new(|| {
    // Capitalized words after a preposition, so trailing prose like
    // "in Tokyo in fahrenheit" stops at the place name.
    Regex::new(r"\b(?:[Ii]n|[Ff]or|[Aa]t)\s+([A-Z][A-Za-z'-]*(?:\s+[A-Z][A-Za-z'-]*)*)")
        .expect("valid regex")
});
static LOWER_LOCATION_RE: Lazy<Regex> = Lazy::new(|| {
    // All-lowercase input has no capitalization to stop at, so this grabs
    // everything after the preposition and stop words trim it down.
    Regex::new(r"(?i)\b(?:in|for|at)\s+([a-z'-]+(?:\s+[a-z'-]+)*)").expect("valid regex")
});
static ARITHMETIC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)\s*([-+*/x])\s*(\d+(?:\.\d+)?)").expect("valid regex")
});
static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid regex"));
static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").expect("valid regex"));

const WEATHER_TERMS: &[&str] = &[
    "weather",
    "temperature",
    "forecast",
    "rain",
    "snow",
    "sunny",
    "humid",
];
const URL_TERMS: &[&str] = &["fetch", "url", "website", "webpage"];
const TIME_TERMS: &[&str] = &["time", "date", "clock", "today"];

/// Words that never belong to a place name in the lowercase capture.
const LOCATION_STOP_WORDS: &[&str] = &[
    "in",
    "for",
    "at",
    "the",
    "a",
    "an",
    "please",
    "today",
    "tomorrow",
    "now",
    "right",
    "celsius",
    "fahrenheit",
];

fn title_case(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Extract a `in/for/at <place>` location mention, if any. Capitalized
/// place names are taken verbatim; lowercase input is trimmed with stop
/// words and title-cased.
pub(crate) fn extract_location(message: &str) -> Option<String> {
    if let Some(captures) = LOCATION_RE.captures(message) {
        let place = captures[1].trim().to_string();
        if !place.is_empty() {
            return Some(place);
        }
    }

    let captures = LOWER_LOCATION_RE.captures(message)?;
    let place = captures[1]
        .split_whitespace()
        .skip_while(|t| LOCATION_STOP_WORDS.contains(&t.to_lowercase().as_str()))
        .take_while(|t| !LOCATION_STOP_WORDS.contains(&t.to_lowercase().as_str()))
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ");
    (!place.is_empty()).then_some(place)
}

/// Find the first balanced JSON object embedded in free text.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

pub struct ToolPipeline {
    provider: Arc<dyn Provider>,
    invoker: ToolInvoker,
}

impl ToolPipeline {
    pub fn new(provider: Arc<dyn Provider>, invoker: ToolInvoker) -> Self {
        Self { provider, invoker }
    }

    fn analysis_prompt(message: &str, tools: &[ToolInfo]) -> String {
        let catalog = tools
            .iter()
            .map(|t| format!("- {}: {}\n  parameters: {}", t.name, t.description, t.input_schema))
            .collect::<Vec<_>>()
            .join("\n");

        formatdoc! {r#"
            You are a tool selection assistant. Decide which of the available
            tools, if any, are needed to answer the user's request.

            Available tools:
            {catalog}

            User request: {message}

            Respond with a single JSON object and no other text:
            {{"needsTools": true or false, "toolCalls": [{{"name": "...", "args": {{...}}, "reason": "..."}}]}}
        "#}
    }

    fn parse_analysis(reply: &str, tools: &[ToolInfo]) -> Option<ToolAnalysis> {
        let json = extract_json_object(reply)?;
        let analysis: ToolAnalysis = serde_json::from_str(json).ok()?;

        // A call naming a tool outside the catalog is a contract violation;
        // discard the whole analysis rather than executing part of it.
        let known: HashSet<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        if analysis
            .tool_calls
            .iter()
            .any(|call| !known.contains(call.name.as_str()))
        {
            return None;
        }
        Some(analysis)
    }

    /// Ask the model which tools the request needs. A malformed reply falls
    /// back to keyword matching; a gateway failure propagates so the caller
    /// can bypass tool selection entirely.
    pub async fn analyze_tool_needs(
        &self,
        message: &str,
        tools: &[ToolInfo],
    ) -> Result<ToolAnalysis, ProviderError> {
        let prompt = Self::analysis_prompt(message, tools);
        let reply = self.provider.chat(&prompt, None).await?;

        match Self::parse_analysis(&reply, tools) {
            Some(analysis) => Ok(analysis),
            None => {
                debug!("analysis reply had no usable JSON, using keyword fallback");
                Ok(Self::fallback_tool_selection(message))
            }
        }
    }

    /// Deterministic keyword and regex matching over the stock catalog.
    /// Always returns a structurally valid analysis, with safe defaults
    /// when nothing useful can be extracted.
    pub fn fallback_tool_selection(message: &str) -> ToolAnalysis {
        let lower = message.to_lowercase();

        let single = |name: &str, args: Value, reason: &str| ToolAnalysis {
            needs_tools: true,
            tool_calls: vec![ToolCall {
                name: name.to_string(),
                args: match args {
                    Value::Object(map) => map,
                    _ => Map::new(),
                },
                reason: reason.to_string(),
            }],
        };

        let first_number = || {
            NUMBER_RE
                .find(&lower)
                .and_then(|m| m.as_str().parse::<f64>().ok())
                .unwrap_or(5.0)
        };

        if lower.contains("factorial") {
            return single(
                CALCULATOR_TOOL,
                serde_json::json!({"operation": "factorial", "a": first_number()}),
                "request mentions factorial",
            );
        }
        if lower.contains("fibonacci") {
            return single(
                CALCULATOR_TOOL,
                serde_json::json!({"operation": "fibonacci", "a": first_number()}),
                "request mentions fibonacci",
            );
        }
        if lower.contains("prime") {
            return single(
                CALCULATOR_TOOL,
                serde_json::json!({"operation": "is_prime", "a": first_number()}),
                "request mentions primality",
            );
        }
        if WEATHER_TERMS.iter().any(|t| lower.contains(t)) {
            let location = extract_location(message).unwrap_or_else(|| "Unknown".to_string());
            let units = if lower.contains("fahrenheit") {
                "fahrenheit"
            } else {
                "celsius"
            };
            return single(
                WEATHER_TOOL,
                serde_json::json!({"location": location, "units": units}),
                "request mentions weather",
            );
        }
        if let Some(captures) = ARITHMETIC_RE.captures(message) {
            let operation = match &captures[2] {
                "+" => "add",
                "-" => "subtract",
                "/" => "divide",
                _ => "multiply",
            };
            let a = captures[1].parse::<f64>().unwrap_or(0.0);
            let b = captures[3].parse::<f64>().unwrap_or(0.0);
            return single(
                CALCULATOR_TOOL,
                serde_json::json!({"operation": operation, "a": a, "b": b}),
                "request contains an arithmetic expression",
            );
        }
        if let Some(url) = URL_RE.find(message) {
            return single(
                FETCH_URL_TOOL,
                serde_json::json!({"url": url.as_str()}),
                "request contains a URL",
            );
        }
        if URL_TERMS.iter().any(|t| lower.contains(t)) {
            return single(
                FETCH_URL_TOOL,
                serde_json::json!({"url": "https://example.com"}),
                "request mentions fetching a page",
            );
        }
        if TIME_TERMS.iter().any(|t| lower.contains(t)) {
            return single(
                CURRENT_TIME_TOOL,
                serde_json::json!({}),
                "request asks about the current time",
            );
        }

        ToolAnalysis::default()
    }

    async fn analyze(&self, message: &str) -> anyhow::Result<ToolAnalysis> {
        let tools = self.invoker.list_tools().await?;
        Ok(self.analyze_tool_needs(message, &tools).await?)
    }

    /// Top-level entry: analyze, execute the planned calls strictly in
    /// order, then ask the model to compose the final answer from the
    /// enriched request.
    pub async fn process_with_tools(
        &self,
        message: &str,
        model: Option<&str>,
    ) -> Result<PipelineOutcome, ProviderError> {
        let analysis = match self.analyze(message).await {
            Ok(analysis) => analysis,
            Err(e) => {
                // Full bypass: answer the original message without tools.
                warn!(error = %e, "tool analysis unavailable, answering without tools");
                let response = self.provider.chat(message, model).await?;
                return Ok(PipelineOutcome {
                    response,
                    tools_used: Vec::new(),
                });
            }
        };

        let mut tools_used = Vec::new();
        let mut gathered = String::new();
        if analysis.needs_tools {
            // Sequential on purpose: the aggregated text must keep the
            // order the analysis produced.
            for call in &analysis.tool_calls {
                match self
                    .invoker
                    .call_tool(&call.name, Value::Object(call.args.clone()))
                    .await
                {
                    Ok(text) => {
                        tools_used.push(call.name.clone());
                        gathered.push_str(&format!("{} Result:\n{}\n\n", call.name, text));
                    }
                    Err(e) => {
                        warn!(tool = %call.name, error = %e, "tool call failed, continuing");
                        gathered.push_str(&format!("{} Error: {}\n\n", call.name, e));
                    }
                }
            }
        }

        let enriched = if gathered.is_empty() {
            message.to_string()
        } else {
            format!("{message}\n\nTool results:\n{gathered}")
        };
        let response = self.provider.chat(&enriched, model).await?;
        Ok(PipelineOutcome {
            response,
            tools_used,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_first_balanced_json_object() {
        let text = r#"Sure! Here is my plan: {"needsTools": true, "toolCalls": []} hope it helps"#;
        assert_eq!(
            extract_json_object(text),
            Some(r#"{"needsTools": true, "toolCalls": []}"#)
        );
    }

    #[test]
    fn json_extraction_handles_nesting_and_strings() {
        let text = r#"{"a": {"b": "with } brace and \" quote"}, "c": 1} trailing"#;
        let json = extract_json_object(text).unwrap();
        let value: Value = serde_json::from_str(json).unwrap();
        assert_eq!(value["c"], 1);
    }

    #[test]
    fn json_extraction_rejects_unbalanced_text() {
        assert_eq!(extract_json_object("no braces here"), None);
        assert_eq!(extract_json_object(r#"{"open": true"#), None);
    }

    #[test]
    fn analysis_parses_camel_case_fields() {
        let reply = r#"{"needsTools": true, "toolCalls": [{"name": "get_weather", "args": {"location": "Oslo"}, "reason": "weather question"}]}"#;
        let tools = vec![ToolInfo::new("get_weather", "", json!({}))];
        let analysis = ToolPipeline::parse_analysis(reply, &tools).unwrap();
        assert!(analysis.needs_tools);
        assert_eq!(analysis.tool_calls[0].name, "get_weather");
        assert_eq!(analysis.tool_calls[0].args["location"], "Oslo");
    }

    #[test]
    fn analysis_rejects_unknown_tool_names() {
        let reply = r#"{"needsTools": true, "toolCalls": [{"name": "telepathy", "args": {}}]}"#;
        let tools = vec![ToolInfo::new("get_weather", "", json!({}))];
        assert!(ToolPipeline::parse_analysis(reply, &tools).is_none());
    }

    #[test]
    fn fallback_picks_weather_with_location_and_units() {
        let analysis =
            ToolPipeline::fallback_tool_selection("What's the weather in Tokyo in fahrenheit?");
        assert!(analysis.needs_tools);
        let call = &analysis.tool_calls[0];
        assert_eq!(call.name, WEATHER_TOOL);
        assert_eq!(call.args["location"], "Tokyo");
        assert_eq!(call.args["units"], "fahrenheit");
    }

    #[test]
    fn location_extraction_handles_lowercase_input() {
        assert_eq!(
            extract_location("what's the weather in tokyo in fahrenheit?"),
            Some("Tokyo".to_string())
        );
        assert_eq!(
            extract_location("forecast for new york please"),
            Some("New York".to_string())
        );
        assert_eq!(
            extract_location("weather in the alps"),
            Some("Alps".to_string())
        );
        assert_eq!(extract_location("how humid is it?"), None);
    }

    #[test]
    fn fallback_extracts_lowercase_locations() {
        let analysis = ToolPipeline::fallback_tool_selection("weather in tokyo in fahrenheit");
        let call = &analysis.tool_calls[0];
        assert_eq!(call.name, WEATHER_TOOL);
        assert_eq!(call.args["location"], "Tokyo");
        assert_eq!(call.args["units"], "fahrenheit");
    }

    #[test]
    fn fallback_defaults_location_when_none_is_given() {
        let analysis = ToolPipeline::fallback_tool_selection("How humid is it?");
        assert_eq!(analysis.tool_calls[0].args["location"], "Unknown");
        assert_eq!(analysis.tool_calls[0].args["units"], "celsius");
    }

    #[test]
    fn fallback_picks_calculator_for_keywords_and_expressions() {
        let analysis = ToolPipeline::fallback_tool_selection("Compute the factorial of 6 please");
        let call = &analysis.tool_calls[0];
        assert_eq!(call.name, CALCULATOR_TOOL);
        assert_eq!(call.args["operation"], "factorial");
        assert_eq!(call.args["a"], 6.0);

        let analysis = ToolPipeline::fallback_tool_selection("What is 15 * 7?");
        let call = &analysis.tool_calls[0];
        assert_eq!(call.args["operation"], "multiply");
        assert_eq!(call.args["a"], 15.0);
        assert_eq!(call.args["b"], 7.0);
    }

    #[test]
    fn fallback_picks_url_and_time_tools() {
        let analysis =
            ToolPipeline::fallback_tool_selection("Please fetch https://example.org/page");
        assert_eq!(analysis.tool_calls[0].name, FETCH_URL_TOOL);
        assert_eq!(analysis.tool_calls[0].args["url"], "https://example.org/page");

        let analysis = ToolPipeline::fallback_tool_selection("What time is it?");
        assert_eq!(analysis.tool_calls[0].name, CURRENT_TIME_TOOL);
    }

    #[test]
    fn fallback_yields_no_tools_for_plain_chat() {
        let analysis = ToolPipeline::fallback_tool_selection("Tell me a joke");
        assert!(!analysis.needs_tools);
        assert!(analysis.tool_calls.is_empty());
    }
}
