//! In-process tool backend with the stock catalog: arithmetic, mock
//! weather and URL data, and a clock.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};

use super::{Content, ToolClient, ToolError, ToolInfo, ToolResult};

pub const CALCULATOR_TOOL: &str = "calculator";
pub const WEATHER_TOOL: &str = "get_weather";
pub const FETCH_URL_TOOL: &str = "fetch_url";
pub const CURRENT_TIME_TOOL: &str = "current_time";

const WEATHER_CONDITIONS: &[&str] = &[
    "sunny",
    "partly cloudy",
    "overcast",
    "light rain",
    "thunderstorms",
    "snow flurries",
    "foggy",
];

#[derive(Default)]
pub struct BuiltinTools;

impl BuiltinTools {
    pub fn new() -> Self {
        Self
    }

    fn calculator(args: &Value) -> ToolResult<String> {
        let operation = args
            .get("operation")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::InvalidParameters("missing 'operation'".to_string()))?;
        let a = args.get("a").and_then(Value::as_f64);

        let number = |value: Option<f64>, name: &str| {
            value.ok_or_else(|| ToolError::InvalidParameters(format!("missing number '{name}'")))
        };
        let integer = |value: Option<f64>, name: &str| -> ToolResult<u64> {
            let n = number(value, name)?;
            if n < 0.0 || n.fract() != 0.0 {
                return Err(ToolError::InvalidParameters(format!(
                    "'{name}' must be a non-negative integer"
                )));
            }
            Ok(n as u64)
        };

        match operation {
            "add" | "subtract" | "multiply" | "divide" => {
                let a = number(a, "a")?;
                let b = number(args.get("b").and_then(Value::as_f64), "b")?;
                let result = match operation {
                    "add" => a + b,
                    "subtract" => a - b,
                    "multiply" => a * b,
                    _ => {
                        if b == 0.0 {
                            return Err(ToolError::ExecutionFailed {
                                tool: CALCULATOR_TOOL.to_string(),
                                message: "division by zero".to_string(),
                            });
                        }
                        a / b
                    }
                };
                Ok(format!("{operation}({a}, {b}) = {result}"))
            }
            "factorial" => {
                let n = integer(a, "a")?;
                if n > 20 {
                    return Err(ToolError::ExecutionFailed {
                        tool: CALCULATOR_TOOL.to_string(),
                        message: format!("factorial({n}) overflows"),
                    });
                }
                let result: u64 = (1..=n).product();
                Ok(format!("factorial({n}) = {result}"))
            }
            "fibonacci" => {
                let n = integer(a, "a")?;
                if n > 92 {
                    return Err(ToolError::ExecutionFailed {
                        tool: CALCULATOR_TOOL.to_string(),
                        message: format!("fibonacci({n}) overflows"),
                    });
                }
                let (mut prev, mut curr) = (0u64, 1u64);
                for _ in 0..n {
                    let next = prev + curr;
                    prev = curr;
                    curr = next;
                }
                Ok(format!("fibonacci({n}) = {prev}"))
            }
            "is_prime" => {
                let n = integer(a, "a")?;
                Ok(format!(
                    "{n} is {}prime",
                    if Self::is_prime(n) { "" } else { "not " }
                ))
            }
            other => Err(ToolError::InvalidParameters(format!(
                "unknown operation '{other}'"
            ))),
        }
    }

    fn is_prime(n: u64) -> bool {
        if n < 2 {
            return false;
        }
        let mut i = 2;
        while i * i <= n {
            if n % i == 0 {
                return false;
            }
            i += 1;
        }
        true
    }

    fn weather(args: &Value) -> ToolResult<String> {
        let location = args
            .get("location")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::InvalidParameters("missing 'location'".to_string()))?;
        let units = args
            .get("units")
            .and_then(Value::as_str)
            .unwrap_or("celsius");

        // Deterministic mock: derive conditions from the location itself so
        // repeated calls agree.
        let seed: u64 = location
            .to_lowercase()
            .bytes()
            .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        let condition = WEATHER_CONDITIONS[(seed % WEATHER_CONDITIONS.len() as u64) as usize];
        let celsius = ((seed % 35) as i64) - 5;
        let humidity = 40 + (seed % 50);

        let (temperature, symbol) = match units {
            "fahrenheit" => (celsius * 9 / 5 + 32, "°F"),
            _ => (celsius, "°C"),
        };
        Ok(format!(
            "Weather in {location}: {condition}, {temperature}{symbol}, humidity {humidity}%"
        ))
    }

    fn fetch_url(args: &Value) -> ToolResult<String> {
        let url = args
            .get("url")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::InvalidParameters("missing 'url'".to_string()))?;
        Ok(format!(
            "Fetched {url} (200 OK)\nExample Domain\nThis mock page stands in for remote content."
        ))
    }

    fn current_time(args: &Value) -> String {
        let now = Utc::now();
        match args.get("format").and_then(Value::as_str) {
            Some("rfc3339") => now.to_rfc3339(),
            _ => now.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        }
    }
}

#[async_trait]
impl ToolClient for BuiltinTools {
    async fn list_tools(&self) -> ToolResult<Vec<ToolInfo>> {
        Ok(vec![
            ToolInfo::new(
                CALCULATOR_TOOL,
                "Perform arithmetic: add, subtract, multiply, divide, factorial, fibonacci, is_prime",
                json!({
                    "type": "object",
                    "properties": {
                        "operation": {
                            "type": "string",
                            "enum": ["add", "subtract", "multiply", "divide", "factorial", "fibonacci", "is_prime"]
                        },
                        "a": {"type": "number", "description": "First operand, or n for unary operations"},
                        "b": {"type": "number", "description": "Second operand for binary operations"}
                    },
                    "required": ["operation", "a"]
                }),
            ),
            ToolInfo::new(
                WEATHER_TOOL,
                "Get current weather conditions for a location",
                json!({
                    "type": "object",
                    "properties": {
                        "location": {"type": "string", "description": "City or place name"},
                        "units": {"type": "string", "enum": ["celsius", "fahrenheit"]}
                    },
                    "required": ["location"]
                }),
            ),
            ToolInfo::new(
                FETCH_URL_TOOL,
                "Fetch the contents of a web page",
                json!({
                    "type": "object",
                    "properties": {
                        "url": {"type": "string", "description": "URL to fetch"}
                    },
                    "required": ["url"]
                }),
            ),
            ToolInfo::new(
                CURRENT_TIME_TOOL,
                "Get the current date and time (UTC)",
                json!({
                    "type": "object",
                    "properties": {
                        "format": {"type": "string", "enum": ["rfc3339", "readable"]}
                    }
                }),
            ),
        ])
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> ToolResult<Vec<Content>> {
        let text = match name {
            CALCULATOR_TOOL => Self::calculator(&arguments)?,
            WEATHER_TOOL => Self::weather(&arguments)?,
            FETCH_URL_TOOL => Self::fetch_url(&arguments)?,
            CURRENT_TIME_TOOL => Self::current_time(&arguments),
            other => return Err(ToolError::NotFound(other.to_string())),
        };
        Ok(vec![Content::text(text)])
    }
}
