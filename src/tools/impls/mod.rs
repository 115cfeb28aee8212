// Tool implementations
pub mod convert_temperature;
pub mod fetch_weather;

// Re-export all tools for registration
pub use convert_temperature::ConvertTemperatureTool;
pub use fetch_weather::FetchWeatherTool;
