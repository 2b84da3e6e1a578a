//! Output formatters.
//!
//! A formatter turns a provider result into text. Formatters are looked up by
//! the `-f/--formatter` name; unknown names fall back to [`TableFormatter`].

use std::sync::Arc;

use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use crate::{
    config::DEFAULT_FORMATTER,
    error::RegistryError,
    model::WeatherData,
    registry::{OrderedRegistry, Registry},
};

pub trait Formatter: Send + Sync {
    /// Render `data` under a `[title, location]` header. No trailing newline.
    fn emit(&self, columns: [&str; 2], data: &WeatherData) -> String;
}

pub type FormatterRegistry = OrderedRegistry<Arc<dyn Formatter>>;

impl FormatterRegistry {
    pub fn new() -> Self {
        Self::with_kind("formatter")
    }

    pub fn builtin() -> Result<Self, RegistryError> {
        let mut formatters = Self::new();
        formatters.add(DEFAULT_FORMATTER, Arc::new(TableFormatter) as Arc<dyn Formatter>)?;
        formatters.add("plain", Arc::new(PlainFormatter) as Arc<dyn Formatter>)?;
        formatters.add("json", Arc::new(JsonFormatter) as Arc<dyn Formatter>)?;
        Ok(formatters)
    }

    /// The formatter registered as `name`, else the default one.
    pub fn select(&self, name: &str) -> Option<&Arc<dyn Formatter>> {
        self.get(name).or_else(|_| self.get(DEFAULT_FORMATTER)).ok()
    }
}

impl Default for FormatterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Bordered two-column table.
///
/// ```text
/// +----------------+------+
/// | OpenWeatherMap | Kyiv |
/// +================+======+
/// | Wind           | 3.6  |
/// +----------------+------+
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TableFormatter;

impl TableFormatter {
    fn border(widths: [usize; 2], fill: char) -> String {
        let left = fill.to_string().repeat(widths[0] + 2);
        let right = fill.to_string().repeat(widths[1] + 2);
        format!("+{left}+{right}+")
    }

    fn row(widths: [usize; 2], cells: [&str; 2]) -> String {
        let pad = |cell: &str, width: usize| {
            let mut padded = cell.to_string();
            padded.push_str(&" ".repeat(width.saturating_sub(cell.width())));
            padded
        };
        format!("| {} | {} |", pad(cells[0], widths[0]), pad(cells[1], widths[1]))
    }
}

impl Formatter for TableFormatter {
    fn emit(&self, columns: [&str; 2], data: &WeatherData) -> String {
        let mut widths = [columns[0].width(), columns[1].width()];
        for (key, value) in data.iter() {
            widths[0] = widths[0].max(key.width());
            widths[1] = widths[1].max(value.width());
        }

        let mut lines = vec![
            Self::border(widths, '-'),
            Self::row(widths, columns),
            Self::border(widths, '='),
        ];
        lines.extend(data.iter().map(|(key, value)| Self::row(widths, [key, value])));
        if !data.is_empty() {
            lines.push(Self::border(widths, '-'));
        }

        lines.join("\n")
    }
}

/// `key: value` lines under an underlined title and location.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainFormatter;

impl Formatter for PlainFormatter {
    fn emit(&self, columns: [&str; 2], data: &WeatherData) -> String {
        let mut out = format!("{}:\n{}\n\n{}\n{}\n", columns[0], "#".repeat(10), columns[1], "-".repeat(20));
        for (key, value) in data.iter() {
            out.push_str(&format!("{key}: {value}\n"));
        }
        out.push_str(&"=".repeat(40));
        out
    }
}

/// Pretty-printed JSON object with `title`, `location` and `data` keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

#[derive(Serialize)]
struct JsonReport<'a> {
    title: &'a str,
    location: &'a str,
    data: &'a WeatherData,
}

impl Formatter for JsonFormatter {
    fn emit(&self, columns: [&str; 2], data: &WeatherData) -> String {
        let report = JsonReport { title: columns[0], location: columns[1], data };
        serde_json::to_string_pretty(&report).unwrap_or_else(|err| {
            tracing::error!(%err, "failed to serialize report");
            String::new()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> WeatherData {
        WeatherData::new().with("Temperature", "3.0 °C").with("Wind", "4.0 m/s")
    }

    #[test]
    fn table_aligns_columns() {
        let text = TableFormatter.emit(["Accu", "Kyiv"], &sample());

        let expected = "\
+-------------+---------+
| Accu        | Kyiv    |
+=============+=========+
| Temperature | 3.0 °C  |
| Wind        | 4.0 m/s |
+-------------+---------+";
        assert_eq!(text, expected);
    }

    #[test]
    fn table_without_data_is_just_the_header() {
        let text = TableFormatter.emit(["RP5", "Lviv"], &WeatherData::new());
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("| RP5 | Lviv |"));
    }

    #[test]
    fn plain_lists_fields_in_order() {
        let text = PlainFormatter.emit(["Accu", "Kyiv"], &sample());
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "Accu:");
        assert_eq!(lines[3], "Kyiv");
        assert_eq!(lines[5], "Temperature: 3.0 °C");
        assert_eq!(lines[6], "Wind: 4.0 m/s");
        assert_eq!(lines.last(), Some(&"=".repeat(40).as_str()));
    }

    #[test]
    fn json_keeps_field_order() {
        let text = JsonFormatter.emit(["Accu", "Kyiv"], &sample());
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["title"], "Accu");
        assert_eq!(value["location"], "Kyiv");
        assert_eq!(value["data"]["Wind"], "4.0 m/s");
        assert!(text.find("Temperature").unwrap() < text.find("Wind").unwrap());
    }

    #[test]
    fn select_falls_back_to_table() {
        let formatters = FormatterRegistry::builtin().unwrap();
        let data = sample();

        let fallback = formatters.select("nope").unwrap().emit(["A", "B"], &data);
        assert_eq!(fallback, TableFormatter.emit(["A", "B"], &data));

        let json = formatters.select("json").unwrap().emit(["A", "B"], &data);
        assert!(json.starts_with('{'));
    }

    #[test]
    fn select_without_default_is_none() {
        let formatters = FormatterRegistry::new();
        assert!(formatters.select("table").is_none());
    }
}
