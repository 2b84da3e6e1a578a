use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Current conditions as reported by one of the HTTP providers.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub location_name: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub condition: String,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub observation_time: DateTime<Utc>,
}

impl From<Observation> for WeatherData {
    fn from(obs: Observation) -> Self {
        WeatherData::new()
            .with("Place", obs.location_name)
            .with("Condition", obs.condition)
            .with("Temperature", format!("{:.1} °C", obs.temperature_c))
            .with("Feels like", format!("{:.1} °C", obs.feels_like_c))
            .with("Humidity", format!("{}%", obs.humidity_pct))
            .with("Wind", format!("{:.1} m/s", obs.wind_speed_mps))
            .with("Observed", obs.observation_time.format("%Y-%m-%d %H:%M UTC").to_string())
    }
}

/// Weather fields reported by a provider, in the order the provider produced them.
///
/// Inserting a key that already exists replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeatherData {
    fields: Vec<(String, String)>,
}

impl WeatherData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();

        match self.fields.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for WeatherData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut data = WeatherData::new();
        for (k, v) in iter {
            data.insert(k, v);
        }
        data
    }
}

impl Serialize for WeatherData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order_and_replaces_in_place() {
        let mut data = WeatherData::new();
        data.insert("Temperature", "3 °C");
        data.insert("Wind", "4 m/s");
        data.insert("Temperature", "5 °C");

        let fields: Vec<_> = data.iter().collect();
        assert_eq!(fields, vec![("Temperature", "5 °C"), ("Wind", "4 m/s")]);
        assert_eq!(data.get("Wind"), Some("4 m/s"));
        assert_eq!(data.get("Humidity"), None);
    }

    #[test]
    fn observation_renders_display_fields() {
        let obs = Observation {
            location_name: "Kyiv, UA".into(),
            temperature_c: 3.04,
            feels_like_c: -1.5,
            condition: "light snow".into(),
            humidity_pct: 87,
            wind_speed_mps: 4.0,
            observation_time: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        };

        let data = WeatherData::from(obs);
        let keys: Vec<_> = data.iter().map(|(k, _)| k).collect();

        assert_eq!(keys, ["Place", "Condition", "Temperature", "Feels like", "Humidity", "Wind", "Observed"]);
        assert_eq!(data.get("Place"), Some("Kyiv, UA"));
        assert_eq!(data.get("Temperature"), Some("3.0 °C"));
        assert_eq!(data.get("Feels like"), Some("-1.5 °C"));
        assert_eq!(data.get("Humidity"), Some("87%"));
        assert_eq!(data.get("Observed"), Some("2023-11-14 22:13 UTC"));
    }

    #[test]
    fn serializes_as_an_ordered_object() {
        let data = WeatherData::new().with("b", "2").with("a", "1");
        let json = serde_json::to_string(&data).unwrap();
        assert_eq!(json, r#"{"b":"2","a":"1"}"#);
    }
}
