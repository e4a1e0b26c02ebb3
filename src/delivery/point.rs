//! Time-series point model and InfluxDB v2 line protocol rendering.
//!
//! Wire format note: the series name of every point is the location itself,
//! and the quantity lives in a `measurement` tag. Existing dashboards key on
//! that layout (and on the `Celcius` spelling), so it is preserved verbatim.

use crate::sampling::data::Sample;

/// A single time-series record: a series name, a tag set, and one numeric
/// `value` field. Timestamped by the server at write time.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub series: String,
    pub tags: Vec<(String, String)>,
    pub value: f64,
}

impl Point {
    pub fn new(series: impl Into<String>, value: f64) -> Self {
        Self {
            series: series.into(),
            tags: Vec::new(),
            value,
        }
    }

    /// Attach a tag. Tag order is preserved in the rendered line.
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push((key.into(), value.into()));
        self
    }

    /// Render as one line of InfluxDB v2 line protocol.
    pub fn to_line_protocol(&self) -> String {
        let mut line = escape_measurement(&self.series);
        for (key, value) in &self.tags {
            line.push(',');
            line.push_str(&escape_tag(key));
            line.push('=');
            line.push_str(&escape_tag(value));
        }
        // {:?} always renders a decimal point or exponent, keeping the field
        // a float on the server even for whole numbers.
        line.push_str(&format!(" value={:?}", self.value));
        line
    }

    /// Look up a tag value, mainly for tests and diagnostics.
    pub fn tag_value(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

fn escape_measurement(s: &str) -> String {
    s.replace(',', "\\,").replace(' ', "\\ ")
}

fn escape_tag(s: &str) -> String {
    s.replace(',', "\\,").replace('=', "\\=").replace(' ', "\\ ")
}

/// Expand one sample into its six wire points, each tagged with the site
/// location and a `measurement`/`units` pair.
pub fn sample_points(location: &str, sample: &Sample) -> Vec<Point> {
    let tagged = |measurement: &str, units: &str, value: f64| {
        Point::new(location, value)
            .tag("location", location)
            .tag("measurement", measurement)
            .tag("units", units)
    };

    vec![
        tagged("bus_voltage", "Volt", sample.voltage),
        tagged("shunt_voltage", "mVolt", sample.shunt_voltage),
        tagged("bus_current", "mAmp", sample.current),
        tagged("power", "mWatt", sample.power),
        tagged("temperature", "Celcius", sample.temperature),
        tagged("signal_strength", "dBm", f64::from(sample.signal_strength)),
    ]
}
