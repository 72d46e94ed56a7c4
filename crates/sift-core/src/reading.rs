//! Readings and datapoints.
//!
//! A [`Reading`] is one telemetry record: an asset name, an ordered
//! collection of named [`DataPoint`]s and a timestamp. Datapoint order
//! is insertion order and is preserved across transformations unless a
//! rule explicitly reorders or removes.

use crate::{Error, Value};
use chrono::{DateTime, Utc};

/// One named value within a reading.
///
/// Names are unique within a reading's top-level collection and within
/// each nested Dict/List level.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    /// Datapoint name.
    pub name: String,
    /// The value carried.
    pub value: Value,
}

impl DataPoint {
    /// Create a datapoint.
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// One structured telemetry record.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    /// The asset name, the primary match key for rules.
    pub asset: String,
    /// Ordered datapoints.
    pub datapoints: Vec<DataPoint>,
    /// When the reading was taken.
    pub timestamp: DateTime<Utc>,
}

impl Reading {
    /// Create a reading timestamped now.
    pub fn new(asset: impl Into<String>, datapoints: Vec<DataPoint>) -> Self {
        Self {
            asset: asset.into(),
            datapoints,
            timestamp: Utc::now(),
        }
    }

    /// Create a reading carrying an existing timestamp.
    ///
    /// Derived readings (split, flatten) use this so the source
    /// reading's timestamp survives the transformation.
    pub fn with_timestamp(
        asset: impl Into<String>,
        datapoints: Vec<DataPoint>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            asset: asset.into(),
            datapoints,
            timestamp,
        }
    }

    /// Number of top-level datapoints.
    pub fn datapoint_count(&self) -> usize {
        self.datapoints.len()
    }

    /// Look up a top-level datapoint by name.
    pub fn datapoint(&self, name: &str) -> Option<&DataPoint> {
        self.datapoints.iter().find(|dp| dp.name == name)
    }

    /// Remove and return the first top-level datapoint with this name.
    pub fn remove_datapoint(&mut self, name: &str) -> Option<DataPoint> {
        let index = self.datapoints.iter().position(|dp| dp.name == name)?;
        Some(self.datapoints.remove(index))
    }

    /// Append a datapoint.
    pub fn push_datapoint(&mut self, datapoint: DataPoint) {
        self.datapoints.push(datapoint);
    }

    /// Parse a reading from its JSON document form.
    ///
    /// Expected shape:
    ///
    /// ```json
    /// { "asset": "pump1",
    ///   "timestamp": "2025-01-01T00:00:00Z",
    ///   "readings": { "voltage": 240, "current": 1.2 } }
    /// ```
    ///
    /// `timestamp` is optional and defaults to now.
    pub fn from_json(json: &serde_json::Value) -> Result<Self, Error> {
        let object = json.as_object().ok_or(Error::BadField {
            field: "reading".to_string(),
            reason: "expected a JSON object".to_string(),
        })?;

        let asset = object
            .get("asset")
            .ok_or(Error::MissingField("asset"))?
            .as_str()
            .ok_or_else(|| Error::BadField {
                field: "asset".to_string(),
                reason: "expected a string".to_string(),
            })?
            .to_string();

        let timestamp = match object.get("timestamp") {
            Some(serde_json::Value::String(raw)) => DateTime::parse_from_rfc3339(raw)
                .map_err(|_| Error::InvalidTimestamp(raw.clone()))?
                .with_timezone(&Utc),
            Some(other) => {
                return Err(Error::BadField {
                    field: "timestamp".to_string(),
                    reason: format!("expected an RFC 3339 string, got {other}"),
                })
            }
            None => Utc::now(),
        };

        let members = object
            .get("readings")
            .ok_or(Error::MissingField("readings"))?
            .as_object()
            .ok_or_else(|| Error::BadField {
                field: "readings".to_string(),
                reason: "expected a JSON object".to_string(),
            })?;

        let mut datapoints = Vec::with_capacity(members.len());
        for (name, value) in members {
            datapoints.push(DataPoint::new(name.clone(), Value::from_json(name, value)?));
        }

        Ok(Self {
            asset,
            datapoints,
            timestamp,
        })
    }

    /// Render this reading into its JSON document form.
    pub fn to_json(&self) -> serde_json::Value {
        let mut readings = serde_json::Map::new();
        for dp in &self.datapoints {
            readings.insert(dp.name.clone(), dp.value.to_json());
        }
        serde_json::json!({
            "asset": self.asset,
            "timestamp": self.timestamp.to_rfc3339(),
            "readings": readings,
        })
    }
}
