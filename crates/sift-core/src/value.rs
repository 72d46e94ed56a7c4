//! Datapoint values.
//!
//! A [`Value`] is a tagged union over the scalar, array and nested
//! container shapes a datapoint may carry. Dict and List values hold
//! nested datapoints recursively; in practice the structure is always a
//! tree, so ownership is strictly parent-owns-children.

use crate::reading::DataPoint;
use crate::Error;
use serde_json::json;

/// An opaque image payload.
///
/// Images arrive from acquisition plugins, never from the JSON data
/// plane; they are carried through transformations untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Bits per pixel.
    pub depth: u8,
    /// Raw pixel data.
    pub data: Vec<u8>,
}

/// The value carried by a single datapoint.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Signed integer scalar.
    Integer(i64),
    /// Floating point scalar.
    Float(f64),
    /// String scalar.
    String(String),
    /// One-dimensional array of floats.
    FloatArray(Vec<f64>),
    /// Two-dimensional array of floats.
    TwoDFloatArray(Vec<Vec<f64>>),
    /// Image payload.
    Image(Image),
    /// Opaque binary buffer.
    DataBuffer(Vec<u8>),
    /// Nested dictionary of datapoints, insertion ordered.
    Dict(Vec<DataPoint>),
    /// Nested list of datapoints, insertion ordered.
    List(Vec<DataPoint>),
}

impl Value {
    /// The canonical wire name for this value's type.
    ///
    /// These are the names type-based rules (remove/select by `type`)
    /// compare against, after alias normalisation.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "INTEGER",
            Value::Float(_) => "FLOAT",
            Value::String(_) => "STRING",
            Value::FloatArray(_) => "FLOAT_ARRAY",
            Value::TwoDFloatArray(_) => "2D_FLOAT_ARRAY",
            Value::Image(_) => "IMAGE",
            Value::DataBuffer(_) => "DATABUFFER",
            Value::Dict(_) => "DP_DICT",
            Value::List(_) => "DP_LIST",
        }
    }

    /// True for Dict and List values, the shapes flatten recurses into.
    pub fn is_container(&self) -> bool {
        matches!(self, Value::Dict(_) | Value::List(_))
    }

    /// Map a JSON value onto the value model.
    ///
    /// Integers stay integral, all other numbers become floats. Arrays
    /// are classified by their elements: numbers give a `FloatArray`,
    /// arrays of numbers a `TwoDFloatArray`, objects a `List`. Objects
    /// become `Dict`s, recursively, preserving member order.
    pub fn from_json(name: &str, json: &serde_json::Value) -> Result<Value, Error> {
        match json {
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::Integer(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Value::Float(f))
                } else {
                    Err(Error::UnsupportedValue {
                        name: name.to_string(),
                        reason: format!("number {n} is out of range"),
                    })
                }
            }
            serde_json::Value::String(s) => Ok(Value::String(s.clone())),
            serde_json::Value::Array(items) => Self::array_from_json(name, items),
            serde_json::Value::Object(members) => {
                let mut children = Vec::with_capacity(members.len());
                for (child_name, child) in members {
                    children.push(DataPoint::new(
                        child_name.clone(),
                        Value::from_json(child_name, child)?,
                    ));
                }
                Ok(Value::Dict(children))
            }
            other => Err(Error::UnsupportedValue {
                name: name.to_string(),
                reason: format!("JSON {other} has no datapoint representation"),
            }),
        }
    }

    fn array_from_json(name: &str, items: &[serde_json::Value]) -> Result<Value, Error> {
        if items.iter().all(|v| v.is_number()) {
            let floats = items
                .iter()
                .map(|v| v.as_f64().unwrap_or_default())
                .collect();
            return Ok(Value::FloatArray(floats));
        }
        if items
            .iter()
            .all(|v| v.as_array().is_some_and(|row| row.iter().all(|c| c.is_number())))
        {
            let rows = items
                .iter()
                .map(|v| {
                    v.as_array()
                        .map(|row| row.iter().map(|c| c.as_f64().unwrap_or_default()).collect())
                        .unwrap_or_default()
                })
                .collect();
            return Ok(Value::TwoDFloatArray(rows));
        }
        if items.iter().all(|v| v.is_object()) {
            let mut children = Vec::new();
            for item in items {
                if let serde_json::Value::Object(members) = item {
                    for (child_name, child) in members {
                        children.push(DataPoint::new(
                            child_name.clone(),
                            Value::from_json(child_name, child)?,
                        ));
                    }
                }
            }
            return Ok(Value::List(children));
        }
        Err(Error::UnsupportedValue {
            name: name.to_string(),
            reason: "array elements must be all numbers, all rows or all objects".to_string(),
        })
    }

    /// Render this value back into JSON.
    ///
    /// The inverse of [`Value::from_json`] for the JSON-constructible
    /// shapes; images and buffers render as tagged objects.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Integer(i) => json!(i),
            Value::Float(f) => json!(f),
            Value::String(s) => json!(s),
            Value::FloatArray(items) => json!(items),
            Value::TwoDFloatArray(rows) => json!(rows),
            Value::Image(image) => json!({
                "type": "image",
                "width": image.width,
                "height": image.height,
                "depth": image.depth,
            }),
            Value::DataBuffer(bytes) => json!({
                "type": "databuffer",
                "data": bytes,
            }),
            Value::Dict(children) => {
                let mut members = serde_json::Map::new();
                for child in children {
                    members.insert(child.name.clone(), child.value.to_json());
                }
                serde_json::Value::Object(members)
            }
            Value::List(children) => {
                let items = children
                    .iter()
                    .map(|child| {
                        let mut member = serde_json::Map::new();
                        member.insert(child.name.clone(), child.value.to_json());
                        serde_json::Value::Object(member)
                    })
                    .collect();
                serde_json::Value::Array(items)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_from_json() {
        let v = Value::from_json("a", &json!(12)).unwrap();
        assert_eq!(v, Value::Integer(12));
        assert_eq!(v.type_name(), "INTEGER");

        let v = Value::from_json("a", &json!(1.5)).unwrap();
        assert_eq!(v, Value::Float(1.5));
        assert_eq!(v.type_name(), "FLOAT");

        let v = Value::from_json("a", &json!("on")).unwrap();
        assert_eq!(v, Value::String("on".to_string()));
        assert_eq!(v.type_name(), "STRING");
    }

    #[test]
    fn arrays_classified_by_elements() {
        let v = Value::from_json("a", &json!([1, 2.5, 3])).unwrap();
        assert_eq!(v, Value::FloatArray(vec![1.0, 2.5, 3.0]));

        let v = Value::from_json("a", &json!([[1, 2], [3, 4]])).unwrap();
        assert_eq!(
            v,
            Value::TwoDFloatArray(vec![vec![1.0, 2.0], vec![3.0, 4.0]])
        );
        assert_eq!(v.type_name(), "2D_FLOAT_ARRAY");
    }

    #[test]
    fn objects_become_ordered_dicts() {
        let v = Value::from_json("pressure", &json!({"floor1": 30, "floor2": 34})).unwrap();
        let Value::Dict(children) = &v else {
            panic!("expected dict");
        };
        assert_eq!(children[0].name, "floor1");
        assert_eq!(children[1].name, "floor2");
        assert!(v.is_container());
    }

    #[test]
    fn array_of_objects_becomes_list() {
        let v = Value::from_json("seq", &json!([{"a": 1}, {"b": 2}])).unwrap();
        let Value::List(children) = &v else {
            panic!("expected list");
        };
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].name, "a");
        assert_eq!(children[1].name, "b");
    }

    #[test]
    fn unsupported_shapes_are_errors() {
        assert!(Value::from_json("a", &json!(null)).is_err());
        assert!(Value::from_json("a", &json!(true)).is_err());
        assert!(Value::from_json("a", &json!([1, "x"])).is_err());
    }

    #[test]
    fn json_round_trip_preserves_shape() {
        let original = json!({"floor1": 30, "floor2": {"left": 1.5, "right": 2.5}});
        let v = Value::from_json("pressure", &original).unwrap();
        assert_eq!(v.to_json(), original);
    }
}
