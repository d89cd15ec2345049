pub mod optional_f64_string {
    use serde::Deserialize;
    use serde_json::Value;

    pub fn serialize<S>(option: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if let Some(value) = *option {
            return serializer.serialize_f64(value);
        }
        serializer.serialize_none()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let option: Option<Value> = Option::deserialize(deserializer)?;
        if let Some(value) = option {
            if let Some(value) = value.as_str() {
                if let Ok(value) = value.trim().parse::<f64>() {
                    Ok(Some(value).filter(|value| value.is_finite()))
                } else {
                    Ok(None)
                }
            } else {
                Ok(value.as_f64())
            }
        } else {
            Ok(None)
        }
    }
}

/// identifiers and labels that backends send either as strings or as bare numbers
pub mod optional_identifier_string {
    use serde::Deserialize;
    use serde_json::Value;

    pub fn serialize<S>(option: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if let Some(value) = option {
            return serializer.serialize_str(value);
        }
        serializer.serialize_none()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let option: Option<Value> = Option::deserialize(deserializer)?;
        Ok(match option {
            Some(Value::String(value)) => Some(value),
            Some(Value::Number(value)) => Some(value.to_string()),
            Some(Value::Bool(value)) => Some(value.to_string()),
            _ => None,
        })
    }
}

/// coerce a JSON number or numeric string into a finite coordinate within `[-limit, limit]`
pub fn coerce_coordinate(
    value: &serde_json::Value,
    field: &str,
    limit: f64,
) -> Result<f64, crate::location::ParseError> {
    let coordinate = match value {
        serde_json::Value::Number(number) => number.as_f64(),
        serde_json::Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };

    match coordinate {
        Some(coordinate) if coordinate.is_finite() => {
            if coordinate.abs() <= limit {
                Ok(coordinate)
            } else {
                Err(crate::location::ParseError::OutOfRange {
                    field: field.to_string(),
                    value: coordinate,
                })
            }
        }
        _ => Err(crate::location::ParseError::InvalidCoordinate {
            field: field.to_string(),
            value: value.to_string(),
        }),
    }
}

pub fn duration_string(duration: &chrono::Duration) -> String {
    let mut parts = vec![];

    let weeks = duration.num_weeks().abs();
    let days = duration.num_days().abs() % 7;
    let hours = duration.num_hours().abs() % 24;
    let minutes = duration.num_minutes().abs() % 60;
    let seconds = duration.num_seconds().abs() % 60;

    if weeks > 0 {
        parts.push(format!("{:}w", weeks));
    }

    if days > 0 {
        parts.push(format!("{:}d", days));
    }

    if hours > 0 {
        parts.push(format!("{:}h", hours));
    }

    if minutes > 0 {
        parts.push(format!("{:}m", minutes));
    }

    if seconds > 0 {
        parts.push(format!("{:}s", seconds));
    }

    if parts.is_empty() {
        parts.push(format!("{:}ms", duration.num_milliseconds().abs()));
    }

    if *duration < chrono::Duration::zero() {
        parts.push("ago".to_string());
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(serde::Deserialize)]
    struct Record {
        #[serde(default)]
        #[serde(with = "optional_f64_string")]
        sog: Option<f64>,
        #[serde(default)]
        #[serde(with = "optional_identifier_string")]
        mmsi: Option<String>,
    }

    #[test]
    fn test_optional_f64_string() {
        let record: Record = serde_json::from_str(r#"{"sog": "12.5"}"#).unwrap();
        assert_eq!(record.sog, Some(12.5));

        let record: Record = serde_json::from_str(r#"{"sog": 3}"#).unwrap();
        assert_eq!(record.sog, Some(3.0));

        let record: Record = serde_json::from_str(r#"{"sog": "fast"}"#).unwrap();
        assert_eq!(record.sog, None);

        let record: Record = serde_json::from_str(r#"{"sog": null}"#).unwrap();
        assert_eq!(record.sog, None);

        let record: Record = serde_json::from_str("{}").unwrap();
        assert_eq!(record.sog, None);
    }

    #[test]
    fn test_optional_identifier_string() {
        let record: Record = serde_json::from_str(r#"{"mmsi": "219019621"}"#).unwrap();
        assert_eq!(record.mmsi, Some("219019621".to_string()));

        let record: Record = serde_json::from_str(r#"{"mmsi": 219019621}"#).unwrap();
        assert_eq!(record.mmsi, Some("219019621".to_string()));

        let record: Record = serde_json::from_str(r#"{"mmsi": null}"#).unwrap();
        assert_eq!(record.mmsi, None);
    }

    #[test]
    fn test_coerce_coordinate() {
        assert_eq!(
            coerce_coordinate(&serde_json::json!("10.5"), "latitude", 90.0).unwrap(),
            10.5
        );
        assert_eq!(
            coerce_coordinate(&serde_json::json!(" -77.06 "), "longitude", 180.0).unwrap(),
            -77.06
        );
        assert_eq!(
            coerce_coordinate(&serde_json::json!(20.1), "longitude", 180.0).unwrap(),
            20.1
        );

        assert!(matches!(
            coerce_coordinate(&serde_json::json!("north"), "latitude", 90.0),
            Err(crate::location::ParseError::InvalidCoordinate { .. })
        ));
        assert!(matches!(
            coerce_coordinate(&serde_json::Value::Null, "latitude", 90.0),
            Err(crate::location::ParseError::InvalidCoordinate { .. })
        ));
        assert!(matches!(
            coerce_coordinate(&serde_json::json!("NaN"), "latitude", 90.0),
            Err(crate::location::ParseError::InvalidCoordinate { .. })
        ));
        assert!(matches!(
            coerce_coordinate(&serde_json::json!(91.0), "latitude", 90.0),
            Err(crate::location::ParseError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_duration_string() {
        assert_eq!(duration_string(&chrono::Duration::seconds(5)), "5s");
        assert_eq!(duration_string(&chrono::Duration::seconds(125)), "2m 5s");
        assert_eq!(
            duration_string(&chrono::Duration::milliseconds(250)),
            "250ms"
        );
        assert_eq!(duration_string(&chrono::Duration::seconds(-60)), "1m ago");
    }
}
