pub mod route;

/// A vessel entry exactly as the traffic API sent it.
///
/// Coordinates are kept as raw JSON so that a record with an unusable position stays in the
/// collection and is only left out when positions are derived for the map.
#[derive(serde::Deserialize, serde::Serialize, Clone, Debug, Default, PartialEq)]
pub struct ShipRecord {
    #[serde(default)]
    #[serde(alias = "MMSI")]
    #[serde(with = "crate::utilities::optional_identifier_string")]
    pub mmsi: Option<String>,
    #[serde(default)]
    pub latitude: serde_json::Value,
    #[serde(default)]
    pub longitude: serde_json::Value,
    #[serde(default)]
    #[serde(with = "crate::utilities::optional_identifier_string")]
    pub name: Option<String>,
    #[serde(default)]
    #[serde(with = "crate::utilities::optional_f64_string")]
    pub sog: Option<f64>,
    #[serde(default)]
    #[serde(with = "crate::utilities::optional_f64_string")]
    pub cog: Option<f64>,
    #[serde(default)]
    #[serde(alias = "status")]
    #[serde(with = "crate::utilities::optional_identifier_string")]
    pub navigationalstatus: Option<String>,
}

impl ShipRecord {
    #[cfg(test)]
    pub fn new(mmsi: &str, latitude: serde_json::Value, longitude: serde_json::Value) -> Self {
        Self {
            mmsi: Some(mmsi.to_string()),
            latitude,
            longitude,
            ..Default::default()
        }
    }

    pub fn to_ship_position(&self) -> Result<ShipPosition, ParseError> {
        let latitude = crate::utilities::coerce_coordinate(&self.latitude, "latitude", 90.0)?;
        let longitude = crate::utilities::coerce_coordinate(&self.longitude, "longitude", 180.0)?;

        Ok(ShipPosition {
            mmsi: self.mmsi.to_owned(),
            location: geo::point!(x: longitude, y: latitude),
            name: self.name.to_owned(),
            speed: self.sog,
            course: self.cog,
            status: self.navigationalstatus.to_owned(),
        })
    }

    pub fn label(&self) -> String {
        self.mmsi.to_owned().unwrap_or_else(|| UNKNOWN.to_string())
    }
}

pub const UNKNOWN: &str = "unknown";

/// A vessel with a usable position, i.e. one map marker.
#[derive(Clone, Debug, PartialEq)]
pub struct ShipPosition {
    pub mmsi: Option<String>,
    pub location: geo::Point,
    pub name: Option<String>,
    pub speed: Option<f64>,
    pub course: Option<f64>,
    pub status: Option<String>,
}

impl ShipPosition {
    pub fn latitude(&self) -> f64 {
        self.location.y()
    }

    pub fn longitude(&self) -> f64 {
        self.location.x()
    }

    pub fn mmsi_label(&self) -> String {
        self.mmsi.to_owned().unwrap_or_else(|| UNKNOWN.to_string())
    }

    pub fn name_label(&self) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.to_owned(),
            _ => "Unknown Ship".to_string(),
        }
    }

    pub fn speed_label(&self) -> String {
        match self.speed {
            Some(speed) => format!("{:.1}", speed),
            None => "N/A".to_string(),
        }
    }

    pub fn course_label(&self) -> String {
        match self.course {
            Some(course) => format!("{:.1}", course),
            None => "N/A".to_string(),
        }
    }

    pub fn status_label(&self) -> String {
        match &self.status {
            Some(status) if !status.is_empty() => status.to_owned(),
            _ => "Unknown".to_string(),
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{:} ({:}) at ({:.4}, {:.4}) - speed: {:} kn - course: {:}° - status: {:}",
            self.name_label(),
            self.mmsi_label(),
            self.latitude(),
            self.longitude(),
            self.speed_label(),
            self.course_label(),
            self.status_label(),
        )
    }
}

custom_error::custom_error! {#[derive(Clone, PartialEq)] pub ParseError
    InvalidCoordinate { field: String, value: String } = "{field} is not a number: {value}",
    OutOfRange { field: String, value: f64 } = "{field} is out of range: {value}",
}
