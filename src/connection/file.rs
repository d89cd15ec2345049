#[derive(serde::Deserialize, Debug, PartialEq, Clone)]
pub struct GeoJsonFile {
    pub path: String,
}

impl GeoJsonFile {
    pub fn new(path: String) -> Result<Self, crate::connection::ConnectionError> {
        if std::path::Path::new(&path).exists() {
            Ok(Self { path })
        } else {
            Err(crate::connection::ConnectionError::FailedToEstablish {
                connection: path,
                message: "path does not exist".to_string(),
            })
        }
    }

    pub fn read_ships_from_geojson(
        &self,
    ) -> Result<Vec<crate::location::ShipRecord>, crate::connection::ConnectionError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|error| {
            crate::connection::ConnectionError::FailedToEstablish {
                connection: self.path.to_owned(),
                message: error.to_string(),
            }
        })?;

        let parsed = contents.parse::<geojson::GeoJson>().map_err(|error| {
            crate::connection::ConnectionError::MalformedPayload {
                url: self.path.to_owned(),
                message: error.to_string(),
            }
        })?;

        let collection = match parsed {
            geojson::GeoJson::FeatureCollection(collection) => collection,
            _ => {
                return Err(crate::connection::ConnectionError::MalformedPayload {
                    url: self.path.to_owned(),
                    message: "expected a feature collection".to_string(),
                })
            }
        };

        let mut ships = vec![];
        for feature in collection.features {
            let point = match feature.geometry.map(|geometry| geometry.value) {
                Some(geojson::Value::Point(point)) if point.len() >= 2 => point,
                _ => continue,
            };

            // the remaining ship fields share their names with the traffic API
            let mut properties = feature.properties.unwrap_or_default();
            properties.insert("longitude".to_string(), serde_json::json!(point[0]));
            properties.insert("latitude".to_string(), serde_json::json!(point[1]));

            let ship: crate::location::ShipRecord =
                serde_json::from_value(serde_json::Value::Object(properties)).map_err(
                    |error| crate::connection::ConnectionError::MalformedPayload {
                        url: self.path.to_owned(),
                        message: error.to_string(),
                    },
                )?;
            ships.push(ship);
        }

        Ok(ships)
    }
}

pub fn ships_geojson_featurecollection(
    ships: &[crate::location::ShipPosition],
) -> geojson::FeatureCollection {
    let mut features = vec![];

    for ship in ships {
        let mut properties = geojson::JsonObject::new();
        if let Some(mmsi) = &ship.mmsi {
            properties.insert("mmsi".to_string(), serde_json::json!(mmsi));
        }
        if let Some(name) = &ship.name {
            properties.insert("name".to_string(), serde_json::json!(name));
        }
        if let Some(speed) = ship.speed {
            properties.insert("sog".to_string(), serde_json::json!(speed));
        }
        if let Some(course) = ship.course {
            properties.insert("cog".to_string(), serde_json::json!(course));
        }
        if let Some(status) = &ship.status {
            properties.insert("navigationalstatus".to_string(), serde_json::json!(status));
        }

        features.push(geojson::Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::Point(vec![
                ship.longitude(),
                ship.latitude(),
            ]))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        });
    }

    geojson::FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}
