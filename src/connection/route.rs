lazy_static::lazy_static! {
    pub static ref ROUTE_PATH: String = String::from("/get_optimized_route/");
}

#[derive(serde::Deserialize, serde::Serialize, Debug, PartialEq, Clone)]
pub struct RouteQuery {
    pub base_url: Option<String>,
    pub ship_id: String,
    pub start: String,
    pub end: String,
}

impl RouteQuery {
    #[cfg(test)]
    pub fn new(base_url: Option<String>, ship_id: &str, start: &str, end: &str) -> Self {
        Self {
            base_url,
            ship_id: ship_id.to_string(),
            start: start.to_string(),
            end: end.to_string(),
        }
    }

    fn url(&self) -> Result<url::Url, super::ConnectionError> {
        match &self.base_url {
            Some(base_url) => super::join_url(base_url, &ROUTE_PATH),
            None => Err(super::ConnectionError::FailedToEstablish {
                connection: "route optimization".to_string(),
                message: "no base URL configured".to_string(),
            }),
        }
    }

    fn validate(&self, ports: &[crate::location::route::Port]) -> Result<(), super::ConnectionError> {
        if self.ship_id.trim().is_empty() {
            return Err(super::ConnectionError::FailedToEstablish {
                connection: "route optimization".to_string(),
                message: "a ship ID is required".to_string(),
            });
        }

        for port in [&self.start, &self.end] {
            if crate::location::route::find_port(ports, port).is_none() {
                return Err(super::ConnectionError::FailedToEstablish {
                    connection: "route optimization".to_string(),
                    message: format!("unknown port \"{:}\"", port),
                });
            }
        }

        Ok(())
    }

    pub fn retrieve_route(
        &self,
        ports: &[crate::location::route::Port],
    ) -> Result<crate::location::route::OptimizedRoute, super::ConnectionError> {
        self.validate(ports)?;
        let url = self.url()?;
        let client = super::http_client()?;

        let request = RouteRequest {
            ship_id: &self.ship_id,
            start: &self.start,
            end: &self.end,
        };
        let url_string = url.to_string();
        let response: RouteResponse =
            super::request_json(client.post(url).json(&request), &url_string)?;

        match response {
            RouteResponse::Route {
                ship_id,
                optimized_route,
            } => {
                let mut waypoints = vec![];
                for waypoint in optimized_route {
                    let latitude = crate::utilities::coerce_coordinate(
                        &serde_json::json!(waypoint[0]),
                        "latitude",
                        90.0,
                    );
                    let longitude = crate::utilities::coerce_coordinate(
                        &serde_json::json!(waypoint[1]),
                        "longitude",
                        180.0,
                    );
                    match (latitude, longitude) {
                        (Ok(latitude), Ok(longitude)) => {
                            waypoints.push(geo::point!(x: longitude, y: latitude))
                        }
                        (Err(error), _) | (_, Err(error)) => {
                            return Err(super::ConnectionError::MalformedPayload {
                                url: url_string,
                                message: format!("invalid waypoint; {:}", error),
                            })
                        }
                    }
                }

                Ok(crate::location::route::OptimizedRoute::new(
                    ship_id.unwrap_or_else(|| self.ship_id.to_owned()),
                    waypoints,
                ))
            }
            RouteResponse::Error { error } => Err(super::ConnectionError::ApiError {
                message: error,
                url: url_string,
            }),
        }
    }
}

#[derive(serde::Serialize)]
struct RouteRequest<'a> {
    ship_id: &'a str,
    start: &'a str,
    end: &'a str,
}

// waypoints are `[latitude, longitude]` pairs
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum RouteResponse {
    Route {
        ship_id: Option<String>,
        optimized_route: Vec<[f64; 2]>,
    },
    Error {
        error: String,
    },
}
