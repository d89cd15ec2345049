#[derive(Debug, PartialEq, Clone)]
pub struct ShipQuery {
    pub mmsi: String,
    pub url: url::Url,
}

impl ShipQuery {
    pub fn new(base_url: &str, mmsi: &str) -> Result<Self, super::ConnectionError> {
        if mmsi.trim().is_empty() {
            return Err(super::ConnectionError::FailedToEstablish {
                connection: base_url.to_string(),
                message: "single-ship tracking requires an MMSI".to_string(),
            });
        }

        let mmsi = mmsi.trim().to_string();
        let mut url = super::join_url(base_url, "/ship")?;
        url.path_segments_mut()
            .map_err(|_| super::ConnectionError::FailedToEstablish {
                connection: base_url.to_string(),
                message: "base URL cannot hold a path".to_string(),
            })?
            .push(&mmsi);

        Ok(Self { mmsi, url })
    }

    pub fn retrieve_ship(&self) -> Result<crate::location::ShipRecord, super::ConnectionError> {
        let client = super::http_client()?;

        let url = self.url.to_string();
        let response = super::send(client.get(self.url.to_owned()), &url)?;

        match response.status() {
            status if status.is_success() => {
                let body = super::read_body(response, &url)?;
                super::parse_body(&body, &url)
            }
            status => {
                // the backend explains lookup failures in a `detail` field
                let body = super::read_body(response, &url).unwrap_or_default();
                match serde_json::from_str::<ShipErrorResponse>(&body) {
                    Ok(error) => Err(super::ConnectionError::ApiError {
                        message: format!("{:} ({:})", error.detail, status.as_u16()),
                        url,
                    }),
                    Err(_) => Err(super::ConnectionError::HttpStatus {
                        status: status.as_u16(),
                        url,
                    }),
                }
            }
        }
    }
}

#[derive(serde::Deserialize)]
struct ShipErrorResponse {
    detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::testing;
    use crate::connection::ConnectionError;

    #[test]
    fn test_url() {
        let connection = ShipQuery::new("http://127.0.0.1:8000", "219019621").unwrap();

        assert_eq!(
            connection.url.as_str(),
            "http://127.0.0.1:8000/ship/219019621"
        );
    }

    #[test]
    fn test_url_escapes_mmsi() {
        let connection = ShipQuery::new("http://127.0.0.1:8000/api/", "21/9?x#y").unwrap();

        assert_eq!(
            connection.url.as_str(),
            "http://127.0.0.1:8000/api/ship/21%2F9%3Fx%23y"
        );
        assert_eq!(connection.url.query(), None);
        assert_eq!(connection.url.fragment(), None);
    }

    #[test]
    fn test_missing_mmsi() {
        assert!(matches!(
            ShipQuery::new("http://127.0.0.1:8000", " "),
            Err(ConnectionError::FailedToEstablish { .. })
        ));
    }

    #[test]
    fn test_retrieve() {
        let (base_url, server) = testing::serve(
            200,
            r#"
            {
              "MMSI": 219019621,
              "latitude": 55.6098,
              "longitude": 12.6504,
              "sog": 0.0,
              "cog": 0.0,
              "status": "Moored"
            }
            "#,
        );

        let connection = ShipQuery::new(&base_url, "219019621").unwrap();
        let ship = connection.retrieve_ship().unwrap();
        let position = ship.to_ship_position().unwrap();

        assert_eq!(position.mmsi_label(), "219019621");
        assert_eq!(position.latitude(), 55.6098);
        assert_eq!(position.status_label(), "Moored");

        let request = server.join().unwrap();
        assert!(request.starts_with("GET /ship/219019621 HTTP/1.1"));
    }

    #[test]
    fn test_retrieve_not_found() {
        let (base_url, server) = testing::serve(404, r#"{"detail": "Ship not found"}"#);

        let connection = ShipQuery::new(&base_url, "1").unwrap();

        match connection.retrieve_ship() {
            Err(ConnectionError::ApiError { message, .. }) => {
                assert_eq!(message, "Ship not found (404)");
            }
            other => panic!("{:?}", other),
        }
        server.join().unwrap();
    }

    #[test]
    fn test_retrieve_server_error() {
        let (base_url, server) = testing::serve(502, "bad gateway");

        let connection = ShipQuery::new(&base_url, "1").unwrap();

        assert!(matches!(
            connection.retrieve_ship(),
            Err(ConnectionError::HttpStatus { status: 502, .. })
        ));
        server.join().unwrap();
    }
}
