pub mod file;
#[cfg(feature = "routes")]
pub mod route;
pub mod ship;
pub mod traffic;
#[cfg(feature = "weather")]
pub mod weather;

lazy_static::lazy_static! {
    pub static ref USER_AGENT: String = format!("shiptraffic/{:}", env!("CARGO_PKG_VERSION"));
    static ref REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);
}

#[derive(Debug)]
pub enum Connection {
    ShipTraffic(traffic::ShipTrafficQuery),
    Ship(ship::ShipQuery),
    GeoJsonFile(file::GeoJsonFile),
}

impl crate::poll::ShipSource for Connection {
    fn retrieve_ships(&mut self) -> Result<Vec<crate::location::ShipRecord>, ConnectionError> {
        match self {
            Self::ShipTraffic(connection) => connection.retrieve_ships(),
            Self::Ship(connection) => connection.retrieve_ship().map(|ship| vec![ship]),
            Self::GeoJsonFile(connection) => connection.read_ships_from_geojson(),
        }
    }
}

impl std::fmt::Display for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ShipTraffic(connection) => write!(f, "ship traffic at {:}", connection.url),
            Self::Ship(connection) => {
                write!(f, "ship {:} at {:}", connection.mmsi, connection.url)
            }
            Self::GeoJsonFile(connection) => write!(f, "GeoJSON file {:}", connection.path),
        }
    }
}

custom_error::custom_error! {#[derive(Clone, PartialEq)] pub ConnectionError
    Network { url: String, message: String } = "could not reach {url}; {message}",
    HttpStatus { status: u16, url: String } = "HTTP error {status} - {url}",
    MalformedPayload { url: String, message: String } = "unexpected response from {url}; {message}",
    ApiError { url: String, message: String } = "{message} - {url}",
    FailedToEstablish { connection: String, message: String } = "failed to establish connection to {connection}; {message}",
}

/// append `path` to `base_url` the way a string concatenation would, keeping any base path
pub fn join_url(base_url: &str, path: &str) -> Result<url::Url, ConnectionError> {
    let joined = format!(
        "{:}/{:}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    url::Url::parse(&joined).map_err(|error| ConnectionError::FailedToEstablish {
        connection: joined.to_owned(),
        message: error.to_string(),
    })
}

fn http_client() -> Result<reqwest::blocking::Client, ConnectionError> {
    reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT.to_owned())
        .timeout(Some(*REQUEST_TIMEOUT))
        .build()
        .map_err(|error| ConnectionError::FailedToEstablish {
            connection: "HTTP client".to_string(),
            message: error.to_string(),
        })
}

// reqwest errors carry the full request URL, query parameters included
fn send(
    request: reqwest::blocking::RequestBuilder,
    url: &str,
) -> Result<reqwest::blocking::Response, ConnectionError> {
    request.send().map_err(|error| ConnectionError::Network {
        url: url.to_string(),
        message: error.without_url().to_string(),
    })
}

fn read_body(response: reqwest::blocking::Response, url: &str) -> Result<String, ConnectionError> {
    response.text().map_err(|error| ConnectionError::Network {
        url: url.to_string(),
        message: error.without_url().to_string(),
    })
}

fn parse_body<T: serde::de::DeserializeOwned>(body: &str, url: &str) -> Result<T, ConnectionError> {
    serde_json::from_str(body).map_err(|error| ConnectionError::MalformedPayload {
        url: url.to_string(),
        message: error.to_string(),
    })
}

/// send a request and deserialize a successful JSON response
fn request_json<T: serde::de::DeserializeOwned>(
    request: reqwest::blocking::RequestBuilder,
    url: &str,
) -> Result<T, ConnectionError> {
    let response = send(request, url)?;

    match response.status() {
        status if status.is_success() => {
            let body = read_body(response, url)?;
            parse_body(&body, url)
        }
        status => Err(ConnectionError::HttpStatus {
            status: status.as_u16(),
            url: url.to_string(),
        }),
    }
}
