fn default_name() -> String {
    String::from("unnamed_session")
}

fn default_base_url() -> String {
    String::from("http://127.0.0.1:8000")
}

fn default_ports() -> Vec<crate::location::route::Port> {
    crate::location::route::DEFAULT_PORTS.to_owned()
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct RunConfiguration {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub time: TimeConfiguration,
    #[serde(default)]
    pub traffic: TrafficConfiguration,
    #[cfg(feature = "routes")]
    pub route: Option<crate::connection::route::RouteQuery>,
    #[cfg(feature = "weather")]
    pub weather: Option<crate::connection::weather::WeatherQuery>,
    #[serde(default = "default_ports")]
    pub ports: Vec<crate::location::route::Port>,
    pub output: Option<PathConfiguration>,
    #[serde(default)]
    pub dark_mode: bool,
}

#[derive(serde::Deserialize, PartialEq, Debug, Clone)]
pub struct PathConfiguration {
    pub filename: std::path::PathBuf,
}

fn default_interval() -> chrono::Duration {
    *crate::DEFAULT_INTERVAL
}

#[serde_with::serde_as]
#[derive(PartialEq, Debug, serde::Deserialize, Clone)]
pub struct TimeConfiguration {
    #[serde(default = "default_interval")]
    #[serde_as(as = "serde_with::DurationSeconds<i64>")]
    pub interval: chrono::Duration,
}

impl Default for TimeConfiguration {
    fn default() -> Self {
        Self {
            interval: default_interval(),
        }
    }
}

impl TimeConfiguration {
    /// the poll interval, or `None` if it is not a positive duration
    pub fn poll_interval(&self) -> Option<std::time::Duration> {
        self.interval
            .to_std()
            .ok()
            .filter(|interval| !interval.is_zero())
    }
}

fn default_traffic_path() -> String {
    crate::connection::traffic::DEFAULT_PATH.to_owned()
}

/// where ship positions come from; the fleet endpoint unless a single vessel or a file is named
#[derive(serde::Deserialize, PartialEq, Debug, Clone)]
pub struct TrafficConfiguration {
    #[serde(default = "default_traffic_path")]
    pub path: String,
    #[serde(default)]
    #[serde(with = "crate::utilities::optional_identifier_string")]
    pub mmsi: Option<String>,
    pub file: Option<String>,
}

impl Default for TrafficConfiguration {
    fn default() -> Self {
        Self {
            path: default_traffic_path(),
            mmsi: None,
            file: None,
        }
    }
}

impl RunConfiguration {
    pub fn connection(
        &self,
    ) -> Result<crate::connection::Connection, crate::connection::ConnectionError> {
        if let Some(path) = &self.traffic.file {
            Ok(crate::connection::Connection::GeoJsonFile(
                crate::connection::file::GeoJsonFile::new(path.to_owned())?,
            ))
        } else if let Some(mmsi) = &self.traffic.mmsi {
            Ok(crate::connection::Connection::Ship(
                crate::connection::ship::ShipQuery::new(&self.base_url, mmsi)?,
            ))
        } else {
            Ok(crate::connection::Connection::ShipTraffic(
                crate::connection::traffic::ShipTrafficQuery::new(
                    &self.base_url,
                    &self.traffic.path,
                )?,
            ))
        }
    }

    /// the configured route request, pointed at the traffic backend unless it names its own
    #[cfg(feature = "routes")]
    pub fn route_query(&self) -> Option<crate::connection::route::RouteQuery> {
        self.route.as_ref().map(|route| {
            let mut query = route.to_owned();
            if query.base_url.is_none() {
                query.base_url = Some(self.base_url.to_owned());
            }
            query
        })
    }
}
