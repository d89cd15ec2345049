fn default_api_url() -> String {
    String::from("https://api.openweathermap.org/data/2.5/weather")
}

#[derive(serde::Deserialize, Debug, PartialEq, Clone)]
pub struct WeatherQuery {
    pub api_key: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

impl WeatherQuery {
    #[cfg(test)]
    pub fn new(api_key: String, api_url: Option<String>) -> Self {
        Self {
            api_key,
            api_url: api_url.unwrap_or_else(default_api_url),
        }
    }

    fn parameters(&self, location: &geo::Point) -> Vec<(&str, String)> {
        vec![
            ("lat", format!("{:.4}", location.y())),
            ("lon", format!("{:.4}", location.x())),
            ("appid", self.api_key.to_owned()),
            ("units", "metric".to_string()),
        ]
    }

    /// current conditions at the given point, in metric units
    pub fn current(&self, location: &geo::Point) -> Result<WeatherReport, super::ConnectionError> {
        let client = super::http_client()?;

        // the API key travels in the query string; errors name only the endpoint
        let response: OpenWeatherResponse = super::request_json(
            client
                .get(&self.api_url)
                .query(&self.parameters(location)),
            &self.api_url,
        )?;

        Ok(response.to_weather_report(*location))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct WeatherReport {
    pub location: geo::Point,
    pub temperature: f64,
    pub wind_speed: f64,
    pub pressure: f64,
    pub description: Option<String>,
}

impl std::fmt::Display for WeatherReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "temperature: {:.1} °C - wind speed: {:.1} m/s - pressure: {:.0} hPa - condition: {:}",
            self.temperature,
            self.wind_speed,
            self.pressure,
            self.description.as_deref().unwrap_or(crate::location::UNKNOWN),
        )
    }
}

// https://openweathermap.org/current#fields_json
#[derive(serde::Deserialize)]
struct OpenWeatherResponse {
    main: OpenWeatherMain,
    wind: OpenWeatherWind,
    #[serde(default)]
    weather: Vec<OpenWeatherCondition>,
}

#[derive(serde::Deserialize)]
struct OpenWeatherMain {
    temp: f64,
    pressure: f64,
}

#[derive(serde::Deserialize)]
struct OpenWeatherWind {
    speed: f64,
}

#[derive(serde::Deserialize)]
struct OpenWeatherCondition {
    description: String,
}

impl OpenWeatherResponse {
    fn to_weather_report(&self, location: geo::Point) -> WeatherReport {
        WeatherReport {
            location,
            temperature: self.main.temp,
            wind_speed: self.wind.speed,
            pressure: self.main.pressure,
            description: self
                .weather
                .first()
                .map(|condition| condition.description.to_owned()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::testing;
    use crate::connection::ConnectionError;

    #[test]
    #[ignore]
    fn test_api() {
        if let Ok(api_key) = std::env::var("OPENWEATHERMAP_API_KEY") {
            let query = WeatherQuery::new(api_key, None);
            let report = query.current(&geo::point!(x: 80.0, y: 20.0)).unwrap();

            assert!(report.pressure > 0.0);
        } else {
            panic!("OpenWeatherMap credentials not set in environment variable");
        }
    }

    #[test]
    fn test_response() {
        let data = r#"
        {
          "coord": {"lon": 80.0, "lat": 20.0},
          "weather": [{"id": 800, "main": "Clear", "description": "clear sky", "icon": "01d"}],
          "main": {"temp": 29.4, "feels_like": 31.2, "pressure": 1009, "humidity": 58},
          "wind": {"speed": 3.6, "deg": 240},
          "name": ""
        }
        "#;
        let response: OpenWeatherResponse = serde_json::from_str(data).unwrap();
        let report = response.to_weather_report(geo::point!(x: 80.0, y: 20.0));

        assert_eq!(report.temperature, 29.4);
        assert_eq!(report.pressure, 1009.0);
        assert_eq!(report.description, Some("clear sky".to_string()));
        assert_eq!(
            report.to_string(),
            "temperature: 29.4 °C - wind speed: 3.6 m/s - pressure: 1009 hPa - condition: clear sky"
        );
    }

    #[test]
    fn test_retrieve() {
        let (base_url, server) = testing::serve(
            200,
            r#"{"weather": [], "main": {"temp": -2.5, "pressure": 1021}, "wind": {"speed": 11.0}}"#,
        );

        let query = WeatherQuery::new("abcdef".to_string(), Some(format!("{:}/weather", base_url)));
        let report = query.current(&geo::point!(x: -74.1536, y: 40.6728)).unwrap();

        assert_eq!(report.wind_speed, 11.0);
        assert_eq!(report.description, None);

        let request = server.join().unwrap();
        assert!(request.starts_with("GET /weather?lat=40.6728&lon=-74.1536&appid=abcdef&units=metric HTTP/1.1"));
    }

    #[test]
    fn test_unreachable_hides_api_key() {
        let api_url = format!("{:}/weather", testing::unreachable());
        let query = WeatherQuery::new("SECRETKEY123".to_string(), Some(api_url.to_owned()));

        let error = query.current(&geo::point!(x: 0.0, y: 0.0)).unwrap_err();

        assert!(matches!(error, ConnectionError::Network { ref url, .. } if *url == api_url));
        assert!(!error.to_string().contains("SECRETKEY123"));
        assert!(!error.to_string().contains("appid"));
    }

    #[test]
    fn test_retrieve_unauthorized() {
        let (base_url, server) = testing::serve(401, r#"{"cod": 401, "message": "Invalid API key"}"#);

        let query = WeatherQuery::new("wrong".to_string(), Some(format!("{:}/weather", base_url)));

        match query.current(&geo::point!(x: 0.0, y: 0.0)) {
            Err(ConnectionError::HttpStatus { status, url }) => {
                assert_eq!(status, 401);
                assert!(!url.contains("wrong"));
            }
            other => panic!("{:?}", other),
        }
        server.join().unwrap();
    }
}
