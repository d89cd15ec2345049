lazy_static::lazy_static! {
    pub static ref DEFAULT_PATH: String = String::from("/ship-traffic");
}

#[derive(Debug, PartialEq, Clone)]
pub struct ShipTrafficQuery {
    pub url: url::Url,
}

impl ShipTrafficQuery {
    pub fn new(base_url: &str, path: &str) -> Result<Self, super::ConnectionError> {
        Ok(Self {
            url: super::join_url(base_url, path)?,
        })
    }

    pub fn retrieve_ships(
        &self,
    ) -> Result<Vec<crate::location::ShipRecord>, super::ConnectionError> {
        let client = super::http_client()?;

        let url = self.url.to_string();
        let response: ShipTrafficResponse =
            super::request_json(client.get(self.url.to_owned()), &url)?;

        Ok(response.ships)
    }
}

// a missing `ships` field, or one that is not a list of objects, fails deserialization
#[derive(serde::Deserialize)]
struct ShipTrafficResponse {
    ships: Vec<crate::location::ShipRecord>,
}
