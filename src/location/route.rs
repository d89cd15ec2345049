use geo::GeodesicDistance;

lazy_static::lazy_static! {
    pub static ref DEFAULT_PORTS: Vec<Port> = vec![
        Port::new("Port A", 33.7405, -118.2519),
        Port::new("Port B", 40.6728, -74.1536),
        Port::new("Port C", 29.7305, -95.0892),
        Port::new("Port D", 25.7785, -80.1826),
        Port::new("Port E", 32.0835, -81.0998),
        Port::new("Port F", 47.6019, -122.3381),
    ];
    pub static ref ANIMATION_STEP: chrono::Duration = chrono::Duration::seconds(2);
}

#[derive(serde::Deserialize, serde::Serialize, Clone, Debug, PartialEq)]
pub struct Port {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Port {
    pub fn new(name: &str, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.to_string(),
            latitude,
            longitude,
        }
    }

    pub fn location(&self) -> geo::Point {
        geo::point!(x: self.longitude, y: self.latitude)
    }
}

pub fn find_port<'a>(ports: &'a [Port], name: &str) -> Option<&'a Port> {
    ports.iter().find(|port| port.name == name)
}

#[derive(Clone, Debug, PartialEq)]
pub struct OptimizedRoute {
    pub ship_id: String,
    pub waypoints: Vec<geo::Point>,
}

impl OptimizedRoute {
    pub fn new(ship_id: String, waypoints: Vec<geo::Point>) -> Self {
        Self { ship_id, waypoints }
    }

    /// geodesic distance in meters of each leg between consecutive waypoints
    pub fn leg_distances(&self) -> Vec<f64> {
        self.waypoints
            .windows(2)
            .map(|leg| leg[0].geodesic_distance(&leg[1]))
            .collect()
    }

    pub fn length_m(&self) -> f64 {
        self.leg_distances().iter().sum()
    }
}

/// Moves a marker along a route one waypoint per step, then parks it on the final waypoint.
#[derive(Clone, Debug)]
pub struct RouteAnimation {
    waypoints: Vec<geo::Point>,
    started: chrono::DateTime<chrono::Local>,
    step: chrono::Duration,
}

impl RouteAnimation {
    pub fn new(
        route: &OptimizedRoute,
        started: chrono::DateTime<chrono::Local>,
        step: chrono::Duration,
    ) -> Self {
        Self {
            waypoints: route.waypoints.to_owned(),
            started,
            step,
        }
    }

    pub fn index_at(&self, time: chrono::DateTime<chrono::Local>) -> Option<usize> {
        if self.waypoints.is_empty() {
            return None;
        }
        let last = self.waypoints.len() - 1;

        let step = self.step.num_milliseconds();
        if step <= 0 {
            return Some(last);
        }

        let elapsed = (time - self.started).num_milliseconds().max(0);
        Some(((elapsed / step) as usize).min(last))
    }

    pub fn position_at(&self, time: chrono::DateTime<chrono::Local>) -> Option<geo::Point> {
        self.index_at(time)
            .and_then(|index| self.waypoints.get(index).copied())
    }

    pub fn finished_at(&self, time: chrono::DateTime<chrono::Local>) -> bool {
        match self.index_at(time) {
            Some(index) => index + 1 == self.waypoints.len(),
            None => true,
        }
    }
}
