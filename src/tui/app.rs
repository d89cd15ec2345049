use std::sync::mpsc;

lazy_static::lazy_static! {
    pub static ref TABS: Vec<String> = vec!["Log".to_string(), "Ships".to_string(), "Map".to_string()];
}

pub const LOG_TAB: usize = 0;
pub const SHIPS_TAB: usize = 1;
pub const MAP_TAB: usize = 2;

/// run a blocking request off the interface thread and hand back a receiver for its result
fn spawn_request<T: Send + 'static>(
    name: &str,
    request: impl FnOnce() -> T + Send + 'static,
) -> Option<mpsc::Receiver<T>> {
    let (sender, receiver) = mpsc::channel();
    std::thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            let _ = sender.send(request());
        })
        .ok()
        .map(|_| receiver)
}

pub struct ShipTrafficApp {
    pub configuration: crate::configuration::RunConfiguration,
    poller: Option<crate::poll::TrafficPoller>,
    pub traffic: crate::poll::TrafficState,
    pub positions: Vec<crate::location::ShipPosition>,
    #[cfg(feature = "routes")]
    pub route: Option<crate::location::route::OptimizedRoute>,
    #[cfg(feature = "routes")]
    pub route_animation: Option<crate::location::route::RouteAnimation>,
    #[cfg(feature = "routes")]
    pending_route: Option<
        mpsc::Receiver<
            Result<crate::location::route::OptimizedRoute, crate::connection::ConnectionError>,
        >,
    >,
    #[cfg(feature = "weather")]
    pub weather: Option<crate::connection::weather::WeatherReport>,
    #[cfg(feature = "weather")]
    pending_weather: Option<
        mpsc::Receiver<
            Result<crate::connection::weather::WeatherReport, crate::connection::ConnectionError>,
        >,
    >,
    pub tab_index: usize,
    pub selected_ship: usize,
    pub dark_mode: bool,
    pub log_messages: Vec<crate::poll::LogMessage>,
    pub log_messages_scroll_offset: u16,
    pub log_level: log::Level,
    pub should_quit: bool,
    last_written: Option<chrono::DateTime<chrono::Local>>,
}

impl ShipTrafficApp {
    pub fn new(
        configuration: crate::configuration::RunConfiguration,
        log_level: log::Level,
    ) -> ShipTrafficApp {
        let program_start_time = chrono::Local::now();

        let mut app = ShipTrafficApp {
            dark_mode: configuration.dark_mode,
            configuration,
            poller: None,
            traffic: crate::poll::TrafficState::new(),
            positions: vec![],
            #[cfg(feature = "routes")]
            route: None,
            #[cfg(feature = "routes")]
            route_animation: None,
            #[cfg(feature = "routes")]
            pending_route: None,
            #[cfg(feature = "weather")]
            weather: None,
            #[cfg(feature = "weather")]
            pending_weather: None,
            tab_index: LOG_TAB,
            selected_ship: 0,
            log_messages: vec![],
            log_messages_scroll_offset: 0,
            log_level,
            should_quit: false,
            last_written: None,
        };

        let session_name = app.configuration.name.to_owned();
        if let Some(output) = &mut app.configuration.output {
            if output.filename.is_dir() {
                output.filename.push(format!(
                    "{:}_{:}.geojson",
                    session_name,
                    program_start_time.format("%Y%m%dT%H%M%S")
                ));
            }
            let message = format!(
                "writing ship positions to {:}",
                output.filename.to_string_lossy()
            );
            app.add_log_message(message, log::Level::Info);
        }

        let interval = match app.configuration.time.poll_interval() {
            Some(interval) => interval,
            None => {
                app.add_log_message(
                    format!(
                        "invalid poll interval {:}; using {:}",
                        crate::utilities::duration_string(&app.configuration.time.interval),
                        crate::utilities::duration_string(&crate::DEFAULT_INTERVAL),
                    ),
                    log::Level::Warn,
                );
                crate::DEFAULT_INTERVAL
                    .to_std()
                    .unwrap_or(std::time::Duration::from_secs(5))
            }
        };

        match app.configuration.connection() {
            Ok(connection) => {
                let description = connection.to_string();
                match crate::poll::TrafficPoller::start(connection, interval) {
                    Ok(poller) => {
                        app.add_log_message(
                            format!(
                                "polling {:} every {:}",
                                description,
                                crate::utilities::duration_string(
                                    &chrono::Duration::from_std(interval)
                                        .unwrap_or(*crate::DEFAULT_INTERVAL)
                                ),
                            ),
                            log::Level::Info,
                        );
                        app.poller = Some(poller);
                    }
                    Err(error) => app.add_log_message(
                        format!("could not start polling {:}; {:}", description, error),
                        log::Level::Error,
                    ),
                }
            }
            Err(error) => {
                app.add_log_message(error.to_string(), log::Level::Error);
                app.add_log_message("no connection started".to_string(), log::Level::Error);
            }
        }

        #[cfg(feature = "routes")]
        app.request_route();

        app
    }

    pub fn add_log_message(&mut self, message: String, level: log::Level) {
        if level <= self.log_level {
            self.log_messages
                .push((chrono::Local::now(), message, level));
        }
    }

    fn add_log_messages(&mut self, messages: Vec<crate::poll::LogMessage>) {
        let log_level = self.log_level;
        self.log_messages.extend(
            messages
                .into_iter()
                .filter(|(_, _, level)| *level <= log_level),
        );
    }

    pub fn is_polling(&self) -> bool {
        self.poller
            .as_ref()
            .map(|poller| poller.is_running())
            .unwrap_or(false)
    }

    pub fn poll_interval(&self) -> Option<std::time::Duration> {
        self.poller.as_ref().map(|poller| poller.interval())
    }

    pub fn selected_position(&self) -> Option<&crate::location::ShipPosition> {
        self.positions.get(self.selected_ship)
    }

    pub fn next_tab(&mut self) {
        self.tab_index = (self.tab_index + 1) % TABS.len();
    }

    pub fn previous_tab(&mut self) {
        if self.tab_index > 0 {
            self.tab_index -= 1;
        } else {
            self.tab_index = TABS.len() - 1;
        }
    }

    pub fn up(&mut self) {
        if self.tab_index == LOG_TAB {
            if self.log_messages_scroll_offset > 0 {
                self.log_messages_scroll_offset -= 1;
            }
        } else if self.selected_ship > 0 {
            self.selected_ship -= 1;
        } else {
            self.selected_ship = self.positions.len().saturating_sub(1);
        }
    }

    pub fn down(&mut self) {
        if self.tab_index == LOG_TAB {
            let last_line = u16::try_from(self.log_messages.len()).unwrap_or(u16::MAX);
            if self.log_messages_scroll_offset < last_line {
                self.log_messages_scroll_offset += 1;
            }
        } else if self.selected_ship + 1 < self.positions.len() {
            self.selected_ship += 1;
        } else {
            self.selected_ship = 0;
        }
    }

    pub fn toggle_dark_mode(&mut self) {
        self.dark_mode = !self.dark_mode;
    }

    pub fn on_key(&mut self, key: crossterm::event::KeyCode) {
        match key {
            crossterm::event::KeyCode::Esc => {
                self.should_quit = true;
            }
            crossterm::event::KeyCode::Char(character) => match character {
                'q' => {
                    self.should_quit = true;
                }
                'r' | ' ' => self.on_tick(),
                'd' => self.toggle_dark_mode(),
                #[cfg(feature = "routes")]
                'o' => self.request_route(),
                #[cfg(feature = "weather")]
                'w' => self.request_weather(),
                _ => {}
            },
            crossterm::event::KeyCode::BackTab => self.previous_tab(),
            crossterm::event::KeyCode::Tab => self.next_tab(),
            crossterm::event::KeyCode::Left => self.previous_tab(),
            crossterm::event::KeyCode::Right => self.next_tab(),
            crossterm::event::KeyCode::Up => self.up(),
            crossterm::event::KeyCode::Down => self.down(),
            _ => {}
        }
    }

    /// Pull the latest poll results and finished requests into the view.
    pub fn on_tick(&mut self) {
        if let Some(poller) = &self.poller {
            let messages = poller.drain_messages();
            self.traffic = poller.snapshot();
            self.add_log_messages(messages);
        }

        self.positions = self.traffic.positions();
        if self.selected_ship >= self.positions.len() {
            self.selected_ship = self.positions.len().saturating_sub(1);
        }

        if self.traffic.last_update.is_some() && self.traffic.last_update != self.last_written {
            self.write_output();
            self.last_written = self.traffic.last_update;
        }

        #[cfg(feature = "routes")]
        self.receive_route();
        #[cfg(feature = "routes")]
        self.finish_route_animation();
        #[cfg(feature = "weather")]
        self.receive_weather();
    }

    /// drop the route marker once it has reached the last waypoint
    #[cfg(feature = "routes")]
    fn finish_route_animation(&mut self) {
        let finished = self
            .route_animation
            .as_ref()
            .map(|animation| animation.finished_at(chrono::Local::now()))
            .unwrap_or(false);

        if finished {
            self.route_animation = None;
            if let Some(route) = &self.route {
                let message = format!("ship {:} reached the end of its route", route.ship_id);
                self.add_log_message(message, log::Level::Debug);
            }
        }
    }

    fn write_output(&mut self) {
        if let Some(output) = &self.configuration.output {
            let path = output.filename.to_owned();
            let feature_collection =
                crate::connection::file::ships_geojson_featurecollection(&self.positions);

            match std::fs::write(&path, feature_collection.to_string()) {
                Ok(_) => self.add_log_message(
                    format!(
                        "wrote {:} ship positions to {:}",
                        self.positions.len(),
                        path.to_string_lossy()
                    ),
                    log::Level::Debug,
                ),
                Err(error) => self.add_log_message(
                    format!("could not write {:}; {:}", path.to_string_lossy(), error),
                    log::Level::Error,
                ),
            }
        }
    }

    #[cfg(feature = "routes")]
    pub fn request_route(&mut self) {
        if self.pending_route.is_some() {
            return;
        }

        if let Some(query) = self.configuration.route_query() {
            self.add_log_message(
                format!(
                    "requesting route for ship {:} from {:} to {:}",
                    query.ship_id, query.start, query.end
                ),
                log::Level::Info,
            );

            let ports = self.configuration.ports.to_owned();
            self.pending_route =
                spawn_request("route-request", move || query.retrieve_route(&ports));
        }
    }

    #[cfg(feature = "routes")]
    fn receive_route(&mut self) {
        let result = match &self.pending_route {
            Some(receiver) => match receiver.try_recv() {
                Ok(result) => result,
                Err(mpsc::TryRecvError::Empty) => return,
                Err(mpsc::TryRecvError::Disconnected) => Err(
                    crate::connection::ConnectionError::FailedToEstablish {
                        connection: "route optimization".to_string(),
                        message: "request ended without a response".to_string(),
                    },
                ),
            },
            None => return,
        };
        self.pending_route = None;

        match result {
            Ok(route) => {
                self.add_log_message(
                    format!(
                        "received route for ship {:}: {:} waypoints over {:.1} km",
                        route.ship_id,
                        route.waypoints.len(),
                        route.length_m() / 1000.0
                    ),
                    log::Level::Info,
                );
                if route.waypoints.is_empty() {
                    self.add_log_message("no route found".to_string(), log::Level::Warn);
                    self.route = None;
                    self.route_animation = None;
                } else {
                    self.route_animation = Some(crate::location::route::RouteAnimation::new(
                        &route,
                        chrono::Local::now(),
                        *crate::location::route::ANIMATION_STEP,
                    ));
                    self.route = Some(route);
                }
            }
            Err(error) => self.add_log_message(error.to_string(), log::Level::Error),
        }
    }

    #[cfg(feature = "weather")]
    pub fn request_weather(&mut self) {
        if self.pending_weather.is_some() {
            return;
        }

        let query = match &self.configuration.weather {
            Some(query) => query.to_owned(),
            None => {
                self.add_log_message(
                    "weather lookup requires an API key".to_string(),
                    log::Level::Warn,
                );
                return;
            }
        };

        let (location, summary) = match self.selected_position() {
            Some(position) => (position.location, position.summary()),
            None => {
                self.add_log_message("no ship selected".to_string(), log::Level::Warn);
                return;
            }
        };

        self.add_log_message(format!("fetching weather at {:}", summary), log::Level::Info);
        self.pending_weather =
            spawn_request("weather-request", move || query.current(&location));
    }

    #[cfg(feature = "weather")]
    fn receive_weather(&mut self) {
        let result = match &self.pending_weather {
            Some(receiver) => match receiver.try_recv() {
                Ok(result) => result,
                Err(mpsc::TryRecvError::Empty) => return,
                Err(mpsc::TryRecvError::Disconnected) => Err(
                    crate::connection::ConnectionError::FailedToEstablish {
                        connection: "weather".to_string(),
                        message: "request ended without a response".to_string(),
                    },
                ),
            },
            None => return,
        };
        self.pending_weather = None;

        match result {
            Ok(report) => {
                self.add_log_message(
                    format!(
                        "weather at ({:.2}, {:.2}) - {:}",
                        report.location.y(),
                        report.location.x(),
                        report
                    ),
                    log::Level::Info,
                );
                self.weather = Some(report);
            }
            Err(error) => self.add_log_message(error.to_string(), log::Level::Error),
        }
    }

    /// Stop polling; the view's data is discarded with the app.
    pub fn shutdown(&mut self) {
        if let Some(poller) = &mut self.poller {
            if poller.stop() {
                let messages = poller.drain_messages();
                self.add_log_messages(messages);
                self.add_log_message("stopped polling".to_string(), log::Level::Info);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configuration(yaml: &str) -> crate::configuration::RunConfiguration {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn replay_configuration() -> crate::configuration::RunConfiguration {
        configuration(&format!(
            "name: replay\ntraffic:\n  file: {:}/data/ships/harbor.geojson\n",
            env!("CARGO_MANIFEST_DIR")
        ))
    }

    #[test]
    fn test_replay() {
        let mut app = ShipTrafficApp::new(replay_configuration(), log::Level::Debug);
        assert!(app.is_polling());

        assert!(crate::poll::testing::wait_for(|| {
            app.on_tick();
            app.traffic.polls >= 1
        }));

        assert_eq!(app.positions.len(), 3);
        assert_eq!(app.selected_position().unwrap().mmsi_label(), "219019621");
        assert!(app
            .log_messages
            .iter()
            .any(|(_, message, _)| message == "received 3 ships"));

        app.shutdown();
        assert!(!app.is_polling());
    }

    #[test]
    fn test_log_level_filter() {
        let mut app = ShipTrafficApp::new(replay_configuration(), log::Level::Info);

        assert!(crate::poll::testing::wait_for(|| {
            app.on_tick();
            app.traffic.polls >= 1
        }));
        app.shutdown();

        assert!(app
            .log_messages
            .iter()
            .all(|(_, _, level)| *level <= log::Level::Info));
    }

    #[test]
    fn test_invalid_connection() {
        let app = ShipTrafficApp::new(
            configuration("base_url: localhost\n"),
            log::Level::Info,
        );

        assert!(!app.is_polling());
        assert!(app
            .log_messages
            .iter()
            .any(|(_, message, level)| *level == log::Level::Error
                && message == "no connection started"));
    }

    #[test]
    fn test_navigation() {
        let mut app = ShipTrafficApp::new(replay_configuration(), log::Level::Info);
        assert!(crate::poll::testing::wait_for(|| {
            app.on_tick();
            app.positions.len() == 3
        }));
        app.shutdown();

        app.on_key(crossterm::event::KeyCode::Tab);
        assert_eq!(app.tab_index, SHIPS_TAB);

        app.on_key(crossterm::event::KeyCode::Up);
        assert_eq!(app.selected_ship, 2);
        app.on_key(crossterm::event::KeyCode::Down);
        assert_eq!(app.selected_ship, 0);
        app.on_key(crossterm::event::KeyCode::Down);
        assert_eq!(app.selected_position().unwrap().mmsi_label(), "219000431");

        app.on_key(crossterm::event::KeyCode::BackTab);
        app.on_key(crossterm::event::KeyCode::BackTab);
        assert_eq!(app.tab_index, MAP_TAB);

        let dark_mode = app.dark_mode;
        app.on_key(crossterm::event::KeyCode::Char('d'));
        assert_eq!(app.dark_mode, !dark_mode);

        app.on_key(crossterm::event::KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_log_scroll_stops_at_end() {
        let mut app = ShipTrafficApp::new(replay_configuration(), log::Level::Info);
        app.shutdown();
        let lines = app.log_messages.len() as u16;
        assert!(lines > 0);

        for _ in 0..(lines + 10) {
            app.down();
        }
        assert_eq!(app.log_messages_scroll_offset, lines);

        app.up();
        assert_eq!(app.log_messages_scroll_offset, lines - 1);
    }

    #[test]
    fn test_output() {
        let path = std::env::temp_dir().join(format!(
            "shiptraffic_output_{:}.geojson",
            std::process::id()
        ));
        let mut configuration = replay_configuration();
        configuration.output = Some(crate::configuration::PathConfiguration {
            filename: path.to_owned(),
        });

        let mut app = ShipTrafficApp::new(configuration, log::Level::Info);
        assert!(crate::poll::testing::wait_for(|| {
            app.on_tick();
            path.exists()
        }));
        app.shutdown();

        let written = crate::connection::file::GeoJsonFile::new(path.to_string_lossy().to_string())
            .unwrap()
            .read_ships_from_geojson()
            .unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(written.len(), 3);
    }

    #[cfg(feature = "routes")]
    #[test]
    fn test_route_request() {
        let (base_url, server) = crate::connection::testing::serve(
            200,
            r#"{"ship_id": "219019621", "optimized_route": [[33.7405, -118.2519], [34.7405, -118.2519]]}"#,
        );

        let mut configuration = replay_configuration();
        configuration.route = Some(crate::connection::route::RouteQuery::new(
            Some(base_url),
            "219019621",
            "Port A",
            "Port B",
        ));

        let mut app = ShipTrafficApp::new(configuration, log::Level::Info);
        assert!(crate::poll::testing::wait_for(|| {
            app.on_tick();
            app.route.is_some()
        }));
        app.shutdown();
        server.join().unwrap();

        let route = app.route.as_ref().unwrap();
        assert_eq!(route.waypoints.len(), 2);
        assert_eq!(
            app.route_animation
                .as_ref()
                .unwrap()
                .position_at(chrono::Local::now()),
            Some(route.waypoints[0])
        );
    }

    #[cfg(feature = "routes")]
    #[test]
    fn test_finished_route_animation() {
        let mut app = ShipTrafficApp::new(replay_configuration(), log::Level::Debug);
        app.shutdown();

        let route = crate::location::route::OptimizedRoute::new(
            "219019621".to_string(),
            vec![
                geo::point!(x: -118.2519, y: 33.7405),
                geo::point!(x: -74.1536, y: 40.6728),
            ],
        );
        app.route_animation = Some(crate::location::route::RouteAnimation::new(
            &route,
            chrono::Local::now() - chrono::Duration::seconds(10),
            *crate::location::route::ANIMATION_STEP,
        ));
        app.route = Some(route);

        app.on_tick();

        assert!(app.route_animation.is_none());
        assert!(app.route.is_some());
        assert!(app
            .log_messages
            .iter()
            .any(|(_, message, _)| message == "ship 219019621 reached the end of its route"));
    }

    #[cfg(feature = "weather")]
    #[test]
    fn test_weather_request() {
        let (base_url, server) = crate::connection::testing::serve(
            200,
            r#"{"weather": [{"description": "light rain"}], "main": {"temp": 8.5, "pressure": 1004}, "wind": {"speed": 7.2}}"#,
        );

        let mut configuration = replay_configuration();
        configuration.weather = Some(crate::connection::weather::WeatherQuery::new(
            "abcdef".to_string(),
            Some(format!("{:}/weather", base_url)),
        ));

        let mut app = ShipTrafficApp::new(configuration, log::Level::Info);
        assert!(crate::poll::testing::wait_for(|| {
            app.on_tick();
            app.positions.len() == 3
        }));
        app.shutdown();

        let summary = app.selected_position().unwrap().summary();
        assert!(summary.contains("219019621"));

        app.on_key(crossterm::event::KeyCode::Char('w'));
        assert!(crate::poll::testing::wait_for(|| {
            app.on_tick();
            app.weather.is_some()
        }));
        server.join().unwrap();

        assert_eq!(
            app.weather.as_ref().unwrap().description,
            Some("light rain".to_string())
        );
        assert!(app
            .log_messages
            .iter()
            .any(|(_, message, _)| *message == format!("fetching weather at {:}", summary)));
    }
}
