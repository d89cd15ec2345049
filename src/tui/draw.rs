struct Palette {
    background: ratatui::style::Color,
    text: ratatui::style::Color,
    map: ratatui::style::Color,
    ships: ratatui::style::Color,
    selected: ratatui::style::Color,
    ports: ratatui::style::Color,
    route: ratatui::style::Color,
}

fn palette(dark_mode: bool) -> Palette {
    if dark_mode {
        Palette {
            background: ratatui::style::Color::Black,
            text: ratatui::style::Color::Gray,
            map: ratatui::style::Color::DarkGray,
            ships: ratatui::style::Color::LightCyan,
            selected: ratatui::style::Color::LightYellow,
            ports: ratatui::style::Color::LightGreen,
            route: ratatui::style::Color::LightMagenta,
        }
    } else {
        Palette {
            background: ratatui::style::Color::Reset,
            text: ratatui::style::Color::Reset,
            map: ratatui::style::Color::Gray,
            ships: ratatui::style::Color::Blue,
            selected: ratatui::style::Color::Red,
            ports: ratatui::style::Color::Green,
            route: ratatui::style::Color::Magenta,
        }
    }
}

pub fn draw(frame: &mut ratatui::Frame, app: &super::app::ShipTrafficApp) {
    let palette = palette(app.dark_mode);
    let base_style = ratatui::style::Style::default()
        .fg(palette.text)
        .bg(palette.background);

    let areas = ratatui::layout::Layout::default()
        .direction(ratatui::layout::Direction::Vertical)
        .constraints([
            ratatui::layout::Constraint::Length(3),
            ratatui::layout::Constraint::Min(10),
            ratatui::layout::Constraint::Length(1),
        ])
        .split(frame.area());

    let titles: Vec<ratatui::text::Line> = super::app::TABS
        .iter()
        .map(|title| ratatui::text::Line::from(title.as_str()))
        .collect();
    let tabs = ratatui::widgets::Tabs::new(titles)
        .block(ratatui::widgets::Block::default().borders(ratatui::widgets::Borders::ALL))
        .select(app.tab_index)
        .style(base_style.fg(ratatui::style::Color::Cyan))
        .highlight_style(
            ratatui::style::Style::default()
                .add_modifier(ratatui::style::Modifier::BOLD)
                .add_modifier(ratatui::style::Modifier::UNDERLINED),
        );
    frame.render_widget(tabs, areas[0]);

    match app.tab_index {
        super::app::SHIPS_TAB => draw_ships(frame, app, areas[1], &palette, base_style),
        super::app::MAP_TAB => draw_map(frame, app, areas[1], &palette),
        _ => draw_log(frame, app, areas[1], base_style),
    }

    draw_status(frame, app, areas[2], base_style);
}

fn draw_log(
    frame: &mut ratatui::Frame,
    app: &super::app::ShipTrafficApp,
    area: ratatui::layout::Rect,
    base_style: ratatui::style::Style,
) {
    let bold_style = base_style.add_modifier(ratatui::style::Modifier::BOLD);

    let log = ratatui::widgets::Paragraph::new(
        app.log_messages
            .iter()
            .map(|(time, message, level)| {
                let level_style = match level {
                    log::Level::Error => bold_style.fg(ratatui::style::Color::Red),
                    log::Level::Warn => bold_style.fg(ratatui::style::Color::Yellow),
                    log::Level::Info => bold_style.fg(ratatui::style::Color::Blue),
                    _ => bold_style,
                };

                ratatui::text::Line::from(vec![
                    ratatui::text::Span::styled(
                        format!("{:} ", time.format(&crate::DATETIME_FORMAT)),
                        bold_style,
                    ),
                    ratatui::text::Span::styled(format!("{:<5} ", level), level_style),
                    ratatui::text::Span::raw(message.as_str()),
                ])
            })
            .collect::<Vec<ratatui::text::Line>>(),
    )
    .style(base_style)
    .scroll((app.log_messages_scroll_offset, 0))
    .wrap(ratatui::widgets::Wrap { trim: true })
    .block(ratatui::widgets::Block::default().borders(ratatui::widgets::Borders::ALL));
    frame.render_widget(log, area);
}

fn draw_ships(
    frame: &mut ratatui::Frame,
    app: &super::app::ShipTrafficApp,
    area: ratatui::layout::Rect,
    palette: &Palette,
    base_style: ratatui::style::Style,
) {
    let bold_style = base_style.add_modifier(ratatui::style::Modifier::BOLD);

    let ship_areas = ratatui::layout::Layout::default()
        .direction(ratatui::layout::Direction::Horizontal)
        .constraints([
            ratatui::layout::Constraint::Percentage(65),
            ratatui::layout::Constraint::Percentage(35),
        ])
        .split(area);

    let rows: Vec<ratatui::widgets::Row> = app
        .positions
        .iter()
        .map(|ship| {
            ratatui::widgets::Row::new(vec![
                ship.mmsi_label(),
                ship.name_label(),
                format!("{:.4}", ship.latitude()),
                format!("{:.4}", ship.longitude()),
                ship.speed_label(),
                ship.course_label(),
                ship.status_label(),
            ])
        })
        .collect();

    let table = ratatui::widgets::Table::new(
        rows,
        [
            ratatui::layout::Constraint::Length(11),
            ratatui::layout::Constraint::Min(14),
            ratatui::layout::Constraint::Length(9),
            ratatui::layout::Constraint::Length(10),
            ratatui::layout::Constraint::Length(6),
            ratatui::layout::Constraint::Length(6),
            ratatui::layout::Constraint::Min(10),
        ],
    )
    .header(
        ratatui::widgets::Row::new(vec!["MMSI", "name", "lat", "lon", "sog", "cog", "status"])
            .style(bold_style),
    )
    .style(base_style)
    .row_highlight_style(bold_style.fg(palette.selected))
    .highlight_symbol("> ")
    .block(
        ratatui::widgets::Block::default()
            .borders(ratatui::widgets::Borders::ALL)
            .title(format!(
                "{:} ships ({:} received)",
                app.positions.len(),
                app.traffic.ships.len()
            )),
    );

    let mut table_state = ratatui::widgets::TableState::default().with_selected(
        if app.positions.is_empty() {
            None
        } else {
            Some(app.selected_ship)
        },
    );
    frame.render_stateful_widget(table, ship_areas[0], &mut table_state);

    let mut details = vec![];
    if let Some(ship) = app.selected_position() {
        for (label, value) in [
            ("MMSI: ", ship.mmsi_label()),
            ("name: ", ship.name_label()),
            (
                "coordinates: ",
                format!("({:.4}, {:.4})", ship.latitude(), ship.longitude()),
            ),
            ("speed: ", ship.speed_label()),
            ("course: ", ship.course_label()),
            ("status: ", ship.status_label()),
        ] {
            details.push(ratatui::text::Line::from(vec![
                ratatui::text::Span::styled(label, bold_style),
                ratatui::text::Span::raw(value),
            ]));
        }

        #[cfg(feature = "weather")]
        if let Some(weather) = &app.weather {
            details.push(ratatui::text::Line::from(""));
            details.push(ratatui::text::Line::from(vec![ratatui::text::Span::styled(
                format!(
                    "weather at ({:.2}, {:.2})",
                    weather.location.y(),
                    weather.location.x()
                ),
                bold_style,
            )]));
            details.push(ratatui::text::Line::from(format!("{:}", weather)));
        }
    } else {
        details.push(ratatui::text::Line::from("no ships with a usable position"));
    }

    let details = ratatui::widgets::Paragraph::new(details)
        .style(base_style)
        .block(
            ratatui::widgets::Block::default()
                .borders(ratatui::widgets::Borders::ALL)
                .title("Selected"),
        )
        .wrap(ratatui::widgets::Wrap { trim: true });
    frame.render_widget(details, ship_areas[1]);
}

/// bounds around every ship, port and waypoint, falling back to the whole world
fn map_bounds(points: &[geo::Point]) -> ([f64; 2], [f64; 2]) {
    if points.is_empty() {
        return ([-180.0, 180.0], [-90.0, 90.0]);
    }

    let mut x_bounds = [f64::MAX, f64::MIN];
    let mut y_bounds = [f64::MAX, f64::MIN];
    for point in points {
        x_bounds = [x_bounds[0].min(point.x()), x_bounds[1].max(point.x())];
        y_bounds = [y_bounds[0].min(point.y()), y_bounds[1].max(point.y())];
    }

    let margin = ((x_bounds[1] - x_bounds[0]).max(y_bounds[1] - y_bounds[0]) * 0.1).max(1.0);
    (
        [
            (x_bounds[0] - margin).max(-180.0),
            (x_bounds[1] + margin).min(180.0),
        ],
        [
            (y_bounds[0] - margin).max(-90.0),
            (y_bounds[1] + margin).min(90.0),
        ],
    )
}

fn draw_map(
    frame: &mut ratatui::Frame,
    app: &super::app::ShipTrafficApp,
    area: ratatui::layout::Rect,
    palette: &Palette,
) {
    let mut points: Vec<geo::Point> = app.positions.iter().map(|ship| ship.location).collect();
    points.extend(app.configuration.ports.iter().map(|port| port.location()));
    #[cfg(feature = "routes")]
    if let Some(route) = &app.route {
        points.extend(route.waypoints.iter().copied());
    }
    let (x_bounds, y_bounds) = map_bounds(&points);

    let ship_coordinates: Vec<(f64, f64)> = app
        .positions
        .iter()
        .map(|ship| (ship.longitude(), ship.latitude()))
        .collect();
    let selected_coordinates: Vec<(f64, f64)> = app
        .selected_position()
        .map(|ship| vec![(ship.longitude(), ship.latitude())])
        .unwrap_or_default();

    let map = ratatui::widgets::canvas::Canvas::default()
        .block(
            ratatui::widgets::Block::default()
                .borders(ratatui::widgets::Borders::ALL)
                .title("Map"),
        )
        .background_color(palette.background)
        .marker(ratatui::symbols::Marker::Braille)
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(|context| {
            context.draw(&ratatui::widgets::canvas::Map {
                color: palette.map,
                resolution: ratatui::widgets::canvas::MapResolution::High,
            });
            context.layer();

            for port in &app.configuration.ports {
                context.print(
                    port.longitude,
                    port.latitude,
                    ratatui::text::Span::styled(
                        format!("+{:}", port.name),
                        ratatui::style::Style::default().fg(palette.ports),
                    ),
                );
            }

            #[cfg(feature = "routes")]
            if let Some(route) = &app.route {
                for leg in route.waypoints.windows(2) {
                    context.draw(&ratatui::widgets::canvas::Line::new(
                        leg[0].x(),
                        leg[0].y(),
                        leg[1].x(),
                        leg[1].y(),
                        palette.route,
                    ));
                }

                if let Some(animation) = &app.route_animation {
                    if let Some(position) = animation.position_at(chrono::Local::now()) {
                        context.print(
                            position.x(),
                            position.y(),
                            ratatui::text::Span::styled(
                                "@",
                                ratatui::style::Style::default()
                                    .fg(palette.route)
                                    .add_modifier(ratatui::style::Modifier::BOLD),
                            ),
                        );
                    }
                }
            }

            context.draw(&ratatui::widgets::canvas::Points {
                coords: &ship_coordinates,
                color: palette.ships,
            });
            context.draw(&ratatui::widgets::canvas::Points {
                coords: &selected_coordinates,
                color: palette.selected,
            });
        });
    frame.render_widget(map, area);
}

fn draw_status(
    frame: &mut ratatui::Frame,
    app: &super::app::ShipTrafficApp,
    area: ratatui::layout::Rect,
    base_style: ratatui::style::Style,
) {
    let mut spans = vec![];

    match app.poll_interval() {
        Some(interval) if app.is_polling() => spans.push(ratatui::text::Span::raw(format!(
            "every {:} - ",
            crate::utilities::duration_string(
                &chrono::Duration::from_std(interval).unwrap_or(*crate::DEFAULT_INTERVAL)
            )
        ))),
        _ => spans.push(ratatui::text::Span::styled(
            "not polling - ",
            base_style.fg(ratatui::style::Color::Yellow),
        )),
    }

    match app.traffic.last_update {
        Some(last_update) => spans.push(ratatui::text::Span::raw(format!(
            "updated {:} - {:} ships - {:} polls, {:} failed ",
            crate::utilities::duration_string(&(last_update - chrono::Local::now())),
            app.traffic.ships.len(),
            app.traffic.polls,
            app.traffic.failures,
        ))),
        None => spans.push(ratatui::text::Span::raw("waiting for ship traffic ")),
    }

    if let Some(error) = &app.traffic.error {
        spans.push(ratatui::text::Span::styled(
            error.to_string(),
            base_style
                .fg(ratatui::style::Color::Red)
                .add_modifier(ratatui::style::Modifier::BOLD),
        ));
    }

    frame.render_widget(
        ratatui::widgets::Paragraph::new(ratatui::text::Line::from(spans)).style(base_style),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_bounds() {
        assert_eq!(map_bounds(&[]), ([-180.0, 180.0], [-90.0, 90.0]));

        let (x_bounds, y_bounds) = map_bounds(&[
            geo::point!(x: -118.2519, y: 33.7405),
            geo::point!(x: -117.2519, y: 34.7405),
        ]);
        assert!((x_bounds[0] + 119.2519).abs() < 1e-9);
        assert!((x_bounds[1] + 116.2519).abs() < 1e-9);
        assert!((y_bounds[0] - 32.7405).abs() < 1e-9);
        assert!((y_bounds[1] - 35.7405).abs() < 1e-9);

        let (x_bounds, _) = map_bounds(&[geo::point!(x: 179.5, y: 0.0)]);
        assert_eq!(x_bounds, [178.5, 180.0]);
    }

    #[test]
    fn test_draw() {
        let configuration: crate::configuration::RunConfiguration = serde_yaml::from_str(
            &format!(
                "traffic:\n  file: {:}/data/ships/harbor.geojson\n",
                env!("CARGO_MANIFEST_DIR")
            ),
        )
        .unwrap();
        let mut app = super::super::app::ShipTrafficApp::new(configuration, log::Level::Info);
        assert!(crate::poll::testing::wait_for(|| {
            app.on_tick();
            app.positions.len() == 3
        }));
        app.shutdown();

        let backend = ratatui::backend::TestBackend::new(120, 40);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();

        for tab_index in 0..super::super::app::TABS.len() {
            app.tab_index = tab_index;
            terminal.draw(|frame| draw(frame, &app)).unwrap();
        }

        app.tab_index = super::super::app::SHIPS_TAB;
        terminal.draw(|frame| draw(frame, &app)).unwrap();
        let rendered: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(rendered.contains("219019621"));
        assert!(rendered.contains("3 ships"));
    }
}
