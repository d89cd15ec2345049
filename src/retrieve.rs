use std::sync::{Mutex, PoisonError};

/// Run one poll cycle: fetch from the source, apply the result to the shared state and describe
/// what happened. The state is only locked once the fetch has completed.
pub fn retrieve_ships<S: crate::poll::ShipSource + ?Sized>(
    source: &mut S,
    state: &Mutex<crate::poll::TrafficState>,
) -> Vec<crate::poll::LogMessage> {
    let mut messages = Vec::<crate::poll::LogMessage>::new();

    let result = source.retrieve_ships();

    match &result {
        Ok(ships) => {
            messages.push((
                chrono::Local::now(),
                format!("received {:} ships", ships.len()),
                log::Level::Debug,
            ));

            let mut skipped: usize = 0;
            for ship in ships {
                if let Err(error) = ship.to_ship_position() {
                    skipped += 1;
                    messages.push((
                        chrono::Local::now(),
                        format!("skipped ship {:}; {:}", ship.label(), error),
                        log::Level::Debug,
                    ));
                }
            }

            if skipped > 0 {
                messages.push((
                    chrono::Local::now(),
                    format!(
                        "{:} of {:} ships have no usable position",
                        skipped,
                        ships.len()
                    ),
                    log::Level::Warn,
                ));
            }
        }
        Err(error) => {
            messages.push((chrono::Local::now(), error.to_string(), log::Level::Error));
        }
    }

    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
    let recovered = result.is_ok() && state.has_error();
    state.apply(result);

    if recovered {
        messages.push((
            chrono::Local::now(),
            "ship traffic is reachable again".to_string(),
            log::Level::Info,
        ));
    }

    messages
}
