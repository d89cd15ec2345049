use std::sync::{mpsc, Arc, Mutex, PoisonError};

pub type LogMessage = (chrono::DateTime<chrono::Local>, String, log::Level);

/// Anything that can produce the current fleet on demand.
pub trait ShipSource: Send {
    fn retrieve_ships(
        &mut self,
    ) -> Result<Vec<crate::location::ShipRecord>, crate::connection::ConnectionError>;
}

/// The ship collection shown by a view, plus the outcome of the most recent poll.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrafficState {
    pub ships: Vec<crate::location::ShipRecord>,
    pub error: Option<crate::connection::ConnectionError>,
    pub last_update: Option<chrono::DateTime<chrono::Local>>,
    pub polls: usize,
    pub failures: usize,
}

impl TrafficState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the collection wholesale on success; on failure keep it and record the error.
    pub fn apply(
        &mut self,
        result: Result<Vec<crate::location::ShipRecord>, crate::connection::ConnectionError>,
    ) {
        self.polls += 1;
        match result {
            Ok(ships) => {
                self.ships = ships;
                self.error = None;
                self.last_update = Some(chrono::Local::now());
            }
            Err(error) => {
                self.failures += 1;
                self.error = Some(error);
            }
        }
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// ships with usable coordinates, in collection order
    pub fn positions(&self) -> Vec<crate::location::ShipPosition> {
        self.ships
            .iter()
            .filter_map(|ship| ship.to_ship_position().ok())
            .collect()
    }
}

/// Polls a [`ShipSource`] on a fixed interval from a single worker thread.
///
/// The first poll happens as soon as the worker starts. Each following poll waits a full interval
/// after the previous one completed, so requests never overlap and results are applied in the
/// order they were issued. Stopping (explicitly or on drop) cancels the schedule and waits for the
/// worker, after which the source is never called again.
pub struct TrafficPoller {
    state: Arc<Mutex<TrafficState>>,
    messages: Arc<Mutex<Vec<LogMessage>>>,
    stop: Option<mpsc::Sender<()>>,
    worker: Option<std::thread::JoinHandle<()>>,
    interval: std::time::Duration,
}

impl TrafficPoller {
    pub fn start<S: ShipSource + 'static>(
        source: S,
        interval: std::time::Duration,
    ) -> std::io::Result<Self> {
        let state = Arc::new(Mutex::new(TrafficState::new()));
        let messages = Arc::new(Mutex::new(Vec::<LogMessage>::new()));
        let (stop, stopped) = mpsc::channel::<()>();

        let worker = {
            let state = Arc::clone(&state);
            let messages = Arc::clone(&messages);
            let mut source = source;

            std::thread::Builder::new()
                .name("traffic-poller".into())
                .spawn(move || loop {
                    let cycle_messages = crate::retrieve::retrieve_ships(&mut source, &state);
                    messages
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .extend(cycle_messages);

                    match stopped.recv_timeout(interval) {
                        Err(mpsc::RecvTimeoutError::Timeout) => continue,
                        Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
                    }
                })?
        };

        Ok(Self {
            state,
            messages,
            stop: Some(stop),
            worker: Some(worker),
            interval,
        })
    }

    pub fn interval(&self) -> std::time::Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.stop.is_some()
    }

    pub fn snapshot(&self) -> TrafficState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// take the log messages produced since the last call
    pub fn drain_messages(&self) -> Vec<LogMessage> {
        std::mem::take(&mut *self.messages.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Cancel the schedule and wait for an in-flight poll to finish.
    ///
    /// Returns `false` if the poller was already stopped.
    pub fn stop(&mut self) -> bool {
        let Some(stop) = self.stop.take() else {
            return false;
        };

        // the worker may already be gone if it panicked
        let _ = stop.send(());
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                self.messages
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push((
                        chrono::Local::now(),
                        "traffic poller exited unexpectedly".to_string(),
                        log::Level::Error,
                    ));
            }
        }

        true
    }
}

impl Drop for TrafficPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// source that replays canned results, repeating the last one, and counts its calls
    pub struct ScriptedSource {
        results: Vec<Result<Vec<crate::location::ShipRecord>, crate::connection::ConnectionError>>,
        pub calls: Arc<AtomicUsize>,
    }

    impl ScriptedSource {
        pub fn new(
            results: Vec<
                Result<Vec<crate::location::ShipRecord>, crate::connection::ConnectionError>,
            >,
        ) -> Self {
            Self {
                results,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl super::ShipSource for ScriptedSource {
        fn retrieve_ships(
            &mut self,
        ) -> Result<Vec<crate::location::ShipRecord>, crate::connection::ConnectionError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let index = call.min(self.results.len().saturating_sub(1));
            match self.results.get(index) {
                Some(result) => result.to_owned(),
                None => Ok(vec![]),
            }
        }
    }

    pub fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while std::time::Instant::now() < deadline {
            if condition() {
                return true;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        condition()
    }
}
