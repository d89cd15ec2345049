mod configuration;
mod connection;
mod location;
mod poll;
mod retrieve;
mod tui;
mod utilities;

use clap::Parser;

lazy_static::lazy_static! {
    pub static ref DEFAULT_INTERVAL: chrono::Duration = chrono::Duration::seconds(5);
    pub static ref DATETIME_FORMAT: String = "%Y-%m-%d %H:%M:%S".to_string();
    pub static ref LOG_LEVEL: log::Level = log::Level::Info;
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    // configuration file to read
    configuration_filename: std::path::PathBuf,

    // print log messages instead of starting the terminal interface
    #[arg(long, default_value_t = false)]
    headless: bool,

    // stop after this many polls (headless only)
    #[arg(long)]
    polls: Option<usize>,

    // most verbose log level to show (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let arguments = Cli::parse();

    let log_level = match &arguments.log_level {
        Some(level) => level
            .parse::<log::Level>()
            .map_err(|error| format!("invalid log level \"{:}\"; {:}", level, error))?,
        None => *LOG_LEVEL,
    };

    let configuration_file = std::fs::File::open(&arguments.configuration_filename)?;
    let configuration: crate::configuration::RunConfiguration =
        serde_yaml::from_reader(configuration_file)?;

    if arguments.headless {
        run_headless(configuration, log_level, arguments.polls);
    } else {
        tui::run(configuration, log_level)?;
    }

    Ok(())
}

fn print_messages(messages: &[crate::poll::LogMessage]) {
    for (time, message, level) in messages {
        println!(
            "{:} {:<5} {:}",
            time.format(&crate::DATETIME_FORMAT),
            level,
            message
        );
    }
}

fn run_headless(
    configuration: crate::configuration::RunConfiguration,
    log_level: log::Level,
    polls: Option<usize>,
) {
    let mut app = crate::tui::app::ShipTrafficApp::new(configuration, log_level);

    let mut printed = 0;
    loop {
        app.on_tick();
        print_messages(&app.log_messages[printed..]);
        printed = app.log_messages.len();

        if !app.is_polling() {
            break;
        }
        if let Some(polls) = polls {
            if app.traffic.polls >= polls {
                break;
            }
        }

        std::thread::sleep(std::time::Duration::from_millis(250));
    }

    app.shutdown();
    print_messages(&app.log_messages[printed..]);
}
