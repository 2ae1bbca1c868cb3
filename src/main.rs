use clap::Parser;
use grooveclock::{
    cli::{handle_device_list, validate_device, Args},
    clock::{ClockSettings, MidiClockOut},
    config::Settings,
    logging,
    midi::{ClockPort, DefaultClockPort, MidirPort},
    ui::{
        self,
        prompt::{self, PanelChoice},
        StatusDisplay, TransportPanel,
    },
};
use std::error::Error;
use std::io::{self, BufRead};
use std::sync::{Arc, Mutex};

fn main() {
    let args = parse_command_line_arguments();

    let settings = match Settings::load(&args) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Invalid settings: {}", e);
            std::process::exit(1);
        }
    };

    initialize_logging(&settings);

    if let Err(e) = run(&args, &settings) {
        log::error!("{}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }

    log::info!("Application exiting");
}

fn parse_command_line_arguments() -> Args {
    Args::parse()
}

fn initialize_logging(settings: &Settings) {
    if let Err(e) = logging::init_logger(&settings.log_level) {
        eprintln!("Logger initialization failed: {}", e);
    }
    log::info!("Application starting");
}

fn run(args: &Args, settings: &Settings) -> Result<(), Box<dyn Error>> {
    let devices = handle_device_list();

    if args.device_list {
        list_available_devices(&devices);
        return Ok(());
    }

    if let Some(device_name) = &settings.output_device {
        validate_device(device_name, &devices)?;
    }

    let port = open_output(args, settings, &devices)?;
    let clock = MidiClockOut::new(port, &ClockSettings::from(settings))?;
    println!(
        "Sending MIDI clock on '{}' at {} BPM",
        clock.port_name(),
        clock.bpm()
    );

    if args.autostart {
        run_autostart(clock)
    } else {
        run_interactive(clock)
    }
}

fn list_available_devices(devices: &[String]) {
    println!("Available MIDI output devices:");
    for device in devices {
        println!("  - {}", device);
    }
}

fn open_output(
    args: &Args,
    settings: &Settings,
    devices: &[String],
) -> Result<DefaultClockPort, Box<dyn Error>> {
    let device = if args.select_output {
        prompt::select_output_port(devices)?
    } else {
        settings.output_device.clone()
    };

    let port = match device {
        Some(name) => MidirPort::connect_to_device(&settings.client_name, &name)?,
        None => MidirPort::create_virtual(&settings.client_name)?,
    };
    log::info!("MIDI clock output ready: {}", port.name());
    Ok(port)
}

fn run_autostart<P: ClockPort>(mut clock: MidiClockOut<P>) -> Result<(), Box<dyn Error>> {
    clock.start()?;

    let display = StatusDisplay::spawn(clock.state());

    println!("\nPress Enter to stop...");
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;

    display.finish();
    clock.stop()?;
    Ok(())
}

fn run_interactive<P: ClockPort>(clock: MidiClockOut<P>) -> Result<(), Box<dyn Error>> {
    let state = clock.state();
    let clock = Arc::new(Mutex::new(clock));
    let mut panel = TransportPanel::new(Arc::clone(&clock));

    loop {
        let snapshot = state.snapshot();
        panel.refresh(snapshot.started, !snapshot.started && snapshot.ticks > 0);

        let status = ui::format_status(&snapshot);
        match prompt::choose_action(&panel, &snapshot, &status)? {
            PanelChoice::Press(button) => {
                panel.press(button);
            }
            PanelChoice::SetBpm => {
                let bpm = prompt::prompt_bpm(snapshot.bpm)?;
                clock
                    .lock()
                    .map_err(|_| "clock lock poisoned")?
                    .set_bpm(bpm)?;
            }
            PanelChoice::Quit => break,
        }
    }

    let mut clock = clock.lock().map_err(|_| "clock lock poisoned")?;
    clock.stop()?;
    Ok(())
}
