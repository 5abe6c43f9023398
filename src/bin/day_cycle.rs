//! Runs one simulated day on the default system and prints an hourly report.

use colored::Colorize;

use solar_thermal_rust::constants::{J_PER_KWH, MS_PER_MINUTE};
use solar_thermal_rust::system::{SolarThermalSystem, SystemConfig, SystemState};
use solar_thermal_rust::temp_utils::{format_milliseconds, minutes_to_hhmmss};

fn temp_label(temp_c: f64) -> colored::ColoredString {
    let label = format!("{:5.1}°C", temp_c);
    if temp_c >= 60.0 {
        label.red()
    } else if temp_c >= 35.0 {
        label.yellow()
    } else {
        label.cyan()
    }
}

fn print_hour(state: &SystemState) {
    let pump = if state.pump_running {
        "ON ".green()
    } else {
        "off".dimmed()
    };

    println!(
        "{} | sun {:4.0} W/m² | panel {} | tank {} (top {} / bottom {}) | pump {} | eff {:5.1}%",
        minutes_to_hhmmss(state.time_of_day_minutes).bold(),
        state.solar_radiation,
        temp_label(state.panel_temperature),
        temp_label(state.tank_temperature),
        temp_label(state.tank_top_temp),
        temp_label(state.tank_bottom_temp),
        pump,
        state.system_efficiency,
    );
}

fn main() {
    let mut system = SolarThermalSystem::new(SystemConfig::default());
    system.start();
    system.set_time_of_day(6.0);

    println!("{}", "=== SOLAR THERMAL DAY CYCLE ===".bold());

    let minutes_in_day = 24 * 60;
    for minute in 0..minutes_in_day {
        if let Err(err) = system.update(MS_PER_MINUTE) {
            eprintln!("{} {}", "simulation crashed:".red().bold(), err);
            std::process::exit(1);
        }

        if minute % 60 == 0 {
            match system.system_state() {
                Ok(state) => print_hour(&state),
                Err(err) => {
                    eprintln!("{} {}", "simulation crashed:".red().bold(), err);
                    std::process::exit(1);
                }
            }
        }
    }

    match system.system_state() {
        Ok(state) => {
            println!();
            println!("{}", "=== END OF DAY ===".bold());
            println!(
                "simulated: {} | tank: {} | stored energy: {:.2} kWh",
                format_milliseconds(state.simulation_time_ms),
                temp_label(state.tank_temperature),
                state.stored_energy / J_PER_KWH,
            );
        }
        Err(err) => {
            eprintln!("{} {}", "simulation crashed:".red().bold(), err);
            std::process::exit(1);
        }
    }
}
