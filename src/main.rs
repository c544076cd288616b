use std::{error, path::Path, process::ExitCode};

use logger::LogKind;
use synth::{
    Config, Controller, PatchSnapshot, SynthEvent, parameter::OPERATOR_COUNT,
    transport::SerialTransport,
};

mod cli;

use cli::{CliCommand, Options};

fn main() -> ExitCode {
    let (options, command) = match cli::parse(std::env::args().skip(1)) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("{e}\n\n{}", cli::USAGE);
            return ExitCode::from(2);
        }
    };

    if command == CliCommand::Help {
        println!("{}", cli::USAGE);
        return ExitCode::SUCCESS;
    }

    let kind = if options.log_file {
        LogKind::File
    } else {
        LogKind::Stdout
    };
    if let Some(path) = logger::init_logger(kind) {
        eprintln!("logging to {}", path.display());
    }

    let code = match run(&options, command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("xfm2ctl: {e}");
            ExitCode::FAILURE
        }
    };

    logger::flush();
    code
}

fn load_config(options: &Options) -> Result<Config, Box<dyn error::Error>> {
    let mut config = match &options.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    if let Some(port) = &options.port {
        config.port.clone_from(port);
    }
    if let Some(names) = &options.names {
        config.patch_names.clone_from(names);
    }

    Ok(config)
}

fn run(options: &Options, command: CliCommand) -> Result<(), Box<dyn error::Error>> {
    let config = load_config(options)?;

    let mut synth = if options.offline {
        Controller::offline(&config)?
    } else {
        Controller::connect(&config)?
    };

    synth.subscribe(|event: SynthEvent| tracing::debug!("{event:?}"));

    match command {
        CliCommand::Dump(None) => print_image(&synth),
        CliCommand::Dump(Some(path)) => synth.snapshot().save(&path)?,
        CliCommand::Get { address, fresh } => {
            let value = synth.read_parameter(address, !fresh)?;
            println!("{address} = {value} ({value:#04x})");
        }
        CliCommand::Set { address, value } => {
            if !synth.write_parameter(address, value)? {
                println!("{address} already {value}");
            }
        }
        CliCommand::Recall(slot) => {
            synth.select_patch(slot)?;
            print_patch(&synth);
        }
        CliCommand::Reload => {
            synth.reload_current_patch()?;
            print_patch(&synth);
        }
        CliCommand::Store(slot) => {
            synth.store_patch(slot)?;
            print_patch(&synth);
        }
        CliCommand::Init => synth.initialize_working_patch()?,
        CliCommand::Algorithm(n) => {
            synth.apply_algorithm(n)?;
            print_topology(&mut synth)?;
        }
        CliCommand::Carrier { op, enabled } => {
            synth.set_carrier(op, enabled)?;
            print_topology(&mut synth)?;
        }
        CliCommand::Modulate { op, by, enabled } => {
            synth.set_modulating(op, by, enabled)?;
            print_topology(&mut synth)?;
        }
        CliCommand::Topology => print_topology(&mut synth)?,
        CliCommand::Operator(op) => println!("{:#?}", synth.operator(op)?),
        CliCommand::Name(None) => print_patch(&synth),
        CliCommand::Name(Some(name)) => synth.set_patch_name(&name),
        CliCommand::Restore(path) => restore(&mut synth, &path)?,
        CliCommand::Help => println!("{}", cli::USAGE),
    }

    Ok(())
}

fn restore(
    synth: &mut Controller<SerialTransport>,
    path: &Path,
) -> Result<(), Box<dyn error::Error>> {
    let snapshot = PatchSnapshot::load(path)?;
    let changed = synth.restore(&snapshot)?;
    println!("{changed} registers changed");
    Ok(())
}

fn print_patch(synth: &Controller<SerialTransport>) {
    println!("{:3} {}", synth.patch_slot(), synth.patch_name());
}

fn print_image(synth: &Controller<SerialTransport>) {
    if !synth.is_initialized() {
        println!("(register image not read from the synth)");
    }

    for (row, chunk) in synth.cache().image().chunks(16).enumerate() {
        let bytes: Vec<String> = chunk.iter().map(|b| format!("{b:02x}")).collect();
        println!("{:03x}: {}", row * 16, bytes.join(" "));
    }
}

fn print_topology(synth: &mut Controller<SerialTransport>) -> Result<(), Box<dyn error::Error>> {
    println!("op  carrier  modulated by");
    for op in 0..OPERATOR_COUNT {
        let mask = synth.modulators(op)?;
        let sources: Vec<String> = (0..OPERATOR_COUNT)
            .filter(|by| mask & (1 << by) != 0)
            .map(|by| (by + 1).to_string())
            .collect();
        let carrier = if synth.is_carrier(op)? { "yes" } else { "no" };
        println!("{:>2}  {carrier:<7}  {}", op + 1, sources.join(","));
    }

    match synth.current_algorithm()? {
        Some(n) => println!("DX7 algorithm {n}"),
        None => println!("no matching DX7 algorithm"),
    }
    Ok(())
}
