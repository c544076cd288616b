use std::path::PathBuf;

pub const USAGE: &str = "\
usage: xfm2ctl [--config FILE] [--port PORT] [--names FILE] [--offline] [--log-file] COMMAND

commands:
  dump [FILE]             print the register image, or save it as a JSON snapshot
  get ADDR [--fresh]      read one register (--fresh asks the synth)
  set ADDR VALUE          write one register
  recall SLOT             select a patch slot (0..127)
  reload                  recall the current slot again
  store [SLOT]            store the working patch
  init                    reset the working patch to the default
  algorithm N             apply DX7 algorithm N (1..32)
  carrier OP on|off       make operator OP (1..6) audible or not
  modulate OP BY on|off   route operator BY into operator OP
  topology                print carrier flags and the modulation matrix
  operator OP             print every parameter of operator OP
  name [TEXT]             print or set the working patch name
  restore FILE            replay a JSON snapshot into the working patch

ADDR and VALUE accept decimal or 0x hex.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CliCommand {
    Dump(Option<PathBuf>),
    Get { address: u16, fresh: bool },
    Set { address: u16, value: u8 },
    Recall(i32),
    Reload,
    Store(Option<i32>),
    Init,
    Algorithm(u8),
    /// Operator indices are 0-based from here on.
    Carrier { op: usize, enabled: bool },
    Modulate { op: usize, by: usize, enabled: bool },
    Topology,
    Operator(usize),
    Name(Option<String>),
    Restore(PathBuf),
    Help,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Options {
    pub config: Option<PathBuf>,
    pub port: Option<String>,
    pub names: Option<PathBuf>,
    pub offline: bool,
    pub log_file: bool,
}

pub fn parse<I>(args: I) -> Result<(Options, CliCommand), String>
where
    I: IntoIterator<Item = String>,
{
    let mut options = Options::default();
    let mut args = args.into_iter();
    let mut rest = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => options.config = Some(value_of(&arg, args.next())?.into()),
            "--port" => options.port = Some(value_of(&arg, args.next())?),
            "--names" => options.names = Some(value_of(&arg, args.next())?.into()),
            "--offline" => options.offline = true,
            "--log-file" => options.log_file = true,
            "-h" | "--help" => return Ok((options, CliCommand::Help)),
            _ => {
                rest.push(arg);
                // everything after the command belongs to it
                rest.extend(args.by_ref());
            }
        }
    }

    let command = parse_command(&rest)?;
    Ok((options, command))
}

fn value_of(flag: &str, value: Option<String>) -> Result<String, String> {
    value.ok_or_else(|| format!("{flag} needs a value"))
}

fn parse_command(args: &[String]) -> Result<CliCommand, String> {
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    let command = match args.as_slice() {
        [] => return Err("no command given".to_owned()),
        ["dump"] => CliCommand::Dump(None),
        ["dump", file] => CliCommand::Dump(Some(PathBuf::from(*file))),
        ["get", addr] => CliCommand::Get {
            address: address(addr)?,
            fresh: false,
        },
        ["get", addr, "--fresh"] | ["get", "--fresh", addr] => CliCommand::Get {
            address: address(addr)?,
            fresh: true,
        },
        ["set", addr, value] => CliCommand::Set {
            address: address(addr)?,
            value: byte(value)?,
        },
        ["recall", slot] => CliCommand::Recall(slot_number(slot)?),
        ["reload"] => CliCommand::Reload,
        ["store"] => CliCommand::Store(None),
        ["store", slot] => CliCommand::Store(Some(slot_number(slot)?)),
        ["init"] => CliCommand::Init,
        ["algorithm", n] => CliCommand::Algorithm(
            n.parse()
                .map_err(|_| format!("invalid algorithm number {n:?}"))?,
        ),
        ["carrier", op, state] => CliCommand::Carrier {
            op: operator(op)?,
            enabled: switch(state)?,
        },
        ["modulate", op, by, state] => CliCommand::Modulate {
            op: operator(op)?,
            by: operator(by)?,
            enabled: switch(state)?,
        },
        ["topology"] => CliCommand::Topology,
        ["operator", op] => CliCommand::Operator(operator(op)?),
        ["name"] => CliCommand::Name(None),
        ["name", text @ ..] => CliCommand::Name(Some(text.join(" "))),
        ["restore", file] => CliCommand::Restore(PathBuf::from(*file)),
        [command, ..] => return Err(format!("unknown or malformed command {command:?}")),
    };

    Ok(command)
}

fn number(text: &str) -> Result<u32, String> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.map_err(|_| format!("invalid number {text:?}"))
}

fn address(text: &str) -> Result<u16, String> {
    // the range itself is checked by the register cache
    u16::try_from(number(text)?).map_err(|_| format!("address {text} is out of range"))
}

fn byte(text: &str) -> Result<u8, String> {
    u8::try_from(number(text)?).map_err(|_| format!("value {text} does not fit in a byte"))
}

fn slot_number(text: &str) -> Result<i32, String> {
    text.parse().map_err(|_| format!("invalid slot {text:?}"))
}

/// 1-based on the command line.
fn operator(text: &str) -> Result<usize, String> {
    match text.parse::<usize>() {
        Ok(op @ 1..=6) => Ok(op - 1),
        _ => Err(format!("operator must be 1..6, got {text:?}")),
    }
}

fn switch(text: &str) -> Result<bool, String> {
    match text {
        "on" | "1" | "true" => Ok(true),
        "off" | "0" | "false" => Ok(false),
        _ => Err(format!("expected on or off, got {text:?}")),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn run(line: &str) -> Result<(Options, CliCommand), String> {
        parse(line.split_whitespace().map(str::to_owned))
    }

    #[test]
    fn global_flags_before_command() {
        let (options, command) =
            run("--port /dev/ttyACM0 --offline --names n.txt get 0x1ff --fresh").unwrap();

        assert_eq!(
            options,
            Options {
                config: None,
                port: Some("/dev/ttyACM0".to_owned()),
                names: Some("n.txt".into()),
                offline: true,
                log_file: false,
            }
        );
        assert_eq!(
            command,
            CliCommand::Get {
                address: 511,
                fresh: true
            }
        );
    }

    #[test]
    fn operators_are_one_based() {
        assert_eq!(
            run("modulate 1 6 on").unwrap().1,
            CliCommand::Modulate {
                op: 0,
                by: 5,
                enabled: true
            }
        );
        assert!(run("carrier 0 on").is_err());
        assert!(run("carrier 7 off").is_err());
    }

    #[test]
    fn set_parses_hex_and_decimal() {
        assert_eq!(
            run("set 300 0x7F").unwrap().1,
            CliCommand::Set {
                address: 300,
                value: 127
            }
        );
        assert!(run("set 1 256").is_err());
    }

    #[test]
    fn slots_are_passed_through_unclamped() {
        assert_eq!(run("recall 200").unwrap().1, CliCommand::Recall(200));
        assert_eq!(run("store").unwrap().1, CliCommand::Store(None));
        assert_eq!(run("store -1").unwrap().1, CliCommand::Store(Some(-1)));
    }

    #[test]
    fn name_keeps_spaces() {
        assert_eq!(
            run("name E. Piano 2").unwrap().1,
            CliCommand::Name(Some("E. Piano 2".to_owned()))
        );
    }

    #[test]
    fn missing_flag_value_and_unknown_command() {
        assert_eq!(run("--port").unwrap_err(), "--port needs a value");
        assert!(run("frobnicate").is_err());
        assert!(run("").is_err());
        assert_eq!(run("--help").unwrap().1, CliCommand::Help);
    }
}
