/*
 * This file is part of smcread.
 *
 * Copyright (C) 2025 smcread contributors
 *
 * smcread is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * smcread is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with smcread. If not, see <https://www.gnu.org/licenses/>.
 */

use std::path::PathBuf;

use serde_json::json;
use tracing::debug;

use smcread::config::{load_config, load_config_from};
use smcread::logger;
use smcread::{Key, Metric, SensorReader, SizePolicy, SystemController, TypeTag};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
enum CliError {
    #[error("unknown argument: {0}")]
    UnknownArgument(String),
    #[error("{0} requires a value")]
    MissingValue(&'static str),
    #[error("invalid metric {0:?} (expected c, f or k)")]
    InvalidMetric(String),
    #[error("no keys given")]
    NoKeys,
}

#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    help: bool,
    logging: bool,
    json: bool,
    strict: bool,
    cpu_temp: bool,
    metric: Option<Metric>,
    config: Option<PathBuf>,
    keys: Vec<String>,
}

fn parse_args(args: &[String]) -> Result<CliArgs, CliError> {
    let mut out = CliArgs::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => out.help = true,
            "--logging" => out.logging = true,
            "--json" => out.json = true,
            "--strict" => out.strict = true,
            "--cpu-temp" => out.cpu_temp = true,
            "--metric" => {
                i += 1;
                let value = args.get(i).ok_or(CliError::MissingValue("--metric"))?;
                let metric = value
                    .parse::<Metric>()
                    .map_err(|_| CliError::InvalidMetric(value.clone()))?;
                out.metric = Some(metric);
            }
            "--config" => {
                i += 1;
                let value = args.get(i).ok_or(CliError::MissingValue("--config"))?;
                out.config = Some(PathBuf::from(value));
            }
            arg if arg.starts_with("--") => return Err(CliError::UnknownArgument(arg.to_string())),
            key => out.keys.push(key.to_string()),
        }
        i += 1;
    }
    if !out.help && !out.cpu_temp && out.keys.is_empty() {
        return Err(CliError::NoKeys);
    }
    Ok(out)
}

fn print_help() {
    println!("smcread {}", env!("CARGO_PKG_VERSION"));
    println!("Read SMC sensor keys and print their decoded values.");
    println!();
    println!("USAGE:");
    println!("    smcread [OPTIONS] KEY...");
    println!("    smcread [OPTIONS] --cpu-temp");
    println!();
    println!("OPTIONS:");
    println!("    --cpu-temp        Print the CPU temperature aggregate");
    println!("    --metric UNIT     Temperature unit: c, f or k");
    println!("    --config PATH     Read configuration from PATH");
    println!("    --strict          Fail reads whose fetched size disagrees with the key info");
    println!("    --json            Print JSON instead of text");
    println!("    --logging         Append events to the JSON-lines event log");
    println!("    -h, --help        Show this help");
    println!();
    println!("ENVIRONMENT:");
    println!("    SMCREAD_LOG       tracing filter (default: warn)");
}

fn main() -> anyhow::Result<()> {
    let log_level = std::env::var("SMCREAD_LOG").unwrap_or_else(|_| "warn".to_string());
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_env_filter(&log_level)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_help();
            std::process::exit(1);
        }
    };
    if cli.help {
        print_help();
        return Ok(());
    }

    let mut cfg = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    if let Some(metric) = cli.metric {
        cfg.metric = metric;
    }
    if cli.strict {
        cfg.size_policy = SizePolicy::Strict;
    }

    if cli.logging {
        logger::init_logging();
        logger::log_event("startup", json!({ "args": args }));
    }

    let invalid: Vec<&String> = cli.keys.iter().filter(|k| Key::new(k).is_err()).collect();
    if !invalid.is_empty() {
        for key in &invalid {
            eprintln!("Error: invalid key {:?}: keys are exactly 4 ASCII characters", key);
        }
        if cli.logging {
            logger::log_event("invalid_keys", json!({ "keys": invalid }));
        }
        std::process::exit(1);
    }

    let reader = SensorReader::new(SystemController::new()).with_size_policy(cfg.size_policy);

    if cli.cpu_temp {
        let temp = reader.cpu_temperature(&cfg.cpu_keys);
        if cli.logging {
            logger::log_event("cpu_temperature", json!(temp));
        }
        let convert = |c: f64| cfg.metric.convert_temp(c).0;
        let main = temp.main.map(convert);
        let max = temp.max.map(convert);
        let cores: Vec<f64> = temp.cores.iter().copied().map(convert).collect();
        let (_, unit) = cfg.metric.convert_temp(0.0);
        if cli.json {
            println!("{}", json!({ "main": main, "cores": cores, "max": max, "unit": unit }));
        } else {
            let show = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{:.2}{}", v, unit));
            println!("main   {}", show(main));
            println!("max    {}", show(max));
            for (i, c) in cores.iter().enumerate() {
                println!("core{}  {:.2}{}", i + 1, c, unit);
            }
        }
        return Ok(());
    }

    let mut results = serde_json::Map::new();
    for name in &cli.keys {
        let (value, unit) = match reader.read(name) {
            Ok(reading) if reading.data_type == TypeTag::SP78.to_string() => {
                cfg.metric.convert_temp(reading.value)
            }
            Ok(reading) => (reading.value, ""),
            Err(e) => {
                debug!(key = %name, error = %e, "read failed");
                (0.0, "")
            }
        };
        if cli.logging {
            logger::log_event("read", json!({ "key": name, "value": value }));
        }
        if cli.json {
            results.insert(name.clone(), json!(value));
        } else {
            println!("{}  {}{}", name, value, unit);
        }
    }
    if cli.json {
        println!("{}", serde_json::Value::Object(results));
    }
    Ok(())
}
