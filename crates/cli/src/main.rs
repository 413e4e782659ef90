//! # CLI - metrics item shell
//!
//! A REPL-style shell that builds one metrics item at a time, moves it through
//! either wire format, and submits it. Commands are read from stdin and
//! replies printed to stdout, so the shell works interactively and scripted.
//!
//! ## Commands
//!
//! ```text
//! KEY key                 Set the item key
//! PID n | UID n | TS n    Set an identity field
//! PKG name version        Set the package name and version code
//! SET name type [value]   Set a property (type: none int32 int64 double rate string)
//! ADD name type value     Accumulate into a property (rates are count/duration)
//! GET name                Print "type value" or "(nil)"
//! DEL name                Remove a property
//! FILTER name..           Remove the listed properties
//! KEEP name..             Remove every property not listed
//! SHOW                    Print the textual form of the item
//! CLEAR                   Drop the key and all properties
//! ENCODE path             Write the item in byte-string form
//! DECODE path             Replace the item with one read from a byte string
//! MERGE path              Merge a byte-string item into the current one
//! PARCEL path             Write the item in parcel form
//! UNPARCEL path           Replace the item with one read from a parcel
//! SUBMIT                  Deliver the item to the recording service
//! RESET                   Drop the service binding and restore lookup attempts
//! EXIT / QUIT             Leave the shell
//! ```
//!
//! ## Configuration
//!
//! Delivery settings come from the `config` crate (`MEDIAMETRICS_ENABLED`,
//! `MEDIAMETRICS_ENABLED_PERSIST`, `MEDIAMETRICS_BIND_ATTEMPTS`,
//! `MEDIAMETRICS_SERVICE_NAME`). The shell additionally reads:
//!
//! ```text
//! MEDIAMETRICS_SPOOL_DIR  Directory standing in for the service (default: unset, SUBMIT fails)
//! RUST_LOG                Log filter for stderr diagnostics   (default: "info")
//! ```
//!
//! ## Example
//!
//! ```text
//! $ MEDIAMETRICS_SPOOL_DIR=/tmp/spool cargo run -p cli
//! > KEY audio.track
//! OK
//! > SET channels int32 2
//! OK
//! > SHOW
//! [1:audio.track:0:0:0::1:channels=2:]
//! > SUBMIT
//! OK
//! > EXIT
//! bye
//! ```

mod logging;
mod spool;

use anyhow::{anyhow, bail, Context, Result};
use config::MetricsConfig;
use item::{Item, PropType, Value};
use parcel::Parcel;
use service::ServiceConnection;
use spool::SpoolLocator;
use std::fmt;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

const ENV_SPOOL_DIR: &str = "MEDIAMETRICS_SPOOL_DIR";

/// Reads a configuration value from the environment, falling back to `default`.
fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn main() -> Result<()> {
    logging::init();

    let config = MetricsConfig::from_env()?;
    let spool_dir = env_or(ENV_SPOOL_DIR, "");
    let locator = SpoolLocator::new((!spool_dir.is_empty()).then(|| PathBuf::from(&spool_dir)));
    let conn = ServiceConnection::new(config.clone(), Arc::new(locator));
    let mut item = Item::default();

    println!(
        "mediametrics shell started (enabled={}, service={}, attempts={}, spool={})",
        config.enabled,
        config.service_name,
        config.bind_attempts,
        if spool_dir.is_empty() { "-" } else { &spool_dir }
    );
    println!("Commands: KEY | PID | UID | TS | PKG | SET | ADD | GET | DEL | FILTER | KEEP");
    println!("          SHOW | CLEAR | ENCODE | DECODE | MERGE | PARCEL | UNPARCEL");
    println!("          SUBMIT | RESET | EXIT");
    print!("> ");
    io::stdout().flush().ok();

    let stdin = io::stdin();

    for line in stdin.lock().lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        if let Some(cmd) = parts.next() {
            let cmd = cmd.to_uppercase();
            if cmd == "EXIT" || cmd == "QUIT" {
                println!("bye");
                break;
            }
            let args: Vec<&str> = parts.collect();
            match execute(&mut item, &conn, &cmd, &args) {
                Ok(reply) => println!("{}", reply),
                Err(e) => println!("ERR {:#}", e),
            }
        }

        print!("> ");
        io::stdout().flush().ok();
    }

    Ok(())
}

/// Runs one command against the current item and returns the reply line.
fn execute(item: &mut Item, conn: &ServiceConnection, cmd: &str, args: &[&str]) -> Result<String> {
    let ok = || Ok("OK".to_string());
    match cmd {
        "KEY" => {
            let [key] = args else { bail!("usage: KEY key") };
            item.set_key(*key);
            ok()
        }
        "PID" => {
            let [pid] = args else { bail!("usage: PID pid") };
            item.set_pid(parse_arg(pid, "pid")?);
            ok()
        }
        "UID" => {
            let [uid] = args else { bail!("usage: UID uid") };
            item.set_uid(parse_arg(uid, "uid")?);
            ok()
        }
        "TS" => {
            let [ts] = args else { bail!("usage: TS timestamp") };
            item.set_timestamp(parse_arg(ts, "timestamp")?);
            ok()
        }
        "PKG" => {
            let [name, version] = args else { bail!("usage: PKG name version") };
            let version = parse_arg(version, "version code")?;
            item.set_pkg_name(*name).set_pkg_version_code(version);
            ok()
        }
        "SET" => {
            let [name, ty, raw @ ..] = args else { bail!("usage: SET name type [value]") };
            item.set_value(name, parse_value(ty, raw)?)?;
            ok()
        }
        "ADD" => {
            let [name, ty, raw @ ..] = args else { bail!("usage: ADD name type value") };
            item.add_value(name, parse_value(ty, raw)?)?;
            ok()
        }
        "GET" => {
            let [name] = args else { bail!("usage: GET name") };
            Ok(match item.get_prop(name) {
                Some(prop) => describe(prop.value()),
                None => "(nil)".to_string(),
            })
        }
        "DEL" => {
            let [name] = args else { bail!("usage: DEL name") };
            if item.remove_prop(name) {
                ok()
            } else {
                Ok("(nil)".to_string())
            }
        }
        "FILTER" => {
            if args.is_empty() {
                bail!("usage: FILTER name..");
            }
            Ok(format!("OK (removed {})", item.filter(args)))
        }
        "KEEP" => {
            if args.is_empty() {
                bail!("usage: KEEP name..");
            }
            Ok(format!("OK (removed {})", item.filter_not(args)))
        }
        "SHOW" => Ok(item.to_string()),
        "CLEAR" => {
            item.clear();
            ok()
        }
        "ENCODE" => {
            let [path] = args else { bail!("usage: ENCODE path") };
            let buf = bytestring::write_to_byte_string(item)?;
            fs::write(path, &buf).with_context(|| format!("cannot write {}", path))?;
            Ok(format!("OK ({} bytes)", buf.len()))
        }
        "DECODE" => {
            let [path] = args else { bail!("usage: DECODE path") };
            let buf = fs::read(path).with_context(|| format!("cannot read {}", path))?;
            *item = bytestring::read_from_byte_string(&buf)?;
            Ok(format!("OK ({} properties)", item.prop_count()))
        }
        "MERGE" => {
            let [path] = args else { bail!("usage: MERGE path") };
            let buf = fs::read(path).with_context(|| format!("cannot read {}", path))?;
            let incoming = bytestring::read_from_byte_string(&buf)?;
            item.merge(&incoming)?;
            Ok(format!("OK ({} properties)", item.prop_count()))
        }
        "PARCEL" => {
            let [path] = args else { bail!("usage: PARCEL path") };
            let mut p = Parcel::new();
            parcel::write_to_parcel(item, &mut p)?;
            fs::write(path, p.as_bytes()).with_context(|| format!("cannot write {}", path))?;
            Ok(format!("OK ({} bytes)", p.data_size()))
        }
        "UNPARCEL" => {
            let [path] = args else { bail!("usage: UNPARCEL path") };
            let buf = fs::read(path).with_context(|| format!("cannot read {}", path))?;
            let mut p = Parcel::from_bytes(buf);
            *item = parcel::read_from_parcel(&mut p)?;
            Ok(format!("OK ({} properties)", item.prop_count()))
        }
        "SUBMIT" => {
            if conn.self_record(item) {
                ok()
            } else {
                bail!("delivery unavailable")
            }
        }
        "RESET" => {
            conn.reset();
            ok()
        }
        other => Ok(format!("unknown command: {}", other)),
    }
}

fn parse_arg<T>(raw: &str, what: &str) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.parse()
        .map_err(|e| anyhow!("invalid {} {:?}: {}", what, raw, e))
}

fn parse_type(name: &str) -> Result<PropType> {
    const TYPES: [PropType; 6] = [
        PropType::None,
        PropType::Int32,
        PropType::Int64,
        PropType::Double,
        PropType::Rate,
        PropType::CString,
    ];
    TYPES
        .into_iter()
        .find(|t| t.name().eq_ignore_ascii_case(name))
        .ok_or_else(|| anyhow!("unknown type {:?}", name))
}

/// Builds a value of type `ty` from the remaining command words. Strings take
/// every word (joined by single spaces), rates are written `count/duration`.
fn parse_value(ty: &str, raw: &[&str]) -> Result<Value> {
    let ty = parse_type(ty)?;
    let single = || match raw {
        [v] => Ok(*v),
        _ => Err(anyhow!("{} takes exactly one value", ty)),
    };
    Ok(match ty {
        PropType::None => {
            if !raw.is_empty() {
                bail!("none takes no value");
            }
            Value::None
        }
        PropType::Int32 => Value::Int32(parse_arg(single()?, "int32")?),
        PropType::Int64 => Value::Int64(parse_arg(single()?, "int64")?),
        PropType::Double => Value::Double(parse_arg(single()?, "double")?),
        PropType::Rate => {
            let (count, duration) = single()?
                .split_once('/')
                .ok_or_else(|| anyhow!("rate must be written count/duration"))?;
            Value::Rate(parse_arg(count, "count")?, parse_arg(duration, "duration")?)
        }
        PropType::CString => Value::CString(raw.join(" ")),
    })
}

fn describe(value: &Value) -> String {
    let ty = value.prop_type();
    match value {
        Value::None => ty.to_string(),
        Value::Int32(v) => format!("{} {}", ty, v),
        Value::Int64(v) => format!("{} {}", ty, v),
        Value::Double(v) => format!("{} {}", ty, item::format_double(*v)),
        Value::Rate(n, d) => format!("{} {}/{}", ty, n, d),
        Value::CString(s) => format!("{} {}", ty, s),
    }
}
