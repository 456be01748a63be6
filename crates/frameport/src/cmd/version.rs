use frameport_channel::events::{event_group, PROTOCOL_EVENTS};

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("frameport {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: frameport");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("FRAMEPORT_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("features: host={}, cli=true", cfg!(feature = "host"));
    println!("transports: memory");
    println!("protocol_events:");
    for line in protocol_lines() {
        println!("  {line}");
    }

    Ok(SUCCESS)
}

fn protocol_lines() -> Vec<String> {
    PROTOCOL_EVENTS
        .iter()
        .map(|event| format!("{:<20} {event}", event_group(event)))
        .collect()
}
