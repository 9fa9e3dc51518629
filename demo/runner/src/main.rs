//! Serves the sample catalogue over TCP. One connection at a time, one
//! request fully handled before the next is read, per the engine's
//! single-threaded dispatch contract.

use bsmp::wire::{HEADER_SIZE, MAX_MESSAGE};
use bsmp_support::config::InstrumentConfig;
use bsmp_support::logging::{info, warn};
use clap::{App, Arg};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;

fn main() {
    let matches = App::new("demo-runner")
        .version("1.0")
        .about("Serves the sample bsmp catalogue over TCP.")
        .arg(
            Arg::with_name("CONFIG")
                .help("Path to an instrument.toml config file")
                .required(false),
        )
        .get_matches();

    let config = match matches.value_of("CONFIG") {
        Some(path) if Path::new(path).exists() => InstrumentConfig::load(path),
        _ => InstrumentConfig::default(),
    };

    let log = bsmp_support::logging::default_logger(config.severity());
    let mut server = demo_catalogue::build_demo_server().with_logger(log.clone());

    let listener = TcpListener::bind(&config.transport.address)
        .unwrap_or_else(|err| panic!("failed to bind {}: {}", config.transport.address, err));
    info!(log, "listening"; "address" => &config.transport.address);

    for stream in listener.incoming() {
        match stream {
            Ok(stream) => serve(&mut server, stream, &log),
            Err(err) => warn!(log, "accept failed"; "error" => %err),
        }
    }
}

/// Serve one connection to completion: read a 3-byte header, then the
/// declared payload, dispatch it, write the reply, repeat until the peer
/// closes the stream.
fn serve(server: &mut bsmp::Server, mut stream: TcpStream, log: &bsmp_support::logging::Logger) {
    let peer = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".into());
    info!(log, "connection opened"; "peer" => &peer);

    let mut header = [0u8; HEADER_SIZE];
    loop {
        if stream.read_exact(&mut header).is_err() {
            break;
        }
        let payload_len = u16::from_be_bytes([header[1], header[2]]) as usize;

        let mut request = vec![0u8; HEADER_SIZE + payload_len];
        request[..HEADER_SIZE].copy_from_slice(&header);
        if stream.read_exact(&mut request[HEADER_SIZE..]).is_err() {
            break;
        }

        let mut response = vec![0u8; MAX_MESSAGE];
        let len = match server.process_packet(&request, &mut response) {
            Ok(len) => len,
            Err(err) => {
                warn!(log, "dispatch refused the request"; "error" => ?err);
                break;
            }
        };

        if stream.write_all(&response[..len]).is_err() {
            break;
        }
    }

    info!(log, "connection closed"; "peer" => &peer);
}
