//! Minimal interactive client: connects to a bsmp server, runs discovery,
//! and executes one command against it. Mirrors `gen_keys`'s one-shot,
//! read-args-then-act shape rather than a REPL.

use bsmp::client::{Session, Transport};
use bsmp::wire::HEADER_SIZE;
use clap::{App, Arg, SubCommand};
use std::io::{self, Read, Write};
use std::net::TcpStream;

struct TcpTransport(TcpStream);

impl TcpTransport {
    fn connect(address: &str) -> io::Result<TcpTransport> {
        Ok(TcpTransport(TcpStream::connect(address)?))
    }
}

impl Transport for TcpTransport {
    fn send(&mut self, bytes: &[u8]) -> bool {
        self.0.write_all(bytes).is_ok()
    }

    fn recv(&mut self, buf: &mut [u8]) -> Option<usize> {
        let mut header = [0u8; HEADER_SIZE];
        self.0.read_exact(&mut header).ok()?;
        let payload_len = u16::from_be_bytes([header[1], header[2]]) as usize;
        if buf.len() < HEADER_SIZE + payload_len {
            return None;
        }
        buf[..HEADER_SIZE].copy_from_slice(&header);
        self.0
            .read_exact(&mut buf[HEADER_SIZE..HEADER_SIZE + payload_len])
            .ok()?;
        Some(HEADER_SIZE + payload_len)
    }
}

fn parse_hex(text: &str) -> Vec<u8> {
    text.as_bytes()
        .chunks(2)
        .map(|pair| u8::from_str_radix(std::str::from_utf8(pair).unwrap(), 16).expect("invalid hex byte"))
        .collect()
}

fn main() {
    let matches = App::new("bsmp-cli")
        .version("1.0")
        .about("Drives a bsmp server over TCP.")
        .arg(
            Arg::with_name("ADDRESS")
                .help("host:port of the server to connect to")
                .required(true),
        )
        .subcommand(SubCommand::with_name("version").about("prints the server version"))
        .subcommand(SubCommand::with_name("vars").about("lists discovered variables"))
        .subcommand(
            SubCommand::with_name("read")
                .about("reads one variable")
                .arg(Arg::with_name("ID").required(true)),
        )
        .subcommand(
            SubCommand::with_name("write")
                .about("writes one variable")
                .arg(Arg::with_name("ID").required(true))
                .arg(Arg::with_name("HEX").help("hex-encoded bytes to write").required(true)),
        )
        .get_matches();

    let address = matches.value_of("ADDRESS").unwrap();
    let transport = TcpTransport::connect(address)
        .unwrap_or_else(|err| panic!("failed to connect to {}: {}", address, err));
    let mut session = Session::new(transport);
    session.init().expect("discovery failed");

    match matches.subcommand() {
        ("version", _) => {
            let version = session.version();
            println!("{}.{}.{} ({})", version.major, version.minor, version.revision, version.text);
        }
        ("vars", _) => {
            for descriptor in session.get_vars() {
                println!(
                    "id={} size={} writable={}",
                    descriptor.id.0, descriptor.size, descriptor.writable
                );
            }
        }
        ("read", Some(sub)) => {
            let id: u8 = sub.value_of("ID").unwrap().parse().expect("ID must be a byte");
            let descriptor = session
                .get_vars()
                .iter()
                .find(|d| d.id.0 == id)
                .unwrap_or_else(|| panic!("no such variable: {}", id))
                .clone();
            let bytes = session.read_var(&descriptor).expect("read failed");
            println!("{}", bytes.iter().map(|b| format!("{:02x}", b)).collect::<String>());
        }
        ("write", Some(sub)) => {
            let id: u8 = sub.value_of("ID").unwrap().parse().expect("ID must be a byte");
            let bytes = parse_hex(sub.value_of("HEX").unwrap());
            let descriptor = session
                .get_vars()
                .iter()
                .find(|d| d.id.0 == id)
                .unwrap_or_else(|| panic!("no such variable: {}", id))
                .clone();
            session.write_var(&descriptor, &bytes).expect("write failed");
        }
        _ => {
            eprintln!("no command given; see --help");
        }
    }
}
