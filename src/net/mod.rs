//! Host name and address lookups for tests that address cluster nodes.

use std::io;
use std::net::{IpAddr, ToSocketAddrs};

use crate::error::{HarnessError, Result};
use crate::shell;

/// Name of the machine the harness runs on.
pub fn local_hostname() -> Result<String> {
    let output = shell::run_program("hostname", &[])?;
    Ok(output.stdout.trim().to_string())
}

/// First IPv4 address the local host name resolves to.
pub fn local_ip() -> Result<IpAddr> {
    ip_by_name(&local_hostname()?)
}

/// Resolves `name`, preferring an IPv4 address.
pub fn ip_by_name(name: &str) -> Result<IpAddr> {
    let addrs: Vec<IpAddr> = (name, 0)
        .to_socket_addrs()
        .map_err(|source| HarnessError::Resolve {
            name: name.to_string(),
            source,
        })?
        .map(|addr| addr.ip())
        .collect();

    addrs
        .iter()
        .find(|ip| ip.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or_else(|| HarnessError::Resolve {
            name: name.to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "no address"),
        })
}

/// Canonical host name for `ip` from the system resolver, `None` if unknown.
pub fn remote_hostname(ip: &str) -> Result<Option<String>> {
    let output = shell::run_program("getent", &["hosts", ip])?;
    Ok(parse_getent_hosts(&output.stdout))
}

fn parse_getent_hosts(raw: &str) -> Option<String> {
    raw.lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .map(str::to_string)
}
