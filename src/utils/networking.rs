use crate::services::hookenv;
use crate::utils::exec::CommandExecutor;
use anyhow::{Context, Result};
use std::net::{Ipv4Addr, SocketAddr, ToSocketAddrs};
use tracing::debug;

/// Name resolution seam so lookups can be replaced in tests
pub trait Resolver {
    /// IPv4 (A record) addresses for a hostname, in resolver order
    fn lookup_ipv4(&self, hostname: &str) -> Result<Vec<Ipv4Addr>>;
}

/// Resolver backed by the system's configured name service
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl Resolver for SystemResolver {
    fn lookup_ipv4(&self, hostname: &str) -> Result<Vec<Ipv4Addr>> {
        let addrs = (hostname, 0)
            .to_socket_addrs()
            .with_context(|| format!("Failed to resolve host: {}", hostname))?;

        let mut ips = Vec::new();
        for addr in addrs {
            if let SocketAddr::V4(v4) = addr {
                if !ips.contains(v4.ip()) {
                    ips.push(*v4.ip());
                }
            }
        }
        Ok(ips)
    }
}

/// Parse an IPv4 address in any form `inet_aton` accepts
///
/// One to four parts separated by dots, each decimal, octal (leading `0`) or
/// hex (`0x`). Every part but the last is one byte; the last fills the rest,
/// so `127.1` is `127.0.0.1` and `10` is `0.0.0.10`.
pub fn parse_inet_aton(text: &str) -> Option<Ipv4Addr> {
    let parts: Vec<u32> = text
        .split('.')
        .map(parse_inet_part)
        .collect::<Option<Vec<_>>>()?;
    if parts.is_empty() || parts.len() > 4 {
        return None;
    }

    let (last, leading) = parts.split_last()?;
    let mut addr: u32 = 0;
    for (i, part) in leading.iter().enumerate() {
        if *part > 0xff {
            return None;
        }
        addr |= *part << (24 - 8 * i);
    }

    let last_bits = 32 - 8 * leading.len() as u32;
    if last_bits < 32 && *last >= 1u32 << last_bits {
        return None;
    }
    Some(Ipv4Addr::from(addr | last))
}

fn parse_inet_part(part: &str) -> Option<u32> {
    if part.is_empty() {
        return None;
    }
    let (digits, radix) = if let Some(hex) = part
        .strip_prefix("0x")
        .or_else(|| part.strip_prefix("0X"))
    {
        (hex, 16)
    } else if part.len() > 1 && part.starts_with('0') {
        (&part[1..], 8)
    } else {
        (part, 10)
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    u32::from_str_radix(digits, radix).ok()
}

/// Check if a string is an IPv4 literal (including `inet_aton` shorthand)
pub fn is_ipv4_literal(hostname: &str) -> bool {
    parse_inet_aton(hostname).is_some()
}

/// Resolve a hostname to an IPv4 address
///
/// IPv4 literals come back unchanged without touching the resolver. Anything
/// else is looked up and the first address returned, or `None` if the lookup
/// found no IPv4 address.
pub fn get_host_ip<R: Resolver + ?Sized>(resolver: &R, hostname: &str) -> Result<Option<String>> {
    if is_ipv4_literal(hostname) {
        return Ok(Some(hostname.to_string()));
    }

    let answers = resolver.lookup_ipv4(hostname)?;
    debug!(hostname, answers = answers.len(), "resolved host");
    Ok(answers.first().map(|ip| ip.to_string()))
}

/// Resolve this unit's `private-address` to an IPv4 address
pub fn get_unit_ip<E: CommandExecutor, R: Resolver + ?Sized>(
    exec: &E,
    resolver: &R,
) -> Result<Option<String>> {
    match hookenv::unit_get(exec, "private-address")? {
        Some(address) => get_host_ip(resolver, &address),
        None => Ok(None),
    }
}
