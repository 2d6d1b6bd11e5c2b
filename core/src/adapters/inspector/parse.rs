//! Parsers for the output of the lookup tools the adapters run.
//!
//! Compiled on every platform so the formats are covered by tests
//! regardless of where they run.

use std::sync::OnceLock;

use regex::Regex;

/// Parse an address:port string.
///
/// Handles multiple address formats:
/// - IPv4: "127.0.0.1:3000" or "*:8080"
/// - IPv6: "\[::1]:3000" or "\[fe80::1]:8080"
/// - Scoped: "127.0.0.53%lo:53"
pub fn parse_address(address: &str) -> Option<(String, u16)> {
    if address.starts_with('[') {
        let bracket_end = address.find(']')?;
        if bracket_end + 1 >= address.len() || address.as_bytes()[bracket_end + 1] != b':' {
            return None;
        }
        let addr = &address[..=bracket_end];
        let port: u16 = address[bracket_end + 2..].parse().ok()?;
        Some((addr.to_string(), port))
    } else {
        let last_colon = address.rfind(':')?;
        let addr = &address[..last_colon];
        let port: u16 = address[last_colon + 1..].parse().ok()?;
        let addr = if addr.is_empty() { "*" } else { addr };
        Some((addr.to_string(), port))
    }
}

/// Parse `lsof -t` output: one PID per line.
pub fn parse_lsof_pids(output: &str) -> Vec<u32> {
    let mut pids: Vec<u32> = output
        .lines()
        .filter_map(|line| line.trim().parse().ok())
        .collect();
    pids.sort_unstable();
    pids.dedup();
    pids
}

fn ss_pid_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // The pattern is a literal; compilation cannot fail.
    RE.get_or_init(|| Regex::new(r"pid=(\d+)").unwrap())
}

/// Listeners on one port as reported by `ss -Htlnp`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SsListeners {
    /// Owning PIDs, sorted and deduplicated.
    pub pids: Vec<u32>,
    /// A listener on the port had no owner in the users column.
    pub unattributed: bool,
}

impl SsListeners {
    pub fn is_listening(&self) -> bool {
        self.unattributed || !self.pids.is_empty()
    }
}

/// Parse `ss -Htlnp` output, keeping listeners on `port`.
///
/// ```text
/// LISTEN 0 511 0.0.0.0:9009 0.0.0.0:* users:(("node",pid=1234,fd=19),("node",pid=1235,fd=19))
/// ```
///
/// Without privileges ss leaves the users column out for sockets owned by
/// other users; such rows set `unattributed`.
pub fn parse_ss_listeners(output: &str, port: u16) -> SsListeners {
    let mut listeners = SsListeners::default();

    for line in output.lines() {
        let components: Vec<&str> = line.split_whitespace().collect();
        if components.len() < 5 {
            continue;
        }

        match parse_address(components[3]) {
            Some((_, p)) if p == port => {}
            _ => continue,
        }

        let users = components[5..].join(" ");
        let before = listeners.pids.len();
        listeners.pids.extend(
            ss_pid_regex()
                .captures_iter(&users)
                .filter_map(|caps| caps[1].parse::<u32>().ok()),
        );
        if listeners.pids.len() == before {
            listeners.unattributed = true;
        }
    }

    listeners.pids.sort_unstable();
    listeners.pids.dedup();
    listeners
}

/// Parse `netstat -ano` output (Windows), keeping listeners on `port`.
///
/// ```text
///   Proto  Local Address          Foreign Address        State           PID
///   TCP    0.0.0.0:9009           0.0.0.0:0              LISTENING       1234
/// ```
pub fn parse_netstat_pids(output: &str, port: u16) -> Vec<u32> {
    let mut pids = Vec::new();

    for line in output.lines() {
        let columns: Vec<&str> = line.split_whitespace().collect();
        if columns.len() < 5 || !columns[0].eq_ignore_ascii_case("tcp") {
            continue;
        }
        if !columns[3].eq_ignore_ascii_case("listening") {
            continue;
        }

        match parse_address(columns[1]) {
            Some((_, p)) if p == port => {}
            _ => continue,
        }

        if let Ok(pid) = columns[4].parse::<u32>() {
            pids.push(pid);
        }
    }

    pids.sort_unstable();
    pids.dedup();
    pids
}

/// Whether `tasklist /FI "PID eq <pid>" /NH /FO CSV` output lists `pid`.
///
/// ```text
/// "node.exe","1234","Console","1","45,120 K"
/// ```
///
/// The PID column is compared whole, so 12 does not match a row for 1234.
pub fn parse_tasklist_has_pid(output: &str, pid: u32) -> bool {
    output.lines().any(|line| {
        line.split(',')
            .nth(1)
            .map(|column| column.trim().trim_matches('"'))
            .and_then(|column| column.parse::<u32>().ok())
            == Some(pid)
    })
}
