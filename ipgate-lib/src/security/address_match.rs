use ipnet::IpNet;
use std::net::IpAddr;

/// Check whether `candidate` is covered by an allow-list `reference` entry
///
/// The reference is either a single address (`"10.0.0.5"`, `"::1"`) or a CIDR
/// range (`"10.0.0.0/24"`, `"2001:db8::/32"`). Addresses are compared
/// canonically, so an IPv4 address and its IPv4-mapped IPv6 form are equal.
///
/// Never fails: an unparsable candidate or a reference that is neither an
/// address nor a range yields `false`.
pub fn matches(reference: &str, candidate: &str) -> bool {
    let Ok(candidate) = candidate.parse::<IpAddr>() else {
        return false;
    };
    let candidate = candidate.to_canonical();

    if let Ok(addr) = reference.parse::<IpAddr>() {
        return addr.to_canonical() == candidate;
    }

    match reference.parse::<IpNet>() {
        Ok(net) => network_contains(&net, candidate),
        Err(_) => false,
    }
}

/// Returns `true` if `entry` can ever match, i.e. it parses as an address or a range
pub fn is_valid_entry(entry: &str) -> bool {
    entry.parse::<IpAddr>().is_ok() || entry.parse::<IpNet>().is_ok()
}

fn network_contains(net: &IpNet, candidate: IpAddr) -> bool {
    match (net, candidate) {
        // Only ranges inside ::ffff:0:0/96 cover IPv4 peers; `::/0` does not
        (IpNet::V6(v6), IpAddr::V4(v4)) if v6.network().to_ipv4_mapped().is_some() => {
            v6.contains(&v4.to_ipv6_mapped())
        }
        _ => net.contains(&candidate),
    }
}
