//! Local classification of IP addresses.
//!
//! Nothing in here touches the network. Invalid input yields `false` or
//! `None`, never an error.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Network kind and a short human description for a non-public address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
  pub network_type: &'static str,
  pub description: &'static str,
}

const LOOPBACK: Classification = Classification {
  network_type: "Loopback",
  description: "localhost/loopback address",
};

const LINK_LOCAL: Classification = Classification {
  network_type: "Link-Local",
  description: "automatically assigned local address",
};

const PRIVATE_GENERIC: Classification = Classification {
  network_type: "Private",
  description: "private network address",
};

/// RFC 1918 blocks, checked in order.
const PRIVATE_BLOCKS: [(Ipv4Addr, u8, Classification); 3] = [
  (
    Ipv4Addr::new(10, 0, 0, 0),
    8,
    Classification {
      network_type: "Private Class A",
      description: "large private network (10.0.0.0/8)",
    },
  ),
  (
    Ipv4Addr::new(172, 16, 0, 0),
    12,
    Classification {
      network_type: "Private Class B",
      description: "medium private network (172.16.0.0/12)",
    },
  ),
  (
    Ipv4Addr::new(192, 168, 0, 0),
    16,
    Classification {
      network_type: "Private Class C",
      description: "small private network (192.168.0.0/16)",
    },
  ),
];

/// Non-routable IPv4 space outside RFC 1918 that still counts as private.
/// Loopback and link-local are checked separately.
const OTHER_PRIVATE_V4: [(Ipv4Addr, u8); 9] = [
  (Ipv4Addr::new(0, 0, 0, 0), 8),
  (Ipv4Addr::new(192, 0, 0, 0), 29),
  (Ipv4Addr::new(192, 0, 0, 170), 31),
  (Ipv4Addr::new(192, 0, 2, 0), 24),
  (Ipv4Addr::new(198, 18, 0, 0), 15),
  (Ipv4Addr::new(198, 51, 100, 0), 24),
  (Ipv4Addr::new(203, 0, 113, 0), 24),
  (Ipv4Addr::new(240, 0, 0, 0), 4),
  (Ipv4Addr::new(255, 255, 255, 255), 32),
];

/// Private IPv6 space: unspecified, translation and benchmarking prefixes,
/// documentation and unique-local.
const PRIVATE_V6: [(Ipv6Addr, u8); 8] = [
  (Ipv6Addr::UNSPECIFIED, 128),
  (Ipv6Addr::new(0, 0, 0, 0, 0, 0xffff, 0, 0), 96),
  (Ipv6Addr::new(0x64, 0xff9b, 1, 0, 0, 0, 0, 0), 48),
  (Ipv6Addr::new(0x100, 0, 0, 0, 0, 0, 0, 0), 64),
  (Ipv6Addr::new(0x2001, 0, 0, 0, 0, 0, 0, 0), 23),
  (Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 0), 32),
  (Ipv6Addr::new(0x2001, 0x10, 0, 0, 0, 0, 0, 0), 28),
  (Ipv6Addr::new(0xfc00, 0, 0, 0, 0, 0, 0, 0), 7),
];

/// Neither private nor routable: shared address space and the rest of the
/// IETF protocol block. Multicast is checked separately.
const RESERVED_V4: [(Ipv4Addr, u8); 2] = [
  (Ipv4Addr::new(100, 64, 0, 0), 10),
  (Ipv4Addr::new(192, 0, 0, 0), 24),
];

fn in_v4_block(addr: Ipv4Addr, network: Ipv4Addr, prefix: u8) -> bool {
  let mask = u32::MAX
    .checked_shl(32 - u32::from(prefix))
    .unwrap_or(0);
  u32::from(addr) & mask == u32::from(network) & mask
}

fn in_v6_block(addr: Ipv6Addr, network: Ipv6Addr, prefix: u8) -> bool {
  let mask = u128::MAX
    .checked_shl(128 - u32::from(prefix))
    .unwrap_or(0);
  u128::from(addr) & mask == u128::from(network) & mask
}

/// Strict parse: surrounding whitespace makes the input invalid.
fn parse(ip: &str) -> Option<IpAddr> {
  let addr = ip.parse::<IpAddr>().ok()?;
  // ::ffff:a.b.c.d is judged by its embedded IPv4 address.
  Some(match addr {
    IpAddr::V6(v6) => v6.to_ipv4_mapped().map_or(addr, IpAddr::V4),
    IpAddr::V4(_) => addr,
  })
}

const fn is_v6_link_local(addr: Ipv6Addr) -> bool {
  (addr.segments()[0] & 0xffc0) == 0xfe80
}

fn is_loopback(addr: IpAddr) -> bool {
  addr.is_loopback()
}

fn is_link_local(addr: IpAddr) -> bool {
  match addr {
    IpAddr::V4(v4) => v4.is_link_local(),
    IpAddr::V6(v6) => is_v6_link_local(v6),
  }
}

fn is_private(addr: IpAddr) -> bool {
  match addr {
    IpAddr::V4(v4) => {
      v4.is_private()
        || OTHER_PRIVATE_V4
          .iter()
          .any(|&(net, prefix)| in_v4_block(v4, net, prefix))
    }
    IpAddr::V6(v6) => PRIVATE_V6
      .iter()
      .any(|&(net, prefix)| in_v6_block(v6, net, prefix)),
  }
}

fn is_special_purpose(addr: IpAddr) -> bool {
  match addr {
    IpAddr::V4(v4) => {
      v4.is_multicast()
        || RESERVED_V4
          .iter()
          .any(|&(net, prefix)| in_v4_block(v4, net, prefix))
    }
    IpAddr::V6(v6) => v6.is_multicast(),
  }
}

/// Returns `true` if `ip` parses as an IPv4 or IPv6 address.
#[must_use]
pub fn is_syntactically_valid(ip: &str) -> bool {
  parse(ip).is_some()
}

/// Returns `true` if `ip` is valid and worth sending to a remote provider.
///
/// Private, loopback and link-local addresses are excluded, as are multicast
/// and shared address space, which no provider can place on a map.
#[must_use]
pub fn is_publicly_routable(ip: &str) -> bool {
  parse(ip).is_some_and(|addr| {
    !(is_private(addr)
      || is_loopback(addr)
      || is_link_local(addr)
      || is_special_purpose(addr))
  })
}

/// Classifies a loopback, link-local or private address.
///
/// Precedence is loopback, then link-local, then private. RFC 1918 space is
/// split into classes A, B and C; other private space (documentation,
/// benchmarking, reserved, unspecified, IPv6 unique-local) gets the generic
/// "Private" type. Public and invalid input yield `None`.
#[must_use]
pub fn classify_private(ip: &str) -> Option<Classification> {
  let addr = parse(ip)?;

  if is_loopback(addr) {
    return Some(LOOPBACK);
  }
  if is_link_local(addr) {
    return Some(LINK_LOCAL);
  }
  if !is_private(addr) {
    return None;
  }

  let class = match addr {
    IpAddr::V4(v4) => PRIVATE_BLOCKS
      .iter()
      .find(|(net, prefix, _)| in_v4_block(v4, *net, *prefix))
      .map(|(_, _, class)| *class),
    IpAddr::V6(_) => None,
  };
  Some(class.unwrap_or(PRIVATE_GENERIC))
}
