//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::net::{Ipv4Addr, Ipv6Addr};

use ipnetwork::{Ipv4Network, Ipv6Network};

// Extension methods for Ipv4Addr.
pub trait Ipv4AddrExt {
    // Converts this IPv4 address into a host prefix network.
    fn to_host_prefix(&self) -> Ipv4Network;
}

// Extension methods for Ipv6Addr.
pub trait Ipv6AddrExt {
    // Converts this IPv6 address into a host prefix network.
    fn to_host_prefix(&self) -> Ipv6Network;
}

// ===== impl Ipv4Addr =====

impl Ipv4AddrExt for Ipv4Addr {
    fn to_host_prefix(&self) -> Ipv4Network {
        Ipv4Network::new(*self, 32).unwrap()
    }
}

// ===== impl Ipv6Addr =====

impl Ipv6AddrExt for Ipv6Addr {
    fn to_host_prefix(&self) -> Ipv6Network {
        Ipv6Network::new(*self, 128).unwrap()
    }
}
