//! `quickcheck` generators, enabled by the `quickcheck` feature.

use crate::address::Ipv4Address;
use crate::network::Ipv4Cidr;
use quickcheck::{Arbitrary, Gen};

impl Arbitrary for Ipv4Address {
    fn arbitrary(g: &mut Gen) -> Self {
        Ipv4Address::from_u32(u32::arbitrary(g))
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        Box::new(self.to_u32().shrink().map(Ipv4Address::from_u32))
    }
}

/// Prefix lengths are drawn from the full `0..=32` range, `/0` and `/32` included.
impl Arbitrary for Ipv4Cidr {
    fn arbitrary(g: &mut Gen) -> Self {
        let bits = u8::arbitrary(g) % (Ipv4Cidr::MAX_PREFIX_LENGTH + 1);
        Ipv4Cidr::from_parts(Ipv4Address::arbitrary(g), bits)
    }
}
