//! IPv4 address and CIDR block value types.
//!
//! [`Ipv4Address`] is a 32-bit address with parsing, arithmetic, ordering and
//! netmask checks. [`Ipv4Cidr`] pairs an address with a prefix length and
//! derives the netmask, bounds, size, reverse zone and address iteration.
//!
//! ```
//! use iplogic::{cidr, ip};
//!
//! let net = cidr("11.22.33.44/20").unwrap();
//! assert_eq!(net.netmask().to_string(), "255.255.240.0");
//! assert_eq!(net.min().to_string(), "11.22.32.0");
//! assert_eq!(net.max().to_string(), "11.22.47.255");
//! assert_eq!(net.size(), 4096);
//! assert!(net.includes("11.22.40.1").unwrap());
//!
//! let addr = ip([7, 42, 4, 0]).unwrap();
//! assert_eq!(addr.to_string(), "7.42.4.0");
//! ```

pub mod address;
#[cfg(any(test, feature = "quickcheck"))]
mod arbitrary;
pub mod error;
pub mod network;

pub use address::{AddressRange, Ipv4Address, ToAddress, ToSegment};
pub use error::{FormatError, NetmaskError};
pub use network::{Ipv4Cidr, ToCidr, ToPrefix};

/// Shorthand for [`Ipv4Address::parse`].
pub fn ip<A: ToAddress>(source: A) -> Result<Ipv4Address, FormatError> {
    source.to_address()
}

/// Shorthand for [`Ipv4Cidr::parse`].
pub fn cidr<C: ToCidr>(source: C) -> Result<Ipv4Cidr, FormatError> {
    source.to_cidr()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shorthands_match_constructors() {
        assert_eq!(ip("11.22.33.44"), Ipv4Address::parse("11.22.33.44"));
        assert_eq!(cidr("11.22.33/24"), Ipv4Cidr::parse("11.22.33/24"));
        assert_eq!(cidr("0.0.0.0/0"), Ok(Ipv4Cidr::ALL));
        assert_eq!(Ipv4Cidr::ALL.size(), 4_294_967_296);
    }

    #[test]
    fn values_are_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Ipv4Address>();
        assert_send_sync::<Ipv4Cidr>();
        assert_send_sync::<AddressRange>();
    }
}
