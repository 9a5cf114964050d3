use crate::address::Ipv4Address;
use thiserror::Error;

/// Raised when an address or CIDR block cannot be built from its source.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("IP: segment {0:?} is not a decimal integer")]
    InvalidSegment(String),

    #[error("IP: {0} segments given, at most 4 are allowed")]
    TooManySegments(usize),

    #[error("IP: address {0} out of range")]
    OutOfRange(i128),

    #[error("CIDR: prefix length {0} out of range (must be 0-32)")]
    PrefixOutOfRange(i128),

    #[error("CIDR: {0} is not a netmask")]
    NotNetmask(Ipv4Address),

    #[error("CIDR: unable to parse {0:?}")]
    UnparseableCidr(String),
}

/// Returned by [`Ipv4Address::assert_netmask`] for an address that is not a netmask.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("{0} is not a valid netmask")]
pub struct NetmaskError(pub Ipv4Address);
