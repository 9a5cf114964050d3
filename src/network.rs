use crate::address::{AddressRange, Ipv4Address, ToAddress};
use crate::error::FormatError;
use lazy_static::lazy_static;
use log::{debug, trace};
use regex::Regex;
use std::fmt::{Debug, Display, Error, Formatter};
use std::net::Ipv4Addr;
use std::str::FromStr;

/// An IPv4 network: an address together with a prefix length.
///
/// The address is kept exactly as given, host bits included; [`Ipv4Cidr::min`]
/// is the normalized network address. Netmask and bounds are computed once
/// at construction.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Ipv4Cidr {
    address: Ipv4Address,
    prefix_length: u8,
    netmask: Ipv4Address,
    min: Ipv4Address,
    max: Ipv4Address,
}

impl Ipv4Cidr {
    /// `0.0.0.0/0`, every address.
    pub const ALL: Ipv4Cidr = Ipv4Cidr::from_parts(Ipv4Address::ZERO, 0);

    pub const MAX_PREFIX_LENGTH: u8 = 32;

    /// Assumes `prefix_length <= 32`.
    pub(crate) const fn from_parts(address: Ipv4Address, prefix_length: u8) -> Self {
        let inverse_bits = (Self::MAX_PREFIX_LENGTH - prefix_length) as u32;
        let netmask = ((1u64 << prefix_length) - 1) << inverse_bits;
        let min = (address.to_u32() as u64 >> inverse_bits) << inverse_bits;
        let max = min + (1u64 << inverse_bits) - 1;
        Ipv4Cidr {
            address,
            prefix_length,
            netmask: Ipv4Address::from_u32(netmask as u32),
            min: Ipv4Address::from_u32(min as u32),
            max: Ipv4Address::from_u32(max as u32),
        }
    }

    /// Builds a network from an address and either a prefix length or a netmask.
    ///
    /// Dotted text addresses may be shortened, missing trailing segments are zero.
    ///
    /// ```
    /// use iplogic::Ipv4Cidr;
    ///
    /// let net = Ipv4Cidr::new("4.33.222.111", "255.255.240.0").unwrap();
    /// assert_eq!(net.to_string(), "4.33.222.111/20");
    /// assert_eq!(Ipv4Cidr::new("10.1", 16).unwrap().to_string(), "10.1.0.0/16");
    /// ```
    pub fn new<A: ToAddress, P: ToPrefix>(address: A, prefix: P) -> Result<Self, FormatError> {
        let prefix_length = prefix.to_prefix_length()?;
        let address = address.to_network_address()?;
        Ok(Self::from_parts(address, prefix_length))
    }

    /// Builds a network from anything implementing [`ToCidr`].
    pub fn parse<C: ToCidr>(source: C) -> Result<Self, FormatError> {
        source.to_cidr()
    }

    /// Number of leading one bits in `netmask`.
    pub fn netmask_to_prefix_length(netmask: Ipv4Address) -> Result<u8, FormatError> {
        if !netmask.is_netmask() {
            debug!("rejecting {} as a netmask", netmask);
            return Err(FormatError::NotNetmask(netmask));
        }
        Ok(netmask.to_u32().leading_ones() as u8)
    }

    pub fn address(&self) -> Ipv4Address {
        self.address
    }

    pub fn prefix_length(&self) -> u8 {
        self.prefix_length
    }

    /// Number of host bits.
    pub fn inverse_bits(&self) -> u8 {
        Self::MAX_PREFIX_LENGTH - self.prefix_length
    }

    pub fn netmask(&self) -> Ipv4Address {
        self.netmask
    }

    /// Number of addresses in the block, `2^32` for `/0`.
    pub fn size(&self) -> u64 {
        1 << self.inverse_bits()
    }

    pub fn min(&self) -> Ipv4Address {
        self.min
    }

    pub fn max(&self) -> Ipv4Address {
        self.max
    }

    /// The host part of the address: `address - min`.
    pub fn rest_field(&self) -> Ipv4Address {
        Ipv4Address::from_u32(self.address.to_u32() - self.min.to_u32())
    }

    /// Number of trailing octets not entirely fixed by the prefix.
    ///
    /// `/0` has 4, `/8` has 3, `/20` has 2, `/32` has 0.
    pub fn significant_octets(&self) -> u8 {
        4 - self.prefix_length / 8
    }

    /// The smallest classful reverse-DNS zone covering the block, without the
    /// `in-addr.arpa` suffix. See RFC 2317 for blocks smaller than `/24`.
    ///
    /// ```
    /// use iplogic::cidr;
    ///
    /// assert_eq!(cidr("10.0.1/24").unwrap().zone(), "1.0.10");
    /// ```
    pub fn zone(&self) -> String {
        let fixed = usize::from(4 - self.significant_octets());
        self.min.octets()[..fixed]
            .iter()
            .rev()
            .map(u8::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Whether `addr` lies on this network.
    pub fn contains(&self, addr: Ipv4Address) -> bool {
        Self::from_parts(addr, self.prefix_length).min == self.min
    }

    /// Parses `addr` and tests whether it lies on this network.
    pub fn includes<A: ToAddress>(&self, addr: A) -> Result<bool, FormatError> {
        Ok(self.contains(addr.to_address()?))
    }

    /// Every address from [`Ipv4Cidr::min`] to [`Ipv4Cidr::max`], lazily.
    pub fn iter(&self) -> AddressRange {
        AddressRange::new(self.min, self.max)
    }
}

impl Display for Ipv4Cidr {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        write!(f, "{}/{}", self.address, self.prefix_length)
    }
}

impl Debug for Ipv4Cidr {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        write!(f, "Ipv4Cidr({})", self)
    }
}

impl IntoIterator for Ipv4Cidr {
    type Item = Ipv4Address;
    type IntoIter = AddressRange;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for &Ipv4Cidr {
    type Item = Ipv4Address;
    type IntoIter = AddressRange;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Pads dotted text with `.0` segments until it has four: `"10.1"` is `"10.1.0.0"`.
pub(crate) fn expand_shortened(text: &str) -> String {
    let mut expanded = text.to_owned();
    if !text.is_empty() {
        for _ in text.matches('.').count()..3 {
            expanded.push_str(".0");
        }
    }
    expanded
}

impl FromStr for Ipv4Cidr {
    type Err = FormatError;

    /// Accepts `address/bits` and `address/netmask`, where the address may be
    /// shortened (`10.0.1/24`, `11.22/255.255.0.0`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lazy_static! {
            static ref SLASH_BITS: Regex =
                Regex::new(r"^([0-9]{1,3}(?:\.[0-9]{1,3}){0,3})/([0-9]+)$").expect("Not possible");
        }
        let unparseable = || FormatError::UnparseableCidr(s.to_owned());

        if let Some(v) = SLASH_BITS.captures(s) {
            let bits = v[2].parse::<u64>().map_err(|_| unparseable())?;
            trace!("parsing {:?} as address and prefix length", s);
            return Ipv4Cidr::new(&v[1], bits);
        }

        match s.split_once('/') {
            Some((address, netmask))
                if !netmask.is_empty() && !netmask.bytes().all(|b| b.is_ascii_digit()) =>
            {
                trace!("parsing {:?} as address and netmask", s);
                let netmask = Ipv4Address::parse(netmask)?;
                Ipv4Cidr::new(address, netmask)
            }
            _ => {
                debug!("rejecting {:?} as a CIDR block", s);
                Err(unparseable())
            }
        }
    }
}

/// A prefix length, or a netmask that can be converted to one.
///
/// Integers are taken as the prefix length directly; text and addresses are
/// read as a netmask.
pub trait ToPrefix {
    fn to_prefix_length(&self) -> Result<u8, FormatError>;
}

impl ToPrefix for Ipv4Address {
    fn to_prefix_length(&self) -> Result<u8, FormatError> {
        Ipv4Cidr::netmask_to_prefix_length(*self)
    }
}

impl ToPrefix for Ipv4Addr {
    fn to_prefix_length(&self) -> Result<u8, FormatError> {
        Ipv4Cidr::netmask_to_prefix_length(Ipv4Address::from(*self))
    }
}

impl ToPrefix for str {
    fn to_prefix_length(&self) -> Result<u8, FormatError> {
        Ipv4Cidr::netmask_to_prefix_length(Ipv4Address::parse(self)?)
    }
}

impl ToPrefix for String {
    fn to_prefix_length(&self) -> Result<u8, FormatError> {
        self.as_str().to_prefix_length()
    }
}

impl<T: ToPrefix + ?Sized> ToPrefix for &T {
    fn to_prefix_length(&self) -> Result<u8, FormatError> {
        (**self).to_prefix_length()
    }
}

macro_rules! impl_integer_prefix {
    ($($int:ty),*) => {$(
        impl ToPrefix for $int {
            fn to_prefix_length(&self) -> Result<u8, FormatError> {
                u8::try_from(*self)
                    .ok()
                    .filter(|bits| *bits <= Ipv4Cidr::MAX_PREFIX_LENGTH)
                    .ok_or(FormatError::PrefixOutOfRange(*self as i128))
            }
        }
    )*};
}

impl_integer_prefix!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

/// A value an [`Ipv4Cidr`] can be built from: a network (returned unchanged),
/// CIDR text, or an `(address, prefix)` pair.
pub trait ToCidr {
    fn to_cidr(&self) -> Result<Ipv4Cidr, FormatError>;
}

impl ToCidr for Ipv4Cidr {
    fn to_cidr(&self) -> Result<Ipv4Cidr, FormatError> {
        Ok(*self)
    }
}

impl ToCidr for str {
    fn to_cidr(&self) -> Result<Ipv4Cidr, FormatError> {
        self.parse()
    }
}

impl ToCidr for String {
    fn to_cidr(&self) -> Result<Ipv4Cidr, FormatError> {
        self.parse()
    }
}

impl<A: ToAddress, P: ToPrefix> ToCidr for (A, P) {
    fn to_cidr(&self) -> Result<Ipv4Cidr, FormatError> {
        Ipv4Cidr::new(&self.0, &self.1)
    }
}

impl<T: ToCidr + ?Sized> ToCidr for &T {
    fn to_cidr(&self) -> Result<Ipv4Cidr, FormatError> {
        (**self).to_cidr()
    }
}
