use crate::error::{FormatError, NetmaskError};
use crate::network::{expand_shortened, Ipv4Cidr, ToPrefix};
use std::fmt::{Debug, Display, Error, Formatter};
use std::iter::FusedIterator;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// A single IPv4 host address, stored as its 32-bit integer value.
///
/// Addresses compare, order and hash by that integer, so the same address
/// built from text, octets or a number is the same value.
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Ipv4Address {
    int: u32,
}

impl Ipv4Address {
    /// `0.0.0.0`, also what an absent source parses to.
    pub const ZERO: Ipv4Address = Ipv4Address { int: 0 };
    /// `255.255.255.255`
    pub const MAX: Ipv4Address = Ipv4Address { int: u32::MAX };

    pub const fn from_u32(int: u32) -> Self {
        Ipv4Address { int }
    }

    pub const fn to_u32(self) -> u32 {
        self.int
    }

    /// Builds an address from anything implementing [`ToAddress`].
    ///
    /// ```
    /// use iplogic::Ipv4Address;
    ///
    /// assert_eq!(Ipv4Address::parse("11.22.33.44").unwrap().to_u32(), 0x0b16_212c);
    /// assert_eq!(Ipv4Address::parse(255u32).unwrap().to_string(), "0.0.0.255");
    /// assert_eq!(Ipv4Address::parse(["11", "22", "33", "44"]).unwrap().to_string(), "11.22.33.44");
    /// assert_eq!(Ipv4Address::parse(None::<&str>).unwrap(), Ipv4Address::ZERO);
    /// ```
    pub fn parse<A: ToAddress>(source: A) -> Result<Self, FormatError> {
        source.to_address()
    }

    pub(crate) fn checked(int: i128) -> Result<Self, FormatError> {
        u32::try_from(int)
            .map(Ipv4Address::from_u32)
            .map_err(|_| FormatError::OutOfRange(int))
    }

    /// Combines segments by positional weight, most significant first:
    /// `[10, 1]` is `10 * 256 + 1`.
    fn from_segments(segments: &[i128]) -> Result<Self, FormatError> {
        if segments.len() > 4 {
            return Err(FormatError::TooManySegments(segments.len()));
        }
        Self::checked(segments.iter().fold(0, |acc, segment| (acc << 8) + segment))
    }

    /// The four octets, most significant first.
    pub const fn octets(&self) -> [u8; 4] {
        self.int.to_be_bytes()
    }

    /// Adds `n` (an integer or another address), failing instead of wrapping.
    #[allow(clippy::should_implement_trait)]
    pub fn add<N: Into<i64>>(&self, n: N) -> Result<Self, FormatError> {
        Self::checked(i128::from(self.int) + i128::from(n.into()))
    }

    pub fn subtract<N: Into<i64>>(&self, n: N) -> Result<Self, FormatError> {
        Self::checked(i128::from(self.int) - i128::from(n.into()))
    }

    pub fn successor(&self) -> Result<Self, FormatError> {
        self.add(1)
    }

    /// True if the bits are a run of ones followed only by zeros.
    pub fn is_netmask(&self) -> bool {
        let host = !self.int;
        host & host.wrapping_add(1) == 0
    }

    pub fn assert_netmask(&self) -> Result<(), NetmaskError> {
        if self.is_netmask() {
            Ok(())
        } else {
            Err(NetmaskError(*self))
        }
    }

    /// The network prefix of this address under `netmask`.
    ///
    /// ```
    /// use iplogic::ip;
    ///
    /// let addr = ip("1.2.3.4").unwrap();
    /// assert_eq!(addr.prefix("255.255.0.0").unwrap().to_string(), "1.2.0.0");
    /// ```
    pub fn prefix<P: ToPrefix>(&self, netmask: P) -> Result<Self, FormatError> {
        Ok(Ipv4Cidr::new(*self, netmask)?.min())
    }

    /// The highest address sharing this address's prefix under `netmask`.
    pub fn max_in<P: ToPrefix>(&self, netmask: P) -> Result<Self, FormatError> {
        Ok(Ipv4Cidr::new(*self, netmask)?.max())
    }

    /// The host bits left over once `netmask` is applied.
    pub fn rest_field<P: ToPrefix>(&self, netmask: P) -> Result<Self, FormatError> {
        Ok(Ipv4Cidr::new(*self, netmask)?.rest_field())
    }
}

impl Display for Ipv4Address {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        let [a, b, c, d] = self.octets();
        write!(f, "{}.{}.{}.{}", a, b, c, d)
    }
}

impl Debug for Ipv4Address {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        write!(f, "Ipv4Address({})", self)
    }
}

impl FromStr for Ipv4Address {
    type Err = FormatError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.to_address()
    }
}

impl From<u32> for Ipv4Address {
    fn from(int: u32) -> Self {
        Ipv4Address::from_u32(int)
    }
}

impl From<[u8; 4]> for Ipv4Address {
    fn from(octets: [u8; 4]) -> Self {
        Ipv4Address::from_u32(u32::from_be_bytes(octets))
    }
}

impl From<Ipv4Addr> for Ipv4Address {
    fn from(addr: Ipv4Addr) -> Self {
        Ipv4Address::from_u32(u32::from(addr))
    }
}

impl From<Ipv4Address> for u32 {
    fn from(addr: Ipv4Address) -> Self {
        addr.int
    }
}

impl From<Ipv4Address> for i64 {
    fn from(addr: Ipv4Address) -> Self {
        i64::from(addr.int)
    }
}

impl From<Ipv4Address> for Ipv4Addr {
    fn from(addr: Ipv4Address) -> Self {
        Ipv4Addr::from(addr.int)
    }
}

/// A value an [`Ipv4Address`] can be built from.
///
/// Implemented for addresses themselves (returned unchanged), dotted text,
/// integers, sequences of [`ToSegment`] values, and `Option`s of any of
/// these where `None` means `0.0.0.0`.
pub trait ToAddress {
    fn to_address(&self) -> Result<Ipv4Address, FormatError>;

    /// Same as [`ToAddress::to_address`], except that dotted text with fewer
    /// than four segments is padded with zero segments on the right
    /// (`"10.1"` becomes `10.1.0.0`). Used when the address names a network.
    fn to_network_address(&self) -> Result<Ipv4Address, FormatError> {
        self.to_address()
    }
}

/// One segment of an address given as a sequence: anything with an explicit
/// integer value.
pub trait ToSegment {
    fn to_segment(&self) -> Result<i128, FormatError>;
}

impl ToAddress for Ipv4Address {
    fn to_address(&self) -> Result<Ipv4Address, FormatError> {
        Ok(*self)
    }
}

impl ToAddress for Ipv4Addr {
    fn to_address(&self) -> Result<Ipv4Address, FormatError> {
        Ok(Ipv4Address::from(*self))
    }
}

impl ToAddress for str {
    fn to_address(&self) -> Result<Ipv4Address, FormatError> {
        if self.is_empty() {
            return Ok(Ipv4Address::ZERO);
        }
        self.split('.').collect::<Vec<_>>().to_address()
    }

    fn to_network_address(&self) -> Result<Ipv4Address, FormatError> {
        expand_shortened(self).to_address()
    }
}

impl ToAddress for String {
    fn to_address(&self) -> Result<Ipv4Address, FormatError> {
        self.as_str().to_address()
    }

    fn to_network_address(&self) -> Result<Ipv4Address, FormatError> {
        self.as_str().to_network_address()
    }
}

impl<T: ToSegment> ToAddress for [T] {
    fn to_address(&self) -> Result<Ipv4Address, FormatError> {
        let segments = self
            .iter()
            .map(ToSegment::to_segment)
            .collect::<Result<Vec<_>, _>>()?;
        Ipv4Address::from_segments(&segments)
    }
}

impl<T: ToSegment, const N: usize> ToAddress for [T; N] {
    fn to_address(&self) -> Result<Ipv4Address, FormatError> {
        self.as_slice().to_address()
    }
}

impl<T: ToSegment> ToAddress for Vec<T> {
    fn to_address(&self) -> Result<Ipv4Address, FormatError> {
        self.as_slice().to_address()
    }
}

impl<T: ToAddress> ToAddress for Option<T> {
    fn to_address(&self) -> Result<Ipv4Address, FormatError> {
        match self {
            Some(source) => source.to_address(),
            None => Ok(Ipv4Address::ZERO),
        }
    }

    fn to_network_address(&self) -> Result<Ipv4Address, FormatError> {
        match self {
            Some(source) => source.to_network_address(),
            None => Ok(Ipv4Address::ZERO),
        }
    }
}

impl<T: ToAddress + ?Sized> ToAddress for &T {
    fn to_address(&self) -> Result<Ipv4Address, FormatError> {
        (**self).to_address()
    }

    fn to_network_address(&self) -> Result<Ipv4Address, FormatError> {
        (**self).to_network_address()
    }
}

impl ToSegment for str {
    fn to_segment(&self) -> Result<i128, FormatError> {
        if self.is_empty() || !self.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FormatError::InvalidSegment(self.to_owned()));
        }
        // digits only, so the parse can fail only by overflowing
        self.parse::<u64>()
            .map(i128::from)
            .map_err(|_| FormatError::OutOfRange(self.parse().unwrap_or(i128::MAX)))
    }
}

impl ToSegment for String {
    fn to_segment(&self) -> Result<i128, FormatError> {
        self.as_str().to_segment()
    }
}

impl<T: ToSegment> ToSegment for Option<T> {
    fn to_segment(&self) -> Result<i128, FormatError> {
        self.as_ref().map_or(Ok(0), ToSegment::to_segment)
    }
}

impl<T: ToSegment + ?Sized> ToSegment for &T {
    fn to_segment(&self) -> Result<i128, FormatError> {
        (**self).to_segment()
    }
}

macro_rules! impl_integer_sources {
    ($($int:ty),*) => {$(
        impl ToAddress for $int {
            fn to_address(&self) -> Result<Ipv4Address, FormatError> {
                Ipv4Address::checked(*self as i128)
            }
        }

        impl ToSegment for $int {
            fn to_segment(&self) -> Result<i128, FormatError> {
                Ok(*self as i128)
            }
        }
    )*};
}

impl_integer_sources!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

/// Lazy ascending iterator over an inclusive range of addresses.
///
/// Nothing is materialized, so even `0.0.0.0/0` can be walked, counted or
/// reversed in constant memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddressRange {
    next: u64,
    end: u64,
}

impl AddressRange {
    /// All addresses from `first` to `last`, both included. Empty if `first > last`.
    pub fn new(first: Ipv4Address, last: Ipv4Address) -> Self {
        AddressRange {
            next: u64::from(first.int),
            end: u64::from(last.int) + 1,
        }
    }

    /// Number of addresses not yet yielded.
    pub fn remaining(&self) -> u64 {
        self.end.saturating_sub(self.next)
    }

    fn at(int: u64) -> Ipv4Address {
        Ipv4Address::from_u32(int as u32)
    }
}

impl Iterator for AddressRange {
    type Item = Ipv4Address;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next < self.end {
            let addr = Self::at(self.next);
            self.next += 1;
            Some(addr)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.remaining()) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }

    /// Saturates at `usize::MAX` where `usize` is 32 bits wide, so `0.0.0.0/0`
    /// counts one short there; [`AddressRange::remaining`] is always exact.
    fn count(self) -> usize {
        usize::try_from(self.remaining()).unwrap_or(usize::MAX)
    }

    fn last(mut self) -> Option<Self::Item> {
        self.next_back()
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.next = self.next.saturating_add(n as u64).min(self.end.max(self.next));
        self.next()
    }
}

impl DoubleEndedIterator for AddressRange {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.next < self.end {
            self.end -= 1;
            Some(Self::at(self.end))
        } else {
            None
        }
    }
}

impl FusedIterator for AddressRange {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ip;
    use quickcheck_macros::quickcheck;

    struct Four;

    impl ToSegment for Four {
        fn to_segment(&self) -> Result<i128, FormatError> {
            Ok(4)
        }
    }

    #[test]
    fn parses_text() {
        let addr = ip("11.22.33.44").unwrap();
        assert_eq!(addr.to_u32(), (11 << 24) + (22 << 16) + (33 << 8) + 44);
        assert_eq!(format!("{:?}", addr), "Ipv4Address(11.22.33.44)");
        assert_eq!("11.22.33.44".parse::<Ipv4Address>().unwrap(), addr);
        assert_eq!(ip(String::from("11.22.33.44")).unwrap(), addr);
    }

    #[test]
    fn parses_short_text_by_position() {
        assert_eq!(ip("10.1").unwrap().to_u32(), 10 * 256 + 1);
        assert_eq!(ip("7").unwrap().to_string(), "0.0.0.7");
        assert_eq!(ip("11.22.33.00").unwrap().to_string(), "11.22.33.0");
        assert_eq!(ip("").unwrap(), Ipv4Address::ZERO);
    }

    #[test]
    fn parses_integers() {
        assert_eq!(ip(255).unwrap().to_string(), "0.0.0.255");
        assert_eq!(ip(0xA00A10FFu32).unwrap().to_string(), "160.10.16.255");
        assert_eq!(ip(u32::MAX).unwrap(), Ipv4Address::MAX);
    }

    #[test]
    fn parses_sequences() {
        let segments: [&dyn ToSegment; 4] = [&7, &"42", &Four, &None::<u8>];
        assert_eq!(ip(segments).unwrap().to_string(), "7.42.4.0");
        assert_eq!(ip(vec!["11", "22", "33", "44"]).unwrap().to_string(), "11.22.33.44");
        assert_eq!(ip([10u8, 1]).unwrap(), ip("10.1").unwrap());
        assert_eq!(ip(Vec::<u8>::new()).unwrap(), Ipv4Address::ZERO);
    }

    #[test]
    fn parses_absent_as_zero() {
        assert_eq!(ip(None::<&str>).unwrap(), Ipv4Address::ZERO);
        assert_eq!(ip(Some("1.2.3.4")).unwrap().to_string(), "1.2.3.4");
        assert_eq!(Ipv4Address::default(), Ipv4Address::ZERO);
    }

    #[test]
    fn passes_addresses_through() {
        let addr = ip("11.22.33.44").unwrap();
        assert_eq!(ip(addr).unwrap(), addr);
        assert_eq!(ip(&addr).unwrap(), addr);
        assert_eq!(ip(Ipv4Addr::new(11, 22, 33, 44)).unwrap(), addr);
        assert_eq!(Ipv4Addr::from(addr), Ipv4Addr::new(11, 22, 33, 44));
    }

    #[test]
    fn rejects_bad_sources() {
        assert_eq!(ip("1.2.3.4.5"), Err(FormatError::TooManySegments(5)));
        assert_eq!(
            ip("1.x.3.4"),
            Err(FormatError::InvalidSegment("x".to_string()))
        );
        assert_eq!(ip("1..2"), Err(FormatError::InvalidSegment(String::new())));
        assert_eq!(ip(" 1.2.3.4"), Err(FormatError::InvalidSegment(" 1".to_string())));
        assert_eq!(ip(-1), Err(FormatError::OutOfRange(-1)));
        assert_eq!(ip(1u64 << 32), Err(FormatError::OutOfRange(1 << 32)));
        assert_eq!(ip("256.0.0.0"), Err(FormatError::OutOfRange(256 << 24)));
        assert_eq!(
            ip("1.99999999999999999999"),
            Err(FormatError::OutOfRange(99_999_999_999_999_999_999))
        );
    }

    #[test]
    fn knows_its_octets() {
        assert_eq!(ip("44.33.22.11").unwrap().octets(), [44, 33, 22, 11]);
        assert_eq!(ip(255).unwrap().octets(), [0, 0, 0, 255]);
        assert_eq!(Ipv4Address::MAX.to_u32(), 0xFFFF_FFFF);
        assert_eq!(Ipv4Address::MAX.to_string(), "255.255.255.255");
    }

    #[test]
    fn arithmetic_is_range_checked() {
        assert_eq!(Ipv4Address::MAX.successor(), Err(FormatError::OutOfRange(1 << 32)));
        assert_eq!(Ipv4Address::ZERO.subtract(1), Err(FormatError::OutOfRange(-1)));
        let addr = ip("10.0.0.255").unwrap();
        assert_eq!(addr.successor().unwrap().to_string(), "10.0.1.0");
        assert_eq!(addr.subtract(addr).unwrap(), Ipv4Address::ZERO);
        assert_eq!(addr.add(ip("0.0.1.0").unwrap()).unwrap().to_string(), "10.0.1.255");
    }

    #[test]
    fn knows_prefix_and_rest_field() {
        let addr = ip("11.22.33.44").unwrap();

        assert_eq!(addr.prefix("255.255.255.0").unwrap(), ip("11.22.33.00").unwrap());
        assert_eq!(addr.rest_field("255.255.255.0").unwrap(), ip("0.0.0.44").unwrap());
        assert_eq!(addr.max_in("255.255.255.0").unwrap(), ip("11.22.33.255").unwrap());

        assert_eq!(addr.prefix("255.255.240.0").unwrap(), ip("11.22.32.00").unwrap());
        assert_eq!(addr.rest_field("255.255.240.0").unwrap(), ip("0.0.1.44").unwrap());

        assert_eq!(
            addr.prefix("255.0.255.0"),
            Err(FormatError::NotNetmask(ip("255.0.255.0").unwrap()))
        );
    }

    #[test]
    fn knows_whether_it_is_a_netmask() {
        for bits in 0..=32u32 {
            let mask = ((u64::from(u32::MAX) >> bits) << bits) as u32;
            assert!(Ipv4Address::from(mask).is_netmask(), "{} bits", bits);
            assert!(Ipv4Address::from(mask).assert_netmask().is_ok());
        }

        let addr = ip("1.2.3.4").unwrap();
        assert!(!addr.is_netmask());
        assert!(!ip("0.255.0.0").unwrap().is_netmask());
        assert_eq!(addr.assert_netmask(), Err(NetmaskError(addr)));
        assert_eq!(
            addr.assert_netmask().unwrap_err().to_string(),
            "1.2.3.4 is not a valid netmask"
        );
    }

    #[test]
    fn ranges_are_lazy_and_bounded() {
        let range = AddressRange::new(ip("10.0.0.254").unwrap(), ip("10.0.1.1").unwrap());
        assert_eq!(range.remaining(), 4);
        let all: Vec<_> = range.clone().map(|a| a.to_string()).collect();
        assert_eq!(all, ["10.0.0.254", "10.0.0.255", "10.0.1.0", "10.0.1.1"]);
        assert_eq!(range.clone().rev().next(), ip("10.0.1.1").ok());
        assert_eq!(range.clone().nth(2), ip("10.0.1.0").ok());
        assert_eq!(range.clone().nth(9), None);

        let everything = AddressRange::new(Ipv4Address::ZERO, Ipv4Address::MAX);
        assert_eq!(everything.remaining(), 1 << 32);
        assert_eq!(everything.clone().last(), Some(Ipv4Address::MAX));
        assert_eq!(everything.clone().next(), Some(Ipv4Address::ZERO));

        let slash8 = AddressRange::new(ip("10.0.0.0").unwrap(), ip("10.255.255.255").unwrap());
        assert_eq!(slash8.remaining(), 1 << 24);
        assert_eq!(slash8.count(), 1 << 24);

        let mut empty = AddressRange::new(Ipv4Address::MAX, Ipv4Address::ZERO);
        assert_eq!(empty.remaining(), 0);
        assert_eq!(empty.next(), None);
        assert_eq!(empty.next_back(), None);
    }

    #[quickcheck]
    fn round_trips_through_text_and_octets(addr: Ipv4Address) -> bool {
        ip(addr.to_string()) == Ok(addr) && ip(addr.octets()) == Ok(addr)
    }

    #[quickcheck]
    fn octets_weigh_back_to_the_integer(i: u32) -> bool {
        let [a, b, c, d] = Ipv4Address::from(i).octets();
        u32::from(a) * 256 * 256 * 256 + u32::from(b) * 256 * 256 + u32::from(c) * 256 + u32::from(d) == i
    }

    #[quickcheck]
    fn orders_like_integers(i1: u32, i2: u32) -> bool {
        Ipv4Address::from(i1).cmp(&Ipv4Address::from(i2)) == i1.cmp(&i2)
    }

    #[quickcheck]
    fn adds_associatively(a: u32, i1: u32, i2: u32) -> bool {
        let (a, i1, i2) = (Ipv4Address::from(a >> 1), i1 >> 2, i2 >> 2);
        let step = a.add(i1).unwrap();
        step.add(i2) == a.add(i1 + i2)
            && step.successor() == a.add(i1 + 1)
            && step.subtract(i1) == Ok(a)
    }

    #[quickcheck]
    fn prefix_plus_rest_field_is_the_address(addr: Ipv4Address, bits: u8) -> bool {
        let netmask = Ipv4Cidr::new(Ipv4Address::ZERO, bits % 33).unwrap().netmask();
        let prefix = addr.prefix(netmask).unwrap();
        let rest = addr.rest_field(netmask).unwrap();
        prefix.add(rest) == Ok(addr)
    }
}
