//! This module provides the universal integer code used by the bitstring formats: an
//! Elias omega code over the positive integers, lifted onto either the non-negative
//! integers or all integers by a fixed bijection.
//!
//! Omega codes are self-delimiting, so a sequence of encoded values can be concatenated
//! without separators and read back one value at a time with a [`BitReader`].

use crate::types::TuringError;
use log::warn;
use std::fmt::Write;

/// The leading bit of every exported bitstring. It keeps leading zero bits alive when the
/// bitstring is reinterpreted as an integer.
pub const SENTINEL: char = '1';

/// Widest integer reinterpretation supported by `to_integer`.
pub const MAX_INTEGER_BITS: usize = 128;

/// The integer domain a coder is a bijection onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Domain {
    /// `0, 1, 2, ...` mapped to `1, 2, 3, ...`.
    NonNegative,
    /// `0, 1, -1, 2, -2, ...` mapped to `1, 2, 3, 4, 5, ...`.
    AllIntegers,
}

impl Domain {
    fn to_positive(self, value: i64) -> Result<u64, TuringError> {
        match self {
            Domain::NonNegative => u64::try_from(value)
                .map_err(|_| TuringError::OutOfDomain(value))?
                .checked_add(1)
                .ok_or(TuringError::Overflow),
            Domain::AllIntegers => {
                let doubled = value
                    .unsigned_abs()
                    .checked_mul(2)
                    .ok_or(TuringError::Overflow)?;
                if value > 0 {
                    Ok(doubled)
                } else {
                    doubled.checked_add(1).ok_or(TuringError::Overflow)
                }
            }
        }
    }

    fn from_positive(self, n: u64) -> Result<i64, TuringError> {
        match self {
            Domain::NonNegative => i64::try_from(n - 1).map_err(|_| TuringError::Overflow),
            Domain::AllIntegers => {
                let magnitude = i64::try_from(n / 2).map_err(|_| TuringError::Overflow)?;
                Ok(if n % 2 == 0 { magnitude } else { -magnitude })
            }
        }
    }
}

/// A single decoded value together with the number of bits its code occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    pub value: i64,
    pub size: usize,
}

/// A bijective, self-delimiting integer code.
pub trait UniversalCoder {
    /// Appends the code for `value` to `out`.
    fn encode(&self, value: i64, out: &mut String) -> Result<(), TuringError>;

    /// Decodes the code at the start of `bits`. Trailing bits are ignored and
    /// `Decoded::size` reports how many bits belonged to the code.
    fn decode(&self, bits: &str) -> Result<Decoded, TuringError>;
}

/// Elias omega code over a chosen integer [`Domain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EliasOmega {
    domain: Domain,
}

/// Shared coder for formats whose fields are never negative.
pub static NON_NEGATIVE: EliasOmega = EliasOmega::new(Domain::NonNegative);
/// Shared coder for formats with signed fields.
pub static ALL_INTEGERS: EliasOmega = EliasOmega::new(Domain::AllIntegers);

impl EliasOmega {
    pub const fn new(domain: Domain) -> Self {
        Self { domain }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }
}

impl UniversalCoder for EliasOmega {
    fn encode(&self, value: i64, out: &mut String) -> Result<(), TuringError> {
        let mut n = self.domain.to_positive(value)?;

        // Groups are produced last-first: N, then the length prefix of N, and so on.
        let mut groups = Vec::new();
        while n > 1 {
            groups.push(n);
            n = u64::from(u64::BITS - n.leading_zeros()) - 1;
        }

        for group in groups.iter().rev() {
            // Writing into a String cannot fail.
            let _ = write!(out, "{group:b}");
        }
        out.push('0');

        Ok(())
    }

    fn decode(&self, bits: &str) -> Result<Decoded, TuringError> {
        let bytes = bits.as_bytes();
        let mut n: u64 = 1;
        let mut position = 0;

        loop {
            match bytes.get(position) {
                None => return Err(TuringError::Truncated { position }),
                Some(b'0') => {
                    position += 1;
                    break;
                }
                Some(b'1') => {
                    if n >= u64::from(u64::BITS) {
                        return Err(TuringError::Overflow);
                    }
                    let end = position + n as usize + 1;
                    if end > bytes.len() {
                        return Err(TuringError::Truncated {
                            position: bytes.len(),
                        });
                    }

                    let mut group: u64 = 0;
                    for index in position..end {
                        group = (group << 1) | u64::from(bit_at(bits, index)?);
                    }
                    n = group;
                    position = end;
                }
                Some(_) => return Err(TuringError::InvalidSymbol(symbol_at(bits, position))),
            }
        }

        Ok(Decoded {
            value: self.domain.from_positive(n)?,
            size: position,
        })
    }
}

/// Reads the digit at byte `index` of `bits`.
pub fn bit_at(bits: &str, index: usize) -> Result<bool, TuringError> {
    match bits.as_bytes().get(index) {
        Some(b'0') => Ok(false),
        Some(b'1') => Ok(true),
        Some(_) => Err(TuringError::InvalidSymbol(symbol_at(bits, index))),
        None => Err(TuringError::Truncated { position: index }),
    }
}

fn symbol_at(bits: &str, index: usize) -> char {
    bits.get(index..)
        .and_then(|rest| rest.chars().next())
        .unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// Parses a digit string into bits.
pub fn parse_bits(bits: &str) -> Result<Vec<bool>, TuringError> {
    bits.chars()
        .map(|c| match c {
            '0' => Ok(false),
            '1' => Ok(true),
            other => Err(TuringError::InvalidSymbol(other)),
        })
        .collect()
}

/// Reinterprets a bitstring as a big-endian unsigned integer.
pub fn to_integer(bits: &str) -> Result<u128, TuringError> {
    let digits = parse_bits(bits)?;
    let significant = digits.iter().skip_while(|&&bit| !bit).count();
    if significant > MAX_INTEGER_BITS {
        return Err(TuringError::Overflow);
    }

    Ok(digits
        .iter()
        .fold(0u128, |acc, &bit| (acc << 1) | u128::from(bit)))
}

/// Renders an integer as its plain binary digit string. Zero renders as `"0"`.
pub fn from_integer(value: u128) -> String {
    format!("{value:b}")
}

/// Writes a sentinel followed by a sequence of codes.
pub struct BitWriter<'a, C: UniversalCoder + ?Sized> {
    coder: &'a C,
    out: String,
}

impl<'a, C: UniversalCoder + ?Sized> BitWriter<'a, C> {
    pub fn new(coder: &'a C) -> Self {
        Self {
            coder,
            out: SENTINEL.to_string(),
        }
    }

    pub fn write(&mut self, value: i64) -> Result<(), TuringError> {
        self.coder.encode(value, &mut self.out)
    }

    pub fn write_index(&mut self, value: usize) -> Result<(), TuringError> {
        self.write(i64::try_from(value).map_err(|_| TuringError::Overflow)?)
    }

    pub fn finish(self) -> String {
        self.out
    }
}

/// Reads a sequence of codes from a bitstring, after its sentinel.
pub struct BitReader<'a, C: UniversalCoder + ?Sized> {
    coder: &'a C,
    bits: &'a str,
    position: usize,
}

impl<'a, C: UniversalCoder + ?Sized> BitReader<'a, C> {
    /// Creates a reader positioned after the sentinel bit.
    pub fn new(coder: &'a C, bits: &'a str) -> Result<Self, TuringError> {
        if !bit_at(bits, 0)? {
            // Exports always start with the sentinel; the bit is skipped either way.
            warn!("bitstring does not start with the '{SENTINEL}' sentinel");
        }

        Ok(Self {
            coder,
            bits,
            position: 1,
        })
    }

    /// Decodes the next value and advances past it.
    pub fn read(&mut self) -> Result<i64, TuringError> {
        let decoded = self
            .coder
            .decode(&self.bits[self.position..])
            .map_err(|error| match error {
                TuringError::Truncated { position } => TuringError::Truncated {
                    position: self.position + position,
                },
                other => other,
            })?;

        self.position += decoded.size;
        Ok(decoded.value)
    }

    /// Decodes the next value as a non-negative index.
    pub fn read_index(&mut self) -> Result<usize, TuringError> {
        let value = self.read()?;
        usize::try_from(value).map_err(|_| TuringError::OutOfDomain(value))
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns true once every bit has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.position >= self.bits.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn encoded(coder: &EliasOmega, value: i64) -> String {
        let mut out = String::new();
        coder.encode(value, &mut out).unwrap();
        out
    }

    #[test]
    fn test_non_negative_codes() {
        assert_eq!(encoded(&NON_NEGATIVE, 0), "0");
        assert_eq!(encoded(&NON_NEGATIVE, 1), "100");
        assert_eq!(encoded(&NON_NEGATIVE, 2), "110");
        assert_eq!(encoded(&NON_NEGATIVE, 3), "101000");
        assert_eq!(encoded(&NON_NEGATIVE, 15), "10100100000");
    }

    #[test]
    fn test_all_integer_codes() {
        assert_eq!(encoded(&ALL_INTEGERS, 0), "0");
        assert_eq!(encoded(&ALL_INTEGERS, 1), "100");
        assert_eq!(encoded(&ALL_INTEGERS, -1), "110");
        assert_eq!(encoded(&ALL_INTEGERS, 2), "101000");
        assert_eq!(encoded(&ALL_INTEGERS, 3), "101100");
    }

    #[test]
    fn test_shared_coder_domains() {
        assert_eq!(NON_NEGATIVE.domain(), Domain::NonNegative);
        assert_eq!(ALL_INTEGERS.domain(), Domain::AllIntegers);
    }

    #[test]
    fn test_negative_value_outside_non_negative_domain() {
        let mut out = String::new();
        assert_eq!(
            NON_NEGATIVE.encode(-1, &mut out),
            Err(TuringError::OutOfDomain(-1))
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_decode_reports_size_and_ignores_trailing_bits() {
        let decoded = ALL_INTEGERS.decode("1011000110").unwrap();
        assert_eq!(decoded, Decoded { value: 3, size: 6 });
    }

    #[test]
    fn test_decode_truncated() {
        assert_eq!(
            NON_NEGATIVE.decode(""),
            Err(TuringError::Truncated { position: 0 })
        );
        assert_eq!(
            NON_NEGATIVE.decode("10"),
            Err(TuringError::Truncated { position: 2 })
        );
        assert_eq!(
            NON_NEGATIVE.decode("101"),
            Err(TuringError::Truncated { position: 3 })
        );
    }

    #[test]
    fn test_decode_invalid_symbol() {
        assert_eq!(
            NON_NEGATIVE.decode("1x0"),
            Err(TuringError::InvalidSymbol('x'))
        );
        assert_eq!(NON_NEGATIVE.decode("é"), Err(TuringError::InvalidSymbol('é')));
    }

    #[test]
    fn test_decode_extremes() {
        let max = encoded(&NON_NEGATIVE, i64::MAX);
        assert_eq!(NON_NEGATIVE.decode(&max).unwrap().value, i64::MAX);

        let min = encoded(&ALL_INTEGERS, i64::MIN + 1);
        assert_eq!(ALL_INTEGERS.decode(&min).unwrap().value, i64::MIN + 1);
    }

    #[test]
    fn test_reader_walks_concatenated_codes() {
        let mut writer = BitWriter::new(&ALL_INTEGERS);
        for value in [3, 1, 1, 1, -1, 2] {
            writer.write(value).unwrap();
        }
        let bits = writer.finish();
        assert!(bits.starts_with(SENTINEL));

        let mut reader = BitReader::new(&ALL_INTEGERS, &bits).unwrap();
        let mut values = Vec::new();
        while !reader.is_exhausted() {
            values.push(reader.read().unwrap());
        }
        assert_eq!(values, vec![3, 1, 1, 1, -1, 2]);
        assert_eq!(reader.position(), bits.len());
    }

    #[test]
    fn test_reader_truncation_position_is_absolute() {
        let mut reader = BitReader::new(&NON_NEGATIVE, "1011").unwrap();
        assert_eq!(reader.read().unwrap(), 0);
        assert_eq!(reader.read(), Err(TuringError::Truncated { position: 4 }));
    }

    #[test]
    fn test_integer_reinterpretation() {
        assert_eq!(to_integer("10010000110110100").unwrap(), 74164);
        assert_eq!(from_integer(74164), "10010000110110100");
        assert_eq!(from_integer(0), "0");
        assert_eq!(to_integer(&"1".repeat(129)), Err(TuringError::Overflow));
        assert_eq!(to_integer("12"), Err(TuringError::InvalidSymbol('2')));
    }

    proptest! {
        #[test]
        fn prop_all_integers_self_delimiting(a in any::<i32>(), b in any::<i32>()) {
            let mut bits = String::new();
            ALL_INTEGERS.encode(i64::from(a), &mut bits).unwrap();
            let first = bits.len();
            ALL_INTEGERS.encode(i64::from(b), &mut bits).unwrap();

            let decoded = ALL_INTEGERS.decode(&bits).unwrap();
            prop_assert_eq!(decoded, Decoded { value: i64::from(a), size: first });
            prop_assert_eq!(ALL_INTEGERS.decode(&bits[first..]).unwrap().value, i64::from(b));
        }

        #[test]
        fn prop_non_negative_bijective(value in 0i64..1_000_000) {
            let mut bits = String::new();
            NON_NEGATIVE.encode(value, &mut bits).unwrap();
            let decoded = NON_NEGATIVE.decode(&bits).unwrap();
            prop_assert_eq!(decoded.value, value);
            prop_assert_eq!(decoded.size, bits.len());
        }
    }
}
