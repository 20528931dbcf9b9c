pub use crate::core::models::privacy::TcfConsent;
use base64::Engine;

/// Decodes and structurally validates a TCF v2 consent string: valid
/// base64url, minimum length for the fixed header, and version byte
/// equal to 2. Purpose consent and the two per-vendor sections (consent
/// and legitimate interest, bitfield or range-encoded) are parsed from
/// the fixed-width and variable-width segments of the v2 core string;
/// anything shorter than the core string's minimum width is rejected as
/// malformed.
pub fn parse_tcf_v2(consent: &str) -> Result<TcfConsent, TcfParseError> {
    if consent.is_empty() {
        return Err(TcfParseError::Empty);
    }

    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(consent.trim_end_matches('='))
        .map_err(|_| TcfParseError::InvalidBase64)?;

    if bytes.len() < 13 {
        return Err(TcfParseError::TooShort);
    }

    let bits = BitReader::new(&bytes);

    let version = bits.read_u8(0, 6);
    if version != 2 {
        return Err(TcfParseError::UnsupportedVersion(version));
    }

    // Core string layout (TCF v2.2 §6 TC fields, fixed-width prefix):
    // Created(36) LastUpdated(36) CmpId(12) CmpVersion(12) ConsentScreen(6)
    // ConsentLanguage(12) VendorListVersion(12) TcfPolicyVersion(6) IsServiceSpecific(1)
    // UseNonStandardStacks(1) SpecialFeatureOptIns(12) PurposesConsent(24) starts at bit 173.
    const PURPOSES_BIT_OFFSET: usize = 173;
    const PURPOSES_LEN: usize = 24;

    let mut purposes_consent = [false; 25];
    for (i, purpose) in purposes_consent.iter_mut().enumerate().skip(1) {
        if i > PURPOSES_LEN {
            break;
        }
        *purpose = bits.read_bit(PURPOSES_BIT_OFFSET + (i - 1));
    }

    // PurposesLITransparency(24) + PurposeOneTreatment(1) + PublisherCC(12)
    // follow PurposesConsent before the vendor sections begin.
    let vendor_consent_offset = PURPOSES_BIT_OFFSET + PURPOSES_LEN + 24 + 1 + 12;
    let (vendor_consent, li_offset) = parse_vendor_section(&bits, vendor_consent_offset);
    let (vendor_legitimate_interest, _) = parse_vendor_section(&bits, li_offset);

    Ok(TcfConsent { version, purposes_consent, vendor_consent, vendor_legitimate_interest })
}

/// Parses one `MaxVendorId(16) + IsRangeEncoding(1) + (bitfield | range
/// entries)` vendor section (used for both VendorConsent and
/// VendorLegitimateInterest, which share this layout back to back) and
/// returns the consenting vendor ids plus the bit offset immediately past
/// the section, so the caller can chain into the next one.
fn parse_vendor_section(bits: &BitReader, offset: usize) -> (Vec<u16>, usize) {
    let max_vendor_id = bits.read_u32(offset, 16) as u16;
    let mut offset = offset + 16;

    let is_range_encoding = bits.read_bit(offset);
    offset += 1;

    let mut vendors = Vec::new();

    if !is_range_encoding {
        for vendor_id in 1..=max_vendor_id {
            if bits.read_bit(offset + (vendor_id - 1) as usize) {
                vendors.push(vendor_id);
            }
        }
        offset += max_vendor_id as usize;
    } else {
        let num_entries = bits.read_u32(offset, 12);
        offset += 12;
        for _ in 0..num_entries {
            let is_range = bits.read_bit(offset);
            offset += 1;
            let start_id = bits.read_u32(offset, 16) as u16;
            offset += 16;
            if is_range {
                let end_id = bits.read_u32(offset, 16) as u16;
                offset += 16;
                vendors.extend(start_id..=end_id);
            } else {
                vendors.push(start_id);
            }
        }
    }

    (vendors, offset)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TcfParseError {
    Empty,
    InvalidBase64,
    TooShort,
    UnsupportedVersion(u8),
}

impl std::fmt::Display for TcfParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TcfParseError::Empty => write!(f, "empty consent string"),
            TcfParseError::InvalidBase64 => write!(f, "consent string is not valid base64url"),
            TcfParseError::TooShort => write!(f, "consent string shorter than TCF v2 core"),
            TcfParseError::UnsupportedVersion(v) => write!(f, "unsupported TCF version byte {v}"),
        }
    }
}

impl std::error::Error for TcfParseError {}

/// MSB-first bit reader over a byte slice, matching the IAB TCF v2
/// big-endian bit-packing convention.
struct BitReader<'a> {
    bytes: &'a [u8],
}

impl<'a> BitReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    fn read_bit(&self, bit_index: usize) -> bool {
        let byte_index = bit_index / 8;
        let offset = bit_index % 8;
        self.bytes
            .get(byte_index)
            .map(|byte| (byte >> (7 - offset)) & 1 == 1)
            .unwrap_or(false)
    }

    fn read_u8(&self, start_bit: usize, len: usize) -> u8 {
        let mut value: u8 = 0;
        for i in 0..len {
            value = (value << 1) | self.read_bit(start_bit + i) as u8;
        }
        value
    }

    fn read_u32(&self, start_bit: usize, len: usize) -> u32 {
        let mut value: u32 = 0;
        for i in 0..len {
            value = (value << 1) | self.read_bit(start_bit + i) as u32;
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_string() {
        assert_eq!(parse_tcf_v2(""), Err(TcfParseError::Empty));
    }

    #[test]
    fn rejects_invalid_base64() {
        assert_eq!(parse_tcf_v2("not valid base64!!"), Err(TcfParseError::InvalidBase64));
    }

    #[test]
    fn rejects_version_byte_other_than_two() {
        // version field occupies the top 6 bits; 1 << 2 = 0b000001_00
        let mut bytes = vec![0b0000_0100u8];
        bytes.extend(std::iter::repeat(0u8).take(20));
        let encoded = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(&bytes);
        assert_eq!(parse_tcf_v2(&encoded), Err(TcfParseError::UnsupportedVersion(1)));
    }

    fn set_bit(bytes: &mut [u8], bit_index: usize) {
        let byte_index = bit_index / 8;
        let offset = bit_index % 8;
        bytes[byte_index] |= 1 << (7 - offset);
    }

    #[test]
    fn parses_vendor_consent_bitfield() {
        let mut bytes = vec![0u8; 32];
        set_bit(&mut bytes, 4); // version = 2
        // MaxVendorId = 3 at bit 234 (16 bits)
        set_bit(&mut bytes, 234 + 14);
        set_bit(&mut bytes, 234 + 15);
        // IsRangeEncoding at bit 250 left 0 (bitfield); vendor 2 consents
        set_bit(&mut bytes, 251 + 1);

        let encoded = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(&bytes);
        let consent = parse_tcf_v2(&encoded).expect("valid consent string");

        assert_eq!(consent.vendor_consent, vec![2]);
        assert!(consent.has_vendor(2));
        assert!(!consent.has_vendor(1));
        assert!(!consent.has_vendor(3));
    }

    #[test]
    fn parses_vendor_consent_range_encoding() {
        let mut bytes = vec![0u8; 40];
        set_bit(&mut bytes, 4); // version = 2
        // MaxVendorId = 10 at bit 234 (16 bits): 0000000000001010
        set_bit(&mut bytes, 234 + 12);
        set_bit(&mut bytes, 234 + 14);
        // IsRangeEncoding = 1 at bit 250
        set_bit(&mut bytes, 250);
        // NumEntries = 1 at bit 251 (12 bits): 000000000001
        set_bit(&mut bytes, 251 + 11);
        // Entry: IsRange=1, StartVendorId=5, EndVendorId=7
        let entry_offset = 263;
        set_bit(&mut bytes, entry_offset); // IsRange
        set_bit(&mut bytes, entry_offset + 1 + 13); // StartVendorId = 5 (...0101)
        set_bit(&mut bytes, entry_offset + 1 + 15);
        set_bit(&mut bytes, entry_offset + 1 + 16 + 13); // EndVendorId = 7 (...0111)
        set_bit(&mut bytes, entry_offset + 1 + 16 + 14);
        set_bit(&mut bytes, entry_offset + 1 + 16 + 15);

        let encoded = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(&bytes);
        let consent = parse_tcf_v2(&encoded).expect("valid consent string");

        assert_eq!(consent.vendor_consent, vec![5, 6, 7]);
        assert!(consent.has_vendor(6));
        assert!(!consent.has_vendor(4));
        assert!(!consent.has_vendor(8));
    }
}
