//! Base58 encoding and decoding with optional checksum support.
//!
//! Raw Base58 over the Bitcoin alphabet, plus Base58Check (payload with a
//! 4-byte double-SHA-256 checksum) as used by WIF keys and addresses.

use crate::PrimitivesError;
use crate::hash::sha256d;

/// Encode a byte slice to a Base58 string.
///
/// Uses Bitcoin's modified Base58 alphabet. Leading zero bytes
/// are encoded as leading '1' characters.
///
/// # Arguments
/// * `data` - The bytes to encode.
///
/// # Returns
/// A Base58-encoded string.
pub fn encode(data: &[u8]) -> String {
    bs58::encode(data).with_alphabet(bs58::Alphabet::BITCOIN).into_string()
}

/// Decode a Base58 string to a byte vector.
///
/// Leading '1' characters decode to leading zero bytes.
///
/// # Arguments
/// * `s` - The Base58 string to decode.
///
/// # Returns
/// `Ok(Vec<u8>)` on success, or an error for invalid characters.
pub fn decode(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    bs58::decode(s)
        .with_alphabet(bs58::Alphabet::BITCOIN)
        .into_vec()
        .map_err(|e| PrimitivesError::InvalidBase58(e.to_string()))
}

/// Encode a byte slice with a 4-byte double-SHA-256 checksum appended (Base58Check).
///
/// The checksum is the first 4 bytes of SHA-256d(data). The result
/// is `encode(data || checksum)`.
///
/// # Arguments
/// * `data` - The bytes to encode (typically version byte + payload).
///
/// # Returns
/// A Base58Check-encoded string.
pub fn check_encode(data: &[u8]) -> String {
    let checksum = sha256d(data);
    let mut payload = data.to_vec();
    payload.extend_from_slice(&checksum[..4]);
    encode(&payload)
}

/// Decode a Base58Check string, verifying the 4-byte checksum.
///
/// Strips and validates the trailing 4-byte double-SHA-256 checksum.
///
/// # Arguments
/// * `s` - The Base58Check string to decode.
///
/// # Returns
/// `Ok(Vec<u8>)` of the payload (without checksum) on success, or an
/// error for invalid encoding or checksum mismatch.
pub fn check_decode(s: &str) -> Result<Vec<u8>, PrimitivesError> {
    let decoded = decode(s)?;
    if decoded.len() < 4 {
        return Err(PrimitivesError::InvalidBase58(
            "data too short for checksum".to_string()
        ));
    }
    let (payload, checksum) = decoded.split_at(decoded.len() - 4);
    let expected = sha256d(payload);
    if checksum != &expected[..4] {
        return Err(PrimitivesError::ChecksumMismatch);
    }
    Ok(payload.to_vec())
}

/// Base58Check-encode a payload behind a single version byte.
///
/// Addresses and WIF keys both take this shape: `version || payload || checksum`.
pub fn check_encode_versioned(version: u8, payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(payload.len() + 1);
    data.push(version);
    data.extend_from_slice(payload);
    check_encode(&data)
}

/// Decode a Base58Check string and split off its leading version byte.
///
/// # Returns
/// `Ok((version, payload))`, or an error if the checksum fails or nothing
/// is left once the checksum is removed.
pub fn check_decode_versioned(s: &str) -> Result<(u8, Vec<u8>), PrimitivesError> {
    let mut data = check_decode(s)?;
    if data.is_empty() {
        return Err(PrimitivesError::InvalidBase58("missing version byte".to_string()));
    }
    let version = data.remove(0);
    Ok((version, data))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---- raw Base58 ----

    #[test]
    fn test_encode_scalars() {
        let vectors = [
            (
                "7c076ff316692a3d7eb3c3bb0f8b1488cf72e1afcd929e29307032997a838a3d",
                "9MA8fRQrT4u8Zj8ZRd6MAiiyaxb2Y1CMpvVkHQu5hVM6",
            ),
            (
                "eff69ef2b1bd93a66ed5219add4fb51e11a840f404876325a1e8ffe0529a2c",
                "4fE3H2E6XMp4SsxtwinF7w9a34ooUrwWe4WsW1458Pd",
            ),
            (
                "c7207fee197d27c618aea621406f6bf5ef6fca38681d82b2f06fddbdce6feab6",
                "EQJsjkd6JaGwxrjEhfeqPenqHwrBmPQZjJGNSCHBkcF7",
            ),
        ];
        for (hex_str, expected) in vectors {
            let bytes = hex::decode(hex_str).unwrap();
            assert_eq!(encode(&bytes), expected);
            assert_eq!(decode(expected).unwrap(), bytes);
        }
    }

    #[test]
    fn test_leading_zero_bytes_become_ones() {
        let bytes = hex::decode("000000000000287fb4cd").unwrap();
        assert_eq!(encode(&bytes), "111111233QC4");
        assert_eq!(decode("111111233QC4").unwrap(), bytes);
        assert_eq!(encode(&[]), "");
    }

    #[test]
    fn test_decode_rejects_characters_outside_alphabet() {
        for bad in ["0OIl", "9MA8fRQr0", "abc def"] {
            assert!(matches!(decode(bad), Err(PrimitivesError::InvalidBase58(_))));
        }
    }

    // ---- Base58Check ----

    #[test]
    fn test_check_decode_wif_payloads() {
        let (version, payload) =
            check_decode_versioned("cMahea7zqjxrtgAbB7LSGbcQUr1uX1ojuat9jZodMN8rFTv2sfUK").unwrap();
        assert_eq!(version, 0xef);
        assert_eq!(payload.len(), 33);
        assert_eq!(payload[32], 0x01);
        assert_eq!(u64::from_be_bytes(payload[24..32].try_into().unwrap()), 5003);

        let (version, payload) =
            check_decode_versioned("5HpHagT65TZzG1PH3CSu63k8DbpvD8s5ip4njspTMFswxYHdKRx").unwrap();
        assert_eq!(version, 0x80);
        assert_eq!(payload.len(), 32);
    }

    #[test]
    fn test_check_decode_detects_corruption() {
        let mut corrupted = "KwDiBf89QgGbjEhKnhXJuH7LrciVrZi3qYjgiuQJv1h8Ytr2S53a".to_string();
        assert!(check_decode(&corrupted).is_ok());
        corrupted.replace_range(10..11, "h");
        assert!(matches!(
            check_decode(&corrupted),
            Err(PrimitivesError::ChecksumMismatch)
        ));
    }

    #[test]
    fn test_check_encode_versioned_p2sh_address() {
        let h160 = hex::decode("74d691da1574e6b3c192ecfb52cc8984ee7b6c56").unwrap();
        assert_eq!(
            check_encode_versioned(0x05, &h160),
            "3CLoMMyuoDQTPRD3XYZtCvgvkadrAdvdXh"
        );
    }

    #[test]
    fn test_check_decode_versioned_testnet_address() {
        let (version, payload) =
            check_decode_versioned("mzx5YhAH9kNHtcN481u6WkjeHjYtVeKVh2").unwrap();
        assert_eq!(version, 0x6f);
        assert_eq!(hex::encode(payload), "d52ad7ca9b3d096a38e752c2018e6fbc40cdf26f");
    }

    #[test]
    fn test_check_decode_too_short() {
        assert!(matches!(
            check_decode(&encode(&[1, 2, 3])),
            Err(PrimitivesError::InvalidBase58(_))
        ));
    }
}
