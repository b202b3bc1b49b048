use chrono::{DateTime, Datelike, Days, NaiveTime, TimeZone, Utc};
use sha2::{Digest, Sha512_256};

use crate::error::Error;

const BASE32_ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";
const ADDRESS_LENGTH: usize = 58;
const PUBLIC_KEY_LENGTH: usize = 32;
const CHECKSUM_LENGTH: usize = 4;

pub fn parse_tuple_string(data: String) -> Vec<String> {
    if data.is_empty() {
        return vec![];
    }

    let str = &data[1..];
    let splited = str.split(",(");
    let mut items: Vec<String> = Vec::new();

    for c in splited {
        if let Some(index) = c.find(')') {
            let tuple_data = &c[0..index];
            items.push(tuple_data.to_owned());
        }
    }

    items
}

fn address_checksum(public_key: &[u8; PUBLIC_KEY_LENGTH]) -> [u8; CHECKSUM_LENGTH] {
    let digest = Sha512_256::digest(public_key);
    let mut checksum = [0u8; CHECKSUM_LENGTH];
    checksum.copy_from_slice(&digest[digest.len() - CHECKSUM_LENGTH..]);
    checksum
}

fn base32_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity((data.len() * 8).div_ceil(5));
    let mut buffer: u32 = 0;
    let mut bits = 0;

    for &byte in data {
        buffer = ((buffer << 8) | byte as u32) & 0xFFFF;
        bits += 8;

        while bits >= 5 {
            bits -= 5;
            out.push(BASE32_ALPHABET[((buffer >> bits) & 31) as usize] as char);
        }
    }

    if bits > 0 {
        out.push(BASE32_ALPHABET[((buffer << (5 - bits)) & 31) as usize] as char);
    }

    out
}

fn base32_decode(input: &str) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(input.len() * 5 / 8);
    let mut buffer: u32 = 0;
    let mut bits = 0;

    for c in input.bytes() {
        let value = BASE32_ALPHABET.iter().position(|&a| a == c)? as u32;
        buffer = (buffer << 5) | value;
        bits += 5;

        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
            buffer &= (1 << bits) - 1;
        }
    }

    // trailing padding bits must be zero
    if buffer != 0 {
        return None;
    }

    Some(out)
}

/// Algorand address of an ed25519 public key: base32 of key and checksum.
pub fn encode_address(public_key: &[u8; PUBLIC_KEY_LENGTH]) -> String {
    let mut data = Vec::with_capacity(PUBLIC_KEY_LENGTH + CHECKSUM_LENGTH);
    data.extend_from_slice(public_key);
    data.extend_from_slice(&address_checksum(public_key));
    base32_encode(&data)
}

/// Public key behind an Algorand address, verifying length and checksum.
pub fn decode_address(address: &str) -> Result<[u8; PUBLIC_KEY_LENGTH], Error> {
    let invalid = || {
        Error::ValidationFailure(format!("invalid algorand address {}", address))
    };

    if address.len() != ADDRESS_LENGTH {
        return Err(invalid());
    }

    let data = base32_decode(address).ok_or_else(invalid)?;
    if data.len() != PUBLIC_KEY_LENGTH + CHECKSUM_LENGTH {
        return Err(invalid());
    }

    let mut public_key = [0u8; PUBLIC_KEY_LENGTH];
    public_key.copy_from_slice(&data[..PUBLIC_KEY_LENGTH]);

    if data[PUBLIC_KEY_LENGTH..] != address_checksum(&public_key) {
        return Err(invalid());
    }

    Ok(public_key)
}

pub fn is_valid_address(address: &str) -> bool {
    decode_address(address).is_ok()
}

/// First instant strictly after `now` that falls on one of `times` (UTC).
pub fn next_daily_run(
    now: DateTime<Utc>,
    times: &[NaiveTime],
) -> Option<DateTime<Utc>> {
    let today = now.date_naive();

    [Some(today), today.checked_add_days(Days::new(1))]
        .into_iter()
        .flatten()
        .flat_map(|day| times.iter().map(move |time| day.and_time(*time)))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .filter(|candidate| *candidate > now)
        .min()
}

/// Monday 00:00 UTC of the week containing `now`.
pub fn start_of_week(now: DateTime<Utc>) -> DateTime<Utc> {
    let days_from_monday = now.weekday().num_days_from_monday() as u64;
    let monday = now
        .date_naive()
        .checked_sub_days(Days::new(days_from_monday))
        .unwrap_or(now.date_naive());

    Utc.from_utc_datetime(&monday.and_time(NaiveTime::MIN))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_parse_tuple_string() {
        let items =
            parse_tuple_string(String::from("(chip,1),(lp_v1,2),(lp_v2,3)"));
        assert_eq!(items, vec!["chip,1", "lp_v1,2", "lp_v2,3"]);
        assert!(parse_tuple_string(String::new()).is_empty());
    }

    #[test]
    fn test_zero_address() {
        let address = encode_address(&[0u8; 32]);
        assert_eq!(
            address,
            "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAY5HFKQ"
        );
        assert_eq!(decode_address(&address).unwrap(), [0u8; 32]);
    }

    #[test]
    fn test_address_round_trip_and_checksum() {
        let key: [u8; 32] = core::array::from_fn(|i| (i * 7 + 3) as u8);
        let address = encode_address(&key);

        assert_eq!(address.len(), 58);
        assert_eq!(decode_address(&address).unwrap(), key);

        // flip one character of the key part
        let mut tampered = address.into_bytes();
        tampered[0] = if tampered[0] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(tampered).unwrap();
        assert!(decode_address(&tampered).is_err());

        assert!(!is_valid_address("not-an-address"));
        assert!(!is_valid_address(""));
    }

    #[test]
    fn test_next_daily_run_same_day() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 4, 0, 0).unwrap();
        let times = [time(1, 45), time(5, 45), time(9, 45)];

        assert_eq!(
            next_daily_run(now, &times),
            Some(Utc.with_ymd_and_hms(2024, 3, 5, 5, 45, 0).unwrap())
        );
    }

    #[test]
    fn test_next_daily_run_rolls_over_to_tomorrow() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 22, 0, 0).unwrap();
        let times = [time(1, 45), time(21, 45)];

        assert_eq!(
            next_daily_run(now, &times),
            Some(Utc.with_ymd_and_hms(2024, 3, 6, 1, 45, 0).unwrap())
        );
    }

    #[test]
    fn test_next_daily_run_is_strictly_after_now() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 6, 0, 0).unwrap();
        let times = [time(0, 0), time(6, 0), time(12, 0)];

        assert_eq!(
            next_daily_run(now, &times),
            Some(Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap())
        );
        assert_eq!(next_daily_run(now, &[]), None);
    }

    #[test]
    fn test_start_of_week() {
        // Thursday
        let now = Utc.with_ymd_and_hms(2024, 3, 7, 15, 30, 0).unwrap();
        assert_eq!(
            start_of_week(now),
            Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap()
        );

        let monday = Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap();
        assert_eq!(start_of_week(monday), monday);
    }
}
