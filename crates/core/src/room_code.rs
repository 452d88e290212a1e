//! Room codes for sessions and campaigns
//!
//! Code format: `<prefix><6 digits>`, e.g. `S042917` for a session or
//! `C300122` for a campaign. Codes are compared by exact string equality;
//! the spaced form from [`format_body`] is for display only.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};

/// Number of digits after the prefix
pub const BODY_LENGTH: usize = 6;

/// Full code length including the prefix
pub const CODE_LENGTH: usize = BODY_LENGTH + 1;

/// Attempts made by [`generate_unique`] before falling back
pub const MAX_ATTEMPTS: u32 = 100;

/// What a room code addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomKind {
    Session = 0,
    Campaign = 1,
}

/// Prefix character per kind, indexed by discriminant
const PREFIXES: [(RoomKind, char); 2] = [(RoomKind::Session, 'S'), (RoomKind::Campaign, 'C')];

impl RoomKind {
    pub fn prefix(self) -> char {
        PREFIXES[self as usize].1
    }

    pub fn from_prefix(prefix: char) -> Option<Self> {
        PREFIXES
            .iter()
            .find(|(_, p)| *p == prefix)
            .map(|(kind, _)| *kind)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RoomKind::Session => "session",
            RoomKind::Campaign => "campaign",
        }
    }

    pub fn all() -> [RoomKind; 2] {
        [RoomKind::Session, RoomKind::Campaign]
    }
}

impl fmt::Display for RoomKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for RoomKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "session" => Ok(RoomKind::Session),
            "campaign" => Ok(RoomKind::Campaign),
            other => Err(Error::InvalidArgument(format!(
                "unknown room kind '{}'",
                other
            ))),
        }
    }
}

/// A well-formed room code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomCode {
    kind: RoomKind,
    code: String,
}

impl RoomCode {
    /// Parse a code, returning `None` when it is malformed
    pub fn parse(code: &str) -> Option<Self> {
        parse(code).map(|parsed| Self::from_parts(parsed.kind, &parsed.body))
    }

    fn from_parts(kind: RoomKind, body: &str) -> Self {
        let mut code = String::with_capacity(CODE_LENGTH);
        code.push(kind.prefix());
        code.push_str(body);
        Self { kind, code }
    }

    pub fn kind(&self) -> RoomKind {
        self.kind
    }

    /// The six digits after the prefix
    pub fn body(&self) -> &str {
        &self.code[1..]
    }

    pub fn as_str(&self) -> &str {
        &self.code
    }

    /// Human-friendly form, e.g. `S042 917`
    pub fn formatted(&self) -> String {
        format!("{}{}", self.kind.prefix(), format_body(self.body()))
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

impl FromStr for RoomCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
            .ok_or_else(|| Error::InvalidArgument(format!("malformed room code '{}'", s)))
    }
}

impl TryFrom<String> for RoomCode {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> Self {
        code.code
    }
}

/// Result of a successful [`parse`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRoomCode {
    pub kind: RoomKind,
    pub body: String,
}

/// Outcome of [`generate_unique`]
#[derive(Debug, Clone)]
pub struct MintedCode {
    pub code: RoomCode,
    /// Candidates drawn before a free one was found
    pub attempts: u32,
    /// Set when every attempt collided and the timestamp fallback was used.
    /// The fallback code is not checked against the existing set.
    pub exhausted: bool,
}

/// Check that `body` is exactly six ASCII decimal digits
pub fn is_valid_body(body: &str) -> bool {
    body.len() == BODY_LENGTH && body.bytes().all(|b| b.is_ascii_digit())
}

/// Split a full code into kind and body.
///
/// Malformed input is an ordinary outcome here, so this returns `None`
/// rather than an error.
pub fn parse(code: &str) -> Option<ParsedRoomCode> {
    if code.len() != CODE_LENGTH {
        return None;
    }

    let mut chars = code.chars();
    let kind = RoomKind::from_prefix(chars.next()?)?;
    let body = chars.as_str();

    is_valid_body(body).then(|| ParsedRoomCode {
        kind,
        body: body.to_string(),
    })
}

/// Insert a space after every group of three characters
pub fn format_body(body: &str) -> String {
    let chars: Vec<char> = body.chars().collect();
    chars
        .chunks(3)
        .map(|group| group.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Generate a random code of the given kind. Leading zeros are allowed.
pub fn generate<R: Rng + ?Sized>(kind: RoomKind, rng: &mut R) -> RoomCode {
    let body: String = (0..BODY_LENGTH)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect();
    RoomCode::from_parts(kind, &body)
}

/// Generate a code that is not in `existing`.
///
/// `existing` should hold every live code of both kinds; the prefix keeps
/// kinds apart, so mixing them is harmless.
pub fn generate_unique<R: Rng + ?Sized>(
    kind: RoomKind,
    existing: &HashSet<String>,
    rng: &mut R,
) -> MintedCode {
    mint_unique(kind, existing, rng, |kind, rng| generate(kind, rng))
}

/// Retry loop behind [`generate_unique`] with a pluggable candidate source
pub fn mint_unique<R, F>(
    kind: RoomKind,
    existing: &HashSet<String>,
    rng: &mut R,
    mut candidate: F,
) -> MintedCode
where
    R: Rng + ?Sized,
    F: FnMut(RoomKind, &mut R) -> RoomCode,
{
    for attempt in 1..=MAX_ATTEMPTS {
        let code = candidate(kind, &mut *rng);
        if !existing.contains(code.as_str()) {
            return MintedCode {
                code,
                attempts: attempt,
                exhausted: false,
            };
        }
    }

    let code = fallback_code(kind, Utc::now().timestamp_millis(), rng);
    warn!(
        %kind,
        %code,
        attempts = MAX_ATTEMPTS,
        "Room code attempts exhausted, using timestamp fallback"
    );

    MintedCode {
        code,
        attempts: MAX_ATTEMPTS,
        exhausted: true,
    }
}

/// Last three digits of the timestamp followed by three random digits
fn fallback_code<R: Rng + ?Sized>(kind: RoomKind, millis: i64, rng: &mut R) -> RoomCode {
    let stamp = millis.rem_euclid(1000);
    let suffix: u16 = rng.gen_range(0..1000);
    RoomCode::from_parts(kind, &format!("{:03}{:03}", stamp, suffix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn codes(list: &[&str]) -> HashSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn scripted(list: &[&str]) -> impl FnMut(RoomKind, &mut StdRng) -> RoomCode {
        let mut script: Vec<RoomCode> = list.iter().map(|s| s.parse().unwrap()).collect();
        script.reverse();
        move |_: RoomKind, _: &mut StdRng| script.pop().expect("script ran out")
    }

    #[test]
    fn test_prefix_table_matches_discriminants() {
        for kind in RoomKind::all() {
            assert_eq!(PREFIXES[kind as usize].0, kind);
            assert_eq!(RoomKind::from_prefix(kind.prefix()), Some(kind));
        }
        assert_eq!(RoomKind::Session.prefix(), 'S');
        assert_eq!(RoomKind::Campaign.prefix(), 'C');
        assert_eq!(RoomKind::from_prefix('X'), None);
    }

    #[test]
    fn test_generate_roundtrip() {
        let mut rng = StdRng::seed_from_u64(7);
        for kind in RoomKind::all() {
            for _ in 0..500 {
                let code = generate(kind, &mut rng);
                assert_eq!(code.as_str().len(), CODE_LENGTH);

                let parsed = parse(code.as_str()).unwrap();
                assert_eq!(parsed.kind, kind);
                assert_eq!(parsed.body, code.body());
            }
        }
    }

    #[test]
    fn test_generate_allows_leading_zeros() {
        let mut rng = StdRng::seed_from_u64(11);
        let seen_zero = (0..2000)
            .map(|_| generate(RoomKind::Session, &mut rng))
            .any(|code| code.body().starts_with('0'));
        assert!(seen_zero);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("S12"), None);
        assert_eq!(parse("X123456"), None);
        assert_eq!(parse("S12345a"), None);
        assert_eq!(parse("S1234567"), None);
        assert_eq!(parse("s123456"), None);
        assert_eq!(parse("S12 456"), None);
    }

    #[test]
    fn test_parse_campaign() {
        let parsed = parse("C000042").unwrap();
        assert_eq!(parsed.kind, RoomKind::Campaign);
        assert_eq!(parsed.body, "000042");
    }

    #[test]
    fn test_is_valid_body() {
        assert!(is_valid_body("000000"));
        assert!(is_valid_body("987654"));
        assert!(!is_valid_body("12345"));
        assert!(!is_valid_body("1234567"));
        assert!(!is_valid_body("12a456"));
        assert!(!is_valid_body("١٢٣٤٥٦"));
    }

    #[test]
    fn test_generate_unique_scripted() {
        let existing = codes(&["S000001", "S000002"]);
        let mut rng = StdRng::seed_from_u64(0);

        let minted = mint_unique(
            RoomKind::Session,
            &existing,
            &mut rng,
            scripted(&["S000001", "S000003"]),
        );

        assert_eq!(minted.code.as_str(), "S000003");
        assert_eq!(minted.attempts, 2);
        assert!(!minted.exhausted);
    }

    #[test]
    fn test_generate_unique_after_many_collisions() {
        let taken: Vec<String> = (0..40).map(|i| format!("C{:06}", i)).collect();
        let existing: HashSet<String> = taken.iter().cloned().collect();

        let mut script: Vec<&str> = taken.iter().map(|s| s.as_str()).collect();
        script.push("C999999");

        let mut rng = StdRng::seed_from_u64(0);
        let minted = mint_unique(RoomKind::Campaign, &existing, &mut rng, scripted(&script));

        assert_eq!(minted.code.as_str(), "C999999");
        assert_eq!(minted.attempts, 41);
    }

    #[test]
    fn test_generate_unique_exhaustion_falls_back() {
        let existing = codes(&["S111111"]);
        let mut rng = StdRng::seed_from_u64(3);
        let always = vec!["S111111"; MAX_ATTEMPTS as usize];

        let minted = mint_unique(RoomKind::Session, &existing, &mut rng, scripted(&always));

        assert!(minted.exhausted);
        assert_eq!(minted.attempts, MAX_ATTEMPTS);
        assert_eq!(minted.code.kind(), RoomKind::Session);
        assert!(parse(minted.code.as_str()).is_some());
    }

    #[test]
    fn test_fallback_uses_timestamp_digits() {
        let mut rng = StdRng::seed_from_u64(5);
        let code = fallback_code(RoomKind::Campaign, 1_700_000_000_042, &mut rng);
        assert!(code.as_str().starts_with("C042"));
        assert!(is_valid_body(code.body()));
    }

    #[test]
    fn test_generate_unique_avoids_existing() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut existing = HashSet::new();
        for _ in 0..200 {
            let minted = generate_unique(RoomKind::Session, &existing, &mut rng);
            assert!(!minted.exhausted);
            assert!(existing.insert(minted.code.to_string()));
        }
    }

    #[test]
    fn test_format_body() {
        assert_eq!(format_body("123456"), "123 456");
        assert_eq!(format_body("1234"), "123 4");
        assert_eq!(format_body(""), "");

        let code: RoomCode = "S042917".parse().unwrap();
        assert_eq!(code.formatted(), "S042 917");
    }

    #[test]
    fn test_serde_validates() {
        let code: RoomCode = serde_json::from_str("\"C123456\"").unwrap();
        assert_eq!(code.kind(), RoomKind::Campaign);
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"C123456\"");

        assert!(serde_json::from_str::<RoomCode>("\"Z123456\"").is_err());
    }
}
