//! Heuristic classification of credential dump lines.
//!
//! Dumps mix `email:password`, `password:email`, emails with a stray comma
//! instead of a period, and bare usernames. Each line is run through an
//! ordered list of rules and the first rule that recovers a pair wins. The
//! rules overlap, so their order is part of the contract.
//!
//! Identifier matching is greedy: for `a@b.com:p.ss:x` the identifier is
//! `a@b.com:p.ss` and the secret `x`, because the last usable `.` decides
//! where the identifier may end.
use memchr::memrchr;

use crate::config::Separators;
use crate::credential::CredentialCandidate;

/// Bytes whose presence rules out the bare-identifier interpretation.
pub const BARE_DELIMITERS: [u8; 3] = [b':', b';', b'/'];

/// The rule that produced a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Heuristic {
    /// `identifier@domain.tld<sep>secret`
    Standard,
    /// `identifier@domain,tld<sep>secret`, commas rewritten to periods
    CommaCorrected,
    /// `secret<sep>identifier@domain.tld`
    Swapped,
    /// No delimiter at all; the whole line is the identifier
    BareIdentifier,
}

impl Heuristic {
    pub fn label(self) -> &'static str {
        match self {
            Heuristic::Standard => "standard",
            Heuristic::CommaCorrected => "comma-corrected",
            Heuristic::Swapped => "swapped",
            Heuristic::BareIdentifier => "bare",
        }
    }
}

type Rule = fn(&[u8], &Separators) -> Option<(Vec<u8>, Vec<u8>)>;

const RULES: [(Heuristic, Rule); 4] = [
    (Heuristic::Standard, standard),
    (Heuristic::CommaCorrected, comma_in_identifier),
    (Heuristic::Swapped, swapped_fields),
    (Heuristic::BareIdentifier, bare_identifier),
];

/// Classify one line (without its terminator).
pub fn classify(line: &[u8], separators: &Separators) -> CredentialCandidate {
    match classify_detailed(line, separators) {
        Some((_, candidate)) => candidate,
        None => CredentialCandidate::Invalid,
    }
}

/// Like [`classify`], also reporting which rule matched. `None` means the
/// line is invalid.
pub fn classify_detailed(
    line: &[u8],
    separators: &Separators,
) -> Option<(Heuristic, CredentialCandidate)> {
    RULES.iter().find_map(|(heuristic, rule)| {
        rule(line, separators)
            .map(|(identifier, secret)| (*heuristic, CredentialCandidate::pair(identifier, secret)))
    })
}

fn split_at_separator(line: &[u8], pos: usize, len: usize) -> (Vec<u8>, Vec<u8>) {
    (line[..pos].to_vec(), line[pos + len..].to_vec())
}

fn standard(line: &[u8], separators: &Separators) -> Option<(Vec<u8>, Vec<u8>)> {
    let last = separators.last_start(line)?;
    // the dot needs at least one byte before a separator
    let dot = memrchr(b'.', &line[..last.checked_sub(1)?])?;
    memrchr(b'@', &line[..dot])?;
    let (pos, len) = separators.first_from(line, dot + 2)?;
    Some(split_at_separator(line, pos, len))
}

fn comma_in_identifier(line: &[u8], separators: &Separators) -> Option<(Vec<u8>, Vec<u8>)> {
    let last = separators.last_start(line)?;
    let comma = memrchr(b',', &line[..last.checked_sub(1)?])?;
    // at least one byte between '@' and the comma
    memrchr(b'@', &line[..comma.checked_sub(1)?])?;
    let (pos, len) = separators.first_from(line, comma + 2)?;
    let (mut identifier, secret) = split_at_separator(line, pos, len);
    for b in identifier.iter_mut().filter(|b| **b == b',') {
        *b = b'.';
    }
    Some((identifier, secret))
}

fn swapped_fields(line: &[u8], separators: &Separators) -> Option<(Vec<u8>, Vec<u8>)> {
    let (pos, len) = separators
        .occurrences(line)
        .rev()
        .find(|&(pos, len)| looks_like_email(&line[pos + len..]))?;
    let (secret, mut identifier) = split_at_separator(line, pos, len);
    if let Some(comma) = memchr::memchr(b',', &identifier) {
        identifier[comma] = b'.';
    }
    Some((identifier, secret))
}

fn bare_identifier(line: &[u8], _separators: &Separators) -> Option<(Vec<u8>, Vec<u8>)> {
    if line.iter().any(|b| BARE_DELIMITERS.contains(b)) {
        return None;
    }
    Some((line.to_vec(), Vec::new()))
}

/// An '@' followed later by a '.' that is not the final byte.
fn looks_like_email(field: &[u8]) -> bool {
    let Some(end) = field.len().checked_sub(1) else {
        return false;
    };
    match memrchr(b'.', &field[..end]) {
        Some(dot) => memrchr(b'@', &field[..dot]).is_some(),
        None => false,
    }
}
