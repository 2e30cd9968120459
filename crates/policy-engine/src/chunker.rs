//! Packs a domain set into comma-terminated segments that fit on one device
//! configuration line.

use std::collections::BTreeSet;

/// Splits `domains` into segments of the form `a.com,b.com,`.
///
/// A domain joins the open segment only while
/// `segment.len() + domain.len() + 1 < max_segment_length`. A domain that does
/// not fit even on its own still gets a segment to itself; domains are never
/// split and no empty segment is produced. Iteration follows the set's
/// lexical order, so the output is reproducible.
pub fn chunk_domains(domains: &BTreeSet<String>, max_segment_length: usize) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();

    for domain in domains {
        if !current.is_empty() && current.len() + domain.len() + 1 >= max_segment_length {
            segments.push(std::mem::take(&mut current));
        }
        current.push_str(domain);
        current.push(',');
    }

    if !current.is_empty() {
        segments.push(current);
    }

    segments
}

/// Domains that cannot share a segment with anything and overrun the bound
/// even when emitted alone.
pub fn oversized_domains(domains: &BTreeSet<String>, max_segment_length: usize) -> Vec<&str> {
    domains
        .iter()
        .filter(|domain| domain.len() + 1 >= max_segment_length)
        .map(String::as_str)
        .collect()
}

/// Domains encoded in a segment, in order.
pub fn segment_domains(segment: &str) -> impl Iterator<Item = &str> {
    segment.split(',').filter(|domain| !domain.is_empty())
}
