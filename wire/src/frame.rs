use crate::name::{Component, Name, NameError};

/// Largest delta-frame id in an epoch before the key-epoch wraps, given a sampling rate.
pub fn d_max(sampling_rate: u32) -> u32 {
    sampling_rate.saturating_sub(2)
}

/// Concatenates a conference prefix and a producer prefix into the two-component base
/// every frame and discovery name is built on.
pub fn producer_base(conference_prefix: &Name, producer_prefix: &Name) -> Name {
    conference_prefix.appended(producer_prefix.components().iter().cloned())
}

pub fn discovery_request_name(base: &Name) -> Name {
    base.with_text("discovery")
}

pub fn bare_key_request_name(base: &Name) -> Name {
    base.with_text("key")
}

pub fn bare_delta_request_name(base: &Name) -> Name {
    base.with_text("delta")
}

pub fn key_segment_name(base: &Name, key_id: u64, segment_index: u32) -> Name {
    base.with_text("key").with_seq(key_id).with_seq(u64::from(segment_index))
}

pub fn delta_segment_name(base: &Name, delta_id: u64, key_id: u64, segment_index: u32) -> Name {
    base.with_text("delta")
        .with_seq(delta_id)
        .with_text("paired-key")
        .with_seq(key_id)
        .with_seq(u64::from(segment_index))
}

pub fn discovery_response_name(discovery_request: &Name, key_id: u64, delta_id: u64) -> Name {
    discovery_request.with_seq(key_id).with_seq(delta_id)
}

pub fn is_discovery_request(name: &Name) -> bool {
    name.len() == 3 && matches!(name.get(2), Ok(Component::Text(s)) if s == "discovery")
}

pub fn is_bare_key_request(name: &Name) -> bool {
    name.len() == 3 && matches!(name.get(2), Ok(Component::Text(s)) if s == "key")
}

pub fn is_bare_delta_request(name: &Name) -> bool {
    name.len() == 3 && matches!(name.get(2), Ok(Component::Text(s)) if s == "delta")
}

pub fn is_key_segment_request(name: &Name) -> bool {
    name.len() == 5 && matches!(name.get(2), Ok(Component::Text(s)) if s == "key")
}

pub fn is_delta_segment_request(name: &Name) -> bool {
    name.len() == 7 && matches!(name.get(2), Ok(Component::Text(s)) if s == "delta")
}

/// `(key_id, segment_index)` parsed from a 5-component key segment name.
pub fn key_segment_identity(name: &Name) -> Result<(u64, u32), NameError> {
    let key_id = name.seq_at(3)?;
    let segment_index = name.seq_at(4)?;
    Ok((key_id, u32::try_from(segment_index).unwrap_or(u32::MAX)))
}

/// `(delta_id, key_id, segment_index)` parsed from a 7-component delta segment name.
pub fn delta_segment_identity(name: &Name) -> Result<(u64, u64, u32), NameError> {
    let delta_id = name.seq_at(3)?;
    let key_id = name.seq_at(5)?;
    let segment_index = name.seq_at(6)?;
    Ok((delta_id, key_id, u32::try_from(segment_index).unwrap_or(u32::MAX)))
}

/// `(key_id, delta_id)` parsed from a 5-component discovery response name.
pub fn discovery_response_identity(name: &Name) -> Result<(u64, u64), NameError> {
    let key_id = name.seq_at(3)?;
    let delta_id = name.seq_at(4)?;
    Ok((key_id, delta_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Name {
        producer_base(&Name::parse("/conf"), &Name::parse("/producer"))
    }

    #[test]
    fn discovery_request_has_three_components() {
        let name = discovery_request_name(&base());
        assert_eq!(name.len(), 3);
        assert!(is_discovery_request(&name));
    }

    #[test]
    fn key_segment_round_trips_identity() {
        let name = key_segment_name(&base(), 4, 7);
        assert!(is_key_segment_request(&name));
        assert_eq!(key_segment_identity(&name).unwrap(), (4, 7));
    }

    #[test]
    fn delta_segment_round_trips_identity() {
        let name = delta_segment_name(&base(), 12, 4, 2);
        assert!(is_delta_segment_request(&name));
        assert_eq!(delta_segment_identity(&name).unwrap(), (12, 4, 2));
    }

    #[test]
    fn bare_requests_are_distinguished_by_length_from_segment_requests() {
        let bare = bare_key_request_name(&base());
        let segment = key_segment_name(&base(), 0, 0);
        assert!(is_bare_key_request(&bare));
        assert!(!is_bare_key_request(&segment));
        assert!(!is_key_segment_request(&bare));
    }

    #[test]
    fn d_max_is_sampling_rate_minus_two() {
        assert_eq!(d_max(30), 28);
    }
}
