pub(crate) mod filesystem;
pub(crate) mod sqlite;

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::StoreError;

pub(crate) fn encode_system_time(value: SystemTime) -> Result<(i64, i64), StoreError> {
    let duration = value.duration_since(UNIX_EPOCH).map_err(|error| {
        StoreError::invalid_request(format!("timestamp predates unix epoch: {error}"))
    })?;
    Ok((
        duration.as_secs() as i64,
        i64::from(duration.subsec_nanos()),
    ))
}

pub(crate) fn decode_system_time(seconds: i64, nanos: i64) -> Result<SystemTime, StoreError> {
    if seconds < 0 {
        return Err(StoreError::corrupted(format!(
            "timestamp seconds must be non-negative, got {seconds}"
        )));
    }
    if !(0..1_000_000_000).contains(&nanos) {
        return Err(StoreError::corrupted(format!(
            "timestamp nanos must be in [0, 1_000_000_000), got {nanos}"
        )));
    }
    Ok(UNIX_EPOCH + Duration::new(seconds as u64, nanos as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_time_encoding_keeps_subsecond_precision() {
        let value = UNIX_EPOCH + Duration::new(1_700_000_000, 123_456_789);
        let (secs, nanos) = encode_system_time(value).expect("time should encode");
        assert_eq!(
            decode_system_time(secs, nanos).expect("time should decode"),
            value
        );
    }

    #[test]
    fn decode_rejects_out_of_range_nanos() {
        let error = decode_system_time(1, 1_000_000_000).expect_err("nanos overflow should fail");
        assert_eq!(error.kind, crate::StoreErrorKind::Corrupted);
    }
}
