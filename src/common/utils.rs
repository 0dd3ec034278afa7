//! Utility functions for tableside

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Percent-encoding set for path segments (includes /, %, and control chars)
const SEGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b'/')
    .add(b'%')
    .add(b' ')
    .add(b'?')
    .add(b'#')
    .add(b'&');

/// Encode an identifier for use as a single URL path segment
pub fn encode_segment(id: &str) -> String {
    utf8_percent_encode(id, SEGMENT_ENCODE_SET).to_string()
}

/// Parse duration string (e.g., "500ms", "30s", "5m", "1h")
pub fn parse_duration(s: &str) -> crate::Result<std::time::Duration> {
    let s = s.trim();
    if s.is_empty() {
        return Err(crate::Error::InvalidConfig("empty duration".into()));
    }

    let (num_str, unit) = if let Some(num) = s.strip_suffix("ms") {
        (num, "ms")
    } else {
        let split = s.len() - s.chars().last().map_or(0, char::len_utf8);
        (&s[..split], &s[split..])
    };

    let num: u64 = num_str
        .parse()
        .map_err(|_| crate::Error::InvalidConfig(format!("invalid duration: {}", s)))?;

    let out_of_range = || crate::Error::InvalidConfig(format!("duration out of range: {}", s));
    let duration = match unit {
        "ms" => std::time::Duration::from_millis(num),
        "s" => std::time::Duration::from_secs(num),
        "m" => std::time::Duration::from_secs(num.checked_mul(60).ok_or_else(out_of_range)?),
        "h" => std::time::Duration::from_secs(num.checked_mul(3600).ok_or_else(out_of_range)?),
        _ => {
            return Err(crate::Error::InvalidConfig(format!(
                "unknown duration unit: {}",
                unit
            )))
        }
    };

    Ok(duration)
}

/// Validate an identifier (table or customer id): non-empty, bounded, printable
pub fn validate_id(field: &str, id: &str) -> crate::Result<()> {
    if id.trim().is_empty() {
        return Err(crate::Error::Validation(format!("{} cannot be empty", field)));
    }

    if id.len() > 128 {
        return Err(crate::Error::Validation(format!(
            "{} too long (max 128 bytes)",
            field
        )));
    }

    if id.chars().any(|c| c.is_control()) {
        return Err(crate::Error::Validation(format!(
            "{} contains invalid characters",
            field
        )));
    }

    Ok(())
}

/// Resolves on Ctrl-C; used for graceful shutdown of the HTTP servers
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
