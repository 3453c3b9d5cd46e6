//! Cursor-based pagination for the audit listing.

use serde::{Deserialize, Serialize};

use crate::RpcError;

/// Default page size when `count` is not specified.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Maximum allowed page size.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Pagination parameters accepted by list endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationParams {
    /// Opaque cursor from a previous response (hex-encoded offset).
    pub cursor: Option<String>,
    /// Number of items per page (default 100, max 1000).
    pub count: Option<u32>,
}

impl PaginationParams {
    /// Resolve effective page size, clamped to [1, MAX_PAGE_SIZE].
    pub fn effective_count(&self) -> u32 {
        self.count
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    /// Decode the cursor to a numeric offset; an absent cursor is the start.
    pub fn decode_offset(&self) -> Result<u64, RpcError> {
        match self.cursor.as_deref().map(str::trim) {
            None | Some("") => Ok(0),
            Some(c) => decode_cursor(c)
                .ok_or_else(|| RpcError::Validation(format!("invalid cursor '{c}'"))),
        }
    }
}

/// Pagination metadata included in list responses.
#[derive(Debug, Clone, Serialize)]
pub struct PaginationMeta {
    /// Cursor to pass for the next page, or `None` if this is the last page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

/// Encode a numeric offset into an opaque cursor string.
pub fn encode_cursor(offset: u64) -> String {
    hex::encode(offset.to_be_bytes())
}

/// Decode a cursor string back to a numeric offset.
pub fn decode_cursor(cursor: &str) -> Option<u64> {
    let mut bytes = [0u8; 8];
    hex::decode_to_slice(cursor, &mut bytes).ok()?;
    Some(u64::from_be_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_roundtrip() {
        for offset in [0u64, 1, 42, 100, 999, 123456789] {
            let encoded = encode_cursor(offset);
            assert_eq!(decode_cursor(&encoded), Some(offset), "roundtrip failed for {offset}");
        }
    }

    #[test]
    fn malformed_cursor_is_rejected() {
        let p = PaginationParams {
            cursor: Some("not-hex".into()),
            count: None,
        };
        assert!(matches!(p.decode_offset(), Err(RpcError::Validation(_))));
        assert_eq!(decode_cursor("00ff"), None);
    }

    #[test]
    fn missing_cursor_starts_at_zero() {
        assert_eq!(PaginationParams::default().decode_offset().unwrap(), 0);
    }

    #[test]
    fn effective_count_defaults() {
        assert_eq!(PaginationParams::default().effective_count(), 100);
    }

    #[test]
    fn effective_count_clamps() {
        let p = PaginationParams {
            cursor: None,
            count: Some(5000),
        };
        assert_eq!(p.effective_count(), 1000);
        let p = PaginationParams {
            cursor: None,
            count: Some(0),
        };
        assert_eq!(p.effective_count(), 1);
    }
}
