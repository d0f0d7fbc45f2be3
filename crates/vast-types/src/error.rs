//! Error types for the vast-types crate.

/// Errors raised while navigating or comparing types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TypeError {
    /// An offset indexed past the end of a record's field list.
    #[error("offset {offset} out of bounds for record with {field_count} fields")]
    OffsetOutOfBounds { offset: String, field_count: usize },

    /// A non-empty offset was applied to a type that is not a record.
    #[error("type {type_name} is not a record, cannot descend into offset {offset}")]
    NotARecord { type_name: String, offset: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_offset_out_of_bounds() {
        let err = TypeError::OffsetOutOfBounds {
            offset: "0,3".to_string(),
            field_count: 2,
        };
        assert_eq!(
            err.to_string(),
            "offset 0,3 out of bounds for record with 2 fields"
        );
    }

    #[test]
    fn display_not_a_record() {
        let err = TypeError::NotARecord {
            type_name: "count".to_string(),
            offset: "0".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "type count is not a record, cannot descend into offset 0"
        );
    }
}
