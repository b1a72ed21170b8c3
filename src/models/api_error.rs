use serde::Serialize;
use std::fmt;

/// Content of an `<error>` element embedded in an otherwise successful response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorMessage {
    pub message: String,
    /// Remaining child tags (e.g. the offending `rt` or `vid`) in document order.
    pub details: Vec<(String, String)>,
}

impl fmt::Display for ApiErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if !self.details.is_empty() {
            let details = self
                .details
                .iter()
                .map(|(tag, value)| format!("{}={}", tag, value))
                .collect::<Vec<_>>()
                .join(", ");
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}
