// External crates
use tracing::instrument;

/// Number of leading header fields that precede the client address.
const HEADER_FIELDS: usize = 9;

/// Components split off from the left: header fields, address, dash and date.
const LEADING_COMPONENTS: usize = HEADER_FIELDS + 3;

/// Components split off from the right: status code and file size.
const TRAILING_COMPONENTS: usize = 2;

/// Total number of components a well-formed access log line yields.
pub const ACCESS_LOG_COMPONENTS: usize = LEADING_COMPONENTS + 1 + TRAILING_COMPONENTS;

/// One parsed HTTP access log line.
///
/// Only `status_code` and `file_size` feed the aggregation, the remaining
/// fields are carried for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessLog {
    /// Client address
    pub ip: String,
    /// Bracketed request date, brackets included
    pub date: String,
    /// Quoted request line, quotes included
    pub request: String,
    /// Response status code exactly as logged
    pub status_code: String,
    /// Bytes transferred
    pub file_size: u64,
}

impl AccessLog {
    /// Parses a raw access log line.
    ///
    /// The expected layout is nine space separated header fields followed by
    ///
    /// ```text
    /// <address> - [<date>] "<request>" <status code> <file size>
    /// ```
    ///
    /// The first twelve components are split from the left and the last two
    /// from the right, so the spaces inside the quoted request never count as
    /// separators. A line parses only when it yields exactly
    /// [`ACCESS_LOG_COMPONENTS`] components and the file size is a
    /// non-negative integer.
    ///
    /// Returns `None` for anything else. Callers skip such lines entirely.
    #[instrument(
        name = "log_stats_parser::access_log",
        target = "parser::parser::AccessLog",
        skip_all,
        level = "trace"
    )]
    pub fn parse(line: &str) -> Option<AccessLog> {
        let line = line.trim();
        if line.is_empty() {
            tracing::trace!("Empty line, nothing to parse");
            return None;
        }

        let leading: Vec<&str> = line.splitn(LEADING_COMPONENTS + 1, ' ').collect();
        if leading.len() != LEADING_COMPONENTS + 1 {
            tracing::trace!(
                log_line = %line,
                components = leading.len(),
                "Access log line has too few components"
            );
            return None;
        }

        let remainder = leading[LEADING_COMPONENTS];
        let trailing: Vec<&str> = remainder.rsplitn(TRAILING_COMPONENTS + 1, ' ').collect();
        if trailing.len() != TRAILING_COMPONENTS + 1 {
            tracing::trace!(
                log_line = %line,
                "Access log line is missing its request, status code or file size"
            );
            return None;
        }

        // rsplitn yields from the right: file size, status code, request
        let file_size = match trailing[0].parse::<u64>() {
            Ok(size) => size,
            Err(e) => {
                tracing::trace!(
                    log_line = %line,
                    error = %e,
                    "Access log file size is not a non-negative integer"
                );
                return None;
            }
        };

        Some(AccessLog {
            ip: leading[HEADER_FIELDS].to_string(),
            date: leading[HEADER_FIELDS + 2].to_string(),
            request: trailing[2].to_string(),
            status_code: trailing[1].to_string(),
            file_size,
        })
    }
}
