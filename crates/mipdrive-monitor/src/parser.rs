//! Line parser for the engine's MIP progress log.
//!
//! The log is split in three phases. Preparation output comes first, then a
//! header line starting with `Proc. InQueue` opens the iteration table, and a
//! `Solving report` line closes it. Only rows inside the table carry
//! progress.

use serde::Serialize;

/// Number of fields in a progress row, excluding the optional status token.
const ROW_FIELDS: usize = 12;

/// One row of the iteration table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveProgress {
    /// Relative gap as a fraction; `+inf` when no incumbent exists.
    pub relative_gap: f64,
    pub primal_bound: f64,
    pub dual_bound: f64,
    pub cut_count: u64,
    /// Cumulative LP iterations.
    pub lp_iteration_count: u64,
}

/// Parser position within the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParsePhase {
    #[default]
    Preparation,
    Iteration,
    /// Terminal.
    Report,
}

/// Something a log line announced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineEvent {
    Progress(SolveProgress),
    /// The report header was reached.
    Completed,
}

impl ParsePhase {
    /// Consume one line (without its terminator).
    pub fn advance(self, line: &str) -> (ParsePhase, Option<LineEvent>) {
        if self == ParsePhase::Report {
            return (self, None);
        }
        if is_iteration_header(line) {
            return (ParsePhase::Iteration, None);
        }
        if is_report_header(line) {
            return (ParsePhase::Report, Some(LineEvent::Completed));
        }
        match self {
            ParsePhase::Iteration => (self, parse_progress(line).map(LineEvent::Progress)),
            _ => (self, None),
        }
    }

    pub fn is_terminal(self) -> bool {
        self == ParsePhase::Report
    }
}

/// Newer HiGHS releases prefix the column header with a `Src` column, so the
/// `Proc. InQueue` pair may appear anywhere in the line.
fn is_iteration_header(line: &str) -> bool {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    tokens.windows(2).any(|pair| pair == ["Proc.", "InQueue"])
}

fn is_report_header(line: &str) -> bool {
    line.trim_end_matches(['\r', '\n']) == "Solving report"
}

/// Parse a single iteration table row.
///
/// Rows start with whitespace, may carry a one-character status token
/// (`L`, `T`, `H`, ...), then hold the fixed fields
/// `nodes queue leaves explored dual primal gap cuts inlp confl lpiters time`.
/// Returns `None` for anything else, including rows whose numbers fail to
/// parse.
pub fn parse_progress(line: &str) -> Option<SolveProgress> {
    let line = line.trim_end_matches(['\r', '\n']);
    let indent = line.chars().take_while(|c| c.is_whitespace()).count();
    if indent == 0 {
        return None;
    }

    let tokens: Vec<&str> = line.split_whitespace().collect();
    let fields = match tokens.len() {
        n if n == ROW_FIELDS + 1 && is_status_token(tokens[0]) => &tokens[1..],
        // Without a status token the row needs a gap on both sides of the
        // empty token slot.
        n if n == ROW_FIELDS && indent >= 2 => &tokens[..],
        _ => return None,
    };

    let digits = [0, 1, 2, 8, 9, 10];
    if !digits.iter().all(|&i| is_digits(fields[i])) {
        return None;
    }

    Some(SolveProgress {
        dual_bound: parse_number(fields[4])?,
        primal_bound: parse_number(fields[5])?,
        relative_gap: parse_number(fields[6])?,
        cut_count: fields[7].parse().ok()?,
        lp_iteration_count: fields[10].parse().ok()?,
    })
}

/// Parse a numeric log field: `inf`, a percentage, or a plain float.
pub fn parse_number(token: &str) -> Option<f64> {
    if token == "inf" {
        return Some(f64::INFINITY);
    }
    let value = match token.strip_suffix('%') {
        Some(percent) => percent.parse::<f64>().ok()? / 100.0,
        None => token.parse::<f64>().ok()?,
    };
    if value.is_nan() { None } else { Some(value) }
}

fn is_status_token(token: &str) -> bool {
    let mut chars = token.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(c), None) if c.is_ascii_alphanumeric() || c == '_'
    )
}

fn is_digits(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}
