use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::{DomainError, DomainResult};

/// The category label the oracle uses for "make this a day off".
pub const REST_LABEL: &str = "休み";

/// Direct change of one (employee, date) cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinEdit {
    pub employee_name: String,
    pub date: NaiveDate,
    /// A category name, or `休み` for a day off.
    pub new_job_type: String,
}

/// Aggregate change of an (employee, category) monthly count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustEdit {
    pub employee_name: String,
    pub job_type: String,
    pub action: AdjustAction,
    #[serde(default)]
    pub amount: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustAction {
    Increase,
    Decrease,
    Set,
}

/// One element of the oracle's edit list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScheduleEdit {
    Pin(PinEdit),
    Adjust(AdjustEdit),
}

/// Parse the oracle's response into an edit list. The response may wrap the
/// JSON array in markdown fences or prose and may carry trailing commas;
/// everything else is a `ParseFailed`.
pub fn parse_edit_list(raw: &str) -> DomainResult<Vec<ScheduleEdit>> {
    let mut text = raw.trim().to_string();

    if text.contains("```") {
        text = extract_fenced_block(&text);
    }

    if let (Some(start), Some(end)) = (text.find('['), text.rfind(']')) {
        if start < end {
            text = text[start..=end].to_string();
        }
    }

    let text = strip_trailing_commas(&text);

    serde_json::from_str(&text).map_err(|e| DomainError::ParseFailed(e.to_string()))
}

/// Keep only the lines inside the first ``` fence pair.
fn extract_fenced_block(text: &str) -> String {
    let mut inside = false;
    let mut lines = Vec::new();
    for line in text.lines() {
        let fence = line.trim_start().starts_with("```");
        if fence && !inside {
            inside = true;
            continue;
        }
        if fence && inside {
            break;
        }
        if inside {
            lines.push(line);
        }
    }
    lines.join("\n")
}

/// Remove commas that directly precede a closing `]` or `}`, outside string
/// literals.
fn strip_trailing_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                let next = text[i + 1..].chars().find(|c| !c.is_whitespace());
                if !matches!(next, Some(']' | '}')) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }
    out
}
