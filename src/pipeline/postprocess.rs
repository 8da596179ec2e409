//! Post-processing: deterministic cleanup of model-transcribed Markdown.
//!
//! Even well-prompted models occasionally wrap their whole answer in a
//! ` ```markdown ` fence, emit CRLF line endings, or produce a pipe table
//! without its separator row. These are structural defects, not content
//! defects, so they are fixed here with cheap string rules instead of
//! burdening the prompt with formatting edge-cases. Each rule is a pure
//! `&str → String` function with its own tests.
//!
//! Rule order matters: fences are stripped before anything else so the
//! remaining rules see clean input, and the final-newline pass runs last.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to raw transcription output.
pub fn clean_markdown(input: &str) -> String {
    let s = strip_outer_fence(input);
    let s = normalise_line_endings(&s);
    let s = trim_line_ends(&s);
    let s = collapse_blank_runs(&s);
    let s = insert_missing_table_separators(&s);
    ensure_final_newline(&s)
}

// ── Rule 1: strip a fence wrapping the whole output ──────────────────────

static OUTER_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:markdown)?\n(.*)\n```\s*$").unwrap());

fn strip_outer_fence(input: &str) -> String {
    match OUTER_FENCE.captures(input.trim()) {
        Some(caps) => caps[1].to_string(),
        None => input.to_string(),
    }
}

// ── Rule 2: CRLF / CR → LF ───────────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 3: trim trailing whitespace per line ────────────────────────────

fn trim_line_ends(input: &str) -> String {
    input
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 4: collapse runs of 3+ blank lines down to 2 ────────────────────

static BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{4,}").unwrap());

fn collapse_blank_runs(input: &str) -> String {
    BLANK_RUN.replace_all(input, "\n\n\n").into_owned()
}

// ── Rule 5: insert a GFM separator row after a bare table header ─────────

fn insert_missing_table_separators(input: &str) -> String {
    let lines: Vec<&str> = input.lines().collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len() + 4);
    let mut prev_was_table = false;

    for (i, line) in lines.iter().enumerate() {
        out.push((*line).to_string());

        // A table header is the first pipe row of a block whose next line is
        // a data row rather than a separator.
        if is_pipe_row(line) && !prev_was_table && !is_separator_row(line) {
            let next = lines.get(i + 1).copied().unwrap_or("");
            if is_pipe_row(next) && !is_separator_row(next) {
                let columns = line.matches('|').count().saturating_sub(1).max(1);
                let mut sep = String::from("|");
                for _ in 0..columns {
                    sep.push_str(" --- |");
                }
                out.push(sep);
            }
        }

        prev_was_table = is_pipe_row(line);
    }

    out.join("\n")
}

fn is_pipe_row(line: &str) -> bool {
    let t = line.trim();
    t.len() > 2 && t.starts_with('|') && t.ends_with('|')
}

fn is_separator_row(line: &str) -> bool {
    let t = line.trim();
    t.starts_with('|') && t.chars().all(|c| matches!(c, '|' | '-' | ':' | ' '))
}

// ── Rule 6: exactly one trailing newline ─────────────────────────────────

fn ensure_final_newline(input: &str) -> String {
    let trimmed = input.trim_end();
    if trimmed.is_empty() {
        "\n".to_string()
    } else {
        format!("{trimmed}\n")
    }
}
