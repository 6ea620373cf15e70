//! Persisted RSM text format
//!
//! One record per line:
//!
//! ```text
//! StartState(id=0,nonterminal=Nonterminal("S"),isStart=true,isFinal=true)
//! State(id=0,nonterminal=Nonterminal("S"),isStart=true,isFinal=true)
//! State(id=1,nonterminal=Nonterminal("S"),isStart=false,isFinal=false)
//! TerminalEdge(tail=0,head=1,terminal=Terminal("("))
//! NonterminalEdge(tail=1,head=0,nonterminal=Nonterminal("S"))
//! ```
//!
//! The `StartState` record names the start state of the start nonterminal.
//! Quotes and backslashes inside names are escaped with a backslash.

use super::{Rsm, RsmBuilder, RsmStateId};
use crate::error::{GllError, GllResult};
use hashbrown::HashMap;
use std::fmt::Write as _;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// Write `rsm` in the text format
///
/// # Errors
///
/// Propagates failures of `writer`.
pub fn write_rsm<W: Write>(rsm: &Rsm, mut writer: W) -> GllResult<()> {
    writer.write_all(write_rsm_to_string(rsm).as_bytes())?;
    writer.flush()?;
    Ok(())
}

/// Write `rsm` to a file in the text format
///
/// # Errors
///
/// Fails if the file cannot be created or written.
pub fn write_rsm_to_path(rsm: &Rsm, path: impl AsRef<Path>) -> GllResult<()> {
    let file = std::fs::File::create(path)?;
    write_rsm(rsm, std::io::BufWriter::new(file))
}

/// Render `rsm` in the text format
#[must_use]
pub fn write_rsm_to_string(rsm: &Rsm) -> String {
    let mut out = String::new();
    let state_record = |out: &mut String, kind: &str, id: RsmStateId| {
        let state = rsm.state(id);
        // Writing to a String cannot fail
        let _ = writeln!(
            out,
            "{kind}(id={},nonterminal=Nonterminal(\"{}\"),isStart={},isFinal={})",
            id.index(),
            escape(rsm.nonterminal_name(state.nonterminal())),
            state.is_start(),
            state.is_final()
        );
    };

    state_record(&mut out, "StartState", rsm.start_state());
    for state in rsm.states() {
        state_record(&mut out, "State", state.id());
    }
    for state in rsm.states() {
        for (terminal, head) in state.terminal_edge_list() {
            let _ = writeln!(
                out,
                "TerminalEdge(tail={},head={},terminal=Terminal(\"{}\"))",
                state.id().index(),
                head.index(),
                escape(terminal.as_str())
            );
        }
    }
    for state in rsm.states() {
        for (nonterminal, head) in state.nonterminal_edge_list() {
            let _ = writeln!(
                out,
                "NonterminalEdge(tail={},head={},nonterminal=Nonterminal(\"{}\"))",
                state.id().index(),
                head.index(),
                escape(rsm.nonterminal_name(*nonterminal))
            );
        }
    }
    out
}

/// Read an RSM in the text format
///
/// # Errors
///
/// Fails on I/O errors, malformed records, or an invalid machine.
pub fn read_rsm<R: BufRead>(reader: R) -> GllResult<Rsm> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        lines.push(line?);
    }
    parse_lines(lines.iter().map(String::as_str))
}

/// Read an RSM from a file in the text format
///
/// # Errors
///
/// Fails if the file cannot be read or does not hold a valid machine.
pub fn read_rsm_from_path(path: impl AsRef<Path>) -> GllResult<Rsm> {
    let file = std::fs::File::open(path)?;
    read_rsm(BufReader::new(file))
}

/// Read an RSM from an in-memory string
///
/// # Errors
///
/// Fails on malformed records or an invalid machine.
pub fn read_rsm_from_str(text: &str) -> GllResult<Rsm> {
    parse_lines(text.lines())
}

struct StateRecord {
    id: usize,
    nonterminal: String,
    is_start: bool,
    is_final: bool,
}

enum EdgeRecord {
    Terminal { tail: usize, head: usize, terminal: String },
    Nonterminal { tail: usize, head: usize, nonterminal: String },
}

fn parse_lines<'a>(lines: impl Iterator<Item = &'a str>) -> GllResult<Rsm> {
    let mut start: Option<(usize, StateRecord)> = None;
    let mut states: Vec<(usize, StateRecord)> = Vec::new();
    let mut edges: Vec<(usize, EdgeRecord)> = Vec::new();

    for (index, raw) in lines.enumerate() {
        let line_no = index + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let record = Record::parse(line).map_err(|message| GllError::format(line_no, message))?;
        let at = |message: String| GllError::format(line_no, message);

        match record.kind {
            "StartState" | "State" => {
                let state = StateRecord {
                    id: record.usize_field("id").map_err(at)?,
                    nonterminal: record.quoted_field("nonterminal", "Nonterminal").map_err(at)?,
                    is_start: record.bool_field("isStart").map_err(at)?,
                    is_final: record.bool_field("isFinal").map_err(at)?,
                };
                if record.kind == "StartState" {
                    if start.is_some() {
                        return Err(GllError::format(line_no, "second StartState record"));
                    }
                    start = Some((line_no, state));
                } else {
                    states.push((line_no, state));
                }
            }
            "TerminalEdge" => edges.push((
                line_no,
                EdgeRecord::Terminal {
                    tail: record.usize_field("tail").map_err(at)?,
                    head: record.usize_field("head").map_err(at)?,
                    terminal: record.quoted_field("terminal", "Terminal").map_err(at)?,
                },
            )),
            "NonterminalEdge" => edges.push((
                line_no,
                EdgeRecord::Nonterminal {
                    tail: record.usize_field("tail").map_err(at)?,
                    head: record.usize_field("head").map_err(at)?,
                    nonterminal: record.quoted_field("nonterminal", "Nonterminal").map_err(at)?,
                },
            )),
            other => {
                return Err(GllError::format(line_no, format!("unknown record `{other}`")));
            }
        }
    }

    let Some((start_line, start)) = start else {
        return Err(GllError::format(0, "missing StartState record"));
    };

    let mut builder = RsmBuilder::new();
    let mut ids: HashMap<usize, RsmStateId, ahash::RandomState> = HashMap::default();
    let start_nonterminal = builder.nonterminal(&start.nonterminal);

    for (line_no, state) in &states {
        if ids.contains_key(&state.id) {
            return Err(GllError::format(*line_no, format!("state {} declared twice", state.id)));
        }
        if state.id == start.id
            && (state.nonterminal != start.nonterminal
                || state.is_start != start.is_start
                || state.is_final != start.is_final)
        {
            let message = format!(
                "state {} disagrees with the StartState record on line {start_line}",
                state.id
            );
            return Err(GllError::format(*line_no, message));
        }
        let nonterminal = builder.nonterminal(&state.nonterminal);
        let id = builder.state(nonterminal, state.is_start, state.is_final);
        ids.insert(state.id, id);
    }
    if !ids.contains_key(&start.id) {
        // Start state only given through its StartState record
        let id = builder.state(start_nonterminal, start.is_start, start.is_final);
        ids.insert(start.id, id);
    }
    if !start.is_start {
        return Err(GllError::format(start_line, "StartState must have isStart=true"));
    }

    let lookup = |line_no: usize, id: usize| {
        ids.get(&id)
            .copied()
            .ok_or_else(|| GllError::format(line_no, format!("edge refers to undeclared state {id}")))
    };
    for (line_no, edge) in &edges {
        match edge {
            EdgeRecord::Terminal { tail, head, terminal } => {
                let (tail, head) = (lookup(*line_no, *tail)?, lookup(*line_no, *head)?);
                builder.terminal_edge(tail, terminal.as_str(), head);
            }
            EdgeRecord::Nonterminal {
                tail,
                head,
                nonterminal,
            } => {
                let (tail, head) = (lookup(*line_no, *tail)?, lookup(*line_no, *head)?);
                let nonterminal = builder.nonterminal(nonterminal);
                builder.nonterminal_edge(tail, nonterminal, head);
            }
        }
    }

    builder.build(start_nonterminal)
}

/// A parsed `Kind(key=value,...)` line
struct Record<'a> {
    kind: &'a str,
    fields: Vec<(&'a str, &'a str)>,
}

impl<'a> Record<'a> {
    fn parse(line: &'a str) -> Result<Self, String> {
        let open = line
            .find('(')
            .ok_or_else(|| "expected `(` after record name".to_string())?;
        if !line.ends_with(')') {
            return Err("expected record to end with `)`".to_string());
        }
        let kind = line[..open].trim();
        let body = &line[open + 1..line.len() - 1];

        let mut fields = Vec::new();
        for part in split_top_level(body)? {
            let (key, value) = part
                .split_once('=')
                .ok_or_else(|| format!("expected `key=value`, found `{part}`"))?;
            fields.push((key.trim(), value.trim()));
        }
        Ok(Self { kind, fields })
    }

    fn field(&self, key: &str) -> Result<&'a str, String> {
        self.fields
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
            .ok_or_else(|| format!("missing field `{key}`"))
    }

    fn usize_field(&self, key: &str) -> Result<usize, String> {
        let value = self.field(key)?;
        value
            .parse()
            .map_err(|_| format!("field `{key}` is not a state id: `{value}`"))
    }

    fn bool_field(&self, key: &str) -> Result<bool, String> {
        match self.field(key)? {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(format!("field `{key}` is not a boolean: `{other}`")),
        }
    }

    /// Extract the string from `Wrapper("...")`
    fn quoted_field(&self, key: &str, wrapper: &str) -> Result<String, String> {
        let value = self.field(key)?;
        let inner = value
            .strip_prefix(wrapper)
            .and_then(|rest| rest.strip_prefix("(\""))
            .and_then(|rest| rest.strip_suffix("\")"))
            .ok_or_else(|| format!("field `{key}` must look like {wrapper}(\"...\")"))?;
        unescape(inner)
    }
}

/// Split on commas that are not inside a quoted string
fn split_top_level(body: &str) -> Result<Vec<&str>, String> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (i, c) in body.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                parts.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if in_quotes {
        return Err("unterminated string".to_string());
    }
    if start < body.len() {
        parts.push(&body[start..]);
    }
    Ok(parts)
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '"' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn unescape(text: &str) -> Result<String, String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next @ ('"' | '\\')) => out.push(next),
                Some(other) => return Err(format!("invalid escape `\\{other}`")),
                None => return Err("dangling `\\`".to_string()),
            }
        } else {
            out.push(c);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rsm::Terminal;

    const A_STAR: &str = r#"
StartState(id=0,nonterminal=Nonterminal("S"),isStart=true,isFinal=true)
State(id=0,nonterminal=Nonterminal("S"),isStart=true,isFinal=true)
TerminalEdge(tail=0,head=0,terminal=Terminal("a"))
"#;

    #[test]
    fn test_read_a_star() {
        let rsm = read_rsm_from_str(A_STAR).unwrap();
        assert_eq!(rsm.state_count(), 1);
        let start = rsm.state(rsm.start_state());
        assert!(start.is_start() && start.is_final());
        assert_eq!(start.targets_on(&Terminal::from("a")), &[start.id()]);
    }

    #[test]
    fn test_start_state_without_state_record() {
        let text = r#"StartState(id=7,nonterminal=Nonterminal("S"),isStart=true,isFinal=true)"#;
        let rsm = read_rsm_from_str(text).unwrap();
        assert_eq!(rsm.state_count(), 1);
    }

    #[test]
    fn test_escaped_names_round_trip() {
        let mut builder = RsmBuilder::new();
        let s = builder.nonterminal("S\"x");
        let q0 = builder.start_state(s, false);
        let q1 = builder.state(s, false, true);
        builder.terminal_edge(q0, "\\,\"", q1);
        let rsm = builder.build(s).unwrap();

        let text = write_rsm_to_string(&rsm);
        let back = read_rsm_from_str(&text).unwrap();
        assert_eq!(back.nonterminal_name(back.start_nonterminal()), "S\"x");
        assert_eq!(back.state(q0).targets_on(&Terminal::from("\\,\"")), &[q1]);
        assert_eq!(write_rsm_to_string(&back), text);
    }

    #[test]
    fn test_malformed_records_report_line() {
        let text = "StartState(id=0,nonterminal=Nonterminal(\"S\"),isStart=true,isFinal=true)\nState(id=zero)";
        let err = read_rsm_from_str(text).unwrap_err();
        assert_eq!(err.line(), Some(2));

        let err = read_rsm_from_str("Bogus(id=0)").unwrap_err();
        assert!(err.to_string().contains("unknown record"));
    }

    #[test]
    fn test_missing_start_record() {
        let text = "State(id=0,nonterminal=Nonterminal(\"S\"),isStart=true,isFinal=true)";
        let err = read_rsm_from_str(text).unwrap_err();
        assert!(err.to_string().contains("missing StartState"));
    }

    #[test]
    fn test_start_record_must_match_state_record() {
        let text = "StartState(id=0,nonterminal=Nonterminal(\"S\"),isStart=true,isFinal=true)\n\
                    State(id=0,nonterminal=Nonterminal(\"S\"),isStart=true,isFinal=false)";
        let err = read_rsm_from_str(text).unwrap_err();
        assert_eq!(err.line(), Some(2));
        assert!(err.to_string().contains("disagrees with the StartState record on line 1"));

        let text = "StartState(id=0,nonterminal=Nonterminal(\"S\"),isStart=true,isFinal=true)\n\
                    State(id=0,nonterminal=Nonterminal(\"T\"),isStart=true,isFinal=true)";
        assert_eq!(read_rsm_from_str(text).unwrap_err().line(), Some(2));
    }

    #[test]
    fn test_edge_to_undeclared_state() {
        let text = format!("{A_STAR}\nTerminalEdge(tail=0,head=4,terminal=Terminal(\"b\"))");
        let err = read_rsm_from_str(&text).unwrap_err();
        assert!(err.to_string().contains("undeclared state 4"));
    }

    #[test]
    fn test_write_and_read_through_io() {
        let rsm = read_rsm_from_str(A_STAR).unwrap();
        let mut buffer = Vec::new();
        write_rsm(&rsm, &mut buffer).unwrap();
        let back = read_rsm(buffer.as_slice()).unwrap();
        assert_eq!(write_rsm_to_string(&back), write_rsm_to_string(&rsm));
    }
}
