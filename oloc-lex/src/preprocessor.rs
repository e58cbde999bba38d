//! Preprocessor: rewrites a raw expression string into a normalized form
//! over a restricted alphabet, per §4.1. Each step is a pure `String -> String`
//! (or fallible) transform; `execute` runs them in the fixed order the
//! reference implementation uses.

use crate::alias::AliasTable;
use oloc_util::SyntaxError;

pub struct Preprocessor<'a> {
    pub symbol_table: &'a AliasTable,
    pub function_table: &'a AliasTable,
}

impl<'a> Preprocessor<'a> {
    pub fn new(symbol_table: &'a AliasTable, function_table: &'a AliasTable) -> Self {
        Self {
            symbol_table,
            function_table,
        }
    }

    #[tracing::instrument(skip(self))]
    pub fn execute(&self, expression: &str) -> Result<String, SyntaxError> {
        let s = remove_comments(expression)?;
        let s = normalize_superscript(&s);
        let s = self.symbol_alias(&s);
        let s = self.function_alias(&s);
        let s = eliminate_equals(&s)?;
        let s = formal_elimination(&s)?;
        Ok(s)
    }

    fn symbol_alias(&self, s: &str) -> String {
        let protected = long_custom_ranges(s)
            .into_iter()
            .chain(function_name_ranges(s, self.function_table))
            .collect::<Vec<_>>();
        alias_scan(s, self.symbol_table, &protected)
    }

    fn function_alias(&self, s: &str) -> String {
        let protected = long_custom_ranges(s);
        alias_scan(s, self.function_table, &protected)
    }
}

fn in_any_range(ranges: &[(usize, usize)], pos: usize) -> Option<usize> {
    ranges
        .iter()
        .find(|&&(lo, hi)| pos >= lo && pos < hi)
        .map(|&(_, hi)| hi)
}

fn alias_scan(s: &str, table: &AliasTable, protected: &[(usize, usize)]) -> String {
    let mut out = String::with_capacity(s.len());
    let mut pos = 0usize;
    while pos < s.len() {
        if let Some(end) = in_any_range(protected, pos) {
            out.push_str(&s[pos..end]);
            pos = end;
            continue;
        }
        if let Some((canonical, len)) = table.longest_match_at(s, pos) {
            out.push_str(canonical);
            pos += len;
        } else {
            let ch = s[pos..].chars().next().unwrap();
            out.push(ch);
            pos += ch.len_utf8();
        }
    }
    out
}

/// Byte ranges covered by `<...>` long-custom-irrational regions.
fn long_custom_ranges(s: &str) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut start: Option<usize> = None;
    for (i, ch) in s.char_indices() {
        match ch {
            '<' => start = Some(i),
            '>' => {
                if let Some(lo) = start.take() {
                    ranges.push((lo, i + ch.len_utf8()));
                }
            }
            _ => {}
        }
    }
    ranges
}

/// Byte ranges covered by a recognized function name (greedy, leftmost).
fn function_name_ranges(s: &str, function_table: &AliasTable) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut pos = 0usize;
    while pos < s.len() {
        if let Some((_, len)) = function_table.longest_match_at(s, pos) {
            ranges.push((pos, pos + len));
            pos += len;
        } else {
            let ch = s[pos..].chars().next().unwrap();
            pos += ch.len_utf8();
        }
    }
    ranges
}

/// Step 1: comment removal. A trailing `@` truncates the rest of the
/// expression; a free comment is delimited by a matched pair of `#`.
fn remove_comments(s: &str) -> Result<String, SyntaxError> {
    let chars: Vec<char> = s.chars().collect();
    let truncated: &[char] = match chars.iter().position(|&c| c == '@') {
        Some(at) => &chars[..at],
        None => &chars[..],
    };

    let hash_positions: Vec<usize> = truncated
        .iter()
        .enumerate()
        .filter(|(_, &c)| c == '#')
        .map(|(i, _)| i)
        .collect();

    if hash_positions.len() % 2 != 0 {
        let last = *hash_positions.last().unwrap();
        return Err(SyntaxError::comment_mismatch(
            s.to_string(),
            vec![last],
            None,
            None,
        ));
    }

    let mut out = String::with_capacity(truncated.len());
    let mut in_comment = false;
    for &c in truncated {
        if c == '#' {
            in_comment = !in_comment;
            continue;
        }
        if !in_comment {
            out.push(c);
        }
    }
    Ok(out)
}

/// Step 2: a maximal run of Unicode superscript digits becomes `^` followed
/// by ordinary digits; a run immediately following another superscript run
/// does not re-emit `^`.
fn normalize_superscript(s: &str) -> String {
    fn to_digit(c: char) -> Option<char> {
        match c {
            '\u{2070}' => Some('0'),
            '\u{00b9}' => Some('1'),
            '\u{00b2}' => Some('2'),
            '\u{00b3}' => Some('3'),
            '\u{2074}' => Some('4'),
            '\u{2075}' => Some('5'),
            '\u{2076}' => Some('6'),
            '\u{2077}' => Some('7'),
            '\u{2078}' => Some('8'),
            '\u{2079}' => Some('9'),
            _ => None,
        }
    }

    let mut out = String::with_capacity(s.len());
    let mut prev_was_super = false;
    for c in s.chars() {
        if let Some(d) = to_digit(c) {
            if !prev_was_super {
                out.push('^');
            }
            out.push(d);
            prev_was_super = true;
        } else {
            out.push(c);
            prev_was_super = false;
        }
    }
    out
}

/// Step 5: a single trailing `=` is dropped; any other `=` is an error.
fn eliminate_equals(s: &str) -> Result<String, SyntaxError> {
    let chars: Vec<char> = s.chars().collect();
    let mut positions: Vec<usize> = chars
        .iter()
        .enumerate()
        .filter(|(_, &c)| c == '=')
        .map(|(i, _)| i)
        .collect();

    if positions.is_empty() {
        return Ok(s.to_string());
    }

    let last = chars.len() - 1;
    if positions.last() == Some(&last) {
        positions.pop();
    }
    if !positions.is_empty() {
        return Err(SyntaxError::equal_sign_misplacement(
            s.to_string(),
            positions,
            None,
            None,
        ));
    }

    let out: String = chars[..last].iter().collect();
    Ok(out)
}

/// Step 6: collapse sign runs by parity, drop a leading `+`, and resolve the
/// `,`/`;` digit-separator-versus-argument-separator ambiguity.
fn formal_elimination(s: &str) -> Result<String, SyntaxError> {
    let collapsed = collapse_sign_runs(s);
    let stripped = strip_leading_plus(&collapsed);
    rewrite_separators(&stripped)
}

fn collapse_sign_runs(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let chars: Vec<char> = s.chars().collect();
    let mut i = 0usize;
    while i < chars.len() {
        let c = chars[i];
        if c == '+' || c == '-' {
            let mut minuses = 0usize;
            while i < chars.len() && (chars[i] == '+' || chars[i] == '-') {
                if chars[i] == '-' {
                    minuses += 1;
                }
                i += 1;
            }
            out.push(if minuses % 2 == 0 { '+' } else { '-' });
        } else {
            out.push(c);
            i += 1;
        }
    }
    out
}

fn strip_leading_plus(s: &str) -> String {
    s.strip_prefix('+').unwrap_or(s).to_string()
}

fn rewrite_separators(s: &str) -> Result<String, SyntaxError> {
    let chars: Vec<char> = s.chars().collect();
    let has_semicolon_frame = compute_semicolon_frames(&chars);

    let mut out = String::with_capacity(chars.len());
    let mut depth_stack: Vec<bool> = Vec::new();
    let mut error_positions = Vec::new();

    for (i, &c) in chars.iter().enumerate() {
        match c {
            '(' | '[' | '{' => {
                depth_stack.push(has_semicolon_frame[i]);
                out.push(c);
            }
            ')' | ']' | '}' => {
                depth_stack.pop();
                out.push(c);
            }
            ',' => {
                let in_semicolon_frame = depth_stack.last().copied().unwrap_or(false);
                let between_digits = i > 0
                    && i + 1 < chars.len()
                    && chars[i - 1].is_ascii_digit()
                    && chars[i + 1].is_ascii_digit();
                if in_semicolon_frame {
                    if between_digits {
                        // pure digit grouping: drop the comma
                    } else {
                        error_positions.push(i);
                    }
                } else {
                    out.push(c);
                }
            }
            ';' => {
                if depth_stack.is_empty() {
                    error_positions.push(i);
                } else {
                    out.push(',');
                }
            }
            _ => out.push(c),
        }
    }

    if !error_positions.is_empty() {
        // Distinguish the two possible causes by re-checking the first one.
        let pos = error_positions[0];
        if chars[pos] == ';' {
            return Err(SyntaxError::function_separator_outside(
                s.to_string(),
                error_positions,
                None,
                None,
            ));
        }
        return Err(SyntaxError::numeric_separator_error(
            s.to_string(),
            error_positions,
            None,
            None,
        ));
    }

    Ok(out)
}

/// For every position, whether the innermost enclosing bracket (if any)
/// contains a `;` at its own nesting depth.
fn compute_semicolon_frames(chars: &[char]) -> Vec<bool> {
    let mut frame_for: Vec<bool> = vec![false; chars.len()];
    let mut stack: Vec<(usize, bool)> = Vec::new();
    for (i, &c) in chars.iter().enumerate() {
        match c {
            '(' | '[' | '{' => stack.push((i, false)),
            ')' | ']' | '}' => {
                if let Some((open_pos, has_semi)) = stack.pop() {
                    for slot in frame_for.iter_mut().take(i).skip(open_pos) {
                        if !*slot {
                            *slot = has_semi;
                        }
                    }
                    // nested semicolons do not propagate to the enclosing frame
                }
            }
            ';' => {
                if let Some(top) = stack.last_mut() {
                    top.1 = true;
                }
            }
            _ => {}
        }
    }
    frame_for
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias::{default_function_table, default_symbol_table};

    fn pp() -> (AliasTable, AliasTable) {
        (default_symbol_table(), default_function_table())
    }

    #[test]
    fn strips_trailing_comment() {
        let out = remove_comments("1+2@ this is a note").unwrap();
        assert_eq!(out, "1+2");
    }

    #[test]
    fn strips_free_comment() {
        let out = remove_comments("1#skip this#+2").unwrap();
        assert_eq!(out, "1+2");
    }

    #[test]
    fn odd_hash_count_errors() {
        assert!(remove_comments("1#+2").is_err());
    }

    #[test]
    fn superscript_run_becomes_caret_digits() {
        assert_eq!(normalize_superscript("2\u{00b3}\u{2074}"), "2^34");
    }

    #[test]
    fn sign_runs_collapse_by_parity() {
        assert_eq!(collapse_sign_runs("1---2"), "1-2");
        assert_eq!(collapse_sign_runs("1--2"), "1+2");
    }

    #[test]
    fn leading_plus_is_stripped() {
        assert_eq!(strip_leading_plus("+1+2"), "1+2");
    }

    #[test]
    fn semicolon_outside_function_errors() {
        assert!(rewrite_separators("1;2").is_err());
    }

    #[test]
    fn semicolon_rewritten_to_comma_inside_call() {
        let out = rewrite_separators("f(1,000;2,000)").unwrap();
        assert_eq!(out, "f(1000,2000)");
    }

    #[test]
    fn full_pipeline_smoke() {
        let (symbols, functions) = pp();
        let p = Preprocessor::new(&symbols, &functions);
        let out = p.execute("1+2@note").unwrap();
        assert_eq!(out, "1+2");
    }
}
