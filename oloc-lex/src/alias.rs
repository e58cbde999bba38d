//! Symbol- and function-alias tables (§7.1/§10: loaded by the driver from
//! TOML and handed down as plain data; this module only defines the shape
//! and the compiled-in defaults so the crate works with zero configuration).

/// Maps a canonical key to the ordered list of surface spellings that should
/// be rewritten to it. Declaration order is match-preference order, longest
/// alias first within a key, matching the reference implementation's
/// left-to-right longest-alias scan.
#[derive(Clone, Debug, Default)]
pub struct AliasTable {
    entries: Vec<(String, Vec<String>)>,
}

impl AliasTable {
    pub fn new(entries: Vec<(String, Vec<String>)>) -> Self {
        let mut entries = entries;
        for (_, aliases) in entries.iter_mut() {
            aliases.sort_by_key(|a| std::cmp::Reverse(a.chars().count()));
        }
        Self { entries }
    }

    /// Find the longest alias matching at `text[pos..]`, returning the
    /// canonical key and the matched alias's byte length.
    pub fn longest_match_at(&self, text: &str, pos: usize) -> Option<(&str, usize)> {
        let rest = &text[pos..];
        let mut best: Option<(&str, usize)> = None;
        for (canonical, aliases) in &self.entries {
            for alias in aliases {
                if alias.is_empty() {
                    continue;
                }
                if rest.starts_with(alias.as_str()) {
                    let len = alias.len();
                    if best.map(|(_, l)| len > l).unwrap_or(true) {
                        best = Some((canonical.as_str(), len));
                    }
                    break;
                }
            }
        }
        best
    }

    pub fn canonical_keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Every string this table treats as meaningful — canonical keys and all
    /// their surface aliases — for `is_reserved`'s substring scan.
    pub fn all_spellings(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .flat_map(|(k, aliases)| std::iter::once(k.as_str()).chain(aliases.iter().map(|a| a.as_str())))
    }

    pub fn contains_canonical(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }
}

/// The default symbol-alias table: operator and native-irrational spellings,
/// plus whitespace collapsing to the empty string.
pub fn default_symbol_table() -> AliasTable {
    AliasTable::new(vec![
        ("+".into(), vec!["+".into(), "plus".into()]),
        ("-".into(), vec!["-".into(), "minus".into(), "\u{2212}".into()]),
        ("*".into(), vec!["*".into(), "\u{00d7}".into(), "times".into()]),
        ("/".into(), vec!["/".into(), "\u{00f7}".into()]),
        ("^".into(), vec!["^".into()]),
        ("%".into(), vec!["%".into()]),
        ("!".into(), vec!["!".into()]),
        ("\u{b0}".into(), vec!["\u{b0}".into(), "deg".into()]),
        ("\u{221a}".into(), vec!["\u{221a}".into()]),
        ("\u{3c0}".into(), vec!["pi".into(), "PI".into(), "\u{3c0}".into()]),
        ("\u{1d452}".into(), vec!["\u{1d452}".into()]),
        ("(".into(), vec!["(".into()]),
        (")".into(), vec![")".into()]),
        ("[".into(), vec!["[".into()]),
        ("]".into(), vec!["]".into()]),
        ("{".into(), vec!["{".into()]),
        ("}".into(), vec!["}".into()]),
        ("|".into(), vec!["|".into()]),
        ("<".into(), vec!["<".into()]),
        (">".into(), vec![">".into()]),
        (",".into(), vec![",".into()]),
        (";".into(), vec![";".into()]),
        ("?".into(), vec!["?".into()]),
        ("".into(), vec![" ".into(), "\t".into(), "\n".into(), "\r".into()]),
    ])
}

/// The default function-alias table: canonical kernel names and their
/// common surface spellings.
pub fn default_function_table() -> AliasTable {
    AliasTable::new(vec![
        ("sqrt".into(), vec!["sqrt".into()]),
        ("sq".into(), vec!["sq".into()]),
        ("cub".into(), vec!["cub".into()]),
        ("rec".into(), vec!["rec".into()]),
        ("mod".into(), vec!["mod".into()]),
        ("fact".into(), vec!["fact".into()]),
        ("abs".into(), vec!["abs".into()]),
        ("sign".into(), vec!["sign".into(), "sgn".into()]),
        ("gcd".into(), vec!["gcd".into()]),
        ("lcm".into(), vec!["lcm".into()]),
        ("log".into(), vec!["log".into()]),
        ("ln".into(), vec!["ln".into()]),
        ("lg".into(), vec!["lg".into()]),
        ("exp".into(), vec!["exp".into()]),
        ("sin".into(), vec!["sin".into()]),
        ("cos".into(), vec!["cos".into()]),
        ("tan".into(), vec!["tan".into()]),
        ("cot".into(), vec!["cot".into()]),
        ("asin".into(), vec!["asin".into(), "arcsin".into()]),
        ("acos".into(), vec!["acos".into(), "arccos".into()]),
        ("atan".into(), vec!["atan".into(), "arctan".into()]),
        ("acot".into(), vec!["acot".into(), "arccot".into()]),
    ])
}

/// The function names the evaluator knows the arity of (all current kernel
/// functions are unary except `gcd`/`lcm`, which are binary).
pub fn function_arity(name: &str) -> Option<usize> {
    match name {
        "gcd" | "lcm" | "mod" => Some(2),
        "sqrt" | "sq" | "cub" | "rec" | "fact" | "abs" | "sign" | "log" | "ln" | "lg" | "exp"
        | "sin" | "cos" | "tan" | "cot" | "asin" | "acos" | "atan" | "acot" => Some(1),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_alias_wins() {
        let table = AliasTable::new(vec![("-".into(), vec!["-".into(), "minus".into()])]);
        let (canon, len) = table.longest_match_at("minus5", 0).unwrap();
        assert_eq!(canon, "-");
        assert_eq!(len, "minus".len());
    }

    #[test]
    fn default_functions_cover_kernel_names() {
        let table = default_function_table();
        assert!(table.contains_canonical("sqrt"));
        assert!(table.contains_canonical("gcd"));
    }
}
