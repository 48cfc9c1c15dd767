//! Column-name normalisation: positional overrides, ordered rename rules,
//! boundary cleanup and the duplicate-name check.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::config::{compile, CollisionPolicy, PrepareConfig};
use crate::error::{PrepareError, Result};
use crate::process::utils::duplicate_names;
use crate::schema::{IndexOverride, RenameRule, RuleScope};
use crate::table::Table;

static REPEATED_UNDERSCORES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_{2,}").expect("static pattern"));
static REPEATED_DOTS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.{2,}").expect("static pattern"));

const TOOL_PREFIX: &str = "X_";

enum Needle {
    Literal(String),
    Regex(Regex),
}

impl Needle {
    /// Replace the first match in `name`, or `None` when nothing matched.
    fn replace_first(&self, name: &str, replacement: &str) -> Option<String> {
        match self {
            Needle::Literal(lit) => name
                .contains(lit.as_str())
                .then(|| name.replacen(lit.as_str(), replacement, 1)),
            Needle::Regex(re) => re
                .is_match(name)
                .then(|| re.replace(name, replacement).into_owned()),
        }
    }
}

struct CompiledRule {
    pattern: String,
    needle: Needle,
    replacement: String,
    scope: RuleScope,
    indices: Vec<usize>,
}

/// Compiled rename table. `rename` is a pure function of the header it is
/// given.
pub struct RenameEngine {
    overrides: Vec<IndexOverride>,
    rules: Vec<CompiledRule>,
}

impl RenameEngine {
    pub fn new(overrides: &[IndexOverride], rules: &[RenameRule]) -> Result<Self> {
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            if rule.pattern.is_empty() {
                return Err(PrepareError::InvalidConfig(
                    "rename rule with an empty pattern".into(),
                ));
            }
            let needle = if rule.regex && rule.scope != RuleScope::NamedColumn {
                Needle::Regex(compile(&rule.pattern)?)
            } else {
                Needle::Literal(rule.pattern.clone())
            };
            if rule.scope == RuleScope::IndexedColumns {
                debug!(
                    pattern = %rule.pattern,
                    indices = ?rule.indices,
                    "position-keyed rule; breaks if the export reorders columns"
                );
            }
            compiled.push(CompiledRule {
                pattern: rule.pattern.clone(),
                needle,
                replacement: rule.replacement.clone(),
                scope: rule.scope,
                indices: rule.indices.clone(),
            });
        }
        Ok(Self {
            overrides: overrides.to_vec(),
            rules: compiled,
        })
    }

    pub fn from_config(cfg: &PrepareConfig) -> Result<Self> {
        Self::new(&cfg.index_overrides, &cfg.rules)
    }

    /// Map the raw header to renamed column names, same length and order.
    pub fn rename(&self, original: &[String]) -> Vec<String> {
        self.rename_pinned(original).0
    }

    /// Like `rename`, also flagging the columns a named-column rule set.
    /// Those names are final: no later rule or cleanup touches them.
    pub fn rename_pinned(&self, original: &[String]) -> (Vec<String>, Vec<bool>) {
        let mut names = original.to_vec();
        self.apply_overrides(original, &mut names);

        // columns renamed by a named-column rule are final
        let mut pinned = vec![false; names.len()];

        for rule in &self.rules {
            let mut hits = 0usize;
            match rule.scope {
                RuleScope::AllColumns => {
                    for (name, _) in names.iter_mut().zip(&pinned).filter(|(_, p)| !**p) {
                        if let Some(next) = rule.needle.replace_first(name, &rule.replacement) {
                            *name = next;
                            hits += 1;
                        }
                    }
                }
                RuleScope::IndexedColumns => {
                    for &idx in &rule.indices {
                        if idx >= names.len() {
                            warn!(
                                pattern = %rule.pattern,
                                index = idx,
                                columns = names.len(),
                                "rule index out of range"
                            );
                            continue;
                        }
                        if pinned[idx] {
                            continue;
                        }
                        if let Some(next) =
                            rule.needle.replace_first(&names[idx], &rule.replacement)
                        {
                            names[idx] = next;
                            hits += 1;
                        }
                    }
                }
                RuleScope::NamedColumn => {
                    for (name, pin) in names.iter_mut().zip(pinned.iter_mut()) {
                        if !*pin && *name == rule.pattern {
                            *name = rule.replacement.clone();
                            *pin = true;
                            hits += 1;
                        }
                    }
                }
            }
            if hits == 0 {
                debug!(pattern = %rule.pattern, "rule matched no column");
            } else {
                debug!(pattern = %rule.pattern, hits, "applied rule");
            }
        }
        (names, pinned)
    }

    fn apply_overrides(&self, original: &[String], names: &mut [String]) {
        for ov in &self.overrides {
            let Some(current) = original.get(ov.index) else {
                warn!(index = ov.index, name = %ov.name, "override index out of range");
                continue;
            };
            if let Some(expect) = &ov.expect {
                if current != expect {
                    warn!(
                        index = ov.index,
                        expected = %expect,
                        found = %current,
                        "header changed at override position, skipping"
                    );
                    continue;
                }
            }
            debug!(index = ov.index, from = %current, to = %ov.name, "override");
            names[ov.index] = ov.name.clone();
        }
    }
}

/// Run `rules` in order over the table's column names. Rules that name an
/// absent column do nothing.
pub fn apply_rename_rules(table: &mut Table, rules: &[RenameRule]) -> Result<()> {
    let engine = RenameEngine::new(&[], rules)?;
    let names = engine.rename(&table.headers());
    table.set_headers(names)
}

/// Remove the tool's `X_` prefix, collapse runs of `_` or `.`, and trim any
/// `_`/`.` at either end, repeating until nothing changes. A name that would
/// become empty is left alone.
pub fn strip_name(name: &str) -> String {
    let mut current = name.to_string();
    loop {
        let next = strip_once(&current);
        if next == current {
            break;
        }
        current = next;
    }
    if current.is_empty() {
        name.to_string()
    } else {
        current
    }
}

fn strip_once(name: &str) -> String {
    let mut rest = name;
    while let Some(tail) = rest.strip_prefix(TOOL_PREFIX) {
        rest = tail;
    }
    let collapsed = REPEATED_UNDERSCORES.replace_all(rest, "_");
    let collapsed = REPEATED_DOTS.replace_all(&collapsed, ".");
    collapsed
        .trim_matches(|c: char| c == '_' || c == '.')
        .to_string()
}

/// Apply `strip_name` to every column name.
pub fn strip_boundary_noise(table: &mut Table) -> Result<()> {
    let names = strip_names(&table.headers(), &[]);
    table.set_headers(names)
}

/// `strip_name` over `names`, skipping positions flagged in `pinned`.
fn strip_names(names: &[String], pinned: &[bool]) -> Vec<String> {
    names
        .iter()
        .enumerate()
        .map(|(i, n)| {
            if pinned.get(i).copied().unwrap_or(false) {
                return n.clone();
            }
            let cleaned = strip_name(n);
            if cleaned == *n && strip_once(n) != *n {
                warn!(column = %n, "name is only separator noise, leaving as is");
            }
            cleaned
        })
        .collect()
}

/// Enforce unique column names according to `policy`.
pub fn resolve_collisions(names: Vec<String>, policy: CollisionPolicy) -> Result<Vec<String>> {
    let dups = duplicate_names(&names);
    if dups.is_empty() {
        return Ok(names);
    }
    match policy {
        CollisionPolicy::Fail => Err(PrepareError::DuplicateColumns(dups)),
        CollisionPolicy::Suffix => {
            let mut taken: HashSet<String> = names.iter().cloned().collect();
            let mut seen: HashSet<String> = HashSet::new();
            let mut out = Vec::with_capacity(names.len());
            for name in names {
                if seen.insert(name.clone()) {
                    out.push(name);
                    continue;
                }
                let mut n = 2;
                let renamed = loop {
                    let candidate = format!("{}_{}", name, n);
                    if !taken.contains(&candidate) {
                        break candidate;
                    }
                    n += 1;
                };
                warn!(column = %name, renamed = %renamed, "duplicate column name, suffixed");
                taken.insert(renamed.clone());
                seen.insert(renamed.clone());
                out.push(renamed);
            }
            Ok(out)
        }
    }
}

/// Overrides, rules, boundary cleanup and the collision check, in that order.
/// Names set by a named-column rule skip the boundary cleanup.
pub fn rename_columns(table: &mut Table, cfg: &PrepareConfig) -> Result<()> {
    let engine = RenameEngine::from_config(cfg)?;
    let original = table.headers();
    let (renamed, pinned) = engine.rename_pinned(&original);
    let cleaned = strip_names(&renamed, &pinned);

    let names = resolve_collisions(cleaned, cfg.on_collision)?;
    let changed = original
        .iter()
        .zip(&names)
        .filter(|(a, b)| a != b)
        .count();
    table.set_headers(names)?;
    info!(changed, columns = table.n_columns(), "renamed columns");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::builtin;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn header_table(names: &[&str]) -> Table {
        Table::from_rows(strings(names), vec![vec![String::new(); names.len()]]).unwrap()
    }

    #[test]
    fn literal_rule_replaces_first_occurrence_only() {
        let engine = RenameEngine::new(&[], &[RenameRule::literal("ab", "x")]).unwrap();
        assert_eq!(engine.rename(&strings(&["abab", "cd"])), strings(&["xab", "cd"]));
    }

    #[test]
    fn regex_rule_supports_captures() {
        let engine =
            RenameEngine::new(&[], &[RenameRule::regex(r"^Q(\d+)\.(.*)$", "${2}_q$1")]).unwrap();
        assert_eq!(engine.rename(&strings(&["Q12.depth"])), strings(&["depth_q12"]));
    }

    #[test]
    fn rules_apply_in_order() {
        let rules = [RenameRule::literal("a", "b"), RenameRule::literal("b", "c")];
        let engine = RenameEngine::new(&[], &rules).unwrap();
        assert_eq!(engine.rename(&strings(&["a"])), strings(&["c"]));

        let reversed = [RenameRule::literal("b", "c"), RenameRule::literal("a", "b")];
        let engine = RenameEngine::new(&[], &reversed).unwrap();
        assert_eq!(engine.rename(&strings(&["a"])), strings(&["b"]));
    }

    #[test]
    fn named_rule_pins_the_column() {
        let rules = [
            RenameRule::named("X_id", "submission_id"),
            RenameRule::literal("_id", "_key"),
        ];
        let engine = RenameEngine::new(&[], &rules).unwrap();
        assert_eq!(
            engine.rename(&strings(&["X_id", "site_id"])),
            strings(&["submission_id", "site_key"])
        );
    }

    #[test]
    fn named_rule_for_absent_column_is_a_no_op() {
        let engine = RenameEngine::new(&[], &[RenameRule::named("gone", "here")]).unwrap();
        assert_eq!(engine.rename(&strings(&["a", "b"])), strings(&["a", "b"]));
    }

    #[test]
    fn indexed_rule_touches_only_listed_positions() {
        let rules = [RenameRule::indexed(&[1, 9], "Site", "site")];
        let engine = RenameEngine::new(&[], &rules).unwrap();
        assert_eq!(
            engine.rename(&strings(&["Site", "Site", "Site"])),
            strings(&["Site", "site", "Site"])
        );
    }

    #[test]
    fn overrides_run_before_rules_and_check_the_snapshot() {
        let overrides = [
            IndexOverride {
                index: 0,
                name: "Take.a.photo.of.the.river".into(),
                expect: Some("".into()),
            },
            IndexOverride {
                index: 1,
                name: "never".into(),
                expect: Some("something else".into()),
            },
        ];
        let engine = RenameEngine::new(&overrides, &builtin::rename_rules()).unwrap();
        assert_eq!(
            engine.rename(&strings(&["", "Project"])),
            strings(&["Photo_river", "Project"])
        );
    }

    #[test]
    fn builtin_rules_shorten_export_headers() {
        let engine = RenameEngine::new(&[], &builtin::rename_rules()).unwrap();
        let raw = strings(&[
            "X_id",
            "X_Capture.your.location_latitude",
            "Capture.your.location",
            "Sample.types.taken.water",
            "Date.and.time.of.the.observation",
            "Name.of.the.observer",
            "Take.a.photo.of.the.site",
            "Any.comments",
        ]);
        assert_eq!(
            engine.rename(&raw),
            strings(&[
                "submission_id",
                "latitude",
                "location",
                "sample.water",
                "observed_at",
                "observer",
                "Photo_site",
                "Any_comment",
            ])
        );
    }

    #[test]
    fn rename_is_deterministic() {
        let rules = builtin::rename_rules();
        let raw = header_table(&["X_Capture.your.location_lat", "Photo1", "X__notes__"]);
        let mut first = raw.clone();
        let mut second = raw.clone();
        apply_rename_rules(&mut first, &rules).unwrap();
        apply_rename_rules(&mut second, &rules).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn strip_name_cleans_separators() {
        assert_eq!(strip_name("X_validation_status"), "validation_status");
        assert_eq!(strip_name("X_X_tags"), "tags");
        assert_eq!(strip_name("_X_notes"), "notes");
        assert_eq!(strip_name("site__name..code_"), "site_name.code");
        assert_eq!(strip_name(".lat."), "lat");
        assert_eq!(strip_name("Project"), "Project");
        assert_eq!(strip_name("X_"), "X_");
        assert_eq!(strip_name("__"), "__");
    }

    #[test]
    fn strip_boundary_noise_is_idempotent() {
        let names = [
            "X_validation_status",
            "__a..b__",
            "X_.X_z",
            "._X__",
            "X_",
            "Photo1",
            "sample.X_flag",
            "",
        ];
        for name in names {
            let once = strip_name(name);
            assert_eq!(strip_name(&once), once, "not idempotent for {:?}", name);
        }

        let mut t = header_table(&names[..6]);
        strip_boundary_noise(&mut t).unwrap();
        let once = t.headers();
        strip_boundary_noise(&mut t).unwrap();
        assert_eq!(t.headers(), once);
    }

    #[test]
    fn collisions_fail_by_default() {
        let err = resolve_collisions(strings(&["a", "b", "a"]), CollisionPolicy::Fail).unwrap_err();
        assert!(matches!(err, PrepareError::DuplicateColumns(d) if d == strings(&["a"])));
    }

    #[test]
    fn collisions_can_be_suffixed() {
        let names = resolve_collisions(strings(&["a", "a_2", "a", "a"]), CollisionPolicy::Suffix)
            .unwrap();
        assert_eq!(names, strings(&["a", "a_2", "a_3", "a_4"]));
    }

    #[test]
    fn named_rule_output_skips_boundary_cleanup() {
        let cfg = PrepareConfig {
            rules: vec![RenameRule::named("Code", "X_code__")],
            ..PrepareConfig::default()
        };
        let mut t = header_table(&["Code", "X_site"]);
        rename_columns(&mut t, &cfg).unwrap();
        assert_eq!(t.headers(), strings(&["X_code__", "site"]));
    }

    #[test]
    fn rename_columns_reports_collisions() {
        // both reduce to "status"
        let mut t = header_table(&["X_status", "status"]);
        let err = rename_columns(&mut t, &PrepareConfig::default()).unwrap_err();
        assert!(matches!(err, PrepareError::DuplicateColumns(_)));
    }
}
