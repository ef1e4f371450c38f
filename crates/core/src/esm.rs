//! Root-level `import`/`export` hoisting for MDX bodies.
//!
//! MDX allows ESM statements at the top level of a document. They are pulled
//! out of the body before parsing (outside fenced code only) so the body can be
//! parsed without an ECMAScript parser, and import statements are reduced to
//! bindings the component layer can resolve.

/// Separated import and export statements from document root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HoistedStatements {
    /// Import statements (e.g., `import X from 'module'`).
    pub imports: Vec<String>,
    /// Export statements (e.g., `export const X = 1`).
    pub exports: Vec<String>,
}

impl HoistedStatements {
    /// Parses every hoisted import into bindings, in statement order.
    pub fn bindings(&self) -> Vec<ImportBinding> {
        self.imports.iter().flat_map(|s| parse_import(s)).collect()
    }
}

/// What an import binding refers to in its source module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportedName {
    /// `import X from '...'`
    Default,
    /// `import { x }` / `import { x as y }`; holds the exported name.
    Named(String),
    /// `import * as ns from '...'`
    Namespace,
}

/// A single local name introduced by an import statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    /// Name usable inside the document.
    pub local: String,
    /// What is imported.
    pub imported: ImportedName,
    /// Module specifier, without quotes.
    pub source: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FenceState {
    marker: Option<char>,
    indent: usize,
}

impl FenceState {
    const OUTSIDE: FenceState = FenceState {
        marker: None,
        indent: 0,
    };

    fn inside(&self) -> bool {
        self.marker.is_some()
    }

    /// Advances the state past `line`; returns the new state and whether the
    /// line belongs to a fence (opener, content or closer).
    fn advance(self, line: &str) -> (FenceState, bool) {
        let indent = line
            .bytes()
            .take_while(|b| matches!(*b, b' ' | b'\t'))
            .count();
        let after_indent = &line[indent..];

        match self.marker {
            None => match fence_marker(after_indent) {
                Some(marker) => (
                    FenceState {
                        marker: Some(marker),
                        indent,
                    },
                    true,
                ),
                None => (self, false),
            },
            Some(marker) => {
                // Only a bare run of the same marker closes; "```ini" opens.
                let closes = indent <= self.indent
                    && fence_marker(after_indent) == Some(marker)
                    && after_indent.trim_start_matches(marker).trim().is_empty();
                if closes {
                    (FenceState::OUTSIDE, true)
                } else {
                    (self, true)
                }
            }
        }
    }
}

fn fence_marker(after_indent: &str) -> Option<char> {
    let first = after_indent.chars().next()?;
    if first != '`' && first != '~' {
        return None;
    }
    let run = after_indent.chars().take_while(|c| *c == first).count();
    (run >= 3).then_some(first)
}

/// Collect root-level import and export statements.
///
/// Returns the hoisted statements and the body lines, in order. Each hoisted
/// line is left behind as an empty line so positions in the body still match
/// the source.
pub fn collect_root_statements(body: &str) -> (HoistedStatements, Vec<String>) {
    let mut fence = FenceState::OUTSIDE;
    let mut hoisted = HoistedStatements::default();
    let mut body_lines = Vec::new();
    let mut buffer = String::new();
    let mut depth: isize = 0;
    let mut collecting: Option<bool> = None; // Some(true) = import, Some(false) = export
    let mut lines = body.lines().peekable();

    while let Some(line) = lines.next() {
        if collecting.is_none() {
            let (next, fenced) = fence.advance(line);
            fence = next;
            if fenced || fence.inside() {
                body_lines.push(line.to_string());
                continue;
            }

            let trimmed = line.trim_start();
            if trimmed.starts_with("import ") {
                collecting = Some(true);
            } else if trimmed.starts_with("export ") {
                collecting = Some(false);
            } else {
                body_lines.push(line.to_string());
                continue;
            }
            depth = 0;
        }

        buffer.push_str(line);
        buffer.push('\n');
        body_lines.push(String::new());
        depth += bracket_delta(line);

        if ends_statement(line, depth, lines.peek().copied()) {
            let statement = buffer.trim_end().to_string();
            match collecting.take() {
                Some(true) => hoisted.imports.push(statement),
                _ => hoisted.exports.push(statement),
            }
            buffer.clear();
        }
    }

    if let Some(is_import) = collecting
        && !buffer.is_empty()
    {
        let statement = buffer.trim_end().to_string();
        if is_import {
            hoisted.imports.push(statement);
        } else {
            hoisted.exports.push(statement);
        }
    }

    (hoisted, body_lines)
}

/// Net change in bracket depth over a line, ignoring brackets inside strings.
fn bracket_delta(line: &str) -> isize {
    let mut depth: isize = 0;
    let mut quote: Option<char> = None;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            escape = false;
            continue;
        }
        match (ch, quote) {
            ('\\', Some(_)) => escape = true,
            ('\'' | '"' | '`', None) => quote = Some(ch),
            (c, Some(q)) if c == q => quote = None,
            ('(' | '{' | '[', None) => depth += 1,
            (')' | '}' | ']', None) => depth -= 1,
            _ => {}
        }
    }

    depth
}

fn ends_statement(line: &str, depth: isize, next_line: Option<&str>) -> bool {
    if depth > 0 {
        return false;
    }

    let trimmed = line.trim_end();
    if trimmed.ends_with(';') {
        return true;
    }
    if trimmed.ends_with(['\\', ',', '{', '(']) {
        return false;
    }

    match next_line {
        Some(next) => !next.trim_start().starts_with([',', '.', '{', '(']),
        None => true,
    }
}

/// Parses an import statement into its bindings.
///
/// Side-effect imports (`import './style.css'`) and anything that does not
/// look like an import produce no bindings.
///
/// ```
/// use mdpress_core::esm::{parse_import, ImportedName};
///
/// let bindings = parse_import("import Counter, { Button as Btn } from '../components/ui.svelte';");
/// assert_eq!(bindings.len(), 2);
/// assert_eq!(bindings[0].local, "Counter");
/// assert_eq!(bindings[1].imported, ImportedName::Named("Button".into()));
/// assert_eq!(bindings[1].source, "../components/ui.svelte");
/// ```
pub fn parse_import(statement: &str) -> Vec<ImportBinding> {
    let Some(rest) = statement.trim().strip_prefix("import") else {
        return Vec::new();
    };
    let rest = rest.trim().trim_end_matches(';').trim_end();

    let Some(from) = rest.rfind("from") else {
        return Vec::new();
    };
    let clause = rest[..from].trim();
    let source = unquote(rest[from + 4..].trim());
    let (Some(source), false) = (source, clause.is_empty()) else {
        return Vec::new();
    };

    let mut bindings = Vec::new();
    let mut push = |local: &str, imported: ImportedName| {
        let local = local.trim();
        if !local.is_empty() {
            bindings.push(ImportBinding {
                local: local.to_string(),
                imported,
                source: source.to_string(),
            });
        }
    };

    let (head, named) = match clause.find('{') {
        Some(open) => {
            let close = clause.rfind('}').unwrap_or(clause.len());
            (&clause[..open], Some(&clause[open + 1..close.max(open + 1)]))
        }
        None => (clause, None),
    };

    for part in head.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        if let Some(ns) = part.strip_prefix('*') {
            if let Some(local) = ns.trim().strip_prefix("as ") {
                push(local, ImportedName::Namespace);
            }
        } else if part != "type" {
            push(part, ImportedName::Default);
        }
    }

    if let Some(named) = named {
        for spec in named.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match spec.split_once(" as ") {
                Some((imported, local)) => {
                    push(local, ImportedName::Named(imported.trim().to_string()))
                }
                None => push(spec, ImportedName::Named(spec.to_string())),
            }
        }
    }

    bindings
}

fn unquote(s: &str) -> Option<&str> {
    let quote = s.chars().next()?;
    if !matches!(quote, '\'' | '"') {
        return None;
    }
    s[1..].strip_suffix(quote)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_single_and_multiline_imports() {
        let body = "import A from './a'\nimport {\n  B,\n  C,\n} from './b';\n# Title";
        let (hoisted, rest) = collect_root_statements(body);
        assert_eq!(
            hoisted.imports,
            vec!["import A from './a'", "import {\n  B,\n  C,\n} from './b';"]
        );
        assert_eq!(rest, vec!["", "", "", "", "", "# Title"]);
    }

    #[test]
    fn separates_exports() {
        let body = "export const meta = {\n  draft: false,\n};\nexport default Layout\nText";
        let (hoisted, rest) = collect_root_statements(body);
        assert!(hoisted.imports.is_empty());
        assert_eq!(
            hoisted.exports,
            vec!["export const meta = {\n  draft: false,\n};", "export default Layout"]
        );
        assert_eq!(rest, vec!["", "", "", "", "Text"]);
    }

    #[test]
    fn hoisted_lines_keep_their_place() {
        let body = "import A from './a'\nimport B from './b'\n\nText\n\nexport const x = {\n  y: 1,\n};\nMore";
        let (_, rest) = collect_root_statements(body);
        assert_eq!(rest.len(), body.lines().count());
        assert_eq!(rest[3], "Text");
        assert_eq!(rest[8], "More");
    }

    #[test]
    fn ignores_statements_inside_fences() {
        let body = "```js\nimport bad from './nope'\n```\nimport good from './ok';";
        let (hoisted, rest) = collect_root_statements(body);
        assert_eq!(hoisted.imports, vec!["import good from './ok';"]);
        assert_eq!(rest, vec!["```js", "import bad from './nope'", "```", ""]);
    }

    #[test]
    fn info_string_fence_does_not_close() {
        let body = "```\nx\n```ini\nimport nope from 'x'\n```\nimport ok from 'ok';";
        let (hoisted, rest) = collect_root_statements(body);
        assert_eq!(hoisted.imports, vec!["import ok from 'ok';"]);
        assert_eq!(rest.len(), 6);
    }

    #[test]
    fn tilde_fence_ignores_backtick_closer() {
        let body = "~~~\n```\nimport inside from 'x'\n~~~\n";
        let (hoisted, _) = collect_root_statements(body);
        assert!(hoisted.imports.is_empty());
    }

    #[test]
    fn parses_import_forms() {
        let default = parse_import("import Counter from \"./Counter.svelte\"");
        assert_eq!(
            default,
            vec![ImportBinding {
                local: "Counter".into(),
                imported: ImportedName::Default,
                source: "./Counter.svelte".into(),
            }]
        );

        let ns = parse_import("import * as icons from './icons.js';");
        assert_eq!(ns[0].local, "icons");
        assert_eq!(ns[0].imported, ImportedName::Namespace);

        let named = parse_import("import { A, B as Bee } from 'lib'");
        let locals: Vec<&str> = named.iter().map(|b| b.local.as_str()).collect();
        assert_eq!(locals, vec!["A", "Bee"]);
    }

    #[test]
    fn side_effect_imports_have_no_bindings() {
        assert!(parse_import("import './global.css';").is_empty());
        assert!(parse_import("export const x = 1").is_empty());
    }

    #[test]
    fn bindings_follow_statement_order() {
        let hoisted = HoistedStatements {
            imports: vec![
                "import A from './a.svelte'".into(),
                "import { B } from './b.js'".into(),
            ],
            exports: Vec::new(),
        };
        let names: Vec<String> = hoisted.bindings().into_iter().map(|b| b.local).collect();
        assert_eq!(names, vec!["A", "B"]);
    }
}
