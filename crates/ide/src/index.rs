use std::io;

use ecow::EcoString;
use indexmap::{IndexMap, IndexSet};
use iset::IntervalMap;
use syntax::css::{self, CssParse};
use syntax::html::{self, FragmentKind};
use syntax::{SyntaxError, TextRange, TextSize};
use tracing::{debug, info, warn};

use crate::dom::{DomTree, NodeId};
use crate::file_system::{FilePath, FileSystem, ScanConfig, ScanError};
use crate::line_index::LineIndex;
use crate::variable::{INLINE_STYLE, Reference, VariableDefinition, VariableUsage};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum DocumentKind {
    Css,
    Html,
    Other,
}

impl DocumentKind {
    pub fn from_path(path: &FilePath) -> Self {
        let extension = path.extension().map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("css" | "scss" | "less") => DocumentKind::Css,
            Some("html" | "htm" | "vue" | "svelte" | "astro") => DocumentKind::Html,
            _ => DocumentKind::Other,
        }
    }

    pub fn from_language_id(language_id: &str) -> Self {
        match language_id {
            "css" | "scss" | "less" => DocumentKind::Css,
            "html" | "vue" | "svelte" | "astro" => DocumentKind::Html,
            _ => DocumentKind::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum MentionKind {
    Definition,
    Usage,
}

#[derive(Debug, Clone, Eq, PartialEq)]
struct Mention {
    name: EcoString,
    range: TextRange,
    kind: MentionKind,
}

#[derive(Debug)]
struct Document {
    kind: DocumentKind,
    defines: IndexSet<EcoString>,
    uses: IndexSet<EcoString>,
    dom: Option<DomTree>,
    diagnostics: Vec<SyntaxError>,
    line_index: LineIndex,
    mentions: IntervalMap<TextSize, Mention>,
}

impl Document {
    fn new(kind: DocumentKind, text: &str) -> Self {
        Self {
            kind,
            defines: IndexSet::new(),
            uses: IndexSet::new(),
            dom: None,
            diagnostics: Vec::new(),
            line_index: LineIndex::new(text),
            mentions: IntervalMap::new(),
        }
    }

    fn add_mention(&mut self, name: &EcoString, range: TextRange, kind: MentionKind) {
        if range.is_empty() {
            return;
        }
        self.mentions.insert(
            range.into(),
            Mention {
                name: name.clone(),
                range,
                kind,
            },
        );
    }

    fn mention_at(&self, offset: TextSize) -> Option<&Mention> {
        self.mentions
            .values_overlap(offset)
            .min_by_key(|mention| mention.range.len())
    }
}

#[derive(Debug, Clone, Copy)]
enum Origin {
    Stylesheet,
    StyleAttribute(Option<NodeId>),
}

#[derive(Debug, Default)]
pub struct Index {
    definitions: IndexMap<EcoString, Vec<VariableDefinition>>,
    usages: IndexMap<EcoString, Vec<VariableUsage>>,
    documents: IndexMap<FilePath, Document>,
}

// mutable api
impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(&mut self, text: &str, owner: FilePath, kind: DocumentKind) {
        self.remove(&owner);

        let mut document = Document::new(kind, text);
        match kind {
            DocumentKind::Css => {
                let parse = css::parse(text);
                self.extract(&owner, &mut document, parse, Origin::Stylesheet);
            }
            DocumentKind::Html => {
                let mut parse = html::parse(text);
                let dom = DomTree::from_parse(&mut parse);
                document.diagnostics.append(&mut parse.errors);
                for fragment in &parse.fragments {
                    let mut css = css::parse(fragment.text(text));
                    css.shift(fragment.base());
                    let origin = match fragment.kind {
                        FragmentKind::StyleElement => Origin::Stylesheet,
                        FragmentKind::StyleAttribute(_) => {
                            Origin::StyleAttribute(dom.node_at(fragment.base()))
                        }
                    };
                    self.extract(&owner, &mut document, css, origin);
                }
                document.dom = Some(dom);
            }
            DocumentKind::Other => return,
        }

        debug!(
            path = %owner,
            definitions = document.defines.len(),
            usages = document.uses.len(),
            errors = document.diagnostics.len(),
            "reindexed document"
        );
        self.documents.insert(owner, document);
    }

    pub fn remove(&mut self, owner: &FilePath) {
        let Some(document) = self.documents.shift_remove(owner) else {
            return;
        };
        for name in &document.defines {
            if let Some(bucket) = self.definitions.get_mut(name) {
                bucket.retain(|definition| definition.owner != *owner);
                if bucket.is_empty() {
                    self.definitions.shift_remove(name);
                }
            }
        }
        for name in &document.uses {
            if let Some(bucket) = self.usages.get_mut(name) {
                bucket.retain(|usage| usage.owner != *owner);
                if bucket.is_empty() {
                    self.usages.shift_remove(name);
                }
            }
        }
    }

    /// Reparses `owner` from `fs`. A missing file is removed; a file that
    /// cannot be read for another reason keeps its previous entries.
    pub fn refresh_from_disk<FS: FileSystem + ?Sized>(&mut self, fs: &FS, owner: &FilePath) {
        match fs.read_content(owner) {
            Ok(text) => self.parse(&text, owner.clone(), DocumentKind::from_path(owner)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %owner, "file is gone, removing it from the index");
                self.remove(owner);
            }
            Err(err) => warn!(path = %owner, "failed to read file: {err}"),
        }
    }

    /// Starts indexing every file below `roots` accepted by `config`. Files
    /// are parsed as the returned iterator is advanced.
    pub fn scan<'a, FS: FileSystem + ?Sized>(
        &'a mut self,
        fs: &'a FS,
        roots: &[FilePath],
        config: &ScanConfig,
    ) -> Result<Scan<'a, FS>, ScanError> {
        let filter = config.filter()?;
        let files: IndexSet<FilePath> = roots
            .iter()
            .flat_map(|root| fs.walk(root, &filter))
            .collect();
        let total = files.len();
        info!(roots = roots.len(), files = total, "scanning workspace");

        Ok(Scan {
            index: self,
            fs,
            files: files.into_iter(),
            done: 0,
            total,
            interval: config.progress_interval.max(1),
            finished: false,
        })
    }

    fn extract(
        &mut self,
        owner: &FilePath,
        document: &mut Document,
        parse: CssParse,
        origin: Origin,
    ) {
        let (inline, dom_node) = match origin {
            Origin::Stylesheet => (false, None),
            Origin::StyleAttribute(node) => (true, node),
        };

        for property in parse.properties {
            let definition = VariableDefinition {
                name: property.name,
                value: property.value,
                owner: owner.clone(),
                declaration_range: property.range,
                value_range: property.value_range,
                selector: if inline {
                    EcoString::from(INLINE_STYLE)
                } else {
                    property.selector
                },
                important: property.important,
                inline,
                source_position: property.range.start(),
            };
            document.add_mention(
                &definition.name,
                definition.name_range(),
                MentionKind::Definition,
            );
            document.defines.insert(definition.name.clone());
            self.definitions
                .entry(definition.name.clone())
                .or_default()
                .push(definition);
        }

        for call in parse.var_calls {
            let usage = VariableUsage {
                name: call.name,
                owner: owner.clone(),
                range: call.range,
                context: if inline {
                    EcoString::from(INLINE_STYLE)
                } else {
                    call.selector
                },
                dom_node,
                fallback: call.fallback,
            };
            document.add_mention(&usage.name, usage.range, MentionKind::Usage);
            document.uses.insert(usage.name.clone());
            self.usages
                .entry(usage.name.clone())
                .or_default()
                .push(usage);
        }

        document.diagnostics.extend(parse.errors);
    }
}

// immutable api
impl Index {
    pub fn definitions(&self, name: &str) -> &[VariableDefinition] {
        self.definitions
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn usages(&self, name: &str) -> &[VariableUsage] {
        self.usages.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn references(&self, name: &str) -> Vec<Reference<'_>> {
        let definitions = self.definitions(name).iter().map(Reference::Definition);
        let usages = self.usages(name).iter().map(Reference::Usage);
        definitions.chain(usages).collect()
    }

    pub fn all_definitions(&self) -> impl Iterator<Item = &VariableDefinition> + '_ {
        self.definitions.values().flatten()
    }

    pub fn variable_names(&self) -> impl Iterator<Item = &EcoString> + '_ {
        self.definitions.keys()
    }

    pub fn definitions_in(&self, owner: &FilePath) -> Vec<&VariableDefinition> {
        let Some(document) = self.documents.get(owner) else {
            return Vec::new();
        };
        let mut definitions: Vec<_> = document
            .defines
            .iter()
            .flat_map(|name| self.definitions(name))
            .filter(|definition| definition.owner == *owner)
            .collect();
        definitions.sort_by_key(|definition| definition.source_position);
        definitions
    }

    pub fn usages_in(&self, owner: &FilePath) -> Vec<&VariableUsage> {
        let Some(document) = self.documents.get(owner) else {
            return Vec::new();
        };
        let mut usages: Vec<_> = document
            .uses
            .iter()
            .flat_map(|name| self.usages(name))
            .filter(|usage| usage.owner == *owner)
            .collect();
        usages.sort_by_key(|usage| usage.range.start());
        usages
    }

    pub fn dom_tree(&self, owner: &FilePath) -> Option<&DomTree> {
        self.documents.get(owner)?.dom.as_ref()
    }

    pub fn diagnostics(&self, owner: &FilePath) -> &[SyntaxError] {
        self.documents
            .get(owner)
            .map(|document| document.diagnostics.as_slice())
            .unwrap_or_default()
    }

    pub fn line_index(&self, owner: &FilePath) -> Option<&LineIndex> {
        self.documents
            .get(owner)
            .map(|document| &document.line_index)
    }

    pub fn document_kind(&self, owner: &FilePath) -> Option<DocumentKind> {
        self.documents.get(owner).map(|document| document.kind)
    }

    pub fn documents(&self) -> impl Iterator<Item = &FilePath> + '_ {
        self.documents.keys()
    }

    pub fn contains(&self, owner: &FilePath) -> bool {
        self.documents.contains_key(owner)
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// The definition or usage under `offset`. A cursor right after a name
    /// still counts as being on it.
    pub fn reference_at(&self, owner: &FilePath, offset: TextSize) -> Option<Reference<'_>> {
        let document = self.documents.get(owner)?;
        let mention = document.mention_at(offset).or_else(|| {
            let before = offset.checked_sub(TextSize::from(1))?;
            document.mention_at(before)
        })?;

        match mention.kind {
            MentionKind::Definition => self
                .definitions(&mention.name)
                .iter()
                .find(|it| it.owner == *owner && it.name_range() == mention.range)
                .map(Reference::Definition),
            MentionKind::Usage => self
                .usages(&mention.name)
                .iter()
                .find(|it| it.owner == *owner && it.range == mention.range)
                .map(Reference::Usage),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct ScanProgress {
    pub done: usize,
    pub total: usize,
}

impl ScanProgress {
    pub fn is_finished(&self) -> bool {
        self.done == self.total
    }
}

/// A workspace scan in progress. Each call to `next` parses files until the
/// next progress report; dropping it stops the scan and keeps whatever was
/// indexed so far.
pub struct Scan<'a, FS: ?Sized> {
    index: &'a mut Index,
    fs: &'a FS,
    files: indexmap::set::IntoIter<FilePath>,
    done: usize,
    total: usize,
    interval: usize,
    finished: bool,
}

impl<FS: FileSystem + ?Sized> Scan<'_, FS> {
    fn progress(&self) -> ScanProgress {
        ScanProgress {
            done: self.done,
            total: self.total,
        }
    }

    fn index_file(&mut self, path: FilePath) {
        match self.fs.read_content(&path) {
            Ok(text) => {
                let kind = DocumentKind::from_path(&path);
                self.index.parse(&text, path, kind);
            }
            Err(err) => warn!(path = %path, "skipping unreadable file: {err}"),
        }
    }
}

impl<FS: FileSystem + ?Sized> Iterator for Scan<'_, FS> {
    type Item = ScanProgress;

    fn next(&mut self) -> Option<ScanProgress> {
        if self.finished {
            return None;
        }
        while let Some(path) = self.files.next() {
            self.index_file(path);
            self.done += 1;
            if self.done % self.interval == 0 && self.done < self.total {
                return Some(self.progress());
            }
        }
        self.finished = true;
        info!(
            files = self.done,
            variables = self.index.definitions.len(),
            "workspace scan finished"
        );
        Some(self.progress())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::file_system::FileFilter;
    use crate::tests;

    fn path(path: &str) -> FilePath {
        FilePath::from(Path::new(path))
    }

    fn values(index: &Index, name: &str) -> Vec<(String, String)> {
        index
            .definitions(name)
            .iter()
            .map(|it| (it.owner.to_string(), it.value.to_string()))
            .collect()
    }

    #[test]
    fn parse_records_definitions_and_usages() {
        let text = ":root { --fg: #111; }\n.btn { color: var(--fg, red); --pad: 4px !important; }";
        let mut index = Index::new();
        index.parse(text, path("/a.css"), DocumentKind::Css);

        let fg = &index.definitions("--fg")[0];
        assert_eq!(fg.selector, ":root");
        assert_eq!(&text[fg.value_range], "#111");
        assert_eq!(fg.source_position, fg.declaration_range.start());

        let pad = &index.definitions("--pad")[0];
        assert!(pad.important);
        assert_eq!(pad.value, "4px");
        assert_eq!(pad.selector, ".btn");

        let usage = &index.usages("--fg")[0];
        assert_eq!(usage.context, ".btn");
        assert_eq!(usage.fallback.as_deref(), Some("red"));
        assert_eq!(&text[usage.range], "var(--fg, red)");
        assert_eq!(usage.dom_node, None);
    }

    #[test]
    fn parse_then_remove_leaves_nothing_behind() {
        let mut index = Index::new();
        index.parse(":root { --keep: 1; }", path("/keep.css"), DocumentKind::Css);
        let names_before: Vec<_> = index.variable_names().cloned().collect();

        let owner = path("/page.html");
        index.parse(
            "<style>.a { --x: var(--keep); }</style><p style=\"--y: 2\"></p>",
            owner.clone(),
            DocumentKind::Html,
        );
        assert!(index.dom_tree(&owner).is_some());
        index.remove(&owner);

        assert_eq!(index.variable_names().cloned().collect::<Vec<_>>(), names_before);
        assert!(index.usages("--keep").is_empty());
        assert!(index.dom_tree(&owner).is_none());
        assert!(index.definitions_in(&owner).is_empty());
        assert!(!index.contains(&owner));

        index.remove(&path("/never-seen.css"));
    }

    #[test]
    fn reparse_is_idempotent() {
        let text = ":root { --a: 1; --a: 2; } b { width: var(--a); }";
        let mut index = Index::new();
        index.parse(text, path("/a.css"), DocumentKind::Css);
        let definitions = index.definitions("--a").to_vec();
        let usages = index.usages("--a").to_vec();

        index.parse(text, path("/a.css"), DocumentKind::Css);
        assert_eq!(index.definitions("--a"), definitions.as_slice());
        assert_eq!(index.usages("--a"), usages.as_slice());
    }

    #[test]
    fn cross_file_definitions_share_a_bucket() {
        let mut index = Index::new();
        index.parse(":root { --shared: red; }", path("/a.css"), DocumentKind::Css);
        index.parse("body { --shared: blue; }", path("/b.css"), DocumentKind::Css);
        assert_eq!(
            values(&index, "--shared"),
            vec![
                ("/a.css".to_string(), "red".to_string()),
                ("/b.css".to_string(), "blue".to_string()),
            ]
        );

        index.remove(&path("/a.css"));
        assert_eq!(
            values(&index, "--shared"),
            vec![("/b.css".to_string(), "blue".to_string())]
        );
    }

    #[test]
    fn html_fragments_are_shifted_and_tagged() {
        let text = r#"<!-- <p style="--hidden: 1"></p> -->
<style>
  .card { --bg: white; }
</style>
<div class="card" style="--local: red; color: var(--bg)"></div>"#;
        let owner = path("/index.html");
        let mut index = Index::new();
        index.parse(text, owner.clone(), DocumentKind::Html);

        assert!(index.definitions("--hidden").is_empty());

        let bg = &index.definitions("--bg")[0];
        assert_eq!(bg.selector, ".card");
        assert!(!bg.inline);
        assert_eq!(&text[bg.declaration_range], "--bg: white");

        let local = &index.definitions("--local")[0];
        assert!(local.inline);
        assert_eq!(local.selector, INLINE_STYLE);
        assert_eq!(&text[local.value_range], "red");

        let usage = &index.usages("--bg")[0];
        assert_eq!(usage.context, INLINE_STYLE);
        assert_eq!(&text[usage.range], "var(--bg)");
        let tree = index.dom_tree(&owner).unwrap();
        let node = tree.node(usage.dom_node.unwrap()).unwrap();
        assert_eq!(node.tag, "div");
    }

    #[test]
    fn other_kinds_only_clear() {
        let owner = path("/notes.txt");
        let mut index = Index::new();
        index.parse(":root { --a: 1; }", owner.clone(), DocumentKind::Css);
        index.parse(":root { --a: 1; }", owner.clone(), DocumentKind::Other);
        assert!(index.definitions("--a").is_empty());
        assert!(!index.contains(&owner));
    }

    #[test]
    fn syntax_errors_are_kept_per_document() {
        let owner = path("/a.css");
        let mut index = Index::new();
        index.parse("a { --x red; --y: 1; }", owner.clone(), DocumentKind::Css);
        assert_eq!(index.definitions("--y").len(), 1);
        let messages: Vec<_> = index
            .diagnostics(&owner)
            .iter()
            .map(|it| it.message.to_string())
            .collect();
        assert_eq!(messages, vec!["expected ':' after custom property name"]);
    }

    #[test]
    fn reference_at_finds_the_innermost_mention() {
        let (host, f) = tests::single_file("a { --o$uter: var(--x, var(--i$nner)); }$");
        let index = host.index();
        let at = |i: usize| {
            let marker = f.marker(i);
            index
                .reference_at(&marker.file, marker.position)
                .map(|it| (matches!(it, Reference::Definition(_)), it.name().to_string()))
        };
        assert_eq!(at(0), Some((true, "--outer".to_string())));
        assert_eq!(at(1), Some((false, "--inner".to_string())));
        assert_eq!(at(2), None);
    }

    #[test]
    fn reference_at_accepts_the_end_of_a_name() {
        let (host, f) = tests::single_file(":root { --gap$: 1px; }");
        let marker = f.marker(0);
        let reference = host.index().reference_at(&marker.file, marker.position);
        assert_eq!(reference.map(|it| it.name().to_string()), Some("--gap".into()));
    }

    #[test]
    fn definitions_and_usages_in_document_order() {
        let owner = path("/a.css");
        let mut index = Index::new();
        index.parse(
            "a { --b: var(--z); --a: var(--y); }",
            owner.clone(),
            DocumentKind::Css,
        );
        let names: Vec<_> = index
            .definitions_in(&owner)
            .iter()
            .map(|it| it.name.as_str())
            .collect();
        assert_eq!(names, vec!["--b", "--a"]);
        let names: Vec<_> = index
            .usages_in(&owner)
            .iter()
            .map(|it| it.name.as_str())
            .collect();
        assert_eq!(names, vec!["--z", "--y"]);
    }

    #[test]
    fn refresh_from_disk_reads_or_removes() {
        let (mut host, f) = tests::multiple_files(
            r#"
; /on-disk.css
:root { --disk: 1; }
"#,
        );
        let on_disk = path("/on-disk.css");
        host.index_mut()
            .parse(":root { --editor: 1; }", on_disk.clone(), DocumentKind::Css);
        host.index_mut().refresh_from_disk(&f, &on_disk);
        assert_eq!(host.index().definitions("--disk").len(), 1);
        assert!(host.index().definitions("--editor").is_empty());

        let gone = path("/gone.css");
        host.index_mut()
            .parse(":root { --gone: 1; }", gone.clone(), DocumentKind::Css);
        host.index_mut().refresh_from_disk(&f, &gone);
        assert!(host.index().definitions("--gone").is_empty());
        assert!(!host.index().contains(&gone));
    }

    #[test]
    fn scan_reports_progress_and_skips_excluded_files() {
        let (_, f) = tests::multiple_files(
            r#"
; /work/a.css
:root { --a: 1; }
; /work/b.scss
:root { --b: 1; }
; /work/c.html
<p style="--c: 1"></p>
; /work/readme.md
--d: 1;
; /work/node_modules/lib/d.css
:root { --e: 1; }
; /other/e.css
:root { --f: 1; }
"#,
        );
        let config = ScanConfig {
            progress_interval: 2,
            ..ScanConfig::default()
        };
        let mut index = Index::new();
        let progress: Vec<_> = index
            .scan(&f, &[path("/work")], &config)
            .unwrap()
            .collect();
        assert_eq!(
            progress,
            vec![
                ScanProgress { done: 2, total: 3 },
                ScanProgress { done: 3, total: 3 },
            ]
        );
        let mut names: Vec<_> = index.variable_names().map(|it| it.to_string()).collect();
        names.sort();
        assert_eq!(names, vec!["--a", "--b", "--c"]);
    }

    #[test]
    fn dropping_a_scan_keeps_parsed_files() {
        let (_, f) = tests::multiple_files(
            r#"
; /w/a.css
:root { --a: 1; }
; /w/b.css
:root { --b: 1; }
"#,
        );
        let config = ScanConfig {
            progress_interval: 1,
            ..ScanConfig::default()
        };
        let mut index = Index::new();
        let mut scan = index.scan(&f, &[path("/w")], &config).unwrap();
        assert_eq!(scan.next(), Some(ScanProgress { done: 1, total: 2 }));
        drop(scan);
        assert_eq!(index.documents().count(), 1);
    }

    /// Serves fixed contents; files without contents fail with a permission
    /// error and paths it does not know are missing.
    struct FlakyFs {
        files: Vec<(FilePath, Option<&'static str>)>,
    }

    impl FlakyFs {
        fn new(files: &[(&str, Option<&'static str>)]) -> Self {
            Self {
                files: files.iter().map(|(it, text)| (path(it), *text)).collect(),
            }
        }
    }

    impl FileSystem for FlakyFs {
        fn read_content(&self, file_path: &FilePath) -> io::Result<String> {
            match self.files.iter().find(|(it, _)| it == file_path) {
                Some((_, Some(text))) => Ok(text.to_string()),
                Some((_, None)) => Err(io::Error::from(io::ErrorKind::PermissionDenied)),
                None => Err(io::Error::from(io::ErrorKind::NotFound)),
            }
        }

        fn walk(&self, root: &FilePath, _: &FileFilter) -> Vec<FilePath> {
            self.files
                .iter()
                .map(|(it, _)| it.clone())
                .filter(|it| it.as_path().starts_with(root.as_path()))
                .collect()
        }
    }

    #[test]
    fn scan_skips_unreadable_files() {
        let fs = FlakyFs::new(&[
            ("/w/a.css", Some(":root { --a: 1; }")),
            ("/w/locked.css", None),
            ("/w/c.css", Some(":root { --c: 1; }")),
        ]);
        let config = ScanConfig {
            progress_interval: 1,
            ..ScanConfig::default()
        };
        let mut index = Index::new();
        let progress: Vec<_> = index.scan(&fs, &[path("/w")], &config).unwrap().collect();
        assert_eq!(
            progress,
            vec![
                ScanProgress { done: 1, total: 3 },
                ScanProgress { done: 2, total: 3 },
                ScanProgress { done: 3, total: 3 },
            ]
        );
        assert!(progress.last().unwrap().is_finished());
        let names: Vec<_> = index.variable_names().map(|it| it.to_string()).collect();
        assert_eq!(names, vec!["--a", "--c"]);
        assert!(!index.contains(&path("/w/locked.css")));
    }

    #[test]
    fn refresh_from_disk_keeps_entries_of_unreadable_files() {
        let fs = FlakyFs::new(&[("/w/locked.css", None)]);
        let locked = path("/w/locked.css");
        let mut index = Index::new();
        index.parse(":root { --kept: 1; }", locked.clone(), DocumentKind::Css);

        index.refresh_from_disk(&fs, &locked);
        assert_eq!(index.definitions("--kept").len(), 1);

        let gone = path("/w/gone.css");
        index.parse(":root { --gone: 1; }", gone.clone(), DocumentKind::Css);
        index.refresh_from_disk(&fs, &gone);
        assert!(index.definitions("--gone").is_empty());
        assert!(index.contains(&locked));
    }

    #[test]
    fn document_kinds() {
        assert_eq!(DocumentKind::from_path(&path("/x/a.SCSS")), DocumentKind::Css);
        assert_eq!(DocumentKind::from_path(&path("/x/App.vue")), DocumentKind::Html);
        assert_eq!(DocumentKind::from_path(&path("/x/main.rs")), DocumentKind::Other);
        assert_eq!(DocumentKind::from_language_id("svelte"), DocumentKind::Html);
    }
}
