//! pom.xml parser.
//!
//! Uses the quick-xml SAX reader to collect the raw document, then expands
//! properties and applies dependency management in document order:
//! properties first, then `project.*` values, then managed versions and
//! finally the declared dependencies.

use crate::error::{MavenError, Result};
use crate::properties::resolve_properties;
use crate::registry::MavenRepository;
use crate::types::{
    CoordinateKey, DependencyDeclaration, ManagedVersionTable, MavenScope, PropertyTable,
};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::path::Path;

/// A parsed descriptor before registry lookups.
///
/// `dependencies` are already filtered by scope and `optional`; a `None`
/// version means neither the declaration nor dependency management pinned one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PomDocument {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub dependencies: Vec<DependencyDeclaration>,
    pub managed: ManagedVersionTable,
    pub modules: Vec<String>,
}

/// A descriptor whose dependencies all carry a version.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDescriptor {
    pub dependencies: Vec<DependencyDeclaration>,
    /// Sub-project names. Collected, never traversed.
    pub modules: Vec<String>,
    /// Dependencies dropped because no version could be determined.
    pub unresolved: Vec<CoordinateKey>,
}

/// Context stack element for SAX parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ParseContext {
    Root,
    Project,
    Parent,
    Properties,
    Dependencies,
    DependencyManagement,
    ManagedDependencies,
    Dependency,
    ManagedDependency,
    Modules,
    Field(String),
    Ignored,
}

/// Accumulator for a single dependency being parsed.
#[derive(Debug, Default)]
struct DepAccum {
    group_id: Option<String>,
    artifact_id: Option<String>,
    version: Option<String>,
    scope: Option<String>,
    optional: Option<String>,
}

/// Raw values exactly as they appear in the document.
#[derive(Debug, Default)]
struct RawPom {
    seen_project: bool,
    group_id: Option<String>,
    artifact_id: Option<String>,
    version: Option<String>,
    parent_group_id: Option<String>,
    parent_version: Option<String>,
    properties: Vec<(String, String)>,
    dependencies: Vec<DepAccum>,
    managed: Vec<DepAccum>,
    modules: Vec<String>,
}

#[derive(Debug)]
struct SaxState {
    stack: Vec<ParseContext>,
    text: String,
    current_dep: Option<DepAccum>,
    raw: RawPom,
}

impl SaxState {
    fn new() -> Self {
        Self {
            stack: vec![ParseContext::Root],
            text: String::new(),
            current_dep: None,
            raw: RawPom::default(),
        }
    }

    fn top(&self) -> &ParseContext {
        self.stack.last().unwrap_or(&ParseContext::Root)
    }

    fn open(&mut self, tag: &str) {
        let top = self.top().clone();
        let next = match (&top, tag) {
            (ParseContext::Root, "project") => ParseContext::Project,
            (ParseContext::Project, "parent") => ParseContext::Parent,
            (ParseContext::Project, "properties") => ParseContext::Properties,
            (ParseContext::Project, "dependencies") => ParseContext::Dependencies,
            (ParseContext::Project, "dependencyManagement") => ParseContext::DependencyManagement,
            (ParseContext::Project, "modules") => ParseContext::Modules,
            (ParseContext::DependencyManagement, "dependencies") => {
                ParseContext::ManagedDependencies
            }
            (ParseContext::Dependencies, "dependency") => {
                self.current_dep = Some(DepAccum::default());
                ParseContext::Dependency
            }
            (ParseContext::ManagedDependencies, "dependency") => {
                self.current_dep = Some(DepAccum::default());
                ParseContext::ManagedDependency
            }
            (
                ParseContext::Project | ParseContext::Parent,
                "groupId" | "artifactId" | "version",
            )
            | (ParseContext::Modules, "module")
            | (
                ParseContext::Properties | ParseContext::Dependency | ParseContext::ManagedDependency,
                _,
            ) => {
                self.text.clear();
                ParseContext::Field(tag.to_string())
            }
            _ => ParseContext::Ignored,
        };
        self.stack.push(next);
    }

    fn text(&mut self, text: &str) {
        if matches!(self.top(), ParseContext::Field(_)) {
            self.text.push_str(text);
        }
    }

    fn close(&mut self) {
        let Some(closed) = self.stack.pop() else {
            return;
        };

        match closed {
            ParseContext::Project => self.raw.seen_project = true,
            ParseContext::Dependency => {
                if let Some(dep) = self.current_dep.take() {
                    self.raw.dependencies.push(dep);
                }
            }
            ParseContext::ManagedDependency => {
                if let Some(dep) = self.current_dep.take() {
                    self.raw.managed.push(dep);
                }
            }
            ParseContext::Field(name) => {
                let value = std::mem::take(&mut self.text).trim().to_string();
                self.assign(&name, value);
            }
            _ => {}
        }
    }

    fn assign(&mut self, field: &str, value: String) {
        let non_empty = (!value.is_empty()).then(|| value.clone());
        let parent = self.stack.last().cloned();
        match parent {
            Some(ParseContext::Project) => match field {
                "groupId" => self.raw.group_id = non_empty,
                "artifactId" => self.raw.artifact_id = non_empty,
                "version" => self.raw.version = non_empty,
                _ => {}
            },
            Some(ParseContext::Parent) => match field {
                "groupId" => self.raw.parent_group_id = non_empty,
                "version" => self.raw.parent_version = non_empty,
                _ => {}
            },
            Some(ParseContext::Properties) => {
                self.raw.properties.push((field.to_string(), value));
            }
            Some(ParseContext::Dependency | ParseContext::ManagedDependency) => {
                if let Some(dep) = self.current_dep.as_mut() {
                    match field {
                        "groupId" => dep.group_id = non_empty,
                        "artifactId" => dep.artifact_id = non_empty,
                        "version" => dep.version = non_empty,
                        "scope" => dep.scope = non_empty,
                        "optional" => dep.optional = non_empty,
                        _ => {}
                    }
                }
            }
            Some(ParseContext::Modules) => {
                if let Some(module) = non_empty {
                    self.raw.modules.push(module);
                }
            }
            _ => {}
        }
    }
}

fn read_raw_pom(content: &str) -> Result<RawPom> {
    let mut reader = Reader::from_str(content);
    let mut state = SaxState::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| MavenError::parse(e.to_string()))?;

        match event {
            Event::Start(ref e) => {
                let tag = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                state.open(&tag);
            }
            Event::Empty(ref e) => {
                let tag = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                state.open(&tag);
                state.close();
            }
            Event::End(_) => state.close(),
            Event::Text(ref e) => {
                let text = match e.decode() {
                    Ok(cow) => cow.into_owned(),
                    Err(_) => String::from_utf8_lossy(e).to_string(),
                };
                state.text(&text);
            }
            Event::CData(ref e) => {
                state.text(&String::from_utf8_lossy(e));
            }
            Event::GeneralRef(ref e) => {
                let name = String::from_utf8_lossy(e).to_string();
                match resolve_entity(&name) {
                    Some(resolved) => state.text(&resolved),
                    None => state.text(&format!("&{name};")),
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if state.stack.len() > 1 {
        return Err(MavenError::parse("unexpected end of document"));
    }
    if !state.raw.seen_project {
        return Err(MavenError::parse("missing <project> root element"));
    }
    Ok(state.raw)
}

fn resolve_entity(name: &str) -> Option<String> {
    if let Some(code) = name.strip_prefix('#') {
        let value = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => code.parse().ok()?,
        };
        return char::from_u32(value).map(String::from);
    }
    quick_xml::escape::resolve_predefined_entity(name).map(str::to_string)
}

/// Parses pom.xml content, merging its properties into `properties`.
///
/// Property values are expanded as they are inserted, so a property can
/// refer to any property declared before it. Dependencies excluded by scope
/// or `optional` are dropped; missing versions are filled from dependency
/// management when possible.
pub fn parse_pom_xml(content: &str, properties: &mut PropertyTable) -> Result<PomDocument> {
    let raw = read_raw_pom(content)?;

    for (name, value) in &raw.properties {
        let resolved = resolve_properties(value, properties);
        properties.insert(name.clone(), resolved);
    }

    let group_id = raw
        .group_id
        .as_ref()
        .or(raw.parent_group_id.as_ref())
        .map(|g| resolve_properties(g, properties));
    let version = raw
        .version
        .as_ref()
        .or(raw.parent_version.as_ref())
        .map(|v| resolve_properties(v, properties));
    let artifact_id = raw
        .artifact_id
        .as_ref()
        .map(|a| resolve_properties(a, properties));

    if let Some(ref g) = group_id {
        properties.insert("project.groupId".into(), g.clone());
    }
    if let Some(ref v) = version {
        properties.insert("project.version".into(), v.clone());
    }
    if let Some(ref a) = artifact_id {
        properties.insert("project.artifactId".into(), a.clone());
    }

    let mut managed = ManagedVersionTable::new();
    for dep in &raw.managed {
        if let (Some(g), Some(a), Some(v)) = (&dep.group_id, &dep.artifact_id, &dep.version) {
            let key = CoordinateKey::new(
                resolve_properties(g, properties),
                resolve_properties(a, properties),
            );
            managed.insert(key, resolve_properties(v, properties));
        }
    }

    let mut dependencies = Vec::new();
    for dep in &raw.dependencies {
        let (Some(g), Some(a)) = (&dep.group_id, &dep.artifact_id) else {
            tracing::warn!("dependency missing groupId or artifactId, skipping");
            continue;
        };

        let group_id = resolve_properties(g, properties);
        let artifact_id = resolve_properties(a, properties);
        let version = match &dep.version {
            Some(v) => Some(resolve_properties(v, properties)),
            None => managed.get(&group_id, &artifact_id).map(str::to_string),
        };
        let scope = dep
            .scope
            .as_deref()
            .map(|s| resolve_properties(s, properties))
            .as_deref()
            .unwrap_or("compile")
            .parse::<MavenScope>()
            .unwrap_or_default();
        let optional = dep
            .optional
            .as_deref()
            .is_some_and(|o| resolve_properties(o, properties).eq_ignore_ascii_case("true"));

        let declaration = DependencyDeclaration {
            group_id,
            artifact_id,
            version,
            scope,
            optional,
        };

        if declaration.is_excluded() {
            tracing::trace!(
                dependency = %declaration.key(),
                scope = ?declaration.scope,
                optional = declaration.optional,
                "skipping excluded dependency"
            );
            continue;
        }
        dependencies.push(declaration);
    }

    Ok(PomDocument {
        group_id,
        artifact_id,
        version,
        dependencies,
        managed,
        modules: raw.modules,
    })
}

/// Reads and parses the descriptor at `path`, asking `registry` for the
/// latest version of any dependency that is still unversioned.
///
/// Dependencies whose version cannot be determined are dropped with a
/// warning and listed in [`ParsedDescriptor::unresolved`].
pub async fn parse_descriptor<R>(
    path: &Path,
    properties: &mut PropertyTable,
    registry: &R,
) -> Result<ParsedDescriptor>
where
    R: MavenRepository + ?Sized,
{
    tracing::debug!(path = %path.display(), "parsing POM");
    let content = tokio::fs::read_to_string(path).await?;
    let document = parse_pom_xml(&content, properties)?;

    let mut dependencies = Vec::with_capacity(document.dependencies.len());
    let mut unresolved = Vec::new();

    for mut dep in document.dependencies {
        if dep.version.is_none() {
            match registry.latest_version(&dep.group_id, &dep.artifact_id).await {
                Some(version) => {
                    tracing::info!(
                        dependency = %dep.key(),
                        version = %version,
                        "resolved latest version"
                    );
                    dep.version = Some(version);
                }
                None => {
                    tracing::warn!(
                        dependency = %dep.key(),
                        path = %path.display(),
                        "no version specified and none found in registry, skipping"
                    );
                    unresolved.push(dep.key());
                    continue;
                }
            }
        }
        dependencies.push(dep);
    }

    Ok(ParsedDescriptor {
        dependencies,
        modules: document.modules,
        unresolved,
    })
}
