//! A hand-maintained XML document exposed as a settings store.
//!
//! The `appSettings` section is either the document element itself or a
//! direct child of it.  Each setting is an `<add key="..." value="..."/>`
//! element.  The key/value view is rebuilt from the element tree on every
//! access, so edits made through [`XmlConfiguration::document_mut`] are
//! always visible.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::document::{XmlDeclaration, XmlDocument, XmlElement, XmlNode};
use crate::domain::store::{SettingsStore, StoreError};

/// Element name of the settings section.
pub const APP_SETTINGS: &str = "appSettings";

const ADD: &str = "add";
const KEY: &str = "key";
const VALUE: &str = "value";

/// An XML document bound to the file it is saved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlConfiguration {
    document: XmlDocument,
    path: PathBuf,
}

impl XmlConfiguration {
    /// Wraps an already parsed document.
    pub fn new(document: XmlDocument, path: impl Into<PathBuf>) -> Self {
        Self {
            document,
            path: path.into(),
        }
    }

    /// A fresh document: declaration plus an empty `appSettings` element.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        let document = XmlDocument {
            declaration: Some(XmlDeclaration::default()),
            root: Some(XmlElement::new(APP_SETTINGS)),
            ..XmlDocument::default()
        };
        Self::new(document, path)
    }

    /// Opens the document at `path`.
    ///
    /// A missing file yields [`empty`](Self::empty).  A document without an
    /// `appSettings` section gets one appended to its document element.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file cannot be read and
    /// [`StoreError::XmlParse`] if it is not well-formed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "XML settings file not found, starting empty");
                return Ok(Self::empty(path));
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        let document = XmlDocument::parse(&text).map_err(|e| StoreError::XmlParse {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        let mut config = Self::new(document, path);
        config.ensure_app_settings();
        Ok(config)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn document(&self) -> &XmlDocument {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut XmlDocument {
        &mut self.document
    }

    /// The `appSettings` element, if the document has one.
    pub fn app_settings(&self) -> Option<&XmlElement> {
        let root = self.document.root.as_ref()?;
        if root.name == APP_SETTINGS {
            Some(root)
        } else {
            root.child(APP_SETTINGS)
        }
    }

    fn app_settings_mut(&mut self) -> Option<&mut XmlElement> {
        let root = self.document.root.as_mut()?;
        if root.name == APP_SETTINGS {
            Some(root)
        } else {
            root.child_mut(APP_SETTINGS)
        }
    }

    /// Key/value pairs of the section in document order.
    ///
    /// Only the first occurrence of a duplicated key is reported.
    pub fn settings(&self) -> Vec<(String, String)> {
        self.app_settings().map(collect_entries).unwrap_or_default()
    }

    /// Creates the `appSettings` section if the document lacks one.
    fn ensure_app_settings(&mut self) {
        if self.app_settings().is_some() {
            return;
        }
        match self.document.root.as_mut() {
            Some(root) => {
                debug!(root = %root.name, "appending missing appSettings section");
                root.append_child(XmlElement::new(APP_SETTINGS));
            }
            None => self.document.root = Some(XmlElement::new(APP_SETTINGS)),
        }
    }

    /// Writes the document to its path, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::XmlWrite`] if serialization fails and
    /// [`StoreError::Io`] if the file cannot be written.
    pub fn write(&self) -> Result<(), StoreError> {
        let xml = self
            .document
            .to_xml_string()
            .map_err(|e| StoreError::XmlWrite {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| StoreError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        fs::write(&self.path, xml).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;

        info!(path = %self.path.display(), "XML settings written");
        Ok(())
    }
}

fn is_add(node: &XmlNode) -> Option<&XmlElement> {
    match node {
        XmlNode::Element(e) if e.name == ADD => Some(e),
        _ => None,
    }
}

fn collect_entries(section: &XmlElement) -> Vec<(String, String)> {
    let mut entries: Vec<(String, String)> = Vec::new();
    for add in section.children.iter().filter_map(is_add) {
        let Some(key) = add.attribute(KEY) else {
            warn!("ignoring <add> element without a key attribute");
            continue;
        };
        if entries.iter().any(|(k, _)| k == key) {
            continue;
        }
        let value = add.attribute(VALUE).unwrap_or_default();
        entries.push((key.to_string(), value.to_string()));
    }
    entries
}

fn key_matches(node: &XmlNode, predicate: impl Fn(&str) -> bool) -> bool {
    is_add(node)
        .and_then(|e| e.attribute(KEY))
        .is_some_and(predicate)
}

impl SettingsStore for XmlConfiguration {
    fn get(&self, key: &str) -> Option<String> {
        self.settings()
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    fn all_keys(&self) -> Vec<String> {
        self.settings().into_iter().map(|(k, _)| k).collect()
    }

    fn add(&mut self, key: &str, value: &str) {
        self.ensure_app_settings();
        let Some(section) = self.app_settings_mut() else {
            return;
        };
        if section.children.iter().any(|n| key_matches(n, |k| k == key)) {
            return;
        }
        section.append_child(
            XmlElement::new(ADD)
                .with_attribute(KEY, key)
                .with_attribute(VALUE, value),
        );
    }

    fn remove(&mut self, key: &str) {
        if let Some(section) = self.app_settings_mut() {
            section.children.retain(|n| !key_matches(n, |k| k == key));
        }
    }

    fn remove_by_prefix(&mut self, prefix: &str) {
        if let Some(section) = self.app_settings_mut() {
            section.children.retain(|n| !key_matches(n, |k| k.contains(prefix)));
        }
    }

    fn save(&mut self) -> Result<(), StoreError> {
        self.write()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
