//! Project stream layout: dialect header, length-prefixed info store,
//! then the stage store running to the end of the stream.

use std::borrow::Cow;
use std::path::Path;

use stch_object::{
    ClassRegistry, Dictionary, DictionaryKind, Object, ObjectGraph, UserRecord, Value,
};
use stch_store::ObjectStore;
use stch_types::{Dialect, WireReader, WireWriter};
use tracing::{debug, warn};

use crate::catalog;
use crate::config::ProjectConfig;
use crate::error::{ProjectError, ProjectResult};

const HEADER_LEN: usize = 10;

/// A project file: dialect header, metadata store, and stage store.
///
/// The metadata store's root is a dictionary keyed by strings. The stage
/// store's root is the stage record, with sprites, scripts and media
/// hanging off it.
#[derive(Clone, Debug, PartialEq)]
pub struct Project {
    dialect: Dialect,
    info: ObjectStore,
    stage: ObjectStore,
}

impl Project {
    /// A default project with default metadata.
    pub fn new(dialect: Dialect) -> ProjectResult<Self> {
        Self::with_config(dialect, &ProjectConfig::default())
    }

    /// A default project whose metadata comes from `config`.
    pub fn with_config(dialect: Dialect, config: &ProjectConfig) -> ProjectResult<Self> {
        let mut graph = ObjectGraph::new();
        let mut info = Dictionary::new(DictionaryKind::Dictionary);
        let entries = [
            ("os-version", graph.string(&config.os_version)),
            ("platform", graph.string(&config.platform)),
            ("language", graph.string(&config.language)),
            ("history", graph.utf8("\r")),
            ("scratch-version", graph.string(dialect.version_label())),
            ("comment", graph.utf8(&config.comment)),
            ("author", graph.utf8(&config.author)),
        ];
        for (key, value) in entries {
            let key = graph.string(key);
            info.insert(key, value);
        }
        let info_root = graph.insert(info);

        let mut stage_graph = ObjectGraph::new();
        let stage_root = catalog::new_stage(&mut stage_graph)?;

        Ok(Self {
            dialect,
            info: ObjectStore::new(graph, info_root),
            stage: ObjectStore::new(stage_graph, stage_root),
        })
    }

    pub fn from_parts(dialect: Dialect, info: ObjectStore, stage: ObjectStore) -> Self {
        Self {
            dialect,
            info,
            stage,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn info(&self) -> &ObjectStore {
        &self.info
    }

    pub fn info_mut(&mut self) -> &mut ObjectStore {
        &mut self.info
    }

    pub fn stage(&self) -> &ObjectStore {
        &self.stage
    }

    pub fn stage_mut(&mut self) -> &mut ObjectStore {
        &mut self.stage
    }

    /// The stage record, if the stage root is one.
    pub fn stage_record(&self) -> Option<&UserRecord> {
        self.stage
            .graph()
            .object(self.stage.root())
            .and_then(Object::as_record)
    }

    /// Switch to `dialect`, updating the recorded version label.
    ///
    /// Record fields that only exist in the new dialect are written with
    /// whatever the record holds for them, which for a decoded record is
    /// the schema default.
    pub fn convert(&mut self, dialect: Dialect) -> ProjectResult<()> {
        if dialect == self.dialect {
            return Ok(());
        }
        debug!(from = %self.dialect, to = %dialect, "converting project");
        self.dialect = dialect;
        let label = self.info.graph_mut().string(dialect.version_label());
        self.set_info_property("scratch-version", label)
    }

    // ---- Metadata ----

    fn info_dictionary(&self) -> ProjectResult<&Dictionary> {
        self.info
            .graph()
            .object(self.info.root())
            .and_then(Object::as_dictionary)
            .ok_or(ProjectError::InfoNotDictionary)
    }

    /// Metadata value stored under the text key `key`.
    pub fn info_property(&self, key: &str) -> Option<&Value> {
        self.info_dictionary()
            .ok()?
            .get_by_text(self.info.graph(), key)
    }

    /// Text content of a metadata value.
    pub fn info_text(&self, key: &str) -> Option<Cow<'_, str>> {
        self.info.graph().text_of(self.info_property(key)?)
    }

    /// Store `value` under `key`, replacing any existing entry. `value`
    /// must belong to the info store's graph.
    pub fn set_info_property(&mut self, key: &str, value: Value) -> ProjectResult<()> {
        let existing = self
            .info_dictionary()?
            .key_by_text(self.info.graph(), key)
            .cloned();
        let key = match existing {
            Some(k) => k,
            None => self.info.graph_mut().string(key),
        };
        let root = self.info.root().clone();
        self.info
            .graph_mut()
            .object_mut(&root)
            .and_then(Object::as_dictionary_mut)
            .ok_or(ProjectError::InfoNotDictionary)?
            .insert(key, value);
        Ok(())
    }

    /// Store a UTF-8 text value under `key`.
    pub fn set_info_text(&mut self, key: &str, text: &str) -> ProjectResult<()> {
        let value = self.info.graph_mut().utf8(text);
        self.set_info_property(key, value)
    }

    // ---- Encoding ----

    pub fn encode(&self) -> ProjectResult<Vec<u8>> {
        let info = self.info.encode(self.dialect)?;
        let mut out = WireWriter::with_capacity(HEADER_LEN + 4 + info.len());
        out.write_bytes(self.dialect.header());
        out.write_len_u32(info.len())?;
        out.write_bytes(&info);
        self.stage.write_to(&mut out, self.dialect)?;
        debug!(dialect = %self.dialect, bytes = out.len(), "encoded project");
        Ok(out.into_bytes())
    }

    /// Decode with the catalogue registry.
    pub fn decode(bytes: &[u8]) -> ProjectResult<Self> {
        let registry = catalog::registry()?;
        Self::decode_with(bytes, &registry)
    }

    pub fn decode_with(bytes: &[u8], registry: &ClassRegistry) -> ProjectResult<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(ProjectError::InvalidHeader(bytes.to_vec()));
        }
        let mut reader = WireReader::new(bytes);
        let header = reader.read_bytes(HEADER_LEN)?;
        let dialect = Dialect::from_header(header).ok_or_else(|| {
            ProjectError::UnknownDialect(String::from_utf8_lossy(header).into_owned())
        })?;

        let declared = reader.read_u32()? as usize;
        let start = reader.position();
        let info = ObjectStore::read_from(&mut reader, registry, dialect)?;
        let consumed = reader.position() - start;
        if consumed != declared {
            warn!(declared, consumed, "info length prefix disagrees with info store size");
        }

        let stage = ObjectStore::read_from(&mut reader, registry, dialect)?;
        if !reader.is_empty() {
            warn!(trailing = reader.remaining(), "trailing bytes after stage store");
        }
        debug!(%dialect, bytes = bytes.len(), "decoded project");
        Ok(Self {
            dialect,
            info,
            stage,
        })
    }

    // ---- Files ----

    pub fn save(&self, path: impl AsRef<Path>) -> ProjectResult<()> {
        std::fs::write(path, self.encode()?)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> ProjectResult<Self> {
        let bytes = std::fs::read(path)?;
        Self::decode(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{add_list, add_sprite, add_watcher, LIST_MORPH, STAGE_MORPH};
    use stch_object::ObjectError;
    use stch_store::{StoreError, HEADER};

    fn text(project: &Project, key: &str) -> String {
        project.info_text(key).unwrap().into_owned()
    }

    #[test]
    fn default_metadata() {
        let project = Project::new(Dialect::Scratch14).unwrap();
        assert_eq!(text(&project, "os-version"), "NT");
        assert_eq!(text(&project, "platform"), "Win32");
        assert_eq!(text(&project, "language"), "en");
        assert_eq!(text(&project, "history"), "\r");
        assert_eq!(text(&project, "scratch-version"), "1.4 of 30-Jun-09");
        assert_eq!(text(&project, "author"), "");
        assert!(project.info_property("missing").is_none());

        let byob = Project::new(Dialect::Byob311).unwrap();
        assert_eq!(text(&byob, "scratch-version"), "3.1.1 (19-May-11)");
    }

    #[test]
    fn config_fills_metadata() {
        let config = ProjectConfig {
            author: "ada".into(),
            comment: "hello".into(),
            ..ProjectConfig::default()
        };
        let project = Project::with_config(Dialect::Scratch14, &config).unwrap();
        assert_eq!(text(&project, "author"), "ada");
        assert_eq!(text(&project, "comment"), "hello");
    }

    #[test]
    fn set_info_replaces_and_adds() {
        let mut project = Project::new(Dialect::Scratch14).unwrap();
        let before = project.info().graph().len();
        project.set_info_text("author", "grace").unwrap();
        assert_eq!(text(&project, "author"), "grace");
        // existing key reused, only the value is new
        assert_eq!(project.info().graph().len(), before + 1);

        project.set_info_text("license", "MIT").unwrap();
        assert_eq!(text(&project, "license"), "MIT");
        assert_eq!(project.info().graph().len(), before + 3);
    }

    #[test]
    fn encoded_layout() {
        let project = Project::new(Dialect::Scratch14).unwrap();
        let bytes = project.encode().unwrap();
        assert_eq!(&bytes[..10], b"ScratchV02");
        let info_len = u32::from_be_bytes([bytes[10], bytes[11], bytes[12], bytes[13]]) as usize;
        assert_eq!(&bytes[14..24], HEADER);
        assert_eq!(&bytes[14 + info_len..24 + info_len], HEADER);
        let info = project.info().encode(Dialect::Scratch14).unwrap();
        assert_eq!(&bytes[14..14 + info_len], &info[..]);
    }

    #[test]
    fn round_trip_is_byte_stable() {
        for dialect in Dialect::ALL {
            let mut project = Project::new(dialect).unwrap();
            let stage = project.stage().root().clone();
            add_sprite(project.stage_mut().graph_mut(), &stage, "Sprite1").unwrap();
            let bytes = project.encode().unwrap();

            let decoded = Project::decode(&bytes).unwrap();
            assert_eq!(decoded.dialect(), dialect);
            assert_eq!(text(&decoded, "language"), "en");
            let stage = decoded.stage_record().unwrap();
            assert_eq!(stage.class_id(), STAGE_MORPH);
            assert_eq!(
                decoded.stage().graph().text_of(stage.get_field("objName").unwrap()).unwrap(),
                "Stage"
            );
            assert_eq!(decoded.encode().unwrap(), bytes);
        }
    }

    #[test]
    fn sprite_owner_is_the_decoded_stage() {
        let mut project = Project::new(Dialect::Byob311).unwrap();
        let stage = project.stage().root().clone();
        add_sprite(project.stage_mut().graph_mut(), &stage, "Sprite1").unwrap();
        let decoded = Project::decode(&project.encode().unwrap()).unwrap();

        let graph = decoded.stage().graph();
        let stage = decoded.stage_record().unwrap();
        let sprites = graph
            .object(stage.get_field("sprites").unwrap())
            .and_then(Object::as_collection)
            .unwrap();
        let sprite = sprites.get(0).unwrap().get().unwrap();
        let submorphs = graph
            .object(stage.get_field("submorphs").unwrap())
            .and_then(Object::as_collection)
            .unwrap();
        assert_eq!(submorphs.get(0).unwrap().get().unwrap(), sprite);

        let sprite = graph.object(sprite).and_then(Object::as_record).unwrap();
        assert_eq!(sprite.get_field("owner").unwrap(), decoded.stage().root());
        assert_eq!(sprite.get_field("unknown2").unwrap(), &Value::True);
    }

    #[test]
    fn lists_and_watchers_round_trip() {
        for dialect in Dialect::ALL {
            let mut project = Project::new(dialect).unwrap();
            let stage = project.stage().root().clone();
            let graph = project.stage_mut().graph_mut();
            let sprite = add_sprite(graph, &stage, "Sprite1").unwrap();
            add_list(graph, &sprite, "items").unwrap();
            add_watcher(graph, &stage, "score").unwrap();
            let bytes = project.encode().unwrap();

            let decoded = Project::decode(&bytes).unwrap();
            let graph = decoded.stage().graph();
            let stage = decoded.stage_record().unwrap();
            let sprite = graph
                .object(stage.get_field("sprites").unwrap())
                .and_then(Object::as_collection)
                .and_then(|c| c.get(0))
                .and_then(|f| f.get().ok())
                .and_then(|v| graph.object(v))
                .and_then(Object::as_record)
                .unwrap();
            let lists = graph
                .object(sprite.get_field("lists").unwrap())
                .and_then(Object::as_dictionary)
                .unwrap();
            let list = lists.get_by_text(graph, "items").unwrap();
            assert_eq!(graph.class_id(list).unwrap(), LIST_MORPH);
            assert_eq!(decoded.encode().unwrap(), bytes);
        }
    }

    #[test]
    fn convert_changes_header_and_label() {
        let mut project = Project::new(Dialect::Scratch14).unwrap();
        let scratch = project.encode().unwrap();
        let mut decoded = Project::decode(&scratch).unwrap();
        decoded.convert(Dialect::Byob311).unwrap();

        let byob = decoded.encode().unwrap();
        assert_eq!(&byob[..10], b"BloxExpV01");
        let reread = Project::decode(&byob).unwrap();
        assert_eq!(reread.dialect(), Dialect::Byob311);
        assert_eq!(text(&reread, "scratch-version"), "3.1.1 (19-May-11)");
        let blocks = reread.stage_record().unwrap().get_field("customBlocks").unwrap();
        assert!(reread.stage().graph().object(blocks).and_then(Object::as_collection).is_some());

        project.convert(Dialect::Scratch14).unwrap();
        assert_eq!(project.encode().unwrap(), scratch);
    }

    #[test]
    fn unknown_header() {
        let mut bytes = Project::new(Dialect::Scratch14).unwrap().encode().unwrap();
        bytes[..10].copy_from_slice(b"NotAProjct");
        assert!(matches!(
            Project::decode(&bytes),
            Err(ProjectError::UnknownDialect(h)) if h == "NotAProjct"
        ));
    }

    #[test]
    fn short_header() {
        assert!(matches!(
            Project::decode(b"Scratch"),
            Err(ProjectError::InvalidHeader(b)) if b == b"Scratch"
        ));
    }

    #[test]
    fn wrong_info_length_still_decodes() {
        let mut bytes = Project::new(Dialect::Scratch14).unwrap().encode().unwrap();
        bytes[10..14].copy_from_slice(&[0, 0, 0, 1]);
        let project = Project::decode(&bytes).unwrap();
        assert_eq!(text(&project, "platform"), "Win32");
    }

    #[test]
    fn truncated_stage_store() {
        let bytes = Project::new(Dialect::Scratch14).unwrap().encode().unwrap();
        let cut = &bytes[..bytes.len() - 3];
        assert!(matches!(
            Project::decode(cut),
            Err(ProjectError::Store(StoreError::Object(ObjectError::Wire(_))))
                | Err(ProjectError::Store(StoreError::Wire(_)))
        ));
    }

    #[test]
    fn dialect_mismatch_fails_schema_check() {
        let mut bytes = Project::new(Dialect::Scratch14).unwrap().encode().unwrap();
        bytes[..10].copy_from_slice(b"BloxExpV01");
        assert!(matches!(
            Project::decode(&bytes),
            Err(ProjectError::Store(StoreError::Object(
                ObjectError::FieldCountMismatch { .. } | ObjectError::SchemaVersionMismatch { .. }
            )))
        ));
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("project.sb");
        let project = Project::new(Dialect::Byob311).unwrap();
        project.save(&path).unwrap();
        let loaded = Project::load(&path).unwrap();
        assert_eq!(loaded.encode().unwrap(), project.encode().unwrap());
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Project::load(dir.path().join("nope.sb")),
            Err(ProjectError::Io(_))
        ));
    }
}
