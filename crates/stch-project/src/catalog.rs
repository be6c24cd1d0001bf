//! Record classes that make up a project's stage tree.
//!
//! Each schema lists its parent's fields first, so a sprite carries the
//! morph fields, then the scriptable fields, then its own. Fields marked
//! for one dialect are only read and written in that dialect.

use std::sync::Arc;

use stch_media::form_from_pixels;
use stch_object::{
    Bytes, BytesKind, ClassRegistry, CollectionKind, Color, ObjectError, ObjectGraph, ObjectResult,
    RecordSchema, Value,
};
use stch_types::{ClassVersion, Dialect};
use tracing::debug;

use crate::error::{ProjectError, ProjectResult};

pub const MORPH: u8 = 100;
pub const ALIGNMENT_MORPH: u8 = 104;
pub const STRING_MORPH: u8 = 105;
pub const UPDATING_STRING_MORPH: u8 = 106;
pub const SIMPLE_SLIDER_MORPH: u8 = 107;
pub const SAMPLED_SOUND: u8 = 109;
pub const IMAGE_MORPH: u8 = 110;
pub const SPRITE_MORPH: u8 = 124;
pub const STAGE_MORPH: u8 = 125;
pub const WATCHER_MORPH: u8 = 155;
pub const IMAGE_MEDIA: u8 = 162;
pub const SOUND_MEDIA: u8 = 164;
pub const WATCHER_READOUT_FRAME_MORPH: u8 = 173;
pub const WATCHER_SLIDER_MORPH: u8 = 174;
pub const LIST_MORPH: u8 = 175;
pub const CUSTOM_BLOCK_DEFINITION: u8 = 201;
pub const VARIABLE_FRAME: u8 = 205;

/// Stage size in pixels.
pub const STAGE_WIDTH: i64 = 480;
pub const STAGE_HEIGHT: i64 = 360;

fn nil(_: &mut ObjectGraph) -> ObjectResult<Value> {
    Ok(Value::Nil)
}

fn yes(_: &mut ObjectGraph) -> ObjectResult<Value> {
    Ok(Value::True)
}

fn no(_: &mut ObjectGraph) -> ObjectResult<Value> {
    Ok(Value::False)
}

fn empty_utf8(graph: &mut ObjectGraph) -> ObjectResult<Value> {
    Ok(graph.utf8(""))
}

fn array(graph: &mut ObjectGraph) -> ObjectResult<Value> {
    Ok(graph.array(Vec::new()))
}

fn ordered(graph: &mut ObjectGraph) -> ObjectResult<Value> {
    Ok(graph.ordered_collection(Vec::new()))
}

fn set(graph: &mut ObjectGraph) -> ObjectResult<Value> {
    Ok(graph.collection(CollectionKind::Set, Vec::new()))
}

fn dictionary(graph: &mut ObjectGraph) -> ObjectResult<Value> {
    Ok(graph.dictionary())
}

fn origin(graph: &mut ObjectGraph) -> ObjectResult<Value> {
    Ok(graph.point(0, 0))
}

fn full_volume(_: &mut ObjectGraph) -> ObjectResult<Value> {
    Ok(Value::SmallInt16(100))
}

fn tempo(_: &mut ObjectGraph) -> ObjectResult<Value> {
    Ok(Value::SmallInt16(60))
}

fn zero(_: &mut ObjectGraph) -> ObjectResult<Value> {
    Ok(Value::SmallInt16(0))
}

/// A fresh record of `schema`, allocated into `graph`.
fn nested(graph: &mut ObjectGraph, schema: ObjectResult<RecordSchema>) -> ObjectResult<Value> {
    let record = schema?.instantiate(graph)?;
    Ok(graph.insert(record))
}

// ---- Morphs ----

pub fn morph() -> ObjectResult<RecordSchema> {
    let mut schema = RecordSchema::new(MORPH, "Morph", ClassVersion::uniform(1));
    schema
        .field("bounds", |g| Ok(g.rectangle(0, 0, 0, 0)))?
        .field("owner", nil)?
        .field("submorphs", array)?
        .field("color", |g| Ok(g.color(1023, 1023, 1023)))?
        .field("flags", zero)?
        .field("properties", nil)?;
    Ok(schema)
}

/// Fields shared by the stage and sprites.
fn scriptable(class_id: u8, name: &str, version: ClassVersion) -> ObjectResult<RecordSchema> {
    let mut schema = RecordSchema::extend(&morph()?, class_id, name, version);
    schema
        .field("objName", empty_utf8)?
        .field("vars", dictionary)?
        .field("blocksBin", array)?
        .field_in(Dialect::Byob311, "customBlocks", ordered)?
        .field("isClone", no)?
        .field("media", ordered)?
        .field("costume", nil)?;
    Ok(schema)
}

pub fn stage_morph() -> ObjectResult<RecordSchema> {
    let mut schema = scriptable(STAGE_MORPH, "StageMorph", ClassVersion::uniform(5))?;
    schema
        .field("zoom", |_| Ok(Value::Float(1.0)))?
        .field("hPan", zero)?
        .field("vPan", zero)?
        .field("obsoleteSavedState", nil)?
        .field("sprites", ordered)?
        .field("volume", full_volume)?
        .field("tempoBPM", tempo)?
        .field("sceneStates", dictionary)?
        .field("lists", dictionary)?;
    Ok(schema)
}

pub fn sprite_morph() -> ObjectResult<RecordSchema> {
    let mut schema = scriptable(SPRITE_MORPH, "SpriteMorph", ClassVersion::new(3, 5))?;
    schema
        .field("visibility", full_volume)?
        .field("scalePoint", |g| Ok(g.point(1, 1)))?
        .field("rotationDegrees", |_| Ok(Value::Float(0.0)))?
        .field("rotationStyle", |g| Ok(g.symbol("normal")))?
        .field("volume", full_volume)?
        .field("tempoBPM", tempo)?
        .field("draggable", no)?
        .field("sceneStates", dictionary)?
        .field("lists", dictionary)?
        .field_in(Dialect::Byob311, "scale", full_volume)?
        .field_in(Dialect::Byob311, "unknown0", nil)?
        .field_in(Dialect::Byob311, "unknown1", ordered)?
        .field_in(Dialect::Byob311, "unknown2", yes)?
        .field_in(Dialect::Byob311, "midpoint", origin)?
        .field_in(Dialect::Byob311, "parent", nil)?
        .field_in(Dialect::Byob311, "inheritedMedia", set)?;
    Ok(schema)
}

/// Morph with a border; the base of lists, sliders and watcher frames.
fn bordered(class_id: u8, name: &str, version: ClassVersion) -> ObjectResult<RecordSchema> {
    let mut schema = RecordSchema::extend(&morph()?, class_id, name, version);
    schema
        .field("borderWidth", zero)?
        .field("borderColor", |g| Ok(g.insert(Color::from_rgb8(148, 145, 145))))?;
    Ok(schema)
}

pub fn list_morph() -> ObjectResult<RecordSchema> {
    let mut schema = bordered(LIST_MORPH, "ListMorph", ClassVersion::new(2, 3))?;
    schema
        .field("listName", empty_utf8)?
        .field("cellMorphs", array)?
        .field("target", nil)?
        .field_in(Dialect::Byob311, "objectEntries", array)?;
    Ok(schema)
}

// ---- Watchers ----

pub fn alignment_morph() -> ObjectResult<RecordSchema> {
    let mut schema = bordered(ALIGNMENT_MORPH, "AlignmentMorph", ClassVersion::uniform(1))?;
    alignment_fields(&mut schema)?;
    Ok(schema)
}

fn alignment_fields(schema: &mut RecordSchema) -> ObjectResult<()> {
    schema
        .field("orientation", |g| Ok(g.symbol("vertical")))?
        .field("centering", |g| Ok(g.symbol("center")))?
        .field("hResizing", |g| Ok(g.symbol("shrinkWrap")))?
        .field("vResizing", |g| Ok(g.symbol("shrinkWrap")))?
        .field("inset", |_| Ok(Value::SmallInt16(2)))?;
    Ok(())
}

fn string_fields(schema: &mut RecordSchema) -> ObjectResult<()> {
    schema
        .field("font", |g| {
            let face = g.symbol("VerdanaBold");
            Ok(g.array(vec![face, Value::SmallInt16(10)]))
        })?
        .field("emphasis", zero)?
        .field("contents", empty_utf8)?;
    Ok(())
}

pub fn string_morph() -> ObjectResult<RecordSchema> {
    let mut schema =
        RecordSchema::extend(&morph()?, STRING_MORPH, "StringMorph", ClassVersion::uniform(1));
    string_fields(&mut schema)?;
    Ok(schema)
}

pub fn updating_string_morph() -> ObjectResult<RecordSchema> {
    let mut schema = RecordSchema::extend(
        &morph()?,
        UPDATING_STRING_MORPH,
        "UpdatingStringMorph",
        ClassVersion::uniform(1),
    );
    string_fields(&mut schema)?;
    schema
        .field("format", |g| Ok(g.symbol("default")))?
        .field("target", nil)?
        .field("getSelector", |g| Ok(g.symbol("getVar:")))?
        .field("putSelector", nil)?
        .field("parameter", empty_utf8)?
        .field("floatPrecision", |_| Ok(Value::Float(0.1)))?
        .field("growable", yes)?
        .field("stepTime", full_volume)?;
    Ok(schema)
}

fn slider_fields(schema: &mut RecordSchema) -> ObjectResult<()> {
    schema
        .field("slider", nil)?
        .field("value", |_| Ok(Value::Float(0.0)))?
        .field("setValueSelector", |g| Ok(g.symbol("setVar:to:")))?
        .field("sliderShadow", nil)?
        .field("sliderColor", nil)?
        .field("descending", no)?
        .field("model", nil)?
        .field("target", nil)?
        .field("actionSelector", nil)?
        .field("arguments", zero)?
        .field("actWhen", full_volume)?;
    Ok(())
}

pub fn simple_slider_morph() -> ObjectResult<RecordSchema> {
    let mut schema =
        bordered(SIMPLE_SLIDER_MORPH, "SimpleSliderMorph", ClassVersion::uniform(1))?;
    slider_fields(&mut schema)?;
    Ok(schema)
}

pub fn watcher_slider_morph() -> ObjectResult<RecordSchema> {
    let mut schema =
        bordered(WATCHER_SLIDER_MORPH, "WatcherSliderMorph", ClassVersion::uniform(1))?;
    slider_fields(&mut schema)?;
    schema.field("unknown0", yes)?.field("unknown1", zero)?;
    Ok(schema)
}

pub fn watcher_readout_frame_morph() -> ObjectResult<RecordSchema> {
    bordered(
        WATCHER_READOUT_FRAME_MORPH,
        "WatcherReadoutFrameMorph",
        ClassVersion::uniform(1),
    )
}

pub fn image_morph() -> ObjectResult<RecordSchema> {
    let mut schema =
        RecordSchema::extend(&morph()?, IMAGE_MORPH, "ImageMorph", ClassVersion::uniform(1));
    schema.field("form", nil)?.field("transparency", nil)?;
    Ok(schema)
}

/// Variable watcher: a titled readout with an optional slider.
pub fn watcher_morph() -> ObjectResult<RecordSchema> {
    let mut schema = bordered(WATCHER_MORPH, "WatcherMorph", ClassVersion::uniform(5))?;
    alignment_fields(&mut schema)?;
    schema
        .field("titleMorph", |g| nested(g, string_morph()))?
        .field("readout", |g| nested(g, updating_string_morph()))?
        .field("readoutFrame", |g| nested(g, watcher_readout_frame_morph()))?
        .field("scratchSlider", |g| nested(g, watcher_slider_morph()))?
        .field("watcher", nil)?
        .field("isSpriteSpecific", nil)?
        .field("unused", nil)?
        .field("sliderMin", zero)?
        .field("sliderMax", full_volume)?
        .field("isLarge", no)?;
    Ok(schema)
}

// ---- Media ----

fn media(class_id: u8, name: &str, version: ClassVersion) -> ObjectResult<RecordSchema> {
    let mut schema = RecordSchema::new(class_id, name, version);
    schema.field("mediaName", empty_utf8)?;
    Ok(schema)
}

pub fn image_media() -> ObjectResult<RecordSchema> {
    let mut schema = media(IMAGE_MEDIA, "ImageMedia", ClassVersion::uniform(4))?;
    schema
        .field("form", nil)?
        .field("rotationCenter", origin)?
        .field("textBox", nil)?
        .field("jpegBytes", nil)?
        .field("compositeForm", nil)?;
    Ok(schema)
}

pub fn sampled_sound() -> ObjectResult<RecordSchema> {
    let mut schema = RecordSchema::new(SAMPLED_SOUND, "SampledSound", ClassVersion::uniform(1));
    schema
        .field("envelopes", array)?
        .field("scaledVol", |_| Ok(Value::SmallInt(32768)))?
        .field("initialCount", zero)?
        .field("samples", |g| Ok(g.insert(Bytes::empty(BytesKind::SoundBuffer))))?
        .field("originalSamplingRate", |_| Ok(Value::SmallInt16(22050)))?
        .field("samplesSize", |_| Ok(Value::SmallInt(37792)))?
        .field("scaledIncrement", |_| Ok(Value::SmallInt(65536)))?
        .field("scaledInitialIndex", nil)?;
    Ok(schema)
}

pub fn sound_media() -> ObjectResult<RecordSchema> {
    let mut schema = media(SOUND_MEDIA, "SoundMedia", ClassVersion::uniform(2))?;
    schema
        .field("originalSound", |g| nested(g, sampled_sound()))?
        .field("volume", full_volume)?
        .field("balance", |_| Ok(Value::SmallInt16(50)))?
        .field("compressedSampleRate", nil)?
        .field("compressedBitsPerSample", nil)?
        .field("compressedData", nil)?;
    Ok(schema)
}

// ---- Scripting ----

pub fn custom_block_definition() -> ObjectResult<RecordSchema> {
    let mut schema = RecordSchema::new(
        CUSTOM_BLOCK_DEFINITION,
        "CustomBlockDefinition",
        ClassVersion::uniform(4),
    );
    schema
        .field("userSpec", empty_utf8)?
        .field("blocksVar", set)?
        .field("isAtomic", no)?
        .field("isReporter", no)?
        .field("isBoolean", no)?
        .field("body", array)?
        .field("answer", nil)?
        .field("type", |g| Ok(g.symbol("none")))?
        .field("category", |g| Ok(g.symbol("none")))?
        .field("declarations", dictionary)?
        .field("defaults", dictionary)?
        .field("isGlobal", yes)?;
    Ok(schema)
}

pub fn variable_frame() -> ObjectResult<RecordSchema> {
    let mut schema = RecordSchema::new(VARIABLE_FRAME, "VariableFrame", ClassVersion::uniform(1));
    schema.field("unknown0", dictionary)?;
    Ok(schema)
}

/// Every record class a project stream may contain.
pub fn schemas() -> ObjectResult<Vec<RecordSchema>> {
    Ok(vec![
        morph()?,
        alignment_morph()?,
        string_morph()?,
        updating_string_morph()?,
        simple_slider_morph()?,
        sampled_sound()?,
        image_morph()?,
        sprite_morph()?,
        stage_morph()?,
        watcher_morph()?,
        image_media()?,
        sound_media()?,
        watcher_readout_frame_morph()?,
        watcher_slider_morph()?,
        list_morph()?,
        custom_block_definition()?,
        variable_frame()?,
    ])
}

/// Registry with the fixed formats and every project record class.
pub fn registry() -> ProjectResult<ClassRegistry> {
    let mut registry = ClassRegistry::with_fixed_formats();
    for schema in schemas()? {
        registry.register_record(Arc::new(schema))?;
    }
    debug!(classes = registry.registered_ids().count(), "built project registry");
    Ok(registry)
}

// ---- Construction helpers ----

/// An image costume named `name` holding the given 32-bit pixels.
pub fn new_image_media(
    graph: &mut ObjectGraph,
    name: &str,
    width: i64,
    height: i64,
    pixels: &[u32],
) -> ProjectResult<Value> {
    let mut record = image_media()?.instantiate(graph)?;
    let form = form_from_pixels(graph, width, height, pixels)?;
    let media_name = graph.utf8(name);
    record.set_field("mediaName", media_name)?;
    record.set_field("form", form)?;
    Ok(graph.insert(record))
}

/// A stage named "Stage" wearing a blank 1x1 background.
pub fn new_stage(graph: &mut ObjectGraph) -> ProjectResult<Value> {
    let mut stage = stage_morph()?.instantiate(graph)?;
    let name = graph.utf8("Stage");
    let bounds = graph.rectangle(0, 0, STAGE_WIDTH, STAGE_HEIGHT);
    stage.set_field("objName", name)?;
    stage.set_field("bounds", bounds)?;

    let background = new_image_media(graph, "empty", 1, 1, &[0])?;
    let media = stage.get_field("media")?.clone();
    graph
        .object_mut(&media)
        .and_then(|o| o.as_collection_mut())
        .ok_or(ProjectError::NotAStage)?
        .push(background.clone());
    stage.set_field("costume", background)?;
    Ok(graph.insert(stage))
}

/// Add a sprite named `name` to `stage`, owned by it and listed in both
/// its sprites and its submorphs.
pub fn add_sprite(graph: &mut ObjectGraph, stage: &Value, name: &str) -> ProjectResult<Value> {
    let mut sprite = sprite_morph()?.instantiate(graph)?;
    let obj_name = graph.utf8(name);
    sprite.set_field("objName", obj_name)?;
    sprite.set_field("owner", stage.clone())?;
    let sprite = graph.insert(sprite);

    let record = graph
        .object(stage)
        .and_then(|o| o.as_record())
        .filter(|r| r.class_id() == STAGE_MORPH)
        .ok_or(ProjectError::NotAStage)?;
    let lists = [
        record.get_field("sprites")?.clone(),
        record.get_field("submorphs")?.clone(),
    ];
    for list in &lists {
        graph
            .object_mut(list)
            .and_then(|o| o.as_collection_mut())
            .ok_or(ProjectError::NotAStage)?
            .push(sprite.clone());
    }
    Ok(sprite)
}

/// Add an empty list named `name` to the lists of `owner`, a stage or
/// sprite.
pub fn add_list(graph: &mut ObjectGraph, owner: &Value, name: &str) -> ProjectResult<Value> {
    let lists = graph
        .object(owner)
        .and_then(|o| o.as_record())
        .and_then(|r| r.get_field("lists").ok())
        .cloned()
        .ok_or(ObjectError::WrongKind("scriptable morph"))?;

    let mut list = list_morph()?.instantiate(graph)?;
    let list_name = graph.utf8(name);
    list.set_field("listName", list_name)?;
    list.set_field("target", owner.clone())?;
    let list = graph.insert(list);

    let key = graph.utf8(name);
    graph
        .object_mut(&lists)
        .and_then(|o| o.as_dictionary_mut())
        .ok_or(ObjectError::WrongKind("dictionary"))?
        .insert(key, list.clone());
    Ok(list)
}

/// Show a watcher for the variable `name` on `stage`.
pub fn add_watcher(graph: &mut ObjectGraph, stage: &Value, name: &str) -> ProjectResult<Value> {
    let submorphs = graph
        .object(stage)
        .and_then(|o| o.as_record())
        .filter(|r| r.class_id() == STAGE_MORPH)
        .ok_or(ProjectError::NotAStage)?
        .get_field("submorphs")?
        .clone();

    let mut watcher = watcher_morph()?.instantiate(graph)?;
    watcher.set_field("owner", stage.clone())?;
    let title = watcher.get_field("titleMorph")?.clone();
    let readout = watcher.get_field("readout")?.clone();
    for (morph, field) in [(&title, "contents"), (&readout, "parameter")] {
        let text = graph.utf8(name);
        graph
            .object_mut(morph)
            .and_then(|o| o.as_record_mut())
            .ok_or(ObjectError::WrongKind("morph"))?
            .set_field(field, text)?;
    }
    let watcher = graph.insert(watcher);

    graph
        .object_mut(&submorphs)
        .and_then(|o| o.as_collection_mut())
        .ok_or(ProjectError::NotAStage)?
        .push(watcher.clone());
    Ok(watcher)
}
