//! Object-detection annotation loader
//!
//! Reads a COCO-style document with `images`, `annotations` and an optional
//! `categories` section. JSON is the default; `.yaml`/`.yml` files are
//! parsed as YAML into the same structure.

use crate::error::{Error, Result};
use crate::model::{BoundingBox, Category, ImageRecord, Label, RecordId, VisualAnnotation};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, instrument, warn};

/// Images and boxes loaded from one document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisualDataset {
    pub images: Vec<ImageRecord>,
    pub annotations: Vec<VisualAnnotation>,
}

/// Load images and box annotations from a JSON or YAML file
#[instrument(skip(path), fields(path = %path.display()))]
pub fn load_visual_annotations(path: &Path) -> Result<VisualDataset> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::InvalidData => Error::parse(path, "document", "file is not valid UTF-8"),
        _ => Error::io(path, e),
    })?;

    let is_yaml = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.eq_ignore_ascii_case("yaml") || s.eq_ignore_ascii_case("yml"))
        .unwrap_or(false);

    let document: Value = if is_yaml {
        serde_yaml::from_str(&content).map_err(|e| Error::parse(path, "document", e.to_string()))?
    } else {
        serde_json::from_str(&content).map_err(|e| Error::parse(path, "document", e.to_string()))?
    };

    let dataset = parse_visual_document(&document, path)?;
    debug!(
        images = dataset.images.len(),
        annotations = dataset.annotations.len(),
        "Loaded visual annotations"
    );
    Ok(dataset)
}

/// Build a dataset from an already-parsed document
pub fn parse_visual_document(document: &Value, path: &Path) -> Result<VisualDataset> {
    let reader = DocumentReader { path };
    let root = document
        .as_object()
        .ok_or_else(|| reader.parse_error("document", "expected an object"))?;

    let images = reader.read_images(reader.array(root, "images", "")?)?;
    let categories = match root.get("categories") {
        Some(Value::Null) | None => BTreeMap::new(),
        Some(_) => reader.read_categories(reader.array(root, "categories", "")?)?,
    };
    let annotations = reader.read_annotations(reader.array(root, "annotations", "")?, &categories)?;

    let known: BTreeSet<&RecordId> = images.iter().map(|image| &image.image_id).collect();
    for annotation in &annotations {
        if !known.contains(&annotation.image_id) {
            return Err(Error::Reference {
                path: path.to_path_buf(),
                annotation: annotation.record_id().to_string(),
                image_id: annotation.image_id.to_string(),
            });
        }
    }

    Ok(VisualDataset {
        images,
        annotations,
    })
}

struct DocumentReader<'a> {
    path: &'a Path,
}

impl DocumentReader<'_> {
    fn parse_error(&self, location: impl Into<String>, message: impl Into<String>) -> Error {
        Error::parse(self.path, location, message)
    }

    fn field<'v>(&self, object: &'v Map<String, Value>, key: &str, location: &str) -> Result<&'v Value> {
        match object.get(key) {
            Some(Value::Null) | None => Err(Error::schema(self.path, join(location, key))),
            Some(value) => Ok(value),
        }
    }

    fn array<'v>(&self, object: &'v Map<String, Value>, key: &str, location: &str) -> Result<&'v Vec<Value>> {
        self.field(object, key, location)?
            .as_array()
            .ok_or_else(|| self.parse_error(join(location, key), "expected an array"))
    }

    fn object<'v>(&self, value: &'v Value, location: &str) -> Result<&'v Map<String, Value>> {
        value
            .as_object()
            .ok_or_else(|| self.parse_error(location, "expected an object"))
    }

    fn record_id(&self, value: &Value, location: &str) -> Result<RecordId> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .map(RecordId::Int)
                .ok_or_else(|| self.parse_error(location, format!("id {} is not an integer", n))),
            Value::String(s) if !s.trim().is_empty() => Ok(RecordId::Str(s.trim().to_string())),
            other => Err(self.parse_error(
                location,
                format!("expected an integer or non-empty string id, got {}", other),
            )),
        }
    }

    fn dimension(&self, value: &Value, location: &str) -> Result<u32> {
        let whole = value.as_u64().or_else(|| {
            value
                .as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0)
                .map(|f| f as u64)
        });
        match whole.and_then(|n| u32::try_from(n).ok()) {
            Some(n) if n > 0 => Ok(n),
            _ => Err(self.parse_error(
                location,
                format!("expected a positive integer, got {}", value),
            )),
        }
    }

    fn number(&self, value: &Value, location: &str) -> Result<f64> {
        value
            .as_f64()
            .filter(|f| f.is_finite())
            .ok_or_else(|| self.parse_error(location, format!("expected a number, got {}", value)))
    }

    fn read_images(&self, values: &[Value]) -> Result<Vec<ImageRecord>> {
        let mut seen = BTreeSet::new();
        let mut images = Vec::with_capacity(values.len());

        for (index, value) in values.iter().enumerate() {
            let location = format!("images[{}]", index);
            let object = self.object(value, &location)?;

            let id_value = match object.get("id").filter(|v| !v.is_null()) {
                Some(v) => v,
                None => self.field(object, "image_id", &location).map_err(|_| {
                    Error::schema(self.path, join(&location, "id"))
                })?,
            };
            let image_id = self.record_id(id_value, &join(&location, "id"))?;
            if !seen.insert(image_id.clone()) {
                return Err(self.parse_error(&location, format!("duplicate image id {}", image_id)));
            }

            let width = self.dimension(self.field(object, "width", &location)?, &join(&location, "width"))?;
            let height = self.dimension(self.field(object, "height", &location)?, &join(&location, "height"))?;
            let file_name = object
                .get("file_name")
                .and_then(Value::as_str)
                .map(str::to_string);

            images.push(ImageRecord {
                image_id,
                width,
                height,
                file_name,
            });
        }

        Ok(images)
    }

    fn read_categories(&self, values: &[Value]) -> Result<BTreeMap<RecordId, String>> {
        let mut categories = BTreeMap::new();

        for (index, value) in values.iter().enumerate() {
            let location = format!("categories[{}]", index);
            let object = self.object(value, &location)?;
            let id = self.record_id(self.field(object, "id", &location)?, &join(&location, "id"))?;
            let name = self
                .field(object, "name", &location)?
                .as_str()
                .ok_or_else(|| self.parse_error(join(&location, "name"), "expected a string"))?;

            if categories.insert(id.clone(), name.to_string()).is_some() {
                warn!(category_id = %id, "Duplicate category id, keeping the last definition");
            }
        }

        Ok(categories)
    }

    fn read_annotations(
        &self,
        values: &[Value],
        categories: &BTreeMap<RecordId, String>,
    ) -> Result<Vec<VisualAnnotation>> {
        let mut annotations = Vec::with_capacity(values.len());

        for (index, value) in values.iter().enumerate() {
            let location = format!("annotations[{}]", index);
            let object = self.object(value, &location)?;

            let annotation_id = match object.get("id") {
                Some(Value::Null) | None => None,
                Some(v) => Some(self.record_id(v, &join(&location, "id"))?),
            };
            let image_id = self.record_id(
                self.field(object, "image_id", &location)?,
                &join(&location, "image_id"),
            )?;
            let bbox = self.bbox(self.field(object, "bbox", &location)?, &join(&location, "bbox"))?;
            let category = self.category(object, categories, &location)?;
            let area = match object.get("area") {
                Some(Value::Null) | None => None,
                Some(v) => Some(self.number(v, &join(&location, "area"))?),
            };

            annotations.push(VisualAnnotation {
                annotation_id,
                image_id,
                category,
                bbox,
                area,
                needs_review: needs_review(object),
            });
        }

        Ok(annotations)
    }

    fn bbox(&self, value: &Value, location: &str) -> Result<BoundingBox> {
        let coordinates = value
            .as_array()
            .ok_or_else(|| self.parse_error(location, "expected [x, y, width, height]"))?;
        if coordinates.len() != 4 {
            return Err(self.parse_error(
                location,
                format!("expected 4 coordinates, got {}", coordinates.len()),
            ));
        }

        let mut numbers = [0.0; 4];
        for (slot, (index, coordinate)) in numbers.iter_mut().zip(coordinates.iter().enumerate()) {
            *slot = self.number(coordinate, &format!("{}[{}]", location, index))?;
        }
        let [x, y, width, height] = numbers;
        Ok(BoundingBox::new(x, y, width, height))
    }

    fn category(
        &self,
        object: &Map<String, Value>,
        categories: &BTreeMap<RecordId, String>,
        location: &str,
    ) -> Result<Label<Category>> {
        if let Some(name) = object.get("category").filter(|v| !v.is_null()) {
            let name = name
                .as_str()
                .ok_or_else(|| self.parse_error(join(location, "category"), "expected a string"))?;
            return Ok(Label::parse(name));
        }

        let id_value = object
            .get("category_id")
            .filter(|v| !v.is_null())
            .ok_or_else(|| Error::schema(self.path, join(location, "category")))?;
        let id = self.record_id(id_value, &join(location, "category_id"))?;

        Ok(match categories.get(&id) {
            Some(name) => Label::parse(name),
            None => Label::Unknown(format!("category_id {}", id)),
        })
    }
}

fn needs_review(object: &Map<String, Value>) -> bool {
    let flagged = object
        .get("needs_review")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let tagged = object
        .get("tags")
        .and_then(Value::as_array)
        .map(|tags| tags.iter().any(|tag| tag.as_str() == Some("needs_review")))
        .unwrap_or(false);
    flagged || tagged
}

fn join(location: &str, key: &str) -> String {
    if location.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", location, key)
    }
}
