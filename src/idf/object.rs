//! Positional-record objects and documents.
//!
//! Each record starts with an object-type keyword, followed by
//! comma-terminated positional fields, terminated by a semicolon. Field
//! order is fixed per record type; comments (`!- ...`) are cosmetic.

use crate::Point;
use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;

/// One positional field with its cosmetic name comment.
#[derive(Debug, Clone, PartialEq)]
pub struct IdfField {
    pub value: String,
    pub comment: &'static str,
}

/// One record: keyword plus ordered fields.
#[derive(Debug, Clone, PartialEq)]
pub struct IdfObject {
    pub keyword: String,
    pub fields: Vec<IdfField>,
}

impl IdfObject {
    pub fn new(keyword: &str) -> Self {
        Self {
            keyword: keyword.to_string(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, value: impl Into<String>, comment: &'static str) -> Self {
        self.fields.push(IdfField {
            value: value.into(),
            comment,
        });
        self
    }

    pub fn num(self, value: f64, comment: &'static str) -> Self {
        self.field(format_number(value), comment)
    }

    pub fn int(self, value: i64, comment: &'static str) -> Self {
        self.field(value.to_string(), comment)
    }

    /// Appends a vertex count followed by absolute XYZ triplets.
    pub fn vertices(mut self, pts: &[Point]) -> Self {
        self = self.int(pts.len() as i64, "Number of Vertices");
        for p in pts {
            self = self
                .num(p.x, "Vertex X-coordinate {m}")
                .num(p.y, "Vertex Y-coordinate {m}")
                .num(p.z, "Vertex Z-coordinate {m}");
        }
        self
    }

    /// First field, the record name by convention.
    pub fn name(&self) -> Option<&str> {
        self.fields.first().map(|f| f.value.as_str())
    }

    pub fn field_value(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(|f| f.value.as_str())
    }

    /// Parses the fields from `start` as XYZ vertex triplets.
    pub fn vertices_from(&self, start: usize) -> Result<Vec<Point>> {
        let coords: Vec<f64> = self.fields[start..]
            .iter()
            .map(|f| {
                f.value
                    .parse::<f64>()
                    .with_context(|| format!("Bad coordinate '{}' in {}", f.value, self.keyword))
            })
            .collect::<Result<_>>()?;
        if coords.len() % 3 != 0 {
            bail!(
                "{}: vertex coordinate count {} not a multiple of 3",
                self.keyword,
                coords.len()
            );
        }
        Ok(coords
            .chunks_exact(3)
            .map(|c| Point::new(c[0], c[1], c[2]))
            .collect())
    }

    fn write_into(&self, out: &mut String) {
        out.push_str(&self.keyword);
        out.push_str(",\n");
        let last = self.fields.len().saturating_sub(1);
        for (i, f) in self.fields.iter().enumerate() {
            let terminator = if i == last { ';' } else { ',' };
            let cell = format!("  {}{}", f.value, terminator);
            if f.comment.is_empty() {
                out.push_str(&cell);
            } else {
                out.push_str(&format!("{cell:<30}!- {}", f.comment));
            }
            out.push('\n');
        }
        out.push('\n');
    }
}

/// Formats a number with fixed precision, trimming a useless fraction.
pub fn format_number(value: f64) -> String {
    if value == value.trunc() && value.abs() < 1e12 {
        format!("{:.1}", value)
    } else {
        format!("{:.4}", value)
    }
}

/// An ordered sequence of records.
#[derive(Debug, Clone, Default)]
pub struct IdfDocument {
    pub objects: Vec<IdfObject>,
}

impl IdfDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, object: IdfObject) {
        self.objects.push(object);
    }

    pub fn extend(&mut self, objects: impl IntoIterator<Item = IdfObject>) {
        self.objects.extend(objects);
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for obj in &self.objects {
            obj.write_into(&mut out);
        }
        out
    }

    pub fn write_file(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_text())
            .with_context(|| format!("Failed to write model file: {}", path.display()))
    }

    /// Parses model text back into records. Comments are discarded.
    pub fn parse(text: &str) -> Result<Self> {
        let mut stripped = String::with_capacity(text.len());
        for line in text.lines() {
            let code = match line.find('!') {
                Some(idx) => &line[..idx],
                None => line,
            };
            stripped.push_str(code);
            stripped.push('\n');
        }

        let mut objects = Vec::new();
        for record in stripped.split(';') {
            let mut parts = record.split(',').map(str::trim);
            let keyword = match parts.next() {
                Some(k) if !k.is_empty() => k,
                _ => continue, // trailing whitespace after the last record
            };
            let fields = parts
                .map(|v| IdfField {
                    value: v.to_string(),
                    comment: "",
                })
                .collect();
            objects.push(IdfObject {
                keyword: keyword.to_string(),
                fields,
            });
        }
        Ok(Self { objects })
    }

    pub fn read_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read model file: {}", path.display()))?;
        Self::parse(&text)
    }

    /// Records of one type, in document order.
    pub fn objects_of<'a>(&'a self, keyword: &str) -> impl Iterator<Item = &'a IdfObject> + 'a {
        let keyword = keyword.to_string();
        self.objects
            .iter()
            .filter(move |o| o.keyword.eq_ignore_ascii_case(&keyword))
    }

    /// Finds a record by type and name.
    pub fn find<'a>(&'a self, keyword: &str, name: &str) -> Option<&'a IdfObject> {
        self.objects_of(keyword).find(|o| o.name() == Some(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_format() {
        let obj = IdfObject::new("Zone")
            .field("Core_F1", "Name")
            .num(0.0, "Direction of Relative North {deg}")
            .int(1, "Multiplier");
        let mut out = String::new();
        obj.write_into(&mut out);

        assert!(out.starts_with("Zone,\n"));
        assert!(out.contains("  Core_F1,"));
        assert!(out.contains("!- Name"));
        // Last field terminated by semicolon.
        assert!(out.contains("  1;"));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(4.0), "4.0");
        assert_eq!(format_number(0.28), "0.2800");
        assert_eq!(format_number(-3.24), "-3.2400");
    }

    #[test]
    fn test_parse_roundtrip() {
        let mut doc = IdfDocument::new();
        doc.push(
            IdfObject::new("Zone")
                .field("Core_F1", "Name")
                .num(0.0, "Direction of Relative North {deg}"),
        );
        doc.push(
            IdfObject::new("Building")
                .field("Certificate_Building", "Name")
                .num(0.0, "North Axis {deg}"),
        );

        let parsed = IdfDocument::parse(&doc.to_text()).unwrap();
        assert_eq!(parsed.objects.len(), 2);
        assert_eq!(parsed.objects[0].keyword, "Zone");
        assert_eq!(parsed.objects[0].name(), Some("Core_F1"));
        assert!(parsed.find("Building", "Certificate_Building").is_some());
    }

    #[test]
    fn test_lookup_outlives_transient_keyword() {
        let mut doc = IdfDocument::new();
        doc.push(IdfObject::new("Zone").field("Core_F1", "Name"));

        // Keyword strings built at runtime must not tie the returned
        // references to their own lifetime.
        let found = {
            let keyword = String::from("Zone");
            doc.find(&keyword, "Core_F1")
        };
        assert!(found.is_some());

        let count = {
            let keyword = String::from("zone");
            doc.objects_of(&keyword).count()
        };
        assert_eq!(count, 1);
    }

    #[test]
    fn test_parse_ignores_comments() {
        let text = "! standalone comment\nZone,\n  Z1,  !- Name\n  0.0;  !- North\n";
        let parsed = IdfDocument::parse(text).unwrap();
        assert_eq!(parsed.objects.len(), 1);
        assert_eq!(parsed.objects[0].name(), Some("Z1"));
        assert_eq!(parsed.objects[0].field_value(1), Some("0.0"));
    }

    #[test]
    fn test_vertices_roundtrip() {
        let pts = [
            Point::new(0.0, 0.0, 0.0),
            Point::new(2.0, 0.0, 0.0),
            Point::new(2.0, 1.0, 3.0),
        ];
        let obj = IdfObject::new("Shading:Site:Detailed")
            .field("S1", "Name")
            .field("", "Transmittance Schedule Name")
            .vertices(&pts);
        let mut out = String::new();
        obj.write_into(&mut out);

        let parsed = IdfDocument::parse(&out).unwrap();
        let rec = &parsed.objects[0];
        assert_eq!(rec.field_value(2), Some("3")); // vertex count
        let back = rec.vertices_from(3).unwrap();
        assert_eq!(back.len(), 3);
        assert!(back[2].is_close(&pts[2]));
    }
}
